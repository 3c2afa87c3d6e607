//! Wire types for the Lichess bot API.

use serde::Deserialize;

/// An event on the account-wide stream (`/api/stream/event`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IncomingEvent {
    Challenge { challenge: Challenge },
    GameStart { game: GameRef },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub rated: bool,
    pub variant: Variant,
    pub time_control: TimeControl,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variant {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeControl {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRef {
    pub id: String,
}

/// An event on a single game's stream (`/api/bot/game/stream/{id}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    GameFull { state: GameState },
    GameState(GameState),
    ChatLine(ChatLine),
    #[serde(other)]
    Other,
}

/// Current moves, status and clocks of a game. Clock values are milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub moves: String,
    pub status: String,
    #[serde(default)]
    pub wtime: u64,
    #[serde(default)]
    pub btime: u64,
    #[serde(default)]
    pub winc: u64,
    #[serde(default)]
    pub binc: u64,
}

impl GameState {
    pub const STARTED: &'static str = "started";

    pub fn is_started(&self) -> bool {
        self.status == Self::STARTED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatLine {
    pub username: String,
    pub text: String,
    pub room: ChatRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRoom {
    Player,
    Spectator,
}

impl ChatRoom {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Spectator => "spectator",
        }
    }
}

/// Reason sent when declining a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    Generic,
    Casual,
    TimeControl,
    Standard,
}

impl DeclineReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Casual => "casual",
            Self::TimeControl => "timeControl",
            Self::Standard => "standard",
        }
    }
}

/// Player ids of a game, from the game export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub white: Option<String>,
    pub black: Option<String>,
}

impl Roster {
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        Self {
            white: Some(white.into()),
            black: Some(black.into()),
        }
    }

    pub fn is_white(&self, player_id: &str) -> bool {
        self.white
            .as_deref()
            .is_some_and(|white| white.eq_ignore_ascii_case(player_id))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedGame {
    pub players: ExportedPlayers,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedPlayers {
    pub white: ExportedPlayer,
    pub black: ExportedPlayer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedPlayer {
    pub user: Option<ExportedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportedUser {
    pub id: String,
}

impl From<ExportedGame> for Roster {
    fn from(game: ExportedGame) -> Self {
        Self {
            white: game.players.white.user.map(|u| u.id),
            black: game.players.black.user.map(|u| u.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Account {
    pub id: String,
}
