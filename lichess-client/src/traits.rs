//! BotApi trait abstraction for client implementations

use crate::error::ClientResult;
use crate::types::{ChatRoom, DeclineReason, GameEvent, IncomingEvent, Roster};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A long-lived NDJSON event stream. Malformed lines surface as
/// `Err(ClientError::Decode)` items and the stream continues.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = ClientResult<T>> + Send>>;

/// Bot-account operations on the Lichess API.
/// Implemented by both the real `LichessClient` and `MockBotApi`.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Id of the account the token belongs to
    async fn account_id(&self) -> ClientResult<String>;

    /// Stream account-wide events (challenges, game starts)
    async fn stream_incoming_events(&self) -> ClientResult<EventStream<IncomingEvent>>;

    /// Stream the events of one game
    async fn stream_game(&self, game_id: &str) -> ClientResult<EventStream<GameEvent>>;

    async fn accept_challenge(&self, challenge_id: &str) -> ClientResult<()>;

    async fn decline_challenge(
        &self,
        challenge_id: &str,
        reason: DeclineReason,
    ) -> ClientResult<()>;

    /// Play a move given in standard UCI notation
    async fn make_move(&self, game_id: &str, uci: &str) -> ClientResult<()>;

    /// Post a chat message to one room of a game
    async fn post_message(&self, game_id: &str, room: ChatRoom, text: &str) -> ClientResult<()>;

    /// Export a game and return its players
    async fn export_game(&self, game_id: &str) -> ClientResult<Roster>;
}
