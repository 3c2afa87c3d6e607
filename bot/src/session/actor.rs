use std::sync::Arc;

use chess::Position;
use futures::StreamExt;
use lichess_client::{BotApi, ChatLine, ChatRoom, EventStream, GameEvent, GameState};
use strategies::{StrategyError, StrategyKind};
use tokio::sync::mpsc;
use tracing::Instrument;

use super::commands::SessionCommand;
use super::negotiation::{
    chunk_names, reminder, run_countdown, timeout_warning, BindSource, NegotiationPhase,
    CHAT_LIMIT, PROMPT, WAIT_COMMAND,
};
use super::state::{clock_budget, format_chat_line, SessionState};
use super::SessionSettings;

const GREETING: &str = "Thanks for playing!";
const WAITING_REPLY: &str = "Waiting";

/// Who a chat message is for.
#[derive(Debug, Clone, Copy)]
enum Audience {
    Player,
    Everyone,
}

impl Audience {
    fn rooms(self) -> &'static [ChatRoom] {
        match self {
            Self::Player => &[ChatRoom::Player],
            Self::Everyone => &[ChatRoom::Player, ChatRoom::Spectator],
        }
    }
}

/// The main session actor loop.
/// Owns all mutable state. Processes game events and commands sequentially.
pub(crate) async fn run_session_actor(
    state: SessionState,
    settings: Arc<SessionSettings>,
    api: Arc<dyn BotApi>,
    events: EventStream<GameEvent>,
    cmd_tx: mpsc::Sender<SessionCommand>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
) {
    let game_id = state.game_id.clone();
    let actor = SessionActor {
        state,
        settings,
        api,
        cmd_tx,
    };
    actor
        .run(events, cmd_rx)
        .instrument(tracing::info_span!("session", id = %game_id))
        .await;
}

struct SessionActor {
    state: SessionState,
    settings: Arc<SessionSettings>,
    api: Arc<dyn BotApi>,
    /// Handed to the countdown task.
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut events: EventStream<GameEvent>,
        mut cmd_rx: mpsc::Receiver<SessionCommand>,
    ) {
        tracing::info!(color = %self.state.color, "Session actor started");

        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => break,
                    }
                }

                event = events.next() => {
                    match event {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(e)) if e.is_decode() => {
                            tracing::warn!("Skipping malformed game event: {}", e);
                        }
                        Some(Err(e)) => {
                            tracing::error!("Game stream failed: {}", e);
                            break;
                        }
                        None => {
                            tracing::info!("Game stream ended");
                            break;
                        }
                    }
                }
            }

            if self.state.terminated {
                break;
            }
        }

        self.state.release().await;
        tracing::info!("Session actor exited");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::CountdownReminder(secs) => {
                if self.state.negotiation_open() {
                    self.say(Audience::Player, &reminder(secs)).await;
                }
            }
            SessionCommand::CountdownExpired => {
                if self.state.negotiation_open() {
                    let kind = self.settings.registry.random_choice(&mut rand::thread_rng());
                    self.bind(kind, BindSource::Timeout).await;
                } else {
                    tracing::debug!("Countdown expired after negotiation closed");
                }
            }
            SessionCommand::Shutdown => {
                tracing::info!("Session shutdown requested");
                self.state.terminated = true;
            }
        }
    }

    async fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameFull { state } => {
                self.on_game_full(&state).await;
                self.on_state(state).await;
            }
            GameEvent::GameState(state) => self.on_state(state).await,
            GameEvent::ChatLine(line) => self.on_chat(line).await,
            GameEvent::Other => tracing::trace!("Ignoring game event"),
        }
    }

    async fn on_game_full(&mut self, state: &GameState) {
        if self.state.negotiation_started || !state.is_started() {
            return;
        }
        self.state.negotiation_started = true;
        self.say(Audience::Everyone, GREETING).await;

        if !self.state.is_awaiting() {
            return;
        }
        match self.settings.preselected {
            Some(kind) => self.bind(kind, BindSource::Preselected).await,
            None => self.open_negotiation().await,
        }
    }

    async fn open_negotiation(&mut self) {
        let secs = self.settings.negotiation_secs;
        self.say(Audience::Player, PROMPT).await;
        for chunk in chunk_names(&self.settings.registry.names(), CHAT_LIMIT) {
            self.say(Audience::Player, &chunk).await;
        }
        self.say(Audience::Player, &timeout_warning(secs)).await;

        if !self.state.negotiation_open() {
            // Bound or told to wait while the prompt was being posted
            return;
        }
        self.state.set_phase(NegotiationPhase::Open);
        tokio::spawn(
            run_countdown(secs, self.state.subscribe_phase(), self.cmd_tx.clone())
                .in_current_span(),
        );
    }

    async fn on_chat(&mut self, line: ChatLine) {
        if self.state.is_own_message(&line) {
            tracing::debug!("Own chat: {}", line.text);
            return;
        }
        tracing::info!("{}", format_chat_line(&line));

        if !self.state.is_awaiting() {
            return;
        }

        let text = line.text.trim().to_lowercase();
        if text == WAIT_COMMAND && !self.state.waiting {
            tracing::info!("Opponent asked to wait");
            self.state.waiting = true;
            self.state.set_phase(NegotiationPhase::Waiting);
            self.say(Audience::Player, WAITING_REPLY).await;
            return;
        }

        if let Some(kind) = self.settings.registry.by_prefix(&text) {
            self.bind(kind, BindSource::Chat).await;
        }
    }

    /// Bind a strategy unless one is bound already, then play the pending
    /// state if there is one.
    async fn bind(&mut self, kind: StrategyKind, source: BindSource) {
        if !self.state.is_awaiting() {
            tracing::debug!(?kind, "Strategy already bound");
            return;
        }

        let strategy = match self.settings.registry.build(kind).await {
            Ok(strategy) => strategy,
            Err(e) => {
                tracing::error!(?kind, "Failed to build strategy: {}", e);
                self.state.terminated = true;
                return;
            }
        };
        let name = strategy.name();
        tracing::info!(strategy = %name, ?source, "Strategy bound");

        self.state.strategy = Some(strategy);
        self.state.set_phase(NegotiationPhase::Closed);
        self.say(Audience::Everyone, &source.announcement(&name)).await;

        if let Some(pending) = self.state.pending.take() {
            tracing::debug!("Evaluating pending game state");
            self.on_state(pending).await;
        }
    }

    async fn on_state(&mut self, game_state: GameState) {
        if !game_state.is_started() {
            tracing::info!(status = %game_state.status, "Game over");
            self.state.terminated = true;
            return;
        }

        if self.state.strategy.is_none() {
            self.state.pending = Some(game_state);
            return;
        }

        let position = match Position::from_move_list(&game_state.moves) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Failed to replay moves {:?}: {}", game_state.moves, e);
                return;
            }
        };
        if !self.state.is_our_turn(&position) {
            return;
        }

        let clock = clock_budget(&game_state);
        let Some(strategy) = self.state.strategy.as_mut() else {
            return;
        };
        match strategy.select(&position, clock.as_ref()).await {
            Ok(mv) => {
                let uci = position.to_uci(mv);
                tracing::info!(ply = position.ply(), "Sending move: {}", uci);
                if let Err(e) = self.api.make_move(&self.state.game_id, &uci).await {
                    tracing::warn!("Failed to send move {}: {}", uci, e);
                    return;
                }
                match position.after(mv) {
                    Ok(after) => strategy.observe(mv, &after),
                    Err(e) => tracing::warn!("Selected move did not apply: {}", e),
                }
            }
            Err(StrategyError::NoLegalMoves) => {
                tracing::warn!("No legal moves in an ongoing game");
            }
            Err(e @ (StrategyError::Engine(_) | StrategyError::EngineUnavailable)) => {
                tracing::error!("Oracle failed, ending session: {}", e);
                self.state.terminated = true;
            }
            Err(e) => tracing::warn!("Strategy failed: {}", e),
        }
    }

    async fn say(&mut self, audience: Audience, text: &str) {
        for &room in audience.rooms() {
            tracing::debug!(room = room.as_str(), "Sending chat: {}", text);
            if let Err(e) = self.api.post_message(&self.state.game_id, room, text).await {
                tracing::warn!(room = room.as_str(), "Failed to send chat: {}", e);
            }
        }
    }
}
