use chess::{PieceColor, Position};
use lichess_client::{ChatLine, ChatRoom, GameState};
use strategies::{ClockBudget, Strategy};
use tokio::sync::watch;

use super::negotiation::NegotiationPhase;

/// Internal mutable state, owned entirely by the session actor. No locks.
pub(crate) struct SessionState {
    pub game_id: String,
    pub player_id: String,
    pub color: PieceColor,
    pub strategy: Option<Box<dyn Strategy>>,
    /// Opponent typed "wait"; no automatic pick.
    pub waiting: bool,
    /// Most recent state seen before a strategy was bound.
    pub pending: Option<GameState>,
    pub negotiation_started: bool,
    pub terminated: bool,
    phase_tx: watch::Sender<NegotiationPhase>,
}

impl SessionState {
    pub fn new(game_id: String, player_id: String, color: PieceColor) -> Self {
        let (phase_tx, _) = watch::channel(NegotiationPhase::Idle);
        Self {
            game_id,
            player_id,
            color,
            strategy: None,
            waiting: false,
            pending: None,
            negotiation_started: false,
            terminated: false,
            phase_tx,
        }
    }

    /// No strategy bound yet and the game is still on.
    pub fn is_awaiting(&self) -> bool {
        self.strategy.is_none() && !self.terminated
    }

    /// Awaiting and the countdown may still pick for the opponent.
    pub fn negotiation_open(&self) -> bool {
        self.is_awaiting() && !self.waiting
    }

    pub fn set_phase(&self, phase: NegotiationPhase) {
        self.phase_tx.send_replace(phase);
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<NegotiationPhase> {
        self.phase_tx.subscribe()
    }

    pub fn is_our_turn(&self, position: &Position) -> bool {
        position.side_to_move() == self.color
    }

    pub fn is_own_message(&self, line: &ChatLine) -> bool {
        line.username.eq_ignore_ascii_case(&self.player_id)
    }

    /// Close the negotiation and the strategy's resources.
    pub async fn release(&mut self) {
        self.terminated = true;
        self.set_phase(NegotiationPhase::Closed);
        if let Some(mut strategy) = self.strategy.take() {
            tracing::debug!(strategy = %strategy.name(), "Releasing strategy");
            strategy.close().await;
        }
    }
}

/// Clock budget from a game state; `None` when no clock is running.
pub(crate) fn clock_budget(state: &GameState) -> Option<ClockBudget> {
    if state.wtime == 0 && state.btime == 0 {
        return None;
    }
    Some(ClockBudget {
        white_ms: state.wtime,
        black_ms: state.btime,
        white_inc_ms: state.winc,
        black_inc_ms: state.binc,
    })
}

/// Log line for a chat message.
pub(crate) fn format_chat_line(line: &ChatLine) -> String {
    let message = format!("{}: {}", line.username, line.text);
    match line.room {
        ChatRoom::Spectator => format!("[Spectator] {}", message),
        ChatRoom::Player => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(username: &str, room: ChatRoom) -> ChatLine {
        ChatLine {
            username: username.to_string(),
            text: "hello".to_string(),
            room,
        }
    }

    #[test]
    fn test_format_chat_line() {
        assert_eq!(format_chat_line(&chat("alice", ChatRoom::Player)), "alice: hello");
        assert_eq!(
            format_chat_line(&chat("carol", ChatRoom::Spectator)),
            "[Spectator] carol: hello"
        );
    }

    #[test]
    fn test_own_message_is_case_insensitive() {
        let state = SessionState::new("g1".into(), "multibot".into(), PieceColor::White);
        assert!(state.is_own_message(&chat("MultiBot", ChatRoom::Player)));
        assert!(!state.is_own_message(&chat("alice", ChatRoom::Player)));
    }

    #[test]
    fn test_turn_follows_move_parity() {
        let state = SessionState::new("g1".into(), "bot".into(), PieceColor::Black);
        assert!(!state.is_our_turn(&Position::new()));
        assert!(state.is_our_turn(&Position::from_move_list("e2e4").unwrap()));
        assert!(!state.is_our_turn(&Position::from_move_list("e2e4 e7e5").unwrap()));
    }

    #[test]
    fn test_clock_budget() {
        let mut game_state = GameState {
            status: "started".into(),
            ..Default::default()
        };
        assert_eq!(clock_budget(&game_state), None);

        game_state.wtime = 60_000;
        game_state.btime = 58_000;
        game_state.binc = 2_000;
        let budget = clock_budget(&game_state).unwrap();
        assert_eq!(budget.remaining(PieceColor::Black), 58_000);
        assert_eq!(budget.black_inc_ms, 2_000);
    }

    #[tokio::test]
    async fn test_release_closes_negotiation() {
        let mut state = SessionState::new("g1".into(), "bot".into(), PieceColor::White);
        let phase = state.subscribe_phase();
        state.set_phase(NegotiationPhase::Open);
        assert!(state.negotiation_open());

        state.release().await;
        assert_eq!(*phase.borrow(), NegotiationPhase::Closed);
        assert!(!state.is_awaiting());
    }
}
