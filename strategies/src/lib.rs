//! Move-selection strategies.
//!
//! A [`Strategy`] picks one legal move for a position. Strategies are built
//! through the [`StrategyRegistry`], which also resolves the names players
//! type in chat.
//!
//! Most strategies score every legal move on a copy of the board and pick
//! uniformly among the best-scoring candidates. The oracle strategies
//! ([`WorstMove`], [`StockfishMove`]) own a Stockfish process for their whole
//! lifetime and must be [closed](Strategy::close) when the game ends.

mod naming;
mod oracle;
mod random;
mod registry;
mod selection;
mod squares;
mod tactics;

use async_trait::async_trait;
use chess::{GameError, Move, PieceColor, Position};
use engine::EngineError;

pub use naming::display_name;
pub use oracle::{StockfishMove, WorstMove, WORST_MOVE_NODES};
pub use random::RandomMove;
pub use registry::{StrategyKind, StrategyRegistry};
pub use squares::{LightOrDarkSquares, SameOrOppositeColor};
pub use tactics::{MinOpponentMoves, SuicideKing};

/// Remaining clock time and increment for both sides, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockBudget {
    pub white_ms: u64,
    pub black_ms: u64,
    pub white_inc_ms: u64,
    pub black_inc_ms: u64,
}

impl ClockBudget {
    pub fn remaining(&self, color: PieceColor) -> u64 {
        match color {
            PieceColor::White => self.white_ms,
            PieceColor::Black => self.black_ms,
        }
    }
}

/// A pluggable move-selection policy.
#[async_trait]
pub trait Strategy: Send {
    /// Human-readable name, also what players type to pick the strategy.
    fn name(&self) -> String;

    /// Pick a move for the side to move. The result is always one of
    /// `position.legal_moves()`.
    async fn select(
        &mut self,
        position: &Position,
        clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError>;

    /// Called after the selected move was sent, with the resulting position.
    /// Stateful strategies update themselves here, never in `select`.
    fn observe(&mut self, _played: Move, _after: &Position) {}

    /// Release any external resources. Called once when the game ends.
    async fn close(&mut self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("No legal moves in position")]
    NoLegalMoves,
    #[error("Engine is not available")]
    EngineUnavailable,
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Game(#[from] GameError),
}
