//! Strategies scoring each candidate on the resulting board.

use async_trait::async_trait;
use chess::{Move, PieceColor, Position};
use rand::rngs::StdRng;

use crate::selection::{Candidates, Objective};
use crate::{display_name, ClockBudget, Strategy, StrategyError};

/// Leaves the opponent with as few legal replies as possible.
pub struct MinOpponentMoves {
    rng: StdRng,
}

impl MinOpponentMoves {
    pub const IDENTIFIER: &'static str = "MinOpponentMovesStrategy";

    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl Strategy for MinOpponentMoves {
    fn name(&self) -> String {
        display_name(Self::IDENTIFIER)
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        let mut candidates = Candidates::new(Objective::Minimize);
        for mv in position.legal_moves() {
            let after = position.after(mv)?;
            candidates.offer(mv, after.legal_move_count());
        }
        candidates
            .choose(&mut self.rng)
            .ok_or(StrategyError::NoLegalMoves)
    }
}

/// Walks its king toward the opponent's king.
pub struct SuicideKing {
    rng: StdRng,
}

impl SuicideKing {
    pub const IDENTIFIER: &'static str = "SuicideKingStrategy";

    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

/// Squared Euclidean distance between the kings' file/rank coordinates.
/// Ordering matches the plain distance and stays exact for tie detection.
pub(crate) fn king_distance_squared(position: &Position) -> u32 {
    let white = position.king(PieceColor::White);
    let black = position.king(PieceColor::Black);
    let file_diff = (white.file() as i32 - black.file() as i32).unsigned_abs();
    let rank_diff = (white.rank() as i32 - black.rank() as i32).unsigned_abs();
    file_diff * file_diff + rank_diff * rank_diff
}

#[async_trait]
impl Strategy for SuicideKing {
    fn name(&self) -> String {
        display_name(Self::IDENTIFIER)
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        let mut candidates = Candidates::new(Objective::Minimize);
        for mv in position.legal_moves() {
            let after = position.after(mv)?;
            candidates.offer(mv, king_distance_squared(&after));
        }
        candidates
            .choose(&mut self.rng)
            .ok_or(StrategyError::NoLegalMoves)
    }
}
