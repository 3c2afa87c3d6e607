use async_trait::async_trait;
use chess::{Move, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{display_name, ClockBudget, Strategy, StrategyError};

/// Plays a uniformly random legal move.
pub struct RandomMove {
    rng: StdRng,
}

impl RandomMove {
    pub const IDENTIFIER: &'static str = "RandomMoveStrategy";

    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl Strategy for RandomMove {
    fn name(&self) -> String {
        display_name(Self::IDENTIFIER)
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        position
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(StrategyError::NoLegalMoves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_selects_legal_moves() {
        let mut strategy = RandomMove::new(StdRng::seed_from_u64(42));
        let position = Position::from_move_list("e2e4 c7c5 g1f3").unwrap();
        let legal = position.legal_moves();

        for _ in 0..50 {
            let mv = strategy.select(&position, None).await.unwrap();
            assert!(legal.contains(&mv));
        }
    }

    #[tokio::test]
    async fn test_no_legal_moves() {
        let mut strategy = RandomMove::new(StdRng::seed_from_u64(42));
        let mated = Position::from_move_list("f2f3 e7e5 g2g4 d8h4").unwrap();
        assert!(matches!(
            strategy.select(&mated, None).await,
            Err(StrategyError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_name() {
        assert_eq!(RandomMove::new(StdRng::seed_from_u64(0)).name(), "Random Move");
    }
}
