//! Strategies that try to keep their pieces on one square shade.

use async_trait::async_trait;
use chess::{Move, Position, SquareShade};
use rand::rngs::StdRng;
use rand::Rng;

use crate::selection::{Candidates, Objective};
use crate::{ClockBudget, Strategy, StrategyError};

/// Pick the move leaving the most of the mover's pieces on `shade`.
fn select_for_shade(
    position: &Position,
    shade: impl Fn(chess::PieceColor) -> SquareShade,
    rng: &mut StdRng,
) -> Result<Move, StrategyError> {
    let mover = position.side_to_move();
    let target = shade(mover);
    let mut candidates = Candidates::new(Objective::Maximize);
    for mv in position.legal_moves() {
        let after = position.after(mv)?;
        candidates.offer(mv, after.pieces_on_shade(mover, target));
    }
    candidates.choose(rng).ok_or(StrategyError::NoLegalMoves)
}

/// Crowds its pieces onto light squares or onto dark squares.
pub struct LightOrDarkSquares {
    shade: SquareShade,
    rng: StdRng,
}

impl LightOrDarkSquares {
    /// Without an explicit shade one is picked at random.
    pub fn new(shade: Option<SquareShade>, mut rng: StdRng) -> Self {
        let shade = shade.unwrap_or_else(|| {
            if rng.gen_bool(0.5) {
                SquareShade::Light
            } else {
                SquareShade::Dark
            }
        });
        Self { shade, rng }
    }

    pub fn shade(&self) -> SquareShade {
        self.shade
    }
}

#[async_trait]
impl Strategy for LightOrDarkSquares {
    fn name(&self) -> String {
        match self.shade {
            SquareShade::Light => "Light Squares".to_string(),
            SquareShade::Dark => "Dark Squares".to_string(),
        }
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        let shade = self.shade;
        select_for_shade(position, |_| shade, &mut self.rng)
    }
}

/// Crowds its pieces onto the shade matching its own color (white on light,
/// black on dark) or onto the other one.
pub struct SameOrOppositeColor {
    same: bool,
    rng: StdRng,
}

impl SameOrOppositeColor {
    /// Without an explicit choice one is picked at random.
    pub fn new(same: Option<bool>, mut rng: StdRng) -> Self {
        let same = same.unwrap_or_else(|| rng.gen_bool(0.5));
        Self { same, rng }
    }

    pub fn is_same(&self) -> bool {
        self.same
    }
}

#[async_trait]
impl Strategy for SameOrOppositeColor {
    fn name(&self) -> String {
        if self.same {
            "Same Color".to_string()
        } else {
            "Opposite Color".to_string()
        }
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        let same = self.same;
        select_for_shade(
            position,
            |mover| {
                let own = SquareShade::for_color(mover);
                if same {
                    own
                } else {
                    own.opposite()
                }
            },
            &mut self.rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::PieceColor;
    use rand::SeedableRng;

    fn best_count(position: &Position, color: PieceColor, shade: SquareShade) -> usize {
        position
            .legal_moves()
            .into_iter()
            .map(|mv| position.after(mv).unwrap().pieces_on_shade(color, shade))
            .max()
            .unwrap()
    }

    #[tokio::test]
    async fn test_light_squares_maximizes() {
        let position = Position::from_move_list("d2d4 d7d5 c1f4").unwrap();
        let best = best_count(&position, PieceColor::Black, SquareShade::Light);

        for seed in 0..10 {
            let mut strategy =
                LightOrDarkSquares::new(Some(SquareShade::Light), StdRng::seed_from_u64(seed));
            let mv = strategy.select(&position, None).await.unwrap();
            let after = position.after(mv).unwrap();
            assert_eq!(after.pieces_on_shade(PieceColor::Black, SquareShade::Light), best);
        }
    }

    #[tokio::test]
    async fn test_same_color_targets_own_shade() {
        let position = Position::new();
        let best = best_count(&position, PieceColor::White, SquareShade::Light);

        let mut strategy = SameOrOppositeColor::new(Some(true), StdRng::seed_from_u64(5));
        let mv = strategy.select(&position, None).await.unwrap();
        let after = position.after(mv).unwrap();
        assert_eq!(after.pieces_on_shade(PieceColor::White, SquareShade::Light), best);
    }

    #[tokio::test]
    async fn test_opposite_color_as_black_targets_light() {
        let position = Position::from_move_list("e2e4").unwrap();
        let best = best_count(&position, PieceColor::Black, SquareShade::Light);

        let mut strategy = SameOrOppositeColor::new(Some(false), StdRng::seed_from_u64(5));
        let mv = strategy.select(&position, None).await.unwrap();
        let after = position.after(mv).unwrap();
        assert_eq!(after.pieces_on_shade(PieceColor::Black, SquareShade::Light), best);
    }

    #[test]
    fn test_names_follow_parameter() {
        let rng = StdRng::seed_from_u64(0);
        assert_eq!(
            LightOrDarkSquares::new(Some(SquareShade::Dark), rng.clone()).name(),
            "Dark Squares"
        );
        assert_eq!(SameOrOppositeColor::new(Some(false), rng.clone()).name(), "Opposite Color");

        let random = LightOrDarkSquares::new(None, rng);
        let expected = match random.shade() {
            SquareShade::Light => "Light Squares",
            SquareShade::Dark => "Dark Squares",
        };
        assert_eq!(random.name(), expected);
    }
}
