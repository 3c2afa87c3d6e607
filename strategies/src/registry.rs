use chess::SquareShade;
use engine::EngineConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{
    display_name, LightOrDarkSquares, MinOpponentMoves, RandomMove, SameOrOppositeColor,
    StockfishMove, Strategy, StrategyError, SuicideKing, WorstMove,
};

/// Shortest chat reply treated as a strategy name.
const MIN_PREFIX_LEN: usize = 3;

/// Every strategy a player can choose, in the order they are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    RandomMove,
    MinOpponentMoves,
    SuicideKing,
    Squares(SquareShade),
    RelativeColor { same: bool },
    WorstMove,
    Stockfish,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 9] = [
        StrategyKind::RandomMove,
        StrategyKind::MinOpponentMoves,
        StrategyKind::SuicideKing,
        StrategyKind::Squares(SquareShade::Light),
        StrategyKind::Squares(SquareShade::Dark),
        StrategyKind::RelativeColor { same: true },
        StrategyKind::RelativeColor { same: false },
        StrategyKind::WorstMove,
        StrategyKind::Stockfish,
    ];

    pub fn display_name(self) -> String {
        match self {
            Self::RandomMove => display_name(RandomMove::IDENTIFIER),
            Self::MinOpponentMoves => display_name(MinOpponentMoves::IDENTIFIER),
            Self::SuicideKing => display_name(SuicideKing::IDENTIFIER),
            Self::Squares(SquareShade::Light) => "Light Squares".to_string(),
            Self::Squares(SquareShade::Dark) => "Dark Squares".to_string(),
            Self::RelativeColor { same: true } => "Same Color".to_string(),
            Self::RelativeColor { same: false } => "Opposite Color".to_string(),
            Self::WorstMove => display_name(WorstMove::IDENTIFIER),
            Self::Stockfish => display_name(StockfishMove::IDENTIFIER),
        }
    }

    /// Whether the strategy needs a Stockfish process.
    pub fn needs_oracle(self) -> bool {
        matches!(self, Self::WorstMove | Self::Stockfish)
    }
}

/// The strategies available to this process.
///
/// Oracle-backed strategies are only listed when a Stockfish binary was
/// found at startup.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    kinds: Vec<StrategyKind>,
    oracle: Option<EngineConfig>,
}

impl StrategyRegistry {
    pub fn new(oracle: Option<EngineConfig>) -> Self {
        let kinds = StrategyKind::ALL
            .into_iter()
            .filter(|kind| oracle.is_some() || !kind.needs_oracle())
            .collect();
        Self { kinds, oracle }
    }

    pub fn all(&self) -> &[StrategyKind] {
        &self.kinds
    }

    pub fn names(&self) -> Vec<String> {
        self.kinds.iter().map(|kind| kind.display_name()).collect()
    }

    /// Match free text against the display names.
    ///
    /// Case-insensitive prefix match of at least three characters; the
    /// first strategy in offer order wins.
    pub fn by_prefix(&self, text: &str) -> Option<StrategyKind> {
        let needle = text.trim().to_lowercase();
        if needle.chars().count() < MIN_PREFIX_LEN {
            return None;
        }
        self.kinds
            .iter()
            .copied()
            .find(|kind| kind.display_name().to_lowercase().starts_with(&needle))
    }

    pub fn random_choice<R: Rng + ?Sized>(&self, rng: &mut R) -> StrategyKind {
        self.kinds
            .choose(rng)
            .copied()
            .unwrap_or(StrategyKind::RandomMove)
    }

    /// Engine settings for one oracle strategy, labelled with its name for logs.
    fn oracle_for(&self, kind: StrategyKind) -> Result<EngineConfig, StrategyError> {
        let oracle = self.oracle.as_ref().ok_or(StrategyError::EngineUnavailable)?;
        Ok(EngineConfig {
            label: Some(kind.display_name()),
            ..oracle.clone()
        })
    }

    /// Instantiate a strategy for one game.
    pub async fn build(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>, StrategyError> {
        let rng = StdRng::from_entropy();
        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::RandomMove => Box::new(RandomMove::new(rng)),
            StrategyKind::MinOpponentMoves => Box::new(MinOpponentMoves::new(rng)),
            StrategyKind::SuicideKing => Box::new(SuicideKing::new(rng)),
            StrategyKind::Squares(shade) => Box::new(LightOrDarkSquares::new(Some(shade), rng)),
            StrategyKind::RelativeColor { same } => {
                Box::new(SameOrOppositeColor::new(Some(same), rng))
            }
            StrategyKind::WorstMove => Box::new(WorstMove::spawn(self.oracle_for(kind)?).await?),
            StrategyKind::Stockfish => {
                Box::new(StockfishMove::spawn(self.oracle_for(kind)?).await?)
            }
        };
        tracing::debug!(strategy = %strategy.name(), "Built strategy");
        Ok(strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Position;

    #[test]
    fn test_registry_without_oracle() {
        let registry = StrategyRegistry::new(None);
        assert_eq!(
            registry.names(),
            vec![
                "Random Move",
                "Min Opponent Moves",
                "Suicide King",
                "Light Squares",
                "Dark Squares",
                "Same Color",
                "Opposite Color",
            ]
        );
        assert_eq!(registry.by_prefix("worst"), None);
    }

    #[test]
    fn test_registry_with_oracle() {
        let registry = StrategyRegistry::new(Some(EngineConfig::new("/usr/bin/stockfish")));
        assert_eq!(registry.all().len(), 9);
        assert_eq!(registry.by_prefix("Worst"), Some(StrategyKind::WorstMove));
        assert_eq!(registry.by_prefix("stockfish"), Some(StrategyKind::Stockfish));
    }

    #[test]
    fn test_oracle_config_is_labelled_per_strategy() {
        let registry = StrategyRegistry::new(Some(EngineConfig {
            threads: Some(2),
            ..EngineConfig::new("/usr/bin/stockfish")
        }));
        let config = registry.oracle_for(StrategyKind::WorstMove).unwrap();
        assert_eq!(config.label.as_deref(), Some("Worst Move"));
        assert_eq!(config.threads, Some(2));

        assert!(matches!(
            StrategyRegistry::new(None).oracle_for(StrategyKind::Stockfish),
            Err(StrategyError::EngineUnavailable)
        ));
    }

    #[test]
    fn test_by_prefix() {
        let registry = StrategyRegistry::new(None);
        assert_eq!(registry.by_prefix("ran"), Some(StrategyKind::RandomMove));
        assert_eq!(registry.by_prefix("  SUICIDE king "), Some(StrategyKind::SuicideKing));
        assert_eq!(
            registry.by_prefix("dark"),
            Some(StrategyKind::Squares(SquareShade::Dark))
        );
        assert_eq!(
            registry.by_prefix("opp"),
            Some(StrategyKind::RelativeColor { same: false })
        );
        assert_eq!(registry.by_prefix("ra"), None);
        assert_eq!(registry.by_prefix("hello there"), None);
        assert_eq!(registry.by_prefix("random moves please"), None);
    }

    #[test]
    fn test_random_choice_stays_in_registry() {
        let registry = StrategyRegistry::new(None);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            assert!(registry.all().contains(&registry.random_choice(&mut rng)));
        }
    }

    #[tokio::test]
    async fn test_built_strategies_play_legal_moves() {
        let registry = StrategyRegistry::new(None);
        let position = Position::from_move_list("e2e4 e7e5 g1f3 b8c6 f1b5").unwrap();
        let legal = position.legal_moves();

        for &kind in registry.all() {
            let mut strategy = registry.build(kind).await.unwrap();
            assert_eq!(strategy.name(), kind.display_name());
            for _ in 0..5 {
                let mv = strategy.select(&position, None).await.unwrap();
                assert!(legal.contains(&mv), "{} played an illegal move", strategy.name());
            }
            strategy.close().await;
        }
    }

    #[tokio::test]
    async fn test_oracle_kind_without_engine_fails() {
        let registry = StrategyRegistry::new(None);
        assert!(matches!(
            registry.build(StrategyKind::WorstMove).await,
            Err(StrategyError::EngineUnavailable)
        ));
    }
}
