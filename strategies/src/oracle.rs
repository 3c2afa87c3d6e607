//! Strategies backed by a Stockfish process.

use async_trait::async_trait;
use chess::{BoardStatus, Move, Position};
use engine::{EngineConfig, GoParams, Score, StockfishEngine};

use crate::{display_name, ClockBudget, Strategy, StrategyError};

/// Search budget for each candidate evaluated by [`WorstMove`].
pub const WORST_MOVE_NODES: u64 = 10_000;

/// Plays the move the engine likes least for its own side.
///
/// Every legal move is played on a copy of the board and the resulting
/// position is searched. The engine reports the score for the side to move
/// after the candidate, so it is flipped back to the mover before comparing.
pub struct WorstMove {
    engine: Option<StockfishEngine>,
    nodes: u64,
}

impl WorstMove {
    pub const IDENTIFIER: &'static str = "WorstMoveStrategy";

    pub async fn spawn(config: EngineConfig) -> Result<Self, StrategyError> {
        let engine = StockfishEngine::spawn(config).await?;
        Ok(Self {
            engine: Some(engine),
            nodes: WORST_MOVE_NODES,
        })
    }

    /// Score of `after` for its side to move, i.e. the opponent of the mover.
    async fn reply_score(
        engine: &mut StockfishEngine,
        after: &Position,
        nodes: u64,
    ) -> Result<Score, StrategyError> {
        match after.status() {
            // The side to move in `after` is mated or drawn; no search needed.
            BoardStatus::Checkmate => Ok(Score::Mate(0)),
            BoardStatus::Draw => Ok(Score::Centipawns(0)),
            BoardStatus::Ongoing => Ok(engine
                .evaluate(&after.to_fen(), &GoParams::nodes(nodes))
                .await?),
        }
    }
}

/// Pick the candidate whose score, seen by the mover, is lowest.
///
/// Scores are given from the replying side and flipped before comparing.
/// The running minimum starts at `MateGiven`, so a candidate only wins by
/// being strictly lower; `first` is played when none is.
pub(crate) fn least_favourable(first: Move, scored: &[(Move, Score)]) -> Move {
    let mut worst = first;
    let mut worst_score = Score::MateGiven;
    for &(mv, reply) in scored {
        let score = reply.flip();
        if score < worst_score {
            worst_score = score;
            worst = mv;
        }
    }
    worst
}

#[async_trait]
impl Strategy for WorstMove {
    fn name(&self) -> String {
        display_name(Self::IDENTIFIER)
    }

    async fn select(
        &mut self,
        position: &Position,
        _clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        let engine = self
            .engine
            .as_mut()
            .ok_or(StrategyError::EngineUnavailable)?;
        let legal = position.legal_moves();
        let first = *legal.first().ok_or(StrategyError::NoLegalMoves)?;

        let mut scored = Vec::with_capacity(legal.len());
        for mv in legal {
            let after = position.after(mv)?;
            let reply = Self::reply_score(engine, &after, self.nodes).await?;
            tracing::trace!(mv = %position.to_uci(mv), score = %reply.flip().display(), "Scored candidate");
            scored.push((mv, reply));
        }

        Ok(least_favourable(first, &scored))
    }

    async fn close(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown().await;
        }
    }
}

/// Plays the engine's best move, searching within the game clock when known.
pub struct StockfishMove {
    engine: Option<StockfishEngine>,
}

impl StockfishMove {
    pub const IDENTIFIER: &'static str = "StockfishStrategy";

    pub async fn spawn(config: EngineConfig) -> Result<Self, StrategyError> {
        let engine = StockfishEngine::spawn(config).await?;
        Ok(Self {
            engine: Some(engine),
        })
    }
}

/// Build search parameters from the clock, falling back to a fixed move time.
pub(crate) fn go_params(clock: Option<&ClockBudget>) -> GoParams {
    match clock {
        Some(clock) if clock.white_ms > 0 || clock.black_ms > 0 => GoParams {
            wtime: Some(clock.white_ms),
            btime: Some(clock.black_ms),
            winc: Some(clock.white_inc_ms),
            binc: Some(clock.black_inc_ms),
            ..Default::default()
        },
        _ => GoParams::default(),
    }
}

#[async_trait]
impl Strategy for StockfishMove {
    fn name(&self) -> String {
        display_name(Self::IDENTIFIER)
    }

    async fn select(
        &mut self,
        position: &Position,
        clock: Option<&ClockBudget>,
    ) -> Result<Move, StrategyError> {
        if position.legal_move_count() == 0 {
            return Err(StrategyError::NoLegalMoves);
        }
        let engine = self
            .engine
            .as_mut()
            .ok_or(StrategyError::EngineUnavailable)?;
        let token = engine
            .best_move(&position.to_fen(), &go_params(clock))
            .await?;
        Ok(position.resolve_token(&token)?)
    }

    async fn close(&mut self) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown().await;
        }
    }
}
