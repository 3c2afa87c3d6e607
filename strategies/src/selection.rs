use chess::Move;
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Objective {
    Minimize,
    Maximize,
}

/// Moves sharing the optimal metric value.
pub(crate) struct Candidates<K> {
    best: Option<K>,
    moves: SmallVec<[Move; 16]>,
    objective: Objective,
}

impl<K: Ord> Candidates<K> {
    pub fn new(objective: Objective) -> Self {
        Self {
            best: None,
            moves: SmallVec::new(),
            objective,
        }
    }

    pub fn offer(&mut self, mv: Move, metric: K) {
        let better = match &self.best {
            None => true,
            Some(best) => match self.objective {
                Objective::Minimize => metric < *best,
                Objective::Maximize => metric > *best,
            },
        };

        if better {
            self.best = Some(metric);
            self.moves.clear();
            self.moves.push(mv);
        } else if self.best.as_ref() == Some(&metric) {
            self.moves.push(mv);
        }
    }

    #[cfg(test)]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Uniform pick among the optimal moves.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.moves.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Position;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_keeps_all_ties() {
        let moves = Position::new().legal_moves();
        let mut candidates = Candidates::new(Objective::Minimize);
        candidates.offer(moves[0], 3);
        candidates.offer(moves[1], 1);
        candidates.offer(moves[2], 5);
        candidates.offer(moves[3], 1);

        assert_eq!(candidates.moves(), &[moves[1], moves[3]]);
        let mut rng = StdRng::seed_from_u64(1);
        let picked = candidates.choose(&mut rng).unwrap();
        assert!(picked == moves[1] || picked == moves[3]);
    }

    #[test]
    fn test_maximize_resets_on_improvement() {
        let moves = Position::new().legal_moves();
        let mut candidates = Candidates::new(Objective::Maximize);
        candidates.offer(moves[0], 2);
        candidates.offer(moves[1], 2);
        candidates.offer(moves[2], 7);

        assert_eq!(candidates.moves(), &[moves[2]]);
    }

    #[test]
    fn test_empty_has_no_choice() {
        let candidates: Candidates<u32> = Candidates::new(Objective::Maximize);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(candidates.choose(&mut rng).is_none());
    }
}
