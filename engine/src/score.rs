//! Engine evaluation scores.

use std::cmp::Ordering;

/// Evaluation relative to one side.
///
/// Centipawns: positive = that side is better.
/// Mate: positive N = that side mates in N moves, negative or zero N = that
/// side gets mated in |N| moves (zero means already mated).
/// `MateGiven` is the best possible result: the other side is already mated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
    MateGiven,
}

impl Score {
    /// The same evaluation seen by the other side.
    pub fn flip(self) -> Self {
        match self {
            Self::Centipawns(cp) => Self::Centipawns(-cp),
            Self::Mate(0) => Self::MateGiven,
            Self::Mate(n) => Self::Mate(-n),
            Self::MateGiven => Self::Mate(0),
        }
    }

    fn rank(self) -> (u8, i64) {
        match self {
            Self::MateGiven => (3, 0),
            Self::Mate(n) if n > 0 => (2, -(n as i64)),
            Self::Centipawns(cp) => (1, cp as i64),
            Self::Mate(n) => (0, -(n as i64)),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) if *m > 0 => format!("+M{}", m),
            Self::Mate(m) => format!("-M{}", m.abs()),
            Self::MateGiven => "#".to_string(),
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let mut scores = vec![
            Score::Centipawns(50),
            Score::Mate(-1),
            Score::MateGiven,
            Score::Mate(3),
            Score::Mate(0),
            Score::Centipawns(-200),
            Score::Mate(1),
            Score::Mate(-6),
        ];
        scores.sort();
        assert_eq!(
            scores,
            vec![
                Score::Mate(0),
                Score::Mate(-1),
                Score::Mate(-6),
                Score::Centipawns(-200),
                Score::Centipawns(50),
                Score::Mate(3),
                Score::Mate(1),
                Score::MateGiven,
            ]
        );
    }

    #[test]
    fn test_flip() {
        assert_eq!(Score::Centipawns(35).flip(), Score::Centipawns(-35));
        assert_eq!(Score::Mate(2).flip(), Score::Mate(-2));
        assert_eq!(Score::Mate(0).flip(), Score::MateGiven);
        assert_eq!(Score::MateGiven.flip(), Score::Mate(0));
    }

    #[test]
    fn test_mate_given_beats_everything() {
        assert!(Score::MateGiven > Score::Mate(1));
        assert!(Score::MateGiven > Score::Centipawns(i32::MAX));
    }
}
