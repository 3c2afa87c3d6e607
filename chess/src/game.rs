use cozy_chess::{Board, GameStatus, Move, Square};

use crate::types::{PieceColor, SquareShade};
use crate::uci::{convert_uci_castling_to_cozy, format_standard_uci, parse_uci_move};

/// Board state rebuilt from the server's move list.
///
/// Positions are only ever produced by replaying moves from the standard
/// initial position, so the side to move always follows the parity of
/// [`Position::ply`].
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    moves: Vec<Move>,
}

/// Terminal state as seen from the board alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Ongoing,
    Checkmate,
    Draw,
}

impl Position {
    /// The standard initial position.
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            moves: Vec::new(),
        }
    }

    /// Replay a space-separated list of UCI tokens, as found in a game-state event.
    pub fn from_move_list(moves: &str) -> Result<Self, GameError> {
        Self::replay(moves.split_whitespace())
    }

    /// Replay UCI tokens from the initial position. Each token must be legal
    /// in the position it is applied to.
    pub fn replay<'a, I>(tokens: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut position = Self::new();
        for token in tokens {
            let mv = position.resolve_token(token)?;
            position.play(mv)?;
        }
        Ok(position)
    }

    /// Get the current board position
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves applied since the initial position
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of half-moves applied
    pub fn ply(&self) -> usize {
        self.moves.len()
    }

    pub fn side_to_move(&self) -> PieceColor {
        PieceColor::from(self.board.side_to_move())
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    /// Number of legal moves, without collecting them
    pub fn legal_move_count(&self) -> usize {
        let mut count = 0;
        self.board.generate_moves(|mvs| {
            count += mvs.len();
            false
        });
        count
    }

    /// Apply a legal move in place
    pub fn play(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.board.is_legal(mv) {
            return Err(GameError::IllegalMove(self.to_uci(mv)));
        }
        self.board.play_unchecked(mv);
        self.moves.push(mv);
        Ok(())
    }

    /// The position after `mv`, leaving `self` untouched.
    pub fn after(&self, mv: Move) -> Result<Position, GameError> {
        let mut next = self.clone();
        next.play(mv)?;
        Ok(next)
    }

    pub fn status(&self) -> BoardStatus {
        match self.board.status() {
            GameStatus::Ongoing => BoardStatus::Ongoing,
            GameStatus::Won => BoardStatus::Checkmate,
            GameStatus::Drawn => BoardStatus::Draw,
        }
    }

    pub fn king(&self, color: PieceColor) -> Square {
        self.board.king(color.into())
    }

    /// Count `color`'s pieces standing on squares of `shade`.
    pub fn pieces_on_shade(&self, color: PieceColor, shade: SquareShade) -> usize {
        self.board
            .colors(color.into())
            .into_iter()
            .filter(|sq| SquareShade::of(*sq) == shade)
            .count()
    }

    /// Resolve a UCI token against the legal moves of this position,
    /// accepting both standard and king-takes-rook castling.
    pub fn resolve_token(&self, token: &str) -> Result<Move, GameError> {
        let parsed = parse_uci_move(token)?;
        let legal = self.legal_moves();
        let mv = convert_uci_castling_to_cozy(parsed, &legal);
        if legal.contains(&mv) {
            Ok(mv)
        } else {
            Err(GameError::IllegalMove(token.to_string()))
        }
    }

    /// Standard UCI token for a move in this position
    pub fn to_uci(&self, mv: Move) -> String {
        format_standard_uci(&self.board, mv)
    }

    /// Export position to FEN string
    pub fn to_fen(&self) -> String {
        self.board.to_string()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Invalid move token: {0}")]
    InvalidToken(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FOOLS_MATE: &str = "f2f3 e7e5 g2g4 d8h4";

    #[test]
    fn test_initial_position() {
        let position = Position::new();
        assert_eq!(position.ply(), 0);
        assert_eq!(position.side_to_move(), PieceColor::White);
        assert_eq!(position.legal_moves().len(), 20);
        assert_eq!(position.legal_move_count(), 20);
        assert_eq!(position.status(), BoardStatus::Ongoing);
    }

    #[test]
    fn test_replay_move_list() {
        let position = Position::from_move_list("e2e4 e7e5 g1f3").unwrap();
        assert_eq!(position.ply(), 3);
        assert_eq!(position.side_to_move(), PieceColor::Black);
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_empty_move_list_is_initial_position() {
        let position = Position::from_move_list("").unwrap();
        assert_eq!(position.ply(), 0);
        assert_eq!(position.to_fen(), Position::new().to_fen());
    }

    #[test]
    fn test_replay_detects_checkmate() {
        let position = Position::from_move_list(FOOLS_MATE).unwrap();
        assert_eq!(position.status(), BoardStatus::Checkmate);
        assert!(position.legal_moves().is_empty());
    }

    #[test]
    fn test_replay_rejects_illegal_move() {
        let err = Position::from_move_list("e2e4 e2e4").unwrap_err();
        assert_eq!(err, GameError::IllegalMove("e2e4".to_string()));
    }

    #[test]
    fn test_replay_rejects_malformed_token() {
        assert!(matches!(
            Position::from_move_list("e2e4 hello"),
            Err(GameError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_replay_accepts_standard_castling() {
        let position =
            Position::from_move_list("e2e4 e7e5 g1f3 b8c6 f1c4 f8c5 e1g1").unwrap();
        let king = position.king(PieceColor::White);
        assert_eq!(crate::format_square(king), "g1");
        let castle = *position.moves().last().unwrap();
        let before = Position::from_move_list("e2e4 e7e5 g1f3 b8c6 f1c4 f8c5").unwrap();
        assert_eq!(before.to_uci(castle), "e1g1");
    }

    #[test]
    fn test_after_leaves_original_untouched() {
        let position = Position::from_move_list("e2e4").unwrap();
        let fen = position.to_fen();
        for mv in position.legal_moves() {
            let next = position.after(mv).unwrap();
            assert_eq!(next.ply(), 2);
        }
        assert_eq!(position.to_fen(), fen);
        assert_eq!(position.ply(), 1);
    }

    #[test]
    fn test_pieces_on_shade_initial() {
        let position = Position::new();
        assert_eq!(position.pieces_on_shade(PieceColor::White, SquareShade::Light), 8);
        assert_eq!(position.pieces_on_shade(PieceColor::White, SquareShade::Dark), 8);
    }

    proptest! {
        #[test]
        fn replay_is_idempotent(choices in proptest::collection::vec(any::<u16>(), 0..60)) {
            let mut position = Position::new();
            let mut tokens = Vec::new();
            for choice in choices {
                let legal = position.legal_moves();
                if legal.is_empty() {
                    break;
                }
                let mv = legal[choice as usize % legal.len()];
                tokens.push(position.to_uci(mv));
                position.play(mv).unwrap();
            }

            let list = tokens.join(" ");
            let first = Position::from_move_list(&list).unwrap();
            let second = Position::from_move_list(&list).unwrap();

            prop_assert_eq!(first.to_fen(), second.to_fen());
            prop_assert_eq!(first.to_fen(), position.to_fen());
            prop_assert_eq!(first.side_to_move(), second.side_to_move());
            prop_assert_eq!(first.status(), second.status());
            prop_assert_eq!(first.side_to_move(), PieceColor::to_move_after(tokens.len()));
        }
    }
}
