//! Piece, color and square-shade types exposed by this crate.
//! cozy-chess types stay behind the `Position` API.

use cozy_chess::{Color, Piece, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    White,
    Black,
}

/// Shade of a board square. a1 is dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareShade {
    Light,
    Dark,
}

/// Each kind with its cozy-chess piece and its lowercase UCI letter.
const PIECES: [(PieceKind, Piece, char); 6] = [
    (PieceKind::Pawn, Piece::Pawn, 'p'),
    (PieceKind::Knight, Piece::Knight, 'n'),
    (PieceKind::Bishop, Piece::Bishop, 'b'),
    (PieceKind::Rook, Piece::Rook, 'r'),
    (PieceKind::Queen, Piece::Queen, 'q'),
    (PieceKind::King, Piece::King, 'k'),
];

impl PieceKind {
    fn entry(self) -> (PieceKind, Piece, char) {
        PIECES[self as usize]
    }

    pub fn to_char_lower(self) -> char {
        self.entry().2
    }

    /// Case-insensitive letter lookup.
    pub fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        PIECES
            .iter()
            .find(|(_, _, letter)| *letter == c)
            .map(|(kind, _, _)| *kind)
    }

    /// Kinds a pawn may promote to.
    pub fn is_promotion_target(self) -> bool {
        !matches!(self, Self::Pawn | Self::King)
    }
}

impl From<Piece> for PieceKind {
    fn from(piece: Piece) -> Self {
        PIECES[piece as usize].0
    }
}

impl From<PieceKind> for Piece {
    fn from(kind: PieceKind) -> Self {
        kind.entry().1
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Side to move after `ply` half-moves from the initial position.
    pub fn to_move_after(ply: usize) -> Self {
        if ply % 2 == 0 {
            Self::White
        } else {
            Self::Black
        }
    }
}

impl From<Color> for PieceColor {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

impl From<PieceColor> for Color {
    fn from(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Color::White,
            PieceColor::Black => Color::Black,
        }
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SquareShade {
    pub fn of(square: Square) -> Self {
        if (square.file() as usize + square.rank() as usize) % 2 == 0 {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// The shade conventionally paired with a piece color (white on light).
    pub fn for_color(color: PieceColor) -> Self {
        match color {
            PieceColor::White => Self::Light,
            PieceColor::Black => Self::Dark,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::fmt::Display for SquareShade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozy_chess::{File, Rank};

    #[test]
    fn test_square_shades() {
        assert_eq!(SquareShade::of(Square::new(File::A, Rank::First)), SquareShade::Dark);
        assert_eq!(SquareShade::of(Square::new(File::H, Rank::First)), SquareShade::Light);
        assert_eq!(SquareShade::of(Square::new(File::D, Rank::First)), SquareShade::Light);
        assert_eq!(SquareShade::of(Square::new(File::E, Rank::First)), SquareShade::Dark);
        assert_eq!(SquareShade::of(Square::new(File::H, Rank::Eighth)), SquareShade::Dark);
    }

    #[test]
    fn test_to_move_after_parity() {
        assert_eq!(PieceColor::to_move_after(0), PieceColor::White);
        assert_eq!(PieceColor::to_move_after(1), PieceColor::Black);
        assert_eq!(PieceColor::to_move_after(40), PieceColor::White);
    }

    #[test]
    fn test_piece_table_matches_cozy_order() {
        for piece in Piece::ALL {
            assert_eq!(Piece::from(PieceKind::from(piece)), piece);
        }
        assert_eq!(PieceKind::from_char('N'), Some(PieceKind::Knight));
        assert_eq!(PieceKind::from_char('x'), None);
        assert!(PieceKind::Queen.is_promotion_target());
        assert!(!PieceKind::King.is_promotion_target());
    }
}
