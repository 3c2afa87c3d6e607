//! UCI (Universal Chess Interface) move tokens

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::game::GameError;
use crate::types::PieceKind;

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// This function checks if the move is a castling move and converts it to the
/// appropriate cozy_chess format by finding the matching legal move.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let target_square = match (mv.from.rank(), mv.to.file()) {
            (Rank::First, File::G) => Square::new(File::H, Rank::First),
            (Rank::First, File::C) => Square::new(File::A, Rank::First),
            (Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
            (Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
            _ => return mv,
        };

        let converted = Move {
            from: mv.from,
            to: target_square,
            promotion: None,
        };

        // Only a king on e1/e8 has the converted move in its legal set
        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Format a move as cozy-chess sees it (castling as king-takes-rook).
pub fn format_uci_move(mv: Move) -> String {
    let mut s = format!("{}{}", format_square(mv.from), format_square(mv.to));
    if let Some(promo) = mv.promotion {
        s.push(PieceKind::from(promo).to_char_lower());
    }
    s
}

/// Format a move in standard UCI as the game server expects it (castling as
/// the king moving two squares, e.g. "e1g1").
pub fn format_standard_uci(board: &Board, mv: Move) -> String {
    let mover = board.side_to_move();
    let is_castle = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(mover)
        && board.piece_on(mv.to) == Some(Piece::Rook);

    if is_castle {
        let king_file = if (mv.to.file() as usize) > (mv.from.file() as usize) {
            File::G
        } else {
            File::C
        };
        return format_uci_move(Move {
            from: mv.from,
            to: Square::new(king_file, mv.from.rank()),
            promotion: None,
        });
    }

    format_uci_move(mv)
}

/// Parse a UCI move token (e2e4, e7e8q). The result is not checked for legality.
pub fn parse_uci_move(s: &str) -> Result<Move, GameError> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return Err(GameError::InvalidToken(s.to_string()));
    }

    let from = parse_square(&s[0..2]).ok_or_else(|| GameError::InvalidToken(s.to_string()))?;
    let to = parse_square(&s[2..4]).ok_or_else(|| GameError::InvalidToken(s.to_string()))?;

    let promotion = match s[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some(kind) if kind.is_promotion_target() => Some(Piece::from(kind)),
            _ => return Err(GameError::InvalidToken(s.to_string())),
        },
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();

    let file = match chars.next()? {
        'a' => File::A,
        'b' => File::B,
        'c' => File::C,
        'd' => File::D,
        'e' => File::E,
        'f' => File::F,
        'g' => File::G,
        'h' => File::H,
        _ => return None,
    };

    let rank = match chars.next()? {
        '1' => Rank::First,
        '2' => Rank::Second,
        '3' => Rank::Third,
        '4' => Rank::Fourth,
        '5' => Rank::Fifth,
        '6' => Rank::Sixth,
        '7' => Rank::Seventh,
        '8' => Rank::Eighth,
        _ => return None,
    };

    Some(Square::new(file, rank))
}

pub fn format_square(sq: Square) -> String {
    let file = match sq.file() {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    };
    let rank = match sq.rank() {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    };
    format!("{}{}", file, rank)
}
