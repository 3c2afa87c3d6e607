//! Rules-engine binding for the bot.
//!
//! Wraps cozy-chess so the rest of the workspace only deals with positions
//! rebuilt from server move lists, legal-move enumeration and UCI tokens.

pub mod game;
pub mod types;
pub mod uci;

pub use cozy_chess::{Move, Square};
pub use game::{BoardStatus, GameError, Position};
pub use types::{PieceColor, PieceKind, SquareShade};
pub use uci::{
    convert_uci_castling_to_cozy, format_square, format_standard_uci, format_uci_move,
    parse_uci_move,
};
