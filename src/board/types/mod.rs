//! Core chess types.
//!
//! - `Piece` and `Color` - chess piece types and colors
//! - `Square` - board square as an index 0-63
//! - `Bitboard` - 64-bit square set
//! - `Move` - packed 16-bit move

mod bitboard;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use moves::Move;
pub use piece::{Color, Piece};
pub use square::Square;
