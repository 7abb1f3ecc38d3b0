//! Board collaborator for the evaluator and transposition table.
//!
//! A bitboard position that knows where every piece is, hashes itself with
//! Zobrist keys, and makes/unmakes pseudo-legal moves exactly. Move
//! generation and legality are left to the search that drives it.
//!
//! # Example
//! ```
//! use nnue_tt::board::{Board, Move, Square};
//!
//! let mut board = Board::new();
//! let e2: Square = "e2".parse().unwrap();
//! let e4: Square = "e4".parse().unwrap();
//! let mv = Move::quiet(e2, e4);
//! let info = board.make_move(mv).unwrap();
//! board.unmake_move(mv, info);
//! assert_eq!(board.hash(), Board::new().hash());
//! ```

mod error;
mod fen;
mod make_unmake;
mod state;
mod types;

pub use error::{FenError, MoveError, SquareError};
pub use state::{Board, UnmakeInfo};
pub use types::{Bitboard, BitboardIter, Color, Move, Piece, Square};
