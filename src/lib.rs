//! Evaluation and result-caching core of a chess engine.
//!
//! - [`nnue`]: a quantized, incrementally updated neural evaluator
//! - [`tt`]: a direct-mapped transposition table
//! - [`board`]: the minimal position type both are exercised against
//!
//! ```no_run
//! use nnue_tt::{Board, CoreConfig, Evaluator};
//!
//! # fn main() -> Result<(), nnue_tt::ConfigError> {
//! let config = CoreConfig {
//!     network_path: Some("main.nnue".into()),
//!     ..CoreConfig::default()
//! };
//! let network = config.load_network()?;
//! let mut table = config.build_table()?;
//!
//! let board = Board::new();
//! let evaluator = Evaluator::from_board(network, &board);
//! let score = evaluator.evaluate(board.piece_count());
//! table.put(board.hash(), nnue_tt::Move::null(), score as i16, nnue_tt::NodeType::Exact, 0);
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod config;
mod logging;
pub mod nnue;
pub mod tt;
mod zobrist;

pub use board::{Board, Color, Move, Piece, Square};
pub use config::{ConfigError, CoreConfig};
pub use nnue::{Evaluator, Network, NetworkError};
pub use tt::{NodeType, Position, TableConfig, TableEntry, TranspositionTable};
