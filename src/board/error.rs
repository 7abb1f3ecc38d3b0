//! Error types for board construction and parsing.

use thiserror::Error;

use super::types::{Move, Square};

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    /// FEN string has too few parts (needs at least placement and side to move)
    #[error("FEN must have at least 2 parts, found {found}")]
    TooFewParts { found: usize },
    #[error("Invalid piece character '{char}' in FEN")]
    InvalidPiece { char: char },
    #[error("Invalid side to move '{found}', expected 'w' or 'b'")]
    InvalidSideToMove { found: String },
    #[error("Invalid rank index {rank} in FEN")]
    InvalidRank { rank: usize },
    #[error("Too many files ({files}) in rank {rank}")]
    TooManyFiles { rank: usize, files: usize },
    /// Each side needs exactly one king for king-relative evaluation
    #[error("Expected exactly one {color} king, found {found}")]
    KingCount { color: crate::board::Color, found: u32 },
}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquareError {
    #[error("Square index {index} out of bounds (must be 0-63)")]
    IndexOutOfBounds { index: u8 },
    #[error("Invalid square notation '{notation}'")]
    InvalidNotation { notation: String },
}

/// Error type for moves the board cannot apply.
///
/// The board does not check legality, only that the move is physically
/// possible for the side to move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("No piece of the side to move on {square}")]
    EmptyOrigin { square: Square },
    #[error("Destination {square} holds a piece of the side to move")]
    Blocked { square: Square },
    #[error("Move {mv} would capture a king")]
    KingCapture { mv: Move },
    #[error("Castling move {mv} has no rook to move")]
    MissingRook { mv: Move },
    #[error("Castling move {mv} does not start from the king")]
    CastleWithoutKing { mv: Move },
    #[error("Castling move {mv} lands on an occupied square")]
    CastleBlocked { mv: Move },
    #[error("En passant move {mv} has no pawn to capture or an occupied destination")]
    InvalidEnPassant { mv: Move },
}
