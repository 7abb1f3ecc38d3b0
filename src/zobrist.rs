//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes; the
//! transposition table splits them into a slot index and a verification tag.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    // piece_keys[piece_type][color][square_index]
    piece_keys: [[[u64; 64]; 2]; 6],
    pub(crate) black_to_move_key: u64,
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed so hashes are reproducible across runs.
        let mut rng = StdRng::seed_from_u64(1234567890_u64);
        let mut piece_keys = [[[0; 64]; 2]; 6];

        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move_key = rng.gen();

        ZobristKeys {
            piece_keys,
            black_to_move_key,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, piece: Piece, color: Color, sq: Square) -> u64 {
        self.piece_keys[piece.index()][color.index()][sq.index()]
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_distinct() {
        let a1 = Square::from_index(0);
        let a = ZOBRIST.piece(Piece::Rook, Color::White, a1);
        let b = ZOBRIST.piece(Piece::Rook, Color::Black, a1);
        let c = ZOBRIST.piece(Piece::Knight, Color::White, a1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, ZOBRIST.black_to_move_key);
    }
}
