//! King-relative (HalfKA) feature indexing.
//!
//! Every (king square, piece square, piece type, piece color) tuple maps to
//! one row of the first-layer and PSQT weight matrices, separately for
//! each perspective.

use crate::board::{Board, Color, Piece, Square};

/// Rows per king square: 12 piece planes of 64 squares plus one spare.
pub const KING_STRIDE: usize = 64 * 12 + 1;

/// Rows in the first-layer and PSQT weight matrices. Row 0 is never used.
pub const INPUT_SIZE: usize = 1 + 64 * KING_STRIDE;

/// Feature index for a piece as seen from `pov`.
///
/// Black's perspective flips the piece square vertically; the king square
/// is used as-is for both perspectives. The piece plane distinguishes
/// "mine" (same color as `pov`) from "theirs".
#[inline]
#[must_use]
pub fn halfka_index(pov: Color, king_sq: Square, sq: Square, piece: Piece, color: Color) -> usize {
    let oriented_sq = match pov {
        Color::White => sq,
        Color::Black => sq.flip_vertical(),
    };
    let color_offset = usize::from(color != pov);
    let plane = piece.index() * 2 + color_offset;
    1 + oriented_sq.index() + plane * 64 + king_sq.index() * KING_STRIDE
}

/// King squares the two perspectives are anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KingSquares {
    pub white: Square,
    pub black: Square,
}

impl KingSquares {
    #[must_use]
    pub fn of(board: &Board) -> Self {
        KingSquares {
            white: board.king_square(Color::White),
            black: board.king_square(Color::Black),
        }
    }

    /// White-POV and black-POV indices for one piece.
    #[inline]
    #[must_use]
    pub fn feature(self, sq: Square, piece: Piece, color: Color) -> (usize, usize) {
        (
            halfka_index(Color::White, self.white, sq, piece, color),
            halfka_index(Color::Black, self.black, sq, piece, color),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_known_index_white_rook_h1() {
        // White POV, king e1 (4), rook h1 (7), own piece: plane 3*2+0 = 6.
        let idx = halfka_index(Color::White, sq("e1"), sq("h1"), Piece::Rook, Color::White);
        assert_eq!(idx, 1 + 7 + 6 * 64 + 4 * KING_STRIDE);

        // Black POV, king e8 (60), h1 flips to h8 (63), their piece: plane 7.
        let idx = halfka_index(Color::Black, sq("e8"), sq("h1"), Piece::Rook, Color::White);
        assert_eq!(idx, 1 + 63 + 7 * 64 + 60 * KING_STRIDE);
    }

    #[test]
    fn test_index_never_zero_and_in_range() {
        let max = halfka_index(Color::White, sq("h8"), sq("h8"), Piece::King, Color::Black);
        assert!(max < INPUT_SIZE);
        let min = halfka_index(Color::White, sq("a1"), sq("a1"), Piece::Pawn, Color::White);
        assert_eq!(min, 1);
    }

    #[test]
    fn test_injective_per_perspective() {
        for pov in Color::BOTH {
            let mut seen = HashSet::new();
            for king in 0..64u8 {
                for square in 0..64u8 {
                    for piece in Piece::ALL {
                        for color in Color::BOTH {
                            let idx = halfka_index(
                                pov,
                                Square::from_index(king),
                                Square::from_index(square),
                                piece,
                                color,
                            );
                            assert!(idx > 0 && idx < INPUT_SIZE);
                            assert!(seen.insert(idx), "duplicate index {idx}");
                        }
                    }
                }
            }
            assert_eq!(seen.len(), 64 * 64 * 12);
        }
    }

    #[test]
    fn test_perspectives_mirror_colors() {
        // A white pawn on e2 seen by White is the same plane as a black
        // pawn on e7 seen by Black, given the same king square.
        let king = sq("d4");
        let white_view = halfka_index(Color::White, king, sq("e2"), Piece::Pawn, Color::White);
        let black_view = halfka_index(Color::Black, king, sq("e7"), Piece::Pawn, Color::Black);
        assert_eq!(white_view, black_view);
    }

    #[test]
    fn test_king_squares_of_board() {
        let kings = KingSquares::of(&Board::new());
        assert_eq!(kings.white, sq("e1"));
        assert_eq!(kings.black, sq("e8"));
        let (w, b) = kings.feature(sq("a1"), Piece::Rook, Color::White);
        assert_eq!(w, halfka_index(Color::White, sq("e1"), sq("a1"), Piece::Rook, Color::White));
        assert_eq!(b, halfka_index(Color::Black, sq("e8"), sq("a1"), Piece::Rook, Color::White));
    }
}
