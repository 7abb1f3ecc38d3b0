use crate::zobrist::ZOBRIST;

use super::{Bitboard, Color, Move, Piece, Square};

/// What `unmake_move` needs to restore the position a move came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnmakeInfo {
    pub(crate) moved: Piece,
    pub(crate) captured: Option<(Piece, Square)>,
    pub(crate) previous_hash: u64,
}

impl UnmakeInfo {
    /// The piece type that left the origin square (a pawn for promotions).
    #[must_use]
    pub fn moved_piece(&self) -> Piece {
        self.moved
    }

    /// The captured piece and the square it stood on (differs from the
    /// destination only for en passant).
    #[must_use]
    pub fn captured(&self) -> Option<(Piece, Square)> {
        self.captured
    }
}

/// Bitboard position with a Zobrist hash covering pieces and side to move.
///
/// Castling rights, en passant targets and move clocks are not tracked; the
/// board applies whatever pseudo-legal move it is handed.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) side_to_move: Color,
    pub(crate) hash: u64,
    /// Moves played through `Position::play`, newest last.
    pub(crate) history: Vec<(Move, UnmakeInfo)>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position, White to move.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in (0u8..).zip(back_rank) {
            board.set_piece(Square::from_index(file), Color::White, piece);
            board.set_piece(Square::from_index(56 + file), Color::Black, piece);
            board.set_piece(Square::from_index(8 + file), Color::White, Piece::Pawn);
            board.set_piece(Square::from_index(48 + file), Color::Black, Piece::Pawn);
        }
        board.hash = board.calculate_hash();
        board
    }

    /// A board with no pieces, White to move.
    #[must_use]
    pub fn empty() -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            hash: 0,
            history: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Squares occupied by `piece` of `color`.
    #[inline]
    #[must_use]
    pub fn pieces(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// Total number of pieces on the board, kings included.
    #[inline]
    #[must_use]
    pub fn piece_count(&self) -> usize {
        (self.occupied[0].popcount() + self.occupied[1].popcount()) as usize
    }

    /// Square of `color`'s king. Boards built through `new` or `from_fen`
    /// always have exactly one king per side.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(Piece::King, color)
            .iter()
            .next()
            .unwrap_or(Square::from_index(color.back_rank() * 8 + 4))
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let color = Color::BOTH
            .into_iter()
            .find(|c| self.occupied[c.index()].contains(sq))?;
        let piece = Piece::ALL
            .into_iter()
            .find(|p| self.pieces[color.index()][p.index()].contains(sq))?;
        Some((color, piece))
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = Bitboard::from_square(sq).0;
        self.pieces[color.index()][piece.index()].0 |= bit;
        self.occupied[color.index()].0 |= bit;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = Bitboard::from_square(sq).0;
        self.pieces[color.index()][piece.index()].0 &= !bit;
        self.occupied[color.index()].0 &= !bit;
    }

    /// Recompute the hash from scratch.
    #[must_use]
    pub fn calculate_hash(&self) -> u64 {
        let mut hash = 0;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.pieces(piece, color) {
                    hash ^= ZOBRIST.piece(piece, color, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move_key;
        }
        hash
    }
}
