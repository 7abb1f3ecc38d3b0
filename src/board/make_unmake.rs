use crate::zobrist::ZOBRIST;

use super::error::MoveError;
use super::{Board, Color, Move, Piece, Square, UnmakeInfo};

/// Rook origin and destination for a castling move landing on `king_to`.
fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    let base = king_to.rank() * 8;
    if king_to.file() == 6 {
        (Square::from_index(base + 7), Square::from_index(base + 5))
    } else {
        (Square::from_index(base), Square::from_index(base + 3))
    }
}

impl Board {
    /// Apply `m` for the side to move.
    ///
    /// All checks happen before the board is touched, so an `Err` leaves
    /// the position unchanged.
    pub fn make_move(&mut self, m: Move) -> Result<UnmakeInfo, MoveError> {
        let color = self.side_to_move;
        let (from, to) = (m.from(), m.to());

        let moving = match self.piece_at(from) {
            Some((c, piece)) if c == color => piece,
            _ => return Err(MoveError::EmptyOrigin { square: from }),
        };

        let previous_hash = self.hash;
        let mut hash = self.hash ^ ZOBRIST.black_to_move_key;

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            if moving != Piece::King {
                return Err(MoveError::CastleWithoutKing { mv: m });
            }
            if self.piece_at(rook_from) != Some((color, Piece::Rook)) {
                return Err(MoveError::MissingRook { mv: m });
            }
            if to == rook_to || self.piece_at(to).is_some() || self.piece_at(rook_to).is_some() {
                return Err(MoveError::CastleBlocked { mv: m });
            }
            self.remove_piece(from, color, Piece::King);
            self.set_piece(to, color, Piece::King);
            self.remove_piece(rook_from, color, Piece::Rook);
            self.set_piece(rook_to, color, Piece::Rook);
            hash ^= ZOBRIST.piece(Piece::King, color, from)
                ^ ZOBRIST.piece(Piece::King, color, to)
                ^ ZOBRIST.piece(Piece::Rook, color, rook_from)
                ^ ZOBRIST.piece(Piece::Rook, color, rook_to);

            self.side_to_move = color.opponent();
            self.hash = hash;
            return Ok(UnmakeInfo {
                moved: Piece::King,
                captured: None,
                previous_hash,
            });
        }

        let capture_sq = if m.is_en_passant() {
            let behind = Square::from_index(from.rank() * 8 + to.file());
            let them = color.opponent();
            if moving != Piece::Pawn
                || self.piece_at(to).is_some()
                || self.piece_at(behind) != Some((them, Piece::Pawn))
            {
                return Err(MoveError::InvalidEnPassant { mv: m });
            }
            behind
        } else {
            to
        };
        let captured = match self.piece_at(capture_sq) {
            Some((c, _)) if c == color => return Err(MoveError::Blocked { square: to }),
            Some((_, Piece::King)) => return Err(MoveError::KingCapture { mv: m }),
            Some((_, piece)) => Some((piece, capture_sq)),
            None => None,
        };

        if let Some((piece, sq)) = captured {
            let them = color.opponent();
            self.remove_piece(sq, them, piece);
            hash ^= ZOBRIST.piece(piece, them, sq);
        }

        let placed = m.promotion().unwrap_or(moving);
        self.remove_piece(from, color, moving);
        self.set_piece(to, color, placed);
        hash ^= ZOBRIST.piece(moving, color, from) ^ ZOBRIST.piece(placed, color, to);

        self.side_to_move = color.opponent();
        self.hash = hash;

        Ok(UnmakeInfo {
            moved: moving,
            captured,
            previous_hash,
        })
    }

    /// Take back `m`, which must be the last move made with `info`.
    pub fn unmake_move(&mut self, m: Move, info: UnmakeInfo) {
        let color = self.side_to_move.opponent();
        let (from, to) = (m.from(), m.to());

        if m.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            self.remove_piece(to, color, Piece::King);
            self.set_piece(from, color, Piece::King);
            self.remove_piece(rook_to, color, Piece::Rook);
            self.set_piece(rook_from, color, Piece::Rook);
        } else {
            let placed = m.promotion().unwrap_or(info.moved);
            self.remove_piece(to, color, placed);
            self.set_piece(from, color, info.moved);
            if let Some((piece, sq)) = info.captured {
                self.set_piece(sq, color.opponent(), piece);
            }
        }

        self.side_to_move = color;
        self.hash = info.previous_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_quiet_move_roundtrip() {
        let mut board = Board::new();
        let start_hash = board.hash();
        let mv = Move::quiet(sq("g1"), sq("f3"));

        let info = board.make_move(mv).unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.piece_at(sq("f3")), Some((Color::White, Piece::Knight)));
        assert_eq!(board.hash(), board.calculate_hash());
        assert_ne!(board.hash(), start_hash);

        board.unmake_move(mv, info);
        assert_eq!(board.hash(), start_hash);
        assert_eq!(board.piece_at(sq("g1")), Some((Color::White, Piece::Knight)));
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn test_capture_records_victim() {
        let mut board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mv = Move::capture(sq("e4"), sq("d5"));
        let info = board.make_move(mv).unwrap();
        assert_eq!(info.captured(), Some((Piece::Pawn, sq("d5"))));
        assert_eq!(board.piece_count(), 3);
        assert_eq!(board.hash(), board.calculate_hash());

        board.unmake_move(mv, info);
        assert_eq!(board.piece_at(sq("d5")), Some((Color::Black, Piece::Pawn)));
        assert_eq!(board.piece_count(), 4);
    }

    #[test]
    fn test_en_passant_removes_pawn_behind() {
        let mut board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let mv = Move::en_passant(sq("e5"), sq("d6"));
        let info = board.make_move(mv).unwrap();
        assert_eq!(info.captured(), Some((Piece::Pawn, sq("d5"))));
        assert_eq!(board.piece_at(sq("d5")), None);
        assert_eq!(board.hash(), board.calculate_hash());

        board.unmake_move(mv, info);
        assert_eq!(board.piece_at(sq("d5")), Some((Color::Black, Piece::Pawn)));
        assert_eq!(board.piece_at(sq("e5")), Some((Color::White, Piece::Pawn)));
    }

    #[test]
    fn test_promotion_roundtrip() {
        let mut board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let start_hash = board.hash();
        let mv = Move::new_promotion_capture(sq("a7"), sq("b8"), Piece::Queen);
        let info = board.make_move(mv).unwrap();
        assert_eq!(info.moved_piece(), Piece::Pawn);
        assert_eq!(board.piece_at(sq("b8")), Some((Color::White, Piece::Queen)));
        assert_eq!(board.hash(), board.calculate_hash());

        board.unmake_move(mv, info);
        assert_eq!(board.hash(), start_hash);
        assert_eq!(board.piece_at(sq("a7")), Some((Color::White, Piece::Pawn)));
        assert_eq!(board.piece_at(sq("b8")), Some((Color::Black, Piece::Knight)));
    }

    #[test]
    fn test_castling_moves_rook() {
        let mut board = Board::from_fen("r3k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mv = Move::castle_kingside(sq("e1"), sq("g1"));
        let info = board.make_move(mv).unwrap();
        assert_eq!(board.king_square(Color::White), sq("g1"));
        assert_eq!(board.piece_at(sq("f1")), Some((Color::White, Piece::Rook)));
        assert_eq!(board.hash(), board.calculate_hash());
        board.unmake_move(mv, info);
        assert_eq!(board.piece_at(sq("h1")), Some((Color::White, Piece::Rook)));

        board.make_move(Move::quiet(sq("e1"), sq("e2"))).unwrap();
        let long = Move::castle_queenside(sq("e8"), sq("c8"));
        board.make_move(long).unwrap();
        assert_eq!(board.piece_at(sq("d8")), Some((Color::Black, Piece::Rook)));
    }

    #[test]
    fn test_rejected_moves_leave_board_untouched() {
        let mut board = Board::new();
        let hash = board.hash();
        assert_eq!(
            board.make_move(Move::quiet(sq("e7"), sq("e5"))),
            Err(MoveError::EmptyOrigin { square: sq("e7") })
        );
        assert_eq!(
            board.make_move(Move::quiet(sq("a1"), sq("a2"))),
            Err(MoveError::Blocked { square: sq("a2") })
        );
        assert_eq!(board.hash(), hash);

        let mut no_rook = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let castle = Move::castle_kingside(sq("e1"), sq("g1"));
        assert_eq!(
            no_rook.make_move(castle),
            Err(MoveError::MissingRook { mv: castle })
        );

        let mut start = Board::new();
        let stale_castle = Move::castle_kingside(sq("e1"), sq("g1"));
        assert_eq!(
            start.make_move(stale_castle),
            Err(MoveError::CastleBlocked { mv: stale_castle })
        );
        let rook_castle = Move::castle_kingside(sq("h1"), sq("g1"));
        assert_eq!(
            start.make_move(rook_castle),
            Err(MoveError::CastleWithoutKing { mv: rook_castle })
        );
        assert_eq!(start.to_fen(), Board::new().to_fen());

        // King and rook would share d1.
        let mut open = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let onto_rook_square = Move::castle_queenside(sq("e1"), sq("d1"));
        assert_eq!(
            open.make_move(onto_rook_square),
            Err(MoveError::CastleBlocked { mv: onto_rook_square })
        );
        assert_eq!(open.piece_count(), 3);

        let take_king = Move::capture(sq("e8"), sq("e1"));
        let mut black = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(
            black.make_move(take_king),
            Err(MoveError::KingCapture { mv: take_king })
        );
    }

    #[test]
    fn test_en_passant_rejects_bad_targets() {
        // Destination occupied.
        let mut occupied = Board::from_fen("4k3/8/3n4/3pP3/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = Move::en_passant(sq("e5"), sq("d6"));
        assert_eq!(occupied.make_move(mv), Err(MoveError::InvalidEnPassant { mv }));
        assert_eq!(occupied.piece_count(), 4);
        assert_eq!(occupied.hash(), occupied.calculate_hash());

        // No pawn to capture behind the destination.
        let mut no_pawn = Board::from_fen("4k3/8/8/3nP3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(no_pawn.make_move(mv), Err(MoveError::InvalidEnPassant { mv }));
        let mut empty = Board::from_fen("4k3/8/8/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(empty.make_move(mv), Err(MoveError::InvalidEnPassant { mv }));

        // Only pawns capture en passant.
        let mut knight = Board::from_fen("4k3/8/8/3pN3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(knight.make_move(mv), Err(MoveError::InvalidEnPassant { mv }));
    }
}
