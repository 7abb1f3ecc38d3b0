use super::error::FenError;
use super::{Board, Color, Piece, Square};

impl Board {
    /// Parse a board position from FEN notation.
    ///
    /// Only the placement and side-to-move fields are used; castling, en
    /// passant and clock fields are accepted and ignored.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 2 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::InvalidRank { rank: rank_idx });
            }
            let rank = 7 - rank_idx as u8;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let color = if c.is_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                board.set_piece(Square::from_index(rank * 8 + file as u8), color, piece);
                file += 1;
            }
            if file > 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for color in Color::BOTH {
            let found = board.pieces(Piece::King, color).popcount();
            if found != 1 {
                return Err(FenError::KingCount { color, found });
            }
        }

        board.hash = board.calculate_hash();
        Ok(board)
    }

    /// Placement and side-to-move fields, with empty castling/en passant fields.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(Square::from_index(rank * 8 + file)) {
                    Some((color, piece)) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push_str(match self.side_to_move {
            Color::White => " w - - 0 1",
            Color::Black => " b - - 0 1",
        });
        fen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

    #[test]
    fn test_start_fen_matches_new() {
        let parsed = Board::from_fen(START).unwrap();
        let fresh = Board::new();
        assert_eq!(parsed.hash(), fresh.hash());
        assert_eq!(fresh.to_fen(), START);
    }

    #[test]
    fn test_fen_roundtrip_black_to_move() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R b - - 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn test_fen_errors() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/8").unwrap_err(),
            FenError::TooFewParts { found: 1 }
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4X3 w").unwrap_err(),
            FenError::InvalidPiece { char: 'X' }
        );
        assert_eq!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 x").unwrap_err(),
            FenError::InvalidSideToMove {
                found: "x".to_string()
            }
        );
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/4K3 w").unwrap_err(),
            FenError::KingCount {
                color: Color::Black,
                found: 0
            }
        );
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3P w").unwrap_err(),
            FenError::TooManyFiles { .. }
        ));
    }
}
