//! Incrementally updated evaluator.
//!
//! The evaluator shadows a board: every make/unmake on the board is followed
//! by the matching call here, so the accumulator always equals the sum of
//! the weight rows of the pieces on the board.

use std::sync::Arc;

use crate::board::{Board, Color, Move, Piece, Square, UnmakeInfo};
use crate::logging::{log_debug, log_trace};

use super::accumulator::Accumulator;
use super::features::{KingSquares, INPUT_SIZE};
use super::network::{Network, L2_INPUT};
use super::{bucket_for, simd, LAYER1_SIZE};

/// Whether a move is being applied or taken back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateDirection {
    Forward,
    Reverse,
}

/// Feature changes caused by a non-king move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveUpdate {
    pub from: Square,
    pub to: Square,
    /// Piece that left the origin square
    pub piece: Piece,
    pub color: Color,
    /// Opponent piece removed by the move and the square it stood on
    pub captured: Option<(Piece, Square)>,
    /// Piece placed on the destination when it differs from `piece`
    pub promotion: Option<Piece>,
}

impl MoveUpdate {
    /// Describe `mv` played by `color`, using the undo record the board
    /// produced for it.
    #[must_use]
    pub fn new(mv: Move, color: Color, info: &UnmakeInfo) -> Self {
        MoveUpdate {
            from: mv.from(),
            to: mv.to(),
            piece: info.moved_piece(),
            color,
            captured: info.captured(),
            promotion: mv.promotion(),
        }
    }

    /// Piece standing on the destination after the move.
    #[inline]
    #[must_use]
    pub fn placed(&self) -> Piece {
        self.promotion.unwrap_or(self.piece)
    }
}

/// NNUE evaluator: shared immutable weights plus one exclusive accumulator.
#[derive(Clone)]
pub struct Evaluator {
    network: Arc<Network>,
    accumulator: Accumulator,
    side_to_move: Color,
}

impl Evaluator {
    /// An evaluator for an empty board.
    #[must_use]
    pub fn new(network: Arc<Network>, side_to_move: Color) -> Self {
        Evaluator {
            network,
            accumulator: Accumulator::default(),
            side_to_move,
        }
    }

    /// An evaluator synchronized with `board`.
    #[must_use]
    pub fn from_board(network: Arc<Network>, board: &Board) -> Self {
        let mut evaluator = Self::new(network, board.side_to_move());
        evaluator.refresh(board);
        evaluator
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Turn one feature on, given its white-POV and black-POV indices.
    #[inline]
    pub fn add(&mut self, white_idx: usize, black_idx: usize) {
        debug_assert!(white_idx < INPUT_SIZE && black_idx < INPUT_SIZE);
        self.accumulator.add_feature(white_idx, black_idx, &self.network);
    }

    /// Turn one feature off.
    #[inline]
    pub fn subtract(&mut self, white_idx: usize, black_idx: usize) {
        debug_assert!(white_idx < INPUT_SIZE && black_idx < INPUT_SIZE);
        self.accumulator.sub_feature(white_idx, black_idx, &self.network);
    }

    /// Rebuild the accumulator from every piece on `board`, anchored at
    /// `kings`.
    pub fn reset(&mut self, kings: KingSquares, board: &Board) {
        self.accumulator.clear();
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in board.pieces(piece, color) {
                    let (w, b) = kings.feature(sq, piece, color);
                    self.add(w, b);
                }
            }
        }
    }

    /// `reset` at the board's own king squares, taking its side to move.
    pub fn refresh(&mut self, board: &Board) {
        self.reset(KingSquares::of(board), board);
        self.side_to_move = board.side_to_move();
        log_debug!("accumulator refreshed ({} pieces)", board.piece_count());
    }

    /// Apply or take back the feature changes of a non-king move.
    ///
    /// `Reverse` performs the exact inverse sequence of `Forward`, so a
    /// forward/reverse pair leaves the accumulator bit-identical.
    pub fn update_non_king_move(&mut self, update: &MoveUpdate, kings: KingSquares, direction: UpdateDirection) {
        debug_assert!(update.piece != Piece::King);
        let origin = kings.feature(update.from, update.piece, update.color);
        let dest = kings.feature(update.to, update.placed(), update.color);
        let victim = update
            .captured
            .map(|(piece, sq)| kings.feature(sq, piece, update.color.opponent()));

        match direction {
            UpdateDirection::Forward => {
                self.subtract(origin.0, origin.1);
                self.add(dest.0, dest.1);
                if let Some((w, b)) = victim {
                    self.subtract(w, b);
                }
            }
            UpdateDirection::Reverse => {
                if let Some((w, b)) = victim {
                    self.add(w, b);
                }
                self.subtract(dest.0, dest.1);
                self.add(origin.0, origin.1);
            }
        }
    }

    /// Follow `board.make_move(mv)`. `board` is the position after the move.
    ///
    /// King moves (castling included) rebuild from scratch since every
    /// feature is anchored on the king square.
    pub fn make_move(&mut self, board: &Board, mv: Move, info: &UnmakeInfo) {
        if info.moved_piece() == Piece::King {
            log_trace!("king move {}, refreshing", mv);
            self.refresh(board);
            return;
        }
        let mover = board.side_to_move().opponent();
        let update = MoveUpdate::new(mv, mover, info);
        self.update_non_king_move(&update, KingSquares::of(board), UpdateDirection::Forward);
        self.side_to_move = board.side_to_move();
    }

    /// Follow `board.unmake_move(mv, info)`. `board` is the position after
    /// the move has been taken back.
    pub fn unmake_move(&mut self, board: &Board, mv: Move, info: &UnmakeInfo) {
        if info.moved_piece() == Piece::King {
            log_trace!("king move {} taken back, refreshing", mv);
            self.refresh(board);
            return;
        }
        let mover = board.side_to_move();
        let update = MoveUpdate::new(mv, mover, info);
        self.update_non_king_move(&update, KingSquares::of(board), UpdateDirection::Reverse);
        self.side_to_move = mover;
    }

    /// Score the current position from the side to move's point of view.
    ///
    /// `piece_count` (kings included, at least 1) selects the material
    /// bucket.
    #[must_use]
    pub fn evaluate(&self, piece_count: usize) -> i32 {
        let bucket = bucket_for(piece_count);
        let us = self.side_to_move;
        let (our_acc, our_psqt) = self.accumulator.perspective(us);
        let (their_acc, their_psqt) = self.accumulator.perspective(us.opponent());
        let bias = self.network.feature_bias();

        let mut ours = [0i8; LAYER1_SIZE];
        let mut theirs = [0i8; LAYER1_SIZE];
        simd::bias_relu_pack(our_acc, bias, &mut ours);
        simd::bias_relu_pack(their_acc, bias, &mut theirs);

        // Side to move first.
        let mut input = [0i8; L2_INPUT];
        input[..LAYER1_SIZE].copy_from_slice(&ours);
        input[LAYER1_SIZE..].copy_from_slice(&theirs);

        let psqt = our_psqt[bucket].saturating_sub(their_psqt[bucket]);
        let network = self.network.stack(bucket).propagate(&input);
        network.saturating_add(psqt)
    }
}
