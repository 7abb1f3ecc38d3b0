//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use nnue_tt::board::{Board, Color, Move, Piece, Square};
use nnue_tt::nnue::{Network, BUCKETS, INPUT_SIZE, LAYER1_SIZE, LAYER2_SIZE, LAYER3_SIZE, NETWORK_BYTES, PSQT_LANES};
use once_cell::sync::Lazy;
use rand::prelude::*;

fn push_i16s(out: &mut Vec<u8>, rng: &mut StdRng, count: usize, lo: i16, hi: i16) {
    for _ in 0..count {
        out.extend(rng.gen_range(lo..=hi).to_le_bytes());
    }
}

fn push_i32s(out: &mut Vec<u8>, rng: &mut StdRng, count: usize, lo: i32, hi: i32) {
    for _ in 0..count {
        out.extend(rng.gen_range(lo..=hi).to_le_bytes());
    }
}

fn push_i8s(out: &mut Vec<u8>, rng: &mut StdRng, count: usize, lo: i8, hi: i8) {
    for _ in 0..count {
        out.push(rng.gen_range(lo..=hi) as u8);
    }
}

/// A complete weight buffer of small random values, deterministic per seed.
pub fn random_weight_bytes(seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(NETWORK_BYTES);

    push_i16s(&mut out, &mut rng, INPUT_SIZE * LAYER1_SIZE, -48, 48);
    push_i32s(&mut out, &mut rng, INPUT_SIZE * PSQT_LANES, -300, 300);
    push_i16s(&mut out, &mut rng, LAYER1_SIZE, -16, 64);
    for _ in 0..BUCKETS {
        push_i8s(&mut out, &mut rng, 2 * LAYER1_SIZE * LAYER2_SIZE, -4, 4);
        push_i32s(&mut out, &mut rng, LAYER2_SIZE, -200, 200);
        push_i8s(&mut out, &mut rng, LAYER2_SIZE * LAYER3_SIZE, -8, 8);
        push_i32s(&mut out, &mut rng, LAYER3_SIZE, -100, 100);
        push_i8s(&mut out, &mut rng, LAYER3_SIZE, -16, 16);
        push_i32s(&mut out, &mut rng, 1, -50, 50);
    }

    assert_eq!(out.len(), NETWORK_BYTES);
    out
}

static NETWORK: Lazy<Arc<Network>> = Lazy::new(|| {
    let bytes = random_weight_bytes(0xC0FFEE);
    Arc::new(Network::from_bytes(&bytes).expect("synthesized buffer has the full length"))
});

/// One network per test binary, parsed from a synthesized weight buffer.
pub fn shared_network() -> Arc<Network> {
    Arc::clone(&NETWORK)
}

/// A random pseudo-legal move for the side to move.
///
/// Any own non-king piece or the king may jump to any square that is not
/// occupied by an own piece or the enemy king. Pawns reaching the far rank
/// promote. Enough to exercise every feature-update path without move
/// generation.
pub fn random_move(board: &Board, rng: &mut StdRng) -> Move {
    let us = board.side_to_move();
    let own: Vec<Square> = Piece::ALL
        .iter()
        .flat_map(|&piece| board.pieces(piece, us))
        .collect();

    loop {
        let from = own[rng.gen_range(0..own.len())];
        let to = Square::from_index(rng.gen_range(0..64));
        let target = board.piece_at(to);
        match target {
            Some((color, _)) if color == us => continue,
            Some((_, Piece::King)) => continue,
            _ => {}
        }
        let capture = target.is_some();

        let far_rank = match us {
            Color::White => 7,
            Color::Black => 0,
        };
        let is_pawn = board.piece_at(from) == Some((us, Piece::Pawn));
        if is_pawn && to.rank() == far_rank {
            let promo = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen][rng.gen_range(0..4)];
            return if capture {
                Move::new_promotion_capture(from, to, promo)
            } else {
                Move::new_promotion(from, to, promo)
            };
        }

        return if capture {
            Move::capture(from, to)
        } else {
            Move::quiet(from, to)
        };
    }
}
