//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! Provides quantized neural network evaluation with:
//! - King-relative (HalfKA) input features
//! - Incremental accumulator updates on make/unmake
//! - SIMD-optimized inference (AVX2/NEON)
//! - Material-bucketed dense layers and PSQT lanes
//!
//! Architecture: (49217 -> 256) x 2 perspectives -> 32 -> 32 -> 1, eight
//! buckets selected by piece count.

pub mod accumulator;
pub mod evaluator;
pub mod features;
pub mod network;
pub mod simd;

pub use accumulator::Accumulator;
pub use evaluator::{Evaluator, MoveUpdate, UpdateDirection};
pub use features::{halfka_index, KingSquares, INPUT_SIZE, KING_STRIDE};
pub use network::{LayerStack, Network, NetworkError, NETWORK_BYTES};

/// First-layer width per perspective
pub const LAYER1_SIZE: usize = 256;

/// First hidden dense layer width
pub const LAYER2_SIZE: usize = 32;

/// Second hidden dense layer width
pub const LAYER3_SIZE: usize = 32;

/// Number of material buckets
pub const BUCKETS: usize = 8;

/// PSQT lanes per feature, one per bucket
pub const PSQT_LANES: usize = BUCKETS;

/// Material bucket for a position with `piece_count` pieces (kings included).
///
/// Counts above 32 share the last bucket.
#[inline]
#[must_use]
pub fn bucket_for(piece_count: usize) -> usize {
    debug_assert!(piece_count >= 1, "a position has at least one piece");
    (piece_count.saturating_sub(1) / 4).min(BUCKETS - 1)
}
