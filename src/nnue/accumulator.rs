//! Per-perspective first-layer partial sums.

use crate::board::Color;

use super::network::Network;
use super::{simd, LAYER1_SIZE, PSQT_LANES};

/// Running sums of the weight rows of every active feature, one set per
/// perspective. The first-layer bias is not included; it is applied when
/// the position is evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accumulator {
    /// White's perspective first-layer sums
    pub white: [i16; LAYER1_SIZE],
    /// Black's perspective first-layer sums
    pub black: [i16; LAYER1_SIZE],
    /// White's perspective PSQT sums, one lane per material bucket
    pub white_psqt: [i32; PSQT_LANES],
    /// Black's perspective PSQT sums
    pub black_psqt: [i32; PSQT_LANES],
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            white: [0; LAYER1_SIZE],
            black: [0; LAYER1_SIZE],
            white_psqt: [0; PSQT_LANES],
            black_psqt: [0; PSQT_LANES],
        }
    }
}

impl Accumulator {
    /// Zero both perspectives.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add the rows for one feature (white-POV index, black-POV index).
    #[inline]
    pub fn add_feature(&mut self, white_idx: usize, black_idx: usize, network: &Network) {
        simd::add_row(&mut self.white, network.feature_row(white_idx));
        simd::add_row(&mut self.black, network.feature_row(black_idx));
        simd::add_psqt(&mut self.white_psqt, network.psqt_row(white_idx));
        simd::add_psqt(&mut self.black_psqt, network.psqt_row(black_idx));
    }

    /// Remove the rows for one feature.
    #[inline]
    pub fn sub_feature(&mut self, white_idx: usize, black_idx: usize, network: &Network) {
        simd::sub_row(&mut self.white, network.feature_row(white_idx));
        simd::sub_row(&mut self.black, network.feature_row(black_idx));
        simd::sub_psqt(&mut self.white_psqt, network.psqt_row(white_idx));
        simd::sub_psqt(&mut self.black_psqt, network.psqt_row(black_idx));
    }

    /// First-layer and PSQT sums for one perspective.
    #[inline]
    #[must_use]
    pub fn perspective(&self, color: Color) -> (&[i16; LAYER1_SIZE], &[i32; PSQT_LANES]) {
        match color {
            Color::White => (&self.white, &self.white_psqt),
            Color::Black => (&self.black, &self.black_psqt),
        }
    }
}
