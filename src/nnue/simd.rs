//! Vectorized kernels for NNUE evaluation.
//!
//! - Accumulator updates (wrapping add/subtract of i16 rows)
//! - Bias + ReLU + saturating narrow of the accumulator to i8
//! - i8 dot products for the dense layers
//!
//! Supports:
//! - `x86_64`: `AVX2` (256-bit vectors, detected at runtime)
//! - aarch64: NEON for accumulator updates
//! - Fallback: scalar loops
//!
//! Every path produces the same bits as the scalar reference.

use super::{LAYER1_SIZE, PSQT_LANES};

/// Largest value an 8-bit activation can hold.
pub const ACTIVATION_MAX: i16 = i8::MAX as i16;

// ============================================================================
// Public API - dispatches to platform-specific implementations
// ============================================================================

/// Add a weight row into an accumulator, wrapping on overflow.
#[inline]
pub fn add_row(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        // NEON is always available on aarch64
        unsafe { add_row_neon(acc, row) }
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { add_row_avx2(acc, row) }
        } else {
            add_row_scalar(acc, row)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        add_row_scalar(acc, row)
    }
}

/// Subtract a weight row from an accumulator, wrapping on overflow.
#[inline]
pub fn sub_row(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { sub_row_neon(acc, row) }
    }

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { sub_row_avx2(acc, row) }
        } else {
            sub_row_scalar(acc, row)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        sub_row_scalar(acc, row)
    }
}

/// PSQT lanes are few enough that the compiler vectorizes these on its own.
#[inline]
pub fn add_psqt(acc: &mut [i32; PSQT_LANES], row: &[i32; PSQT_LANES]) {
    for (a, w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_add(*w);
    }
}

#[inline]
pub fn sub_psqt(acc: &mut [i32; PSQT_LANES], row: &[i32; PSQT_LANES]) {
    for (a, w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_sub(*w);
    }
}

/// `out[i] = clamp(acc[i] + bias[i], 0, 127)`.
///
/// The bias add saturates in 16 bits, so a large positive sum stays at 127.
#[inline]
pub fn bias_relu_pack(acc: &[i16; LAYER1_SIZE], bias: &[i16; LAYER1_SIZE], out: &mut [i8; LAYER1_SIZE]) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { bias_relu_pack_avx2(acc, bias, out) }
        } else {
            bias_relu_pack_scalar(acc, bias, out)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        bias_relu_pack_scalar(acc, bias, out)
    }
}

/// Dot product of two equal-length i8 vectors, accumulated in i32.
#[inline]
#[must_use]
pub fn dot_i8(input: &[i8], weights: &[i8]) -> i32 {
    debug_assert_eq!(input.len(), weights.len());

    #[cfg(target_arch = "x86_64")]
    {
        if input.len() % 32 == 0 && is_x86_feature_detected!("avx2") {
            unsafe { dot_i8_avx2(input, weights) }
        } else {
            dot_i8_scalar(input, weights)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        dot_i8_scalar(input, weights)
    }
}

// ============================================================================
// Scalar implementations
// ============================================================================

#[cfg(any(test, not(target_arch = "aarch64")))]
#[inline]
fn add_row_scalar(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    for (a, w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_add(*w);
    }
}

#[cfg(any(test, not(target_arch = "aarch64")))]
#[inline]
fn sub_row_scalar(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    for (a, w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_sub(*w);
    }
}

#[inline]
fn bias_relu_pack_scalar(
    acc: &[i16; LAYER1_SIZE],
    bias: &[i16; LAYER1_SIZE],
    out: &mut [i8; LAYER1_SIZE],
) {
    for ((o, a), b) in out.iter_mut().zip(acc).zip(bias) {
        *o = a.saturating_add(*b).clamp(0, ACTIVATION_MAX) as i8;
    }
}

#[inline]
fn dot_i8_scalar(input: &[i8], weights: &[i8]) -> i32 {
    input
        .iter()
        .zip(weights)
        .map(|(&x, &w)| i32::from(x) * i32::from(w))
        .sum()
}

// ============================================================================
// NEON implementations (aarch64)
// ============================================================================

#[cfg(target_arch = "aarch64")]
unsafe fn add_row_neon(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    use std::arch::aarch64::{vaddq_s16, vld1q_s16, vst1q_s16};

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..LAYER1_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(row_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vaddq_s16(a, w));
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn sub_row_neon(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    use std::arch::aarch64::{vld1q_s16, vst1q_s16, vsubq_s16};

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..LAYER1_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(row_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vsubq_s16(a, w));
    }
}

// ============================================================================
// AVX2 implementations (x86_64 only)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn add_row_avx2(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    // 16 i16 lanes per 256-bit vector
    for i in (0..LAYER1_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(row_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_add_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sub_row_avx2(acc: &mut [i16; LAYER1_SIZE], row: &[i16; LAYER1_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..LAYER1_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(row_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_sub_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn bias_relu_pack_avx2(
    acc: &[i16; LAYER1_SIZE],
    bias: &[i16; LAYER1_SIZE],
    out: &mut [i8; LAYER1_SIZE],
) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_ptr();
    let bias_ptr = bias.as_ptr();
    let out_ptr = out.as_mut_ptr();
    let zero = _mm256_setzero_si256();

    // 32 outputs per iteration from two 16-lane inputs
    for i in (0..LAYER1_SIZE).step_by(32) {
        let a0 = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let a1 = _mm256_loadu_si256(acc_ptr.add(i + 16) as *const __m256i);
        let b0 = _mm256_loadu_si256(bias_ptr.add(i) as *const __m256i);
        let b1 = _mm256_loadu_si256(bias_ptr.add(i + 16) as *const __m256i);

        let r0 = _mm256_max_epi16(_mm256_adds_epi16(a0, b0), zero);
        let r1 = _mm256_max_epi16(_mm256_adds_epi16(a1, b1), zero);

        // packs works per 128-bit lane; the permute restores element order.
        let packed = _mm256_packs_epi16(r0, r1);
        let ordered = _mm256_permute4x64_epi64(packed, 0b11_01_10_00);
        _mm256_storeu_si256(out_ptr.add(i) as *mut __m256i, ordered);
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn dot_i8_avx2(input: &[i8], weights: &[i8]) -> i32 {
    use std::arch::x86_64::*;

    let in_ptr = input.as_ptr();
    let w_ptr = weights.as_ptr();
    let mut sum = _mm256_setzero_si256();

    for k in (0..input.len()).step_by(32) {
        let x = _mm256_loadu_si256(in_ptr.add(k) as *const __m256i);
        let w = _mm256_loadu_si256(w_ptr.add(k) as *const __m256i);

        // Widen to i16 before multiplying so no product saturates.
        let x_lo = _mm256_cvtepi8_epi16(_mm256_castsi256_si128(x));
        let x_hi = _mm256_cvtepi8_epi16(_mm256_extracti128_si256(x, 1));
        let w_lo = _mm256_cvtepi8_epi16(_mm256_castsi256_si128(w));
        let w_hi = _mm256_cvtepi8_epi16(_mm256_extracti128_si256(w, 1));

        let prod = _mm256_add_epi32(_mm256_madd_epi16(x_lo, w_lo), _mm256_madd_epi16(x_hi, w_hi));
        sum = _mm256_add_epi32(sum, prod);
    }

    let lo = _mm256_castsi256_si128(sum);
    let hi = _mm256_extracti128_si256(sum, 1);
    let s = _mm_add_epi32(lo, hi);
    let s = _mm_add_epi32(s, _mm_shuffle_epi32(s, 0b01_00_11_10));
    let s = _mm_add_epi32(s, _mm_shuffle_epi32(s, 0b10_11_00_01));
    _mm_cvtsi128_si32(s)
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;

    use super::*;

    fn random_row(rng: &mut StdRng) -> [i16; LAYER1_SIZE] {
        std::array::from_fn(|_| rng.gen())
    }

    #[test]
    fn test_add_then_sub_is_identity_even_when_wrapping() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = random_row(&mut rng);
        let row = random_row(&mut rng);

        let mut acc = original;
        add_row(&mut acc, &row);
        sub_row(&mut acc, &row);
        assert_eq!(acc, original);
    }

    #[test]
    fn test_add_row_wraps() {
        let mut acc = [i16::MAX; LAYER1_SIZE];
        add_row(&mut acc, &[1; LAYER1_SIZE]);
        assert!(acc.iter().all(|&v| v == i16::MIN));
    }

    #[test]
    fn test_rows_match_scalar() {
        let mut rng = StdRng::seed_from_u64(11);
        let start = random_row(&mut rng);
        let row = random_row(&mut rng);

        let (mut fast, mut slow) = (start, start);
        add_row(&mut fast, &row);
        add_row_scalar(&mut slow, &row);
        assert_eq!(fast, slow);

        sub_row(&mut fast, &row);
        sub_row(&mut fast, &row);
        sub_row_scalar(&mut slow, &row);
        sub_row_scalar(&mut slow, &row);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_bias_relu_pack_clamps() {
        let mut acc = [0i16; LAYER1_SIZE];
        let mut bias = [0i16; LAYER1_SIZE];
        acc[0] = -50;
        acc[1] = 50;
        acc[2] = 1000;
        bias[2] = 5;
        acc[3] = 120;
        bias[3] = 7;
        acc[4] = i16::MAX;
        bias[4] = 1;
        acc[5] = i16::MIN;
        bias[5] = -1;

        let mut out = [0i8; LAYER1_SIZE];
        bias_relu_pack(&acc, &bias, &mut out);
        assert_eq!(&out[..6], &[0, 50, 127, 127, 127, 0]);
    }

    #[test]
    fn test_bias_relu_pack_saturates_near_max() {
        let acc = [32757i16; LAYER1_SIZE];
        let bias = [20i16; LAYER1_SIZE];

        let mut fast = [0i8; LAYER1_SIZE];
        let mut slow = [0i8; LAYER1_SIZE];
        bias_relu_pack(&acc, &bias, &mut fast);
        bias_relu_pack_scalar(&acc, &bias, &mut slow);
        assert_eq!(fast, [127i8; LAYER1_SIZE]);
        assert_eq!(slow, fast);
    }

    #[test]
    fn test_bias_relu_pack_matches_scalar() {
        let mut rng = StdRng::seed_from_u64(3);
        let acc: [i16; LAYER1_SIZE] = std::array::from_fn(|_| rng.gen_range(-400..400));
        let bias: [i16; LAYER1_SIZE] = std::array::from_fn(|_| rng.gen_range(-100..100));

        let mut fast = [0i8; LAYER1_SIZE];
        let mut slow = [0i8; LAYER1_SIZE];
        bias_relu_pack(&acc, &bias, &mut fast);
        bias_relu_pack_scalar(&acc, &bias, &mut slow);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_dot_i8_matches_scalar() {
        let mut rng = StdRng::seed_from_u64(5);
        let input: Vec<i8> = (0..2 * LAYER1_SIZE).map(|_| rng.gen_range(0..=127)).collect();
        let weights: Vec<i8> = (0..2 * LAYER1_SIZE).map(|_| rng.gen()).collect();
        assert_eq!(dot_i8(&input, &weights), dot_i8_scalar(&input, &weights));

        // Odd lengths take the scalar path.
        assert_eq!(dot_i8(&[2, 3, 4], &[-1, 5, 10]), 53);
    }

    #[test]
    fn test_psqt_add_sub() {
        let mut acc = [10i32; PSQT_LANES];
        let row: [i32; PSQT_LANES] = [1, -2, 3, -4, 5, -6, 7, i32::MAX];
        add_psqt(&mut acc, &row);
        assert_eq!(acc[1], 8);
        sub_psqt(&mut acc, &row);
        assert_eq!(acc, [10; PSQT_LANES]);
    }
}
