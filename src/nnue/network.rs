//! NNUE network weights and the binary weight format.
//!
//! The weight buffer is a flat little-endian blob:
//!
//! 1. first-layer weights, `INPUT_SIZE` rows of `LAYER1_SIZE` i16
//! 2. PSQT weights, `INPUT_SIZE` rows of `PSQT_LANES` i32
//! 3. first-layer bias, `LAYER1_SIZE` i16
//! 4. `BUCKETS` layer stacks, each: layer-2 weights (i8, `LAYER2_SIZE` rows
//!    of `2 * LAYER1_SIZE`), layer-2 bias (i32), layer-3 weights (i8,
//!    `LAYER3_SIZE` rows of `LAYER2_SIZE`), layer-3 bias (i32), output
//!    weights (`LAYER3_SIZE` i8), output bias (one i32)

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::logging::{log_info, log_warn};

use super::features::INPUT_SIZE;
use super::{simd, BUCKETS, LAYER1_SIZE, LAYER2_SIZE, LAYER3_SIZE, PSQT_LANES};

/// Width of the layer-2 input: both perspectives' activations.
pub const L2_INPUT: usize = 2 * LAYER1_SIZE;

const FEATURE_BYTES: usize = INPUT_SIZE * LAYER1_SIZE * 2;
const PSQT_BYTES: usize = INPUT_SIZE * PSQT_LANES * 4;
const BIAS_BYTES: usize = LAYER1_SIZE * 2;
const STACK_BYTES: usize =
    L2_INPUT * LAYER2_SIZE + LAYER2_SIZE * 4 + LAYER2_SIZE * LAYER3_SIZE + LAYER3_SIZE * 4 + LAYER3_SIZE + 4;

/// Exact size of a complete weight buffer.
pub const NETWORK_BYTES: usize = FEATURE_BYTES + PSQT_BYTES + BIAS_BYTES + BUCKETS * STACK_BYTES;

/// Errors raised while loading network weights.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The buffer ends before the last weight.
    #[error("weight buffer too short: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("failed to read weight file: {0}")]
    Io(#[from] std::io::Error),
}

/// Dense layers of one material bucket.
#[derive(Clone)]
pub struct LayerStack {
    pub(crate) l2_weights: Box<[[i8; L2_INPUT]]>,
    pub(crate) l2_bias: [i32; LAYER2_SIZE],
    pub(crate) l3_weights: [[i8; LAYER2_SIZE]; LAYER3_SIZE],
    pub(crate) l3_bias: [i32; LAYER3_SIZE],
    pub(crate) out_weights: [i8; LAYER3_SIZE],
    pub(crate) out_bias: i32,
}

impl LayerStack {
    fn zeroed() -> Self {
        LayerStack {
            l2_weights: vec![[0; L2_INPUT]; LAYER2_SIZE].into_boxed_slice(),
            l2_bias: [0; LAYER2_SIZE],
            l3_weights: [[0; LAYER2_SIZE]; LAYER3_SIZE],
            l3_bias: [0; LAYER3_SIZE],
            out_weights: [0; LAYER3_SIZE],
            out_bias: 0,
        }
    }

    /// Run the two hidden layers and the output layer over the combined
    /// first-layer activations.
    #[must_use]
    pub fn propagate(&self, input: &[i8; L2_INPUT]) -> i32 {
        let hidden1: [i8; LAYER2_SIZE] = dense_relu(input, &self.l2_weights[..], &self.l2_bias);
        let hidden2: [i8; LAYER3_SIZE] =
            dense_relu(&hidden1, &self.l3_weights[..], &self.l3_bias);
        self.out_bias
            .saturating_add(simd::dot_i8(&hidden2, &self.out_weights))
    }
}

/// Quantized dense layer: `clamp(bias + W·x, 0, 127)` per output row.
fn dense_relu<const IN: usize, const OUT: usize>(
    input: &[i8; IN],
    weights: &[[i8; IN]],
    bias: &[i32; OUT],
) -> [i8; OUT] {
    let mut out = [0i8; OUT];
    for ((o, row), b) in out.iter_mut().zip(weights).zip(bias) {
        let sum = b.saturating_add(simd::dot_i8(input, row));
        *o = sum.clamp(0, i32::from(i8::MAX)) as i8;
    }
    out
}

/// Immutable network weights.
#[derive(Clone)]
pub struct Network {
    pub(crate) feature_weights: Box<[[i16; LAYER1_SIZE]]>,
    pub(crate) psqt_weights: Box<[[i32; PSQT_LANES]]>,
    pub(crate) feature_bias: [i16; LAYER1_SIZE],
    pub(crate) stacks: Box<[LayerStack]>,
}

impl Network {
    /// All-zero weights.
    #[must_use]
    pub fn zeroed() -> Self {
        Network {
            feature_weights: vec![[0; LAYER1_SIZE]; INPUT_SIZE].into_boxed_slice(),
            psqt_weights: vec![[0; PSQT_LANES]; INPUT_SIZE].into_boxed_slice(),
            feature_bias: [0; LAYER1_SIZE],
            stacks: (0..BUCKETS).map(|_| LayerStack::zeroed()).collect(),
        }
    }

    /// Load network weights from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NetworkError> {
        let bytes = fs::read(path.as_ref())?;
        log_info!("loading network from {}", path.as_ref().display());
        Self::from_bytes(&bytes)
    }

    /// Parse weights from a buffer laid out as described in the module docs.
    ///
    /// The length is checked before anything is read. Bytes past
    /// `NETWORK_BYTES` are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, NetworkError> {
        if data.len() < NETWORK_BYTES {
            return Err(NetworkError::Truncated {
                expected: NETWORK_BYTES,
                found: data.len(),
            });
        }

        if data.len() > NETWORK_BYTES {
            log_warn!("ignoring {} trailing bytes after network weights", data.len() - NETWORK_BYTES);
        }

        let mut reader = WeightReader::new(data);
        let mut net = Network::zeroed();

        for row in net.feature_weights.iter_mut() {
            reader.read_i16s(row)?;
        }
        for row in net.psqt_weights.iter_mut() {
            reader.read_i32s(row)?;
        }
        reader.read_i16s(&mut net.feature_bias)?;

        for stack in net.stacks.iter_mut() {
            for row in stack.l2_weights.iter_mut() {
                reader.read_i8s(row)?;
            }
            reader.read_i32s(&mut stack.l2_bias)?;
            for row in stack.l3_weights.iter_mut() {
                reader.read_i8s(row)?;
            }
            reader.read_i32s(&mut stack.l3_bias)?;
            reader.read_i8s(&mut stack.out_weights)?;
            let mut out_bias = [0i32; 1];
            reader.read_i32s(&mut out_bias)?;
            stack.out_bias = out_bias[0];
        }

        log_info!(
            "network loaded: {} bytes, {} feature rows, {} buckets",
            reader.pos,
            INPUT_SIZE,
            BUCKETS
        );
        Ok(net)
    }

    /// Serialize to the format `from_bytes` reads.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NETWORK_BYTES);
        for row in self.feature_weights.iter() {
            out.extend(row.iter().flat_map(|w| w.to_le_bytes()));
        }
        for row in self.psqt_weights.iter() {
            out.extend(row.iter().flat_map(|w| w.to_le_bytes()));
        }
        out.extend(self.feature_bias.iter().flat_map(|w| w.to_le_bytes()));
        for stack in self.stacks.iter() {
            for row in stack.l2_weights.iter() {
                out.extend(row.iter().map(|&w| w as u8));
            }
            out.extend(stack.l2_bias.iter().flat_map(|w| w.to_le_bytes()));
            for row in &stack.l3_weights {
                out.extend(row.iter().map(|&w| w as u8));
            }
            out.extend(stack.l3_bias.iter().flat_map(|w| w.to_le_bytes()));
            out.extend(stack.out_weights.iter().map(|&w| w as u8));
            out.extend(stack.out_bias.to_le_bytes());
        }
        out
    }

    /// First-layer weight row for a feature index.
    #[inline]
    #[must_use]
    pub fn feature_row(&self, idx: usize) -> &[i16; LAYER1_SIZE] {
        &self.feature_weights[idx]
    }

    /// PSQT weight row for a feature index.
    #[inline]
    #[must_use]
    pub fn psqt_row(&self, idx: usize) -> &[i32; PSQT_LANES] {
        &self.psqt_weights[idx]
    }

    #[inline]
    #[must_use]
    pub fn feature_bias(&self) -> &[i16; LAYER1_SIZE] {
        &self.feature_bias
    }

    /// Dense layers for a material bucket (0..BUCKETS).
    #[inline]
    #[must_use]
    pub fn stack(&self, bucket: usize) -> &LayerStack {
        &self.stacks[bucket]
    }
}

/// Little-endian cursor over a weight buffer.
struct WeightReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WeightReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        WeightReader { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], NetworkError> {
        let bytes = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(NetworkError::Truncated {
                expected: self.pos + len,
                found: self.data.len(),
            })?;
        self.pos += len;
        Ok(bytes)
    }

    fn read_i16s(&mut self, out: &mut [i16]) -> Result<(), NetworkError> {
        let bytes = self.take(out.len() * 2)?;
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *dst = i16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(())
    }

    fn read_i32s(&mut self, out: &mut [i32]) -> Result<(), NetworkError> {
        let bytes = self.take(out.len() * 4)?;
        for (dst, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *dst = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(())
    }

    fn read_i8s(&mut self, out: &mut [i8]) -> Result<(), NetworkError> {
        let bytes = self.take(out.len())?;
        for (dst, &b) in out.iter_mut().zip(bytes) {
            *dst = b as i8;
        }
        Ok(())
    }
}
