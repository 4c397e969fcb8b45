//! Bloom filter over blinded element encodings
//!
//! Sized with the standard optimal parameters for `n` expected elements and a
//! target false positive rate `p`:
//!
//! ```text
//! m = ceil(-n * ln(p) / ln(2)^2)   (rounded up to whole bytes)
//! k = round((m / n) * ln(2)),  k >= 1
//! ```
//!
//! Bit positions use double hashing from one seed:
//! `pos_i = (h1 + i * h2) mod m`, where `h1`/`h2` are the first 8 bytes
//! (little-endian) of `SHA-256(seed || index || input)` for index 1 and 2.
//! Any party holding the same `(k, m, bits)` computes identical positions.

use sha2::{Digest, Sha256};
use std::f64::consts::LN_2;

use crate::error::{PsiError, Result};

/// Seed shared by every party computing bit positions
const HASH_SEED: &[u8] = b"psi-cardinality-bloom-v1";

/// Upper bound on k accepted from the wire
pub const MAX_HASH_FUNCTIONS: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    num_hash_functions: u32,
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Create an empty filter sized for `expected_elements` at rate `false_positive_rate`.
    ///
    /// `expected_elements == 0` is sized as 1 so the filter is never empty.
    pub fn with_false_positive_rate(expected_elements: usize, false_positive_rate: f64) -> Result<Self> {
        // Written as a negated range check so NaN is rejected too
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(PsiError::InvalidFalsePositiveRate(false_positive_rate));
        }

        let n = expected_elements.max(1) as f64;
        let optimal_bits = (-n * false_positive_rate.ln() / (LN_2 * LN_2)).ceil();
        let num_bytes = ((optimal_bits / 8.0).ceil() as usize).max(1);
        let num_bits = (num_bytes * 8) as f64;

        let num_hash_functions = ((num_bits / n) * LN_2)
            .round()
            .clamp(1.0, MAX_HASH_FUNCTIONS as f64) as u32;

        Ok(Self {
            num_hash_functions,
            bits: vec![0u8; num_bytes],
        })
    }

    /// Rebuild a received filter, validating its declared parameters.
    pub fn from_parts(num_hash_functions: u32, num_bits: u64, bits: Vec<u8>) -> Result<Self> {
        if num_hash_functions == 0 || num_hash_functions > MAX_HASH_FUNCTIONS {
            return Err(PsiError::MalformedSetup(format!(
                "num_hash_functions must be in 1..={}, got {}",
                MAX_HASH_FUNCTIONS, num_hash_functions
            )));
        }
        if num_bits == 0 || num_bits % 8 != 0 {
            return Err(PsiError::MalformedSetup(format!(
                "size must be a non-zero multiple of 8 bits, got {}",
                num_bits
            )));
        }
        if bits.len() as u64 * 8 != num_bits {
            return Err(PsiError::MalformedSetup(format!(
                "declared {} bits but bit array holds {}",
                num_bits,
                bits.len() as u64 * 8
            )));
        }

        Ok(Self {
            num_hash_functions,
            bits,
        })
    }

    pub fn insert(&mut self, input: &[u8]) {
        for pos in bit_positions(self.num_hash_functions, self.num_bits(), input) {
            self.bits[pos / 8] |= 1 << (pos % 8);
        }
    }

    /// True iff all k positions are set. False positives possible, false negatives not.
    pub fn contains(&self, input: &[u8]) -> bool {
        bit_positions(self.num_hash_functions, self.num_bits(), input)
            .all(|pos| self.bits[pos / 8] & (1 << (pos % 8)) != 0)
    }

    pub fn num_hash_functions(&self) -> u32 {
        self.num_hash_functions
    }

    /// Filter size m in bits
    pub fn num_bits(&self) -> u64 {
        self.bits.len() as u64 * 8
    }

    /// Packed bit array; bit j lives in byte j / 8 at position j % 8
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Number of bits currently set
    pub fn count_set_bits(&self) -> u64 {
        self.bits.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// False positive rate implied by the filter's fill ratio: `(set / m)^k`.
    ///
    /// Computable by a receiver that never saw the sender's target rate or
    /// element count.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill = self.count_set_bits() as f64 / self.num_bits() as f64;
        fill.powi(self.num_hash_functions as i32)
    }
}

/// k bit positions for `input` in a filter of `num_bits` bits
fn bit_positions(num_hash_functions: u32, num_bits: u64, input: &[u8]) -> impl Iterator<Item = usize> {
    let h1 = seeded_hash(1, input);
    let h2 = seeded_hash(2, input);

    (0..num_hash_functions as u64).map(move |i| (h1.wrapping_add(i.wrapping_mul(h2)) % num_bits) as usize)
}

fn seeded_hash(index: u8, input: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(HASH_SEED);
    hasher.update([index]);
    hasher.update(input);
    let digest = hasher.finalize();

    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(word)
}
