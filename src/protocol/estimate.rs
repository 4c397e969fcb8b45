//! Cardinality estimate reported by the client
//!
//! The raw count overcounts by the Bloom filter's false positives. With a
//! client set of size `N`, true intersection `t`, and per-lookup false
//! positive rate `p`, the expected raw count is `t + (N - t) * p`. Solving
//! for `t` gives the corrected estimate:
//!
//! ```text
//! t = (raw - N * p) / (1 - p)      clamped to [0, N]
//! ```
//!
//! Callers that prefer a different correction can use `raw_count` and
//! `false_positive_rate` directly.

/// Result of processing a response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardinalityEstimate {
    /// Unblinded points found in the setup filter
    pub raw_count: usize,

    /// Number of items in the client's request
    pub client_set_size: usize,

    /// Per-lookup false positive rate implied by the setup filter
    pub false_positive_rate: f64,
}

impl CardinalityEstimate {
    /// Expected false positives if no client item were in the intersection.
    ///
    /// An upper bound on the overcount in expectation.
    pub fn max_expected_false_positives(&self) -> f64 {
        self.client_set_size as f64 * self.false_positive_rate
    }

    /// Raw count corrected for expected false positives.
    pub fn corrected(&self) -> f64 {
        let n = self.client_set_size as f64;
        let p = self.false_positive_rate;

        if p >= 1.0 {
            // Every lookup matches; the filter carries no information
            return 0.0;
        }

        ((self.raw_count as f64 - n * p) / (1.0 - p)).clamp(0.0, n)
    }
}
