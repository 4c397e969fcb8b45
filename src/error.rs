//! Protocol error types
//!
//! Every failure is detected while validating input, before any curve
//! arithmetic runs, and surfaces immediately to the caller. Nothing in this
//! crate retries internally or downgrades an error to a default count.

use thiserror::Error;

/// PSI cardinality protocol errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PsiError {
    /// Bytes do not decode to a valid compressed P-256 point
    #[error("Malformed point: not a valid compressed curve point")]
    MalformedPoint,

    /// Bloom filter blob failed size or parameter validation
    #[error("Malformed setup: {0}")]
    MalformedSetup(String),

    /// Response point count differs from the pending request
    #[error("Length mismatch: request had {expected} points, response has {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Operation requires at least one item
    #[error("Empty input: at least one item is required")]
    EmptyInput,

    /// No pending request (never created, or already consumed)
    #[error("Invalid scalar: no request in flight for this client")]
    InvalidScalar,

    /// Outer JSON/base64 envelope did not parse
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Invalid false positive rate {0}: must be in (0, 1)")]
    InvalidFalsePositiveRate(f64),

    /// Key bytes are not a canonical non-zero scalar
    #[error("Invalid key: expected 32 bytes encoding a non-zero scalar below the group order")]
    InvalidKey,

    #[error("Failed to sample randomness: {0}")]
    Randomness(String),

    #[error("Hash to curve failed: {0}")]
    HashToCurve(String),
}

impl PsiError {
    /// True for failures caused by undecodable peer input.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            PsiError::MalformedPoint | PsiError::MalformedSetup(_) | PsiError::InvalidEnvelope(_)
        )
    }
}

/// Result alias used throughout the protocol modules
pub type Result<T> = std::result::Result<T, PsiError>;
