//! Prime-order group operations over NIST P-256
//!
//! Blinding in the protocol is plain exponentiation in this group:
//! `H(item)^r` for a secret scalar `r`. Because the group is commutative,
//! `(H(x)^r)^s == (H(x)^s)^r`, and raising to `r^-1` strips a blinding layer.
//!
//! # Encoding
//!
//! Elements travel as 33-byte compressed SEC1 points (`0x02`/`0x03` parity
//! byte followed by the x coordinate). P-256 has cofactor 1, so any point that
//! decompresses successfully is in the prime-order subgroup. The identity is
//! never produced and never accepted.

use p256::elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::{Field, Group, PrimeField};
use p256::{AffinePoint, EncodedPoint, FieldBytes, NistP256, ProjectivePoint, Scalar};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{PsiError, Result};

/// Length of a compressed element encoding
pub const ELEMENT_LEN: usize = 33;

/// Length of a scalar encoding (big-endian)
pub const SCALAR_LEN: usize = 32;

/// Domain separation tag for hash-to-curve (RFC 9380 suite P256_XMD:SHA-256_SSWU_RO_)
const HASH_TO_CURVE_DST: &[u8] = b"PSI-CARDINALITY-V1-P256_XMD:SHA-256_SSWU_RO_";

/// Rejection sampling bound. A 32-byte draw is out of range with probability ~2^-32.
const MAX_SAMPLING_ATTEMPTS: usize = 64;

/// A non-identity point of the P-256 group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element(ProjectivePoint);

impl Element {
    /// Map arbitrary bytes onto the curve.
    ///
    /// Deterministic: the same input always yields the same element. Nothing
    /// is cached between calls.
    pub fn hash_to_point(item: &[u8]) -> Result<Self> {
        let point = NistP256::hash_from_bytes::<ExpandMsgXmd<Sha256>>(&[item], &[HASH_TO_CURVE_DST])
            .map_err(|e| PsiError::HashToCurve(e.to_string()))?;

        if bool::from(point.is_identity()) {
            return Err(PsiError::HashToCurve("input mapped to the identity".to_string()));
        }

        Ok(Self(point))
    }

    /// Raise this element to a secret scalar.
    ///
    /// The result is never the identity: the input is non-identity, the
    /// scalar is non-zero, and the group has prime order.
    pub fn multiply(&self, scalar: &SecretScalar) -> Self {
        Self(self.0 * &scalar.0)
    }

    /// Compressed SEC1 encoding
    pub fn encode(&self) -> [u8; ELEMENT_LEN] {
        let encoded = self.0.to_affine().to_encoded_point(true);
        let mut out = [0u8; ELEMENT_LEN];
        // Non-identity points always compress to exactly ELEMENT_LEN bytes
        out.copy_from_slice(encoded.as_bytes());
        out
    }

    /// Decode a compressed SEC1 point.
    ///
    /// Rejects anything that is not exactly 33 bytes with a compressed tag,
    /// and any x coordinate that is out of range or has no point on the curve.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ELEMENT_LEN || !matches!(bytes[0], 0x02 | 0x03) {
            return Err(PsiError::MalformedPoint);
        }

        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| PsiError::MalformedPoint)?;
        let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .ok_or(PsiError::MalformedPoint)?;

        Ok(Self(ProjectivePoint::from(affine)))
    }
}

/// Secret scalar modulo the group order
///
/// Never zero. Zeroized on drop; `Debug` output is redacted.
pub struct SecretScalar(Scalar);

impl SecretScalar {
    /// Sample a uniform non-zero scalar from the operating system CSPRNG.
    pub fn random() -> Result<Self> {
        Self::random_from(&SystemRandom::new())
    }

    /// Rejection-sample a scalar: draw 32 bytes, keep them if they encode a
    /// non-zero value below the group order.
    fn random_from(rng: &dyn SecureRandom) -> Result<Self> {
        for _ in 0..MAX_SAMPLING_ATTEMPTS {
            let mut bytes = Zeroizing::new([0u8; SCALAR_LEN]);
            rng.fill(&mut bytes[..])
                .map_err(|e| PsiError::Randomness(e.to_string()))?;

            if let Ok(scalar) = Self::from_bytes(&bytes[..]) {
                return Ok(scalar);
            }
        }

        Err(PsiError::Randomness(format!(
            "no valid scalar after {} draws",
            MAX_SAMPLING_ATTEMPTS
        )))
    }

    /// Parse a 32-byte big-endian scalar.
    ///
    /// Fails with `InvalidKey` on wrong length, values `>= n`, or zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SCALAR_LEN {
            return Err(PsiError::InvalidKey);
        }

        let mut repr = FieldBytes::default();
        repr.copy_from_slice(bytes);
        let parsed = Option::<Scalar>::from(Scalar::from_repr(repr));
        repr.as_mut_slice().zeroize();

        match parsed {
            Some(scalar) if !bool::from(scalar.is_zero()) => Ok(Self(scalar)),
            _ => Err(PsiError::InvalidKey),
        }
    }

    /// Big-endian encoding, wiped when the returned buffer is dropped
    pub fn to_bytes(&self) -> Zeroizing<[u8; SCALAR_LEN]> {
        let mut repr = self.0.to_repr();
        let mut out = Zeroizing::new([0u8; SCALAR_LEN]);
        out.copy_from_slice(&repr);
        repr.as_mut_slice().zeroize();
        out
    }

    /// Multiplicative inverse modulo the group order
    pub fn invert(&self) -> Result<Self> {
        Option::<Scalar>::from(self.0.invert())
            .map(Self)
            .ok_or(PsiError::InvalidScalar)
    }
}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretScalar(<redacted>)")
    }
}
