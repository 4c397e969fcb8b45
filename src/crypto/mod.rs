/// Cryptographic building blocks for PSI cardinality
///
/// This module implements:
/// - Prime-order group operations over P-256 (hash-to-point, blinding, encoding)
/// - Bloom filter encoding of blinded server elements
pub mod bloom;
pub mod group;

pub use bloom::BloomFilter;
pub use group::{Element, SecretScalar, ELEMENT_LEN, SCALAR_LEN};
