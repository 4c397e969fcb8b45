//! Wire codec for setup, request, and response messages.
//!
//! Canonical textual envelopes:
//! - Setup: `{"num_hash_functions": 14, "bits": "<base64>"}`
//! - Request / Response: `["<base64 point>", ...]`
//!
//! Decoding is strict. Unknown or missing fields, non-canonical base64
//! padding, and wrong point or filter sizes are all rejected rather than
//! coerced.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::crypto::{BloomFilter, Element};
use crate::error::{PsiError, Result};

/// JSON form of a setup message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupEnvelope {
    pub num_hash_functions: u32,

    /// Packed bit array, standard base64 with padding
    pub bits: String,
}

/// Serialize a Bloom filter as a setup envelope.
pub fn encode_setup(filter: &BloomFilter) -> Result<String> {
    let envelope = SetupEnvelope {
        num_hash_functions: filter.num_hash_functions(),
        bits: STANDARD.encode(filter.as_bytes()),
    };
    serde_json::to_string(&envelope).map_err(|e| PsiError::InvalidEnvelope(e.to_string()))
}

/// Parse and validate a setup envelope.
///
/// The filter size is implied by the decoded bit array (8 bits per byte).
pub fn decode_setup(blob: &str) -> Result<BloomFilter> {
    let envelope: SetupEnvelope =
        serde_json::from_str(blob).map_err(|e| PsiError::InvalidEnvelope(e.to_string()))?;

    let bits = STANDARD
        .decode(envelope.bits.as_bytes())
        .map_err(|e| PsiError::MalformedSetup(format!("bits: {}", e)))?;
    let num_bits = bits.len() as u64 * 8;

    BloomFilter::from_parts(envelope.num_hash_functions, num_bits, bits)
}

/// Serialize an ordered point sequence (request or response).
pub fn encode_points(points: &[Element]) -> Result<String> {
    let encoded: Vec<String> = points.iter().map(|p| STANDARD.encode(p.encode())).collect();
    serde_json::to_string(&encoded).map_err(|e| PsiError::InvalidEnvelope(e.to_string()))
}

/// Parse an ordered point sequence, validating every point before returning.
pub fn decode_points(blob: &str) -> Result<Vec<Element>> {
    let encoded: Vec<String> =
        serde_json::from_str(blob).map_err(|e| PsiError::InvalidEnvelope(e.to_string()))?;

    encoded
        .iter()
        .map(|s| {
            let bytes = STANDARD
                .decode(s.as_bytes())
                .map_err(|e| PsiError::InvalidEnvelope(format!("point: {}", e)))?;
            Element::decode(&bytes)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(n: usize) -> Vec<Element> {
        (0..n)
            .map(|i| Element::hash_to_point(format!("item {}", i).as_bytes()).unwrap())
            .collect()
    }

    #[test]
    fn test_setup_roundtrip() {
        let mut filter = BloomFilter::with_false_positive_rate(20, 0.001).unwrap();
        filter.insert(b"one");
        filter.insert(b"two");

        let blob = encode_setup(&filter).unwrap();
        assert!(blob.starts_with("{\"num_hash_functions\":"));

        let decoded = decode_setup(&blob).unwrap();
        assert_eq!(decoded, filter);
    }

    #[test]
    fn test_setup_accepts_reference_blob() {
        let blob = r#"{"num_hash_functions":14,"bits":"1PnolAVduzqn+tXnoeyZ0ztdnwvAidt0U7gc2rWCtP5i6BDtSUydixXwGHP2mVAZ8PCNqGuTWUQO5VB0OEHTH8Cr1JhLxBDHRM4fAPEUvjjkBPNpsPRRtqzN2fW8y7rcANEwaRyInPsw1t4KYB0Q5vdy38VlPB1/Bz/adfGoGnXQ4fPNI/PN5s+zLcPev9odjAWyUQms8bvPHHsL2uyS7Uu5LRtOfdfYX5zWilxzNXECrabnnUnMqD5NH8c7oreTCWxwRQfYMxhf5K/EZTiTHphCi9O5Ey4ahwvNvykbvXdHQ7CDnLTKmomN6su5BrUt"}"#;

        let filter = decode_setup(blob).unwrap();
        assert_eq!(filter.num_hash_functions(), 14);
        assert_eq!(filter.num_bits() % 8, 0);
    }

    #[test]
    fn test_setup_rejects_unknown_and_missing_fields() {
        let unknown = r#"{"num_hash_functions":3,"bits":"AAAA","extra":1}"#;
        assert!(matches!(decode_setup(unknown), Err(PsiError::InvalidEnvelope(_))));

        let missing = r#"{"bits":"AAAA"}"#;
        assert!(matches!(decode_setup(missing), Err(PsiError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_setup_rejects_bad_parameters() {
        let zero_k = r#"{"num_hash_functions":0,"bits":"AAAA"}"#;
        assert!(matches!(decode_setup(zero_k), Err(PsiError::MalformedSetup(_))));

        let empty_bits = r#"{"num_hash_functions":3,"bits":""}"#;
        assert!(matches!(decode_setup(empty_bits), Err(PsiError::MalformedSetup(_))));

        let negative_k = r#"{"num_hash_functions":-1,"bits":"AAAA"}"#;
        assert!(matches!(decode_setup(negative_k), Err(PsiError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_setup_rejects_bad_padding() {
        // "AAA" is missing its '=' pad
        let unpadded = r#"{"num_hash_functions":3,"bits":"AAA"}"#;
        assert!(matches!(decode_setup(unpadded), Err(PsiError::MalformedSetup(_))));

        let single_byte = r#"{"num_hash_functions":3,"bits":"AA=="}"#;
        assert_eq!(decode_setup(single_byte).unwrap().num_bits(), 8);

        let junk = r#"{"num_hash_functions":3,"bits":"A*A="}"#;
        assert!(matches!(decode_setup(junk), Err(PsiError::MalformedSetup(_))));
    }

    #[test]
    fn test_setup_rejects_non_json() {
        assert!(matches!(decode_setup("invalid"), Err(PsiError::InvalidEnvelope(_))));
        assert!(matches!(decode_setup("[]"), Err(PsiError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_points_roundtrip() {
        let points = sample_points(5);
        let blob = encode_points(&points).unwrap();

        let decoded = decode_points(&blob).unwrap();
        assert_eq!(decoded, points);
    }

    #[test]
    fn test_points_wire_shape() {
        let blob = encode_points(&sample_points(2)).unwrap();
        let raw: Vec<String> = serde_json::from_str(&blob).unwrap();

        assert_eq!(raw.len(), 2);
        for s in raw {
            // 33 bytes -> 44 base64 chars; tags 0x02 and 0x03 both encode to a leading 'A'
            assert_eq!(s.len(), 44);
            assert!(s.starts_with('A'));
        }
    }

    #[test]
    fn test_points_accept_reference_response() {
        let blob = r#"["AiB2zX47wIFkO0VkHPiX4B2RPbzb2xre1/rcH3mARf6A","Aix7yJwCoTbF1RDFgLT7ntQ+DCdsxtQB5VKemNSbs95K"]"#;
        let points = decode_points(blob).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_points_reject_malformed() {
        assert!(matches!(decode_points("invalid"), Err(PsiError::InvalidEnvelope(_))));
        assert!(matches!(decode_points("{}"), Err(PsiError::InvalidEnvelope(_))));
        assert!(matches!(decode_points("[1, 2]"), Err(PsiError::InvalidEnvelope(_))));
        assert!(matches!(decode_points(r#"["%%%"]"#), Err(PsiError::InvalidEnvelope(_))));

        // Valid base64, wrong length
        assert_eq!(decode_points(r#"["AAAA"]"#), Err(PsiError::MalformedPoint));

        // Right length, not on the curve (x above the field modulus)
        let off_curve = STANDARD.encode({
            let mut b = [0xffu8; 33];
            b[0] = 0x02;
            b
        });
        assert_eq!(
            decode_points(&format!("[\"{}\"]", off_curve)),
            Err(PsiError::MalformedPoint)
        );
    }

    #[test]
    fn test_points_one_bad_entry_rejects_all() {
        let mut raw: Vec<String> = sample_points(3)
            .iter()
            .map(|p| STANDARD.encode(p.encode()))
            .collect();
        raw[1] = STANDARD.encode([0x02u8; 10]);
        let blob = serde_json::to_string(&raw).unwrap();

        assert_eq!(decode_points(&blob), Err(PsiError::MalformedPoint));
    }

    #[test]
    fn test_empty_point_list() {
        assert_eq!(encode_points(&[]).unwrap(), "[]");
        assert!(decode_points("[]").unwrap().is_empty());
    }
}
