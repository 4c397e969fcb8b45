//! Server side of the PSI cardinality protocol
//!
//! The server holds one secret scalar `k` for its whole lifetime. It answers
//! two kinds of calls, both read-only with respect to `k`:
//!
//! - **Setup**: a Bloom filter of `H(s)^k` for every server item `s`
//! - **Request**: re-blind each client point, `(H(c)^r)^k`, order preserved
//!
//! `PsiServer` is `Send + Sync`; one instance can serve many clients from
//! many threads at once.

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::ProtocolConfig;
use crate::crypto::{BloomFilter, Element, SecretScalar, SCALAR_LEN};
use crate::error::{PsiError, Result};
use crate::serialization;

/// PSI cardinality server
#[derive(Debug)]
pub struct PsiServer {
    key: SecretScalar,
}

impl PsiServer {
    /// Create a server around an existing secret key
    pub fn new(key: SecretScalar) -> Self {
        Self { key }
    }

    /// Create a server with a freshly sampled secret key
    pub fn new_with_random_key() -> Result<Self> {
        Ok(Self::new(SecretScalar::random()?))
    }

    /// Create a server from a 32-byte big-endian key, e.g. one previously
    /// exported with [`PsiServer::private_key_bytes`].
    pub fn from_key(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(SecretScalar::from_bytes(bytes)?))
    }

    /// Export the secret key. The buffer is wiped on drop.
    ///
    /// Rotating the key breaks linkability between setups, so callers that
    /// persist it should treat it like any other long-term secret.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; SCALAR_LEN]> {
        self.key.to_bytes()
    }

    /// Build the setup filter for `items` at per-lookup rate `false_positive_rate`.
    pub fn create_setup_filter<T: AsRef<[u8]>>(
        &self,
        items: &[T],
        false_positive_rate: f64,
    ) -> Result<BloomFilter> {
        let mut filter = BloomFilter::with_false_positive_rate(items.len(), false_positive_rate)?;

        for item in items {
            let blinded = Element::hash_to_point(item.as_ref())?.multiply(&self.key);
            filter.insert(&blinded.encode());
        }

        debug!(
            items = items.len(),
            num_bits = filter.num_bits(),
            num_hash_functions = filter.num_hash_functions(),
            "created setup filter"
        );

        Ok(filter)
    }

    /// Serialized setup message for `items` at per-lookup rate `false_positive_rate`.
    pub fn create_setup<T: AsRef<[u8]>>(&self, items: &[T], false_positive_rate: f64) -> Result<String> {
        let filter = self.create_setup_filter(items, false_positive_rate)?;
        serialization::encode_setup(&filter)
    }

    /// Serialized setup message where `total_false_positive_rate` bounds false
    /// positives across a whole client query of `num_client_inputs` lookups.
    pub fn create_setup_for_queries<T: AsRef<[u8]>>(
        &self,
        items: &[T],
        total_false_positive_rate: f64,
        num_client_inputs: usize,
    ) -> Result<String> {
        if !(total_false_positive_rate > 0.0 && total_false_positive_rate < 1.0) {
            return Err(PsiError::InvalidFalsePositiveRate(total_false_positive_rate));
        }

        let per_lookup = total_false_positive_rate / num_client_inputs.max(1) as f64;
        self.create_setup(items, per_lookup)
    }

    /// Serialized setup message sized from operator configuration.
    pub fn create_setup_with_config<T: AsRef<[u8]>>(
        &self,
        items: &[T],
        config: &ProtocolConfig,
    ) -> Result<String> {
        match config.expected_client_inputs {
            Some(n) => self.create_setup_for_queries(items, config.false_positive_rate, n),
            None => self.create_setup(items, config.false_positive_rate),
        }
    }

    /// Raise each client point to the server key, preserving order.
    pub fn process_points(&self, points: &[Element]) -> Vec<Element> {
        points.iter().map(|p| p.multiply(&self.key)).collect()
    }

    /// Answer a serialized client request.
    ///
    /// Every point is decoded and validated before any is re-blinded.
    pub fn process_request(&self, request: &str) -> Result<String> {
        let points = serialization::decode_points(request)?;
        if points.is_empty() {
            return Err(PsiError::EmptyInput);
        }

        let response = self.process_points(&points);
        debug!(points = response.len(), "processed request");

        serialization::encode_points(&response)
    }
}
