//! Client side of the PSI cardinality protocol
//!
//! Each request samples a fresh ephemeral scalar `r`, blinds every item as
//! `H(c)^r`, and keeps `r` until the matching response arrives. Processing the
//! response strips `r` from each point, leaving `H(c)^k`, and tests membership
//! in the server's setup filter.
//!
//! The scalar is moved out of the client when the response is processed and
//! zeroized when it goes out of scope, so it can never serve two requests.
//! A client instance carries one request in flight at a time; concurrent
//! sessions need their own instances.

use tracing::{debug, warn};

use crate::crypto::{BloomFilter, Element, SecretScalar};
use crate::error::{PsiError, Result};
use crate::protocol::CardinalityEstimate;
use crate::serialization;

/// Secret state between `create_request` and `process_response`
#[derive(Debug)]
struct PendingRequest {
    scalar: SecretScalar,
    len: usize,
}

/// PSI cardinality client
#[derive(Debug, Default)]
pub struct PsiClient {
    pending: Option<PendingRequest>,
}

impl PsiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between `create_request` and a successful `process_response`
    pub fn has_pending_request(&self) -> bool {
        self.pending.is_some()
    }

    /// Blind `items` under a fresh ephemeral scalar.
    ///
    /// A request already in flight is discarded and its scalar wiped.
    pub fn create_request_points<T: AsRef<[u8]>>(&mut self, items: &[T]) -> Result<Vec<Element>> {
        if items.is_empty() {
            return Err(PsiError::EmptyInput);
        }

        let scalar = SecretScalar::random()?;
        let points = items
            .iter()
            .map(|item| Ok(Element::hash_to_point(item.as_ref())?.multiply(&scalar)))
            .collect::<Result<Vec<_>>>()?;

        if self.pending.is_some() {
            warn!("replacing request still in flight");
        }
        self.pending = Some(PendingRequest {
            scalar,
            len: points.len(),
        });

        debug!(items = points.len(), "created request");
        Ok(points)
    }

    /// Serialized request for `items`
    pub fn create_request<T: AsRef<[u8]>>(&mut self, items: &[T]) -> Result<String> {
        let points = self.create_request_points(items)?;
        serialization::encode_points(&points)
    }

    /// Count response points that land in `filter` after unblinding.
    ///
    /// Validation (pending request, response length) happens before the
    /// scalar is consumed, so a rejected response leaves the request in
    /// flight for a retry.
    pub fn process_response_points(
        &mut self,
        filter: &BloomFilter,
        response: &[Element],
    ) -> Result<CardinalityEstimate> {
        let expected = self.pending.as_ref().ok_or(PsiError::InvalidScalar)?.len;
        if response.len() != expected {
            return Err(PsiError::LengthMismatch {
                expected,
                actual: response.len(),
            });
        }

        let pending = self.pending.take().ok_or(PsiError::InvalidScalar)?;
        let unblind = pending.scalar.invert()?;

        let raw_count = response
            .iter()
            .filter(|point| filter.contains(&point.multiply(&unblind).encode()))
            .count();

        let estimate = CardinalityEstimate {
            raw_count,
            client_set_size: pending.len,
            false_positive_rate: filter.estimated_false_positive_rate(),
        };

        debug!(
            raw_count,
            client_set_size = estimate.client_set_size,
            false_positive_rate = estimate.false_positive_rate,
            "processed response"
        );

        Ok(estimate)
    }

    /// Decode setup and response, then estimate the intersection size.
    pub fn process_response_estimate(&mut self, setup: &str, response: &str) -> Result<CardinalityEstimate> {
        let filter = serialization::decode_setup(setup)?;
        let points = serialization::decode_points(response)?;

        self.process_response_points(&filter, &points)
    }

    /// Raw intersection count (uncorrected for false positives).
    pub fn process_response(&mut self, setup: &str, response: &str) -> Result<usize> {
        Ok(self.process_response_estimate(setup, response)?.raw_count)
    }
}
