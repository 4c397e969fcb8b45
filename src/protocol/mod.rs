//! PSI cardinality protocol engines
//!
//! Message flow:
//!
//! ```text
//! Client                                   Server (key k)
//!   create_request(C) ── [H(c)^r] ──────────►
//!                     ◄── setup: Bloom{H(s)^k} ── create_setup(S, p)
//!                     ◄── [H(c)^rk] ────────── process_request
//!   process_response  ─► |{c : H(c)^k ∈ Bloom}|
//! ```
//!
//! All messages are the JSON envelopes of [`crate::serialization`].

pub mod client;
pub mod estimate;
pub mod server;

pub use client::PsiClient;
pub use estimate::CardinalityEstimate;
pub use server::PsiServer;
