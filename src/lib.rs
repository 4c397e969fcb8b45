//! Private Set Intersection Cardinality (PSI-C)
//!
//! A client and a server each hold a private set. The client learns
//! `|client ∩ server|` and nothing else; the server learns nothing about the
//! client's items.
//!
//! - Blinding is exponentiation in the P-256 group with secret scalars
//! - The server's blinded set travels as a Bloom filter
//! - Messages are transport-neutral JSON strings
//!
//! ```
//! use psi_cardinality::{PsiClient, PsiServer};
//!
//! let server = PsiServer::new_with_random_key()?;
//! let mut client = PsiClient::new();
//!
//! let setup = server.create_setup(&["alice", "bob", "carol"], 1e-6)?;
//! let request = client.create_request(&["bob", "carol", "dave"])?;
//! let response = server.process_request(&request)?;
//!
//! assert_eq!(client.process_response(&setup, &response)?, 2);
//! # Ok::<(), psi_cardinality::PsiError>(())
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod serialization;

pub use config::{ConfigError, PsiConfig};
pub use error::PsiError;
pub use protocol::{CardinalityEstimate, PsiClient, PsiServer};
