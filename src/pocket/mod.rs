//! Pocket Network client subsystem.
//!
//! # Data Flow
//! ```text
//! DemoConfig (endpoint, private keys)
//!     → keys.rs (key loading, signing)
//!     → provider.rs (HTTP JSON calls with timeouts)
//!     → aat.rs + relayer.rs (AAT, signed proofs, retried relays)
//!     → transaction.rs + codec.rs (sign, encode, broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment-sourced configuration
//! - Never log private keys or sensitive data
//! - Every HTTP call has a deadline

pub mod aat;
pub mod codec;
pub mod keys;
pub mod provider;
pub mod relayer;
pub mod transaction;
pub mod types;

pub use keys::{Ed25519KeyStore, KeyManager, KeyStore};
pub use provider::{JsonRpcProvider, Provider};
pub use relayer::{RelayService, Relayer};
pub use transaction::{MsgSend, TransactionBuilder, TransactionSender};
pub use types::{PocketError, PocketResult};
