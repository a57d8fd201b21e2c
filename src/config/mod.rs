//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (POKT_ENDPOINT, APP_PRIVATE_KEY, SIGNER_PRIVATE_KEY, optional .env)
//!     → loader.rs (presence checks, defaults for scenario constants)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//!     → passed by reference into the scenario
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - Scenario constants live in typed sub-structs with defaults
//! - Secrets are redacted from Debug

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::{
    BackoffConfig, DemoConfig, ProviderConfig, RelayConfig, RelayOptions, TransferConfig,
};
