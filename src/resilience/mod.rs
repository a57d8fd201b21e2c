//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Relay to a serving node:
//!     → timeouts.rs (enforce the per-attempt deadline)
//!     → On failure: retries.rs (check if retryable, retry with backoff)
//!     → backoff.rs (jittered exponential delay between attempts)
//! ```
//!
//! Only relays retry. Height queries, dispatches and transaction broadcasts
//! are bounded by a timeout and fail on the first error.

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_backoff, RetryError, RetryPolicy};
pub use timeouts::with_timeout;
