//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! SDK and scenario produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (counters and histograms through the metrics facade)
//!
//! stdout is reserved for scenario results.
//! ```
//!
//! # Design Decisions
//! - Private keys never appear in log fields
//! - Metrics are recorded through the facade; without a recorder they are no-ops

pub mod logging;
pub mod metrics;
