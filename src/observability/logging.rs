//! Structured logging.
//!
//! Uses the tracing crate with an `EnvFilter`; `RUST_LOG` overrides the
//! default filter. Events are written to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "pocket_relay=info";

/// Initialize the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(build_filter(rust_log.as_deref(), default_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}

fn build_filter(directives: Option<&str>, default_filter: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}
