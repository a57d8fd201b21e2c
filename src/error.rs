//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::pocket::PocketError;

/// Any failure that aborts a scenario run.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pocket(#[from] PocketError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for scenario runs.
pub type DemoResult<T> = Result<T, DemoError>;
