//! Configuration loading from the environment.

use thiserror::Error;

use crate::config::schema::DemoConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the RPC endpoint URL.
pub const ENDPOINT_ENV_VAR: &str = "POKT_ENDPOINT";

/// Environment variable holding the application private key.
pub const APP_PRIVATE_KEY_ENV_VAR: &str = "APP_PRIVATE_KEY";

/// Environment variable holding the transaction signer private key.
pub const SIGNER_PRIVATE_KEY_ENV_VAR: &str = "SIGNER_PRIVATE_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} not set")]
    MissingVar(&'static str),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from the process environment.
///
/// A `.env` file is honored if the caller loaded it beforehand.
pub fn load_from_env() -> Result<DemoConfig, ConfigError> {
    load_with(|name| std::env::var(name).ok())
}

/// Load and validate configuration using `lookup` to resolve variables.
pub fn load_with<F>(lookup: F) -> Result<DemoConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let require = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

    let config = DemoConfig {
        endpoint: require(ENDPOINT_ENV_VAR)?,
        app_private_key: require(APP_PRIVATE_KEY_ENV_VAR)?,
        signer_private_key: require(SIGNER_PRIVATE_KEY_ENV_VAR)?,
        ..Default::default()
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
