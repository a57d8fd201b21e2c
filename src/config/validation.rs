//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (the env loader handles presence)
//! - Endpoint must be an http(s) URL
//! - Timeouts must be positive
//!
//! Key material is not inspected here; the key manager rejects malformed keys.
//! Transfer fields are checked by the transaction builder, the relay payload
//! by the relayer.

use crate::config::schema::DemoConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("endpoint", e.to_string())),
    }

    if config.provider.request_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "provider.request_timeout_ms",
            "must be greater than zero",
        ));
    }

    if config.relay.options.timeout_ms == 0 {
        errors.push(ValidationError::new(
            "relay.options.timeout_ms",
            "must be greater than zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
