//! Engine error types.
//!
//! Remote input can never produce an error value: malformed or out-of-range
//! sequences are logged and skipped during processing. The only fallible
//! surface is configuration loading.

use thiserror::Error;

/// Errors raised while loading an engine configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
