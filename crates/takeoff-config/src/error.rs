//! Configuration error types.

use thiserror::Error;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML syntax or schema mismatch.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Referenced environment variable is not set.
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
