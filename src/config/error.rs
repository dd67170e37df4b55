//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating freshmap.toml
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Malformed config file")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Validation(String),
}
