//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// An environment variable could not be parsed
    #[error("Invalid value for {variable}: {message}")]
    InvalidVar { variable: String, message: String },

    /// The tracked-users file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tracked-users file is not valid JSON
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No home directory to place the session file in
    #[error("Could not determine home directory for the session file")]
    NoHomeDirectory,
}
