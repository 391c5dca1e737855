//! Server-level error type.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that can stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured file could not be read.
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid TOML.
    #[error("Malformed config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Transport I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
