use thiserror::Error;

/// Result type for log store operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors raised by the backing log stores
#[derive(Error, Debug)]
pub enum LogError {
    /// IO error while reading a log file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host's log backend failed
    #[error("{0}")]
    Backend(String),
}

impl LogError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
