//! Error types for state stores

/// Result type for store operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend connection error
    #[error("Backend connection error: {0}")]
    Connection(String),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored state value is not a known circuit state
    #[error("Invalid circuit state: {0:?}")]
    InvalidState(String),

    /// Stored failure record could not be decoded
    #[error("Invalid failure record: {0}")]
    InvalidRecord(String),
}

impl Error {
    /// Whether this is a configuration error raised at construction time
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(feature = "redis-backend")]
impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            Error::Connection(err.to_string())
        } else {
            Error::Backend(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
