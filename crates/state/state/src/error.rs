use thiserror::Error;

/// Errors from state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// The backend could not be reached or rejected the credentials.
    #[error("connection error: {0}")]
    Connection(String),

    /// A uniqueness constraint was violated (e.g. a duplicate token value).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl StateError {
    /// Whether the error means the store itself is unavailable, as opposed to
    /// a problem with one particular row.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}
