use thiserror::Error;

/// Result type for store operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by a [`CacheStore`](crate::CacheStore).
///
/// These never leave the [`Cache`](crate::Cache) facade: it logs them and
/// degrades to the in-process store instead.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),

    #[error("Stored value is not an integer: {0}")]
    NotAnInteger(String),
}

impl CacheError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
