use thiserror::Error;

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors for queue operations.
///
/// Persistence never fails (the cache degrades instead), so these only
/// cover encoding typed payloads and worker lifecycle.
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Worker shutdown failed: {0}")]
    Worker(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub const TIMEOUT_MESSAGE: &str = "Job timeout";

/// Handler outcome on failure - determines retry behavior
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Retried while attempts remain
    #[error("Retryable error: {0}")]
    Retryable(String),

    /// Fails the job immediately, no retry
    #[error("Permanent error: {0}")]
    Permanent(String),
}

impl JobError {
    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable(msg.into())
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    /// The synthetic failure recorded when a handler outlives its timeout.
    pub fn timeout() -> Self {
        Self::Retryable(TIMEOUT_MESSAGE.to_string())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// The bare message, as stored on the job record.
    pub fn message(&self) -> &str {
        match self {
            Self::Retryable(msg) | Self::Permanent(msg) => msg,
        }
    }
}

impl From<String> for JobError {
    fn from(msg: String) -> Self {
        Self::Retryable(msg)
    }
}

impl From<&str> for JobError {
    fn from(msg: &str) -> Self {
        Self::Retryable(msg.to_string())
    }
}
