use thiserror::Error;

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors from alert delivery and setup.
///
/// Recording and querying never fail; these only surface from notifier
/// construction and from [`AlertNotifier::notify`](crate::AlertNotifier::notify),
/// whose errors the metrics store logs and discards.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Webhook client could not be built: {0}")]
    ClientBuild(String),

    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {0}")]
    Status(u16),
}
