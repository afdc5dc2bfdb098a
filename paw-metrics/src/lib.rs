//! # paw-metrics
//!
//! Numeric samples grouped into per-minute buckets in [`paw_cache::Cache`],
//! static and operation-specific threshold alerts, windowed statistics and
//! a composite platform health score.
//!
//! ```rust
//! use std::time::Duration;
//! use paw_cache::Cache;
//! use paw_metrics::{HealthStatus, Metrics};
//!
//! # tokio_test::block_on(async {
//! let metrics = Metrics::new(Cache::in_memory());
//!
//! metrics.track_response_time("/api/bookings", 180.0, 200).await;
//! metrics.track_query("availability_by_sitter", 42.0).await;
//!
//! let stats = metrics.stats("api.response_time", Duration::from_secs(60)).await;
//! assert_eq!(stats.count, 1);
//!
//! assert_eq!(metrics.health().await.status, HealthStatus::Healthy);
//! # });
//! ```
//!
//! Alerts are persisted for a day under `alert:<ms>`, published to
//! [`Metrics::subscribe_alerts`] receivers, and forwarded to the configured
//! [`AlertNotifier`] when critical.

pub mod alert;
pub mod config;
pub mod error;
pub mod health;
pub mod kinds;
pub mod metrics;
pub mod notify;
pub mod sample;
pub mod stats;
pub mod trackers;

pub use alert::{Alert, Severity};
pub use config::MetricsConfig;
pub use error::{MetricsError, MetricsResult};
pub use health::{HealthStatus, PlatformHealth};
pub use kinds::{MetricKind, Thresholds};
pub use metrics::{Metrics, HEALTH_WINDOW};
pub use notify::{AlertNotifier, WebhookNotifier};
pub use sample::{MetricSample, Tags};
pub use stats::MetricStats;
pub use trackers::{ERROR_RATE_PER_MINUTE, SLOW_ENDPOINT_MS, SLOW_QUERY_MS};
