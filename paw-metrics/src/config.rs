use std::time::Duration;

use paw_core::PawConfigSnapshot;

/// Retention and alert-forwarding settings
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Retention of a per-minute sample bucket
    pub bucket_ttl: Duration,
    /// Retention of a persisted alert
    pub alert_ttl: Duration,
    /// Retention of a per-minute active-user set
    pub active_users_ttl: Duration,
    /// Where critical alerts are posted; `None` disables forwarding
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    /// Capacity of the alert broadcast channel
    pub alert_capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            bucket_ttl: Duration::from_secs(3600),
            alert_ttl: Duration::from_secs(86_400),
            active_users_ttl: Duration::from_secs(300),
            webhook_url: None,
            webhook_timeout: Duration::from_secs(5),
            alert_capacity: 256,
        }
    }
}

impl MetricsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `alerts.webhook_url`, `alerts.ttl_secs`, `alerts.webhook_timeout_ms`
    /// and `metrics.bucket_ttl_secs`.
    pub fn from_snapshot(snapshot: &PawConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            bucket_ttl: snapshot
                .get_secs("metrics.bucket_ttl_secs")
                .unwrap_or(defaults.bucket_ttl),
            alert_ttl: snapshot.get_secs("alerts.ttl_secs").unwrap_or(defaults.alert_ttl),
            webhook_url: snapshot.get_string("alerts.webhook_url"),
            webhook_timeout: snapshot
                .get_millis("alerts.webhook_timeout_ms")
                .unwrap_or(defaults.webhook_timeout),
            ..defaults
        }
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}
