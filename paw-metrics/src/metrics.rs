use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use paw_cache::Cache;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::sample::{bucket_key, buckets_in_window, minute_bucket};
use crate::{
    Alert, AlertNotifier, MetricKind, MetricSample, MetricStats, MetricsConfig, MetricsResult,
    PlatformHealth, Severity, Tags, WebhookNotifier,
};

/// Trailing window used by [`Metrics::health`]
pub const HEALTH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Metrics store and alert evaluator.
///
/// Samples are appended to per-minute buckets in the cache with a plain
/// read-modify-write, so concurrent writers to the same metric and minute
/// can lose samples. Percentiles are approximate in that sense only.
#[derive(Clone)]
pub struct Metrics {
    cache: Cache,
    config: MetricsConfig,
    notifier: Option<Arc<dyn AlertNotifier>>,
    alerts: broadcast::Sender<Alert>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .finish()
    }
}

impl Metrics {
    /// Metrics with default retention and no alert forwarding.
    pub fn new(cache: Cache) -> Self {
        let config = MetricsConfig::default();
        let (alerts, _) = broadcast::channel(config.alert_capacity);
        Self {
            cache,
            config,
            notifier: None,
            alerts,
        }
    }

    /// Metrics from configuration, forwarding critical alerts to
    /// `webhook_url` when one is set.
    pub fn from_config(cache: Cache, config: MetricsConfig) -> MetricsResult<Self> {
        let notifier = match &config.webhook_url {
            Some(url) => {
                let webhook = WebhookNotifier::new(url.clone(), config.webhook_timeout)?;
                info!(url = webhook.url(), "Forwarding critical alerts to webhook");
                Some(Arc::new(webhook) as Arc<dyn AlertNotifier>)
            }
            None => None,
        };

        let (alerts, _) = broadcast::channel(config.alert_capacity.max(1));
        Ok(Self {
            cache,
            config,
            notifier,
            alerts,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Every alert emitted from this point on.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.alerts.subscribe()
    }

    /// Append a sample to the current minute's bucket, then check the
    /// metric's static thresholds.
    ///
    /// Emits at most one alert: critical when `value >= critical`, otherwise
    /// warning when `value >= warning`.
    pub async fn record(&self, name: &str, value: f64, tags: Tags) {
        let sample = MetricSample::new(name, value, tags);
        let key = sample.bucket_key();

        let mut bucket: Vec<MetricSample> = self.cache.get(&key).await.unwrap_or_default();
        bucket.push(sample);
        self.cache.set(&key, &bucket, Some(self.config.bucket_ttl)).await;
        debug!(metric = name, value, "Recorded metric");

        self.check_thresholds(name, value).await;
    }

    async fn check_thresholds(&self, name: &str, value: f64) {
        let Some(thresholds) = MetricKind::from_name(name).and_then(|kind| kind.thresholds())
        else {
            return;
        };

        let alert = if value >= thresholds.critical {
            Alert::critical(
                format!("{} critical: {} >= {}", name, value, thresholds.critical),
                name,
                value,
                thresholds.critical,
            )
        } else if value >= thresholds.warning {
            Alert::warning(
                format!("{} warning: {} >= {}", name, value, thresholds.warning),
                name,
                value,
                thresholds.warning,
            )
        } else {
            return;
        };

        self.send_alert(alert).await;
    }

    /// Aggregate the samples recorded within the trailing `window`.
    ///
    /// Every minute bucket overlapping the window is read and samples
    /// older than `now - window` are dropped. Windows longer than the
    /// bucket retention are clamped to it.
    pub async fn stats(&self, name: &str, window: Duration) -> MetricStats {
        let window = window.min(self.config.bucket_ttl);
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let now_ms = Utc::now().timestamp_millis();
        let cutoff_ms = now_ms.saturating_sub(window_ms);

        let mut values = Vec::new();
        for minute in buckets_in_window(now_ms, window_ms) {
            let key = bucket_key(name, minute);
            if let Some(bucket) = self.cache.get::<Vec<MetricSample>>(&key).await {
                values.extend(
                    bucket
                        .into_iter()
                        .filter(|sample| sample.timestamp.timestamp_millis() >= cutoff_ms)
                        .map(|sample| sample.value),
                );
            }
        }

        MetricStats::from_values(values)
    }

    /// Score platform health from the last five minutes of API latency,
    /// error samples and DB query time.
    #[instrument(skip(self))]
    pub async fn health(&self) -> PlatformHealth {
        let api = self.stats(MetricKind::ApiResponseTime.name(), HEALTH_WINDOW).await;
        let errors = self.stats(MetricKind::ErrorCount.name(), HEALTH_WINDOW).await;
        let db = self.stats(MetricKind::DbQueryTime.name(), HEALTH_WINDOW).await;

        let health = PlatformHealth::evaluate(&api, &errors, &db);
        if !health.is_healthy() {
            warn!(
                score = health.score,
                status = %health.status,
                issues = ?health.issues,
                "Platform health degraded"
            );
        }
        health
    }

    /// Persist an alert, publish it to subscribers and, when critical,
    /// forward it to the notifier.
    ///
    /// Forwarding failures are logged and dropped.
    pub async fn send_alert(&self, alert: Alert) {
        self.cache
            .set(&alert.storage_key(), &alert, Some(self.config.alert_ttl))
            .await;

        match alert.severity {
            Severity::Critical => {
                error!(metric = %alert.metric, value = alert.value, "{}", alert.message)
            }
            Severity::Warning => {
                warn!(metric = %alert.metric, value = alert.value, "{}", alert.message)
            }
        }

        let _ = self.alerts.send(alert.clone());

        if !alert.is_critical() {
            return;
        }
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(&alert).await {
                error!(notifier = notifier.name(), error = %e, "Alert delivery failed");
            }
        }
    }

    /// Add `user_id` to the current minute's active-user set.
    pub(crate) async fn mark_active(&self, user_id: &str) {
        let key = active_users_key(minute_bucket(Utc::now().timestamp_millis()));
        let mut users: Vec<String> = self.cache.get(&key).await.unwrap_or_default();
        if users.iter().any(|u| u == user_id) {
            return;
        }
        users.push(user_id.to_string());
        self.cache.set(&key, &users, Some(self.config.active_users_ttl)).await;
    }

    /// Distinct users seen in the minute buckets overlapping `window`.
    ///
    /// Activity is kept per minute without timestamps, so the oldest
    /// overlapping minute counts in full. Buckets live for five minutes,
    /// so longer windows see no more.
    pub async fn active_user_count(&self, window: Duration) -> usize {
        let window = window.min(self.config.active_users_ttl);
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let now_ms = Utc::now().timestamp_millis();

        let mut users = BTreeSet::new();
        for minute in buckets_in_window(now_ms, window_ms) {
            if let Some(bucket) = self.cache.get::<Vec<String>>(&active_users_key(minute)).await {
                users.extend(bucket);
            }
        }
        users.len()
    }

    /// Drop every stored bucket for `name`.
    pub async fn clear(&self, name: &str) -> u64 {
        let deleted = self.cache.delete_pattern(&format!("metric:{}:*", name)).await;
        info!(metric = name, deleted, "Cleared metric buckets");
        deleted
    }
}

fn active_users_key(minute: i64) -> String {
    format!("active:users:{}", minute)
}
