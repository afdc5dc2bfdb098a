use std::time::Duration;

use crate::sample::tags;
use crate::{Alert, MetricKind, Metrics};

/// Response time above which an endpoint is reported as slow
pub const SLOW_ENDPOINT_MS: f64 = 2000.0;

/// `errors.count` samples per trailing minute that trip the error-rate alert
pub const ERROR_RATE_PER_MINUTE: usize = 10;

/// Query time above which a query is reported as slow
pub const SLOW_QUERY_MS: f64 = 1000.0;

const ERROR_RATE_WINDOW: Duration = Duration::from_secs(60);

impl Metrics {
    /// Record an API call's latency, warning separately on slow endpoints.
    pub async fn track_response_time(&self, endpoint: &str, duration_ms: f64, status_code: u16) {
        let name = MetricKind::ApiResponseTime.name();
        self.record(
            name,
            duration_ms,
            tags([
                ("endpoint", endpoint.to_string()),
                ("status", status_code.to_string()),
            ]),
        )
        .await;

        if duration_ms > SLOW_ENDPOINT_MS {
            self.send_alert(Alert::warning(
                format!("Slow endpoint: {} took {:.0}ms", endpoint, duration_ms),
                name,
                duration_ms,
                SLOW_ENDPOINT_MS,
            ))
            .await;
        }
    }

    /// Record one error occurrence and check the trailing-minute error rate.
    pub async fn track_error(&self, error_type: &str, context: &str) {
        let name = MetricKind::ErrorCount.name();
        self.record(
            name,
            1.0,
            tags([
                ("type", error_type.to_string()),
                ("context", context.to_string()),
            ]),
        )
        .await;

        let rate = self.stats(name, ERROR_RATE_WINDOW).await.count;
        if rate > ERROR_RATE_PER_MINUTE {
            self.send_alert(Alert::critical(
                format!("High error rate: {} errors in the last minute", rate),
                name,
                rate as f64,
                ERROR_RATE_PER_MINUTE as f64,
            ))
            .await;
        }
    }

    /// Record a user action and mark the user active for this minute.
    pub async fn track_user_action(&self, user_id: &str, action: &str) {
        self.record(
            MetricKind::UserAction.name(),
            1.0,
            tags([
                ("user", user_id.to_string()),
                ("action", action.to_string()),
            ]),
        )
        .await;
        self.mark_active(user_id).await;
    }

    /// Record a database query's latency, warning separately on slow queries.
    pub async fn track_query(&self, query: &str, duration_ms: f64) {
        let name = MetricKind::DbQueryTime.name();
        self.record(name, duration_ms, tags([("query", query.to_string())]))
            .await;

        if duration_ms > SLOW_QUERY_MS {
            self.send_alert(Alert::warning(
                format!("Slow query: {} took {:.0}ms", query, duration_ms),
                name,
                duration_ms,
                SLOW_QUERY_MS,
            ))
            .await;
        }
    }

    /// Record a payment-provider call; a failure also counts an error and
    /// raises a warning.
    pub async fn track_stripe_operation(&self, operation: &str, duration_ms: f64, success: bool) {
        self.record(
            MetricKind::StripeOperationTime.name(),
            duration_ms,
            tags([
                ("operation", operation.to_string()),
                ("success", success.to_string()),
            ]),
        )
        .await;

        if success {
            return;
        }

        let name = MetricKind::StripeErrors.name();
        self.record(name, 1.0, tags([("operation", operation.to_string())]))
            .await;
        self.send_alert(Alert::warning(
            format!("Stripe operation failed: {}", operation),
            name,
            1.0,
            0.0,
        ))
        .await;
    }

    /// Record process memory and CPU utilisation percentages.
    pub async fn track_resource_usage(&self, memory_percent: f64, cpu_percent: f64) {
        self.record(MetricKind::MemoryUsage.name(), memory_percent, Default::default())
            .await;
        self.record(MetricKind::CpuUsage.name(), cpu_percent, Default::default())
            .await;
    }
}
