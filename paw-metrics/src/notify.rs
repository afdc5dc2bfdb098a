use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::debug;

use crate::{Alert, MetricsError, MetricsResult};

/// Outbound sink for critical alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> MetricsResult<()>;

    fn name(&self) -> &'static str;
}

/// Posts alerts as JSON to a chat-style incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: HttpClient,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> MetricsResult<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| MetricsError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `{text, attachments: [{metric, value, threshold, time}]}`
    pub(crate) fn payload(alert: &Alert) -> Value {
        json!({
            "text": format!("[{}] {}", alert.severity.as_str().to_uppercase(), alert.message),
            "attachments": [{
                "metric": alert.metric,
                "value": alert.value,
                "threshold": alert.threshold,
                "time": alert.timestamp.to_rfc3339(),
            }],
        })
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> MetricsResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::payload(alert))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetricsError::Status(response.status().as_u16()));
        }

        debug!(metric = %alert.metric, url = %self.url, "Alert delivered to webhook");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let alert = Alert::critical("API latency critical", "api.response_time", 3500.0, 3000.0);
        let payload = WebhookNotifier::payload(&alert);

        assert_eq!(payload["text"], "[CRITICAL] API latency critical");
        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["metric"], "api.response_time");
        assert_eq!(attachment["value"], 3500.0);
        assert_eq!(attachment["threshold"], 3000.0);
        assert_eq!(attachment["time"], alert.timestamp.to_rfc3339());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_an_error() {
        let notifier =
            WebhookNotifier::new("http://127.0.0.1:1/hooks/alerts", Duration::from_secs(2))
                .unwrap();
        let alert = Alert::critical("x", "errors.count", 60.0, 50.0);

        assert!(notifier.notify(&alert).await.is_err());
    }
}
