use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold breach, persisted under `alert:<ms>` for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        metric: impl Into<String>,
        value: f64,
        threshold: f64,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            metric: metric.into(),
            value,
            threshold,
            timestamp: Utc::now(),
        }
    }

    pub fn warning(
        message: impl Into<String>,
        metric: impl Into<String>,
        value: f64,
        threshold: f64,
    ) -> Self {
        Self::new(Severity::Warning, message, metric, value, threshold)
    }

    pub fn critical(
        message: impl Into<String>,
        metric: impl Into<String>,
        value: f64,
        threshold: f64,
    ) -> Self {
        Self::new(Severity::Critical, message, metric, value, threshold)
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    pub fn storage_key(&self) -> String {
        format!("alert:{}", self.timestamp.timestamp_millis())
    }
}
