use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form labels attached to a sample
pub type Tags = BTreeMap<String, String>;

const BUCKET_MS: i64 = 60_000;

/// One recorded observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64, tags: Tags) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp: Utc::now(),
            tags,
        }
    }

    pub fn bucket_key(&self) -> String {
        bucket_key(&self.name, minute_bucket(self.timestamp.timestamp_millis()))
    }
}

/// Minute index of a millisecond timestamp.
pub fn minute_bucket(ts_ms: i64) -> i64 {
    ts_ms.div_euclid(BUCKET_MS)
}

pub fn bucket_key(name: &str, minute: i64) -> String {
    format!("metric:{}:{}", name, minute)
}

/// Minute indices overlapping `[now_ms - window_ms, now_ms]`, oldest first.
pub fn buckets_in_window(now_ms: i64, window_ms: i64) -> impl Iterator<Item = i64> {
    minute_bucket(now_ms.saturating_sub(window_ms.max(0)))..=minute_bucket(now_ms)
}

/// Build tags from string pairs.
pub fn tags<const N: usize>(pairs: [(&str, String); N]) -> Tags {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
