use std::time::Duration;

use paw_core::PawConfigSnapshot;

use crate::ProcessOptions;

/// Retention and default processing settings for a [`JobQueue`](crate::JobQueue)
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Retention for pending, processing and failed jobs
    pub job_ttl: Duration,
    /// Retention once a job completes
    pub completed_ttl: Duration,
    /// Retention for a job type's id index
    pub index_ttl: Duration,
    /// Options used by workers unless overridden
    pub process: ProcessOptions,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            job_ttl: Duration::from_secs(24 * 60 * 60),
            completed_ttl: Duration::from_secs(60 * 60),
            index_ttl: Duration::from_secs(24 * 60 * 60),
            process: ProcessOptions::default(),
            event_capacity: 1000,
        }
    }
}

impl QueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `queue.max_batch`, `queue.timeout_ms` and `queue.retry_delay_ms`.
    pub fn from_snapshot(snapshot: &PawConfigSnapshot) -> Self {
        let defaults = Self::default();
        let process = ProcessOptions {
            max_batch: snapshot
                .get_usize("queue.max_batch")
                .unwrap_or(defaults.process.max_batch),
            timeout: snapshot
                .get_millis("queue.timeout_ms")
                .unwrap_or(defaults.process.timeout),
            retry_delay: snapshot
                .get_millis("queue.retry_delay_ms")
                .unwrap_or(defaults.process.retry_delay),
        };

        Self { process, ..defaults }
    }

    pub fn with_process_options(mut self, process: ProcessOptions) -> Self {
        self.process = process;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paw_core::PawConfig;

    #[test]
    fn test_snapshot_overrides_process_defaults() {
        let mut raw = PawConfig::new();
        raw.set("queue.max_batch", "25");
        raw.set("queue.retry_delay_ms", "100");

        let config = QueueConfig::from_snapshot(&raw.snapshot());

        assert_eq!(config.process.max_batch, 25);
        assert_eq!(config.process.retry_delay, Duration::from_millis(100));
        assert_eq!(config.process.timeout, Duration::from_secs(30));
        assert_eq!(config.completed_ttl, Duration::from_secs(3600));
    }
}
