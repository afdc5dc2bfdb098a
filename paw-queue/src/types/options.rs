use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-job settings supplied at enqueue time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnqueueOptions {
    /// Handler invocations allowed before the job fails for good
    pub max_attempts: u32,
}

impl Default for EnqueueOptions {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl EnqueueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Settings for one processing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Index entries examined per pass
    pub max_batch: usize,
    /// Wall-clock limit for one handler invocation
    pub timeout: Duration,
    /// Pause after a retryable failure before the next job in the pass
    pub retry_delay: Duration,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            max_batch: 10,
            timeout: Duration::from_millis(30_000),
            retry_delay: Duration::from_millis(5_000),
        }
    }
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Status counts across a job type's index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.failed
    }
}
