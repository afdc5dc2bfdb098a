use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::JobId;

pub const CANCELLED_MESSAGE: &str = "Cancelled by user";

/// Job status lifecycle
///
/// `Pending -> Processing -> {Completed | Pending (retry) | Failed}`, plus
/// `Pending -> Failed` on cancel. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Job record as persisted under its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: JobId,

    #[serde(rename = "type")]
    pub job_type: String,

    /// Opaque handler input
    pub payload: Value,

    pub status: JobStatus,

    /// Handler invocations so far (starts at 0)
    pub attempts: u32,

    pub max_attempts: u32,

    pub created_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Last failure message, if any
    pub error: Option<String>,
}

impl JobRecord {
    pub fn new(job_type: &str, payload: Value, max_attempts: u32) -> Self {
        Self {
            id: JobId::generate(job_type),
            job_type: job_type.to_string(),
            payload,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    /// Move to `Processing` and consume one attempt.
    pub fn start_attempt(&mut self) {
        self.status = JobStatus::Processing;
        self.attempts += 1;
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Back to `Pending` for a later pass, keeping the error.
    pub fn schedule_retry(&mut self, error: String) {
        self.status = JobStatus::Pending;
        self.error = Some(error);
    }

    pub fn fail(&mut self, error: String) {
        self.status = JobStatus::Failed;
        self.error = Some(error);
    }

    /// Cancel-if-pending. Returns whether the record changed.
    pub fn cancel(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.fail(CANCELLED_MESSAGE.to_string());
        true
    }
}
