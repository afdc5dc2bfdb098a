use std::fmt;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

const SUFFIX_LEN: usize = 9;

/// Unique identifier for a job, doubling as its cache key:
/// `job:<type>:<created_ms>:<random suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new id for a job of `job_type` created now.
    pub fn generate(job_type: &str) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        Self(format!("job:{}:{}:{}", job_type, Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The job type segment, if the id has the generated shape.
    pub fn job_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("job:")?;
        let mut parts = rest.rsplitn(3, ':');
        let _suffix = parts.next()?;
        let _created = parts.next()?;
        parts.next()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
