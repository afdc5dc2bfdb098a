use std::future::Future;

use chrono::Utc;
use paw_cache::Cache;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    EnqueueOptions, Job, JobError, JobEvent, JobId, JobRecord, JobStatus, ProcessOptions,
    QueueConfig, QueueResult, QueueStats,
};

/// Cache-backed job queue.
///
/// Jobs live under their id (`job:<type>:<ms>:<suffix>`) and each job type
/// keeps a list of ids believed non-terminal under `queue:<type>`. The two
/// writes are independent; an index entry whose job is missing is skipped
/// and pruned, never treated as an error.
///
/// Concurrency: the "skip if already processing" check is a plain read
/// followed by a write. Two passes racing on the same type can both see a
/// job as pending and both run it. Handlers must be idempotent.
#[derive(Clone)]
pub struct JobQueue {
    cache: Cache,
    config: QueueConfig,
    events: broadcast::Sender<JobEvent>,
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

fn index_key(job_type: &str) -> String {
    format!("queue:{}", job_type)
}

impl JobQueue {
    pub fn new(cache: Cache) -> Self {
        Self::with_config(cache, QueueConfig::default())
    }

    pub fn with_config(cache: Cache, config: QueueConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            cache,
            config,
            events,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Subscribe to lifecycle events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: JobEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Persist a new pending job and append it to its type's index.
    #[instrument(skip(self, payload))]
    pub async fn enqueue(
        &self,
        job_type: &str,
        payload: Value,
        options: EnqueueOptions,
    ) -> JobId {
        let record = JobRecord::new(job_type, payload, options.max_attempts);
        let job_id = record.id.clone();

        self.save(&record).await;

        let key = index_key(job_type);
        let mut index = self.load_index(&key).await;
        index.push(job_id.clone());
        self.cache.set(&key, &index, Some(self.config.index_ttl)).await;

        self.emit(JobEvent::Enqueued {
            job_id: job_id.clone(),
            job_type: job_type.to_string(),
            at: record.created_at,
        });
        info!(job_id = %job_id, "Enqueued job");
        job_id
    }

    /// Enqueue a typed job under `J::JOB_TYPE` with `J::MAX_ATTEMPTS`.
    pub async fn enqueue_job<J: Job>(&self, job: &J) -> QueueResult<JobId> {
        let payload = serde_json::to_value(job)?;
        let options = EnqueueOptions::new().with_max_attempts(J::MAX_ATTEMPTS);
        Ok(self.enqueue(J::JOB_TYPE, payload, options).await)
    }

    pub async fn status(&self, job_id: &JobId) -> Option<JobRecord> {
        self.cache.get(job_id.as_str()).await
    }

    /// Cancel a pending job. Processing and terminal jobs are left alone.
    ///
    /// Returns whether the job was cancelled.
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        let Some(mut record) = self.status(job_id).await else {
            debug!(job_id = %job_id, "Cancel ignored, job not found");
            return false;
        };

        if !record.cancel() {
            debug!(
                job_id = %job_id,
                status = record.status.name(),
                "Cancel ignored, job not pending"
            );
            return false;
        }

        self.save(&record).await;
        self.emit(JobEvent::Canceled {
            job_id: job_id.clone(),
            at: Utc::now(),
        });
        info!(job_id = %job_id, "Cancelled job");
        true
    }

    /// Count statuses of every job currently in the type's index.
    pub async fn stats(&self, job_type: &str) -> QueueStats {
        let mut stats = QueueStats::default();
        for job_id in self.load_index(&index_key(job_type)).await {
            match self.status(&job_id).await.map(|record| record.status) {
                Some(JobStatus::Pending) => stats.pending += 1,
                Some(JobStatus::Processing) => stats.processing += 1,
                Some(JobStatus::Completed) => stats.completed += 1,
                Some(JobStatus::Failed) => stats.failed += 1,
                None => {}
            }
        }
        stats
    }

    /// Run one processing pass over the first `max_batch` index entries.
    ///
    /// Each eligible job is moved to `processing`, handed to `handler`, and
    /// then completed, returned to `pending`, or failed. After a retryable
    /// failure the pass waits `retry_delay` before the next job. The index
    /// is rebuilt at the end. Returns how many handler invocations ran.
    ///
    /// A timed-out handler future is dropped, so it stops at its next await
    /// point; work it spawned onto the runtime keeps running.
    #[instrument(skip(self, handler))]
    pub async fn process<H, Fut>(
        &self,
        job_type: &str,
        handler: H,
        options: ProcessOptions,
    ) -> usize
    where
        H: Fn(Value) -> Fut,
        Fut: Future<Output = Result<(), JobError>>,
    {
        let key = index_key(job_type);
        let batch: Vec<JobId> = self
            .load_index(&key)
            .await
            .into_iter()
            .take(options.max_batch)
            .collect();

        let mut processed = 0;
        for job_id in batch {
            if job_id.job_type().is_some_and(|owner| owner != job_type) {
                debug!(job_id = %job_id, "Skipping index entry of another job type");
                continue;
            }
            let Some(mut record) = self.status(&job_id).await else {
                debug!(job_id = %job_id, "Skipping index entry with no job");
                continue;
            };
            match record.status {
                JobStatus::Completed | JobStatus::Failed => continue,
                JobStatus::Processing => {
                    debug!(job_id = %job_id, "Skipping job already being processed");
                    continue;
                }
                JobStatus::Pending => {}
            }

            record.start_attempt();
            self.save(&record).await;
            self.emit(JobEvent::Started {
                job_id: job_id.clone(),
                attempt: record.attempts,
                at: Utc::now(),
            });
            debug!(job_id = %job_id, attempt = record.attempts, "Processing job");

            let attempt = handler(record.payload.clone());
            let outcome = match tokio::time::timeout(options.timeout, attempt).await {
                Ok(result) => result,
                Err(_) => Err(JobError::timeout()),
            };
            processed += 1;

            match outcome {
                Ok(()) => {
                    record.complete();
                    self.save(&record).await;
                    self.emit(JobEvent::Completed {
                        job_id: job_id.clone(),
                        at: Utc::now(),
                    });
                    info!(job_id = %job_id, attempt = record.attempts, "Job completed");
                }
                Err(job_error) if !job_error.is_retryable() || record.attempts_exhausted() => {
                    let message = job_error.message().to_string();
                    record.fail(message.clone());
                    self.save(&record).await;
                    self.emit(JobEvent::Failed {
                        job_id: job_id.clone(),
                        error: message,
                        at: Utc::now(),
                    });
                    error!(
                        job_id = %job_id,
                        attempts = record.attempts,
                        error = %job_error,
                        "Job failed permanently"
                    );
                }
                Err(job_error) => {
                    let message = job_error.message().to_string();
                    record.schedule_retry(message.clone());
                    self.save(&record).await;
                    self.emit(JobEvent::Retrying {
                        job_id: job_id.clone(),
                        attempt: record.attempts,
                        error: message,
                        at: Utc::now(),
                    });
                    warn!(
                        job_id = %job_id,
                        attempt = record.attempts,
                        max_attempts = record.max_attempts,
                        error = %job_error,
                        "Job failed, will retry"
                    );
                    tokio::time::sleep(options.retry_delay).await;
                }
            }
        }

        self.rebuild_index(&key).await;
        processed
    }

    /// [`process`](Self::process) with the queue's configured options.
    pub async fn process_default<H, Fut>(&self, job_type: &str, handler: H) -> usize
    where
        H: Fn(Value) -> Fut,
        Fut: Future<Output = Result<(), JobError>>,
    {
        self.process(job_type, handler, self.config.process).await
    }

    /// Process jobs of type `J::JOB_TYPE`, decoding each payload into `J`.
    ///
    /// A payload that no longer decodes fails the job without retry.
    pub async fn process_jobs<J: Job>(&self, ctx: J::Context, options: ProcessOptions) -> usize {
        let handler = move |payload: Value| {
            let ctx = ctx.clone();
            async move {
                let job: J = serde_json::from_value(payload)
                    .map_err(|e| JobError::permanent(format!("Failed to deserialize job: {}", e)))?;
                job.execute(ctx).await
            }
        };
        self.process(J::JOB_TYPE, handler, options).await
    }

    async fn save(&self, record: &JobRecord) {
        let ttl = match record.status {
            JobStatus::Completed => self.config.completed_ttl,
            _ => self.config.job_ttl,
        };
        self.cache.set(record.id.as_str(), record, Some(ttl)).await;
    }

    async fn load_index(&self, key: &str) -> Vec<JobId> {
        self.cache.get(key).await.unwrap_or_default()
    }

    /// Keep only ids whose job exists and is pending or processing.
    async fn rebuild_index(&self, key: &str) {
        let mut live = Vec::new();
        for job_id in self.load_index(key).await {
            if let Some(record) = self.status(&job_id).await {
                if !record.status.is_terminal() {
                    live.push(job_id);
                }
            }
        }
        debug!(index = key, remaining = live.len(), "Rebuilt queue index");
        self.cache.set(key, &live, Some(self.config.index_ttl)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn queue() -> JobQueue {
        JobQueue::new(Cache::in_memory())
    }

    #[tokio::test]
    async fn test_enqueue_persists_pending_job_and_index() {
        let queue = queue();
        let job_id = queue
            .enqueue("send_email", json!({"to": "owner@example.com"}), EnqueueOptions::default())
            .await;

        let record = queue.status(&job_id).await.unwrap();
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!(record.max_attempts, 3);
        assert_eq!(record.payload["to"], "owner@example.com");

        let index: Vec<JobId> = queue.cache().get("queue:send_email").await.unwrap();
        assert_eq!(index, vec![job_id]);
    }

    #[tokio::test]
    async fn test_status_of_unknown_job_is_none() {
        assert!(queue().status(&JobId::from("job:x:1:abc")).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_queue_processes_nothing() {
        let processed = queue()
            .process("idle", |_| async { Ok(()) }, ProcessOptions::default())
            .await;
        assert_eq!(processed, 0);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_retry_and_failure_are_logged() {
        let queue = queue();
        queue.enqueue("t", Value::Null, EnqueueOptions::new().with_max_attempts(2)).await;
        let options = ProcessOptions::default().with_retry_delay(std::time::Duration::ZERO);

        for _ in 0..2 {
            queue
                .process("t", |_| async { Err(JobError::retryable("vet API down")) }, options)
                .await;
        }

        assert!(logs_contain("Job failed, will retry"));
        assert!(logs_contain("Job failed permanently"));
        assert!(logs_contain("vet API down"));
    }

    #[tokio::test]
    async fn test_process_default_uses_configured_batch() {
        let config = QueueConfig::default()
            .with_process_options(ProcessOptions::default().with_max_batch(1));
        let queue = JobQueue::with_config(Cache::in_memory(), config);
        let first = queue.enqueue("t", Value::Null, EnqueueOptions::default()).await;
        let second = queue.enqueue("t", Value::Null, EnqueueOptions::default()).await;

        assert_eq!(queue.process_default("t", |_| async { Ok(()) }).await, 1);

        assert_eq!(queue.status(&first).await.unwrap().status, JobStatus::Completed);
        assert_eq!(queue.status(&second).await.unwrap().status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_foreign_index_entry_is_skipped() {
        let queue = queue();
        let other = queue.enqueue("other", Value::Null, EnqueueOptions::default()).await;
        queue.cache().set("queue:t", &vec![other.clone()], None).await;

        let processed = queue
            .process("t", |_| async { Ok(()) }, ProcessOptions::default())
            .await;

        assert_eq!(processed, 0);
        assert_eq!(queue.status(&other).await.unwrap().status, JobStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_job_uses_short_retention() {
        let queue = queue();
        let job_id = queue.enqueue("t", Value::Null, EnqueueOptions::default()).await;
        queue.process("t", |_| async { Ok(()) }, ProcessOptions::default()).await;

        tokio::time::advance(std::time::Duration::from_secs(3599)).await;
        assert!(queue.status(&job_id).await.is_some());

        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        assert!(queue.status(&job_id).await.is_none());
    }
}
