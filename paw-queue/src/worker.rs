use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{Job, JobError, JobQueue, ProcessOptions, QueueError, QueueResult};

/// Handle for a running background worker
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown_tx: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Stop the worker after its current pass finishes.
    pub async fn shutdown(self) -> QueueResult<()> {
        let _ = self.shutdown_tx.send(());
        self.join_handle
            .await
            .map_err(|e| QueueError::Worker(format!("Worker join error: {}", e)))
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

impl JobQueue {
    /// Spawn a loop that runs processing passes for `job_type`.
    ///
    /// A pass that ran at least one job is followed immediately by another;
    /// an idle pass waits `poll_interval`. Shutdown is only observed between
    /// passes, so an in-flight job always reaches a recorded outcome.
    /// `None` options use the queue's configured defaults.
    pub fn start_worker<H, Fut>(
        &self,
        job_type: impl Into<String>,
        handler: H,
        options: Option<ProcessOptions>,
        poll_interval: Duration,
    ) -> WorkerHandle
    where
        H: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let options = options.unwrap_or(self.config().process);
        let queue = self.clone();
        let job_type = job_type.into();

        let join_handle = tokio::spawn(async move {
            info!(job_type = %job_type, "Worker started");
            loop {
                let processed = queue.process(&job_type, &handler, options).await;
                let pause = if processed == 0 {
                    poll_interval
                } else {
                    debug!(job_type = %job_type, processed, "Worker pass finished");
                    Duration::ZERO
                };

                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
            info!(job_type = %job_type, "Worker stopped");
        });

        WorkerHandle {
            shutdown_tx,
            join_handle,
        }
    }

    /// Typed counterpart of [`start_worker`](Self::start_worker).
    pub fn start_job_worker<J: Job>(
        &self,
        ctx: J::Context,
        options: Option<ProcessOptions>,
        poll_interval: Duration,
    ) -> WorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let options = options.unwrap_or(self.config().process);
        let queue = self.clone();

        let join_handle = tokio::spawn(async move {
            info!(job_type = J::JOB_TYPE, "Worker started");
            loop {
                let processed = queue.process_jobs::<J>(ctx.clone(), options).await;
                let pause = if processed == 0 { poll_interval } else { Duration::ZERO };

                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
            info!(job_type = J::JOB_TYPE, "Worker stopped");
        });

        WorkerHandle {
            shutdown_tx,
            join_handle,
        }
    }
}
