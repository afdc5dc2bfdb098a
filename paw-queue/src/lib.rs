//! # paw-queue
//!
//! Background job queue persisted entirely through [`paw_cache::Cache`].
//!
//! Jobs are enqueued by type with a JSON payload, picked up by processing
//! passes that run a handler under a timeout, and retried on failure until
//! `max_attempts` is used up. Completed jobs are retained for an hour, all
//! others for a day.
//!
//! ```rust
//! use paw_cache::Cache;
//! use paw_queue::{EnqueueOptions, JobQueue, JobStatus, ProcessOptions};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let queue = JobQueue::new(Cache::in_memory());
//! let job_id = queue
//!     .enqueue("email.reminder", json!({"booking_id": 7}), EnqueueOptions::default())
//!     .await;
//!
//! let processed = queue
//!     .process("email.reminder", |_payload| async { Ok(()) }, ProcessOptions::default())
//!     .await;
//!
//! assert_eq!(processed, 1);
//! assert_eq!(queue.status(&job_id).await.unwrap().status, JobStatus::Completed);
//! # });
//! ```
//!
//! Passes are not coordinated. Two passes over the same job type may run
//! the same job twice, so handlers should be idempotent.

pub mod config;
pub mod error;
pub mod job;
pub mod queue;
pub mod types;
pub mod worker;

pub use config::QueueConfig;
pub use error::{JobError, QueueError, QueueResult, TIMEOUT_MESSAGE};
pub use job::Job;
pub use queue::JobQueue;
pub use types::*;
pub use worker::WorkerHandle;

pub use async_trait::async_trait;
