//! # paw-cache: best-effort key/value cache
//!
//! A uniform get/set/delete/pattern-delete/increment API over Redis, with an
//! in-process [`MemoryStore`] that takes over whenever no remote store is
//! configured or a remote call fails. Nothing here ever returns an error to
//! the caller: reads degrade to a miss and writes degrade to a local write.
//!
//! The job queue and the metrics store persist all their state through this
//! crate.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use paw_cache::{Cache, CacheConfig};
//!
//! # tokio_test::block_on(async {
//! // No redis_url configured: the in-process store is selected
//! let cache = Cache::connect(&CacheConfig::default()).await;
//!
//! cache.set("sitter:42:rating", &4.8_f64, Some(Duration::from_secs(60))).await;
//! assert_eq!(cache.get::<f64>("sitter:42:rating").await, Some(4.8));
//!
//! let views = cache.increment("sitter:42:views", None).await;
//! assert_eq!(views, 1);
//! # });
//! ```
//!
//! ## Guarantees
//!
//! - A `get` after an entry's TTL has elapsed is a miss, never stale data.
//! - `increment` is atomic only against Redis. The in-process fallback does
//!   a non-atomic read-modify-write and can lose updates under concurrency.
//! - `with_refresh` has no single-flight de-duplication.

pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;

#[cfg(feature = "redis")]
pub mod redis_store;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use memory::{MemorySweeper, MemoryStore, SweeperHandle};
pub use store::CacheStore;

#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
