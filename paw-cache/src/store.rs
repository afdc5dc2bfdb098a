use std::time::Duration;

use async_trait::async_trait;

use crate::CacheResult;

/// Storage primitives behind the [`Cache`](crate::Cache) facade.
///
/// Values are opaque strings; the facade handles (de)serialization.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on miss or when the entry has expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` with an absolute expiry of now + `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching `pattern`, returning how many were removed.
    ///
    /// Deletions are independent: a failure part-way through leaves the
    /// already-deleted keys deleted.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Add one to the integer at `key` (missing counts as 0) and refresh its TTL.
    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;

    /// Whether state is shared across processes.
    fn is_distributed(&self) -> bool {
        false
    }
}
