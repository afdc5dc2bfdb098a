use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::{CacheError, CacheResult, CacheStore};

#[derive(Debug, Clone)]
pub(crate) struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-process store used when no remote store is configured or reachable.
///
/// Expiry is checked when an entry is read. Entries that are never read
/// again stay resident until [`MemoryStore::purge_expired`] runs (see
/// [`MemorySweeper`](super::MemorySweeper)).
///
/// Cloning shares the underlying map, so a cloned handle sees the same data.
/// Build a fresh instance per test instead of sharing one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn read_live(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    fn write(&self, key: &str, value: String, ttl: Duration) {
        let entry = MemoryEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
    }
}

/// Fallback pattern matching: the glob is reduced to its literal text and
/// matched as a substring (`metric:api.*` matches any key containing
/// `metric:api.`).
fn matches_pattern(key: &str, pattern: &str) -> bool {
    let fragment = pattern.replace('*', "");
    key.contains(&fragment)
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.read_live(key);
        debug!(key = key, hit = value.is_some(), "Memory cache GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.write(key, value.to_string(), ttl);
        debug!(key = key, ttl_seconds = ttl.as_secs(), "Memory cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.write().remove(key);
        debug!(key = key, "Memory cache DEL");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let matching: Vec<String> = entries
            .keys()
            .filter(|key| matches_pattern(key, pattern))
            .cloned()
            .collect();

        let mut deleted = 0;
        for key in matching {
            if let Some(entry) = entries.remove(&key) {
                if !entry.is_expired(now) {
                    deleted += 1;
                }
            }
        }

        debug!(pattern = pattern, deleted = deleted, "Memory cache pattern DEL");
        Ok(deleted)
    }

    /// Read-modify-write across two separate lock acquisitions.
    ///
    /// Not atomic: concurrent callers can lose updates. The in-process store
    /// is a single-process fallback; only the remote store guarantees exact
    /// counts under concurrency.
    async fn increment(&self, key: &str, ttl: Duration) -> CacheResult<i64> {
        let current = match self.read_live(key) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| CacheError::NotAnInteger(key.to_string()))?,
            None => 0,
        };
        let next = current + 1;
        self.write(key, next.to_string(), ttl);
        Ok(next)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_none_on_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryStore::new();
        store.set("booking:42", "confirmed", Duration::from_secs(10)).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(store.get("booking:42").await.unwrap(), Some("confirmed".to_string()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("booking:42").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_overwrites_value_and_expiry() {
        let store = MemoryStore::new();
        store.set("k", "first", Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        store.set("k", "second", Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;

        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_delete_pattern_uses_substring_match() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set("metric:api.response_time:1", "a", ttl).await.unwrap();
        store.set("metric:api.response_time:2", "b", ttl).await.unwrap();
        store.set("metric:db.query_time:1", "c", ttl).await.unwrap();

        let deleted = store.delete_pattern("metric:api.*").await.unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.get("metric:db.query_time:1").await.unwrap(), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_increment_counts_from_zero() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(store.increment("hits", ttl).await.unwrap(), 1);
        assert_eq!(store.increment("hits", ttl).await.unwrap(), 2);
        assert_eq!(store.get("hits").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_increment_rejects_non_integer() {
        let store = MemoryStore::new();
        store.set("name", "\"rex\"", Duration::from_secs(60)).await.unwrap();

        let err = store.increment("name", Duration::from_secs(60)).await.unwrap_err();
        assert!(matches!(err, CacheError::NotAnInteger(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_removes_only_dead_entries() {
        let store = MemoryStore::new();
        store.set("short", "1", Duration::from_secs(1)).await.unwrap();
        store.set("long", "2", Duration::from_secs(100)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
