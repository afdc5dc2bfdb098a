use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::{CacheConfig, DEFAULT_TTL};
use crate::memory::{MemorySweeper, MemoryStore, SweeperHandle};
use crate::CacheStore;

/// Best-effort cache facade.
///
/// Every operation first tries the remote store (when one is configured)
/// and, on any remote error, logs a warning and repeats the operation
/// against the in-process [`MemoryStore`]. Callers never see an error:
/// reads degrade to a miss, writes degrade to a local write.
#[derive(Clone)]
pub struct Cache {
    remote: Option<Arc<dyn CacheStore>>,
    fallback: MemoryStore,
    default_ttl: Duration,
    sweeper: Option<Arc<SweeperHandle>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("remote", &self.remote.as_ref().map(|r| r.provider_name()))
            .field("fallback_entries", &self.fallback.len())
            .field("default_ttl", &self.default_ttl)
            .field("sweeper", &self.sweeper.is_some())
            .finish()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Cache {
    /// Cache backed only by a fresh in-process store.
    pub fn in_memory() -> Self {
        Self {
            remote: None,
            fallback: MemoryStore::new(),
            default_ttl: DEFAULT_TTL,
            sweeper: None,
        }
    }

    /// Cache over an explicit remote store and fallback instance.
    pub fn with_store(remote: Arc<dyn CacheStore>, fallback: MemoryStore) -> Self {
        Self {
            remote: Some(remote),
            fallback,
            default_ttl: DEFAULT_TTL,
            sweeper: None,
        }
    }

    /// Cache over an explicit fallback instance and no remote store.
    pub fn with_fallback(fallback: MemoryStore) -> Self {
        Self {
            remote: None,
            fallback,
            default_ttl: DEFAULT_TTL,
            sweeper: None,
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Build a cache from configuration, never failing.
    ///
    /// A missing `redis_url` silently selects the in-process store. A
    /// configured but unreachable server logs a warning and also selects
    /// the in-process store. When `sweep_interval` is set a sweeper runs
    /// over the fallback store until the last clone of the cache is dropped.
    pub async fn connect(config: &CacheConfig) -> Self {
        let mut cache = Self::in_memory().with_default_ttl(config.default_ttl);

        match config.redis_url.as_deref() {
            None => info!("No remote cache configured, using in-process store"),
            Some(url) => {
                if let Some(remote) = Self::connect_remote(url, config.connect_timeout).await {
                    info!(provider = remote.provider_name(), "Remote cache connected");
                    cache.remote = Some(remote);
                }
            }
        }

        if let Some(interval) = config.sweep_interval {
            cache.sweeper = Some(Arc::new(cache.spawn_sweeper(interval)));
        }
        cache
    }

    #[cfg(feature = "redis")]
    async fn connect_remote(url: &str, timeout: Duration) -> Option<Arc<dyn CacheStore>> {
        use crate::redis_store::{redact_url, RedisStore};

        match tokio::time::timeout(timeout, RedisStore::connect(url)).await {
            Ok(Ok(store)) => Some(Arc::new(store)),
            Ok(Err(e)) => {
                warn!(
                    url = %redact_url(url),
                    error = %e,
                    "Remote cache unavailable, using in-process store"
                );
                None
            }
            Err(_) => {
                warn!(
                    url = %redact_url(url),
                    timeout_ms = timeout.as_millis() as u64,
                    "Remote cache connect timed out, using in-process store"
                );
                None
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn connect_remote(_url: &str, _timeout: Duration) -> Option<Arc<dyn CacheStore>> {
        warn!(
            "Remote cache configured but the `redis` feature is disabled, using in-process store"
        );
        None
    }

    /// Whether `connect` started a sweeper owned by this cache.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Start a background sweeper over the fallback store.
    ///
    /// The caller owns the handle; dropping it stops the sweeper.
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        MemorySweeper::with_interval(self.fallback.clone(), interval).spawn()
    }

    /// The in-process store used when the remote store is absent or failing.
    pub fn fallback(&self) -> &MemoryStore {
        &self.fallback
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn provider_name(&self) -> &'static str {
        self.remote
            .as_ref()
            .map(|remote| remote.provider_name())
            .unwrap_or_else(|| self.fallback.provider_name())
    }

    pub fn is_distributed(&self) -> bool {
        self.remote.as_ref().is_some_and(|remote| remote.is_distributed())
    }

    /// `true` when the active store answers its health probe.
    pub async fn health_check(&self) -> bool {
        match &self.remote {
            Some(remote) => match remote.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    warn!(error = %e, "Remote cache health check failed");
                    false
                }
            },
            None => true,
        }
    }

    /// Raw string read; remote failure falls through to the fallback store.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(value) => return value,
                Err(e) => warn!(key = key, error = %e, "Remote cache GET failed, using fallback"),
            }
        }
        self.fallback.get(key).await.unwrap_or_default()
    }

    /// Read and decode a value. Undecodable data counts as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = key, error = %e, "Cached value could not be decoded, treating as miss");
                None
            }
        }
    }

    /// Raw string write with `ttl` (default TTL when `None`).
    pub async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Some(remote) = &self.remote {
            match remote.set(key, value, ttl).await {
                Ok(()) => return,
                Err(e) => warn!(key = key, error = %e, "Remote cache SET failed, using fallback"),
            }
        }
        // The in-process store cannot fail
        let _ = self.fallback.set(key, value, ttl).await;
    }

    /// Encode and store a value. Encoding failures are logged and dropped.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, &raw, ttl).await,
            Err(e) => {
                warn!(key = key, error = %e, "Value could not be encoded, skipping cache SET")
            }
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete(key).await {
                warn!(key = key, error = %e, "Remote cache DEL failed");
            }
        }
        // Clear any copy written while the remote store was down
        let _ = self.fallback.delete(key).await;
    }

    /// Delete every key matching a glob pattern, returning how many the
    /// active store removed.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let local = self.fallback.delete_pattern(pattern).await.unwrap_or_default();

        if let Some(remote) = &self.remote {
            match remote.delete_pattern(pattern).await {
                Ok(deleted) => return deleted,
                Err(e) => warn!(
                    pattern = pattern,
                    error = %e,
                    "Remote cache pattern DEL failed, using fallback"
                ),
            }
        }
        local
    }

    /// Increment the counter at `key`, refreshing its TTL.
    ///
    /// Atomic against the remote store. The fallback store is not atomic
    /// under concurrent callers. Returns 0 when the key holds a non-integer.
    pub async fn increment(&self, key: &str, ttl: Option<Duration>) -> i64 {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Some(remote) = &self.remote {
            match remote.increment(key, ttl).await {
                Ok(value) => return value,
                Err(e) => warn!(key = key, error = %e, "Remote cache INCR failed, using fallback"),
            }
        }
        match self.fallback.increment(key, ttl).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, error = %e, "Fallback INCR failed");
                0
            }
        }
    }

    /// Read-through helper: return the cached value, or run `producer`,
    /// store its result and return it.
    ///
    /// There is no single-flight guard; concurrent callers on a cold key may
    /// each run `producer`. Producer errors propagate and nothing is stored.
    #[instrument(skip(self, producer))]
    pub async fn with_refresh<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl: Option<Duration>,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            debug!("Read-through HIT");
            return Ok(cached);
        }

        debug!("Read-through MISS, producing value");
        let value = producer().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }
}
