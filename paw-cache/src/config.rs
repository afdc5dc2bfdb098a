use std::time::Duration;

use paw_core::PawConfigSnapshot;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the cache facade
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Remote store URL; `None` selects the in-process store only
    pub redis_url: Option<String>,

    /// TTL applied when a caller does not pass one
    pub default_ttl: Duration,

    /// Give up on the remote store after this long at startup
    pub connect_timeout: Duration,

    /// Run a background sweeper over the in-process store at this interval
    pub sweep_interval: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: DEFAULT_TTL,
            connect_timeout: Duration::from_secs(5),
            sweep_interval: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `cache.redis_url`, `cache.default_ttl_secs`,
    /// `cache.connect_timeout_ms` and `cache.sweep_interval_secs`, keeping
    /// defaults for anything missing.
    pub fn from_snapshot(snapshot: &PawConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            redis_url: snapshot.get_string("cache.redis_url"),
            default_ttl: snapshot
                .get_secs("cache.default_ttl_secs")
                .unwrap_or(defaults.default_ttl),
            connect_timeout: snapshot
                .get_millis("cache.connect_timeout_ms")
                .unwrap_or(defaults.connect_timeout),
            sweep_interval: snapshot
                .get_secs("cache.sweep_interval_secs")
                .filter(|d| !d.is_zero()),
        }
    }

    pub fn with_redis_url<S: Into<String>>(mut self, url: S) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paw_core::PawConfig;

    #[test]
    fn test_defaults_when_unconfigured() {
        let config = CacheConfig::from_snapshot(&PawConfig::new().snapshot());

        assert!(config.redis_url.is_none());
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert!(config.sweep_interval.is_none());
    }

    #[test]
    fn test_reads_snapshot_keys() {
        let mut raw = PawConfig::new();
        raw.set("cache.redis_url", "redis://cache:6379");
        raw.set("cache.default_ttl_secs", "120");
        raw.set("cache.sweep_interval_secs", "0");

        let config = CacheConfig::from_snapshot(&raw.snapshot());

        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.default_ttl, Duration::from_secs(120));
        assert!(config.sweep_interval.is_none());
    }
}
