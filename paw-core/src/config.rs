//! # Configuration
//!
//! A flat string key/value store. Components read typed values out of a
//! [`PawConfigSnapshot`] with dotted keys such as `cache.redis_url` or
//! `queue.retry_delay_ms`.
//!
//! ## Environment overrides
//!
//! ```rust
//! use paw_core::PawConfig;
//!
//! // PAW__CACHE__REDIS_URL=redis://cache:6379 -> cache.redis_url
//! let mut config = PawConfig::new();
//! config.load_env("PAW__");
//! config.set("cache.default_ttl_secs", "600");
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_u64("cache.default_ttl_secs"), Some(600));
//! ```
//!
//! Missing keys are never an error: every component falls back to its
//! built-in default when a key is absent or fails to parse.

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct PawConfig {
    values: HashMap<String, String>,
}

impl PawConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Build a store from the process environment using `prefix`.
    pub fn from_env(prefix: &str) -> Self {
        let mut config = Self::new();
        config.load_env(prefix);
        config
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Import every environment variable starting with `prefix`.
    ///
    /// `PAW__QUEUE__MAX_BATCH` becomes `queue.max_batch`. Returns how many
    /// variables were imported.
    pub fn load_env(&mut self, prefix: &str) -> usize {
        self.load_vars(prefix, std::env::vars())
    }

    fn load_vars<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut loaded = 0;
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped
                    .to_lowercase()
                    .replace("__", ".")
                    .trim_matches('.')
                    .to_string();
                if normalized.is_empty() {
                    continue;
                }
                self.values.insert(normalized, value);
                loaded += 1;
            }
        }
        loaded
    }

    pub fn snapshot(&self) -> PawConfigSnapshot {
        PawConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PawConfigSnapshot {
    map: HashMap<String, String>,
}

impl PawConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    /// Non-empty string value; blank values count as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Duration stored as whole seconds.
    pub fn get_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }

    /// Duration stored as whole milliseconds.
    pub fn get_millis(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut config = PawConfig::new();
        config.set("queue.max_batch", "25");

        assert!(config.has("queue.max_batch"));
        assert_eq!(config.get("queue.max_batch"), Some("25"));
        assert_eq!(config.get("queue.timeout_ms"), None);
    }

    #[test]
    fn test_env_keys_are_normalized() {
        let mut config = PawConfig::new();
        let vars = vec![
            ("PAW__CACHE__REDIS_URL".to_string(), "redis://localhost:6379".to_string()),
            ("PAW__QUEUE__RETRY_DELAY_MS".to_string(), "250".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];

        let loaded = config.load_vars("PAW__", vars);

        assert_eq!(loaded, 2);
        assert_eq!(config.get("cache.redis_url"), Some("redis://localhost:6379"));
        assert_eq!(config.get("queue.retry_delay_ms"), Some("250"));
        assert!(!config.has("home"));
    }

    #[test]
    fn test_snapshot_typed_getters() {
        let mut config = PawConfig::new();
        config.set("cache.default_ttl_secs", "600");
        config.set("queue.timeout_ms", "1500");
        config.set("cache.redis_url", "   ");
        config.set("metrics.enabled", "true");
        config.set("queue.max_batch", "ten");

        let snapshot = config.snapshot();

        assert_eq!(snapshot.get_secs("cache.default_ttl_secs"), Some(Duration::from_secs(600)));
        assert_eq!(snapshot.get_millis("queue.timeout_ms"), Some(Duration::from_millis(1500)));
        assert_eq!(snapshot.get_string("cache.redis_url"), None);
        assert_eq!(snapshot.get_bool("metrics.enabled"), Some(true));
        assert_eq!(snapshot.get_usize("queue.max_batch"), None);
    }
}
