use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use proptest::prelude::*;

use paw_cache::{Cache, CacheResult, CacheStore, MemoryStore};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Remote stand-in whose increment is atomic, like Redis INCR.
#[derive(Default)]
struct AtomicRemote {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl CacheStore for AtomicRemote {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> CacheResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let prefix = pattern.trim_end_matches('*');
        let mut values = self.values.lock();
        let before = values.len();
        values.retain(|key, _| !key.starts_with(prefix));
        Ok((before - values.len()) as u64)
    }

    async fn increment(&self, key: &str, _ttl: Duration) -> CacheResult<i64> {
        let mut values = self.values.lock();
        let next = values
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        values.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "atomic-test"
    }

    fn is_distributed(&self) -> bool {
        true
    }
}

proptest! {
    #[test]
    fn set_then_get_returns_value(key in "[a-z]{1,8}(:[a-z0-9]{1,8}){0,3}", value in any::<i64>()) {
        let rt = runtime();
        rt.block_on(async {
            let cache = Cache::in_memory();
            cache.set(&key, &value, Some(Duration::from_secs(30))).await;
            prop_assert_eq!(cache.get::<i64>(&key).await, Some(value));
            Ok(())
        })?;
    }

    #[test]
    fn delete_pattern_removes_exactly_matching_keys(
        matching in prop::collection::hash_set("[a-z0-9]{1,6}", 0..20),
        others in prop::collection::hash_set("[a-z0-9]{1,6}", 0..20),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache = Cache::in_memory();
            for id in &matching {
                cache.set(&format!("availability:{}", id), &true, None).await;
            }
            for id in &others {
                cache.set(&format!("profile:{}", id), &true, None).await;
            }

            let deleted = cache.delete_pattern("availability:*").await;

            prop_assert_eq!(deleted, matching.len() as u64);
            for id in &matching {
                let key = format!("availability:{}", id);
                prop_assert_eq!(cache.get::<bool>(&key).await, None);
            }
            for id in &others {
                let key = format!("profile:{}", id);
                prop_assert_eq!(cache.get::<bool>(&key).await, Some(true));
            }
            Ok(())
        })?;
    }
}

#[tokio::test(start_paused = true)]
async fn test_get_after_ttl_is_absent() {
    let cache = Cache::in_memory();
    cache.set("booking:9:status", &"confirmed", Some(Duration::from_secs(30))).await;

    assert_eq!(cache.get::<String>("booking:9:status").await.as_deref(), Some("confirmed"));

    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(cache.get::<String>("booking:9:status").await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_increment_against_atomic_remote_is_exact() {
    let cache = Cache::with_store(Arc::new(AtomicRemote::default()), MemoryStore::new());
    let callers = 200;

    let tasks: Vec<_> = (0..callers)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(
                async move { cache.increment("rate:api", Some(Duration::from_secs(60))).await },
            )
        })
        .collect();

    let mut seen = HashSet::new();
    for task in tasks {
        seen.insert(task.await.unwrap());
    }

    assert_eq!(seen.len(), callers);
    assert_eq!(cache.get::<i64>("rate:api").await, Some(callers as i64));
    // Nothing spilled into the fallback store
    assert!(cache.fallback().is_empty());
}

#[tokio::test]
async fn test_separate_instances_do_not_share_state() {
    let first = Cache::in_memory();
    let second = Cache::in_memory();

    first.set("shared?", &1, None).await;

    assert_eq!(second.get::<i32>("shared?").await, None);
}

#[tokio::test]
async fn test_concurrent_read_through_may_produce_twice() {
    let cache = Cache::in_memory();
    let calls = Arc::new(Mutex::new(0));

    let run = |cache: Cache, calls: Arc<Mutex<u32>>| async move {
        cache
            .with_refresh::<u32, (), _, _>(
                "cold",
                || async move {
                    *calls.lock() += 1;
                    tokio::task::yield_now().await;
                    Ok(11)
                },
                None,
            )
            .await
    };

    let (a, b) = futures::join!(
        run(cache.clone(), calls.clone()),
        run(cache.clone(), calls.clone())
    );

    assert_eq!(a, Ok(11));
    assert_eq!(b, Ok(11));
    let produced = *calls.lock();
    assert!((1..=2).contains(&produced));
}
