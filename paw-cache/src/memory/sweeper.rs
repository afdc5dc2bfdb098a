use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::MemoryStore;

/// Periodically drops expired entries from a [`MemoryStore`].
///
/// Reads already treat expired entries as absent; the sweeper only bounds
/// memory for keys that are written once and never read again.
pub struct MemorySweeper {
    store: MemoryStore,
    interval: Duration,
}

/// Handle for stopping a running sweeper
pub struct SweeperHandle {
    shutdown_tx: oneshot::Sender<()>,
    join_handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.join_handle.await;
    }
}

impl MemorySweeper {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            interval: Duration::from_secs(60),
        }
    }

    pub fn with_interval(store: MemoryStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run one sweep cycle.
    pub fn sweep(&self) -> usize {
        let removed = self.store.purge_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired cache entries");
        }
        removed
    }

    /// Spawn the sweep loop on the current runtime.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let join_handle = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = self.interval.as_millis() as u64, "Starting memory cache sweeper");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        self.sweep();
                    }
                }
            }

            info!("Memory cache sweeper stopped");
        });

        SweeperHandle {
            shutdown_tx,
            join_handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CacheStore;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_cycle_reclaims_expired_entries() {
        let store = MemoryStore::new();
        store.set("stale", "x", Duration::from_secs(1)).await.unwrap();
        store.set("fresh", "y", Duration::from_secs(600)).await.unwrap();

        let sweeper = MemorySweeper::with_interval(store.clone(), Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(sweeper.sweep(), 1);
        assert_eq!(sweeper.sweep(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_runs_until_shutdown() {
        let store = MemoryStore::new();
        store.set("stale", "x", Duration::from_secs(1)).await.unwrap();

        let handle = MemorySweeper::with_interval(store.clone(), Duration::from_secs(10)).spawn();
        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(store.entries.read().len(), 0);
        handle.shutdown().await;
    }
}
