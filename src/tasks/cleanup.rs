//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::MemoryStore;

/// Spawns a background task that periodically sweeps expired entries out of
/// the store.
///
/// Expired entries are already invisible to readers and dropped lazily when
/// `get` touches them; the sweep reclaims the ones nothing reads anymore.
/// Abort the returned handle to stop sweeping, e.g. during shutdown.
///
/// # Arguments
/// * `store` - shared reference to the store to sweep
/// * `cleanup_interval_secs` - interval in seconds between sweeps
pub fn spawn_cleanup_task(
    store: Arc<MemoryStore>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "starting expiration sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match store.cleanup_expired() {
                Ok(removed) if removed > 0 => {
                    info!("expiration sweep removed {} entries", removed);
                }
                Ok(_) => {
                    debug!("expiration sweep found nothing to remove");
                }
                Err(err) => {
                    warn!("expiration sweep failed: {}", err);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ObjectStore;
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = Arc::new(MemoryStore::new());

        store
            .set(
                "expire_soon",
                json!("value"),
                Utc::now() + chrono::Duration::seconds(1),
            )
            .unwrap();

        let handle = spawn_cleanup_task(store.clone(), 1);

        // Wait for the entry to expire and a sweep to run.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(store.is_empty(), "expired entry should have been swept");

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_live_entries() {
        let store = Arc::new(MemoryStore::new());

        store
            .set(
                "long_lived",
                json!("value"),
                Utc::now() + chrono::Duration::seconds(3600),
            )
            .unwrap();

        let handle = spawn_cleanup_task(store.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("long_lived").unwrap(), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = Arc::new(MemoryStore::new());

        let handle = spawn_cleanup_task(store, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "task should be finished after abort");
    }
}
