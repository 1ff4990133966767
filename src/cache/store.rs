//! Cache Store Module
//!
//! The object-store contract the memoization provider runs against, plus the
//! in-memory reference implementation with absolute-expiration enforcement.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, Timestamp};
use crate::error::{CacheError, Result};

// == Object Store Contract ==
/// Key/value container with per-entry absolute expiration.
///
/// Once `now >= expires_at` for an entry, `get`/`contains`/`count` must
/// observe it as absent; whether removal happens lazily on read or through a
/// periodic sweep is up to the implementation. Every operation is fallible so
/// that implementations backed by an external service can surface
/// [`CacheError::StoreUnavailable`].
///
/// Implementations must tolerate concurrent readers and writers. Atomicity is
/// only required per operation; a get-then-set sequence spanning two calls is
/// not atomic.
pub trait ObjectStore: Send + Sync {
    /// Returns the live (non-expired) value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Upserts `value` under `key`, replacing any existing entry and its
    /// expiration.
    fn set(&self, key: &str, value: Value, expires_at: Timestamp) -> Result<()>;

    /// Reports whether a live entry exists under `key`.
    fn contains(&self, key: &str) -> Result<bool>;

    /// Removes the entry under `key`, returning its value if one existed.
    fn remove(&self, key: &str) -> Result<Option<Value>>;

    /// Returns the number of live entries.
    fn count(&self) -> Result<usize>;
}

// Entries and counters live behind one lock so that expired-entry removal
// and the stats it records stay consistent.
#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Memory Store ==
/// In-memory [`ObjectStore`] keeping entries in a `HashMap` guarded by a
/// read/write lock.
///
/// Expired entries are dropped lazily when `get` touches them; a periodic
/// sweep can reclaim untouched ones via [`MemoryStore::cleanup_expired`]
/// (see `tasks::spawn_cleanup_task`).
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|_| CacheError::StoreUnavailable("memory store lock poisoned".to_string()))
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|_| CacheError::StoreUnavailable("memory store lock poisoned".to_string()))
    }

    // == Stats ==
    /// Returns a snapshot of the store's activity counters.
    pub fn stats(&self) -> Result<CacheStats> {
        let inner = self.read_inner()?;
        let mut stats = inner.stats.clone();
        stats.set_entries(live_count(&inner.entries));
        Ok(stats)
    }

    // == Cleanup Expired ==
    /// Removes every expired entry, returning how many were dropped.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut inner = self.write_inner()?;

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.entries.remove(key);
            inner.stats.record_expiration();
        }

        let remaining = inner.entries.len();
        inner.stats.set_entries(remaining);
        Ok(expired_keys.len())
    }

    // == Length ==
    /// Returns the number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.read_inner().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// Returns true if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut inner = self.write_inner()?;

        match inner.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                // Drop it on the spot so the map does not accumulate
                // tombstones between sweeps.
                inner.entries.remove(key);
                let remaining = inner.entries.len();
                inner.stats.record_expiration();
                inner.stats.record_miss();
                inner.stats.set_entries(remaining);
                Ok(None)
            }
            Some(entry) => {
                let value = entry.value.clone();
                inner.stats.record_hit();
                Ok(Some(value))
            }
            None => {
                inner.stats.record_miss();
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: Value, expires_at: Timestamp) -> Result<()> {
        let mut inner = self.write_inner()?;

        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value, expires_at));
        let total = inner.entries.len();
        inner.stats.set_entries(total);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        let inner = self.read_inner()?;
        Ok(inner
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    fn remove(&self, key: &str) -> Result<Option<Value>> {
        let mut inner = self.write_inner()?;

        let removed = inner.entries.remove(key);
        let remaining = inner.entries.len();
        inner.stats.set_entries(remaining);
        Ok(removed.map(|entry| entry.value))
    }

    fn count(&self) -> Result<usize> {
        let inner = self.read_inner()?;
        Ok(live_count(&inner.entries))
    }
}

fn live_count(entries: &HashMap<String, CacheEntry>) -> usize {
    entries.values().filter(|entry| !entry.is_expired()).count()
}
