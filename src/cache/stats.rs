//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses and expired-entry removals.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing cache activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads answered from the cache
    pub hits: u64,
    /// Number of reads that found nothing (absent or expired)
    pub misses: u64,
    /// Number of entries removed because their expiration elapsed
    pub expirations: u64,
    /// Current number of entries held by the store
    pub entries: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub(crate) fn set_entries(&mut self, count: usize) {
        self.entries = count;
    }
}
