//! Memoization Provider Module
//!
//! The get-or-compute-and-store core: derives the effective cache key,
//! answers from the store when a live entry exists, and otherwise runs the
//! computation and caches its result until the absolute expiration.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::{MemoryStore, ObjectStore, Timestamp};
use crate::error::{CacheError, Result};
use crate::keys;

// == Function Cache Provider ==
/// Memoizes function results in an [`ObjectStore`].
///
/// The store is an explicitly constructed instance composed in at build
/// time, so lifetime and test isolation stay under caller control. Cloning
/// the provider shares the same store.
///
/// The get-check-compute-set sequence is not atomic: two callers racing on
/// the same miss will both run the computation and both write, last write
/// wins. Keep computations idempotent and side-effect-free.
pub struct FunctionCacheProvider<S = MemoryStore> {
    store: Arc<S>,
}

impl<S> Clone for FunctionCacheProvider<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl FunctionCacheProvider<MemoryStore> {
    /// Creates a provider over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: ObjectStore> FunctionCacheProvider<S> {
    // == Constructors ==
    /// Creates a provider owning the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a provider around an already-shared store.
    pub fn with_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // == Execute With Cache ==
    /// Returns the cached result for `base_key` if one is live, otherwise
    /// runs `compute`, caches its result until `expires_at`, and returns it.
    ///
    /// The cache key is exactly `base_key`; all calls with the same base key
    /// collapse onto a single entry. An `expires_at` at or before "now"
    /// makes the call effectively non-caching.
    pub fn execute_with_cache<T, F>(
        &self,
        base_key: &str,
        expires_at: Timestamp,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.get_or_compute(base_key, None::<&()>, expires_at, || Ok(compute()))
    }

    /// Like [`execute_with_cache`](Self::execute_with_cache), refined by
    /// argument values: the key gains a stable hash of `cache_by`'s JSON
    /// serialization, so calls with different argument values resolve to
    /// distinct entries. Pass a tuple to refine by several values.
    pub fn execute_with_cache_by<T, A, F>(
        &self,
        base_key: &str,
        expires_at: Timestamp,
        cache_by: &A,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        F: FnOnce() -> T,
    {
        self.get_or_compute(base_key, Some(cache_by), expires_at, || Ok(compute()))
    }

    // == Try Execute With Cache ==
    /// Fallible-computation variant: a computation error propagates to the
    /// caller as [`CacheError::Computation`] and nothing is cached for that
    /// invocation.
    pub fn try_execute_with_cache<T, F>(
        &self,
        base_key: &str,
        expires_at: Timestamp,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> anyhow::Result<T>,
    {
        self.get_or_compute(base_key, None::<&()>, expires_at, compute)
    }

    /// Fallible-computation variant of
    /// [`execute_with_cache_by`](Self::execute_with_cache_by).
    pub fn try_execute_with_cache_by<T, A, F>(
        &self,
        base_key: &str,
        expires_at: Timestamp,
        cache_by: &A,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        F: FnOnce() -> anyhow::Result<T>,
    {
        self.get_or_compute(base_key, Some(cache_by), expires_at, compute)
    }

    // == Invalidate ==
    /// Removes the entry cached under `base_key`, reporting whether one
    /// existed.
    pub fn invalidate(&self, base_key: &str) -> Result<bool> {
        let key = keys::derive_key::<()>(base_key, None)?;
        Ok(self.store.remove(&key)?.is_some())
    }

    /// Removes the entry cached under `base_key` refined by `cache_by`.
    pub fn invalidate_by<A>(&self, base_key: &str, cache_by: &A) -> Result<bool>
    where
        A: Serialize + ?Sized,
    {
        let key = keys::derive_key(base_key, Some(cache_by))?;
        Ok(self.store.remove(&key)?.is_some())
    }

    // == Core Protocol ==
    /// Key derivation and the get-or-compute-and-store sequence.
    ///
    /// On a hit the stored value is decoded into `T`; JSON-representable
    /// conversions (an integer read back as a float, say) succeed, anything
    /// else fails with [`CacheError::TypeMismatch`] rather than returning a
    /// wrong value. Exactly one store write happens per miss, none per hit.
    fn get_or_compute<T, A, F>(
        &self,
        base_key: &str,
        cache_by: Option<&A>,
        expires_at: Timestamp,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        F: FnOnce() -> anyhow::Result<T>,
    {
        let key = keys::derive_key(base_key, cache_by)?;

        if let Some(cached) = self.store.get(&key)? {
            debug!(key = %key, "cache hit");
            return serde_json::from_value(cached)
                .map_err(|source| CacheError::TypeMismatch { key, source });
        }

        debug!(key = %key, "cache miss, invoking computation");
        let result = compute()?;
        let value = serde_json::to_value(&result).map_err(|source| {
            CacheError::ValueSerialization {
                key: key.clone(),
                source,
            }
        })?;
        self.store.set(&key, value, expires_at)?;

        Ok(result)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;

    fn in_ten_seconds() -> Timestamp {
        Utc::now() + Duration::seconds(10)
    }

    #[test]
    fn test_returns_computed_value() {
        let provider = FunctionCacheProvider::in_memory();

        let result: i32 = provider
            .execute_with_cache("sum", in_ten_seconds(), || 2 + 3)
            .unwrap();

        assert_eq!(result, 5);
    }

    #[test]
    fn test_second_call_does_not_recompute() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result: i32 = provider
                .execute_with_cache("sum", in_ten_seconds(), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    2 + 3
                })
                .unwrap();
            assert_eq!(result, 5);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_base_keys_compute_independently() {
        let provider = FunctionCacheProvider::in_memory();

        let a: i32 = provider
            .execute_with_cache("a", in_ten_seconds(), || 1)
            .unwrap();
        let b: i32 = provider
            .execute_with_cache("b", in_ten_seconds(), || 2)
            .unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(provider.store().count().unwrap(), 2);
    }

    #[test]
    fn test_arguments_refine_the_key() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);

        let add = |x: i32, y: i32| -> i32 {
            provider
                .execute_with_cache_by("sum_slow", in_ten_seconds(), &(x, y), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    x + y
                })
                .unwrap()
        };

        assert_eq!(add(2, 3), 5);
        assert_eq!(add(2, 3), 5); // cached
        assert_eq!(add(2, 4), 6); // distinct entry

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.store().count().unwrap(), 2);
    }

    #[test]
    fn test_expired_entry_recomputes() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);
        let expires_at = Utc::now() + Duration::seconds(1);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            5
        };

        let _: i32 = provider.execute_with_cache("k", expires_at, compute).unwrap();
        let _: i32 = provider.execute_with_cache("k", expires_at, compute).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(std::time::Duration::from_millis(1100));

        let _: i32 = provider
            .execute_with_cache("k", in_ten_seconds(), compute)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_expiry_in_the_past_never_caches() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let _: i32 = provider
                .execute_with_cache("k", Utc::now() - Duration::seconds(1), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    5
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_hit_coerces_json_representable_types() {
        let provider = FunctionCacheProvider::in_memory();

        let _: i64 = provider
            .execute_with_cache("answer", in_ten_seconds(), || 42i64)
            .unwrap();

        // An integer entry read back as a float is representable and succeeds.
        let as_float: f64 = provider
            .execute_with_cache("answer", in_ten_seconds(), || unreachable!())
            .unwrap();
        assert_eq!(as_float, 42.0);
    }

    #[test]
    fn test_hit_with_incompatible_type_fails() {
        let provider = FunctionCacheProvider::in_memory();

        let _: i64 = provider
            .execute_with_cache("answer", in_ten_seconds(), || 42i64)
            .unwrap();

        let result: Result<String> =
            provider.execute_with_cache("answer", in_ten_seconds(), || "nope".to_string());

        assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
    }

    #[test]
    fn test_empty_base_key_rejected() {
        let provider = FunctionCacheProvider::in_memory();

        let result: Result<i32> = provider.execute_with_cache("", in_ten_seconds(), || 1);
        assert!(matches!(result, Err(CacheError::EmptyKey)));
    }

    #[test]
    fn test_computation_error_propagates_and_nothing_cached() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);

        let result: Result<i32> =
            provider.try_execute_with_cache("flaky", in_ten_seconds(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("upstream timed out"))
            });

        let err = result.unwrap_err();
        assert!(matches!(err, CacheError::Computation(_)));
        assert_eq!(err.to_string(), "upstream timed out");
        assert_eq!(provider.store().count().unwrap(), 0);

        // A later successful invocation computes and caches normally.
        let value: i32 = provider
            .try_execute_with_cache("flaky", in_ten_seconds(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.store().count().unwrap(), 1);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let provider = FunctionCacheProvider::in_memory();
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            5
        };

        let _: i32 = provider
            .execute_with_cache("k", in_ten_seconds(), compute)
            .unwrap();
        assert!(provider.invalidate("k").unwrap());
        assert!(!provider.invalidate("k").unwrap());

        let _: i32 = provider
            .execute_with_cache("k", in_ten_seconds(), compute)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_by_targets_one_argument_tuple() {
        let provider = FunctionCacheProvider::in_memory();

        let _: i32 = provider
            .execute_with_cache_by("sum", in_ten_seconds(), &(2, 3), || 5)
            .unwrap();
        let _: i32 = provider
            .execute_with_cache_by("sum", in_ten_seconds(), &(2, 4), || 6)
            .unwrap();

        assert!(provider.invalidate_by("sum", &(2, 3)).unwrap());
        assert_eq!(provider.store().count().unwrap(), 1);
    }

    #[test]
    fn test_clones_share_the_store() {
        let provider = FunctionCacheProvider::in_memory();
        let clone = provider.clone();
        let calls = AtomicUsize::new(0);

        let _: i32 = provider
            .execute_with_cache("shared", in_ten_seconds(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                1
            })
            .unwrap();
        let _: i32 = clone
            .execute_with_cache("shared", in_ten_seconds(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                1
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_structs_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Report {
            total: u64,
            label: String,
        }

        let provider = FunctionCacheProvider::in_memory();
        let build = || Report {
            total: 12,
            label: "monthly".to_string(),
        };

        let first: Report = provider
            .execute_with_cache("report", in_ten_seconds(), build)
            .unwrap();
        let second: Report = provider
            .execute_with_cache("report", in_ten_seconds(), || unreachable!())
            .unwrap();

        assert_eq!(first, build());
        assert_eq!(second, first);
    }
}
