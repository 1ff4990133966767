//! fncache - function-result memoization
//!
//! Caches the result of an expensive computation under a caller-chosen key,
//! optionally refined by the computation's argument values, until an
//! absolute expiration elapses.
//!
//! ```
//! use chrono::{Duration, Utc};
//! use fncache::FunctionCacheProvider;
//!
//! let cache = FunctionCacheProvider::in_memory();
//! let expires_at = Utc::now() + Duration::seconds(10);
//!
//! let sum: i32 = cache
//!     .execute_with_cache("sum", expires_at, || 2 + 3)
//!     .unwrap();
//! assert_eq!(sum, 5);
//!
//! // Same key, still fresh: answered from the cache.
//! let again: i32 = cache
//!     .execute_with_cache("sum", expires_at, || unreachable!())
//!     .unwrap();
//! assert_eq!(again, 5);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod provider;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, MemoryStore, ObjectStore, Timestamp};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use provider::FunctionCacheProvider;
pub use tasks::spawn_cleanup_task;
