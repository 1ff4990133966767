//! Cache Module
//!
//! The object-store side of the memoization layer: entries with absolute
//! expiration, the store contract, the in-memory reference store, and its
//! activity counters.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Timestamp};
pub use stats::CacheStats;
pub use store::{MemoryStore, ObjectStore};
