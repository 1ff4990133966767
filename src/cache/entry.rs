//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with absolute expiration.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

/// Absolute wall-clock timestamp used for entry expiration.
pub type Timestamp = DateTime<Utc>;

// == Cache Entry ==
/// A single cached value together with its expiration metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    /// The stored value, kept in serialized form so one store can hold
    /// results of arbitrary types
    pub value: Value,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Absolute expiration timestamp
    pub expires_at: Timestamp,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring at the given absolute timestamp.
    pub fn new(value: Value, expires_at: Timestamp) -> Self {
        Self {
            value,
            created_at: Utc::now(),
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `expires_at`. An entry created with an
    /// expiration at or before "now" is therefore never observable.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, clamped to zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let remaining = self.expires_at.signed_duration_since(Utc::now());
        remaining.max(Duration::zero())
    }
}
