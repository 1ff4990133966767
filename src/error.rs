//! Error types for the memoization layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache-key derivation, store access and the
/// get-or-compute protocol.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Base key was empty
    #[error("cache key must not be empty")]
    EmptyKey,

    /// Cache-by argument values could not be serialized for key derivation
    #[error("failed to serialize cache-by arguments: {0}")]
    ArgSerialization(#[source] serde_json::Error),

    /// Computed result could not be serialized for storage
    #[error("failed to serialize computed value for key '{key}': {source}")]
    ValueSerialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Cached value cannot be decoded as the type requested at this call site
    #[error("cached value for key '{key}' does not match the requested type: {source}")]
    TypeMismatch {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The underlying store failed to service a get/set/remove
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Error returned by a fallible computation, propagated verbatim.
    /// Nothing is cached for the failed invocation.
    #[error(transparent)]
    Computation(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the memoization layer.
pub type Result<T> = std::result::Result<T, CacheError>;
