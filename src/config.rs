//! Configuration Module
//!
//! Handles loading cache housekeeping settings from environment variables.

use std::env;

/// Housekeeping configuration.
///
/// Only the expiration sweep is configurable; the provider itself takes no
/// configuration, and expirations are always supplied per call.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Background expiration-sweep interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FNCACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            cleanup_interval: env::var("FNCACHE_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: 60,
        }
    }
}
