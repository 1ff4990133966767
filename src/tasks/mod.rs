//! Background Tasks Module
//!
//! Housekeeping tasks that run alongside the cache.
//!
//! # Tasks
//! - Expiration sweep: removes expired entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
