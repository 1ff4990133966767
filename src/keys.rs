//! Cache-Key Derivation Module
//!
//! Builds the effective cache key from a caller-supplied base identifier and
//! optional argument values. Argument values are serialized to JSON and
//! hashed with SHA-256, so equal argument tuples always yield equal keys and
//! the derivation stays stable across process runs.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Number of hex characters of the argument digest appended to the base key.
///
/// 64 bits of digest keeps collisions between different argument tuples
/// vanishingly unlikely while keeping derived keys readable in logs.
pub const ARG_DIGEST_LEN: usize = 16;

// == Derive Key ==
/// Derives the effective cache key.
///
/// With `cache_by = None` the key is exactly `base_key`, so every call with
/// that base identifier collapses onto a single entry. With argument values,
/// a truncated hex SHA-256 of their JSON serialization is appended. Pass a
/// tuple to refine by more than one value.
///
/// Callers are responsible for choosing globally unique base identifiers;
/// two unrelated operations sharing a base key and no argument values will
/// share an entry.
pub fn derive_key<A>(base_key: &str, cache_by: Option<&A>) -> Result<String>
where
    A: Serialize + ?Sized,
{
    if base_key.is_empty() {
        return Err(CacheError::EmptyKey);
    }

    match cache_by {
        None => Ok(base_key.to_string()),
        Some(args) => {
            let serialized =
                serde_json::to_string(args).map_err(CacheError::ArgSerialization)?;
            let digest = hex::encode(Sha256::digest(serialized.as_bytes()));
            Ok(format!("{base_key}{}", &digest[..ARG_DIGEST_LEN]))
        }
    }
}
