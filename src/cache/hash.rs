//! Content hashing utilities for cache keys.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a serializable value.
///
/// Used to derive a stable environment identity (instance URL + API
/// version) for cache key prefixes, without writing the identity itself to
/// disk. The value is serialized to JSON before hashing, ensuring
/// deterministic output. Returns a 64-character lowercase hex string.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
