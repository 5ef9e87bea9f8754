//! Stable cache key derivation
//!
//! Structured queries are hashed so file names stay bounded. Keys must be
//! identical across runs for on-disk entries to be reused, so hashing goes
//! through `serde_json::Value`, whose maps are key-sorted.

use crate::error::CompkitResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept (32 hex chars)
const DIGEST_BYTES: usize = 16;

/// Key for the full registry index
pub const REGISTRY_INDEX: &str = "registry:index";

/// Key for the results of a search query
pub fn search<T: Serialize + ?Sized>(filter: &T) -> CompkitResult<String> {
    Ok(format!("search:{}", digest(filter)?))
}

/// Key for a component's file payload
pub fn files(name: &str) -> String {
    format!("files:{}", name)
}

/// Hash a serializable query to a fixed-length hex digest
pub fn digest<T: Serialize + ?Sized>(value: &T) -> CompkitResult<String> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(hash_bytes(&bytes))
}

/// File stem used for a key's on-disk entry
pub fn file_stem(key: &str) -> String {
    hash_bytes(key.as_bytes())
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    hex::encode(&result[..DIGEST_BYTES])
}
