//! Cache entry representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// A cached value with its freshness window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Logical key (the file name is a digest of this)
    pub key: String,

    /// Cached payload
    pub data: Value,

    /// When the entry was written
    pub created_at: DateTime<Utc>,

    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,

    /// Content fingerprint reported by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Free-form annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CacheEntry {
    /// Create an entry expiring `ttl` from now
    pub fn new(key: impl Into<String>, data: Value, ttl: Duration) -> Self {
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(3650));
        Self {
            key: key.into(),
            data,
            created_at,
            expires_at: created_at + ttl,
            etag: None,
            metadata: None,
        }
    }

    pub fn with_etag(mut self, etag: Option<String>) -> Self {
        self.etag = etag;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check if the entry is stale at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Check if the entry is stale
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
