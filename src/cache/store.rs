//! Two-tier cache store with TTL and entry-count eviction

use crate::cache::entry::CacheEntry;
use crate::cache::key::file_stem;
use crate::fsutil::{remove_if_exists, write_atomic};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Aggregate statistics file kept next to the entries
pub const INDEX_FILE: &str = "index.json";

/// Hit/miss/write/eviction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Contents of `index.json` (advisory, safe to delete)
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    stats: CacheStats,
    entries: usize,
    updated_at: DateTime<Utc>,
}

/// Subset of an entry file read when scanning the cache root
#[derive(Deserialize)]
struct EntryHeader {
    key: String,
    created_at: DateTime<Utc>,
}

/// Creation order of a known entry; `seq` breaks timestamp ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Age {
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Default)]
struct CacheState {
    memory: HashMap<String, CacheEntry>,
    known: HashMap<String, Age>,
    stats: CacheStats,
    next_seq: u64,
}

impl CacheState {
    fn forget(&mut self, key: &str) {
        self.memory.remove(key);
        self.known.remove(key);
    }

    fn remember(&mut self, key: &str, created_at: DateTime<Utc>) {
        self.next_seq += 1;
        let age = Age {
            created_at,
            seq: self.next_seq,
        };
        self.known.insert(key.to_string(), age);
    }

    /// Install a disk hit in memory unless a newer live entry got there
    /// first (a `set` racing the file read). Returns the entry to serve.
    fn promote(&mut self, key: &str, entry: CacheEntry, now: DateTime<Utc>) -> CacheEntry {
        if let Some(held) = self.memory.get(key) {
            if held.created_at >= entry.created_at && !held.is_expired_at(now) {
                return held.clone();
            }
        }
        if !self.known.contains_key(key) {
            self.remember(key, entry.created_at);
        }
        self.memory.insert(key.to_string(), entry.clone());
        entry
    }
}

/// Hybrid in-process + on-disk cache
///
/// Process-local state sits behind a mutex that is never held across an
/// `.await`; disk I/O happens after the guard is dropped.
pub struct CacheStore {
    root: Option<PathBuf>,
    max_entries: usize,
    state: Mutex<CacheState>,
}

impl CacheStore {
    /// Open (or create) a cache rooted at `root`.
    ///
    /// Existing entry files are scanned so the entry-count limit covers
    /// entries written by earlier runs. Failures here leave an empty,
    /// still-usable cache.
    pub async fn open(root: impl Into<PathBuf>, max_entries: usize) -> Self {
        let root = root.into();
        let mut state = CacheState::default();

        if let Err(e) = fs::create_dir_all(&root).await {
            warn!("Failed to create cache directory {}: {}", root.display(), e);
        }

        match scan_entries(&root).await {
            Ok(mut headers) => {
                headers.sort_by_key(|h| h.created_at);
                for header in headers {
                    state.remember(&header.key, header.created_at);
                }
            }
            Err(e) => debug!("Cache scan of {} failed: {}", root.display(), e),
        }

        if let Some(index) = read_index(&root).await {
            state.stats = index.stats;
        }

        debug!(
            "Opened cache at {} with {} entries",
            root.display(),
            state.known.len()
        );

        Self {
            root: Some(root),
            max_entries: max_entries.max(1),
            state: Mutex::new(state),
        }
    }

    /// A cache that stores nothing; every lookup is a miss
    pub fn disabled() -> Self {
        Self {
            root: None,
            max_entries: 1,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Cache root, if the cache is enabled
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Look up a live entry, promoting disk hits into memory
    pub async fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        let now = Utc::now();

        let expired_in_memory = {
            let mut state = self.lock();
            let cached = state
                .memory
                .get(key)
                .map(|entry| (entry.is_expired_at(now), entry.clone()));
            match cached {
                Some((false, entry)) => {
                    state.stats.hits += 1;
                    debug!("Cache hit (memory): {}", key);
                    return Some(entry);
                }
                Some((true, _)) => {
                    state.forget(key);
                    true
                }
                None => false,
            }
        };

        let Some(path) = self.entry_path(key) else {
            self.lock().stats.misses += 1;
            return None;
        };

        if expired_in_memory {
            debug!("Cache entry expired: {}", key);
            self.discard_file(&path).await;
            self.lock().stats.misses += 1;
            return None;
        }

        match read_entry(&path).await {
            Some(entry) if entry.key == key && !entry.is_expired_at(now) => {
                let mut state = self.lock();
                state.stats.hits += 1;
                debug!("Cache hit (disk): {}", key);
                Some(state.promote(key, entry, now))
            }
            Some(entry) if entry.key == key => {
                debug!("Cache entry expired: {}", key);
                self.lock().forget(key);
                self.discard_file(&path).await;
                self.lock().stats.misses += 1;
                None
            }
            _ => {
                debug!("Cache miss: {}", key);
                self.lock().stats.misses += 1;
                None
            }
        }
    }

    /// Look up a live value
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.get_entry(key).await.map(|entry| entry.data)
    }

    /// Look up a value and deserialize it; shape mismatches count as misses
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Discarding cache entry {} with unexpected shape: {}", key, e);
                self.delete(key).await;
                None
            }
        }
    }

    /// Store a value for `ttl`
    pub async fn set(&self, key: &str, data: Value, ttl: Duration) {
        self.set_with(key, data, ttl, None, None).await;
    }

    /// Store a serializable value for `ttl`
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration, etag: Option<String>) {
        match serde_json::to_value(value) {
            Ok(data) => self.set_with(key, data, ttl, etag, None).await,
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// Store a value with its etag and metadata
    pub async fn set_with(
        &self,
        key: &str,
        data: Value,
        ttl: Duration,
        etag: Option<String>,
        metadata: Option<Map<String, Value>>,
    ) {
        let Some(path) = self.entry_path(key) else {
            return;
        };
        if ttl.is_zero() {
            debug!("Skipping cache write for {} with zero TTL", key);
            return;
        }

        let entry = CacheEntry::new(key, data, ttl)
            .with_etag(etag)
            .with_metadata(metadata);

        {
            let mut state = self.lock();
            state.remember(key, entry.created_at);
            state.memory.insert(key.to_string(), entry.clone());
            state.stats.writes += 1;
        }

        match serde_json::to_vec_pretty(&entry) {
            Ok(bytes) => {
                if let Err(e) = write_atomic(&path, &bytes).await {
                    warn!("Failed to write cache entry {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }

        self.enforce_limit().await;
        self.flush_stats().await;
    }

    /// Remove an entry from both tiers
    pub async fn delete(&self, key: &str) {
        self.lock().forget(key);
        if let Some(path) = self.entry_path(key) {
            self.discard_file(&path).await;
        }
        self.flush_stats().await;
    }

    /// Remove every entry and reset the counters
    pub async fn clear(&self) {
        {
            let mut state = self.lock();
            *state = CacheState::default();
        }

        let Some(root) = self.root.as_deref() else {
            return;
        };

        let mut entries = match fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cache directory unreadable during clear: {}", e);
                return;
            }
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                self.discard_file(&path).await;
            }
        }
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Number of entries across both tiers
    pub fn entry_count(&self) -> usize {
        self.lock().known.len()
    }

    /// Persist the counters to `index.json` (best effort)
    pub async fn flush_stats(&self) {
        let Some(root) = self.root.as_deref() else {
            return;
        };
        let index = {
            let state = self.lock();
            IndexFile {
                stats: state.stats,
                entries: state.known.len(),
                updated_at: Utc::now(),
            }
        };
        let path = root.join(INDEX_FILE);
        match serde_json::to_vec_pretty(&index) {
            Ok(bytes) => {
                if let Err(e) = write_atomic(&path, &bytes).await {
                    debug!("Failed to write cache index {}: {}", path.display(), e);
                }
            }
            Err(e) => debug!("Failed to serialize cache index: {}", e),
        }
    }

    /// Evict oldest-created entries until at most `max_entries` remain
    async fn enforce_limit(&self) {
        let evicted: Vec<String> = {
            let mut state = self.lock();
            let excess = state.known.len().saturating_sub(self.max_entries);
            if excess == 0 {
                return;
            }

            let mut by_age: Vec<(Age, String)> = state
                .known
                .iter()
                .map(|(key, age)| (*age, key.clone()))
                .collect();
            by_age.sort();

            let evicted: Vec<String> = by_age.into_iter().take(excess).map(|(_, key)| key).collect();
            for key in &evicted {
                state.forget(key);
            }
            state.stats.evictions += evicted.len() as u64;
            evicted
        };

        for key in &evicted {
            debug!("Evicting cache entry: {}", key);
            if let Some(path) = self.entry_path(key) {
                self.discard_file(&path).await;
            }
        }
    }

    async fn discard_file(&self, path: &Path) {
        if let Err(e) = remove_if_exists(path).await {
            warn!("Failed to remove cache file {}: {}", path.display(), e);
        }
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{}.json", file_stem(key))))
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read an entry file; unreadable or malformed files are misses
async fn read_entry(path: &Path) -> Option<CacheEntry> {
    let content = match fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            debug!("Cache read of {} failed: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_slice(&content) {
        Ok(entry) => Some(entry),
        Err(e) => {
            debug!("Corrupt cache entry {}: {}", path.display(), e);
            None
        }
    }
}

async fn read_index(root: &Path) -> Option<IndexFile> {
    let content = fs::read(root.join(INDEX_FILE)).await.ok()?;
    serde_json::from_slice(&content).ok()
}

async fn scan_entries(root: &Path) -> io::Result<Vec<EntryHeader>> {
    let mut headers = Vec::new();
    let mut entries = fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_entry = path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|name| name != INDEX_FILE);
        if !is_entry {
            continue;
        }
        if let Ok(content) = fs::read(&path).await {
            if let Ok(header) = serde_json::from_slice::<EntryHeader>(&content) {
                headers.push(header);
            }
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    async fn test_cache(max_entries: usize) -> (CacheStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let cache = CacheStore::open(temp.path().join("cache"), max_entries).await;
        (cache, temp)
    }

    #[tokio::test]
    async fn get_after_set_returns_value() {
        let (cache, _temp) = test_cache(10).await;
        let value = json!({"name": "button", "deps": ["icon"]});

        cache.set("files:button", value.clone(), HOUR).await;

        assert_eq!(cache.get("files:button").await, Some(value));
        let stats = cache.stats();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn missing_key_counts_miss() {
        let (cache, _temp) = test_cache(10).await;
        assert!(cache.get("nope").await.is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn expired_entry_is_not_resurrected() {
        let (cache, _temp) = test_cache(10).await;
        cache.set("k", json!(1), Duration::from_millis(20)).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(cache.get("k").await.is_none());
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.entry_count(), 0);
        let path = cache.entry_path("k").unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn disk_entries_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("cache");
        {
            let cache = CacheStore::open(&root, 10).await;
            cache
                .set_with("k", json!("v"), HOUR, Some("etag-1".to_string()), None)
                .await;
        }

        let cache = CacheStore::open(&root, 10).await;
        assert_eq!(cache.entry_count(), 1);
        let entry = cache.get_entry("k").await.unwrap();
        assert_eq!(entry.data, json!("v"));
        assert_eq!(entry.etag.as_deref(), Some("etag-1"));
        // counters carried over from index.json
        assert_eq!(cache.stats().writes, 1);
    }

    #[test]
    fn disk_promotion_keeps_newer_memory_entry() {
        let stale = CacheEntry::new("k", json!("old"), HOUR);
        let mut fresh = CacheEntry::new("k", json!("new"), HOUR);
        fresh.created_at = stale.created_at + chrono::Duration::seconds(1);

        let mut state = CacheState::default();
        state.remember("k", fresh.created_at);
        state.memory.insert("k".to_string(), fresh);

        let served = state.promote("k", stale.clone(), Utc::now());
        assert_eq!(served.data, json!("new"));
        assert_eq!(state.memory["k"].data, json!("new"));

        let mut empty = CacheState::default();
        let served = empty.promote("k", stale, Utc::now());
        assert_eq!(served.data, json!("old"));
        assert!(empty.known.contains_key("k"));
    }

    #[tokio::test]
    async fn evicts_oldest_created_first() {
        let (cache, _temp) = test_cache(2).await;
        cache.set("a", json!("a"), HOUR).await;
        cache.set("b", json!("b"), HOUR).await;

        // reading "a" must not protect it: eviction is by creation, not access
        assert!(cache.get("a").await.is_some());

        cache.set("c", json!("c"), HOUR).await;

        assert_eq!(cache.entry_count(), 2);
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());
        assert!(cache.get("c").await.is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn delete_removes_both_tiers() {
        let (cache, _temp) = test_cache(10).await;
        cache.set("k", json!(1), HOUR).await;
        let path = cache.entry_path("k").unwrap();
        assert!(path.exists());

        cache.delete("k").await;

        assert!(!path.exists());
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn clear_resets_counters() {
        let (cache, _temp) = test_cache(10).await;
        cache.set("a", json!(1), HOUR).await;
        cache.get("a").await;
        cache.get("missing").await;

        cache.clear().await;

        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.entry_count(), 0);
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_miss() {
        let (cache, _temp) = test_cache(10).await;
        let path = cache.entry_path("k").unwrap();
        std::fs::write(&path, "{not json").unwrap();

        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn unwritable_root_degrades_to_memory() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        // a regular file where the cache directory should be
        let cache = CacheStore::open(blocker.join("cache"), 10).await;

        cache.set("k", json!(1), HOUR).await;
        assert_eq!(cache.get("k").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = CacheStore::disabled();
        cache.set("k", json!(1), HOUR).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.root().is_none());
    }

    #[tokio::test]
    async fn get_json_typed() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Item {
            name: String,
        }
        let (cache, _temp) = test_cache(10).await;
        let item = Item {
            name: "table".to_string(),
        };
        cache.set_json("item", &item, HOUR, None).await;

        assert_eq!(cache.get_json::<Item>("item").await, Some(item));
        assert!(cache.get_json::<Vec<u32>>("item").await.is_none());
    }

    #[test]
    fn hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
