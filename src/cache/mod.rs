//! Hybrid metadata cache
//!
//! Registry responses are cached in two tiers: a process-local map and one
//! JSON file per entry under the cache root. The cache is an optimization
//! only; disk failures degrade to misses and never surface to callers.
//!
//! # Entry Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | `set` | Written to both tiers, `expires_at = now + ttl` |
//! | `get` hit on disk | Promoted to the process-local tier |
//! | `get` after expiry | Deleted from both tiers, reported as a miss |
//! | over `max_entries` | Oldest `created_at` evicted first (FIFO) |

pub mod entry;
pub mod key;
pub mod store;

pub use entry::CacheEntry;
pub use key::digest;
pub use store::{CacheStats, CacheStore, INDEX_FILE};
