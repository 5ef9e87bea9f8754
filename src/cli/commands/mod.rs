//! CLI command implementations

pub mod add;
pub mod cache;
pub mod completions;
pub mod config;
pub mod search;
pub mod workspace;

pub use add::execute as add;
pub use cache::execute as cache;
pub use completions::execute as completions;
pub use config::execute as config;
pub use search::execute as search;
pub use workspace::execute as workspace;

use crate::cache::CacheStore;
use crate::config::{Config, ConfigManager};
use crate::error::CompkitResult;
use crate::registry::Registry;
use std::sync::Arc;

/// Open the metadata cache described by `config`
pub(crate) async fn open_cache(config: &Config) -> CacheStore {
    if config.cache.enabled {
        CacheStore::open(ConfigManager::cache_dir(config), config.cache.max_entries).await
    } else {
        CacheStore::disabled()
    }
}

/// Registry client backed by the configured cache
pub(crate) async fn open_registry(config: &Config) -> CompkitResult<Arc<Registry>> {
    let cache = Arc::new(open_cache(config).await);
    Ok(Arc::new(Registry::from_config(config, cache)?))
}
