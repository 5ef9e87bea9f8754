//! Configuration schema for compkit
//!
//! Configuration is stored at `~/.config/compkit/config.toml`; a project may
//! override any key in a `compkit.toml` found in an ancestor directory.

use crate::error::{CompkitError, CompkitResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Component registry settings
    pub registry: RegistryConfig,

    /// Metadata cache settings
    pub cache: CacheConfig,

    /// Installation settings
    pub install: InstallConfig,
}

impl Config {
    /// Validate values that cannot be expressed in the type system
    pub fn validate(&self, path: &Path) -> CompkitResult<()> {
        let invalid = |reason: &str| CompkitError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.install.concurrency == 0 {
            return Err(invalid("install.concurrency must be at least 1"));
        }
        if self.registry.retries == 0 {
            return Err(invalid("registry.retries must be at least 1"));
        }
        if self.registry.backoff_factor < 1.0 {
            return Err(invalid("registry.backoff_factor must be >= 1.0"));
        }
        if self.cache.max_entries == 0 {
            return Err(invalid("cache.max_entries must be at least 1"));
        }
        if self.cache.ttl_secs == 0 || self.cache.search_ttl_secs == 0 {
            return Err(invalid("cache TTLs must be positive"));
        }
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(invalid("general.log_format must be \"text\" or \"json\""));
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Registry connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry base URL (`https://...`, `file://...` or a local directory)
    pub url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Total fetch attempts before giving up
    pub retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f64,
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://registry.compkit.dev/r".to_string(),
            timeout_secs: 30,
            retries: 3,
            initial_delay_ms: 500,
            backoff_factor: 2.0,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the metadata cache (default: true)
    pub enabled: bool,

    /// Override the cache directory (default: `~/.cache/compkit`)
    pub dir: Option<PathBuf>,

    /// TTL for component file payloads, in seconds
    pub ttl_secs: u64,

    /// TTL for registry index/search results, in seconds
    pub search_ttl_secs: u64,

    /// Maximum number of cache entries before the oldest are evicted
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl_secs: 24 * 60 * 60,
            search_ttl_secs: 60 * 60,
            max_entries: 500,
        }
    }
}

/// Installation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Maximum components fetched/written at once
    pub concurrency: usize,

    /// Per-component timeout in seconds (0 = no timeout)
    pub task_timeout_secs: u64,

    /// Abort remaining components after the first failure
    pub stop_on_error: bool,

    /// Directory (relative to the package root) components are written to
    pub components_dir: PathBuf,
}

impl InstallConfig {
    pub fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_secs > 0).then(|| Duration::from_secs(self.task_timeout_secs))
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            task_timeout_secs: 60,
            stop_on_error: false,
            components_dir: PathBuf::from("components/ui"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[registry]"));
        assert!(toml.contains("[install]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.install.concurrency, 5);
        assert_eq!(config.registry.retries, 3);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [install]
            concurrency = 2
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.install.concurrency, 2);
        assert_eq!(config.install.components_dir, PathBuf::from("components/ui")); // default preserved
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate(Path::new("config.toml")).is_ok());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.install.concurrency = 0;
        let err = config.validate(Path::new("config.toml")).unwrap_err();
        assert!(err.to_string().contains("install.concurrency"));
    }

    #[test]
    fn validate_rejects_shrinking_backoff() {
        let mut config = Config::default();
        config.registry.backoff_factor = 0.5;
        assert!(config.validate(Path::new("config.toml")).is_err());
    }

    #[test]
    fn task_timeout_zero_disables() {
        let mut config = InstallConfig::default();
        assert_eq!(config.task_timeout(), Some(Duration::from_secs(60)));
        config.task_timeout_secs = 0;
        assert!(config.task_timeout().is_none());
    }
}
