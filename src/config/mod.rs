//! Configuration management for compkit

pub mod schema;

pub use schema::{CacheConfig, Config, GeneralConfig, InstallConfig, RegistryConfig};

use crate::error::{CompkitError, CompkitResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use toml_edit::{DocumentMut, Item, Table};
use tracing::{debug, info};

/// Name of the project-local config file
pub const LOCAL_CONFIG_NAME: &str = "compkit.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("compkit")
            .join("config.toml")
    }

    /// Get the default cache root
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("compkit")
    }

    /// Cache root honoring the `cache.dir` override
    pub fn cache_dir(config: &Config) -> PathBuf {
        config
            .cache
            .dir
            .clone()
            .unwrap_or_else(Self::default_cache_dir)
    }

    /// Walk up from `start` looking for a project-local `compkit.toml`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> CompkitResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> CompkitResult<Config> {
        let table = read_table(path).await?;
        into_config(table, path)
    }

    /// Load the global config with a project-local file layered on top.
    ///
    /// Tables merge key by key; scalars and arrays in the local file replace
    /// the global value.
    pub async fn load_merged(&self, local: Option<&Path>) -> CompkitResult<Config> {
        let mut merged = if self.config_path.exists() {
            read_table(&self.config_path).await?
        } else {
            toml::Table::new()
        };

        let Some(local) = local else {
            return into_config(merged, &self.config_path);
        };

        debug!("Merging local config {}", local.display());
        let overlay = read_table(local).await?;
        merge_tables(&mut merged, overlay);
        into_config(merged, local)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> CompkitResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            CompkitError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Set a dotted key (e.g. `install.concurrency`) in the config file,
    /// preserving comments and formatting of the rest of the file.
    pub async fn set_value(&self, key: &str, raw: &str) -> CompkitResult<()> {
        let existing = if self.config_path.exists() {
            fs::read_to_string(&self.config_path).await.map_err(|e| {
                CompkitError::io(format!("reading config from {}", self.config_path.display()), e)
            })?
        } else {
            String::new()
        };

        let updated = apply_value(&existing, key, raw, &self.config_path)?;

        self.ensure_config_dir().await?;
        fs::write(&self.config_path, updated).await.map_err(|e| {
            CompkitError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Set {} in {}", key, self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> CompkitResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CompkitError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_table(path: &Path) -> CompkitResult<toml::Table> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| CompkitError::io(format!("reading config from {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| CompkitError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn into_config(table: toml::Table, path: &Path) -> CompkitResult<Config> {
    let config: Config =
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| CompkitError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
    config.validate(path)?;
    Ok(config)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply `key = raw` to a TOML document and validate the result
fn apply_value(existing: &str, key: &str, raw: &str, path: &Path) -> CompkitResult<String> {
    let invalid = |reason: String| CompkitError::ConfigInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let mut doc: DocumentMut = existing
        .parse()
        .map_err(|e: toml_edit::TomlError| invalid(e.to_string()))?;

    let segments: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(invalid("empty key".to_string()));
    };
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid(format!("invalid key '{}'", key)));
    }

    let mut table: &mut Table = doc.as_table_mut();
    for segment in parents {
        let entry = table
            .entry(segment)
            .or_insert_with(|| Item::Table(Table::new()));
        table = entry
            .as_table_mut()
            .ok_or_else(|| invalid(format!("'{}' is not a table", segment)))?;
    }
    table.insert(leaf, toml_edit::value(parse_scalar(raw)));

    let rendered = doc.to_string();
    let parsed: toml::Table = toml::from_str(&rendered).map_err(|e| invalid(e.to_string()))?;
    into_config(parsed, path)?;
    Ok(rendered)
}

/// Interpret a CLI string as the most specific TOML scalar it parses as
fn parse_scalar(raw: &str) -> toml_edit::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return b.into();
    }
    if let Ok(i) = raw.parse::<i64>() {
        return i.into();
    }
    if let Ok(f) = raw.parse::<f64>() {
        return f.into();
    }
    raw.into()
}
