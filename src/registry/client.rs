//! Caching registry client

use crate::cache::{key, CacheStore};
use crate::concurrency::{retry, RetryOptions};
use crate::config::Config;
use crate::error::{CompkitError, CompkitResult};
use crate::registry::transport::{transport_for, RegistryTransport, TransportResponse};
use crate::registry::types::{validate_name, Component, ComponentFile, FetchedFiles, SearchFilter};
use crate::resolver::DependencyGraph;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Registry access with response validation, caching and retries
pub struct Registry {
    transport: Arc<dyn RegistryTransport>,
    cache: Arc<CacheStore>,
    retry: RetryOptions,
    ttl: Duration,
    search_ttl: Duration,
}

impl Registry {
    pub fn new(
        transport: Arc<dyn RegistryTransport>,
        cache: Arc<CacheStore>,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            cache,
            retry: RetryOptions {
                retries: config.registry.retries,
                initial_delay: config.registry.initial_delay(),
                backoff_factor: config.registry.backoff_factor,
            },
            ttl: config.cache.ttl(),
            search_ttl: config.cache.search_ttl(),
        }
    }

    /// Build a client for `config.registry.url`
    pub fn from_config(config: &Config, cache: Arc<CacheStore>) -> CompkitResult<Self> {
        let transport = transport_for(&config.registry.url, config.registry.timeout())?;
        debug!("Using registry {}", transport.describe());
        Ok(Self::new(transport, cache, config))
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn describe(&self) -> String {
        self.transport.describe()
    }

    /// The full, validated component index
    pub async fn index(&self) -> CompkitResult<Vec<Component>> {
        if let Some(index) = self.cache.get_json::<Vec<Component>>(key::REGISTRY_INDEX).await {
            debug!("Registry index served from cache");
            return Ok(index);
        }

        let response = self
            .fetch("index", || self.transport.fetch_index())
            .await?;
        let index = parse_index(response.body)?;
        self.cache
            .set_json(key::REGISTRY_INDEX, &index, self.search_ttl, response.etag)
            .await;
        Ok(index)
    }

    /// Components matching `filter`, in index order
    pub async fn search(&self, filter: &SearchFilter) -> CompkitResult<Vec<Component>> {
        let cache_key = key::search(filter)?;
        if let Some(results) = self.cache.get_json::<Vec<Component>>(&cache_key).await {
            debug!("Search results served from cache");
            return Ok(results);
        }

        let results: Vec<Component> = self
            .index()
            .await?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        self.cache
            .set_json(&cache_key, &results, self.search_ttl, None)
            .await;
        Ok(results)
    }

    /// File payload for one component, from cache when fresh
    pub async fn get_files(&self, name: &str) -> CompkitResult<FetchedFiles> {
        if let Some(files) = self.cached_files(name).await? {
            return Ok(FetchedFiles {
                files,
                from_cache: true,
            });
        }
        let files = self.fetch_files(name).await?;
        Ok(FetchedFiles {
            files,
            from_cache: false,
        })
    }

    /// Cached file payload, without touching the transport
    pub async fn cached_files(&self, name: &str) -> CompkitResult<Option<Vec<ComponentFile>>> {
        validate_name(name)?;
        let files = self
            .cache
            .get_json::<Vec<ComponentFile>>(&key::files(name))
            .await;
        if files.is_some() {
            debug!("Files for {} served from cache", name);
        }
        Ok(files)
    }

    /// Fetch a file payload from the transport and cache it
    pub async fn fetch_files(&self, name: &str) -> CompkitResult<Vec<ComponentFile>> {
        validate_name(name)?;
        let response = self
            .fetch(name, || self.transport.fetch_files(name))
            .await?;
        let files = parse_files(name, response.body)?;
        self.cache
            .set_json(&key::files(name), &files, self.ttl, response.etag)
            .await;
        Ok(files)
    }

    /// Dependency graph over every component in the index
    pub async fn dependency_graph(&self) -> CompkitResult<DependencyGraph> {
        let index = self.index().await?;
        Ok(DependencyGraph::from_components(
            index.into_iter().map(|c| (c.name, c.dependencies)),
        ))
    }

    async fn fetch<F, Fut>(&self, what: &str, operation: F) -> CompkitResult<TransportResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CompkitResult<TransportResponse>>,
    {
        let attempts = self.retry.retries;
        retry(operation, &self.retry, |e, attempt| {
            warn!("Fetching {} failed (attempt {}/{}): {}", what, attempt, attempts, e);
        })
        .await
        .map_err(|e| match e {
            CompkitError::Timeout { .. } => CompkitError::fetch(what, e.to_string()),
            other => other,
        })
    }
}

fn parse_index(body: Value) -> CompkitResult<Vec<Component>> {
    let Value::Array(items) = body else {
        return Err(CompkitError::RegistryInvalid(
            "index must be a JSON array".to_string(),
        ));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| parse_component(position, item))
        .collect()
}

fn parse_component(position: usize, item: Value) -> CompkitResult<Component> {
    if !item.is_object() {
        return Err(CompkitError::RegistryInvalid(format!(
            "index entry {} is not an object",
            position
        )));
    }

    let mut component: Component = serde_json::from_value(item).map_err(|e| {
        CompkitError::RegistryInvalid(format!("index entry {}: {}", position, e))
    })?;

    if validate_name(&component.name).is_err() {
        return Err(CompkitError::RegistryInvalid(format!(
            "index entry {} has an invalid name '{}'",
            position, component.name
        )));
    }
    if let Some(bad) = component
        .dependencies
        .iter()
        .find(|dep| validate_name(dep).is_err())
    {
        return Err(CompkitError::RegistryInvalid(format!(
            "{} depends on an invalid name '{}'",
            component.name, bad
        )));
    }

    if let Err(e) = semver::Version::parse(&component.version) {
        return Err(CompkitError::RegistryInvalid(format!(
            "{} has invalid version '{}': {}",
            component.name, component.version, e
        )));
    }

    let declared = component.dependencies.len();
    component.dependencies.retain(|d| d != &component.name);
    if component.dependencies.len() != declared {
        warn!("Component {} depends on itself; ignoring", component.name);
    }

    Ok(component)
}

/// Accepts either `{ "files": [...] }` or a bare array
fn parse_files(name: &str, body: Value) -> CompkitResult<Vec<ComponentFile>> {
    let list = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("files").ok_or_else(|| {
            CompkitError::RegistryInvalid(format!("{}: missing 'files'", name))
        })?,
        _ => {
            return Err(CompkitError::RegistryInvalid(format!(
                "{}: expected an object or array",
                name
            )))
        }
    };

    let files: Vec<ComponentFile> = serde_json::from_value(list)
        .map_err(|e| CompkitError::RegistryInvalid(format!("{}: {}", name, e)))?;
    if files.is_empty() {
        return Err(CompkitError::RegistryInvalid(format!("{} has no files", name)));
    }
    Ok(files)
}
