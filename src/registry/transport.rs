//! Registry transports
//!
//! A registry serves two documents: `index.json` (array of components) and
//! `components/{name}.json` (the component's files). [`HttpTransport`]
//! fetches them over HTTP(S); [`DirTransport`] reads the same layout from
//! a local directory.

use crate::error::{CompkitError, CompkitResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Raw registry document
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub body: Value,
    pub etag: Option<String>,
}

/// Source of registry documents
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// Transport description for logs
    fn describe(&self) -> String;

    /// Fetch the component index
    async fn fetch_index(&self) -> CompkitResult<TransportResponse>;

    /// Fetch the file payload of one component
    async fn fetch_files(&self, name: &str) -> CompkitResult<TransportResponse>;
}

/// Pick a transport for a registry URL.
///
/// `http://` and `https://` use HTTP; `file://` URLs and plain paths read
/// from disk.
pub fn transport_for(url: &str, timeout: Duration) -> CompkitResult<Arc<dyn RegistryTransport>> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(Arc::new(HttpTransport::new(url, timeout)));
    }
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Arc::new(DirTransport::new(path)));
    }
    if url.contains("://") {
        return Err(CompkitError::InvalidOption(format!(
            "unsupported registry URL scheme: {}",
            url
        )));
    }
    Ok(Arc::new(DirTransport::new(url)))
}

/// HTTP registry client
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    async fn get(&self, path: &str, component: &str) -> CompkitResult<TransportResponse> {
        let url = format!("{}/{}", self.base_url, path);
        let agent = self.agent.clone();
        let timeout = self.timeout;
        let component = component.to_string();
        debug!("GET {}", url);

        tokio::task::spawn_blocking(move || get_blocking(&agent, &url, &component, timeout))
            .await
            .map_err(|e| CompkitError::Internal(format!("request task failed: {}", e)))?
    }
}

fn get_blocking(
    agent: &ureq::Agent,
    url: &str,
    component: &str,
    timeout: Duration,
) -> CompkitResult<TransportResponse> {
    let mut response = agent.get(url).call().map_err(|e| match e {
        ureq::Error::StatusCode(404) => CompkitError::not_found(component),
        ureq::Error::StatusCode(code) => CompkitError::fetch(component, format!("HTTP {}", code)),
        ureq::Error::Timeout(_) => CompkitError::Timeout {
            message: format!("GET {}", url),
            after: timeout,
        },
        other => CompkitError::fetch(component, other.to_string()),
    })?;

    let etag = response
        .headers()
        .get("etag")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| CompkitError::fetch(component, e.to_string()))?;
    let body = serde_json::from_str(&text)
        .map_err(|e| CompkitError::RegistryInvalid(format!("{}: {}", url, e)))?;

    Ok(TransportResponse { body, etag })
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_index(&self) -> CompkitResult<TransportResponse> {
        self.get("index.json", "index").await
    }

    async fn fetch_files(&self, name: &str) -> CompkitResult<TransportResponse> {
        self.get(&format!("components/{}.json", name), name).await
    }
}

/// Registry laid out in a local directory
pub struct DirTransport {
    root: PathBuf,
}

impl DirTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(&self, path: PathBuf, component: &str) -> CompkitResult<TransportResponse> {
        debug!("Reading {}", path.display());
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CompkitError::fetch(component, format!("{}: {}", path.display(), e)))?;
        let body = serde_json::from_str(&text)
            .map_err(|e| CompkitError::RegistryInvalid(format!("{}: {}", path.display(), e)))?;
        Ok(TransportResponse { body, etag: None })
    }
}

#[async_trait]
impl RegistryTransport for DirTransport {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch_index(&self) -> CompkitResult<TransportResponse> {
        self.read(self.root.join("index.json"), "index").await
    }

    async fn fetch_files(&self, name: &str) -> CompkitResult<TransportResponse> {
        let path = self.root.join("components").join(format!("{}.json", name));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(CompkitError::not_found(name));
        }
        self.read(path, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn picks_transport_by_scheme() {
        let timeout = Duration::from_secs(5);
        let http = transport_for("https://example.com/r/", timeout).unwrap();
        assert_eq!(http.describe(), "https://example.com/r");

        let file = transport_for("file:///srv/registry", timeout).unwrap();
        assert_eq!(file.describe(), "/srv/registry");

        let plain = transport_for("./registry", timeout).unwrap();
        assert_eq!(plain.describe(), "./registry");

        assert!(transport_for("ftp://example.com", timeout).is_err());
    }

    #[tokio::test]
    async fn dir_transport_reads_layout() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("components")).unwrap();
        std::fs::write(temp.path().join("index.json"), r#"[{"name": "button"}]"#).unwrap();
        std::fs::write(
            temp.path().join("components/button.json"),
            r#"{"files": []}"#,
        )
        .unwrap();

        let transport = DirTransport::new(temp.path());
        let index = transport.fetch_index().await.unwrap();
        assert!(index.body.is_array());
        let files = transport.fetch_files("button").await.unwrap();
        assert!(files.body.get("files").is_some());
    }

    #[tokio::test]
    async fn dir_transport_missing_component() {
        let temp = TempDir::new().unwrap();
        let transport = DirTransport::new(temp.path());

        let err = transport.fetch_files("ghost").await.unwrap_err();
        assert!(matches!(err, CompkitError::ComponentNotFound { .. }));

        let err = transport.fetch_index().await.unwrap_err();
        assert!(matches!(err, CompkitError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn dir_transport_invalid_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.json"), "not json").unwrap();
        let err = DirTransport::new(temp.path()).fetch_index().await.unwrap_err();
        assert!(matches!(err, CompkitError::RegistryInvalid(_)));
    }
}
