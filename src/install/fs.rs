//! Filesystem seam for workspace writes

use crate::error::{CompkitError, CompkitResult};
use crate::fsutil;
use async_trait::async_trait;
use std::path::Path;

/// Operations the installer performs on the target workspace
#[async_trait]
pub trait WorkspaceFs: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;

    /// Write `contents` to `path`, creating parent directories
    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> CompkitResult<()>;
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFs;

#[async_trait]
impl WorkspaceFs for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> CompkitResult<()> {
        fsutil::write_atomic(path, contents)
            .await
            .map_err(|e| CompkitError::io(format!("writing {}", path.display()), e))
    }
}
