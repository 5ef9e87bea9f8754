//! Install target paths

use crate::error::{CompkitError, CompkitResult};
use crate::workspace::patterns::list_packages;
use crate::workspace::{PackageKind, WorkspaceInfo};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

impl WorkspaceInfo {
    /// Directory component files are written into.
    ///
    /// An explicit path wins (relative paths are joined onto the root).
    /// Otherwise the base is the current package, then the monorepo's UI
    /// package, then the root; `components_dir` is placed under the base's
    /// `src/` when one exists.
    pub fn target_dir(
        &self,
        explicit: Option<&Path>,
        components_dir: &Path,
    ) -> CompkitResult<PathBuf> {
        if let Some(path) = explicit {
            return Ok(if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            });
        }

        let base = self.install_base()?;
        let src = base.join("src");
        let dir = if src.is_dir() {
            src.join(components_dir)
        } else {
            base.join(components_dir)
        };
        debug!("Install target: {}", dir.display());
        Ok(dir)
    }

    fn install_base(&self) -> CompkitResult<PathBuf> {
        if let Some(package) = &self.current_package {
            return Ok(package.path.clone());
        }
        if self.kind.is_monorepo() {
            let ui = list_packages(self)?
                .into_iter()
                .find(|p| p.kind == PackageKind::Ui);
            if let Some(package) = ui {
                debug!("Using UI package {}", package.name);
                return Ok(package.path);
            }
        }
        Ok(self.root.clone())
    }
}

/// Resolve a registry-relative file path inside `dir`.
///
/// Absolute paths and `..` components are rejected.
pub fn target_file(dir: &Path, file_path: &str) -> CompkitResult<PathBuf> {
    let rel = Path::new(file_path);
    let invalid = |reason: &str| CompkitError::PathInvalid {
        path: rel.to_path_buf(),
        reason: reason.to_string(),
    };

    if file_path.trim().is_empty() {
        return Err(invalid("empty file path"));
    }

    let mut clean = PathBuf::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(invalid("parent directory references are not allowed"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute paths are not allowed"))
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(invalid("empty file path"));
    }
    Ok(dir.join(clean))
}
