//! Install options and plans

use crate::error::{CompkitError, CompkitResult};
use crate::registry::validate_name;
use crate::workspace::WorkspaceInfo;
use std::path::PathBuf;

/// Caller-selected install behavior
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Replace files that already exist
    pub overwrite: bool,

    /// Explicit target directory; relative paths are joined onto the workspace root
    pub path: Option<PathBuf>,

    /// Resolve, fetch and conflict-check without writing
    pub dry_run: bool,
}

impl InstallOptions {
    /// Check a request before any I/O happens
    pub fn validate(&self, requested: &[String]) -> CompkitResult<()> {
        if requested.is_empty() {
            return Err(CompkitError::InvalidOption(
                "no components requested".to_string(),
            ));
        }
        for name in requested {
            validate_name(name)?;
        }
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(CompkitError::InvalidOption(
                    "--path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A component and the directory its files go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedComponent {
    pub name: String,
    pub target_dir: PathBuf,
}

/// Resolved closure paired with target paths; consumed by one install
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub root: PathBuf,
    pub workspace: WorkspaceInfo,
    pub components: Vec<PlannedComponent>,
}

impl InstallPlan {
    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}
