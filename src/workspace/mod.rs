//! Workspace layout detection
//!
//! Finds the workspace root above a starting directory, recognizes the
//! monorepo tool that owns it, and computes where component files go.
//! Nothing in this module writes to the workspace.
//!
//! # Detection Order
//!
//! Per directory, nearest ancestor first:
//!
//! | Marker | Kind |
//! |--------|------|
//! | `pnpm-workspace.yaml` | pnpm |
//! | `rush.json` | rush |
//! | `nx.json` | nx |
//! | `lerna.json` | lerna |
//! | `package.json` with `workspaces` | yarn (if `yarn.lock`) or npm |

pub mod detect;
pub mod paths;
pub mod patterns;

pub use detect::detect_workspace;
pub use paths::target_file;
pub use patterns::{list_packages, PackageMatcher};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Workspace tooling that owns the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceKind {
    Single,
    Npm,
    Yarn,
    Pnpm,
    Nx,
    Lerna,
    Rush,
}

impl WorkspaceKind {
    /// Whether the root can hold more than one package
    pub fn is_monorepo(&self) -> bool {
        !matches!(self, Self::Single)
    }
}

impl fmt::Display for WorkspaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Nx => "nx",
            Self::Lerna => "lerna",
            Self::Rush => "rush",
        };
        write!(f, "{}", name)
    }
}

/// Role of a package inside a monorepo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    App,
    Lib,
    Ui,
    Unknown,
}

impl PackageKind {
    /// Classify a package from its name and root-relative directory
    pub fn classify(name: &str, rel_path: &Path) -> Self {
        let dir_name = rel_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if dir_name == "ui" || name == "ui" || name.ends_with("/ui") || name.ends_with("-ui") {
            return Self::Ui;
        }

        let top = rel_path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default();

        match top.as_str() {
            "apps" | "app" => Self::App,
            "libs" | "lib" | "packages" => Self::Lib,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::App => "app",
            Self::Lib => "lib",
            Self::Ui => "ui",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A package inside the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub path: PathBuf,
    pub kind: PackageKind,
}

/// Detected workspace layout; immutable for the duration of a command
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceInfo {
    #[serde(rename = "type")]
    pub kind: WorkspaceKind,
    pub root: PathBuf,
    pub package_patterns: Vec<String>,
    pub current_package: Option<PackageInfo>,
}
