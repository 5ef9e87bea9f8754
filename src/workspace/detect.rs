//! Workspace root and tooling detection

use crate::error::{CompkitError, CompkitResult};
use crate::fsutil;
use crate::workspace::patterns::{dir_name, PackageMatcher};
use crate::workspace::{PackageInfo, PackageKind, WorkspaceInfo, WorkspaceKind};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const NX_DEFAULT_PATTERNS: &[&str] = &["apps/*", "libs/*", "packages/*"];
const LERNA_DEFAULT_PATTERNS: &[&str] = &["packages/*"];

#[derive(Debug, Default, Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RushConfig {
    #[serde(default)]
    projects: Vec<RushProject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RushProject {
    project_folder: String,
}

#[derive(Debug, Default, Deserialize)]
struct LernaConfig {
    packages: Option<Vec<String>>,
}

/// Detect the workspace containing `start`.
///
/// Walks from `start` towards the filesystem root; the first directory
/// carrying a workspace marker becomes the root.
pub fn detect_workspace(start: &Path) -> CompkitResult<WorkspaceInfo> {
    let start = fsutil::absolutize(start)
        .map_err(|e| CompkitError::io(format!("resolving {}", start.display()), e))?;
    let start = start.as_path();
    if !start.is_dir() {
        return Err(CompkitError::PathInvalid {
            path: start.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    for dir in start.ancestors() {
        if let Some((kind, package_patterns)) = detect_marker(dir)? {
            debug!("Detected {} workspace at {}", kind, dir.display());
            let current_package = current_package(start, dir, &package_patterns)?;
            return Ok(WorkspaceInfo {
                kind,
                root: dir.to_path_buf(),
                package_patterns,
                current_package,
            });
        }
    }

    let root = start
        .ancestors()
        .find(|dir| dir.join("package.json").is_file())
        .unwrap_or(start)
        .to_path_buf();
    debug!("No workspace markers found, using {}", root.display());

    Ok(WorkspaceInfo {
        kind: WorkspaceKind::Single,
        root,
        package_patterns: Vec::new(),
        current_package: None,
    })
}

/// Check one directory for workspace markers, in priority order
fn detect_marker(dir: &Path) -> CompkitResult<Option<(WorkspaceKind, Vec<String>)>> {
    let pnpm = dir.join("pnpm-workspace.yaml");
    if pnpm.is_file() {
        let content = read(&pnpm)?;
        let config: PnpmWorkspace = if content.trim().is_empty() {
            PnpmWorkspace::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        return Ok(Some((WorkspaceKind::Pnpm, config.packages)));
    }

    let rush = dir.join("rush.json");
    if rush.is_file() {
        let patterns = match serde_json::from_str::<RushConfig>(&read(&rush)?) {
            Ok(config) => config
                .projects
                .into_iter()
                .map(|p| p.project_folder)
                .collect(),
            Err(e) => {
                warn!("Could not parse {}: {}", rush.display(), e);
                Vec::new()
            }
        };
        return Ok(Some((WorkspaceKind::Rush, patterns)));
    }

    let nx = dir.join("nx.json");
    if nx.is_file() {
        let patterns = package_json_workspaces(dir)
            .unwrap_or_else(|| to_owned(NX_DEFAULT_PATTERNS));
        return Ok(Some((WorkspaceKind::Nx, patterns)));
    }

    let lerna = dir.join("lerna.json");
    if lerna.is_file() {
        let configured = match serde_json::from_str::<LernaConfig>(&read(&lerna)?) {
            Ok(config) => config.packages,
            Err(e) => {
                warn!("Could not parse {}: {}", lerna.display(), e);
                None
            }
        };
        let patterns = configured
            .or_else(|| package_json_workspaces(dir))
            .unwrap_or_else(|| to_owned(LERNA_DEFAULT_PATTERNS));
        return Ok(Some((WorkspaceKind::Lerna, patterns)));
    }

    if let Some(patterns) = package_json_workspaces(dir) {
        let kind = if dir.join("yarn.lock").is_file() {
            WorkspaceKind::Yarn
        } else {
            WorkspaceKind::Npm
        };
        return Ok(Some((kind, patterns)));
    }

    Ok(None)
}

/// `workspaces` from `package.json`, either an array or `{ packages: [...] }`
fn package_json_workspaces(dir: &Path) -> Option<Vec<String>> {
    let manifest = read_manifest(dir)?;
    let workspaces = manifest.get("workspaces")?;
    let list = match workspaces {
        Value::Array(_) => workspaces,
        Value::Object(map) => map.get("packages")?,
        _ => return None,
    };
    let patterns = list
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    Some(patterns)
}

/// Nearest package between `start` and `root` that the workspace owns
fn current_package(
    start: &Path,
    root: &Path,
    patterns: &[String],
) -> CompkitResult<Option<PackageInfo>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let matcher = PackageMatcher::new(patterns)?;

    for dir in start.ancestors() {
        if dir == root {
            break;
        }
        let Ok(rel) = dir.strip_prefix(root) else {
            break;
        };
        if dir.join("package.json").is_file() && matcher.is_match(rel) {
            let name = read_package_name(dir).unwrap_or_else(|| dir_name(dir));
            let kind = PackageKind::classify(&name, rel);
            return Ok(Some(PackageInfo {
                name,
                path: dir.to_path_buf(),
                kind,
            }));
        }
    }

    Ok(None)
}

/// Package name from `dir/package.json`, if it declares one
pub(crate) fn read_package_name(dir: &Path) -> Option<String> {
    read_manifest(dir)?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

fn read_manifest(dir: &Path) -> Option<Value> {
    let path = dir.join("package.json");
    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

fn read(path: &Path) -> CompkitResult<String> {
    fs::read_to_string(path)
        .map_err(|e| CompkitError::io(format!("reading {}", path.display()), e))
}

fn to_owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
