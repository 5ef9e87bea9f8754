//! Workspace package patterns

use crate::error::CompkitResult;
use crate::workspace::detect::read_package_name;
use crate::workspace::{PackageInfo, PackageKind, WorkspaceInfo};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deepest directory level scanned when enumerating packages
const MAX_SCAN_DEPTH: usize = 6;

/// Compiled include/exclude package globs (`!pattern` excludes)
#[derive(Debug, Clone)]
pub struct PackageMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl PackageMatcher {
    pub fn new(patterns: &[String]) -> CompkitResult<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();

        for raw in patterns {
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw.as_str()),
            };
            let pattern = normalize(pattern);
            if pattern.is_empty() {
                continue;
            }
            let glob = compile(&pattern)?;
            if negated {
                exclude.add(glob);
            } else {
                include.add(glob);
            }
        }

        Ok(Self {
            include: include.build()?,
            exclude: exclude.build()?,
        })
    }

    /// Whether a root-relative package directory belongs to the workspace
    pub fn is_match(&self, rel_path: &Path) -> bool {
        self.include.is_match(rel_path) && !self.exclude.is_match(rel_path)
    }
}

fn compile(pattern: &str) -> CompkitResult<Glob> {
    Ok(GlobBuilder::new(pattern).literal_separator(true).build()?)
}

/// Strip `./` prefixes, trailing slashes and a trailing `/package.json`
fn normalize(pattern: &str) -> String {
    let mut pattern = pattern.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    let pattern = pattern.strip_suffix("/package.json").unwrap_or(pattern);
    pattern.trim_end_matches('/').to_string()
}

/// Enumerate the workspace's packages, sorted by path
pub fn list_packages(info: &WorkspaceInfo) -> CompkitResult<Vec<PackageInfo>> {
    if !info.kind.is_monorepo() {
        return Ok(Vec::new());
    }

    let matcher = PackageMatcher::new(&info.package_patterns)?;
    let mut dirs = Vec::new();
    collect_dirs(&info.root, 0, &mut dirs);

    let mut packages: Vec<PackageInfo> = dirs
        .into_iter()
        .filter_map(|dir| {
            let rel = dir.strip_prefix(&info.root).ok()?.to_path_buf();
            if !matcher.is_match(&rel) || !dir.join("package.json").is_file() {
                return None;
            }
            let name = read_package_name(&dir).unwrap_or_else(|| dir_name(&dir));
            let kind = PackageKind::classify(&name, &rel);
            Some(PackageInfo {
                name,
                path: dir,
                kind,
            })
        })
        .collect();

    packages.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Found {} workspace packages", packages.len());
    Ok(packages)
}

fn collect_dirs(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth >= MAX_SCAN_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') || name == "node_modules" {
            continue;
        }
        out.push(path.clone());
        collect_dirs(&path, depth + 1, out);
    }
}

pub(crate) fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
