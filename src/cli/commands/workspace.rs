//! Workspace command - show detected layout and install target

use crate::cli::args::{OutputFormat, WorkspaceArgs};
use crate::config::Config;
use crate::error::CompkitResult;
use crate::ui;
use crate::workspace::{detect_workspace, list_packages, PackageInfo, WorkspaceInfo};
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct WorkspaceReport<'a> {
    #[serde(flatten)]
    workspace: &'a WorkspaceInfo,
    target_dir: PathBuf,
    packages: &'a [PackageInfo],
}

/// Execute the workspace command
pub async fn execute(args: WorkspaceArgs, config: &Config, cwd: &Path) -> CompkitResult<()> {
    let workspace = detect_workspace(cwd)?;
    let packages = list_packages(&workspace)?;
    let target_dir = workspace.target_dir(None, &config.install.components_dir)?;

    match args.format {
        OutputFormat::Table => print_table(&workspace, &packages, &target_dir),
        OutputFormat::Json => {
            let report = WorkspaceReport {
                workspace: &workspace,
                target_dir,
                packages: &packages,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => println!("{}", workspace.root.display()),
    }

    Ok(())
}

fn print_table(workspace: &WorkspaceInfo, packages: &[PackageInfo], target_dir: &Path) {
    println!("{}", style("Workspace").bold());
    ui::key_value("type", &workspace.kind.to_string());
    ui::key_value("root", &workspace.root.display().to_string());
    if !workspace.package_patterns.is_empty() {
        ui::key_value("patterns", &workspace.package_patterns.join(", "));
    }
    if let Some(current) = &workspace.current_package {
        ui::key_value("current package", &format!("{} ({})", current.name, current.kind));
    }
    ui::key_value("install target", &target_dir.display().to_string());

    if packages.is_empty() {
        return;
    }

    println!();
    println!("{:<30} {:<8} {}", "PACKAGE", "KIND", "PATH");
    println!("{}", "-".repeat(80));
    for package in packages {
        let rel = package
            .path
            .strip_prefix(&workspace.root)
            .unwrap_or(&package.path);
        println!(
            "{:<30} {:<8} {}",
            package.name,
            package.kind.to_string(),
            rel.display()
        );
    }
}
