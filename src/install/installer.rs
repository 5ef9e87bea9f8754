//! Batch installer

use crate::concurrency::{run_bounded, BoundedOptions};
use crate::config::InstallConfig;
use crate::error::{CompkitError, CompkitResult};
use crate::install::fs::{TokioFs, WorkspaceFs};
use crate::install::plan::{InstallOptions, InstallPlan, PlannedComponent};
use crate::install::progress::{ComponentPhase, ProgressEvent, ProgressSink};
use crate::registry::Registry;
use crate::resolver::resolve;
use crate::workspace::{detect_workspace, target_file};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// A component that did not install, with the reason
#[derive(Debug)]
pub struct FailedComponent {
    pub name: String,
    pub error: CompkitError,
}

/// Summary of one install batch
#[derive(Debug)]
pub struct InstallOutcome {
    /// Installed components, in plan order
    pub succeeded: Vec<String>,

    pub failed: Vec<FailedComponent>,

    /// Components never started because an earlier one failed with `stop_on_error`
    pub skipped: Vec<String>,

    /// Files written (or that would be written on a dry run) by succeeded components
    pub planned_files: Vec<PathBuf>,

    pub dry_run: bool,
    pub duration: Duration,
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Resolves, fetches and writes components into a workspace
pub struct Installer {
    registry: Arc<Registry>,
    fs: Arc<dyn WorkspaceFs>,
    bounded: BoundedOptions,
    components_dir: PathBuf,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl Installer {
    pub fn new(registry: Arc<Registry>, settings: &InstallConfig) -> Self {
        Self {
            registry,
            fs: Arc::new(TokioFs),
            bounded: BoundedOptions {
                concurrency: settings.concurrency,
                stop_on_error: settings.stop_on_error,
                task_timeout: settings.task_timeout(),
            },
            components_dir: settings.components_dir.clone(),
            progress: None,
        }
    }

    /// Replace the filesystem the installer writes through
    pub fn with_fs(mut self, fs: Arc<dyn WorkspaceFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Report per-component progress on `tx`
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Resolve the dependency closure and target paths.
    ///
    /// Runs before any component I/O so a missing dependency fails the whole
    /// batch instead of leaving a partial install.
    pub async fn plan(
        &self,
        requested: &[String],
        root: &Path,
        options: &InstallOptions,
    ) -> CompkitResult<InstallPlan> {
        options.validate(requested)?;

        let graph = self.registry.dependency_graph().await?;
        let names = resolve(requested, &graph)?;
        debug!("Resolved {:?} to {:?}", requested, names);

        let workspace = detect_workspace(root)?;
        let target_dir = workspace.target_dir(options.path.as_deref(), &self.components_dir)?;

        let components = names
            .into_iter()
            .map(|name| PlannedComponent {
                name,
                target_dir: target_dir.clone(),
            })
            .collect();

        Ok(InstallPlan {
            root: root.to_path_buf(),
            workspace,
            components,
        })
    }

    /// Plan and install `requested` under `root`
    pub async fn install(
        &self,
        requested: &[String],
        root: &Path,
        options: &InstallOptions,
    ) -> CompkitResult<InstallOutcome> {
        let started = Instant::now();
        let plan = self.plan(requested, root, options).await?;
        let mut outcome = self.install_plan(plan, options).await?;
        outcome.duration = started.elapsed();
        Ok(outcome)
    }

    /// Install an already-resolved plan
    pub async fn install_plan(
        &self,
        plan: InstallPlan,
        options: &InstallOptions,
    ) -> CompkitResult<InstallOutcome> {
        let started = Instant::now();
        let names: Vec<String> = plan.components.iter().map(|c| c.name.clone()).collect();
        let sink = ProgressSink::new(self.progress.clone(), names.len());
        for (index, name) in names.iter().enumerate() {
            sink.emit(index, name, ComponentPhase::Pending);
        }

        info!(
            "Installing {} component(s) with {} workspace at {}",
            names.len(),
            plan.workspace.kind,
            plan.workspace.root.display()
        );

        let task = ComponentTask {
            registry: self.registry.clone(),
            fs: self.fs.clone(),
            sink: sink.clone(),
            overwrite: options.overwrite,
            dry_run: options.dry_run,
        };

        let outcome = run_bounded(
            plan.components,
            |component, index| task.clone().run(component, index),
            &self.bounded,
        )
        .await?;

        let mut succeeded = Vec::new();
        let mut planned_files = Vec::new();
        for (index, result) in outcome.results.into_iter().enumerate() {
            if let Some(files) = result {
                succeeded.push(names[index].clone());
                planned_files.extend(files);
            }
        }

        let failed = outcome
            .errors
            .into_iter()
            .map(|failure| {
                let name = names[failure.index].clone();
                warn!("Failed to install {}: {}", name, failure.error);
                sink.emit(failure.index, &name, ComponentPhase::Failed);
                FailedComponent {
                    name,
                    error: failure.error,
                }
            })
            .collect();

        let skipped = outcome
            .skipped
            .into_iter()
            .map(|index| names[index].clone())
            .collect();

        Ok(InstallOutcome {
            succeeded,
            failed,
            skipped,
            planned_files,
            dry_run: options.dry_run,
            duration: started.elapsed(),
        })
    }
}

/// Everything one component install needs, owned so it can run as a task
#[derive(Clone)]
struct ComponentTask {
    registry: Arc<Registry>,
    fs: Arc<dyn WorkspaceFs>,
    sink: ProgressSink,
    overwrite: bool,
    dry_run: bool,
}

impl ComponentTask {
    async fn run(self, component: PlannedComponent, index: usize) -> CompkitResult<Vec<PathBuf>> {
        let name = component.name.as_str();
        self.sink.emit(index, name, ComponentPhase::Resolving);

        let files = match self.registry.cached_files(name).await? {
            Some(files) => {
                self.sink.emit(index, name, ComponentPhase::CacheHit);
                files
            }
            None => {
                self.sink.emit(index, name, ComponentPhase::Fetching);
                self.registry.fetch_files(name).await?
            }
        };

        let targets = files
            .into_iter()
            .map(|file| Ok((target_file(&component.target_dir, &file.path)?, file.content)))
            .collect::<CompkitResult<Vec<(PathBuf, String)>>>()?;

        // every file is checked before the first one is written
        if !self.overwrite {
            for (path, _) in &targets {
                if self.fs.exists(path).await {
                    return Err(CompkitError::FileExists(path.clone()));
                }
            }
        }

        if self.dry_run {
            debug!("Dry run: {} would write {} file(s)", name, targets.len());
        } else {
            self.sink.emit(index, name, ComponentPhase::Writing);
            for (path, content) in &targets {
                self.fs.write_atomic(path, content.as_bytes()).await?;
                debug!("Wrote {}", path.display());
            }
        }

        self.sink.emit(index, name, ComponentPhase::Installed);
        Ok(targets.into_iter().map(|(path, _)| path).collect())
    }
}
