//! Add command - install components into the workspace

use crate::cli::args::AddArgs;
use crate::cli::commands::open_registry;
use crate::config::Config;
use crate::error::{CompkitError, CompkitResult};
use crate::install::{InstallOptions, InstallOutcome, Installer};
use crate::ui::{self, InstallProgress, TaskSpinner, UiContext};
use std::path::Path;
use tokio::sync::mpsc;

/// Progress events buffered between the installer and the progress bar
const PROGRESS_BUFFER: usize = 64;

/// Execute the add command
pub async fn execute(args: AddArgs, config: &Config, cwd: &Path) -> CompkitResult<()> {
    let ctx = UiContext::detect();

    let mut settings = config.install.clone();
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(CompkitError::InvalidOption(
                "--concurrency must be at least 1".to_string(),
            ));
        }
        settings.concurrency = concurrency;
    }
    settings.stop_on_error |= args.stop_on_error;

    let options = InstallOptions {
        overwrite: args.overwrite,
        path: args.path,
        dry_run: args.dry_run,
    };

    let registry = open_registry(config).await?;
    let (tx, mut rx) = mpsc::channel(PROGRESS_BUFFER);
    let installer = Installer::new(registry.clone(), &settings).with_progress(tx);

    let title = if options.dry_run {
        "compkit add (dry run)"
    } else {
        "compkit add"
    };
    ui::intro(&ctx, title);

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Resolving components...");
    let plan = match installer.plan(&args.components, cwd, &options).await {
        Ok(plan) => plan,
        Err(e) => {
            spinner.stop_error("Resolution failed");
            return Err(e);
        }
    };
    spinner.stop(&format!(
        "Resolved {} component(s): {}",
        plan.components.len(),
        plan.names().join(", ")
    ));
    if let Some(first) = plan.components.first() {
        ui::remark(
            &ctx,
            &format!("{} workspace, target {}", plan.workspace.kind, first.target_dir.display()),
        );
    }

    let progress = InstallProgress::new(&ctx, plan.components.len());
    let install = installer.install_plan(plan, &options);
    tokio::pin!(install);
    let result = loop {
        tokio::select! {
            result = &mut install => break result,
            Some(event) = rx.recv() => progress.on_event(&event),
        }
    };
    while let Ok(event) = rx.try_recv() {
        progress.on_event(&event);
    }
    progress.finish();
    registry.cache().flush_stats().await;

    let outcome = result?;
    report(&ctx, &outcome, cwd);

    if outcome.is_success() {
        Ok(())
    } else {
        Err(CompkitError::User(format!(
            "{} of {} component(s) did not install",
            outcome.failed.len() + outcome.skipped.len(),
            outcome.succeeded.len() + outcome.failed.len() + outcome.skipped.len()
        )))
    }
}

fn report(ctx: &UiContext, outcome: &InstallOutcome, cwd: &Path) {
    for name in &outcome.succeeded {
        ui::step_ok(ctx, name);
    }
    for failure in &outcome.failed {
        ui::step_error_detail(ctx, &failure.name, &failure.error.to_string());
        if let Some(hint) = failure.error.hint() {
            ui::remark(ctx, hint);
        }
    }
    for name in &outcome.skipped {
        ui::step_warn(ctx, &format!("{} skipped after an earlier failure", name));
    }

    if outcome.dry_run {
        ui::step_info(ctx, "Dry run, no files written. Would write:");
    }
    for path in &outcome.planned_files {
        let shown = path.strip_prefix(cwd).unwrap_or(path);
        ui::remark(ctx, &shown.display().to_string());
    }

    let verb = if outcome.dry_run { "Checked" } else { "Installed" };
    ui::outro(
        ctx,
        &format!(
            "{} {} component(s) in {:.1}s",
            verb,
            outcome.succeeded.len(),
            outcome.duration.as_secs_f64()
        ),
        outcome.is_success(),
    );
}
