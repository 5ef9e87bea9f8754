//! compkit - component registry client
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use compkit::cli::{commands, Cli, Commands};
use compkit::config::{Config, ConfigManager};
use compkit::error::{CompkitError, CompkitResult};
use compkit::fsutil;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Overrides the verbosity-derived log filter
const LOG_ENV: &str = "COMPKIT_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CompkitResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = &cli.command {
        commands::completions(args);
        return Ok(());
    }

    // Ancestor walks need an absolute start
    let cwd = cli.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
    let cwd = fsutil::absolutize(&cwd)
        .map_err(|e| CompkitError::io(format!("resolving {}", cwd.display()), e))?;

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        ConfigManager::find_local_config(&cwd)
    };

    let mut config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;
    if let Some(ref url) = cli.registry {
        config.registry.url = url.clone();
    }

    init_logging(cli.verbose, &config);
    match local_config_path {
        Some(ref path) => debug!("Using local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => {}
    }
    debug!("Registry: {}", config.registry.url);

    match cli.command {
        Commands::Add(args) => commands::add(args, &config, &cwd).await,
        Commands::Search(args) => commands::search(args, &config).await,
        Commands::Workspace(args) => commands::workspace(args, &config, &cwd).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager, &cwd).await,
        Commands::Completions(_) => Ok(()),
    }
}

/// Logs go to stderr: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("compkit=warn"),
        1 => EnvFilter::new("compkit=info"),
        _ => EnvFilter::new("compkit=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.with_target(false).without_time().init();
    }
}
