//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// compkit - install UI components from a registry
///
/// Resolves component dependencies, caches registry metadata, and writes
/// component files into single-package projects and monorepos.
#[derive(Parser, Debug)]
#[command(name = "compkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMPKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local compkit.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Run as if started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Registry URL or directory (overrides registry.url)
    #[arg(long, global = true, env = "COMPKIT_REGISTRY")]
    pub registry: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install components and their dependencies
    Add(AddArgs),

    /// Search the registry
    Search(SearchArgs),

    /// Show the detected workspace layout
    Workspace(WorkspaceArgs),

    /// Inspect or clear the metadata cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the add command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Components to install
    #[arg(required = true)]
    pub components: Vec<String>,

    /// Replace files that already exist
    #[arg(short, long)]
    pub overwrite: bool,

    /// Install into this directory instead of the detected one
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Resolve and check conflicts without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Components installed at once (default: from config)
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Stop starting new components after the first failure
    #[arg(long)]
    pub stop_on_error: bool,
}

/// Arguments for the search command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Text matched against component names and descriptions
    pub query: Option<String>,

    /// Only components in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only components supporting this framework
    #[arg(long)]
    pub framework: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the workspace command
#[derive(Parser, Debug)]
pub struct WorkspaceArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., install.concurrency)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local compkit.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show entry count and hit/miss counters
    Stats {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove every cached entry
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the cache directory
    Path,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
