//! Cache command - inspect or clear the metadata cache

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::commands::open_cache;
use crate::config::{Config, ConfigManager};
use crate::error::CompkitResult;
use crate::ui::{self, UiContext};
use serde::Serialize;

#[derive(Serialize)]
struct StatsReport {
    enabled: bool,
    dir: String,
    entries: usize,
    hits: u64,
    misses: u64,
    writes: u64,
    evictions: u64,
    hit_rate: f64,
}

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> CompkitResult<()> {
    match args.action {
        CacheAction::Stats { format } => show_stats(config, format).await,
        CacheAction::Clear { yes } => clear(config, yes).await,
        CacheAction::Path => {
            println!("{}", ConfigManager::cache_dir(config).display());
            Ok(())
        }
    }
}

async fn show_stats(config: &Config, format: OutputFormat) -> CompkitResult<()> {
    let store = open_cache(config).await;
    let stats = store.stats();
    let report = StatsReport {
        enabled: config.cache.enabled,
        dir: ConfigManager::cache_dir(config).display().to_string(),
        entries: store.entry_count(),
        hits: stats.hits,
        misses: stats.misses,
        writes: stats.writes,
        evictions: stats.evictions,
        hit_rate: stats.hit_rate(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => println!("{}", report.entries),
        OutputFormat::Table => {
            if !report.enabled {
                println!("Cache is disabled (cache.enabled = false)");
            }
            ui::key_value("directory", &report.dir);
            ui::key_value(
                "entries",
                &format!("{} / {}", report.entries, config.cache.max_entries),
            );
            ui::key_value("hits", &report.hits.to_string());
            ui::key_value("misses", &report.misses.to_string());
            ui::key_value("hit rate", &format!("{:.0}%", report.hit_rate * 100.0));
            ui::key_value("writes", &report.writes.to_string());
            ui::key_value("evictions", &report.evictions.to_string());
        }
    }

    Ok(())
}

async fn clear(config: &Config, yes: bool) -> CompkitResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let store = open_cache(config).await;
    let entries = store.entry_count();

    if entries == 0 {
        ui::step_info(&ctx, "Cache is already empty");
        return Ok(());
    }

    let prompt = format!("Remove {} cached entr(y/ies)?", entries);
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Cache not cleared", "Re-run with --yes to skip the prompt");
        return Ok(());
    }

    store.clear().await;
    ui::step_ok(&ctx, &format!("Cleared {} cache entr(y/ies)", entries));
    Ok(())
}
