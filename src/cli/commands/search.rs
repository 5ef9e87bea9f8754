//! Search command - list registry components

use crate::cli::args::{OutputFormat, SearchArgs};
use crate::cli::commands::open_registry;
use crate::config::Config;
use crate::error::CompkitResult;
use crate::registry::{Component, SearchFilter};
use console::style;

/// Execute the search command
pub async fn execute(args: SearchArgs, config: &Config) -> CompkitResult<()> {
    let registry = open_registry(config).await?;
    let filter = SearchFilter {
        query: args.query,
        category: args.category,
        framework: args.framework,
    };

    let results = registry.search(&filter).await?;
    registry.cache().flush_stats().await;

    match args.format {
        OutputFormat::Table => print_table(&results),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Plain => {
            for component in &results {
                println!("{}", component.name);
            }
        }
    }

    Ok(())
}

fn print_table(results: &[Component]) {
    if results.is_empty() {
        println!("No components found.");
        return;
    }

    println!(
        "{:<24} {:<10} {:<14} {}",
        "NAME", "VERSION", "CATEGORY", "DESCRIPTION"
    );
    println!("{}", "-".repeat(80));

    for component in results {
        println!(
            "{:<24} {:<10} {:<14} {}",
            component.name,
            component.version,
            component.category.as_deref().unwrap_or("-"),
            style(component.description.as_deref().unwrap_or("")).dim()
        );
    }

    println!();
    println!("Total: {} component(s)", results.len());
}
