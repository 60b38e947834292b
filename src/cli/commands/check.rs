use anyhow::Result;
use colored::*;

use super::load_registry;
use crate::config::Config;
use crate::grid::{GridRegistry, ScreenKind};

/// Validate the grid description and summarise it
pub fn check_command(config: &Config) -> Result<()> {
    let source = config.grid_source_name();

    let registry = match load_registry(config) {
        Ok(registry) => registry,
        Err(err) => {
            println!("  {} {}", "✗".bright_red().bold(), source.white());
            println!("    {}", format!("{:#}", err).bright_red());
            return Err(err);
        }
    };

    let entries = registry.entries();
    let code = entries.iter().filter(|e| e.kind == ScreenKind::Code).count();
    let markup = entries.len() - code;
    let empty = empty_cells(&registry);

    println!("  {} {}", "✓".bright_green().bold(), source.white());
    println!(
        "    {}: {}x{}",
        "Grid".dimmed(),
        registry.cols().to_string().cyan(),
        registry.rows().to_string().cyan()
    );
    println!(
        "    {}: {} ({} code, {} markup), {} empty",
        "Screens".dimmed(),
        entries.len().to_string().bright_white().bold(),
        code,
        markup,
        empty
    );
    Ok(())
}

/// Cells with no screen; dimensions are positive once the registry is built
fn empty_cells(registry: &GridRegistry) -> u64 {
    registry.cols() as u64 * registry.rows() as u64 - registry.entries().len() as u64
}
