use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde::Serialize;
use std::sync::Arc;

use super::load_registry;
use crate::config::Config;
use crate::grid::{GridRegistry, ScreenKind};
use crate::router::{MemoryHistory, Router};

#[derive(Args, Debug, Clone, Default)]
pub struct RoutesArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub path: String,
    pub col: i32,
    pub row: i32,
    pub identifier: String,
    pub title: String,
    pub kind: ScreenKind,
}

/// Every screen with the path that leads to it, row-major
pub fn collect_routes(registry: &Arc<GridRegistry>) -> Vec<RouteInfo> {
    let router = Router::new(Arc::clone(registry), Box::new(MemoryHistory::default()));
    registry
        .entries()
        .into_iter()
        .map(|entry| RouteInfo {
            path: router.path_for(entry.position()),
            col: entry.col,
            row: entry.row,
            identifier: entry.identifier.clone(),
            title: entry.title.clone(),
            kind: entry.kind,
        })
        .collect()
}

pub fn routes_command(config: &Config, args: RoutesArgs) -> Result<()> {
    let registry = load_registry(config)?;
    let routes = collect_routes(&registry);

    if args.json {
        let json = serde_json::to_string_pretty(&routes).context("Failed to serialize routes")?;
        println!("{}", json);
        return Ok(());
    }

    let width = routes.iter().map(|r| r.path.len()).max().unwrap_or(1);
    for route in &routes {
        let kind = match route.kind {
            ScreenKind::Code => "code".bright_blue(),
            ScreenKind::Markup => "markup".bright_yellow(),
        };
        println!(
            "  {}  {}  {}  {}",
            format!("{:<width$}", route.path, width = width).cyan(),
            format!("({}, {})", route.col, route.row).dimmed(),
            route.title.bright_white(),
            kind
        );
    }
    Ok(())
}
