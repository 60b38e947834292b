use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::commands::routes::RoutesArgs;
use super::commands::run::RunArgs;
use crate::config::Config;
use crate::tui::ThemeVariant;

#[derive(Parser)]
#[command(name = "gridwalk")]
#[command(version, about = "Pan across a grid of animated terminal screens")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for values from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Grid description file (TOML)
    #[arg(long, global = true)]
    pub grid: Option<PathBuf>,

    /// Markup source: directory or http(s) base URL
    #[arg(long, global = true)]
    pub screens: Option<String>,

    /// Slide duration in milliseconds
    #[arg(long, global = true)]
    pub transition_ms: Option<u64>,

    #[arg(long, value_enum, global = true)]
    pub theme: Option<ThemeVariant>,
}

impl GlobalOptions {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(grid) = &self.grid {
            config.grid = Some(grid.clone());
        }
        if let Some(screens) = &self.screens {
            config.screens = Some(screens.clone());
        }
        if let Some(ms) = self.transition_ms {
            config.transition_ms = ms;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the grid (default)
    Run(RunArgs),
    /// Validate the grid description
    Check,
    /// List every path with its position and title
    Routes(RoutesArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run(RunArgs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["gridwalk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(Commands::default(), Commands::Run(args) if args.path == "/"));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "gridwalk",
            "run",
            "/signal-rect",
            "--transition-ms",
            "200",
            "--theme",
            "latte",
        ])
        .unwrap();

        let config = cli.options.apply(Config::default());
        assert_eq!(config.transition_ms, 200);
        assert_eq!(config.theme, ThemeVariant::Latte);
        assert_eq!(config.frame_ms, 16);
        assert!(matches!(cli.command, Some(Commands::Run(args)) if args.path == "/signal-rect"));
    }

    #[test]
    fn test_routes_json_flag() {
        let cli = Cli::try_parse_from(["gridwalk", "routes", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Routes(RoutesArgs { json: true }))));
    }
}
