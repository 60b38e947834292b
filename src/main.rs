use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use gridwalk::cli::commands::{check_command, routes_command, run_command};
use gridwalk::cli::{Cli, Commands};
use gridwalk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run); the terminal belongs to the TUI
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("gridwalk.log")
        .context("Failed to open gridwalk.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting gridwalk");

    let config = cli.options.apply(Config::load()?);

    match cli.command.unwrap_or_default() {
        Commands::Run(args) => run_command(&config, args).await,
        Commands::Check => check_command(&config),
        Commands::Routes(args) => routes_command(&config, args),
    }
}
