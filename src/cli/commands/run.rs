use anyhow::{Context, Result};
use clap::Args;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::load_registry;
use crate::config::Config;
use crate::engine::{NavigationEngine, ScreenLoader, TransitionController};
use crate::router::{MemoryHistory, Router};
use crate::screens::{CatalogResolver, ModuleCatalog};
use crate::tui::apps::{GridApp, GridParams};
use crate::tui::{Runtime, Theme};

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to open, e.g. /moving-masses
    #[arg(default_value = "/")]
    pub path: String,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self { path: "/".to_string() }
    }
}

/// Wire the engine up from config and build the runtime hosting it
pub fn build_runtime(config: &Config, path: &str) -> Result<Runtime<GridApp>> {
    let registry = load_registry(config)?;
    let resolver = CatalogResolver::new(ModuleCatalog::builtin(), config.markup_store()?);
    let router = Router::new(Arc::clone(&registry), Box::new(MemoryHistory::new(path)));
    let transitions = TransitionController::new(config.transition_duration(), config.settle_grace());

    let (engine, boot) = NavigationEngine::boot(registry, router, ScreenLoader::new(Arc::new(resolver)), transitions);
    Ok(Runtime::new(
        GridParams {
            engine,
            boot,
            frame_interval: config.frame_interval(),
        },
        Theme::new(config.theme),
    ))
}

pub async fn run_command(config: &Config, args: RunArgs) -> Result<()> {
    // Build before touching the terminal so config errors print normally
    let mut runtime = build_runtime(config, &args.path)?;
    info!("Opening grid at {}", args.path);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut runtime, config.frame_interval()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    runtime: &mut Runtime<GridApp>,
    frame_interval: Duration,
) -> Result<()> {
    let mut window_title = String::new();

    loop {
        let frame_start = Instant::now();

        // Process all pending events first for minimal input latency
        let mut keep_running = true;
        while keep_running && event::poll(Duration::ZERO)? {
            keep_running = match event::read()? {
                Event::Key(key) => runtime.handle_key(key)?,
                Event::Mouse(mouse) => runtime.handle_mouse(mouse)?,
                _ => true,
            };
        }
        if !keep_running {
            break;
        }

        // Frame tick, then async completions (loads, settle timers)
        if !runtime.poll_timers()? || !runtime.poll_async().await? {
            break;
        }

        let title = runtime.title();
        if title != window_title {
            execute!(terminal.backend_mut(), SetTitle(&title))?;
            window_title = title;
        }

        terminal.draw(|frame| runtime.render(frame))?;

        // Sleep for the remainder of the frame
        if let Some(remaining) = frame_interval.checked_sub(frame_start.elapsed()) {
            tokio::time::sleep(remaining).await;
        }
    }

    info!("Leaving grid at {}", runtime.state().engine.router().current_path());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;

    #[tokio::test]
    async fn test_build_runtime_honours_deep_link() {
        let runtime = build_runtime(&Config::default(), "/pretty-curiosity").unwrap();
        let engine = &runtime.state().engine;
        assert_eq!(engine.state().current_position, GridPos::new(2, 2));
        assert_eq!(runtime.pending(), 1);
    }

    #[tokio::test]
    async fn test_boot_load_completes_on_first_poll() {
        let mut runtime = build_runtime(&Config::default(), "/").unwrap();
        assert!(runtime.poll_async().await.unwrap());
        assert_eq!(runtime.pending(), 0);
    }
}
