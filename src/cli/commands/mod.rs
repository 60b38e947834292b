pub mod check;
pub mod routes;
pub mod run;

use anyhow::Result;
use log::error;
use std::sync::Arc;

use crate::config::Config;
use crate::grid::GridRegistry;

pub use check::check_command;
pub use routes::routes_command;
pub use run::run_command;

/// Load and validate the configured grid; a bad grid is fatal
pub fn load_registry(config: &Config) -> Result<Arc<GridRegistry>> {
    let description = config.grid_description().inspect_err(|err| {
        error!("Could not load {}: {:#}", config.grid_source_name(), err);
    })?;
    let registry = GridRegistry::build(&description).inspect_err(|err| {
        error!("Invalid grid description in {}: {}", config.grid_source_name(), err);
    })?;
    Ok(Arc::new(registry))
}
