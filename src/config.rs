use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::grid::{GridDescription, DEFAULT_GRID};
use crate::screens::MarkupStore;
use crate::tui::ThemeVariant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of the slide between cells
    pub transition_ms: u64,
    /// How much longer than the slide the fallback settle timer waits
    pub settle_grace_ms: u64,
    /// Redraw interval
    pub frame_ms: u64,
    pub theme: ThemeVariant,
    /// Grid description file; the built-in grid when unset
    pub grid: Option<PathBuf>,
    /// Markup source: a directory or an http(s) base URL
    pub screens: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition_ms: 450,
            settle_grace_ms: 50,
            frame_ms: 16,
            theme: ThemeVariant::default(),
            grid: None,
            screens: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("gridwalk")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".gridwalk")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", path);

        if !path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn settle_grace(&self) -> Duration {
        Duration::from_millis(self.settle_grace_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    /// Human readable name of the grid source, for messages
    pub fn grid_source_name(&self) -> String {
        match &self.grid {
            Some(path) => path.display().to_string(),
            None => "built-in grid".to_string(),
        }
    }

    /// Read and parse the configured grid description
    ///
    /// I/O problems are reported through anyhow; a malformed description
    /// keeps its [`crate::grid::ConfigError`] so callers can report it.
    pub fn grid_description(&self) -> Result<GridDescription> {
        let source = match &self.grid {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read grid description: {:?}", path))?,
            None => DEFAULT_GRID.to_string(),
        };
        Ok(GridDescription::from_toml(&source)?)
    }

    pub fn markup_store(&self) -> Result<MarkupStore> {
        match &self.screens {
            Some(location) => MarkupStore::from_location(location)
                .with_context(|| format!("Invalid screens location: {}", location)),
            None => Ok(MarkupStore::embedded()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ConfigError;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.transition_duration(), Duration::from_millis(450));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "transition_ms = 300\ntheme = \"latte\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.transition_ms, 300);
        assert_eq!(config.theme, ThemeVariant::Latte);
        assert_eq!(config.settle_grace_ms, 50);
        assert_eq!(config.frame_ms, 16);
    }

    #[test]
    fn test_bad_grid_keeps_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cols = 0\nrows = 3").unwrap();
        let config = Config {
            grid: Some(file.path().to_path_buf()),
            ..Config::default()
        };

        // Parsing succeeds; validation happens when the registry is built
        let description = config.grid_description().unwrap();
        let err = crate::grid::GridRegistry::build(&description).unwrap_err();
        assert_eq!(err, ConfigError::EmptyGrid { cols: 0, rows: 3 });
    }

    #[test]
    fn test_unparseable_grid_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cols = \"three\"").unwrap();
        let config = Config {
            grid: Some(file.path().to_path_buf()),
            ..Config::default()
        };

        let err = config.grid_description().unwrap_err();
        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Parse(_))));
    }
}
