use serde::{Deserialize, Serialize};
use std::fmt;

use super::registry::ConfigError;

/// Grid bundled with the binary, used when no grid file is configured
pub const DEFAULT_GRID: &str = include_str!("../../grid.toml");

/// A cell coordinate in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { col: 0, row: 0 };

    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            col: self.col + dx,
            row: self.row + dy,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.col, self.row)
    }
}

/// How a screen's content is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenKind {
    /// Compiled screen resolved from the module catalog
    #[serde(alias = "p5", alias = "module")]
    Code,

    /// Static document fragment fetched from the markup store
    #[serde(alias = "html")]
    Markup,
}

/// One occupied cell of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenEntry {
    pub col: i32,
    pub row: i32,
    #[serde(alias = "slug")]
    pub identifier: String,
    pub title: String,
    pub kind: ScreenKind,
}

impl ScreenEntry {
    pub fn position(&self) -> GridPos {
        GridPos::new(self.col, self.row)
    }
}

/// Declarative grid layout, as written in `grid.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDescription {
    pub cols: i32,
    pub rows: i32,
    #[serde(default)]
    pub screens: Vec<ScreenEntry>,
}

impl GridDescription {
    /// Parse a TOML grid description
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The description compiled into the binary
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_GRID)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.col < self.cols && pos.row >= 0 && pos.row < self.rows
    }
}
