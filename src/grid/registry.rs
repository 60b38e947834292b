//! Position and identifier lookup tables derived from a grid description.
//!
//! The registry is built once at startup and never mutated afterwards. A
//! position without an entry is an empty cell, not an error.

use std::collections::HashMap;
use thiserror::Error;

use super::description::{GridDescription, GridPos, ScreenEntry};

/// Malformed grid description, fatal at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid description could not be parsed: {0}")]
    Parse(String),

    #[error("grid must have at least one column and one row (got {cols}x{rows})")]
    EmptyGrid { cols: i32, rows: i32 },

    #[error("screen \"{identifier}\" at ({pos}) is outside the {cols}x{rows} grid")]
    OutOfBounds {
        identifier: String,
        pos: GridPos,
        cols: i32,
        rows: i32,
    },

    #[error("screens \"{first}\" and \"{second}\" both occupy ({pos})")]
    DuplicatePosition {
        pos: GridPos,
        first: String,
        second: String,
    },

    #[error("identifier \"{0}\" is used by more than one screen")]
    DuplicateIdentifier(String),
}

#[derive(Debug, Clone)]
pub struct GridRegistry {
    cols: i32,
    rows: i32,
    by_position: HashMap<GridPos, ScreenEntry>,
    by_identifier: HashMap<String, ScreenEntry>,
}

impl GridRegistry {
    /// Validate `description` and derive both lookup tables
    pub fn build(description: &GridDescription) -> Result<Self, ConfigError> {
        if description.cols <= 0 || description.rows <= 0 {
            return Err(ConfigError::EmptyGrid {
                cols: description.cols,
                rows: description.rows,
            });
        }

        let mut by_position: HashMap<GridPos, ScreenEntry> = HashMap::new();
        let mut by_identifier = HashMap::new();

        for entry in &description.screens {
            let pos = entry.position();
            if !description.contains(pos) {
                return Err(ConfigError::OutOfBounds {
                    identifier: entry.identifier.clone(),
                    pos,
                    cols: description.cols,
                    rows: description.rows,
                });
            }
            if let Some(existing) = by_position.get(&pos) {
                return Err(ConfigError::DuplicatePosition {
                    pos,
                    first: existing.identifier.clone(),
                    second: entry.identifier.clone(),
                });
            }
            if by_identifier.contains_key(&entry.identifier) {
                return Err(ConfigError::DuplicateIdentifier(entry.identifier.clone()));
            }

            by_position.insert(pos, entry.clone());
            by_identifier.insert(entry.identifier.clone(), entry.clone());
        }

        log::debug!(
            "Built grid registry: {}x{} with {} screens",
            description.cols,
            description.rows,
            by_position.len()
        );

        Ok(Self {
            cols: description.cols,
            rows: description.rows,
            by_position,
            by_identifier,
        })
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.col < self.cols && pos.row >= 0 && pos.row < self.rows
    }

    pub fn lookup_by_position(&self, pos: GridPos) -> Option<&ScreenEntry> {
        self.by_position.get(&pos)
    }

    pub fn lookup_by_identifier(&self, identifier: &str) -> Option<&ScreenEntry> {
        self.by_identifier.get(identifier)
    }

    /// All entries ordered row-major
    pub fn entries(&self) -> Vec<&ScreenEntry> {
        let mut entries: Vec<&ScreenEntry> = self.by_position.values().collect();
        entries.sort_by_key(|e| (e.row, e.col));
        entries
    }
}
