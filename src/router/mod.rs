//! Bidirectional mapping between grid positions and paths.
//!
//! A cell occupied by a screen maps to `/<identifier>`; the origin screen and
//! empty cells map to `/`. History entries carry the position as state, so
//! back/forward resolve without parsing the path again.

pub mod history;

use std::sync::Arc;

use crate::grid::{GridPos, GridRegistry};

pub use history::{History, HistoryEntry, HistoryState, MemoryHistory};

pub const ROOT_PATH: &str = "/";

pub struct Router {
    registry: Arc<GridRegistry>,
    history: Box<dyn History>,
    default_position: GridPos,
}

impl Router {
    pub fn new(registry: Arc<GridRegistry>, history: Box<dyn History>) -> Self {
        Self {
            registry,
            history,
            default_position: GridPos::ORIGIN,
        }
    }

    pub fn default_position(&self) -> GridPos {
        self.default_position
    }

    pub fn history(&self) -> &dyn History {
        self.history.as_ref()
    }

    pub fn current_path(&self) -> &str {
        self.history.current_path()
    }

    /// Canonical path for a grid cell
    pub fn path_for(&self, pos: GridPos) -> String {
        match self.registry.lookup_by_position(pos) {
            Some(entry) if pos != self.default_position => format!("/{}", entry.identifier),
            _ => ROOT_PATH.to_string(),
        }
    }

    /// Position a path points at, falling back to the default position
    pub fn resolve_initial_position(&self, path: &str) -> GridPos {
        let identifier = path.trim_matches('/');
        if identifier.is_empty() {
            return self.default_position;
        }

        match self.registry.lookup_by_identifier(identifier) {
            Some(entry) => entry.position(),
            None => {
                log::debug!("No screen named {:?}, starting at default position", identifier);
                self.default_position
            }
        }
    }

    /// Record a navigation in history unless the path is already current
    ///
    /// Returns whether an entry was added.
    pub fn push_position(&mut self, pos: GridPos) -> bool {
        let path = self.path_for(pos);
        if path == self.history.current_path() {
            log::trace!("Path {} already current, not pushing", path);
            return false;
        }

        log::debug!("History push {} ({})", path, pos);
        self.history
            .push(HistoryEntry::new(path, Some(HistoryState::from(pos))));
        true
    }

    /// Attach state to the boot entry without adding a new one
    pub fn replace_initial_position(&mut self, pos: GridPos) {
        let path = self.path_for(pos);
        self.history
            .replace(HistoryEntry::new(path, Some(HistoryState::from(pos))));
    }

    /// Step back in history, returning the position to show
    pub fn back(&mut self) -> Option<GridPos> {
        let state = self.history.back()?;
        self.pop_target(state)
    }

    /// Step forward in history, returning the position to show
    pub fn forward(&mut self) -> Option<GridPos> {
        let state = self.history.forward()?;
        self.pop_target(state)
    }

    /// Validate the state carried by a back/forward signal
    pub fn pop_target(&self, state: Option<HistoryState>) -> Option<GridPos> {
        let pos = GridPos::from(state?);
        if self.registry.in_bounds(pos) {
            Some(pos)
        } else {
            log::warn!("Ignoring history state outside the grid: {}", pos);
            None
        }
    }
}
