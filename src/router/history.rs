use serde::{Deserialize, Serialize};

use crate::grid::GridPos;

/// State attached to a history entry so back/forward never re-parses paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub col: i32,
    pub row: i32,
}

impl From<GridPos> for HistoryState {
    fn from(pos: GridPos) -> Self {
        Self { col: pos.col, row: pos.row }
    }
}

impl From<HistoryState> for GridPos {
    fn from(state: HistoryState) -> Self {
        GridPos::new(state.col, state.row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    pub state: Option<HistoryState>,
}

impl HistoryEntry {
    pub fn new(path: impl Into<String>, state: Option<HistoryState>) -> Self {
        Self { path: path.into(), state }
    }
}

/// Session history of the host platform
///
/// `back` and `forward` move the cursor and return the state of the entry
/// that became current, which is the pop signal the router reacts to.
pub trait History: Send {
    fn current(&self) -> &HistoryEntry;

    fn current_path(&self) -> &str {
        &self.current().path
    }

    /// Add an entry after the current one, dropping any forward entries
    fn push(&mut self, entry: HistoryEntry);

    /// Overwrite the current entry in place
    fn replace(&mut self, entry: HistoryEntry);

    fn back(&mut self) -> Option<Option<HistoryState>>;

    fn forward(&mut self) -> Option<Option<HistoryState>>;

    fn len(&self) -> usize;
}

/// In-process history stack
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl MemoryHistory {
    /// Start a session at `path` with no associated state
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(path, None)],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.entries[self.index] = entry;
    }

    fn back(&mut self) -> Option<Option<HistoryState>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].state)
    }

    fn forward(&mut self) -> Option<Option<HistoryState>> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].state)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
