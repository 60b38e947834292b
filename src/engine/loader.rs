//! Lazy screen loading with a staleness guard.
//!
//! Loads run as [`Command::Perform`] futures. When one completes its outcome
//! comes back to the engine, which hands it to [`ScreenLoader::commit`]; the
//! commit only touches the panel if that panel is still the current one.

use std::sync::Arc;

use super::panel::{PanelContent, PanelId, Surface};
use super::NavMsg;
use crate::grid::{GridPos, ScreenEntry};
use crate::screens::{LoadError, PanelHost, ScreenResolver, ScreenSource};
use crate::tui::{Command, Resource};

/// Result of resolving one screen for one panel
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub panel: PanelId,
    pub entry: ScreenEntry,
    pub result: Result<ScreenSource, LoadError>,
}

#[derive(Clone)]
pub struct ScreenLoader {
    resolver: Arc<dyn ScreenResolver>,
}

impl ScreenLoader {
    pub fn new(resolver: Arc<dyn ScreenResolver>) -> Self {
        Self { resolver }
    }

    /// Start populating `panel` with the screen at `position`
    ///
    /// Empty cells get a placeholder immediately and need no command.
    pub fn load(
        &self,
        entry: Option<&ScreenEntry>,
        position: GridPos,
        panel: PanelId,
        surface: &mut Surface,
    ) -> Command<NavMsg> {
        let Some(target) = surface.get_mut(panel) else {
            return Command::None;
        };

        let Some(entry) = entry.cloned() else {
            target.set_content(PanelContent::Placeholder(position));
            return Command::None;
        };

        target.set_content(PanelContent::Screen {
            identifier: entry.identifier.clone(),
            state: Resource::Loading,
        });
        log::debug!("Loading {:?} ({:?}) into {}", entry.identifier, entry.kind, panel);

        let resolver = Arc::clone(&self.resolver);
        Command::perform(
            async move {
                let result = resolver.resolve(&entry).await;
                LoadOutcome { panel, entry, result }
            },
            NavMsg::ScreenLoaded,
        )
    }

    /// Mount a finished load, unless its panel is no longer current
    ///
    /// Returns whether the panel was changed.
    pub fn commit(&self, outcome: LoadOutcome, surface: &mut Surface, current: PanelId) -> bool {
        if outcome.panel != current {
            log::debug!(
                "Discarding stale load of {:?} for {} (current is {})",
                outcome.entry.identifier,
                outcome.panel,
                current
            );
            return false;
        }
        let Some(panel) = surface.get_mut(outcome.panel) else {
            return false;
        };

        let identifier = outcome.entry.identifier.clone();
        let host = PanelHost {
            panel: outcome.panel,
            position: outcome.entry.position(),
            identifier: identifier.clone(),
        };
        let mounted = outcome
            .result
            .map(|source| source.mount(&host))
            .inspect_err(|err| log::warn!("Failed to load screen {:?}: {}", identifier, err));
        let state = Resource::from_result(mounted);
        panel.set_content(PanelContent::Screen { identifier, state });
        true
    }
}
