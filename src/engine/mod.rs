//! The navigation engine: current position, single-flight transitions and
//! the sequencing of registry lookup, history, panel hand-off and loading.
//!
//! ```text
//! Idle --navigate--> Transitioning --settle--> Idle
//! ```
//!
//! Requests made while `Transitioning` are dropped, not queued. The engine
//! never awaits anything itself; asynchronous work leaves as a [`Command`]
//! and comes back as a [`NavMsg`].

pub mod loader;
pub mod panel;
pub mod transition;

use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};
use std::sync::Arc;
use std::time::Instant;

use crate::grid::{GridPos, GridRegistry};
use crate::router::Router;
use crate::tui::{Command, Theme};

pub use loader::{LoadOutcome, ScreenLoader};
pub use panel::{Offset, Panel, PanelContent, PanelId, Surface};
pub use transition::{
    Direction, SettleToken, TransitionController, TransitionPhase, DEFAULT_DURATION, DEFAULT_SETTLE_GRACE,
};

/// Asynchronous completions routed back into the engine
#[derive(Debug, Clone)]
pub enum NavMsg {
    ScreenLoaded(LoadOutcome),
    SettleTimeout(SettleToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Idle,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    pub current_position: GridPos,
    pub current_panel: PanelId,
    pub transition_status: TransitionStatus,
}

/// Whether a navigation records a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    /// Used when replaying back/forward, which already moved the history
    Suppress,
}

/// Everything on screen that depends only on the current position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub active_cell: GridPos,
    pub title: Option<String>,
    pub label: String,
}

impl Presentation {
    fn for_position(registry: &GridRegistry, pos: GridPos) -> Self {
        match registry.lookup_by_position(pos) {
            Some(entry) => Self {
                active_cell: pos,
                title: Some(entry.title.clone()),
                label: format!("{} \u{2014} {}", pos, entry.title),
            },
            None => Self {
                active_cell: pos,
                title: None,
                label: format!("{} \u{2014} empty", pos),
            },
        }
    }
}

pub struct NavigationEngine {
    registry: Arc<GridRegistry>,
    router: Router,
    loader: ScreenLoader,
    transitions: TransitionController,
    surface: Surface,
    state: NavigationState,
    presentation: Presentation,
}

impl NavigationEngine {
    /// Resolve the router's current path, claim the boot history entry and
    /// start loading the first panel
    pub fn boot(
        registry: Arc<GridRegistry>,
        mut router: Router,
        loader: ScreenLoader,
        transitions: TransitionController,
    ) -> (Self, Command<NavMsg>) {
        let initial_path = router.current_path().to_string();
        let position = router.resolve_initial_position(&initial_path);
        router.replace_initial_position(position);

        let mut surface = Surface::new();
        let panel = surface.create(position, Offset::ZERO);
        let command = loader.load(registry.lookup_by_position(position), position, panel, &mut surface);
        log::info!(
            "Booted at ({}) from {:?}, path is now {}",
            position,
            initial_path,
            router.current_path()
        );

        let engine = Self {
            presentation: Presentation::for_position(&registry, position),
            state: NavigationState {
                current_position: position,
                current_panel: panel,
                transition_status: TransitionStatus::Idle,
            },
            registry,
            router,
            loader,
            transitions,
            surface,
        };
        (engine, command)
    }

    /// Move to `target`; silently does nothing if the move is not allowed
    pub fn navigate(&mut self, target: GridPos, mode: HistoryMode, now: Instant) -> Command<NavMsg> {
        if !self.registry.in_bounds(target) {
            log::trace!("Rejected navigation to ({}): outside the grid", target);
            return Command::None;
        }
        if self.state.transition_status == TransitionStatus::Transitioning {
            log::debug!("Rejected navigation to ({}): transition in progress", target);
            return Command::None;
        }
        let Some(direction) = Direction::between(self.state.current_position, target) else {
            log::trace!("Rejected navigation to ({}): already there", target);
            return Command::None;
        };

        // Claimed before anything else so a re-entrant request sees it.
        self.state.transition_status = TransitionStatus::Transitioning;

        let incoming = self
            .transitions
            .begin(&mut self.surface, self.state.current_panel, direction, target);
        log::debug!(
            "Navigating ({}) -> ({}) moving {}",
            self.state.current_position,
            target,
            direction.label()
        );
        self.state.current_position = target;
        self.state.current_panel = incoming;
        self.presentation = Presentation::for_position(&self.registry, target);

        if mode == HistoryMode::Push {
            self.router.push_position(target);
        }

        let load = self
            .loader
            .load(self.registry.lookup_by_position(target), target, incoming, &mut self.surface);
        self.transitions.animate(&mut self.surface, now);

        Command::batch(vec![load, self.arm_settle_timeout()])
    }

    /// Fallback settle in case the finished signal never arrives
    fn arm_settle_timeout(&self) -> Command<NavMsg> {
        let Some(token) = self.transitions.active_token() else {
            return Command::None;
        };
        let timeout = self.transitions.settle_timeout();
        Command::perform(
            async move { tokio::time::sleep(timeout).await },
            move |_| NavMsg::SettleTimeout(token.clone()),
        )
    }

    /// Move one cell in `direction`
    pub fn step(&mut self, direction: Direction, now: Instant) -> Command<NavMsg> {
        let (dx, dy) = direction.delta();
        let target = self.state.current_position.offset(dx, dy);
        self.navigate(target, HistoryMode::Push, now)
    }

    pub fn back(&mut self, now: Instant) -> Command<NavMsg> {
        if self.is_transitioning() {
            log::debug!("Ignoring back during transition");
            return Command::None;
        }
        match self.router.back() {
            Some(target) => self.navigate(target, HistoryMode::Suppress, now),
            None => Command::None,
        }
    }

    pub fn forward(&mut self, now: Instant) -> Command<NavMsg> {
        if self.is_transitioning() {
            log::debug!("Ignoring forward during transition");
            return Command::None;
        }
        match self.router.forward() {
            Some(target) => self.navigate(target, HistoryMode::Suppress, now),
            None => Command::None,
        }
    }

    pub fn update(&mut self, msg: NavMsg) -> Command<NavMsg> {
        match msg {
            NavMsg::ScreenLoaded(outcome) => {
                self.loader
                    .commit(outcome, &mut self.surface, self.state.current_panel);
            }
            NavMsg::SettleTimeout(token) => {
                if self.settle(&token) {
                    log::debug!("Transition {} settled by fallback timer", token.id());
                }
            }
        }
        Command::None
    }

    /// Per-frame work: the finished signal and screen animation
    pub fn tick(&mut self, now: Instant) {
        if let Some(token) = self.transitions.poll_finished(&self.surface, now) {
            self.settle(&token);
        }
        for panel in self.surface.iter_mut() {
            if let Some(mounted) = panel.screen_mut() {
                mounted.screen_mut().tick(now);
            }
        }
    }

    /// Finalise the active transition; any number of calls, one effect
    pub fn settle(&mut self, token: &SettleToken) -> bool {
        if !self.transitions.settle(&mut self.surface, token) {
            return false;
        }
        self.state.transition_status = TransitionStatus::Idle;
        true
    }

    pub fn can_move(&self, direction: Direction) -> bool {
        let (dx, dy) = direction.delta();
        self.registry
            .in_bounds(self.state.current_position.offset(dx, dy))
    }

    pub fn available_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.can_move(*d))
            .collect()
    }

    /// True while the current screen wants the arrow keys
    pub fn captures_input(&self) -> bool {
        self.surface
            .get(self.state.current_panel)
            .and_then(|panel| match panel.content() {
                PanelContent::Screen { state, .. } => state.as_ref().ok(),
                _ => None,
            })
            .is_some_and(|mounted| mounted.screen().captures_input())
    }

    /// Offer a key to the current screen; returns whether it was consumed
    pub fn handle_screen_key(&mut self, key: KeyEvent) -> bool {
        self.surface
            .get_mut(self.state.current_panel)
            .and_then(Panel::screen_mut)
            .is_some_and(|mounted| mounted.screen_mut().handle_key(key))
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        self.surface.render(area, buf, theme, now);
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.transition_status == TransitionStatus::Transitioning
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn registry(&self) -> &GridRegistry {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.transitions.phase()
    }

    pub fn active_settle_token(&self) -> Option<SettleToken> {
        self.transitions.active_token()
    }

    /// Tear down every remaining panel, the current one included
    pub fn shutdown(&mut self) {
        if let Some(token) = self.transitions.active_token() {
            self.settle(&token);
        }
        let destroyed = self.surface.clear();
        if destroyed > 0 {
            log::debug!("Shut down {} panel(s) at ({})", destroyed, self.state.current_position);
        }
    }
}

impl Drop for NavigationEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
