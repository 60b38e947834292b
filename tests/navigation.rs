//! End-to-end navigation behaviour of the engine, driven with injected time.

use futures::FutureExt;
use ratatui::{buffer::Buffer, layout::Rect, style::Style};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use gridwalk::engine::{
    DEFAULT_DURATION, HistoryMode, NavMsg, NavigationEngine, Offset, PanelContent, ScreenLoader,
    TransitionController, TransitionStatus,
};
use gridwalk::grid::{GridDescription, GridPos, GridRegistry};
use gridwalk::router::{MemoryHistory, Router};
use gridwalk::screens::{CatalogResolver, MarkupStore, ModuleCatalog, Screen};
use gridwalk::tui::{Command, Resource, Theme};

const GRID: &str = r#"
cols = 3
rows = 3

[[screens]]
col = 0
row = 0
identifier = "landing"
title = "Landing"
kind = "markup"

[[screens]]
col = 1
row = 0
identifier = "a"
title = "Screen A"
kind = "code"

[[screens]]
col = 1
row = 1
identifier = "b"
title = "Screen B"
kind = "code"

[[screens]]
col = 0
row = 2
identifier = "broken"
title = "Broken"
kind = "code"
"#;

/// Draws its name and counts teardowns
struct Probe {
    name: &'static str,
    teardowns: Arc<AtomicUsize>,
}

impl Screen for Probe {
    fn render(&mut self, area: Rect, buf: &mut Buffer, _theme: &Theme) {
        buf.set_string(area.x, area.y, format!("probe:{}", self.name), Style::default());
    }

    fn teardown(&mut self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    engine: NavigationEngine,
    teardowns: Arc<AtomicUsize>,
}

impl Harness {
    fn boot(path: &str) -> Self {
        let registry = Arc::new(GridRegistry::build(&GridDescription::from_toml(GRID).unwrap()).unwrap());
        let teardowns = Arc::new(AtomicUsize::new(0));

        let mut modules = ModuleCatalog::new();
        for name in ["a", "b"] {
            let counter = Arc::clone(&teardowns);
            modules.register(name, move |_| {
                Box::new(Probe {
                    name,
                    teardowns: Arc::clone(&counter),
                })
            });
        }

        let loader = ScreenLoader::new(Arc::new(CatalogResolver::new(modules, MarkupStore::embedded())));
        let router = Router::new(Arc::clone(&registry), Box::new(MemoryHistory::new(path)));
        let (engine, boot) = NavigationEngine::boot(registry, router, loader, TransitionController::default());

        let mut harness = Self { engine, teardowns };
        harness.complete_loads(boot);
        harness
    }

    /// Run every load in `command` to completion; timers are polled once and
    /// dropped, which needs a tokio runtime
    fn complete_loads(&mut self, command: Command<NavMsg>) {
        for future in command.into_futures() {
            if let Some(msg @ NavMsg::ScreenLoaded(_)) = future.now_or_never() {
                let _ = self.engine.update(msg);
            }
        }
    }

    fn go(&mut self, col: i32, row: i32, now: Instant) {
        let command = self.engine.navigate(GridPos::new(col, row), HistoryMode::Push, now);
        self.complete_loads(command);
    }

    /// Navigate and let the slide finish
    fn go_settled(&mut self, col: i32, row: i32, now: Instant) {
        self.go(col, row, now);
        self.engine.tick(now + DEFAULT_DURATION);
    }

    fn history_len(&self) -> usize {
        self.engine.router().history().len()
    }

    fn current_content(&self) -> &PanelContent {
        self.engine
            .surface()
            .get(self.engine.state().current_panel)
            .unwrap()
            .content()
    }

    fn text(&mut self, now: Instant) -> String {
        let area = Rect::new(0, 0, 40, 9);
        let mut buf = Buffer::empty(area);
        self.engine.render(area, &mut buf, &Theme::default(), now);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[tokio::test]
async fn test_settled_navigation_leaves_one_panel_at_target() {
    for row in 0..3 {
        for col in 0..3 {
            if (col, row) == (0, 0) {
                continue;
            }
            let now = Instant::now();
            let mut harness = Harness::boot("/");
            harness.go_settled(col, row, now);

            let state = harness.engine.state();
            assert_eq!(state.current_position, GridPos::new(col, row));
            assert_eq!(state.transition_status, TransitionStatus::Idle);
            assert_eq!(harness.engine.surface().len(), 1);
            let only = harness.engine.surface().iter().next().unwrap();
            assert_eq!(only.id(), state.current_panel);
            assert_eq!(only.position(), GridPos::new(col, row));
        }
    }
}

#[tokio::test]
async fn test_requests_during_transition_are_dropped() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");
    harness.go(1, 0, now);

    let state = *harness.engine.state();
    let history = harness.history_len();
    for (col, row) in [(0, 0), (2, 0), (1, 1), (2, 2), (0, 1)] {
        harness.go(col, row, now);
    }
    let _ = harness.engine.back(now);
    let _ = harness.engine.forward(now);

    assert_eq!(*harness.engine.state(), state);
    assert_eq!(harness.history_len(), history);
    assert_eq!(harness.engine.surface().len(), 2);
}

#[tokio::test]
async fn test_navigating_to_current_cell_is_a_no_op() {
    let now = Instant::now();
    let mut harness = Harness::boot("/a");
    let state = *harness.engine.state();
    let history = harness.history_len();

    let command = harness.engine.navigate(GridPos::new(1, 0), HistoryMode::Push, now);

    assert!(command.is_none());
    assert_eq!(*harness.engine.state(), state);
    assert_eq!(harness.history_len(), history);
    assert_eq!(harness.engine.surface().len(), 1);
}

#[tokio::test]
async fn test_navigating_outside_the_grid_is_a_no_op() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");
    let state = *harness.engine.state();

    for (col, row) in [(-1, 0), (0, -1), (3, 0), (0, 3), (7, 7)] {
        assert!(harness.engine.navigate(GridPos::new(col, row), HistoryMode::Push, now).is_none());
    }
    assert_eq!(*harness.engine.state(), state);
    assert_eq!(harness.history_len(), 1);
    assert_eq!(harness.engine.surface().len(), 1);
}

#[tokio::test]
async fn test_every_entry_round_trips_through_its_path() {
    let harness = Harness::boot("/");
    let router = harness.engine.router();
    for entry in harness.engine.registry().entries() {
        let path = router.path_for(entry.position());
        assert_eq!(router.resolve_initial_position(&path), entry.position(), "via {}", path);
    }
}

#[tokio::test]
async fn test_stale_load_never_reaches_the_new_panel() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");

    // Start A, but hold its load back
    let slow = harness.engine.navigate(GridPos::new(1, 0), HistoryMode::Push, now);
    let panel_a = harness.engine.state().current_panel;
    harness.engine.tick(now + DEFAULT_DURATION);

    // B starts before A's load resolves
    let later = now + DEFAULT_DURATION;
    harness.go(1, 1, later);
    let panel_b = harness.engine.state().current_panel;
    assert_ne!(panel_a, panel_b);

    // Now A's load resolves
    harness.complete_loads(slow);

    let content = harness.current_content();
    assert_eq!(content.identifier(), Some("b"));
    assert!(matches!(content, PanelContent::Screen { state: Resource::Success(_), .. }));

    harness.engine.tick(later + DEFAULT_DURATION);
    let text = harness.text(later + DEFAULT_DURATION);
    assert!(text.contains("probe:b"));
    assert!(!text.contains("probe:a"));
}

#[tokio::test]
async fn test_settle_is_idempotent() {
    let now = Instant::now();
    let mut harness = Harness::boot("/a");
    harness.go(1, 1, now);

    let token = harness.engine.active_settle_token().unwrap();
    assert!(harness.engine.settle(&token));
    // The fallback timer fires afterwards
    let _ = harness.engine.update(NavMsg::SettleTimeout(token.clone()));
    assert!(!harness.engine.settle(&token));
    harness.engine.tick(now + DEFAULT_DURATION);

    assert_eq!(harness.engine.state().transition_status, TransitionStatus::Idle);
    assert_eq!(harness.engine.surface().len(), 1);
    assert_eq!(harness.teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_timer_settles_a_stuck_transition() {
    let mut harness = Harness::boot("/");
    let command = harness
        .engine
        .navigate(GridPos::new(1, 0), HistoryMode::Push, Instant::now());

    // No frame ticks at all; only the timer can settle
    for future in command.into_futures() {
        let msg = future.await;
        let _ = harness.engine.update(msg);
    }

    assert_eq!(harness.engine.state().transition_status, TransitionStatus::Idle);
    assert_eq!(harness.engine.surface().len(), 1);
}

#[tokio::test]
async fn test_three_by_three_scenario() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");
    assert_eq!(harness.engine.router().current_path(), "/");

    harness.go(1, 0, now);
    assert_eq!(harness.engine.router().current_path(), "/a");
    assert_eq!(harness.engine.presentation().title.as_deref(), Some("Screen A"));
    assert_eq!(harness.engine.presentation().label, "1, 0 \u{2014} Screen A");

    // Slides in from the right
    let incoming = harness
        .engine
        .surface()
        .get(harness.engine.state().current_panel)
        .unwrap();
    assert_eq!(incoming.offset_at(now), Offset::new(1.0, 0.0));
    assert_eq!(incoming.offset_at(now + DEFAULT_DURATION), Offset::ZERO);
    harness.engine.tick(now + DEFAULT_DURATION);

    let later = now + DEFAULT_DURATION;
    harness.go_settled(2, 0, later);
    assert_eq!(harness.engine.router().current_path(), "/");
    assert!(matches!(
        harness.current_content(),
        PanelContent::Placeholder(pos) if *pos == GridPos::new(2, 0)
    ));
    assert!(harness.text(later + DEFAULT_DURATION).contains("(2, 0)"));
    assert_eq!(harness.engine.presentation().title, None);
}

#[tokio::test]
async fn test_back_and_forward_replay_without_pushing() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");
    harness.go_settled(1, 0, now);
    harness.go_settled(1, 1, now + DEFAULT_DURATION);
    assert_eq!(harness.history_len(), 3);

    let t = now + DEFAULT_DURATION * 2;
    let command = harness.engine.back(t);
    harness.complete_loads(command);
    harness.engine.tick(t + DEFAULT_DURATION);
    assert_eq!(harness.engine.state().current_position, GridPos::new(1, 0));
    assert_eq!(harness.engine.router().current_path(), "/a");

    let t = t + DEFAULT_DURATION;
    let command = harness.engine.forward(t);
    harness.complete_loads(command);
    harness.engine.tick(t + DEFAULT_DURATION);
    assert_eq!(harness.engine.state().current_position, GridPos::new(1, 1));
    assert_eq!(harness.engine.router().current_path(), "/b");
    assert_eq!(harness.history_len(), 3);
}

#[tokio::test]
async fn test_load_failure_is_contained_in_the_panel() {
    let now = Instant::now();
    let mut harness = Harness::boot("/");
    harness.go(0, 2, now);

    // The transition is unaffected by the failed load
    assert_eq!(harness.engine.state().transition_status, TransitionStatus::Transitioning);
    harness.engine.tick(now + DEFAULT_DURATION);
    assert_eq!(harness.engine.state().transition_status, TransitionStatus::Idle);

    assert!(matches!(
        harness.current_content(),
        PanelContent::Screen { state: Resource::Failure(_), .. }
    ));
    let text = harness.text(now + DEFAULT_DURATION);
    assert!(text.contains("Failed to load \"broken\""));
}

#[tokio::test]
async fn test_dropping_the_engine_tears_down_the_current_screen() {
    let harness = Harness::boot("/a");
    let Harness { engine, teardowns } = harness;
    assert_eq!(teardowns.load(Ordering::SeqCst), 0);

    drop(engine);
    assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shutdown_mid_transition_tears_down_both_panels() {
    let now = Instant::now();
    let mut harness = Harness::boot("/a");
    harness.go(1, 1, now);
    assert_eq!(harness.engine.surface().len(), 2);

    harness.engine.shutdown();
    assert!(harness.engine.surface().is_empty());
    assert_eq!(harness.engine.state().transition_status, TransitionStatus::Idle);
    assert_eq!(harness.teardowns.load(Ordering::SeqCst), 2);

    // Nothing left to tear down a second time
    harness.engine.shutdown();
    assert_eq!(harness.teardowns.load(Ordering::SeqCst), 2);
}
