//! The app hosting the navigation engine, and its input adapters.
//!
//! Arrow keys and the four directional triggers step the grid, `Alt+←`/`Alt+→`
//! (or `[`/`]`) walk the history. While the current screen captures input the
//! arrow bindings are withdrawn and the keys reach the screen instead.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

use crate::engine::{Direction, NavMsg, NavigationEngine};
use crate::grid::GridPos;
use crate::tui::subscription::KeyBinding;
use crate::tui::{App, Command, InteractionRegistry, Subscription, Theme};

pub const APP_TITLE: &str = "gridwalk";

pub struct GridApp;

pub struct GridParams {
    pub engine: NavigationEngine,
    pub boot: Command<NavMsg>,
    pub frame_interval: Duration,
}

pub struct GridState {
    pub engine: NavigationEngine,
    frame_interval: Duration,
}

#[derive(Debug, Clone)]
pub enum Msg {
    Step(Direction),
    Back,
    Forward,
    Nav(NavMsg),
    ScreenKey(KeyEvent),
    Frame,
    Quit,
}

impl App for GridApp {
    type State = GridState;
    type Msg = Msg;
    type Params = GridParams;

    fn init(params: GridParams) -> (GridState, Command<Msg>) {
        let state = GridState {
            engine: params.engine,
            frame_interval: params.frame_interval,
        };
        (state, params.boot.map(Msg::Nav))
    }

    fn update(state: &mut GridState, msg: Msg) -> Command<Msg> {
        let now = Instant::now();
        match msg {
            Msg::Step(direction) => state.engine.step(direction, now).map(Msg::Nav),
            Msg::Back => state.engine.back(now).map(Msg::Nav),
            Msg::Forward => state.engine.forward(now).map(Msg::Nav),
            Msg::Nav(nav) => state.engine.update(nav).map(Msg::Nav),
            Msg::ScreenKey(key) => {
                if !state.engine.handle_screen_key(key) {
                    log::trace!("Unhandled key {:?}", key.code);
                }
                Command::None
            }
            Msg::Frame => {
                state.engine.tick(now);
                Command::None
            }
            Msg::Quit => Command::Quit,
        }
    }

    fn view(state: &mut GridState, frame: &mut Frame, theme: &Theme, registry: &mut InteractionRegistry<Msg>) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        render_header(state, frame, header, theme);
        state
            .engine
            .render(body, frame.buffer_mut(), theme, Instant::now());
        render_minimap(state, frame, body, theme);
        render_footer(state, frame, footer, theme, registry);
    }

    fn subscriptions(state: &GridState) -> Vec<Subscription<Msg>> {
        let mut subs = Vec::new();

        if !state.engine.captures_input() {
            subs.push(Subscription::keyboard(KeyCode::Left, "Move left", Msg::Step(Direction::Left)));
            subs.push(Subscription::keyboard(KeyCode::Right, "Move right", Msg::Step(Direction::Right)));
            subs.push(Subscription::keyboard(KeyCode::Up, "Move up", Msg::Step(Direction::Up)));
            subs.push(Subscription::keyboard(KeyCode::Down, "Move down", Msg::Step(Direction::Down)));
        }

        subs.push(Subscription::alt_key(KeyCode::Left, "Back", Msg::Back));
        subs.push(Subscription::alt_key(KeyCode::Right, "Forward", Msg::Forward));
        subs.push(Subscription::keyboard(KeyCode::Char('['), "Back", Msg::Back));
        subs.push(Subscription::keyboard(KeyCode::Char(']'), "Forward", Msg::Forward));
        subs.push(Subscription::keyboard(KeyCode::Char('q'), "Quit", Msg::Quit));
        subs.push(Subscription::keyboard(KeyBinding::ctrl(KeyCode::Char('c')), "Quit", Msg::Quit));

        subs.push(Subscription::timer(state.frame_interval, Msg::Frame));
        subs
    }

    fn title(state: &GridState) -> String {
        match &state.engine.presentation().title {
            Some(title) => format!("{} \u{2014} {}", title, APP_TITLE),
            None => APP_TITLE.to_string(),
        }
    }

    fn on_key(_state: &GridState, key: KeyEvent) -> Option<Msg> {
        Some(Msg::ScreenKey(key))
    }
}

fn render_header(state: &GridState, frame: &mut Frame, area: Rect, theme: &Theme) {
    let presentation = state.engine.presentation();
    let accent = theme.accent_for(presentation.active_cell.col, presentation.active_cell.row);
    let [left, right] = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {} ", APP_TITLE), Style::default().fg(theme.base).bg(accent).bold()),
            Span::raw(" "),
            Span::styled(presentation.label.clone(), Style::default().fg(accent)),
        ])),
        left,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("{} ", state.engine.router().current_path()),
            Style::default().fg(theme.overlay1),
        ))
        .right_aligned(),
        right,
    );
}

/// Cols x rows indicator in the bottom right corner of the body
fn render_minimap(state: &GridState, frame: &mut Frame, body: Rect, theme: &Theme) {
    let registry = state.engine.registry();
    let active = state.engine.presentation().active_cell;
    let accent = theme.accent_for(active.col, active.row);

    let width = u16::try_from(registry.cols())
        .ok()
        .and_then(|cols| cols.checked_mul(2)?.checked_add(1));
    let height = u16::try_from(registry.rows()).ok().and_then(|rows| rows.checked_add(2));
    let (Some(width), Some(height)) = (width, height) else {
        return;
    };
    if body.width < width.saturating_add(2) || body.height < height.saturating_add(1) {
        return;
    }
    let area = Rect::new(body.right() - width - 1, body.bottom() - height, width, height);

    let lines: Vec<Line> = (0..registry.rows())
        .map(|row| {
            let cells: Vec<Span> = (0..registry.cols())
                .map(|col| {
                    let pos = GridPos::new(col, row);
                    if pos == active {
                        Span::styled("\u{25a0}", Style::default().fg(accent))
                    } else if registry.lookup_by_position(pos).is_some() {
                        Span::styled("\u{25cf}", Style::default().fg(theme.overlay2))
                    } else {
                        Span::styled("\u{00b7}", Style::default().fg(theme.surface2))
                    }
                })
                .flat_map(|cell| [cell, Span::raw(" ")])
                .collect();
            Line::from(cells)
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(theme.surface1)),
        ),
        area,
    );
}

fn render_footer(
    state: &GridState,
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    registry: &mut InteractionRegistry<Msg>,
) {
    let mut x = area.x + 1;
    let mut spans = vec![Span::raw(" ")];

    for direction in [Direction::Left, Direction::Up, Direction::Down, Direction::Right] {
        let text = format!("[{} {}]", arrow(direction), direction.label());
        let width = text.chars().count() as u16;
        let enabled = state.engine.can_move(direction);

        let style = if enabled {
            Style::default().fg(theme.text)
        } else {
            Style::default().fg(theme.surface2).add_modifier(Modifier::DIM)
        };
        if enabled {
            registry.register_click(Rect::new(x, area.y, width, 1), Msg::Step(direction));
        }
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
        x += width + 1;
    }

    let hint = format!(
        "  {}/{} history  {} quit",
        KeyBinding::alt(KeyCode::Left).label(),
        KeyBinding::alt(KeyCode::Right).label(),
        KeyBinding::new(KeyCode::Char('q')).label(),
    );
    spans.push(Span::styled(hint, Style::default().fg(theme.overlay0)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "\u{2190}",
        Direction::Right => "\u{2192}",
        Direction::Up => "\u{2191}",
        Direction::Down => "\u{2193}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ScreenLoader, TransitionController};
    use crate::grid::{GridDescription, GridRegistry};
    use crate::router::{MemoryHistory, Router};
    use crate::screens::{CatalogResolver, MarkupStore, ModuleCatalog};
    use crate::tui::Runtime;
    use crate::engine::NavMsg;
    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind, MouseButton};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn runtime(path: &str) -> Runtime<GridApp> {
        runtime_for(&GridDescription::bundled().unwrap(), path)
    }

    fn runtime_for(description: &GridDescription, path: &str) -> Runtime<GridApp> {
        let registry = Arc::new(GridRegistry::build(description).unwrap());
        let router = Router::new(Arc::clone(&registry), Box::new(MemoryHistory::new(path)));
        let loader = ScreenLoader::new(Arc::new(CatalogResolver::new(
            ModuleCatalog::builtin(),
            MarkupStore::embedded(),
        )));
        let (engine, boot) = NavigationEngine::boot(registry, router, loader, TransitionController::default());
        Runtime::new(
            GridParams {
                engine,
                boot,
                frame_interval: Duration::from_millis(16),
            },
            Theme::default(),
        )
    }

    #[test]
    fn test_arrow_key_navigates() {
        let mut runtime = runtime("/");
        assert!(runtime.handle_key(KeyEvent::from(KeyCode::Right)).unwrap());

        let engine = &runtime.state().engine;
        assert_eq!(engine.state().current_position, GridPos::new(1, 0));
        assert_eq!(engine.router().current_path(), "/moving-masses");
    }

    #[test]
    fn test_quit_keys() {
        let mut plain = runtime("/");
        assert!(!plain.handle_key(KeyEvent::from(KeyCode::Char('q'))).unwrap());

        let mut ctrl = runtime("/");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!ctrl.handle_key(ctrl_c).unwrap());
    }

    #[test]
    fn test_title_follows_screen() {
        let runtime = runtime("/moving-masses");
        assert!(runtime.title().starts_with("Moving Masses"));
    }

    #[test]
    fn test_footer_triggers_are_clickable_when_enabled() {
        let mut runtime = runtime("/");
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| runtime.render(frame)).unwrap();

        // Left is the first trigger and is disabled at the origin
        let left = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 19,
            modifiers: KeyModifiers::NONE,
        };
        runtime.handle_mouse(left).unwrap();
        assert_eq!(runtime.state().engine.state().current_position, GridPos::ORIGIN);

        let footer: String = (0..80u16)
            .map(|x| terminal.backend().buffer()[(x, 19)].symbol().to_string())
            .collect();
        let down_col = footer.find("[\u{2193} Down]").map(|byte| footer[..byte].chars().count() as u16).unwrap();
        let down = MouseEvent { column: down_col + 1, ..left };
        runtime.handle_mouse(down).unwrap();
        assert_eq!(runtime.state().engine.state().current_position, GridPos::new(0, 1));
    }

    #[test]
    fn test_header_shows_label_and_path() {
        let mut runtime = runtime("/");
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| runtime.render(frame)).unwrap();

        let header: String = (0..80u16)
            .map(|x| terminal.backend().buffer()[(x, 0)].symbol().to_string())
            .collect();
        assert!(header.contains("0, 0 \u{2014} Welcome"));
        assert!(header.trim_end().ends_with('/'));
    }

    /// Finish the running slide the way the fallback timer would
    fn settle(runtime: &mut Runtime<GridApp>) {
        let token = runtime.state().engine.active_settle_token().unwrap();
        assert!(runtime.dispatch(Msg::Nav(NavMsg::SettleTimeout(token))));
    }

    fn press(runtime: &mut Runtime<GridApp>, key: KeyEvent) {
        assert!(runtime.handle_key(key).unwrap());
    }

    #[tokio::test]
    async fn test_arrows_reach_screen_while_it_captures_input() {
        let mut runtime = runtime("/signal-rect");
        assert!(runtime.poll_async().await.unwrap());
        assert!(!runtime.state().engine.captures_input());

        // Enter hands the arrows to the screen
        press(&mut runtime, KeyEvent::from(KeyCode::Enter));
        assert!(runtime.state().engine.captures_input());
        press(&mut runtime, KeyEvent::from(KeyCode::Right));
        assert_eq!(runtime.state().engine.state().current_position, GridPos::new(0, 1));

        // and Enter again gives them back
        press(&mut runtime, KeyEvent::from(KeyCode::Enter));
        press(&mut runtime, KeyEvent::from(KeyCode::Right));
        assert_eq!(runtime.state().engine.state().current_position, GridPos::new(1, 1));
    }

    #[test]
    fn test_history_keys_walk_back_and_forward() {
        let alt_left = KeyEvent::new(KeyCode::Left, KeyModifiers::ALT);
        let alt_right = KeyEvent::new(KeyCode::Right, KeyModifiers::ALT);
        let mut runtime = runtime("/");

        press(&mut runtime, KeyEvent::from(KeyCode::Right));
        settle(&mut runtime);
        assert_eq!(runtime.state().engine.router().current_path(), "/moving-masses");

        press(&mut runtime, alt_left);
        assert_eq!(runtime.state().engine.state().current_position, GridPos::ORIGIN);
        settle(&mut runtime);
        assert_eq!(runtime.state().engine.router().current_path(), "/");

        press(&mut runtime, alt_right);
        assert_eq!(runtime.state().engine.state().current_position, GridPos::new(1, 0));
        settle(&mut runtime);

        press(&mut runtime, KeyEvent::from(KeyCode::Char('[')));
        assert_eq!(runtime.state().engine.state().current_position, GridPos::ORIGIN);
        settle(&mut runtime);

        press(&mut runtime, KeyEvent::from(KeyCode::Char(']')));
        assert_eq!(runtime.state().engine.state().current_position, GridPos::new(1, 0));
        assert_eq!(runtime.state().engine.router().current_path(), "/moving-masses");
        assert_eq!(runtime.state().engine.router().history().len(), 2);
    }

    #[test]
    fn test_grid_too_wide_for_minimap_still_draws() {
        let description = GridDescription {
            cols: 40_000,
            rows: 2,
            screens: Vec::new(),
        };
        let mut runtime = runtime_for(&description, "/");
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| runtime.render(frame)).unwrap();

        let screen: String = (0..20u16)
            .flat_map(|y| (0..80u16).map(move |x| (x, y)))
            .map(|cell| terminal.backend().buffer()[cell].symbol().to_string())
            .collect();
        assert!(screen.contains("(0, 0)"));
    }
}
