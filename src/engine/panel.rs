//! Panels and the surface that hosts them.
//!
//! A panel is drawn into its own buffer and blitted into the frame shifted by
//! its slide offset, so a panel half way off-screen is simply clipped.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use std::fmt;
use std::time::{Duration, Instant};

use crate::grid::GridPos;
use crate::screens::{LoadError, MountedScreen};
use crate::tui::{Resource, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

impl PanelId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// Translation as a fraction of the panel size; (1, 0) is one full width right
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn lerp(self, to: Offset, t: f32) -> Offset {
        Offset {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    /// Whole-cell shift inside an area of the given size
    fn cells(self, area: Rect) -> (i32, i32) {
        (
            (self.x * area.width as f32).round() as i32,
            (self.y * area.height as f32).round() as i32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Slide {
    from: Offset,
    to: Offset,
    started_at: Instant,
    duration: Duration,
}

impl Slide {
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    fn offset_at(&self, now: Instant) -> Offset {
        self.from.lerp(self.to, ease(self.progress(now)))
    }
}

/// Cubic ease-in-out
fn ease(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// What a panel is showing
#[derive(Debug)]
pub enum PanelContent {
    /// Nothing loaded yet
    Blank,

    /// Empty grid cell
    Placeholder(GridPos),

    /// A registry screen, loading or loaded
    Screen {
        identifier: String,
        state: Resource<MountedScreen, LoadError>,
    },
}

impl PanelContent {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            PanelContent::Screen { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Panel {
    id: PanelId,
    position: GridPos,
    /// Offset as last requested
    target: Offset,
    /// Offset as last laid out; slides start from here
    laid_out: Offset,
    slide: Option<Slide>,
    content: PanelContent,
}

impl Panel {
    fn new(id: PanelId, position: GridPos, offset: Offset) -> Self {
        Self {
            id,
            position,
            target: offset,
            laid_out: Offset::ZERO,
            slide: None,
            content: PanelContent::Blank,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn content(&self) -> &PanelContent {
        &self.content
    }

    pub fn set_content(&mut self, content: PanelContent) {
        self.content = content;
    }

    /// The mounted screen, once loading has succeeded
    pub fn screen_mut(&mut self) -> Option<&mut MountedScreen> {
        match &mut self.content {
            PanelContent::Screen { state, .. } => state.success_mut(),
            _ => None,
        }
    }

    /// Jump to `offset` with no animation
    pub fn place(&mut self, offset: Offset) {
        self.slide = None;
        self.target = offset;
    }

    /// Commit the requested offset as the current layout and return it
    pub fn flush_layout(&mut self, now: Instant) -> Offset {
        self.laid_out = match &self.slide {
            Some(slide) => slide.offset_at(now),
            None => self.target,
        };
        self.laid_out
    }

    /// Animate from the last laid out offset to `to`
    pub fn slide_to(&mut self, to: Offset, now: Instant, duration: Duration) {
        self.slide = Some(Slide {
            from: self.laid_out,
            to,
            started_at: now,
            duration,
        });
        self.target = to;
    }

    pub fn offset_at(&self, now: Instant) -> Offset {
        match &self.slide {
            Some(slide) => slide.offset_at(now),
            None => self.target,
        }
    }

    pub fn slide_finished(&self, now: Instant) -> bool {
        self.slide.map_or(true, |slide| slide.progress(now) >= 1.0)
    }

    /// Destroy the panel, tearing down any mounted screen
    pub fn destroy(self) {
        log::trace!("Destroying {}", self.id);
        if let PanelContent::Screen { state: Resource::Success(mounted), .. } = self.content {
            mounted.unmount();
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        let offset = self.flush_layout(now);
        let (dx, dy) = offset.cells(area);
        if dx.unsigned_abs() >= area.width as u32 || dy.unsigned_abs() >= area.height as u32 {
            return;
        }

        let mut scratch = Buffer::empty(area);
        self.render_content(area, &mut scratch, theme);
        blit(&scratch, buf, area, dx, dy);
    }

    fn render_content(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        match &mut self.content {
            PanelContent::Blank => {}
            PanelContent::Placeholder(pos) => {
                centered(
                    area,
                    buf,
                    Line::from(Span::styled(format!("({})", pos), Style::default().fg(theme.overlay0))),
                );
            }
            PanelContent::Screen { identifier, state } => match state {
                Resource::NotAsked | Resource::Loading => centered(
                    area,
                    buf,
                    Line::from(Span::styled(
                        format!("Loading {}\u{2026}", identifier),
                        Style::default().fg(theme.overlay1),
                    )),
                ),
                Resource::Success(mounted) => mounted.screen_mut().render(area, buf, theme),
                Resource::Failure(err) => centered(
                    area,
                    buf,
                    Line::from(Span::styled(
                        format!("Failed to load \"{}\": {}", identifier, err),
                        theme.error_style().bold(),
                    )),
                ),
            },
        }
    }
}

fn centered(area: Rect, buf: &mut Buffer, line: Line<'static>) {
    let y = area.y + area.height / 2;
    let row = Rect::new(area.x, y, area.width, area.height.saturating_sub(y - area.y));
    Paragraph::new(line).centered().wrap(Wrap { trim: true }).render(row, buf);
}

/// Copy `src` into `dst` shifted by (dx, dy) cells, clipped to `area`
fn blit(src: &Buffer, dst: &mut Buffer, area: Rect, dx: i32, dy: i32) {
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let (tx, ty) = (x as i32 + dx, y as i32 + dy);
            if tx < area.left() as i32 || tx >= area.right() as i32 || ty < area.top() as i32 || ty >= area.bottom() as i32 {
                continue;
            }
            if let (Some(cell), Some(target)) = (src.cell((x, y)), dst.cell_mut((tx as u16, ty as u16))) {
                *target = cell.clone();
            }
        }
    }
}

/// The container panels live in; later panels draw on top
#[derive(Debug, Default)]
pub struct Surface {
    panels: Vec<Panel>,
    next_id: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a panel at `offset` without animating
    pub fn create(&mut self, position: GridPos, offset: Offset) -> PanelId {
        self.next_id += 1;
        let id = PanelId(self.next_id);
        self.panels.push(Panel::new(id, position, offset));
        log::trace!("Created {} for ({})", id, position);
        id
    }

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == id)
    }

    pub fn remove(&mut self, id: PanelId) -> Option<Panel> {
        let index = self.panels.iter().position(|p| p.id == id)?;
        Some(self.panels.remove(index))
    }

    /// Destroy every panel; returns how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.panels.len();
        for panel in self.panels.drain(..) {
            panel.destroy();
        }
        count
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.panels.iter_mut()
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, now: Instant) {
        for panel in &mut self.panels {
            panel.render(area, buf, theme, now);
        }
    }
}
