use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Rectangle},
        Paragraph, Widget,
    },
};
use std::time::Instant;

use super::FrameClock;
use crate::screens::{PanelHost, Screen};
use crate::tui::Theme;

const MIN_FREQ: f64 = 0.25;
const MAX_FREQ: f64 = 4.0;
const SAMPLES: usize = 160;

/// A sine trace feeding a square-wave gate, with an adjustable frequency
///
/// Enter toggles the frequency control. While it is active the screen keeps
/// the arrow keys for itself.
pub struct SignalRect {
    frequency: f64,
    adjusting: bool,
    clock: FrameClock,
}

impl SignalRect {
    pub fn new(_host: &PanelHost) -> Self {
        Self {
            frequency: 1.0,
            adjusting: false,
            clock: FrameClock::default(),
        }
    }

    fn sample(&self, x: f64) -> f64 {
        (std::f64::consts::TAU * (x / 100.0 * 2.0 + self.clock.elapsed() * self.frequency * 0.5)).sin()
    }
}

impl Screen for SignalRect {
    fn tick(&mut self, now: Instant) {
        self.clock.advance(now);
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let [plot, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let points: Vec<(f64, f64)> = (0..=SAMPLES)
            .map(|i| {
                let x = i as f64 * 100.0 / SAMPLES as f64;
                (x, 50.0 + 30.0 * self.sample(x))
            })
            .collect();
        let gate_high = self.sample(100.0) >= 0.0;

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, 100.0])
            .y_bounds([0.0, 100.0])
            .paint(|ctx| {
                for pair in points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color: theme.green,
                    });
                }
                ctx.draw(&Rectangle {
                    x: 84.0,
                    y: if gate_high { 55.0 } else { 15.0 },
                    width: 12.0,
                    height: 30.0,
                    color: if gate_high { theme.peach } else { theme.overlay1 },
                });
            })
            .render(plot, buf);

        let control = if self.adjusting {
            Span::styled(" [\u{2190}/\u{2192} adjust, Enter done]", Style::default().fg(theme.peach).bold())
        } else {
            Span::styled(" [Enter to adjust]", Style::default().fg(theme.overlay1))
        };
        Paragraph::new(Line::from(vec![
            Span::styled(format!("frequency {:.2}", self.frequency), Style::default().fg(theme.text)),
            control,
        ]))
        .centered()
        .render(status, buf);
    }

    fn captures_input(&self) -> bool {
        self.adjusting
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.code, self.adjusting) {
            (KeyCode::Enter, _) => {
                self.adjusting = !self.adjusting;
                true
            }
            (KeyCode::Esc, true) => {
                self.adjusting = false;
                true
            }
            (KeyCode::Left | KeyCode::Down, true) => {
                self.frequency = (self.frequency - 0.25).max(MIN_FREQ);
                true
            }
            (KeyCode::Right | KeyCode::Up, true) => {
                self.frequency = (self.frequency + 0.25).min(MAX_FREQ);
                true
            }
            _ => false,
        }
    }
}
