use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Widget,
    },
};
use std::f64::consts::TAU;
use std::time::Instant;

use super::FrameClock;
use crate::screens::{PanelHost, Screen};
use crate::tui::Theme;

const STEPS: usize = 720;

/// A slowly morphing rose curve
pub struct PrettyCuriosity {
    clock: FrameClock,
}

impl PrettyCuriosity {
    pub fn new(_host: &PanelHost) -> Self {
        Self {
            clock: FrameClock::default(),
        }
    }

    fn curve(&self) -> Vec<(f64, f64)> {
        let t = self.clock.elapsed();
        let k = 2.5 + 1.5 * (t * 0.15).sin();
        let spin = t * 0.2;
        (0..=STEPS)
            .map(|i| {
                let theta = i as f64 / STEPS as f64 * TAU * 4.0;
                let r = 40.0 * (k * theta).cos();
                (50.0 + r * (theta + spin).cos(), 50.0 + r * (theta + spin).sin())
            })
            .collect()
    }
}

impl Screen for PrettyCuriosity {
    fn tick(&mut self, now: Instant) {
        self.clock.advance(now);
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let points = self.curve();
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, 100.0])
            .y_bounds([0.0, 100.0])
            .paint(|ctx| {
                for (i, pair) in points.windows(2).enumerate() {
                    let color = if i % 2 == 0 { theme.pink } else { theme.mauve };
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color,
                    });
                }
            })
            .render(area, buf);
    }
}
