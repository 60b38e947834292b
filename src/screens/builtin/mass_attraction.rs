use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Points},
        Widget,
    },
};
use std::time::Instant;

use super::FrameClock;
use crate::screens::{PanelHost, Screen};
use crate::tui::Theme;

const PARTICLES: usize = 120;
const DAMPING: f64 = 0.985;

/// A swarm of particles chasing an attractor along a Lissajous path
pub struct MassAttraction {
    particles: Vec<((f64, f64), (f64, f64))>,
    attractor: (f64, f64),
    clock: FrameClock,
}

impl MassAttraction {
    pub fn new(_host: &PanelHost) -> Self {
        let mut rng = rand::thread_rng();
        let particles = (0..PARTICLES)
            .map(|_| {
                (
                    (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
                    (0.0, 0.0),
                )
            })
            .collect();
        Self {
            particles,
            attractor: (50.0, 50.0),
            clock: FrameClock::default(),
        }
    }
}

impl Screen for MassAttraction {
    fn tick(&mut self, now: Instant) {
        let dt = self.clock.advance(now);
        let t = self.clock.elapsed();
        self.attractor = (50.0 + 35.0 * (t * 0.7).sin(), 50.0 + 30.0 * (t * 1.1).cos());

        for (pos, vel) in &mut self.particles {
            let (dx, dy) = (self.attractor.0 - pos.0, self.attractor.1 - pos.1);
            let dist = (dx * dx + dy * dy).sqrt().max(3.0);
            let strength = 900.0 / (dist * dist);
            vel.0 = (vel.0 + dx / dist * strength * dt) * DAMPING;
            vel.1 = (vel.1 + dy / dist * strength * dt) * DAMPING;
            pos.0 += vel.0 * dt * 10.0;
            pos.1 += vel.1 * dt * 10.0;
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let coords: Vec<(f64, f64)> = self.particles.iter().map(|(pos, _)| *pos).collect();
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, 100.0])
            .y_bounds([0.0, 100.0])
            .paint(|ctx| {
                ctx.draw(&Points { coords: &coords, color: theme.sky });
                ctx.draw(&Circle {
                    x: self.attractor.0,
                    y: self.attractor.1,
                    radius: 2.5,
                    color: theme.red,
                });
            })
            .render(area, buf);
    }

    fn teardown(&mut self) {
        self.particles.clear();
    }
}
