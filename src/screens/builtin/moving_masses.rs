use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Points},
        Widget,
    },
};
use std::collections::VecDeque;
use std::time::Instant;

use super::FrameClock;
use crate::screens::{PanelHost, Screen};
use crate::tui::Theme;

const G: f64 = 40.0;
const SUN_MASS: f64 = 800.0;
const TAIL_LEN: usize = 80;
const CENTER: (f64, f64) = (50.0, 50.0);

struct Body {
    pos: (f64, f64),
    vel: (f64, f64),
    mass: f64,
    tail: VecDeque<(f64, f64)>,
}

/// Planets orbiting a fixed sun, pulling on each other as they go
pub struct MovingMasses {
    bodies: Vec<Body>,
    clock: FrameClock,
}

impl MovingMasses {
    pub fn new(host: &PanelHost) -> Self {
        let mut rng = rand::thread_rng();
        let bodies = (0..5)
            .map(|_| {
                let radius: f64 = rng.gen_range(12.0..42.0);
                let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                let speed = (G * SUN_MASS / radius).sqrt() / 10.0;
                Body {
                    pos: (CENTER.0 + radius * angle.cos(), CENTER.1 + radius * angle.sin()),
                    vel: (-speed * angle.sin(), speed * angle.cos()),
                    mass: rng.gen_range(1.0..30.0),
                    tail: VecDeque::with_capacity(TAIL_LEN),
                }
            })
            .collect();
        log::debug!("moving-masses mounted in panel {:?}", host.panel);
        Self {
            bodies,
            clock: FrameClock::default(),
        }
    }

    fn step(&mut self, dt: f64) {
        let snapshot: Vec<((f64, f64), f64)> = self.bodies.iter().map(|b| (b.pos, b.mass)).collect();
        for (i, body) in self.bodies.iter_mut().enumerate() {
            let mut acc = pull(body.pos, CENTER, SUN_MASS, 6.0);
            for (j, (pos, mass)) in snapshot.iter().enumerate() {
                if i != j {
                    let a = pull(body.pos, *pos, *mass, 2.0);
                    acc.0 += a.0;
                    acc.1 += a.1;
                }
            }
            body.vel.0 += acc.0 * dt;
            body.vel.1 += acc.1 * dt;
            body.pos.0 += body.vel.0 * dt * 10.0;
            body.pos.1 += body.vel.1 * dt * 10.0;

            body.tail.push_back(body.pos);
            if body.tail.len() > TAIL_LEN {
                body.tail.pop_front();
            }
        }
    }
}

/// Acceleration on a body at `at` towards a mass at `to`, softened below `min_dist`
fn pull(at: (f64, f64), to: (f64, f64), mass: f64, min_dist: f64) -> (f64, f64) {
    let (dx, dy) = (to.0 - at.0, to.1 - at.1);
    let dist = (dx * dx + dy * dy).sqrt().max(min_dist);
    let strength = G * mass / (dist * dist) / 100.0;
    (dx / dist * strength, dy / dist * strength)
}

impl Screen for MovingMasses {
    fn tick(&mut self, now: Instant) {
        let dt = self.clock.advance(now);
        if dt > 0.0 {
            self.step(dt);
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let palette = [theme.blue, theme.green, theme.peach, theme.mauve, theme.teal];
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, 100.0])
            .y_bounds([0.0, 100.0])
            .paint(|ctx| {
                ctx.draw(&Circle {
                    x: CENTER.0,
                    y: CENTER.1,
                    radius: 4.0,
                    color: theme.yellow,
                });
                for (i, body) in self.bodies.iter().enumerate() {
                    let color = palette[i % palette.len()];
                    let tail: Vec<(f64, f64)> = body.tail.iter().copied().collect();
                    ctx.draw(&Points { coords: &tail, color: dim(color) });
                    ctx.draw(&Circle {
                        x: body.pos.0,
                        y: body.pos.1,
                        radius: (body.mass.sqrt() * 0.4).max(0.8),
                        color,
                    });
                }
            })
            .render(area, buf);
    }

    fn teardown(&mut self) {
        self.bodies.clear();
    }
}

fn dim(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
        other => other,
    }
}
