//! Code screens shipped with the binary.

mod mass_attraction;
mod moving_masses;
mod pretty_curiosity;
mod signal_rect;

use std::time::{Duration, Instant};

use super::ModuleCatalog;

pub use mass_attraction::MassAttraction;
pub use moving_masses::MovingMasses;
pub use pretty_curiosity::PrettyCuriosity;
pub use signal_rect::SignalRect;

pub fn register_all(catalog: &mut ModuleCatalog) {
    catalog.register("moving-masses", |host| Box::new(MovingMasses::new(host)));
    catalog.register("mass-attraction", |host| Box::new(MassAttraction::new(host)));
    catalog.register("signal-rect", |host| Box::new(SignalRect::new(host)));
    catalog.register("pretty-curiosity", |host| Box::new(PrettyCuriosity::new(host)));
}

/// Frame clock shared by the animated screens
#[derive(Debug, Default)]
pub(crate) struct FrameClock {
    last: Option<Instant>,
    elapsed: Duration,
}

impl FrameClock {
    /// Seconds since the previous tick, clamped so a stalled frame cannot explode a simulation
    pub(crate) fn advance(&mut self, now: Instant) -> f64 {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last).min(Duration::from_millis(50)),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.elapsed += dt;
        dt.as_secs_f64()
    }

    pub(crate) fn elapsed(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
