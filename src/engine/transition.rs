//! Slide hand-off between the outgoing and incoming panel.
//!
//! A transition moves `Staging -> Animating -> Settled`. Settling is armed
//! from two sources, the animation finishing on a frame tick and a fallback
//! timer, and both share one [`SettleToken`] so only the first one acts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::panel::{Offset, PanelId, Surface};
use crate::grid::GridPos;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(450);

/// Extra time the fallback timer waits past the animation
pub const DEFAULT_SETTLE_GRACE: Duration = Duration::from_millis(50);

/// Direction of travel across the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Direction from `from` to `to`; column movement wins over row movement
    pub fn between(from: GridPos, to: GridPos) -> Option<Direction> {
        let (dx, dy) = (to.col - from.col, to.row - from.row);
        if dx > 0 {
            Some(Direction::Right)
        } else if dx < 0 {
            Some(Direction::Left)
        } else if dy > 0 {
            Some(Direction::Down)
        } else if dy < 0 {
            Some(Direction::Up)
        } else {
            None
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Where the incoming panel waits before sliding in
    pub fn entry_offset(self) -> Offset {
        let (dx, dy) = self.delta();
        Offset::new(dx as f32, dy as f32)
    }

    /// Where the outgoing panel ends up
    pub fn exit_offset(self) -> Offset {
        let (dx, dy) = self.delta();
        Offset::new(-dx as f32, -dy as f32)
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Up => "Up",
            Direction::Down => "Down",
        }
    }
}

/// One-shot finalisation token shared by every settle trigger of a transition
#[derive(Debug, Clone)]
pub struct SettleToken {
    id: u64,
    fired: Arc<AtomicBool>,
}

impl SettleToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Claim the token; true only for the first caller
    fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }

    fn same_as(&self, other: &SettleToken) -> bool {
        Arc::ptr_eq(&self.fired, &other.fired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Staging,
    Animating,
    Settled,
}

#[derive(Debug)]
struct Transition {
    token: SettleToken,
    direction: Direction,
    outgoing: PanelId,
    incoming: PanelId,
    phase: TransitionPhase,
}

#[derive(Debug)]
pub struct TransitionController {
    duration: Duration,
    grace: Duration,
    next_id: u64,
    active: Option<Transition>,
}

impl Default for TransitionController {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION, DEFAULT_SETTLE_GRACE)
    }
}

impl TransitionController {
    pub fn new(duration: Duration, grace: Duration) -> Self {
        Self {
            duration,
            grace,
            next_id: 0,
            active: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// How long the fallback timer waits before forcing a settle
    pub fn settle_timeout(&self) -> Duration {
        self.duration + self.grace
    }

    pub fn phase(&self) -> TransitionPhase {
        self.active
            .as_ref()
            .map_or(TransitionPhase::Settled, |t| t.phase)
    }

    pub fn active_token(&self) -> Option<SettleToken> {
        self.active.as_ref().map(|t| t.token.clone())
    }

    /// Stage a new panel off-screen on the side the travel comes from
    pub fn begin(&mut self, surface: &mut Surface, from: PanelId, direction: Direction, position: GridPos) -> PanelId {
        if let Some(stale) = self.active.take() {
            log::warn!("Starting a transition while {} is unsettled; settling it now", stale.token.id);
            if stale.token.fire() {
                if let Some(panel) = surface.remove(stale.outgoing) {
                    panel.destroy();
                }
            }
        }

        self.next_id += 1;
        let incoming = surface.create(position, direction.entry_offset());
        log::debug!(
            "Transition {} staged: {} -> {} moving {}",
            self.next_id,
            from,
            incoming,
            direction.label()
        );

        self.active = Some(Transition {
            token: SettleToken::new(self.next_id),
            direction,
            outgoing: from,
            incoming,
            phase: TransitionPhase::Staging,
        });
        incoming
    }

    /// Start sliding both panels
    pub fn animate(&mut self, surface: &mut Surface, now: Instant) {
        let Some(transition) = self.active.as_mut() else {
            return;
        };
        if transition.phase != TransitionPhase::Staging {
            return;
        }

        // The incoming panel must be laid out at its staged offset first,
        // otherwise the slide starts from rest and nothing visibly moves.
        if let Some(incoming) = surface.get_mut(transition.incoming) {
            incoming.flush_layout(now);
            incoming.slide_to(Offset::ZERO, now, self.duration);
        }
        if let Some(outgoing) = surface.get_mut(transition.outgoing) {
            outgoing.flush_layout(now);
            outgoing.slide_to(transition.direction.exit_offset(), now, self.duration);
        }
        transition.phase = TransitionPhase::Animating;
    }

    /// Finished signal: the token to settle once both slides have completed
    pub fn poll_finished(&self, surface: &Surface, now: Instant) -> Option<SettleToken> {
        let transition = self.active.as_ref()?;
        if transition.phase != TransitionPhase::Animating {
            return None;
        }
        let done = [transition.incoming, transition.outgoing]
            .iter()
            .filter_map(|id| surface.get(*id))
            .all(|panel| panel.slide_finished(now));
        done.then(|| transition.token.clone())
    }

    /// Destroy the outgoing panel; safe to call any number of times
    ///
    /// Returns true only for the call that actually settled the transition.
    pub fn settle(&mut self, surface: &mut Surface, token: &SettleToken) -> bool {
        let is_active = self
            .active
            .as_ref()
            .is_some_and(|t| t.token.same_as(token));
        if !is_active || !token.fire() {
            log::trace!("Settle for transition {} ignored", token.id);
            return false;
        }

        let Some(mut transition) = self.active.take() else {
            return false;
        };
        if let Some(panel) = surface.remove(transition.outgoing) {
            panel.destroy();
        }
        if let Some(incoming) = surface.get_mut(transition.incoming) {
            incoming.place(Offset::ZERO);
        }
        transition.phase = TransitionPhase::Settled;
        log::debug!("Transition {} settled", token.id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(controller: &mut TransitionController, surface: &mut Surface, direction: Direction) -> (PanelId, PanelId) {
        let old = surface.create(GridPos::ORIGIN, Offset::ZERO);
        let new = controller.begin(surface, old, direction, GridPos::new(1, 0));
        (old, new)
    }

    #[test]
    fn test_direction_between() {
        let origin = GridPos::new(1, 1);
        assert_eq!(Direction::between(origin, GridPos::new(2, 1)), Some(Direction::Right));
        assert_eq!(Direction::between(origin, GridPos::new(0, 1)), Some(Direction::Left));
        assert_eq!(Direction::between(origin, GridPos::new(1, 2)), Some(Direction::Down));
        assert_eq!(Direction::between(origin, GridPos::new(1, 0)), Some(Direction::Up));
        assert_eq!(Direction::between(origin, GridPos::new(0, 0)), Some(Direction::Left));
        assert_eq!(Direction::between(origin, origin), None);
    }

    #[test]
    fn test_begin_stages_offscreen() {
        let mut surface = Surface::new();
        let mut controller = TransitionController::default();
        let (_, new) = staged(&mut controller, &mut surface, Direction::Right);

        assert_eq!(controller.phase(), TransitionPhase::Staging);
        assert_eq!(surface.len(), 2);
        assert_eq!(surface.get(new).unwrap().offset_at(Instant::now()), Offset::new(1.0, 0.0));
    }

    #[test]
    fn test_animate_slides_both_panels() {
        let now = Instant::now();
        let mut surface = Surface::new();
        let mut controller = TransitionController::default();
        let (old, new) = staged(&mut controller, &mut surface, Direction::Down);

        controller.animate(&mut surface, now);
        assert_eq!(controller.phase(), TransitionPhase::Animating);
        assert_eq!(surface.get(new).unwrap().offset_at(now), Offset::new(0.0, 1.0));

        let end = now + DEFAULT_DURATION;
        assert_eq!(surface.get(new).unwrap().offset_at(end), Offset::ZERO);
        assert_eq!(surface.get(old).unwrap().offset_at(end), Offset::new(0.0, -1.0));
        assert!(controller.poll_finished(&surface, now).is_none());
        assert!(controller.poll_finished(&surface, end).is_some());
    }

    #[test]
    fn test_settle_is_idempotent() {
        let now = Instant::now();
        let mut surface = Surface::new();
        let mut controller = TransitionController::default();
        let (old, new) = staged(&mut controller, &mut surface, Direction::Left);
        controller.animate(&mut surface, now);

        let token = controller.active_token().unwrap();
        assert!(controller.settle(&mut surface, &token));
        assert!(!controller.settle(&mut surface, &token));

        assert_eq!(surface.len(), 1);
        assert!(!surface.contains(old));
        assert!(surface.contains(new));
        assert!(token.is_fired());
        assert_eq!(controller.phase(), TransitionPhase::Settled);
    }

    #[test]
    fn test_stale_token_does_not_settle_next_transition() {
        let now = Instant::now();
        let mut surface = Surface::new();
        let mut controller = TransitionController::default();
        let (_, first) = staged(&mut controller, &mut surface, Direction::Right);
        controller.animate(&mut surface, now);
        let first_token = controller.active_token().unwrap();
        assert!(controller.settle(&mut surface, &first_token));

        let second = controller.begin(&mut surface, first, Direction::Right, GridPos::new(2, 0));
        controller.animate(&mut surface, now);

        assert!(!controller.settle(&mut surface, &first_token));
        assert_eq!(surface.len(), 2);
        assert!(surface.contains(second));
        assert_eq!(controller.phase(), TransitionPhase::Animating);
    }

    #[test]
    fn test_settle_timeout_exceeds_duration() {
        let controller = TransitionController::new(Duration::from_millis(300), Duration::from_millis(50));
        assert_eq!(controller.settle_timeout(), Duration::from_millis(350));
    }
}
