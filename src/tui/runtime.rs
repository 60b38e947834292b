use anyhow::Result;
use crossterm::event::{KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use std::future::Future;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use crate::tui::command::BoxedMsgFuture;
use crate::tui::subscription::KeyBinding;
use crate::tui::{App, Command, InteractionRegistry, Subscription, Theme};

/// The runtime manages app lifecycle, event routing, and command execution
pub struct Runtime<A: App> {
    /// Current app state
    state: A::State,

    theme: Theme,

    /// Interaction registry for mouse events
    registry: InteractionRegistry<A::Msg>,

    /// Keyboard subscriptions, matched in declaration order
    key_subscriptions: Vec<(KeyBinding, A::Msg)>,

    /// Timer subscriptions: (interval, last_tick, msg)
    timers: Vec<(Duration, Instant, A::Msg)>,

    /// Pending async commands
    pending_async: Vec<BoxedMsgFuture<A::Msg>>,
}

impl<A: App> Runtime<A> {
    pub fn new(params: A::Params, theme: Theme) -> Self {
        let (state, init_command) = A::init(params);

        let mut runtime = Self {
            state,
            theme,
            registry: InteractionRegistry::new(),
            key_subscriptions: Vec::new(),
            timers: Vec::new(),
            pending_async: Vec::new(),
        };

        runtime.update_subscriptions();
        runtime.execute_command(init_command);
        runtime
    }

    /// Get a reference to the app's state
    pub fn state(&self) -> &A::State {
        &self.state
    }

    pub fn title(&self) -> String {
        A::title(&self.state)
    }

    /// Number of async commands still running
    pub fn pending(&self) -> usize {
        self.pending_async.len()
    }

    /// Feed a message through update and run the resulting command
    ///
    /// Returns false once the app asked to quit.
    pub fn dispatch(&mut self, msg: A::Msg) -> bool {
        let command = A::update(&mut self.state, msg);
        let keep_running = self.execute_command(command);
        // Subscriptions depend on state (e.g. arrows are released while a
        // screen captures input), so rebuild them after every update.
        self.update_subscriptions();
        keep_running
    }

    /// Poll timer subscriptions and fire those that are ready
    pub fn poll_timers(&mut self) -> Result<bool> {
        let now = Instant::now();
        let mut messages = Vec::new();

        for (interval, last_tick, msg) in &mut self.timers {
            if now.duration_since(*last_tick) >= *interval {
                messages.push(msg.clone());
                *last_tick = now;
            }
        }

        for msg in messages {
            if !self.dispatch(msg) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Poll pending async commands and process completed ones
    pub async fn poll_async(&mut self) -> Result<bool> {
        // Futures are re-polled every frame, so a waker is not needed
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        let mut completed = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending_async.len());
        for mut future in self.pending_async.drain(..) {
            match future.as_mut().poll(&mut cx) {
                Poll::Ready(msg) => completed.push(msg),
                Poll::Pending => still_pending.push(future),
            }
        }
        self.pending_async = still_pending;

        for msg in completed {
            if !self.dispatch(msg) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Update subscriptions based on current state
    fn update_subscriptions(&mut self) {
        let previous_intervals: Vec<(Duration, Instant)> =
            self.timers.iter().map(|(interval, last, _)| (*interval, *last)).collect();
        self.key_subscriptions.clear();
        self.timers.clear();

        for sub in A::subscriptions(&self.state) {
            match sub {
                Subscription::Keyboard { key, msg, description: _ } => {
                    // description is used for the help line, not for runtime lookup
                    self.key_subscriptions.push((key, msg));
                }
                Subscription::Timer { interval, msg } => {
                    // Keep the phase of timers that survive a rebuild
                    let last_tick = previous_intervals
                        .iter()
                        .find(|(i, _)| *i == interval)
                        .map_or_else(Instant::now, |(_, last)| *last);
                    self.timers.push((interval, last_tick, msg));
                }
            }
        }
    }

    /// Handle a keyboard event
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Result<bool> {
        if key_event.kind != KeyEventKind::Press {
            return Ok(true);
        }

        let subscribed = self
            .key_subscriptions
            .iter()
            .find(|(binding, _)| binding.matches(&key_event))
            .map(|(_, msg)| msg.clone());

        match subscribed.or_else(|| A::on_key(&self.state, key_event)) {
            Some(msg) => Ok(self.dispatch(msg)),
            None => Ok(true),
        }
    }

    /// Handle a mouse event
    pub fn handle_mouse(&mut self, mouse_event: MouseEvent) -> Result<bool> {
        if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
            if let Some(msg) = self.registry.find_click(mouse_event.column, mouse_event.row) {
                return Ok(self.dispatch(msg));
            }
        }
        Ok(true)
    }

    /// Execute a command
    fn execute_command(&mut self, command: Command<A::Msg>) -> bool {
        match command {
            Command::None => true,

            Command::Batch(commands) => {
                for cmd in commands {
                    if !self.execute_command(cmd) {
                        return false;
                    }
                }
                true
            }

            Command::Quit => false,

            Command::Perform(future) => {
                self.pending_async.push(future);
                true
            }
        }
    }

    /// Render the app into the whole frame
    pub fn render(&mut self, frame: &mut Frame) {
        // Clear registry for this frame
        self.registry.clear();
        A::view(&mut self.state, frame, &self.theme, &mut self.registry);
    }
}
