use crossterm::event::KeyEvent;
use ratatui::Frame;

use crate::tui::{Command, InteractionRegistry, Subscription, Theme};

/// The main trait that all TUI apps must implement.
///
/// This follows the Elm architecture:
/// - State: the data that represents the app's current state
/// - Msg: events/actions that can happen
/// - update: handles messages and returns commands
/// - view: renders the current state
/// - subscriptions: declares what inputs the app wants to receive
pub trait App: Sized + Send + 'static {
    /// The app's state type
    type State: Send;

    /// The app's message type
    type Msg: Clone + Send + 'static;

    /// What the app needs to start
    type Params;

    /// Initialize the app, possibly with a command
    fn init(params: Self::Params) -> (Self::State, Command<Self::Msg>);

    /// Update the state based on a message and return a command
    fn update(state: &mut Self::State, msg: Self::Msg) -> Command<Self::Msg>;

    /// Render the current state, registering clickable areas as it goes
    /// Note: Takes &mut because screens animate as they draw
    fn view(
        state: &mut Self::State,
        frame: &mut Frame,
        theme: &Theme,
        registry: &mut InteractionRegistry<Self::Msg>,
    );

    /// Declare what inputs this app wants to receive
    fn subscriptions(state: &Self::State) -> Vec<Subscription<Self::Msg>>;

    /// Window title for the current state
    fn title(state: &Self::State) -> String;

    /// Optional: claim a key no subscription matched
    fn on_key(_state: &Self::State, _key: KeyEvent) -> Option<Self::Msg> {
        None
    }
}
