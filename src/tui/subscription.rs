use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

/// Represents a keyboard key with optional modifiers (Ctrl, Alt, Shift)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Create a key binding with no modifiers
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// Create a key binding with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// Create a key binding with Alt modifier
    pub fn alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    /// Check if this key binding matches the given key event
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.code == event.code && self.modifiers == event.modifiers
    }

    /// Short form for the help line, e.g. `Alt+←`
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Left => "\u{2190}".to_string(),
            KeyCode::Right => "\u{2192}".to_string(),
            KeyCode::Up => "\u{2191}".to_string(),
            KeyCode::Down => "\u{2193}".to_string(),
            KeyCode::Char(c) => c.to_string(),
            other => format!("{:?}", other),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", key)
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            format!("Alt+{}", key)
        } else {
            key
        }
    }
}

impl From<KeyCode> for KeyBinding {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Subscriptions represent inputs that an app wants to receive.
/// They are registered via the subscriptions() function.
pub enum Subscription<Msg> {
    /// Subscribe to a specific keyboard key (with optional modifiers)
    Keyboard {
        key: KeyBinding,
        msg: Msg,
        description: String,
    },

    /// Subscribe to periodic timer events
    Timer { interval: Duration, msg: Msg },
}

impl<Msg> Subscription<Msg> {
    /// Helper to create a keyboard subscription (accepts KeyCode or KeyBinding)
    pub fn keyboard(key: impl Into<KeyBinding>, description: impl Into<String>, msg: Msg) -> Self {
        Subscription::Keyboard {
            key: key.into(),
            msg,
            description: description.into(),
        }
    }

    /// Helper to create a keyboard subscription with Alt modifier
    pub fn alt_key(code: KeyCode, description: impl Into<String>, msg: Msg) -> Self {
        Subscription::Keyboard {
            key: KeyBinding::alt(code),
            msg,
            description: description.into(),
        }
    }

    /// Helper to create a timer subscription
    pub fn timer(interval: Duration, msg: Msg) -> Self {
        Subscription::Timer { interval, msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_requires_exact_modifiers() {
        let back = KeyBinding::alt(KeyCode::Left);
        assert!(back.matches(&KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)));
        assert!(!back.matches(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)));
        assert!(KeyBinding::from(KeyCode::Left).matches(&KeyEvent::from(KeyCode::Left)));
    }

    #[test]
    fn test_labels() {
        assert_eq!(KeyBinding::alt(KeyCode::Left).label(), "Alt+\u{2190}");
        assert_eq!(KeyBinding::ctrl(KeyCode::Char('c')).label(), "Ctrl+c");
        assert_eq!(KeyBinding::new(KeyCode::Char('[')).label(), "[");
    }
}
