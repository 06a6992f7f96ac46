//! Input events delivered to the whiteboard.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl or Cmd, whichever the platform uses for shortcuts.
    pub fn action_mod(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in canvas-local logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }
}

/// Keys the whiteboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Character(String),
    Backspace,
    Delete,
    Enter,
    Escape,
    Left,
    Right,
    Home,
    End,
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Key press with the shortcut modifier held.
    pub fn with_action_mod(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        }
    }

    /// True if this is `c` (case-insensitive) typed as a character.
    pub fn is_char(&self, c: char) -> bool {
        match &self.key {
            Key::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(first), None) if first.eq_ignore_ascii_case(&c))
            }
            _ => false,
        }
    }
}

/// Everything the interaction layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Pointer(PointerEvent),
    DoubleClick { position: Point },
    Key(KeyEvent),
    /// The text overlay's full value after a change.
    TextChanged(String),
    /// The text overlay lost focus.
    FocusLost,
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        InputEvent::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Detects double-clicks for hosts that only report raw button events.
///
/// A double-click is reported on the second left-button release close in time
/// and space to the first.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer event at `now`. Returns the double-click position, if any.
    pub fn track(&mut self, event: &PointerEvent, now: Instant) -> Option<Point> {
        let PointerEvent::Up {
            position,
            button: MouseButton::Left,
        } = *event
        else {
            return None;
        };

        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = now.saturating_duration_since(last_time);
            if elapsed < DOUBLE_CLICK_TIME && position.distance(last_pos) < DOUBLE_CLICK_DISTANCE {
                // Reset so a triple click is not a second double-click.
                self.last_click = None;
                return Some(position);
            }
        }
        self.last_click = Some((now, position));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_action_mod() {
        assert!(!Modifiers::NONE.action_mod());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.action_mod());
        assert!(KeyEvent::with_action_mod(Key::Character("t".into())).modifiers.action_mod());
    }

    #[test]
    fn test_is_char_ignores_case() {
        assert!(KeyEvent::plain(Key::Character("T".into())).is_char('t'));
        assert!(!KeyEvent::plain(Key::Character("tt".into())).is_char('t'));
        assert!(!KeyEvent::plain(Key::Enter).is_char('t'));
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::new();
        let t0 = Instant::now();

        assert_eq!(clicks.track(&up(100.0, 100.0), t0), None);
        assert_eq!(
            clicks.track(&up(101.0, 100.0), t0 + Duration::from_millis(200)),
            Some(Point::new(101.0, 100.0))
        );
        // Third click starts a new pair.
        assert_eq!(clicks.track(&up(101.0, 100.0), t0 + Duration::from_millis(300)), None);
    }

    #[test]
    fn test_double_click_too_far_or_slow() {
        let mut clicks = ClickTracker::new();
        let t0 = Instant::now();

        clicks.track(&up(100.0, 100.0), t0);
        assert_eq!(clicks.track(&up(200.0, 200.0), t0 + Duration::from_millis(100)), None);
        assert_eq!(clicks.track(&up(200.0, 200.0), t0 + Duration::from_millis(700)), None);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut clicks = ClickTracker::new();
        let t0 = Instant::now();
        let right = PointerEvent::Up {
            position: Point::ZERO,
            button: MouseButton::Right,
        };
        assert_eq!(clicks.track(&right, t0), None);
        assert_eq!(clicks.track(&right, t0), None);
    }
}
