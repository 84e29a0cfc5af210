//! Key bindings for focus navigation.

use crate::input::key::{Event, Key};
use std::sync::{Arc, OnceLock};

/// One of the four navigation directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in index order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The reverse direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Parse a connection symbol: `U`, `D`, `L` or `R`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "U" => Some(Self::Up),
            "D" => Some(Self::Down),
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            _ => None,
        }
    }

    /// Stable index for per-direction tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What a key means to focus navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// Leave the current level.
    Back,
    /// Enter the hovered widget.
    Activate,
    /// Move the hover cursor.
    Move(Direction),
}

/// Keys recognized by navigators and leaf widgets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    /// Keys that back out of a widget.
    pub back: Vec<Key>,
    /// Keys that enter the hovered widget.
    pub activate: Vec<Key>,
    pub up: Vec<Key>,
    pub down: Vec<Key>,
    pub left: Vec<Key>,
    pub right: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            back: vec![Key::Escape, Key::Tab],
            activate: vec![Key::Return, Key::Space],
            up: vec![Key::Up, Key::Char('e')],
            down: vec![Key::Down, Key::Char('d')],
            left: vec![Key::Left, Key::Char('s')],
            right: vec![Key::Right, Key::Char('f')],
        }
    }
}

impl KeyBindings {
    /// The process-wide default bindings.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static DEFAULT: OnceLock<Arc<KeyBindings>> = OnceLock::new();
        Arc::clone(DEFAULT.get_or_init(|| Arc::new(Self::default())))
    }

    /// Classify an event. Back wins over activate, which wins over movement.
    #[must_use]
    pub fn action(&self, event: &Event) -> Option<NavAction> {
        let key = event.key?;
        if self.back.contains(&key) {
            Some(NavAction::Back)
        } else if self.activate.contains(&key) {
            Some(NavAction::Activate)
        } else {
            self.direction_of(key).map(NavAction::Move)
        }
    }

    /// Check if the event is a back key.
    #[must_use]
    pub fn is_back(&self, event: &Event) -> bool {
        event.key.is_some_and(|k| self.back.contains(&k))
    }

    /// Check if the event is an activate key.
    #[must_use]
    pub fn is_activate(&self, event: &Event) -> bool {
        event.key.is_some_and(|k| self.activate.contains(&k))
    }

    fn direction_of(&self, key: Key) -> Option<Direction> {
        [
            (&self.up, Direction::Up),
            (&self.down, Direction::Down),
            (&self.left, Direction::Left),
            (&self.right, Direction::Right),
        ]
        .into_iter()
        .find_map(|(keys, dir)| keys.contains(&key).then_some(dir))
    }
}
