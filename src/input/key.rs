//! Named keys and decoded input events.

use std::fmt;

/// A canonical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Shift + up arrow.
    ShiftUp,
    /// Shift + down arrow.
    ShiftDown,
    /// Shift + left arrow.
    ShiftLeft,
    /// Shift + right arrow.
    ShiftRight,
    /// Enter/Return key.
    Return,
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
    /// Shift+Tab (backtab).
    BackTab,
    /// Backspace key.
    Backspace,
    /// Space bar.
    Space,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Insert key.
    Insert,
    /// Delete key.
    Delete,
    /// Function key (F1-F12).
    F(u8),
    /// Control + lowercase letter.
    Ctrl(char),
    /// A printable character other than space.
    Char(char),
}

impl Key {
    /// Canonical name, e.g. `"UP"`, `"RETURN"`, `"F5"`, `"CTRL_C"`.
    ///
    /// Character keys are named by the character itself.
    #[must_use]
    pub fn name(&self) -> String {
        let fixed = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::ShiftUp => "SHIFT_UP",
            Self::ShiftDown => "SHIFT_DOWN",
            Self::ShiftLeft => "SHIFT_LEFT",
            Self::ShiftRight => "SHIFT_RIGHT",
            Self::Return => "RETURN",
            Self::Escape => "ESCAPE",
            Self::Tab => "TAB",
            Self::BackTab => "SHIFT_TAB",
            Self::Backspace => "BACKSPACE",
            Self::Space => "SPACE",
            Self::Home => "HOME",
            Self::End => "END",
            Self::PageUp => "PAGE_UP",
            Self::PageDown => "PAGE_DOWN",
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::F(n) => return format!("F{n}"),
            Self::Ctrl(c) => return format!("CTRL_{}", c.to_ascii_uppercase()),
            Self::Char(c) => return c.to_string(),
        };
        fixed.to_string()
    }

    /// Parse a canonical name back into a key.
    ///
    /// A single-character name is a character key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.clone().next()) {
            return Some(if c == ' ' { Self::Space } else { Self::Char(c) });
        }

        let key = match name {
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            "SHIFT_UP" => Self::ShiftUp,
            "SHIFT_DOWN" => Self::ShiftDown,
            "SHIFT_LEFT" => Self::ShiftLeft,
            "SHIFT_RIGHT" => Self::ShiftRight,
            "RETURN" => Self::Return,
            "ESCAPE" => Self::Escape,
            "TAB" => Self::Tab,
            "SHIFT_TAB" => Self::BackTab,
            "BACKSPACE" => Self::Backspace,
            "SPACE" => Self::Space,
            "HOME" => Self::Home,
            "END" => Self::End,
            "PAGE_UP" => Self::PageUp,
            "PAGE_DOWN" => Self::PageDown,
            "INSERT" => Self::Insert,
            "DELETE" => Self::Delete,
            _ => {
                if let Some(n) = name.strip_prefix('F') {
                    let n: u8 = n.parse().ok()?;
                    return (1..=12).contains(&n).then_some(Self::F(n));
                }
                let letter = name.strip_prefix("CTRL_")?;
                let mut letters = letter.chars();
                return match (letters.next(), letters.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Some(Self::Ctrl(c.to_ascii_lowercase()))
                    }
                    _ => None,
                };
            }
        };
        Some(key)
    }

    /// Check if this is an arrow key (with or without shift).
    #[must_use]
    pub fn is_arrow(&self) -> bool {
        matches!(
            self,
            Self::Up
                | Self::Down
                | Self::Left
                | Self::Right
                | Self::ShiftUp
                | Self::ShiftDown
                | Self::ShiftLeft
                | Self::ShiftRight
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One decoded input event.
///
/// `codes` is the raw code sequence that produced the event. `ch` is the
/// printable text, if any. `key` is the canonical key, if the sequence was
/// recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub codes: Vec<u32>,
    pub ch: Option<char>,
    pub key: Option<Key>,
}

impl Event {
    /// Create an event from its parts.
    #[must_use]
    pub fn new(codes: Vec<u32>, ch: Option<char>, key: Option<Key>) -> Self {
        Self { codes, ch, key }
    }

    /// A synthetic event for `key` with no raw codes.
    #[must_use]
    pub fn key(key: Key) -> Self {
        let ch = match key {
            Key::Char(c) => Some(c),
            Key::Space => Some(' '),
            _ => None,
        };
        Self::new(Vec::new(), ch, Some(key))
    }

    /// A synthetic printable character event.
    #[must_use]
    pub fn char(c: char) -> Self {
        let key = if c == ' ' { Key::Space } else { Key::Char(c) };
        Self::new(vec![u32::from(c)], Some(c), Some(key))
    }

    /// Check whether this event carries `key`.
    #[must_use]
    pub fn is(&self, key: Key) -> bool {
        self.key == Some(key)
    }

    /// Canonical key name, if the key was recognized.
    #[must_use]
    pub fn key_name(&self) -> Option<String> {
        self.key.map(|k| k.name())
    }
}
