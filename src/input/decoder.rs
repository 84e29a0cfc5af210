//! Raw code sequence decoding.
//!
//! A [`KeyDecoder`] turns the codes produced by one keystroke into an
//! [`Event`]. [`VtDecoder`] understands the portable VT/xterm set: control
//! codes, UTF-8 text, arrows, shifted arrows, F1-F12 and the editing keys.
//!
//! [`split_sequences`] cuts a raw read into per-keystroke slices first, so a
//! burst of typed characters becomes one event per key.

// Decoding tables have many arms that map to the same key
#![allow(clippy::match_same_arms)]

use crate::input::key::{Event, Key};

/// Escape (ESC, 0x1b).
pub const ESC: u32 = 0x1b;

/// Converts one keystroke's code sequence into an [`Event`].
pub trait KeyDecoder {
    /// Decode one sequence. Unknown sequences yield `key: None`.
    fn decode(&self, codes: &[u32]) -> Event;

    /// Decode a byte sequence.
    fn decode_bytes(&self, bytes: &[u8]) -> Event {
        let codes: Vec<u32> = bytes.iter().map(|&b| u32::from(b)).collect();
        self.decode(&codes)
    }
}

/// Decoder for VT100/xterm input sequences.
#[derive(Clone, Copy, Debug, Default)]
pub struct VtDecoder;

impl VtDecoder {
    /// Create a decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn single(code: u32) -> Option<Key> {
        let key = match code {
            8 | 127 => Key::Backspace,
            9 => Key::Tab,
            10 | 13 => Key::Return,
            27 => Key::Escape,
            32 => Key::Space,
            1..=26 => {
                let letter = char::from_u32(u32::from(b'a') + code - 1)?;
                Key::Ctrl(letter)
            }
            _ => {
                let c = char::from_u32(code)?;
                if c.is_control() {
                    return None;
                }
                Key::Char(c)
            }
        };
        Some(key)
    }

    fn escape(tail: &[u32]) -> Option<Key> {
        let tail: String = tail.iter().map(|&c| char::from_u32(c)).collect::<Option<_>>()?;
        let key = match tail.as_str() {
            "[A" | "OA" => Key::Up,
            "[B" | "OB" => Key::Down,
            "[C" | "OC" => Key::Right,
            "[D" | "OD" => Key::Left,
            "[1;2A" => Key::ShiftUp,
            "[1;2B" => Key::ShiftDown,
            "[1;2C" => Key::ShiftRight,
            "[1;2D" => Key::ShiftLeft,
            "[Z" => Key::BackTab,
            "[H" | "OH" | "[1~" | "[7~" => Key::Home,
            "[F" | "OF" | "[4~" | "[8~" => Key::End,
            "[2~" => Key::Insert,
            "[3~" => Key::Delete,
            "[5~" => Key::PageUp,
            "[6~" => Key::PageDown,
            "OP" | "[11~" => Key::F(1),
            "OQ" | "[12~" => Key::F(2),
            "OR" | "[13~" => Key::F(3),
            "OS" | "[14~" => Key::F(4),
            "[15~" => Key::F(5),
            "[17~" => Key::F(6),
            "[18~" => Key::F(7),
            "[19~" => Key::F(8),
            "[20~" => Key::F(9),
            "[21~" => Key::F(10),
            "[23~" => Key::F(11),
            "[24~" => Key::F(12),
            _ => return None,
        };
        Some(key)
    }

    // A multi-byte UTF-8 character delivered as individual bytes.
    fn utf8(codes: &[u32]) -> Option<char> {
        let bytes: Vec<u8> = codes
            .iter()
            .map(|&c| u8::try_from(c).ok())
            .collect::<Option<_>>()?;
        let text = std::str::from_utf8(&bytes).ok()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl KeyDecoder for VtDecoder {
    fn decode(&self, codes: &[u32]) -> Event {
        match codes {
            [] => Event::new(Vec::new(), None, None),
            [code] => {
                // A single code always carries its character.
                let ch = char::from_u32(*code);
                Event::new(codes.to_vec(), ch, Self::single(*code))
            }
            [ESC, tail @ ..] => Event::new(codes.to_vec(), None, Self::escape(tail)),
            _ => {
                let ch = Self::utf8(codes);
                let key = ch.map(|c| if c == ' ' { Key::Space } else { Key::Char(c) });
                Event::new(codes.to_vec(), ch, key)
            }
        }
    }
}

/// Split a raw read into per-keystroke sequences.
///
/// Recognizes CSI (`ESC [` ... final byte), SS3 (`ESC O` + one byte), a lone
/// ESC, ESC + one printable character (alt-modified keys), and UTF-8
/// characters. ESC followed by a control byte splits into two keystrokes. The
/// second value is `true` when the input ends inside an escape sequence, so
/// the caller can wait briefly for the remainder.
#[must_use]
pub fn split_sequences(bytes: &[u8]) -> (Vec<&[u8]>, bool) {
    let mut out = Vec::new();
    let mut i = 0;
    let mut incomplete = false;

    while i < bytes.len() {
        let len = if bytes[i] == 0x1b {
            match bytes.get(i + 1) {
                None => {
                    // Lone trailing ESC might be the start of a sequence.
                    incomplete = true;
                    1
                }
                Some(b'[') => {
                    // Parameters and intermediates run until a final byte 0x40..=0x7e.
                    match bytes[i + 2..].iter().position(|b| (0x40..=0x7e).contains(b)) {
                        Some(p) => p + 3,
                        None => {
                            incomplete = true;
                            bytes.len() - i
                        }
                    }
                }
                Some(b'O') => {
                    if i + 2 < bytes.len() {
                        3
                    } else {
                        incomplete = true;
                        2
                    }
                }
                // A control byte after ESC is its own keystroke.
                Some(&b) if b < 0x20 || b == 0x7f => 1,
                Some(&b) => 1 + utf8_len(b).min(bytes.len() - i - 1),
            }
        } else {
            utf8_len(bytes[i]).min(bytes.len() - i)
        };
        out.push(&bytes[i..i + len]);
        i += len;
    }

    (out, incomplete)
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xf0..=0xf7 => 4,
        0xe0..=0xef => 3,
        0xc0..=0xdf => 2,
        _ => 1,
    }
}
