//! Keyboard input: decoding, key bindings and event sources.
//!
//! Raw terminal bytes are cut into keystrokes and decoded by a [`KeyDecoder`]
//! into [`Event`]s carrying the raw codes, the printable character, and a
//! canonical [`Key`]. The frame loop pulls events from an [`EventSource`].

mod bindings;
mod decoder;
mod key;
mod source;

pub use bindings::{Direction, KeyBindings, NavAction};
pub use decoder::{ESC, KeyDecoder, VtDecoder, split_sequences};
pub use key::{Event, Key};
pub use source::{ChannelEvents, EventSender, EventSource, Input, TerminalEvents, channel};
