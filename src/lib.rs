//! `termstage` - cell canvases, focus-navigable widgets and a threaded frame
//! loop for terminal applications.
//!
//! The crate is layered leaf first:
//!
//! - [`color`], [`cell`] and [`canvas`]: RGB cells, alpha compositing and
//!   text drawing on fixed-size grids
//! - [`ansi`]: frame serialization to terminal escape sequences
//! - [`widget`]: double-buffered widgets, selection styles and the
//!   [`Navigator`] focus state machine
//! - [`runtime`]: the [`FrameLoop`] running compose, update and input loops
//! - [`input`] and [`terminal`]: keystroke decoding and terminal setup
//!
//! The library logs through `tracing` and never installs a subscriber.

// Crate-level lint configuration
#![warn(unsafe_code)] // Unsafe code needs justification (required for termios FFI)
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Intentional for color math
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow widget::WidgetCore etc
#![allow(clippy::struct_excessive_bools)] // Widget and terminal state need multiple flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod ansi;
pub mod canvas;
pub mod cell;
pub mod color;
pub mod error;
pub mod input;
pub mod runtime;
pub mod terminal;
pub mod widget;

// Re-export core types at crate root
pub use canvas::{Canvas, Insets, Rect};
pub use cell::{ALPHA_THRESHOLD, Cell};
pub use color::Rgb;
pub use error::{Error, LoopStage, Result};

// Re-export input types
pub use input::{Direction, Event, EventSource, Input, Key, KeyBindings, KeyDecoder, VtDecoder};

// Re-export ANSI types
pub use ansi::{ColorMode, FrameWriter};

// Re-export widget and runtime types
pub use runtime::{FrameClock, FrameLoop, LoopConfig, LoopHandle, LoopKeys, LoopStats, WidgetId};
pub use terminal::{RawModeGuard, Terminal, TerminalOptions, enable_raw_mode, is_tty, terminal_size};
pub use widget::{
    ChildId, EventResult, FocusStatus, NavState, Navigator, Panel, Selection, Widget, WidgetCore,
    WidgetExt,
};
