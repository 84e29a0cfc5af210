//! Error types for termstage.

use std::fmt;
use std::io;

/// Result type alias for termstage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The loop in which a fatal failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStage {
    /// Frame composition and terminal output.
    Compose,
    /// Per-frame widget updates.
    Update,
    /// Event dispatch on the controlling thread.
    Input,
}

impl fmt::Display for LoopStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compose => "compose",
            Self::Update => "update",
            Self::Input => "input",
        };
        f.write_str(name)
    }
}

/// Error type for termstage operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from terminal or event source operations.
    Io(io::Error),
    /// Connection direction symbol other than `U`, `D`, `L`, `R`.
    InvalidDirection(String),
    /// A screen with this name is already registered.
    DuplicateScreen(String),
    /// No screen registered under this name.
    UnknownScreen(String),
    /// No top-level widget with this id.
    UnknownWidget(u64),
    /// The widget is locked by another loop or hook.
    WidgetBusy(u64),
    /// No child with this index in the navigator.
    UnknownChild(usize),
    /// A widget hook panicked inside one of the frame loops.
    LoopPanicked { stage: LoopStage, message: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidDirection(s) => {
                write!(f, "invalid connection direction {s:?} (expected U, D, L or R)")
            }
            Self::DuplicateScreen(name) => write!(f, "screen {name:?} is already registered"),
            Self::UnknownScreen(name) => write!(f, "no screen named {name:?}"),
            Self::UnknownWidget(id) => write!(f, "no widget with id {id}"),
            Self::WidgetBusy(id) => write!(f, "widget {id} is busy"),
            Self::UnknownChild(index) => write!(f, "no navigator child at index {index}"),
            Self::LoopPanicked { stage, message } => {
                write!(f, "{stage} loop panicked: {message}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDirection("X".to_string());
        assert!(err.to_string().contains("invalid connection direction"));

        let err = Error::DuplicateScreen("menu".to_string());
        assert!(err.to_string().contains("\"menu\""));

        let err = Error::UnknownWidget(42);
        assert!(err.to_string().contains("42"));
        assert_eq!(Error::WidgetBusy(7).to_string(), "widget 7 is busy");

        let err = Error::LoopPanicked {
            stage: LoopStage::Update,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "update loop panicked: boom");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
