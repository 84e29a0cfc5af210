//! Terminal output state and raw-mode input plumbing.

mod raw;

pub use raw::{RawModeGuard, enable_raw_mode, is_tty, poll_readable, read_fd, terminal_size};

use crate::ansi::sequences;
use std::io::{self, Write};

/// What the frame loop does to the terminal at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalOptions {
    /// Switch to the alternate screen buffer.
    pub alt_screen: bool,
    /// Hide the cursor while frames are drawn.
    pub hide_cursor: bool,
    /// Clear the screen before the first frame.
    pub clear_on_start: bool,
    /// Ask the terminal to resize its text area to the canvas size.
    pub request_resize: bool,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            alt_screen: true,
            hide_cursor: true,
            clear_on_start: true,
            request_resize: true,
        }
    }
}

impl TerminalOptions {
    /// Touch nothing: no alternate screen, cursor, clear or resize.
    #[must_use]
    pub fn passive() -> Self {
        Self {
            alt_screen: false,
            hide_cursor: false,
            clear_on_start: false,
            request_resize: false,
        }
    }
}

/// Terminal state manager over an output stream.
///
/// Tracks what has been switched on so that [`cleanup`](Self::cleanup) (also
/// run on drop) only undoes what was done.
pub struct Terminal<W: Write> {
    writer: W,
    alt_screen: bool,
    cursor_hidden: bool,
}

impl<W: Write> Terminal<W> {
    /// Create a new terminal with the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            alt_screen: false,
            cursor_hidden: false,
        }
    }

    /// Apply startup options for a `cols x rows` canvas.
    pub fn setup(&mut self, options: &TerminalOptions, cols: u32, rows: u32) -> io::Result<()> {
        if options.request_resize {
            self.writer
                .write_all(sequences::resize_text_area(cols, rows).as_bytes())?;
        }
        if options.alt_screen {
            self.enter_alt_screen()?;
        }
        if options.hide_cursor {
            self.hide_cursor()?;
        }
        if options.clear_on_start {
            self.clear()?;
        }
        self.flush()
    }

    /// Direct access to the output stream for frame writes.
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Enter alternate screen buffer.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if !self.alt_screen {
            self.writer.write_all(sequences::ALT_SCREEN_ON.as_bytes())?;
            self.alt_screen = true;
        }
        Ok(())
    }

    /// Leave alternate screen buffer.
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        if self.alt_screen {
            self.writer
                .write_all(sequences::ALT_SCREEN_OFF.as_bytes())?;
            self.alt_screen = false;
        }
        Ok(())
    }

    /// Hide cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_HIDE.as_bytes())?;
            self.cursor_hidden = true;
        }
        Ok(())
    }

    /// Show cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_SHOW.as_bytes())?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Clear the screen and home the cursor.
    pub fn clear(&mut self) -> io::Result<()> {
        self.writer.write_all(sequences::CLEAR_SCREEN.as_bytes())?;
        self.writer.write_all(sequences::CURSOR_HOME.as_bytes())
    }

    /// Flush the output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Restore cursor and screen, then reset attributes.
    pub fn cleanup(&mut self) -> io::Result<()> {
        self.show_cursor()?;
        self.leave_alt_screen()?;
        self.writer.write_all(sequences::RESET.as_bytes())?;
        self.flush()
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_basic() {
        let terminal = Terminal::new(Vec::new());
        assert!(!terminal.alt_screen);
        assert!(!terminal.cursor_hidden);
    }

    #[test]
    fn test_setup_writes_requested_sequences() {
        let mut output = Vec::new();
        {
            let mut terminal = Terminal::new(&mut output);
            terminal.setup(&TerminalOptions::default(), 80, 24).unwrap();
        }
        let s = String::from_utf8_lossy(&output);
        assert!(s.starts_with("\x1b[8;24;80t\x1b[?1049h\x1b[?25l\x1b[2J\x1b[H"));
        // Drop undoes both
        assert!(s.contains("\x1b[?25h"));
        assert!(s.ends_with("\x1b[?1049l\x1b[0m"));
    }

    #[test]
    fn test_passive_setup_writes_nothing() {
        let mut terminal = Terminal::new(Vec::new());
        terminal.setup(&TerminalOptions::passive(), 10, 10).unwrap();
        assert!(terminal.writer_mut().is_empty());
    }

    #[test]
    fn test_cleanup_only_undoes_what_was_done() {
        let mut terminal = Terminal::new(Vec::new());
        terminal.cleanup().unwrap();
        assert_eq!(terminal.writer_mut().as_slice(), b"\x1b[0m");
    }

    #[test]
    fn test_alt_screen_is_idempotent() {
        let mut terminal = Terminal::new(Vec::new());
        terminal.enter_alt_screen().unwrap();
        terminal.enter_alt_screen().unwrap();
        let s = String::from_utf8_lossy(terminal.writer_mut()).into_owned();
        assert_eq!(s.matches("\x1b[?1049h").count(), 1);
    }
}
