//! Frame serialization with color state tracking.

use crate::ansi::{self, ColorMode, sequences};
use crate::canvas::Canvas;
use crate::color::Rgb;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

/// Serializes canvases into terminal text, emitting color escapes only on change.
///
/// The writer keeps its byte buffer between frames so steady-state rendering
/// does not allocate.
#[derive(Debug)]
pub struct FrameWriter {
    buffer: Vec<u8>,

    color_mode: ColorMode,

    // Current state for delta encoding
    current_fg: Option<Rgb>,
    current_bg: Option<Rgb>,
}

impl Default for FrameWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameWriter {
    /// Create a true-color writer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_color_mode(ColorMode::TrueColor)
    }

    /// Create a writer with specified color mode.
    #[must_use]
    pub fn with_color_mode(color_mode: ColorMode) -> Self {
        Self {
            buffer: Vec::with_capacity(8192),
            color_mode,
            current_fg: None,
            current_bg: None,
        }
    }

    /// Get the current color output mode.
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Forget the tracked colors so the next cell emits both escapes.
    pub fn reset_state(&mut self) {
        self.current_fg = None;
        self.current_bg = None;
    }

    fn set_fg(&mut self, color: Rgb) {
        if self.current_fg != Some(color) {
            let _ = ansi::write_fg_color_with_mode(&mut self.buffer, color, self.color_mode);
            self.current_fg = Some(color);
        }
    }

    fn set_bg(&mut self, color: Rgb) {
        if self.current_bg != Some(color) {
            let _ = ansi::write_bg_color_with_mode(&mut self.buffer, color, self.color_mode);
            self.current_bg = Some(color);
        }
    }

    fn push_char(&mut self, ch: char) {
        // Control characters would be interpreted by the terminal.
        let ch = if ch.is_control() { ' ' } else { ch };
        let mut utf8 = [0u8; 4];
        self.buffer
            .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Serialize `canvas` into the internal buffer and return the bytes.
    ///
    /// Rows are separated by `\r\n`; the frame ends with the background and
    /// foreground default resets. The cell after a wide glyph is skipped,
    /// since the terminal already advanced over it.
    pub fn encode(&mut self, canvas: &Canvas) -> &[u8] {
        self.buffer.clear();
        self.reset_state();

        let width = canvas.width() as usize;
        for (row, cells) in canvas.cells().chunks(width).enumerate() {
            if row > 0 {
                self.buffer.extend_from_slice(sequences::ROW_BREAK.as_bytes());
            }
            let mut covered = false;
            for cell in cells {
                if std::mem::take(&mut covered) {
                    continue;
                }
                self.set_fg(cell.fg);
                self.set_bg(cell.bg);
                self.push_char(cell.ch);
                covered = cell.ch.width() == Some(2);
            }
        }

        self.buffer
            .extend_from_slice(sequences::color::BG_DEFAULT.as_bytes());
        self.buffer
            .extend_from_slice(sequences::color::FG_DEFAULT.as_bytes());
        &self.buffer
    }

    /// Home the cursor and write one full frame to `out`.
    pub fn write_frame<W: Write>(&mut self, canvas: &Canvas, out: &mut W) -> io::Result<()> {
        out.write_all(sequences::CURSOR_HOME.as_bytes())?;
        let bytes = self.encode(canvas);
        out.write_all(bytes)?;
        out.flush()
    }
}

/// Serialize a canvas to a string in the given color mode.
#[must_use]
pub fn serialize(canvas: &Canvas, mode: ColorMode) -> String {
    let mut writer = FrameWriter::with_color_mode(mode);
    String::from_utf8_lossy(writer.encode(canvas)).into_owned()
}
