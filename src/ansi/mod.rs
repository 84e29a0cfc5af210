//! ANSI escape sequence generation.

pub mod output;
pub mod sequences;

pub use output::FrameWriter;
pub use sequences::*;

use crate::color::Rgb;
use std::env;
use std::io::{self, Write};

/// Color output mode for ANSI sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// True color (24-bit RGB).
    #[default]
    TrueColor,
    /// 256-color palette.
    Color256,
    /// 16-color (basic ANSI).
    Color16,
    /// No color output.
    NoColor,
}

impl ColorMode {
    /// Pick a mode from `NO_COLOR`, `COLORTERM` and `TERM`.
    #[must_use]
    pub fn detect() -> Self {
        if env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return Self::NoColor;
        }
        let term = env::var("TERM").unwrap_or_default();
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        Self::from_env_values(&term, &colorterm)
    }

    fn from_env_values(term: &str, colorterm: &str) -> Self {
        if colorterm.eq_ignore_ascii_case("truecolor") || colorterm.eq_ignore_ascii_case("24bit") {
            return Self::TrueColor;
        }
        if term.contains("truecolor") || term.contains("24bit") || term.contains("direct") {
            return Self::TrueColor;
        }
        if term.contains("256") {
            return Self::Color256;
        }
        if term.is_empty() || term == "dumb" {
            return Self::NoColor;
        }
        Self::Color16
    }
}

/// Generate SGR (Select Graphic Rendition) sequence for foreground color.
#[must_use]
pub fn fg_color(color: Rgb) -> String {
    fg_color_with_mode(color, ColorMode::TrueColor)
}

/// Generate SGR sequence for background color.
#[must_use]
pub fn bg_color(color: Rgb) -> String {
    bg_color_with_mode(color, ColorMode::TrueColor)
}

/// Generate SGR sequence for foreground color with specified color mode.
#[must_use]
pub fn fg_color_with_mode(color: Rgb, mode: ColorMode) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_fg_color_with_mode(&mut buf, color, mode);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Generate SGR sequence for background color with specified color mode.
#[must_use]
pub fn bg_color_with_mode(color: Rgb, mode: ColorMode) -> String {
    let mut buf = Vec::new();
    let _ = write_bg_color_with_mode(&mut buf, color, mode);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a u8 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

/// Layer selector for SGR color parameters.
#[derive(Clone, Copy)]
enum Layer {
    Fg,
    Bg,
}

impl Layer {
    const fn extended(self) -> &'static [u8] {
        match self {
            Self::Fg => b"\x1b[38;",
            Self::Bg => b"\x1b[48;",
        }
    }

    // 30-37 / 90-97 for fg, 40-47 / 100-107 for bg
    const fn basic_code(self, idx: u8) -> u8 {
        let (normal, bright) = match self {
            Self::Fg => (30, 90),
            Self::Bg => (40, 100),
        };
        if idx < 8 { normal + idx } else { bright + idx - 8 }
    }
}

fn write_color(w: &mut impl Write, color: Rgb, mode: ColorMode, layer: Layer) -> io::Result<()> {
    match mode {
        ColorMode::TrueColor => {
            w.write_all(layer.extended())?;
            w.write_all(b"2;")?;
            write_u8_decimal(w, color.r)?;
            w.write_all(b";")?;
            write_u8_decimal(w, color.g)?;
            w.write_all(b";")?;
            write_u8_decimal(w, color.b)?;
            w.write_all(b"m")
        }
        ColorMode::Color256 => {
            w.write_all(layer.extended())?;
            w.write_all(b"5;")?;
            write_u8_decimal(w, color.to_256_color())?;
            w.write_all(b"m")
        }
        ColorMode::Color16 => {
            w.write_all(b"\x1b[")?;
            write_u8_decimal(w, layer.basic_code(color.to_16_color()))?;
            w.write_all(b"m")
        }
        ColorMode::NoColor => Ok(()),
    }
}

/// Write SGR sequence for foreground color to a writer.
pub fn write_fg_color_with_mode(w: &mut impl Write, color: Rgb, mode: ColorMode) -> io::Result<()> {
    write_color(w, color, mode, Layer::Fg)
}

/// Write SGR sequence for background color to a writer.
pub fn write_bg_color_with_mode(w: &mut impl Write, color: Rgb, mode: ColorMode) -> io::Result<()> {
    write_color(w, color, mode, Layer::Bg)
}
