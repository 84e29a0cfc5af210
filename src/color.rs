//! 24-bit RGB color type with integer alpha blending.
//!
//! This module provides the [`Rgb`] type used for cell foreground and
//! background colors. It supports:
//!
//! - **Color creation**: From u8 components or hex strings
//! - **Alpha blending**: Per-channel linear blend with an 8-bit alpha
//! - **Color conversion**: To 256-color and 16-color terminal palettes
//!
//! # Examples
//!
//! ```
//! use termstage::Rgb;
//!
//! let bg = Rgb::BLACK;
//! let accent = Rgb::from_hex("#1a1a2e").unwrap();
//!
//! // Half-way tint of the accent over the background
//! let tinted = Rgb::blend(bg, accent, 128);
//!
//! // Convert to terminal palette
//! let ansi_256 = tinted.to_256_color();
//! # let _ = ansi_256;
//! ```

use std::fmt;

/// Blend one channel: `dest * (1 - a/255) + src * (a/255)`, rounded to nearest.
///
/// Integer arithmetic keeps the result exact: alpha 0 always yields `dest`
/// and alpha 255 always yields `src`.
#[inline]
#[must_use]
pub const fn blend_channel(dest: u8, src: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    let mixed = dest as u32 * (255 - a) + src as u32 * a;
    ((mixed + 127) / 255) as u8
}

/// Opaque RGB color with u8 components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Red.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Blue.
    pub const BLUE: Self = Self::new(0, 0, 255);
    /// Yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0);
    /// Mid gray.
    pub const GRAY: Self = Self::new(128, 128, 128);

    /// Create a color from u8 components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (leading `#` optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    /// Blend `src` over `dest` with the given alpha, per channel.
    #[must_use]
    pub const fn blend(dest: Self, src: Self, alpha: u8) -> Self {
        Self {
            r: blend_channel(dest.r, src.r, alpha),
            g: blend_channel(dest.g, src.g, alpha),
            b: blend_channel(dest.b, src.b, alpha),
        }
    }

    /// Convert to the nearest 256-color palette index.
    #[must_use]
    pub fn to_256_color(self) -> u8 {
        let Self { r, g, b } = self;

        let gray = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
        let near_gray = |c: u8| (i16::from(c) - i16::from(gray)).abs() < 10;

        if near_gray(r) && near_gray(g) && near_gray(b) {
            // 232-255 is a 24-step ramp from dark to light
            let gray_idx = (u16::from(gray) * 24 / 256) as u8;
            return 232 + gray_idx.min(23);
        }

        16 + 36 * nearest_cube_index(r) + 6 * nearest_cube_index(g) + nearest_cube_index(b)
    }

    /// Convert to the nearest basic ANSI color (0-7 normal, 8-15 bright).
    #[must_use]
    pub fn to_16_color(self) -> u8 {
        #[rustfmt::skip]
        const PALETTE: [(i32, i32, i32); 16] = [
            (0, 0, 0),       // 0 Black
            (128, 0, 0),     // 1 Red
            (0, 128, 0),     // 2 Green
            (128, 128, 0),   // 3 Yellow
            (0, 0, 128),     // 4 Blue
            (128, 0, 128),   // 5 Magenta
            (0, 128, 128),   // 6 Cyan
            (192, 192, 192), // 7 White
            (128, 128, 128), // 8 Bright Black
            (255, 0, 0),     // 9 Bright Red
            (0, 255, 0),     // 10 Bright Green
            (255, 255, 0),   // 11 Bright Yellow
            (0, 0, 255),     // 12 Bright Blue
            (255, 0, 255),   // 13 Bright Magenta
            (0, 255, 255),   // 14 Bright Cyan
            (255, 255, 255), // 15 Bright White
        ];

        let (r, g, b) = (i32::from(self.r), i32::from(self.g), i32::from(self.b));

        PALETTE
            .iter()
            .enumerate()
            .min_by_key(|(_, (pr, pg, pb))| {
                let (dr, dg, db) = (r - pr, g - pg, b - pb);
                dr * dr + dg * dg + db * db
            })
            .map_or(0, |(i, _)| i as u8)
    }
}

// Cube levels are 0, 95, 135, 175, 215, 255; boundaries are the midpoints.
fn nearest_cube_index(val: u8) -> u8 {
    match val {
        0..48 => 0,
        48..115 => 1,
        115..155 => 2,
        155..195 => 3,
        195..235 => 4,
        _ => 5,
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
