//! Terminal cell type.
//!
//! A [`Cell`] is one character position: a glyph, a foreground color, a
//! background color, and an 8-bit alpha used when the cell is composited onto
//! another canvas.

use crate::color::Rgb;

/// Source alpha must exceed this value for a blit to copy the glyph.
///
/// Colors are blended at every alpha; only the character is thresholded.
pub const ALPHA_THRESHOLD: u8 = 126;

/// A single terminal cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Displayed character.
    pub ch: char,
    /// Foreground (glyph) color.
    pub fg: Rgb,
    /// Background color.
    pub bg: Rgb,
    /// Opacity used by alpha blits (255 = opaque).
    pub alpha: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
            alpha: 255,
        }
    }
}

impl Cell {
    /// Create an opaque cell.
    #[must_use]
    pub const fn new(ch: char, fg: Rgb, bg: Rgb) -> Self {
        Self {
            ch,
            fg,
            bg,
            alpha: 255,
        }
    }

    /// Create a blank cell with the given background.
    #[must_use]
    pub const fn blank(bg: Rgb) -> Self {
        Self::new(' ', Rgb::WHITE, bg)
    }

    /// Return a copy with a different alpha.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: u8) -> Self {
        self.alpha = alpha;
        self
    }

    /// Whether an alpha blit of this cell replaces the destination glyph.
    #[must_use]
    pub const fn is_glyph_visible(&self) -> bool {
        self.alpha > ALPHA_THRESHOLD
    }

    /// Composite `self` onto `dest` using `self.alpha`.
    ///
    /// Colors blend at any alpha. The glyph is replaced only when the cell is
    /// visible. The destination keeps its own alpha.
    pub fn composite_onto(&self, dest: &mut Cell) {
        if self.is_glyph_visible() {
            dest.ch = self.ch;
        }
        dest.fg = Rgb::blend(dest.fg, self.fg, self.alpha);
        dest.bg = Rgb::blend(dest.bg, self.bg, self.alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cell() {
        let cell = Cell::default();
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.alpha, 255);
        assert_eq!(cell.bg, Rgb::BLACK);
    }

    #[test]
    fn test_glyph_visibility_threshold() {
        let cell = Cell::new('x', Rgb::WHITE, Rgb::BLACK);
        assert!(cell.with_alpha(127).is_glyph_visible());
        assert!(!cell.with_alpha(126).is_glyph_visible());
        assert!(!cell.with_alpha(0).is_glyph_visible());
    }

    #[test]
    fn test_composite_opaque_replaces() {
        let src = Cell::new('A', Rgb::RED, Rgb::BLUE);
        let mut dest = Cell::new('z', Rgb::WHITE, Rgb::BLACK);
        src.composite_onto(&mut dest);
        assert_eq!(dest.ch, 'A');
        assert_eq!(dest.fg, Rgb::RED);
        assert_eq!(dest.bg, Rgb::BLUE);
    }

    #[test]
    fn test_composite_faint_keeps_glyph_but_tints() {
        let src = Cell::new('A', Rgb::WHITE, Rgb::WHITE).with_alpha(51);
        let mut dest = Cell::new('z', Rgb::BLACK, Rgb::BLACK);
        src.composite_onto(&mut dest);
        assert_eq!(dest.ch, 'z');
        assert_eq!(dest.bg, Rgb::new(51, 51, 51));
        assert_eq!(dest.fg, Rgb::new(51, 51, 51));
    }

    #[test]
    fn test_composite_transparent_is_noop() {
        let src = Cell::new('A', Rgb::RED, Rgb::BLUE).with_alpha(0);
        let before = Cell::new('z', Rgb::GREEN, Rgb::GRAY);
        let mut dest = before;
        src.composite_onto(&mut dest);
        assert_eq!(dest, before);
    }
}
