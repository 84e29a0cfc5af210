//! Fixed-size cell canvas with alpha compositing.
//!
//! This module provides [`Canvas`], the drawing surface used by widgets and by
//! the frame loop. Canvases are 2D grids of cells that support:
//!
//! - **Basic drawing**: Set individual cells, fill rectangles, draw text
//! - **Compositing**: Blit one canvas onto another, optionally alpha-blended
//! - **Serialization**: Encode the grid as ANSI terminal text
//!
//! # Examples
//!
//! ```
//! use termstage::{Canvas, Cell, Rgb};
//!
//! let mut back = Canvas::new(20, 5);
//! back.clear_with(' ', Rgb::WHITE, Rgb::BLUE);
//!
//! let mut overlay = Canvas::new(6, 1);
//! overlay.draw_text(0, 0, "hello!", Rgb::YELLOW);
//! overlay.fill_alpha(200);
//!
//! back.blit(&overlay, 2, 2, true);
//! let frame = back.to_ansi();
//! assert!(frame.ends_with("\x1b[49m\x1b[39m"));
//! ```

mod rect;

pub use rect::{Insets, Rect};

use crate::ansi::{ColorMode, output};
use crate::cell::Cell;
use crate::color::Rgb;
use unicode_width::UnicodeWidthChar;

/// A `width x height` grid of [`Cell`]s.
///
/// # Coordinate System
///
/// Coordinates are (column, row) where (0, 0) is the top-left corner.
///
/// # Bounds
///
/// Dimensions never change after construction. Writes outside the grid are
/// clipped and never panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Canvas {
    /// Create a canvas filled with default cells.
    ///
    /// Zero dimensions are clamped to 1.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Cell::default())
    }

    /// Create a canvas filled with `cell`.
    #[must_use]
    pub fn filled(width: u32, height: u32, cell: Cell) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            cells: vec![cell; size],
        }
    }

    /// Get canvas dimensions.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get canvas width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get canvas height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole canvas as a rectangle at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    fn signed_index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.index(x, y)
    }

    /// Get a cell.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Get a mutable cell.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Overwrite a cell. Out-of-bounds positions are ignored.
    pub fn set(&mut self, x: u32, y: u32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Overwrite a cell at signed coordinates. Negative or out-of-bounds
    /// positions are ignored.
    pub fn set_at(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.signed_index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Overwrite every cell.
    pub fn clear(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Overwrite every cell with an opaque `ch` in the given colors.
    pub fn clear_with(&mut self, ch: char, fg: Rgb, bg: Rgb) {
        self.clear(Cell::new(ch, fg, bg));
    }

    /// Overwrite every cell inside `rect`, clipped to the canvas.
    pub fn fill_rect(&mut self, rect: Rect, cell: Cell) {
        self.for_each_in(rect, |c| *c = cell);
    }

    /// Set the background of every cell inside `rect`, keeping glyphs.
    pub fn fill_bg(&mut self, rect: Rect, bg: Rgb) {
        self.for_each_in(rect, |c| c.bg = bg);
    }

    /// Set the alpha of every cell.
    pub fn fill_alpha(&mut self, alpha: u8) {
        for cell in &mut self.cells {
            cell.alpha = alpha;
        }
    }

    fn for_each_in(&mut self, rect: Rect, mut f: impl FnMut(&mut Cell)) {
        let Some(clip) = rect.intersect(&self.bounds()) else {
            return;
        };
        let width = self.width as usize;
        // Intersection with bounds guarantees non-negative coordinates.
        let (x0, y0) = (clip.x as usize, clip.y as usize);
        for row in y0..y0 + clip.height as usize {
            let start = row * width + x0;
            for cell in &mut self.cells[start..start + clip.width as usize] {
                f(cell);
            }
        }
    }

    /// Draw `text` starting at `(x, y)` in color `fg`, keeping backgrounds.
    ///
    /// Wide characters take two columns (the second is blanked). Control and
    /// zero-width characters are skipped. Drawing stops at the right edge.
    /// Returns the number of columns written.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: Rgb) -> u32 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            let w = match ch.width() {
                Some(w) if w > 0 => w as u32,
                _ => continue,
            };
            if col.saturating_add(w) > self.width {
                break;
            }
            for (offset, glyph) in [(0, ch), (1, ' ')].into_iter().take(w as usize) {
                if let Some(cell) = self.get_mut(col + offset, y) {
                    cell.ch = glyph;
                    cell.fg = fg;
                }
            }
            col += w;
        }
        col - x
    }

    /// Composite `src` onto this canvas with its top-left at `(x, y)`.
    ///
    /// The copy is clipped to this canvas. Without alpha the source cells
    /// replace the destination outright. With alpha, each source cell
    /// replaces the destination glyph only when its alpha exceeds
    /// [`ALPHA_THRESHOLD`](crate::cell::ALPHA_THRESHOLD), while foreground and
    /// background always blend by that alpha.
    pub fn blit(&mut self, src: &Canvas, x: i32, y: i32, use_alpha: bool) {
        let target = Rect::new(x, y, src.width, src.height);
        let Some(clip) = target.intersect(&self.bounds()) else {
            return;
        };

        let dest_width = self.width as usize;
        let src_width = src.width as usize;
        let span = clip.width as usize;

        for dest_y in clip.y..clip.bottom() {
            // Both offsets are non-negative inside the clip.
            let sy = (dest_y - y) as usize;
            let sx = (clip.x - x) as usize;
            let src_start = sy * src_width + sx;
            let dest_start = dest_y as usize * dest_width + clip.x as usize;

            let src_row = &src.cells[src_start..src_start + span];
            let dest_row = &mut self.cells[dest_start..dest_start + span];

            if use_alpha {
                for (s, d) in src_row.iter().zip(dest_row.iter_mut()) {
                    s.composite_onto(d);
                }
            } else {
                dest_row.copy_from_slice(src_row);
            }
        }
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over `(x, y, cell)` in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u32;
            (i % width, i / width, cell)
        })
    }

    /// The characters of one row, for inspection.
    #[must_use]
    pub fn row_text(&self, y: u32) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = y as usize * self.width as usize;
        self.cells[start..start + self.width as usize]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    /// Serialize as true-color ANSI text.
    #[must_use]
    pub fn to_ansi(&self) -> String {
        self.to_ansi_with_mode(ColorMode::TrueColor)
    }

    /// Serialize as ANSI text in the given color mode.
    #[must_use]
    pub fn to_ansi_with_mode(&self, mode: ColorMode) -> String {
        output::serialize(self, mode)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ALPHA_THRESHOLD;

    // ============================================
    // Construction
    // ============================================

    #[test]
    fn test_new_clamps_zero_dimensions() {
        let canvas = Canvas::new(0, 0);
        assert_eq!(canvas.size(), (1, 1));
        assert_eq!(canvas.cells().len(), 1);
    }

    #[test]
    fn test_default_is_80x24() {
        assert_eq!(Canvas::default().size(), (80, 24));
    }

    // ============================================
    // Cell access
    // ============================================

    #[test]
    fn test_set_and_get() {
        let mut canvas = Canvas::new(4, 3);
        let cell = Cell::new('q', Rgb::RED, Rgb::BLUE);
        canvas.set(3, 2, cell);
        assert_eq!(canvas.get(3, 2), Some(&cell));
        assert_eq!(canvas.get(4, 2), None);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut canvas = Canvas::new(2, 2);
        let before = canvas.clone();
        canvas.set(2, 0, Cell::new('x', Rgb::RED, Rgb::RED));
        canvas.set_at(-1, 0, Cell::new('x', Rgb::RED, Rgb::RED));
        canvas.set_at(0, 5, Cell::new('x', Rgb::RED, Rgb::RED));
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_clear_with() {
        let mut canvas = Canvas::new(3, 2);
        canvas.clear_with('#', Rgb::GREEN, Rgb::BLACK);
        assert!(canvas.cells().iter().all(|c| c.ch == '#' && c.fg == Rgb::GREEN));
    }

    #[test]
    fn test_iter_cells_coordinates() {
        let canvas = Canvas::new(3, 2);
        let coords: Vec<_> = canvas.iter_cells().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    // ============================================
    // Rect fills
    // ============================================

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(Rect::new(-1, 2, 3, 10), Cell::new('x', Rgb::WHITE, Rgb::RED));
        assert_eq!(canvas.row_text(0), "    ");
        assert_eq!(canvas.row_text(2), "xx  ");
        assert_eq!(canvas.row_text(3), "xx  ");
    }

    #[test]
    fn test_fill_bg_keeps_glyphs() {
        let mut canvas = Canvas::new(2, 1);
        canvas.draw_text(0, 0, "ab", Rgb::WHITE);
        canvas.fill_bg(canvas.bounds(), Rgb::BLUE);
        assert_eq!(canvas.row_text(0), "ab");
        assert!(canvas.cells().iter().all(|c| c.bg == Rgb::BLUE));
    }

    // ============================================
    // Text
    // ============================================

    #[test]
    fn test_draw_text_basic() {
        let mut canvas = Canvas::new(6, 1);
        let written = canvas.draw_text(1, 0, "hey", Rgb::RED);
        assert_eq!(written, 3);
        assert_eq!(canvas.row_text(0), " hey  ");
        assert_eq!(canvas.get(1, 0).unwrap().fg, Rgb::RED);
    }

    #[test]
    fn test_draw_text_stops_at_edge() {
        let mut canvas = Canvas::new(3, 1);
        assert_eq!(canvas.draw_text(1, 0, "abcdef", Rgb::WHITE), 2);
        assert_eq!(canvas.row_text(0), " ab");
    }

    #[test]
    fn test_draw_text_wide_chars() {
        let mut canvas = Canvas::new(5, 1);
        canvas.draw_text(0, 0, "a中b", Rgb::WHITE);
        assert_eq!(canvas.row_text(0), "a中 b ");
        assert_eq!(canvas.get(2, 0).unwrap().ch, ' ');
        assert_eq!(canvas.get(3, 0).unwrap().ch, 'b');
    }

    #[test]
    fn test_draw_text_skips_controls() {
        let mut canvas = Canvas::new(3, 1);
        canvas.draw_text(0, 0, "a\tb", Rgb::WHITE);
        assert_eq!(canvas.row_text(0), "ab ");
    }

    #[test]
    fn test_draw_text_row_out_of_bounds() {
        let mut canvas = Canvas::new(3, 1);
        assert_eq!(canvas.draw_text(0, 1, "abc", Rgb::WHITE), 0);
    }

    // ============================================
    // Blit
    // ============================================

    #[test]
    fn test_blit_opaque_overwrites() {
        let mut dest = Canvas::new(4, 3);
        let src = Canvas::filled(2, 2, Cell::new('s', Rgb::RED, Rgb::BLUE));
        dest.blit(&src, 1, 1, false);
        assert_eq!(dest.row_text(0), "    ");
        assert_eq!(dest.row_text(1), " ss ");
        assert_eq!(dest.row_text(2), " ss ");
        assert_eq!(dest.get(1, 1).unwrap().bg, Rgb::BLUE);
    }

    #[test]
    fn test_blit_clips_negative_offset() {
        let mut dest = Canvas::new(3, 3);
        let mut src = Canvas::new(2, 2);
        src.draw_text(0, 0, "ab", Rgb::WHITE);
        src.draw_text(0, 1, "cd", Rgb::WHITE);
        dest.blit(&src, -1, -1, false);
        assert_eq!(dest.row_text(0), "d  ");
        assert_eq!(dest.row_text(1), "   ");
    }

    #[test]
    fn test_blit_entirely_outside_is_noop() {
        let mut dest = Canvas::new(3, 3);
        let before = dest.clone();
        let src = Canvas::filled(2, 2, Cell::new('s', Rgb::RED, Rgb::BLUE));
        dest.blit(&src, 3, 0, false);
        dest.blit(&src, -2, 0, true);
        assert_eq!(dest, before);
    }

    #[test]
    fn test_blit_alpha_threshold_controls_glyph() {
        let mut dest = Canvas::filled(2, 1, Cell::new('d', Rgb::BLACK, Rgb::BLACK));
        let mut src = Canvas::filled(2, 1, Cell::new('s', Rgb::WHITE, Rgb::WHITE));
        src.get_mut(0, 0).unwrap().alpha = ALPHA_THRESHOLD;
        src.get_mut(1, 0).unwrap().alpha = ALPHA_THRESHOLD + 1;
        dest.blit(&src, 0, 0, true);
        assert_eq!(dest.row_text(0), "ds");
        assert_eq!(dest.get(0, 0).unwrap().bg, Rgb::new(126, 126, 126));
        assert_eq!(dest.get(1, 0).unwrap().bg, Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_blit_without_alpha_ignores_alpha() {
        let mut dest = Canvas::new(1, 1);
        let src = Canvas::filled(1, 1, Cell::new('s', Rgb::RED, Rgb::BLUE).with_alpha(0));
        dest.blit(&src, 0, 0, false);
        assert_eq!(dest.get(0, 0).unwrap().ch, 's');
        assert_eq!(dest.get(0, 0).unwrap().bg, Rgb::BLUE);
    }
}
