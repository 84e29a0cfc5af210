//! Focus feedback styles.
//!
//! A [`Selection`] paints a widget's focus state into its buffer canvas after
//! the widget's own content. Each of the three visuals can be switched off
//! separately, e.g. to keep the selected highlight but skip the hover one.
//!
//! A style may also reserve edge space ([`SelectionStyle::content_insets`]);
//! the widget core shrinks its content rectangle by that much when the
//! selection is attached.

use crate::canvas::{Canvas, Insets, Rect};
use crate::color::Rgb;
use crate::widget::FocusStatus;
use bitflags::bitflags;

bitflags! {
    /// Which focus visuals are drawn.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Visuals: u8 {
        /// Visual for the outlined (unfocused) state.
        const DEFAULT = 0b001;
        /// Visual for the hovered state.
        const HOVER = 0b010;
        /// Visual for the selected state.
        const SELECTED = 0b100;
    }
}

impl Default for Visuals {
    fn default() -> Self {
        Self::all()
    }
}

impl Visuals {
    /// The flag that gates painting for `status`.
    #[must_use]
    pub const fn for_status(status: FocusStatus) -> Self {
        match status {
            FocusStatus::Outlined => Self::DEFAULT,
            FocusStatus::Hovered => Self::HOVER,
            FocusStatus::Selected => Self::SELECTED,
        }
    }
}

bitflags! {
    /// Edges painted by a [`BorderSelection`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BorderSides: u8 {
        const TOP = 0b0001;
        const RIGHT = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT = 0b1000;
    }
}

/// How a widget shows its focus state.
pub trait SelectionStyle: Send {
    /// Paint the outlined state.
    fn paint_default(&self, _canvas: &mut Canvas) {}

    /// Paint the hovered state.
    fn paint_hover(&self, _canvas: &mut Canvas) {}

    /// Paint the selected state.
    fn paint_selected(&self, _canvas: &mut Canvas) {}

    /// Edge space reserved on a widget of `width x height`.
    fn content_insets(&self, _width: u32, _height: u32) -> Insets {
        Insets::ZERO
    }
}

/// A selection style plus its visual toggles.
pub struct Selection {
    style: Box<dyn SelectionStyle>,
    visuals: Visuals,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(PlainSelection)
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("visuals", &self.visuals)
            .finish_non_exhaustive()
    }
}

impl Selection {
    /// Wrap a style with every visual enabled.
    pub fn new(style: impl SelectionStyle + 'static) -> Self {
        Self {
            style: Box::new(style),
            visuals: Visuals::all(),
        }
    }

    /// Replace the visual toggles.
    #[must_use]
    pub fn with_visuals(mut self, visuals: Visuals) -> Self {
        self.visuals = visuals;
        self
    }

    /// Current visual toggles.
    #[must_use]
    pub fn visuals(&self) -> Visuals {
        self.visuals
    }

    /// Turn individual visuals on or off.
    pub fn set_visible(&mut self, visuals: Visuals, on: bool) {
        self.visuals.set(visuals, on);
    }

    /// Paint the visual for `status` if it is enabled.
    pub fn paint(&self, status: FocusStatus, canvas: &mut Canvas) {
        if self.visuals.contains(Visuals::for_status(status)) {
            self.paint_forced(status, canvas);
        }
    }

    /// Paint the visual for `status` regardless of the toggles.
    pub fn paint_forced(&self, status: FocusStatus, canvas: &mut Canvas) {
        match status {
            FocusStatus::Outlined => self.style.paint_default(canvas),
            FocusStatus::Hovered => self.style.paint_hover(canvas),
            FocusStatus::Selected => self.style.paint_selected(canvas),
        }
    }

    /// Edge space reserved by the style.
    #[must_use]
    pub fn content_insets(&self, width: u32, height: u32) -> Insets {
        self.style.content_insets(width, height)
    }
}

/// Draws nothing and reserves nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainSelection;

impl SelectionStyle for PlainSelection {}

/// Paints the whole background in a per-state color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillSelection {
    pub selected: Rgb,
    pub hover: Rgb,
    pub default: Rgb,
}

impl Default for FillSelection {
    fn default() -> Self {
        Self {
            selected: Rgb::new(0, 255, 0),
            hover: Rgb::new(200, 200, 0),
            default: Rgb::new(0, 0, 0),
        }
    }
}

impl SelectionStyle for FillSelection {
    fn paint_default(&self, canvas: &mut Canvas) {
        canvas.fill_bg(canvas.bounds(), self.default);
    }

    fn paint_hover(&self, canvas: &mut Canvas) {
        canvas.fill_bg(canvas.bounds(), self.hover);
    }

    fn paint_selected(&self, canvas: &mut Canvas) {
        canvas.fill_bg(canvas.bounds(), self.selected);
    }
}

/// Paints a colored border on some edges and keeps content inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderSelection {
    pub sides: BorderSides,
    /// Painted thickness of each edge.
    pub width: u32,
    /// Content inset on each bordered edge.
    pub inset: u32,
    pub selected: Rgb,
    pub hover: Rgb,
    pub default: Rgb,
}

impl Default for BorderSelection {
    fn default() -> Self {
        let fill = FillSelection::default();
        Self {
            sides: BorderSides::all(),
            width: 1,
            inset: 1,
            selected: fill.selected,
            hover: fill.hover,
            default: fill.default,
        }
    }
}

impl BorderSelection {
    /// A one-cell border on every edge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the border to `sides`.
    #[must_use]
    pub fn sides(mut self, sides: BorderSides) -> Self {
        self.sides = sides;
        self
    }

    /// Set painted thickness and content inset together.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self.inset = width;
        self
    }

    /// Set the content inset independently of the painted thickness.
    #[must_use]
    pub fn inset(mut self, inset: u32) -> Self {
        self.inset = inset;
        self
    }

    /// Set the three state colors.
    #[must_use]
    pub fn colors(mut self, selected: Rgb, hover: Rgb, default: Rgb) -> Self {
        self.selected = selected;
        self.hover = hover;
        self.default = default;
        self
    }

    fn paint_edges(&self, canvas: &mut Canvas, color: Rgb) {
        let (w, h) = canvas.size();
        let t = self.width;
        let edges = [
            (BorderSides::TOP, Rect::new(0, 0, w, t)),
            (BorderSides::BOTTOM, Rect::new(0, h.saturating_sub(t) as i32, w, t)),
            (BorderSides::LEFT, Rect::new(0, 0, t, h)),
            (BorderSides::RIGHT, Rect::new(w.saturating_sub(t) as i32, 0, t, h)),
        ];
        for (side, rect) in edges {
            if self.sides.contains(side) {
                canvas.fill_bg(rect, color);
            }
        }
    }
}

impl SelectionStyle for BorderSelection {
    fn paint_default(&self, canvas: &mut Canvas) {
        self.paint_edges(canvas, self.default);
    }

    fn paint_hover(&self, canvas: &mut Canvas) {
        self.paint_edges(canvas, self.hover);
    }

    fn paint_selected(&self, canvas: &mut Canvas) {
        self.paint_edges(canvas, self.selected);
    }

    fn content_insets(&self, _width: u32, _height: u32) -> Insets {
        let edge = |side| if self.sides.contains(side) { self.inset } else { 0 };
        Insets::new(
            edge(BorderSides::TOP),
            edge(BorderSides::RIGHT),
            edge(BorderSides::BOTTOM),
            edge(BorderSides::LEFT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn bg_rows(canvas: &Canvas, color: Rgb) -> Vec<String> {
        (0..canvas.height())
            .map(|y| {
                (0..canvas.width())
                    .map(|x| if canvas.get(x, y).unwrap().bg == color { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_fill_paints_everything() {
        let mut canvas = Canvas::new(3, 2);
        canvas.draw_text(0, 0, "abc", Rgb::WHITE);
        let sel = Selection::new(FillSelection::default());
        sel.paint(FocusStatus::Hovered, &mut canvas);
        assert!(canvas.cells().iter().all(|c| c.bg == Rgb::new(200, 200, 0)));
        assert_eq!(canvas.row_text(0), "abc");
    }

    #[test]
    fn test_disabled_visual_is_skipped() {
        let mut canvas = Canvas::filled(2, 2, Cell::blank(Rgb::BLUE));
        let sel = Selection::new(FillSelection::default()).with_visuals(Visuals::SELECTED);
        sel.paint(FocusStatus::Hovered, &mut canvas);
        assert!(canvas.cells().iter().all(|c| c.bg == Rgb::BLUE));

        sel.paint_forced(FocusStatus::Hovered, &mut canvas);
        assert!(canvas.cells().iter().all(|c| c.bg == Rgb::new(200, 200, 0)));
    }

    #[test]
    fn test_set_visible_toggles() {
        let mut sel = Selection::default();
        sel.set_visible(Visuals::HOVER, false);
        assert_eq!(sel.visuals(), Visuals::DEFAULT | Visuals::SELECTED);
        sel.set_visible(Visuals::HOVER, true);
        assert_eq!(sel.visuals(), Visuals::all());
    }

    #[test]
    fn test_border_paints_full_thickness() {
        let mut canvas = Canvas::filled(5, 4, Cell::blank(Rgb::BLUE));
        let sel = Selection::new(BorderSelection::new());
        sel.paint(FocusStatus::Selected, &mut canvas);
        assert_eq!(
            bg_rows(&canvas, Rgb::GREEN),
            vec!["#####", "#...#", "#...#", "#####"]
        );
    }

    #[test]
    fn test_border_subset_and_width() {
        let mut canvas = Canvas::filled(5, 5, Cell::blank(Rgb::BLUE));
        let style = BorderSelection::new()
            .sides(BorderSides::TOP | BorderSides::RIGHT)
            .width(2);
        Selection::new(style).paint(FocusStatus::Outlined, &mut canvas);
        assert_eq!(
            bg_rows(&canvas, Rgb::BLACK),
            vec!["#####", "#####", "...##", "...##", "...##"]
        );
        assert_eq!(style.content_insets(5, 5), Insets::new(2, 2, 0, 0));
    }

    #[test]
    fn test_border_inset_independent_of_width() {
        let style = BorderSelection::new().width(1).inset(2);
        assert_eq!(style.content_insets(10, 10), Insets::uniform(2));
    }

    #[test]
    fn test_plain_reserves_nothing() {
        let sel = Selection::default();
        assert_eq!(sel.content_insets(4, 4), Insets::ZERO);
        let mut canvas = Canvas::new(2, 2);
        let before = canvas.clone();
        sel.paint(FocusStatus::Selected, &mut canvas);
        assert_eq!(canvas, before);
    }
}
