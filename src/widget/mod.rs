//! Double-buffered, focusable widgets.
//!
//! A widget is split in two:
//!
//! - [`WidgetCore`] holds the state every widget shares: position, the two
//!   canvases, focus status, selection style, an optional [`Navigator`] over
//!   child widgets and a few flags.
//! - [`Widget`] is the behaviour. Implementors hand out their core and
//!   override whichever hooks they need; every hook has a no-op default.
//!
//! The lifecycle drivers (drawing, event dispatch, focus transitions) live in
//! [`WidgetExt`], which is implemented for every widget, boxed or not.
//!
//! # Drawing
//!
//! [`WidgetExt::draw`] runs one frame for a widget:
//!
//! 1. clear the buffer canvas with the background cell
//! 2. [`Widget::render`] into the buffer
//! 3. paint the selection visual for the current focus status
//! 4. [`Widget::after_selection`]
//! 5. swap buffer and active canvas
//! 6. blit the active canvas onto the destination
//!
//! Readers of [`WidgetCore::active`] therefore only ever see whole frames.
//!
//! # Example
//!
//! ```
//! use termstage::widget::{EventResult, Widget, WidgetCore, WidgetExt};
//! use termstage::{Canvas, Event, Key, Rgb};
//!
//! struct Label {
//!     core: WidgetCore,
//!     text: String,
//! }
//!
//! impl Widget for Label {
//!     fn core(&self) -> &WidgetCore {
//!         &self.core
//!     }
//!     fn core_mut(&mut self) -> &mut WidgetCore {
//!         &mut self.core
//!     }
//!     fn render(&mut self) {
//!         self.core.draw_text(0, 0, &self.text, Rgb::WHITE);
//!     }
//! }
//!
//! let mut label = Label { core: WidgetCore::new(1, 1, 5, 1), text: "hi".into() };
//! let mut screen = Canvas::new(8, 3);
//! label.draw(&mut screen, (0, 0));
//! assert_eq!(screen.row_text(1), " hi     ");
//! assert_eq!(label.handle_event(&Event::key(Key::Escape)), EventResult::Exit);
//! ```

pub mod navigator;
mod panel;
pub mod selection;

pub use navigator::{ChildId, NavState, Navigator};
pub use panel::Panel;
pub use selection::{
    BorderSelection, BorderSides, FillSelection, PlainSelection, Selection, SelectionStyle,
    Visuals,
};

use crate::canvas::{Canvas, Rect};
use crate::cell::Cell;
use crate::color::Rgb;
use crate::input::{Event, KeyBindings};
use crate::runtime::FrameClock;
use std::sync::Arc;

/// Focus state of a widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FocusStatus {
    /// Not focused.
    #[default]
    Outlined,
    /// Under the navigation cursor.
    Hovered,
    /// Entered; receiving events.
    Selected,
}

/// What a widget did with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventResult {
    Handled,
    NotHandled,
    /// The widget wants its parent to take focus back.
    Exit,
}

/// State shared by every widget.
pub struct WidgetCore {
    bounds: Rect,
    content: Rect,
    active: Canvas,
    buffer: Canvas,
    background: Cell,
    status: FocusStatus,
    selection: Selection,
    navigator: Option<Navigator>,
    slot: Option<ChildId>,
    selectable: bool,
    hidden: bool,
    alpha: bool,
    bindings: Arc<KeyBindings>,
}

impl std::fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetCore")
            .field("bounds", &self.bounds)
            .field("content", &self.content)
            .field("status", &self.status)
            .field("slot", &self.slot)
            .field("navigator", &self.navigator)
            .field("selectable", &self.selectable)
            .field("hidden", &self.hidden)
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

impl WidgetCore {
    /// A widget of `width x height` cells at `(x, y)` in its parent.
    ///
    /// The size is fixed for the widget's lifetime. Zero dimensions are
    /// clamped to 1.
    #[must_use]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        let background = Cell::default();
        let active = Canvas::filled(width, height, background);
        let (width, height) = active.size();
        Self {
            bounds: Rect::new(x, y, width, height),
            content: Rect::sized(width, height),
            buffer: active.clone(),
            active,
            background,
            status: FocusStatus::Outlined,
            selection: Selection::default(),
            navigator: None,
            slot: None,
            selectable: true,
            hidden: false,
            alpha: false,
            bindings: KeyBindings::shared(),
        }
    }

    /// Attach a selection style.
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.set_selection(selection);
        self
    }

    /// Attach a navigator over child widgets.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Navigator) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the cell the buffer is cleared with before each render.
    #[must_use]
    pub fn with_background(mut self, background: Cell) -> Self {
        self.background = background;
        self
    }

    /// Use custom key bindings for the back key check.
    #[must_use]
    pub fn with_bindings(mut self, bindings: Arc<KeyBindings>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Mark the widget as not enterable.
    #[must_use]
    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    /// Composite onto the parent with alpha blending.
    #[must_use]
    pub fn with_alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Position and size in the parent's coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move the widget within its parent. The size never changes.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    /// Content area in the widget's own coordinates.
    #[must_use]
    pub fn content(&self) -> Rect {
        self.content
    }

    // ========================================================================
    // Canvases
    // ========================================================================

    /// The last fully drawn frame.
    #[must_use]
    pub fn active(&self) -> &Canvas {
        &self.active
    }

    /// The canvas being drawn this frame.
    #[must_use]
    pub fn buffer(&self) -> &Canvas {
        &self.buffer
    }

    /// Mutable access to the canvas being drawn this frame.
    pub fn buffer_mut(&mut self) -> &mut Canvas {
        &mut self.buffer
    }

    #[must_use]
    pub fn background(&self) -> Cell {
        self.background
    }

    pub fn set_background(&mut self, background: Cell) {
        self.background = background;
    }

    /// Draw `text` at `(x, y)` relative to the content area.
    ///
    /// Text is clipped to the content area's right edge. Returns the number of
    /// columns written.
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, fg: Rgb) -> u32 {
        let content = self.content;
        if y >= content.height || x >= content.width {
            return 0;
        }
        let room = (content.width - x) as usize;
        let clipped = clip_to_columns(text, room);
        self.buffer
            .draw_text(content.x as u32 + x, content.y as u32 + y, clipped, fg)
    }

    /// Fill the content area's background.
    pub fn fill_content(&mut self, bg: Rgb) {
        self.buffer.fill_bg(self.content, bg);
    }

    /// Draw every navigator child into the buffer at the content origin.
    pub fn draw_children(&mut self) {
        if let Some(navigator) = self.navigator.as_mut() {
            navigator.draw_all(&mut self.buffer, (self.content.x, self.content.y));
        }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.active, &mut self.buffer);
    }

    // ========================================================================
    // Focus and flags
    // ========================================================================

    #[must_use]
    pub fn status(&self) -> FocusStatus {
        self.status
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// Replace the selection style and recompute the content area.
    pub fn set_selection(&mut self, selection: Selection) {
        let insets = selection.content_insets(self.bounds.width, self.bounds.height);
        self.content = Rect::sized(self.bounds.width, self.bounds.height).inset(insets);
        self.selection = selection;
    }

    #[must_use]
    pub fn navigator(&self) -> Option<&Navigator> {
        self.navigator.as_ref()
    }

    pub fn navigator_mut(&mut self) -> Option<&mut Navigator> {
        self.navigator.as_mut()
    }

    pub fn set_navigator(&mut self, navigator: Option<Navigator>) {
        self.navigator = navigator;
    }

    /// Position of this widget in the navigator that owns it.
    #[must_use]
    pub fn slot(&self) -> Option<ChildId> {
        self.slot
    }

    pub(crate) fn set_slot(&mut self, slot: ChildId) {
        self.slot = Some(slot);
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    #[must_use]
    pub fn uses_alpha(&self) -> bool {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: bool) {
        self.alpha = alpha;
    }

    #[must_use]
    pub fn bindings(&self) -> &Arc<KeyBindings> {
        &self.bindings
    }
}

fn clip_to_columns(text: &str, columns: usize) -> &str {
    use unicode_width::UnicodeWidthChar;

    let mut used = 0;
    for (i, ch) in text.char_indices() {
        used += ch.width().unwrap_or(0);
        if used > columns {
            return &text[..i];
        }
    }
    text
}

/// Widget behaviour.
///
/// Only [`core`](Self::core) and [`core_mut`](Self::core_mut) are required.
/// Hooks run on whichever frame loop thread drives the widget, one at a time
/// per widget.
pub trait Widget: Send {
    fn core(&self) -> &WidgetCore;

    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Draw content into the buffer canvas. The buffer has already been
    /// cleared with the background cell.
    fn render(&mut self) {}

    /// Handle an event when no navigator is attached and it is not a back
    /// key.
    fn on_event(&mut self, _event: &Event) -> EventResult {
        EventResult::NotHandled
    }

    /// Runs after every dispatched event with its result.
    fn after_event(&mut self, _event: &Event, _result: EventResult) {}

    /// Per-tick state update.
    fn on_update(&mut self, _clock: &FrameClock) {}

    fn on_entry(&mut self) {}

    fn on_exit(&mut self) {}

    fn on_hover_entry(&mut self) {}

    fn on_hover_exit(&mut self) {}

    /// Draw over the selection visual, e.g. a title on a border.
    fn after_selection(&mut self) {}
}

/// Lifecycle drivers for every [`Widget`].
pub trait WidgetExt: Widget {
    /// Dispatch an event.
    ///
    /// With a navigator attached, the navigator decides. Otherwise a back key
    /// yields [`EventResult::Exit`] and anything else goes to
    /// [`Widget::on_event`].
    fn handle_event(&mut self, event: &Event) -> EventResult {
        let result = if let Some(navigator) = self.core_mut().navigator.as_mut() {
            navigator.handle_event(event)
        } else if self.core().bindings.is_back(event) {
            EventResult::Exit
        } else {
            self.on_event(event)
        };
        self.after_event(event, result);
        result
    }

    /// Advance one tick: the navigator first, then [`Widget::on_update`].
    fn update(&mut self, clock: &FrameClock) {
        if let Some(navigator) = self.core_mut().navigator.as_mut() {
            navigator.update(clock);
        }
        self.on_update(clock);
    }

    /// Draw a frame and composite it onto `dest` at `origin` plus the
    /// widget's position. Hidden widgets draw nothing.
    fn draw(&mut self, dest: &mut Canvas, origin: (i32, i32)) {
        if self.core().hidden {
            return;
        }

        let core = self.core_mut();
        core.buffer.clear(core.background);
        self.render();

        let core = self.core_mut();
        core.selection.paint(core.status, &mut core.buffer);
        self.after_selection();

        let core = self.core_mut();
        core.swap();
        dest.blit(
            &core.active,
            origin.0 + core.bounds.x,
            origin.1 + core.bounds.y,
            core.alpha,
        );
    }

    /// Draw onto a parent widget's buffer at its content origin.
    fn draw_on(&mut self, parent: &mut WidgetCore) {
        let origin = (parent.content.x, parent.content.y);
        self.draw(&mut parent.buffer, origin);
    }

    /// Take focus: become selected and hover the navigator's current child.
    fn enter(&mut self) {
        self.core_mut().status = FocusStatus::Selected;
        tracing::trace!(slot = ?self.core().slot, "enter");
        self.on_entry();
        if let Some(navigator) = self.core_mut().navigator.as_mut() {
            navigator.hover_current();
        }
    }

    /// Give focus back to the parent.
    fn exit(&mut self) {
        self.core_mut().status = FocusStatus::Hovered;
        tracing::trace!(slot = ?self.core().slot, "exit");
        self.on_exit();
    }

    fn hover_enter(&mut self) {
        self.core_mut().status = FocusStatus::Hovered;
        self.on_hover_entry();
    }

    fn hover_exit(&mut self) {
        self.core_mut().status = FocusStatus::Outlined;
        self.on_hover_exit();
    }
}

impl<T: Widget + ?Sized> WidgetExt for T {}

impl Widget for Box<dyn Widget> {
    fn core(&self) -> &WidgetCore {
        (**self).core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        (**self).core_mut()
    }

    fn render(&mut self) {
        (**self).render();
    }

    fn on_event(&mut self, event: &Event) -> EventResult {
        (**self).on_event(event)
    }

    fn after_event(&mut self, event: &Event, result: EventResult) {
        (**self).after_event(event, result);
    }

    fn on_update(&mut self, clock: &FrameClock) {
        (**self).on_update(clock);
    }

    fn on_entry(&mut self) {
        (**self).on_entry();
    }

    fn on_exit(&mut self) {
        (**self).on_exit();
    }

    fn on_hover_entry(&mut self) {
        (**self).on_hover_entry();
    }

    fn on_hover_exit(&mut self) {
        (**self).on_hover_exit();
    }

    fn after_selection(&mut self) {
        (**self).after_selection();
    }
}
