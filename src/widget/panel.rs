//! A container widget that draws its navigator's children.

use crate::color::Rgb;
use crate::widget::{Navigator, Selection, Widget, WidgetCore};

/// Groups child widgets under one [`Navigator`].
///
/// Children are positioned relative to the panel's content area. An optional
/// title is drawn over the top edge after the selection visual, so it sits on
/// a border when one is attached.
#[derive(Debug)]
pub struct Panel {
    core: WidgetCore,
    title: Option<String>,
    title_color: Rgb,
}

impl Panel {
    /// An empty panel of `width x height` at `(x, y)`.
    #[must_use]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self::from_core(WidgetCore::new(x, y, width, height))
    }

    /// Wrap a prepared core. A navigator is attached if it has none.
    #[must_use]
    pub fn from_core(mut core: WidgetCore) -> Self {
        if core.navigator().is_none() {
            core.set_navigator(Some(Navigator::with_bindings(core.bindings().clone())));
        }
        Self {
            core,
            title: None,
            title_color: Rgb::WHITE,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.core.set_selection(selection);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>, color: Rgb) -> Self {
        self.title = Some(title.into());
        self.title_color = color;
        self
    }

    /// The panel's navigator.
    pub fn navigator(&mut self) -> &mut Navigator {
        let bindings = self.core.bindings.clone();
        self.core
            .navigator
            .get_or_insert_with(|| Navigator::with_bindings(bindings))
    }
}

impl Widget for Panel {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self) {
        self.core.draw_children();
    }

    fn after_selection(&mut self) {
        if let Some(title) = &self.title {
            self.core.buffer_mut().draw_text(1, 0, title, self.title_color);
        }
    }
}
