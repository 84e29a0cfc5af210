//! Focus navigation over a set of child widgets.
//!
//! A [`Navigator`] owns its children and a directed graph between them (one
//! optional edge per [`Direction`] per child), plus a hotkey table that jumps
//! straight to a child.
//!
//! # States
//!
//! ```text
//!              activate (selectable child)
//!   Selecting ─────────────────────────────▶ Delegating
//!       ▲                                        │
//!       └──────── child returns Exit ────────────┘
//! ```
//!
//! While selecting, every event is consumed: directional keys and hotkeys move
//! the hover cursor, activate enters the current child and a back key makes
//! the navigator itself return [`EventResult::Exit`]. While delegating, events
//! go to the current child until it exits.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::input::{Direction, Event, Key, KeyBindings, NavAction};
use crate::runtime::FrameClock;
use crate::widget::{EventResult, Widget, WidgetExt};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to a child inside one [`Navigator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildId(usize);

impl ChildId {
    /// Position in insertion order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Navigator state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavState {
    /// Moving the hover cursor between children.
    #[default]
    Selecting,
    /// Forwarding events to the entered child.
    Delegating,
}

struct Slot {
    widget: Box<dyn Widget>,
    links: [Option<ChildId>; 4],
}

/// Focus state machine over owned child widgets.
pub struct Navigator {
    children: Vec<Slot>,
    hotkeys: HashMap<Key, ChildId>,
    current: Option<ChildId>,
    state: NavState,
    bindings: Arc<KeyBindings>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("children", &self.children.len())
            .field("hotkeys", &self.hotkeys)
            .field("current", &self.current)
            .field("state", &self.state)
            .finish()
    }
}

impl Navigator {
    /// An empty navigator using the default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bindings(KeyBindings::shared())
    }

    /// An empty navigator using custom key bindings.
    #[must_use]
    pub fn with_bindings(bindings: Arc<KeyBindings>) -> Self {
        Self {
            children: Vec::new(),
            hotkeys: HashMap::new(),
            current: None,
            state: NavState::Selecting,
            bindings,
        }
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Take ownership of a child widget.
    pub fn add<W: Widget + 'static>(&mut self, widget: W) -> ChildId {
        self.add_boxed(Box::new(widget))
    }

    /// Take ownership of an already boxed child widget.
    pub fn add_boxed(&mut self, mut widget: Box<dyn Widget>) -> ChildId {
        let id = ChildId(self.children.len());
        widget.core_mut().set_slot(id);
        self.children.push(Slot {
            widget,
            links: [None; 4],
        });
        tracing::debug!(child = id.0, "navigator child added");
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All child handles in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ChildId> + '_ {
        (0..self.children.len()).map(ChildId)
    }

    pub fn child(&self, id: ChildId) -> Result<&dyn Widget> {
        let slot = self.slot(id)?;
        Ok(slot.widget.as_ref())
    }

    pub fn child_mut(&mut self, id: ChildId) -> Result<&mut dyn Widget> {
        let slot = self.slot_mut(id)?;
        Ok(slot.widget.as_mut())
    }

    fn slot(&self, id: ChildId) -> Result<&Slot> {
        self.children.get(id.0).ok_or(Error::UnknownChild(id.0))
    }

    fn slot_mut(&mut self, id: ChildId) -> Result<&mut Slot> {
        self.children.get_mut(id.0).ok_or(Error::UnknownChild(id.0))
    }

    // ========================================================================
    // Graph
    // ========================================================================

    /// Link `from` to `to` in `direction` and `to` back to `from` in the
    /// opposite direction.
    pub fn connect(&mut self, from: ChildId, to: ChildId, direction: Direction) -> Result<()> {
        self.slot(to)?;
        self.slot_mut(from)?.links[direction.index()] = Some(to);
        self.slot_mut(to)?.links[direction.opposite().index()] = Some(from);
        Ok(())
    }

    /// [`connect`](Self::connect) with a direction symbol: `U`, `D`, `L` or
    /// `R`.
    pub fn add_connection(&mut self, from: ChildId, to: ChildId, symbol: &str) -> Result<()> {
        let direction =
            Direction::from_symbol(symbol).ok_or_else(|| Error::InvalidDirection(symbol.into()))?;
        self.connect(from, to, direction)
    }

    /// The child linked from `id` in `direction`.
    #[must_use]
    pub fn neighbor(&self, id: ChildId, direction: Direction) -> Option<ChildId> {
        self.children
            .get(id.0)
            .and_then(|slot| slot.links[direction.index()])
    }

    /// Drop every link. Hotkeys are kept.
    pub fn clear_connections(&mut self) {
        for slot in &mut self.children {
            slot.links = [None; 4];
        }
    }

    /// Jump to `id` whenever `key` is pressed while selecting.
    pub fn add_hotkey(&mut self, key: Key, id: ChildId) -> Result<()> {
        self.slot(id)?;
        self.hotkeys.insert(key, id);
        Ok(())
    }

    pub fn clear_hotkeys(&mut self) {
        self.hotkeys.clear();
    }

    // ========================================================================
    // Focus
    // ========================================================================

    #[must_use]
    pub fn current(&self) -> Option<ChildId> {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Make `id` current without running any focus hooks.
    pub fn set_current(&mut self, id: ChildId) -> Result<()> {
        self.slot(id)?;
        self.current = Some(id);
        Ok(())
    }

    /// Move the hover cursor to `id`: the old current child is hover-exited
    /// and `id` is hover-entered.
    pub fn select(&mut self, id: ChildId) -> Result<()> {
        self.slot(id)?;
        if let Some(old) = self.current {
            self.children[old.0].widget.hover_exit();
        }
        self.current = Some(id);
        self.children[id.0].widget.hover_enter();
        tracing::trace!(child = id.0, "hover moved");
        Ok(())
    }

    /// Hover-enter the current child, if any.
    pub fn hover_current(&mut self) {
        if let Some(slot) = self.current_slot() {
            slot.widget.hover_enter();
        }
    }

    fn current_slot(&mut self) -> Option<&mut Slot> {
        self.current.and_then(|id| self.children.get_mut(id.0))
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Feed one event through the state machine.
    pub fn handle_event(&mut self, event: &Event) -> EventResult {
        match self.state {
            NavState::Selecting => self.handle_selecting(event),
            NavState::Delegating => self.handle_delegating(event),
        }
    }

    fn handle_selecting(&mut self, event: &Event) -> EventResult {
        let action = self.bindings.action(event);

        if action == Some(NavAction::Back) {
            if let Some(slot) = self.current_slot() {
                slot.widget.hover_exit();
            }
            return EventResult::Exit;
        }

        let mut target = match (action, self.current) {
            (Some(NavAction::Move(direction)), Some(current)) => self.neighbor(current, direction),
            _ => None,
        };
        // Hotkeys override the graph.
        if let Some(&id) = event.key.as_ref().and_then(|key| self.hotkeys.get(key)) {
            target = Some(id);
        }
        if let Some(id) = target {
            // Every stored id was validated when it was inserted.
            let _ = self.select(id);
        }

        if action == Some(NavAction::Activate) {
            if let Some(slot) = self.current_slot() {
                slot.widget.enter();
                if slot.widget.core().is_selectable() {
                    self.state = NavState::Delegating;
                    tracing::trace!(child = ?self.current, "delegating");
                }
            }
        }

        EventResult::Handled
    }

    fn handle_delegating(&mut self, event: &Event) -> EventResult {
        let Some(slot) = self.current_slot() else {
            self.state = NavState::Selecting;
            return EventResult::Handled;
        };

        match slot.widget.handle_event(event) {
            EventResult::Exit => {
                slot.widget.exit();
                slot.widget.hover_enter();
                self.state = NavState::Selecting;
                tracing::trace!(child = ?self.current, "child exited");
                EventResult::Handled
            }
            other => other,
        }
    }

    /// Tick the entered child. Nothing happens while selecting.
    pub fn update(&mut self, clock: &FrameClock) {
        if self.state != NavState::Delegating {
            return;
        }
        if let Some(slot) = self.current_slot() {
            slot.widget.update(clock);
        }
    }

    /// Draw every child onto `dest`, in insertion order, at `origin`.
    pub fn draw_all(&mut self, dest: &mut Canvas, origin: (i32, i32)) {
        for slot in &mut self.children {
            slot.widget.draw(dest, origin);
        }
    }
}
