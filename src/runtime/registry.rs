//! Top-level widget registry with layered paint order.

use crate::error::{Error, Result};
use crate::widget::Widget;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

/// A top-level widget shared between the frame loop threads.
pub type SharedWidget = Arc<Mutex<Box<dyn Widget>>>;

/// Handle to a widget registered with the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry {
    layer: i32,
    widget: SharedWidget,
}

/// Widgets by id plus ids by layer. Ids are never reused.
#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    entries: HashMap<WidgetId, Entry>,
    layers: BTreeMap<i32, BTreeSet<WidgetId>>,
    active: Option<WidgetId>,
}

impl Registry {
    pub(crate) fn insert(&mut self, widget: SharedWidget, layer: i32) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, Entry { layer, widget });
        self.layers.entry(layer).or_default().insert(id);
        id
    }

    pub(crate) fn remove(&mut self, id: WidgetId) -> Result<SharedWidget> {
        let entry = self.entries.remove(&id).ok_or(Error::UnknownWidget(id.0))?;
        self.unlink(id, entry.layer);
        if self.active == Some(id) {
            self.active = None;
        }
        Ok(entry.widget)
    }

    pub(crate) fn set_layer(&mut self, id: WidgetId, layer: i32) -> Result<()> {
        let entry = self.entries.get_mut(&id).ok_or(Error::UnknownWidget(id.0))?;
        let old = std::mem::replace(&mut entry.layer, layer);
        self.unlink(id, old);
        self.layers.entry(layer).or_default().insert(id);
        Ok(())
    }

    fn unlink(&mut self, id: WidgetId, layer: i32) {
        if let Some(ids) = self.layers.get_mut(&layer) {
            ids.remove(&id);
            if ids.is_empty() {
                self.layers.remove(&layer);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.layers.clear();
        self.active = None;
    }

    pub(crate) fn get(&self, id: WidgetId) -> Option<SharedWidget> {
        self.entries.get(&id).map(|entry| Arc::clone(&entry.widget))
    }

    pub(crate) fn layer_of(&self, id: WidgetId) -> Option<i32> {
        self.entries.get(&id).map(|entry| entry.layer)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn set_active(&mut self, id: WidgetId) -> Result<()> {
        if !self.entries.contains_key(&id) {
            return Err(Error::UnknownWidget(id.0));
        }
        self.active = Some(id);
        Ok(())
    }

    pub(crate) fn active(&self) -> Option<WidgetId> {
        self.active
    }

    /// Ids by ascending layer, then by registration order.
    pub(crate) fn ids(&self) -> Vec<WidgetId> {
        self.layers.values().flatten().copied().collect()
    }

    /// Shared handles in paint order. The caller iterates after releasing the
    /// registry lock.
    pub(crate) fn snapshot(&self) -> Vec<SharedWidget> {
        self.layers
            .values()
            .flatten()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| Arc::clone(&entry.widget))
            .collect()
    }
}
