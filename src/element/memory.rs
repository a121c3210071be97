//! In-memory element for headless hosts and tests.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::Element;

/// Element backed by plain maps.
///
/// Offset size and computed style are whatever the host last wrote; inline
/// style is whatever the engine last wrote.
#[derive(Debug, Default)]
pub struct MemoryElement {
    inline: RefCell<BTreeMap<String, String>>,
    computed: RefCell<BTreeMap<String, String>>,
    offset: Cell<(f64, f64)>,
    connected: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryElement {
    /// A connected element with the given offset size.
    pub fn new(offset_width: f64, offset_height: f64) -> Self {
        Self {
            offset: Cell::new((offset_width, offset_height)),
            connected: Cell::new(true),
            ..Default::default()
        }
    }

    pub fn set_offset_size(&self, width: f64, height: f64) {
        self.offset.set((width, height));
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    pub fn set_computed(&self, name: &str, value: &str) {
        self.computed
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Snapshot of the inline style.
    pub fn inline_style(&self) -> BTreeMap<String, String> {
        self.inline.borrow().clone()
    }

    /// Number of inline style writes so far.
    pub fn style_writes(&self) -> usize {
        self.writes.get()
    }
}

impl Element for MemoryElement {
    fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn style_property(&self, name: &str) -> Option<String> {
        self.inline.borrow().get(name).cloned()
    }

    fn set_style_property(&self, name: &str, value: Option<&str>) {
        self.writes.set(self.writes.get() + 1);
        let mut inline = self.inline.borrow_mut();
        match value {
            Some(value) => {
                inline.insert(name.to_string(), value.to_string());
            }
            None => {
                inline.remove(name);
            }
        }
    }

    fn computed_style_property(&self, name: &str) -> Option<String> {
        self.computed.borrow().get(name).cloned()
    }

    fn offset_width(&self) -> f64 {
        self.offset.get().0
    }

    fn offset_height(&self) -> f64 {
        self.offset.get().1
    }
}
