//! Element updates - Batched inline style writes.
//!
//! A bound Position does not touch its element inside `set`. It queues itself
//! here and the runtime flushes the queue once per frame, so any number of
//! `set` calls within a frame produce one style write. The queue holds weak
//! references; a Position dropped before the flush is skipped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::element::ElementRef;
use crate::types::Dimension;

use super::data::PositionData;
use super::transforms::Transforms;

/// Something with a pending element write.
pub(crate) trait ElementUpdate {
    fn flush_element_update(self: Rc<Self>, timestamp: f64);
}

/// Per-runtime queue of pending element writes.
#[derive(Clone, Default)]
pub struct UpdateElementManager {
    queue: Rc<RefCell<Vec<Weak<dyn ElementUpdate>>>>,
}

impl UpdateElementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, pending: Weak<dyn ElementUpdate>) {
        self.queue.borrow_mut().push(pending);
    }

    /// Number of queued writes.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Apply every queued write. Writes queued during the flush wait for the next one.
    pub(crate) fn flush(&self, timestamp: f64) {
        let pending = std::mem::take(&mut *self.queue.borrow_mut());
        for item in pending {
            if let Some(item) = item.upgrade() {
                item.flush_element_update(timestamp);
            }
        }
    }
}

// =============================================================================
// Style application
// =============================================================================

fn px(value: Option<f64>) -> Option<String> {
    value.map(|value| format!("{value}px"))
}

fn write(el: &ElementRef, name: &str, value: Option<String>) {
    el.set_style_property(name, value.as_deref());
}

/// Write `data` to the element's inline style.
///
/// In orthographic mode placement goes entirely through `transform`; otherwise
/// `left`/`top` are written and `transform` carries only local components.
pub(crate) fn apply_styles(el: &ElementRef, data: &PositionData, transforms: &Transforms, ortho: bool) {
    if ortho {
        write(el, "transform", Some(transforms.get_css_ortho(data)));
    } else {
        write(el, "left", px(data.left));
        write(el, "top", px(data.top));
        let transform = transforms.is_active().then(|| transforms.get_css(None));
        write(el, "transform", transform);
    }

    write(el, "width", data.width.map(Dimension::to_css));
    write(el, "height", data.height.map(Dimension::to_css));
    write(el, "min-width", px(data.min_width));
    write(el, "min-height", px(data.min_height));
    write(el, "max-width", px(data.max_width));
    write(el, "max-height", px(data.max_height));
    write(el, "z-index", data.z_index.map(|z| z.to_string()));
    write(
        el,
        "transform-origin",
        data.transform_origin.map(|origin| origin.as_str().to_string()),
    );
}
