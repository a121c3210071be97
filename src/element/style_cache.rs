//! Cached computed style of a bound element.
//!
//! Reading computed style is the expensive part of a host round trip, so a
//! Position reads it once per binding and refreshes only the measured offset
//! size as resize notifications arrive.

use super::ElementRef;

/// Measurements taken from a bound element.
///
/// Missing or non-pixel values (`"none"`, `"auto"`) read as `None`, margins as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleSnapshot {
    pub margin_left: f64,
    pub margin_top: f64,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub offset_width: f64,
    pub offset_height: f64,
    /// The element already had a `will-change` hint when first cached.
    pub has_will_change: bool,
}

/// Per-Position computed style cache.
#[derive(Debug, Default)]
pub struct StyleCache {
    snapshot: StyleSnapshot,
    filled: bool,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has the cache been filled since the last reset?
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Forget everything. Called when the Position is rebound.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fill from the element if not filled yet, returning the snapshot.
    pub fn fill(&mut self, el: &ElementRef) -> StyleSnapshot {
        if !self.filled {
            self.snapshot = StyleSnapshot {
                margin_left: el.computed_px("margin-left").unwrap_or(0.0),
                margin_top: el.computed_px("margin-top").unwrap_or(0.0),
                min_width: el.computed_px("min-width"),
                min_height: el.computed_px("min-height"),
                max_width: el.computed_px("max-width"),
                max_height: el.computed_px("max-height"),
                offset_width: el.offset_width(),
                offset_height: el.offset_height(),
                has_will_change: el
                    .computed_style_property("will-change")
                    .is_some_and(|value| !value.is_empty() && value != "auto")
                    || el.style_property("will-change").is_some(),
            };
            self.filled = true;
        }
        self.snapshot
    }

    /// Record a new offset size from a resize notification.
    pub fn set_offset(&mut self, width: Option<f64>, height: Option<f64>) {
        if let Some(width) = width {
            self.snapshot.offset_width = width;
        }
        if let Some(height) = height {
            self.snapshot.offset_height = height;
        }
    }

    #[inline]
    pub fn snapshot(&self) -> StyleSnapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MemoryElement;
    use std::rc::Rc;

    fn setup() -> (Rc<MemoryElement>, ElementRef) {
        let element = Rc::new(MemoryElement::new(120.0, 80.0));
        element.set_computed("margin-left", "4px");
        element.set_computed("max-width", "none");
        element.set_computed("min-height", "20px");
        let el = ElementRef::from(element.clone());
        (element, el)
    }

    #[test]
    fn test_fill_reads_once() {
        let (element, el) = setup();
        let mut cache = StyleCache::new();
        let snap = cache.fill(&el);
        assert_eq!(snap.margin_left, 4.0);
        assert_eq!(snap.margin_top, 0.0);
        assert_eq!(snap.max_width, None);
        assert_eq!(snap.min_height, Some(20.0));
        assert_eq!(snap.offset_width, 120.0);

        element.set_computed("margin-left", "9px");
        assert_eq!(cache.fill(&el).margin_left, 4.0);

        cache.reset();
        assert!(!cache.is_filled());
        assert_eq!(cache.fill(&el).margin_left, 9.0);
    }

    #[test]
    fn test_set_offset_keeps_missing_axis() {
        let (_element, el) = setup();
        let mut cache = StyleCache::new();
        cache.fill(&el);
        cache.set_offset(Some(300.0), None);
        assert_eq!(cache.snapshot().offset_width, 300.0);
        assert_eq!(cache.snapshot().offset_height, 80.0);
    }
}
