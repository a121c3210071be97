//! Element - Host element abstraction.
//!
//! The engine never renders. It writes inline style properties to a retained
//! element owned by the host and reads back measurements. Hosts implement
//! [`Element`]; the engine holds elements through [`ElementRef`], whose identity
//! is the allocation it points to.
//!
//! [`MemoryElement`] is an in-memory element for headless hosts and tests.

mod memory;
mod style_cache;

pub use memory::MemoryElement;
pub use style_cache::{StyleCache, StyleSnapshot};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::types::parse_px;

// =============================================================================
// Element trait
// =============================================================================

/// A retained element provided by the host environment.
pub trait Element {
    /// Is the element attached to the live tree?
    fn is_connected(&self) -> bool;

    /// Inline style property (`"width"`, `"border-left-width"`, ...).
    fn style_property(&self, name: &str) -> Option<String>;

    /// Write an inline style property. `None` removes it.
    fn set_style_property(&self, name: &str, value: Option<&str>);

    /// Computed style property.
    fn computed_style_property(&self, name: &str) -> Option<String>;

    /// Border-box width.
    fn offset_width(&self) -> f64;

    /// Border-box height.
    fn offset_height(&self) -> f64;
}

// =============================================================================
// ElementRef
// =============================================================================

/// Shared handle to a host element, compared and hashed by identity.
#[derive(Clone)]
pub struct ElementRef(Rc<dyn Element>);

impl ElementRef {
    pub fn new(element: impl Element + 'static) -> Self {
        Self(Rc::new(element))
    }

    pub fn from_rc(element: Rc<dyn Element>) -> Self {
        Self(element)
    }

    /// Identity key.
    #[inline]
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    pub fn style_property(&self, name: &str) -> Option<String> {
        self.0.style_property(name)
    }

    pub fn set_style_property(&self, name: &str, value: Option<&str>) {
        self.0.set_style_property(name, value);
    }

    pub fn computed_style_property(&self, name: &str) -> Option<String> {
        self.0.computed_style_property(name)
    }

    pub fn offset_width(&self) -> f64 {
        self.0.offset_width()
    }

    pub fn offset_height(&self) -> f64 {
        self.0.offset_height()
    }

    /// Pixel value of a computed style property.
    pub fn computed_px(&self, name: &str) -> Option<f64> {
        self.computed_style_property(name)
            .as_deref()
            .and_then(parse_px)
    }

    /// Pixel value from the inline style, falling back to computed style.
    pub fn style_px(&self, name: &str) -> Option<f64> {
        self.style_property(name)
            .as_deref()
            .and_then(parse_px)
            .or_else(|| self.computed_px(name))
    }

    /// Horizontal and vertical border + padding, missing values counting as zero.
    pub fn border_padding(&self) -> (f64, f64) {
        let px = |name: &str| self.style_px(name).unwrap_or(0.0);
        let width = px("border-left-width")
            + px("border-right-width")
            + px("padding-left")
            + px("padding-right");
        let height = px("border-top-width")
            + px("border-bottom-width")
            + px("padding-top")
            + px("padding-bottom");
        (width, height)
    }
}

impl PartialEq for ElementRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ElementRef {}

impl Hash for ElementRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementRef({:#x})", self.id())
    }
}

impl<E: Element + 'static> From<Rc<E>> for ElementRef {
    fn from(element: Rc<E>) -> Self {
        Self(element)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let shared = Rc::new(MemoryElement::new(10.0, 10.0));
        let a = ElementRef::from(shared.clone());
        let b = ElementRef::from(shared);
        let c = ElementRef::new(MemoryElement::new(10.0, 10.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_border_padding_prefers_inline() {
        let element = MemoryElement::new(0.0, 0.0);
        element.set_computed("padding-left", "4px");
        element.set_computed("padding-right", "4px");
        element.set_style_property("padding-left", Some("10px"));
        element.set_computed("border-top-width", "1px");
        let el = ElementRef::new(element);
        assert_eq!(el.border_padding(), (14.0, 1.0));
    }

    #[test]
    fn test_missing_measurements_count_as_zero() {
        let el = ElementRef::new(MemoryElement::new(0.0, 0.0));
        assert_eq!(el.border_padding(), (0.0, 0.0));
        assert_eq!(el.computed_px("margin-left"), None);
    }
}
