//! Bounds validators - Keep a positioned box inside a container.
//!
//! - [`BasicBounds`] treats the box as axis aligned and ignores transforms.
//! - [`TransformBounds`] clamps the bounding rect of the transformed box.
//!
//! The container size is the manual `width`/`height` when set, else the
//! configured element's offset size, else the viewport. When none of those
//! yields a usable size the position passes through unchanged.

use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

use crate::element::ElementRef;
use crate::position::data::PositionData;
use crate::position::transforms::TransformData;
use crate::position::validation::ValidationData;
use crate::runtime::Viewport;
use crate::store::Unsubscriber;
use crate::types::Dimension;

use super::Validator;

// =============================================================================
// Options / shared config
// =============================================================================

/// Bounds configuration.
#[derive(Debug, Clone)]
pub struct BoundsOptions {
    /// Cap width/height at the container size when no max is set.
    pub constrain: bool,
    /// Container element. `None` falls back to the viewport.
    pub element: Option<ElementRef>,
    pub enabled: bool,
    /// Never rewrite width/height, only left/top.
    pub lock: bool,
    /// Manual container width, bypassing measurement.
    pub width: Option<f64>,
    /// Manual container height, bypassing measurement.
    pub height: Option<f64>,
}

impl Default for BoundsOptions {
    fn default() -> Self {
        Self {
            constrain: true,
            element: None,
            enabled: true,
            lock: false,
            width: None,
            height: None,
        }
    }
}

impl BoundsOptions {
    pub fn with_constrain(mut self, constrain: bool) -> Self {
        self.constrain = constrain;
        self
    }

    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Live bounds configuration shared by a validator handle and its clones.
///
/// Every setter notifies subscribers, which makes the owning Position
/// re-validate its current state.
pub struct BoundsConfig {
    options: RefCell<BoundsOptions>,
    subscribers: RefCell<Vec<(u64, Rc<dyn Fn()>)>>,
    next_id: Cell<u64>,
}

impl BoundsConfig {
    pub(super) fn from_options(options: BoundsOptions) -> Self {
        Self {
            options: RefCell::new(options),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn options(&self) -> BoundsOptions {
        self.options.borrow().clone()
    }

    pub fn constrain(&self) -> bool {
        self.options.borrow().constrain
    }

    pub fn enabled(&self) -> bool {
        self.options.borrow().enabled
    }

    pub fn lock(&self) -> bool {
        self.options.borrow().lock
    }

    pub fn element(&self) -> Option<ElementRef> {
        self.options.borrow().element.clone()
    }

    pub fn width(&self) -> Option<f64> {
        self.options.borrow().width
    }

    pub fn height(&self) -> Option<f64> {
        self.options.borrow().height
    }

    pub fn set_constrain(&self, constrain: bool) {
        self.modify(|options| options.constrain = constrain);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.modify(|options| options.enabled = enabled);
    }

    pub fn set_lock(&self, lock: bool) {
        self.modify(|options| options.lock = lock);
    }

    pub fn set_element(&self, element: Option<ElementRef>) {
        self.modify(|options| options.element = element);
    }

    pub fn set_width(&self, width: Option<f64>) {
        self.modify(|options| options.width = width.filter(|w| w.is_finite()));
    }

    pub fn set_height(&self, height: Option<f64>) {
        self.modify(|options| options.height = height.filter(|h| h.is_finite()));
    }

    /// Replace all options at once with a single notification.
    pub fn set_options(&self, options: BoundsOptions) {
        self.modify(|current| *current = options);
    }

    fn modify(&self, f: impl FnOnce(&mut BoundsOptions)) {
        f(&mut self.options.borrow_mut());
        let handlers: Vec<Rc<dyn Fn()>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    fn add_subscriber(self: &Rc<Self>, on_change: Rc<dyn Fn()>) -> Unsubscriber {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, on_change.clone()));
        on_change();

        let weak = Rc::downgrade(self);
        Box::new(move || {
            if let Some(config) = weak.upgrade() {
                config.subscribers.borrow_mut().retain(|(existing, _)| *existing != id);
            }
        })
    }

    /// Container width: manual, else element offset, else viewport.
    pub fn bounds_width(&self, viewport: Viewport) -> Option<f64> {
        let options = self.options.borrow();
        options
            .width
            .or_else(|| measured(options.element.as_ref(), ElementRef::offset_width))
            .or_else(|| (viewport.width > 0.0).then_some(viewport.width))
    }

    /// Container height: manual, else element offset, else viewport.
    pub fn bounds_height(&self, viewport: Viewport) -> Option<f64> {
        let options = self.options.borrow();
        options
            .height
            .or_else(|| measured(options.element.as_ref(), ElementRef::offset_height))
            .or_else(|| (viewport.height > 0.0).then_some(viewport.height))
    }

    fn bounds(&self, viewport: Viewport) -> Option<(f64, f64)> {
        Some((self.bounds_width(viewport)?, self.bounds_height(viewport)?))
    }

    /// Clamp explicit width/height into `[min, max]`, pushing left/top back so
    /// the box ends at the container edge. Returns the effective size.
    fn constrain_size(
        &self,
        data: &ValidationData,
        position: &mut PositionData,
        (bounds_width, bounds_height): (f64, f64),
    ) -> (f64, f64) {
        let mut width = data.width;
        let mut height = data.height;
        if self.lock() {
            return (width, height);
        }
        let constrain = self.constrain();

        if let Some(Dimension::Px(w)) = position.width {
            let max = data
                .max_width
                .unwrap_or(if constrain { bounds_width } else { f64::MAX });
            width = clamp(w, data.min_width.unwrap_or(0.0), max);
            position.width = Some(Dimension::Px(width));
            if let Some(left) = position.left {
                if width + left + data.margin_left > bounds_width {
                    position.left = Some(bounds_width - width - data.margin_left);
                }
            }
        }

        if let Some(Dimension::Px(h)) = position.height {
            let max = data
                .max_height
                .unwrap_or(if constrain { bounds_height } else { f64::MAX });
            height = clamp(h, data.min_height.unwrap_or(0.0), max);
            position.height = Some(Dimension::Px(height));
            if let Some(top) = position.top {
                if height + top + data.margin_top > bounds_height {
                    position.top = Some(bounds_height - height - data.margin_top);
                }
            }
        }

        (width, height)
    }
}

fn measured(element: Option<&ElementRef>, size: fn(&ElementRef) -> f64) -> Option<f64> {
    element
        .filter(|element| element.is_connected())
        .map(size)
        .filter(|value| *value > 0.0)
}

/// `min(max(value, lo), hi)`: never panics when `lo > hi`.
#[inline]
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

// =============================================================================
// BasicBounds
// =============================================================================

/// Axis-aligned bounds validator.
#[derive(Clone)]
pub struct BasicBounds(Rc<BoundsConfig>);

impl BasicBounds {
    pub fn new(options: BoundsOptions) -> Self {
        Self(Rc::new(BoundsConfig::from_options(options)))
    }
}

impl Deref for BasicBounds {
    type Target = BoundsConfig;

    fn deref(&self) -> &BoundsConfig {
        &self.0
    }
}

impl Validator for BasicBounds {
    fn validate(&self, data: &ValidationData) -> Option<PositionData> {
        let mut position = data.position;
        if !self.enabled() {
            return Some(position);
        }
        let Some(bounds) = self.bounds(data.viewport) else {
            return Some(position);
        };
        let (width, height) = self.constrain_size(data, &mut position, bounds);

        if let Some(left) = position.left {
            position.left = Some(clamp(left, 0.0, bounds.0 - width - data.margin_left));
        }
        if let Some(top) = position.top {
            position.top = Some(clamp(top, 0.0, bounds.1 - height - data.margin_top));
        }
        Some(position)
    }

    fn subscribe(&self, on_change: Rc<dyn Fn()>) -> Option<Unsubscriber> {
        Some(self.0.add_subscriber(on_change))
    }
}

// =============================================================================
// TransformBounds
// =============================================================================

/// Bounds validator aware of rotation, scale and translation.
#[derive(Clone)]
pub struct TransformBounds(Rc<BoundsConfig>);

impl TransformBounds {
    pub fn new(options: BoundsOptions) -> Self {
        Self(Rc::new(BoundsConfig::from_options(options)))
    }
}

impl Deref for TransformBounds {
    type Target = BoundsConfig;

    fn deref(&self) -> &BoundsConfig {
        &self.0
    }
}

impl Validator for TransformBounds {
    fn validate(&self, data: &ValidationData) -> Option<PositionData> {
        let mut position = data.position;
        if !self.enabled() {
            return Some(position);
        }
        let Some((bounds_width, bounds_height)) = self.bounds(data.viewport) else {
            return Some(position);
        };
        self.constrain_size(data, &mut position, (bounds_width, bounds_height));

        let mut transform = TransformData::default();
        data.transforms.get_data(&position, &mut transform, Some(data));
        let rect = transform.bounding_rect;
        let (margin_left, margin_top) = (data.margin_left, data.margin_top);

        let mut x = rect.x;
        let mut y = rect.y;
        if rect.bottom() + margin_top > bounds_height {
            y += bounds_height - rect.bottom() - margin_top;
        }
        if rect.right() + margin_left > bounds_width {
            x += bounds_width - rect.right() - margin_left;
        }
        if y - margin_top < 0.0 {
            y += (y - margin_top).abs();
        }
        if x - margin_left < 0.0 {
            x += (x - margin_left).abs();
        }

        let (dx, dy) = (x - rect.x, y - rect.y);
        if dx != 0.0 {
            position.left = Some(position.left.unwrap_or(0.0) + dx);
        }
        if dy != 0.0 {
            position.top = Some(position.top.unwrap_or(0.0) + dy);
        }
        Some(position)
    }

    fn subscribe(&self, on_change: Rc<dyn Fn()>) -> Option<Unsubscriber> {
        Some(self.0.add_subscriber(on_change))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{MemoryElement, StyleSnapshot};
    use crate::position::transforms::Transforms;
    use crate::types::TransformOrigin;

    fn setup(position: PositionData, viewport: Viewport) -> ValidationData {
        ValidationData::new(
            position,
            None,
            StyleSnapshot::default(),
            Transforms::new(),
            viewport,
            Default::default(),
        )
    }

    fn boxed(left: f64, top: f64, width: f64, height: f64) -> PositionData {
        PositionData {
            left: Some(left),
            top: Some(top),
            width: Some(Dimension::Px(width)),
            height: Some(Dimension::Px(height)),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_bounds_container_element() {
        let container = ElementRef::new(MemoryElement::new(800.0, 600.0));
        let bounds = BasicBounds::new(BoundsOptions::default().with_element(container));
        let out = bounds
            .validate(&setup(boxed(900.0, 50.0, 100.0, 50.0), Viewport::default()))
            .unwrap();
        assert_eq!(out.left, Some(700.0));
        assert_eq!(out.top, Some(50.0));
    }

    #[test]
    fn test_basic_bounds_negative_and_oversized() {
        let bounds = BasicBounds::new(BoundsOptions::default());
        let out = bounds
            .validate(&setup(boxed(-20.0, -5.0, 1000.0, 50.0), Viewport::new(400.0, 300.0)))
            .unwrap();
        assert_eq!(out.width, Some(Dimension::Px(400.0)));
        assert_eq!(out.left, Some(0.0));
        assert_eq!(out.top, Some(0.0));
    }

    #[test]
    fn test_lock_keeps_size() {
        let bounds = BasicBounds::new(BoundsOptions::default().with_size(400.0, 300.0).with_lock(true));
        let out = bounds
            .validate(&setup(boxed(0.0, 0.0, 1000.0, 50.0), Viewport::default()))
            .unwrap();
        assert_eq!(out.width, Some(Dimension::Px(1000.0)));
    }

    #[test]
    fn test_no_measurement_means_no_constraint() {
        let disconnected = MemoryElement::new(800.0, 600.0);
        disconnected.set_connected(false);
        let bounds = BasicBounds::new(BoundsOptions::default().with_element(ElementRef::new(disconnected)));
        let input = boxed(5000.0, 5000.0, 10.0, 10.0);
        let out = bounds.validate(&setup(input, Viewport::default())).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_disabled_passes_through() {
        let bounds = BasicBounds::new(BoundsOptions::default().with_size(10.0, 10.0));
        bounds.set_enabled(false);
        let input = boxed(500.0, 500.0, 10.0, 10.0);
        assert_eq!(bounds.validate(&setup(input, Viewport::default())), Some(input));
    }

    #[test]
    fn test_transform_bounds_rotated_box() {
        let bounds = TransformBounds::new(BoundsOptions::default().with_size(800.0, 600.0));
        let mut position = boxed(0.0, 0.0, 100.0, 50.0);
        position.rotate_z = Some(90.0);
        position.transform_origin = Some(TransformOrigin::Center);

        // Rotated about its center the box spans x 25..75, y -25..75, so only
        // the top edge is outside.
        let out = bounds
            .validate(&setup(position, Viewport::default()))
            .unwrap();
        assert_eq!(out.left, Some(0.0));
        assert_eq!(out.top, Some(25.0));
    }

    #[test]
    fn test_setters_notify_subscribers() {
        let bounds = BasicBounds::new(BoundsOptions::default());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let unsubscribe = Validator::subscribe(&bounds, Rc::new(move || c.set(c.get() + 1))).unwrap();
        assert_eq!(count.get(), 1);

        bounds.set_width(Some(100.0));
        bounds.set_lock(true);
        assert_eq!(count.get(), 3);
        assert_eq!(bounds.width(), Some(100.0));

        unsubscribe();
        bounds.set_height(Some(5.0));
        assert_eq!(count.get(), 3);
    }
}
