//! Position stores - Per-property and derived reactive channels.
//!
//! Every scalar property has a two-way [`PropertyStore`]: setting it runs
//! `Position::set` for that key, and every committed change is published back
//! to it. Derived channels (`dimension`, `element`, `transform`, resize
//! measurements) are read-only to the outside.

use std::fmt;
use std::rc::Weak;

use crate::element::ElementRef;
use crate::resize::ResizeData;
use crate::store::{Readable, ReadableStore, Store, Unsubscriber, Writable};
use crate::types::{Dimension, PositionKey, PositionPatch, PropertyValue, TransformOrigin};

use super::data::PositionData;
use super::transforms::TransformData;
use super::{Position, PositionInner};

// =============================================================================
// PropertyStore
// =============================================================================

/// Two-way channel for one property of a Position.
pub struct PropertyStore<T> {
    key: PositionKey,
    store: Store<T>,
    position: Weak<PositionInner>,
}

impl<T> Clone for PropertyStore<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            store: self.store.clone(),
            position: self.position.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PropertyStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("key", &self.key)
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> PropertyStore<T> {
    fn new(key: PositionKey, initial: T, position: Weak<PositionInner>) -> Self {
        Self {
            key,
            store: Store::new(initial),
            position,
        }
    }

    #[inline]
    pub fn key(&self) -> PositionKey {
        self.key
    }

    /// Signal mirror for spark-signals computations.
    pub fn signal(&self) -> spark_signals::Signal<T> {
        self.store.signal()
    }

    fn publish(&self, value: T) {
        self.store.set(value);
    }
}

impl<T: Clone + PartialEq + fmt::Debug + 'static> Readable<T> for PropertyStore<T> {
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe_boxed(&self, handler: Box<dyn Fn(&T)>) -> Unsubscriber {
        self.store.subscribe_boxed(handler)
    }
}

impl<T> Writable<T> for PropertyStore<T>
where
    T: Clone + PartialEq + fmt::Debug + Into<PropertyValue> + 'static,
{
    /// Runs through `Position::set`, so validators apply and a veto leaves the
    /// channel unchanged.
    fn set(&self, value: T) {
        match self.position.upgrade() {
            Some(inner) => {
                Position::from_inner(inner).set(&PositionPatch::new().with(self.key, value));
            }
            None => self.store.set(value),
        }
    }
}

// =============================================================================
// DimensionData
// =============================================================================

/// Declared and measured size of a Position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DimensionData {
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    /// Offset width reported by the resize observer.
    pub measured_width: Option<f64>,
    /// Offset height reported by the resize observer.
    pub measured_height: Option<f64>,
}

// =============================================================================
// PositionStores
// =============================================================================

/// Reactive channels of one Position.
pub struct PositionStores {
    pub left: PropertyStore<Option<f64>>,
    pub top: PropertyStore<Option<f64>>,
    pub width: PropertyStore<Option<Dimension>>,
    pub height: PropertyStore<Option<Dimension>>,
    pub min_width: PropertyStore<Option<f64>>,
    pub min_height: PropertyStore<Option<f64>>,
    pub max_width: PropertyStore<Option<f64>>,
    pub max_height: PropertyStore<Option<f64>>,
    pub rotate_x: PropertyStore<Option<f64>>,
    pub rotate_y: PropertyStore<Option<f64>>,
    pub rotate_z: PropertyStore<Option<f64>>,
    pub scale: PropertyStore<Option<f64>>,
    pub translate_x: PropertyStore<Option<f64>>,
    pub translate_y: PropertyStore<Option<f64>>,
    pub translate_z: PropertyStore<Option<f64>>,
    pub transform_origin: PropertyStore<Option<TransformOrigin>>,
    pub z_index: PropertyStore<Option<f64>>,

    dimension: Store<DimensionData>,
    element: Store<Option<ElementRef>>,
    transform: Store<Option<TransformData>>,
    resize_content_width: Store<Option<f64>>,
    resize_content_height: Store<Option<f64>>,
    resize_offset_width: Store<Option<f64>>,
    resize_offset_height: Store<Option<f64>>,
    resize_observed: Store<ResizeData>,
}

impl PositionStores {
    pub(crate) fn new(position: Weak<PositionInner>) -> Self {
        let scalar = |key| PropertyStore::new(key, None, position.clone());
        Self {
            left: scalar(PositionKey::Left),
            top: scalar(PositionKey::Top),
            width: PropertyStore::new(PositionKey::Width, None, position.clone()),
            height: PropertyStore::new(PositionKey::Height, None, position.clone()),
            min_width: scalar(PositionKey::MinWidth),
            min_height: scalar(PositionKey::MinHeight),
            max_width: scalar(PositionKey::MaxWidth),
            max_height: scalar(PositionKey::MaxHeight),
            rotate_x: scalar(PositionKey::RotateX),
            rotate_y: scalar(PositionKey::RotateY),
            rotate_z: scalar(PositionKey::RotateZ),
            scale: scalar(PositionKey::Scale),
            translate_x: scalar(PositionKey::TranslateX),
            translate_y: scalar(PositionKey::TranslateY),
            translate_z: scalar(PositionKey::TranslateZ),
            transform_origin: PropertyStore::new(PositionKey::TransformOrigin, None, position.clone()),
            z_index: scalar(PositionKey::ZIndex),
            dimension: Store::default(),
            element: Store::new(None),
            transform: Store::new(None),
            resize_content_width: Store::new(None),
            resize_content_height: Store::new(None),
            resize_offset_width: Store::new(None),
            resize_offset_height: Store::new(None),
            resize_observed: Store::default(),
        }
    }

    /// Declared width/height plus measured offset size.
    pub fn dimension(&self) -> ReadableStore<DimensionData> {
        self.dimension.readable()
    }

    /// Bound element.
    pub fn element(&self) -> ReadableStore<Option<ElementRef>> {
        self.element.readable()
    }

    /// Transform geometry, published when `calculate_transform` is on.
    pub fn transform(&self) -> ReadableStore<Option<TransformData>> {
        self.transform.readable()
    }

    pub fn resize_content_width(&self) -> ReadableStore<Option<f64>> {
        self.resize_content_width.readable()
    }

    pub fn resize_content_height(&self) -> ReadableStore<Option<f64>> {
        self.resize_content_height.readable()
    }

    pub fn resize_offset_width(&self) -> ReadableStore<Option<f64>> {
        self.resize_offset_width.readable()
    }

    pub fn resize_offset_height(&self) -> ReadableStore<Option<f64>> {
        self.resize_offset_height.readable()
    }

    /// Write target registered with the resize observer manager.
    pub fn resize_observed(&self) -> Store<ResizeData> {
        self.resize_observed.clone()
    }

    /// Publish committed data: per-property channels in declaration order,
    /// then the declared part of `dimension`.
    pub(crate) fn publish(&self, data: &PositionData) {
        for key in PositionKey::ALL {
            match key {
                PositionKey::Width => self.width.publish(data.width),
                PositionKey::Height => self.height.publish(data.height),
                PositionKey::TransformOrigin => self.transform_origin.publish(data.transform_origin),
                _ => {
                    if let Some(store) = self.scalar(key) {
                        store.publish(data.number(key));
                    }
                }
            }
        }
        self.dimension.update(|dimension| {
            dimension.width = data.width;
            dimension.height = data.height;
        });
    }

    pub(crate) fn publish_transform(&self, transform: Option<TransformData>) {
        self.transform.set(transform);
    }

    pub(crate) fn publish_element(&self, element: Option<ElementRef>) {
        self.element.set(element);
    }

    /// Publish a resize measurement to the read-only resize channels.
    pub(crate) fn publish_resize(&self, data: &ResizeData) {
        self.resize_content_width.set(data.content_width);
        self.resize_content_height.set(data.content_height);
        self.resize_offset_width.set(data.offset_width);
        self.resize_offset_height.set(data.offset_height);
        self.dimension.update(|dimension| {
            dimension.measured_width = data.offset_width;
            dimension.measured_height = data.offset_height;
        });
    }

    /// Per-property channel of a scalar key.
    pub fn scalar(&self, key: PositionKey) -> Option<&PropertyStore<Option<f64>>> {
        Some(match key {
            PositionKey::Left => &self.left,
            PositionKey::Top => &self.top,
            PositionKey::MinWidth => &self.min_width,
            PositionKey::MinHeight => &self.min_height,
            PositionKey::MaxWidth => &self.max_width,
            PositionKey::MaxHeight => &self.max_height,
            PositionKey::RotateX => &self.rotate_x,
            PositionKey::RotateY => &self.rotate_y,
            PositionKey::RotateZ => &self.rotate_z,
            PositionKey::Scale => &self.scale,
            PositionKey::TranslateX => &self.translate_x,
            PositionKey::TranslateY => &self.translate_y,
            PositionKey::TranslateZ => &self.translate_z,
            PositionKey::ZIndex => &self.z_index,
            PositionKey::Width | PositionKey::Height | PositionKey::TransformOrigin => return None,
        })
    }
}
