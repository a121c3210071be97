//! Position - Reactive position/transform state of one element.
//!
//! A [`Position`] owns a [`PositionData`] record and keeps a bound host element
//! in sync with it. Every change flows through [`Position::set`]:
//!
//! ```text
//! set(patch) -> parse/merge -> validators (by weight) -> commit
//!     -> queue element write -> (next tick) inline style -> stores
//! ```
//!
//! A vetoed update leaves data, element and stores untouched. Unbound
//! Positions publish to their stores immediately; bound ones publish after
//! the element write, which happens on the next [`Runtime::tick`] unless
//! `immediate_element_update` is on.
//!
//! # Example
//!
//! ```ignore
//! use spark_position::{Position, PositionOptions, PositionPatch, PositionKey, Runtime};
//!
//! let runtime = Runtime::headless();
//! let position = Position::new(&runtime, PositionOptions::default())?;
//! position.set(&PositionPatch::new().with(PositionKey::Left, 100.0).with(PositionKey::Width, "auto"));
//! position.set_top("+=20");
//! assert_eq!(position.left(), Some(100.0));
//! ```

mod data;
mod state;
mod stores;
mod transforms;
mod update;
mod validation;
pub mod validators;

pub use data::PositionData;
pub use state::{PositionStateAPI, ResetOptions, Restored, RestoreOptions, SaveOptions, SavedState};
pub use stores::{DimensionData, PositionStores, PropertyStore};
pub use transforms::{TransformData, Transforms};
pub use update::UpdateElementManager;
pub use validation::ValidationData;
pub use validators::{AdapterValidators, InitialHelper, Validator, ValidatorData};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use tracing::{debug, trace, warn};

use crate::animation::AnimationAPI;
use crate::element::{ElementRef, StyleCache, StyleSnapshot};
use crate::error::Result;
use crate::resize::{ResizeData, ResizeTarget};
use crate::runtime::Runtime;
use crate::store::{Readable, Store, Unsubscriber, Writable};
use crate::types::{
    parse_px, Dimension, PositionKey, PositionKeys, PositionPatch, PropertyValue, Relative,
    TransformOrigin,
};

use state::StateStore;
use update::{apply_styles, ElementUpdate};

// =============================================================================
// Options
// =============================================================================

/// Construction options for [`Position`].
#[derive(Clone)]
pub struct PositionOptions {
    /// Element to bind right away.
    pub parent: Option<ElementRef>,
    /// Applied through `set` before validators are installed.
    pub initial: PositionPatch,
    pub validators: Vec<ValidatorData>,
    /// Publish [`TransformData`] on the `transform` store after every commit.
    pub calculate_transform: bool,
    /// Supplies left/top while they are unset.
    pub initial_helper: Option<Rc<dyn InitialHelper>>,
    /// Place through `transform` only, without `left`/`top` styles.
    pub ortho: bool,
    pub transform_origin: TransformOrigin,
    /// Write styles inside `set` instead of on the next tick.
    pub immediate_element_update: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            parent: None,
            initial: PositionPatch::new(),
            validators: Vec::new(),
            calculate_transform: false,
            initial_helper: None,
            ortho: true,
            transform_origin: TransformOrigin::TopLeft,
            immediate_element_update: false,
        }
    }
}

impl PositionOptions {
    pub fn with_parent(mut self, parent: ElementRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_initial(mut self, initial: PositionPatch) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_validator(mut self, validator: ValidatorData) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_calculate_transform(mut self, calculate_transform: bool) -> Self {
        self.calculate_transform = calculate_transform;
        self
    }

    pub fn with_initial_helper(mut self, helper: impl InitialHelper + 'static) -> Self {
        self.initial_helper = Some(Rc::new(helper));
        self
    }

    pub fn with_ortho(mut self, ortho: bool) -> Self {
        self.ortho = ortho;
        self
    }

    pub fn with_transform_origin(mut self, origin: TransformOrigin) -> Self {
        self.transform_origin = origin;
        self
    }

    pub fn with_immediate_element_update(mut self, immediate: bool) -> Self {
        self.immediate_element_update = immediate;
        self
    }
}

impl fmt::Debug for PositionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionOptions")
            .field("parent", &self.parent)
            .field("initial", &self.initial)
            .field("validators", &self.validators)
            .field("calculate_transform", &self.calculate_transform)
            .field("initial_helper", &self.initial_helper.is_some())
            .field("ortho", &self.ortho)
            .field("transform_origin", &self.transform_origin)
            .field("immediate_element_update", &self.immediate_element_update)
            .finish()
    }
}

/// Options for [`Position::get_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Restrict to these keys. `None` means all.
    pub keys: Option<PositionKeys>,
    pub exclude: PositionKeys,
    /// Substitute numeric defaults for unset numeric properties.
    pub numeric: bool,
}

impl GetOptions {
    pub fn with_keys(mut self, keys: PositionKeys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_exclude(mut self, exclude: PositionKeys) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_numeric(mut self, numeric: bool) -> Self {
        self.numeric = numeric;
        self
    }
}

// =============================================================================
// Internal state
// =============================================================================

struct Settings {
    calculate_transform: bool,
    initial_helper: Option<Rc<dyn InitialHelper>>,
    ortho: bool,
    immediate: bool,
}

#[derive(Default)]
struct PendingUpdate {
    queued: bool,
    waiters: Vec<oneshot::Sender<f64>>,
    last_timestamp: f64,
}

pub(crate) struct PositionInner {
    runtime: Runtime,
    data: RefCell<PositionData>,
    transforms: RefCell<Transforms>,
    validators: AdapterValidators,
    stores: PositionStores,
    data_store: Store<PositionData>,
    element: RefCell<Option<ElementRef>>,
    style_cache: RefCell<StyleCache>,
    settings: RefCell<Settings>,
    states: RefCell<StateStore>,
    pending: RefCell<PendingUpdate>,
    resize_subscription: RefCell<Option<Unsubscriber>>,
}

impl Drop for PositionInner {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.resize_subscription.get_mut().take() {
            unsubscribe();
        }
        if let Some(element) = self.element.get_mut().take() {
            let target = ResizeTarget::Store(self.stores.resize_observed());
            self.runtime.resize().remove(&element, Some(&target));
        }
    }
}

impl ElementUpdate for PositionInner {
    fn flush_element_update(self: Rc<Self>, timestamp: f64) {
        Position::from_inner(self).flush_element(timestamp);
    }
}

// =============================================================================
// Position
// =============================================================================

/// Handle to the positional state of one element. Clones share state.
#[derive(Clone)]
pub struct Position {
    inner: Rc<PositionInner>,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("data", &*self.inner.data.borrow())
            .field("element", &*self.inner.element.borrow())
            .finish_non_exhaustive()
    }
}

macro_rules! property_accessors {
    ($($key:ident => $getter:ident, $setter:ident: $ty:ty;)*) => {
        $(
            #[doc = concat!("Current `", stringify!($getter), "`.")]
            #[inline]
            pub fn $getter(&self) -> $ty {
                self.inner.data.borrow().$getter
            }

            #[doc = concat!("`set` with only `", stringify!($getter), "`. Invalid values are ignored.")]
            pub fn $setter(&self, value: impl Into<PropertyValue>) -> &Self {
                self.set(&PositionPatch::new().with(PositionKey::$key, value))
            }
        )*
    };
}

impl Position {
    /// Create a Position.
    ///
    /// The initial patch is applied first, then validators are installed
    /// (re-validating the initial state), then the parent is bound.
    pub fn new(runtime: &Runtime, options: PositionOptions) -> Result<Self> {
        let PositionOptions {
            parent,
            initial,
            validators,
            calculate_transform,
            initial_helper,
            ortho,
            transform_origin,
            immediate_element_update,
        } = options;

        let inner = Rc::new_cyclic(|weak: &Weak<PositionInner>| PositionInner {
            runtime: runtime.clone(),
            data: RefCell::new(PositionData {
                transform_origin: Some(transform_origin),
                ..Default::default()
            }),
            transforms: RefCell::new(Transforms::new()),
            validators: AdapterValidators::new(),
            stores: PositionStores::new(weak.clone()),
            data_store: Store::default(),
            element: RefCell::new(None),
            style_cache: RefCell::new(StyleCache::new()),
            settings: RefCell::new(Settings {
                calculate_transform,
                initial_helper,
                ortho,
                immediate: immediate_element_update,
            }),
            states: RefCell::new(StateStore::default()),
            pending: RefCell::new(PendingUpdate::default()),
            resize_subscription: RefCell::new(None),
        });
        let position = Self { inner };

        let weak = Rc::downgrade(&position.inner);
        position.inner.validators.set_on_update(Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                Position::from_inner(inner).revalidate();
            }
        }));

        let weak = Rc::downgrade(&position.inner);
        let unsubscribe = position
            .inner
            .stores
            .resize_observed()
            .subscribe(move |data: &ResizeData| {
                if let Some(inner) = weak.upgrade() {
                    Position::from_inner(inner).on_resize(data);
                }
            });
        *position.inner.resize_subscription.borrow_mut() = Some(unsubscribe);

        position.set(&initial);
        position.publish();
        position.inner.validators.add(validators)?;
        let snapshot = position.get();
        position.inner.states.borrow_mut().set_default(snapshot);

        if parent.is_some() {
            position.set_parent(parent);
        }
        debug!(?position, "position created");
        Ok(position)
    }

    pub(crate) fn from_inner(inner: Rc<PositionInner>) -> Self {
        Self { inner }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    /// Copy of the committed data.
    pub fn get(&self) -> PositionData {
        *self.inner.data.borrow()
    }

    /// Copy the committed data into `target`.
    pub fn get_into(&self, target: &mut PositionData) {
        target.copy(&self.inner.data.borrow());
    }

    /// Filtered view of the committed data.
    pub fn get_with(&self, options: &GetOptions) -> PositionPatch {
        let data = self.get();
        let keys = options.keys.unwrap_or(PositionKeys::all()) - options.exclude;
        keys.keys()
            .map(|key| {
                let value = match data.number(key) {
                    None if options.numeric && key.numeric_default().is_some() => {
                        PropertyValue::from(key.numeric_default())
                    }
                    _ => data.value(key),
                };
                (key, value)
            })
            .collect()
    }

    /// Patch of every property that is currently set.
    fn current_patch(&self) -> PositionPatch {
        let data = self.get();
        PositionKey::ALL
            .into_iter()
            .map(|key| (key, data.value(key)))
            .filter(|(_, value)| !value.is_null())
            .collect()
    }

    property_accessors! {
        Left => left, set_left: Option<f64>;
        Top => top, set_top: Option<f64>;
        Width => width, set_width: Option<Dimension>;
        Height => height, set_height: Option<Dimension>;
        MinWidth => min_width, set_min_width: Option<f64>;
        MinHeight => min_height, set_min_height: Option<f64>;
        MaxWidth => max_width, set_max_width: Option<f64>;
        MaxHeight => max_height, set_max_height: Option<f64>;
        RotateX => rotate_x, set_rotate_x: Option<f64>;
        RotateY => rotate_y, set_rotate_y: Option<f64>;
        RotateZ => rotate_z, set_rotate_z: Option<f64>;
        Scale => scale, set_scale: Option<f64>;
        TranslateX => translate_x, set_translate_x: Option<f64>;
        TranslateY => translate_y, set_translate_y: Option<f64>;
        TranslateZ => translate_z, set_translate_z: Option<f64>;
        TransformOrigin => transform_origin, set_transform_origin: Option<TransformOrigin>;
        ZIndex => z_index, set_z_index: Option<f64>;
    }

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------

    pub fn stores(&self) -> &PositionStores {
        &self.inner.stores
    }

    pub fn validators(&self) -> &AdapterValidators {
        &self.inner.validators
    }

    /// Snapshot of the local transforms.
    pub fn transforms(&self) -> Transforms {
        self.inner.transforms.borrow().clone()
    }

    /// Transform geometry of the committed data, using cached measurements.
    pub fn transform_data(&self) -> TransformData {
        let data = self.get();
        let validation = ValidationData::new(
            data,
            self.bound_element(),
            self.inner.style_cache.borrow().snapshot(),
            self.transforms(),
            self.inner.runtime.viewport(),
            Default::default(),
        );
        let mut output = TransformData::default();
        self.inner
            .transforms
            .borrow()
            .get_data(&data, &mut output, Some(&validation));
        output
    }

    pub fn animate(&self) -> AnimationAPI {
        AnimationAPI::new(self.clone())
    }

    /// Committed data with `auto`/`inherit` width and height replaced by the
    /// measured offset size of the bound element. Tweens start from here.
    pub(crate) fn tween_base(&self) -> PositionData {
        let mut data = self.get();
        let Some(element) = self.bound_element() else {
            return data;
        };
        let computed = self.fill_style_cache(&element);
        if data.width.is_some_and(Dimension::is_measured) {
            data.width = Some(Dimension::Px(computed.offset_width));
        }
        if data.height.is_some_and(Dimension::is_measured) {
            data.height = Some(Dimension::Px(computed.offset_height));
        }
        data
    }

    pub fn state(&self) -> PositionStateAPI {
        PositionStateAPI::new(self.clone())
    }

    pub fn ortho(&self) -> bool {
        self.inner.settings.borrow().ortho
    }

    pub fn calculate_transform(&self) -> bool {
        self.inner.settings.borrow().calculate_transform
    }

    pub fn set_calculate_transform(&self, calculate_transform: bool) {
        self.inner.settings.borrow_mut().calculate_transform = calculate_transform;
        if !calculate_transform {
            self.inner.stores.publish_transform(None);
        }
    }

    pub fn set_initial_helper(&self, helper: Option<Rc<dyn InitialHelper>>) {
        self.inner.settings.borrow_mut().initial_helper = helper;
    }

    // -------------------------------------------------------------------------
    // Element binding
    // -------------------------------------------------------------------------

    /// Assigned parent element, connected or not.
    pub fn parent(&self) -> Option<ElementRef> {
        self.inner.element.borrow().clone()
    }

    /// Connected bound element.
    fn bound_element(&self) -> Option<ElementRef> {
        self.inner
            .element
            .borrow()
            .clone()
            .filter(ElementRef::is_connected)
    }

    /// Rebind to a new element, or unbind with `None`.
    ///
    /// The previous element's resize registration is removed first. Cached
    /// computed style and the default state snapshot are reset, and the current
    /// data is written to the new element.
    pub fn set_parent(&self, parent: Option<ElementRef>) {
        let inner = &self.inner;
        let previous = inner.element.borrow().clone();
        if previous == parent {
            return;
        }

        let resize = inner.runtime.resize().clone();
        let target = ResizeTarget::Store(inner.stores.resize_observed());
        if let Some(previous) = &previous {
            resize.remove(previous, Some(&target));
        }

        *inner.element.borrow_mut() = parent.clone();
        inner.style_cache.borrow_mut().reset();
        inner.states.borrow_mut().clear_default();
        inner.stores.publish_element(parent.clone());
        debug!(?previous, ?parent, "position parent changed");

        // Registered even while disconnected; measurements apply once connected.
        if let Some(element) = &parent {
            if let Err(error) = resize.add(element, target) {
                warn!(%error, "resize registration failed");
            }
        }
        if self.bound_element().is_some() {
            let patch = self.current_patch();
            self.update(&patch, true);
        } else {
            self.publish();
        }
    }

    /// Future resolved with the frame timestamp of the next element write.
    ///
    /// Resolves immediately with the last write's timestamp when no write is
    /// pending.
    pub fn element_updated(&self) -> LocalBoxFuture<'static, f64> {
        let mut pending = self.inner.pending.borrow_mut();
        let last = pending.last_timestamp;
        if !pending.queued {
            return future::ready(last).boxed_local();
        }
        let (sender, receiver) = oneshot::channel();
        pending.waiters.push(sender);
        receiver.map(move |result| result.unwrap_or(last)).boxed_local()
    }

    // -------------------------------------------------------------------------
    // Writing
    // -------------------------------------------------------------------------

    /// Merge `patch` into the current data through the validator pipeline.
    ///
    /// Keys absent from the patch are untouched. Invalid values are skipped.
    /// A veto leaves everything unchanged.
    pub fn set(&self, patch: &PositionPatch) -> &Self {
        self.update(patch, false);
        self
    }

    /// Re-run the pipeline over the current data.
    fn revalidate(&self) {
        let patch = self.current_patch();
        self.update(&patch, false);
    }

    /// Returns false when vetoed.
    fn update(&self, patch: &PositionPatch, force_write: bool) -> bool {
        let inner = &self.inner;
        let element = self.bound_element();
        let computed = match &element {
            Some(element) => self.fill_style_cache(element),
            None => StyleSnapshot::default(),
        };

        let current = self.get();
        let mut candidate = current;
        for (key, value) in patch.iter() {
            if !merge_value(&mut candidate, key, value, &computed) {
                trace!(%key, ?value, "ignored invalid value");
            }
        }
        normalize(&mut candidate);

        let viewport = inner.runtime.viewport();
        let helper = inner.settings.borrow().initial_helper.clone();
        if let Some(helper) = helper {
            if candidate.left.is_none() && !patch.contains(PositionKey::Left) {
                let width = candidate
                    .width
                    .and_then(Dimension::px)
                    .unwrap_or(computed.offset_width);
                candidate.left = Some(helper.get_left(width, viewport).round());
            }
            if candidate.top.is_none() && !patch.contains(PositionKey::Top) {
                let height = candidate
                    .height
                    .and_then(Dimension::px)
                    .unwrap_or(computed.offset_height);
                candidate.top = Some(helper.get_top(height, viewport).round());
            }
        }

        let validation = ValidationData::new(
            candidate,
            element.clone(),
            computed,
            self.transforms(),
            viewport,
            patch.rest().clone(),
        );
        let Some(mut validated) = inner.validators.run(validation) else {
            trace!("position update vetoed");
            return false;
        };
        normalize(&mut validated);

        let changed = inner.data.borrow_mut().commit(&validated);
        let data = self.get();
        if changed.intersects(PositionKeys::TRANSFORM) {
            let mut transforms = inner.transforms.borrow_mut();
            for key in (changed & PositionKeys::TRANSFORM).keys() {
                transforms.set(key, data.number(key));
            }
        }
        if changed.is_empty() && !force_write {
            return true;
        }
        trace!(?changed, "position committed");

        if element.is_some() {
            inner.states.borrow_mut().set_default_if_missing(data);
            if inner.settings.borrow().immediate {
                self.flush_element(inner.runtime.now());
            } else {
                self.queue_element_update();
            }
        } else {
            self.publish();
        }
        true
    }

    /// Overwrite `keys` of the data without validation, element writes or
    /// store notifications.
    pub(crate) fn write_silent(&self, data: &PositionData, keys: PositionKeys) {
        {
            let mut current = self.inner.data.borrow_mut();
            for key in keys.keys() {
                match key {
                    PositionKey::Width => current.width = data.width,
                    PositionKey::Height => current.height = data.height,
                    PositionKey::TransformOrigin => current.transform_origin = data.transform_origin,
                    _ => current.set_number(key, data.number(key)),
                }
            }
        }
        let current = self.get();
        self.inner.transforms.borrow_mut().reset(&current);
    }

    /// Replace the local transforms from `data`.
    pub(crate) fn reset_transforms(&self, data: &PositionData) {
        self.inner.transforms.borrow_mut().reset(data);
    }

    pub(crate) fn states(&self) -> &RefCell<StateStore> {
        &self.inner.states
    }

    /// Fill the computed style cache, adding a `will-change` hint on the
    /// first fill after binding.
    ///
    /// The hint is a rendering hint, not position data. It is written before
    /// validation runs, so a vetoed first update still leaves it in place.
    fn fill_style_cache(&self, element: &ElementRef) -> StyleSnapshot {
        let first = !self.inner.style_cache.borrow().is_filled();
        let snapshot = self.inner.style_cache.borrow_mut().fill(element);
        if first && !snapshot.has_will_change {
            let hint = if self.ortho() {
                "transform"
            } else {
                "top, left, transform"
            };
            element.set_style_property("will-change", Some(hint));
        }
        snapshot
    }

    fn queue_element_update(&self) {
        {
            let mut pending = self.inner.pending.borrow_mut();
            if pending.queued {
                return;
            }
            pending.queued = true;
        }
        let weak: Weak<dyn ElementUpdate> = Rc::downgrade(&self.inner) as Weak<dyn ElementUpdate>;
        self.inner.runtime.updates().add(weak);
    }

    /// Write styles, publish, and resolve `element_updated` waiters.
    fn flush_element(&self, timestamp: f64) {
        let waiters = {
            let mut pending = self.inner.pending.borrow_mut();
            pending.queued = false;
            pending.last_timestamp = timestamp;
            std::mem::take(&mut pending.waiters)
        };
        if let Some(element) = self.bound_element() {
            let data = self.get();
            let transforms = self.transforms();
            apply_styles(&element, &data, &transforms, self.ortho());
        }
        self.publish();
        for waiter in waiters {
            let _ = waiter.send(timestamp);
        }
    }

    /// Per-property stores, derived channels, then whole-object subscribers.
    fn publish(&self) {
        let data = self.get();
        self.inner.stores.publish(&data);
        if self.calculate_transform() {
            self.inner.stores.publish_transform(Some(self.transform_data()));
        }
        self.inner.data_store.set(data);
    }

    fn on_resize(&self, data: &ResizeData) {
        let Some(element) = self.bound_element() else {
            return;
        };
        // Fill first so a later fill cannot overwrite the measurement.
        self.fill_style_cache(&element);
        self.inner
            .style_cache
            .borrow_mut()
            .set_offset(data.offset_width, data.offset_height);
        self.inner.stores.publish_resize(data);

        let measured = {
            let current = self.inner.data.borrow();
            current.width.is_some_and(Dimension::is_measured)
                || current.height.is_some_and(Dimension::is_measured)
        };
        if measured && (data.offset_width.is_some() || data.offset_height.is_some()) {
            self.update(&PositionPatch::new(), false);
        }
    }

    /// Subscribe to committed changes. The handler runs once immediately.
    pub fn subscribe(&self, handler: impl Fn(&PositionData) + 'static) -> Unsubscriber {
        self.inner.data_store.subscribe(handler)
    }

    /// Signal mirror of the whole record for spark-signals computations.
    pub fn signal(&self) -> spark_signals::Signal<PositionData> {
        self.inner.data_store.signal()
    }
}

impl Readable<PositionData> for Position {
    fn get(&self) -> PositionData {
        Position::get(self)
    }

    fn subscribe_boxed(&self, handler: Box<dyn Fn(&PositionData)>) -> Unsubscriber {
        self.inner.data_store.subscribe_boxed(handler)
    }
}

// =============================================================================
// Value parsing
// =============================================================================

/// Merge one patch entry into `candidate`. Returns false for invalid input.
fn merge_value(
    candidate: &mut PositionData,
    key: PositionKey,
    value: &PropertyValue,
    computed: &StyleSnapshot,
) -> bool {
    match (key, value) {
        (PositionKey::TransformOrigin, PropertyValue::Null) => {
            candidate.transform_origin = None;
            true
        }
        (PositionKey::TransformOrigin, PropertyValue::Text(text)) => match TransformOrigin::parse(text) {
            Some(origin) => {
                candidate.transform_origin = Some(origin);
                true
            }
            None => false,
        },
        (PositionKey::TransformOrigin, PropertyValue::Number(_)) => false,
        (_, PropertyValue::Null) => {
            candidate.set_number(key, None);
            true
        }
        (_, PropertyValue::Number(number)) => {
            if !number.is_finite() {
                return false;
            }
            candidate.set_number(key, Some(*number));
            true
        }
        (PositionKey::Width | PositionKey::Height, PropertyValue::Text(text))
            if matches!(text.trim(), "auto" | "inherit") =>
        {
            let dimension = if text.trim() == "auto" {
                Dimension::Auto
            } else {
                Dimension::Inherit
            };
            if key == PositionKey::Width {
                candidate.width = Some(dimension);
            } else {
                candidate.height = Some(dimension);
            }
            true
        }
        (_, PropertyValue::Text(text)) => {
            let resolved = match Relative::parse(text) {
                Some(relative) => {
                    let base = candidate.number(key).or(match key {
                        PositionKey::Width => Some(computed.offset_width),
                        PositionKey::Height => Some(computed.offset_height),
                        _ => None,
                    });
                    Some(relative.apply(base))
                }
                None => parse_px(text),
            };
            match resolved.filter(|value| value.is_finite()) {
                Some(value) => {
                    candidate.set_number(key, Some(value));
                    true
                }
                None => false,
            }
        }
    }
}

/// Round pixel and stacking values, clamp scale.
fn normalize(data: &mut PositionData) {
    fn round(value: &mut Option<f64>) {
        if let Some(v) = value.as_mut().filter(|v| v.is_finite()) {
            *v = v.round();
        }
    }
    round(&mut data.left);
    round(&mut data.top);
    round(&mut data.min_width);
    round(&mut data.min_height);
    round(&mut data.max_width);
    round(&mut data.max_height);
    round(&mut data.z_index);
    for dimension in [&mut data.width, &mut data.height] {
        if let Some(Dimension::Px(px)) = dimension.as_mut().filter(|d| d.px().is_some_and(f64::is_finite)) {
            *px = px.round();
        }
    }
    if let Some(scale) = data.scale.as_mut().filter(|s| s.is_finite()) {
        *scale = scale.clamp(0.0, 1000.0);
    }
}

// =============================================================================
// Tests
// =============================================================================
