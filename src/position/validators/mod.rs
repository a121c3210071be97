//! Validators - Weighted veto/rewrite pipeline run on every `Position::set`.
//!
//! Validators are kept sorted ascending by weight; equal weights keep their
//! insertion order. Each validator receives the previous one's output and may
//! return a rewritten [`PositionData`] or `None` to veto the whole update.
//!
//! # Example
//!
//! ```ignore
//! use spark_position::position::validators::{BasicBounds, BoundsOptions, ValidatorData};
//!
//! let bounds = BasicBounds::new(BoundsOptions::default().with_size(800.0, 600.0));
//! position.validators().add([ValidatorData::new(bounds.clone()).with_weight(0.5)])?;
//! bounds.set_enabled(false); // re-validates through the subscription
//! ```

mod bounds;
mod centered;

pub use bounds::{BasicBounds, BoundsConfig, BoundsOptions, TransformBounds};
pub use centered::{Centered, InitialHelper};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{PositionError, Result};
use crate::store::Unsubscriber;

use super::data::PositionData;
use super::validation::ValidationData;

// =============================================================================
// Validator contract
// =============================================================================

/// A pluggable constraint.
pub trait Validator {
    /// Return the (possibly rewritten) position, or `None` to veto.
    ///
    /// Must not depend on anything other than `data` and the validator's own
    /// configuration.
    fn validate(&self, data: &ValidationData) -> Option<PositionData>;

    /// Subscribe to configuration changes.
    ///
    /// Implementations that support it call `on_change` once synchronously and
    /// again whenever their configuration changes.
    fn subscribe(&self, _on_change: Rc<dyn Fn()>) -> Option<Unsubscriber> {
        None
    }
}

struct FnValidator<F>(F);

impl<F> Validator for FnValidator<F>
where
    F: Fn(&ValidationData) -> Option<PositionData>,
{
    fn validate(&self, data: &ValidationData) -> Option<PositionData> {
        (self.0)(data)
    }
}

/// A validator plus its pipeline metadata.
#[derive(Clone)]
pub struct ValidatorData {
    pub id: Option<String>,
    pub validator: Rc<dyn Validator>,
    /// Sort weight in `[0, 1]`. Defaults to 1.
    pub weight: f64,
}

impl ValidatorData {
    pub fn new(validator: impl Validator + 'static) -> Self {
        Self::from_rc(Rc::new(validator))
    }

    pub fn from_rc(validator: Rc<dyn Validator>) -> Self {
        Self {
            id: None,
            validator,
            weight: 1.0,
        }
    }

    /// Wrap a plain function.
    pub fn from_fn(f: impl Fn(&ValidationData) -> Option<PositionData> + 'static) -> Self {
        Self::new(FnValidator(f))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl fmt::Debug for ValidatorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorData")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

fn same_validator(a: &Rc<dyn Validator>, b: &Rc<dyn Validator>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

// =============================================================================
// AdapterValidators
// =============================================================================

struct Entry {
    data: ValidatorData,
    unsubscribe: Option<Unsubscriber>,
}

struct AdapterInner {
    entries: RefCell<Vec<Entry>>,
    enabled: Cell<bool>,
    on_update: RefCell<Option<Rc<dyn Fn()>>>,
}

/// The validator pipeline owned by a Position.
#[derive(Clone)]
pub struct AdapterValidators {
    inner: Rc<AdapterInner>,
}

impl Default for AdapterValidators {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterValidators {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(AdapterInner {
                entries: RefCell::new(Vec::new()),
                enabled: Cell::new(true),
                on_update: RefCell::new(None),
            }),
        }
    }

    /// Callback asking the owner to re-validate. Set once by the owning Position.
    pub(crate) fn set_on_update(&self, on_update: Rc<dyn Fn()>) {
        *self.inner.on_update.borrow_mut() = Some(on_update);
    }

    fn request_update(&self) {
        let on_update = self.inner.on_update.borrow().clone();
        if let Some(on_update) = on_update {
            on_update();
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// When disabled the pipeline accepts every candidate unchanged.
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.set(enabled);
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Validators in pipeline order.
    pub fn iter(&self) -> Vec<ValidatorData> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.data.clone())
            .collect()
    }

    /// Insert validators by weight.
    ///
    /// Every weight is checked before anything is inserted. Validators that
    /// subscribe are expected to fire their change callback synchronously;
    /// when fewer fire than were added, one re-validation is requested so the
    /// current state is checked against the new pipeline.
    pub fn add(&self, validators: impl IntoIterator<Item = ValidatorData>) -> Result<()> {
        let validators: Vec<ValidatorData> = validators.into_iter().collect();
        if let Some(bad) = validators
            .iter()
            .find(|data| !data.weight.is_finite() || !(0.0..=1.0).contains(&data.weight))
        {
            return Err(PositionError::InvalidWeight { weight: bad.weight });
        }
        if validators.is_empty() {
            return Ok(());
        }

        {
            let mut entries = self.inner.entries.borrow_mut();
            for data in &validators {
                let index = entries
                    .iter()
                    .position(|entry| entry.data.weight > data.weight)
                    .unwrap_or(entries.len());
                debug!(id = ?data.id, weight = data.weight, index, "validator added");
                entries.insert(
                    index,
                    Entry {
                        data: data.clone(),
                        unsubscribe: None,
                    },
                );
            }
        }

        // No borrow held: subscribe callbacks re-enter through on_update.
        let fired = Rc::new(Cell::new(0usize));
        for data in &validators {
            let did_fire = Rc::new(Cell::new(false));
            let flag = did_fire.clone();
            let adapter = Rc::downgrade(&self.inner);
            let on_change: Rc<dyn Fn()> = Rc::new(move || {
                flag.set(true);
                if let Some(inner) = adapter.upgrade() {
                    AdapterValidators { inner }.request_update();
                }
            });
            let unsubscribe = data.validator.subscribe(on_change);
            if did_fire.get() {
                fired.set(fired.get() + 1);
            }
            if let Some(unsubscribe) = unsubscribe {
                let mut entries = self.inner.entries.borrow_mut();
                match entries
                    .iter_mut()
                    .find(|entry| same_validator(&entry.data.validator, &data.validator) && entry.unsubscribe.is_none())
                {
                    Some(entry) => entry.unsubscribe = Some(unsubscribe),
                    None => {
                        // Removed again from inside its own callback.
                        drop(entries);
                        unsubscribe();
                    }
                }
            }
        }

        if fired.get() < validators.len() {
            self.request_update();
        }
        Ok(())
    }

    fn remove_where(&self, predicate: impl Fn(&ValidatorData) -> bool) -> usize {
        let removed: Vec<Entry> = {
            let mut entries = self.inner.entries.borrow_mut();
            let (removed, kept): (Vec<Entry>, Vec<Entry>) =
                entries.drain(..).partition(|entry| predicate(&entry.data));
            *entries = kept;
            removed
        };
        let count = removed.len();
        for entry in removed {
            debug!(id = ?entry.data.id, "validator removed");
            if let Some(unsubscribe) = entry.unsubscribe {
                unsubscribe();
            }
        }
        count
    }

    /// Remove a validator by identity. Returns whether it was present.
    pub fn remove(&self, validator: &Rc<dyn Validator>) -> bool {
        self.remove_where(|data| same_validator(&data.validator, validator)) > 0
    }

    /// Remove every validator matching `predicate`.
    pub fn remove_by(&self, predicate: impl Fn(&ValidatorData) -> bool) -> usize {
        self.remove_where(predicate)
    }

    /// Remove validators whose id is in `ids`.
    pub fn remove_by_id(&self, ids: &[&str]) -> usize {
        self.remove_where(|data| data.id.as_deref().is_some_and(|id| ids.contains(&id)))
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.remove_where(|_| true);
    }

    /// Run the pipeline. `None` means vetoed.
    pub(crate) fn run(&self, mut data: ValidationData) -> Option<PositionData> {
        if !self.enabled() {
            return Some(data.position);
        }
        let validators: Vec<Rc<dyn Validator>> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.data.validator.clone())
            .collect();

        for validator in validators {
            data.position = validator.validate(&data)?;
            data.refresh_size();
        }
        Some(data.position)
    }
}

impl fmt::Debug for AdapterValidators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterValidators")
            .field("enabled", &self.enabled())
            .field("validators", &self.iter())
            .finish()
    }
}

impl Drop for AdapterInner {
    fn drop(&mut self) {
        for entry in self.entries.get_mut().drain(..) {
            if let Some(unsubscribe) = entry.unsubscribe {
                unsubscribe();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::StyleSnapshot;
    use crate::position::transforms::Transforms;
    use crate::runtime::Viewport;
    use crate::types::Dimension;

    fn setup(position: PositionData) -> ValidationData {
        ValidationData::new(
            position,
            None,
            StyleSnapshot::default(),
            Transforms::new(),
            Viewport::default(),
            Default::default(),
        )
    }

    fn shift(amount: f64) -> impl Fn(&ValidationData) -> Option<PositionData> {
        move |data| {
            let mut out = data.position;
            out.left = out.left.map(|left| left + amount);
            Some(out)
        }
    }

    fn ids(adapter: &AdapterValidators) -> Vec<String> {
        adapter.iter().into_iter().filter_map(|data| data.id).collect()
    }

    #[test]
    fn test_sorted_by_weight_with_stable_ties() {
        let adapter = AdapterValidators::new();
        adapter
            .add([
                ValidatorData::from_fn(shift(0.0)).with_id("a"),
                ValidatorData::from_fn(shift(0.0)).with_id("b").with_weight(0.5),
                ValidatorData::from_fn(shift(0.0)).with_id("c").with_weight(0.5),
                ValidatorData::from_fn(shift(0.0)).with_id("d").with_weight(0.1),
            ])
            .unwrap();
        assert_eq!(ids(&adapter), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_invalid_weight_rejects_batch() {
        let adapter = AdapterValidators::new();
        let result = adapter.add([
            ValidatorData::from_fn(shift(0.0)),
            ValidatorData::from_fn(shift(0.0)).with_weight(1.5),
        ]);
        assert_eq!(result, Err(PositionError::InvalidWeight { weight: 1.5 }));
        assert!(adapter.is_empty());

        let result = adapter.add([ValidatorData::from_fn(shift(0.0)).with_weight(f64::NAN)]);
        assert!(matches!(result, Err(PositionError::InvalidWeight { .. })));
    }

    #[test]
    fn test_pipeline_chains_outputs() {
        let adapter = AdapterValidators::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let spy = seen.clone();
        adapter
            .add([
                ValidatorData::from_fn(move |data: &ValidationData| {
                    spy.borrow_mut().push(data.position.left);
                    Some(data.position)
                })
                .with_weight(0.8),
                ValidatorData::from_fn(shift(10.0)).with_weight(0.2),
            ])
            .unwrap();

        let out = adapter.run(setup(PositionData {
            left: Some(1.0),
            ..Default::default()
        }));
        assert_eq!(out.and_then(|data| data.left), Some(11.0));
        assert_eq!(*seen.borrow(), vec![Some(11.0)]);
    }

    #[test]
    fn test_later_validators_see_updated_limits() {
        let adapter = AdapterValidators::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let spy = seen.clone();
        adapter
            .add([
                ValidatorData::from_fn(|data: &ValidationData| {
                    let mut out = data.position;
                    out.max_width = Some(150.0);
                    out.width = Some(Dimension::Px(150.0));
                    Some(out)
                })
                .with_weight(0.2),
                ValidatorData::from_fn(move |data: &ValidationData| {
                    spy.borrow_mut().push((data.width, data.max_width));
                    Some(data.position)
                })
                .with_weight(0.8),
            ])
            .unwrap();

        adapter.run(setup(PositionData {
            width: Some(Dimension::Px(400.0)),
            max_width: Some(500.0),
            ..Default::default()
        }));
        assert_eq!(*seen.borrow(), vec![(150.0, Some(150.0))]);
    }

    #[test]
    fn test_veto_stops_pipeline() {
        let adapter = AdapterValidators::new();
        let reached = Rc::new(Cell::new(false));
        let flag = reached.clone();
        adapter
            .add([
                ValidatorData::from_fn(|_: &ValidationData| None).with_weight(0.1),
                ValidatorData::from_fn(move |data: &ValidationData| {
                    flag.set(true);
                    Some(data.position)
                }),
            ])
            .unwrap();
        assert_eq!(adapter.run(setup(PositionData::default())), None);
        assert!(!reached.get());

        adapter.set_enabled(false);
        assert!(adapter.run(setup(PositionData::default())).is_some());
    }

    #[test]
    fn test_remove_variants() {
        let adapter = AdapterValidators::new();
        let keep = ValidatorData::from_fn(shift(0.0)).with_id("keep");
        let target = keep.validator.clone();
        adapter
            .add([
                keep,
                ValidatorData::from_fn(shift(0.0)).with_id("x"),
                ValidatorData::from_fn(shift(0.0)).with_id("y").with_weight(0.3),
            ])
            .unwrap();

        assert_eq!(adapter.remove_by_id(&["x", "missing"]), 1);
        assert_eq!(adapter.remove_by(|data| data.weight < 0.5), 1);
        assert!(adapter.remove(&target));
        assert!(!adapter.remove(&target));
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_add_requests_update_when_nothing_fired() {
        let adapter = AdapterValidators::new();
        let updates = Rc::new(Cell::new(0));
        let u = updates.clone();
        adapter.set_on_update(Rc::new(move || u.set(u.get() + 1)));

        adapter.add([ValidatorData::from_fn(shift(0.0))]).unwrap();
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_subscribing_validator_fires_instead_of_forced_update() {
        let adapter = AdapterValidators::new();
        let updates = Rc::new(Cell::new(0));
        let u = updates.clone();
        adapter.set_on_update(Rc::new(move || u.set(u.get() + 1)));

        let bounds = BasicBounds::new(BoundsOptions::default());
        adapter.add([ValidatorData::new(bounds.clone())]).unwrap();
        // One synchronous fire from subscribe, no forced update on top.
        assert_eq!(updates.get(), 1);

        bounds.set_constrain(false);
        assert_eq!(updates.get(), 2);

        adapter.clear();
        bounds.set_constrain(true);
        assert_eq!(updates.get(), 2);
    }
}
