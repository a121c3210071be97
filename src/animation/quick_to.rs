//! QuickTo - Retargetable tween for continuously changing targets.
//!
//! Each call restarts the duration window from the value currently on screen,
//! so rapid successive targets (pointer drags) never snap back to an older
//! start value.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::position::Position;
use crate::types::{PositionKey, PositionKeys, PositionPatch};

use super::api::{numeric_targets, validate_duration, QuickToOptions};
use super::control::{AnimationControl, AnimationStatus};
use super::easing::{lerp, Easing, Interpolate};
use super::manager::Tween;

#[derive(Clone)]
struct QuickSettings {
    /// Milliseconds.
    duration: f64,
    ease: Easing,
    interpolate: Interpolate,
}

impl QuickSettings {
    fn from_options(options: QuickToOptions) -> Result<Self> {
        Ok(Self {
            duration: validate_duration(options.duration)?,
            ease: options.ease,
            interpolate: options.interpolate.unwrap_or_else(|| Rc::new(lerp)),
        })
    }
}

struct QuickToInner {
    position: Position,
    keys: Vec<PositionKey>,
    key_set: PositionKeys,
    settings: RefCell<QuickSettings>,
    entry: Cell<Option<u64>>,
}

/// Handle from [`AnimationAPI::quick_to`](super::AnimationAPI::quick_to).
/// Clones drive the same tween.
#[derive(Clone)]
pub struct QuickTo {
    inner: Rc<QuickToInner>,
}

impl QuickTo {
    pub(crate) fn new(position: Position, keys: &[PositionKey], options: QuickToOptions) -> Result<Self> {
        let settings = QuickSettings::from_options(options)?;
        let mut ordered = Vec::with_capacity(keys.len());
        for key in keys {
            if key.is_animatable() && !ordered.contains(key) {
                ordered.push(*key);
            }
        }
        Ok(Self {
            inner: Rc::new(QuickToInner {
                position,
                key_set: ordered.iter().copied().collect(),
                keys: ordered,
                settings: RefCell::new(settings),
                entry: Cell::new(None),
            }),
        })
    }

    /// Keys driven by this handle, in call order.
    pub fn keys(&self) -> &[PositionKey] {
        &self.inner.keys
    }

    pub fn position(&self) -> &Position {
        &self.inner.position
    }

    /// Retarget with values ordered like [`keys`](Self::keys). Extra or
    /// non-finite values are ignored.
    pub fn call(&self, values: &[f64]) {
        let destination = self
            .inner
            .keys
            .iter()
            .zip(values)
            .filter(|(_, value)| value.is_finite())
            .map(|(key, value)| (*key, *value))
            .collect();
        self.retarget(destination);
    }

    /// Retarget with a keyed patch. Keys outside this handle are ignored.
    pub fn call_with(&self, patch: &PositionPatch) {
        let data = self.inner.position.tween_base();
        let mut destination = numeric_targets(patch, &data);
        destination.retain(|key, _| self.inner.key_set.contains(key.flag()));
        self.retarget(destination);
    }

    /// Plain callback for event handlers.
    pub fn callback(&self) -> impl Fn(&[f64]) + 'static {
        let handle = self.clone();
        move |values| handle.call(values)
    }

    /// Change duration, easing or interpolation for subsequent calls.
    pub fn options(&self, options: QuickToOptions) -> Result<&Self> {
        let settings = QuickSettings::from_options(options)?;
        *self.inner.settings.borrow_mut() = settings;
        Ok(self)
    }

    /// Control of the live tween, or a void control when idle.
    pub fn control(&self) -> AnimationControl {
        self.inner
            .entry
            .get()
            .and_then(|id| self.inner.position.runtime().animation().control(id))
            .unwrap_or_else(AnimationControl::void)
    }

    fn retarget(&self, destination: BTreeMap<PositionKey, f64>) {
        if destination.is_empty() {
            return;
        }
        let inner = &self.inner;
        let position = &inner.position;
        let manager = position.runtime().animation().clone();
        let settings = inner.settings.borrow().clone();
        let keys: PositionKeys = destination.keys().copied().collect();

        if settings.duration == 0.0 {
            manager.cancel_position(position, Some(keys));
            let patch: PositionPatch = destination.into_iter().collect();
            position.set(&patch);
            return;
        }

        // On-screen value of keys the live tween still drives.
        let live = inner.entry.get().and_then(|id| {
            manager.with_entry(id, |tween| {
                let current: BTreeMap<PositionKey, f64> = tween
                    .current
                    .iter()
                    .filter(|(key, _)| tween.keys.contains(key.flag()))
                    .map(|(key, value)| (*key, *value))
                    .collect();
                (id, current)
            })
        });

        let committed = position.tween_base();
        let start = |key: PositionKey, target: f64| {
            live.as_ref()
                .and_then(|(_, current)| current.get(&key).copied())
                .or(committed.numeric(key))
                .unwrap_or(target)
        };

        match &live {
            Some((id, _)) => {
                let id = *id;
                manager.with_entry(id, |tween| {
                    // Keys not retargeted continue from where they are.
                    for key in tween.keys.keys() {
                        if let Some(current) = tween.current.get(&key).copied() {
                            tween.initial.insert(key, current);
                        }
                    }
                    for (key, target) in &destination {
                        let from = start(*key, *target);
                        tween.initial.insert(*key, from);
                        tween.current.insert(*key, from);
                        tween.destination.insert(*key, *target);
                    }
                    tween.keys |= keys;
                    tween.duration = settings.duration;
                    tween.ease = settings.ease.clone();
                    tween.interpolate = settings.interpolate.clone();
                    tween.restart();
                });
                for control in manager.strip_overlap(position, keys, Some(id)) {
                    control.settle(AnimationStatus::Cancelled);
                }
            }
            None => {
                let initial = destination
                    .iter()
                    .map(|(key, target)| (*key, start(*key, *target)))
                    .collect();
                let id = manager.next_id();
                manager.add(Tween::new(
                    id,
                    position.clone(),
                    initial,
                    destination,
                    settings.duration,
                    0.0,
                    settings.ease,
                    settings.interpolate,
                    true,
                ));
                inner.entry.set(Some(id));
                debug!(id, keys = ?keys, "quickTo tween started");
            }
        }
    }
}

impl std::fmt::Debug for QuickTo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickTo")
            .field("keys", &self.inner.keys)
            .field("entry", &self.inner.entry.get())
            .finish()
    }
}
