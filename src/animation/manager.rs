//! AnimationManager - Task table of scheduled tweens.
//!
//! Every scheduled animation is one [`Tween`] row. The frame driver
//! ([`AnimationManager::step`]) walks the table in registration order and
//! commits interpolated values through `Position::set`, so animated values go
//! through the same validators as direct writes.
//!
//! Overlap is a set difference: registering a tween removes its keys from
//! every other row driving the same Position. A row left without keys is
//! dropped and settled as cancelled.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::position::Position;
use crate::types::{PositionKey, PositionKeys, PositionPatch};

use super::control::{AnimationControl, AnimationStatus, ControlState};
use super::easing::{Easing, Interpolate};

// =============================================================================
// Tween
// =============================================================================

/// One row of the task table. Times are in milliseconds.
pub(crate) struct Tween {
    pub(crate) id: u64,
    pub(crate) position: Position,
    pub(crate) keys: PositionKeys,
    pub(crate) initial: BTreeMap<PositionKey, f64>,
    pub(crate) destination: BTreeMap<PositionKey, f64>,
    pub(crate) current: BTreeMap<PositionKey, f64>,
    pub(crate) elapsed: f64,
    pub(crate) duration: f64,
    pub(crate) delay_remaining: f64,
    pub(crate) ease: Easing,
    pub(crate) interpolate: Interpolate,
    pub(crate) control: Rc<ControlState>,
    pub(crate) quick: bool,
    last: Option<f64>,
}

impl Tween {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: u64,
        position: Position,
        initial: BTreeMap<PositionKey, f64>,
        destination: BTreeMap<PositionKey, f64>,
        duration: f64,
        delay: f64,
        ease: Easing,
        interpolate: Interpolate,
        quick: bool,
    ) -> Self {
        Self {
            id,
            position,
            keys: destination.keys().copied().collect(),
            current: initial.clone(),
            initial,
            destination,
            elapsed: 0.0,
            duration,
            delay_remaining: delay,
            ease,
            interpolate,
            control: ControlState::new(),
            quick,
            last: None,
        }
    }

    /// Restart the time window without losing the frame reference.
    pub(crate) fn restart(&mut self) {
        self.elapsed = 0.0;
        self.delay_remaining = 0.0;
    }

    /// Advance to `timestamp`. Returns the patch to commit and whether the
    /// tween is done, or `None` while delayed.
    fn advance(&mut self, timestamp: f64) -> Option<(PositionPatch, bool)> {
        let mut delta = match self.last {
            Some(last) => (timestamp - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(timestamp);

        if self.delay_remaining > 0.0 {
            if delta < self.delay_remaining {
                self.delay_remaining -= delta;
                return None;
            }
            delta -= self.delay_remaining;
            self.delay_remaining = 0.0;
        }

        self.elapsed += delta;
        let done = self.duration <= 0.0 || self.elapsed >= self.duration;
        let mut patch = PositionPatch::new();
        if done {
            for key in self.keys.keys() {
                if let Some(value) = self.destination.get(&key) {
                    self.current.insert(key, *value);
                    patch.insert(key, *value);
                }
            }
        } else {
            let t = self.ease.apply(self.elapsed / self.duration);
            for key in self.keys.keys() {
                if let (Some(start), Some(end)) = (self.initial.get(&key), self.destination.get(&key)) {
                    let value = (self.interpolate)(*start, *end, t);
                    self.current.insert(key, value);
                    patch.insert(key, value);
                }
            }
        }
        Some((patch, done))
    }
}

/// Read-only view of one scheduled animation.
#[derive(Debug, Clone)]
pub struct ScheduledAnimation {
    pub position: Position,
    pub keys: PositionKeys,
    /// Seconds.
    pub elapsed: f64,
    /// Seconds.
    pub duration: f64,
    /// Remaining delay in seconds.
    pub delay: f64,
    /// Entry driven by a quickTo handle.
    pub quick: bool,
    pub control: AnimationControl,
}

// =============================================================================
// AnimationManager
// =============================================================================

#[derive(Default)]
struct ManagerInner {
    entries: RefCell<Vec<Tween>>,
    next_id: Cell<u64>,
}

/// Per-runtime animation task table. Clones share state.
#[derive(Clone, Default)]
pub struct AnimationManager {
    inner: Rc<ManagerInner>,
}

impl AnimationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&self) -> u64 {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        id
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    fn control_of(&self, tween: &Tween) -> AnimationControl {
        AnimationControl::new(tween.id, tween.control.clone(), self.clone())
    }

    /// Register a tween, superseding overlapping keys of other rows.
    pub(crate) fn add(&self, tween: Tween) -> AnimationControl {
        let cancelled = self.strip_overlap(&tween.position, tween.keys, None);
        let control = self.control_of(&tween);
        debug!(id = tween.id, keys = ?tween.keys, quick = tween.quick, "animation scheduled");
        self.inner.entries.borrow_mut().push(tween);
        settle_all(cancelled, AnimationStatus::Cancelled);
        control
    }

    /// Remove `keys` from every row of `position` except `except`.
    pub(crate) fn strip_overlap(
        &self,
        position: &Position,
        keys: PositionKeys,
        except: Option<u64>,
    ) -> Vec<Rc<ControlState>> {
        let mut entries = self.inner.entries.borrow_mut();
        let mut cancelled = Vec::new();
        entries.retain_mut(|entry| {
            if Some(entry.id) == except || &entry.position != position || !entry.keys.intersects(keys) {
                return true;
            }
            entry.keys -= keys;
            if entry.keys.is_empty() {
                debug!(id = entry.id, "animation superseded");
                cancelled.push(entry.control.clone());
                return false;
            }
            true
        });
        cancelled
    }

    /// Mutate a live row.
    pub(crate) fn with_entry<R>(&self, id: u64, f: impl FnOnce(&mut Tween) -> R) -> Option<R> {
        self.inner
            .entries
            .borrow_mut()
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(f)
    }

    pub(crate) fn control(&self, id: u64) -> Option<AnimationControl> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| self.control_of(entry))
    }

    /// Remove one row. Returns whether it was present.
    pub(crate) fn cancel_id(&self, id: u64) -> bool {
        let removed = self.remove_where(|entry| entry.id == id);
        !removed.is_empty()
    }

    /// Cancel rows of `position`. With `keys`, only those keys are removed and
    /// rows left empty are cancelled.
    pub(crate) fn cancel_position(&self, position: &Position, keys: Option<PositionKeys>) {
        match keys {
            Some(keys) => settle_all(
                self.strip_overlap(position, keys, None),
                AnimationStatus::Cancelled,
            ),
            None => {
                self.remove_where(|entry| &entry.position == position);
            }
        }
    }

    /// Cancel every row of every Position.
    pub fn cancel_all(&self) {
        let count = self.remove_where(|_| true).len();
        if count > 0 {
            debug!(count, "all animations cancelled");
        }
    }

    fn remove_where(&self, predicate: impl Fn(&Tween) -> bool) -> Vec<u64> {
        let removed: Vec<Tween> = {
            let mut entries = self.inner.entries.borrow_mut();
            let (removed, kept): (Vec<Tween>, Vec<Tween>) =
                entries.drain(..).partition(|entry| predicate(entry));
            *entries = kept;
            removed
        };
        let ids = removed.iter().map(|entry| entry.id).collect();
        for entry in removed {
            debug!(id = entry.id, "animation cancelled");
            entry.control.settle(AnimationStatus::Cancelled);
        }
        ids
    }

    pub(crate) fn is_scheduled(&self, position: &Position, keys: Option<PositionKeys>) -> bool {
        self.inner.entries.borrow().iter().any(|entry| {
            &entry.position == position && keys.is_none_or(|keys| entry.keys.intersects(keys))
        })
    }

    /// Rows of `position`, or of every Position.
    pub fn scheduled(&self, position: Option<&Position>) -> Vec<ScheduledAnimation> {
        self.inner
            .entries
            .borrow()
            .iter()
            .filter(|entry| position.is_none_or(|position| &entry.position == position))
            .map(|entry| ScheduledAnimation {
                position: entry.position.clone(),
                keys: entry.keys,
                elapsed: entry.elapsed / 1000.0,
                duration: entry.duration / 1000.0,
                delay: entry.delay_remaining / 1000.0,
                quick: entry.quick,
                control: self.control_of(entry),
            })
            .collect()
    }

    /// Advance every row to `timestamp` (milliseconds).
    ///
    /// Rows are processed in registration order; rows added during the step
    /// wait for the next frame, rows removed during it are skipped.
    pub fn step(&self, timestamp: f64) {
        let ids: Vec<u64> = self.inner.entries.borrow().iter().map(|entry| entry.id).collect();
        for id in ids {
            let frame = self.with_entry(id, |entry| {
                entry
                    .advance(timestamp)
                    .map(|(patch, done)| (entry.position.clone(), patch, done))
            });
            let Some(Some((position, patch, done))) = frame else {
                continue;
            };

            position.set(&patch);

            if done {
                // A quickTo retarget during `set` restarts the row instead.
                let finished = {
                    let mut entries = self.inner.entries.borrow_mut();
                    let index = entries
                        .iter()
                        .position(|entry| entry.id == id && entry.elapsed >= entry.duration);
                    index.map(|index| entries.remove(index))
                };
                if let Some(entry) = finished {
                    debug!(id, "animation finished");
                    entry.control.settle(AnimationStatus::Finished);
                }
            }
        }
    }
}

fn settle_all(controls: Vec<Rc<ControlState>>, status: AnimationStatus) {
    for control in controls {
        control.settle(status);
    }
}

impl std::fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationManager")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::lerp;
    use crate::position::PositionOptions;
    use crate::runtime::Runtime;

    fn setup() -> (Runtime, Position) {
        let runtime = Runtime::headless();
        let position = Position::new(&runtime, PositionOptions::default()).unwrap();
        (runtime, position)
    }

    fn tween(manager: &AnimationManager, position: &Position, key: PositionKey, from: f64, to: f64) -> Tween {
        Tween::new(
            manager.next_id(),
            position.clone(),
            BTreeMap::from([(key, from)]),
            BTreeMap::from([(key, to)]),
            100.0,
            0.0,
            Easing::Linear,
            Rc::new(lerp),
            false,
        )
    }

    #[test]
    fn test_step_interpolates_and_finishes() {
        let (runtime, position) = setup();
        let manager = runtime.animation().clone();
        let control = manager.add(tween(&manager, &position, PositionKey::Left, 0.0, 100.0));

        manager.step(1000.0);
        assert_eq!(position.left(), Some(0.0));
        manager.step(1050.0);
        assert_eq!(position.left(), Some(50.0));
        manager.step(1200.0);
        assert_eq!(position.left(), Some(100.0));
        assert!(manager.is_empty());
        assert_eq!(control.status(), AnimationStatus::Finished);
    }

    #[test]
    fn test_delay_holds_commits() {
        let (runtime, position) = setup();
        let manager = runtime.animation().clone();
        let mut entry = tween(&manager, &position, PositionKey::Top, 10.0, 20.0);
        entry.delay_remaining = 100.0;
        manager.add(entry);

        manager.step(0.0);
        manager.step(60.0);
        assert_eq!(position.top(), None);
        // 40ms of delay left, 10ms carried into the tween.
        manager.step(110.0);
        assert_eq!(position.top(), Some(11.0));
    }

    #[test]
    fn test_overlap_strips_keys() {
        let (runtime, position) = setup();
        let manager = runtime.animation().clone();
        let first = manager.add(tween(&manager, &position, PositionKey::Left, 0.0, 100.0));
        let second = manager.add(tween(&manager, &position, PositionKey::Left, 0.0, 50.0));
        assert!(first.is_cancelled());
        assert!(second.is_active());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_cancel_position_by_keys() {
        let (runtime, position) = setup();
        let manager = runtime.animation().clone();
        let control = manager.add(tween(&manager, &position, PositionKey::Left, 0.0, 100.0));
        manager.cancel_position(&position, Some(PositionKeys::TOP));
        assert!(control.is_active());
        manager.cancel_position(&position, Some(PositionKeys::LEFT));
        assert!(control.is_cancelled());
        assert!(!manager.is_scheduled(&position, None));
    }
}
