//! PositionStateAPI - Named snapshots of PositionData.

use std::collections::{BTreeMap, HashMap};

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use tracing::debug;

use crate::animation::{AnimationControl, AnimationOptions, Easing, Interpolate};
use crate::error::Result;
use crate::types::{PositionKeys, PositionPatch, PropertyValue};

use super::data::PositionData;
use super::Position;

/// A saved snapshot plus caller data stored alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedState {
    pub name: String,
    pub data: PositionData,
    pub extra: BTreeMap<String, PropertyValue>,
}

/// Snapshot storage owned by one Position.
#[derive(Debug, Default)]
pub(crate) struct StateStore {
    saved: HashMap<String, SavedState>,
    default: Option<PositionData>,
}

impl StateStore {
    pub(crate) fn set_default(&mut self, data: PositionData) {
        self.default = Some(data);
    }

    pub(crate) fn set_default_if_missing(&mut self, data: PositionData) {
        self.default.get_or_insert(data);
    }

    pub(crate) fn clear_default(&mut self) {
        self.default = None;
    }
}

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub name: String,
    pub extra: BTreeMap<String, PropertyValue>,
}

impl SaveOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

#[derive(Clone)]
pub struct RestoreOptions {
    pub name: String,
    /// Delete the snapshot after retrieval.
    pub remove: bool,
    /// Restore only these properties.
    pub properties: Option<PositionKeys>,
    /// Write data without validation, element writes or notifications.
    pub silent: bool,
    /// Tween to the snapshot instead of setting it.
    pub animate_to: bool,
    /// Seconds.
    pub duration: f64,
    pub ease: Easing,
    pub interpolate: Option<Interpolate>,
}

impl RestoreOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remove: false,
            properties: None,
            silent: false,
            animate_to: false,
            duration: 0.1,
            ease: Easing::Linear,
            interpolate: None,
        }
    }

    pub fn with_remove(mut self, remove: bool) -> Self {
        self.remove = remove;
        self
    }

    pub fn with_properties(mut self, properties: PositionKeys) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_animate_to(mut self, animate_to: bool) -> Self {
        self.animate_to = animate_to;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    fn animation_options(&self) -> AnimationOptions {
        AnimationOptions {
            delay: 0.0,
            duration: self.duration,
            ease: self.ease.clone(),
            interpolate: self.interpolate.clone(),
        }
    }
}

impl std::fmt::Debug for RestoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestoreOptions")
            .field("name", &self.name)
            .field("remove", &self.remove)
            .field("properties", &self.properties)
            .field("silent", &self.silent)
            .field("animate_to", &self.animate_to)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResetOptions {
    pub keep_z_index: bool,
    /// Apply the default snapshot through `set`. When false only the local
    /// transforms are reset.
    pub invoke_set: bool,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            keep_z_index: false,
            invoke_set: true,
        }
    }
}

impl ResetOptions {
    pub fn with_keep_z_index(mut self, keep: bool) -> Self {
        self.keep_z_index = keep;
        self
    }

    pub fn with_invoke_set(mut self, invoke: bool) -> Self {
        self.invoke_set = invoke;
        self
    }
}

/// Result of a restore.
#[derive(Debug, Clone)]
pub struct Restored {
    pub state: SavedState,
    /// Set when the restore animates.
    pub animation: Option<AnimationControl>,
}

// =============================================================================
// PositionStateAPI
// =============================================================================

/// Named snapshots of one Position, from [`Position::state`].
#[derive(Debug, Clone)]
pub struct PositionStateAPI {
    position: Position,
}

impl PositionStateAPI {
    pub(crate) fn new(position: Position) -> Self {
        Self { position }
    }

    pub fn get(&self, name: &str) -> Option<SavedState> {
        self.position.states().borrow().saved.get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<SavedState> {
        self.position.states().borrow_mut().saved.remove(name)
    }

    /// Snapshot of the current data under `options.name`, replacing any
    /// previous snapshot of that name.
    pub fn save(&self, options: SaveOptions) -> SavedState {
        let state = SavedState {
            name: options.name,
            data: self.position.get(),
            extra: options.extra,
        };
        debug!(name = %state.name, "position state saved");
        self.position
            .states()
            .borrow_mut()
            .saved
            .insert(state.name.clone(), state.clone());
        state
    }

    /// Snapshot captured at the most recent element binding.
    pub fn default_state(&self) -> Option<PositionData> {
        self.position.states().borrow().default
    }

    /// Apply a snapshot. `Ok(None)` when no snapshot has that name.
    pub fn restore(&self, options: RestoreOptions) -> Result<Option<Restored>> {
        let state = {
            let mut states = self.position.states().borrow_mut();
            if options.remove {
                states.saved.remove(&options.name)
            } else {
                states.saved.get(&options.name).cloned()
            }
        };
        let Some(state) = state else {
            return Ok(None);
        };
        let keys = options.properties.unwrap_or(PositionKeys::all());

        if options.silent {
            self.position.write_silent(&state.data, keys);
            return Ok(Some(Restored {
                state,
                animation: None,
            }));
        }

        if options.animate_to {
            // Not animatable; applied up front.
            if keys.contains(PositionKeys::TRANSFORM_ORIGIN)
                && state.data.transform_origin != self.position.transform_origin()
            {
                self.position.set(
                    &PositionPatch::new().with(
                        crate::types::PositionKey::TransformOrigin,
                        state.data.transform_origin,
                    ),
                );
            }
            let mut target = state.data.to_patch();
            target.retain_keys(keys);
            let control = self
                .position
                .animate()
                .to(&target, &options.animation_options())?;
            return Ok(Some(Restored {
                state,
                animation: Some(control),
            }));
        }

        let mut patch = state.data.to_patch();
        patch.retain_keys(keys);
        self.position.set(&patch);
        Ok(Some(Restored {
            state,
            animation: None,
        }))
    }

    /// Like [`restore`](Self::restore), resolving once an animated restore
    /// has settled.
    pub fn restore_async(&self, options: RestoreOptions) -> LocalBoxFuture<'static, Result<Option<SavedState>>> {
        match self.restore(options) {
            Ok(Some(Restored {
                state,
                animation: Some(control),
            })) => control.finished().map(move |_| Ok(Some(state))).boxed_local(),
            Ok(restored) => future::ready(Ok(restored.map(|restored| restored.state))).boxed_local(),
            Err(error) => future::ready(Err(error)).boxed_local(),
        }
    }

    /// Return to the default snapshot. False when there is none.
    ///
    /// Scheduled animations are cancelled first.
    pub fn reset(&self, options: ResetOptions) -> bool {
        let Some(mut data) = self.default_state() else {
            return false;
        };
        self.position.animate().cancel();
        if options.keep_z_index {
            data.z_index = self.position.z_index();
        }
        self.position.reset_transforms(&data);
        if options.invoke_set {
            self.position.set(&data.to_patch());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationStatus;
    use crate::position::PositionOptions;
    use crate::runtime::Runtime;
    use crate::types::PositionKey;
    use futures::executor::block_on;

    fn setup() -> (Runtime, Position) {
        let runtime = Runtime::headless();
        let position = Position::new(
            &runtime,
            PositionOptions::default().with_initial(
                PositionPatch::new()
                    .with(PositionKey::Left, 10.0)
                    .with(PositionKey::Top, 20.0),
            ),
        )
        .unwrap();
        (runtime, position)
    }

    #[test]
    fn test_save_get_remove() {
        let (_runtime, position) = setup();
        let state = position.state();
        let saved = state.save(SaveOptions::new("a").with_extra("note", "docked"));
        assert_eq!(saved.data.left, Some(10.0));
        assert_eq!(state.get("a").unwrap().extra["note"], PropertyValue::from("docked"));
        assert!(state.remove("a").is_some());
        assert!(state.get("a").is_none());
    }

    #[test]
    fn test_restore_missing_is_none() {
        let (_runtime, position) = setup();
        assert!(position.state().restore(RestoreOptions::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_restore_with_properties_and_remove() {
        let (_runtime, position) = setup();
        let state = position.state();
        state.save(SaveOptions::new("home"));
        position.set(&PositionPatch::new().with(PositionKey::Left, 99.0).with(PositionKey::Top, 99.0));

        state
            .restore(
                RestoreOptions::new("home")
                    .with_properties(PositionKeys::LEFT)
                    .with_remove(true),
            )
            .unwrap()
            .unwrap();
        assert_eq!(position.left(), Some(10.0));
        assert_eq!(position.top(), Some(99.0));
        assert!(state.get("home").is_none());
    }

    #[test]
    fn test_silent_restore_skips_subscribers() {
        let (_runtime, position) = setup();
        let state = position.state();
        state.save(SaveOptions::new("home"));
        position.set_left(50.0);

        let notified = std::rc::Rc::new(std::cell::Cell::new(0));
        let n = notified.clone();
        let _unsub = position.subscribe(move |_| n.set(n.get() + 1));
        state
            .restore(RestoreOptions::new("home").with_silent(true))
            .unwrap();
        assert_eq!(position.left(), Some(10.0));
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn test_animated_restore_async() {
        let (runtime, position) = setup();
        let state = position.state();
        state.save(SaveOptions::new("home"));
        position.set_left(110.0);

        let restored = state.restore_async(RestoreOptions::new("home").with_animate_to(true));
        runtime.tick(0.0);
        runtime.tick(50.0);
        assert_eq!(position.left(), Some(60.0));
        runtime.tick(100.0);
        let saved = block_on(restored).unwrap().unwrap();
        assert_eq!(saved.name, "home");
        assert_eq!(position.left(), Some(10.0));
    }

    #[test]
    fn test_reset_to_default() {
        let (_runtime, position) = setup();
        position.set(
            &PositionPatch::new()
                .with(PositionKey::Left, 300.0)
                .with(PositionKey::ZIndex, 7.0)
                .with(PositionKey::RotateZ, 45.0),
        );
        let control = position
            .animate()
            .to(&PositionPatch::new().with(PositionKey::Top, 500.0), &AnimationOptions::default())
            .unwrap();

        assert!(position.state().reset(ResetOptions::default().with_keep_z_index(true)));
        assert_eq!(control.status(), AnimationStatus::Cancelled);
        assert_eq!(position.left(), Some(10.0));
        assert_eq!(position.top(), Some(20.0));
        assert_eq!(position.z_index(), Some(7.0));
        assert_eq!(position.rotate_z(), None);
        assert!(!position.transforms().is_active());
    }
}
