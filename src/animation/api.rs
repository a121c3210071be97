//! AnimationAPI - Tweens for one Position.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::error::{PositionError, Result};
use crate::position::{Position, PositionData};
use crate::types::{parse_px, PositionKey, PositionKeys, PositionPatch, PropertyValue, Relative};

use super::control::AnimationControl;
use super::easing::{lerp, Easing, Interpolate};
use super::manager::{ScheduledAnimation, Tween};
use super::quick_to::QuickTo;

// =============================================================================
// Options
// =============================================================================

/// Timing of a tween. Durations are in seconds.
#[derive(Clone)]
pub struct AnimationOptions {
    pub delay: f64,
    pub duration: f64,
    pub ease: Easing,
    /// Defaults to linear interpolation.
    pub interpolate: Option<Interpolate>,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            duration: 1.0,
            ease: Easing::default(),
            interpolate: None,
        }
    }
}

impl AnimationOptions {
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
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

    pub fn with_interpolate(mut self, interpolate: impl Fn(f64, f64, f64) -> f64 + 'static) -> Self {
        self.interpolate = Some(Rc::new(interpolate));
        self
    }

    /// Delay and duration in milliseconds.
    pub(crate) fn timing(&self) -> Result<(f64, f64)> {
        Ok((validate_delay(self.delay)?, validate_duration(self.duration)?))
    }

    pub(crate) fn interpolator(&self) -> Interpolate {
        self.interpolate.clone().unwrap_or_else(|| Rc::new(lerp))
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("interpolate", &self.interpolate.is_some())
            .finish()
    }
}

/// Options of a quickTo handle. Duration is in seconds.
#[derive(Clone)]
pub struct QuickToOptions {
    pub duration: f64,
    pub ease: Easing,
    pub interpolate: Option<Interpolate>,
}

impl Default for QuickToOptions {
    fn default() -> Self {
        Self {
            duration: 1.0,
            ease: Easing::default(),
            interpolate: None,
        }
    }
}

impl QuickToOptions {
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_interpolate(mut self, interpolate: impl Fn(f64, f64, f64) -> f64 + 'static) -> Self {
        self.interpolate = Some(Rc::new(interpolate));
        self
    }
}

impl fmt::Debug for QuickToOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickToOptions")
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("interpolate", &self.interpolate.is_some())
            .finish()
    }
}

pub(crate) fn validate_delay(delay: f64) -> Result<f64> {
    if !delay.is_finite() || delay < 0.0 {
        warn!(delay, "rejected animation delay");
        return Err(PositionError::InvalidDelay { delay });
    }
    Ok(delay * 1000.0)
}

pub(crate) fn validate_duration(duration: f64) -> Result<f64> {
    if !duration.is_finite() || duration < 0.0 {
        warn!(duration, "rejected animation duration");
        return Err(PositionError::InvalidDuration { duration });
    }
    Ok(duration * 1000.0)
}

/// Numeric target for `key`, resolving relative strings against `current`.
pub(crate) fn resolve_number(value: &PropertyValue, current: Option<f64>) -> Option<f64> {
    let resolved = match value {
        PropertyValue::Number(number) => Some(*number),
        PropertyValue::Text(text) => match Relative::parse(text) {
            Some(relative) => Some(relative.apply(current)),
            None => parse_px(text),
        },
        PropertyValue::Null => None,
    };
    resolved.filter(|value| value.is_finite())
}

/// Animatable numeric entries of `patch`.
pub(crate) fn numeric_targets(patch: &PositionPatch, data: &PositionData) -> BTreeMap<PositionKey, f64> {
    patch
        .iter()
        .filter(|(key, _)| key.is_animatable())
        .filter_map(|(key, value)| resolve_number(value, data.numeric(key)).map(|n| (key, n)))
        .collect()
}

// =============================================================================
// AnimationAPI
// =============================================================================

/// Tween scheduling for one Position, from [`Position::animate`].
#[derive(Debug, Clone)]
pub struct AnimationAPI {
    position: Position,
}

impl AnimationAPI {
    pub(crate) fn new(position: Position) -> Self {
        Self { position }
    }

    /// Animate from the current values to `to`.
    pub fn to(&self, to: &PositionPatch, options: &AnimationOptions) -> Result<AnimationControl> {
        let timing = options.timing()?;
        let data = self.position.tween_base();
        let destination = numeric_targets(to, &data);
        let initial = starting_values(&destination, &data);
        Ok(self.schedule(initial, destination, timing, options))
    }

    /// Jump to `from`, then animate back to the current values.
    pub fn from(&self, from: &PositionPatch, options: &AnimationOptions) -> Result<AnimationControl> {
        let timing = options.timing()?;
        let data = self.position.tween_base();
        let initial = numeric_targets(from, &data);
        let destination = starting_values(&initial, &data);
        Ok(self.schedule(initial, destination, timing, options))
    }

    /// Animate from `from` to `to`. Keys present only in `to` start at their
    /// current value.
    pub fn from_to(
        &self,
        from: &PositionPatch,
        to: &PositionPatch,
        options: &AnimationOptions,
    ) -> Result<AnimationControl> {
        let timing = options.timing()?;
        let data = self.position.tween_base();
        let destination = numeric_targets(to, &data);
        let explicit = numeric_targets(from, &data);
        let mut initial = starting_values(&destination, &data);
        for (key, value) in explicit {
            if destination.contains_key(&key) {
                initial.insert(key, value);
            }
        }
        Ok(self.schedule(initial, destination, timing, options))
    }

    /// Reusable handle retargeting one shared tween for `keys`.
    pub fn quick_to(&self, keys: &[PositionKey], options: QuickToOptions) -> Result<QuickTo> {
        QuickTo::new(self.position.clone(), keys, options)
    }

    fn schedule(
        &self,
        initial: BTreeMap<PositionKey, f64>,
        destination: BTreeMap<PositionKey, f64>,
        (delay, duration): (f64, f64),
        options: &AnimationOptions,
    ) -> AnimationControl {
        if destination.is_empty() {
            return AnimationControl::void();
        }
        let manager = self.position.runtime().animation().clone();
        let keys: PositionKeys = destination.keys().copied().collect();

        if duration == 0.0 && delay == 0.0 {
            manager.cancel_position(&self.position, Some(keys));
            let patch: PositionPatch = destination.into_iter().collect();
            self.position.set(&patch);
            return AnimationControl::void();
        }

        // The start values are visible right away.
        let start: PositionPatch = initial.iter().map(|(key, value)| (*key, *value)).collect();
        if delay == 0.0 {
            self.position.set(&start);
        }

        manager.add(Tween::new(
            manager.next_id(),
            self.position.clone(),
            initial,
            destination,
            duration,
            delay,
            options.ease.clone(),
            options.interpolator(),
            false,
        ))
    }

    /// Cancel every animation of this Position.
    pub fn cancel(&self) {
        self.position
            .runtime()
            .animation()
            .cancel_position(&self.position, None);
    }

    /// Stop animating `keys`. Animations left without keys are cancelled.
    pub fn cancel_keys(&self, keys: PositionKeys) {
        self.position
            .runtime()
            .animation()
            .cancel_position(&self.position, Some(keys));
    }

    pub fn is_scheduled(&self) -> bool {
        self.position
            .runtime()
            .animation()
            .is_scheduled(&self.position, None)
    }

    /// True when any of `keys` is being animated.
    pub fn is_scheduled_keys(&self, keys: PositionKeys) -> bool {
        self.position
            .runtime()
            .animation()
            .is_scheduled(&self.position, Some(keys))
    }

    pub fn scheduled(&self) -> Vec<ScheduledAnimation> {
        self.position
            .runtime()
            .animation()
            .scheduled(Some(&self.position))
    }
}

/// Current value per key, falling back to the numeric default, then to the
/// other end of the tween.
fn starting_values(
    targets: &BTreeMap<PositionKey, f64>,
    data: &PositionData,
) -> BTreeMap<PositionKey, f64> {
    targets
        .iter()
        .map(|(key, target)| (*key, data.numeric(*key).unwrap_or(*target)))
        .collect()
}
