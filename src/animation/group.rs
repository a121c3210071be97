//! AnimationGroupAPI - The per-position API applied across many Positions.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::position::Position;
use crate::runtime::Runtime;
use crate::types::{PositionKey, PositionPatch};

use super::api::{AnimationOptions, QuickToOptions};
use super::control::AnimationGroupControl;
use super::manager::ScheduledAnimation;
use super::quick_to::QuickTo;

/// Per-position data for a group call.
#[derive(Clone)]
pub enum GroupData {
    /// Same patch for every Position.
    Same(PositionPatch),
    /// Computed per Position from its index; `None` skips it.
    PerPosition(Rc<dyn Fn(usize, &Position) -> Option<PositionPatch>>),
}

impl GroupData {
    pub fn per_position(f: impl Fn(usize, &Position) -> Option<PositionPatch> + 'static) -> Self {
        Self::PerPosition(Rc::new(f))
    }

    fn resolve(&self, index: usize, position: &Position) -> Option<PositionPatch> {
        match self {
            Self::Same(patch) => Some(patch.clone()),
            Self::PerPosition(f) => f(index, position),
        }
    }
}

impl From<PositionPatch> for GroupData {
    fn from(patch: PositionPatch) -> Self {
        Self::Same(patch)
    }
}

impl fmt::Debug for GroupData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same(patch) => f.debug_tuple("Same").field(patch).finish(),
            Self::PerPosition(_) => f.write_str("PerPosition(..)"),
        }
    }
}

/// Group animation entry point, from [`Runtime::animate`].
#[derive(Debug, Clone)]
pub struct AnimationGroupAPI {
    runtime: Runtime,
}

impl AnimationGroupAPI {
    pub(crate) fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }

    pub fn to(
        &self,
        positions: &[Position],
        data: &GroupData,
        options: &AnimationOptions,
    ) -> Result<AnimationGroupControl> {
        options.timing()?;
        let mut controls = Vec::with_capacity(positions.len());
        for (index, position) in positions.iter().enumerate() {
            if let Some(patch) = data.resolve(index, position) {
                controls.push(position.animate().to(&patch, options)?);
            }
        }
        Ok(AnimationGroupControl::new(controls))
    }

    pub fn from(
        &self,
        positions: &[Position],
        data: &GroupData,
        options: &AnimationOptions,
    ) -> Result<AnimationGroupControl> {
        options.timing()?;
        let mut controls = Vec::with_capacity(positions.len());
        for (index, position) in positions.iter().enumerate() {
            if let Some(patch) = data.resolve(index, position) {
                controls.push(position.animate().from(&patch, options)?);
            }
        }
        Ok(AnimationGroupControl::new(controls))
    }

    /// Positions are skipped when either side resolves to `None`.
    pub fn from_to(
        &self,
        positions: &[Position],
        from: &GroupData,
        to: &GroupData,
        options: &AnimationOptions,
    ) -> Result<AnimationGroupControl> {
        options.timing()?;
        let mut controls = Vec::with_capacity(positions.len());
        for (index, position) in positions.iter().enumerate() {
            let (Some(from), Some(to)) = (from.resolve(index, position), to.resolve(index, position)) else {
                continue;
            };
            controls.push(position.animate().from_to(&from, &to, options)?);
        }
        Ok(AnimationGroupControl::new(controls))
    }

    pub fn quick_to(
        &self,
        positions: &[Position],
        keys: &[PositionKey],
        options: QuickToOptions,
    ) -> Result<QuickToGroup> {
        let handles = positions
            .iter()
            .map(|position| position.animate().quick_to(keys, options.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(QuickToGroup { handles })
    }

    pub fn cancel(&self, positions: &[Position]) {
        for position in positions {
            position.animate().cancel();
        }
    }

    /// Cancel every animation in this runtime.
    pub fn cancel_all(&self) {
        self.runtime.animation().cancel_all();
    }

    pub fn get_scheduled(&self, positions: &[Position]) -> Vec<ScheduledAnimation> {
        positions
            .iter()
            .flat_map(|position| position.animate().scheduled())
            .collect()
    }

    /// True when any of `positions` is animating.
    pub fn is_scheduled(&self, positions: &[Position]) -> bool {
        positions.iter().any(|position| position.animate().is_scheduled())
    }
}

/// quickTo handles created together.
#[derive(Debug, Clone)]
pub struct QuickToGroup {
    handles: Vec<QuickTo>,
}

impl QuickToGroup {
    pub fn handles(&self) -> &[QuickTo] {
        &self.handles
    }

    /// Same values for every Position.
    pub fn call(&self, values: &[f64]) {
        for handle in &self.handles {
            handle.call(values);
        }
    }

    pub fn call_with(&self, data: &GroupData) {
        for (index, handle) in self.handles.iter().enumerate() {
            if let Some(patch) = data.resolve(index, handle.position()) {
                handle.call_with(&patch);
            }
        }
    }

    pub fn options(&self, options: QuickToOptions) -> Result<&Self> {
        for handle in &self.handles {
            handle.options(options.clone())?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationStatus, Easing};
    use crate::position::PositionOptions;
    use futures::executor::block_on;

    fn setup(count: usize) -> (Runtime, Vec<Position>) {
        let runtime = Runtime::headless();
        let positions = (0..count)
            .map(|_| {
                let position = Position::new(&runtime, PositionOptions::default()).unwrap();
                position.set_left(0.0);
                position
            })
            .collect();
        (runtime, positions)
    }

    #[test]
    fn test_group_to_with_per_position_data() {
        let (runtime, positions) = setup(3);
        let group = runtime.animate();
        let data = GroupData::per_position(|index, _| {
            (index != 1).then(|| PositionPatch::new().with(PositionKey::Left, 100.0 * (index as f64 + 1.0)))
        });
        let control = group
            .to(&positions, &data, &AnimationOptions::default().with_ease(Easing::Linear))
            .unwrap();
        assert_eq!(control.len(), 2);
        assert!(group.is_scheduled(&positions));

        runtime.tick(0.0);
        runtime.tick(1000.0);
        assert_eq!(positions[0].left(), Some(100.0));
        assert_eq!(positions[1].left(), Some(0.0));
        assert_eq!(positions[2].left(), Some(300.0));
        assert_eq!(
            block_on(control.finished()),
            vec![AnimationStatus::Finished, AnimationStatus::Finished]
        );
    }

    #[test]
    fn test_cancel_all_is_global() {
        let (runtime, positions) = setup(2);
        let group = runtime.animate();
        let data = GroupData::from(PositionPatch::new().with(PositionKey::Top, 10.0));
        let control = group.to(&positions, &data, &AnimationOptions::default()).unwrap();
        assert_eq!(group.get_scheduled(&positions).len(), 2);
        group.cancel_all();
        assert!(!group.is_scheduled(&positions));
        assert!(control.controls().iter().all(|c| c.is_cancelled()));
    }

    #[test]
    fn test_invalid_options_schedule_nothing() {
        let (runtime, positions) = setup(2);
        let group = runtime.animate();
        let data = GroupData::from(PositionPatch::new().with(PositionKey::Top, 10.0));
        assert!(group
            .to(&positions, &data, &AnimationOptions::default().with_delay(-1.0))
            .is_err());
        assert!(!group.is_scheduled(&positions));
    }

    #[test]
    fn test_quick_to_group() {
        let (runtime, positions) = setup(2);
        let quick = runtime
            .animate()
            .quick_to(&positions, &[PositionKey::Left], QuickToOptions::default().with_duration(0.5))
            .unwrap();
        quick.call(&[40.0]);
        runtime.tick(0.0);
        runtime.tick(500.0);
        assert!(positions.iter().all(|p| p.left() == Some(40.0)));
    }
}
