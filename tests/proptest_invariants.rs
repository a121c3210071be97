//! Property-based invariant tests for the position pipeline.
//!
//! 1. Validators run in ascending weight order, ties in insertion order.
//! 2. Bounds keep a fitting box inside its container.
//! 3. Re-applying the last patch never notifies.
//! 4. No key is driven by two scheduled animations of one Position.
//! 5. Named easing curves hit their endpoints.
//! 6. Relative values apply to the committed value.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use proptest::prelude::*;
use spark_position::{
    AnimationOptions, BasicBounds, BoundsOptions, Easing, Position, PositionKey, PositionKeys,
    PositionOptions, PositionPatch, Runtime, ValidationData, ValidatorData,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn position() -> (Runtime, Position) {
    let runtime = Runtime::headless();
    let position = Position::new(&runtime, PositionOptions::default()).unwrap();
    (runtime, position)
}

fn animatable_key() -> impl Strategy<Value = PositionKey> {
    prop::sample::select(vec![
        PositionKey::Left,
        PositionKey::Top,
        PositionKey::Width,
        PositionKey::Height,
        PositionKey::RotateZ,
        PositionKey::Scale,
        PositionKey::TranslateX,
        PositionKey::TranslateY,
    ])
}

fn key_sets() -> impl Strategy<Value = Vec<Vec<PositionKey>>> {
    prop::collection::vec(prop::collection::vec(animatable_key(), 1..4), 1..8)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Validator ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn validators_run_by_ascending_weight(weights in prop::collection::vec(0u8..=10, 1..8)) {
        let (_runtime, position) = position();
        let order = Rc::new(RefCell::new(Vec::new()));

        let validators = weights.iter().enumerate().map(|(index, weight)| {
            let order = order.clone();
            ValidatorData::from_fn(move |data: &ValidationData| {
                order.borrow_mut().push(index);
                Some(data.position)
            })
            .with_weight(f64::from(*weight) / 10.0)
        });
        position.validators().add(validators.collect::<Vec<_>>()).unwrap();
        order.borrow_mut().clear();
        position.set_left(1.0);

        let mut expected: Vec<usize> = (0..weights.len()).collect();
        expected.sort_by_key(|index| weights[*index]);
        prop_assert_eq!(&*order.borrow(), &expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Bounds containment
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bounds_keep_box_inside(
        left in -2000i32..2000,
        top in -2000i32..2000,
        width in 1u16..400,
        height in 1u16..300,
    ) {
        let runtime = Runtime::headless();
        let position = Position::new(
            &runtime,
            PositionOptions::default()
                .with_initial(
                    PositionPatch::new()
                        .with(PositionKey::Width, f64::from(width))
                        .with(PositionKey::Height, f64::from(height)),
                )
                .with_validator(ValidatorData::new(BasicBounds::new(
                    BoundsOptions::default().with_size(800.0, 600.0),
                ))),
        )
        .unwrap();

        position.set(
            &PositionPatch::new()
                .with(PositionKey::Left, left)
                .with(PositionKey::Top, top),
        );
        let left = position.left().unwrap();
        let top = position.top().unwrap();
        prop_assert!(left >= 0.0 && left + f64::from(width) <= 800.0);
        prop_assert!(top >= 0.0 && top + f64::from(height) <= 600.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_patch_is_silent(
        left in -500.0f64..500.0,
        rotate in -360.0f64..360.0,
        scale in 0.0f64..5.0,
    ) {
        let (_runtime, position) = position();
        let patch = PositionPatch::new()
            .with(PositionKey::Left, left)
            .with(PositionKey::RotateZ, rotate)
            .with(PositionKey::Scale, scale);
        position.set(&patch);

        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        let _unsubscribe = position.subscribe(move |_| n.set(n.get() + 1));
        let before = position.get();
        position.set(&patch);
        prop_assert_eq!(position.get(), before);
        prop_assert_eq!(notified.get(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Animation overlap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scheduled_animations_drive_disjoint_keys(sets in key_sets()) {
        let (_runtime, position) = position();
        for keys in &sets {
            let patch: PositionPatch = keys.iter().map(|key| (*key, 10.0)).collect();
            position.animate().to(&patch, &AnimationOptions::default()).unwrap();
        }

        let mut seen = PositionKeys::empty();
        for scheduled in position.animate().scheduled() {
            prop_assert!(!scheduled.keys.is_empty());
            prop_assert!(!seen.intersects(scheduled.keys));
            seen |= scheduled.keys;
        }
        let last: PositionKeys = sets.last().unwrap().iter().copied().collect();
        prop_assert!(seen.contains(last));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Easing endpoints
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn easing_is_anchored(index in 0usize..31) {
        let easing = Easing::NAMED[index].clone();
        prop_assert!(easing.apply(0.0).abs() < 1e-9);
        prop_assert!((easing.apply(1.0) - 1.0).abs() < 1e-9);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Relative values
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn relative_add_uses_committed_value(start in -1000i32..1000, delta in -1000i32..1000) {
        let (_runtime, position) = position();
        position.set_left(start);
        position.set_left(format!("+={delta}"));
        prop_assert_eq!(position.left(), Some(f64::from(start + delta)));
    }
}
