//! Drag Example - quickTo following a pointer inside bounds
//!
//! This example simulates dragging an element:
//! - A Position bound to an in-memory element
//! - BasicBounds keeping it inside an 800x600 container
//! - A quickTo handle retargeted on every pointer move
//! - A spark-signals effect printing each committed position
//!
//! Run with: cargo run --example drag

use std::rc::Rc;

use spark_position::{
    BasicBounds, BoundsOptions, Easing, ElementRef, MemoryElement, Position, PositionKey,
    PositionOptions, PositionPatch, QuickToOptions, Runtime, ValidatorData,
};
use spark_signals::effect;

fn main() -> spark_position::Result<()> {
    println!("=== spark-position Drag Example ===\n");

    let runtime = Runtime::headless();
    runtime.set_viewport(800.0, 600.0);

    let element = Rc::new(MemoryElement::new(120.0, 80.0));
    let position = Position::new(
        &runtime,
        PositionOptions::default()
            .with_parent(ElementRef::from(element.clone()))
            .with_initial(
                PositionPatch::new()
                    .with(PositionKey::Left, 40.0)
                    .with(PositionKey::Top, 40.0)
                    .with(PositionKey::Width, 120.0)
                    .with(PositionKey::Height, 80.0),
            )
            .with_validator(ValidatorData::new(BasicBounds::new(BoundsOptions::default()))),
    )?;

    let data = position.signal();
    let _stop = effect(move || {
        let data = data.get();
        println!(
            "  committed left={:?} top={:?}",
            data.left.unwrap_or_default(),
            data.top.unwrap_or_default()
        );
    });

    let drag = position.animate().quick_to(
        &[PositionKey::Left, PositionKey::Top],
        QuickToOptions::default()
            .with_duration(0.15)
            .with_ease(Easing::QuadraticOut),
    )?;

    // Pointer path; the last point is outside the container.
    let pointer = [(100.0, 60.0), (220.0, 140.0), (400.0, 260.0), (900.0, 700.0)];

    let mut now = 0.0;
    for (x, y) in pointer {
        println!("pointer -> ({x}, {y})");
        drag.call(&[x, y]);
        for _ in 0..4 {
            runtime.tick(now);
            now += 16.0;
        }
    }
    while position.animate().is_scheduled() {
        runtime.tick(now);
        now += 16.0;
    }
    runtime.tick(now);

    println!("\nfinal inline style:");
    for (name, value) in element.inline_style() {
        println!("  {name}: {value}");
    }
    Ok(())
}
