//! # spark-position
//!
//! Reactive positioning and animation engine for retained UI elements.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! A [`Position`] owns the position/transform record of one host element.
//! Every write goes through one pipeline:
//!
//! ```text
//! set(patch) → merge → validators (by weight) → commit → element style → stores
//! ```
//!
//! Animations and resize measurements feed the same pipeline. A [`Runtime`]
//! holds the shared services and is driven by the host's frame callback:
//!
//! ```text
//! Runtime::tick(ts) → AnimationManager::step → UpdateElementManager::flush
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Property keys, values, patches
//! - [`math`] - glam matrices, CSS output, bounding geometry
//! - [`store`] - Subscribable stores mirrored into signals
//! - [`element`] - Host element abstraction
//! - [`resize`] - Resize observation fan-out
//! - [`position`] - Position, transforms, validators, saved states
//! - [`animation`] - Tween scheduling, quickTo, easing
//! - [`runtime`] - Frame driver and shared services

pub mod animation;
pub mod element;
pub mod error;
pub mod math;
pub mod position;
pub mod resize;
pub mod runtime;
pub mod store;
pub mod types;

pub use types::*;

pub use error::{PositionError, Result};

pub use math::{css_matrix3d, DMat4, DVec3, Rect};

pub use store::{Readable, ReadableStore, Store, Unsubscriber, Writable};

pub use element::{Element, ElementRef, MemoryElement};

pub use resize::{
    ObserverBackend, ResizeCapabilities, ResizeData, ResizeEntry, ResizeObserverManager,
    ResizeTarget,
};

pub use position::{
    validators::{BasicBounds, BoundsOptions, Centered, TransformBounds},
    AdapterValidators, DimensionData, GetOptions, InitialHelper, Position, PositionData,
    PositionOptions, PositionStateAPI, PositionStores, ResetOptions, RestoreOptions,
    Restored, SaveOptions, SavedState, TransformData, Transforms, ValidationData, Validator,
    ValidatorData,
};

pub use animation::{
    AnimationAPI, AnimationControl, AnimationGroupAPI, AnimationGroupControl, AnimationOptions,
    AnimationStatus, Easing, GroupData, QuickTo, QuickToOptions,
};

pub use runtime::{Runtime, Viewport};
