//! Animation - Tween scheduling over Position.
//!
//! All tweens live in one [`AnimationManager`] task table per [`Runtime`].
//! Each frame the runtime steps the table, and every interpolated value is
//! committed through `Position::set`, so validators constrain animated values
//! exactly like direct writes.
//!
//! - [`AnimationAPI`] - `to` / `from` / `from_to` / `quick_to` for one Position
//! - [`AnimationGroupAPI`] - the same across many Positions
//! - [`Easing`] - named easing curves
//!
//! # Example
//!
//! ```ignore
//! let control = position.animate().to(
//!     &PositionPatch::new().with(PositionKey::Left, 300.0),
//!     &AnimationOptions::default().with_duration(0.4),
//! )?;
//! runtime.tick(now);
//! let status = control.finished().await;
//! ```
//!
//! [`Runtime`]: crate::Runtime

mod api;
mod control;
mod easing;
mod group;
mod manager;
mod quick_to;

pub use api::{AnimationAPI, AnimationOptions, QuickToOptions};
pub use control::{AnimationControl, AnimationFinished, AnimationGroupControl, AnimationStatus};
pub use easing::{lerp, Easing, Interpolate};
pub use group::{AnimationGroupAPI, GroupData, QuickToGroup};
pub use manager::{AnimationManager, ScheduledAnimation};
pub use quick_to::QuickTo;
