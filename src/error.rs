//! Error types for spark-position.
//!
//! Only configuration mistakes are errors. A validator vetoing an update is an
//! expected outcome and is reported as `None` from the pipeline, never as an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PositionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    /// A resize target exposed none of the supported update capabilities.
    #[error("resize target exposes no supported update capability")]
    InvalidTarget,

    /// Validator weight must be a finite number in `[0, 1]`.
    #[error("validator weight must be a finite number between 0 and 1 (got {weight})")]
    InvalidWeight { weight: f64 },

    /// Animation duration must be finite and non-negative.
    #[error("animation duration must be a finite positive number (got {duration})")]
    InvalidDuration { duration: f64 },

    /// Animation delay must be finite and non-negative.
    #[error("animation delay must be a finite positive number (got {delay})")]
    InvalidDelay { delay: f64 },

    /// A string key that names no position property.
    #[error("unknown position property: {key}")]
    UnknownKey { key: String },

    /// A string that names no easing curve.
    #[error("unknown easing: {name}")]
    UnknownEasing { name: String },
}

impl From<std::convert::Infallible> for PositionError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
