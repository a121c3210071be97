//! Centered - Initial placement helper.

use std::ops::Deref;
use std::rc::Rc;

use crate::runtime::Viewport;

use super::bounds::{BoundsConfig, BoundsOptions};

/// Supplies `left`/`top` for a Position that has none yet.
///
/// Consulted by `Position::set` only while the coordinate is unset and not part
/// of the submitted patch, so it affects first placement and nothing after.
pub trait InitialHelper {
    fn get_left(&self, width: f64, viewport: Viewport) -> f64;
    fn get_top(&self, height: f64, viewport: Viewport) -> f64;
}

/// Centers the element in its container (default: the viewport).
#[derive(Clone)]
pub struct Centered(Rc<BoundsConfig>);

impl Centered {
    pub fn new(options: BoundsOptions) -> Self {
        Self(Rc::new(BoundsConfig::from_options(options)))
    }
}

impl Default for Centered {
    fn default() -> Self {
        Self::new(BoundsOptions::default())
    }
}

impl Deref for Centered {
    type Target = BoundsConfig;

    fn deref(&self) -> &BoundsConfig {
        &self.0
    }
}

impl InitialHelper for Centered {
    fn get_left(&self, width: f64, viewport: Viewport) -> f64 {
        (self.bounds_width(viewport).unwrap_or(0.0) - width) / 2.0
    }

    fn get_top(&self, height: f64, viewport: Viewport) -> f64 {
        (self.bounds_height(viewport).unwrap_or(0.0) - height) / 2.0
    }
}
