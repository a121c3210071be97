//! ValidationData - Everything a validator sees for one candidate update.

use std::collections::BTreeMap;

use crate::element::{ElementRef, StyleSnapshot};
use crate::runtime::Viewport;
use crate::types::{Dimension, PropertyValue};

use super::data::PositionData;
use super::transforms::Transforms;

/// One validation pass.
///
/// Built fresh for every `Position::set` and dropped afterwards. Validators
/// return a new [`PositionData`]; between steps the pipeline refreshes
/// `position`, the size and the min/max limits from the previous step's output.
#[derive(Debug, Clone)]
pub struct ValidationData {
    /// Candidate state: current data with the patch merged in.
    pub position: PositionData,
    /// Bound element, if any.
    pub element: Option<ElementRef>,
    /// Cached computed style of the bound element.
    pub computed: StyleSnapshot,
    /// Snapshot of the Position's local transforms.
    pub transforms: Transforms,
    /// Explicit width, else measured offset width, else 0.
    pub width: f64,
    /// Explicit height, else measured offset height, else 0.
    pub height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    /// Host viewport size.
    pub viewport: Viewport,
    /// Extra caller fields submitted with the patch.
    pub rest: BTreeMap<String, PropertyValue>,
}

impl ValidationData {
    pub(crate) fn new(
        position: PositionData,
        element: Option<ElementRef>,
        computed: StyleSnapshot,
        transforms: Transforms,
        viewport: Viewport,
        rest: BTreeMap<String, PropertyValue>,
    ) -> Self {
        let mut data = Self {
            position,
            element,
            computed,
            transforms,
            width: 0.0,
            height: 0.0,
            margin_left: computed.margin_left,
            margin_top: computed.margin_top,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            viewport,
            rest,
        };
        data.refresh_size();
        data
    }

    /// Recompute size and size limits from the current candidate.
    ///
    /// Limits set on the candidate win over the element's computed ones.
    pub(crate) fn refresh_size(&mut self) {
        let (position, computed) = (&self.position, &self.computed);
        self.width = resolve(position.width, computed.offset_width);
        self.height = resolve(position.height, computed.offset_height);
        self.min_width = position.min_width.or(computed.min_width);
        self.min_height = position.min_height.or(computed.min_height);
        self.max_width = position.max_width.or(computed.max_width);
        self.max_height = position.max_height.or(computed.max_height);
    }
}

fn resolve(dimension: Option<Dimension>, measured: f64) -> f64 {
    dimension.and_then(Dimension::px).unwrap_or(measured)
}
