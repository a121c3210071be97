//! PositionData - The canonical positional state record.

use crate::types::{Dimension, PositionKey, PositionKeys, PositionPatch, PropertyValue, TransformOrigin};

/// Position, size and transform state of one element.
///
/// Every numeric field is either `None` or finite. `None` means "unset"; the
/// matching inline style is removed when the element is updated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PositionData {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub rotate_x: Option<f64>,
    pub rotate_y: Option<f64>,
    pub rotate_z: Option<f64>,
    pub scale: Option<f64>,
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
    pub translate_z: Option<f64>,
    pub transform_origin: Option<TransformOrigin>,
    pub z_index: Option<f64>,
}

impl PositionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full field-wise overwrite from `other`.
    #[inline]
    pub fn copy(&mut self, other: &PositionData) -> &mut Self {
        *self = *other;
        self
    }

    fn slot(&mut self, key: PositionKey) -> Option<&mut Option<f64>> {
        Some(match key {
            PositionKey::Left => &mut self.left,
            PositionKey::Top => &mut self.top,
            PositionKey::MinWidth => &mut self.min_width,
            PositionKey::MinHeight => &mut self.min_height,
            PositionKey::MaxWidth => &mut self.max_width,
            PositionKey::MaxHeight => &mut self.max_height,
            PositionKey::RotateX => &mut self.rotate_x,
            PositionKey::RotateY => &mut self.rotate_y,
            PositionKey::RotateZ => &mut self.rotate_z,
            PositionKey::Scale => &mut self.scale,
            PositionKey::TranslateX => &mut self.translate_x,
            PositionKey::TranslateY => &mut self.translate_y,
            PositionKey::TranslateZ => &mut self.translate_z,
            PositionKey::ZIndex => &mut self.z_index,
            PositionKey::Width | PositionKey::Height | PositionKey::TransformOrigin => return None,
        })
    }

    /// Numeric value of a property. Width/height count only when explicit px.
    pub fn number(&self, key: PositionKey) -> Option<f64> {
        match key {
            PositionKey::Left => self.left,
            PositionKey::Top => self.top,
            PositionKey::Width => self.width.and_then(Dimension::px),
            PositionKey::Height => self.height.and_then(Dimension::px),
            PositionKey::MinWidth => self.min_width,
            PositionKey::MinHeight => self.min_height,
            PositionKey::MaxWidth => self.max_width,
            PositionKey::MaxHeight => self.max_height,
            PositionKey::RotateX => self.rotate_x,
            PositionKey::RotateY => self.rotate_y,
            PositionKey::RotateZ => self.rotate_z,
            PositionKey::Scale => self.scale,
            PositionKey::TranslateX => self.translate_x,
            PositionKey::TranslateY => self.translate_y,
            PositionKey::TranslateZ => self.translate_z,
            PositionKey::TransformOrigin => None,
            PositionKey::ZIndex => self.z_index,
        }
    }

    /// Numeric value, substituting the property's numeric default for `None`.
    #[inline]
    pub fn numeric(&self, key: PositionKey) -> Option<f64> {
        self.number(key).or(key.numeric_default())
    }

    /// Write a numeric value. Width/height become explicit px; `transformOrigin`
    /// is not numeric and is left untouched.
    pub fn set_number(&mut self, key: PositionKey, value: Option<f64>) {
        match key {
            PositionKey::Width => self.width = value.map(Dimension::Px),
            PositionKey::Height => self.height = value.map(Dimension::Px),
            _ => {
                if let Some(slot) = self.slot(key) {
                    *slot = value;
                }
            }
        }
    }

    pub fn dimension(&self, key: PositionKey) -> Option<Dimension> {
        match key {
            PositionKey::Width => self.width,
            PositionKey::Height => self.height,
            _ => self.number(key).map(Dimension::Px),
        }
    }

    /// Loosely typed view of one property.
    pub fn value(&self, key: PositionKey) -> PropertyValue {
        match key {
            PositionKey::Width => self.width.into(),
            PositionKey::Height => self.height.into(),
            PositionKey::TransformOrigin => self.transform_origin.into(),
            _ => self.number(key).into(),
        }
    }

    /// Every property as a patch, unset ones as explicit clears.
    pub fn to_patch(&self) -> PositionPatch {
        PositionKey::ALL
            .into_iter()
            .map(|key| (key, self.value(key)))
            .collect()
    }

    /// Overwrite the fields that differ in `other`, returning the changed keys.
    ///
    /// Non-finite numbers in `other` are rejected and the current value is kept.
    pub(crate) fn commit(&mut self, other: &PositionData) -> PositionKeys {
        let mut changed = PositionKeys::empty();
        for key in PositionKey::ALL {
            match key {
                PositionKey::Width | PositionKey::Height => {
                    let next = other.dimension(key);
                    if next.is_some_and(|dim| dim.px().is_some_and(|px| !px.is_finite())) {
                        continue;
                    }
                    let slot = if key == PositionKey::Width {
                        &mut self.width
                    } else {
                        &mut self.height
                    };
                    if *slot != next {
                        *slot = next;
                        changed |= key.flag();
                    }
                }
                PositionKey::TransformOrigin => {
                    if self.transform_origin != other.transform_origin {
                        self.transform_origin = other.transform_origin;
                        changed |= key.flag();
                    }
                }
                _ => {
                    let next = other.number(key);
                    if next.is_some_and(|value| !value.is_finite()) {
                        continue;
                    }
                    if self.number(key) != next {
                        self.set_number(key, next);
                        changed |= key.flag();
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_numeric_views() {
        let data = PositionData {
            left: Some(10.0),
            width: Some(Dimension::Auto),
            ..Default::default()
        };
        assert_eq!(data.number(PositionKey::Left), Some(10.0));
        assert_eq!(data.number(PositionKey::Width), None);
        assert_eq!(data.numeric(PositionKey::Width), Some(0.0));
        assert_eq!(data.numeric(PositionKey::Scale), Some(1.0));
        assert_eq!(data.numeric(PositionKey::ZIndex), None);
    }

    #[test]
    fn test_commit_reports_changes_and_rejects_non_finite() {
        let mut data = PositionData {
            left: Some(1.0),
            top: Some(2.0),
            ..Default::default()
        };
        let next = PositionData {
            left: Some(f64::NAN),
            top: Some(5.0),
            width: Some(Dimension::Px(f64::INFINITY)),
            scale: Some(2.0),
            ..Default::default()
        };
        let changed = data.commit(&next);
        assert_eq!(changed, PositionKeys::TOP | PositionKeys::SCALE);
        assert_eq!(data.left, Some(1.0));
        assert_eq!(data.top, Some(5.0));
        assert_eq!(data.width, None);
    }

    #[test]
    fn test_copy_overwrites_everything() {
        let mut data = PositionData {
            left: Some(3.0),
            z_index: Some(4.0),
            ..Default::default()
        };
        data.copy(&PositionData {
            top: Some(9.0),
            ..Default::default()
        });
        assert_eq!(data.left, None);
        assert_eq!(data.z_index, None);
        assert_eq!(data.top, Some(9.0));
    }

    #[test]
    fn test_to_patch_lists_every_key() {
        let patch = PositionData::default().to_patch();
        assert_eq!(patch.len(), PositionKey::ALL.len());
        assert!(patch.iter().all(|(_, value)| value.is_null()));
    }
}
