//! Transforms - Local transform components composed in insertion order.
//!
//! A `Transforms` value holds the subset of rotateX/Y/Z, scale and
//! translateX/Y/Z currently set for a Position, remembering the order they were
//! first set in. Composition follows that order, so setting `rotateZ` then
//! `translateX` translates inside the rotated frame.
//!
//! When a [`PositionData`] is passed to a compose call, its values win over
//! local ones for locally tracked keys, and transform keys it has that are not
//! tracked locally are appended in canonical order (rotateX, rotateY, rotateZ,
//! scale, translateX, translateY, translateZ). The data is never mutated, which
//! lets callers preview a hypothetical matrix.

use crate::math::{css_matrix3d, DMat4, DVec3, Rect};
use crate::types::{Dimension, PositionKey, PositionKeys, TransformOrigin};

use super::data::PositionData;
use super::validation::ValidationData;

// =============================================================================
// TransformData - output buffer
// =============================================================================

/// Geometry computed for one PositionData.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformData {
    /// Axis-aligned bounds of the transformed corners.
    pub bounding_rect: Rect,
    /// Transformed corners, clockwise from top-left.
    pub corners: [DVec3; 4],
    /// Composed transform matrix.
    pub mat4: DMat4,
    /// Translation to the transform origin and back: `[to_origin, from_origin]`.
    pub origin_translations: [DMat4; 2],
}

// =============================================================================
// Transforms
// =============================================================================

/// Sparse, ordered set of local transform components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transforms {
    entries: Vec<(PositionKey, f64)>,
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Is any local transform component set?
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Local value of a transform key.
    pub fn get(&self, key: PositionKey) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| *value)
    }

    /// Set or clear a transform component. Non-transform keys are ignored.
    ///
    /// A finite value is stored, keeping the key's original position in the
    /// order list. `None` or a non-finite value removes the key.
    pub fn set(&mut self, key: PositionKey, value: Option<f64>) {
        if !key.is_transform() {
            return;
        }
        match value.filter(|value| value.is_finite()) {
            Some(value) => match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => self.entries.push((key, value)),
            },
            None => self.entries.retain(|(existing, _)| *existing != key),
        }
    }

    /// Locally set keys in insertion order.
    pub fn order(&self) -> impl Iterator<Item = PositionKey> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Replace local state with the transform keys set in `data`, in canonical order.
    pub fn reset(&mut self, data: &PositionData) {
        self.entries.clear();
        for key in PositionKey::TRANSFORM {
            self.set(key, data.number(key));
        }
    }

    /// True when `data` has any finite transform component.
    pub fn has_transform(data: &PositionData) -> bool {
        PositionKey::TRANSFORM
            .into_iter()
            .any(|key| data.number(key).is_some_and(f64::is_finite))
    }

    /// Matrix of one component. Rotations are in degrees.
    fn component(key: PositionKey, value: f64) -> DMat4 {
        match key {
            PositionKey::RotateX => DMat4::from_rotation_x(value.to_radians()),
            PositionKey::RotateY => DMat4::from_rotation_y(value.to_radians()),
            PositionKey::RotateZ => DMat4::from_rotation_z(value.to_radians()),
            PositionKey::Scale => DMat4::from_scale(DVec3::new(value, value, 1.0)),
            PositionKey::TranslateX => DMat4::from_translation(DVec3::new(value, 0.0, 0.0)),
            PositionKey::TranslateY => DMat4::from_translation(DVec3::new(0.0, value, 0.0)),
            PositionKey::TranslateZ => DMat4::from_translation(DVec3::new(0.0, 0.0, value)),
            _ => DMat4::IDENTITY,
        }
    }

    /// Multiply `matrix` by each selected component: local keys in insertion
    /// order first, then untracked keys from `data` in canonical order.
    fn compose(&self, matrix: &mut DMat4, data: Option<&PositionData>, select: PositionKeys) {
        let mut seen = PositionKeys::empty();
        for &(key, local) in &self.entries {
            if !select.contains(key.flag()) {
                continue;
            }
            seen |= key.flag();
            let value = data.and_then(|data| data.number(key)).unwrap_or(local);
            *matrix *= Self::component(key, value);
        }
        let Some(data) = data else {
            return;
        };
        for key in PositionKey::TRANSFORM {
            if seen.contains(key.flag()) || !select.contains(key.flag()) {
                continue;
            }
            if let Some(value) = data.number(key).filter(|value| value.is_finite()) {
                *matrix *= Self::component(key, value);
            }
        }
    }

    /// Composed transform matrix.
    pub fn get_mat4(&self, data: Option<&PositionData>) -> DMat4 {
        let mut matrix = DMat4::IDENTITY;
        self.compose(&mut matrix, data, PositionKeys::TRANSFORM);
        matrix
    }

    /// Composed matrix for orthographic positioning.
    ///
    /// `left`/`top` are folded into a leading translation together with the
    /// translate components, followed by scale, then the rotations.
    pub fn get_mat4_ortho(&self, data: &PositionData) -> DMat4 {
        let pick = |key: PositionKey| data.number(key).or_else(|| self.get(key));
        let tx = data.left.unwrap_or(0.0) + pick(PositionKey::TranslateX).unwrap_or(0.0);
        let ty = data.top.unwrap_or(0.0) + pick(PositionKey::TranslateY).unwrap_or(0.0);
        let tz = pick(PositionKey::TranslateZ).unwrap_or(0.0);

        let mut matrix = DMat4::from_translation(DVec3::new(tx, ty, tz));
        if let Some(scale) = pick(PositionKey::Scale) {
            matrix *= DMat4::from_scale(DVec3::new(scale, scale, 1.0));
        }
        let rotations = PositionKeys::ROTATE_X | PositionKeys::ROTATE_Y | PositionKeys::ROTATE_Z;
        self.compose(&mut matrix, Some(data), rotations);
        matrix
    }

    /// CSS `matrix3d()` of [`get_mat4`](Self::get_mat4).
    pub fn get_css(&self, data: Option<&PositionData>) -> String {
        css_matrix3d(&self.get_mat4(data))
    }

    /// CSS `matrix3d()` of [`get_mat4_ortho`](Self::get_mat4_ortho).
    pub fn get_css_ortho(&self, data: &PositionData) -> String {
        css_matrix3d(&self.get_mat4_ortho(data))
    }

    /// Bounding rect, corners and matrices for `data`.
    ///
    /// Width/height come from explicit px values, else from `validation`
    /// (measured size), else zero. Margins from `validation` offset the box.
    pub fn get_data(
        &self,
        data: &PositionData,
        output: &mut TransformData,
        validation: Option<&ValidationData>,
    ) {
        let measured = |dim: Option<Dimension>, fallback: f64| dim.and_then(Dimension::px).unwrap_or(fallback);
        let (val_width, val_height, margin_left, margin_top) = validation
            .map(|v| (v.width, v.height, v.margin_left, v.margin_top))
            .unwrap_or_default();

        let width = measured(data.width, val_width);
        let height = measured(data.height, val_height);
        let left = data.left.unwrap_or(0.0) + margin_left;
        let top = data.top.unwrap_or(0.0) + margin_top;

        let mut corners = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(width, 0.0, 0.0),
            DVec3::new(width, height, 0.0),
            DVec3::new(0.0, height, 0.0),
        ];

        let origin = data.transform_origin.unwrap_or_default();
        let (ox, oy) = origin.offset(width, height);
        output.origin_translations = [
            DMat4::from_translation(DVec3::new(-ox, -oy, 0.0)),
            DMat4::from_translation(DVec3::new(ox, oy, 0.0)),
        ];

        if Self::has_transform(data) || self.is_active() {
            output.mat4 = self.get_mat4(Some(data));
            let combined = if origin == TransformOrigin::TopLeft {
                output.mat4
            } else {
                output.origin_translations[1] * output.mat4 * output.origin_translations[0]
            };
            for corner in &mut corners {
                *corner = combined.transform_point3(*corner);
            }
        } else {
            output.mat4 = DMat4::IDENTITY;
        }

        for corner in &mut corners {
            corner.x += left;
            corner.y += top;
        }
        output.corners = corners;
        output.bounding_rect = Rect::bounding(&corners);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_insertion_order_composition() {
        let mut transforms = Transforms::new();
        transforms.set(PositionKey::RotateZ, Some(90.0));
        transforms.set(PositionKey::TranslateX, Some(10.0));

        let expected = DMat4::from_rotation_z(90f64.to_radians())
            * DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));
        let mat = transforms.get_mat4(None);
        assert!(mat.abs_diff_eq(expected, EPS));

        // Translation happens in the rotated frame.
        assert!(close(mat.w_axis.x, 0.0));
        assert!(close(mat.w_axis.y, 10.0));
    }

    #[test]
    fn test_resetting_value_keeps_order() {
        let mut transforms = Transforms::new();
        transforms.set(PositionKey::Scale, Some(2.0));
        transforms.set(PositionKey::RotateX, Some(10.0));
        transforms.set(PositionKey::Scale, Some(3.0));
        assert_eq!(
            transforms.order().collect::<Vec<_>>(),
            vec![PositionKey::Scale, PositionKey::RotateX]
        );
        assert_eq!(transforms.get(PositionKey::Scale), Some(3.0));
    }

    #[test]
    fn test_non_finite_or_none_removes_key() {
        let mut transforms = Transforms::new();
        transforms.set(PositionKey::RotateY, Some(45.0));
        transforms.set(PositionKey::RotateY, Some(f64::NAN));
        assert!(!transforms.is_active());

        transforms.set(PositionKey::TranslateZ, Some(1.0));
        transforms.set(PositionKey::TranslateZ, None);
        assert!(!transforms.is_active());

        transforms.set(PositionKey::Left, Some(5.0));
        assert!(!transforms.is_active());
    }

    #[test]
    fn test_data_values_win_and_untracked_keys_append() {
        let mut transforms = Transforms::new();
        transforms.set(PositionKey::TranslateX, Some(5.0));
        let data = PositionData {
            translate_x: Some(20.0),
            rotate_z: Some(90.0),
            ..Default::default()
        };
        let mat = transforms.get_mat4(Some(&data));
        let expected = DMat4::from_translation(DVec3::new(20.0, 0.0, 0.0))
            * DMat4::from_rotation_z(90f64.to_radians());
        assert!(mat.abs_diff_eq(expected, EPS));
        // Preview does not touch local state.
        assert_eq!(transforms.get(PositionKey::TranslateX), Some(5.0));
        assert_eq!(transforms.get(PositionKey::RotateZ), None);
    }

    #[test]
    fn test_ortho_folds_left_top() {
        let transforms = Transforms::new();
        let data = PositionData {
            left: Some(100.0),
            top: Some(50.0),
            translate_x: Some(5.0),
            ..Default::default()
        };
        assert_eq!(
            transforms.get_css_ortho(&data),
            "matrix3d(1,0,0,0,0,1,0,0,0,0,1,0,105,50,0,1)"
        );
    }

    #[test]
    fn test_has_transform() {
        assert!(!Transforms::has_transform(&PositionData::default()));
        assert!(Transforms::has_transform(&PositionData {
            scale: Some(1.0),
            ..Default::default()
        }));
    }

    #[test]
    fn test_reset_uses_canonical_order() {
        let mut transforms = Transforms::new();
        transforms.set(PositionKey::TranslateX, Some(1.0));
        transforms.reset(&PositionData {
            scale: Some(2.0),
            rotate_x: Some(3.0),
            ..Default::default()
        });
        assert_eq!(
            transforms.order().collect::<Vec<_>>(),
            vec![PositionKey::RotateX, PositionKey::Scale]
        );
    }

    #[test]
    fn test_get_data_rotated_bounds() {
        let transforms = Transforms::new();
        let data = PositionData {
            left: Some(10.0),
            top: Some(10.0),
            width: Some(Dimension::Px(100.0)),
            height: Some(Dimension::Px(50.0)),
            rotate_z: Some(90.0),
            transform_origin: Some(TransformOrigin::Center),
            ..Default::default()
        };
        let mut out = TransformData::default();
        transforms.get_data(&data, &mut out, None);

        // 100x50 rotated about its center becomes 50x100 around the same center.
        let rect = out.bounding_rect;
        assert!(close(rect.width, 50.0));
        assert!(close(rect.height, 100.0));
        assert!(close(rect.x, 35.0));
        assert!(close(rect.y, -15.0));
    }

    #[test]
    fn test_get_data_without_transform() {
        let transforms = Transforms::new();
        let data = PositionData {
            left: Some(5.0),
            top: Some(6.0),
            width: Some(Dimension::Auto),
            ..Default::default()
        };
        let mut out = TransformData::default();
        transforms.get_data(&data, &mut out, None);
        assert_eq!(out.mat4, DMat4::IDENTITY);
        assert_eq!(out.bounding_rect, Rect::new(5.0, 6.0, 0.0, 0.0));
    }
}
