//! Core types for spark-position.
//!
//! Property keys, key sets, dimension values and the partial update record that
//! flows into `Position::set`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PositionError;

// =============================================================================
// PositionKey - One property of PositionData
// =============================================================================

/// One property of [`PositionData`](crate::position::PositionData).
///
/// Variants are listed in declaration order. Per-property store notifications
/// and canonical transform composition both follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PositionKey {
    Left,
    Top,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
    TranslateX,
    TranslateY,
    TranslateZ,
    TransformOrigin,
    ZIndex,
}

impl PositionKey {
    /// All keys in declaration order.
    pub const ALL: [PositionKey; 17] = [
        Self::Left,
        Self::Top,
        Self::Width,
        Self::Height,
        Self::MinWidth,
        Self::MinHeight,
        Self::MaxWidth,
        Self::MaxHeight,
        Self::RotateX,
        Self::RotateY,
        Self::RotateZ,
        Self::Scale,
        Self::TranslateX,
        Self::TranslateY,
        Self::TranslateZ,
        Self::TransformOrigin,
        Self::ZIndex,
    ];

    /// Transform keys in canonical composition order.
    pub const TRANSFORM: [PositionKey; 7] = [
        Self::RotateX,
        Self::RotateY,
        Self::RotateZ,
        Self::Scale,
        Self::TranslateX,
        Self::TranslateY,
        Self::TranslateZ,
    ];

    /// camelCase property name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Width => "width",
            Self::Height => "height",
            Self::MinWidth => "minWidth",
            Self::MinHeight => "minHeight",
            Self::MaxWidth => "maxWidth",
            Self::MaxHeight => "maxHeight",
            Self::RotateX => "rotateX",
            Self::RotateY => "rotateY",
            Self::RotateZ => "rotateZ",
            Self::Scale => "scale",
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::TranslateZ => "translateZ",
            Self::TransformOrigin => "transformOrigin",
            Self::ZIndex => "zIndex",
        }
    }

    /// Single-bit key set for this key.
    pub const fn flag(self) -> PositionKeys {
        match self {
            Self::Left => PositionKeys::LEFT,
            Self::Top => PositionKeys::TOP,
            Self::Width => PositionKeys::WIDTH,
            Self::Height => PositionKeys::HEIGHT,
            Self::MinWidth => PositionKeys::MIN_WIDTH,
            Self::MinHeight => PositionKeys::MIN_HEIGHT,
            Self::MaxWidth => PositionKeys::MAX_WIDTH,
            Self::MaxHeight => PositionKeys::MAX_HEIGHT,
            Self::RotateX => PositionKeys::ROTATE_X,
            Self::RotateY => PositionKeys::ROTATE_Y,
            Self::RotateZ => PositionKeys::ROTATE_Z,
            Self::Scale => PositionKeys::SCALE,
            Self::TranslateX => PositionKeys::TRANSLATE_X,
            Self::TranslateY => PositionKeys::TRANSLATE_Y,
            Self::TranslateZ => PositionKeys::TRANSLATE_Z,
            Self::TransformOrigin => PositionKeys::TRANSFORM_ORIGIN,
            Self::ZIndex => PositionKeys::Z_INDEX,
        }
    }

    /// Is this one of the seven transform components?
    #[inline]
    pub fn is_transform(self) -> bool {
        PositionKeys::TRANSFORM.contains(self.flag())
    }

    /// Can this property be tweened? Everything except `transformOrigin`.
    #[inline]
    pub fn is_animatable(self) -> bool {
        self != Self::TransformOrigin
    }

    /// Value substituted for `null` when a numeric view is requested.
    ///
    /// `None` means the property has no sensible numeric default.
    pub const fn numeric_default(self) -> Option<f64> {
        match self {
            Self::Left | Self::Top | Self::Width | Self::Height => Some(0.0),
            Self::RotateX | Self::RotateY | Self::RotateZ => Some(0.0),
            Self::TranslateX | Self::TranslateY | Self::TranslateZ => Some(0.0),
            Self::Scale => Some(1.0),
            Self::MinWidth | Self::MinHeight | Self::MaxWidth | Self::MaxHeight => None,
            Self::TransformOrigin | Self::ZIndex => None,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PositionKey {
    type Err = PositionError;

    /// Accepts camelCase names plus the `rotation` alias for `rotateZ`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "rotation" {
            return Ok(Self::RotateZ);
        }
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| PositionError::UnknownKey { key: s.to_string() })
    }
}

// =============================================================================
// PositionKeys (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Set of position properties.
    ///
    /// Used for change tracking on commit and for the key sets driven by
    /// scheduled animations, where overlap is a plain intersection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PositionKeys: u32 {
        const LEFT = 1 << 0;
        const TOP = 1 << 1;
        const WIDTH = 1 << 2;
        const HEIGHT = 1 << 3;
        const MIN_WIDTH = 1 << 4;
        const MIN_HEIGHT = 1 << 5;
        const MAX_WIDTH = 1 << 6;
        const MAX_HEIGHT = 1 << 7;
        const ROTATE_X = 1 << 8;
        const ROTATE_Y = 1 << 9;
        const ROTATE_Z = 1 << 10;
        const SCALE = 1 << 11;
        const TRANSLATE_X = 1 << 12;
        const TRANSLATE_Y = 1 << 13;
        const TRANSLATE_Z = 1 << 14;
        const TRANSFORM_ORIGIN = 1 << 15;
        const Z_INDEX = 1 << 16;

        const TRANSFORM = Self::ROTATE_X.bits()
            | Self::ROTATE_Y.bits()
            | Self::ROTATE_Z.bits()
            | Self::SCALE.bits()
            | Self::TRANSLATE_X.bits()
            | Self::TRANSLATE_Y.bits()
            | Self::TRANSLATE_Z.bits();
    }
}

impl PositionKeys {
    /// Iterate the contained keys in declaration order.
    pub fn keys(self) -> impl Iterator<Item = PositionKey> {
        PositionKey::ALL
            .into_iter()
            .filter(move |key| self.contains(key.flag()))
    }
}

impl From<PositionKey> for PositionKeys {
    fn from(key: PositionKey) -> Self {
        key.flag()
    }
}

impl FromIterator<PositionKey> for PositionKeys {
    fn from_iter<I: IntoIterator<Item = PositionKey>>(iter: I) -> Self {
        iter.into_iter()
            .fold(PositionKeys::empty(), |acc, key| acc | key.flag())
    }
}

// =============================================================================
// Dimension - width / height value
// =============================================================================

/// Width or height of a positioned element.
///
/// ```ignore
/// let fixed = Dimension::Px(320.0);  // explicit size
/// let auto = Dimension::Auto;        // measured from content
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dimension {
    /// Explicit size in pixels.
    Px(f64),
    /// Size follows the element content; measured size becomes authoritative.
    Auto,
    /// Size inherited from the parent.
    Inherit,
}

impl Dimension {
    /// Pixel value, if explicit.
    #[inline]
    pub fn px(self) -> Option<f64> {
        match self {
            Self::Px(value) => Some(value),
            _ => None,
        }
    }

    /// Auto or inherit, i.e. size is taken from measurement.
    #[inline]
    pub fn is_measured(self) -> bool {
        matches!(self, Self::Auto | Self::Inherit)
    }

    /// CSS text for an inline style write.
    pub fn to_css(self) -> String {
        match self {
            Self::Px(value) => format!("{value}px"),
            Self::Auto => "auto".to_string(),
            Self::Inherit => "inherit".to_string(),
        }
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::Px(value)
    }
}

// =============================================================================
// TransformOrigin
// =============================================================================

/// The nine keyword transform origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformOrigin {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TransformOrigin {
    pub const ALL: [TransformOrigin; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top left",
            Self::TopCenter => "top center",
            Self::TopRight => "top right",
            Self::CenterLeft => "center left",
            Self::Center => "center",
            Self::CenterRight => "center right",
            Self::BottomLeft => "bottom left",
            Self::BottomCenter => "bottom center",
            Self::BottomRight => "bottom right",
        }
    }

    /// Parse a keyword pair. `"center center"` is accepted as `center`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input == "center center" {
            return Some(Self::Center);
        }
        Self::ALL.into_iter().find(|origin| origin.as_str() == input)
    }

    /// Origin offset inside a box of the given size.
    pub fn offset(self, width: f64, height: f64) -> (f64, f64) {
        let x = match self {
            Self::TopLeft | Self::CenterLeft | Self::BottomLeft => 0.0,
            Self::TopCenter | Self::Center | Self::BottomCenter => width * 0.5,
            Self::TopRight | Self::CenterRight | Self::BottomRight => width,
        };
        let y = match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => 0.0,
            Self::CenterLeft | Self::Center | Self::CenterRight => height * 0.5,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => height,
        };
        (x, y)
    }
}

impl fmt::Display for TransformOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PropertyValue - Loosely typed input value
// =============================================================================

/// A value submitted for one property.
///
/// Inputs are loosely typed so that `"10px"`, `"auto"` and relative values like
/// `"+=25"` can flow through the same `set` path as plain numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Clear the property.
    Null,
    Number(f64),
    Text(String),
}

impl PropertyValue {
    /// Numeric view: numbers and `"<n>px"` strings.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(text) => parse_px(text),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Dimension> for PropertyValue {
    fn from(value: Dimension) -> Self {
        match value {
            Dimension::Px(px) => Self::Number(px),
            Dimension::Auto => Self::Text("auto".to_string()),
            Dimension::Inherit => Self::Text("inherit".to_string()),
        }
    }
}

impl From<TransformOrigin> for PropertyValue {
    fn from(value: TransformOrigin) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// `None` is an explicit clear.
impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Parse `"12"`, `"12.5px"` or `" -3px "` into a finite number.
pub fn parse_px(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix("px").unwrap_or(text).trim_end();
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Relative update operators accepted in string values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relative {
    Add(f64),
    Subtract(f64),
    Multiply(f64),
}

impl Relative {
    /// Parse `"+=10"`, `"-=10px"` or `"*=2"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (op, rest) = text.split_at_checked(2)?;
        let amount = parse_px(rest)?;
        match op {
            "+=" => Some(Self::Add(amount)),
            "-=" => Some(Self::Subtract(amount)),
            "*=" => Some(Self::Multiply(amount)),
            _ => None,
        }
    }

    /// Apply to the current value. A missing current value counts as zero.
    pub fn apply(self, current: Option<f64>) -> f64 {
        let current = current.unwrap_or(0.0);
        match self {
            Self::Add(amount) => current + amount,
            Self::Subtract(amount) => current - amount,
            Self::Multiply(amount) => current * amount,
        }
    }
}

// =============================================================================
// PositionPatch - Partial update record
// =============================================================================

/// Partial position update.
///
/// Only keys present in the patch are touched by `Position::set`. Entries keep
/// insertion order; inserting an existing key replaces its value in place.
/// `rest` carries extra caller fields through to validators untouched.
///
/// ```ignore
/// let patch = PositionPatch::new()
///     .with(PositionKey::Left, 100.0)
///     .with(PositionKey::Width, "auto")
///     .with(PositionKey::RotateZ, None::<f64>);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionPatch {
    entries: Vec<(PositionKey, PropertyValue)>,
    rest: BTreeMap<String, PropertyValue>,
}

impl PositionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: PositionKey, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder form of [`insert_rest`](Self::insert_rest).
    pub fn with_rest(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert_rest(name, value);
        self
    }

    pub fn insert(&mut self, key: PositionKey, value: impl Into<PropertyValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert by property name. Unknown names land in `rest`.
    pub fn insert_named(&mut self, name: &str, value: impl Into<PropertyValue>) {
        match name.parse::<PositionKey>() {
            Ok(key) => self.insert(key, value),
            Err(_) => self.insert_rest(name, value),
        }
    }

    pub fn insert_rest(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.rest.insert(name.into(), value.into());
    }

    pub fn get(&self, key: PositionKey) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value)
    }

    /// Numeric view of one entry.
    pub fn number(&self, key: PositionKey) -> Option<f64> {
        self.get(key).and_then(PropertyValue::as_number)
    }

    pub fn remove(&mut self, key: PositionKey) -> Option<PropertyValue> {
        let index = self.entries.iter().position(|(existing, _)| *existing == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, key: PositionKey) -> bool {
        self.get(key).is_some()
    }

    /// Keys present in the patch.
    pub fn keys(&self) -> PositionKeys {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PositionKey, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn rest(&self) -> &BTreeMap<String, PropertyValue> {
        &self.rest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.rest.is_empty()
    }

    /// Keep only the given keys.
    pub fn retain_keys(&mut self, keys: PositionKeys) {
        self.entries.retain(|(key, _)| keys.contains(key.flag()));
    }
}

impl<V: Into<PropertyValue>> FromIterator<(PositionKey, V)> for PositionPatch {
    fn from_iter<I: IntoIterator<Item = (PositionKey, V)>>(iter: I) -> Self {
        let mut patch = Self::new();
        for (key, value) in iter {
            patch.insert(key, value);
        }
        patch
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in PositionKey::ALL {
            assert_eq!(key.name().parse::<PositionKey>(), Ok(key));
        }
        assert_eq!("rotation".parse::<PositionKey>(), Ok(PositionKey::RotateZ));
        assert_eq!(
            "bogus".parse::<PositionKey>(),
            Err(PositionError::UnknownKey { key: "bogus".to_string() })
        );
    }

    #[test]
    fn test_keys_iterate_in_declaration_order() {
        let keys = PositionKeys::Z_INDEX | PositionKeys::LEFT | PositionKeys::SCALE;
        let order: Vec<_> = keys.keys().collect();
        assert_eq!(order, vec![PositionKey::Left, PositionKey::Scale, PositionKey::ZIndex]);
    }

    #[test]
    fn test_transform_flag_covers_transform_keys() {
        for key in PositionKey::TRANSFORM {
            assert!(key.is_transform());
        }
        assert!(!PositionKey::Left.is_transform());
        assert!(!PositionKey::TransformOrigin.is_transform());
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("10px"), Some(10.0));
        assert_eq!(parse_px(" -3.5px "), Some(-3.5));
        assert_eq!(parse_px("42"), Some(42.0));
        assert_eq!(parse_px("auto"), None);
        assert_eq!(parse_px("inf"), None);
    }

    #[test]
    fn test_relative_values() {
        assert_eq!(Relative::parse("+=10"), Some(Relative::Add(10.0)));
        assert_eq!(Relative::parse("-=5px"), Some(Relative::Subtract(5.0)));
        assert_eq!(Relative::parse("*=2"), Some(Relative::Multiply(2.0)));
        assert_eq!(Relative::parse("10"), None);
        assert_eq!(Relative::Add(10.0).apply(Some(5.0)), 15.0);
        assert_eq!(Relative::Subtract(10.0).apply(None), -10.0);
    }

    #[test]
    fn test_transform_origin_parse() {
        assert_eq!(TransformOrigin::parse("center"), Some(TransformOrigin::Center));
        assert_eq!(TransformOrigin::parse("center center"), Some(TransformOrigin::Center));
        assert_eq!(TransformOrigin::parse("bottom right"), Some(TransformOrigin::BottomRight));
        assert_eq!(TransformOrigin::parse("middle"), None);
        assert_eq!(TransformOrigin::BottomCenter.offset(100.0, 50.0), (50.0, 50.0));
    }

    #[test]
    fn test_patch_insert_replaces_in_place() {
        let mut patch = PositionPatch::new()
            .with(PositionKey::Top, 5.0)
            .with(PositionKey::Left, 1.0);
        patch.insert(PositionKey::Top, "10px");

        let entries: Vec<_> = patch.iter().map(|(key, value)| (key, value.clone())).collect();
        assert_eq!(
            entries,
            vec![
                (PositionKey::Top, PropertyValue::Text("10px".to_string())),
                (PositionKey::Left, PropertyValue::Number(1.0)),
            ]
        );
        assert_eq!(patch.number(PositionKey::Top), Some(10.0));
    }

    #[test]
    fn test_patch_named_insert_routes_unknown_to_rest() {
        let mut patch = PositionPatch::new();
        patch.insert_named("left", 3);
        patch.insert_named("snap", "grid");
        assert_eq!(patch.number(PositionKey::Left), Some(3.0));
        assert_eq!(patch.rest().get("snap"), Some(&PropertyValue::from("grid")));
    }

    #[test]
    fn test_option_into_property_value() {
        assert_eq!(PropertyValue::from(None::<f64>), PropertyValue::Null);
        assert_eq!(PropertyValue::from(Some(2.0)), PropertyValue::Number(2.0));
    }
}
