//! Geometry consumed by the transform system.
//!
//! Matrices and points are glam's `f64` types. This module adds the CSS
//! `matrix3d()` rendering and the axis-aligned [`Rect`] used for bounds.

pub use glam::{DMat4, DVec3};

/// CSS `matrix3d(...)` text, values in column-major order.
pub fn css_matrix3d(matrix: &DMat4) -> String {
    let mut css = String::from("matrix3d(");
    for (index, value) in matrix.to_cols_array().iter().enumerate() {
        if index > 0 {
            css.push(',');
        }
        // -0 renders as 0 so equal matrices produce equal text.
        let value = if *value == 0.0 { 0.0 } else { *value };
        css.push_str(&value.to_string());
    }
    css.push(')');
    css
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rect containing all points.
    pub fn bounding(points: &[DVec3]) -> Rect {
        let Some(first) = points.first() else {
            return Rect::default();
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}
