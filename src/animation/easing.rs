//! Easing curves and interpolation.
//!
//! Every curve maps progress `t` in `[0, 1]` to eased progress with
//! `f(0) = 0` and `f(1) = 1`. Back and elastic curves overshoot in between.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::PositionError;

/// `(start, end, eased_progress) -> value`
pub type Interpolate = Rc<dyn Fn(f64, f64, f64) -> f64>;

/// Linear interpolation.
#[inline]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Named easing curve, or a caller-supplied one.
#[derive(Clone, Default)]
pub enum Easing {
    Linear,
    QuadraticIn,
    QuadraticOut,
    QuadraticInOut,
    CubicIn,
    #[default]
    CubicOut,
    CubicInOut,
    QuarticIn,
    QuarticOut,
    QuarticInOut,
    QuinticIn,
    QuinticOut,
    QuinticInOut,
    SineIn,
    SineOut,
    SineInOut,
    CircularIn,
    CircularOut,
    CircularInOut,
    ExponentialIn,
    ExponentialOut,
    ExponentialInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BackIn,
    BackOut,
    BackInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    Custom(Rc<dyn Fn(f64) -> f64>),
}

const BACK: f64 = 1.70158;

fn bounce_out(t: f64) -> f64 {
    const A: f64 = 4.0 / 11.0;
    const B: f64 = 8.0 / 11.0;
    const C: f64 = 9.0 / 10.0;
    const CA: f64 = 4356.0 / 361.0;
    const CB: f64 = 35442.0 / 1805.0;
    const CC: f64 = 16061.0 / 1805.0;

    let t2 = t * t;
    if t < A {
        7.5625 * t2
    } else if t < B {
        9.075 * t2 - 9.9 * t + 3.4
    } else if t < C {
        CA * t2 - CB * t + CC
    } else {
        10.8 * t * t - 20.52 * t + 10.72
    }
}

impl Easing {
    pub fn custom(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }

    /// Eased progress for `t`, clamped to `[0, 1]` first.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => -t * (t - 2.0),
            Self::QuadraticInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t
                } else {
                    let t = t - 1.0;
                    -0.5 * (t * (t - 2.0) - 1.0)
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let f = t - 1.0;
                f * f * f + 1.0
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    0.5 * (2.0 * t - 2.0).powi(3) + 1.0
                }
            }
            Self::QuarticIn => t.powi(4),
            Self::QuarticOut => (t - 1.0).powi(3) * (1.0 - t) + 1.0,
            Self::QuarticInOut => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    -8.0 * (t - 1.0).powi(4) + 1.0
                }
            }
            Self::QuinticIn => t.powi(5),
            Self::QuinticOut => (t - 1.0).powi(5) + 1.0,
            Self::QuinticInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t.powi(5)
                } else {
                    0.5 * ((t - 2.0).powi(5) + 2.0)
                }
            }
            Self::SineIn => {
                let v = (t * PI / 2.0).cos();
                if (v - 1.0).abs() < 1e-14 { 0.0 } else { 1.0 - v }
            }
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Self::CircularIn => 1.0 - (1.0 - t * t).sqrt(),
            Self::CircularOut => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::CircularInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    -0.5 * ((1.0 - t * t).sqrt() - 1.0)
                } else {
                    0.5 * ((1.0 - (t - 2.0).powi(2)).sqrt() + 1.0)
                }
            }
            Self::ExponentialIn => {
                if t == 0.0 { 0.0 } else { 2f64.powf(10.0 * (t - 1.0)) }
            }
            Self::ExponentialOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2f64.powf(-10.0 * t) }
            }
            Self::ExponentialInOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    0.5 * 2f64.powf(20.0 * t - 10.0)
                } else {
                    -0.5 * 2f64.powf(10.0 - 20.0 * t) + 1.0
                }
            }
            Self::ElasticIn => (13.0 * t * PI / 2.0).sin() * 2f64.powf(10.0 * (t - 1.0)),
            Self::ElasticOut => {
                (-13.0 * (t + 1.0) * PI / 2.0).sin() * 2f64.powf(-10.0 * t) + 1.0
            }
            Self::ElasticInOut => {
                if t < 0.5 {
                    0.5 * (13.0 * PI / 2.0 * 2.0 * t).sin() * 2f64.powf(10.0 * (2.0 * t - 1.0))
                } else {
                    0.5 * (-13.0 * PI / 2.0 * (2.0 * t - 1.0 + 1.0)).sin()
                        * 2f64.powf(-10.0 * (2.0 * t - 1.0))
                        + 1.0
                }
            }
            Self::BackIn => t * t * ((BACK + 1.0) * t - BACK),
            Self::BackOut => {
                let t = t - 1.0;
                t * t * ((BACK + 1.0) * t + BACK) + 1.0
            }
            Self::BackInOut => {
                let s = BACK * 1.525;
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * (t * t * ((s + 1.0) * t - s))
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * ((s + 1.0) * t + s) + 2.0)
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                if t < 0.5 {
                    0.5 * (1.0 - bounce_out(1.0 - t * 2.0))
                } else {
                    0.5 * bounce_out(t * 2.0 - 1.0) + 0.5
                }
            }
            Self::Custom(f) => f(t),
        }
    }

    /// snake_case name, `"custom"` for caller-supplied curves.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadraticIn => "quadratic_in",
            Self::QuadraticOut => "quadratic_out",
            Self::QuadraticInOut => "quadratic_in_out",
            Self::CubicIn => "cubic_in",
            Self::CubicOut => "cubic_out",
            Self::CubicInOut => "cubic_in_out",
            Self::QuarticIn => "quartic_in",
            Self::QuarticOut => "quartic_out",
            Self::QuarticInOut => "quartic_in_out",
            Self::QuinticIn => "quintic_in",
            Self::QuinticOut => "quintic_out",
            Self::QuinticInOut => "quintic_in_out",
            Self::SineIn => "sine_in",
            Self::SineOut => "sine_out",
            Self::SineInOut => "sine_in_out",
            Self::CircularIn => "circular_in",
            Self::CircularOut => "circular_out",
            Self::CircularInOut => "circular_in_out",
            Self::ExponentialIn => "exponential_in",
            Self::ExponentialOut => "exponential_out",
            Self::ExponentialInOut => "exponential_in_out",
            Self::ElasticIn => "elastic_in",
            Self::ElasticOut => "elastic_out",
            Self::ElasticInOut => "elastic_in_out",
            Self::BackIn => "back_in",
            Self::BackOut => "back_out",
            Self::BackInOut => "back_in_out",
            Self::BounceIn => "bounce_in",
            Self::BounceOut => "bounce_out",
            Self::BounceInOut => "bounce_in_out",
            Self::Custom(_) => "custom",
        }
    }

    /// Every named curve.
    pub const NAMED: [Easing; 31] = [
        Self::Linear,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuarticIn,
        Self::QuarticOut,
        Self::QuarticInOut,
        Self::QuinticIn,
        Self::QuinticOut,
        Self::QuinticInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::CircularIn,
        Self::CircularOut,
        Self::CircularInOut,
        Self::ExponentialIn,
        Self::ExponentialOut,
        Self::ExponentialInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for Easing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            (Self::Custom(_), _) | (_, Self::Custom(_)) => false,
            _ => self.name() == other.name(),
        }
    }
}

/// Accepts snake_case (`"cubic_out"`) or camelCase short forms (`"cubicOut"`,
/// `"quadIn"`, `"expoInOut"`, `"circOut"`, `"quartIn"`, `"quintOut"`).
impl FromStr for Easing {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut normalized = String::with_capacity(s.len() + 4);
        for c in s.trim().chars() {
            if c.is_ascii_uppercase() {
                normalized.push('_');
                normalized.push(c.to_ascii_lowercase());
            } else {
                normalized.push(c);
            }
        }
        let normalized = match normalized.split_once('_') {
            Some((family, rest)) => {
                let family = match family {
                    "quad" => "quadratic",
                    "quart" => "quartic",
                    "quint" => "quintic",
                    "circ" => "circular",
                    "expo" => "exponential",
                    other => other,
                };
                format!("{family}_{rest}")
            }
            None => normalized,
        };
        Self::NAMED
            .into_iter()
            .find(|easing| easing.name() == normalized)
            .ok_or_else(|| PositionError::UnknownEasing { name: s.to_string() })
    }
}
