//! Membership functions.
//!
//! Every shape is a variant of [`MembershipFunction`] with a fixed set of
//! parameters, so a triangle always has exactly three breakpoints. The wire
//! form used by persisted snapshots (a shape tag plus a parameter list) is
//! converted with [`MembershipFunction::from_params`].
//!
//! Degrees are total over the real line. Degenerate parameters are not
//! guarded here and can produce non-finite degrees; use
//! [`MembershipFunction::validate`] to reject them up front.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Upper bound on the number of points produced by curve sampling.
pub const MAX_CURVE_POINTS: usize = 10_001;

/// Error type for converting and validating membership functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MembershipError {
    #[error("Unknown membership shape")]
    UnknownShape,
    #[error("{kind} expects {expected} parameters, got {found}")]
    Arity {
        kind: ShapeKind,
        expected: usize,
        found: usize,
    },
    #[error("{kind} has a non-finite parameter")]
    NonFinite { kind: ShapeKind },
    #[error("{kind} breakpoints are out of order: {params:?}")]
    Unordered { kind: ShapeKind, params: Vec<f64> },
    #[error("{kind} is degenerate: {reason}")]
    Degenerate {
        kind: ShapeKind,
        reason: &'static str,
    },
}

/// Shape tag as stored in snapshots.
///
/// Unrecognized tags deserialize to [`ShapeKind::Unknown`] instead of failing,
/// so a half-configured model still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    #[serde(rename = "tri", alias = "triangular")]
    Triangular,
    #[serde(rename = "trap", alias = "trapezoidal")]
    Trapezoidal,
    #[serde(rename = "gauss", alias = "gaussian")]
    Gaussian,
    #[serde(rename = "gbell", alias = "generalized-bell")]
    GeneralizedBell,
    #[serde(rename = "sigmoid")]
    Sigmoid,
    #[serde(rename = "zmf", alias = "z-shape")]
    ZShape,
    #[serde(rename = "smf", alias = "s-shape")]
    SShape,
    #[serde(other)]
    Unknown,
}

impl ShapeKind {
    /// Number of parameters the shape takes, or `None` for unknown shapes.
    pub fn arity(&self) -> Option<usize> {
        match self {
            ShapeKind::Triangular | ShapeKind::GeneralizedBell => Some(3),
            ShapeKind::Trapezoidal => Some(4),
            ShapeKind::Gaussian | ShapeKind::Sigmoid | ShapeKind::ZShape | ShapeKind::SShape => {
                Some(2)
            }
            ShapeKind::Unknown => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Triangular => "triangular",
            ShapeKind::Trapezoidal => "trapezoidal",
            ShapeKind::Gaussian => "gaussian",
            ShapeKind::GeneralizedBell => "generalized-bell",
            ShapeKind::Sigmoid => "sigmoid",
            ShapeKind::ZShape => "z-shape",
            ShapeKind::SShape => "s-shape",
            ShapeKind::Unknown => "unknown",
        }
    }

    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Triangular,
            ShapeKind::Trapezoidal,
            ShapeKind::Gaussian,
            ShapeKind::GeneralizedBell,
            ShapeKind::Sigmoid,
            ShapeKind::ZShape,
            ShapeKind::SShape,
        ]
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A membership function with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MembershipFunction {
    /// Peak at `b`, zero outside `(a, c)`.
    Triangular { a: f64, b: f64, c: f64 },
    /// Plateau on `[b, c]`, zero outside `(a, d)`.
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    /// `exp(-0.5 * ((x - center) / sigma)^2)`
    Gaussian { center: f64, sigma: f64 },
    /// `1 / (1 + |(x - center) / a|^(2b))`
    GeneralizedBell { a: f64, b: f64, center: f64 },
    /// `1 / (1 + exp(-slope * (x - center)))`
    Sigmoid { slope: f64, center: f64 },
    /// Falls from 1 at `a` to 0 at `b` along two quadratic arcs.
    ZShape { a: f64, b: f64 },
    /// Rises from 0 at `a` to 1 at `b` along two quadratic arcs.
    SShape { a: f64, b: f64 },
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Self {
        MembershipFunction::Triangular { a, b, c }
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Self {
        MembershipFunction::Trapezoidal { a, b, c, d }
    }

    pub fn gaussian(center: f64, sigma: f64) -> Self {
        MembershipFunction::Gaussian { center, sigma }
    }

    pub fn generalized_bell(a: f64, b: f64, center: f64) -> Self {
        MembershipFunction::GeneralizedBell { a, b, center }
    }

    pub fn sigmoid(slope: f64, center: f64) -> Self {
        MembershipFunction::Sigmoid { slope, center }
    }

    pub fn z_shape(a: f64, b: f64) -> Self {
        MembershipFunction::ZShape { a, b }
    }

    pub fn s_shape(a: f64, b: f64) -> Self {
        MembershipFunction::SShape { a, b }
    }

    /// Build a function from a shape tag and its parameter list.
    ///
    /// Parameter order follows the stored form: `[a, b, c]` for triangles,
    /// `[center, sigma]` for gaussians, `[a, b, center]` for bells and
    /// `[slope, center]` for sigmoids.
    pub fn from_params(kind: ShapeKind, params: &[f64]) -> Result<Self, MembershipError> {
        let expected = kind.arity().ok_or(MembershipError::UnknownShape)?;
        if params.len() != expected {
            return Err(MembershipError::Arity {
                kind,
                expected,
                found: params.len(),
            });
        }

        let p = params;
        Ok(match kind {
            ShapeKind::Triangular => Self::triangular(p[0], p[1], p[2]),
            ShapeKind::Trapezoidal => Self::trapezoidal(p[0], p[1], p[2], p[3]),
            ShapeKind::Gaussian => Self::gaussian(p[0], p[1]),
            ShapeKind::GeneralizedBell => Self::generalized_bell(p[0], p[1], p[2]),
            ShapeKind::Sigmoid => Self::sigmoid(p[0], p[1]),
            ShapeKind::ZShape => Self::z_shape(p[0], p[1]),
            ShapeKind::SShape => Self::s_shape(p[0], p[1]),
            ShapeKind::Unknown => return Err(MembershipError::UnknownShape),
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            MembershipFunction::Triangular { .. } => ShapeKind::Triangular,
            MembershipFunction::Trapezoidal { .. } => ShapeKind::Trapezoidal,
            MembershipFunction::Gaussian { .. } => ShapeKind::Gaussian,
            MembershipFunction::GeneralizedBell { .. } => ShapeKind::GeneralizedBell,
            MembershipFunction::Sigmoid { .. } => ShapeKind::Sigmoid,
            MembershipFunction::ZShape { .. } => ShapeKind::ZShape,
            MembershipFunction::SShape { .. } => ShapeKind::SShape,
        }
    }

    /// Parameters in stored order (the inverse of [`Self::from_params`]).
    pub fn params(&self) -> Vec<f64> {
        match *self {
            MembershipFunction::Triangular { a, b, c } => vec![a, b, c],
            MembershipFunction::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
            MembershipFunction::Gaussian { center, sigma } => vec![center, sigma],
            MembershipFunction::GeneralizedBell { a, b, center } => vec![a, b, center],
            MembershipFunction::Sigmoid { slope, center } => vec![slope, center],
            MembershipFunction::ZShape { a, b } | MembershipFunction::SShape { a, b } => {
                vec![a, b]
            }
        }
    }

    /// Degree of membership of `x`.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            MembershipFunction::Triangular { a, b, c } => {
                if x <= a || x >= c {
                    0.0
                } else if x == b {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
            MembershipFunction::Trapezoidal { a, b, c, d } => {
                if x <= a || x >= d {
                    0.0
                } else if x >= b && x <= c {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
            MembershipFunction::Gaussian { center, sigma } => {
                (-0.5 * ((x - center) / sigma).powi(2)).exp()
            }
            MembershipFunction::GeneralizedBell { a, b, center } => {
                1.0 / (1.0 + ((x - center) / a).abs().powf(2.0 * b))
            }
            MembershipFunction::Sigmoid { slope, center } => {
                1.0 / (1.0 + (-slope * (x - center)).exp())
            }
            MembershipFunction::ZShape { a, b } => {
                if x <= a {
                    1.0
                } else if x >= b {
                    0.0
                } else if x < (a + b) / 2.0 {
                    1.0 - 2.0 * ((x - a) / (b - a)).powi(2)
                } else {
                    2.0 * ((b - x) / (b - a)).powi(2)
                }
            }
            MembershipFunction::SShape { a, b } => {
                if x <= a {
                    0.0
                } else if x >= b {
                    1.0
                } else if x < (a + b) / 2.0 {
                    2.0 * ((x - a) / (b - a)).powi(2)
                } else {
                    1.0 - 2.0 * ((b - x) / (b - a)).powi(2)
                }
            }
        }
    }

    /// Representative point used by centroid defuzzification.
    ///
    /// This is a per-shape approximation, not an integral: the mean of the
    /// breakpoints for triangles and trapezoids, the center for symmetric
    /// and sigmoid shapes, and the transition midpoint for z/s shapes.
    pub fn centroid(&self) -> f64 {
        match *self {
            MembershipFunction::Triangular { a, b, c } => (a + b + c) / 3.0,
            MembershipFunction::Trapezoidal { a, b, c, d } => (a + b + c + d) / 4.0,
            MembershipFunction::Gaussian { center, .. }
            | MembershipFunction::GeneralizedBell { center, .. }
            | MembershipFunction::Sigmoid { center, .. } => center,
            MembershipFunction::ZShape { a, b } | MembershipFunction::SShape { a, b } => {
                (a + b) / 2.0
            }
        }
    }

    /// Reject parameters that make the shape meaningless or let a formula
    /// divide by zero for some finite input.
    ///
    /// Shoulders such as `tri[0, 0, 40]` are fine: the zero-width ramp is
    /// never reached.
    pub fn validate(&self) -> Result<(), MembershipError> {
        let kind = self.kind();
        let params = self.params();
        if params.iter().any(|p| !p.is_finite()) {
            return Err(MembershipError::NonFinite { kind });
        }

        let ordered = params.windows(2).all(|w| w[0] <= w[1]);
        match *self {
            MembershipFunction::Triangular { a, c, .. } => {
                if !ordered {
                    return Err(MembershipError::Unordered { kind, params });
                }
                if a == c {
                    return Err(MembershipError::Degenerate {
                        kind,
                        reason: "support has zero width",
                    });
                }
            }
            MembershipFunction::Trapezoidal { a, d, .. } => {
                if !ordered {
                    return Err(MembershipError::Unordered { kind, params });
                }
                if a == d {
                    return Err(MembershipError::Degenerate {
                        kind,
                        reason: "support has zero width",
                    });
                }
            }
            MembershipFunction::Gaussian { sigma, .. } => {
                if sigma == 0.0 {
                    return Err(MembershipError::Degenerate {
                        kind,
                        reason: "sigma is zero",
                    });
                }
            }
            MembershipFunction::GeneralizedBell { a, .. } => {
                if a == 0.0 {
                    return Err(MembershipError::Degenerate {
                        kind,
                        reason: "width is zero",
                    });
                }
            }
            MembershipFunction::Sigmoid { slope, .. } => {
                if slope == 0.0 {
                    return Err(MembershipError::Degenerate {
                        kind,
                        reason: "slope is zero",
                    });
                }
            }
            MembershipFunction::ZShape { .. } | MembershipFunction::SShape { .. } => {
                if !ordered {
                    return Err(MembershipError::Unordered { kind, params });
                }
            }
        }
        Ok(())
    }

    /// Sample the curve on `[min, max]` every `step`.
    pub fn sample(&self, min: f64, max: f64, step: f64) -> Vec<CurvePoint> {
        sample_with(min, max, step, |x| self.degree(x))
    }
}

impl fmt::Display for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}[{}]", self.kind(), params)
    }
}

/// One sampled point of a membership curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub degree: f64,
}

/// Sample `degree` at `min, min + step, ...` up to and including `max`.
///
/// Returns an empty curve for a non-positive or non-finite step, or an
/// inverted range. At most [`MAX_CURVE_POINTS`] points are produced.
pub fn sample_with<F>(min: f64, max: f64, step: f64, degree: F) -> Vec<CurvePoint>
where
    F: Fn(f64) -> f64,
{
    let usable = step.is_finite() && step > 0.0 && min.is_finite() && max.is_finite();
    if !usable || max < min {
        return Vec::new();
    }

    // Small slack so that max is included despite rounding in (max - min) / step.
    let steps = ((max - min) / step + 1e-9).floor() as usize;
    let count = steps.saturating_add(1).min(MAX_CURVE_POINTS);
    (0..count)
        .map(|i| {
            let x = min + step * i as f64;
            CurvePoint { x, degree: degree(x) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_triangular() {
        let tri = MembershipFunction::triangular(0.0, 50.0, 100.0);
        assert_eq!(tri.degree(0.0), 0.0);
        assert_eq!(tri.degree(50.0), 1.0);
        assert_eq!(tri.degree(100.0), 0.0);
        assert_abs_diff_eq!(tri.degree(25.0), 0.5);
        assert_abs_diff_eq!(tri.degree(75.0), 0.5);
        assert_eq!(tri.degree(-10.0), 0.0);
        assert_eq!(tri.degree(150.0), 0.0);
    }

    #[test]
    fn test_triangular_shoulder() {
        // Left shoulder: the peak sits on the lower bound, which itself is outside.
        let cold = MembershipFunction::triangular(0.0, 0.0, 40.0);
        assert_eq!(cold.degree(0.0), 0.0);
        assert_abs_diff_eq!(cold.degree(30.0), 0.25);
        assert_abs_diff_eq!(cold.degree(10.0), 0.75);
        assert!(cold.validate().is_ok());
    }

    #[test]
    fn test_trapezoidal() {
        let trap = MembershipFunction::trapezoidal(0.0, 20.0, 40.0, 60.0);
        assert_eq!(trap.degree(0.0), 0.0);
        assert_eq!(trap.degree(20.0), 1.0);
        assert_eq!(trap.degree(30.0), 1.0);
        assert_eq!(trap.degree(40.0), 1.0);
        assert_abs_diff_eq!(trap.degree(10.0), 0.5);
        assert_abs_diff_eq!(trap.degree(50.0), 0.5);
        assert_eq!(trap.degree(60.0), 0.0);
    }

    #[test]
    fn test_gaussian() {
        let g = MembershipFunction::gaussian(5.0, 2.0);
        assert_eq!(g.degree(5.0), 1.0);
        assert_abs_diff_eq!(g.degree(7.0), (-0.5f64).exp(), epsilon = 1e-12);
        assert_abs_diff_eq!(g.degree(3.0), g.degree(7.0), epsilon = 1e-12);
    }

    #[test]
    fn test_generalized_bell() {
        let bell = MembershipFunction::generalized_bell(2.0, 1.0, 10.0);
        assert_eq!(bell.degree(10.0), 1.0);
        // |(12 - 10) / 2|^2 = 1
        assert_abs_diff_eq!(bell.degree(12.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(bell.degree(8.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sigmoid() {
        let s = MembershipFunction::sigmoid(1.0, 50.0);
        assert_abs_diff_eq!(s.degree(50.0), 0.5);
        assert!(s.degree(60.0) > 0.99);
        assert!(s.degree(40.0) < 0.01);

        let falling = MembershipFunction::sigmoid(-1.0, 50.0);
        assert!(falling.degree(60.0) < 0.01);
    }

    #[test]
    fn test_z_and_s_shapes() {
        let z = MembershipFunction::z_shape(0.0, 10.0);
        let s = MembershipFunction::s_shape(0.0, 10.0);

        assert_eq!(z.degree(-1.0), 1.0);
        assert_eq!(z.degree(10.0), 0.0);
        assert_abs_diff_eq!(z.degree(5.0), 0.5);
        assert_abs_diff_eq!(z.degree(2.5), 1.0 - 2.0 * 0.0625);
        assert_abs_diff_eq!(z.degree(7.5), 2.0 * 0.0625);

        assert_eq!(s.degree(0.0), 0.0);
        assert_eq!(s.degree(11.0), 1.0);
        assert_abs_diff_eq!(s.degree(5.0), 0.5);

        for x in [1.0, 2.5, 4.0, 6.0, 7.5, 9.0] {
            assert_abs_diff_eq!(z.degree(x) + s.degree(x), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_centroids() {
        assert_abs_diff_eq!(
            MembershipFunction::triangular(50.0, 100.0, 100.0).centroid(),
            250.0 / 3.0
        );
        assert_eq!(MembershipFunction::trapezoidal(0.0, 10.0, 20.0, 30.0).centroid(), 15.0);
        assert_eq!(MembershipFunction::gaussian(7.0, 1.0).centroid(), 7.0);
        assert_eq!(MembershipFunction::generalized_bell(1.0, 2.0, 3.0).centroid(), 3.0);
        assert_eq!(MembershipFunction::sigmoid(4.0, 6.0).centroid(), 6.0);
        assert_eq!(MembershipFunction::z_shape(2.0, 8.0).centroid(), 5.0);
        assert_eq!(MembershipFunction::s_shape(2.0, 8.0).centroid(), 5.0);
    }

    #[test]
    fn test_from_params() {
        let tri = MembershipFunction::from_params(ShapeKind::Triangular, &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(tri, MembershipFunction::triangular(0.0, 1.0, 2.0));

        let bell =
            MembershipFunction::from_params(ShapeKind::GeneralizedBell, &[2.0, 3.0, 4.0]).unwrap();
        assert_eq!(bell.params(), vec![2.0, 3.0, 4.0]);

        let err = MembershipFunction::from_params(ShapeKind::Trapezoidal, &[0.0, 1.0, 2.0]);
        assert!(matches!(
            err,
            Err(MembershipError::Arity {
                kind: ShapeKind::Trapezoidal,
                expected: 4,
                found: 3
            })
        ));

        let err = MembershipFunction::from_params(ShapeKind::Unknown, &[]);
        assert_eq!(err, Err(MembershipError::UnknownShape));
    }

    #[test]
    fn test_shape_kind_tags() {
        let kind: ShapeKind = serde_json::from_str("\"tri\"").unwrap();
        assert_eq!(kind, ShapeKind::Triangular);
        let kind: ShapeKind = serde_json::from_str("\"generalized-bell\"").unwrap();
        assert_eq!(kind, ShapeKind::GeneralizedBell);
        let kind: ShapeKind = serde_json::from_str("\"pimf\"").unwrap();
        assert_eq!(kind, ShapeKind::Unknown);
        assert_eq!(serde_json::to_string(&ShapeKind::ZShape).unwrap(), "\"zmf\"");
    }

    #[test]
    fn test_validate() {
        assert!(MembershipFunction::triangular(0.0, 5.0, 10.0).validate().is_ok());
        assert!(matches!(
            MembershipFunction::triangular(10.0, 5.0, 0.0).validate(),
            Err(MembershipError::Unordered { .. })
        ));
        assert!(matches!(
            MembershipFunction::triangular(3.0, 3.0, 3.0).validate(),
            Err(MembershipError::Degenerate { .. })
        ));
        assert!(matches!(
            MembershipFunction::gaussian(0.0, 0.0).validate(),
            Err(MembershipError::Degenerate { .. })
        ));
        assert!(matches!(
            MembershipFunction::generalized_bell(0.0, 1.0, 0.0).validate(),
            Err(MembershipError::Degenerate { .. })
        ));
        assert!(matches!(
            MembershipFunction::sigmoid(0.0, 1.0).validate(),
            Err(MembershipError::Degenerate { .. })
        ));
        assert!(matches!(
            MembershipFunction::s_shape(f64::NAN, 1.0).validate(),
            Err(MembershipError::NonFinite { .. })
        ));
        assert!(MembershipFunction::z_shape(4.0, 4.0).validate().is_ok());
    }

    #[test]
    fn test_degenerate_gaussian_is_not_guarded() {
        let g = MembershipFunction::gaussian(0.0, 0.0);
        assert!(g.degree(0.0).is_nan());
        assert_eq!(g.degree(1.0), 0.0);
    }

    #[test]
    fn test_sample() {
        let tri = MembershipFunction::triangular(0.0, 5.0, 10.0);
        let curve = tri.sample(0.0, 10.0, 1.0);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0].x, 0.0);
        assert_eq!(curve[10].x, 10.0);
        assert_eq!(curve[5].degree, 1.0);

        let fine = tri.sample(0.0, 1.0, 0.1);
        assert_eq!(fine.len(), 11);

        assert!(tri.sample(0.0, 10.0, 0.0).is_empty());
        assert!(tri.sample(0.0, 10.0, -1.0).is_empty());
        assert!(tri.sample(10.0, 0.0, 1.0).is_empty());
        assert_eq!(tri.sample(0.0, 1e9, 1e-3).len(), MAX_CURVE_POINTS);
    }

    #[test]
    fn test_display() {
        let tri = MembershipFunction::triangular(0.0, 0.5, 1.0);
        assert_eq!(tri.to_string(), "triangular[0, 0.5, 1]");
    }
}
