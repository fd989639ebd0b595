//! Interpolation method selection.

use crate::engine::DerivativeLayout;
use crate::error::InterpolationError;
use std::fmt;
use std::str::FromStr;

/// Interpolation method used by every spline of a component.
///
/// Method names follow the lowercase identifiers used in configuration files
/// (`"akima"`, `"bsplines"`, `"scipy_cubic"`, ...).
///
/// # Variants
///
/// - `Slinear`: Piecewise linear
/// - `Lagrange2`: Piecewise quadratic Lagrange through the 3 nearest points
/// - `Lagrange3`: Piecewise cubic Lagrange through the 4 nearest points
/// - `Cubic`: Natural cubic spline
/// - `Akima`: Akima spline (default)
/// - `Bsplines`: Uniform clamped B-spline over the query range
/// - `ScipySlinear`: Piecewise linear, real-valued only
/// - `ScipyCubic`: Natural cubic spline, real-valued only
///
/// # Examples
///
/// ```
/// use interp_engine::InterpMethod;
///
/// let method: InterpMethod = "bsplines".parse().unwrap();
/// assert_eq!(method, InterpMethod::Bsplines);
/// assert_eq!(method.to_string(), "bsplines");
/// assert_eq!(InterpMethod::default(), InterpMethod::Akima);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum InterpMethod {
    /// Piecewise linear interpolation.
    Slinear,
    /// Quadratic Lagrange polynomial through the 3 nearest grid points.
    Lagrange2,
    /// Cubic Lagrange polynomial through the 4 nearest grid points.
    Lagrange3,
    /// Natural cubic spline (zero second derivative at both ends).
    Cubic,
    /// Akima spline with optional smoothed weights.
    #[default]
    Akima,
    /// Uniform clamped B-spline parameterised over the query range.
    ///
    /// Evaluation never goes out of bounds; `bounds_error` only affects
    /// `training_gradients` at points outside the query range.
    Bsplines,
    /// Piecewise linear interpolation without complex-step support.
    ScipySlinear,
    /// Natural cubic spline without complex-step support.
    ScipyCubic,
}

impl InterpMethod {
    /// Every supported method, in declaration order.
    pub const ALL: [InterpMethod; 8] = [
        InterpMethod::Slinear,
        InterpMethod::Lagrange2,
        InterpMethod::Lagrange3,
        InterpMethod::Cubic,
        InterpMethod::Akima,
        InterpMethod::Bsplines,
        InterpMethod::ScipySlinear,
        InterpMethod::ScipyCubic,
    ];

    /// Configuration identifier of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterpMethod::Slinear => "slinear",
            InterpMethod::Lagrange2 => "lagrange2",
            InterpMethod::Lagrange3 => "lagrange3",
            InterpMethod::Cubic => "cubic",
            InterpMethod::Akima => "akima",
            InterpMethod::Bsplines => "bsplines",
            InterpMethod::ScipySlinear => "scipy_slinear",
            InterpMethod::ScipyCubic => "scipy_cubic",
        }
    }

    /// Minimum number of control points the method can be built on.
    pub fn min_points(&self) -> usize {
        match self {
            InterpMethod::Slinear | InterpMethod::ScipySlinear => 2,
            InterpMethod::Lagrange2 => 3,
            InterpMethod::Lagrange3 => 4,
            InterpMethod::Cubic | InterpMethod::ScipyCubic => 3,
            InterpMethod::Akima => 2,
            InterpMethod::Bsplines => 2,
        }
    }

    /// Whether outputs of this method can be verified by complex-step.
    ///
    /// The `scipy_*` family evaluates in real arithmetic only, so partials
    /// must be checked with finite differences.
    pub fn supports_complex_step(&self) -> bool {
        !matches!(self, InterpMethod::ScipySlinear | InterpMethod::ScipyCubic)
    }

    /// Which derivative representation engines of this method produce.
    pub fn derivative_layout(&self) -> DerivativeLayout {
        match self {
            InterpMethod::Akima => DerivativeLayout::BatchVarying,
            InterpMethod::Bsplines => DerivativeLayout::BatchInvariant,
            _ => DerivativeLayout::PointQueried,
        }
    }
}

impl fmt::Display for InterpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterpMethod {
    type Err = InterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        InterpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| InterpolationError::InvalidOption {
                option: "method".to_string(),
                reason: format!(
                    "unknown method '{}', expected one of: {}",
                    s,
                    InterpMethod::ALL
                        .iter()
                        .map(|m| m.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }
}
