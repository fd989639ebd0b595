//! Component options.
//!
//! This module provides the configuration shared by every spline of one
//! component: batch size, interpolation method, query locations, control-point
//! grid mode and method-specific engine options.

use crate::error::ConfigError;
use interp_engine::{InterpMethod, InterpOptions};

#[cfg(feature = "serde")]
fn default_vec_size() -> usize {
    1
}

/// Options for a spline component.
///
/// Exactly one of `x_cp_val` and `num_cp` must be set when the component is
/// finalised; `bsplines` requires `num_cp`.
///
/// # Examples
///
/// ```
/// use interp_engine::InterpMethod;
/// use spline_comp::SplineCompOptions;
///
/// let options = SplineCompOptions::new(vec![0.5, 1.5])
///     .with_vec_size(2)
///     .with_method(InterpMethod::Slinear)
///     .with_x_cp_val(vec![0.0, 1.0, 2.0]);
/// assert_eq!(options.vec_size, 2);
/// assert_eq!(options.n_interp(), 2);
/// assert!(options.num_cp.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineCompOptions {
    /// Number of rows evaluated at once.
    ///
    /// Default: 1
    #[cfg_attr(feature = "serde", serde(default = "default_vec_size"))]
    pub vec_size: usize,

    /// Interpolation method used for every output.
    ///
    /// Default: akima
    #[cfg_attr(feature = "serde", serde(default))]
    pub method: InterpMethod,

    /// Query locations shared by every output.
    pub x_interp_val: Vec<f64>,

    /// Explicit control-point positions, strictly increasing.
    /// Not valid for bsplines.
    #[cfg_attr(feature = "serde", serde(default))]
    pub x_cp_val: Option<Vec<f64>>,

    /// Number of control points, placed at `0, 1, ..., num_cp - 1`.
    /// Required for bsplines.
    #[cfg_attr(feature = "serde", serde(default))]
    pub num_cp: Option<usize>,

    /// Options specific to the chosen method, passed to the engine as is.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interp_options: InterpOptions,

    /// Reject query locations outside the control-point grid.
    ///
    /// `bsplines` is parameterised over the span of the query locations, so
    /// its values never fall out of bounds; only point gradients requested
    /// outside that span are rejected.
    ///
    /// Default: false
    #[cfg_attr(feature = "serde", serde(default))]
    pub bounds_error: bool,
}

impl SplineCompOptions {
    /// Create options with the given query locations and defaults elsewhere.
    pub fn new(x_interp_val: impl Into<Vec<f64>>) -> Self {
        Self {
            vec_size: 1,
            method: InterpMethod::default(),
            x_interp_val: x_interp_val.into(),
            x_cp_val: None,
            num_cp: None,
            interp_options: InterpOptions::new(),
            bounds_error: false,
        }
    }

    /// Set the batch size.
    pub fn with_vec_size(mut self, vec_size: usize) -> Self {
        self.vec_size = vec_size;
        self
    }

    /// Set the interpolation method.
    pub fn with_method(mut self, method: InterpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set explicit control-point positions.
    pub fn with_x_cp_val(mut self, x_cp_val: impl Into<Vec<f64>>) -> Self {
        self.x_cp_val = Some(x_cp_val.into());
        self
    }

    /// Set the control-point count.
    pub fn with_num_cp(mut self, num_cp: usize) -> Self {
        self.num_cp = Some(num_cp);
        self
    }

    /// Set the method-specific engine options.
    pub fn with_interp_options(mut self, interp_options: InterpOptions) -> Self {
        self.interp_options = interp_options;
        self
    }

    /// Set whether out-of-grid query locations are rejected.
    pub fn with_bounds_error(mut self, bounds_error: bool) -> Self {
        self.bounds_error = bounds_error;
        self
    }

    /// Number of query locations.
    pub fn n_interp(&self) -> usize {
        self.x_interp_val.len()
    }

    /// Check the options that do not depend on the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vec_size == 0 {
            return Err(ConfigError::ZeroVecSize);
        }
        if self.x_interp_val.is_empty() {
            return Err(ConfigError::EmptyInterpPoints);
        }
        Ok(())
    }

    /// Parse options from a TOML table.
    ///
    /// ```
    /// use interp_engine::InterpMethod;
    /// use spline_comp::SplineCompOptions;
    ///
    /// let options = SplineCompOptions::from_toml_str(
    ///     r#"
    ///     method = "bsplines"
    ///     num_cp = 6
    ///     x_interp_val = [0.0, 0.5, 1.0]
    ///
    ///     [interp_options]
    ///     order = 3
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(options.method, InterpMethod::Bsplines);
    /// assert_eq!(options.vec_size, 1);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: SplineCompOptions =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SplineCompOptions::new(vec![0.0, 1.0]);
        assert_eq!(options.vec_size, 1);
        assert_eq!(options.method, InterpMethod::Akima);
        assert!(options.x_cp_val.is_none());
        assert!(options.num_cp.is_none());
        assert!(options.interp_options.is_empty());
        assert!(!options.bounds_error);
    }

    #[test]
    fn test_with_methods_chain() {
        let options = SplineCompOptions::new(vec![0.25])
            .with_vec_size(3)
            .with_method(InterpMethod::Bsplines)
            .with_num_cp(5)
            .with_interp_options(InterpOptions::new().with("order", 3_i64))
            .with_bounds_error(true);
        assert_eq!(options.vec_size, 3);
        assert_eq!(options.num_cp, Some(5));
        assert_eq!(options.interp_options.len(), 1);
        assert!(options.bounds_error);
    }

    #[test]
    fn test_validate() {
        assert!(SplineCompOptions::new(vec![0.0]).validate().is_ok());
        assert_eq!(
            SplineCompOptions::new(vec![0.0]).with_vec_size(0).validate(),
            Err(ConfigError::ZeroVecSize)
        );
        assert_eq!(
            SplineCompOptions::new(Vec::new()).validate(),
            Err(ConfigError::EmptyInterpPoints)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            vec_size = 2
            method = "scipy_cubic"
            x_interp_val = [0.5, 1.5]
            x_cp_val = [0.0, 1.0, 2.0]
            bounds_error = true
        "#;
        let options = SplineCompOptions::from_toml_str(toml_str).unwrap();
        assert_eq!(options.vec_size, 2);
        assert_eq!(options.method, InterpMethod::ScipyCubic);
        assert_eq!(options.x_cp_val, Some(vec![0.0, 1.0, 2.0]));
        assert!(options.bounds_error);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_toml_missing_query_locations() {
        let err = SplineCompOptions::from_toml_str("num_cp = 4").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
