//! Spline component error types.
//!
//! This module provides:
//! - `ConfigError`: Inconsistent configuration detected at finalisation
//! - `SplineCompError`: Errors from `compute` and `compute_partials`
//! - `SplineCompResult`: Convenience result alias

use interp_engine::InterpolationError;
use thiserror::Error;

/// Configuration errors raised while finalising a component.
///
/// Every message names the offending option or variable. These errors are
/// fatal: the builder that produced them has been consumed.
///
/// # Examples
///
/// ```
/// use spline_comp::ConfigError;
///
/// let err = ConfigError::BothGridOptions;
/// let msg = format!("{}", err);
/// assert!(msg.contains("x_cp_val"));
/// assert!(msg.contains("num_cp"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Explicit control-point positions given for the B-spline method.
    #[error("'x_cp_val' is not a valid option when using method 'bsplines'. Set 'num_cp' instead.")]
    XCpValWithBsplines,

    /// Both grid options given.
    #[error("Only one of 'x_cp_val' or 'num_cp' can be specified.")]
    BothGridOptions,

    /// Neither grid option given.
    #[error("Either option 'x_cp_val' or 'num_cp' must be specified.")]
    NoGridOption,

    /// `x_interp_val` is empty.
    #[error("Option 'x_interp_val' must contain at least one point.")]
    EmptyInterpPoints,

    /// `vec_size` is zero.
    #[error("Option 'vec_size' must be at least 1.")]
    ZeroVecSize,

    /// A variable name is registered twice.
    #[error("Variable name '{name}' is already in use.")]
    DuplicateName {
        /// The repeated name
        name: String,
    },

    /// Default control values have an unusable shape.
    #[error("Default values for '{name}' have shape {actual:?}, expected ({n_cp},) or ({vec_size}, {n_cp}).")]
    DefaultShape {
        /// Control-point input name
        name: String,
        /// Shape that was supplied
        actual: Vec<usize>,
        /// Control points per row
        n_cp: usize,
        /// Configured batch size
        vec_size: usize,
    },

    /// Replacement query locations have the wrong length.
    #[error("Option 'x_interp_val' must keep length {expected}, got {actual}.")]
    InterpLength {
        /// Length fixed at finalisation
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// A query location is NaN or infinite.
    #[error("Option 'x_interp_val' has a non-finite value at index {index}.")]
    NonFiniteInterpPoint {
        /// Position of the first offending entry
        index: usize,
    },

    /// Options could not be parsed.
    #[error("Failed to parse options: {0}")]
    Parse(String),

    /// The engine for one output could not be built.
    #[error("Error creating interpolant for output '{output}': {source}")]
    Engine {
        /// Interpolated output name
        output: String,
        /// Underlying engine error
        #[source]
        source: InterpolationError,
    },
}

/// Errors raised by a finalised spline component.
///
/// # Examples
///
/// ```
/// use interp_engine::InterpolationError;
/// use spline_comp::SplineCompError;
///
/// let err = SplineCompError::Interpolation {
///     output: "y".to_string(),
///     source: InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 },
/// };
/// assert!(format!("{}", err).starts_with("Error interpolating output 'y':"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineCompError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Evaluation failed for one output.
    #[error("Error interpolating output '{output}': {source}")]
    Interpolation {
        /// Interpolated output name
        output: String,
        /// Underlying engine error
        #[source]
        source: InterpolationError,
    },

    /// A control-point input was not supplied.
    #[error("Missing control-point input '{name}'")]
    MissingInput {
        /// Control-point input name
        name: String,
    },

    /// A control-point input has the wrong shape.
    #[error("Control-point input '{name}' has shape {actual:?}, expected {expected:?}")]
    InputShape {
        /// Control-point input name
        name: String,
        /// Expected `(vec_size, n_cp)`
        expected: [usize; 2],
        /// Shape that was supplied
        actual: [usize; 2],
    },

    /// Engine derivatives are inconsistent with the declared pattern.
    #[error("Derivatives for output '{output}' have shape {actual:?}, expected {expected:?}")]
    DerivativeShape {
        /// Interpolated output name
        output: String,
        /// Expected shape
        expected: Vec<usize>,
        /// Shape the engine produced
        actual: Vec<usize>,
    },

    /// A compute record does not belong to this component.
    #[error("Compute record holds {actual} splines, component has {expected}")]
    RecordMismatch {
        /// Splines registered on the component
        expected: usize,
        /// Evaluations held by the record
        actual: usize,
    },
}

impl SplineCompError {
    /// Create a missing input error.
    pub fn missing_input(name: impl Into<String>) -> Self {
        Self::MissingInput { name: name.into() }
    }

    /// Create a derivative shape error.
    pub fn derivative_shape(
        output: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
    ) -> Self {
        Self::DerivativeShape {
            output: output.into(),
            expected,
            actual,
        }
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is an evaluation error.
    pub fn is_interpolation(&self) -> bool {
        matches!(self, Self::Interpolation { .. })
    }

    /// Name of the output or input the error refers to, if any.
    pub fn variable(&self) -> Option<&str> {
        match self {
            Self::Interpolation { output, .. } | Self::DerivativeShape { output, .. } => {
                Some(output)
            }
            Self::MissingInput { name } | Self::InputShape { name, .. } => Some(name),
            Self::Config(ConfigError::Engine { output, .. }) => Some(output),
            Self::Config(ConfigError::DuplicateName { name })
            | Self::Config(ConfigError::DefaultShape { name, .. }) => Some(name),
            _ => None,
        }
    }
}

/// Result alias used throughout the component crate.
pub type SplineCompResult<T> = Result<T, SplineCompError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Configuration Error Tests
    // ========================================

    #[test]
    fn test_bsplines_message_names_both_options() {
        let msg = format!("{}", ConfigError::XCpValWithBsplines);
        assert!(msg.contains("x_cp_val"));
        assert!(msg.contains("bsplines"));
    }

    #[test]
    fn test_no_grid_option_message() {
        let msg = format!("{}", ConfigError::NoGridOption);
        assert!(msg.contains("x_cp_val"));
        assert!(msg.contains("num_cp"));
    }

    #[test]
    fn test_non_finite_interp_point_message() {
        let msg = format!("{}", ConfigError::NonFiniteInterpPoint { index: 3 });
        assert!(msg.contains("x_interp_val"));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_config_converts_into_comp_error() {
        let err: SplineCompError = ConfigError::ZeroVecSize.into();
        assert!(err.is_config());
        assert_eq!(format!("{}", err), "Option 'vec_size' must be at least 1.");
    }

    // ========================================
    // Evaluation Error Tests
    // ========================================

    #[test]
    fn test_interpolation_message() {
        let err = SplineCompError::Interpolation {
            output: "ysp".to_string(),
            source: InterpolationError::OutOfBounds {
                x: 2.5,
                min: 0.0,
                max: 2.0,
            },
        };
        assert_eq!(
            format!("{}", err),
            "Error interpolating output 'ysp': Query point 2.5 outside valid domain [0, 2]"
        );
        assert!(err.is_interpolation());
        assert_eq!(err.variable(), Some("ysp"));
    }

    #[test]
    fn test_derivative_shape_message() {
        let err = SplineCompError::derivative_shape("y", vec![2, 3, 4], vec![2, 4, 3]);
        let msg = format!("{}", err);
        assert!(msg.contains("'y'"));
        assert!(msg.contains("[2, 3, 4]"));
        assert!(msg.contains("[2, 4, 3]"));
    }

    #[test]
    fn test_variable_of_record_mismatch_is_none() {
        let err = SplineCompError::RecordMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.variable(), None);
        assert_eq!(
            SplineCompError::missing_input("ycp").variable(),
            Some("ycp")
        );
    }
}
