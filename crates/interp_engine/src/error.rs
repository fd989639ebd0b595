//! Error types for interpolation engines.
//!
//! This module provides:
//! - `InterpolationError`: Errors from engine construction, option parsing,
//!   and evaluation
//! - `InterpResult`: Convenience result alias

use crate::method::InterpMethod;
use thiserror::Error;

/// Interpolation-related errors.
///
/// Construction errors (`InsufficientData`, `NonMonotonicGrid`,
/// `UnknownOption`, `InvalidOption`) are raised once when an engine is built.
/// `OutOfBounds` is the only value-domain error and is raised by evaluation
/// when bounds checking is enabled.
///
/// # Examples
/// ```
/// use interp_engine::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for the requested method.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Grid positions are not strictly increasing.
    #[error("Grid is not strictly increasing at index {index}")]
    NonMonotonicGrid {
        /// Index of the first offending position
        index: usize,
    },

    /// Option key not understood by the selected method.
    #[error("Option '{option}' is not valid for method '{method}'")]
    UnknownOption {
        /// Method the option was passed to
        method: InterpMethod,
        /// Offending option key
        option: String,
    },

    /// Option key understood, value rejected.
    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOption {
        /// Offending option key
        option: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the engine crate.
pub type InterpResult<T> = Result<T, InterpolationError>;
