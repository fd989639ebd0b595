//! The per-call engine contract.
//!
//! An engine is bound once to a grid, a method and a set of query locations,
//! then evaluated repeatedly. Derivative computation is requested explicitly
//! on every call through [`DerivativeRequest`], and the result comes back in
//! the same [`Evaluation`] as the values, so derivatives can never be read
//! before the evaluation that produced them.

use crate::error::InterpResult;
use crate::method::InterpMethod;
use faer::sparse::SparseColMat;
use ndarray::{Array2, Array3, ArrayView2};
use std::fmt;

/// Representation of `d(values_out)/d(values_in)` an engine produces.
///
/// Resolved once per engine; it never changes between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivativeLayout {
    /// One dense `(n_interp, n_cp)` block per batch row, stacked as
    /// `(batch, n_interp, n_cp)`.
    BatchVarying,
    /// One sparse `(n_interp, n_cp)` matrix shared by every batch row.
    BatchInvariant,
    /// Nothing is produced by `evaluate`; gradients are queried one point at
    /// a time with [`InterpEngine::training_gradients`].
    PointQueried,
}

impl fmt::Display for DerivativeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivativeLayout::BatchVarying => write!(f, "batch-varying dense"),
            DerivativeLayout::BatchInvariant => write!(f, "batch-invariant sparse"),
            DerivativeLayout::PointQueried => write!(f, "point-queried"),
        }
    }
}

/// Which derivatives the caller wants computed alongside the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivativeRequest {
    /// Compute derivatives with respect to the control-point values.
    pub d_dvalues: bool,
}

impl DerivativeRequest {
    /// Values only.
    pub fn none() -> Self {
        Self { d_dvalues: false }
    }

    /// Values plus control-point derivatives.
    pub fn with_value_derivatives() -> Self {
        Self { d_dvalues: true }
    }
}

/// One evaluation call.
#[derive(Debug, Clone, Copy)]
pub struct EvalRequest<'a> {
    /// Control-point values, shape `(batch, n_cp)`.
    pub values: ArrayView2<'a, f64>,
    /// Query locations, length `n_interp`.
    pub x_interp: &'a [f64],
    /// Derivatives to compute as part of this call.
    pub derivatives: DerivativeRequest,
}

/// Control-point derivatives produced by an evaluation.
#[derive(Debug, Clone)]
pub enum ValueDerivatives {
    /// Shape `(batch, n_interp, n_cp)`.
    BatchVarying(Array3<f64>),
    /// Shape `(n_interp, n_cp)`, shared by every batch row.
    BatchInvariant(SparseColMat<usize, f64>),
}

impl ValueDerivatives {
    /// Layout tag of this representation.
    pub fn layout(&self) -> DerivativeLayout {
        match self {
            ValueDerivatives::BatchVarying(_) => DerivativeLayout::BatchVarying,
            ValueDerivatives::BatchInvariant(_) => DerivativeLayout::BatchInvariant,
        }
    }

    /// Shape of the stored array (batch-invariant matrices report 2 dims).
    pub fn shape(&self) -> Vec<usize> {
        match self {
            ValueDerivatives::BatchVarying(d) => d.shape().to_vec(),
            ValueDerivatives::BatchInvariant(m) => vec![m.nrows(), m.ncols()],
        }
    }
}

/// Result of one evaluation call.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Interpolated values, shape `(batch, n_interp)`.
    pub values: Array2<f64>,
    /// Present when requested and the layout is not point-queried.
    pub d_dvalues: Option<ValueDerivatives>,
}

/// An interpolation engine bound to one grid, method and query set.
///
/// Engines are batch-agnostic: they accept any number of control-value rows
/// per call. Each instance is owned by exactly one caller at a time.
pub trait InterpEngine: Send + fmt::Debug {
    /// Method the engine implements.
    fn method(&self) -> InterpMethod;

    /// Number of control points the engine was built for.
    fn num_points(&self) -> usize;

    /// Derivative representation produced by [`InterpEngine::evaluate`].
    fn derivative_layout(&self) -> DerivativeLayout;

    /// Interpolate every batch row of `request.values` at `request.x_interp`.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::OutOfBounds` - a query lies outside the grid and
    ///   bounds checking is enabled
    /// * `InterpolationError::InvalidInput` - value width differs from
    ///   [`InterpEngine::num_points`]
    fn evaluate(&mut self, request: EvalRequest<'_>) -> InterpResult<Evaluation>;

    /// Gradient of the interpolant at a single location with respect to the
    /// control values, length [`InterpEngine::num_points`].
    fn training_gradients(&self, x: f64) -> InterpResult<Vec<f64>>;
}
