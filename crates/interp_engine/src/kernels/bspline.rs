//! Uniform clamped B-spline engine.
//!
//! The curve parameter runs over `[0, 1]`, mapped linearly onto the span of
//! the query locations, so only the control-point count matters (the grid
//! positions are not used). The interpolant is `y = B · v` with a sparse
//! basis matrix `B` of shape `(n_interp, n_cp)` that depends on the query
//! locations only, so the same matrix is the derivative for every batch row.

use crate::engine::{DerivativeLayout, EvalRequest, Evaluation, InterpEngine, ValueDerivatives};
use crate::error::{InterpResult, InterpolationError};
use crate::method::InterpMethod;
use faer::sparse::{SparseColMat, Triplet};
use ndarray::Array2;

#[derive(Debug)]
pub(crate) struct BsplineEngine {
    n_cp: usize,
    order: usize,
    knots: Vec<f64>,
    bounds_error: bool,
    /// Query locations the cached basis was built for.
    x_interp: Vec<f64>,
    basis: SparseColMat<usize, f64>,
}

impl BsplineEngine {
    /// `order` must already be clamped to `2..=n_cp`.
    pub(crate) fn new(
        n_cp: usize,
        order: usize,
        x_interp: &[f64],
        bounds_error: bool,
    ) -> InterpResult<Self> {
        let knots = clamped_uniform_knots(n_cp, order);
        let basis = basis_matrix(&knots, n_cp, order, x_interp)?;
        Ok(Self {
            n_cp,
            order,
            knots,
            bounds_error,
            x_interp: x_interp.to_vec(),
            basis,
        })
    }

    /// Map a query location to the curve parameter.
    fn parameter(&self, x: f64) -> InterpResult<f64> {
        let (lo, hi) = span(&self.x_interp);
        if self.bounds_error && (x < lo || x > hi) {
            return Err(InterpolationError::OutOfBounds { x, min: lo, max: hi });
        }
        Ok(normalise(x, lo, hi))
    }
}

/// Knot vector with `order` repeated knots at each end and uniform interior.
fn clamped_uniform_knots(n_cp: usize, order: usize) -> Vec<f64> {
    let n_inner = n_cp - order;
    let mut knots = vec![0.0; order];
    knots.extend((1..=n_inner).map(|i| i as f64 / (n_inner + 1) as f64));
    knots.extend(std::iter::repeat(1.0).take(order));
    knots
}

fn span(xs: &[f64]) -> (f64, f64) {
    xs.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
}

fn normalise(x: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((x - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Index `s` of the knot interval `[knots[s], knots[s+1])` containing `t`.
fn find_knot_span(knots: &[f64], n_cp: usize, degree: usize, t: f64) -> usize {
    if t >= knots[n_cp] {
        return n_cp - 1;
    }
    let mut s = degree;
    while s + 1 < n_cp && knots[s + 1] <= t {
        s += 1;
    }
    s
}

/// Nonzero basis functions `N_{span-degree..=span}` at `t` (Cox-de Boor).
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

fn basis_matrix(
    knots: &[f64],
    n_cp: usize,
    order: usize,
    x_interp: &[f64],
) -> InterpResult<SparseColMat<usize, f64>> {
    let degree = order - 1;
    let (lo, hi) = span(x_interp);
    let mut triplets = Vec::with_capacity(x_interp.len() * order);
    for (row, &x) in x_interp.iter().enumerate() {
        let t = normalise(x, lo, hi);
        let s = find_knot_span(knots, n_cp, degree, t);
        for (offset, value) in basis_functions(knots, s, degree, t).into_iter().enumerate() {
            triplets.push(Triplet::new(row, s - degree + offset, value));
        }
    }
    SparseColMat::try_new_from_triplets(x_interp.len(), n_cp, &triplets).map_err(|_| {
        InterpolationError::InvalidInput("failed to assemble B-spline basis matrix".to_string())
    })
}

impl InterpEngine for BsplineEngine {
    fn method(&self) -> InterpMethod {
        InterpMethod::Bsplines
    }

    fn num_points(&self) -> usize {
        self.n_cp
    }

    fn derivative_layout(&self) -> DerivativeLayout {
        DerivativeLayout::BatchInvariant
    }

    fn evaluate(&mut self, request: EvalRequest<'_>) -> InterpResult<Evaluation> {
        if request.values.ncols() != self.n_cp {
            return Err(InterpolationError::InvalidInput(format!(
                "expected {} control values per row, got {}",
                self.n_cp,
                request.values.ncols()
            )));
        }
        if request.x_interp != self.x_interp.as_slice() {
            self.basis = basis_matrix(&self.knots, self.n_cp, self.order, request.x_interp)?;
            self.x_interp = request.x_interp.to_vec();
        }

        let batch = request.values.nrows();
        let mut out = Array2::<f64>::zeros((batch, self.x_interp.len()));
        let (symbolic, values) = self.basis.parts();
        let col_ptr = symbolic.col_ptr();
        let row_idx = symbolic.row_idx();
        for col in 0..self.n_cp {
            for idx in col_ptr[col]..col_ptr[col + 1] {
                let row = row_idx[idx];
                let weight = values[idx];
                for b in 0..batch {
                    out[[b, row]] += weight * request.values[[b, col]];
                }
            }
        }

        Ok(Evaluation {
            values: out,
            d_dvalues: request
                .derivatives
                .d_dvalues
                .then(|| ValueDerivatives::BatchInvariant(self.basis.clone())),
        })
    }

    fn training_gradients(&self, x: f64) -> InterpResult<Vec<f64>> {
        let degree = self.order - 1;
        let t = self.parameter(x)?;
        let s = find_knot_span(&self.knots, self.n_cp, degree, t);
        let mut grad = vec![0.0; self.n_cp];
        for (offset, value) in basis_functions(&self.knots, s, degree, t).into_iter().enumerate() {
            grad[s - degree + offset] = value;
        }
        Ok(grad)
    }
}
