//! Akima spline with exact control-value derivatives.
//!
//! Segment slopes `m_k = (v_{k+1} - v_k) / h_k` are extended by two
//! parabolic slopes at each end. Knot tangents are the weighted averages
//!
//! ```text
//! t_i = (|m_{i+1} - m_i| * m_{i-1} + |m_{i-1} - m_{i-2}| * m_i)
//!     / (|m_{i+1} - m_i| + |m_{i-1} - m_{i-2}|)
//! ```
//!
//! falling back to `(m_{i-1} + m_i) / 2` when both weights vanish. With
//! `delta_x > 0` the absolute value is replaced by a quadratic inside
//! `[-delta_x, delta_x]` so the tangents are differentiable everywhere.
//!
//! The extended slopes are a fixed linear map of the values, so their
//! gradient is the matrix of that map; tangent gradients follow by the
//! quotient rule. The interpolant is nonlinear in the values, hence the
//! derivative differs per batch row.

use crate::engine::{DerivativeLayout, EvalRequest, Evaluation, InterpEngine, ValueDerivatives};
use crate::error::{InterpResult, InterpolationError};
use crate::grid::{check_bounds, find_segment};
use crate::method::InterpMethod;
use ndarray::{s, Array1, Array2, Array3, ArrayView1};

/// Relative size below which both Akima weights count as zero.
const WEIGHT_EPS: f64 = 1e-12;

#[derive(Debug)]
pub(crate) struct AkimaEngine {
    grid: Vec<f64>,
    delta_x: f64,
    bounds_error: bool,
    /// Linear map from values to the `n + 3` extended slopes.
    slope_map: Array2<f64>,
    /// Row used by `training_gradients`; replaced by the first batch row of
    /// every evaluation.
    training: Vec<f64>,
}

/// Knot tangents of one batch row, with gradients when requested.
struct Tangents {
    slopes: Array1<f64>,
    t: Vec<f64>,
    dt: Option<Array2<f64>>,
}

impl AkimaEngine {
    /// Requires a validated grid with at least 2 points.
    pub(crate) fn new(grid: &[f64], values: &[f64], delta_x: f64, bounds_error: bool) -> Self {
        Self {
            grid: grid.to_vec(),
            delta_x,
            bounds_error,
            slope_map: extended_slope_map(grid),
            training: values.to_vec(),
        }
    }

    fn smooth_abs(&self, u: f64) -> (f64, f64) {
        if self.delta_x > 0.0 && u.abs() < self.delta_x {
            (
                u * u / (2.0 * self.delta_x) + self.delta_x / 2.0,
                u / self.delta_x,
            )
        } else if u > 0.0 {
            (u, 1.0)
        } else if u < 0.0 {
            (-u, -1.0)
        } else {
            (0.0, 0.0)
        }
    }

    fn tangents(&self, values: ArrayView1<'_, f64>, with_grad: bool) -> Tangents {
        let n = self.grid.len();
        let slopes = self.slope_map.dot(&values);
        let sm = &self.slope_map;

        let mut t = Vec::with_capacity(n);
        let mut dt = with_grad.then(|| Array2::<f64>::zeros((n, n)));
        for i in 0..n {
            let a = slopes[i + 1];
            let b = slopes[i + 2];
            let u1 = slopes[i + 3] - slopes[i + 2];
            let u2 = slopes[i + 1] - slopes[i];
            let (w1, dw1_du) = self.smooth_abs(u1);
            let (w2, dw2_du) = self.smooth_abs(u2);
            let sum = w1 + w2;

            if sum > WEIGHT_EPS * a.abs().max(b.abs()).max(1.0) {
                let ti = (w1 * a + w2 * b) / sum;
                t.push(ti);
                if let Some(dt) = dt.as_mut() {
                    // dt = ((a - t) dw1 + (b - t) dw2 + w1 da + w2 db) / sum
                    let mut row = dt.row_mut(i);
                    let k1 = (a - ti) * dw1_du / sum;
                    let k2 = (b - ti) * dw2_du / sum;
                    row.scaled_add(k1, &sm.row(i + 3));
                    row.scaled_add(-k1, &sm.row(i + 2));
                    row.scaled_add(k2, &sm.row(i + 1));
                    row.scaled_add(-k2, &sm.row(i));
                    row.scaled_add(w1 / sum, &sm.row(i + 1));
                    row.scaled_add(w2 / sum, &sm.row(i + 2));
                }
            } else {
                t.push(0.5 * (a + b));
                if let Some(dt) = dt.as_mut() {
                    let mut row = dt.row_mut(i);
                    row.scaled_add(0.5, &sm.row(i + 1));
                    row.scaled_add(0.5, &sm.row(i + 2));
                }
            }
        }

        Tangents { slopes, t, dt }
    }

    /// Hermite basis terms of segment `i` at `x`: the multipliers of `v_i`
    /// (always 1), `t_i`, `t_{i+1}` and `m_i` in the cubic.
    fn segment_terms(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.grid, x);
        let h = self.grid[i + 1] - self.grid[i];
        let dx = x - self.grid[i];
        let p2 = dx * dx / h;
        let p3 = dx * dx * dx / (h * h);
        (i, dx - 2.0 * p2 + p3, p3 - p2, 3.0 * p2 - 2.0 * p3)
    }

    fn value_at(&self, values: ArrayView1<'_, f64>, tan: &Tangents, x: f64) -> f64 {
        let (i, ct0, ct1, cm) = self.segment_terms(x);
        values[i] + ct0 * tan.t[i] + ct1 * tan.t[i + 1] + cm * tan.slopes[i + 2]
    }

    fn gradient_at(&self, dt: &Array2<f64>, x: f64) -> Array1<f64> {
        let (i, ct0, ct1, cm) = self.segment_terms(x);
        let mut grad = Array1::<f64>::zeros(self.grid.len());
        grad[i] = 1.0;
        grad.scaled_add(ct0, &dt.row(i));
        grad.scaled_add(ct1, &dt.row(i + 1));
        grad.scaled_add(cm, &self.slope_map.row(i + 2));
        grad
    }

    fn checked(&self, x: f64) -> InterpResult<()> {
        if self.bounds_error {
            check_bounds(&self.grid, x)?;
        }
        Ok(())
    }
}

/// Matrix `S` with `S · v = [m_{-2}, m_{-1}, m_0, ..., m_{n-2}, m_{n-1}, m_n]`.
fn extended_slope_map(grid: &[f64]) -> Array2<f64> {
    let n = grid.len();
    let nseg = n - 1;
    let mut map = Array2::<f64>::zeros((n + 3, n));
    for k in 0..nseg {
        let h = grid[k + 1] - grid[k];
        map[[k + 2, k]] = -1.0 / h;
        map[[k + 2, k + 1]] = 1.0 / h;
    }

    let first = map.row(2).to_owned();
    let second = if nseg > 1 {
        map.row(3).to_owned()
    } else {
        first.clone()
    };
    let last = map.row(nseg + 1).to_owned();
    let penult = if nseg > 1 {
        map.row(nseg).to_owned()
    } else {
        last.clone()
    };

    map.row_mut(0).assign(&(&first * 3.0 - &second * 2.0));
    map.row_mut(1).assign(&(&first * 2.0 - &second));
    map.row_mut(n + 1).assign(&(&last * 2.0 - &penult));
    map.row_mut(n + 2).assign(&(&last * 3.0 - &penult * 2.0));
    map
}

impl InterpEngine for AkimaEngine {
    fn method(&self) -> InterpMethod {
        InterpMethod::Akima
    }

    fn num_points(&self) -> usize {
        self.grid.len()
    }

    fn derivative_layout(&self) -> DerivativeLayout {
        DerivativeLayout::BatchVarying
    }

    fn evaluate(&mut self, request: EvalRequest<'_>) -> InterpResult<Evaluation> {
        let n_cp = self.grid.len();
        if request.values.ncols() != n_cp {
            return Err(InterpolationError::InvalidInput(format!(
                "expected {} control values per row, got {}",
                n_cp,
                request.values.ncols()
            )));
        }
        for &x in request.x_interp {
            self.checked(x)?;
        }

        let batch = request.values.nrows();
        let n_interp = request.x_interp.len();
        let with_grad = request.derivatives.d_dvalues;
        let mut out = Array2::<f64>::zeros((batch, n_interp));
        let mut deriv = with_grad.then(|| Array3::<f64>::zeros((batch, n_interp, n_cp)));

        for (b, row) in request.values.outer_iter().enumerate() {
            let tan = self.tangents(row, with_grad);
            for (k, &x) in request.x_interp.iter().enumerate() {
                out[[b, k]] = self.value_at(row, &tan, x);
            }
            if let (Some(deriv), Some(dt)) = (deriv.as_mut(), tan.dt.as_ref()) {
                for (k, &x) in request.x_interp.iter().enumerate() {
                    deriv
                        .slice_mut(s![b, k, ..])
                        .assign(&self.gradient_at(dt, x));
                }
            }
        }

        if let Some(first) = request.values.outer_iter().next() {
            self.training = first.to_vec();
        }

        Ok(Evaluation {
            values: out,
            d_dvalues: deriv.map(ValueDerivatives::BatchVarying),
        })
    }

    fn training_gradients(&self, x: f64) -> InterpResult<Vec<f64>> {
        self.checked(x)?;
        let tan = self.tangents(ArrayView1::from(&self.training[..]), true);
        match tan.dt.as_ref() {
            Some(dt) => Ok(self.gradient_at(dt, x).to_vec()),
            None => Err(InterpolationError::InvalidInput(
                "tangent gradients were not computed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DerivativeRequest;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn evaluate(engine: &mut AkimaEngine, values: &Array2<f64>, xs: &[f64]) -> Evaluation {
        engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: xs,
                derivatives: DerivativeRequest::with_value_derivatives(),
            })
            .unwrap()
    }

    #[test]
    fn test_quadratic_data_three_points() {
        // Parabolic end extension reproduces 1 + x/2 + x^2/2 exactly.
        let mut engine = AkimaEngine::new(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0], 0.0, false);
        let values = array![[1.0, 2.0, 4.0]];
        let eval = evaluate(&mut engine, &values, &[0.5, 1.5]);
        assert_relative_eq!(eval.values[[0, 0]], 1.375, epsilon = 1e-12);
        assert_relative_eq!(eval.values[[0, 1]], 2.875, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_data_is_exact() {
        let grid = [0.0, 1.0, 2.0, 3.0, 4.0];
        let mut engine = AkimaEngine::new(&grid, &[0.0; 5], 0.0, false);
        let values = array![[1.0, 3.0, 5.0, 7.0, 9.0]];
        let eval = evaluate(&mut engine, &values, &[0.25, 1.5, 3.75]);
        for (k, x) in [0.25, 1.5, 3.75].iter().enumerate() {
            assert_relative_eq!(eval.values[[0, k]], 1.0 + 2.0 * x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let mut engine = AkimaEngine::new(&[0.0, 2.0], &[0.0, 0.0], 0.0, false);
        let values = array![[1.0, 5.0]];
        let eval = evaluate(&mut engine, &values, &[0.5]);
        assert_relative_eq!(eval.values[[0, 0]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_derivative_shape_per_batch() {
        let grid = [0.0, 1.0, 2.0, 3.0];
        let mut engine = AkimaEngine::new(&grid, &[0.0; 4], 0.0, false);
        let values = array![[0.0, 1.0, 0.5, 2.0], [3.0, 1.0, 4.0, 1.5]];
        let eval = evaluate(&mut engine, &values, &[0.5, 1.2, 2.7]);
        match eval.d_dvalues {
            Some(ValueDerivatives::BatchVarying(d)) => assert_eq!(d.dim(), (2, 3, 4)),
            other => panic!("Expected batch-varying derivatives, got {:?}", other),
        }
    }

    #[test]
    fn test_no_derivatives_unless_requested() {
        let mut engine = AkimaEngine::new(&[0.0, 1.0, 2.0], &[0.0; 3], 0.0, false);
        let values = array![[1.0, 2.0, 4.0]];
        let eval = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[0.5],
                derivatives: DerivativeRequest::none(),
            })
            .unwrap();
        assert!(eval.d_dvalues.is_none());
    }

    fn check_against_finite_differences(delta_x: f64) {
        let grid = [0.0, 0.7, 1.5, 2.0, 3.2, 4.0];
        let xs = [0.2, 0.9, 1.75, 2.6, 3.9, 4.3];
        let base = array![[0.0, 1.3, 0.4, 2.2, 2.0, -0.5]];
        let mut engine = AkimaEngine::new(&grid, &[0.0; 6], delta_x, false);
        let eval = evaluate(&mut engine, &base, &xs);
        let Some(ValueDerivatives::BatchVarying(d)) = eval.d_dvalues else {
            panic!("Expected batch-varying derivatives");
        };

        let step = 1e-7;
        for j in 0..grid.len() {
            let mut up = base.clone();
            up[[0, j]] += step;
            let mut down = base.clone();
            down[[0, j]] -= step;
            let f_up = evaluate(&mut engine, &up, &xs).values;
            let f_down = evaluate(&mut engine, &down, &xs).values;
            for k in 0..xs.len() {
                let fd = (f_up[[0, k]] - f_down[[0, k]]) / (2.0 * step);
                assert_relative_eq!(d[[0, k, j]], fd, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        check_against_finite_differences(0.0);
    }

    #[test]
    fn test_smoothed_gradient_matches_finite_differences() {
        check_against_finite_differences(5.0);
    }

    #[test]
    fn test_training_gradients_follow_last_evaluation() {
        let grid = [0.0, 1.0, 2.0, 3.0];
        let mut engine = AkimaEngine::new(&grid, &[0.0; 4], 0.0, false);
        let values = array![[0.0, 1.0, 0.5, 2.0]];
        let eval = evaluate(&mut engine, &values, &[1.4]);
        let Some(ValueDerivatives::BatchVarying(d)) = eval.d_dvalues else {
            panic!("Expected batch-varying derivatives");
        };
        let grad = engine.training_gradients(1.4).unwrap();
        for j in 0..4 {
            assert_relative_eq!(grad[j], d[[0, 0, j]], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_bounds_error() {
        let mut engine = AkimaEngine::new(&[0.0, 1.0, 2.0], &[0.0; 3], 0.0, true);
        let values = array![[1.0, 2.0, 4.0]];
        let err = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[-0.5],
                derivatives: DerivativeRequest::none(),
            })
            .unwrap_err();
        assert!(matches!(err, InterpolationError::OutOfBounds { .. }));
    }
}
