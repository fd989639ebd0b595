//! Engine for interpolants that are linear in the control values.

use super::WeightKernel;
use crate::engine::{DerivativeLayout, EvalRequest, Evaluation, InterpEngine};
use crate::error::{InterpResult, InterpolationError};
use crate::grid::check_bounds;
use crate::method::InterpMethod;
use ndarray::{Array2, ArrayView1};

/// Evaluates `y = w(x) · v` for every batch row.
///
/// Produces no batched derivative: the gradient with respect to the control
/// values at `x` is `w(x)` itself and is served by `training_gradients`.
#[derive(Debug)]
pub(crate) struct PointwiseEngine<K> {
    method: InterpMethod,
    kernel: K,
    bounds_error: bool,
}

impl<K: WeightKernel> PointwiseEngine<K> {
    pub(crate) fn new(method: InterpMethod, kernel: K, bounds_error: bool) -> Self {
        Self {
            method,
            kernel,
            bounds_error,
        }
    }

    fn checked(&self, x: f64) -> InterpResult<()> {
        if self.bounds_error {
            check_bounds(self.kernel.grid(), x)?;
        }
        Ok(())
    }
}

impl<K: WeightKernel> InterpEngine for PointwiseEngine<K> {
    fn method(&self) -> InterpMethod {
        self.method
    }

    fn num_points(&self) -> usize {
        self.kernel.grid().len()
    }

    fn derivative_layout(&self) -> DerivativeLayout {
        DerivativeLayout::PointQueried
    }

    fn evaluate(&mut self, request: EvalRequest<'_>) -> InterpResult<Evaluation> {
        let n_cp = self.num_points();
        if request.values.ncols() != n_cp {
            return Err(InterpolationError::InvalidInput(format!(
                "expected {} control values per row, got {}",
                n_cp,
                request.values.ncols()
            )));
        }

        let batch = request.values.nrows();
        let mut out = Array2::<f64>::zeros((batch, request.x_interp.len()));
        let mut w = vec![0.0; n_cp];
        for (k, &x) in request.x_interp.iter().enumerate() {
            self.checked(x)?;
            self.kernel.weights(x, &mut w);
            let w = ArrayView1::from(&w[..]);
            for (b, row) in request.values.outer_iter().enumerate() {
                out[[b, k]] = row.dot(&w);
            }
        }

        Ok(Evaluation {
            values: out,
            d_dvalues: None,
        })
    }

    fn training_gradients(&self, x: f64) -> InterpResult<Vec<f64>> {
        self.checked(x)?;
        let mut w = vec![0.0; self.num_points()];
        self.kernel.weights(x, &mut w);
        Ok(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DerivativeRequest;
    use crate::kernels::SlinearKernel;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn engine(bounds_error: bool) -> PointwiseEngine<SlinearKernel> {
        PointwiseEngine::new(
            InterpMethod::Slinear,
            SlinearKernel::new(&[0.0, 1.0, 2.0]),
            bounds_error,
        )
    }

    #[test]
    fn test_evaluate_batch_rows_independently() {
        let mut engine = engine(false);
        let values = array![[0.0, 2.0, 4.0], [1.0, 1.0, 3.0]];
        let eval = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[0.5, 1.5],
                derivatives: DerivativeRequest::with_value_derivatives(),
            })
            .unwrap();

        assert_eq!(eval.values.dim(), (2, 2));
        assert_relative_eq!(eval.values[[0, 0]], 1.0);
        assert_relative_eq!(eval.values[[0, 1]], 3.0);
        assert_relative_eq!(eval.values[[1, 0]], 1.0);
        assert_relative_eq!(eval.values[[1, 1]], 2.0);
        assert!(eval.d_dvalues.is_none());
    }

    #[test]
    fn test_bounds_error_on_evaluate() {
        let mut engine = engine(true);
        let values = array![[0.0, 2.0, 4.0]];
        let err = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[0.5, 2.5],
                derivatives: DerivativeRequest::none(),
            })
            .unwrap_err();
        assert!(matches!(err, InterpolationError::OutOfBounds { x, .. } if x == 2.5));
    }

    #[test]
    fn test_extrapolates_without_bounds_check() {
        let mut engine = engine(false);
        let values = array![[0.0, 2.0, 4.0]];
        let eval = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[3.0],
                derivatives: DerivativeRequest::none(),
            })
            .unwrap();
        assert_relative_eq!(eval.values[[0, 0]], 6.0);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let mut engine = engine(false);
        let values = array![[0.0, 2.0]];
        let err = engine
            .evaluate(EvalRequest {
                values: values.view(),
                x_interp: &[0.5],
                derivatives: DerivativeRequest::none(),
            })
            .unwrap_err();
        assert!(matches!(err, InterpolationError::InvalidInput(_)));
    }

    #[test]
    fn test_training_gradients_are_weights() {
        let engine = engine(false);
        let grad = engine.training_gradients(0.25).unwrap();
        assert_eq!(grad.len(), 3);
        assert_relative_eq!(grad[0], 0.75);
        assert_relative_eq!(grad[1], 0.25);
        assert_relative_eq!(grad[2], 0.0);
    }
}
