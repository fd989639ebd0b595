//! Per-call evaluation of every spline.

use crate::binding::SplineState;
use crate::error::{SplineCompError, SplineCompResult};
use crate::host::InputSource;
use interp_engine::{DerivativeRequest, EvalRequest, Evaluation};
use ndarray::ArrayView2;
use std::sync::Arc;

/// Result of one `compute` call, required by `compute_partials`.
///
/// Holds each spline's evaluation (values and control-point derivatives) in
/// registration order, together with the query locations they were computed
/// at. Derivatives can therefore only be assembled from an evaluation that
/// actually happened.
#[derive(Debug, Clone)]
pub struct ComputeRecord {
    pub(crate) x_interp: Arc<[f64]>,
    pub(crate) vec_size: usize,
    pub(crate) evaluations: Vec<Evaluation>,
}

impl ComputeRecord {
    /// Query locations the record was computed at.
    pub fn x_interp(&self) -> &[f64] {
        &self.x_interp
    }

    /// Batch size.
    pub fn vec_size(&self) -> usize {
        self.vec_size
    }

    /// Evaluations in registration order.
    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }
}

/// Read and shape-check the control values of every spline.
fn gather_inputs<'a>(
    states: &[SplineState],
    inputs: &'a dyn InputSource,
    vec_size: usize,
) -> SplineCompResult<Vec<ArrayView2<'a, f64>>> {
    states
        .iter()
        .map(|state| {
            let values = inputs
                .input(&state.cp_name)
                .ok_or_else(|| SplineCompError::missing_input(&state.cp_name))?;
            let expected = [vec_size, state.n_cp()];
            let (rows, cols) = values.dim();
            if [rows, cols] != expected {
                return Err(SplineCompError::InputShape {
                    name: state.cp_name.clone(),
                    expected,
                    actual: [rows, cols],
                });
            }
            Ok(values)
        })
        .collect()
}

fn evaluate_one<'a>(
    state: &mut SplineState,
    values: ArrayView2<'a, f64>,
    x_interp: &'a [f64],
) -> SplineCompResult<Evaluation> {
    state
        .engine
        .evaluate(EvalRequest {
            values,
            x_interp,
            derivatives: DerivativeRequest::with_value_derivatives(),
        })
        .map_err(|source| SplineCompError::Interpolation {
            output: state.interp_name.clone(),
            source,
        })
}

/// Evaluate every spline at `x_interp`.
///
/// All inputs are read and checked before any engine runs. The first failing
/// spline in registration order determines the error.
#[cfg(feature = "parallel")]
pub(crate) fn evaluate_all(
    states: &mut [SplineState],
    inputs: &dyn InputSource,
    x_interp: Arc<[f64]>,
    vec_size: usize,
) -> SplineCompResult<ComputeRecord> {
    use rayon::prelude::*;

    let views = gather_inputs(states, inputs, vec_size)?;
    let results: Vec<SplineCompResult<Evaluation>> = states
        .par_iter_mut()
        .zip(views.into_par_iter())
        .map(|(state, values)| evaluate_one(state, values, &x_interp))
        .collect();
    let evaluations = results.into_iter().collect::<SplineCompResult<Vec<_>>>()?;

    Ok(ComputeRecord {
        x_interp,
        vec_size,
        evaluations,
    })
}

/// Evaluate every spline at `x_interp`.
///
/// All inputs are read and checked before any engine runs. The first failing
/// spline in registration order determines the error.
#[cfg(not(feature = "parallel"))]
pub(crate) fn evaluate_all(
    states: &mut [SplineState],
    inputs: &dyn InputSource,
    x_interp: Arc<[f64]>,
    vec_size: usize,
) -> SplineCompResult<ComputeRecord> {
    let views = gather_inputs(states, inputs, vec_size)?;
    let evaluations = states
        .iter_mut()
        .zip(views)
        .map(|(state, values)| evaluate_one(state, values, &x_interp))
        .collect::<SplineCompResult<Vec<_>>>()?;

    Ok(ComputeRecord {
        x_interp,
        vec_size,
        evaluations,
    })
}
