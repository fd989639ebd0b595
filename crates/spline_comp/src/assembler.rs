//! Derivative assembly.
//!
//! Turns whatever derivative representation an engine produced into one flat
//! array in the declared pattern order, row-major over
//! `(batch, query location, control point)`.

use crate::binding::SplineState;
use crate::error::{SplineCompError, SplineCompResult};
use faer::sparse::SparseColMat;
use interp_engine::{DerivativeLayout, Evaluation, ValueDerivatives};
use ndarray::{Array2, ArrayView2};

/// Flat derivative values of one spline.
///
/// # Errors
///
/// * `SplineCompError::DerivativeShape` - the engine output disagrees with the
///   binding-time layout or the expected dimensions (an empty `actual` shape
///   means nothing was produced)
/// * `SplineCompError::Interpolation` - a point-queried gradient failed
pub(crate) fn assemble(
    state: &SplineState,
    evaluation: &Evaluation,
    x_interp: &[f64],
    vec_size: usize,
) -> SplineCompResult<Vec<f64>> {
    let (_, n_interp, n_cp) = state.pattern.block_dims();
    let block = vec![n_interp, n_cp];
    let mismatch = |actual: Vec<usize>, expected: Vec<usize>| {
        SplineCompError::derivative_shape(&state.interp_name, expected, actual)
    };
    let actual_shape = || {
        evaluation
            .d_dvalues
            .as_ref()
            .map(ValueDerivatives::shape)
            .unwrap_or_default()
    };

    let flat = match (state.layout, &evaluation.d_dvalues) {
        (DerivativeLayout::BatchVarying, Some(ValueDerivatives::BatchVarying(d))) => {
            if d.dim() != (vec_size, n_interp, n_cp) {
                return Err(mismatch(d.shape().to_vec(), vec![vec_size, n_interp, n_cp]));
            }
            d.iter().copied().collect()
        }
        (DerivativeLayout::BatchInvariant, Some(ValueDerivatives::BatchInvariant(m))) => {
            if (m.nrows(), m.ncols()) != (n_interp, n_cp) {
                return Err(mismatch(vec![m.nrows(), m.ncols()], block));
            }
            replicate(densify(m).view(), vec_size)
        }
        (DerivativeLayout::PointQueried, None) => {
            if x_interp.len() != n_interp {
                return Err(mismatch(vec![x_interp.len(), n_cp], block));
            }
            let mut dense = Array2::<f64>::zeros((n_interp, n_cp));
            for (k, &x) in x_interp.iter().enumerate() {
                let grad = state.engine.training_gradients(x).map_err(|source| {
                    SplineCompError::Interpolation {
                        output: state.interp_name.clone(),
                        source,
                    }
                })?;
                if grad.len() != n_cp {
                    return Err(mismatch(vec![grad.len()], vec![n_cp]));
                }
                dense.row_mut(k).assign(&ndarray::ArrayView1::from(&grad[..]));
            }
            replicate(dense.view(), vec_size)
        }
        (DerivativeLayout::BatchVarying, _) => {
            return Err(mismatch(actual_shape(), vec![vec_size, n_interp, n_cp]));
        }
        (DerivativeLayout::BatchInvariant, _) | (DerivativeLayout::PointQueried, _) => {
            return Err(mismatch(actual_shape(), block));
        }
    };
    Ok(flat)
}

/// Copy `block` to every batch row and flatten row-major.
fn replicate(block: ArrayView2<'_, f64>, vec_size: usize) -> Vec<f64> {
    let (n_interp, n_cp) = block.dim();
    match block.broadcast((vec_size, n_interp, n_cp)) {
        Some(stacked) => stacked.iter().copied().collect(),
        None => Vec::new(),
    }
}

fn densify(m: &SparseColMat<usize, f64>) -> Array2<f64> {
    let mut dense = Array2::<f64>::zeros((m.nrows(), m.ncols()));
    let (symbolic, values) = m.parts();
    let col_ptr = symbolic.col_ptr();
    let row_idx = symbolic.row_idx();
    for col in 0..m.ncols() {
        for idx in col_ptr[col]..col_ptr[col + 1] {
            dense[[row_idx[idx], col]] += values[idx];
        }
    }
    dense
}
