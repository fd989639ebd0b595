//! Jacobian sparsity patterns.
//!
//! Each output block `d(interp)/d(cp)` has logical shape
//! `(vec_size * n_interp, vec_size * n_cp)`. Batch rows never couple, so the
//! block is block-diagonal; within one batch block every output is declared
//! to depend on every control point, which is a superset of the true pattern
//! of any interpolation method.

use faer::sparse::{SparseColMat, Triplet};

/// Fixed `(row, col)` pattern of one spline's Jacobian block.
///
/// Entries are enumerated row-major over `(b, k, j)` (batch, query location,
/// control point), the same order in which derivative values are flattened.
///
/// # Examples
///
/// ```
/// use spline_comp::SparsityPattern;
///
/// let pattern = SparsityPattern::dense_batched(2, 3, 2);
/// assert_eq!(pattern.len(), 12);
/// assert_eq!(pattern.shape(), (4, 6));
/// assert_eq!(&pattern.rows()[..6], &[0, 0, 0, 1, 1, 1]);
/// assert_eq!(&pattern.cols()[..6], &[0, 1, 2, 0, 1, 2]);
/// assert_eq!(pattern.rows()[6], 2);
/// assert_eq!(pattern.cols()[6], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparsityPattern {
    rows: Vec<usize>,
    cols: Vec<usize>,
    n_interp: usize,
    n_cp: usize,
    vec_size: usize,
}

impl SparsityPattern {
    /// Dense per-batch blocks replicated along the diagonal.
    pub fn dense_batched(n_interp: usize, n_cp: usize, vec_size: usize) -> Self {
        let len = vec_size * n_interp * n_cp;
        let mut rows = Vec::with_capacity(len);
        let mut cols = Vec::with_capacity(len);
        for b in 0..vec_size {
            let row_offset = b * n_interp;
            let col_offset = b * n_cp;
            for k in 0..n_interp {
                for j in 0..n_cp {
                    rows.push(row_offset + k);
                    cols.push(col_offset + j);
                }
            }
        }
        Self {
            rows,
            cols,
            n_interp,
            n_cp,
            vec_size,
        }
    }

    /// Row indices.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Column indices.
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Logical Jacobian shape `(vec_size * n_interp, vec_size * n_cp)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.vec_size * self.n_interp, self.vec_size * self.n_cp)
    }

    /// Shape `(vec_size, n_interp, n_cp)` the flat value array unfolds to.
    pub fn block_dims(&self) -> (usize, usize, usize) {
        (self.vec_size, self.n_interp, self.n_cp)
    }

    /// Iterate over `(row, col)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().copied().zip(self.cols.iter().copied())
    }

    /// Pair the pattern with a flat value array as a `faer` sparse matrix.
    ///
    /// Returns `None` if `values` does not have one entry per declared pair.
    pub fn to_sparse(&self, values: &[f64]) -> Option<SparseColMat<usize, f64>> {
        if values.len() != self.len() {
            return None;
        }
        let triplets: Vec<Triplet<usize, usize, f64>> = self
            .iter()
            .zip(values)
            .map(|((row, col), &value)| Triplet::new(row, col, value))
            .collect();
        let (nrows, ncols) = self.shape();
        SparseColMat::try_new_from_triplets(nrows, ncols, &triplets).ok()
    }
}
