//! Natural cubic spline weights.

use super::WeightKernel;
use crate::grid::find_segment;
use ndarray::Array2;

/// Natural cubic spline expressed as weights on the control values.
///
/// The knot second derivatives `M` are linear in the data, so they are
/// precomputed once for every unit data vector: `second[[r, j]]` is `M_r` for
/// the data `e_j`. Evaluation then uses
///
/// ```text
/// y = A*y_i + B*y_{i+1} + ((A^3 - A)*M_i + (B^3 - B)*M_{i+1}) * h^2 / 6
/// ```
///
/// with `A = (x_{i+1} - x) / h` and `B = (x - x_i) / h`.
#[derive(Debug, Clone)]
pub(crate) struct CubicKernel {
    grid: Vec<f64>,
    second: Array2<f64>,
}

impl CubicKernel {
    /// Requires a validated grid with at least 3 points.
    pub(crate) fn new(grid: &[f64]) -> Self {
        let n = grid.len();
        let h: Vec<f64> = grid.windows(2).map(|w| w[1] - w[0]).collect();
        let interior = n - 2;

        // Tridiagonal system over M_1..M_{n-2}; M_0 = M_{n-1} = 0.
        let sub: Vec<f64> = (0..interior).map(|q| h[q]).collect();
        let diag: Vec<f64> = (0..interior).map(|q| 2.0 * (h[q] + h[q + 1])).collect();
        let sup: Vec<f64> = (0..interior).map(|q| h[q + 1]).collect();

        // Thomas factorisation is shared by every right-hand side.
        let mut c_prime = vec![0.0; interior];
        let mut denom = vec![0.0; interior];
        denom[0] = diag[0];
        c_prime[0] = sup[0] / denom[0];
        for q in 1..interior {
            denom[q] = diag[q] - sub[q] * c_prime[q - 1];
            c_prime[q] = sup[q] / denom[q];
        }

        let mut second = Array2::<f64>::zeros((n, n));
        let mut rhs = vec![0.0; interior];
        let mut d_prime = vec![0.0; interior];
        for j in 0..n {
            for (q, r) in rhs.iter_mut().enumerate() {
                let row = q + 1;
                let y = |k: usize| if k == j { 1.0 } else { 0.0 };
                *r = 6.0
                    * ((y(row + 1) - y(row)) / h[row] - (y(row) - y(row - 1)) / h[row - 1]);
            }

            d_prime[0] = rhs[0] / denom[0];
            for q in 1..interior {
                d_prime[q] = (rhs[q] - sub[q] * d_prime[q - 1]) / denom[q];
            }

            let mut m_next = d_prime[interior - 1];
            second[[interior, j]] = m_next;
            for q in (0..interior - 1).rev() {
                m_next = d_prime[q] - c_prime[q] * m_next;
                second[[q + 1, j]] = m_next;
            }
        }

        Self {
            grid: grid.to_vec(),
            second,
        }
    }
}

impl WeightKernel for CubicKernel {
    fn grid(&self) -> &[f64] {
        &self.grid
    }

    fn weights(&self, x: f64, out: &mut [f64]) {
        let i = find_segment(&self.grid, x);
        let h = self.grid[i + 1] - self.grid[i];
        let a = (self.grid[i + 1] - x) / h;
        let b = (x - self.grid[i]) / h;
        let ca = (a * a * a - a) * h * h / 6.0;
        let cb = (b * b * b - b) * h * h / 6.0;

        let m_lo = self.second.row(i);
        let m_hi = self.second.row(i + 1);
        for (j, w) in out.iter_mut().enumerate() {
            *w = ca * m_lo[j] + cb * m_hi[j];
        }
        out[i] += a;
        out[i + 1] += b;
    }
}
