//! Local Lagrange polynomial weights.

use super::WeightKernel;
use crate::grid::find_segment;

/// Lagrange polynomial through `npts` grid points centred on the segment
/// containing `x` (shifted inwards at the grid ends).
#[derive(Debug, Clone)]
pub(crate) struct LagrangeKernel {
    grid: Vec<f64>,
    npts: usize,
}

impl LagrangeKernel {
    /// `npts` is 3 for `lagrange2` and 4 for `lagrange3`.
    pub(crate) fn new(grid: &[f64], npts: usize) -> Self {
        Self {
            grid: grid.to_vec(),
            npts,
        }
    }

    fn stencil_start(&self, x: f64) -> usize {
        let i = find_segment(&self.grid, x);
        i.saturating_sub((self.npts - 1) / 2)
            .min(self.grid.len() - self.npts)
    }
}

impl WeightKernel for LagrangeKernel {
    fn grid(&self) -> &[f64] {
        &self.grid
    }

    fn weights(&self, x: f64, out: &mut [f64]) {
        out.fill(0.0);
        let start = self.stencil_start(x);
        let nodes = &self.grid[start..start + self.npts];
        for (m, &xm) in nodes.iter().enumerate() {
            out[start + m] = nodes
                .iter()
                .enumerate()
                .filter(|&(q, _)| q != m)
                .map(|(_, &xq)| (x - xq) / (xm - xq))
                .product();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn interpolate(kernel: &LagrangeKernel, ys: &[f64], x: f64) -> f64 {
        let mut w = vec![0.0; ys.len()];
        kernel.weights(x, &mut w);
        w.iter().zip(ys).map(|(w, y)| w * y).sum()
    }

    #[test]
    fn test_quadratic_is_exact() {
        let grid = [0.0, 0.5, 1.5, 2.0, 3.0];
        let ys: Vec<f64> = grid.iter().map(|x| 2.0 * x * x - x + 1.0).collect();
        let kernel = LagrangeKernel::new(&grid, 3);
        for x in [0.1, 0.7, 1.9, 2.6] {
            assert_relative_eq!(
                interpolate(&kernel, &ys, x),
                2.0 * x * x - x + 1.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_cubic_is_exact() {
        let grid = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = grid.iter().map(|x| x * x * x - 2.0 * x).collect();
        let kernel = LagrangeKernel::new(&grid, 4);
        for x in [0.2, 2.5, 4.9] {
            assert_relative_eq!(
                interpolate(&kernel, &ys, x),
                x * x * x - 2.0 * x,
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_stencil_stays_inside_grid() {
        let kernel = LagrangeKernel::new(&[0.0, 1.0, 2.0, 3.0], 4);
        assert_eq!(kernel.stencil_start(0.1), 0);
        assert_eq!(kernel.stencil_start(2.9), 0);

        let kernel = LagrangeKernel::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(kernel.stencil_start(0.5), 0);
        assert_eq!(kernel.stencil_start(2.5), 1);
        assert_eq!(kernel.stencil_start(3.5), 2);
    }

    #[test]
    fn test_weights_sum_to_one() {
        let kernel = LagrangeKernel::new(&[0.0, 0.3, 1.1, 2.0], 3);
        let mut w = [0.0; 4];
        kernel.weights(1.4, &mut w);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }
}
