//! Piecewise linear weights.

use super::WeightKernel;
use crate::grid::find_segment;

#[derive(Debug, Clone)]
pub(crate) struct SlinearKernel {
    grid: Vec<f64>,
}

impl SlinearKernel {
    pub(crate) fn new(grid: &[f64]) -> Self {
        Self {
            grid: grid.to_vec(),
        }
    }
}

impl WeightKernel for SlinearKernel {
    fn grid(&self) -> &[f64] {
        &self.grid
    }

    fn weights(&self, x: f64, out: &mut [f64]) {
        out.fill(0.0);
        let i = find_segment(&self.grid, x);
        let t = (x - self.grid[i]) / (self.grid[i + 1] - self.grid[i]);
        out[i] = 1.0 - t;
        out[i + 1] = t;
    }
}
