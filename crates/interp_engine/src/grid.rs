//! Grid validation and segment lookup shared by all kernels.

use crate::error::{InterpResult, InterpolationError};

/// Check that `grid` has at least `need` finite, strictly increasing points.
pub(crate) fn validate_grid(grid: &[f64], need: usize) -> InterpResult<()> {
    if grid.len() < need {
        return Err(InterpolationError::InsufficientData {
            got: grid.len(),
            need,
        });
    }
    if let Some(index) = grid.iter().position(|x| !x.is_finite()) {
        return Err(InterpolationError::InvalidInput(format!(
            "grid position {} is not finite",
            index
        )));
    }
    if let Some(index) = grid.windows(2).position(|w| w[1] <= w[0]) {
        return Err(InterpolationError::NonMonotonicGrid { index: index + 1 });
    }
    Ok(())
}

/// Find the segment index for `x` using binary search.
///
/// Returns the index `i` such that `grid[i] <= x < grid[i+1]`,
/// clamped to valid segment range [0, n-2] so that points outside the grid
/// extrapolate from the end segments.
#[inline]
pub(crate) fn find_segment(grid: &[f64], x: f64) -> usize {
    let pos = grid.partition_point(|&xi| xi <= x);
    if pos == 0 {
        0
    } else if pos >= grid.len() {
        grid.len() - 2
    } else {
        pos - 1
    }
}

/// Reject `x` outside `[grid[0], grid[n-1]]`.
#[inline]
pub(crate) fn check_bounds(grid: &[f64], x: f64) -> InterpResult<()> {
    let min = grid[0];
    let max = grid[grid.len() - 1];
    if x < min || x > max || x.is_nan() {
        return Err(InterpolationError::OutOfBounds { x, min, max });
    }
    Ok(())
}
