//! Control-point grid resolution.

use crate::error::ConfigError;
use interp_engine::InterpMethod;

/// Control-point positions shared by every spline of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedGrid {
    /// Ordered control-point positions.
    pub grid: Vec<f64>,
    /// Number of control points.
    pub n_cp: usize,
}

/// Resolve the control-point grid from the two mutually exclusive options.
///
/// Explicit positions are used as given; a count produces the integer grid
/// `0, 1, ..., count - 1`. Point-count and monotonicity requirements of the
/// method are checked later, when the engines are built.
///
/// # Errors
///
/// * `ConfigError::XCpValWithBsplines` - explicit positions with `bsplines`
/// * `ConfigError::BothGridOptions` - both options set
/// * `ConfigError::NoGridOption` - neither option set
///
/// # Examples
///
/// ```
/// use interp_engine::InterpMethod;
/// use spline_comp::resolve_grid;
///
/// let resolved = resolve_grid(None, Some(4), InterpMethod::Bsplines).unwrap();
/// assert_eq!(resolved.grid, vec![0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(resolved.n_cp, 4);
/// ```
pub fn resolve_grid(
    x_cp_val: Option<&[f64]>,
    num_cp: Option<usize>,
    method: InterpMethod,
) -> Result<ResolvedGrid, ConfigError> {
    match (x_cp_val, num_cp) {
        (Some(_), _) if method == InterpMethod::Bsplines => Err(ConfigError::XCpValWithBsplines),
        (Some(_), Some(_)) => Err(ConfigError::BothGridOptions),
        (None, None) => Err(ConfigError::NoGridOption),
        (Some(positions), None) => Ok(ResolvedGrid {
            grid: positions.to_vec(),
            n_cp: positions.len(),
        }),
        (None, Some(count)) => Ok(ResolvedGrid {
            grid: (0..count).map(|i| i as f64).collect(),
            n_cp: count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_positions() {
        let resolved = resolve_grid(Some(&[0.0, 0.5, 3.0]), None, InterpMethod::Akima).unwrap();
        assert_eq!(resolved.grid, vec![0.0, 0.5, 3.0]);
        assert_eq!(resolved.n_cp, 3);
    }

    #[test]
    fn test_count_gives_integer_grid() {
        let resolved = resolve_grid(None, Some(3), InterpMethod::Cubic).unwrap();
        assert_eq!(resolved.grid, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_both_set() {
        assert_eq!(
            resolve_grid(Some(&[0.0, 1.0]), Some(2), InterpMethod::Akima),
            Err(ConfigError::BothGridOptions)
        );
    }

    #[test]
    fn test_neither_set() {
        for method in InterpMethod::ALL {
            assert_eq!(
                resolve_grid(None, None, method),
                Err(ConfigError::NoGridOption)
            );
        }
    }

    #[test]
    fn test_bsplines_rejects_positions_first() {
        assert_eq!(
            resolve_grid(Some(&[0.0, 1.0]), None, InterpMethod::Bsplines),
            Err(ConfigError::XCpValWithBsplines)
        );
        assert_eq!(
            resolve_grid(Some(&[0.0, 1.0]), Some(2), InterpMethod::Bsplines),
            Err(ConfigError::XCpValWithBsplines)
        );
    }
}
