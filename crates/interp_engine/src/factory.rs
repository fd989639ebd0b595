//! Engine construction from a method name and an option bag.

use crate::engine::InterpEngine;
use crate::error::{InterpResult, InterpolationError};
use crate::grid::validate_grid;
use crate::kernels::{
    AkimaEngine, BsplineEngine, CubicKernel, LagrangeKernel, PointwiseEngine, SlinearKernel,
};
use crate::method::InterpMethod;
use crate::options::InterpOptions;

/// Default B-spline order (cubic).
pub const DEFAULT_BSPLINE_ORDER: usize = 4;

/// Everything needed to bind one engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineSpec<'a> {
    /// Control-point positions, strictly increasing.
    pub grid: &'a [f64],
    /// Interpolation method.
    pub method: InterpMethod,
    /// Query locations the engine will be evaluated at.
    pub x_interp: &'a [f64],
    /// Training values, one per grid point.
    pub values: &'a [f64],
    /// Method-specific options.
    pub options: &'a InterpOptions,
    /// Reject queries outside the grid instead of extrapolating.
    pub bounds_error: bool,
}

/// Build an engine for `spec`.
///
/// Recognised options:
///
/// | method     | option    | default | meaning                                   |
/// |------------|-----------|---------|-------------------------------------------|
/// | `akima`    | `delta_x` | `0.0`   | half-width of the smoothed absolute value |
/// | `bsplines` | `order`   | `4`     | spline order, clamped to the point count  |
///
/// All other methods accept no options.
///
/// # Errors
///
/// * `InterpolationError::InvalidInput` - empty or non-finite query locations,
///   or a training row of the wrong length
/// * `InterpolationError::InsufficientData` - fewer grid points than the
///   method needs
/// * `InterpolationError::NonMonotonicGrid` - grid not strictly increasing
/// * `InterpolationError::UnknownOption` / `InvalidOption` - bad options
///
/// # Examples
///
/// ```
/// use interp_engine::{build_engine, DerivativeLayout, EngineSpec, InterpMethod, InterpOptions};
///
/// let options = InterpOptions::new();
/// let engine = build_engine(&EngineSpec {
///     grid: &[0.0, 1.0, 2.0],
///     method: InterpMethod::Akima,
///     x_interp: &[0.5, 1.5],
///     values: &[0.0, 1.0, 4.0],
///     options: &options,
///     bounds_error: false,
/// })
/// .unwrap();
/// assert_eq!(engine.num_points(), 3);
/// assert_eq!(engine.derivative_layout(), DerivativeLayout::BatchVarying);
/// ```
pub fn build_engine(spec: &EngineSpec<'_>) -> InterpResult<Box<dyn InterpEngine>> {
    if spec.x_interp.is_empty() {
        return Err(InterpolationError::InvalidInput(
            "no query locations given".to_string(),
        ));
    }
    if let Some(x) = spec.x_interp.iter().find(|x| !x.is_finite()) {
        return Err(InterpolationError::InvalidInput(format!(
            "query location {} is not finite",
            x
        )));
    }
    validate_grid(spec.grid, spec.method.min_points())?;
    if spec.values.len() != spec.grid.len() {
        return Err(InterpolationError::InvalidInput(format!(
            "expected {} training values, got {}",
            spec.grid.len(),
            spec.values.len()
        )));
    }

    let method = spec.method;
    let grid = spec.grid;
    let bounds_error = spec.bounds_error;

    let engine: Box<dyn InterpEngine> = match method {
        InterpMethod::Akima => {
            spec.options.ensure_known(method, &["delta_x"])?;
            let delta_x = spec.options.float_or("delta_x", 0.0)?;
            if !(delta_x.is_finite() && delta_x >= 0.0) {
                return Err(InterpolationError::InvalidOption {
                    option: "delta_x".to_string(),
                    reason: format!("must be finite and non-negative, got {}", delta_x),
                });
            }
            Box::new(AkimaEngine::new(grid, spec.values, delta_x, bounds_error))
        }
        InterpMethod::Bsplines => {
            spec.options.ensure_known(method, &["order"])?;
            let order = spec
                .options
                .int_or("order", DEFAULT_BSPLINE_ORDER as i64)?;
            if order < 2 {
                return Err(InterpolationError::InvalidOption {
                    option: "order".to_string(),
                    reason: format!("must be at least 2, got {}", order),
                });
            }
            let order = (order as usize).min(grid.len());
            Box::new(BsplineEngine::new(
                grid.len(),
                order,
                spec.x_interp,
                bounds_error,
            )?)
        }
        InterpMethod::Slinear | InterpMethod::ScipySlinear => {
            spec.options.ensure_known(method, &[])?;
            Box::new(PointwiseEngine::new(
                method,
                SlinearKernel::new(grid),
                bounds_error,
            ))
        }
        InterpMethod::Lagrange2 | InterpMethod::Lagrange3 => {
            spec.options.ensure_known(method, &[])?;
            Box::new(PointwiseEngine::new(
                method,
                LagrangeKernel::new(grid, method.min_points()),
                bounds_error,
            ))
        }
        InterpMethod::Cubic | InterpMethod::ScipyCubic => {
            spec.options.ensure_known(method, &[])?;
            Box::new(PointwiseEngine::new(
                method,
                CubicKernel::new(grid),
                bounds_error,
            ))
        }
    };
    Ok(engine)
}
