//! Per-spline engine binding.

use crate::error::ConfigError;
use crate::sparsity::SparsityPattern;
use interp_engine::{build_engine, DerivativeLayout, EngineSpec, InterpEngine, InterpResult};
use std::fmt;

/// Builds the engine for one spline.
///
/// The default [`StandardEngines`] builds the engines of `interp_engine`;
/// hosts may substitute their own implementation.
pub trait EngineFactory: Send + Sync + fmt::Debug {
    /// Construct an engine bound to `spec`.
    fn build(&self, spec: &EngineSpec<'_>) -> InterpResult<Box<dyn InterpEngine>>;
}

/// Factory for the engines bundled with `interp_engine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEngines;

impl EngineFactory for StandardEngines {
    fn build(&self, spec: &EngineSpec<'_>) -> InterpResult<Box<dyn InterpEngine>> {
        build_engine(spec)
    }
}

/// Finalised state of one spline.
#[derive(Debug)]
pub struct SplineState {
    /// Control-point input name.
    pub cp_name: String,
    /// Interpolated output name.
    pub interp_name: String,
    /// Units tag.
    pub units: Option<String>,
    /// Derivative representation produced by the engine.
    pub layout: DerivativeLayout,
    /// Declared Jacobian pattern.
    pub pattern: SparsityPattern,
    pub(crate) engine: Box<dyn InterpEngine>,
}

impl SplineState {
    /// Bind an engine for one spline.
    ///
    /// Engine construction errors are wrapped with the output name. The
    /// layout is read from the engine once and never re-inspected.
    pub fn bind(
        factory: &dyn EngineFactory,
        cp_name: String,
        interp_name: String,
        units: Option<String>,
        spec: &EngineSpec<'_>,
        vec_size: usize,
    ) -> Result<Self, ConfigError> {
        let engine = factory.build(spec).map_err(|source| ConfigError::Engine {
            output: interp_name.clone(),
            source,
        })?;
        let layout = engine.derivative_layout();
        let pattern =
            SparsityPattern::dense_batched(spec.x_interp.len(), engine.num_points(), vec_size);
        Ok(Self {
            cp_name,
            interp_name,
            units,
            layout,
            pattern,
            engine,
        })
    }

    /// Number of control points.
    pub fn n_cp(&self) -> usize {
        self.engine.num_points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interp_engine::{InterpMethod, InterpOptions, InterpolationError};

    #[test]
    fn test_bind_resolves_layout_and_pattern() {
        let options = InterpOptions::new();
        let spec = EngineSpec {
            grid: &[0.0, 1.0, 2.0],
            method: InterpMethod::Akima,
            x_interp: &[0.5, 1.5],
            values: &[1.0, 2.0, 4.0],
            options: &options,
            bounds_error: false,
        };
        let state = SplineState::bind(
            &StandardEngines,
            "ycp".to_string(),
            "y".to_string(),
            None,
            &spec,
            2,
        )
        .unwrap();
        assert_eq!(state.layout, DerivativeLayout::BatchVarying);
        assert_eq!(state.pattern.len(), 12);
        assert_eq!(state.n_cp(), 3);
    }

    #[test]
    fn test_bind_wraps_engine_error_with_output_name() {
        let options = InterpOptions::new();
        let spec = EngineSpec {
            grid: &[0.0, 1.0, 1.0],
            method: InterpMethod::Slinear,
            x_interp: &[0.5],
            values: &[1.0, 2.0, 4.0],
            options: &options,
            bounds_error: false,
        };
        let err = SplineState::bind(
            &StandardEngines,
            "ycp".to_string(),
            "y".to_string(),
            None,
            &spec,
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Engine {
                output: "y".to_string(),
                source: InterpolationError::NonMonotonicGrid { index: 2 },
            }
        );
    }
}
