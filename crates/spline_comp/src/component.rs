//! The spline component: builder, finalisation and per-call entry points.

use crate::assembler::assemble;
use crate::binding::{EngineFactory, SplineState, StandardEngines};
use crate::error::{ConfigError, SplineCompError, SplineCompResult};
use crate::evaluator::{evaluate_all, ComputeRecord};
use crate::grid::{resolve_grid, ResolvedGrid};
use crate::host::{CheckMethod, ComponentHost, InputSource, OutputSink, PartialsSink};
use crate::options::SplineCompOptions;
use crate::registry::{CpDefault, SplineRegistry, SplineSpec};
use interp_engine::{EngineSpec, InterpMethod};
use ndarray::Array2;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Collects splines before finalisation.
///
/// # Examples
///
/// ```
/// use spline_comp::{RecordingHost, SplineCompBuilder, SplineCompOptions};
///
/// let options = SplineCompOptions::new(vec![0.5, 1.5]).with_x_cp_val(vec![0.0, 1.0, 2.0]);
/// let mut builder = SplineCompBuilder::new(options);
/// builder
///     .add_spline("ycp", "y", Some(vec![1.0, 2.0, 4.0].into()), None)
///     .add_spline("zcp", "z", None, Some("m"));
///
/// let mut host = RecordingHost::new();
/// let comp = builder.setup(&mut host).unwrap();
/// assert_eq!(comp.splines().len(), 2);
/// assert_eq!(host.outputs.len(), 2);
/// ```
#[derive(Debug)]
pub struct SplineCompBuilder {
    options: SplineCompOptions,
    registry: SplineRegistry,
    factory: Arc<dyn EngineFactory>,
}

impl SplineCompBuilder {
    /// Start a component with the given options and no splines.
    pub fn new(options: SplineCompOptions) -> Self {
        Self {
            options,
            registry: SplineRegistry::new(),
            factory: Arc::new(StandardEngines),
        }
    }

    /// Use `factory` instead of the bundled engines.
    pub fn with_engine_factory(mut self, factory: impl EngineFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// Register one spline output.
    ///
    /// `default` is the default control-point value; ones when `None`.
    /// `units` is forwarded to the host for the input as well as the output,
    /// not for the output alone.
    pub fn add_spline(
        &mut self,
        cp_name: impl Into<String>,
        interp_name: impl Into<String>,
        default: Option<CpDefault>,
        units: Option<&str>,
    ) -> &mut Self {
        self.registry.push(SplineSpec {
            cp_name: cp_name.into(),
            interp_name: interp_name.into(),
            default_cp_values: default,
            units: units.map(str::to_string),
        });
        self
    }

    /// Options the component will be built with.
    pub fn options(&self) -> &SplineCompOptions {
        &self.options
    }

    /// Splines registered so far.
    pub fn specs(&self) -> &[SplineSpec] {
        self.registry.specs()
    }

    /// Finalise the component.
    ///
    /// Resolves the grid, binds one engine per spline, then declares every
    /// output, input and partials block on `host` in registration order.
    /// Nothing is declared unless every spline binds successfully.
    ///
    /// # Errors
    ///
    /// `SplineCompError::Config` for any inconsistent option, unusable
    /// default value, duplicate name or engine construction failure.
    pub fn setup(self, host: &mut dyn ComponentHost) -> SplineCompResult<SplineComp> {
        let Self {
            options,
            registry,
            factory,
        } = self;

        options.validate()?;
        registry.check_unique_names()?;
        let grid = resolve_grid(options.x_cp_val.as_deref(), options.num_cp, options.method)?;
        let x_interp: Arc<[f64]> = Arc::from(options.x_interp_val.as_slice());
        let vec_size = options.vec_size;

        let mut bound = Vec::with_capacity(registry.len());
        for spec in registry {
            let default = spec.resolve_default(vec_size, grid.n_cp)?;
            // Engines are batch-agnostic; the first row is only used for sizing.
            let first_row = default.row(0).to_vec();
            let engine_spec = EngineSpec {
                grid: &grid.grid,
                method: options.method,
                x_interp: &x_interp,
                values: &first_row,
                options: &options.interp_options,
                bounds_error: options.bounds_error,
            };
            let state = SplineState::bind(
                factory.as_ref(),
                spec.cp_name,
                spec.interp_name,
                spec.units,
                &engine_spec,
                vec_size,
            )?;
            debug!(
                output = %state.interp_name,
                input = %state.cp_name,
                layout = %state.layout,
                "bound spline engine"
            );
            bound.push((state, default));
        }

        let n_interp = x_interp.len();
        let mut splines = Vec::with_capacity(bound.len());
        for (state, default) in bound {
            let units = state.units.as_deref();
            host.add_output(
                &state.interp_name,
                Array2::ones((vec_size, n_interp)),
                units,
            );
            host.add_input(&state.cp_name, default, units);
            host.declare_partials(&state.interp_name, &state.cp_name, &state.pattern);
            splines.push(state);
        }

        if !options.method.supports_complex_step() {
            warn!(
                method = %options.method,
                "method does not support complex step; checking partials with finite differences"
            );
            host.set_check_partial_options("*", CheckMethod::Fd);
        }

        debug!(
            method = %options.method,
            n_cp = grid.n_cp,
            n_interp,
            vec_size,
            splines = splines.len(),
            "spline component finalised"
        );

        Ok(SplineComp {
            options,
            grid,
            x_interp,
            splines,
        })
    }
}

/// A finalised spline component.
#[derive(Debug)]
pub struct SplineComp {
    options: SplineCompOptions,
    grid: ResolvedGrid,
    x_interp: Arc<[f64]>,
    splines: Vec<SplineState>,
}

impl SplineComp {
    /// Options the component was finalised with.
    pub fn options(&self) -> &SplineCompOptions {
        &self.options
    }

    /// Interpolation method.
    pub fn method(&self) -> InterpMethod {
        self.options.method
    }

    /// Resolved control-point grid.
    pub fn grid(&self) -> &ResolvedGrid {
        &self.grid
    }

    /// Number of control points.
    pub fn n_cp(&self) -> usize {
        self.grid.n_cp
    }

    /// Number of query locations.
    pub fn n_interp(&self) -> usize {
        self.x_interp.len()
    }

    /// Batch size.
    pub fn vec_size(&self) -> usize {
        self.options.vec_size
    }

    /// Current query locations.
    pub fn x_interp(&self) -> &[f64] {
        &self.x_interp
    }

    /// Finalised splines in registration order.
    pub fn splines(&self) -> &[SplineState] {
        &self.splines
    }

    /// Spline whose output is named `interp_name`.
    pub fn spline(&self, interp_name: &str) -> Option<&SplineState> {
        self.splines.iter().find(|s| s.interp_name == interp_name)
    }

    /// Replace the query locations used by subsequent calls.
    ///
    /// The number of locations is fixed at finalisation.
    ///
    /// # Errors
    ///
    /// * `ConfigError::InterpLength` - the length changes
    /// * `ConfigError::NonFiniteInterpPoint` - a location is NaN or infinite
    ///
    /// The current locations are kept on error.
    pub fn set_x_interp(&mut self, x_interp: impl Into<Arc<[f64]>>) -> SplineCompResult<()> {
        let x_interp = x_interp.into();
        if x_interp.len() != self.x_interp.len() {
            return Err(ConfigError::InterpLength {
                expected: self.x_interp.len(),
                actual: x_interp.len(),
            }
            .into());
        }
        if let Some(index) = x_interp.iter().position(|x| !x.is_finite()) {
            return Err(ConfigError::NonFiniteInterpPoint { index }.into());
        }
        self.options.x_interp_val = x_interp.to_vec();
        self.x_interp = x_interp;
        Ok(())
    }

    /// Interpolate every spline and write its output.
    ///
    /// The returned record carries the derivatives of this evaluation and is
    /// the only way to call [`SplineComp::compute_partials`].
    ///
    /// # Errors
    ///
    /// * `SplineCompError::MissingInput` / `InputShape` - bad control values
    /// * `SplineCompError::Interpolation` - the engine of the named output
    ///   failed; no output is written
    pub fn compute(
        &mut self,
        inputs: &dyn InputSource,
        outputs: &mut dyn OutputSink,
    ) -> SplineCompResult<ComputeRecord> {
        trace!(splines = self.splines.len(), "compute");
        let x_interp = Arc::clone(&self.x_interp);
        let record = evaluate_all(&mut self.splines, inputs, x_interp, self.options.vec_size)?;
        for (state, evaluation) in self.splines.iter().zip(&record.evaluations) {
            outputs.set_output(&state.interp_name, evaluation.values.clone());
        }
        Ok(record)
    }

    /// Write the partials of every output with respect to its control
    /// points, in declared pattern order.
    ///
    /// # Errors
    ///
    /// * `SplineCompError::RecordMismatch` - `record` came from another
    ///   component
    /// * `SplineCompError::DerivativeShape` - engine derivatives disagree
    ///   with the declared pattern; no partials are written
    pub fn compute_partials(
        &self,
        record: &ComputeRecord,
        partials: &mut dyn PartialsSink,
    ) -> SplineCompResult<()> {
        trace!(splines = self.splines.len(), "compute_partials");
        if record.evaluations.len() != self.splines.len() {
            return Err(SplineCompError::RecordMismatch {
                expected: self.splines.len(),
                actual: record.evaluations.len(),
            });
        }

        let blocks = self
            .splines
            .iter()
            .zip(&record.evaluations)
            .map(|(state, evaluation)| {
                assemble(state, evaluation, &record.x_interp, record.vec_size)
            })
            .collect::<SplineCompResult<Vec<_>>>()?;

        for (state, values) in self.splines.iter().zip(blocks) {
            partials.set_partials(&state.interp_name, &state.cp_name, values);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PartialsMap, RecordingHost};
    use interp_engine::InterpolationError;
    use std::collections::BTreeMap;

    fn builder(method: InterpMethod) -> SplineCompBuilder {
        let options = SplineCompOptions::new(vec![0.5, 1.5])
            .with_method(method)
            .with_num_cp(3);
        let mut builder = SplineCompBuilder::new(options);
        builder.add_spline("ycp", "y", None, Some("m"));
        builder
    }

    #[test]
    fn test_declarations_in_registration_order() {
        let mut b = builder(InterpMethod::Akima);
        b.add_spline("zcp", "z", Some(vec![1.0, 2.0, 3.0].into()), None);
        let mut host = RecordingHost::new();
        b.setup(&mut host).unwrap();

        let outputs: Vec<&str> = host.outputs.iter().map(|v| v.name.as_str()).collect();
        let inputs: Vec<&str> = host.inputs.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(outputs, vec!["y", "z"]);
        assert_eq!(inputs, vec!["ycp", "zcp"]);
        assert_eq!(host.output("y").unwrap().units.as_deref(), Some("m"));
        assert_eq!(host.input("ycp").unwrap().units.as_deref(), Some("m"));
        assert_eq!(host.input("zcp").unwrap().units, None);
        assert_eq!(host.input("ycp").unwrap().units.as_deref(), Some("m"));
        assert_eq!(host.output("y").unwrap().default, Array2::ones((1, 2)));
        assert_eq!(host.input("zcp").unwrap().default.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(host.check_options.is_empty());
    }

    #[test]
    fn test_scipy_methods_request_finite_differences() {
        for method in [InterpMethod::ScipySlinear, InterpMethod::ScipyCubic] {
            let mut host = RecordingHost::new();
            builder(method).setup(&mut host).unwrap();
            assert_eq!(host.check_options, vec![("*".to_string(), CheckMethod::Fd)]);
        }
    }

    #[test]
    fn test_nothing_declared_when_a_later_spline_fails() {
        let mut b = builder(InterpMethod::Akima);
        b.add_spline("zcp", "z", Some(vec![1.0, 2.0].into()), None);
        let mut host = RecordingHost::new();
        let err = b.setup(&mut host).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.variable(), Some("zcp"));
        assert!(host.is_empty());
    }

    #[test]
    fn test_engine_error_names_output() {
        let options = SplineCompOptions::new(vec![0.5])
            .with_method(InterpMethod::Lagrange3)
            .with_num_cp(3);
        let mut b = SplineCompBuilder::new(options);
        b.add_spline("ycp", "y", None, None);
        let err = b.setup(&mut RecordingHost::new()).unwrap_err();
        assert_eq!(
            err,
            SplineCompError::Config(ConfigError::Engine {
                output: "y".to_string(),
                source: InterpolationError::InsufficientData { got: 3, need: 4 },
            })
        );
    }

    #[test]
    fn test_zero_splines_is_valid() {
        let options = SplineCompOptions::new(vec![0.5]).with_num_cp(2);
        let mut host = RecordingHost::new();
        let mut comp = SplineCompBuilder::new(options).setup(&mut host).unwrap();
        let inputs: BTreeMap<String, Array2<f64>> = BTreeMap::new();
        let mut outputs: BTreeMap<String, Array2<f64>> = BTreeMap::new();
        let record = comp.compute(&inputs, &mut outputs).unwrap();
        let mut partials = PartialsMap::new();
        comp.compute_partials(&record, &mut partials).unwrap();
        assert!(outputs.is_empty());
        assert!(partials.is_empty());
    }

    #[test]
    fn test_set_x_interp_keeps_length() {
        let mut comp = builder(InterpMethod::Slinear)
            .setup(&mut RecordingHost::new())
            .unwrap();
        comp.set_x_interp(vec![0.25, 1.75]).unwrap();
        assert_eq!(comp.x_interp(), &[0.25, 1.75]);
        assert_eq!(comp.options().x_interp_val, vec![0.25, 1.75]);

        let err = comp.set_x_interp(vec![0.25]).unwrap_err();
        assert_eq!(
            err,
            SplineCompError::Config(ConfigError::InterpLength {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_set_x_interp_rejects_non_finite() {
        let mut comp = builder(InterpMethod::Akima)
            .setup(&mut RecordingHost::new())
            .unwrap();
        let err = comp.set_x_interp(vec![f64::NAN, 1.5]).unwrap_err();
        assert_eq!(
            err,
            SplineCompError::Config(ConfigError::NonFiniteInterpPoint { index: 0 })
        );
        assert!(comp
            .set_x_interp(vec![0.5, f64::INFINITY])
            .unwrap_err()
            .is_config());
        assert_eq!(comp.x_interp(), &[0.5, 1.5]);

        let mut inputs = BTreeMap::new();
        inputs.insert("ycp".to_string(), ndarray::array![[1.0, 2.0, 4.0]]);
        let mut outputs: BTreeMap<String, Array2<f64>> = BTreeMap::new();
        comp.compute(&inputs, &mut outputs).unwrap();
        assert!(outputs["y"].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_record_from_other_component_rejected() {
        let mut host = RecordingHost::new();
        let mut one = builder(InterpMethod::Slinear).setup(&mut host).unwrap();
        let mut b = builder(InterpMethod::Slinear);
        b.add_spline("zcp", "z", None, None);
        let mut host_two = RecordingHost::new();
        let two = b.setup(&mut host_two).unwrap();

        let mut outputs: BTreeMap<String, Array2<f64>> = BTreeMap::new();
        let record = one.compute(&host.default_inputs(), &mut outputs).unwrap();
        let err = two
            .compute_partials(&record, &mut PartialsMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            SplineCompError::RecordMismatch {
                expected: 2,
                actual: 1
            }
        );
    }
}
