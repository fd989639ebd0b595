//! # spline_comp: Multi-Output Spline Component
//!
//! ## Layer 2 Role
//!
//! spline_comp exposes any number of named spline outputs, each interpolated
//! from its own named control-point input at a shared set of query
//! locations, together with exact sparse partial derivatives of every output
//! with respect to its control points:
//! - Component options (`options`)
//! - Registration of splines before finalisation (`registry`)
//! - Control-point grid resolution (`grid`)
//! - Jacobian sparsity patterns (`sparsity`)
//! - One engine per spline (`binding`)
//! - Host-framework traits and in-memory hosts (`host`)
//! - Builder, `compute` and `compute_partials` (`component`)
//! - Error types: `ConfigError`, `SplineCompError` (`error`)
//!
//! Interpolation itself is delegated to the engines of `interp_engine`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use ndarray::{array, Array2};
//! use spline_comp::{
//!     PartialsMap, RecordingHost, SplineCompBuilder, SplineCompOptions,
//! };
//! use std::collections::BTreeMap;
//!
//! let options = SplineCompOptions::new(vec![0.5, 1.5]).with_x_cp_val(vec![0.0, 1.0, 2.0]);
//! let mut builder = SplineCompBuilder::new(options);
//! builder.add_spline("ycp", "y", None, None);
//!
//! let mut host = RecordingHost::new();
//! let mut comp = builder.setup(&mut host).unwrap();
//! assert_eq!(host.pattern("y", "ycp").unwrap().len(), 6);
//!
//! let mut inputs = BTreeMap::new();
//! inputs.insert("ycp".to_string(), array![[1.0, 2.0, 4.0]]);
//! let mut outputs: BTreeMap<String, Array2<f64>> = BTreeMap::new();
//! let record = comp.compute(&inputs, &mut outputs).unwrap();
//! assert_eq!(outputs["y"].dim(), (1, 2));
//!
//! let mut partials = PartialsMap::new();
//! comp.compute_partials(&record, &mut partials).unwrap();
//! assert_eq!(partials.get("y", "ycp").unwrap().len(), 6);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): Evaluate splines concurrently with rayon
//! - `serde`: Serialisable options and `SplineCompOptions::from_toml_str`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod binding;
pub mod component;
pub mod error;
pub mod grid;
pub mod host;
pub mod options;
pub mod registry;
pub mod sparsity;

mod assembler;
mod evaluator;

pub use binding::{EngineFactory, SplineState, StandardEngines};
pub use component::{SplineComp, SplineCompBuilder};
pub use error::{ConfigError, SplineCompError, SplineCompResult};
pub use evaluator::ComputeRecord;
pub use grid::{resolve_grid, ResolvedGrid};
pub use host::{
    CheckMethod, ComponentHost, DeclaredPartials, DeclaredVariable, InputSource, OutputSink,
    PartialsMap, PartialsSink, RecordingHost,
};
pub use options::SplineCompOptions;
pub use registry::{CpDefault, SplineRegistry, SplineSpec};
pub use sparsity::SparsityPattern;

pub use interp_engine::{InterpMethod, InterpOptions};
