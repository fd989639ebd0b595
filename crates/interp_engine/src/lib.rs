//! # interp_engine: One-Dimensional Interpolation Engines
//!
//! ## Layer 1 (Foundation) Role
//!
//! interp_engine interpolates batches of control-point values onto a fixed
//! set of query locations and reports the derivatives of the result with
//! respect to those control values:
//! - Method selection and per-method point requirements (`method`)
//! - Method-specific option bags (`options`)
//! - The engine contract and its derivative layouts (`engine`)
//! - Engine construction and option validation (`factory`)
//! - Error types: `InterpolationError` (`error`)
//!
//! ## Derivative Layouts
//!
//! Each method produces exactly one [`DerivativeLayout`]:
//! - `akima`: batch-varying dense, shape `(batch, n_interp, n_cp)`
//! - `bsplines`: batch-invariant sparse, shape `(n_interp, n_cp)`
//! - everything else: point-queried through
//!   [`InterpEngine::training_gradients`]
//!
//! ## Usage Examples
//!
//! ```rust
//! use interp_engine::{
//!     build_engine, DerivativeRequest, EngineSpec, EvalRequest, InterpMethod, InterpOptions,
//! };
//! use ndarray::array;
//!
//! let options = InterpOptions::new();
//! let mut engine = build_engine(&EngineSpec {
//!     grid: &[0.0, 1.0, 2.0],
//!     method: InterpMethod::Slinear,
//!     x_interp: &[0.5, 1.5],
//!     values: &[0.0, 2.0, 4.0],
//!     options: &options,
//!     bounds_error: false,
//! })
//! .unwrap();
//!
//! let values = array![[0.0, 2.0, 4.0]];
//! let eval = engine
//!     .evaluate(EvalRequest {
//!         values: values.view(),
//!         x_interp: &[0.5, 1.5],
//!         derivatives: DerivativeRequest::none(),
//!     })
//!     .unwrap();
//! assert_eq!(eval.values[[0, 1]], 3.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `InterpMethod`, `InterpOptions` and
//!   `InterpolationError`

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod engine;
pub mod error;
pub mod factory;
pub mod method;
pub mod options;

mod grid;
mod kernels;

pub use engine::{
    DerivativeLayout, DerivativeRequest, EvalRequest, Evaluation, InterpEngine, ValueDerivatives,
};
pub use error::{InterpResult, InterpolationError};
pub use factory::{build_engine, EngineSpec, DEFAULT_BSPLINE_ORDER};
pub use method::InterpMethod;
pub use options::{InterpOptions, OptionValue};
