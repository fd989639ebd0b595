//! Concrete interpolation engines.
//!
//! Methods whose interpolant is linear in the control values
//! (`slinear`, `lagrange*`, `cubic`, `scipy_*`) share [`PointwiseEngine`] and
//! only supply a [`WeightKernel`]. Akima and B-splines have their own engines
//! because they produce batched derivatives during evaluation.

mod akima;
mod bspline;
mod cubic;
mod lagrange;
mod linear;
mod pointwise;

pub(crate) use akima::AkimaEngine;
pub(crate) use bspline::BsplineEngine;
pub(crate) use cubic::CubicKernel;
pub(crate) use lagrange::LagrangeKernel;
pub(crate) use linear::SlinearKernel;
pub(crate) use pointwise::PointwiseEngine;

use std::fmt;

/// Interpolant of the form `y(x) = w(x) · v`.
///
/// `weights` writes `w(x)` (length `n_cp`) into `out`, overwriting every
/// entry. Points outside the grid extrapolate from the end segment.
pub(crate) trait WeightKernel: Send + Sync + fmt::Debug {
    fn grid(&self) -> &[f64];

    fn weights(&self, x: f64, out: &mut [f64]);
}
