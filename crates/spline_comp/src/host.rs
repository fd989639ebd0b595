//! Host-framework interfaces.
//!
//! A spline component does not own its variables. It declares them once on a
//! [`ComponentHost`] during finalisation, then reads control values from an
//! [`InputSource`] and writes results to an [`OutputSink`] and a
//! [`PartialsSink`] on every call.
//!
//! In-memory implementations are provided for embedding and testing:
//! `BTreeMap<String, Array2<f64>>` and `HashMap<String, Array2<f64>>` act as
//! input sources and output sinks, [`PartialsMap`] collects partials, and
//! [`RecordingHost`] records every declaration.

use crate::sparsity::SparsityPattern;
use ndarray::{Array2, ArrayView2};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Method a host should use when checking declared partials.
///
/// The component itself only ever requests `Fd`; `Cs` is there for hosts
/// that record or forward their own check settings through the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMethod {
    /// Finite differences.
    Fd,
    /// Complex step.
    Cs,
}

impl fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMethod::Fd => write!(f, "fd"),
            CheckMethod::Cs => write!(f, "cs"),
        }
    }
}

/// Declaration surface used once, during finalisation.
pub trait ComponentHost {
    /// Declare a control-point input with its default value.
    fn add_input(&mut self, name: &str, default: Array2<f64>, units: Option<&str>);

    /// Declare an interpolated output with its default value.
    fn add_output(&mut self, name: &str, default: Array2<f64>, units: Option<&str>);

    /// Declare the sparse partials of `of` with respect to `wrt`.
    fn declare_partials(&mut self, of: &str, wrt: &str, pattern: &SparsityPattern);

    /// Override how partials with respect to `wrt` (a name or `"*"`) are
    /// checked.
    fn set_check_partial_options(&mut self, wrt: &str, method: CheckMethod);
}

/// Read access to current input values.
pub trait InputSource {
    /// Current value of `name`, or `None` if unknown.
    fn input(&self, name: &str) -> Option<ArrayView2<'_, f64>>;
}

/// Write access to output values.
pub trait OutputSink {
    /// Store the value of output `name`.
    fn set_output(&mut self, name: &str, values: Array2<f64>);
}

/// Write access to partial-derivative values.
pub trait PartialsSink {
    /// Store the flat values of `d(of)/d(wrt)` in declared pattern order.
    fn set_partials(&mut self, of: &str, wrt: &str, values: Vec<f64>);
}

impl InputSource for BTreeMap<String, Array2<f64>> {
    fn input(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.get(name).map(|a| a.view())
    }
}

impl InputSource for HashMap<String, Array2<f64>> {
    fn input(&self, name: &str) -> Option<ArrayView2<'_, f64>> {
        self.get(name).map(|a| a.view())
    }
}

impl OutputSink for BTreeMap<String, Array2<f64>> {
    fn set_output(&mut self, name: &str, values: Array2<f64>) {
        self.insert(name.to_string(), values);
    }
}

impl OutputSink for HashMap<String, Array2<f64>> {
    fn set_output(&mut self, name: &str, values: Array2<f64>) {
        self.insert(name.to_string(), values);
    }
}

/// In-memory partials keyed by `(of, wrt)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialsMap {
    entries: BTreeMap<(String, String), Vec<f64>>,
}

impl PartialsMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat values of `d(of)/d(wrt)`.
    pub fn get(&self, of: &str, wrt: &str) -> Option<&[f64]> {
        self.entries
            .get(&(of.to_string(), wrt.to_string()))
            .map(Vec::as_slice)
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialsSink for PartialsMap {
    fn set_partials(&mut self, of: &str, wrt: &str, values: Vec<f64>) {
        self.entries.insert((of.to_string(), wrt.to_string()), values);
    }
}

/// A declared input or output.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredVariable {
    /// Variable name.
    pub name: String,
    /// Default value.
    pub default: Array2<f64>,
    /// Units tag, passed through untouched.
    pub units: Option<String>,
}

/// A declared partial-derivative block.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredPartials {
    /// Output name.
    pub of: String,
    /// Input name.
    pub wrt: String,
    /// Declared pattern.
    pub pattern: SparsityPattern,
}

/// Host that records every declaration in call order.
///
/// # Examples
///
/// ```
/// use spline_comp::{CheckMethod, ComponentHost, RecordingHost};
///
/// let mut host = RecordingHost::new();
/// host.set_check_partial_options("*", CheckMethod::Fd);
/// assert_eq!(host.check_options, vec![("*".to_string(), CheckMethod::Fd)]);
/// assert!(host.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingHost {
    /// Declared inputs.
    pub inputs: Vec<DeclaredVariable>,
    /// Declared outputs.
    pub outputs: Vec<DeclaredVariable>,
    /// Declared partials.
    pub partials: Vec<DeclaredPartials>,
    /// Check-method overrides as `(wrt, method)`.
    pub check_options: Vec<(String, CheckMethod)>,
}

impl RecordingHost {
    /// Create a host with nothing declared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no variable or partials block has been declared.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty() && self.partials.is_empty()
    }

    /// Declared input named `name`.
    pub fn input(&self, name: &str) -> Option<&DeclaredVariable> {
        self.inputs.iter().find(|v| v.name == name)
    }

    /// Declared output named `name`.
    pub fn output(&self, name: &str) -> Option<&DeclaredVariable> {
        self.outputs.iter().find(|v| v.name == name)
    }

    /// Declared pattern of `d(of)/d(wrt)`.
    pub fn pattern(&self, of: &str, wrt: &str) -> Option<&SparsityPattern> {
        self.partials
            .iter()
            .find(|p| p.of == of && p.wrt == wrt)
            .map(|p| &p.pattern)
    }

    /// Default input values, keyed by name, ready to feed to `compute`.
    pub fn default_inputs(&self) -> BTreeMap<String, Array2<f64>> {
        self.inputs
            .iter()
            .map(|v| (v.name.clone(), v.default.clone()))
            .collect()
    }
}

impl ComponentHost for RecordingHost {
    fn add_input(&mut self, name: &str, default: Array2<f64>, units: Option<&str>) {
        self.inputs.push(DeclaredVariable {
            name: name.to_string(),
            default,
            units: units.map(str::to_string),
        });
    }

    fn add_output(&mut self, name: &str, default: Array2<f64>, units: Option<&str>) {
        self.outputs.push(DeclaredVariable {
            name: name.to_string(),
            default,
            units: units.map(str::to_string),
        });
    }

    fn declare_partials(&mut self, of: &str, wrt: &str, pattern: &SparsityPattern) {
        self.partials.push(DeclaredPartials {
            of: of.to_string(),
            wrt: wrt.to_string(),
            pattern: pattern.clone(),
        });
    }

    fn set_check_partial_options(&mut self, wrt: &str, method: CheckMethod) {
        self.check_options.push((wrt.to_string(), method));
    }
}
