//! Method-specific engine options.
//!
//! Options are carried as an ordered string-keyed map so a host can pass them
//! through without knowing which method consumes them. Each engine validates
//! the keys it understands and rejects the rest.

use crate::error::{InterpResult, InterpolationError};
use crate::method::InterpMethod;
use std::collections::BTreeMap;

/// A single option value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum OptionValue {
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

/// Opaque bag of method-specific options.
///
/// # Examples
///
/// ```
/// use interp_engine::InterpOptions;
///
/// let opts = InterpOptions::new().with("delta_x", 0.1).with("order", 3_i64);
/// assert_eq!(opts.len(), 2);
/// assert!(opts.contains("delta_x"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct InterpOptions(BTreeMap<String, OptionValue>);

impl InterpOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert an option in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw lookup.
    pub fn get(&self, key: &str) -> Option<OptionValue> {
        self.0.get(key).copied()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no options are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Reject any key not listed in `known`.
    pub(crate) fn ensure_known(&self, method: InterpMethod, known: &[&str]) -> InterpResult<()> {
        match self.0.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(InterpolationError::UnknownOption {
                method,
                option: key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Read a float option, accepting integer literals.
    pub(crate) fn float_or(&self, key: &str, default: f64) -> InterpResult<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(OptionValue::Float(v)) => Ok(v),
            Some(OptionValue::Int(v)) => Ok(v as f64),
            Some(OptionValue::Bool(_)) => Err(InterpolationError::InvalidOption {
                option: key.to_string(),
                reason: "expected a number, got a boolean".to_string(),
            }),
        }
    }

    /// Read an integer option.
    pub(crate) fn int_or(&self, key: &str, default: i64) -> InterpResult<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(OptionValue::Int(v)) => Ok(v),
            Some(other) => Err(InterpolationError::InvalidOption {
                option: key.to_string(),
                reason: format!("expected an integer, got {:?}", other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for InterpOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
