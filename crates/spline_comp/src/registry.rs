//! Registered splines awaiting finalisation.

use crate::error::ConfigError;
use ndarray::{Array1, Array2};
use std::collections::HashSet;

/// Default control-point values of one spline.
#[derive(Debug, Clone, PartialEq)]
pub enum CpDefault {
    /// One row of length `n_cp` (copied to every batch row), or all
    /// `vec_size * n_cp` values in row-major order.
    Flat(Vec<f64>),
    /// Full `(vec_size, n_cp)` array.
    Batch(Array2<f64>),
}

impl From<Vec<f64>> for CpDefault {
    fn from(values: Vec<f64>) -> Self {
        CpDefault::Flat(values)
    }
}

impl From<Array1<f64>> for CpDefault {
    fn from(values: Array1<f64>) -> Self {
        CpDefault::Flat(values.to_vec())
    }
}

impl From<Array2<f64>> for CpDefault {
    fn from(values: Array2<f64>) -> Self {
        CpDefault::Batch(values)
    }
}

/// One registered spline.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineSpec {
    /// Control-point input name.
    pub cp_name: String,
    /// Interpolated output name.
    pub interp_name: String,
    /// Default control values; ones when absent.
    pub default_cp_values: Option<CpDefault>,
    /// Units forwarded to the host for both variables.
    pub units: Option<String>,
}

impl SplineSpec {
    /// Default control values shaped `(vec_size, n_cp)`.
    ///
    /// # Errors
    ///
    /// `ConfigError::DefaultShape` if the values fit neither accepted shape.
    pub fn resolve_default(&self, vec_size: usize, n_cp: usize) -> Result<Array2<f64>, ConfigError> {
        let shape_error = |actual: Vec<usize>| ConfigError::DefaultShape {
            name: self.cp_name.clone(),
            actual,
            n_cp,
            vec_size,
        };
        match &self.default_cp_values {
            None => Ok(Array2::ones((vec_size, n_cp))),
            Some(CpDefault::Flat(values)) if values.len() == n_cp => {
                let row = Array1::from(values.clone());
                Ok(row
                    .broadcast((vec_size, n_cp))
                    .ok_or_else(|| shape_error(vec![values.len()]))?
                    .to_owned())
            }
            Some(CpDefault::Flat(values)) => {
                Array2::from_shape_vec((vec_size, n_cp), values.clone())
                    .map_err(|_| shape_error(vec![values.len()]))
            }
            Some(CpDefault::Batch(values)) if values.dim() == (vec_size, n_cp) => {
                Ok(values.clone())
            }
            Some(CpDefault::Batch(values)) => Err(shape_error(values.shape().to_vec())),
        }
    }
}

/// Ordered list of splines, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplineRegistry {
    specs: Vec<SplineSpec>,
}

impl SplineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spline.
    pub fn push(&mut self, spec: SplineSpec) {
        self.specs.push(spec);
    }

    /// Registered splines in registration order.
    pub fn specs(&self) -> &[SplineSpec] {
        &self.specs
    }

    /// Number of registered splines.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if no spline is registered.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Reject any variable name used twice across inputs and outputs.
    pub fn check_unique_names(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::with_capacity(2 * self.specs.len());
        for spec in &self.specs {
            for name in [&spec.interp_name, &spec.cp_name] {
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::DuplicateName { name: name.clone() });
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for SplineRegistry {
    type Item = SplineSpec;
    type IntoIter = std::vec::IntoIter<SplineSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn spec(cp: &str, interp: &str, default: Option<CpDefault>) -> SplineSpec {
        SplineSpec {
            cp_name: cp.to_string(),
            interp_name: interp.to_string(),
            default_cp_values: default,
            units: None,
        }
    }

    #[test]
    fn test_missing_default_is_ones() {
        let values = spec("ycp", "y", None).resolve_default(2, 3).unwrap();
        assert_eq!(values, Array2::ones((2, 3)));
    }

    #[test]
    fn test_single_row_is_copied_to_every_batch_row() {
        let values = spec("ycp", "y", Some(vec![1.0, 2.0, 4.0].into()))
            .resolve_default(2, 3)
            .unwrap();
        assert_eq!(values, array![[1.0, 2.0, 4.0], [1.0, 2.0, 4.0]]);
    }

    #[test]
    fn test_flat_batch_is_reshaped_row_major() {
        let values = spec("ycp", "y", Some(vec![1.0, 2.0, 3.0, 4.0].into()))
            .resolve_default(2, 2)
            .unwrap();
        assert_eq!(values, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_batch_array_must_match() {
        let ok = spec("ycp", "y", Some(array![[1.0, 2.0], [3.0, 4.0]].into()));
        assert!(ok.resolve_default(2, 2).is_ok());

        let err = ok.resolve_default(1, 2).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DefaultShape {
                name: "ycp".to_string(),
                actual: vec![2, 2],
                n_cp: 2,
                vec_size: 1,
            }
        );
    }

    #[test]
    fn test_flat_of_wrong_length() {
        let err = spec("ycp", "y", Some(vec![1.0; 5].into()))
            .resolve_default(2, 3)
            .unwrap_err();
        assert!(matches!(err, ConfigError::DefaultShape { ref actual, .. } if actual == &vec![5]));
    }

    #[test]
    fn test_duplicate_names_across_inputs_and_outputs() {
        let mut registry = SplineRegistry::new();
        registry.push(spec("ycp", "y", None));
        registry.push(spec("zcp", "z", None));
        assert!(registry.check_unique_names().is_ok());

        registry.push(spec("y", "w", None));
        assert_eq!(
            registry.check_unique_names(),
            Err(ConfigError::DuplicateName {
                name: "y".to_string()
            })
        );
    }
}
