//! Per-vertex attribute arrays
//!
//! A [`DataArray`] stores one fixed-size tuple per vertex (scalars, vectors,
//! symmetric tensors, ...) in a flat buffer. [`PointData`] is the named
//! collection of arrays attached to a mesh.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Named per-vertex tuple array with a fixed number of components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataArray {
    name: String,
    components: usize,
    values: Vec<f64>,
}

impl DataArray {
    /// Create a zero-filled array with `tuples` entries of `components` values each
    pub fn new(name: impl Into<String>, components: usize, tuples: usize) -> Self {
        Self {
            name: name.into(),
            components,
            values: vec![0.0; components * tuples],
        }
    }

    /// Create an array from a flat value buffer
    pub fn from_values(name: impl Into<String>, components: usize, values: Vec<f64>) -> Result<Self> {
        if components == 0 {
            return Err(Error::InvalidData("data array must have at least one component".to_string()));
        }
        if values.len() % components != 0 {
            return Err(Error::InvalidData(format!(
                "{} values cannot be split into tuples of {} components",
                values.len(),
                components
            )));
        }
        Ok(Self {
            name: name.into(),
            components,
            values,
        })
    }

    /// Create a single-component array
    pub fn from_scalars(name: impl Into<String>, scalars: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            components: 1,
            values: scalars,
        }
    }

    /// Create a three-component array from fixed-size tuples
    pub fn from_vectors(name: impl Into<String>, vectors: &[[f64; 3]]) -> Self {
        Self {
            name: name.into(),
            components: 3,
            values: vectors.iter().flatten().copied().collect(),
        }
    }

    /// Allocate a zero-filled array with the same name, component count and length
    pub fn new_like(other: &DataArray) -> Self {
        Self::new(other.name.clone(), other.components, other.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tuple of vertex `id`
    #[inline]
    pub fn tuple(&self, id: usize) -> &[f64] {
        let start = id * self.components;
        &self.values[start..start + self.components]
    }

    /// Single component of vertex `id`
    #[inline]
    pub fn component(&self, id: usize, component: usize) -> f64 {
        self.values[id * self.components + component]
    }

    /// Flat value buffer, tuple-major
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Iterate over tuples in vertex id order
    pub fn tuples(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.components.max(1))
    }
}

/// Named attribute arrays of a mesh, each aligned by vertex id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointData {
    arrays: Vec<DataArray>,
}

impl PointData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an array by name
    pub fn get(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Add an array, replacing any existing array of the same name
    pub fn insert(&mut self, array: DataArray) {
        match self.arrays.iter_mut().find(|a| a.name == array.name) {
            Some(slot) => *slot = array,
            None => self.arrays.push(array),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}
