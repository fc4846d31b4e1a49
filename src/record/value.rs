//! Flat mapping values

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

/// Element count of an array does not match its shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shape {shape:?} holds {expected} elements, got {actual}")]
pub struct ShapeError {
    /// Requested shape
    pub shape: Vec<usize>,
    /// Elements implied by the shape
    pub expected: usize,
    /// Elements supplied
    pub actual: usize,
}

/// Dense `f64` array in row-major (C) order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NdArray {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl NdArray {
    /// Build an array, checking that `data` fills `shape` exactly
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, ShapeError> {
        let expected = crate::layout::element_count(&shape).unwrap_or(usize::MAX);
        if expected != data.len() {
            return Err(ShapeError {
                shape,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over `data`
    pub fn vector(data: Vec<f64>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Collapse to one dimension, keeping row-major element order
    pub fn flatten(self) -> Self {
        Self::vector(self.data)
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
}

/// A field of a flat mapping: a bare number or an array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(f64),
    Array(NdArray),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(value) => Some(*value),
            FieldValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&NdArray> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::Array(array) => Some(array),
        }
    }

    /// Shape as NumPy reports it; empty for scalars
    pub fn shape(&self) -> &[usize] {
        match self {
            FieldValue::Scalar(_) => &[],
            FieldValue::Array(array) => array.shape(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldValue::Scalar(_))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<NdArray> for FieldValue {
    fn from(array: NdArray) -> Self {
        FieldValue::Array(array)
    }
}

/// Field name to value, with no nesting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatMapping {
    fields: BTreeMap<String, FieldValue>,
}

impl FlatMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a FlatMapping {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
