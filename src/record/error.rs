use super::value::ShapeError;

/// Errors that can occur while flattening a legacy record
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A variable or field the schema relies on is absent
    #[error("Key not found: '{0}'")]
    KeyNotFound(String),

    /// The record is not wrapped in the expected 1×1 shell
    #[error("Shape mismatch: expected {expected:?}, found {actual:?}")]
    ShapeMismatch {
        /// Dimensions the record must have
        expected: Vec<usize>,
        /// Dimensions found
        actual: Vec<usize>,
    },

    /// The record variable is not a struct
    #[error("Variable '{name}' is a {class} array, not a struct record")]
    NotARecord {
        /// Variable name
        name: String,
        /// MATLAB class found
        class: String,
    },

    /// A field holds something other than numbers
    #[error("Field '{field}' holds a {class} value; only numeric fields can be flattened")]
    UnsupportedValue {
        /// Field name
        field: String,
        /// MATLAB class found
        class: String,
    },

    /// Field data does not fill its declared shape
    #[error("Invalid field shape: {0}")]
    Shape(#[from] ShapeError),
}
