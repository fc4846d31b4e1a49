//! Legacy record flattening
//!
//! A legacy file holds one struct record wrapped in a 1×1 shell. This module
//! turns that record into a [`FlatMapping`]: each field becomes either a bare
//! [`FieldValue::Scalar`] or an [`FieldValue::Array`], decided once here so
//! downstream code matches on the variant instead of re-inspecting sizes.
//!
//! ```rust
//! use matflat::mat::MatArray;
//! use matflat::record::{extract, FieldValue, RecordSchema};
//!
//! let record = MatArray::record(
//!     "data",
//!     vec![
//!         ("spikes", MatArray::numeric("", vec![1, 3], vec![0.1, 0.2, 0.3])),
//!         ("labels", MatArray::scalar("", 3.0)),
//!         ("channel", MatArray::numeric("", vec![3, 1], vec![1.0, 2.0, 1.0])),
//!     ],
//! );
//!
//! let mapping = extract(&record, &RecordSchema::spike_sorting())?;
//! assert_eq!(mapping.get("labels"), Some(&FieldValue::Scalar(3.0)));
//! assert_eq!(mapping.get("channel").unwrap().shape(), &[3]);
//! # Ok::<(), matflat::record::ExtractError>(())
//! ```

mod error;
mod extract;
mod schema;
mod value;


pub use error::ExtractError;
pub use extract::{extract, extract_from_file};
pub use schema::{FieldRule, Normalize, RecordSchema, DEFAULT_FLATTEN_FIELDS, DEFAULT_VARIABLE};
pub use value::{FieldValue, FlatMapping, NdArray, ShapeError};
