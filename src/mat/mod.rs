//! Level 5 MAT-file support
//!
//! MATLAB's level 5 format is a 128-byte header followed by a flat sequence of
//! data elements, one per top-level variable. Each variable is a `miMATRIX`
//! element (optionally wrapped in a zlib `miCOMPRESSED` element) whose payload
//! is itself a sequence of sub-elements: array flags, dimensions, name, and
//! class-specific data.
//!
//! This module decodes the classes legacy spike-sorting files use (numeric,
//! logical, char, cell, struct) and writes the same subset back out. HDF5-based
//! v7.3 files, sparse and object arrays, and complex numbers are rejected.
//!
//! Numeric values are widened to `f64` and reordered to row-major on load, so
//! the rest of the crate never deals with MATLAB's column-major layout.
//!
//! ```rust,no_run
//! use matflat::mat::MatFile;
//!
//! let file = MatFile::open("Data/session_01.mat")?;
//! if let Some(record) = file.get("data") {
//!     println!("{:?}", record.field_names());
//! }
//! # Ok::<(), matflat::mat::MatError>(())
//! ```

mod array;
mod element;
mod error;
mod reader;
mod writer;


pub use array::{MatArray, MatClass, MatData};
pub use element::{DataType, Endian};
pub use error::MatError;
pub use reader::{MatFile, MatHeader};
pub use writer::MatWriter;

/// Size of the fixed file header in bytes
pub const HEADER_LEN: usize = 128;

/// Version word of level 5 files
pub const LEVEL5_VERSION: u16 = 0x0100;
