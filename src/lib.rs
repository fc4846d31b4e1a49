//! # matflat - Legacy MAT Records to NumPy Archives
//!
//! `matflat` converts a directory of legacy MATLAB v5 files, each holding one
//! spike-sorting record, into `.npz` archives that NumPy loads as a plain
//! dict of arrays.
//!
//! The legacy files wrap every record in a 1×1 struct shell, and some of its
//! array fields in further singleton dimensions. Conversion removes that
//! wrapping: single-element fields become bare numbers, and the fields listed
//! in the record schema are flattened to one dimension.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matflat::batch::{BatchConfig, BatchConverter};
//!
//! // Data/*.mat -> ./*.npz
//! let stats = BatchConverter::new(BatchConfig::default()).run()?;
//! println!("Converted {} files", stats.files_converted());
//! # Ok::<(), matflat::batch::BatchError>(())
//! ```
//!
//! ## Single Records
//!
//! ```rust,no_run
//! use matflat::mat::MatFile;
//! use matflat::npz::{self, NpzOptions};
//! use matflat::record::{extract_from_file, RecordSchema};
//!
//! let file = MatFile::open("Data/session_01.mat")?;
//! let mapping = extract_from_file(&file, &RecordSchema::spike_sorting())?;
//! npz::save("session_01.npz", &mapping, NpzOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Reading the Output
//!
//! ```python
//! import numpy as np
//! record = dict(np.load("session_01.npz"))
//! record["labels"]   # array(3.)  - 0-d, use float(...) or .item()
//! record["channel"]  # array([1., 2., 1.])
//! ```
//!
//! ## Architecture
//!
//! - [`mat`]: level 5 MAT-file reader and writer
//! - [`record`]: record schema and flattening into a [`record::FlatMapping`]
//! - [`npz`]: `.npy`/`.npz` encoding and decoding
//! - [`batch`]: directory traversal and per-file conversion

pub mod batch;
pub mod mat;
pub mod npz;
pub mod record;

mod layout;

pub use batch::{BatchConfig, BatchConverter, BatchError, BatchStats};
pub use record::{FieldValue, FlatMapping, NdArray, RecordSchema};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
