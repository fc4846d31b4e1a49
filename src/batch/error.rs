use std::path::PathBuf;

use crate::mat::MatError;
use crate::npz::NpzError;
use crate::record::ExtractError;

/// Errors that abort a batch conversion. Each names the path involved.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The input directory could not be listed
    #[error("Cannot list input directory {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two inputs differ only in extension case and would share one archive
    #[error("{first} and {second} would both be written to {output}")]
    DuplicateOutput {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// The output directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not a readable MAT-file
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: MatError,
    },

    /// An input file's record does not fit the schema
    #[error("Failed to extract record from {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    /// An output archive could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: NpzError,
    },
}
