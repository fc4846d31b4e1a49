//! Directory batch conversion
//!
//! Lists the `.mat` files of an input directory in lexicographic order and
//! converts each one to completion (load, extract, save) before starting the
//! next. Inputs that would share an output name (`a.mat`, `a.MAT`) are
//! rejected before anything is written. The first failure aborts the run;
//! files converted before it keep their outputs, and the failing file never
//! gets one.

mod error;
mod stats;


use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

pub use error::BatchError;
pub use stats::{BatchStats, FileStats};

use crate::mat::MatFile;
use crate::npz::{self, NpzOptions};
use crate::record::{extract_from_file, RecordSchema};

/// Directory the legacy layout keeps its input files in
pub const DEFAULT_INPUT_DIR: &str = "Data";

/// Extension of the files picked up from the input directory
pub const INPUT_EXTENSION: &str = "mat";

/// Extension given to every output archive
pub const OUTPUT_EXTENSION: &str = "npz";

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for `.mat` files
    pub input_dir: PathBuf,
    /// Directory the `.npz` archives are written to
    pub output_dir: PathBuf,
    /// Record layout shared by every input file
    pub schema: RecordSchema,
    /// Archive options
    pub npz: NpzOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from("."),
            schema: RecordSchema::default(),
            npz: NpzOptions::default(),
        }
    }
}

/// `.mat` files directly inside `dir`, sorted by file name
pub fn list_inputs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_mat = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION));
        if path.is_file() && is_mat {
            inputs.push(path);
        } else {
            debug!("Skipping {}", path.display());
        }
    }
    inputs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(inputs)
}

/// Fail when two inputs map to the same archive (`a.mat` and `a.MAT`)
fn check_unique_outputs(inputs: &[PathBuf], output_dir: &Path) -> Result<(), BatchError> {
    let mut seen: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(inputs.len());
    for input in inputs {
        let output = output_path(input, output_dir);
        if let Some(first) = seen.get(&output) {
            return Err(BatchError::DuplicateOutput {
                output,
                first: (*first).clone(),
                second: input.clone(),
            });
        }
        seen.insert(output, input);
    }
    Ok(())
}

/// Output archive for `input`: same stem, `.npz` extension, in `output_dir`
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let file_name = input.file_name().map(Path::new).unwrap_or(input);
    output_dir.join(file_name.with_extension(OUTPUT_EXTENSION))
}

/// Sequential converter over one input directory
#[derive(Debug, Clone, Default)]
pub struct BatchConverter {
    config: BatchConfig,
}

impl BatchConverter {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Convert every input file in order, stopping at the first error
    pub fn run(&self) -> Result<BatchStats, BatchError> {
        let input_dir = &self.config.input_dir;
        let inputs = list_inputs(input_dir).map_err(|source| BatchError::ListDirectory {
            path: input_dir.clone(),
            source,
        })?;
        info!("Found {} MAT-files in {}", inputs.len(), input_dir.display());

        let mut stats = BatchStats::new();
        if inputs.is_empty() {
            return Ok(stats);
        }

        let output_dir = &self.config.output_dir;
        check_unique_outputs(&inputs, output_dir)?;
        std::fs::create_dir_all(output_dir).map_err(|source| BatchError::CreateOutputDir {
            path: output_dir.clone(),
            source,
        })?;

        for input in &inputs {
            stats.record(self.convert_file(input)?);
        }

        info!("Batch complete: {}", stats);
        Ok(stats)
    }

    /// Convert one file into the configured output directory
    pub fn convert_file(&self, input: &Path) -> Result<FileStats, BatchError> {
        let file = MatFile::open(input).map_err(|source| BatchError::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let mapping = extract_from_file(&file, &self.config.schema).map_err(|source| BatchError::Extract {
            path: input.to_path_buf(),
            source,
        })?;
        drop(file);

        let output = output_path(input, &self.config.output_dir);
        let bytes_written = npz::save(&output, &mapping, self.config.npz).map_err(|source| BatchError::Write {
            path: output.clone(),
            source,
        })?;

        info!(
            "{} -> {} ({} fields, {} bytes)",
            input.display(),
            output.display(),
            mapping.len(),
            bytes_written
        );
        Ok(FileStats::new(output, &mapping, bytes_written))
    }
}
