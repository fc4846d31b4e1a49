//! NumPy `.npz` archives
//!
//! An `.npz` file is a ZIP archive with one `<name>.npy` entry per array, the
//! layout `numpy.savez` writes and `numpy.load` reads back as a dict-like
//! object. A [`FlatMapping`] maps onto it directly: scalars become 0-d arrays
//! (shape `()`), arrays keep their shape.
//!
//! Entries are stored uncompressed by default, like `numpy.savez`; enable
//! [`NpzOptions::compress`] for deflated entries as `numpy.savez_compressed`
//! produces.
//!
//! ```python
//! # Python
//! import numpy as np
//! record = dict(np.load("session_01.npz"))
//! ```

mod error;
pub mod npy;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use log::{debug, warn};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use error::NpzError;

use crate::record::FlatMapping;

/// Suffix of every array entry in the archive
const NPY_SUFFIX: &str = ".npy";

/// Archive writing options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpzOptions {
    /// Deflate entries instead of storing them
    pub compress: bool,
}

impl NpzOptions {
    fn compression_method(self) -> CompressionMethod {
        if self.compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        }
    }
}

/// Write `mapping` as an archive to `writer`, returning the writer
pub fn write_to<W: Write + Seek>(writer: W, mapping: &FlatMapping, options: NpzOptions) -> Result<W, NpzError> {
    let mut zip = ZipWriter::new(writer);

    for (name, value) in mapping {
        let bytes = npy::to_bytes(value)?;
        let entry_options = SimpleFileOptions::default()
            .compression_method(options.compression_method())
            .large_file(bytes.len() as u64 >= u64::from(u32::MAX));
        zip.start_file(format!("{}{}", name, NPY_SUFFIX), entry_options)?;
        zip.write_all(&bytes)?;
        debug!("  wrote {}{} ({} bytes)", name, NPY_SUFFIX, bytes.len());
    }

    Ok(zip.finish()?)
}

/// Read every `.npy` entry of an archive into a mapping
pub fn read_from<R: Read + Seek>(reader: R) -> Result<FlatMapping, NpzError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut mapping = FlatMapping::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().to_string();
        let Some(field) = entry_name.strip_suffix(NPY_SUFFIX) else {
            warn!("Ignoring non-array archive entry '{}'", entry_name);
            continue;
        };

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        let value = npy::read_value(&mut bytes.as_slice())?;
        mapping.insert(field, value);
    }

    Ok(mapping)
}

/// Save `mapping` to `path` atomically, returning the archive size in bytes.
///
/// The archive is assembled in a temporary file next to `path` and renamed
/// into place, so a failed save never leaves a partial archive behind.
pub fn save<P: AsRef<Path>>(path: P, mapping: &FlatMapping, options: NpzOptions) -> Result<u64, NpzError> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = NamedTempFile::new_in(dir)?;
    let writer = write_to(BufWriter::new(temp), mapping, options)?;
    let temp = writer.into_inner().map_err(|e| e.into_error())?;
    let file = temp.persist(path).map_err(|e| e.error)?;

    Ok(file.metadata()?.len())
}

/// Load an archive written by [`save`] (or by `numpy.savez`)
pub fn load<P: AsRef<Path>>(path: P) -> Result<FlatMapping, NpzError> {
    let file = File::open(path)?;
    read_from(BufReader::new(file))
}
