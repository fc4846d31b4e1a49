use std::fmt;
use std::path::PathBuf;

use crate::record::FlatMapping;

/// Outcome of converting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    /// Archive written
    pub output: PathBuf,
    /// Fields written as bare scalars
    pub scalar_fields: usize,
    /// Fields written as arrays
    pub array_fields: usize,
    /// Archive size on disk
    pub bytes_written: u64,
}

impl FileStats {
    pub(crate) fn new(output: PathBuf, mapping: &FlatMapping, bytes_written: u64) -> Self {
        let scalar_fields = mapping.iter().filter(|(_, value)| value.is_scalar()).count();
        Self {
            output,
            scalar_fields,
            array_fields: mapping.len() - scalar_fields,
            bytes_written,
        }
    }

    /// Total fields written
    pub fn fields(&self) -> usize {
        self.scalar_fields + self.array_fields
    }
}

/// Totals for a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Archives written, in processing order
    pub outputs: Vec<PathBuf>,
    /// Fields written as bare scalars
    pub scalar_fields: usize,
    /// Fields written as arrays
    pub array_fields: usize,
    /// Bytes written across all archives
    pub bytes_written: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's result into the totals
    pub fn record(&mut self, file: FileStats) {
        self.scalar_fields += file.scalar_fields;
        self.array_fields += file.array_fields;
        self.bytes_written += file.bytes_written;
        self.outputs.push(file.output);
    }

    pub fn files_converted(&self) -> usize {
        self.outputs.len()
    }

    pub fn fields_written(&self) -> usize {
        self.scalar_fields + self.array_fields
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} fields ({} scalar, {} array), {} bytes",
            self.files_converted(),
            self.fields_written(),
            self.scalar_fields,
            self.array_fields,
            self.bytes_written
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NdArray;

    #[test]
    fn test_totals() {
        let mut mapping = FlatMapping::new();
        mapping.insert("labels", 3.0);
        mapping.insert("channel", NdArray::vector(vec![1.0, 2.0]));

        let mut stats = BatchStats::new();
        stats.record(FileStats::new(PathBuf::from("a.npz"), &mapping, 100));
        stats.record(FileStats::new(PathBuf::from("b.npz"), &mapping, 50));

        assert_eq!(stats.files_converted(), 2);
        assert_eq!(stats.fields_written(), 4);
        assert_eq!(stats.scalar_fields, 2);
        assert_eq!(stats.bytes_written, 150);
        assert_eq!(
            stats.to_string(),
            "2 files, 4 fields (2 scalar, 2 array), 150 bytes"
        );
    }
}
