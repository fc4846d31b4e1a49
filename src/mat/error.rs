/// Errors that can occur while reading or writing MAT-files
#[derive(Debug, thiserror::Error)]
pub enum MatError {
    /// I/O error during file operations or zlib inflation
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The 128-byte file header is missing or malformed
    #[error("Invalid MAT header: {0}")]
    InvalidHeader(String),

    /// The file is a MAT-file, but not a level 5 one
    #[error("Unsupported MAT-file version: {0}")]
    UnsupportedVersion(String),

    /// Data element tag carries an unknown type code
    #[error("Unknown data element type: {0}")]
    UnknownDataType(u32),

    /// Array class this reader does not decode (sparse, object, complex)
    #[error("Unsupported array class: {0}")]
    UnsupportedClass(String),

    /// A data element claims more bytes than remain in its buffer
    #[error("Truncated data element at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Byte offset of the element within its enclosing buffer
        offset: usize,
        /// Bytes required by the element
        needed: usize,
        /// Bytes actually left
        available: usize,
    },

    /// Sub-element layout of a matrix does not match the format
    #[error("Invalid MAT structure: {0}")]
    InvalidStructure(String),

    /// Decoded value count disagrees with the array dimensions
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Elements implied by the dimensions
        expected: usize,
        /// Elements decoded
        actual: usize,
    },
}
