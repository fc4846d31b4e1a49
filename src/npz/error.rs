use crate::record::ShapeError;

/// Errors that can occur while writing or reading `.npz` archives
#[derive(Debug, thiserror::Error)]
pub enum NpzError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Malformed `.npy` header or payload
    #[error("Invalid npy header: {0}")]
    InvalidHeader(String),

    /// `.npy` element type that cannot be widened to `f64`
    #[error("Unsupported npy dtype: {0}")]
    UnsupportedDtype(String),

    /// Array payload does not fill its declared shape
    #[error("Invalid array shape: {0}")]
    Shape(#[from] ShapeError),
}
