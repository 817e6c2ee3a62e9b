//! Error types for thalweg

use thiserror::Error;

/// Main error type for thalweg operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Unexpected {found} geometry where {expected} was required")]
    BadInputShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Out of memory while allocating {context}")]
    OutOfMemory { context: &'static str },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map a failed reservation onto the dedicated out-of-memory kind.
    pub fn out_of_memory(context: &'static str) -> impl FnOnce(std::collections::TryReserveError) -> Error {
        move |_| Error::OutOfMemory { context }
    }
}

/// Result type alias for thalweg operations
pub type Result<T> = std::result::Result<T, Error>;
