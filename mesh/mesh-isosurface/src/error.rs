//! Error types for isosurface extraction.

use thiserror::Error;

/// Result type for isosurface operations.
pub type IsosurfaceResult<T> = Result<T, IsosurfaceError>;

/// Errors that can occur during isosurface extraction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsosurfaceError {
    /// The iso level is NaN or infinite.
    #[error("invalid iso level: {0}")]
    InvalidIsoLevel(f64),

    /// A halo sample lies above the iso level, so the surface could be open.
    #[error("halo sample at {index:?} is {value}, not below iso level {iso_level}")]
    HaloAboveLevel {
        /// Grid coordinates of the sample.
        index: (usize, usize, usize),
        /// Value found there.
        value: f64,
        /// Level being extracted.
        iso_level: f64,
    },
}
