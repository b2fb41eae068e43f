//! Error types for SDF operations.

use mesh_dexel::DexelError;
use mesh_grid::GridError;
use thiserror::Error;

/// Result type for SDF operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors that can occur during SDF computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdfError {
    /// Surface has no faces.
    #[error("surface is empty")]
    EmptySurface,

    /// Cell size must be finite and positive.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Sample count does not match the grid dimensions.
    #[error("expected {expected} samples, got {actual}")]
    DimensionMismatch {
        /// Samples implied by the dimensions.
        expected: usize,
        /// Samples supplied.
        actual: usize,
    },

    /// Grid allocation or conversion failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Inside/outside classification failed, usually an open surface.
    #[error("sign classification failed: {0}")]
    Sign(#[from] DexelError),
}
