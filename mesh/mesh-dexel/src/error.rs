//! Error types for dexel operations.

use mesh_grid::GridError;
use thiserror::Error;

/// Result type for dexel operations.
pub type DexelResult<T> = Result<T, DexelError>;

/// Errors that can occur when building, dilating or resampling dexels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DexelError {
    /// A column has an odd number of inside/outside transitions.
    #[error("column {column:?} has {count} crossings, expected an even count")]
    OddCrossings {
        /// Column coordinates `(j, k)`.
        column: (usize, usize),
        /// Number of crossings found.
        count: usize,
    },

    /// Transition heights in a column are not strictly increasing.
    #[error("column {column:?} heights are not strictly increasing")]
    UnsortedColumn {
        /// Column coordinates `(j, k)`.
        column: (usize, usize),
    },

    /// The number of supplied columns does not match the grid.
    #[error("expected {expected} columns, got {actual}")]
    ColumnCountMismatch {
        /// Columns implied by the grid size.
        expected: usize,
        /// Columns supplied.
        actual: usize,
    },

    /// Dilation radius is negative or not finite.
    #[error("invalid dilation radius: {0}")]
    InvalidRadius(f64),

    /// Cell size must be finite and positive.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Resampling needs at least one sample per cell.
    #[error("invalid samples per cell: {0}")]
    InvalidSampling(usize),

    /// Grid construction failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}
