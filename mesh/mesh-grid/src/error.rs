//! Error types for grid construction.

use thiserror::Error;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur when building grids and volumes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Sample count does not match the declared dimensions.
    #[error("expected {expected} samples for the declared dimensions, got {actual}")]
    DimensionMismatch {
        /// Samples implied by the dimensions.
        expected: usize,
        /// Samples supplied.
        actual: usize,
    },

    /// A halo-padded grid needs at least one interior cell per axis.
    #[error("grid dimensions {dims:?} are too small for a one-cell halo")]
    TooSmall {
        /// Offending dimensions, halo included.
        dims: (usize, usize, usize),
    },

    /// A halo sample is not below the isosurface threshold.
    #[error("halo sample at {index:?} is {value}, expected a negative sentinel")]
    HaloNotSentinel {
        /// Grid coordinates of the sample.
        index: (usize, usize, usize),
        /// Value found there.
        value: f64,
    },

    /// Cell size must be finite and positive.
    #[error("invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Allocation would exceed the configured cell budget.
    #[error("grid of {dims:?} exceeds the limit of {limit} cells")]
    GridTooLarge {
        /// Requested dimensions.
        dims: (usize, usize, usize),
        /// Configured maximum number of cells.
        limit: usize,
    },
}

/// Reject grids whose cell count exceeds `limit`.
///
/// Overflowing products are treated as exceeding the limit.
///
/// # Errors
///
/// Returns [`GridError::GridTooLarge`] with the offending dimensions.
pub fn check_grid_size(dims: (usize, usize, usize), limit: usize) -> GridResult<()> {
    let cells = dims
        .0
        .checked_mul(dims.1)
        .and_then(|c| c.checked_mul(dims.2));
    match cells {
        Some(c) if c <= limit => Ok(()),
        _ => Err(GridError::GridTooLarge { dims, limit }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_check() {
        assert!(check_grid_size((10, 10, 10), 1000).is_ok());
        assert_eq!(
            check_grid_size((10, 10, 11), 1000),
            Err(GridError::GridTooLarge {
                dims: (10, 10, 11),
                limit: 1000
            })
        );
        assert!(check_grid_size((usize::MAX, 2, 2), usize::MAX).is_err());
    }
}
