//! Error types for pipeline runs.

use mesh_dexel::DexelError;
use mesh_grid::GridError;
use mesh_isosurface::IsosurfaceError;
use mesh_sdf::SdfError;
use mesh_tet::TetError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that abort a pipeline run.
///
/// Every stage error is wrapped unchanged so the reason for a failed run
/// keeps its diagnostic payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The input volume has no sample above the threshold.
    #[error("volume has no voxels above threshold {threshold}")]
    EmptyVolume {
        /// Threshold that was applied.
        threshold: f64,
    },

    /// Surface extraction produced too little geometry to mesh.
    #[error("extracted surface is empty ({vertices} vertices, {faces} faces)")]
    EmptySurface {
        /// Vertices extracted.
        vertices: usize,
        /// Faces extracted.
        faces: usize,
    },

    /// The run was cancelled before it finished.
    #[error("pipeline run was cancelled")]
    Cancelled,

    /// The worker thread panicked or could not be started.
    #[error("pipeline worker failed: {0}")]
    Worker(String),

    /// Grid construction failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Dexel encoding, dilation or resampling failed.
    #[error(transparent)]
    Dexel(#[from] DexelError),

    /// Isosurface extraction failed.
    #[error(transparent)]
    Isosurface(#[from] IsosurfaceError),

    /// Distance field construction failed.
    #[error(transparent)]
    Sdf(#[from] SdfError),

    /// Tetrahedralization or boundary extraction failed.
    #[error(transparent)]
    Tet(#[from] TetError),
}
