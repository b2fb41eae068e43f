//! Voxel volume to tetrahedral mesh pipeline.
//!
//! A run passes a thresholded voxel volume through five stages:
//!
//! 1. **Dilating**: encode the solid as dexels and grow it by a radius
//! 2. **Extracting surface**: resample the dexels and run marching cubes
//! 3. **Building SDF**: sample the signed distance to that surface
//! 4. **Tetrahedralizing**: fill the field's interior by isosurface stuffing
//! 5. **Extracting boundary**: recover the tetrahedra's outer surface
//!
//! Each stage consumes the previous stage's output. [`run_pipeline`] runs
//! them on the calling thread; [`MeshingJob`] runs them on a worker thread
//! and exposes progress through an atomic [`StageCell`].
//!
//! Two shorter flows are available: [`extract_thin_surface`] meshes the
//! volume without dilation, and [`boundary_only`] derives the surface of an
//! existing tetrahedral mesh.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod error;
mod job;
mod run;
mod stage;
mod stats;

pub use config::{PipelineConfig, DEFAULT_MAX_GRID_CELLS};
pub use error::{PipelineError, PipelineResult};
pub use job::{MeshingJob, WORKER_THREAD_NAME};
pub use run::{
    boundary_only, build_field, dilate_volume, extract_surface, extract_thin_surface, run_pipeline,
    MeshingOutput,
};
pub use stage::{CancelFlag, PipelineStage, StageCell};
pub use stats::MeshStats;
