//! Voxel-to-tetrahedral meshing toolkit.
//!
//! This umbrella crate re-exports all mesh-* crates, providing a unified API
//! for turning segmented voxel scans into closed tetrahedral meshes. All
//! crates are Layer 0 (zero Bevy dependencies) and can be used in CLI tools,
//! servers, or bindings.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! // Load a segmented scan
//! let volume = mesh::io::load_volume("scan.dat").unwrap();
//!
//! // Dilate, extract, tetrahedralize
//! let output = run_pipeline(&volume, &PipelineConfig::default(), &StageCell::new(), &CancelFlag::new())
//!     .unwrap();
//! println!("{}", output.stats());
//!
//! // Save the results
//! mesh::io::save_tet_mesh(&output.tets, "scan.msh").unwrap();
//! mesh::io::save_surface(&output.boundary, "scan.off").unwrap();
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - Core data structures: `IndexedMesh`, `TetMesh`, `Vertex`, `Aabb`
//! - [`grid`] - Halo-padded scalar grids and voxel volumes
//! - [`io`] - Volume headers, OFF surfaces, Gmsh MSH tetrahedral meshes
//!
//! ## Stages
//! - [`dexel`] - Column interval volumes and Euclidean dilation
//! - [`isosurface`] - Marching cubes and component filtering
//! - [`sdf`] - Signed distance fields of closed surfaces
//! - [`tet`] - Isosurface stuffing and boundary extraction
//!
//! ## Orchestration
//! - [`pipeline`] - Staged runs, background jobs, statistics
//!
//! # Feature Flags
//!
//! - `serde` - Serialize configurations and mesh types

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `IndexedMesh`, `TetMesh`, `Vertex`, `Aabb`.
pub use mesh_types as types;

/// Halo-padded scalar grids and voxel volumes.
pub use mesh_grid as grid;

/// Volume headers, OFF surfaces, Gmsh MSH tetrahedral meshes.
pub use mesh_io as io;

/// Column interval volumes and Euclidean dilation.
pub use mesh_dexel as dexel;

/// Marching cubes and component filtering.
pub use mesh_isosurface as isosurface;

/// Signed distance fields of closed surfaces.
pub use mesh_sdf as sdf;

/// Isosurface stuffing and boundary extraction.
pub use mesh_tet as tet;

/// Staged runs, background jobs, statistics.
pub use mesh_pipeline as pipeline;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for meshing.
///
/// This module re-exports the most commonly used types and traits.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{Aabb, IndexedMesh, MeshBounds, MeshTopology, TetMesh, Vertex};

    // Grids
    pub use mesh_grid::{GridField, VoxelVolume};

    // I/O
    pub use mesh_io::{load_surface, load_tet_mesh, load_volume, save_surface, save_tet_mesh, MeshFormat};

    // Stages
    pub use mesh_dexel::{dilate, DexelVolume, DilationConfig};
    pub use mesh_isosurface::{marching_cubes, MarchingCubesConfig};
    pub use mesh_sdf::{build_sdf, SdfConfig, SignedDistanceField};
    pub use mesh_tet::{boundary, tetrahedralize, TetConfig};

    // Orchestration
    pub use mesh_pipeline::{
        run_pipeline, CancelFlag, MeshingJob, MeshingOutput, PipelineConfig, PipelineStage, StageCell,
    };
}

// =============================================================================
// Tests
// =============================================================================
