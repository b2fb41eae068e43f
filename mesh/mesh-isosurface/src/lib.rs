//! Isosurface extraction over halo-padded grids.
//!
//! This crate turns a [`GridField`](mesh_grid::GridField) into a closed
//! triangle surface using marching cubes with a fixed, crack-free case
//! table, and provides component filtering for cleaning up extracted
//! surfaces.
//!
//! # Sign Convention
//!
//! A sample is inside iff it is strictly greater than the iso level
//! (default `0.0`). Emitted triangles are wound counter-clockwise when
//! viewed from outside.
//!
//! # Example
//!
//! ```
//! use mesh_grid::{GridField, VoxelVolume};
//! use mesh_isosurface::{extract_isosurface, keep_largest_component};
//!
//! let volume = VoxelVolume::from_fn((6, 6, 6), |x, y, z| {
//!     u8::from(x < 3 && y < 3 && z < 3 || (x, y, z) == (5, 5, 5))
//! });
//! let field = GridField::from_volume(&volume, 0.5);
//!
//! let mut surface = extract_isosurface(&field).unwrap();
//! assert_eq!(keep_largest_component(&mut surface), 1);
//! assert!(surface.is_closed_manifold());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

mod components;
mod error;
mod marching_cubes;
pub mod tables;

pub use components::{find_connected_components, keep_largest_component, ComponentAnalysis};
pub use error::{IsosurfaceError, IsosurfaceResult};
pub use marching_cubes::{extract_isosurface, marching_cubes, MarchingCubesConfig};
