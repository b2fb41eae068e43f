//! Core mesh types for the scan meshing toolkit.
//!
//! This crate provides the data contracts shared by every meshing stage:
//!
//! - [`Vertex`] - A point in 3D space with an optional normal
//! - [`IndexedMesh`] - A triangle surface with indexed vertices
//! - [`TetMesh`] - A tetrahedral volume mesh
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero rendering dependencies**. Viewers
//! consume the vertex, face and tetrahedron arrays directly.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**. Voxel volumes map their
//! width, height and depth to X, Y and Z.
//!
//! Triangle winding is **counter-clockwise (CCW) when viewed from outside**.
//! Tetrahedra are **positively oriented**: for `[a, b, c, d]`,
//! `(b - a) × (c - a) · (d - a) > 0`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{unit_cube, unit_cube_tets, MeshTopology};
//!
//! let surface = unit_cube();
//! assert!(surface.is_closed_manifold());
//!
//! let tets = unit_cube_tets();
//! assert_eq!(tets.tet_count(), 5);
//! assert!((tets.total_volume() - 1.0).abs() < 1e-12);
//! assert_eq!(surface.face_count(), 12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod mesh;
mod tet;
mod traits;
mod vertex;

pub use bounds::Aabb;
pub use mesh::{unit_cube, IndexedMesh};
pub use tet::{unit_cube_tets, TetMesh, TET_FACES};
pub use traits::{MeshBounds, MeshTopology};
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
