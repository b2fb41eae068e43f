//! Tetrahedral meshing of signed distance fields.
//!
//! [`tetrahedralize`] fills the negative region of a
//! [`SignedDistanceField`](mesh_sdf::SignedDistanceField) with positively
//! oriented tetrahedra using isosurface stuffing on a body-centred cubic
//! lattice congruent to the field's grid. [`boundary`] recovers the
//! bounding triangle surface of any tetrahedral mesh by counting faces.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_sdf::SignedDistanceField;
//! use mesh_tet::{boundary, tetrahedralize};
//! use mesh_types::MeshTopology;
//! use nalgebra::Point3;
//!
//! let sdf = SignedDistanceField::from_fn(Point3::new(-2.0, -2.0, -2.0), 0.5, (9, 9, 9), |p| {
//!     p.coords.norm() - 1.2
//! })
//! .unwrap();
//!
//! let tets = tetrahedralize(&sdf).unwrap();
//! let surface = boundary(&tets).unwrap();
//! assert!(surface.is_closed_manifold());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

mod boundary;
mod config;
mod error;
mod lattice;
mod refine;
mod stuffing;

pub use boundary::{boundary, boundary_faces, check_indices, face_key};
pub use config::{TetConfig, DEFAULT_ALPHA_LONG, DEFAULT_ALPHA_SHORT};
pub use error::{TetError, TetResult};
pub use refine::{project_boundary, smooth_interior};
pub use stuffing::{tetrahedralize, tetrahedralize_with, validate_volumes};
