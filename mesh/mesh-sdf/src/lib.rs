//! Signed distance fields of closed triangle surfaces.
//!
//! The field is sampled on a regular grid around the surface's bounds with
//! two cells of margin. Magnitudes come from nearest-triangle queries
//! through a bounding volume hierarchy; signs come from ray-crossing parity
//! along the X axis, so the input surface must be closed.
//!
//! Values are negative inside and positive outside. Use
//! [`SignedDistanceField::to_occupancy`] to hand the field to an isosurface
//! extractor, which expects the interior to be positive.
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Example
//!
//! ```
//! use mesh_sdf::{SdfBuilder, SdfConfig};
//! use mesh_types::unit_cube;
//! use nalgebra::Point3;
//!
//! let builder = SdfBuilder::new(SdfConfig::default().with_cell_size(0.25));
//! let sdf = builder.build(&unit_cube()).unwrap();
//!
//! let far = sdf.evaluate(&Point3::new(0.5, 0.5, 10.0));
//! assert!((far - 9.0).abs() < 1e-9);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

mod builder;
mod bvh;
mod error;
mod query;
mod sdf;

pub use builder::{build_sdf, GridLayout, SdfBuilder, SdfConfig};
pub use bvh::{Nearest, TriangleBvh, DEFAULT_LEAF_SIZE};
pub use error::{SdfError, SdfResult};
pub use query::{closest_point_on_triangle, triangle_distance_squared};
pub use sdf::SignedDistanceField;
