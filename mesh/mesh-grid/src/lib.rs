//! Halo-padded scalar grids and voxel volumes.
//!
//! Every extraction stage in the toolkit consumes a [`GridField`]: a dense
//! scalar grid whose outermost layer of samples is a negative sentinel. The
//! halo keeps any sampled region away from the grid boundary, so a surface
//! extracted from the field is always closed.
//!
//! # Sign Convention
//!
//! A sample is **inside iff its value is greater than zero**. Fields built
//! from voxel volumes store `sample - threshold`; signed distance fields are
//! negated before extraction.
//!
//! # Example
//!
//! ```
//! use mesh_grid::{GridField, VoxelVolume};
//!
//! let volume = VoxelVolume::from_fn((8, 8, 8), |x, y, z| {
//!     u8::from((2..6).contains(&x) && (2..6).contains(&y) && (2..6).contains(&z))
//! });
//! let field = GridField::from_volume(&volume, 0.5);
//! assert_eq!(field.count_above(0.0), 64);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod error;
mod field;
mod volume;

pub use error::{check_grid_size, GridError, GridResult};
pub use field::{GridField, HALO_SENTINEL};
pub use volume::VoxelVolume;
