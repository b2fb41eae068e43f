//! Dexel volumes: solids stored as sorted intervals per grid column.
//!
//! A [`DexelVolume`] run-length encodes a solid along X. Each column in
//! the YZ plane holds a strictly increasing list of transition heights
//! that alternate between entering and leaving the solid. The
//! representation is compact for scanned anatomy, classifies points with a
//! binary search, and supports an exact Euclidean [`dilate`].
//!
//! # Pipeline Role
//!
//! 1. [`DexelVolume::from_grid`] encodes a thresholded voxel field
//! 2. [`dilate`] grows the solid by a radius
//! 3. [`DexelVolume::to_grid_field`] resamples it for isosurface extraction
//!
//! [`DexelVolume::from_surface`] encodes a closed triangle surface with the
//! same ray-parity rule the distance field builder uses for its sign.
//!
//! # Example
//!
//! ```
//! use mesh_dexel::{dilate, DexelVolume};
//! use mesh_grid::{GridField, VoxelVolume};
//!
//! let field = GridField::from_volume(&VoxelVolume::filled((2, 2, 2), 1), 0.5);
//! let dexels = DexelVolume::from_grid(&field).unwrap();
//! let fat = dilate(&dexels, 1.0).unwrap();
//!
//! assert!(fat.solid_volume() > dexels.solid_volume());
//! let resampled = fat.to_grid_field(2, usize::MAX).unwrap();
//! assert!(resampled.has_sentinel_halo());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]

mod build;
mod dilate;
mod error;
mod resample;
mod surface;
mod volume;

pub use dilate::{dilate, dilate_with, DilationConfig};
pub use error::{DexelError, DexelResult};
pub use resample::{INSIDE_VALUE, OUTSIDE_VALUE};
pub use volume::{height_inside, Column, DexelVolume};
