//! Dense labelled voxel volume.

use crate::error::{GridError, GridResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense 3D array of 8-bit label samples.
///
/// Samples are stored x fastest, then y, then z. Voxel `(x, y, z)` is
/// centred on the world point `(x, y, z)`; one voxel is one world unit.
///
/// # Example
///
/// ```
/// use mesh_grid::VoxelVolume;
///
/// let volume = VoxelVolume::filled((4, 4, 4), 1);
/// assert_eq!(volume.solid_count(), 64);
/// assert_eq!(volume.get(3, 3, 3), Some(1));
/// assert_eq!(volume.get(4, 0, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelVolume {
    dims: (usize, usize, usize),
    data: Vec<u8>,
}

impl VoxelVolume {
    /// Wrap existing samples.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if `data.len()` is not
    /// `w * h * d`.
    pub fn new(dims: (usize, usize, usize), data: Vec<u8>) -> GridResult<Self> {
        let expected = dims.0 * dims.1 * dims.2;
        if data.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// A volume where every sample holds `value`.
    #[must_use]
    pub fn filled(dims: (usize, usize, usize), value: u8) -> Self {
        Self {
            dims,
            data: vec![value; dims.0 * dims.1 * dims.2],
        }
    }

    /// Build a volume by evaluating `f(x, y, z)` for every voxel.
    pub fn from_fn(dims: (usize, usize, usize), mut f: impl FnMut(usize, usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(dims.0 * dims.1 * dims.2);
        for z in 0..dims.2 {
            for y in 0..dims.1 {
                for x in 0..dims.0 {
                    data.push(f(x, y, z));
                }
            }
        }
        Self { dims, data }
    }

    /// Volume dimensions `(width, height, depth)`.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.dims
    }

    /// Raw samples.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sample at `(x, y, z)`, or `None` outside the volume.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        let (w, h, d) = self.dims;
        if x < w && y < h && z < d {
            Some(self.data[x + w * (y + h * z)])
        } else {
            None
        }
    }

    /// Number of samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the volume has no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of non-zero samples.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}
