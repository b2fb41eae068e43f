//! Halo-padded scalar grid.

use crate::error::{GridError, GridResult};
use crate::volume::VoxelVolume;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value stored in every halo sample.
///
/// Any value below the extraction level works; `-1.0` matches the
/// two-valued fields produced by dexel resampling.
pub const HALO_SENTINEL: f64 = -1.0;

/// A dense 3D scalar grid with a mandatory one-cell halo.
///
/// Values are stored x fastest, then y, then z. Dimensions include the
/// halo, so the interior spans indices `1..n-1` on every axis. Every halo
/// sample is negative, which places it outside under the occupancy
/// convention (`value > 0` is inside) and guarantees closed isosurfaces.
///
/// # Example
///
/// ```
/// use mesh_grid::{GridField, VoxelVolume};
///
/// let volume = VoxelVolume::filled((4, 4, 4), 1);
/// let field = GridField::from_volume(&volume, 0.5);
///
/// assert_eq!(field.dimensions(), (6, 6, 6));
/// assert!(field.has_sentinel_halo());
/// assert!(field.get(1, 1, 1) > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridField {
    values: Vec<f64>,
    dims: (usize, usize, usize),
    origin: Point3<f64>,
    cell_size: f64,
}

impl GridField {
    /// Wrap a full grid, halo included.
    ///
    /// # Errors
    ///
    /// Fails if the cell size is not positive, any axis has fewer than three
    /// samples, the value count does not match, or a halo sample is not
    /// negative.
    pub fn new(
        origin: Point3<f64>,
        cell_size: f64,
        dims: (usize, usize, usize),
        values: Vec<f64>,
    ) -> GridResult<Self> {
        validate_cell_size(cell_size)?;
        if dims.0 < 3 || dims.1 < 3 || dims.2 < 3 {
            return Err(GridError::TooSmall { dims });
        }
        let expected = dims.0 * dims.1 * dims.2;
        if values.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }

        let field = Self {
            values,
            dims,
            origin,
            cell_size,
        };
        if let Some((index, value)) = field.first_halo_violation() {
            return Err(GridError::HaloNotSentinel { index, value });
        }
        Ok(field)
    }

    /// Surround interior samples with a sentinel halo.
    ///
    /// `inner_origin` is the position of the first interior sample; the
    /// returned grid's origin sits one cell below it on every axis.
    ///
    /// # Errors
    ///
    /// Fails on an invalid cell size, an empty axis, or a value count that
    /// does not match `inner_dims`.
    pub fn from_inner(
        inner_origin: Point3<f64>,
        cell_size: f64,
        inner_dims: (usize, usize, usize),
        inner_values: &[f64],
    ) -> GridResult<Self> {
        let expected = inner_dims.0 * inner_dims.1 * inner_dims.2;
        if inner_values.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                actual: inner_values.len(),
            });
        }
        let (w, h, _) = inner_dims;
        Self::from_inner_fn(inner_origin, cell_size, inner_dims, |x, y, z| {
            inner_values[x + w * (y + h * z)]
        })
    }

    /// Surround samples produced by `f(x, y, z)` with a sentinel halo.
    ///
    /// Coordinates passed to `f` are interior indices starting at zero.
    ///
    /// # Errors
    ///
    /// Fails on an invalid cell size or an empty axis.
    pub fn from_inner_fn(
        inner_origin: Point3<f64>,
        cell_size: f64,
        inner_dims: (usize, usize, usize),
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> GridResult<Self> {
        validate_cell_size(cell_size)?;
        let dims = (inner_dims.0 + 2, inner_dims.1 + 2, inner_dims.2 + 2);
        if inner_dims.0 == 0 || inner_dims.1 == 0 || inner_dims.2 == 0 {
            return Err(GridError::TooSmall { dims });
        }

        let mut values = vec![HALO_SENTINEL; dims.0 * dims.1 * dims.2];
        for z in 0..inner_dims.2 {
            for y in 0..inner_dims.1 {
                for x in 0..inner_dims.0 {
                    let i = (x + 1) + dims.0 * ((y + 1) + dims.1 * (z + 1));
                    values[i] = f(x, y, z);
                }
            }
        }

        let origin = inner_origin - nalgebra::Vector3::repeat(cell_size);
        Ok(Self {
            values,
            dims,
            origin,
            cell_size,
        })
    }

    /// Threshold a voxel volume into a field.
    ///
    /// Each sample becomes `sample - threshold`, so voxels above the
    /// threshold are inside. Voxel `(x, y, z)` lands on grid point
    /// `(x + 1, y + 1, z + 1)` at world position `(x, y, z)`.
    #[must_use]
    pub fn from_volume(volume: &VoxelVolume, threshold: f64) -> Self {
        let (w, h, d) = volume.dimensions();
        let dims = (w + 2, h + 2, d + 2);
        let mut values = vec![HALO_SENTINEL; dims.0 * dims.1 * dims.2];
        for (i, &sample) in volume.data().iter().enumerate() {
            let x = i % w;
            let y = (i / w) % h;
            let z = i / (w * h);
            values[(x + 1) + dims.0 * ((y + 1) + dims.1 * (z + 1))] = f64::from(sample) - threshold;
        }

        Self {
            values,
            dims,
            origin: Point3::new(-1.0, -1.0, -1.0),
            cell_size: 1.0,
        }
    }

    /// Grid dimensions `(nx, ny, nz)`, halo included.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.dims
    }

    /// Dimensions of the interior, halo excluded.
    #[inline]
    #[must_use]
    pub fn inner_dimensions(&self) -> (usize, usize, usize) {
        (
            self.dims.0.saturating_sub(2),
            self.dims.1.saturating_sub(2),
            self.dims.2.saturating_sub(2),
        )
    }

    /// Position of grid point `(0, 0, 0)`.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Spacing between neighbouring samples.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// All samples in storage order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Total number of samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the grid holds no samples.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Linear index of `(ix, iy, iz)`.
    #[inline]
    #[must_use]
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + self.dims.0 * (iy + self.dims.1 * iz)
    }

    /// Sample at `(ix, iy, iz)`.
    ///
    /// Returns [`HALO_SENTINEL`] for coordinates outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        if ix < self.dims.0 && iy < self.dims.1 && iz < self.dims.2 {
            self.values[self.index(ix, iy, iz)]
        } else {
            HALO_SENTINEL
        }
    }

    /// World position of grid point `(ix, iy, iz)`.
    #[inline]
    #[must_use]
    pub fn position(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        Point3::new(
            self.origin.x + ix as f64 * self.cell_size,
            self.origin.y + iy as f64 * self.cell_size,
            self.origin.z + iz as f64 * self.cell_size,
        )
    }

    /// Check whether `(ix, iy, iz)` lies on the halo.
    #[inline]
    #[must_use]
    pub fn is_halo(&self, ix: usize, iy: usize, iz: usize) -> bool {
        ix == 0
            || iy == 0
            || iz == 0
            || ix + 1 >= self.dims.0
            || iy + 1 >= self.dims.1
            || iz + 1 >= self.dims.2
    }

    /// Check that every halo sample is negative.
    #[must_use]
    pub fn has_sentinel_halo(&self) -> bool {
        self.first_halo_violation().is_none()
    }

    /// Number of samples strictly above `level`.
    #[must_use]
    pub fn count_above(&self, level: f64) -> usize {
        self.values.iter().filter(|&&v| v > level).count()
    }

    /// Apply `f` to every sample, keeping geometry.
    ///
    /// # Errors
    ///
    /// Fails with [`GridError::HaloNotSentinel`] if the mapped halo is not
    /// negative.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> GridResult<Self> {
        Self::new(
            self.origin,
            self.cell_size,
            self.dims,
            self.values.iter().map(|&v| f(v)).collect(),
        )
    }

    fn first_halo_violation(&self) -> Option<((usize, usize, usize), f64)> {
        let (nx, ny, nz) = self.dims;
        for iz in 0..nz {
            for iy in 0..ny {
                for ix in 0..nx {
                    if !self.is_halo(ix, iy, iz) {
                        continue;
                    }
                    let v = self.values[self.index(ix, iy, iz)];
                    if v >= 0.0 || v.is_nan() {
                        return Some(((ix, iy, iz), v));
                    }
                }
            }
        }
        None
    }
}

fn validate_cell_size(cell_size: f64) -> GridResult<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidCellSize(cell_size))
    }
}
