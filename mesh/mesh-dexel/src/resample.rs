//! Resampling dexels onto a regular grid.

use mesh_grid::{check_grid_size, GridField};
use mesh_types::Vector3;
use tracing::debug;

use crate::error::{DexelError, DexelResult};
use crate::volume::DexelVolume;

/// Field value for samples inside the solid.
pub const INSIDE_VALUE: f64 = 1.0;

/// Field value for samples outside the solid.
pub const OUTSIDE_VALUE: f64 = -1.0;

impl DexelVolume {
    /// Classify the volume onto a halo-padded two-valued field.
    ///
    /// Each column cell is split into `samples_per_cell` sub-cells per
    /// axis and every sub-cell centre is classified against the column it
    /// falls in: inside samples are [`INSIDE_VALUE`], the rest and the halo
    /// are [`OUTSIDE_VALUE`]. With one sample per cell a volume built by
    /// [`DexelVolume::from_grid`] maps back onto the original samples.
    ///
    /// # Errors
    ///
    /// Fails when `samples_per_cell` is zero, the grid would exceed
    /// `max_cells`, or the volume has no columns.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_dexel::DexelVolume;
    /// use mesh_grid::{GridField, VoxelVolume};
    ///
    /// let field = GridField::from_volume(&VoxelVolume::filled((2, 2, 2), 1), 0.5);
    /// let dexels = DexelVolume::from_grid(&field).unwrap();
    ///
    /// let fine = dexels.to_grid_field(2, usize::MAX).unwrap();
    /// assert_eq!(fine.dimensions(), (6, 6, 6));
    /// assert_eq!(fine.count_above(0.0), 64);
    /// ```
    pub fn to_grid_field(&self, samples_per_cell: usize, max_cells: usize) -> DexelResult<GridField> {
        if samples_per_cell == 0 {
            return Err(DexelError::InvalidSampling(samples_per_cell));
        }
        let s = samples_per_cell;
        let (gy, gz) = self.grid_size();
        let inner = (self.depth() * s, gy * s, gz * s);
        check_grid_size((inner.0 + 2, inner.1 + 2, inner.2 + 2), max_cells)?;

        let step = self.cell_size() / s as f64;
        let inner_origin = self.origin() + Vector3::repeat(0.5 * step);
        let origin_x = inner_origin.x;

        let field = GridField::from_inner_fn(inner_origin, step, inner, |a, b, c| {
            let x = origin_x + a as f64 * step;
            if self.column_contains(b / s, c / s, x) {
                INSIDE_VALUE
            } else {
                OUTSIDE_VALUE
            }
        })?;

        debug!(
            dims = ?field.dimensions(),
            inside = field.count_above(0.0),
            "resampled dexels"
        );
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_grid::{GridError, VoxelVolume};

    fn sample_volume() -> VoxelVolume {
        VoxelVolume::from_fn((5, 4, 3), |x, y, z| u8::from((x + 2 * y + 3 * z) % 3 != 0))
    }

    #[test]
    fn round_trip_reproduces_labels() {
        let volume = sample_volume();
        let field = GridField::from_volume(&volume, 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        let back = dexels.to_grid_field(1, usize::MAX).unwrap();

        assert_eq!(back.dimensions(), field.dimensions());
        assert_relative_eq!(back.origin().x, field.origin().x);
        assert_relative_eq!(back.cell_size(), 1.0);
        for (a, b) in field.values().iter().zip(back.values()) {
            assert_eq!(*a > 0.0, *b > 0.0);
        }
    }

    #[test]
    fn refined_samples_agree_with_columns() {
        let volume = sample_volume();
        let field = GridField::from_volume(&volume, 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        let fine = dexels.to_grid_field(3, usize::MAX).unwrap();

        let (nx, ny, nz) = fine.dimensions();
        assert_eq!((nx, ny, nz), (17, 14, 11));
        assert!(fine.has_sentinel_halo());
        for k in 1..nz - 1 {
            for j in 1..ny - 1 {
                for i in 1..nx - 1 {
                    let p = fine.position(i, j, k);
                    assert_eq!(fine.get(i, j, k) > 0.0, dexels.contains(&p));
                }
            }
        }
        assert_eq!(fine.count_above(0.0), volume.solid_count() * 27);
    }

    #[test]
    fn zero_samples_rejected() {
        let field = GridField::from_volume(&VoxelVolume::filled((1, 1, 1), 1), 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        assert_eq!(
            dexels.to_grid_field(0, usize::MAX),
            Err(DexelError::InvalidSampling(0))
        );
    }

    #[test]
    fn size_limit_enforced() {
        let field = GridField::from_volume(&VoxelVolume::filled((4, 4, 4), 1), 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        assert_eq!(
            dexels.to_grid_field(2, 1000),
            Err(DexelError::Grid(GridError::GridTooLarge {
                dims: (10, 10, 10),
                limit: 1000
            }))
        );
    }
}
