//! Dexel construction from a scalar grid.

use mesh_grid::GridField;
use mesh_types::Vector3;
use tracing::debug;

use crate::error::{DexelError, DexelResult};
use crate::volume::{Column, DexelVolume};

impl DexelVolume {
    /// Run-length encode a halo-padded field along X.
    ///
    /// Every interior `(y, z)` row of the field becomes one column. A
    /// sample is inside when it is greater than zero; the run of inside
    /// samples `m0..m1` (interior indices) becomes the interval
    /// `[origin.x + m0·h, origin.x + m1·h]`, so each inside sample
    /// occupies its full cell. The volume's origin is the first interior
    /// sample minus half a cell on every axis, and the column grid matches
    /// the field's interior.
    ///
    /// # Errors
    ///
    /// Returns [`DexelError::OddCrossings`] if a row starts or ends inside,
    /// which can only happen when the halo is missing.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_dexel::DexelVolume;
    /// use mesh_grid::{GridField, VoxelVolume};
    ///
    /// let field = GridField::from_volume(&VoxelVolume::filled((4, 2, 3), 1), 0.5);
    /// let dexels = DexelVolume::from_grid(&field).unwrap();
    ///
    /// assert_eq!(dexels.grid_size(), (2, 3));
    /// assert_eq!(dexels.column(1, 2), &[-0.5, 3.5]);
    /// ```
    pub fn from_grid(field: &GridField) -> DexelResult<Self> {
        let (nx, ny, nz) = field.dimensions();
        let (ix, gy, gz) = field.inner_dimensions();
        let h = field.cell_size();
        let origin = field.position(1, 1, 1) - Vector3::repeat(0.5 * h);

        let mut columns = Vec::with_capacity(gy * gz);
        for k in 0..gz {
            for j in 0..gy {
                let mut heights = Column::new();
                let mut inside = false;
                for i in 0..nx {
                    let now_inside = field.get(i, j + 1, k + 1) > 0.0;
                    if now_inside != inside {
                        // Sample i is the first of the new run; interior index i - 1.
                        heights.push(origin.x + (i as f64 - 1.0) * h);
                        inside = now_inside;
                    }
                }
                if heights.len() % 2 != 0 {
                    return Err(DexelError::OddCrossings {
                        column: (j, k),
                        count: heights.len(),
                    });
                }
                columns.push(heights);
            }
        }

        let volume = Self::from_parts(origin, h, (gy, gz), ix, columns);
        debug!(
            dims = ?(nx, ny, nz),
            solid_columns = volume.solid_column_count(),
            intervals = volume.interval_count(),
            "built dexels from grid"
        );
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_grid::VoxelVolume;
    use mesh_types::Point3;

    #[test]
    fn solid_block_columns() {
        let field = GridField::from_volume(&VoxelVolume::filled((4, 4, 4), 1), 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();

        assert_eq!(dexels.grid_size(), (4, 4));
        assert_eq!(dexels.depth(), 4);
        assert_relative_eq!(dexels.origin().x, -0.5);
        assert_relative_eq!(dexels.origin().y, -0.5);
        for column in dexels.columns() {
            assert_eq!(column.as_slice(), &[-0.5, 3.5]);
        }
        assert_relative_eq!(dexels.solid_volume(), 64.0);
    }

    #[test]
    fn gaps_split_intervals() {
        let volume = VoxelVolume::from_fn((6, 1, 1), |x, _, _| u8::from(x != 2 && x != 3));
        let field = GridField::from_volume(&volume, 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        assert_eq!(dexels.column(0, 0), &[-0.5, 1.5, 3.5, 5.5]);
    }

    #[test]
    fn empty_rows_have_no_heights() {
        let volume = VoxelVolume::from_fn((3, 2, 1), |_, y, _| u8::from(y == 1));
        let field = GridField::from_volume(&volume, 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();
        assert!(dexels.column(0, 0).is_empty());
        assert_eq!(dexels.column(1, 0).len(), 2);
        assert_eq!(dexels.solid_column_count(), 1);
    }

    #[test]
    fn classification_matches_samples() {
        let volume = VoxelVolume::from_fn((5, 4, 3), |x, y, z| u8::from((x * 7 + y * 3 + z) % 4 < 2));
        let field = GridField::from_volume(&volume, 0.5);
        let dexels = DexelVolume::from_grid(&field).unwrap();

        for z in 0..3 {
            for y in 0..4 {
                for x in 0..5 {
                    let p = Point3::new(x as f64, y as f64, z as f64);
                    assert_eq!(dexels.contains(&p), volume.get(x, y, z) == Some(1));
                }
            }
        }
    }
}
