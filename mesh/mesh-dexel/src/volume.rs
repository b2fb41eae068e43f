//! The dexel volume data structure.

use mesh_types::{Aabb, Point3};
use smallvec::SmallVec;

use crate::error::{DexelError, DexelResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transition heights of one column.
///
/// Most columns of a scanned solid cross it once or twice.
pub type Column = SmallVec<[f64; 4]>;

/// A solid stored as sorted intervals along X, one list per YZ column.
///
/// Column `(j, k)` covers `y ∈ [origin.y + j·h, origin.y + (j+1)·h)` and
/// the matching `z` range; its transition heights are absolute X
/// coordinates. Heights come in `(entry, exit)` pairs and are strictly
/// increasing, so a height `x` is inside iff an odd number of heights lie
/// strictly below it.
///
/// # Example
///
/// ```
/// use mesh_dexel::DexelVolume;
/// use mesh_types::Point3;
///
/// let volume = DexelVolume::from_columns(
///     Point3::origin(),
///     1.0,
///     (1, 1),
///     4,
///     vec![vec![1.0, 3.0]],
/// )
/// .unwrap();
///
/// assert!(volume.contains(&Point3::new(2.0, 0.5, 0.5)));
/// assert!(!volume.contains(&Point3::new(3.5, 0.5, 0.5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DexelVolume {
    origin: Point3<f64>,
    cell_size: f64,
    grid: (usize, usize),
    depth: usize,
    columns: Vec<Column>,
}

impl DexelVolume {
    /// Create a volume with no solid columns.
    ///
    /// # Errors
    ///
    /// Returns [`DexelError::InvalidCellSize`] if `cell_size` is not
    /// positive.
    pub fn empty(
        origin: Point3<f64>,
        cell_size: f64,
        grid: (usize, usize),
        depth: usize,
    ) -> DexelResult<Self> {
        validate_cell_size(cell_size)?;
        Ok(Self {
            origin,
            cell_size,
            grid,
            depth,
            columns: vec![Column::new(); grid.0 * grid.1],
        })
    }

    /// Create a volume from explicit columns, `j` fastest.
    ///
    /// # Errors
    ///
    /// Fails if the column count does not match `grid`, a column has an
    /// odd number of heights, or heights are not strictly increasing.
    pub fn from_columns(
        origin: Point3<f64>,
        cell_size: f64,
        grid: (usize, usize),
        depth: usize,
        columns: Vec<Vec<f64>>,
    ) -> DexelResult<Self> {
        validate_cell_size(cell_size)?;
        let expected = grid.0 * grid.1;
        if columns.len() != expected {
            return Err(DexelError::ColumnCountMismatch {
                expected,
                actual: columns.len(),
            });
        }

        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, heights)| {
                let column = (i % grid.0.max(1), i / grid.0.max(1));
                validate_column(&heights, column)?;
                Ok(Column::from_vec(heights))
            })
            .collect::<DexelResult<Vec<_>>>()?;

        Ok(Self {
            origin,
            cell_size,
            grid,
            depth,
            columns,
        })
    }

    /// Assemble from columns already known to be valid.
    pub(crate) fn from_parts(
        origin: Point3<f64>,
        cell_size: f64,
        grid: (usize, usize),
        depth: usize,
        columns: Vec<Column>,
    ) -> Self {
        debug_assert_eq!(columns.len(), grid.0 * grid.1);
        Self {
            origin,
            cell_size,
            grid,
            depth,
            columns,
        }
    }

    /// Minimum corner of the sampled region.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Column width, also the nominal cell length along X.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of columns along Y and Z.
    #[inline]
    #[must_use]
    pub fn grid_size(&self) -> (usize, usize) {
        self.grid
    }

    /// Number of cells along X.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Length of the sampled region along X.
    #[inline]
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.depth as f64 * self.cell_size
    }

    /// Region covered by the columns.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        let h = self.cell_size;
        Aabb::new(
            self.origin,
            Point3::new(
                self.origin.x + self.extent(),
                self.origin.y + self.grid.0 as f64 * h,
                self.origin.z + self.grid.1 as f64 * h,
            ),
        )
    }

    /// Transition heights of column `(j, k)`.
    ///
    /// Returns an empty slice outside the grid.
    #[must_use]
    pub fn column(&self, j: usize, k: usize) -> &[f64] {
        if j < self.grid.0 && k < self.grid.1 {
            self.columns[j + self.grid.0 * k].as_slice()
        } else {
            &[]
        }
    }

    /// All columns, `j` fastest.
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Centre of column `(j, k)` in the YZ plane.
    #[inline]
    #[must_use]
    pub fn column_center(&self, j: usize, k: usize) -> (f64, f64) {
        (
            self.origin.y + (j as f64 + 0.5) * self.cell_size,
            self.origin.z + (k as f64 + 0.5) * self.cell_size,
        )
    }

    /// Check if the volume has no solid intervals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.is_empty())
    }

    /// Number of columns with at least one interval.
    #[must_use]
    pub fn solid_column_count(&self) -> usize {
        self.columns.iter().filter(|c| !c.is_empty()).count()
    }

    /// Total number of `(entry, exit)` intervals.
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.columns.iter().map(|c| c.len() / 2).sum()
    }

    /// Solid volume, treating each column as a prism of square section.
    #[must_use]
    pub fn solid_volume(&self) -> f64 {
        let area = self.cell_size * self.cell_size;
        self.columns
            .iter()
            .flat_map(|c| c.chunks_exact(2))
            .map(|pair| (pair[1] - pair[0]) * area)
            .sum()
    }

    /// Classify a height against column `(j, k)`.
    #[must_use]
    pub fn column_contains(&self, j: usize, k: usize, height: f64) -> bool {
        height_inside(self.column(j, k), height)
    }

    /// Check whether `point` lies in the solid.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let fj = ((point.y - self.origin.y) / self.cell_size).floor();
        let fk = ((point.z - self.origin.z) / self.cell_size).floor();
        if fj < 0.0 || fk < 0.0 {
            return false;
        }
        self.column_contains(fj as usize, fk as usize, point.x)
    }
}

/// A height is inside iff an odd number of transitions lie strictly below.
#[must_use]
pub fn height_inside(heights: &[f64], height: f64) -> bool {
    heights.partition_point(|&h| h < height) % 2 == 1
}

fn validate_column(heights: &[f64], column: (usize, usize)) -> DexelResult<()> {
    if heights.len() % 2 != 0 {
        return Err(DexelError::OddCrossings {
            column,
            count: heights.len(),
        });
    }
    if heights.windows(2).any(|w| w[0] >= w[1]) || heights.iter().any(|h| !h.is_finite()) {
        return Err(DexelError::UnsortedColumn { column });
    }
    Ok(())
}

pub(crate) fn validate_cell_size(cell_size: f64) -> DexelResult<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(DexelError::InvalidCellSize(cell_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_columns() -> DexelVolume {
        DexelVolume::from_columns(
            Point3::new(0.0, 10.0, 20.0),
            2.0,
            (2, 1),
            5,
            vec![vec![0.0, 2.0, 4.0, 8.0], vec![]],
        )
        .unwrap()
    }

    #[test]
    fn accessors() {
        let v = two_columns();
        assert_eq!(v.grid_size(), (2, 1));
        assert_relative_eq!(v.extent(), 10.0);
        assert_eq!(v.column(0, 0), &[0.0, 2.0, 4.0, 8.0]);
        assert!(v.column(1, 0).is_empty());
        assert!(v.column(5, 5).is_empty());
        assert_eq!(v.solid_column_count(), 1);
        assert_eq!(v.interval_count(), 2);
        assert_relative_eq!(v.solid_volume(), 6.0 * 4.0);
    }

    #[test]
    fn classification_is_strict() {
        let v = two_columns();
        assert!(!v.column_contains(0, 0, 0.0));
        assert!(v.column_contains(0, 0, 1.0));
        assert!(v.column_contains(0, 0, 2.0));
        assert!(!v.column_contains(0, 0, 3.0));
        assert!(v.column_contains(0, 0, 8.0));
        assert!(!v.column_contains(0, 0, 8.5));
    }

    #[test]
    fn contains_maps_points_to_columns() {
        let v = two_columns();
        assert!(v.contains(&Point3::new(1.0, 11.0, 21.0)));
        assert!(!v.contains(&Point3::new(1.0, 13.0, 21.0)));
        assert!(!v.contains(&Point3::new(1.0, 9.0, 21.0)));
        assert!(!v.contains(&Point3::new(1.0, 11.0, 25.0)));
    }

    #[test]
    fn rejects_malformed_columns() {
        let odd = DexelVolume::from_columns(Point3::origin(), 1.0, (1, 1), 4, vec![vec![1.0]]);
        assert_eq!(
            odd,
            Err(DexelError::OddCrossings {
                column: (0, 0),
                count: 1
            })
        );

        let unsorted =
            DexelVolume::from_columns(Point3::origin(), 1.0, (2, 1), 4, vec![vec![], vec![2.0, 2.0]]);
        assert_eq!(unsorted, Err(DexelError::UnsortedColumn { column: (1, 0) }));

        let count = DexelVolume::from_columns(Point3::origin(), 1.0, (2, 2), 4, vec![vec![]]);
        assert!(matches!(count, Err(DexelError::ColumnCountMismatch { .. })));
    }

    #[test]
    fn empty_volume() {
        let v = DexelVolume::empty(Point3::origin(), 1.0, (3, 3), 3).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.columns().len(), 9);
        assert!(DexelVolume::empty(Point3::origin(), -1.0, (1, 1), 1).is_err());
    }
}
