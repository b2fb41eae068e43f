//! Grid-sampled signed distance field.

use mesh_grid::GridField;
use nalgebra::{Point3, Vector3};

use crate::error::{SdfError, SdfResult};

/// A signed distance field sampled on a regular grid.
///
/// Values are negative inside the surface, positive outside, and their
/// magnitude is the Euclidean distance to the surface. Samples are stored
/// with x varying fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDistanceField {
    values: Vec<f64>,
    dims: (usize, usize, usize),
    origin: Point3<f64>,
    cell_size: f64,
}

impl SignedDistanceField {
    /// Wrap precomputed samples.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive cell size, an axis with fewer than two
    /// samples, or a value count that does not match `dims`.
    pub fn from_values(
        origin: Point3<f64>,
        cell_size: f64,
        dims: (usize, usize, usize),
        values: Vec<f64>,
    ) -> SdfResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SdfError::InvalidCellSize(cell_size));
        }
        if dims.0 < 2 || dims.1 < 2 || dims.2 < 2 {
            return Err(SdfError::Grid(mesh_grid::GridError::TooSmall { dims }));
        }
        let expected = dims.0 * dims.1 * dims.2;
        if values.len() != expected {
            return Err(SdfError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            dims,
            origin,
            cell_size,
        })
    }

    /// Sample an analytic distance function on a grid.
    ///
    /// # Errors
    ///
    /// See [`SignedDistanceField::from_values`].
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_sdf::SignedDistanceField;
    /// use nalgebra::Point3;
    ///
    /// let sphere = SignedDistanceField::from_fn(Point3::new(-2.0, -2.0, -2.0), 0.5, (9, 9, 9), |p| {
    ///     p.coords.norm() - 1.0
    /// })
    /// .unwrap();
    /// assert!((sphere.evaluate(&Point3::origin()) + 1.0).abs() < 1e-12);
    /// ```
    pub fn from_fn(
        origin: Point3<f64>,
        cell_size: f64,
        dims: (usize, usize, usize),
        mut f: impl FnMut(Point3<f64>) -> f64,
    ) -> SdfResult<Self> {
        let mut values = Vec::with_capacity(dims.0 * dims.1 * dims.2);
        for k in 0..dims.2 {
            for j in 0..dims.1 {
                for i in 0..dims.0 {
                    values.push(f(origin + Vector3::new(i as f64, j as f64, k as f64) * cell_size));
                }
            }
        }
        Self::from_values(origin, cell_size, dims, values)
    }

    /// Samples per axis.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.dims
    }

    /// Position of sample `(0, 0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Spacing between samples.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// All samples.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Linear index of sample `(i, j, k)`.
    #[inline]
    #[must_use]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims.0 * (j + self.dims.1 * k)
    }

    /// Sample `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[self.index(i, j, k)]
    }

    /// World position of sample `(i, j, k)`.
    #[inline]
    #[must_use]
    pub fn position(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        self.origin + Vector3::new(i as f64, j as f64, k as f64) * self.cell_size
    }

    /// Position of the last sample.
    #[must_use]
    pub fn max_corner(&self) -> Point3<f64> {
        self.position(self.dims.0 - 1, self.dims.1 - 1, self.dims.2 - 1)
    }

    /// Number of samples strictly inside the surface.
    #[must_use]
    pub fn inside_count(&self) -> usize {
        self.values.iter().filter(|&&v| v < 0.0).count()
    }

    /// Interpolated distance at an arbitrary point.
    ///
    /// Inside the grid the samples are interpolated trilinearly. Outside,
    /// the value at the nearest grid point is extended by the distance to
    /// it, which bounds the true distance from above.
    #[must_use]
    pub fn evaluate(&self, point: &Point3<f64>) -> f64 {
        let lo = self.origin;
        let hi = self.max_corner();
        let clamped = Point3::new(
            point.x.clamp(lo.x, hi.x),
            point.y.clamp(lo.y, hi.y),
            point.z.clamp(lo.z, hi.z),
        );
        let outside = (point - clamped).norm();

        let local = (clamped - lo) / self.cell_size;
        let (i, tx) = cell_coordinate(local.x, self.dims.0);
        let (j, ty) = cell_coordinate(local.y, self.dims.1);
        let (k, tz) = cell_coordinate(local.z, self.dims.2);

        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t;
        let c00 = lerp(self.get(i, j, k), self.get(i + 1, j, k), tx);
        let c10 = lerp(self.get(i, j + 1, k), self.get(i + 1, j + 1, k), tx);
        let c01 = lerp(self.get(i, j, k + 1), self.get(i + 1, j, k + 1), tx);
        let c11 = lerp(self.get(i, j + 1, k + 1), self.get(i + 1, j + 1, k + 1), tx);
        let value = lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz);

        value + outside
    }

    /// Convert to an occupancy field for isosurface extraction.
    ///
    /// Values are negated so the interior is positive. The outermost layer
    /// of samples becomes the halo and must lie strictly outside the
    /// surface.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::Grid`] if a boundary sample is inside or on the
    /// surface, or an axis has fewer than three samples.
    pub fn to_occupancy(&self) -> SdfResult<GridField> {
        let values = self.values.iter().map(|v| -v).collect();
        Ok(GridField::new(self.origin, self.cell_size, self.dims, values)?)
    }
}

/// Cell index and fractional offset of a local coordinate along an axis.
fn cell_coordinate(local: f64, samples: usize) -> (usize, f64) {
    let last = samples - 2;
    let cell = (local.floor().max(0.0) as usize).min(last);
    (cell, (local - cell as f64).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn plane() -> SignedDistanceField {
        // Half-space x < 1.
        SignedDistanceField::from_fn(Point3::origin(), 0.5, (5, 3, 3), |p| p.x - 1.0).unwrap()
    }

    #[test]
    fn validates_inputs() {
        let origin = Point3::origin();
        assert_eq!(
            SignedDistanceField::from_values(origin, 0.0, (2, 2, 2), vec![0.0; 8]),
            Err(SdfError::InvalidCellSize(0.0))
        );
        assert_eq!(
            SignedDistanceField::from_values(origin, 1.0, (2, 2, 2), vec![0.0; 7]),
            Err(SdfError::DimensionMismatch {
                expected: 8,
                actual: 7
            })
        );
        assert!(SignedDistanceField::from_values(origin, 1.0, (1, 2, 2), vec![0.0; 4]).is_err());
    }

    #[test]
    fn interpolates_linear_fields_exactly() {
        let sdf = plane();
        for x in [0.0, 0.3, 0.75, 1.0, 1.9, 2.0] {
            assert_relative_eq!(sdf.evaluate(&Point3::new(x, 0.4, 0.7)), x - 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn extends_outside_the_grid() {
        let sdf = plane();
        // Clamped to x = 2, plus three units of travel.
        assert_relative_eq!(sdf.evaluate(&Point3::new(5.0, 0.5, 0.5)), 4.0, epsilon = 1e-12);
        // Below the grid along y: clamped value plus one unit.
        assert_relative_eq!(sdf.evaluate(&Point3::new(0.5, -1.0, 0.5)), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn occupancy_negates() {
        let sdf = SignedDistanceField::from_fn(Point3::new(-2.0, -2.0, -2.0), 0.5, (9, 9, 9), |p| {
            p.coords.norm() - 1.0
        })
        .unwrap();
        let field = sdf.to_occupancy().unwrap();
        assert_eq!(field.dimensions(), (9, 9, 9));
        assert_eq!(field.count_above(0.0), sdf.inside_count());
        assert_relative_eq!(field.get(4, 4, 4), 1.0);
    }

    #[test]
    fn occupancy_rejects_inside_boundary() {
        assert!(matches!(plane().to_occupancy(), Err(SdfError::Grid(_))));
    }
}
