//! Building a signed distance field from a closed triangle surface.

use mesh_dexel::DexelVolume;
use mesh_grid::check_grid_size;
use mesh_types::{Aabb, IndexedMesh, MeshBounds};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::bvh::{TriangleBvh, DEFAULT_LEAF_SIZE};
use crate::error::{SdfError, SdfResult};
use crate::sdf::SignedDistanceField;

/// Cells of margin below the surface bounds.
const LOW_MARGIN: f64 = 2.0;

/// Samples added beyond the bounds so the high side has at least two cells of margin.
const EXTRA_SAMPLES: usize = 5;

/// Configuration for SDF construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SdfConfig {
    /// Grid spacing in world units.
    pub cell_size: f64,
    /// Evaluate z-slices in parallel.
    pub parallel: bool,
    /// Upper bound on the number of grid samples.
    pub max_grid_cells: usize,
    /// Maximum triangles per BVH leaf.
    pub leaf_size: usize,
}

impl Default for SdfConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.8,
            parallel: true,
            max_grid_cells: 256 * 256 * 256,
            leaf_size: DEFAULT_LEAF_SIZE,
        }
    }
}

impl SdfConfig {
    /// Fine sampling for small parts.
    #[must_use]
    pub fn fine() -> Self {
        Self {
            cell_size: 0.4,
            ..Self::default()
        }
    }

    /// Set the grid spacing.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the sample limit.
    #[must_use]
    pub fn with_max_grid_cells(mut self, max_grid_cells: usize) -> Self {
        self.max_grid_cells = max_grid_cells;
        self
    }

    /// Set the BVH leaf size.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }
}

/// Grid placement for a surface: origin of the first sample and samples per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Position of sample `(0, 0, 0)`.
    pub origin: Point3<f64>,
    /// Samples per axis.
    pub dims: (usize, usize, usize),
}

impl GridLayout {
    /// Lay out a grid around `bounds` with two cells of margin on every side.
    #[must_use]
    pub fn around(bounds: &Aabb, cell_size: f64) -> Self {
        let origin = bounds.min - Vector3::repeat(LOW_MARGIN * cell_size);
        let size = bounds.size();
        let samples = |extent: f64| (extent / cell_size).ceil() as usize + EXTRA_SAMPLES;
        Self {
            origin,
            dims: (samples(size.x), samples(size.y), samples(size.z)),
        }
    }
}

/// Computes signed distance fields with a fixed configuration.
///
/// Distances come from nearest-triangle queries through a [`TriangleBvh`].
/// Signs come from ray-crossing parity along +X: the surface is sampled
/// into dexel columns through the grid samples, and a sample is inside
/// when its column has an odd number of crossings below it.
#[derive(Debug, Clone, Default)]
pub struct SdfBuilder {
    config: SdfConfig,
}

impl SdfBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new(config: SdfConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SdfConfig {
        &self.config
    }

    /// Build the field for a closed surface.
    ///
    /// # Errors
    ///
    /// - [`SdfError::EmptySurface`] if the surface has no faces
    /// - [`SdfError::InvalidCellSize`] for a non-positive cell size
    /// - [`SdfError::Grid`] if the grid would exceed the sample limit
    /// - [`SdfError::Sign`] if the surface is not closed
    pub fn build(&self, surface: &IndexedMesh) -> SdfResult<SignedDistanceField> {
        let h = self.config.cell_size;
        if !(h.is_finite() && h > 0.0) {
            return Err(SdfError::InvalidCellSize(h));
        }
        if surface.faces.is_empty() {
            return Err(SdfError::EmptySurface);
        }

        let layout = GridLayout::around(&surface.bounds(), h);
        let (nx, ny, nz) = layout.dims;
        check_grid_size(layout.dims, self.config.max_grid_cells)?;
        debug!(dims = ?layout.dims, cell_size = h, "sdf grid");

        // Column centres coincide with grid samples.
        let sign = DexelVolume::from_surface_in(
            surface,
            layout.origin - Vector3::repeat(0.5 * h),
            h,
            (ny, nz),
            nx,
        )?;
        let bvh = TriangleBvh::build(surface, self.config.leaf_size);

        let slice_len = nx * ny;
        let mut values = vec![0.0; slice_len * nz];
        let fill = |k: usize, slice: &mut [f64]| {
            for j in 0..ny {
                for i in 0..nx {
                    let p = layout.origin + Vector3::new(i as f64, j as f64, k as f64) * h;
                    let distance = bvh
                        .nearest(&p)
                        .map_or(f64::INFINITY, |n| n.distance_squared.sqrt());
                    let inside = sign.column_contains(j, k, p.x);
                    slice[i + nx * j] = if inside { -distance } else { distance };
                }
            }
        };
        if self.config.parallel {
            values
                .par_chunks_mut(slice_len)
                .enumerate()
                .for_each(|(k, slice)| fill(k, slice));
        } else {
            values
                .chunks_mut(slice_len)
                .enumerate()
                .for_each(|(k, slice)| fill(k, slice));
        }

        let sdf = SignedDistanceField::from_values(layout.origin, h, layout.dims, values)?;
        info!(
            dims = ?layout.dims,
            inside = sdf.inside_count(),
            faces = surface.faces.len(),
            "built signed distance field"
        );
        Ok(sdf)
    }
}

/// Build a signed distance field for a closed surface.
///
/// # Errors
///
/// See [`SdfBuilder::build`].
///
/// # Example
///
/// ```
/// use mesh_sdf::{build_sdf, SdfConfig};
/// use mesh_types::unit_cube;
/// use nalgebra::Point3;
///
/// let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.125)).unwrap();
/// assert!(sdf.evaluate(&Point3::new(0.5, 0.5, 0.5)) < 0.0);
/// assert!(sdf.evaluate(&Point3::new(3.0, 0.5, 0.5)) > 0.0);
/// ```
pub fn build_sdf(surface: &IndexedMesh, config: &SdfConfig) -> SdfResult<SignedDistanceField> {
    SdfBuilder::new(config.clone()).build(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_grid::GridError;
    use mesh_types::unit_cube;

    #[test]
    fn layout_has_margin_on_both_sides() {
        let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 2.0, 0.5));
        let layout = GridLayout::around(&bounds, 0.5);
        assert_relative_eq!(layout.origin, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(layout.dims, (7, 9, 6));
        let top = layout.origin.x + (layout.dims.0 - 1) as f64 * 0.5;
        assert!(top >= bounds.max.x + 1.0);
    }

    #[test]
    fn empty_surface_rejected() {
        assert_eq!(
            build_sdf(&IndexedMesh::new(), &SdfConfig::default()),
            Err(SdfError::EmptySurface)
        );
    }

    #[test]
    fn invalid_cell_size_rejected() {
        let config = SdfConfig::default().with_cell_size(-1.0);
        assert_eq!(build_sdf(&unit_cube(), &config), Err(SdfError::InvalidCellSize(-1.0)));
    }

    #[test]
    fn grid_limit_enforced() {
        let config = SdfConfig::default().with_cell_size(0.1).with_max_grid_cells(100);
        assert!(matches!(
            build_sdf(&unit_cube(), &config),
            Err(SdfError::Grid(GridError::GridTooLarge { limit: 100, .. }))
        ));
    }

    #[test]
    fn open_surface_rejected() {
        let mut cube = unit_cube();
        cube.faces.truncate(10);
        let config = SdfConfig::default().with_cell_size(0.25);
        assert!(matches!(build_sdf(&cube, &config), Err(SdfError::Sign(_))));
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = SdfConfig::default().with_cell_size(0.2);
        let a = build_sdf(&unit_cube(), &config).unwrap();
        let b = build_sdf(&unit_cube(), &config.with_parallel(false)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unit_cube_samples() {
        let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.125)).unwrap();
        assert_eq!(sdf.dimensions(), (13, 13, 13));

        // Sample (6, 6, 6) is the cube centre.
        assert_relative_eq!(sdf.get(6, 6, 6), -0.5, epsilon = 1e-12);
        // Corner sample is outside at distance sqrt(3) * 0.25.
        assert_relative_eq!(sdf.get(0, 0, 0), 3f64.sqrt() * 0.25, epsilon = 1e-12);
        for &v in sdf.values() {
            assert!(v.abs() <= 3f64.sqrt() * 0.5 + 1e-12);
        }
    }
}
