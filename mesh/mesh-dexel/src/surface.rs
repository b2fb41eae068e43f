//! Dexel construction from a closed triangle surface.
//!
//! Each column is a ray along +X through the column centre. Triangles are
//! projected onto the YZ plane and a ray is counted as hitting a triangle
//! using a top-left fill rule, so a ray through a shared edge or vertex of
//! a closed surface is counted exactly once per sheet.

use mesh_types::{IndexedMesh, MeshBounds, Point3};
use tracing::{debug, warn};

use crate::error::{DexelError, DexelResult};
use crate::volume::{validate_cell_size, Column, DexelVolume};

impl DexelVolume {
    /// Sample a closed surface into columns covering its bounds.
    ///
    /// The column grid has one cell of margin around the surface's YZ
    /// bounds.
    ///
    /// # Errors
    ///
    /// Fails on a non-positive cell size or when a ray crosses the surface
    /// an odd number of times (the surface is not closed).
    pub fn from_surface(mesh: &IndexedMesh, cell_size: f64) -> DexelResult<Self> {
        validate_cell_size(cell_size)?;
        let bounds = mesh.bounds();
        if bounds.is_empty() {
            return Self::empty(Point3::origin(), cell_size, (0, 0), 0);
        }
        let origin = bounds.min - mesh_types::Vector3::repeat(cell_size);
        let size = bounds.size();
        let cells = |extent: f64| (extent / cell_size).ceil() as usize + 2;
        Self::from_surface_in(
            mesh,
            origin,
            cell_size,
            (cells(size.y), cells(size.z)),
            cells(size.x),
        )
    }

    /// Sample a closed surface into an explicit column grid.
    ///
    /// # Errors
    ///
    /// See [`DexelVolume::from_surface`].
    pub fn from_surface_in(
        mesh: &IndexedMesh,
        origin: Point3<f64>,
        cell_size: f64,
        grid: (usize, usize),
        depth: usize,
    ) -> DexelResult<Self> {
        validate_cell_size(cell_size)?;
        let (gy, gz) = grid;
        let mut hits: Vec<Vec<f64>> = vec![Vec::new(); gy * gz];
        let mut skipped = 0usize;

        for face in &mesh.faces {
            let p = face.map(|v| mesh.vertices[v as usize].position);
            let Some(tri) = ProjectedTriangle::new(p[0], p[1], p[2]) else {
                skipped += 1;
                continue;
            };

            // Columns whose centres fall inside the projected bounding box.
            let (lo_u, hi_u, lo_v, hi_v) = tri.bounds();
            let j_range = center_range(lo_u, hi_u, origin.y, cell_size, gy);
            let k_range = center_range(lo_v, hi_v, origin.z, cell_size, gz);
            for k in k_range {
                let v = origin.z + (k as f64 + 0.5) * cell_size;
                for j in j_range.clone() {
                    let u = origin.y + (j as f64 + 0.5) * cell_size;
                    if let Some(x) = tri.intersect(u, v) {
                        hits[j + gy * k].push(x);
                    }
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "skipped faces parallel to the column axis");
        }

        let mut columns = Vec::with_capacity(hits.len());
        for (i, mut xs) in hits.into_iter().enumerate() {
            let column = (i % gy.max(1), i / gy.max(1));
            xs.sort_by(f64::total_cmp);
            let heights = cancel_coincident(&xs);
            if heights.len() % 2 != 0 {
                warn!(?column, count = heights.len(), "ray crosses surface an odd number of times");
                return Err(DexelError::OddCrossings {
                    column,
                    count: heights.len(),
                });
            }
            columns.push(heights);
        }

        Ok(Self::from_parts(origin, cell_size, grid, depth, columns))
    }
}

/// Drop pairs of equal crossings; they do not change parity.
fn cancel_coincident(sorted: &[f64]) -> Column {
    let mut out = Column::new();
    for &x in sorted {
        if out.last() == Some(&x) {
            out.pop();
        } else {
            out.push(x);
        }
    }
    out
}

/// Indices `c` with `lo <= origin + (c + 0.5)·h <= hi`, clamped to `0..n`.
fn center_range(lo: f64, hi: f64, origin: f64, h: f64, n: usize) -> std::ops::Range<usize> {
    let first = ((lo - origin) / h - 0.5).ceil().max(0.0);
    let last = ((hi - origin) / h - 0.5).floor();
    if last < first || n == 0 {
        return 0..0;
    }
    let first = first as usize;
    let end = (last as usize + 1).min(n);
    first.min(end)..end
}

/// A triangle projected onto the YZ plane, wound counter-clockwise.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectedTriangle {
    uv: [(f64, f64); 3],
    x: [f64; 3],
    area2: f64,
}

impl ProjectedTriangle {
    /// Returns `None` when the projection has zero area.
    pub(crate) fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Option<Self> {
        let mut uv = [(a.y, a.z), (b.y, b.z), (c.y, c.z)];
        let mut x = [a.x, b.x, c.x];
        let mut area2 = edge_function(uv[0], uv[1], uv[2]);
        if area2 == 0.0 || !area2.is_finite() {
            return None;
        }
        if area2 < 0.0 {
            uv.swap(1, 2);
            x.swap(1, 2);
            area2 = -area2;
        }
        Some(Self { uv, x, area2 })
    }

    pub(crate) fn bounds(&self) -> (f64, f64, f64, f64) {
        let us = self.uv.map(|p| p.0);
        let vs = self.uv.map(|p| p.1);
        (
            us.iter().copied().fold(f64::INFINITY, f64::min),
            us.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            vs.iter().copied().fold(f64::INFINITY, f64::min),
            vs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    }

    /// X coordinate where the ray at `(u, v)` hits the triangle, if it does.
    pub(crate) fn intersect(&self, u: f64, v: f64) -> Option<f64> {
        let p = (u, v);
        let mut weights = [0.0; 3];
        for i in 0..3 {
            let a = self.uv[(i + 1) % 3];
            let b = self.uv[(i + 2) % 3];
            let w = edge_function(a, b, p);
            if w < 0.0 || (w == 0.0 && !is_top_left(a, b)) {
                return None;
            }
            weights[i] = w;
        }
        let x = (weights[0] * self.x[0] + weights[1] * self.x[1] + weights[2] * self.x[2])
            / self.area2;
        Some(x)
    }
}

/// Twice the signed area of `(a, b, p)`.
///
/// Evaluated with the endpoints in a fixed order so that swapping `a` and
/// `b` negates the result exactly.
fn edge_function(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (lo, hi, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };
    sign * ((hi.0 - lo.0) * (p.1 - lo.1) - (hi.1 - lo.1) * (p.0 - lo.0))
}

/// Top and left edges of a counter-clockwise triangle own their boundary.
fn is_top_left(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.1 == b.1 && b.0 < a.0) || b.1 < a.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{unit_cube, Vector3};

    #[test]
    fn triangle_hit_and_miss() {
        let tri = ProjectedTriangle::new(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 0.0, 1.0),
        )
        .unwrap();
        let x = tri.intersect(0.25, 0.25).unwrap();
        assert_relative_eq!(x, 1.0 + 0.25 + 0.5);
        assert!(tri.intersect(0.9, 0.9).is_none());
    }

    #[test]
    fn shared_edge_counts_once() {
        // Unit square split along its diagonal; a ray on the diagonal must
        // hit exactly one of the two halves.
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let t1 = ProjectedTriangle::new(p[0], p[1], p[2]).unwrap();
        let t2 = ProjectedTriangle::new(p[0], p[2], p[3]).unwrap();
        for s in [0.1, 0.37, 0.5, 0.9] {
            let hits = usize::from(t1.intersect(s, s).is_some())
                + usize::from(t2.intersect(s, s).is_some());
            assert_eq!(hits, 1, "diagonal sample {s}");
        }
        // Shared vertex on the square's corner.
        let hits = usize::from(t1.intersect(0.0, 0.0).is_some())
            + usize::from(t2.intersect(0.0, 0.0).is_some());
        assert!(hits <= 1);
    }

    #[test]
    fn degenerate_projection_is_skipped() {
        let tri = ProjectedTriangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert!(tri.is_none());
    }

    #[test]
    fn cube_surface_to_dexels() {
        let mut cube = unit_cube();
        for v in &mut cube.vertices {
            v.position.coords *= 4.0;
        }
        cube.translate(Vector3::new(0.3, 0.0, 0.0));
        let dexels = DexelVolume::from_surface(&cube, 1.0).unwrap();

        assert_eq!(dexels.grid_size(), (6, 6));
        // Column centres at -0.5, 0.5, ..., 4.5: four columns inside.
        assert_eq!(dexels.solid_column_count(), 16);
        for column in dexels.columns().iter().filter(|c| !c.is_empty()) {
            assert_eq!(column.len(), 2);
            assert_relative_eq!(column[0], 0.3, epsilon = 1e-12);
            assert_relative_eq!(column[1], 4.3, epsilon = 1e-12);
        }
    }

    #[test]
    fn grid_aligned_rays_stay_even() {
        // Column centres land exactly on cube edges and vertices.
        let cube = unit_cube();
        let dexels =
            DexelVolume::from_surface_in(&cube, Point3::new(-1.0, -0.25, -0.25), 0.5, (4, 4), 6);
        let dexels = dexels.unwrap();
        for column in dexels.columns() {
            assert_eq!(column.len() % 2, 0);
        }
        // Centre (0.5, 0.5) is strictly inside the unit square.
        assert_eq!(dexels.column(1, 1), &[0.0, 1.0]);
    }

    #[test]
    fn open_surface_is_rejected() {
        let mut cube = unit_cube();
        cube.faces.retain(|f| *f != [1, 2, 6] && *f != [1, 6, 5]);
        let result = DexelVolume::from_surface(&cube, 0.25);
        assert!(matches!(result, Err(DexelError::OddCrossings { .. })));
    }

    #[test]
    fn cancel_pairs() {
        assert_eq!(cancel_coincident(&[1.0, 1.0, 2.0]).as_slice(), &[2.0]);
        assert_eq!(cancel_coincident(&[1.0, 2.0, 2.0, 2.0]).as_slice(), &[1.0, 2.0]);
    }
}
