//! Marching cubes isosurface extraction.

use hashbrown::HashMap;
use mesh_grid::GridField;
use mesh_types::{IndexedMesh, Point3, Vector3, Vertex};
use tracing::debug;

use crate::error::{IsosurfaceError, IsosurfaceResult};
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRIANGLE_TABLE};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for marching cubes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarchingCubesConfig {
    /// Level to extract. Samples strictly above it are inside.
    pub iso_level: f64,
    /// Attach area-weighted vertex normals to the output.
    pub compute_normals: bool,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            compute_normals: false,
        }
    }
}

impl MarchingCubesConfig {
    /// Set the iso level.
    #[must_use]
    pub const fn with_iso_level(mut self, iso_level: f64) -> Self {
        self.iso_level = iso_level;
        self
    }

    /// Enable or disable vertex normals.
    #[must_use]
    pub const fn with_normals(mut self, compute_normals: bool) -> Self {
        self.compute_normals = compute_normals;
        self
    }
}

/// Extract the zero level of a field with the default configuration.
///
/// # Errors
///
/// See [`marching_cubes`].
pub fn extract_isosurface(field: &GridField) -> IsosurfaceResult<IndexedMesh> {
    marching_cubes(field, &MarchingCubesConfig::default())
}

/// Triangulate the level set `value == iso_level` of a grid field.
///
/// Vertices are shared between neighbouring cells through a map keyed by
/// the grid edge they lie on, so the output is welded. Cells whose corners
/// are all inside or all outside emit nothing. Because the halo is outside
/// every cell on the grid boundary has outside corners on its outer faces,
/// which makes the result a closed, consistently oriented 2-manifold with
/// outward normals.
///
/// # Errors
///
/// Returns [`IsosurfaceError::InvalidIsoLevel`] for a non-finite level and
/// [`IsosurfaceError::HaloAboveLevel`] if any halo sample would be inside.
///
/// # Example
///
/// ```
/// use mesh_grid::{GridField, VoxelVolume};
/// use mesh_isosurface::{marching_cubes, MarchingCubesConfig};
///
/// let field = GridField::from_volume(&VoxelVolume::filled((3, 3, 3), 1), 0.5);
/// let surface = marching_cubes(&field, &MarchingCubesConfig::default()).unwrap();
///
/// assert!(surface.is_closed_manifold());
/// assert!(surface.signed_volume() > 0.0);
/// ```
pub fn marching_cubes(
    field: &GridField,
    config: &MarchingCubesConfig,
) -> IsosurfaceResult<IndexedMesh> {
    let iso = config.iso_level;
    if !iso.is_finite() {
        return Err(IsosurfaceError::InvalidIsoLevel(iso));
    }
    check_halo(field, iso)?;

    let (nx, ny, nz) = field.dimensions();
    let values = field.values();
    let mut mesh = IndexedMesh::new();
    let mut edge_vertices: HashMap<(usize, usize), u32> = HashMap::new();

    for k in 0..nz.saturating_sub(1) {
        for j in 0..ny.saturating_sub(1) {
            for i in 0..nx.saturating_sub(1) {
                let mut corner_index = [0usize; 8];
                let mut case = 0usize;
                for (c, off) in CORNER_OFFSETS.iter().enumerate() {
                    let idx = field.index(i + off[0], j + off[1], k + off[2]);
                    corner_index[c] = idx;
                    if values[idx] > iso {
                        case |= 1 << c;
                    }
                }

                let edges = EDGE_TABLE[case];
                if edges == 0 {
                    continue;
                }

                let mut cut = [0u32; 12];
                for (e, [a, b]) in EDGE_CORNERS.iter().enumerate() {
                    if edges & (1 << e) == 0 {
                        continue;
                    }
                    let (lo, hi) = if corner_index[*a] < corner_index[*b] {
                        (*a, *b)
                    } else {
                        (*b, *a)
                    };
                    let key = (corner_index[lo], corner_index[hi]);
                    cut[e] = *edge_vertices.entry(key).or_insert_with(|| {
                        let p_lo = corner_position(field, (i, j, k), lo);
                        let p_hi = corner_position(field, (i, j, k), hi);
                        let position = interpolate(p_lo, p_hi, values[key.0], values[key.1], iso);
                        let index = mesh.vertices.len() as u32;
                        mesh.vertices.push(Vertex::new(position));
                        index
                    });
                }

                for tri in TRIANGLE_TABLE[case]
                    .chunks_exact(3)
                    .take_while(|t| t[0] >= 0)
                {
                    mesh.faces.push([
                        cut[tri[0] as usize],
                        cut[tri[1] as usize],
                        cut[tri[2] as usize],
                    ]);
                }
            }
        }
    }

    if config.compute_normals {
        assign_vertex_normals(&mut mesh);
    }

    debug!(
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        iso_level = iso,
        "marching cubes complete"
    );

    Ok(mesh)
}

fn check_halo(field: &GridField, iso: f64) -> IsosurfaceResult<()> {
    let (nx, ny, nz) = field.dimensions();
    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                if !field.is_halo(ix, iy, iz) {
                    continue;
                }
                let value = field.get(ix, iy, iz);
                if value > iso || value.is_nan() {
                    return Err(IsosurfaceError::HaloAboveLevel {
                        index: (ix, iy, iz),
                        value,
                        iso_level: iso,
                    });
                }
            }
        }
    }
    Ok(())
}

fn corner_position(field: &GridField, cell: (usize, usize, usize), corner: usize) -> Point3<f64> {
    let off = CORNER_OFFSETS[corner];
    field.position(cell.0 + off[0], cell.1 + off[1], cell.2 + off[2])
}

/// Point on segment `a..b` where the linear interpolant crosses `iso`.
fn interpolate(a: Point3<f64>, b: Point3<f64>, va: f64, vb: f64, iso: f64) -> Point3<f64> {
    let t = ((iso - va) / (vb - va)).clamp(0.0, 1.0);
    a + (b - a) * t
}

fn assign_vertex_normals(mesh: &mut IndexedMesh) {
    let mut normals = vec![Vector3::zeros(); mesh.vertices.len()];
    for face in &mesh.faces {
        let p0 = mesh.vertices[face[0] as usize].position;
        let p1 = mesh.vertices[face[1] as usize].position;
        let p2 = mesh.vertices[face[2] as usize].position;
        // Unnormalised cross product weights by area.
        let n = (p1 - p0).cross(&(p2 - p0));
        for &v in face {
            normals[v as usize] += n;
        }
    }
    for (vertex, n) in mesh.vertices.iter_mut().zip(normals) {
        vertex.normal = n.try_normalize(f64::EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_grid::{VoxelVolume, HALO_SENTINEL};
    use mesh_types::MeshBounds;

    /// Deterministic pseudo-random generator for reproducible grids.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn assert_watertight(mesh: &IndexedMesh) {
        assert!(mesh.is_closed_manifold(), "surface has open or shared edges");
        assert!(mesh.is_consistently_oriented(), "winding is inconsistent");
        assert!(mesh.signed_volume() > 0.0, "normals point inward");
    }

    #[test]
    fn single_sample_gives_octahedron() {
        let mut values = vec![HALO_SENTINEL; 27];
        values[13] = 1.0;
        let field = GridField::new(Point3::origin(), 1.0, (3, 3, 3), values).unwrap();
        let mesh = extract_isosurface(&field).unwrap();

        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.faces.len(), 8);
        assert_watertight(&mesh);
        // Octahedron with half-diagonal 0.5.
        assert_relative_eq!(mesh.signed_volume(), 4.0 / 3.0 * 0.125, epsilon = 1e-12);
    }

    #[test]
    fn solid_block_is_closed_box() {
        let field = GridField::from_volume(&VoxelVolume::filled((4, 4, 4), 1), 0.5);
        let mesh = extract_isosurface(&field).unwrap();

        assert_watertight(&mesh);
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.x, -1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.max.z, 3.0 + 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_field_gives_empty_mesh() {
        let field = GridField::from_volume(&VoxelVolume::filled((3, 3, 3), 0), 0.5);
        let mesh = extract_isosurface(&field).unwrap();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn checkerboard_is_closed() {
        let volume = VoxelVolume::from_fn((6, 6, 6), |x, y, z| u8::from((x + y + z) % 2 == 0));
        let field = GridField::from_volume(&volume, 0.5);
        let mesh = extract_isosurface(&field).unwrap();
        assert_watertight(&mesh);
    }

    #[test]
    fn random_binary_volumes_are_closed() {
        let mut rng = Lcg(7);
        for _ in 0..20 {
            let volume = VoxelVolume::from_fn((6, 5, 7), |_, _, _| u8::from(rng.next_f64() < 0.5));
            let field = GridField::from_volume(&volume, 0.5);
            let mesh = extract_isosurface(&field).unwrap();
            if volume.solid_count() > 0 {
                assert_watertight(&mesh);
            }
        }
    }

    #[test]
    fn random_continuous_fields_are_closed() {
        let mut rng = Lcg(99);
        for _ in 0..20 {
            let field = GridField::from_inner_fn(Point3::origin(), 0.5, (5, 6, 5), |_, _, _| {
                rng.next_f64() * 2.0 - 1.0
            })
            .unwrap();
            let mesh = extract_isosurface(&field).unwrap();
            if !mesh.faces.is_empty() {
                assert_watertight(&mesh);
            }
        }
    }

    #[test]
    fn normals_point_outward() {
        let field = GridField::from_volume(&VoxelVolume::filled((3, 3, 3), 1), 0.5);
        let config = MarchingCubesConfig::default().with_normals(true);
        let mesh = marching_cubes(&field, &config).unwrap();
        let center = mesh.bounds().center();

        for v in &mesh.vertices {
            let n = v.normal.unwrap();
            assert!(n.dot(&(v.position - center)) > 0.0);
        }
    }

    #[test]
    fn halo_above_level_is_rejected() {
        let field = GridField::from_volume(&VoxelVolume::filled((2, 2, 2), 1), 0.5);
        let config = MarchingCubesConfig::default().with_iso_level(-2.0);
        assert!(matches!(
            marching_cubes(&field, &config),
            Err(IsosurfaceError::HaloAboveLevel { .. })
        ));
    }

    #[test]
    fn non_finite_level_is_rejected() {
        let field = GridField::from_volume(&VoxelVolume::filled((2, 2, 2), 1), 0.5);
        let config = MarchingCubesConfig::default().with_iso_level(f64::NAN);
        assert!(matches!(
            marching_cubes(&field, &config),
            Err(IsosurfaceError::InvalidIsoLevel(_))
        ));
    }
}
