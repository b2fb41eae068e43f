//! Tetrahedral volume mesh.

use crate::{Aabb, MeshBounds, Point3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Faces of a positively oriented tetrahedron, wound outward.
///
/// Entries index into the tetrahedron's four corners. For `[a, b, c, d]`
/// the faces are `(a, c, b)`, `(a, b, d)`, `(a, d, c)` and `(b, c, d)`.
pub const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];

/// A tetrahedral mesh.
///
/// Every tetrahedron `[a, b, c, d]` is expected to satisfy
/// `(b - a) × (c - a) · (d - a) > 0`. Use [`TetMesh::orient_positive`] to
/// repair inverted elements produced by external sources.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube_tets, TetMesh};
///
/// let tets = unit_cube_tets();
/// assert!(tets.min_volume() > 0.0);
/// assert_eq!(tets.faces(0)[0], [0, 3, 1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TetMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Tetrahedra as indices into the vertex array.
    pub tets: Vec<[u32; 4]>,
}

impl TetMesh {
    /// Create an empty tetrahedral mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tets: Vec::new(),
        }
    }

    /// Create a mesh from vertices and tetrahedra.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, tets: Vec<[u32; 4]>) -> Self {
        Self { vertices, tets }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of tetrahedra.
    #[inline]
    #[must_use]
    pub fn tet_count(&self) -> usize {
        self.tets.len()
    }

    /// Check if the mesh has no tetrahedra.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tets.is_empty()
    }

    /// Signed volume of tetrahedron `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` or any referenced vertex is out of range.
    #[must_use]
    pub fn signed_volume(&self, index: usize) -> f64 {
        signed_volume(&self.vertices, self.tets[index])
    }

    /// Sum of all signed tetrahedron volumes.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.tets
            .iter()
            .map(|&t| signed_volume(&self.vertices, t))
            .sum()
    }

    /// Smallest signed tetrahedron volume, or `f64::INFINITY` when empty.
    #[must_use]
    pub fn min_volume(&self) -> f64 {
        self.tets
            .iter()
            .map(|&t| signed_volume(&self.vertices, t))
            .fold(f64::INFINITY, f64::min)
    }

    /// The four outward-wound faces of tetrahedron `index`.
    #[must_use]
    pub fn faces(&self, index: usize) -> [[u32; 3]; 4] {
        let t = self.tets[index];
        TET_FACES.map(|f| [t[f[0]], t[f[1]], t[f[2]]])
    }

    /// Swap two corners of every negatively oriented tetrahedron.
    ///
    /// Returns the number of tetrahedra that were flipped.
    pub fn orient_positive(&mut self) -> usize {
        let mut flipped = 0;
        for tet in &mut self.tets {
            if signed_volume(&self.vertices, *tet) < 0.0 {
                tet.swap(1, 2);
                flipped += 1;
            }
        }
        flipped
    }

    /// Drop vertices no tetrahedron references, renumbering in order.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.vertices.len()];
        for tet in &self.tets {
            for &v in tet {
                used[v as usize] = true;
            }
        }

        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut next = 0u32;
        let mut kept = Vec::with_capacity(self.vertices.len());
        for (i, p) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = next;
                next += 1;
                kept.push(*p);
            }
        }

        self.vertices = kept;
        for tet in &mut self.tets {
            *tet = tet.map(|v| remap[v as usize]);
        }
    }
}

impl MeshBounds for TetMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }
}

fn signed_volume(vertices: &[Point3<f64>], tet: [u32; 4]) -> f64 {
    let a = vertices[tet[0] as usize];
    let b = vertices[tet[1] as usize];
    let c = vertices[tet[2] as usize];
    let d = vertices[tet[3] as usize];
    (b - a).cross(&(c - a)).dot(&(d - a)) / 6.0
}

/// The unit cube split into five positively oriented tetrahedra.
///
/// Four corner tetrahedra surround one central tetrahedron of volume 1/3.
/// Corners use the same numbering as [`crate::unit_cube`].
#[must_use]
pub fn unit_cube_tets() -> TetMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let tets = vec![
        [0, 1, 3, 4],
        [1, 2, 3, 6],
        [1, 4, 5, 6],
        [3, 6, 7, 4],
        [1, 3, 4, 6],
    ];
    TetMesh { vertices, tets }
}
