//! Indexed triangle surface.

use crate::{Aabb, MeshBounds, MeshTopology, Vertex};
use hashbrown::HashMap;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle surface.
///
/// This is the surface type produced by the isosurface extractor and the
/// boundary extractor. It stores vertices and faces separately, with faces
/// referencing vertices by index.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from outside.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// assert_eq!(mesh.boundary_edge_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// Returns an empty mesh if either array length is not a multiple of 3.
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = IndexedMesh::from_raw(&positions, &[0, 1, 2]);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();

        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self { vertices, faces }
    }

    /// Compute the signed volume enclosed by the surface.
    ///
    /// Uses the divergence theorem. A closed surface with outward-facing
    /// winding has positive volume; the value is meaningless for open
    /// surfaces.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = self.vertices[i0 as usize].position.coords;
            let v1 = self.vertices[i1 as usize].position.coords;
            let v2 = self.vertices[i2 as usize].position.coords;
            volume += v0.dot(&v1.cross(&v2));
        }

        volume / 6.0
    }

    /// Total area of all triangles.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.faces
            .iter()
            .map(|&[i0, i1, i2]| {
                let p0 = self.vertices[i0 as usize].position;
                let e1 = self.vertices[i1 as usize].position - p0;
                let e2 = self.vertices[i2 as usize].position - p0;
                0.5 * e1.cross(&e2).norm()
            })
            .sum()
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Count how many faces use each undirected edge.
    ///
    /// Keys are `(min, max)` vertex index pairs.
    #[must_use]
    pub fn edge_face_counts(&self) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::with_capacity(self.faces.len() * 3 / 2);
        for face in &self.faces {
            for k in 0..3 {
                let a = face[k];
                let b = face[(k + 1) % 3];
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of edges used by exactly one face.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_face_counts().values().filter(|&&c| c == 1).count()
    }

    /// Check that every edge is shared by exactly two faces.
    ///
    /// An empty mesh is not considered closed.
    #[must_use]
    pub fn is_closed_manifold(&self) -> bool {
        !self.faces.is_empty() && self.edge_face_counts().values().all(|&c| c == 2)
    }

    /// Check that every directed edge appears at most once.
    ///
    /// For a closed manifold this means neighbouring faces agree on winding.
    #[must_use]
    pub fn is_consistently_oriented(&self) -> bool {
        let mut seen: HashMap<(u32, u32), ()> = HashMap::with_capacity(self.faces.len() * 3);
        for face in &self.faces {
            for k in 0..3 {
                if seen.insert((face[k], face[(k + 1) % 3]), ()).is_some() {
                    return false;
                }
            }
        }
        true
    }

    /// Drop vertices that no face references, renumbering faces.
    ///
    /// Vertices keep their relative order.
    #[must_use]
    pub fn compacted(&self) -> Self {
        let mut remap = vec![u32::MAX; self.vertices.len()];
        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &v in face {
                used[v as usize] = true;
            }
        }

        let mut vertices = Vec::new();
        for (i, vertex) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = vertices.len() as u32;
                vertices.push(vertex.clone());
            }
        }

        let faces = self
            .faces
            .iter()
            .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]])
            .collect();

        Self { vertices, faces }
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Create a unit cube surface from (0,0,0) to (1,1,1).
///
/// Faces are wound outward.
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 3
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0)); // 4
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0)); // 5
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0)); // 6
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0)); // 7

    // Bottom (z=0)
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top (z=1)
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front (y=0)
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back (y=1)
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left (x=0)
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right (x=1)
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty());
    }

    #[test]
    fn from_raw_rejects_ragged_input() {
        let mesh = IndexedMesh::from_raw(&[0.0, 1.0], &[0, 1, 2]);
        assert!(mesh.is_empty());
    }

    #[test]
    fn unit_cube_volume_and_area() {
        let cube = unit_cube();
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_cube_is_closed_and_oriented() {
        let cube = unit_cube();
        assert!(cube.is_closed_manifold());
        assert!(cube.is_consistently_oriented());
        assert_eq!(cube.boundary_edge_count(), 0);
    }

    #[test]
    fn flipped_cube_has_negative_volume() {
        let mut cube = unit_cube();
        for face in &mut cube.faces {
            face.swap(1, 2);
        }
        assert!(cube.signed_volume() < 0.0);
        assert!(cube.is_consistently_oriented());
    }

    #[test]
    fn open_surface_is_not_closed() {
        let mut cube = unit_cube();
        cube.faces.pop();
        assert!(!cube.is_closed_manifold());
        assert_eq!(cube.boundary_edge_count(), 3);
    }

    #[test]
    fn inconsistent_winding_detected() {
        let mut cube = unit_cube();
        cube.faces[0].swap(1, 2);
        assert!(!cube.is_consistently_oriented());
    }

    #[test]
    fn compacted_drops_unused_vertices() {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(9.0, 9.0, 9.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([1, 2, 3]);

        let compact = mesh.compacted();
        assert_eq!(compact.vertices.len(), 3);
        assert_eq!(compact.faces[0], [0, 1, 2]);
        assert_eq!(compact.vertices[0].position.x, 0.0);
    }

    #[test]
    fn translate_moves_bounds() {
        let mut cube = unit_cube();
        cube.translate(Vector3::new(1.0, 2.0, 3.0));
        let b = cube.bounds();
        assert_relative_eq!(b.min.y, 2.0);
        assert_relative_eq!(b.max.z, 4.0);
    }
}
