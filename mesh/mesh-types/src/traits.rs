//! Shared queries over surface and volume meshes.

use crate::Aabb;

/// Vertex and triangle access for a surface mesh.
pub trait MeshTopology {
    /// Number of vertices, including any no face references.
    fn vertex_count(&self) -> usize;

    /// Number of triangles.
    fn face_count(&self) -> usize;

    /// A surface without vertices or without triangles bounds nothing.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Corner indices of triangle `index`, counter-clockwise seen from outside.
    fn face(&self, index: usize) -> Option<[u32; 3]>;
}

/// Axis-aligned extent, shared by triangle and tetrahedral meshes.
pub trait MeshBounds {
    /// Box around every vertex; [`Aabb::empty`] when there are none.
    fn bounds(&self) -> Aabb;
}
