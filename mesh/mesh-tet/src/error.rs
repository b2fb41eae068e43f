//! Error types for tetrahedralization and boundary extraction.

use thiserror::Error;

/// Result type for tetrahedral mesh operations.
pub type TetResult<T> = Result<T, TetError>;

/// Errors that can occur while building or inspecting tetrahedral meshes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TetError {
    /// No sample of the field lies inside the surface.
    #[error("distance field has no interior samples")]
    EmptyInterior,

    /// The lattice has more vertices than 32-bit indices can address.
    #[error("lattice needs {0} vertices, more than 32-bit indices allow")]
    TooManyVertices(usize),

    /// A stuffing threshold is outside `(0, 0.5)`.
    #[error("invalid stuffing threshold: {0}")]
    InvalidThreshold(f64),

    /// A tetrahedron has zero or negative volume.
    #[error("tetrahedron {index} has non-positive volume {volume}")]
    DegenerateTetrahedron {
        /// Index of the tetrahedron.
        index: usize,
        /// Its signed volume.
        volume: f64,
    },

    /// A face is shared by more than two tetrahedra.
    #[error("face {face:?} is shared by {count} tetrahedra")]
    NonManifoldFace {
        /// Sorted vertex indices of the face.
        face: [u32; 3],
        /// Number of tetrahedra using it.
        count: usize,
    },

    /// A tetrahedron references a vertex that does not exist.
    #[error("tetrahedron {tet} references vertex {vertex}, but only {vertex_count} exist")]
    InvalidIndex {
        /// Index of the tetrahedron.
        tet: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}
