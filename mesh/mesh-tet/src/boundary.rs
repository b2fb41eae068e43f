//! Boundary extraction by face counting.
//!
//! Every tetrahedron contributes its four outward-wound faces. A face used
//! once lies on the boundary, a face used twice is interior, and anything
//! more means the mesh is not a manifold.

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, TetMesh, Vertex};
use tracing::{debug, warn};

use crate::error::{TetError, TetResult};

/// Canonical key of a face: its vertex indices in ascending order.
#[inline]
#[must_use]
pub fn face_key(face: [u32; 3]) -> [u32; 3] {
    let mut key = face;
    key.sort_unstable();
    key
}

/// Occurrence record for one canonical face.
#[derive(Debug, Clone, Copy)]
struct FaceEntry {
    /// The face as first seen, with its outward winding.
    face: [u32; 3],
    count: usize,
}

/// Count canonical faces, remembering the first-seen order.
fn count_faces(mesh: &TetMesh) -> (HashMap<[u32; 3], FaceEntry>, Vec<[u32; 3]>) {
    let mut entries: HashMap<[u32; 3], FaceEntry> = HashMap::with_capacity(mesh.tet_count() * 2);
    let mut order = Vec::new();
    for t in 0..mesh.tet_count() {
        for face in mesh.faces(t) {
            let key = face_key(face);
            entries
                .entry(key)
                .and_modify(|e| e.count += 1)
                .or_insert_with(|| {
                    order.push(key);
                    FaceEntry { face, count: 1 }
                });
        }
    }
    (entries, order)
}

/// Outward-wound boundary faces of a tetrahedral mesh, as vertex indices of the tet mesh.
///
/// Faces come out in the order they are first met when walking the
/// tetrahedra.
///
/// # Errors
///
/// - [`TetError::InvalidIndex`] if a tetrahedron references a missing vertex
/// - [`TetError::NonManifoldFace`] if a face is shared by more than two
///   tetrahedra; the first such face is reported
pub fn boundary_faces(mesh: &TetMesh) -> TetResult<Vec<[u32; 3]>> {
    check_indices(mesh)?;
    let (entries, order) = count_faces(mesh);

    let mut faces = Vec::new();
    for key in &order {
        let Some(entry) = entries.get(key) else {
            continue;
        };
        match entry.count {
            1 => faces.push(entry.face),
            2 => {}
            count => {
                warn!(face = ?key, count, "face shared by more than two tetrahedra");
                return Err(TetError::NonManifoldFace { face: *key, count });
            }
        }
    }
    Ok(faces)
}

/// Extract the closed triangle surface bounding a tetrahedral mesh.
///
/// Only vertices used by boundary faces are kept; they keep their relative
/// order. Faces are wound counter-clockwise seen from outside as long as
/// the tetrahedra are positively oriented.
///
/// # Errors
///
/// See [`boundary_faces`].
///
/// # Example
///
/// ```
/// use mesh_tet::boundary;
/// use mesh_types::{unit_cube_tets, MeshTopology};
///
/// let surface = boundary(&unit_cube_tets()).unwrap();
/// assert_eq!(surface.face_count(), 12);
/// assert!(surface.is_closed_manifold());
/// ```
pub fn boundary(mesh: &TetMesh) -> TetResult<IndexedMesh> {
    let faces = boundary_faces(mesh)?;
    let vertices = mesh.vertices.iter().copied().map(Vertex::from).collect();
    let surface = IndexedMesh::from_parts(vertices, faces).compacted();
    debug!(
        tets = mesh.tet_count(),
        faces = surface.faces.len(),
        vertices = surface.vertices.len(),
        "extracted boundary"
    );
    Ok(surface)
}

/// Flags vertices that lie on a boundary face.
///
/// Faces used more than twice are treated as boundary.
pub(crate) fn boundary_vertex_mask(mesh: &TetMesh) -> Vec<bool> {
    let (entries, _) = count_faces(mesh);
    let mut mask = vec![false; mesh.vertices.len()];
    for entry in entries.values().filter(|e| e.count != 2) {
        for v in entry.face {
            mask[v as usize] = true;
        }
    }
    mask
}

/// Check that every tetrahedron references existing vertices.
///
/// # Errors
///
/// Returns [`TetError::InvalidIndex`] for the first bad reference.
pub fn check_indices(mesh: &TetMesh) -> TetResult<()> {
    let vertex_count = mesh.vertex_count();
    for (tet, corners) in mesh.tets.iter().enumerate() {
        if let Some(&vertex) = corners.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(TetError::InvalidIndex {
                tet,
                vertex,
                vertex_count,
            });
        }
    }
    Ok(())
}
