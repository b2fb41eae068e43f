//! Connected component analysis for extracted surfaces.
//!
//! Thresholded scans often contain specks of noise that turn into tiny
//! closed shells after extraction. These helpers find vertex-connected
//! components and keep only the dominant one.

use mesh_types::IndexedMesh;
use tracing::info;

/// Result of connected component analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAnalysis {
    /// Number of connected components.
    pub component_count: usize,
    /// Component label for each face.
    pub face_labels: Vec<usize>,
    /// Number of distinct vertices in each component.
    pub vertex_counts: Vec<usize>,
}

impl ComponentAnalysis {
    /// Label of the component with the most vertices.
    ///
    /// Ties go to the lowest label. Returns `None` for an empty mesh.
    #[must_use]
    pub fn largest(&self) -> Option<usize> {
        self.vertex_counts
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (label, &count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label)
    }
}

/// Group faces into components that share vertices.
///
/// Labels are assigned in order of first appearance in the face list.
#[must_use]
pub fn find_connected_components(mesh: &IndexedMesh) -> ComponentAnalysis {
    let mut parent: Vec<usize> = (0..mesh.vertices.len()).collect();

    for face in &mesh.faces {
        let a = face[0] as usize;
        for &v in &face[1..] {
            union(&mut parent, a, v as usize);
        }
    }

    let mut root_label = vec![usize::MAX; mesh.vertices.len()];
    let mut vertex_counts = Vec::new();
    let mut face_labels = Vec::with_capacity(mesh.faces.len());
    let mut counted = vec![false; mesh.vertices.len()];

    for face in &mesh.faces {
        let root = find(&mut parent, face[0] as usize);
        if root_label[root] == usize::MAX {
            root_label[root] = vertex_counts.len();
            vertex_counts.push(0);
        }
        let label = root_label[root];
        face_labels.push(label);
        for &v in face {
            if !counted[v as usize] {
                counted[v as usize] = true;
                vertex_counts[label] += 1;
            }
        }
    }

    ComponentAnalysis {
        component_count: vertex_counts.len(),
        face_labels,
        vertex_counts,
    }
}

/// Keep only the component with the most vertices.
///
/// Unreferenced vertices are dropped. Returns the number of components
/// removed.
///
/// # Example
///
/// ```
/// use mesh_isosurface::keep_largest_component;
/// use mesh_types::unit_cube;
///
/// let mut mesh = unit_cube();
/// assert_eq!(keep_largest_component(&mut mesh), 0);
/// assert_eq!(mesh.faces.len(), 12);
/// ```
pub fn keep_largest_component(mesh: &mut IndexedMesh) -> usize {
    let analysis = find_connected_components(mesh);
    let Some(keep) = analysis.largest() else {
        return 0;
    };
    let removed = analysis.component_count - 1;

    if removed > 0 {
        let faces = mesh
            .faces
            .iter()
            .zip(&analysis.face_labels)
            .filter(|(_, label)| **label == keep)
            .map(|(f, _)| *f)
            .collect();
        mesh.faces = faces;
        info!(
            removed,
            kept_vertices = analysis.vertex_counts[keep],
            "dropped small surface components"
        );
    }
    *mesh = mesh.compacted();
    removed
}

fn find(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}
