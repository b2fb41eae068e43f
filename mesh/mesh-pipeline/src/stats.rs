//! Summary statistics for reporting.

use std::fmt;

use mesh_types::{IndexedMesh, TetMesh};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counts and volumes describing a meshing result.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MeshStats {
    /// Surface vertices.
    pub vertices: usize,
    /// Surface triangles.
    pub faces: usize,
    /// Surface edges used by a single triangle. Zero for a closed surface.
    pub boundary_edges: usize,
    /// Total triangle area of the surface.
    pub surface_area: f64,
    /// Tetrahedra.
    pub tets: usize,
    /// Sum of tetrahedron volumes.
    pub total_volume: f64,
    /// Smallest tetrahedron volume, zero without tetrahedra.
    pub min_volume: f64,
}

impl MeshStats {
    /// Statistics of a surface alone.
    #[must_use]
    pub fn from_surface(surface: &IndexedMesh) -> Self {
        Self {
            vertices: surface.vertices.len(),
            faces: surface.faces.len(),
            boundary_edges: surface.boundary_edge_count(),
            surface_area: surface.surface_area(),
            ..Self::default()
        }
    }

    /// Statistics of a tetrahedral mesh and its boundary.
    #[must_use]
    pub fn from_meshes(tets: &TetMesh, boundary: &IndexedMesh) -> Self {
        let min_volume = if tets.is_empty() { 0.0 } else { tets.min_volume() };
        Self {
            tets: tets.tet_count(),
            total_volume: tets.total_volume(),
            min_volume,
            ..Self::from_surface(boundary)
        }
    }
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} faces, {} open edges, area {:.4}",
            self.vertices, self.faces, self.boundary_edges, self.surface_area
        )?;
        if self.tets > 0 {
            write!(
                f,
                ", {} tets, volume {:.4} (min {:.3e})",
                self.tets, self.total_volume, self.min_volume
            )?;
        }
        Ok(())
    }
}
