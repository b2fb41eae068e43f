//! Optional post-processing of stuffed meshes.
//!
//! Both passes move one vertex at a time and keep a move only when every
//! tetrahedron around the vertex stays positively oriented.

use mesh_sdf::SignedDistanceField;
use mesh_types::TetMesh;
use nalgebra::{Point3, Vector3};

use crate::boundary::boundary_vertex_mask;

/// Move interior vertices towards the centroid of their neighbours.
///
/// A move is kept when it does not shrink the smallest tetrahedron around
/// the vertex. Returns the number of accepted moves over all passes.
pub fn smooth_interior(mesh: &mut TetMesh, iterations: usize) -> usize {
    let on_boundary = boundary_vertex_mask(mesh);
    let incident = incident_tets(mesh);
    let neighbours = vertex_neighbours(mesh, &incident);
    let mut moved = 0;

    for _ in 0..iterations {
        for v in 0..mesh.vertices.len() {
            if on_boundary[v] || neighbours[v].is_empty() {
                continue;
            }
            let sum = neighbours[v]
                .iter()
                .fold(Vector3::zeros(), |acc, &w| acc + mesh.vertices[w as usize].coords);
            let target = Point3::from(sum / neighbours[v].len() as f64);

            let before = min_incident_volume(mesh, &incident[v]);
            if try_move(mesh, v, target, &incident[v], before) {
                moved += 1;
            }
        }
    }
    moved
}

/// Project boundary vertices onto the zero level set of `sdf`.
///
/// Each pass takes one Newton step along the field gradient. Vertices more
/// than one cell from the level set are left alone. Returns the number of
/// accepted moves over all passes.
pub fn project_boundary(mesh: &mut TetMesh, sdf: &SignedDistanceField, iterations: usize) -> usize {
    let on_boundary = boundary_vertex_mask(mesh);
    let incident = incident_tets(mesh);
    let step = 0.25 * sdf.cell_size();
    let mut moved = 0;

    for _ in 0..iterations {
        for v in 0..mesh.vertices.len() {
            if !on_boundary[v] {
                continue;
            }
            let p = mesh.vertices[v];
            let value = sdf.evaluate(&p);
            if value == 0.0 || value.abs() > sdf.cell_size() {
                continue;
            }
            let gradient = field_gradient(sdf, &p, step);
            let norm2 = gradient.norm_squared();
            if norm2 < 1e-12 {
                continue;
            }
            let target = p - gradient * (value / norm2);
            if try_move(mesh, v, target, &incident[v], 0.0) {
                moved += 1;
            }
        }
    }
    moved
}

fn field_gradient(sdf: &SignedDistanceField, p: &Point3<f64>, step: f64) -> Vector3<f64> {
    let mut gradient = Vector3::zeros();
    for axis in 0..3 {
        let mut offset = Vector3::zeros();
        offset[axis] = step;
        gradient[axis] = (sdf.evaluate(&(p + offset)) - sdf.evaluate(&(p - offset))) / (2.0 * step);
    }
    gradient
}

/// Move `v` to `target` if the smallest incident volume stays positive and at least `floor`.
fn try_move(mesh: &mut TetMesh, v: usize, target: Point3<f64>, incident: &[u32], floor: f64) -> bool {
    let old = mesh.vertices[v];
    mesh.vertices[v] = target;
    let after = min_incident_volume(mesh, incident);
    if after > 0.0 && after >= floor {
        true
    } else {
        mesh.vertices[v] = old;
        false
    }
}

fn min_incident_volume(mesh: &TetMesh, incident: &[u32]) -> f64 {
    incident
        .iter()
        .map(|&t| mesh.signed_volume(t as usize))
        .fold(f64::INFINITY, f64::min)
}

fn incident_tets(mesh: &TetMesh) -> Vec<Vec<u32>> {
    let mut incident = vec![Vec::new(); mesh.vertices.len()];
    for (t, tet) in mesh.tets.iter().enumerate() {
        for &v in tet {
            incident[v as usize].push(t as u32);
        }
    }
    incident
}

fn vertex_neighbours(mesh: &TetMesh, incident: &[Vec<u32>]) -> Vec<Vec<u32>> {
    incident
        .iter()
        .enumerate()
        .map(|(v, tets)| {
            let mut list: Vec<u32> = tets
                .iter()
                .flat_map(|&t| mesh.tets[t as usize])
                .filter(|&w| w as usize != v)
                .collect();
            list.sort_unstable();
            list.dedup();
            list
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// A cube with a displaced centre vertex, split into twelve tets.
    fn star() -> TetMesh {
        let mut vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        vertices.push(Point3::new(0.3, 0.35, 0.4));
        let faces = mesh_types::unit_cube().faces;
        // Each outward cube face plus the centre is a negatively wound tet.
        let tets = faces.iter().map(|f| [f[0], f[2], f[1], 8]).collect();
        TetMesh::from_parts(vertices, tets)
    }

    #[test]
    fn star_is_positive() {
        let mesh = star();
        assert!(mesh.min_volume() > 0.0);
        assert_relative_eq!(mesh.total_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn smoothing_centres_the_interior_vertex() {
        let mut mesh = star();
        let before = mesh.min_volume();
        let moved = smooth_interior(&mut mesh, 5);
        assert!(moved > 0);
        assert!(mesh.min_volume() >= before);
        assert!((mesh.vertices[8] - Point3::new(0.5, 0.5, 0.5)).norm() < 0.2);
        assert_relative_eq!(mesh.total_volume(), 1.0, epsilon = 1e-12);
        // Boundary vertices never move.
        assert_eq!(mesh.vertices[6], Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn projection_moves_boundary_onto_level_set() {
        let mut mesh = star();
        // Plane x = 0.9 cuts the cube; vertices at x = 1 are 0.1 outside.
        let sdf = SignedDistanceField::from_fn(
            Point3::new(-1.0, -1.0, -1.0),
            0.25,
            (13, 13, 13),
            |p| p.x - 0.9,
        )
        .unwrap();
        let moved = project_boundary(&mut mesh, &sdf, 1);
        assert!(moved > 0);
        assert!(mesh.min_volume() > 0.0);
        for v in [1, 2, 5, 6] {
            assert_relative_eq!(mesh.vertices[v].x, 0.9, epsilon = 1e-9);
        }
    }
}
