//! Body-centred cubic background lattice.
//!
//! Lattice vertices are the field's samples ("nodes") plus the centre of
//! every cell. Each pair of face-adjacent cells contributes four
//! tetrahedra joining the two centres to the edges of their shared face.

use mesh_sdf::SignedDistanceField;
use nalgebra::{Point3, Vector3};

use crate::error::{TetError, TetResult};

/// Lattice vertices with their field values and tetrahedra.
#[derive(Debug, Clone)]
pub(crate) struct BccLattice {
    pub positions: Vec<Point3<f64>>,
    pub phi: Vec<f64>,
    /// Vertices below this index are nodes, the rest are cell centres.
    pub node_count: usize,
    pub tets: Vec<[u32; 4]>,
}

impl BccLattice {
    pub(crate) fn build(sdf: &SignedDistanceField) -> TetResult<Self> {
        let (ni, nj, nk) = sdf.dimensions();
        let node_count = ni * nj * nk;
        let cells = (ni - 1, nj - 1, nk - 1);
        let total = node_count + cells.0 * cells.1 * cells.2;
        if u32::try_from(total).is_err() {
            return Err(TetError::TooManyVertices(total));
        }

        let node = |i: usize, j: usize, k: usize| (i + ni * (j + nj * k)) as u32;
        let centre = |i: usize, j: usize, k: usize| {
            (node_count + i + cells.0 * (j + cells.1 * k)) as u32
        };

        let mut positions = Vec::with_capacity(total);
        let mut phi = Vec::with_capacity(total);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    positions.push(sdf.position(i, j, k));
                    phi.push(sdf.get(i, j, k));
                }
            }
        }
        let half = Vector3::repeat(0.5 * sdf.cell_size());
        for k in 0..cells.2 {
            for j in 0..cells.1 {
                for i in 0..cells.0 {
                    positions.push(sdf.position(i, j, k) + half);
                    let mut sum = 0.0;
                    for (a, b, c) in CUBE_CORNERS {
                        sum += sdf.get(i + a, j + b, k + c);
                    }
                    phi.push(sum / 8.0);
                }
            }
        }

        let mut tets = Vec::new();
        for k in 0..cells.2 {
            for j in 0..cells.1 {
                for i in 0..cells.0 {
                    for axis in 0..3 {
                        let mut d = [0usize; 3];
                        d[axis] = 1;
                        let (bi, bj, bk) = (i + d[0], j + d[1], k + d[2]);
                        if bi >= cells.0 || bj >= cells.1 || bk >= cells.2 {
                            continue;
                        }
                        let ca = centre(i, j, k);
                        let cb = centre(bi, bj, bk);

                        // Corners of the shared face, in cyclic order.
                        let mut u = [0usize; 3];
                        let mut v = [0usize; 3];
                        u[(axis + 1) % 3] = 1;
                        v[(axis + 2) % 3] = 1;
                        let q = [(0, 0), (1, 0), (1, 1), (0, 1)]
                            .map(|(a, b)| node(bi + a * u[0] + b * v[0], bj + a * u[1] + b * v[1], bk + a * u[2] + b * v[2]));
                        for m in 0..4 {
                            tets.push([ca, cb, q[m], q[(m + 1) % 4]]);
                        }
                    }
                }
            }
        }

        Ok(Self {
            positions,
            phi,
            node_count,
            tets,
        })
    }

    /// Sorted neighbour lists, each entry flagged `true` for a long edge.
    pub(crate) fn adjacency(&self) -> Vec<Vec<(u32, bool)>> {
        let mut adjacency: Vec<Vec<(u32, bool)>> = vec![Vec::new(); self.positions.len()];
        for tet in &self.tets {
            for a in 0..4 {
                for b in (a + 1)..4 {
                    let (v, w) = (tet[a], tet[b]);
                    let long = self.is_node(v) == self.is_node(w);
                    adjacency[v as usize].push((w, long));
                    adjacency[w as usize].push((v, long));
                }
            }
        }
        for list in &mut adjacency {
            list.sort_unstable_by_key(|&(w, _)| w);
            list.dedup_by_key(|&mut (w, _)| w);
        }
        adjacency
    }

    fn is_node(&self, v: u32) -> bool {
        (v as usize) < self.node_count
    }
}

const CUBE_CORNERS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (0, 1, 1),
    (1, 1, 1),
];
