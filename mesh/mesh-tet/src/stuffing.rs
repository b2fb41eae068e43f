//! Isosurface stuffing.
//!
//! Lattice vertices close to the zero level set are first snapped onto it
//! ("warping"). Every lattice tetrahedron is then classified by the signs
//! of its corners and replaced by the piece inside the surface: a whole
//! tetrahedron, a corner tetrahedron, a pyramid or a prism. Cut points on
//! lattice edges are shared between neighbours, so the result is
//! conforming.

use hashbrown::HashMap;
use mesh_sdf::SignedDistanceField;
use mesh_types::TetMesh;
use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::TetConfig;
use crate::error::{TetError, TetResult};
use crate::lattice::BccLattice;
use crate::refine;

/// Tetrahedralize the interior of a signed distance field with the default configuration.
///
/// # Errors
///
/// See [`tetrahedralize_with`].
///
/// # Example
///
/// ```
/// use mesh_sdf::SignedDistanceField;
/// use mesh_tet::tetrahedralize;
/// use nalgebra::Point3;
///
/// let sdf = SignedDistanceField::from_fn(Point3::new(-3.0, -3.0, -3.0), 0.5, (13, 13, 13), |p| {
///     p.coords.norm() - 2.0
/// })
/// .unwrap();
/// let tets = tetrahedralize(&sdf).unwrap();
/// assert!(tets.min_volume() > 0.0);
/// ```
pub fn tetrahedralize(sdf: &SignedDistanceField) -> TetResult<TetMesh> {
    tetrahedralize_with(sdf, &TetConfig::default())
}

/// Tetrahedralize the interior of a signed distance field.
///
/// The output covers the region where the field is negative, lattice
/// vertices are snapped to the zero level set where they are close to it,
/// and every tetrahedron is positively oriented.
///
/// # Errors
///
/// - [`TetError::InvalidThreshold`] if a snap threshold is outside `(0, 0.5)`
/// - [`TetError::EmptyInterior`] if no sample is negative
/// - [`TetError::TooManyVertices`] if the lattice is too large to index
/// - [`TetError::DegenerateTetrahedron`] if a tetrahedron has no volume
pub fn tetrahedralize_with(sdf: &SignedDistanceField, config: &TetConfig) -> TetResult<TetMesh> {
    for alpha in [config.alpha_long, config.alpha_short] {
        if alpha.is_nan() || alpha <= 0.0 || alpha >= 0.5 {
            return Err(TetError::InvalidThreshold(alpha));
        }
    }
    if sdf.inside_count() == 0 {
        return Err(TetError::EmptyInterior);
    }

    let mut lattice = BccLattice::build(sdf)?;
    debug!(
        vertices = lattice.positions.len(),
        tets = lattice.tets.len(),
        "built background lattice"
    );

    let snapped = warp(&mut lattice, config);
    debug!(snapped, "snapped lattice vertices to the level set");

    let mut mesh = Stuffer::new(&lattice).run();
    mesh.compact();

    if config.optimize {
        let moved = refine::smooth_interior(&mut mesh, config.iterations);
        debug!(moved, "smoothed interior vertices");
    }
    if config.feature_preservation {
        let moved = refine::project_boundary(&mut mesh, sdf, config.iterations);
        debug!(moved, "projected boundary vertices");
    }

    validate_volumes(&mesh)?;
    info!(
        vertices = mesh.vertex_count(),
        tets = mesh.tet_count(),
        volume = mesh.total_volume(),
        "tetrahedralized"
    );
    Ok(mesh)
}

/// Fail on the first tetrahedron without positive volume.
///
/// # Errors
///
/// Returns [`TetError::DegenerateTetrahedron`] for the first offender.
pub fn validate_volumes(mesh: &TetMesh) -> TetResult<()> {
    for index in 0..mesh.tet_count() {
        let volume = mesh.signed_volume(index);
        if volume <= 0.0 || volume.is_nan() {
            return Err(TetError::DegenerateTetrahedron { index, volume });
        }
    }
    Ok(())
}

/// Snap lattice vertices onto nearby zero crossings.
///
/// Vertices are visited in index order. For each, the incident edges with a
/// sign change whose crossing lies within the edge's threshold are
/// candidates, and the vertex moves to the candidate crossing nearest to
/// it. Returns the number of vertices moved.
fn warp(lattice: &mut BccLattice, config: &TetConfig) -> usize {
    let adjacency = lattice.adjacency();
    let mut snapped = 0;
    for v in 0..lattice.positions.len() {
        let phi_v = lattice.phi[v];
        if phi_v == 0.0 {
            continue;
        }
        let mut best: Option<(f64, Point3<f64>)> = None;
        for &(w, long) in &adjacency[v] {
            let w = w as usize;
            let phi_w = lattice.phi[w];
            if phi_w == 0.0 || (phi_v < 0.0) == (phi_w < 0.0) {
                continue;
            }
            let t = phi_v / (phi_v - phi_w);
            let alpha = if long { config.alpha_long } else { config.alpha_short };
            if t >= alpha {
                continue;
            }
            let (p, q) = (lattice.positions[v], lattice.positions[w]);
            let travel = t * (q - p).norm();
            if best.map_or(true, |(d, _)| travel < d) {
                best = Some((travel, p + (q - p) * t));
            }
        }
        if let Some((_, target)) = best {
            lattice.positions[v] = target;
            lattice.phi[v] = 0.0;
            snapped += 1;
        }
    }
    snapped
}

/// Emits the inside piece of each lattice tetrahedron.
struct Stuffer<'a> {
    phi: &'a [f64],
    lattice_tets: &'a [[u32; 4]],
    positions: Vec<Point3<f64>>,
    cuts: HashMap<(u32, u32), u32>,
    tets: Vec<[u32; 4]>,
}

impl<'a> Stuffer<'a> {
    fn new(lattice: &'a BccLattice) -> Self {
        Self {
            phi: &lattice.phi,
            lattice_tets: &lattice.tets,
            positions: lattice.positions.clone(),
            cuts: HashMap::new(),
            tets: Vec::new(),
        }
    }

    fn run(mut self) -> TetMesh {
        let lattice_tets = self.lattice_tets;
        for &tet in lattice_tets {
            let (neg, zero, pos) = classify(tet, self.phi);

            if pos.is_empty() {
                if !neg.is_empty() {
                    self.emit(tet);
                }
                continue;
            }
            match (neg.len(), pos.len()) {
                (0, _) => {}
                (1, _) => {
                    let a = neg[0];
                    let mut t = [a; 4];
                    let mut n = 1;
                    for &z in &zero {
                        t[n] = z;
                        n += 1;
                    }
                    for &p in &pos {
                        t[n] = self.cut(a, p);
                        n += 1;
                    }
                    self.emit(t);
                }
                (2, 2) => {
                    let (a, b, p, q) = (neg[0], neg[1], pos[0], pos[1]);
                    let lower = [a, self.cut(a, p), self.cut(a, q)];
                    let upper = [b, self.cut(b, p), self.cut(b, q)];
                    self.prism(lower, upper);
                }
                (2, _) => {
                    let (a, b, p, z) = (neg[0], neg[1], pos[0], zero[0]);
                    let base = [a, b, self.cut(b, p), self.cut(a, p)];
                    self.pyramid(base, z);
                }
                _ => {
                    let (a, b, c, p) = (neg[0], neg[1], neg[2], pos[0]);
                    let upper = [self.cut(a, p), self.cut(b, p), self.cut(c, p)];
                    self.prism([a, b, c], upper);
                }
            }
        }
        TetMesh::from_parts(self.positions, self.tets)
    }

    /// Vertex where the level set crosses the edge from `inside` to `outside`.
    fn cut(&mut self, inside: u32, outside: u32) -> u32 {
        let key = (inside.min(outside), inside.max(outside));
        if let Some(&v) = self.cuts.get(&key) {
            return v;
        }
        let (pa, pb) = (self.phi[inside as usize], self.phi[outside as usize]);
        let t = pa / (pa - pb);
        let a = self.positions[inside as usize];
        let b = self.positions[outside as usize];
        let v = self.positions.len() as u32;
        self.positions.push(a + (b - a) * t);
        self.cuts.insert(key, v);
        v
    }

    fn emit(&mut self, tet: [u32; 4]) {
        let [a, b, c, d] = tet.map(|v| self.positions[v as usize]);
        let volume = (b - a).cross(&(c - a)).dot(&(d - a));
        if volume < 0.0 {
            self.tets.push([tet[0], tet[2], tet[1], tet[3]]);
        } else {
            self.tets.push(tet);
        }
    }

    /// Split a pyramid along the base diagonal through its lowest-index corner.
    fn pyramid(&mut self, base: [u32; 4], apex: u32) {
        let m = (0..4).min_by_key(|&i| base[i]).unwrap_or(0);
        let b = [base[m], base[(m + 1) % 4], base[(m + 2) % 4], base[(m + 3) % 4]];
        self.emit([b[0], b[1], b[2], apex]);
        self.emit([b[0], b[2], b[3], apex]);
    }

    /// Split a triangular prism into three tetrahedra.
    ///
    /// Each quadrilateral side is split along the diagonal through its
    /// lowest-index corner, so neighbouring prisms and pyramids agree.
    fn prism(&mut self, lower: [u32; 3], upper: [u32; 3]) {
        let (mut lo, mut hi) = (lower, upper);
        let all = [lo[0], lo[1], lo[2], hi[0], hi[1], hi[2]];
        let mut m = (0..6).min_by_key(|&i| all[i]).unwrap_or(0);
        if m >= 3 {
            std::mem::swap(&mut lo, &mut hi);
            m -= 3;
        }
        let v0 = lo[m];
        let v1 = lo[(m + 1) % 3];
        let v2 = lo[(m + 2) % 3];
        let v3 = hi[m];
        let v4 = hi[(m + 1) % 3];
        let v5 = hi[(m + 2) % 3];
        if v1.min(v5) < v2.min(v4) {
            self.emit([v0, v1, v2, v5]);
            self.emit([v0, v1, v5, v4]);
            self.emit([v0, v4, v5, v3]);
        } else {
            self.emit([v0, v1, v2, v4]);
            self.emit([v0, v4, v2, v5]);
            self.emit([v0, v4, v5, v3]);
        }
    }
}

type Corners = SmallVec<[u32; 4]>;

/// Split corners into negative, zero and positive groups, keeping their order.
fn classify(tet: [u32; 4], phi: &[f64]) -> (Corners, Corners, Corners) {
    let mut negative = Corners::new();
    let mut zero = Corners::new();
    let mut positive = Corners::new();
    for v in tet {
        let value = phi[v as usize];
        if value < 0.0 {
            negative.push(v);
        } else if value > 0.0 {
            positive.push(v);
        } else {
            zero.push(v);
        }
    }
    (negative, zero, positive)
}
