//! Bounding volume hierarchy for nearest-triangle queries.

use mesh_types::{Aabb, IndexedMesh, Point3};
use smallvec::SmallVec;

use crate::query::closest_point_on_triangle;

/// Default maximum triangles per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

/// Result of a nearest-triangle query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index of the closest face.
    pub face: u32,
    /// Closest point on that face.
    pub point: Point3<f64>,
    /// Squared distance from the query point.
    pub distance_squared: f64,
}

#[derive(Debug)]
enum Node {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// A median-split BVH over the faces of a triangle surface.
///
/// The hierarchy stores its own copy of the triangle corners, so it does
/// not borrow the surface it was built from.
///
/// # Example
///
/// ```
/// use mesh_sdf::TriangleBvh;
/// use mesh_types::{unit_cube, Point3};
///
/// let bvh = TriangleBvh::build(&unit_cube(), 2);
/// let hit = bvh.nearest(&Point3::new(0.5, 0.5, 3.0)).unwrap();
/// assert!((hit.distance_squared - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct TriangleBvh {
    root: Option<Node>,
    triangles: Vec<[Point3<f64>; 3]>,
}

impl TriangleBvh {
    /// Build the hierarchy with at most `max_leaf_size` faces per leaf.
    #[must_use]
    pub fn build(mesh: &IndexedMesh, max_leaf_size: usize) -> Self {
        let triangles: Vec<[Point3<f64>; 3]> = mesh
            .faces
            .iter()
            .map(|f| f.map(|v| mesh.vertices[v as usize].position))
            .collect();
        if triangles.is_empty() {
            return Self {
                root: None,
                triangles,
            };
        }

        let boxes: Vec<Aabb> = triangles
            .iter()
            .map(|t| Aabb::from_points(t.iter()))
            .collect();
        let indices: Vec<u32> = (0..triangles.len() as u32).collect();
        let root = build_node(&boxes, indices, max_leaf_size.max(1));

        Self {
            root: Some(root),
            triangles,
        }
    }

    /// Number of triangles in the hierarchy.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Find the face closest to `point`, or `None` for an empty surface.
    #[must_use]
    pub fn nearest(&self, point: &Point3<f64>) -> Option<Nearest> {
        let root = self.root.as_ref()?;
        let mut best: Option<Nearest> = None;
        let mut stack: Vec<&Node> = vec![root];

        while let Some(node) = stack.pop() {
            let bound = best.map_or(f64::INFINITY, |b| b.distance_squared);
            if node.bbox().distance_squared(point) > bound {
                continue;
            }
            match node {
                Node::Leaf { triangles, .. } => {
                    for &face in triangles {
                        let [a, b, c] = self.triangles[face as usize];
                        let closest = closest_point_on_triangle(*point, a, b, c);
                        let d2 = (point - closest).norm_squared();
                        if best.map_or(true, |b| d2 < b.distance_squared) {
                            best = Some(Nearest {
                                face,
                                point: closest,
                                distance_squared: d2,
                            });
                        }
                    }
                }
                Node::Internal { left, right, .. } => {
                    // Push the farther child first so the nearer one is searched first.
                    let dl = left.bbox().distance_squared(point);
                    let dr = right.bbox().distance_squared(point);
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }
        best
    }
}

fn build_node(boxes: &[Aabb], mut indices: Vec<u32>, max_leaf_size: usize) -> Node {
    let bbox = indices
        .iter()
        .fold(Aabb::empty(), |acc, &i| acc.union(&boxes[i as usize]));

    if indices.len() <= max_leaf_size {
        return Node::Leaf {
            bbox,
            triangles: indices.into_iter().collect(),
        };
    }

    let size = bbox.size();
    let axis = if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    };
    indices.sort_by(|&a, &b| {
        let ca = boxes[a as usize].center()[axis];
        let cb = boxes[b as usize].center()[axis];
        ca.total_cmp(&cb)
    });

    let right_indices = indices.split_off(indices.len() / 2);
    let left = build_node(boxes, indices, max_leaf_size);
    let right = build_node(boxes, right_indices, max_leaf_size);

    Node::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}
