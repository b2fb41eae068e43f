//! Surface vertices. Tetrahedral meshes store bare points.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point of a surface, with an optional normal.
///
/// Surfaces produced by the isosurface extractor may carry a unit normal
/// estimated from the field gradient.
///
/// # Example
///
/// ```
/// use mesh_types::{Vertex, Point3};
///
/// let v1 = Vertex::new(Point3::new(1.0, 2.0, 3.0));
/// let v2 = Vertex::from_coords(1.0, 2.0, 3.0);
///
/// assert_eq!(v1.position, v2.position);
/// assert!(v1.normal.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// World position, in voxel units for pipeline output.
    pub position: Point3<f64>,

    /// Unit normal, if one was computed.
    pub normal: Option<Vector3<f64>>,
}

impl Vertex {
    /// Vertex without a normal.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
        }
    }

    /// Vertex at `(x, y, z)` without a normal.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_coords_sets_position() {
        let v = Vertex::from_coords(1.0, -2.0, 3.5);
        assert_eq!(v.position, Point3::new(1.0, -2.0, 3.5));
        assert!(v.normal.is_none());
    }
}
