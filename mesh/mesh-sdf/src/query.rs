//! Point-triangle distance queries.

use nalgebra::Point3;

/// Compute the closest point on a triangle to a query point.
///
/// Classifies the point against the Voronoi regions of the triangle's
/// vertices, edges and face ("Real-Time Collision Detection", Ericson).
///
/// # Example
///
/// ```
/// use mesh_sdf::closest_point_on_triangle;
/// use nalgebra::Point3;
///
/// let c = closest_point_on_triangle(
///     Point3::new(0.25, 0.25, 3.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// assert!((c - Point3::new(0.25, 0.25, 0.0)).norm() < 1e-12);
/// ```
#[must_use]
pub fn closest_point_on_triangle(
    point: Point3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Point3<f64> {
    let ab = v1 - v0;
    let ac = v2 - v0;
    let ap = point - v0;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return v0;
    }

    let bp = point - v1;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return v1;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return v0 + ab * (d1 / (d1 - d3));
    }

    let cp = point - v2;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return v2;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return v0 + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return v1 + (v2 - v1) * w;
    }

    let denom = va + vb + vc;
    if denom.abs() < f64::MIN_POSITIVE {
        // Degenerate triangle: every edge region test failed on a sliver.
        return v0;
    }
    v0 + ab * (vb / denom) + ac * (vc / denom)
}

/// Squared distance from `point` to the triangle.
#[inline]
#[must_use]
pub fn triangle_distance_squared(
    point: Point3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> f64 {
    (point - closest_point_on_triangle(point, v0, v1, v2)).norm_squared()
}
