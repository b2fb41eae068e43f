//! Distance checks against a closed unit cube.

use approx::assert_relative_eq;
use mesh_sdf::{build_sdf, SdfConfig};
use mesh_types::{unit_cube, Point3};

fn cube_distance(p: &Point3<f64>) -> f64 {
    let q = p.coords - nalgebra::Vector3::repeat(0.5);
    let d = q.abs() - nalgebra::Vector3::repeat(0.5);
    let outside = d.map(|c| c.max(0.0)).norm();
    let inside = d.max().min(0.0);
    outside + inside
}

#[test]
fn centroid_is_inside() {
    let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.125)).unwrap();
    assert_relative_eq!(sdf.evaluate(&Point3::new(0.5, 0.5, 0.5)), -0.5, epsilon = 1e-12);
}

#[test]
fn default_cell_size_still_signs_the_centroid() {
    let sdf = build_sdf(&unit_cube(), &SdfConfig::default()).unwrap();
    assert!(sdf.evaluate(&Point3::new(0.5, 0.5, 0.5)) < 0.0);
}

#[test]
fn far_points_match_euclidean_distance() {
    let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.125)).unwrap();
    for p in [
        Point3::new(5.0, 0.5, 0.5),
        Point3::new(0.5, -4.0, 0.5),
        Point3::new(0.5, 0.5, 12.0),
    ] {
        let expected = cube_distance(&p);
        assert_relative_eq!(sdf.evaluate(&p), expected, max_relative = 1e-9);
    }

    // Off-axis points overestimate by at most the clamping detour.
    let p = Point3::new(6.0, 7.0, -5.0);
    let value = sdf.evaluate(&p);
    let expected = cube_distance(&p);
    assert!(value >= expected - 1e-9);
    assert!(value / expected < 1.05);
}

#[test]
fn samples_match_box_distance() {
    let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.2)).unwrap();
    let (nx, ny, nz) = sdf.dimensions();
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let p = sdf.position(i, j, k);
                assert_relative_eq!(sdf.get(i, j, k), cube_distance(&p), epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn occupancy_field_has_sentinel_halo() {
    let sdf = build_sdf(&unit_cube(), &SdfConfig::default().with_cell_size(0.25)).unwrap();
    let field = sdf.to_occupancy().unwrap();
    assert!(field.has_sentinel_halo());
    assert_eq!(field.count_above(0.0), sdf.inside_count());
}
