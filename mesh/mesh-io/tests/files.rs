//! Integration tests for reading and writing pipeline files.

use mesh_grid::VoxelVolume;
use mesh_io::{
    load_surface, load_tet_mesh, load_volume, save_surface, save_tet_mesh, save_volume, IoError,
};
use mesh_types::{unit_cube, unit_cube_tets};
use tempfile::tempdir;

#[test]
fn surface_and_tets_survive_a_round_trip() {
    let dir = tempdir().unwrap();

    let surface_path = dir.path().join("cube.off");
    save_surface(&unit_cube(), &surface_path).unwrap();
    let surface = load_surface(&surface_path).unwrap();
    assert_eq!(surface, unit_cube());
    assert!(surface.is_closed_manifold());

    let tet_path = dir.path().join("cube.msh");
    let tets = unit_cube_tets();
    save_tet_mesh(&tets, &tet_path).unwrap();
    let loaded = load_tet_mesh(&tet_path).unwrap();
    assert_eq!(loaded, tets);
    approx::assert_relative_eq!(loaded.total_volume(), 1.0, epsilon = 1e-12);
}

#[test]
fn volume_round_trip_keeps_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ball.dat");
    let volume = VoxelVolume::from_fn((5, 6, 7), |x, y, z| {
        let d = (x as i32 - 2).pow(2) + (y as i32 - 3).pow(2) + (z as i32 - 3).pow(2);
        u8::from(d <= 4)
    });
    save_volume(&volume, &path).unwrap();

    let loaded = load_volume(&path).unwrap();
    assert_eq!(loaded.dimensions(), (5, 6, 7));
    assert_eq!(loaded, volume);
}

#[test]
fn missing_raw_file_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.dat");
    std::fs::write(&path, "ObjectFileName: scan.raw\nResolution: 2 2 2\n").unwrap();
    assert!(matches!(
        load_volume(&path),
        Err(IoError::FileNotFound { path }) if path.ends_with("scan.raw")
    ));
}
