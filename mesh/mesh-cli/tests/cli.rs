//! Runs the `meshing` binary against files in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

use mesh_grid::VoxelVolume;
use mesh_io::{load_surface, load_tet_mesh, save_tet_mesh, save_volume};
use mesh_types::unit_cube_tets;
use tempfile::tempdir;

fn meshing(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_meshing"))
        .args(args)
        .output()
        .unwrap()
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn run_writes_tets_and_surface() {
    let dir = tempdir().unwrap();
    let header = dir.path().join("block.dat");
    save_volume(&VoxelVolume::filled((3, 3, 3), 1), &header).unwrap();

    let out = meshing(&["run", &arg(&header), "--radius", "1", "--cell-size", "0.5"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let tets = load_tet_mesh(dir.path().join("block.msh")).unwrap();
    assert!(tets.min_volume() > 0.0);
    let surface = load_surface(dir.path().join("block.off")).unwrap();
    assert!(surface.is_closed_manifold());
    assert!(String::from_utf8_lossy(&out.stdout).contains("tets"));
}

#[test]
fn surface_and_boundary_commands() {
    let dir = tempdir().unwrap();
    let header = dir.path().join("block.dat");
    save_volume(&VoxelVolume::filled((2, 2, 2), 1), &header).unwrap();

    let thin = dir.path().join("thin.off");
    let out = meshing(&["surface", &arg(&header), &arg(&thin)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(load_surface(&thin).unwrap().is_closed_manifold());

    let tets = dir.path().join("cube.msh");
    save_tet_mesh(&unit_cube_tets(), &tets).unwrap();
    let hull = dir.path().join("hull.off");
    let out = meshing(&["boundary", &arg(&tets), &arg(&hull)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(load_surface(&hull).unwrap().faces.len(), 12);
}

#[test]
fn empty_volume_fails_with_reason() {
    let dir = tempdir().unwrap();
    let header = dir.path().join("empty.dat");
    save_volume(&VoxelVolume::filled((3, 3, 3), 0), &header).unwrap();

    let out = meshing(&["run", &arg(&header)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("no voxels above threshold"));
}

#[test]
fn config_prints_json() {
    let out = meshing(&["config", "--preset", "high-quality"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["tet"]["optimize"], serde_json::Value::Bool(true));
    assert_eq!(json["max_grid_cells"], serde_json::json!(256 * 256 * 256));
}
