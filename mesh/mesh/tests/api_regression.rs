//! API Regression Tests for the Meshing Crate Ecosystem
//!
//! These tests serve as a regression suite to ensure the public API remains
//! stable and consistent across the mesh crates. They are organized in 4
//! tiers following the pipeline:
//!
//! - Tier 1: Foundation (mesh-types, mesh-grid)
//! - Tier 2: Volumetric Stages (mesh-dexel, mesh-isosurface)
//! - Tier 3: Distance Fields and Tetrahedra (mesh-sdf, mesh-tet)
//! - Tier 4: Orchestration and I/O (mesh-pipeline, mesh-io)
//!
//! If any of these tests fail after API changes, it indicates a breaking change
//! that needs documentation in CHANGELOG.md and a version bump.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]

use mesh::{prelude::*, types};

// =============================================================================
// TIER 1: Foundation - Basic Types and Grids
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn vertex_and_mesh_construction() {
        let vertices = vec![
            types::Vertex::from_coords(0.0, 0.0, 0.0),
            types::Vertex::from_coords(1.0, 0.0, 0.0),
            types::Vertex::from_coords(0.0, 1.0, 0.0),
        ];
        let mesh = types::IndexedMesh::from_parts(vertices, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        // A single triangle is open.
        assert!(!mesh.is_closed_manifold());
        assert_eq!(mesh.boundary_edge_count(), 3);
    }

    #[test]
    fn unit_cube_primitives() {
        let cube = types::unit_cube();
        assert_eq!(cube.face_count(), 12);
        assert!(cube.is_closed_manifold());
        assert!((cube.signed_volume() - 1.0).abs() < 1e-12);

        let bounds = cube.bounds();
        assert!((bounds.max.x - 1.0).abs() < f64::EPSILON);

        let tets = types::unit_cube_tets();
        assert_eq!(tets.tet_count(), 5);
        assert!(tets.min_volume() > 0.0);
        assert!((tets.total_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tet_face_winding() {
        assert_eq!(types::TET_FACES.len(), 4);
        let tets = types::unit_cube_tets();
        let corners = tets.tets[4];
        // Every face of a positive tet faces away from the corner it omits.
        for face in tets.faces(4) {
            let opposite = corners.iter().find(|&&v| !face.contains(&v)).unwrap();
            let [a, b, c] = face.map(|v| tets.vertices[v as usize]);
            let d = tets.vertices[*opposite as usize];
            assert!((b - a).cross(&(c - a)).dot(&(d - a)) < 0.0);
        }
    }

    #[test]
    fn grid_field_halo_contract() {
        let volume = VoxelVolume::filled((2, 3, 4), 1);
        let field = GridField::from_volume(&volume, 0.5);
        assert_eq!(field.dimensions(), (4, 5, 6));
        assert!(field.has_sentinel_halo());
        assert_eq!(field.count_above(0.0), 24);
    }

    #[test]
    fn grid_budget_reports_dimensions() {
        let err = mesh::grid::check_grid_size((100, 100, 100), 1000).unwrap_err();
        assert!(err.to_string().contains("(100, 100, 100)"));
    }
}

// =============================================================================
// TIER 2: Volumetric Stages - Dexels and Isosurfaces
// =============================================================================

mod tier2_volumetric {
    use super::*;

    fn block() -> GridField {
        GridField::from_volume(&VoxelVolume::filled((3, 3, 3), 1), 0.5)
    }

    #[test]
    fn dexel_round_trip() {
        let field = block();
        let dexels = DexelVolume::from_grid(&field).unwrap();
        let back = dexels.to_grid_field(1, usize::MAX).unwrap();
        assert_eq!(back.count_above(0.0), field.count_above(0.0));
    }

    #[test]
    fn dilation_config_builder_pattern() {
        let config = DilationConfig::default()
            .with_radius(2.0)
            .with_samples_per_cell(3)
            .with_parallel(false);
        assert!((config.radius - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.samples_per_cell, 3);
        assert_eq!(DilationConfig::none().radius, 0.0);
    }

    #[test]
    fn dilation_laws() {
        let dexels = DexelVolume::from_grid(&block()).unwrap();
        assert_eq!(dilate(&dexels, 0.0).unwrap(), dexels);

        let grown = dilate(&dexels, 1.0).unwrap();
        assert!(grown.solid_volume() > dexels.solid_volume());
        assert_eq!(dilate(&grown, 0.0).unwrap(), grown);
        assert!(dilate(&dexels, -1.0).is_err());
    }

    #[test]
    fn marching_cubes_closed_output() {
        let surface = marching_cubes(&block(), &MarchingCubesConfig::default()).unwrap();
        assert!(surface.is_closed_manifold());
        assert!(surface.is_consistently_oriented());
        assert!(surface.signed_volume() > 0.0);
    }

    #[test]
    fn component_filter() {
        let mut mesh = types::unit_cube();
        let analysis = mesh::isosurface::find_connected_components(&mesh);
        assert_eq!(analysis.component_count, 1);
        assert_eq!(mesh::isosurface::keep_largest_component(&mut mesh), 0);
    }
}

// =============================================================================
// TIER 3: Distance Fields and Tetrahedra
// =============================================================================

mod tier3_fields_and_tets {
    use super::*;
    use mesh::sdf::SdfError;
    use mesh::tet::TetError;

    #[test]
    fn cube_sdf_sign_and_distance() {
        let config = SdfConfig::default().with_cell_size(0.125);
        let sdf = build_sdf(&types::unit_cube(), &config).unwrap();
        let centre = sdf.evaluate(&types::Point3::new(0.5, 0.5, 0.5));
        assert!((centre + 0.5).abs() < 1e-9);

        let far = sdf.evaluate(&types::Point3::new(4.0, 0.5, 0.5));
        assert!((far - 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_surface_rejected() {
        let err = build_sdf(&IndexedMesh::new(), &SdfConfig::default()).unwrap_err();
        assert_eq!(err, SdfError::EmptySurface);
    }

    #[test]
    fn stuffing_a_sphere() {
        let sdf = SignedDistanceField::from_fn(types::Point3::new(-3.0, -3.0, -3.0), 0.5, (13, 13, 13), |p| {
            p.coords.norm() - 2.0
        })
        .unwrap();
        let tets = tetrahedralize(&sdf).unwrap();
        assert!(tets.min_volume() > 0.0);

        let surface = boundary(&tets).unwrap();
        assert!(surface.is_closed_manifold());
        assert!(surface.is_consistently_oriented());
    }

    #[test]
    fn tet_config_presets() {
        let config = TetConfig::default();
        assert!(!config.optimize && !config.feature_preservation);
        let refined = TetConfig::refined();
        assert!(refined.optimize && refined.feature_preservation);
    }

    #[test]
    fn cube_boundary_is_twelve_triangles() {
        let surface = boundary(&types::unit_cube_tets()).unwrap();
        assert_eq!(surface.face_count(), 12);
        assert!(surface.is_closed_manifold());
    }

    #[test]
    fn duplicated_tet_reported() {
        let mut tets = types::unit_cube_tets();
        tets.tets.push(tets.tets[0]);
        assert!(matches!(
            boundary(&tets),
            Err(TetError::NonManifoldFace { count: 3, .. })
        ));
    }
}

// =============================================================================
// TIER 4: Orchestration and I/O
// =============================================================================

mod tier4_orchestration {
    use super::*;
    use tempfile::tempdir;

    fn quick_config() -> PipelineConfig {
        PipelineConfig::default()
            .with_dilation_radius(0.0)
            .with_sdf_cell_size(0.5)
    }

    #[test]
    fn synchronous_run() {
        let volume = VoxelVolume::filled((4, 4, 4), 1);
        let stages = StageCell::new();
        let output = run_pipeline(&volume, &quick_config(), &stages, &CancelFlag::new()).unwrap();
        assert_eq!(stages.get(), PipelineStage::Done);
        assert!(output.boundary.is_closed_manifold());
        assert_eq!(output.stats().boundary_edges, 0);
    }

    #[test]
    fn background_job() {
        let mut job = MeshingJob::spawn(VoxelVolume::filled((3, 3, 3), 1), quick_config()).unwrap();
        assert_eq!(job.wait(), PipelineStage::Done);
        let output: MeshingOutput = job.take_output().unwrap();
        assert!(output.tets.min_volume() > 0.0);
    }

    #[test]
    fn format_detection() {
        assert_eq!(MeshFormat::from_path("a.off"), Some(MeshFormat::Off));
        assert_eq!(MeshFormat::from_path("a.msh"), Some(MeshFormat::Msh));
        assert_eq!(MeshFormat::from_path("a.dat"), Some(MeshFormat::Volume));
        assert_eq!(MeshFormat::from_path("a.stl"), None);
    }

    #[test]
    fn files_feed_the_secondary_flow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.msh");
        save_tet_mesh(&types::unit_cube_tets(), &path).unwrap();

        let mut tets = load_tet_mesh(&path).unwrap();
        let surface = mesh::pipeline::boundary_only(&mut tets).unwrap();
        assert_eq!(surface.face_count(), 12);

        let off = dir.path().join("cube.off");
        save_surface(&surface, &off).unwrap();
        assert_eq!(load_surface(&off).unwrap(), surface);
    }

    #[test]
    fn volume_file_to_mesh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.dat");
        mesh::io::save_volume(&VoxelVolume::filled((3, 3, 3), 255), &path).unwrap();

        let volume = load_volume(&path).unwrap();
        let surface = mesh::pipeline::extract_thin_surface(&volume, &quick_config()).unwrap();
        assert!(surface.is_closed_manifold());
    }
}
