//! End-to-end runs from voxel volumes to tetrahedral meshes.

use approx::assert_relative_eq;
use mesh_dexel::DilationConfig;
use mesh_grid::VoxelVolume;
use mesh_pipeline::{
    run_pipeline, CancelFlag, MeshingJob, PipelineConfig, PipelineError, PipelineStage, StageCell,
};
use mesh_tet::TetConfig;
use mesh_types::MeshBounds;

fn undilated() -> PipelineConfig {
    PipelineConfig {
        dilation: DilationConfig::none(),
        ..PipelineConfig::default()
    }
    .with_sdf_cell_size(0.5)
}

#[test]
fn solid_block_gives_a_closed_box() {
    let volume = VoxelVolume::filled((4, 4, 4), 1);
    let stages = StageCell::new();
    let output = run_pipeline(&volume, &undilated(), &stages, &CancelFlag::new()).unwrap();
    assert_eq!(stages.get(), PipelineStage::Done);

    // Voxel centres sit on 0..=3, so the solid spans [-0.5, 3.5]. Marching
    // cubes bevels the edges and corners slightly.
    assert!(output.surface.is_closed_manifold());
    let enclosed = output.surface.signed_volume();
    assert!(enclosed > 60.0 && enclosed < 64.0);

    let boundary = &output.boundary;
    assert!(boundary.is_closed_manifold());
    assert!(boundary.is_consistently_oriented());
    let bounds = boundary.bounds();
    for axis in 0..3 {
        assert!(bounds.min[axis] > -1.0 && bounds.min[axis] < 0.0);
        assert!(bounds.max[axis] > 3.0 && bounds.max[axis] < 4.0);
    }

    let stats = output.stats();
    assert!(output.tets.min_volume() > 0.0);
    assert_eq!(stats.boundary_edges, 0);
    assert!(stats.total_volume > 0.8 * 64.0 && stats.total_volume < 1.05 * 64.0);
    assert_relative_eq!(boundary.signed_volume(), stats.total_volume, epsilon = 1e-6);
}

#[test]
fn dilation_grows_the_result() {
    let volume = VoxelVolume::from_fn((5, 5, 5), |x, y, z| {
        u8::from([x, y, z].iter().all(|c| (1..4).contains(c)))
    });
    let thin = run_pipeline(&volume, &undilated(), &StageCell::new(), &CancelFlag::new()).unwrap();
    let fat = run_pipeline(
        &volume,
        &undilated().with_dilation_radius(1.5),
        &StageCell::new(),
        &CancelFlag::new(),
    )
    .unwrap();

    assert!(fat.surface.signed_volume() > thin.surface.signed_volume());
    assert!(fat.stats().total_volume > thin.stats().total_volume);
    assert!(fat.boundary.is_closed_manifold());
}

#[test]
fn default_configuration_meshes_a_ball() {
    let volume = VoxelVolume::from_fn((7, 7, 7), |x, y, z| {
        let d2 = [x, y, z].iter().map(|&c| (c as i32 - 3).pow(2)).sum::<i32>();
        u8::from(d2 <= 4)
    });
    let output = run_pipeline(
        &volume,
        &PipelineConfig::default(),
        &StageCell::new(),
        &CancelFlag::new(),
    )
    .unwrap();
    assert!(output.boundary.is_closed_manifold());
    assert!(output.boundary.is_consistently_oriented());
    assert!(output.tets.min_volume() > 0.0);
}

#[test]
fn refined_passes_keep_tets_valid() {
    let volume = VoxelVolume::filled((3, 3, 3), 1);
    let config = undilated().with_tet(TetConfig::refined());
    let output = run_pipeline(&volume, &config, &StageCell::new(), &CancelFlag::new()).unwrap();
    assert!(output.tets.min_volume() > 0.0);
    assert!(output.boundary.is_closed_manifold());
}

#[test]
fn separate_blobs_keep_only_the_largest() {
    let volume = VoxelVolume::from_fn((9, 3, 3), |x, _, _| u8::from(x < 4 || x == 7));
    let config = undilated();
    let output = run_pipeline(&volume, &config, &StageCell::new(), &CancelFlag::new()).unwrap();
    let bounds = output.surface.bounds();
    assert!(bounds.max.x < 4.0);

    let both = run_pipeline(
        &volume,
        &config.with_keep_largest_component(false),
        &StageCell::new(),
        &CancelFlag::new(),
    )
    .unwrap();
    assert!(both.surface.bounds().max.x > 7.0);
}

#[test]
fn stage_errors_surface_through_the_job() {
    let volume = VoxelVolume::filled((3, 3, 3), 1);
    let config = undilated().with_tet(TetConfig::default().with_thresholds(0.7, 0.3));
    let mut job = MeshingJob::spawn(volume, config).unwrap();
    assert_eq!(job.wait(), PipelineStage::Failed);
    assert!(matches!(job.failure(), Some(PipelineError::Tet(_))));
}
