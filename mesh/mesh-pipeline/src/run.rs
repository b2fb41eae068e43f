//! Synchronous pipeline runs.

use mesh_dexel::{dilate_with, DexelVolume};
use mesh_grid::{check_grid_size, GridField, VoxelVolume};
use mesh_isosurface::{keep_largest_component, marching_cubes};
use mesh_sdf::{SdfBuilder, SignedDistanceField};
use mesh_tet::{boundary, check_indices, tetrahedralize_with, validate_volumes};
use mesh_types::{IndexedMesh, TetMesh};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::stage::{CancelFlag, PipelineStage, StageCell};
use crate::stats::MeshStats;

/// Surfaces with fewer vertices or faces than this cannot enclose a volume.
const MIN_SURFACE_ELEMENTS: usize = 4;

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshingOutput {
    /// Surface extracted from the dilated volume.
    pub surface: IndexedMesh,
    /// Tetrahedral mesh of the surface's interior.
    pub tets: TetMesh,
    /// Boundary surface of the tetrahedral mesh.
    pub boundary: IndexedMesh,
}

impl MeshingOutput {
    /// Summary counts and volumes of the result.
    #[must_use]
    pub fn stats(&self) -> MeshStats {
        MeshStats::from_meshes(&self.tets, &self.boundary)
    }
}

/// Run the full pipeline on the calling thread.
///
/// The stage cell tracks progress and ends in [`PipelineStage::Done`] or
/// [`PipelineStage::Failed`]. Cancellation is checked before each stage.
///
/// # Errors
///
/// Returns [`PipelineError::Cancelled`] if `cancel` is set before a stage
/// starts, and the first stage error otherwise.
///
/// # Example
///
/// ```
/// use mesh_grid::VoxelVolume;
/// use mesh_pipeline::{run_pipeline, CancelFlag, PipelineConfig, PipelineStage, StageCell};
///
/// let volume = VoxelVolume::filled((3, 3, 3), 1);
/// let config = PipelineConfig::default().with_dilation_radius(1.0);
/// let stages = StageCell::new();
///
/// let output = run_pipeline(&volume, &config, &stages, &CancelFlag::new()).unwrap();
/// assert_eq!(stages.get(), PipelineStage::Done);
/// assert!(output.boundary.is_closed_manifold());
/// ```
pub fn run_pipeline(
    volume: &VoxelVolume,
    config: &PipelineConfig,
    stages: &StageCell,
    cancel: &CancelFlag,
) -> PipelineResult<MeshingOutput> {
    let result = run_stages(volume, config, stages, cancel);
    finish(&result, stages);
    result
}

/// Run every stage without publishing a terminal stage.
pub(crate) fn run_stages(
    volume: &VoxelVolume,
    config: &PipelineConfig,
    stages: &StageCell,
    cancel: &CancelFlag,
) -> PipelineResult<MeshingOutput> {
    enter(PipelineStage::Dilating, stages, cancel)?;
    let dexels = dilate_volume(volume, config)?;

    enter(PipelineStage::ExtractingSurface, stages, cancel)?;
    let surface = extract_surface(&dexels, config)?;
    drop(dexels);

    enter(PipelineStage::BuildingSdf, stages, cancel)?;
    let sdf = build_field(&surface, config)?;

    enter(PipelineStage::Tetrahedralizing, stages, cancel)?;
    let tets = tetrahedralize_with(&sdf, &config.tet)?;
    drop(sdf);

    enter(PipelineStage::ExtractingBoundary, stages, cancel)?;
    let boundary = boundary(&tets)?;

    Ok(MeshingOutput {
        surface,
        tets,
        boundary,
    })
}

/// Publish the terminal stage for a finished run.
pub(crate) fn finish<T>(result: &PipelineResult<T>, stages: &StageCell) {
    match result {
        Ok(_) => {
            stages.set(PipelineStage::Done);
            info!("pipeline done");
        }
        Err(err) => {
            warn!(stage = %stages.get(), error = %err, "pipeline failed");
            stages.set(PipelineStage::Failed);
        }
    }
}

fn enter(stage: PipelineStage, stages: &StageCell, cancel: &CancelFlag) -> PipelineResult<()> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    stages.set(stage);
    info!(%stage, "entering stage");
    Ok(())
}

/// Threshold a volume into a halo-padded field, enforcing the grid budget.
fn volume_field(volume: &VoxelVolume, config: &PipelineConfig) -> PipelineResult<GridField> {
    let (w, h, d) = volume.dimensions();
    check_grid_size((w + 2, h + 2, d + 2), config.max_grid_cells)?;
    let field = GridField::from_volume(volume, config.threshold);
    if field.count_above(0.0) == 0 {
        return Err(PipelineError::EmptyVolume {
            threshold: config.threshold,
        });
    }
    Ok(field)
}

/// Encode the solid voxels as dexels and dilate them.
///
/// # Errors
///
/// Fails on an empty or oversized volume and on dilation errors.
pub fn dilate_volume(volume: &VoxelVolume, config: &PipelineConfig) -> PipelineResult<DexelVolume> {
    let field = volume_field(volume, config)?;
    let dexels = DexelVolume::from_grid(&field)?;
    let fat = dilate_with(&dexels, &config.dilation_config())?;
    debug!(
        radius = config.dilation.radius,
        before = dexels.solid_volume(),
        after = fat.solid_volume(),
        "dilated volume"
    );
    Ok(fat)
}

/// Resample dexels and extract their surface.
///
/// # Errors
///
/// Fails if the resampled grid exceeds the budget, extraction fails, or
/// the surface is too small to enclose anything.
pub fn extract_surface(dexels: &DexelVolume, config: &PipelineConfig) -> PipelineResult<IndexedMesh> {
    let field = dexels.to_grid_field(config.dilation.samples_per_cell, config.max_grid_cells)?;
    surface_of(&field, config)
}

/// Marching cubes directly on the thresholded volume, without dilation.
///
/// # Errors
///
/// Fails on an empty or oversized volume, and if the surface is too small
/// to enclose anything.
///
/// # Example
///
/// ```
/// use mesh_grid::VoxelVolume;
/// use mesh_pipeline::{extract_thin_surface, PipelineConfig};
///
/// let volume = VoxelVolume::filled((2, 2, 2), 1);
/// let surface = extract_thin_surface(&volume, &PipelineConfig::default()).unwrap();
/// assert!(surface.is_closed_manifold());
/// ```
pub fn extract_thin_surface(volume: &VoxelVolume, config: &PipelineConfig) -> PipelineResult<IndexedMesh> {
    let field = volume_field(volume, config)?;
    surface_of(&field, config)
}

fn surface_of(field: &GridField, config: &PipelineConfig) -> PipelineResult<IndexedMesh> {
    let mut surface = marching_cubes(field, &config.marching_cubes)?;
    if config.keep_largest_component {
        keep_largest_component(&mut surface);
    }
    if surface.vertices.len() < MIN_SURFACE_ELEMENTS || surface.faces.len() < MIN_SURFACE_ELEMENTS {
        return Err(PipelineError::EmptySurface {
            vertices: surface.vertices.len(),
            faces: surface.faces.len(),
        });
    }
    debug!(
        vertices = surface.vertices.len(),
        faces = surface.faces.len(),
        "extracted surface"
    );
    Ok(surface)
}

/// Sample the signed distance field of a closed surface.
///
/// # Errors
///
/// See [`SdfBuilder::build`].
pub fn build_field(surface: &IndexedMesh, config: &PipelineConfig) -> PipelineResult<SignedDistanceField> {
    Ok(SdfBuilder::new(config.sdf_config()).build(surface)?)
}

/// Boundary surface of an externally produced tetrahedral mesh.
///
/// Inverted tetrahedra are flipped in place first, since other tools do
/// not share this crate's orientation.
///
/// # Errors
///
/// - [`TetError::InvalidIndex`](mesh_tet::TetError::InvalidIndex) for a
///   reference to a missing vertex
/// - [`TetError::DegenerateTetrahedron`](mesh_tet::TetError::DegenerateTetrahedron)
///   for a zero-volume tetrahedron
/// - [`TetError::NonManifoldFace`](mesh_tet::TetError::NonManifoldFace) for
///   a face shared by more than two tetrahedra
pub fn boundary_only(tets: &mut TetMesh) -> PipelineResult<IndexedMesh> {
    check_indices(tets)?;
    let flipped = tets.orient_positive();
    if flipped > 0 {
        warn!(flipped, total = tets.tet_count(), "flipped inverted tetrahedra");
    }
    validate_volumes(tets)?;
    Ok(boundary(tets)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_dexel::{DexelError, DilationConfig};
    use mesh_grid::GridError;
    use mesh_tet::TetError;
    use mesh_types::unit_cube_tets;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            dilation: DilationConfig::none(),
            ..PipelineConfig::default()
        }
        .with_sdf_cell_size(0.5)
    }

    #[test]
    fn stages_end_in_done() {
        let stages = StageCell::new();
        let volume = VoxelVolume::filled((2, 2, 2), 1);
        let output = run_pipeline(&volume, &small_config(), &stages, &CancelFlag::new()).unwrap();
        assert_eq!(stages.get(), PipelineStage::Done);
        assert!(output.surface.is_closed_manifold());
        assert!(output.tets.min_volume() > 0.0);
    }

    #[test]
    fn cancelled_run_fails_before_work() {
        let stages = StageCell::new();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let volume = VoxelVolume::filled((2, 2, 2), 1);
        let result = run_pipeline(&volume, &small_config(), &stages, &cancel);
        assert_eq!(result, Err(PipelineError::Cancelled));
        assert_eq!(stages.get(), PipelineStage::Failed);
    }

    #[test]
    fn empty_volume_is_reported() {
        let stages = StageCell::new();
        let volume = VoxelVolume::filled((3, 3, 3), 0);
        let result = run_pipeline(&volume, &small_config(), &stages, &CancelFlag::new());
        assert!(matches!(result, Err(PipelineError::EmptyVolume { .. })));
        assert_eq!(stages.get(), PipelineStage::Failed);
    }

    #[test]
    fn oversized_volume_is_reported_with_dimensions() {
        let volume = VoxelVolume::filled((10, 10, 10), 1);
        let config = small_config().with_max_grid_cells(1000);
        assert_eq!(
            dilate_volume(&volume, &config).unwrap_err(),
            PipelineError::Grid(GridError::GridTooLarge {
                dims: (12, 12, 12),
                limit: 1000
            })
        );
    }

    #[test]
    fn dilation_stays_within_grid_budget() {
        let volume = VoxelVolume::filled((2, 2, 2), 1);
        let config = small_config()
            .with_dilation_radius(40.0)
            .with_max_grid_cells(1000);
        assert_eq!(
            dilate_volume(&volume, &config).unwrap_err(),
            PipelineError::Dexel(DexelError::Grid(GridError::GridTooLarge {
                dims: (82, 82, 82),
                limit: 1000
            }))
        );

        let stages = StageCell::new();
        let huge = small_config().with_dilation_radius(3e6);
        let result = run_pipeline(&volume, &huge, &stages, &CancelFlag::new());
        assert!(matches!(result, Err(PipelineError::Dexel(DexelError::Grid(_)))));
        assert_eq!(stages.get(), PipelineStage::Failed);
    }

    #[test]
    fn thin_surface_is_the_voxel_hull() {
        let volume = VoxelVolume::filled((3, 2, 2), 1);
        let surface = extract_thin_surface(&volume, &small_config()).unwrap();
        assert!(surface.is_closed_manifold());
        assert!(surface.is_consistently_oriented());
        assert!(surface.signed_volume() > 0.0);
    }

    #[test]
    fn boundary_only_repairs_orientation() {
        let mut tets = unit_cube_tets();
        tets.tets[0].swap(1, 2);
        let surface = boundary_only(&mut tets).unwrap();
        assert!(tets.min_volume() > 0.0);
        assert_eq!(surface.faces.len(), 12);
        assert!(surface.is_closed_manifold());
    }

    #[test]
    fn boundary_only_rejects_bad_indices() {
        let mut tets = unit_cube_tets();
        tets.tets.push([0, 1, 2, 42]);
        assert!(matches!(
            boundary_only(&mut tets),
            Err(PipelineError::Tet(TetError::InvalidIndex { vertex: 42, .. }))
        ));
    }
}
