//! Pipeline configuration.

use mesh_dexel::DilationConfig;
use mesh_isosurface::MarchingCubesConfig;
use mesh_sdf::SdfConfig;
use mesh_tet::TetConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default cap on the number of samples in any grid the pipeline allocates.
pub const DEFAULT_MAX_GRID_CELLS: usize = 256 * 256 * 256;

/// Configuration for a full meshing run.
///
/// Stage configurations are used as given except for their grid limits,
/// which are replaced by [`PipelineConfig::max_grid_cells`] so one budget
/// guards every allocation.
///
/// # Example
///
/// ```
/// use mesh_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default()
///     .with_dilation_radius(2.0)
///     .with_sdf_cell_size(0.5);
///
/// assert!((config.dilation.radius - 2.0).abs() < f64::EPSILON);
/// assert!(config.keep_largest_component);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Voxels with a value above this are solid. Default: 0.5.
    pub threshold: f64,
    /// Dilation radius and resampling density.
    pub dilation: DilationConfig,
    /// Isosurface extraction.
    pub marching_cubes: MarchingCubesConfig,
    /// Keep only the largest connected part of the extracted surface.
    pub keep_largest_component: bool,
    /// Distance field sampling.
    pub sdf: SdfConfig,
    /// Tetrahedralization.
    pub tet: TetConfig,
    /// Upper bound on the samples of any grid. Default: 256³.
    pub max_grid_cells: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            dilation: DilationConfig::default(),
            marching_cubes: MarchingCubesConfig::default(),
            keep_largest_component: true,
            sdf: SdfConfig::default(),
            tet: TetConfig::default(),
            max_grid_cells: DEFAULT_MAX_GRID_CELLS,
        }
    }
}

impl PipelineConfig {
    /// Fast, coarse settings for previews.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            dilation: DilationConfig::default().with_samples_per_cell(1),
            sdf: SdfConfig::default().with_cell_size(1.5),
            ..Self::default()
        }
    }

    /// Fine sampling with both optional tetrahedral passes.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            sdf: SdfConfig::fine(),
            tet: TetConfig::refined(),
            ..Self::default()
        }
    }

    /// Set the solid threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the dilation radius.
    #[must_use]
    pub const fn with_dilation_radius(mut self, radius: f64) -> Self {
        self.dilation.radius = radius;
        self
    }

    /// Set the distance field cell size.
    #[must_use]
    pub const fn with_sdf_cell_size(mut self, cell_size: f64) -> Self {
        self.sdf.cell_size = cell_size;
        self
    }

    /// Set the tetrahedralization configuration.
    #[must_use]
    pub fn with_tet(mut self, tet: TetConfig) -> Self {
        self.tet = tet;
        self
    }

    /// Enable or disable the largest-component filter.
    #[must_use]
    pub const fn with_keep_largest_component(mut self, keep: bool) -> Self {
        self.keep_largest_component = keep;
        self
    }

    /// Set the grid budget.
    #[must_use]
    pub const fn with_max_grid_cells(mut self, max_grid_cells: usize) -> Self {
        self.max_grid_cells = max_grid_cells;
        self
    }

    /// Enable or disable rayon in every stage that supports it.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.dilation.parallel = parallel;
        self.sdf.parallel = parallel;
        self
    }

    /// Dilation configuration with the pipeline's grid budget applied.
    #[must_use]
    pub fn dilation_config(&self) -> DilationConfig {
        self.dilation.clone().with_max_grid_cells(self.max_grid_cells)
    }

    /// Distance field configuration with the pipeline's grid budget applied.
    #[must_use]
    pub fn sdf_config(&self) -> SdfConfig {
        self.sdf.clone().with_max_grid_cells(self.max_grid_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_meshing_stage() {
        let config = PipelineConfig::default();
        assert!((config.dilation.radius - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.dilation.samples_per_cell, 2);
        assert!((config.sdf.cell_size - 0.8).abs() < f64::EPSILON);
        assert!(!config.tet.optimize);
        assert!(!config.tet.feature_preservation);
        assert_eq!(config.max_grid_cells, 256 * 256 * 256);
    }

    #[test]
    fn grid_budget_reaches_sdf() {
        let config = PipelineConfig::default().with_max_grid_cells(1000);
        assert_eq!(config.sdf_config().max_grid_cells, 1000);
        assert_eq!(config.sdf.max_grid_cells, DEFAULT_MAX_GRID_CELLS);
        assert_eq!(config.dilation_config().max_grid_cells, 1000);
    }

    #[test]
    fn parallel_switch_covers_stages() {
        let config = PipelineConfig::default().with_parallel(false);
        assert!(!config.dilation.parallel);
        assert!(!config.sdf.parallel);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        let config = PipelineConfig::high_quality()
            .with_dilation_radius(1.5)
            .with_max_grid_cells(4096);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<PipelineConfig>(&json).unwrap(), config);

        // Missing fields fall back to their defaults at every level.
        let partial: PipelineConfig =
            serde_json::from_str(r#"{ "dilation": { "radius": 2.0 }, "tet": {} }"#).unwrap();
        assert_eq!(partial, PipelineConfig::default().with_dilation_radius(2.0));
    }

    #[test]
    fn presets() {
        assert!(PipelineConfig::preview().sdf.cell_size > PipelineConfig::default().sdf.cell_size);
        let hq = PipelineConfig::high_quality();
        assert!(hq.tet.optimize && hq.tet.feature_preservation);
    }
}
