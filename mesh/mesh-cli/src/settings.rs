//! Pipeline configuration from JSON files and flags.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use mesh_pipeline::PipelineConfig;

/// Named starting configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Settings of the standard meshing run
    Default,
    /// Coarse and fast
    Preview,
    /// Fine sampling with tetrahedral post-processing
    HighQuality,
}

impl Preset {
    pub fn config(self) -> PipelineConfig {
        match self {
            Self::Default => PipelineConfig::default(),
            Self::Preview => PipelineConfig::preview(),
            Self::HighQuality => PipelineConfig::high_quality(),
        }
    }
}

/// Flags shared by the commands that run pipeline stages.
///
/// Flags override values loaded from `--config`, which override the preset.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// JSON file holding a pipeline configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Starting configuration when no file is given
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// Voxels above this value are solid
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Dilation radius in voxels
    #[arg(long)]
    pub radius: Option<f64>,

    /// Distance field cell size in voxels
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// Maximum samples in any grid
    #[arg(long)]
    pub max_grid_cells: Option<usize>,

    /// Smooth interior tetrahedra
    #[arg(long)]
    pub optimize: bool,

    /// Project boundary vertices onto the surface
    #[arg(long)]
    pub feature_preservation: bool,

    /// Keep every surface component instead of the largest
    #[arg(long)]
    pub keep_all_components: bool,

    /// Run every stage on one thread
    #[arg(long)]
    pub sequential: bool,
}

impl PipelineArgs {
    /// Build the configuration these flags describe.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => self.preset.config(),
        };

        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(radius) = self.radius {
            if radius < 0.0 {
                bail!("Dilation radius must not be negative, got {radius}");
            }
            config.dilation.radius = radius;
        }
        if let Some(cell_size) = self.cell_size {
            config.sdf.cell_size = cell_size;
        }
        if let Some(max) = self.max_grid_cells {
            config.max_grid_cells = max;
        }
        config.tet.optimize |= self.optimize;
        config.tet.feature_preservation |= self.feature_preservation;
        if self.keep_all_components {
            config.keep_largest_component = false;
        }
        if self.sequential {
            config = config.with_parallel(false);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: PipelineArgs,
    }

    fn parse(args: &[&str]) -> PipelineArgs {
        Harness::parse_from(std::iter::once("meshing").chain(args.iter().copied())).args
    }

    #[test]
    fn defaults_resolve_to_default_config() {
        assert_eq!(parse(&[]).resolve().unwrap(), PipelineConfig::default());
    }

    #[test]
    fn flags_override_preset() {
        let config = parse(&[
            "--preset",
            "preview",
            "--radius",
            "1.5",
            "--cell-size",
            "0.4",
            "--optimize",
            "--keep-all-components",
            "--sequential",
        ])
        .resolve()
        .unwrap();
        assert_eq!(config.dilation.radius, 1.5);
        assert_eq!(config.sdf.cell_size, 0.4);
        assert!(config.tet.optimize);
        assert!(!config.keep_largest_component);
        assert!(!config.sdf.parallel && !config.dilation.parallel);
        assert_eq!(config.dilation.samples_per_cell, 1);
    }

    #[test]
    fn negative_radius_rejected() {
        assert!(parse(&["--radius=-1"]).resolve().is_err());
    }

    #[test]
    fn partial_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "threshold": 10.0, "dilation": { "radius": 2.0 } }"#).unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let config = parse(&["--config", &path_arg, "--cell-size", "1.0"]).resolve().unwrap();
        assert_eq!(config.threshold, 10.0);
        assert_eq!(config.dilation.radius, 2.0);
        assert_eq!(config.dilation.samples_per_cell, 2);
        assert_eq!(config.sdf.cell_size, 1.0);
    }

    #[test]
    fn missing_config_file_has_context() {
        let err = parse(&["--config", "/nonexistent/config.json"]).resolve().unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
