//! Command implementations.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use mesh_io::{load_tet_mesh, load_volume, save_surface, save_tet_mesh, MeshFormat};
use mesh_pipeline::{boundary_only, extract_thin_surface, MeshStats, MeshingJob, PipelineStage};
use tracing::info;

use crate::settings::{PipelineArgs, Preset};

/// Interval between progress checks on a running job.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Output path next to `input` with the extension of `format`.
fn sibling(input: &Path, format: MeshFormat) -> PathBuf {
    input.with_extension(format.extension())
}

pub fn run(
    volume_path: &Path,
    tets_path: Option<PathBuf>,
    surface_path: Option<PathBuf>,
    fat_surface_path: Option<PathBuf>,
    args: &PipelineArgs,
) -> Result<()> {
    let config = args.resolve()?;
    let tets_path = tets_path.unwrap_or_else(|| sibling(volume_path, MeshFormat::Msh));
    let surface_path = surface_path.unwrap_or_else(|| sibling(volume_path, MeshFormat::Off));

    let volume = load_volume(volume_path)
        .with_context(|| format!("Failed to load volume {}", volume_path.display()))?;
    info!(
        dims = ?volume.dimensions(),
        solid = volume.solid_count(),
        "loaded volume"
    );

    let start = Instant::now();
    let mut job = MeshingJob::spawn(volume, config)?;
    let mut last = PipelineStage::Idle;
    while !job.is_finished() {
        let stage = job.stage();
        if stage != last {
            info!(stage = %stage, elapsed = ?start.elapsed(), "progress");
            last = stage;
        }
        thread::sleep(POLL_INTERVAL);
    }

    if job.wait() != PipelineStage::Done {
        let reason = job
            .failure()
            .map_or_else(|| "unknown failure".to_string(), |e| e.to_string());
        bail!("Meshing failed: {reason}");
    }
    let Some(output) = job.take_output() else {
        bail!("Meshing finished without output");
    };
    info!(elapsed = ?start.elapsed(), "meshing finished");

    save_tet_mesh(&output.tets, &tets_path)
        .with_context(|| format!("Failed to write {}", tets_path.display()))?;
    save_surface(&output.boundary, &surface_path)
        .with_context(|| format!("Failed to write {}", surface_path.display()))?;
    if let Some(path) = fat_surface_path {
        save_surface(&output.surface, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    println!("{}", output.stats());
    println!("wrote {} and {}", tets_path.display(), surface_path.display());
    Ok(())
}

pub fn surface(volume_path: &Path, output: &Path, args: &PipelineArgs) -> Result<()> {
    let config = args.resolve()?;
    let volume = load_volume(volume_path)
        .with_context(|| format!("Failed to load volume {}", volume_path.display()))?;
    let surface = extract_thin_surface(&volume, &config)?;
    save_surface(&surface, output).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", MeshStats::from_surface(&surface));
    Ok(())
}

pub fn boundary(tets_path: &Path, output: &Path) -> Result<()> {
    let mut tets = load_tet_mesh(tets_path)
        .with_context(|| format!("Failed to load tetrahedra {}", tets_path.display()))?;
    let surface = boundary_only(&mut tets)?;
    save_surface(&surface, output).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", MeshStats::from_meshes(&tets, &surface));
    Ok(())
}

pub fn print_config(preset: Preset) -> Result<()> {
    let json = serde_json::to_string_pretty(&preset.config())?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_outputs_sit_next_to_the_volume() {
        let input = Path::new("/data/scan.dat");
        assert_eq!(sibling(input, MeshFormat::Msh), PathBuf::from("/data/scan.msh"));
        assert_eq!(sibling(input, MeshFormat::Off), PathBuf::from("/data/scan.off"));
    }
}
