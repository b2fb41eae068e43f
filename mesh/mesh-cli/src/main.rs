//! Voxel-to-tetrahedral meshing from the command line.
//!
//! # Commands
//!
//! - `meshing run <VOLUME>` - Full pipeline: dilate, extract, tetrahedralize
//! - `meshing surface <VOLUME> <OUTPUT>` - Marching cubes without dilation
//! - `meshing boundary <TETS> <OUTPUT>` - Boundary surface of a tet mesh
//! - `meshing config` - Print a configuration as JSON
//!
//! Logging goes through `env_logger`; set `RUST_LOG` or pass `--verbose`.

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::settings::{PipelineArgs, Preset};

/// Voxel-to-tetrahedral meshing
#[derive(Parser)]
#[command(name = "meshing")]
#[command(about = "Turn segmented voxel volumes into tetrahedral meshes", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a volume header (.dat)
    Run {
        /// Volume header naming the raw sample file
        #[arg(name = "VOLUME")]
        volume: PathBuf,

        /// Tetrahedral mesh output (.msh); defaults to the volume name
        #[arg(long)]
        tets: Option<PathBuf>,

        /// Boundary surface output (.off); defaults to the volume name
        #[arg(long)]
        surface: Option<PathBuf>,

        /// Also write the dilated surface (.off)
        #[arg(long)]
        fat_surface: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Extract the undilated surface of a volume
    Surface {
        /// Volume header naming the raw sample file
        #[arg(name = "VOLUME")]
        volume: PathBuf,

        /// Surface output (.off)
        #[arg(name = "OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Extract the boundary surface of a tetrahedral mesh
    Boundary {
        /// Tetrahedral mesh (.msh)
        #[arg(name = "TETS")]
        tets: PathBuf,

        /// Surface output (.off)
        #[arg(name = "OUTPUT")]
        output: PathBuf,
    },

    /// Print a pipeline configuration as JSON
    Config {
        /// Configuration to print
        #[arg(long, value_enum, default_value_t = Preset::Default)]
        preset: Preset,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            volume,
            tets,
            surface,
            fat_surface,
            pipeline,
        } => commands::run(&volume, tets, surface, fat_surface, &pipeline),
        Commands::Surface {
            volume,
            output,
            pipeline,
        } => commands::surface(&volume, &output, &pipeline),
        Commands::Boundary { tets, output } => commands::boundary(&tets, &output),
        Commands::Config { preset } => commands::print_config(preset),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
