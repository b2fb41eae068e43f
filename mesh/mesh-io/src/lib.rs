//! File I/O for the meshing pipeline.
//!
//! Three kinds of data move in and out of the pipeline:
//!
//! - **Voxel volumes**: a text header (`.dat`) naming a raw byte file
//! - **Surfaces**: OFF triangle meshes
//! - **Tetrahedral meshes**: Gmsh MSH 2.2, ASCII or binary on load,
//!   binary on save
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Format Detection
//!
//! ```no_run
//! use mesh_io::{load_surface, save_tet_mesh, MeshFormat};
//!
//! let surface = load_surface("shell.off").unwrap();
//! assert_eq!(MeshFormat::from_path("part.msh"), Some(MeshFormat::Msh));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

mod error;
mod msh;
mod off;
mod volume;

pub use error::{IoError, IoResult};
pub use msh::{load_msh, parse_msh, save_msh, write_msh};
pub use off::{load_off, read_off, save_off, write_off};
pub use volume::{load_volume, save_volume, VolumeHeader};

use std::path::Path;

use mesh_types::{IndexedMesh, TetMesh};

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// OFF triangle surface.
    Off,
    /// Gmsh MSH 2.2 tetrahedral mesh.
    Msh,
    /// Voxel volume header with a raw sample file.
    Volume,
}

impl MeshFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "off" => Some(Self::Off),
            "msh" => Some(Self::Msh),
            "dat" => Some(Self::Volume),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Msh => "msh",
            Self::Volume => "dat",
        }
    }
}

fn detect(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

fn expect_format(path: &Path, wanted: MeshFormat) -> IoResult<()> {
    let found = detect(path)?;
    if found == wanted {
        Ok(())
    } else {
        Err(IoError::UnknownFormat {
            extension: found.extension().to_string(),
        })
    }
}

/// Load a triangle surface, checking the extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] unless the path ends in `.off`, and
/// any error of [`load_off`].
pub fn load_surface<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    expect_format(path, MeshFormat::Off)?;
    load_off(path)
}

/// Save a triangle surface, checking the extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] unless the path ends in `.off`, and
/// any error of [`save_off`].
pub fn save_surface<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    expect_format(path, MeshFormat::Off)?;
    save_off(mesh, path)
}

/// Load a tetrahedral mesh, checking the extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] unless the path ends in `.msh`, and
/// any error of [`load_msh`].
pub fn load_tet_mesh<P: AsRef<Path>>(path: P) -> IoResult<TetMesh> {
    let path = path.as_ref();
    expect_format(path, MeshFormat::Msh)?;
    load_msh(path)
}

/// Save a tetrahedral mesh, checking the extension.
///
/// # Errors
///
/// Returns [`IoError::UnknownFormat`] unless the path ends in `.msh`, and
/// any error of [`save_msh`].
pub fn save_tet_mesh<P: AsRef<Path>>(mesh: &TetMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    expect_format(path, MeshFormat::Msh)?;
    save_msh(mesh, path)
}
