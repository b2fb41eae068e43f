//! Raw voxel volumes described by a text header.
//!
//! # Header Format
//!
//! ```text
//! ObjectFileName: scan.raw
//! Resolution:     64 64 32
//! ```
//!
//! The header is read as whitespace-separated tokens: a label, the raw file
//! name, a label, and the width, height and depth. The raw file holds
//! `width * height * depth` unsigned bytes with x varying fastest, and is
//! resolved relative to the header's directory.

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use mesh_grid::VoxelVolume;
use tracing::{debug, warn};

use crate::error::{open, IoError, IoResult};

/// Parsed contents of a volume header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeHeader {
    /// Raw sample file as written in the header.
    pub raw_file: PathBuf,
    /// Width, height and depth in voxels.
    pub dims: (usize, usize, usize),
}

impl VolumeHeader {
    /// Parse header text.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than six tokens are present or a dimension
    /// is not an integer.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_io::VolumeHeader;
    ///
    /// let header = VolumeHeader::parse("ObjectFileName: a.raw\nResolution: 4 5 6\n").unwrap();
    /// assert_eq!(header.dims, (4, 5, 6));
    /// ```
    pub fn parse(text: &str) -> IoResult<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 6 {
            return Err(IoError::invalid_content(format!(
                "volume header needs 6 tokens, found {}",
                tokens.len()
            )));
        }
        let dims = (
            tokens[3].parse()?,
            tokens[4].parse()?,
            tokens[5].parse()?,
        );
        Ok(Self {
            raw_file: PathBuf::from(tokens[1]),
            dims,
        })
    }

    /// Number of bytes the raw file must hold.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidContent`] if the product of the dimensions
    /// does not fit in `usize`.
    pub fn sample_count(&self) -> IoResult<usize> {
        let (w, h, d) = self.dims;
        w.checked_mul(h)
            .and_then(|wh| wh.checked_mul(d))
            .ok_or_else(|| {
                IoError::invalid_content(format!("volume dimensions {w}x{h}x{d} overflow"))
            })
    }
}

/// Load a volume from its header file.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if the header or raw file is missing
/// - [`IoError::InvalidContent`] / [`IoError::ParseInt`] for a malformed header
///   or dimensions whose product overflows
/// - [`IoError::TruncatedVolume`] if the raw file is too short
pub fn load_volume<P: AsRef<Path>>(header_path: P) -> IoResult<VoxelVolume> {
    let header_path = header_path.as_ref();
    let mut text = String::new();
    open(header_path)?.read_to_string(&mut text)?;
    let header = VolumeHeader::parse(&text)?;

    let raw_path = header_path
        .parent()
        .map_or_else(|| header.raw_file.clone(), |dir| dir.join(&header.raw_file));
    let data = read_samples(&raw_path, header.sample_count()?)?;

    let volume = VoxelVolume::new(header.dims, data)?;
    debug!(
        path = %header_path.display(),
        dims = ?header.dims,
        solid = volume.solid_count(),
        "loaded volume"
    );
    Ok(volume)
}

fn read_samples(path: &Path, expected: usize) -> IoResult<Vec<u8>> {
    let file = open(path)?;
    let total = file.metadata()?.len();
    let wanted = u64::try_from(expected).unwrap_or(u64::MAX);
    if total < wanted {
        // Checked before allocating `expected` bytes.
        return Err(IoError::TruncatedVolume {
            expected,
            actual: usize::try_from(total).unwrap_or(usize::MAX),
        });
    }

    let mut data = Vec::with_capacity(expected);
    file.take(wanted).read_to_end(&mut data)?;
    if data.len() < expected {
        return Err(IoError::TruncatedVolume {
            expected,
            actual: data.len(),
        });
    }
    if total > wanted {
        warn!(path = %path.display(), extra = total - wanted, "ignoring trailing volume bytes");
    }
    Ok(data)
}

/// Save a volume as a header plus a raw file next to it.
///
/// The raw file takes the header's name with a `.raw` extension.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn save_volume<P: AsRef<Path>>(volume: &VoxelVolume, header_path: P) -> IoResult<()> {
    let header_path = header_path.as_ref();
    let raw_path = header_path.with_extension("raw");
    let raw_name = raw_path
        .file_name()
        .ok_or_else(|| IoError::invalid_content("volume header path has no file name"))?;

    let (w, h, d) = volume.dimensions();
    let mut header = BufWriter::new(fs::File::create(header_path)?);
    writeln!(header, "ObjectFileName: {}", raw_name.to_string_lossy())?;
    writeln!(header, "Resolution: {w} {h} {d}")?;
    header.flush()?;

    fs::write(&raw_path, volume.data())?;
    Ok(())
}
