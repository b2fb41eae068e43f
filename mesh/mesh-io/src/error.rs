//! Failures while reading volumes, surfaces and tetrahedral meshes.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use mesh_grid::GridError;
use thiserror::Error;

/// Result alias for this crate.
pub type IoResult<T> = Result<T, IoError>;

/// Everything that can go wrong between a path and a mesh.
#[derive(Debug, Error)]
pub enum IoError {
    /// A header, raw sample file or mesh does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Resolved path, including raw files named by a header.
        path: PathBuf,
    },

    /// The extension is not one the called loader or saver handles.
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// Extension found, empty when the path has none.
        extension: String,
    },

    /// Malformed header, section marker or element record.
    #[error("invalid file content: {message}")]
    InvalidContent {
        message: String,
    },

    /// The raw sample file is shorter than the header's dimensions require.
    #[error("volume data truncated: expected {expected} bytes, got {actual}")]
    TruncatedVolume {
        /// Bytes implied by the header.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Binary data ended inside a node or element block.
    #[error("unexpected end of file at byte {position}")]
    UnexpectedEof {
        /// Byte offset of the incomplete record.
        position: usize,
    },

    /// Header dimensions do not describe a usable grid.
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A coordinate or value did not parse.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// A count, id or dimension did not parse.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Shorthand for [`IoError::InvalidContent`].
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

/// Open a file, mapping a missing file to [`IoError::FileNotFound`].
pub(crate) fn open(path: &Path) -> IoResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IoError::Io(e),
    })
}
