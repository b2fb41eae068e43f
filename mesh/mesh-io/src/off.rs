//! OFF (Object File Format) surface support.
//!
//! # Format
//!
//! ```text
//! OFF
//! <vertex count> <face count> <edge count>
//! x y z            (one line per vertex)
//! n i0 i1 ... in-1 (one line per face, 0-based indices)
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Polygons with
//! more than three corners are split into a triangle fan on load.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vertex};
use tracing::debug;

use crate::error::{open, IoError, IoResult};

/// Load a triangle surface from an OFF file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the header is missing,
/// counts do not match the content, or a face references a missing vertex.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_off;
///
/// let mesh = load_off("surface.off").unwrap();
/// println!("Loaded {} faces", mesh.faces.len());
/// ```
pub fn load_off<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let mesh = read_off(BufReader::new(open(path)?))?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "loaded OFF surface"
    );
    Ok(mesh)
}

/// Parse OFF content from a reader.
///
/// # Errors
///
/// See [`load_off`].
pub fn read_off<R: BufRead>(reader: R) -> IoResult<IndexedMesh> {
    let mut text = String::new();
    for line in reader.lines() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("");
        text.push_str(content);
        text.push('\n');
    }
    let text_len = text.len();
    let mut tokens = text.split_whitespace();

    match tokens.next() {
        Some("OFF") => {}
        other => {
            return Err(IoError::invalid_content(format!(
                "expected OFF header, found {}",
                other.unwrap_or("end of file")
            )))
        }
    }

    let mut next = |what: &str| {
        tokens
            .next()
            .ok_or_else(|| IoError::invalid_content(format!("missing {what}")))
    };
    let vertex_count: usize = next("vertex count")?.parse()?;
    let face_count: usize = next("face count")?.parse()?;
    let _edge_count: usize = next("edge count")?.parse()?;

    // Counts come from the file; a vertex takes at least 6 bytes and a face 8.
    let mut mesh =
        IndexedMesh::with_capacity(vertex_count.min(text_len / 6), face_count.min(text_len / 8));
    for _ in 0..vertex_count {
        let x: f64 = next("vertex coordinate")?.parse()?;
        let y: f64 = next("vertex coordinate")?.parse()?;
        let z: f64 = next("vertex coordinate")?.parse()?;
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }

    for f in 0..face_count {
        let corners: usize = next("face corner count")?.parse()?;
        if corners < 3 {
            return Err(IoError::invalid_content(format!(
                "face {f} has {corners} corners"
            )));
        }
        let mut polygon = Vec::with_capacity(corners.min(text_len / 2));
        for _ in 0..corners {
            let index: u32 = next("face index")?.parse()?;
            if index as usize >= vertex_count {
                return Err(IoError::invalid_content(format!(
                    "face {f} references vertex {index}, but only {vertex_count} exist"
                )));
            }
            polygon.push(index);
        }
        for i in 1..corners - 1 {
            mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    Ok(mesh)
}

/// Save a triangle surface as an OFF file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_off<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_off(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write OFF content to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_off<W: Write>(mesh: &IndexedMesh, writer: &mut W) -> IoResult<()> {
    writeln!(writer, "OFF")?;
    writeln!(writer, "{} {} 0", mesh.vertices.len(), mesh.faces.len())?;
    for v in &mesh.vertices {
        let p = v.position;
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    for f in &mesh.faces {
        writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
    }
    Ok(())
}
