//! Gmsh MSH 2.2 tetrahedral mesh support.
//!
//! Both ASCII and binary files are read; files are written in binary. Only
//! 4-node tetrahedra (element type 4) are kept, other elements are skipped.
//!
//! # Binary Layout
//!
//! ```text
//! $MeshFormat
//! 2.2 1 8
//! INT32 1                      – endianness check
//! $EndMeshFormat
//! $Nodes
//! <count>
//! foreach node: INT32 id, REAL64[3] position
//! $EndNodes
//! $Elements
//! <count>
//! foreach block: INT32 type, INT32 count, INT32 tag count
//!     foreach element: INT32 id, INT32[tags], INT32[nodes]
//! $EndElements
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use mesh_types::{Point3, TetMesh};
use tracing::debug;

use crate::error::{open, IoError, IoResult};

/// Gmsh element type of a 4-node tetrahedron.
const TETRAHEDRON: i32 = 4;

/// Load a tetrahedral mesh from a Gmsh 2.2 file.
///
/// Node ids may be arbitrary; they are renumbered in file order. The
/// orientation of the tetrahedra is left as stored.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not MSH 2.x, is
/// truncated, or an element references an unknown node.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_msh;
///
/// let tets = load_msh("part.msh").unwrap();
/// println!("Loaded {} tetrahedra", tets.tet_count());
/// ```
pub fn load_msh<P: AsRef<Path>>(path: P) -> IoResult<TetMesh> {
    let path = path.as_ref();
    // Opened first so a missing file maps to `FileNotFound`.
    drop(open(path)?);
    let bytes = fs::read(path)?;
    let mesh = parse_msh(&bytes)?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        tets = mesh.tet_count(),
        "loaded MSH mesh"
    );
    Ok(mesh)
}

/// Parse MSH 2.2 content.
///
/// # Errors
///
/// See [`load_msh`].
pub fn parse_msh(bytes: &[u8]) -> IoResult<TetMesh> {
    let mut cursor = Cursor::new(bytes);
    cursor.expect_line("$MeshFormat")?;
    let format = cursor.line()?;
    let fields: Vec<&str> = format.split_whitespace().collect();
    if fields.len() < 3 || !fields[0].starts_with('2') {
        return Err(IoError::invalid_content(format!(
            "unsupported mesh format line: {format}"
        )));
    }
    let binary = fields[1] == "1";
    if binary {
        if fields[2] != "8" {
            return Err(IoError::invalid_content(format!(
                "unsupported data size {}",
                fields[2]
            )));
        }
        if cursor.i32()? != 1 {
            return Err(IoError::invalid_content("big-endian MSH files are not supported"));
        }
        cursor.skip_newline();
    }
    cursor.expect_line("$EndMeshFormat")?;

    let mut vertices = Vec::new();
    let mut ids: HashMap<i64, u32> = HashMap::new();
    let mut tets = Vec::new();

    while let Some(section) = cursor.next_line() {
        match section.trim() {
            "$Nodes" => {
                let count = cursor.count()?;
                // Smallest node record: "1 0 0 0\n".
                vertices.reserve(count.min(cursor.remaining() / 8));
                for _ in 0..count {
                    let (id, p) = if binary {
                        let id = i64::from(cursor.i32()?);
                        (id, Point3::new(cursor.f64()?, cursor.f64()?, cursor.f64()?))
                    } else {
                        let line = cursor.line()?;
                        let mut it = line.split_whitespace();
                        let id: i64 = field(&mut it)?.parse()?;
                        let x: f64 = field(&mut it)?.parse()?;
                        let y: f64 = field(&mut it)?.parse()?;
                        let z: f64 = field(&mut it)?.parse()?;
                        (id, Point3::new(x, y, z))
                    };
                    ids.insert(id, vertices.len() as u32);
                    vertices.push(p);
                }
                if binary {
                    cursor.skip_newline();
                }
                cursor.expect_line("$EndNodes")?;
            }
            "$Elements" => {
                let count = cursor.count()?;
                if binary {
                    read_binary_elements(&mut cursor, count, &ids, &mut tets)?;
                    cursor.skip_newline();
                } else {
                    for _ in 0..count {
                        let line = cursor.line()?;
                        let values = line
                            .split_whitespace()
                            .map(str::parse::<i64>)
                            .collect::<Result<Vec<_>, _>>()?;
                        if values.len() < 3 {
                            return Err(IoError::invalid_content(format!("short element line: {line}")));
                        }
                        if values[1] != i64::from(TETRAHEDRON) {
                            continue;
                        }
                        let nodes = usize::try_from(values[2])
                            .ok()
                            .and_then(|tags| tags.checked_add(3))
                            .and_then(|start| values.get(start..))
                            .unwrap_or(&[]);
                        if nodes.len() < 4 {
                            return Err(IoError::invalid_content(format!("short element line: {line}")));
                        }
                        tets.push(lookup(&ids, [nodes[0], nodes[1], nodes[2], nodes[3]])?);
                    }
                }
                cursor.expect_line("$EndElements")?;
            }
            other if other.starts_with("$End") || other.is_empty() => {}
            other if other.starts_with('$') => {
                // Unknown section, skip to its end marker.
                let end = format!("$End{}", &other[1..]);
                loop {
                    let Some(line) = cursor.next_line() else {
                        return Err(IoError::UnexpectedEof {
                            position: cursor.position,
                        });
                    };
                    if line.trim() == end {
                        break;
                    }
                }
            }
            other => {
                return Err(IoError::invalid_content(format!("unexpected line: {other}")));
            }
        }
    }

    Ok(TetMesh::from_parts(vertices, tets))
}

fn read_binary_elements(
    cursor: &mut Cursor<'_>,
    count: usize,
    ids: &HashMap<i64, u32>,
    tets: &mut Vec<[u32; 4]>,
) -> IoResult<()> {
    let mut read = 0;
    while read < count {
        let kind = cursor.i32()?;
        let in_block = usize::try_from(cursor.i32()?)
            .map_err(|_| IoError::invalid_content("negative element block size"))?;
        let tags = usize::try_from(cursor.i32()?)
            .map_err(|_| IoError::invalid_content("negative tag count"))?;
        let nodes = node_count(kind)?;
        for _ in 0..in_block {
            let _id = cursor.i32()?;
            for _ in 0..tags {
                cursor.i32()?;
            }
            let mut corners = [0i64; 4];
            for n in 0..nodes {
                let node = i64::from(cursor.i32()?);
                if n < 4 {
                    corners[n] = node;
                }
            }
            if kind == TETRAHEDRON {
                tets.push(lookup(ids, corners)?);
            }
        }
        read += in_block;
    }
    Ok(())
}

/// Nodes per element for the types a volume mesh may contain.
fn node_count(kind: i32) -> IoResult<usize> {
    Ok(match kind {
        15 => 1,
        1 => 2,
        2 | 8 => 3,
        3 | 4 => 4,
        7 => 5,
        6 | 9 => 6,
        5 => 8,
        11 => 10,
        _ => {
            return Err(IoError::invalid_content(format!(
                "unsupported element type {kind}"
            )))
        }
    })
}

fn lookup(ids: &HashMap<i64, u32>, nodes: [i64; 4]) -> IoResult<[u32; 4]> {
    let mut out = [0u32; 4];
    for (slot, id) in out.iter_mut().zip(nodes) {
        *slot = *ids
            .get(&id)
            .ok_or_else(|| IoError::invalid_content(format!("element references unknown node {id}")))?;
    }
    Ok(out)
}

fn field<'a>(it: &mut impl Iterator<Item = &'a str>) -> IoResult<&'a str> {
    it.next().ok_or_else(|| IoError::invalid_content("missing node field"))
}

/// Save a tetrahedral mesh as a binary Gmsh 2.2 file.
///
/// Node and element ids start at 1.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_msh<P: AsRef<Path>>(mesh: &TetMesh, path: P) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_msh(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write binary MSH 2.2 content.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_msh<W: Write>(mesh: &TetMesh, writer: &mut W) -> IoResult<()> {
    writer.write_all(b"$MeshFormat\n2.2 1 8\n")?;
    writer.write_all(&1i32.to_le_bytes())?;
    writer.write_all(b"\n$EndMeshFormat\n")?;

    writeln!(writer, "$Nodes\n{}", mesh.vertex_count())?;
    for (i, p) in mesh.vertices.iter().enumerate() {
        writer.write_all(&(i as i32 + 1).to_le_bytes())?;
        for c in [p.x, p.y, p.z] {
            writer.write_all(&c.to_le_bytes())?;
        }
    }
    writer.write_all(b"\n$EndNodes\n")?;

    writeln!(writer, "$Elements\n{}", mesh.tet_count())?;
    if !mesh.tets.is_empty() {
        for header in [TETRAHEDRON, mesh.tet_count() as i32, 2] {
            writer.write_all(&header.to_le_bytes())?;
        }
        for (i, tet) in mesh.tets.iter().enumerate() {
            // Id, physical tag, elementary tag, then the corners.
            for value in [i as i32 + 1, 1, 1] {
                writer.write_all(&value.to_le_bytes())?;
            }
            for &v in tet {
                writer.write_all(&(v as i32 + 1).to_le_bytes())?;
            }
        }
    }
    writer.write_all(b"\n$EndElements\n")?;
    Ok(())
}

/// Byte cursor over mixed text and binary content.
struct Cursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Next line without its terminator, or `None` at the end.
    fn next_line(&mut self) -> Option<&'a str> {
        if self.position >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.position..];
        let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.position += (len + 1).min(rest.len());
        let line = std::str::from_utf8(&rest[..len]).unwrap_or("");
        Some(line.trim_end_matches('\r'))
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.position)
    }

    fn line(&mut self) -> IoResult<&'a str> {
        self.next_line().ok_or(IoError::UnexpectedEof {
            position: self.position,
        })
    }

    fn expect_line(&mut self, expected: &str) -> IoResult<()> {
        let line = self.line()?;
        if line.trim() == expected {
            Ok(())
        } else {
            Err(IoError::invalid_content(format!(
                "expected {expected}, found {line}"
            )))
        }
    }

    fn count(&mut self) -> IoResult<usize> {
        Ok(self.line()?.trim().parse()?)
    }

    fn take<const N: usize>(&mut self) -> IoResult<[u8; N]> {
        let end = self.position + N;
        let chunk = self
            .bytes
            .get(self.position..end)
            .ok_or(IoError::UnexpectedEof {
                position: self.position,
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.position = end;
        Ok(out)
    }

    fn i32(&mut self) -> IoResult<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn f64(&mut self) -> IoResult<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }

    /// Skip the newline that follows a binary block.
    fn skip_newline(&mut self) {
        if self.bytes.get(self.position) == Some(&b'\r') {
            self.position += 1;
        }
        if self.bytes.get(self.position) == Some(&b'\n') {
            self.position += 1;
        }
    }
}
