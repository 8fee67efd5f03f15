//! Binary PLY import
//!
//! Reads the layout Blender's PLY exporter writes with normals and vertex colours:
//!
//! ```text
//! ply
//! format binary_little_endian 1.0
//! element vertex N
//! property float x / y / z / nx / ny / nz
//! property uchar red / green / blue / alpha
//! element face M
//! property list uchar uint vertex_indices
//! end_header
//! ```
//!
//! X (position and normal) is mirrored on load and face indices are read back to front, which converts the
//! exporter's handedness while keeping faces counter-clockwise from outside.

use std::fs;
use std::path::Path;
use log::{debug, info};
use crate::rasterizer::{Patch, Vec3};

const VERTEX_PROPERTIES: [&str; 10] = [
    "property float x",
    "property float y",
    "property float z",
    "property float nx",
    "property float ny",
    "property float nz",
    "property uchar red",
    "property uchar green",
    "property uchar blue",
    "property uchar alpha",
];
const FACE_PROPERTY: &str = "property list uchar uint vertex_indices";

/// 6 floats + 4 colour bytes
const VERTEX_SIZE: usize = 6 * 4 + 4;
/// Count byte + 3 indices
const FACE_SIZE: usize = 1 + 3 * 4;

/// Error type for PLY loading
#[derive(Debug)]
pub enum PlyError {
    IoError(std::io::Error),
    /// Header text didn't match the supported layout
    Header { line: usize, expected: String, found: String },
    /// Body ended before the counts declared in the header
    Truncated { section: &'static str, needed: usize, available: usize },
    NonTriangularFace { face: usize, vertices: u8 },
    IndexOutOfRange { face: usize, index: u32, vertex_count: usize },
}

impl From<std::io::Error> for PlyError {
    fn from(e: std::io::Error) -> Self {
        PlyError::IoError(e)
    }
}

impl std::fmt::Display for PlyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlyError::IoError(e) => write!(f, "IO error: {}", e),
            PlyError::Header { line, expected, found } => {
                write!(f, "PLY header line {}: expected {}, found \"{}\"", line, expected, found)
            }
            PlyError::Truncated { section, needed, available } => {
                write!(f, "PLY {} data truncated: need {} bytes, {} left", section, needed, available)
            }
            PlyError::NonTriangularFace { face, vertices } => {
                write!(f, "face {} has {} vertices, all faces must be triangulated", face, vertices)
            }
            PlyError::IndexOutOfRange { face, index, vertex_count } => {
                write!(f, "face {} references vertex {} of {}", face, index, vertex_count)
            }
        }
    }
}

impl std::error::Error for PlyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlyError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PlyVertex {
    pos: Vec3,
    normal: Vec3,
    color: Vec3,
}

/// Line reader over the header; counts lines for error messages
struct HeaderReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    line_no: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0, line_no: 0 }
    }

    /// Next line without its terminator, `None` at end of input
    fn next_line(&mut self) -> Option<String> {
        if self.offset >= self.bytes.len() {
            return None;
        }
        let rest = &self.bytes[self.offset..];
        let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.offset += (len + 1).min(rest.len());
        self.line_no += 1;

        let line = String::from_utf8_lossy(&rest[..len]);
        Some(line.trim_end_matches('\r').to_string())
    }

    fn error(&self, expected: impl Into<String>, found: impl Into<String>) -> PlyError {
        PlyError::Header { line: self.line_no, expected: expected.into(), found: found.into() }
    }

    fn expect_line(&mut self, expected: &str) -> Result<(), PlyError> {
        match self.next_line() {
            Some(line) if line == expected => Ok(()),
            Some(line) => Err(self.error(format!("\"{}\"", expected), line)),
            None => Err(self.error(format!("\"{}\"", expected), "end of file")),
        }
    }

    /// Skip comments and other non-element lines, then parse `element <name> <count>`
    fn expect_element(&mut self, name: &str) -> Result<usize, PlyError> {
        let expected = format!("\"element {} <count>\"", name);
        loop {
            let line = match self.next_line() {
                Some(line) => line,
                None => return Err(self.error(expected, "end of file")),
            };
            if !line.starts_with("element") {
                continue;
            }

            let mut parts = line.split_whitespace().skip(1);
            return match (parts.next(), parts.next().map(str::parse::<usize>)) {
                (Some(n), Some(Ok(count))) if n == name => Ok(count),
                _ => Err(self.error(expected, line)),
            };
        }
    }
}

struct Header {
    vertex_count: usize,
    face_count: usize,
    body_offset: usize,
}

fn parse_header(bytes: &[u8]) -> Result<Header, PlyError> {
    let mut reader = HeaderReader::new(bytes);
    reader.expect_line("ply")?;
    reader.expect_line("format binary_little_endian 1.0")?;

    let vertex_count = reader.expect_element("vertex")?;
    for property in VERTEX_PROPERTIES {
        reader.expect_line(property)?;
    }

    let face_count = reader.expect_element("face")?;
    reader.expect_line(FACE_PROPERTY)?;
    reader.expect_line("end_header")?;

    Ok(Header { vertex_count, face_count, body_offset: reader.offset })
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// First `count` records of `size` bytes
fn take<'a>(bytes: &'a [u8], count: usize, size: usize, section: &'static str) -> Result<&'a [u8], PlyError> {
    let len = count.saturating_mul(size);
    bytes.get(..len).ok_or(PlyError::Truncated { section, needed: len, available: bytes.len() })
}

fn parse_vertices(body: &[u8], count: usize) -> Result<Vec<PlyVertex>, PlyError> {
    let data = take(body, count, VERTEX_SIZE, "vertex")?;

    Ok(data
        .chunks_exact(VERTEX_SIZE)
        .map(|v| {
            let rgb = Vec3::new(v[24] as f32, v[25] as f32, v[26] as f32) / 255.0;
            PlyVertex {
                pos: Vec3::new(-f32_at(v, 0), f32_at(v, 4), f32_at(v, 8)),
                normal: Vec3::new(-f32_at(v, 12), f32_at(v, 16), f32_at(v, 20)),
                color: rgb,
            }
        })
        .collect())
}

fn parse_faces(body: &[u8], count: usize, vertices: &[PlyVertex]) -> Result<Vec<Patch>, PlyError> {
    let data = take(body, count, FACE_SIZE, "face")?;
    let mut patches = Vec::with_capacity(count);

    for (face, f) in data.chunks_exact(FACE_SIZE).enumerate() {
        if f[0] != 3 {
            return Err(PlyError::NonTriangularFace { face, vertices: f[0] });
        }

        let lookup = |slot: usize| -> Result<PlyVertex, PlyError> {
            let index = u32_at(f, 1 + slot * 4);
            vertices.get(index as usize).copied().ok_or(PlyError::IndexOutOfRange {
                face,
                index,
                vertex_count: vertices.len(),
            })
        };
        let corners = [lookup(2)?, lookup(1)?, lookup(0)?];

        patches.push(Patch::from_vertices(
            corners.map(|v| v.pos),
            corners.map(|v| v.normal),
            corners.map(|v| v.color),
        ));
    }

    Ok(patches)
}

/// Parse a PLY file already in memory
pub fn parse_ply(bytes: &[u8]) -> Result<Vec<Patch>, PlyError> {
    let header = parse_header(bytes)?;
    debug!("PLY header: {} vertices, {} faces", header.vertex_count, header.face_count);

    let body = &bytes[header.body_offset..];
    let vertices = parse_vertices(body, header.vertex_count)?;
    parse_faces(&body[vertices.len() * VERTEX_SIZE..], header.face_count, &vertices)
}

/// Load a PLY file from disk
pub fn load_ply<P: AsRef<Path>>(path: P) -> Result<Vec<Patch>, PlyError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let patches = parse_ply(&bytes)?;
    info!("Loaded {} patches from {}", patches.len(), path.display());
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vec4;

    fn header(vertices: usize, faces: usize) -> Vec<u8> {
        let mut text = String::from("ply\nformat binary_little_endian 1.0\ncomment made by hand\n");
        text += &format!("element vertex {}\n", vertices);
        for p in VERTEX_PROPERTIES {
            text += p;
            text += "\n";
        }
        text += &format!("element face {}\n{}\nend_header\n", faces, FACE_PROPERTY);
        text.into_bytes()
    }

    fn push_vertex(out: &mut Vec<u8>, pos: [f32; 3], normal: [f32; 3], rgba: [u8; 4]) {
        for v in pos.iter().chain(normal.iter()) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&rgba);
    }

    fn push_face(out: &mut Vec<u8>, indices: &[u32]) {
        out.push(indices.len() as u8);
        for i in indices {
            out.extend_from_slice(&i.to_le_bytes());
        }
    }

    fn triangle_file() -> Vec<u8> {
        let mut bytes = header(3, 1);
        push_vertex(&mut bytes, [1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [255, 0, 0, 255]);
        push_vertex(&mut bytes, [0.0, 2.0, 0.0], [0.0, 0.0, 1.0], [0, 255, 0, 255]);
        push_vertex(&mut bytes, [0.0, 0.0, 3.0], [0.0, 1.0, 1.0], [0, 0, 255, 255]);
        push_face(&mut bytes, &[0, 1, 2]);
        bytes
    }

    #[test]
    fn test_parse_single_triangle() {
        let patches = parse_ply(&triangle_file()).unwrap();
        assert_eq!(patches.len(), 1);

        let p = &patches[0];
        // Indices reversed, x mirrored
        assert_eq!(p.pos[0], Vec4::new(0.0, 0.0, 3.0, 1.0));
        assert_eq!(p.pos[1], Vec4::new(0.0, 2.0, 0.0, 1.0));
        assert_eq!(p.pos[2], Vec4::new(-1.0, 0.0, 0.0, 1.0));

        assert!((p.normal - Vec3::new(0.0, 1.0 / 3.0, 1.0)).magnitude() < 1e-6);
        assert!((p.color - Vec3::splat(1.0 / 3.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_crlf_header() {
        let text = String::from_utf8(header(3, 1)).unwrap().replace('\n', "\r\n");
        let mut bytes = text.into_bytes();
        bytes.extend_from_slice(&triangle_file()[header(3, 1).len()..]);
        assert_eq!(parse_ply(&bytes).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_quads() {
        let mut bytes = header(4, 1);
        for _ in 0..4 {
            push_vertex(&mut bytes, [0.0; 3], [0.0; 3], [0; 4]);
        }
        push_face(&mut bytes, &[0, 1, 2, 3]);

        match parse_ply(&bytes) {
            Err(PlyError::NonTriangularFace { face: 0, vertices: 4 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_ascii_format() {
        let bytes = b"ply\nformat ascii 1.0\n".to_vec();
        match parse_ply(&bytes) {
            Err(PlyError::Header { line: 2, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_property() {
        let text = String::from_utf8(header(3, 1)).unwrap().replace("property uchar alpha\n", "");
        assert!(matches!(parse_ply(text.as_bytes()), Err(PlyError::Header { .. })));
    }

    #[test]
    fn test_truncated_body() {
        let mut bytes = triangle_file();
        bytes.truncate(bytes.len() - 5);
        assert!(matches!(
            parse_ply(&bytes),
            Err(PlyError::Truncated { section: "face", .. })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut bytes = header(3, 1);
        for _ in 0..3 {
            push_vertex(&mut bytes, [0.0; 3], [0.0; 3], [0; 4]);
        }
        push_face(&mut bytes, &[0, 1, 7]);
        assert!(matches!(
            parse_ply(&bytes),
            Err(PlyError::IndexOutOfRange { face: 0, index: 7, vertex_count: 3 })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(load_ply("/nonexistent/model.ply"), Err(PlyError::IoError(_))));
    }
}
