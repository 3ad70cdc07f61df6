//! Minimal Wavefront-style mesh reader.
//!
//! Only two record types are understood:
//! - `v x y z` (exactly three floats),
//! - `f a//n b//n c//n` (exactly three vertex//normal pairs).
//!
//! Normal indices are validated as integers and then discarded. Every other
//! record (`vn`, `vt`, `o`, comments, ...) and blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::{Error, Pt3, Real, Result};

/// Parsed vertex list and 1-based triangle indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Pt3>,
    pub faces: Vec<[usize; 3]>,
}

/// Parse a mesh from any reader.
pub fn parse_mesh<R: Read>(reader: R) -> Result<MeshData> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    // (line, indices) for deferred range checks; faces may precede vertices.
    let mut face_lines = Vec::new();

    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| Error::parse(line_no, e.to_string()))?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => vertices.push(parse_vertex(line_no, tokens)?),
            Some("f") => {
                let face = parse_face(line_no, tokens)?;
                face_lines.push(line_no);
                faces.push(face);
            }
            _ => {}
        }
    }

    for (face, line_no) in faces.iter().zip(&face_lines) {
        if let Some(bad) = face.iter().find(|&&i| i == 0 || i > vertices.len()) {
            return Err(Error::parse(
                *line_no,
                format!("vertex index {bad} outside 1..={}", vertices.len()),
            ));
        }
    }

    debug!(
        "parsed mesh: {} vertices, {} faces",
        vertices.len(),
        faces.len()
    );
    Ok(MeshData { vertices, faces })
}

/// Open `path` and parse it; an unopenable file is a parse error at line 0.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::parse(0, format!("cannot open {}: {e}", path.display())))?;
    parse_mesh(file)
}

fn parse_vertex<'a>(line: usize, tokens: impl Iterator<Item = &'a str>) -> Result<Pt3> {
    let values = tokens
        .map(|t| {
            t.parse::<Real>()
                .map_err(|_| Error::parse(line, format!("bad coordinate '{t}'")))
        })
        .collect::<Result<Vec<_>>>()?;
    match values.as_slice() {
        [x, y, z] => Ok(Pt3::new(*x, *y, *z)),
        other => Err(Error::parse(
            line,
            format!("vertex needs 3 coordinates, got {}", other.len()),
        )),
    }
}

fn parse_face<'a>(line: usize, tokens: impl Iterator<Item = &'a str>) -> Result<[usize; 3]> {
    let mut ints = Vec::with_capacity(6);
    for token in tokens {
        let (v, n) = token
            .split_once("//")
            .ok_or_else(|| Error::parse(line, format!("face token '{token}' lacks '//'")))?;
        for part in [v, n] {
            let value = part
                .parse::<usize>()
                .map_err(|_| Error::parse(line, format!("bad index '{part}'")))?;
            ints.push(value);
        }
    }
    if ints.len() != 6 {
        return Err(Error::parse(
            line,
            format!("face needs 6 integers, got {}", ints.len()),
        ));
    }
    Ok([ints[0], ints[2], ints[4]])
}
