//! Minimal Wavefront OBJ reader: only `v` and `f` records matter, and every
//! face must be a quad.

use crate::error::AppError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the quad faces of an OBJ file as 0-based vertex loops.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a quad mesh.
pub fn load_quads(path: &Path) -> Result<Vec<[usize; 4]>, AppError> {
    log::info!("Loading mesh from {:?}", path);
    let file = File::open(path)?;
    let quads = parse_quads(BufReader::new(file))?;
    log::info!("Mesh loaded: {} quads", quads.len());
    Ok(quads)
}

/// Parses OBJ content. Texture and normal references (`v/vt/vn`) are ignored
/// and negative indices count back from the last vertex read so far.
///
/// # Errors
///
/// Returns [`AppError::MeshInput`] for faces that are not quads or that
/// reference missing vertices.
pub fn parse_quads(reader: impl BufRead) -> Result<Vec<[usize; 4]>, AppError> {
    let mut vertex_count = 0usize;
    let mut quads = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => vertex_count += 1,
            Some("f") => {
                let corners = tokens
                    .map(|token| resolve_index(token, vertex_count, line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                let quad: [usize; 4] = corners.try_into().map_err(|corners: Vec<usize>| AppError::MeshInput {
                    line: line_number,
                    message: format!("expected a quad, found a face with {} vertices", corners.len()),
                })?;
                quads.push(quad);
            }
            _ => {}
        }
    }

    if quads.is_empty() {
        return Err(AppError::MeshInput {
            line: 0,
            message: "no face found".to_string(),
        });
    }
    Ok(quads)
}

fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<usize, AppError> {
    let invalid = |message: String| AppError::MeshInput { line, message };
    let raw = token.split('/').next().unwrap_or_default();
    let value: i64 = raw
        .parse()
        .map_err(|_| invalid(format!("invalid vertex reference '{token}'")))?;

    let resolved = match value {
        0 => None,
        v if v > 0 => usize::try_from(v - 1).ok(),
        v => vertex_count.checked_sub(usize::try_from(v.unsigned_abs()).unwrap_or(usize::MAX)),
    };
    resolved
        .filter(|&i| i < vertex_count)
        .ok_or_else(|| invalid(format!("vertex {value} does not exist ({vertex_count} vertices so far)")))
}
