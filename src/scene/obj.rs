//! Wavefront OBJ loading
//!
//! Supports `v`, `vt` and `f` statements. Faces may use `v`, `v/vt`,
//! `v//vn` or `v/vt/vn` corners, negative (relative) indices, and more than
//! three corners (fan-triangulated). Normals, groups and materials are
//! ignored.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::rasterizer::{TexCoord, Triangle, Vec3};
use super::{Mesh, SceneError};

fn obj_error(line: usize, message: impl Into<String>) -> SceneError {
    SceneError::Obj { line, message: message.into() }
}

fn parse_float(token: Option<&str>, line: usize, what: &str) -> Result<f32, SceneError> {
    let token = token.ok_or_else(|| obj_error(line, format!("missing {}", what)))?;
    token
        .parse::<f32>()
        .map_err(|_| obj_error(line, format!("invalid {} '{}'", what, token)))
}

/// Resolve a 1-based (or negative, relative) OBJ index into `0..len`
fn resolve_index(token: &str, len: usize, line: usize) -> Result<usize, SceneError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| obj_error(line, format!("invalid index '{}'", token)))?;

    let resolved = match raw {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(len as i64 + i),
    };

    match resolved {
        Some(i) if i >= 0 && (i as usize) < len => Ok(i as usize),
        _ => Err(obj_error(line, format!("index {} out of range (have {})", raw, len))),
    }
}

struct Corner {
    position: usize,
    uv: Option<usize>,
}

fn parse_corner(token: &str, positions: usize, uvs: usize, line: usize) -> Result<Corner, SceneError> {
    let mut fields = token.split('/');
    let position = resolve_index(fields.next().unwrap_or(""), positions, line)?;
    let uv = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, uvs, line)?),
        _ => None,
    };
    Ok(Corner { position, uv })
}

/// Parse OBJ text into triangles. UV `v` is flipped so 0 is the image top.
pub fn parse_obj(source: &str) -> Result<Vec<Triangle>, SceneError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<TexCoord> = Vec::new();
    let mut triangles = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let mut parts = content.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let x = parse_float(parts.next(), line, "x")?;
                let y = parse_float(parts.next(), line, "y")?;
                let z = parse_float(parts.next(), line, "z")?;
                positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let u = parse_float(parts.next(), line, "u")?;
                let v = match parts.next() {
                    Some(t) => parse_float(Some(t), line, "v")?,
                    None => 0.0,
                };
                uvs.push(TexCoord::new(u, 1.0 - v));
            }
            "f" => {
                let corners = parts
                    .map(|t| parse_corner(t, positions.len(), uvs.len(), line))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(obj_error(line, format!("face has {} corners, need 3", corners.len())));
                }

                let vertex = |c: &Corner| {
                    let uv = c.uv.map(|i| uvs[i]).unwrap_or_default();
                    (positions[c.position], uv)
                };
                let (p0, t0) = vertex(&corners[0]);
                for pair in corners[1..].windows(2) {
                    let (p1, t1) = vertex(&pair[0]);
                    let (p2, t2) = vertex(&pair[1]);
                    triangles.push(Triangle::new([p0, p1, p2], [t0, t1, t2]));
                }
            }
            _ => {}
        }
    }

    Ok(triangles)
}

/// Load an OBJ file as a mesh named after the file stem
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, SceneError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let triangles = parse_obj(&source)?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    info!(path = %path.display(), triangles = triangles.len(), "Loaded OBJ mesh");
    Ok(Mesh::new(triangles).with_name(name))
}
