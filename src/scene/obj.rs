use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra as na;
use na::{Vector2, Vector3};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};

use crate::error::ViewerError;
use crate::scene::model::{Face, Mesh};

/// Loads an OBJ file into a mesh. Polygons with more than 3 corners are split into a fan.
pub fn load_mesh(path: &Path) -> Result<Mesh, ViewerError> {
    let reader = BufReader::new(File::open(path)?);
    let mesh = read_mesh(reader).map_err(|error| match error {
        ViewerError::ObjParse { message, .. } => ViewerError::ObjParse { path: path.to_path_buf(), message },
        other => other,
    })?;
    log::info!(
        "Loaded {}: {} vertices, {} normals, {} faces",
        path.display(),
        mesh.vertices().len(),
        mesh.normals().len(),
        mesh.faces().len()
    );
    return Ok(mesh);
}

/// Parses OBJ text from any reader.
pub fn read_mesh(input: impl BufRead) -> Result<Mesh, ViewerError> {
    let raw: RawObj = parse_obj(input).map_err(|error| ViewerError::ObjParse {
        path: Default::default(),
        message: error.to_string(),
    })?;

    let vertices = raw.positions.iter().map(|&(x, y, z, _)| Vector3::new(x, y, z)).collect();
    let normals = raw.normals.iter().map(|&(x, y, z)| Vector3::new(x, y, z)).collect();
    let tex_coords = raw.tex_coords.iter().map(|&(u, v, _)| Vector2::new(u, v)).collect();

    let mut faces = Vec::with_capacity(raw.polygons.len());
    let mut skipped = 0usize;
    for polygon in &raw.polygons {
        // Corner list as (position, texture coordinate, normal), raw indices are already 0-based.
        let corners: Vec<(usize, Option<usize>, Option<usize>)> = match polygon {
            Polygon::P(indices) => indices.iter().map(|&p| (p, None, None)).collect(),
            Polygon::PT(indices) => indices.iter().map(|&(p, t)| (p, Some(t), None)).collect(),
            Polygon::PN(indices) => indices.iter().map(|&(p, n)| (p, None, Some(n))).collect(),
            Polygon::PTN(indices) => indices.iter().map(|&(p, t, n)| (p, Some(t), Some(n))).collect(),
        };
        if corners.len() < 3 {
            skipped += 1;
            continue;
        }
        for i in 1..corners.len() - 1 {
            let triangle = [corners[0], corners[i], corners[i + 1]];
            let mut face = Face::new(triangle.map(|corner| corner.0));
            if let [(_, Some(t0), _), (_, Some(t1), _), (_, Some(t2), _)] = triangle {
                face = face.with_tex_coords([t0, t1, t2]);
            }
            if let [(_, _, Some(n0)), (_, _, Some(n1)), (_, _, Some(n2))] = triangle {
                face = face.with_normals([n0, n1, n2]);
            }
            faces.push(face);
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {} polygons with fewer than 3 corners", skipped);
    }

    return Mesh::new(vertices, normals, tex_coords, faces);
}
