use nalgebra as na;
use na::{Vector2, Vector3};

use crate::error::ViewerError;
use crate::scene::transform::{ModelTransform, Transform};
use crate::util::Color;

/// Triangle referencing mesh arrays by 0-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub normals: Option<[usize; 3]>,
    pub tex_coords: Option<[usize; 3]>,
}

impl Face {
    pub fn new(vertices: [usize; 3]) -> Self {
        return Self { vertices, normals: None, tex_coords: None };
    }

    pub fn with_normals(mut self, normals: [usize; 3]) -> Self {
        self.normals = Some(normals);
        return self;
    }

    pub fn with_tex_coords(mut self, tex_coords: [usize; 3]) -> Self {
        self.tex_coords = Some(tex_coords);
        return self;
    }

    /// Builds a face from 1-based indices as they appear in mesh files.
    pub fn from_one_based(
        vertices: [usize; 3],
        normals: Option<[usize; 3]>,
        tex_coords: Option<[usize; 3]>,
    ) -> Result<Self, ViewerError> {
        fn shift(indices: [usize; 3]) -> Result<[usize; 3], ViewerError> {
            let mut shifted = [0; 3];
            for i in 0..3 {
                shifted[i] = indices[i]
                    .checked_sub(1)
                    .ok_or_else(|| ViewerError::InvalidMesh(String::from("index 0 in 1-based face")))?;
            }
            return Ok(shifted);
        }

        return Ok(Self {
            vertices: shift(vertices)?,
            normals: normals.map(shift).transpose()?,
            tex_coords: tex_coords.map(shift).transpose()?,
        });
    }
}

/// Immutable triangle mesh. Indices are validated on construction.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    normals: Vec<Vector3<f32>>,
    tex_coords: Vec<Vector2<f32>>,
    faces: Vec<Face>,
}

impl Mesh {
    pub fn new(
        vertices: Vec<Vector3<f32>>,
        normals: Vec<Vector3<f32>>,
        tex_coords: Vec<Vector2<f32>>,
        faces: Vec<Face>,
    ) -> Result<Self, ViewerError> {
        fn check(kind: &str, face_index: usize, indices: &[usize; 3], len: usize) -> Result<(), ViewerError> {
            if let Some(bad) = indices.iter().find(|&&index| index >= len) {
                return Err(ViewerError::InvalidMesh(format!(
                    "face {} references {} {} but only {} exist",
                    face_index, kind, bad, len
                )));
            }
            return Ok(());
        }

        for (i, face) in faces.iter().enumerate() {
            check("vertex", i, &face.vertices, vertices.len())?;
            if let Some(normals_indices) = &face.normals {
                check("normal", i, normals_indices, normals.len())?;
            }
            if let Some(uv_indices) = &face.tex_coords {
                check("texture coordinate", i, uv_indices, tex_coords.len())?;
            }
        }

        return Ok(Self { vertices, normals, tex_coords, faces });
    }

    /// Axis aligned cube [-1, 1]^3 with one normal per side.
    pub fn cube() -> Self {
        let vertices = vec![
            Vector3::new(-1.0, -1.0, -1.0),
            Vector3::new(1.0, -1.0, -1.0),
            Vector3::new(1.0, 1.0, -1.0),
            Vector3::new(-1.0, 1.0, -1.0),
            Vector3::new(-1.0, -1.0, 1.0),
            Vector3::new(1.0, -1.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(-1.0, 1.0, 1.0),
        ];
        let normals = vec![
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ];
        let sides: [([usize; 3], [usize; 3], usize); 6] = [
            ([5, 1, 2], [5, 2, 6], 0),
            ([0, 4, 7], [0, 7, 3], 1),
            ([7, 6, 2], [7, 2, 3], 2),
            ([0, 1, 5], [0, 5, 4], 3),
            ([4, 5, 6], [4, 6, 7], 4),
            ([1, 0, 3], [1, 3, 2], 5),
        ];
        let mut faces = Vec::with_capacity(12);
        for (first, second, normal) in sides {
            faces.push(Face::new(first).with_normals([normal; 3]));
            faces.push(Face::new(second).with_normals([normal; 3]));
        }
        return Self { vertices, normals, tex_coords: Vec::new(), faces };
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        return &self.vertices[..];
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        return &self.normals[..];
    }

    pub fn tex_coords(&self) -> &[Vector2<f32>] {
        return &self.tex_coords[..];
    }

    pub fn faces(&self) -> &[Face] {
        return &self.faces[..];
    }

    pub fn face_positions(&self, face: &Face) -> [Vector3<f32>; 3] {
        return face.vertices.map(|i| self.vertices[i]);
    }

    pub fn face_normals(&self, face: &Face) -> Option<[Vector3<f32>; 3]> {
        return face.normals.map(|indices| indices.map(|i| self.normals[i]));
    }

    /// Object space bounding box as (min, max), None for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = *self.vertices.first()?;
        let bounds = self.vertices.iter().fold((first, first), |(min, max), v| (min.inf(v), max.sup(v)));
        return Some(bounds);
    }
}

/// Reflection coefficients of a model surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Color,  // Ka
    pub diffuse: Color,  // Kd
    pub specular: Color, // Ks
    pub shininess: f32,  // Phong exponent
}

impl Default for Material {
    fn default() -> Self {
        return Self {
            ambient: Color::zeros(),
            diffuse: Color::new(1.0, 0.0, 0.0),
            specular: Color::repeat(1.0),
            shininess: 10.0,
        };
    }
}

/// A mesh placed in the scene.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub mesh: Mesh,
    pub transform: ModelTransform,
    pub material: Material,
    pub color: Color, // Edges and unlit fill.
}

impl Model {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        return Self {
            name: name.into(),
            mesh,
            transform: ModelTransform::default(),
            material: Material::default(),
            color: Color::zeros(),
        };
    }

    /// Sets the local transform so that the mesh fits into [-1, 1]^3 around the origin.
    pub fn fit_to_unit_cube(&mut self) {
        if let Some((min, max)) = self.mesh.bounding_box() {
            self.transform.local = Transform::fit_unit_cube(min, max);
        }
    }
}
