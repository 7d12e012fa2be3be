use nalgebra as na;
use na::{Matrix4, Vector3};

use crate::util::Color;

/// Point light. Position is kept as a translation matrix so that moves compose.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub ambient_color: Color,  // La
    pub diffuse_color: Color,  // Ld
    pub specular_color: Color, // Ls
    translation: Matrix4<f32>,
}

impl Default for Light {
    fn default() -> Self {
        return Self::at(Vector3::new(1.0, 4.0, 2.0));
    }
}

impl Light {
    /// Light with default gray colors placed at position.
    pub fn at(position: Vector3<f32>) -> Self {
        return Self {
            ambient_color: Color::repeat(0.5),
            diffuse_color: Color::repeat(0.5),
            specular_color: Color::repeat(0.5),
            translation: Matrix4::new_translation(&position),
        };
    }

    pub fn with_colors(mut self, ambient: Color, diffuse: Color, specular: Color) -> Self {
        self.ambient_color = ambient;
        self.diffuse_color = diffuse;
        self.specular_color = specular;
        return self;
    }

    /// Moves the light by (x, y, z) relative to where it is.
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.translation *= Matrix4::new_translation(&Vector3::new(x, y, z));
    }

    /// World position, the translation column of the light matrix.
    pub fn position(&self) -> Vector3<f32> {
        let m = &self.translation;
        return Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    }
}
