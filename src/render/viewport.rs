use nalgebra as na;
use na::{Matrix4, Vector3};

use crate::util::{from_hom_point, to_hom_point};

/// Mapping from normalized device coordinates to pixel space.
/// Uses one scale for both axes, min(width, height) / 2, so the image is never stretched.
/// z goes through the same formula and serves as a relative depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        return Self { width, height };
    }

    pub fn scale(&self) -> f32 {
        return self.width.min(self.height) as f32 / 2.0;
    }

    /// NDC point to viewport space: (v + 1) * scale per component.
    pub fn to_viewport(&self, ndc: Vector3<f32>) -> Vector3<f32> {
        return (ndc + Vector3::repeat(1.0)) * self.scale();
    }

    /// Inverse of to_viewport.
    pub fn undo_viewport(&self, point: Vector3<f32>) -> Vector3<f32> {
        return point / self.scale() - Vector3::repeat(1.0);
    }

    /// Scalar depth through the same mapping as z.
    pub fn to_depth(&self, z: f32) -> f32 {
        return (z + 1.0) * self.scale();
    }

    /// Object space point through a combined projection * view * model matrix, homogeneous
    /// divide and viewport mapping.
    pub fn project(&self, mvp: &Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
        let clip = mvp * to_hom_point(point);
        return self.to_viewport(from_hom_point(clip));
    }
}

/// Combined clip transform P * V * M.
pub fn clip_matrix(projection: &Matrix4<f32>, view: &Matrix4<f32>, model: &Matrix4<f32>) -> Matrix4<f32> {
    return projection * view * model;
}
