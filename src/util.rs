use nalgebra as na;
use na::{vector, Vector3, Vector4};

/// Linear RGB color with channels nominally in [0.0, 1.0].
/// Sums of several lights are allowed to go above 1.0, clamping happens only on export.
pub type Color = Vector3<f32>;

/// Vectors shorter than this are treated as having no direction.
pub const NORMALIZE_EPSILON: f32 = 1e-8;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a point from homogenous coordinates.
/// A point with w == 0 lies at infinity, its x, y, z are returned as they are.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    if v.w == 0.0 {
        return vector![v.x, v.y, v.z];
    }
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Unit vector in the direction of v, or zero vector if v has no usable length.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    return v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vector3::zeros);
}

/// Mirror of the incident direction about the normal, GLSL style: i - 2 (n . i) n.
pub fn reflect(incident: Vector3<f32>, normal: Vector3<f32>) -> Vector3<f32> {
    return incident - 2.0 * normal.dot(&incident) * normal;
}

/// Convex combination of two colors: t * color_1 + (1 - t) * color_2.
/// t is unrestricted, so values outside [0, 1] extrapolate.
pub fn color_blend(color_1: Color, color_2: Color, t: f32) -> Color {
    return t * color_1 + (1.0 - t) * color_2;
}

/// Perceived brightness of a color (Rec. 601 weights).
pub fn luminance(color: Color) -> f32 {
    return 0.299 * color.x + 0.587 * color.y + 0.114 * color.z;
}

/// Convert a color channel to a byte, clamping to [0, 1] first.
pub fn channel_to_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    return (value.clamp(0.0, 1.0) * 255.0).round() as u8;
}
