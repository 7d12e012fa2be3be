//! Phong illumination: ambient, diffuse and specular terms per light, summed over lights,
//! with optional fog and toon quantization.
//!
//! All vectors are in world space. Zero length directions (light or eye sitting on the
//! surface point, normals of degenerate faces) give zero diffuse and specular instead of NaN.

use nalgebra as na;
use na::Vector3;

use crate::scene::light::Light;
use crate::scene::model::Material;
use crate::scene::RenderFlags;
use crate::util::{color_blend, normalize_or_zero, reflect, Color};

/// Color the scene fades into with fog on.
pub fn haze_color() -> Color {
    return Color::new(0.8, 0.8, 0.8);
}

/// Which illumination terms are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingTerms {
    pub ambient: bool,
    pub diffuse: bool,
    pub specular: bool,
}

impl Default for LightingTerms {
    fn default() -> Self {
        return Self { ambient: true, diffuse: true, specular: true };
    }
}

impl From<&RenderFlags> for LightingTerms {
    fn from(flags: &RenderFlags) -> Self {
        return Self { ambient: flags.ambient, diffuse: flags.diffuse, specular: flags.specular };
    }
}

/// Point being lit with its (not necessarily unit) normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
}

/// Directions for one light at one point, recomputed for every evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVectors {
    pub incident: Vector3<f32>,  // I, from the point to the light.
    pub normal: Vector3<f32>,    // N
    pub view: Vector3<f32>,      // V, from the point to the eye.
    pub reflected: Vector3<f32>, // R, reflection of -I about N.
}

impl LightVectors {
    pub fn new(light_position: Vector3<f32>, surface: &SurfacePoint, eye: Vector3<f32>) -> Self {
        let incident = normalize_or_zero(light_position - surface.position);
        let normal = normalize_or_zero(surface.normal);
        let view = normalize_or_zero(eye - surface.position);
        let reflected = reflect(-incident, normal);
        return Self { incident, normal, view, reflected };
    }

    /// Both the light direction and the normal are defined.
    fn has_incidence(&self) -> bool {
        return self.incident != Vector3::zeros() && self.normal != Vector3::zeros();
    }
}

/// Ia = Ka * La, component wise. Not clamped.
pub fn ambient_term(light: &Light, material: &Material) -> Color {
    return material.ambient.component_mul(&light.ambient_color);
}

/// Id = (N . I) * (Kd * Ld), clamped to [0, 1] per channel.
pub fn diffuse_term(light: &Light, material: &Material, vectors: &LightVectors) -> Color {
    if !vectors.has_incidence() {
        return Color::zeros();
    }
    let theta = vectors.normal.dot(&vectors.incident);
    let diffuse = material.diffuse.component_mul(&light.diffuse_color) * theta;
    return diffuse.map(|channel| channel.clamp(0.0, 1.0));
}

/// Is = max(V . R, 0)^alpha * (Ks * Ls).
pub fn specular_term(light: &Light, material: &Material, vectors: &LightVectors) -> Color {
    if !vectors.has_incidence() || vectors.view == Vector3::zeros() {
        return Color::zeros();
    }
    let spec = vectors.view.dot(&vectors.reflected).max(0.0).powf(material.shininess);
    return material.specular.component_mul(&light.specular_color) * spec;
}

/// Ia + Id + Is of one light, each term only when enabled.
pub fn illuminate(
    light: &Light,
    material: &Material,
    surface: &SurfacePoint,
    eye: Vector3<f32>,
    terms: LightingTerms,
) -> Color {
    let vectors = LightVectors::new(light.position(), surface, eye);
    let mut color = Color::zeros();
    if terms.ambient {
        color += ambient_term(light, material);
    }
    if terms.diffuse {
        color += diffuse_term(light, material, &vectors);
    }
    if terms.specular {
        color += specular_term(light, material, &vectors);
    }
    return color;
}

/// Sum of all lights. The sum is not clamped and may exceed 1.
pub fn shade(
    lights: &[Light],
    material: &Material,
    surface: &SurfacePoint,
    eye: Vector3<f32>,
    terms: LightingTerms,
) -> Color {
    return lights
        .iter()
        .map(|light| illuminate(light, material, surface, eye, terms))
        .fold(Color::zeros(), |sum, color| sum + color);
}

/// Linear fog: factor = (far - |depth|) / (far - near), color = factor * shaded +
/// (1 - factor) * haze. The factor is not clamped.
pub fn apply_fog(color: Color, depth: f32, near: f32, far: f32) -> Color {
    let range = far - near;
    if range == 0.0 || !range.is_finite() {
        return color;
    }
    let factor = (far - depth.abs()) / range;
    return color_blend(color, haze_color(), factor);
}

/// Toon look: every channel snapped down to one of levels bands.
pub fn quantize(color: Color, levels: f32) -> Color {
    if !(levels >= 1.0) {
        return color;
    }
    let levels = levels.floor();
    return color.map(|channel| (channel * levels).floor() / levels);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(ambient: bool, diffuse: bool, specular: bool) -> LightingTerms {
        return LightingTerms { ambient, diffuse, specular };
    }

    fn material(ka: Color, kd: Color, ks: Color) -> Material {
        return Material { ambient: ka, diffuse: kd, specular: ks, shininess: 10.0 };
    }

    #[test]
    fn ambient_only_is_component_product() {
        let light = Light::at(Vector3::new(0.0, 10.0, 0.0));
        let material = material(Color::new(1.0, 0.0, 0.0), Color::repeat(1.0), Color::repeat(1.0));
        let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::y() };
        let color = illuminate(&light, &material, &surface, Vector3::new(0.0, 0.0, 5.0), only(true, false, false));
        assert_eq!(color, Color::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn diffuse_follows_incidence_angle() {
        let light = Light::at(Vector3::new(0.0, 10.0, 0.0)).with_colors(Color::zeros(), Color::repeat(1.0), Color::zeros());
        let material = material(Color::zeros(), Color::new(1.0, 0.5, 0.0), Color::zeros());
        let facing = SurfacePoint { position: Vector3::zeros(), normal: Vector3::y() };
        let color = illuminate(&light, &material, &facing, Vector3::z(), only(false, true, false));
        assert!((color - Color::new(1.0, 0.5, 0.0)).norm() < 1e-6);

        let tilted = SurfacePoint { position: Vector3::zeros(), normal: Vector3::new(1.0, 1.0, 0.0) };
        let color = illuminate(&light, &material, &tilted, Vector3::z(), only(false, true, false));
        let cos = std::f32::consts::FRAC_1_SQRT_2;
        assert!((color - Color::new(cos, 0.5 * cos, 0.0)).norm() < 1e-6);

        let away = SurfacePoint { position: Vector3::zeros(), normal: -Vector3::y() };
        let color = illuminate(&light, &material, &away, Vector3::z(), only(false, true, false));
        assert_eq!(color, Color::zeros());
    }

    #[test]
    fn diffuse_is_clamped_per_term() {
        let light = Light::at(Vector3::new(0.0, 1.0, 0.0)).with_colors(Color::repeat(2.0), Color::repeat(3.0), Color::zeros());
        let material = material(Color::repeat(1.0), Color::repeat(1.0), Color::zeros());
        let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::y() };
        let color = illuminate(&light, &material, &surface, Vector3::z(), only(true, true, false));
        // Ambient 2.0 is left alone, diffuse 3.0 is clamped to 1.0.
        assert_eq!(color, Color::repeat(3.0));
    }

    #[test]
    fn specular_peaks_on_mirror_direction() {
        let light = Light::at(Vector3::new(-1.0, 1.0, 0.0)).with_colors(Color::zeros(), Color::zeros(), Color::repeat(1.0));
        let material = material(Color::zeros(), Color::zeros(), Color::repeat(1.0));
        let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::y() };
        let mirror = illuminate(&light, &material, &surface, Vector3::new(1.0, 1.0, 0.0), only(false, false, true));
        assert!((mirror - Color::repeat(1.0)).norm() < 1e-5);
        let off = illuminate(&light, &material, &surface, Vector3::new(0.0, 1.0, 0.0), only(false, false, true));
        let expected = std::f32::consts::FRAC_1_SQRT_2.powf(10.0);
        assert!((off - Color::repeat(expected)).norm() < 1e-5);
        let behind = illuminate(&light, &material, &surface, Vector3::new(-1.0, 1.0, 0.0), only(false, false, true));
        assert_eq!(behind, Color::zeros());
    }

    #[test]
    fn light_on_the_surface_point_gives_no_nan() {
        let centroid = Vector3::new(0.3, 0.3, 0.0);
        let light = Light::at(centroid);
        let material = Material { shininess: 0.0, ..Material::default() };
        let surface = SurfacePoint { position: centroid, normal: Vector3::z() };
        let vectors = LightVectors::new(light.position(), &surface, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(vectors.incident, Vector3::zeros());
        assert_eq!(diffuse_term(&light, &material, &vectors), Color::zeros());
        assert_eq!(specular_term(&light, &material, &vectors), Color::zeros());
        let color = illuminate(&light, &material, &surface, Vector3::new(0.0, 0.0, 5.0), LightingTerms::default());
        assert!(color.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn zero_normal_gives_no_nan() {
        let light = Light::default();
        let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::zeros() };
        let color = illuminate(&light, &Material::default(), &surface, Vector3::z(), LightingTerms::default());
        assert!(color.iter().all(|c| c.is_finite()));
        assert_eq!(color, ambient_term(&light, &Material::default()));
    }

    #[test]
    fn lights_add_without_clamping() {
        let material = material(Color::repeat(1.0), Color::zeros(), Color::zeros());
        let surface = SurfacePoint { position: Vector3::zeros(), normal: Vector3::y() };
        let bright = Light::default().with_colors(Color::repeat(0.75), Color::zeros(), Color::zeros());
        let lights = [bright.clone(), bright];
        let color = shade(&lights, &material, &surface, Vector3::z(), LightingTerms::default());
        assert_eq!(color, Color::repeat(1.5));
        assert_eq!(shade(&[], &material, &surface, Vector3::z(), LightingTerms::default()), Color::zeros());
    }

    #[test]
    fn fog_interpolates_and_extrapolates() {
        let color = Color::new(1.0, 0.0, 0.0);
        assert_eq!(apply_fog(color, 0.0, 0.0, 10.0), color);
        assert_eq!(apply_fog(color, 10.0, 0.0, 10.0), haze_color());
        let half = apply_fog(color, -5.0, 0.0, 10.0);
        assert!((half - Color::new(0.9, 0.4, 0.4)).norm() < 1e-6);
        // Beyond far the factor goes negative and is kept.
        let beyond = apply_fog(color, 20.0, 0.0, 10.0);
        assert!((beyond - Color::new(0.6, 1.6, 1.6)).norm() < 1e-5);
        assert_eq!(apply_fog(color, 3.0, 2.0, 2.0), color);
    }

    #[test]
    fn quantize_snaps_to_bands() {
        let color = Color::new(0.1, 0.49, 0.99);
        assert_eq!(quantize(color, 2.0), Color::new(0.0, 0.0, 0.5));
        assert_eq!(quantize(color, 4.0), Color::new(0.0, 0.25, 0.75));
        assert_eq!(quantize(color, 0.0), color);
    }
}
