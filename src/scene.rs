//! Scene description consumed by the renderer: models, cameras, lights and feature flags.
//! Everything here is plain data, the renderer only reads it.

pub mod camera;
pub mod light;
pub mod model;
pub mod obj;
pub mod transform;

use camera::Camera;
use light::Light;
use model::Model;

use crate::util::Color;

/// Which lighting evaluation is used for filled triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// One evaluation per triangle.
    Flat,
    /// One evaluation per covered pixel with interpolated normals.
    #[default]
    Phong,
}

/// Feature switches of the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderFlags {
    pub draw_axes: bool,
    pub draw_box: bool,
    pub draw_normals: bool,
    pub draw_face_normals: bool,
    pub bounding_rectangles: bool,
    pub paint_triangles: bool,
    pub gray_scale: bool,
    pub depth_color: bool, // Paint covered pixels by their z-buffer value.
    pub lighting: bool,
    pub ambient: bool,
    pub diffuse: bool,
    pub specular: bool,
    pub shading: ShadingMode,
    pub fog: bool,
    pub multi_light: bool,
    pub toon: bool,
    pub levels: f32, // Number of toon bands.
    pub normal_length: f32, // Length of drawn normals in object space units.
}

impl Default for RenderFlags {
    fn default() -> Self {
        return Self {
            draw_axes: false,
            draw_box: false,
            draw_normals: false,
            draw_face_normals: false,
            bounding_rectangles: false,
            paint_triangles: true,
            gray_scale: false,
            depth_color: false,
            lighting: true,
            ambient: true,
            diffuse: true,
            specular: true,
            shading: ShadingMode::Phong,
            fog: false,
            multi_light: false,
            toon: false,
            levels: 4.0,
            normal_length: 0.1,
        };
    }
}

impl RenderFlags {
    /// Flags for a bare wireframe, nothing but triangle edges.
    pub fn wireframe() -> Self {
        return Self { paint_triangles: false, lighting: false, ..Self::default() };
    }
}

/// Everything one frame is rendered from.
#[derive(Debug, Clone)]
pub struct Scene {
    pub models: Vec<Model>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub flags: RenderFlags,
    pub background: Color,
    active_camera: usize,
    active_model: usize,
}

impl Default for Scene {
    fn default() -> Self {
        return Self {
            models: Vec::new(),
            cameras: vec![Camera::default()],
            lights: vec![Light::default()],
            flags: RenderFlags::default(),
            background: Color::repeat(0.8),
            active_camera: 0,
            active_model: 0,
        };
    }
}

impl Scene {
    pub fn add_model(&mut self, model: Model) {
        self.models.push(model);
        self.active_model = self.models.len() - 1;
    }

    pub fn add_camera(&mut self, camera: Camera) {
        self.cameras.push(camera);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Active camera. A scene without cameras uses a default one.
    pub fn active_camera(&self) -> Camera {
        return self.cameras.get(self.active_camera).cloned().unwrap_or_default();
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        return self.cameras.get_mut(self.active_camera);
    }

    pub fn set_active_camera(&mut self, index: usize) {
        if index < self.cameras.len() {
            self.active_camera = index;
        } else {
            log::warn!("No camera with index {}, keeping {}", index, self.active_camera);
        }
    }

    pub fn active_model_mut(&mut self) -> Option<&mut Model> {
        return self.models.get_mut(self.active_model);
    }

    pub fn set_active_model(&mut self, index: usize) {
        if index < self.models.len() {
            self.active_model = index;
        } else {
            log::warn!("No model with index {}, keeping {}", index, self.active_model);
        }
    }

    /// Lights taking part in shading: all of them with multi-light on, otherwise the first.
    pub fn active_lights(&self) -> &[Light] {
        if self.flags.multi_light {
            return &self.lights[..];
        }
        return &self.lights[..self.lights.len().min(1)];
    }
}
