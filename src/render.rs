//! Software rendering pipeline: transform, rasterize, shade, write to the frame buffer.

pub mod buffer;
pub mod raster;
pub mod shader;
pub mod viewport;

use nalgebra as na;
use na::{Matrix3, Matrix4, Vector2, Vector3};

use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::model::Model;
use crate::scene::{RenderFlags, Scene, ShadingMode};
use crate::util::{from_hom_point, luminance, to_hom_point, Color};
use buffer::FrameBuffer;
use raster::{bounding_rect, bresenham, clip_segment, interpolate, pixel_of, Fragment, Rasterizer, TriangleOutcome};
use shader::{apply_fog, quantize, shade, LightingTerms, SurfacePoint};
use viewport::{clip_matrix, Viewport};

const BOX_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
const NORMAL_COLOR: [f32; 3] = [0.0, 0.6, 0.0];
const FACE_NORMAL_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
const RECT_COLOR: [f32; 3] = [1.0, 0.5, 0.0];
const X_AXIS_COLOR: [f32; 3] = [0.0, 0.0, 1.0];
const Y_AXIS_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

/// Counters of one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize,  // Triangles handed to the rasterizer.
    pub degenerate: usize, // Fill skipped, no area.
    pub rejected: usize,   // Not drawn at all.
    pub pixels: usize,     // Pixels that passed the depth test.
}

/// Owner of the frame buffer, depth buffer and coverage mask.
pub struct Renderer {
    viewport: Viewport,
    frame: FrameBuffer,
    rasterizer: Rasterizer,
}

/// Per-frame values shared by all models.
struct FrameContext<'a> {
    camera: Camera,
    lights: &'a [Light],
    flags: RenderFlags,
    eye: Vector3<f32>,
    fog_near: f32,
    fog_far: f32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        return Self {
            viewport: Viewport::new(width, height),
            frame: FrameBuffer::new(width, height),
            rasterizer: Rasterizer::new(),
        };
    }

    /// Reallocates all buffers for a new output size.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Resizing buffers to {}x{}", width, height);
        self.viewport = Viewport::new(width, height);
        self.frame.resize(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        return self.viewport;
    }

    pub fn frame(&self) -> &FrameBuffer {
        return &self.frame;
    }

    /// Line between two viewport space points, no depth test. Only the part over the frame
    /// is walked.
    pub fn draw_line(&mut self, a: Vector3<f32>, b: Vector3<f32>, color: Color) {
        if !(a.iter().all(|c| c.is_finite()) && b.iter().all(|c| c.is_finite())) {
            return;
        }
        let bounds = Vector2::new(self.frame.width() as f32, self.frame.height() as f32);
        let (a, b) = match clip_segment(a.xy(), b.xy(), Vector2::zeros(), bounds) {
            Some(segment) => segment,
            None => return,
        };
        let frame = &mut self.frame;
        let (x_0, y_0) = pixel_of(Vector3::new(a.x, a.y, 0.0));
        let (x_1, y_1) = pixel_of(Vector3::new(b.x, b.y, 0.0));
        bresenham(x_0, y_0, x_1, y_1, |x, y| frame.put_pixel(x, y, color));
    }

    /// Renders the whole scene into the frame buffer. Models go in list order, faces in
    /// face order.
    pub fn render(&mut self, scene: &Scene) -> RenderStats {
        self.frame.clear(scene.background);
        let camera = scene.active_camera();
        let context = FrameContext {
            lights: scene.active_lights(),
            flags: scene.flags,
            eye: camera.eye().coords,
            fog_near: self.viewport.to_depth(camera.near()),
            fog_far: self.viewport.to_depth(camera.far()),
            camera,
        };

        if context.flags.draw_axes {
            self.draw_axes();
        }
        let mut stats = RenderStats::default();
        for model in &scene.models {
            self.render_model(model, &context, &mut stats);
        }
        if context.flags.depth_color {
            self.paint_depth();
        }
        if context.flags.gray_scale {
            self.apply_gray_scale();
        }

        log::debug!(
            "Frame: {} triangles, {} degenerate, {} rejected, {} pixels",
            stats.triangles,
            stats.degenerate,
            stats.rejected,
            stats.pixels
        );
        return stats;
    }

    fn render_model(&mut self, model: &Model, context: &FrameContext, stats: &mut RenderStats) {
        let flags = &context.flags;
        let model_matrix = model.transform.matrix();
        let mvp = clip_matrix(context.camera.projection_matrix(), context.camera.view_matrix(), &model_matrix);
        let normal_matrix = normal_matrix(&model_matrix);
        let terms = LightingTerms::from(flags);
        let fill = flags.paint_triangles || flags.lighting;
        let mesh = &model.mesh;

        for face in mesh.faces() {
            let positions = mesh.face_positions(face);
            let screen = positions.map(|p| self.viewport.project(&mvp, p));
            let world = positions.map(|p| from_hom_point(model_matrix * to_hom_point(p)));
            let normals = match mesh.face_normals(face) {
                Some(normals) => normals.map(|n| normal_matrix * n),
                None => [(world[1] - world[0]).cross(&(world[2] - world[0])); 3],
            };

            // Flat mode evaluates once, at the centroid.
            let flat_color = if flags.lighting && flags.shading == ShadingMode::Flat {
                let third = Vector3::repeat(1.0 / 3.0);
                let centroid = SurfacePoint {
                    position: interpolate(&third, &world),
                    normal: interpolate(&third, &normals),
                };
                Some(shade(context.lights, &model.material, &centroid, context.eye, terms))
            } else {
                None
            };

            let shade_fragment = |fragment: &Fragment| -> Color {
                let mut color = if !flags.lighting {
                    model.color
                } else if let Some(color) = flat_color {
                    color
                } else {
                    let surface = SurfacePoint {
                        position: interpolate(&fragment.weights, &world),
                        normal: interpolate(&fragment.weights, &normals),
                    };
                    shade(context.lights, &model.material, &surface, context.eye, terms)
                };
                if flags.fog {
                    color = apply_fog(color, fragment.depth, context.fog_near, context.fog_far);
                }
                if flags.toon {
                    color = quantize(color, flags.levels);
                }
                return color;
            };

            let outcome = self.rasterizer.draw_triangle(&mut self.frame, &screen, model.color, fill, shade_fragment);
            stats.triangles += 1;
            match outcome {
                TriangleOutcome::Filled(pixels) => stats.pixels += pixels,
                TriangleOutcome::Degenerate => stats.degenerate += 1,
                TriangleOutcome::Rejected => stats.rejected += 1,
                TriangleOutcome::Wireframe => (),
            }

            if flags.bounding_rectangles && outcome != TriangleOutcome::Rejected {
                self.draw_rect(&screen);
            }
            if flags.draw_face_normals {
                let centroid = (positions[0] + positions[1] + positions[2]) / 3.0;
                let normal = (positions[1] - positions[0]).cross(&(positions[2] - positions[0]));
                if let Some(direction) = normal.try_normalize(f32::EPSILON) {
                    let tip = centroid + direction * flags.normal_length;
                    self.draw_line(self.viewport.project(&mvp, centroid), self.viewport.project(&mvp, tip), Color::from(FACE_NORMAL_COLOR));
                }
            }
            if flags.draw_normals {
                if let Some(normals) = mesh.face_normals(face) {
                    for (position, normal) in positions.iter().zip(normals) {
                        if let Some(direction) = normal.try_normalize(f32::EPSILON) {
                            let tip = position + direction * flags.normal_length;
                            self.draw_line(self.viewport.project(&mvp, *position), self.viewport.project(&mvp, tip), Color::from(NORMAL_COLOR));
                        }
                    }
                }
            }
        }

        if flags.draw_box {
            self.draw_bounding_box(model, &mvp);
        }
    }

    /// Outline of the pixel rectangle the rasterizer scans for this triangle.
    fn draw_rect(&mut self, screen: &[Vector3<f32>; 3]) {
        let rect = bounding_rect(screen);
        let (x_0, y_0) = (rect.offset_x as f32, rect.offset_y as f32);
        let (x_1, y_1) = ((rect.offset_x + rect.dx) as f32, (rect.offset_y + rect.dy) as f32);
        let corners = [
            Vector3::new(x_0, y_0, 0.0),
            Vector3::new(x_1, y_0, 0.0),
            Vector3::new(x_1, y_1, 0.0),
            Vector3::new(x_0, y_1, 0.0),
        ];
        for i in 0..4 {
            self.draw_line(corners[i], corners[(i + 1) % 4], Color::from(RECT_COLOR));
        }
    }

    /// Object space bounding box of the model as 12 lines.
    fn draw_bounding_box(&mut self, model: &Model, mvp: &Matrix4<f32>) {
        let (min, max) = match model.mesh.bounding_box() {
            Some(bounds) => bounds,
            None => return,
        };
        // Corner i takes max on axis k when bit k of i is set.
        let corners: Vec<Vector3<f32>> = (0..8)
            .map(|i| {
                Vector3::new(
                    if i & 1 != 0 { max.x } else { min.x },
                    if i & 2 != 0 { max.y } else { min.y },
                    if i & 4 != 0 { max.z } else { min.z },
                )
            })
            .map(|corner| self.viewport.project(mvp, corner))
            .collect();
        for i in 0..8usize {
            for bit in [1usize, 2, 4] {
                if i & bit == 0 {
                    self.draw_line(corners[i], corners[i | bit], Color::from(BOX_COLOR));
                }
            }
        }
    }

    /// Screen axes through the viewport center.
    fn draw_axes(&mut self) {
        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;
        let half_width = (self.frame.width() / 2) as f32;
        let half_height = (self.frame.height() / 2) as f32;
        self.draw_line(Vector3::new(0.0, half_height, 0.0), Vector3::new(width, half_height, 0.0), Color::from(X_AXIS_COLOR));
        self.draw_line(Vector3::new(half_width, 0.0, 0.0), Vector3::new(half_width, height, 0.0), Color::from(Y_AXIS_COLOR));
    }

    /// Replaces covered pixels with their normalized depth, near is white and far is black.
    fn paint_depth(&mut self) {
        let depths: Vec<f32> = self.frame.depth().as_slice().to_vec();
        let (z_min, z_max) = depths
            .iter()
            .filter(|z| z.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &z| (lo.min(z), hi.max(z)));
        if !z_min.is_finite() {
            return;
        }
        let scale = z_max - z_min;
        for (color, z) in self.frame.colors_mut().iter_mut().zip(depths) {
            if !z.is_finite() {
                continue;
            }
            let t = if scale > 0.0 { (z - z_min) / scale } else { 0.0 };
            *color = Color::repeat(1.0 - t);
        }
    }

    fn apply_gray_scale(&mut self) {
        for color in self.frame.colors_mut() {
            *color = Color::repeat(luminance(*color));
        }
    }
}

/// Inverse transpose of the upper 3x3 block, maps object normals to world normals.
/// A singular model matrix maps every normal to zero.
fn normal_matrix(model_matrix: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_fn(|row, column| model_matrix[(row, column)]);
    return match linear.try_inverse() {
        Some(inverse) => inverse.transpose(),
        None => Matrix3::zeros(),
    };
}
