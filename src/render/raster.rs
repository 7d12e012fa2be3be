use std::ops::{Add, Mul};

use nalgebra as na;
use na::{Vector2, Vector3};

use crate::render::buffer::{CoverageMask, FrameBuffer};
use crate::util::Color;

/// Triangles with an absolute pixel area below this are not filled.
pub const AREA_EPSILON: f32 = 1e-6;

/// Integer pixel rectangle [offset_x, offset_x + dx] x [offset_y, offset_y + dy], inclusive.
/// Wide integers, so vertices far outside the viewport do not overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub offset_x: i64,
    pub offset_y: i64,
    pub dx: i64,
    pub dy: i64,
}

/// Pixel holding a viewport space point. Coordinates beyond the i32 range saturate.
pub fn pixel_of(v: Vector3<f32>) -> (i32, i32) {
    return (v.x.floor() as i32, v.y.floor() as i32);
}

/// Pixel rectangle around the three vertices.
pub fn bounding_rect(vertices: &[Vector3<f32>; 3]) -> PixelRect {
    let (x, y) = pixel_of(vertices[0]);
    let (mut min_x, mut min_y) = (x as i64, y as i64);
    let (mut max_x, mut max_y) = (min_x, min_y);
    for v in &vertices[1..] {
        let (x, y) = pixel_of(*v);
        min_x = min_x.min(x as i64);
        min_y = min_y.min(y as i64);
        max_x = max_x.max(x as i64);
        max_y = max_y.max(y as i64);
    }
    return PixelRect { offset_x: min_x, offset_y: min_y, dx: max_x - min_x, dy: max_y - min_y };
}

/// Narrows the parameter range of start + t * delta to where the coordinate stays in [lo, hi].
fn clip_axis(start: f64, delta: f64, lo: f64, hi: f64, range: (f64, f64)) -> Option<(f64, f64)> {
    if delta == 0.0 {
        if start < lo || start > hi {
            return None;
        }
        return Some(range);
    }
    let (a, b) = ((lo - start) / delta, (hi - start) / delta);
    let t_0 = range.0.max(a.min(b));
    let t_1 = range.1.min(a.max(b));
    if t_0 > t_1 {
        return None;
    }
    return Some((t_0, t_1));
}

/// Liang-Barsky clip of the segment a-b against the box [min, max].
/// Ends that are already inside come back unchanged.
pub fn clip_segment(
    a: Vector2<f32>,
    b: Vector2<f32>,
    min: Vector2<f32>,
    max: Vector2<f32>,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    let (a_64, b_64) = (a.cast::<f64>(), b.cast::<f64>());
    let delta = b_64 - a_64;
    let range = clip_axis(a_64.x, delta.x, min.x as f64, max.x as f64, (0.0, 1.0))?;
    let (t_0, t_1) = clip_axis(a_64.y, delta.y, min.y as f64, max.y as f64, range)?;
    let at = |t: f64| -> Vector2<f32> {
        if t == 0.0 {
            return a;
        }
        if t == 1.0 {
            return b;
        }
        return (a_64 + delta * t).cast::<f32>();
    };
    return Some((at(t_0), at(t_1)));
}

/// Pixels a triangle may touch: its bounding rectangle grown by one pixel, cut down to the
/// frame plus a one pixel border. Rows -1 and height stand in for everything beyond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanWindow {
    x_min: i32,
    y_min: i32,
    x_max: i32,
    y_max: i32,
}

impl ScanWindow {
    fn new(rect: &PixelRect, width: u32, height: u32) -> Self {
        let x_min = (rect.offset_x - 1).max(-1);
        let y_min = (rect.offset_y - 1).max(-1);
        let x_max = (rect.offset_x + rect.dx + 1).min(width as i64);
        let y_max = (rect.offset_y + rect.dy + 1).min(height as i64);
        // A rectangle off the frame gives an empty window, still within i32.
        return Self {
            x_min: x_min.min(width as i64 + 1) as i32,
            y_min: y_min.min(height as i64 + 1) as i32,
            x_max: x_max.max(-2) as i32,
            y_max: y_max.max(-2) as i32,
        };
    }

    fn is_empty(&self) -> bool {
        return self.x_min > self.x_max || self.y_min > self.y_max;
    }

    fn contains(&self, (x, y): (i32, i32)) -> bool {
        return x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max;
    }

    fn width(&self) -> usize {
        return (self.x_max - self.x_min + 1).max(0) as usize;
    }

    fn height(&self) -> usize {
        return (self.y_max - self.y_min + 1).max(0) as usize;
    }

    /// Nearest lattice pixel to a point, pulled onto the window. The window must not be empty.
    fn pixel(&self, x: f64, y: f64) -> (i32, i32) {
        let x = x.round().clamp(self.x_min as f64, self.x_max as f64) as i32;
        let y = y.round().clamp(self.y_min as f64, self.y_max as f64) as i32;
        return (x, y);
    }
}

/// Plots the pixel line between the end pixels of a-b, restricted to the window. Stretches
/// of the line above or below the window go onto the border row of their columns, so every
/// column the edge crosses keeps a mark. Stretches left or right of the window are dropped.
fn trace_edge(a: Vector3<f32>, b: Vector3<f32>, window: &ScanWindow, mut plot: impl FnMut(i32, i32)) {
    let (pixel_a, pixel_b) = (pixel_of(a), pixel_of(b));
    if window.contains(pixel_a) && window.contains(pixel_b) {
        bresenham(pixel_a.0, pixel_a.1, pixel_b.0, pixel_b.1, plot);
        return;
    }

    let start = Vector2::new(pixel_a.0 as f64, pixel_a.1 as f64);
    let delta = Vector2::new(pixel_b.0 as f64, pixel_b.1 as f64) - start;
    let at = |t: f64| start + delta * t;
    let (x_lo, x_hi) = (window.x_min as f64, window.x_max as f64);
    let (y_lo, y_hi) = (window.y_min as f64, window.y_max as f64);
    let columns = match clip_axis(start.x, delta.x, x_lo, x_hi, (0.0, 1.0)) {
        Some(columns) => columns,
        None => return,
    };

    let border = |from: f64, to: f64, plot: &mut dyn FnMut(i32, i32)| {
        let row = if at((from + to) / 2.0).y < y_lo { window.y_min } else { window.y_max };
        let (x_0, _) = window.pixel(at(from).x, y_lo);
        let (x_1, _) = window.pixel(at(to).x, y_lo);
        for x in x_0.min(x_1)..=x_0.max(x_1) {
            plot(x, row);
        }
    };

    match clip_axis(start.y, delta.y, y_lo, y_hi, columns) {
        Some((t_0, t_1)) => {
            if columns.0 < t_0 {
                border(columns.0, t_0, &mut plot);
            }
            if t_1 < columns.1 {
                border(t_1, columns.1, &mut plot);
            }
            let (p_0, p_1) = (at(t_0), at(t_1));
            let (x_0, y_0) = window.pixel(p_0.x, p_0.y);
            let (x_1, y_1) = window.pixel(p_1.x, p_1.y);
            bresenham(x_0, y_0, x_1, y_1, &mut plot);
        }
        None => border(columns.0, columns.1, &mut plot),
    }
}

/// Integer line from (x_0, y_0) to (x_1, y_1), both ends included, via Bresenham's algorithm
/// as presented in https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
/// Works in all octants and gives the same pixels in both directions for axis aligned
/// and diagonal lines.
pub fn bresenham(x_0: i32, y_0: i32, x_1: i32, y_1: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x, mut y) = (x_0, y_0);
    let dx: i64 = (x_1 as i64 - x_0 as i64).abs();
    let sx: i32 = if x_0 < x_1 { 1 } else { -1 };
    let dy: i64 = -(y_1 as i64 - y_0 as i64).abs();
    let sy: i32 = if y_0 < y_1 { 1 } else { -1 };
    let mut error = dx + dy;

    loop {
        plot(x, y);
        if x == x_1 && y == y_1 {
            break;
        }
        let e2 = 2 * error;
        if e2 >= dy {
            if x == x_1 {
                break;
            }
            error += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y_1 {
                break;
            }
            error += dx;
            y += sy;
        }
    }
}

/// Signed area of the 2D triangle (a, b, c), positive for counter clockwise order.
pub fn signed_area(a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> f32 {
    return ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) / 2.0;
}

/// Area ratio weights of a viewport space triangle, using only x and y.
#[derive(Debug, Clone, Copy)]
pub struct Barycentric {
    a: Vector2<f32>,
    b: Vector2<f32>,
    c: Vector2<f32>,
    area: f32,
}

impl Barycentric {
    /// None for a triangle without area.
    pub fn new(vertices: &[Vector3<f32>; 3]) -> Option<Self> {
        let [a, b, c] = vertices.map(|v| v.xy());
        let area = signed_area(a, b, c);
        if !(area.abs() >= AREA_EPSILON) {
            return None;
        }
        return Some(Self { a, b, c, area });
    }

    /// Weights of the three vertices at (x, y). They sum to 1 and are exactly (1, 0, 0)
    /// and so on at the vertices themselves.
    pub fn weights(&self, x: f32, y: f32) -> Vector3<f32> {
        let p = Vector2::new(x, y);
        return Vector3::new(
            signed_area(p, self.b, self.c) / self.area,
            signed_area(self.a, p, self.c) / self.area,
            signed_area(self.a, self.b, p) / self.area,
        );
    }
}

/// Weighted sum of three per-vertex attributes.
pub fn interpolate<T>(weights: &Vector3<f32>, values: &[T; 3]) -> T
where
    T: Copy + Mul<f32, Output = T> + Add<Output = T>,
{
    return values[0] * weights.x + values[1] * weights.y + values[2] * weights.z;
}

/// Depth at (x, y) interpolated from the vertex depths.
pub fn find_z(barycentric: &Barycentric, vertices: &[Vector3<f32>; 3], x: f32, y: f32) -> f32 {
    let weights = barycentric.weights(x, y);
    return interpolate(&weights, &[vertices[0].z, vertices[1].z, vertices[2].z]);
}

/// A pixel that passed the depth test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i32,
    pub y: i32,
    pub depth: f32,
    pub weights: Vector3<f32>,
}

/// What happened to a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Filled, with the number of pixels that passed the depth test.
    Filled(usize),
    /// Only edges were requested.
    Wireframe,
    /// Edges drawn, fill skipped because the triangle has no area.
    Degenerate,
    /// Nothing drawn because of non finite coordinates.
    Rejected,
}

/// Scan converter. Owns the coverage mask so its storage is reused between triangles.
#[derive(Debug, Default)]
pub struct Rasterizer {
    mask: CoverageMask,
}

impl Rasterizer {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn mask(&self) -> &CoverageMask {
        return &self.mask;
    }

    /// Draws the three edges in edge_color and, when fill is set, fills the triangle column
    /// by column. Every pixel whose interpolated depth is not farther than the stored one
    /// gets its depth written and its color from shade.
    pub fn draw_triangle(
        &mut self,
        frame: &mut FrameBuffer,
        vertices: &[Vector3<f32>; 3],
        edge_color: Color,
        fill: bool,
        mut shade: impl FnMut(&Fragment) -> Color,
    ) -> TriangleOutcome {
        if vertices.iter().any(|v| !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite())) {
            log::trace!("Rejecting triangle with non finite vertices {:?}", vertices);
            return TriangleOutcome::Rejected;
        }
        let rect = bounding_rect(vertices);
        let window = ScanWindow::new(&rect, frame.width(), frame.height());
        let mask = &mut self.mask;
        mask.reset(window.x_min, window.y_min, window.width(), window.height());

        if !window.is_empty() {
            for (from, to) in [(0, 1), (1, 2), (2, 0)] {
                trace_edge(vertices[from], vertices[to], &window, |x, y| {
                    frame.put_pixel(x, y, edge_color);
                    mask.mark(x, y, CoverageMask::EDGE);
                });
            }
        }

        if !fill {
            return TriangleOutcome::Wireframe;
        }
        let barycentric = match Barycentric::new(vertices) {
            Some(barycentric) => barycentric,
            None => return TriangleOutcome::Degenerate,
        };
        let depths = [vertices[0].z, vertices[1].z, vertices[2].z];

        let column_start = window.x_min.max(0);
        let column_end = window.x_max.min(frame.width() as i32 - 1);
        let mut covered = 0;
        for x in column_start..=column_end {
            // First and last edge pixel of this column, scanning from the top.
            let mut first = None;
            let mut last = None;
            for y in (window.y_min..=window.y_max).rev() {
                if mask.is_marked(x, y, CoverageMask::EDGE) {
                    if first.is_none() {
                        first = Some(y);
                    }
                    last = Some(y);
                }
            }
            let (top, bottom) = match (first, last) {
                (Some(top), Some(bottom)) => (top, bottom),
                _ => continue,
            };

            let top = top.min(frame.height() as i32 - 1);
            let bottom = bottom.max(0);
            for y in (bottom..=top).rev() {
                let weights = barycentric.weights(x as f32, y as f32);
                let depth = interpolate(&weights, &depths);
                if !depth.is_finite() {
                    continue;
                }
                if depth <= frame.depth().get(x, y) {
                    frame.depth_mut().set(x, y, depth);
                    mask.mark(x, y, CoverageMask::COVERED);
                    let color = shade(&Fragment { x, y, depth, weights });
                    frame.put_pixel(x, y, color);
                    covered += 1;
                }
            }
        }

        return TriangleOutcome::Filled(covered);
    }
}
