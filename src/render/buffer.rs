use image::RgbImage;

use crate::util::{channel_to_u8, Color};

/// Per-pixel nearest depth. Smaller is nearer, cleared to +infinity.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        return Self { width, height, data: vec![f32::INFINITY; (width * height) as usize] };
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        return Some(x as usize + y as usize * self.width as usize);
    }

    /// Stored depth, +infinity outside of the buffer.
    pub fn get(&self, x: i32, y: i32) -> f32 {
        return match self.index(x, y) {
            Some(index) => self.data[index],
            None => f32::INFINITY,
        };
    }

    /// Writes unconditionally. Coordinates must be inside the buffer.
    pub fn set(&mut self, x: i32, y: i32, depth: f32) {
        debug_assert!(self.index(x, y).is_some(), "depth write outside of buffer at ({}, {})", x, y);
        let index = x as usize + y as usize * self.width as usize;
        self.data[index] = depth;
    }

    pub fn reset(&mut self) {
        self.data.fill(f32::INFINITY);
    }

    pub fn as_slice(&self) -> &[f32] {
        return &self.data[..];
    }
}

/// Color buffer with its depth buffer. (0, 0) is the bottom left pixel.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    color: Vec<Color>,
    depth: DepthBuffer,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        return Self {
            width,
            height,
            color: vec![Color::zeros(); (width * height) as usize],
            depth: DepthBuffer::new(width, height),
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Reallocates both buffers, previous content is dropped.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        return x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32;
    }

    /// Sets the pixel color. Coordinates outside of the buffer are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.contains(x, y) {
            return;
        }
        let index = x as usize + y as usize * self.width as usize;
        self.color[index] = color;
    }

    /// Pixel color, None outside of the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        return Some(self.color[x as usize + y as usize * self.width as usize]);
    }

    /// Sets every pixel to color and resets the depth buffer.
    pub fn clear(&mut self, color: Color) {
        self.color.fill(color);
        self.depth.reset();
    }

    pub fn depth(&self) -> &DepthBuffer {
        return &self.depth;
    }

    pub fn depth_mut(&mut self) -> &mut DepthBuffer {
        return &mut self.depth;
    }

    pub fn colors(&self) -> &[Color] {
        return &self.color[..];
    }

    pub fn colors_mut(&mut self) -> &mut [Color] {
        return &mut self.color[..];
    }

    /// Raw rgb8 data, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.color.len() * 3);
        for row in (0..self.height as usize).rev() {
            let start = row * self.width as usize;
            for color in &self.color[start..start + self.width as usize] {
                data.push(channel_to_u8(color.x));
                data.push(channel_to_u8(color.y));
                data.push(channel_to_u8(color.z));
            }
        }
        return data;
    }

    pub fn to_image(&self) -> RgbImage {
        // Length always matches width * height * 3.
        return RgbImage::from_raw(self.width, self.height, self.to_rgb8())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height));
    }
}

/// Scratch marks for the triangle being filled, over its bounding rectangle.
/// Storage is kept between triangles, only the logical rectangle changes.
#[derive(Debug, Clone, Default)]
pub struct CoverageMask {
    offset_x: i32,
    offset_y: i32,
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl CoverageMask {
    pub const EDGE: u8 = 0b01;
    pub const COVERED: u8 = 0b10;

    pub fn new() -> Self {
        return Self::default();
    }

    /// Clears the mask and makes it cover [offset_x, offset_x + width) x [offset_y, offset_y + height).
    pub fn reset(&mut self, offset_x: i32, offset_y: i32, width: usize, height: usize) {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, 0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let column = x - self.offset_x;
        let row = y - self.offset_y;
        if column < 0 || row < 0 || column as usize >= self.width || row as usize >= self.height {
            return None;
        }
        return Some(row as usize * self.width + column as usize);
    }

    pub fn mark(&mut self, x: i32, y: i32, flag: u8) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] |= flag;
        }
    }

    pub fn is_marked(&self, x: i32, y: i32, flag: u8) -> bool {
        return match self.index(x, y) {
            Some(index) => self.cells[index] & flag != 0,
            None => false,
        };
    }

    pub fn count(&self, flag: u8) -> usize {
        return self.cells.iter().filter(|&&cell| cell & flag != 0).count();
    }

    /// Allocated cells, grows to the largest rectangle seen.
    pub fn capacity(&self) -> usize {
        return self.cells.capacity();
    }
}
