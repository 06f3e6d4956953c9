//! Core rendering functions
//! Scanline triangle fill with perspective-correct texturing and depth test

use super::math::Vec3;
use super::types::{Color, TexCoord, Texture};

/// Per-pixel depth, reset to +infinity every frame.
///
/// Stores the interpolated `1/w` of the written fragment. The projection
/// puts `-z` in `w`, so visible fragments have negative values and a
/// smaller value is nearer to the camera.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![f32::INFINITY; width * height],
        }
    }

    pub fn clear(&mut self) {
        self.values.fill(f32::INFINITY);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Store `depth` if it is nearer than the current value
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let slot = &mut self.values[y * self.width + x];
        if depth < *slot {
            *slot = depth;
            true
        } else {
            false
        }
    }
}

/// Framebuffer for software rendering
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub depth: DepthBuffer,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: DepthBuffer::new(width, height),
            width,
            height,
        }
    }

    /// Reallocate for a new size. Contents are cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.depth.clear();
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Write the pixel only if `z` passes the depth test
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f32, color: Color) -> bool {
        if self.depth.test_and_set(x, y, z) {
            self.set_pixel(x, y, color);
            true
        } else {
            false
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let p = &self.pixels[idx..idx + 4];
            Some(Color::with_alpha(p[0], p[1], p[2], p[3]))
        } else {
            None
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Outline a screen-space triangle
    pub fn draw_triangle_outline(&mut self, p: &[Vec3; 3], color: Color) {
        for i in 0..3 {
            let a = p[i];
            let b = p[(i + 1) % 3];
            self.draw_line(a.x as i32, a.y as i32, b.x as i32, b.y as i32, color);
        }
    }
}

/// Screen-space vertex handed to the rasterizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub tex: TexCoord,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, tex: TexCoord) -> Self {
        Self { x, y, tex }
    }

    pub fn from_point(p: Vec3, tex: TexCoord) -> Self {
        Self { x: p.x, y: p.y, tex }
    }
}

/// How a rasterized triangle gets its color
#[derive(Debug, Clone, Copy)]
pub enum Fill<'a> {
    /// Base color, used for meshes without a texture
    Solid(Color),
    /// Texture sample darkened by the face's lightness factor
    Textured { texture: &'a Texture, lightness: f32 },
}

#[derive(Clone, Copy)]
struct Corner {
    x: i32,
    y: i32,
    tex: TexCoord,
}

/// Per-scanline increments along one edge
#[derive(Clone, Copy, Default)]
struct EdgeStep {
    x: f32,
    u: f32,
    v: f32,
    w: f32,
}

impl EdgeStep {
    /// Zero steps for horizontal edges (`dy == 0`)
    fn between(from: &Corner, to: &Corner) -> Self {
        let dy = (to.y - from.y).abs();
        if dy == 0 {
            return Self::default();
        }
        let dy = dy as f32;
        Self {
            x: (to.x - from.x) as f32 / dy,
            u: (to.tex.u - from.tex.u) / dy,
            v: (to.tex.v - from.tex.v) / dy,
            w: (to.tex.w - from.tex.w) / dy,
        }
    }

    fn advance(&self, from: &Corner, rows: f32) -> (f32, TexCoord) {
        (
            from.x as f32 + rows * self.x,
            TexCoord {
                u: from.tex.u + rows * self.u,
                v: from.tex.v + rows * self.v,
                w: from.tex.w + rows * self.w,
            },
        )
    }
}

/// Walk every covered pixel of a screen-space triangle.
///
/// Vertices are sorted by y and the triangle is split at the middle vertex
/// into a flat-bottom and a flat-top half. Each scanline spans from the
/// short edge to the long edge; `u`, `v`, `w` are interpolated linearly
/// along the span and handed to `plot` unchanged, so callers that stored
/// `(u/w, v/w, 1/w)` recover perspective-correct UVs by dividing by the
/// interpolated `w`.
pub fn walk_triangle<F: FnMut(i32, i32, TexCoord)>(verts: [ScreenVertex; 3], mut plot: F) {
    let mut c = verts.map(|s| Corner { x: s.x as i32, y: s.y as i32, tex: s.tex });
    c.sort_by_key(|k| k.y);
    let [top, mid, bottom] = c;

    let long_edge = EdgeStep::between(&top, &bottom);

    if mid.y != top.y {
        let short_edge = EdgeStep::between(&top, &mid);
        for y in top.y..=mid.y {
            let rows = (y - top.y) as f32;
            let start = short_edge.advance(&top, rows);
            let end = long_edge.advance(&top, rows);
            scanline(y, start, end, &mut plot);
        }
    }

    if bottom.y != mid.y {
        let short_edge = EdgeStep::between(&mid, &bottom);
        for y in mid.y..=bottom.y {
            let start = short_edge.advance(&mid, (y - mid.y) as f32);
            let end = long_edge.advance(&top, (y - top.y) as f32);
            scanline(y, start, end, &mut plot);
        }
    }
}

fn scanline<F: FnMut(i32, i32, TexCoord)>(
    y: i32,
    start: (f32, TexCoord),
    end: (f32, TexCoord),
    plot: &mut F,
) {
    let (mut ax, mut ta) = (start.0 as i32, start.1);
    let (mut bx, mut tb) = (end.0 as i32, end.1);
    if ax > bx {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut ta, &mut tb);
    }
    // Spans under a pixel wide still cover the pixel they start in
    if ax == bx {
        plot(ax, y, ta);
        return;
    }

    let t_step = 1.0 / (bx - ax) as f32;
    for x in ax..bx {
        let t = (x - ax) as f32 * t_step;
        plot(x, y, ta.lerp(tb, t));
    }
}

/// Fill a triangle with a flat color. No depth test; ordering is left to
/// the caller (painter's algorithm).
pub fn fill_triangle(fb: &mut Framebuffer, p0: Vec3, p1: Vec3, p2: Vec3, color: Color) {
    let tex = TexCoord::default();
    let verts = [
        ScreenVertex::from_point(p0, tex),
        ScreenVertex::from_point(p1, tex),
        ScreenVertex::from_point(p2, tex),
    ];
    walk_triangle(verts, |x, y, _| {
        if x >= 0 && y >= 0 {
            fb.set_pixel(x as usize, y as usize, color);
        }
    });
}

/// Rasterize a triangle whose texture coordinates hold `(u/w, v/w, 1/w)`.
///
/// A fragment is written only when its interpolated `1/w` is smaller than
/// the stored depth. Returns the number of pixels written.
pub fn textured_triangle(fb: &mut Framebuffer, verts: [ScreenVertex; 3], fill: &Fill) -> usize {
    let mut written = 0;
    walk_triangle(verts, |x, y, tex| {
        if x < 0 || y < 0 || !tex.w.is_finite() {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        match fb.depth.get(x, y) {
            Some(stored) if tex.w < stored => {}
            _ => return,
        }

        let color = match fill {
            Fill::Solid(color) => *color,
            Fill::Textured { texture, lightness } => {
                texture
                    .sample(tex.u / tex.w, tex.v / tex.w)
                    .scale_lightness(*lightness)
            }
        };

        if fb.set_pixel_with_depth(x, y, tex.w, color) {
            written += 1;
        }
    });
    written
}
