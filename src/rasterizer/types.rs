//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use tracing::info;

use super::hsl::Hsl;
use super::math::Vec3;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Scale HSL lightness by `factor` (clamped to 0.0-1.0), keeping hue
    /// and saturation. Alpha is preserved.
    pub fn scale_lightness(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        if factor >= 1.0 {
            return self;
        }
        let mut hsl = Hsl::from_color(self);
        hsl.l *= factor;
        let lit = hsl.to_color();
        Self { a: self.a, ..lit }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Texture coordinate with a perspective term
///
/// Before projection `w` is 1. After projection the pipeline stores
/// `(u/w, v/w, 1/w)` with `w` the clip-space divisor, so all three
/// components interpolate linearly in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    #[serde(default = "TexCoord::default_w")]
    pub w: f32,
}

impl Default for TexCoord {
    fn default() -> Self {
        Self { u: 0.0, v: 0.0, w: 1.0 }
    }
}

impl TexCoord {
    fn default_w() -> f32 {
        1.0
    }

    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v, w: 1.0 }
    }

    pub fn lerp(self, other: TexCoord, t: f32) -> TexCoord {
        TexCoord {
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
            w: self.w + (other.w - self.w) * t,
        }
    }
}

/// A triangle flowing through the pipeline. Value type: every stage
/// produces new triangles instead of editing its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p: [Vec3; 3],
    pub t: [TexCoord; 3],
    pub color: Color,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            p: [Vec3::ZERO; 3],
            t: [TexCoord::default(); 3],
            color: Color::WHITE,
        }
    }
}

impl Triangle {
    pub fn new(p: [Vec3; 3], t: [TexCoord; 3]) -> Self {
        Self { p, t, color: Color::WHITE }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Unnormalized face normal, `(p1 - p0) x (p2 - p0)`
    pub fn raw_normal(&self) -> Vec3 {
        (self.p[1] - self.p[0]).cross(self.p[2] - self.p[0])
    }

    pub fn average_z(&self) -> f32 {
        (self.p[0].z + self.p[1].z + self.p[2].z) / 3.0
    }
}

/// Simple texture (array of colors)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self::solid(width, height, Color::WHITE)
    }

    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let img = image::open(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let texture = Self::from_image(img, name);
        info!(path = %path.display(), width = texture.width, height = texture.height, "Loaded texture");
        Ok(texture)
    }

    /// Load texture from raw encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Sample at UV coordinates, nearest texel. V = 0 is the image top.
    ///
    /// Coordinates outside [0, 1] are clamped to the edge texels; NaN
    /// samples texel 0.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.pixels.is_empty() {
            return Color::default();
        }
        let tx = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let ty = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_clamps_out_of_range() {
        let mut tex = Texture::new(2, 2);
        tex.pixels = vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];

        assert_eq!(tex.sample(0.0, 0.0), Color::RED);
        assert_eq!(tex.sample(0.99, 0.0), Color::GREEN);
        assert_eq!(tex.sample(1.0, 1.0), Color::WHITE);
        assert_eq!(tex.sample(-3.0, 0.2), Color::RED);
        assert_eq!(tex.sample(7.5, -1.0), Color::GREEN);
        assert_eq!(tex.sample(-0.5, 4.0), Color::BLUE);
        assert_eq!(tex.sample(f32::NAN, f32::NAN), Color::RED);
    }

    #[test]
    fn test_scale_lightness_keeps_hue_and_alpha() {
        let c = Color::with_alpha(200, 40, 40, 128);
        let dark = c.scale_lightness(0.5);
        assert_eq!(dark.a, 128);
        assert!(dark.r > dark.g && dark.g == dark.b);
        assert!(dark.r < c.r);
        assert_eq!(c.scale_lightness(1.0), c);
        assert_eq!(c.scale_lightness(3.0), c);
    }

    #[test]
    fn test_triangle_normal_follows_winding() {
        let tri = Triangle::new(
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
            [TexCoord::default(); 3],
        );
        assert!(tri.raw_normal().z < 0.0);
    }
}
