//! Software rasterizer
//!
//! Features:
//! - Homogeneous vector/matrix kernel (row vectors, row-major matrices)
//! - Triangle clipping against arbitrary planes, texture coordinates included
//! - Scanline fill with perspective-correct texturing
//! - Per-pixel depth buffer on top of painter's ordering

mod math;
mod types;
mod hsl;
mod clip;
mod render;

pub use math::*;
pub use types::*;
pub use hsl::*;
pub use clip::*;
pub use render::*;

/// Default framebuffer size
pub const DEFAULT_WIDTH: usize = 320;
pub const DEFAULT_HEIGHT: usize = 240;
