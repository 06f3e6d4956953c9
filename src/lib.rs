//! Scanline Engine: CPU software 3D rendering pipeline
//!
//! Meshes, a camera and a directional light go in; an RGBA framebuffer
//! comes out. Everything runs on one thread with no GPU involvement:
//! - Homogeneous transforms with row vectors
//! - Near/far and screen-edge clipping that carries texture coordinates
//! - Backface culling and flat Lambertian lighting on HSL lightness
//! - Scanline rasterization with perspective-correct texturing
//! - Painter's sort plus a per-pixel depth buffer

pub mod rasterizer;
pub mod camera;
pub mod scene;
pub mod pipeline;
pub mod config;
pub mod app;

pub use camera::{Camera, CameraController, CameraInput};
pub use pipeline::{render_frame, FrameStats, RenderMode, RenderSettings, Renderer};
pub use scene::{Light, Mesh, Scene};
