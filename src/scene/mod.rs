//! Scene description - meshes, lights and background
//!
//! A `Scene` is plain data handed to the renderer each frame. It is built
//! in code, from procedural shapes, or from a RON scene file.

mod mesh;
mod loader;
pub mod obj;
pub mod shapes;

pub use mesh::*;
pub use loader::*;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Color, Vec3};

/// Directional light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Direction the light travels in; need not be unit length
    pub direction: Vec3,
    #[serde(default = "Light::default_brightness")]
    pub brightness: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self { direction: Vec3::FORWARD, brightness: 1.0 }
    }
}

impl Light {
    fn default_brightness() -> f32 {
        1.0
    }

    pub fn new(direction: Vec3, brightness: f32) -> Self {
        Self { direction, brightness }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    /// Only the first light contributes; an empty list renders unlit
    pub lights: Vec<Light>,
    pub background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            lights: Vec::new(),
            background: Color::BLACK,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> &mut Self {
        self.meshes.push(mesh);
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangles.len()).sum()
    }
}
