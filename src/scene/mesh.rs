//! Renderable triangle meshes

use std::sync::Arc;

use crate::rasterizer::{Color, Mat4, Texture, Triangle, Vec3};

/// Triangles in model space plus a placement in the world.
///
/// Winding is counter-clockwise when seen from outside; culling depends on it.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
    pub position: Vec3,
    /// Euler angles in radians, applied Z, then Y, then X
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Shared so several meshes can use one image
    pub texture: Option<Arc<Texture>>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            triangles: Vec::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            texture: None,
        }
    }
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles, ..Default::default() }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    /// Set the base color of every triangle
    pub fn set_color(&mut self, color: Color) {
        for tri in &mut self.triangles {
            tri.color = color;
        }
    }

    /// Model -> world: scale, rotate Z, Y, X, then translate
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::scale(self.scale)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::translation(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
