//! Application state and frame loop
//!
//! Each step applies input to the camera, lets the caller-supplied update
//! strategy mutate the scene, then renders with a snapshot of the camera.
//! The loop itself owns no window; the binary feeds it input and presents
//! the framebuffer.

use std::sync::Arc;

use tracing::info;

use crate::camera::{Camera, CameraController, CameraInput};
use crate::config::{CameraConfig, EngineConfig};
use crate::pipeline::{FrameStats, Renderer};
use crate::rasterizer::{Color, Framebuffer, Texture, Vec3};
use crate::scene::{shapes, Light, Scene};

/// Per-frame scene update, called with the frame delta in seconds
pub type UpdateFn = Box<dyn FnMut(&mut Scene, f32)>;

pub struct FrameLoop {
    pub renderer: Renderer,
    pub scene: Scene,
    pub camera: Camera,
    pub controller: CameraController,
    update: Option<UpdateFn>,
    running: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new(scene: Scene, camera: Camera, config: &EngineConfig) -> Self {
        Self {
            renderer: Renderer::with_settings(config.width, config.height, config.render),
            scene,
            camera,
            controller: config.controls,
            update: None,
            running: true,
            frames: 0,
        }
    }

    /// Install the per-frame update strategy
    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnMut(&mut Scene, f32) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Advance one frame and render it
    pub fn step(&mut self, input: &CameraInput, dt: f32) -> &Framebuffer {
        self.controller.apply(&mut self.camera, input, dt);

        if let Some(update) = self.update.as_mut() {
            update(&mut self.scene, dt);
        }

        // The pipeline sees one camera for the whole frame
        let camera = self.camera;
        self.frames += 1;
        self.renderer.draw_frame(&self.scene, &camera)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop after the current frame
    pub fn quit(&mut self) {
        if self.running {
            info!(frames = self.frames, "Frame loop stopping");
        }
        self.running = false;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stats(&self) -> FrameStats {
        self.renderer.stats()
    }
}

/// Built-in scene: a grid of checkerboard cubes lit from the camera side
pub fn demo_scene() -> (Scene, CameraConfig) {
    const GRID: usize = 6;
    const SIZE: f32 = 2.0;
    const PADDING: f32 = 0.5;

    let texture = Arc::new(Texture::checkerboard(
        32,
        32,
        Color::new(220, 200, 160),
        Color::new(120, 70, 40),
    ));

    let mut scene = Scene::new();
    let span = GRID as f32 * (SIZE + PADDING);
    for i in 0..GRID {
        for j in 0..GRID {
            let x = i as f32 * (SIZE + PADDING) - span * 0.5;
            let z = j as f32 * (SIZE + PADDING);
            let mesh = shapes::cube(Vec3::new(SIZE, SIZE, SIZE))
                .with_name(format!("cube_{}_{}", i, j))
                .with_position(Vec3::new(x, 0.0, z))
                .with_texture(Arc::clone(&texture));
            scene.add_mesh(mesh);
        }
    }
    scene.add_light(Light::new(Vec3::new(0.3, -0.6, 1.0), 1.0));
    scene.background = Color::new(24, 24, 32);

    let camera = CameraConfig {
        position: Vec3::new(0.0, 4.0, -10.0),
        target: Some(Vec3::new(0.0, 0.0, span * 0.5)),
        ..Default::default()
    };
    (scene, camera)
}
