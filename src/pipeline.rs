//! Frame pipeline
//!
//! Turns a [`Scene`] seen through a [`Camera`] into pixels. Per triangle:
//!
//! 1. model -> world transform
//! 2. backface cull against the camera position
//! 3. flat lighting from the first light
//! 4. world -> view transform
//! 5. clip against the near (and far) plane in view space
//! 6. project, store `(u/w, v/w, 1/w)`, divide by `w`, map to pixels
//! 7. clip against the four screen edges
//!
//! Survivors from every mesh are sorted far-to-near by average view depth
//! and rasterized. Textured fills are also depth tested per pixel.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::camera::Camera;
use crate::rasterizer::{
    clip_against_plane, fill_triangle, textured_triangle, Color, Fill, Framebuffer, Mat4, Plane,
    ScreenVertex, TexCoord, Triangle, Vec3,
};
use crate::scene::{Light, Scene};

/// Lowest luminance a lit face can get, so nothing goes fully black
pub const MIN_LUMINANCE: f32 = 0.1;

/// Clip-space `w` below this magnitude cannot be divided safely
const W_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Scanline fill with textures and the depth buffer
    #[default]
    Textured,
    /// Flat colors, painter's order only
    Flat,
    /// Triangle outlines
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    /// Outline every triangle on top of the fill
    pub wireframe_overlay: bool,
    pub wireframe_color: Color,
    /// Also clip against the camera's far plane
    pub clip_far: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Textured,
            wireframe_overlay: false,
            wireframe_color: Color::WHITE,
            clip_far: true,
        }
    }
}

/// Triangle that cannot go through the pipeline. Skipped, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateGeometry {
    /// Coincident or collinear vertices
    ZeroArea,
    /// NaN or infinite coordinates
    NonFinite,
    /// Vertex too close to the eye plane to project
    BehindEye,
}

impl std::fmt::Display for DegenerateGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateGeometry::ZeroArea => write!(f, "zero-area triangle"),
            DegenerateGeometry::NonFinite => write!(f, "non-finite vertex"),
            DegenerateGeometry::BehindEye => write!(f, "vertex on the eye plane"),
        }
    }
}

impl std::error::Error for DegenerateGeometry {}

/// Counters for the last rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub meshes: usize,
    pub triangles_in: usize,
    pub degenerate: usize,
    pub culled: usize,
    /// Front-facing triangles removed entirely by clipping
    pub clipped_away: usize,
    /// Screen-space triangles handed to the rasterizer
    pub rasterized: usize,
}

/// Unit face normal of a world-space triangle
pub fn face_normal(tri: &Triangle) -> Result<Vec3, DegenerateGeometry> {
    if !tri.p.iter().all(|p| p.is_finite()) {
        return Err(DegenerateGeometry::NonFinite);
    }
    tri.raw_normal().try_unit().ok_or(DegenerateGeometry::ZeroArea)
}

/// Lightness factor in [0, 1] for a face lit by `light`.
///
/// With no light the face keeps its base color.
pub fn face_lightness(normal: Vec3, light: Option<&Light>) -> f32 {
    let Some(light) = light else {
        return 1.0;
    };
    let Some(dir) = light.direction.try_unit() else {
        return 1.0;
    };
    let luminance = normal.dot(-dir).clamp(MIN_LUMINANCE, 1.0);
    let factor = luminance * light.brightness;
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn transform(tri: &Triangle, m: &Mat4) -> Triangle {
    Triangle {
        p: tri.p.map(|p| m.transform(p)),
        ..*tri
    }
}

/// View space -> screen space. Texture coordinates become `(u/w, v/w, 1/w)`.
fn project(tri: &Triangle, proj: &Mat4, width: f32, height: f32) -> Result<Triangle, DegenerateGeometry> {
    let mut out = *tri;
    for i in 0..3 {
        let clip = proj.transform(tri.p[i]);
        if !clip.is_finite() {
            return Err(DegenerateGeometry::NonFinite);
        }
        if clip.w.abs() < W_EPSILON {
            return Err(DegenerateGeometry::BehindEye);
        }

        let inv_w = 1.0 / clip.w;
        out.t[i] = TexCoord {
            u: tri.t[i].u * inv_w,
            v: tri.t[i].v * inv_w,
            w: tri.t[i].w * inv_w,
        };

        let ndc = clip.perspective_divide();
        out.p[i] = Vec3::new((ndc.x + 1.0) * 0.5 * width, (ndc.y + 1.0) * 0.5 * height, ndc.z);
    }
    Ok(out)
}

/// Run every triangle in `queue` through each plane in turn (FIFO).
/// Each plane may double the number of triangles.
fn clip_through(planes: &[Plane], queue: &mut VecDeque<Triangle>) {
    for plane in planes {
        for _ in 0..queue.len() {
            let Some(tri) = queue.pop_front() else {
                break;
            };
            clip_against_plane(plane, &tri).push_into(queue);
        }
    }
}

/// Screen edges in pixel space: top, bottom, left, right
fn screen_planes(width: usize, height: usize) -> [Plane; 4] {
    let right = width.saturating_sub(1) as f32;
    let bottom = height.saturating_sub(1) as f32;
    [
        Plane::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)),
        Plane::new(Vec3::new(0.0, bottom, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        Plane::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)),
        Plane::new(Vec3::new(right, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    ]
}

/// Screen-space triangle waiting to be drawn
#[derive(Debug, Clone, Copy)]
struct Queued {
    tri: Triangle,
    /// Average view-space z of the piece it came from
    depth: f32,
    lightness: f32,
    mesh: usize,
}

/// Owns the framebuffer and per-frame scratch space
pub struct Renderer {
    framebuffer: Framebuffer,
    settings: RenderSettings,
    stats: FrameStats,
    draw_list: Vec<Queued>,
    view_queue: VecDeque<Triangle>,
    screen_queue: VecDeque<Triangle>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_settings(width, height, RenderSettings::default())
    }

    pub fn with_settings(width: usize, height: usize, settings: RenderSettings) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            settings,
            stats: FrameStats::default(),
            draw_list: Vec::new(),
            view_queue: VecDeque::new(),
            screen_queue: VecDeque::new(),
        }
    }

    /// Resize the output. Reallocates only when the size changes.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        if width != self.framebuffer.width || height != self.framebuffer.height {
            debug!(width, height, "Viewport resized");
            self.framebuffer.resize(width, height);
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn into_framebuffer(self) -> Framebuffer {
        self.framebuffer
    }

    /// Render one frame. The scene and camera are only read.
    pub fn draw_frame(&mut self, scene: &Scene, camera: &Camera) -> &Framebuffer {
        let (width, height) = (self.framebuffer.width, self.framebuffer.height);
        self.framebuffer.clear(scene.background);
        self.stats = FrameStats { meshes: scene.meshes.len(), ..Default::default() };
        self.draw_list.clear();

        if width == 0 || height == 0 {
            return &self.framebuffer;
        }

        let view = camera.view_matrix();
        let proj = camera.projection_matrix(width, height);
        let view_planes = [camera.near_plane(), camera.far_plane()];
        let view_planes = if self.settings.clip_far { &view_planes[..] } else { &view_planes[..1] };
        let screen = screen_planes(width, height);
        let light = scene.lights.first();

        for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
            let world = mesh.world_matrix();

            for tri in &mesh.triangles {
                self.stats.triangles_in += 1;

                let world_tri = transform(tri, &world);
                let normal = match face_normal(&world_tri) {
                    Ok(n) => n,
                    Err(e) => {
                        trace!(mesh = %mesh.name, error = %e, "Skipping triangle");
                        self.stats.degenerate += 1;
                        continue;
                    }
                };

                if normal.dot(world_tri.p[0] - camera.position) >= 0.0 {
                    self.stats.culled += 1;
                    continue;
                }

                let lightness = face_lightness(normal, light);
                let mut viewed = transform(&world_tri, &view);
                if !viewed.p.iter().all(|p| p.is_finite()) {
                    trace!(mesh = %mesh.name, error = %DegenerateGeometry::NonFinite, "Skipping triangle");
                    self.stats.degenerate += 1;
                    continue;
                }
                viewed.color = tri.color.scale_lightness(lightness);

                self.view_queue.clear();
                self.view_queue.push_back(viewed);
                clip_through(view_planes, &mut self.view_queue);

                let mut emitted = 0;
                for piece in self.view_queue.drain(..) {
                    let projected = match project(&piece, &proj, width as f32, height as f32) {
                        Ok(t) => t,
                        Err(e) => {
                            trace!(mesh = %mesh.name, error = %e, "Skipping clipped piece");
                            continue;
                        }
                    };

                    self.screen_queue.clear();
                    self.screen_queue.push_back(projected);
                    clip_through(&screen, &mut self.screen_queue);

                    let depth = piece.average_z();
                    for tri in self.screen_queue.drain(..) {
                        self.draw_list.push(Queued { tri, depth, lightness, mesh: mesh_index });
                        emitted += 1;
                    }
                }

                if emitted == 0 {
                    self.stats.clipped_away += 1;
                }
            }
        }

        // Far to near; stable so equal depths keep submission order
        self.draw_list.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let settings = self.settings;
        for item in &self.draw_list {
            let tri = &item.tri;
            match settings.mode {
                RenderMode::Textured => {
                    let verts = [0, 1, 2].map(|i| ScreenVertex::from_point(tri.p[i], tri.t[i]));
                    let fill = match scene.meshes[item.mesh].texture.as_deref() {
                        Some(texture) => Fill::Textured { texture, lightness: item.lightness },
                        None => Fill::Solid(tri.color),
                    };
                    textured_triangle(&mut self.framebuffer, verts, &fill);
                }
                RenderMode::Flat => {
                    fill_triangle(&mut self.framebuffer, tri.p[0], tri.p[1], tri.p[2], tri.color);
                }
                RenderMode::Wireframe => {
                    self.framebuffer.draw_triangle_outline(&tri.p, settings.wireframe_color);
                }
            }

            if settings.wireframe_overlay && settings.mode != RenderMode::Wireframe {
                self.framebuffer.draw_triangle_outline(&tri.p, settings.wireframe_color);
            }
        }
        self.stats.rasterized = self.draw_list.len();

        let s = &self.stats;
        debug!(
            meshes = s.meshes,
            triangles = s.triangles_in,
            degenerate = s.degenerate,
            culled = s.culled,
            clipped_away = s.clipped_away,
            rasterized = s.rasterized,
            "Frame rendered"
        );

        &self.framebuffer
    }
}

/// Render a scene into a fresh framebuffer with default settings
pub fn render_frame(scene: &Scene, camera: &Camera, width: usize, height: usize) -> Framebuffer {
    let mut renderer = Renderer::new(width, height);
    renderer.draw_frame(scene, camera);
    renderer.into_framebuffer()
}
