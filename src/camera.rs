//! Camera state and first-person controls
//!
//! The camera is a position plus a unit `forward`/`up` pair. View and
//! look-at matrices are rebuilt from these every frame, so small drift in
//! the stored vectors is corrected by the Gram-Schmidt step in
//! [`Mat4::look_at`].

use crate::rasterizer::{Mat4, Plane, Vec3};
use serde::{Deserialize, Serialize};

/// Maximum pitch away from the horizon, in degrees
pub const PITCH_LIMIT_DEG: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit view direction
    pub forward: Vec3,
    /// Unit up direction
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::FORWARD,
            up: Vec3::UP,
            near: 0.1,
            far: 1000.0,
            fov: 90.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    /// Point the camera at `target`, keeping the current `up`.
    /// Ignored when `target` is the camera position.
    ///
    /// Targets steeper than [`PITCH_LIMIT_DEG`] above or below the horizon
    /// are aimed at the limit instead, keeping the same heading.
    pub fn look_at(&mut self, target: Vec3) {
        if let Some(dir) = (target - self.position).try_unit() {
            self.forward = self.limit_pitch(dir);
        }
    }

    /// `dir` with its elevation clamped to the pitch limit. A direction
    /// along `up` takes its heading from the current `forward`.
    fn limit_pitch(&self, dir: Vec3) -> Vec3 {
        let up = self.up.try_unit().unwrap_or(Vec3::UP);
        let sin_elevation = dir.dot(up).clamp(-1.0, 1.0);
        let limit = PITCH_LIMIT_DEG.to_radians();
        if sin_elevation.asin().abs() <= limit {
            return dir;
        }

        let horizontal = |v: Vec3| (v - up * v.dot(up)).try_unit();
        let heading = horizontal(dir)
            .or_else(|| horizontal(self.forward))
            .or_else(|| horizontal(Vec3::FORWARD))
            .or_else(|| horizontal(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap_or(Vec3::FORWARD);
        heading * limit.cos() + up * (limit.sin() * sin_elevation.signum())
    }

    /// Pitch by `angle_x` about the camera's side axis, then yaw by
    /// `angle_y` about `up`. Radians.
    ///
    /// A pitch that would bring `forward` within 5 degrees of `up` (or its
    /// opposite) is dropped; the yaw is still applied.
    pub fn rotate(&mut self, angle_x: f32, angle_y: f32) {
        // A forward set by hand may sit on a pole with no side axis
        self.forward = self.limit_pitch(self.forward);

        if let Some(side) = self.forward.cross(self.up).try_unit() {
            let candidate = Mat4::axis_angle(side, angle_x) * self.forward;
            let from_horizon = (Vec3::angle(candidate, self.up) - std::f32::consts::FRAC_PI_2).abs();
            if from_horizon <= PITCH_LIMIT_DEG.to_radians() {
                self.forward = candidate;
            }
        }

        self.forward = Mat4::axis_angle(self.up, angle_y) * self.forward;
        if let Some(f) = self.forward.try_unit() {
            self.forward = f;
        }
    }

    /// Screen-right direction, used for strafing
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.up).unit()
    }

    /// Camera placement in world space
    pub fn look_at_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.forward, self.up)
    }

    /// World -> view transform
    pub fn view_matrix(&self) -> Mat4 {
        self.look_at_matrix().quick_inverse()
    }

    pub fn projection_matrix(&self, width: usize, height: usize) -> Mat4 {
        Mat4::projection(self.fov, self.near, self.far, width, height)
    }

    /// Near clip plane in view space, facing away from the eye
    pub fn near_plane(&self) -> Plane {
        Plane::new(Vec3::new(0.0, 0.0, self.near), Vec3::FORWARD)
    }

    /// Far clip plane in view space, facing back toward the eye
    pub fn far_plane(&self) -> Plane {
        Plane::new(Vec3::new(0.0, 0.0, self.far), -Vec3::FORWARD)
    }
}

/// One frame of movement intent, decoupled from any windowing library
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Key pitch axis, -1..1; positive looks up
    pub pitch: f32,
    /// Key yaw axis, -1..1; positive turns right
    pub yaw: f32,
    /// Mouse movement in pixels since the last frame
    pub mouse_delta: (f32, f32),
}

/// Turns [`CameraInput`] into camera motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraController {
    /// World units per second
    pub move_speed: f32,
    /// Radians per second for key turning
    pub turn_speed: f32,
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            turn_speed: 3.0,
            mouse_sensitivity: 0.003,
        }
    }
}

impl CameraController {
    pub fn apply(&self, camera: &mut Camera, input: &CameraInput, dt: f32) {
        let right = camera.right();
        let mut motion = Vec3::ZERO;
        if input.forward {
            motion += camera.forward;
        }
        if input.back {
            motion -= camera.forward;
        }
        if input.right {
            motion += right;
        }
        if input.left {
            motion -= right;
        }
        // Vertical movement is along world up, not camera up
        if input.up {
            motion += Vec3::UP;
        }
        if input.down {
            motion -= Vec3::UP;
        }
        camera.position += motion * (self.move_speed * dt);

        // Key pitch is slower than yaw
        let pitch = input.pitch * self.turn_speed * dt * 0.25 - input.mouse_delta.1 * self.mouse_sensitivity;
        let yaw = input.yaw * self.turn_speed * dt + input.mouse_delta.0 * self.mouse_sensitivity;
        if pitch != 0.0 || yaw != 0.0 {
            camera.rotate(pitch, -yaw);
        }
    }
}
