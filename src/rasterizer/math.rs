//! Vector and matrix math for the pipeline
//!
//! Row vectors, row-major matrices: a point is transformed as `v' = v · M`,
//! so composed matrices apply left to right.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::{Serialize, Deserialize};

fn default_w() -> f32 {
    1.0
}

/// Homogeneous 3D vector
///
/// Arithmetic operators only touch `x`, `y`, `z` and produce `w = 1`.
/// `w` is carried through matrix transforms and consumed by
/// [`Vec3::perspective_divide`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default = "default_w", skip_serializing)]
    pub w: f32,
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0, w: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn with_w(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy. A zero vector yields NaN components.
    pub fn unit(self) -> Vec3 {
        self / self.magnitude()
    }

    /// Unit-length copy, or `None` for zero-length or non-finite input
    pub fn try_unit(self) -> Option<Vec3> {
        let len = self.magnitude();
        if len > f32::EPSILON && len.is_finite() {
            Some(self / len)
        } else {
            None
        }
    }

    pub fn clamp(self, min: Vec3, max: Vec3) -> Vec3 {
        Vec3::new(
            self.x.clamp(min.x, max.x),
            self.y.clamp(min.y, max.y),
            self.z.clamp(min.z, max.z),
        )
    }

    pub fn lerp(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }

    /// Angle in radians between two unit vectors
    pub fn angle(a: Vec3, b: Vec3) -> f32 {
        a.dot(b).clamp(-1.0, 1.0).acos()
    }

    pub fn distance(a: Vec3, b: Vec3) -> f32 {
        (a - b).magnitude()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Divide `x`, `y`, `z` by `w` (clip space -> normalized device space)
    pub fn perspective_divide(self) -> Vec3 {
        Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Component-wise product
impl Mul for Vec3 {
    type Output = Vec3;
    fn mul(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f32) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Vec3) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

/// 4x4 matrix, row-major, applied to row vectors
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn identity() -> Self {
        let mut mat = Mat4::default();
        mat.m[0][0] = 1.0;
        mat.m[1][1] = 1.0;
        mat.m[2][2] = 1.0;
        mat.m[3][3] = 1.0;
        mat
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Mat4::identity();
        mat.m[1][1] = c;
        mat.m[1][2] = s;
        mat.m[2][1] = -s;
        mat.m[2][2] = c;
        mat
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Mat4::identity();
        mat.m[0][0] = c;
        mat.m[2][0] = s;
        mat.m[0][2] = -s;
        mat.m[2][2] = c;
        mat
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let mut mat = Mat4::identity();
        mat.m[0][0] = c;
        mat.m[0][1] = s;
        mat.m[1][0] = -s;
        mat.m[1][1] = c;
        mat
    }

    /// Rotation of `angle` radians around `axis` (Rodrigues).
    /// The axis is renormalized; a zero axis yields NaN.
    pub fn axis_angle(axis: Vec3, angle: f32) -> Self {
        let a = axis.unit();
        let (s, c) = angle.sin_cos();
        let k = 1.0 - c;

        let mut mat = Mat4::identity();
        mat.m[0][0] = c + a.x * a.x * k;
        mat.m[1][0] = a.x * a.y * k - a.z * s;
        mat.m[2][0] = a.x * a.z * k + a.y * s;

        mat.m[0][1] = a.y * a.x * k + a.z * s;
        mat.m[1][1] = c + a.y * a.y * k;
        mat.m[2][1] = a.y * a.z * k - a.x * s;

        mat.m[0][2] = a.z * a.x * k - a.y * s;
        mat.m[1][2] = a.z * a.y * k + a.x * s;
        mat.m[2][2] = c + a.z * a.z * k;
        mat
    }

    pub fn translation(offset: Vec3) -> Self {
        let mut mat = Mat4::identity();
        mat.m[3][0] = offset.x;
        mat.m[3][1] = offset.y;
        mat.m[3][2] = offset.z;
        mat
    }

    pub fn scale(factor: Vec3) -> Self {
        let mut mat = Mat4::identity();
        mat.m[0][0] = factor.x;
        mat.m[1][1] = factor.y;
        mat.m[2][2] = factor.z;
        mat
    }

    /// Perspective projection. `fov` is the vertical field of view in degrees.
    ///
    /// `m[2][3] = -1` puts `-z` into the output `w`; the pipeline performs the
    /// divide itself with [`Vec3::perspective_divide`].
    pub fn projection(fov: f32, near: f32, far: f32, width: usize, height: usize) -> Self {
        let f = 1.0 / (fov.to_radians() * 0.5).tan();
        let aspect = height as f32 / width.max(1) as f32;

        let mut mat = Mat4::default();
        mat.m[0][0] = aspect * f;
        mat.m[1][1] = f;
        mat.m[2][2] = far / (far - near);
        mat.m[3][2] = (-far * near) / (far - near);
        mat.m[2][3] = -1.0;
        mat.m[3][3] = 0.0;
        mat
    }

    /// Camera placement matrix ("point at"). Rows are right, up, forward and
    /// the origin; `up` is re-orthogonalized against the forward direction.
    pub fn look_at(origin: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - origin).unit();
        let new_up = (up - forward * up.dot(forward)).unit();
        let right = new_up.cross(forward);

        let mut mat = Mat4::default();
        mat.m[0] = [right.x, right.y, right.z, 0.0];
        mat.m[1] = [new_up.x, new_up.y, new_up.z, 0.0];
        mat.m[2] = [forward.x, forward.y, forward.z, 0.0];
        mat.m[3] = [origin.x, origin.y, origin.z, 1.0];
        mat
    }

    /// Inverse of a rotation + translation matrix. Not valid for matrices
    /// that scale or shear.
    pub fn quick_inverse(&self) -> Self {
        let m = &self.m;
        let mut inv = Mat4::default();
        for r in 0..3 {
            for c in 0..3 {
                inv.m[r][c] = m[c][r];
            }
        }
        for c in 0..3 {
            inv.m[3][c] = -(m[3][0] * inv.m[0][c] + m[3][1] * inv.m[1][c] + m[3][2] * inv.m[2][c]);
        }
        inv.m[3][3] = 1.0;
        inv
    }

    /// `v · M`. Translation is applied regardless of `v.w`; the output `w`
    /// picks up the projection's perspective term.
    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }
}

impl Mul<Vec3> for Mat4 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        self.transform(v)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut out = Mat4::default();
        for r in 0..4 {
            for c in 0..4 {
                out.m[r][c] = self.m[r][0] * other.m[0][c]
                    + self.m[r][1] * other.m[1][c]
                    + self.m[r][2] * other.m[2][c]
                    + self.m[r][3] * other.m[3][c];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_unit_has_length_one() {
        let samples = [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-0.001, 0.002, 0.0005),
            Vec3::new(1200.0, -50.0, 7.5),
        ];
        for v in samples {
            assert!((v.unit().magnitude() - 1.0).abs() < 1e-5, "{:?}", v);
        }
    }

    #[test]
    fn test_unit_of_zero_is_nan_and_try_unit_is_none() {
        assert!(Vec3::ZERO.unit().x.is_nan());
        assert!(Vec3::ZERO.try_unit().is_none());
        assert!(Vec3::new(0.0, 2.0, 0.0).try_unit().is_some());
    }

    #[test]
    fn test_operators_ignore_w() {
        let a = Vec3::with_w(1.0, 2.0, 3.0, 5.0);
        let b = Vec3::with_w(1.0, 1.0, 1.0, 7.0);
        let sum = a + b;
        assert_eq!(sum, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!((a * 2.0).w, 1.0);
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let v = Mat4::rotation_y(std::f32::consts::FRAC_PI_2) * Vec3::new(1.0, 0.0, 0.0);
        assert!(close(v, Vec3::new(0.0, 0.0, -1.0)));
        let v = Mat4::rotation_y(std::f32::consts::FRAC_PI_2) * Vec3::new(0.0, 0.0, 1.0);
        assert!(close(v, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_axis_angle_matches_axis_rotations() {
        let p = Vec3::new(0.3, -1.2, 2.0);
        for angle in [0.4_f32, -1.1, 2.5] {
            let about_x = Mat4::axis_angle(Vec3::new(5.0, 0.0, 0.0), angle) * p;
            let about_y = Mat4::axis_angle(Vec3::new(0.0, 2.0, 0.0), angle) * p;
            let about_z = Mat4::axis_angle(Vec3::new(0.0, 0.0, 0.5), angle) * p;
            assert!(close(about_x, Mat4::rotation_x(angle) * p));
            assert!(close(about_y, Mat4::rotation_y(angle) * p));
            assert!(close(about_z, Mat4::rotation_z(angle) * p));
        }
    }

    #[test]
    fn test_quick_inverse_round_trip() {
        let camera = Mat4::look_at(
            Vec3::new(3.0, 2.0, -7.0),
            Vec3::new(0.5, 0.0, 1.0),
            Vec3::UP,
        );
        let view = camera.quick_inverse();
        let p = Vec3::new(-4.0, 9.5, 12.0);
        assert!(close(view.quick_inverse() * (view * p), p));
        assert!(close(camera * (view * p), p));
    }

    #[test]
    fn test_look_at_builds_orthonormal_rows() {
        let m = Mat4::look_at(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.1, 1.0, 0.0));
        let row = |r: usize| Vec3::new(m.m[r][0], m.m[r][1], m.m[r][2]);
        for r in 0..3 {
            assert!((row(r).magnitude() - 1.0).abs() < 1e-5);
        }
        assert!(row(0).dot(row(1)).abs() < 1e-5);
        assert!(row(1).dot(row(2)).abs() < 1e-5);
        assert!(row(0).dot(row(2)).abs() < 1e-5);
    }

    #[test]
    fn test_projection_puts_negative_depth_in_w() {
        let proj = Mat4::projection(90.0, 0.1, 1000.0, 200, 100);
        let p = proj * Vec3::new(1.0, 1.0, 4.0);
        assert!((p.w + 4.0).abs() < 1e-5);
        assert!((proj.m[2][3] + 1.0).abs() < f32::EPSILON);
        let ndc = p.perspective_divide();
        // 90 degrees: f = 1, aspect 0.5
        assert!((ndc.x + 0.125).abs() < 1e-5);
        assert!((ndc.y + 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_matrix_composition_applies_left_to_right() {
        let s = Mat4::scale(Vec3::new(2.0, 2.0, 2.0));
        let t = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        let p = (s * t) * Vec3::new(1.0, 0.0, 0.0);
        assert!(close(p, Vec3::new(3.0, 0.0, 0.0)));
    }
}
