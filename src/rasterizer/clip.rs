//! Triangle clipping against a single plane
//!
//! One step of Sutherland–Hodgman specialised to triangles: the result is
//! zero, one or two triangles. Texture coordinates are interpolated with the
//! same parameter as the positions, so texturing stays continuous across the
//! clip boundary.

use super::math::Vec3;
use super::types::{TexCoord, Triangle};

/// Clip plane. Points with a non-negative signed distance are inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// The normal is renormalized. A zero normal produces NaN distances and
    /// must not be passed in.
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal: normal.unit() }
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) - self.normal.dot(self.point)
    }

    /// Intersection of segment `start -> end` with the plane, and the
    /// parameter `t` such that the point is `start + t * (end - start)`
    pub fn intersect(&self, start: Vec3, end: Vec3) -> (Vec3, f32) {
        let plane_d = -self.normal.dot(self.point);
        let ad = start.dot(self.normal);
        let bd = end.dot(self.normal);
        let t = (-plane_d - ad) / (bd - ad);
        (start + (end - start) * t, t)
    }
}

/// Outcome of clipping one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clipped {
    None,
    One(Triangle),
    Two(Triangle, Triangle),
}

impl Clipped {
    pub fn len(&self) -> usize {
        match self {
            Clipped::None => 0,
            Clipped::One(_) => 1,
            Clipped::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Clipped::None)
    }

    /// Append the produced triangles to `out`
    pub fn push_into<E: Extend<Triangle>>(self, out: &mut E) {
        match self {
            Clipped::None => {}
            Clipped::One(a) => out.extend([a]),
            Clipped::Two(a, b) => out.extend([a, b]),
        }
    }
}

impl IntoIterator for Clipped {
    type Item = Triangle;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<Triangle>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let pair = match self {
            Clipped::None => [None, None],
            Clipped::One(a) => [Some(a), None],
            Clipped::Two(a, b) => [Some(a), Some(b)],
        };
        pair.into_iter().flatten()
    }
}

/// Clip `tri` against `plane`.
///
/// - all vertices outside: `None`
/// - all inside: `One` holding the input unchanged
/// - one inside: `One` smaller triangle; the inside vertex is kept exactly
/// - two inside: `Two` triangles covering the remaining quad
pub fn clip_against_plane(plane: &Plane, tri: &Triangle) -> Clipped {
    let mut inside = [0usize; 3];
    let mut outside = [0usize; 3];
    let mut n_in = 0;
    let mut n_out = 0;

    for (i, p) in tri.p.iter().enumerate() {
        if plane.signed_distance(*p) >= 0.0 {
            inside[n_in] = i;
            n_in += 1;
        } else {
            outside[n_out] = i;
            n_out += 1;
        }
    }

    let cut = |from: usize, to: usize| -> (Vec3, TexCoord) {
        let (p, t) = plane.intersect(tri.p[from], tri.p[to]);
        (p, tri.t[from].lerp(tri.t[to], t))
    };

    match n_in {
        0 => Clipped::None,
        3 => Clipped::One(*tri),
        1 => {
            let i0 = inside[0];
            let (p1, t1) = cut(i0, outside[0]);
            let (p2, t2) = cut(i0, outside[1]);
            Clipped::One(Triangle {
                p: [tri.p[i0], p1, p2],
                t: [tri.t[i0], t1, t2],
                color: tri.color,
            })
        }
        _ => {
            let (i0, i1, o) = (inside[0], inside[1], outside[0]);
            let (pa, ta) = cut(i0, o);
            let (pb, tb) = cut(i1, o);
            let first = Triangle {
                p: [tri.p[i0], tri.p[i1], pa],
                t: [tri.t[i0], tri.t[i1], ta],
                color: tri.color,
            };
            let second = Triangle {
                p: [tri.p[i1], pa, pb],
                t: [tri.t[i1], ta, tb],
                color: tri.color,
            };
            Clipped::Two(first, second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Color;

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle::new(
            [Vec3::new(a[0], a[1], a[2]), Vec3::new(b[0], b[1], b[2]), Vec3::new(c[0], c[1], c[2])],
            [TexCoord::new(0.0, 0.0), TexCoord::new(1.0, 0.0), TexCoord::new(0.0, 1.0)],
        )
        .with_color(Color::GREEN)
    }

    fn near() -> Plane {
        Plane::new(Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_plane_normal_is_renormalized() {
        let p = Plane::new(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0));
        assert!((p.normal.magnitude() - 1.0).abs() < 1e-6);
        assert!((p.signed_distance(Vec3::new(3.0, 2.0, 1.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fully_inside_passes_unchanged() {
        let t = tri([0.0, 0.0, 1.0], [1.0, 0.0, 2.0], [0.0, 1.0, 3.0]);
        assert_eq!(clip_against_plane(&near(), &t), Clipped::One(t));
    }

    #[test]
    fn test_vertex_on_plane_counts_as_inside() {
        let t = tri([0.0, 0.0, 0.1], [1.0, 0.0, 2.0], [0.0, 1.0, 3.0]);
        assert_eq!(clip_against_plane(&near(), &t), Clipped::One(t));
    }

    #[test]
    fn test_fully_outside_is_discarded() {
        let t = tri([0.0, 0.0, -1.0], [1.0, 0.0, -2.0], [0.0, 1.0, 0.05]);
        let out = clip_against_plane(&near(), &t);
        assert!(out.is_empty());
        assert_eq!(out.into_iter().count(), 0);
    }

    #[test]
    fn test_one_inside_keeps_inside_vertex_exactly() {
        let t = tri([0.0, 0.0, -1.0], [1.0, 0.0, 2.0], [0.0, 1.0, -3.0]);
        let Clipped::One(out) = clip_against_plane(&near(), &t) else {
            panic!("expected one triangle");
        };
        assert_eq!(out.p[0], t.p[1]);
        assert_eq!(out.t[0], t.t[1]);
        assert_eq!(out.color, Color::GREEN);
        for p in &out.p[1..] {
            assert!((p.z - 0.1).abs() < 1e-5);
        }
    }

    #[test]
    fn test_two_inside_produces_quad() {
        let t = tri([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, -1.0]);
        let out = clip_against_plane(&near(), &t);
        assert_eq!(out.len(), 2);
        let Clipped::Two(a, b) = out else {
            panic!("expected two triangles");
        };
        assert_eq!(a.p[0], t.p[0]);
        assert_eq!(a.p[1], t.p[1]);
        assert_eq!(b.p[0], t.p[1]);
        // Shared edge point
        assert_eq!(a.p[2], b.p[1]);
        assert!((a.p[2].z - 0.1).abs() < 1e-5);
        assert!((b.p[2].z - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_texture_follows_intersection_parameter() {
        // Edge from z = 1 to z = -1 crosses z = 0 halfway along.
        let plane = Plane::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let mut t = tri([0.0, 0.0, 1.0], [4.0, 0.0, -1.0], [0.0, 4.0, -1.0]);
        t.t = [
            TexCoord { u: 0.0, v: 0.0, w: 1.0 },
            TexCoord { u: 1.0, v: 0.2, w: 0.5 },
            TexCoord { u: 0.4, v: 1.0, w: 0.25 },
        ];
        let Clipped::One(out) = clip_against_plane(&plane, &t) else {
            panic!("expected one triangle");
        };
        assert!((out.p[1].x - 2.0).abs() < 1e-5);
        assert!((out.t[1].u - 0.5).abs() < 1e-5);
        assert!((out.t[1].v - 0.1).abs() < 1e-5);
        assert!((out.t[1].w - 0.75).abs() < 1e-5);
        assert!((out.t[2].u - 0.2).abs() < 1e-5);
        assert!((out.t[2].w - 0.625).abs() < 1e-5);
    }

    #[test]
    fn test_push_into_appends_all() {
        let t = tri([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, -1.0]);
        let mut queue = std::collections::VecDeque::new();
        clip_against_plane(&near(), &t).push_into(&mut queue);
        assert_eq!(queue.len(), 2);
    }
}
