//! Procedural meshes
//!
//! All shapes are centered on the origin with outward-facing,
//! counter-clockwise triangles and UVs in [0, 1] (V = 0 at the top).

use std::f32::consts::{PI, TAU};

use crate::rasterizer::{TexCoord, Triangle, Vec3};
use super::Mesh;

fn tri(p: [Vec3; 3], t: [(f32, f32); 3]) -> Triangle {
    Triangle::new(p, t.map(|(u, v)| TexCoord::new(u, v)))
}

/// Box with the given edge lengths. Each face maps the full texture.
///
/// U runs from 1 to 0 across each face because the projection mirrors X.
pub fn cube(size: Vec3) -> Mesh {
    let (x, y, z) = (size.x * 0.5, size.y * 0.5, size.z * 0.5);
    let v = Vec3::new;

    // Quad corners per face, counter-clockwise seen from outside
    let faces = [
        [v(-x, -y, -z), v(-x, y, -z), v(x, y, -z), v(x, -y, -z)], // front (-z)
        [v(x, -y, -z), v(x, y, -z), v(x, y, z), v(x, -y, z)],     // right (+x)
        [v(x, -y, z), v(x, y, z), v(-x, y, z), v(-x, -y, z)],     // back (+z)
        [v(-x, -y, z), v(-x, y, z), v(-x, y, -z), v(-x, -y, -z)], // left (-x)
        [v(-x, y, -z), v(-x, y, z), v(x, y, z), v(x, y, -z)],     // top (+y)
        [v(-x, -y, z), v(-x, -y, -z), v(x, -y, -z), v(x, -y, z)], // bottom (-y)
    ];

    let mut triangles = Vec::with_capacity(12);
    for [bl, tl, tr, br] in faces {
        triangles.push(tri([bl, tl, tr], [(1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]));
        triangles.push(tri([bl, tr, br], [(1.0, 1.0), (0.0, 0.0), (0.0, 1.0)]));
    }
    Mesh::new(triangles).with_name("cube")
}

/// UV sphere. `resolution` is the number of stacks; slices are twice that.
pub fn sphere(radius: f32, resolution: usize) -> Mesh {
    let stacks = resolution.max(2);
    let slices = stacks * 2;

    let point = |s: usize, k: usize| {
        let theta = s as f32 / stacks as f32 * PI;
        let phi = k as f32 / slices as f32 * TAU;
        Vec3::new(
            theta.sin() * phi.cos() * radius,
            theta.cos() * radius,
            theta.sin() * phi.sin() * radius,
        )
    };
    let uv = |s: usize, k: usize| (k as f32 / slices as f32, s as f32 / stacks as f32);

    let mut triangles = Vec::with_capacity(stacks * slices * 2);
    for s in 0..stacks {
        for k in 0..slices {
            let a = (s, k);
            let b = (s, k + 1);
            let c = (s + 1, k + 1);
            let d = (s + 1, k);
            let pts = [a, b, c, d].map(|(s, k)| point(s, k));
            let uvs = [a, b, c, d].map(|(s, k)| uv(s, k));

            // The first and last stacks collapse to a fan at the poles
            if s != 0 {
                triangles.push(tri([pts[0], pts[1], pts[2]], [uvs[0], uvs[1], uvs[2]]));
            }
            if s != stacks - 1 {
                triangles.push(tri([pts[0], pts[2], pts[3]], [uvs[0], uvs[2], uvs[3]]));
            }
        }
    }
    Mesh::new(triangles).with_name("sphere")
}

fn ring(radius: f32, y: f32, resolution: usize) -> Vec<Vec3> {
    (0..resolution)
        .map(|i| {
            let a = i as f32 / resolution as f32 * TAU;
            Vec3::new(a.cos() * radius, y, a.sin() * radius)
        })
        .collect()
}

/// Cone standing on the XZ plane, apex up
pub fn cone(radius: f32, height: f32, resolution: usize) -> Mesh {
    let n = resolution.max(3);
    let base = ring(radius, -height * 0.5, n);
    let apex = Vec3::new(0.0, height * 0.5, 0.0);
    let bottom = Vec3::new(0.0, -height * 0.5, 0.0);

    let mut triangles = Vec::with_capacity(n * 2);
    for i in 0..n {
        let j = (i + 1) % n;
        let (u0, u1) = (i as f32 / n as f32, (i + 1) as f32 / n as f32);
        triangles.push(tri([base[i], apex, base[j]], [(u0, 1.0), ((u0 + u1) * 0.5, 0.0), (u1, 1.0)]));
        triangles.push(tri([base[i], base[j], bottom], [(u0, 1.0), (u1, 1.0), (0.5, 0.5)]));
    }
    Mesh::new(triangles).with_name("cone")
}

/// Capped cylinder along Y
pub fn cylinder(radius: f32, height: f32, resolution: usize) -> Mesh {
    let n = resolution.max(3);
    let lower = ring(radius, -height * 0.5, n);
    let upper = ring(radius, height * 0.5, n);
    let top = Vec3::new(0.0, height * 0.5, 0.0);
    let bottom = Vec3::new(0.0, -height * 0.5, 0.0);

    let mut triangles = Vec::with_capacity(n * 4);
    for i in 0..n {
        let j = (i + 1) % n;
        let (u0, u1) = (i as f32 / n as f32, (i + 1) as f32 / n as f32);
        triangles.push(tri([upper[j], lower[j], lower[i]], [(u1, 0.0), (u1, 1.0), (u0, 1.0)]));
        triangles.push(tri([upper[i], upper[j], lower[i]], [(u0, 0.0), (u1, 0.0), (u0, 1.0)]));
        triangles.push(tri([upper[j], upper[i], top], [(u1, 0.0), (u0, 0.0), (0.5, 0.5)]));
        triangles.push(tri([lower[i], lower[j], bottom], [(u0, 1.0), (u1, 1.0), (0.5, 0.5)]));
    }
    Mesh::new(triangles).with_name("cylinder")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face normal points away from the shape's center
    fn assert_outward(mesh: &Mesh) {
        for (i, t) in mesh.triangles.iter().enumerate() {
            let n = t.raw_normal();
            assert!(n.magnitude() > 1e-6, "{} triangle {} is degenerate", mesh.name, i);
            let centroid = (t.p[0] + t.p[1] + t.p[2]) / 3.0;
            assert!(n.dot(centroid) > 0.0, "{} triangle {} faces inward", mesh.name, i);
        }
    }

    fn assert_uvs_in_range(mesh: &Mesh) {
        for t in &mesh.triangles {
            for c in &t.t {
                assert!((0.0..=1.0).contains(&c.u) && (0.0..=1.0).contains(&c.v));
                assert_eq!(c.w, 1.0);
            }
        }
    }

    #[test]
    fn test_cube_has_twelve_outward_triangles() {
        let mesh = cube(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangles.len(), 12);
        assert_outward(&mesh);
        assert_uvs_in_range(&mesh);
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let mesh = sphere(2.0, 8);
        // Two pole fans plus quads in between
        assert_eq!(mesh.triangles.len(), 16 * 2 + 16 * 6 * 2);
        assert_outward(&mesh);
        assert_uvs_in_range(&mesh);
        for t in &mesh.triangles {
            for p in &t.p {
                assert!((p.magnitude() - 2.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_cone_and_cylinder_are_outward() {
        let c = cone(1.0, 2.0, 12);
        assert_eq!(c.triangles.len(), 24);
        assert_outward(&c);
        assert_uvs_in_range(&c);

        let cyl = cylinder(1.0, 2.0, 12);
        assert_eq!(cyl.triangles.len(), 48);
        assert_outward(&cyl);
        assert_uvs_in_range(&cyl);
    }
}
