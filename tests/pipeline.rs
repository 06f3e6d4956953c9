//! End-to-end rendering scenarios

use std::sync::Arc;

use scanline_engine::rasterizer::{
    clip_against_plane, Clipped, Color, Framebuffer, TexCoord, Texture, Triangle, Vec3,
};
use scanline_engine::config::CameraConfig;
use scanline_engine::scene::shapes;
use scanline_engine::{render_frame, Camera, Light, Mesh, RenderMode, Renderer, Scene};

const BACKGROUND: Color = Color { r: 10, g: 20, b: 30, a: 255 };

fn scene_with(meshes: Vec<Mesh>, lights: Vec<Light>) -> Scene {
    Scene { meshes, lights, background: BACKGROUND }
}

/// Bounding box of every pixel that is not background: (min_x, min_y, max_x, max_y)
fn footprint(fb: &Framebuffer) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for y in 0..fb.height {
        for x in 0..fb.width {
            if fb.get_pixel(x, y) != Some(BACKGROUND) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    bounds
}

/// Quad spanning x and y in [-1, 1], with depth `z_left` at x = -1 and
/// `z_right` at x = 1, facing the origin
fn slanted_quad(z_left: f32, z_right: f32, color: Color) -> Mesh {
    let bl = Vec3::new(-1.0, -1.0, z_left);
    let tl = Vec3::new(-1.0, 1.0, z_left);
    let tr = Vec3::new(1.0, 1.0, z_right);
    let br = Vec3::new(1.0, -1.0, z_right);
    let t = [TexCoord::default(); 3];
    Mesh::new(vec![Triangle::new([bl, tl, tr], t), Triangle::new([bl, tr, br], t)]).with_color(color)
}

#[test]
fn cube_in_front_of_camera_shows_only_its_front_face() {
    let cube = shapes::cube(Vec3::ONE)
        .with_position(Vec3::new(0.0, 0.0, 5.0))
        .with_color(Color::RED);
    let scene = scene_with(vec![cube], vec![Light::new(Vec3::new(0.0, 0.0, 1.0), 1.0)]);

    let mut renderer = Renderer::new(200, 200);
    let fb = renderer.draw_frame(&scene, &Camera::default());

    // Front face lit head-on keeps its base color
    assert_eq!(fb.get_pixel(100, 100), Some(Color::RED));

    let (x0, y0, x1, y1) = footprint(fb).expect("cube is visible");
    let cx = (x0 + x1) as f32 * 0.5;
    let cy = (y0 + y1) as f32 * 0.5;
    assert!((cx - 100.0).abs() <= 2.0, "center x {}", cx);
    assert!((cy - 100.0).abs() <= 2.0, "center y {}", cy);
    // Half-width 0.5 at depth 4.5 with a 90 degree fov
    let expected = 200.0 * 0.5 / 4.5;
    assert!(((x1 - x0) as f32 - expected).abs() <= 2.0);

    let stats = renderer.stats();
    assert_eq!(stats.triangles_in, 12);
    assert_eq!(stats.culled, 10);
    assert_eq!(stats.rasterized, 2);
}

#[test]
fn cube_face_texture_is_upright() {
    let mut texture = Texture::new(2, 2);
    texture.pixels = vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
    let cube = shapes::cube(Vec3::ONE)
        .with_position(Vec3::new(0.0, 0.0, 5.0))
        .with_texture(Arc::new(texture));
    let scene = scene_with(vec![cube], vec![Light::new(Vec3::new(0.0, 0.0, 1.0), 1.0)]);

    let fb = render_frame(&scene, &Camera::default(), 200, 200);
    assert_eq!(fb.get_pixel(94, 94), Some(Color::RED));
    assert_eq!(fb.get_pixel(106, 94), Some(Color::GREEN));
    assert_eq!(fb.get_pixel(94, 106), Some(Color::BLUE));
    assert_eq!(fb.get_pixel(106, 106), Some(Color::WHITE));
}

#[test]
fn dim_light_darkens_without_changing_hue() {
    let cube = shapes::cube(Vec3::ONE)
        .with_position(Vec3::new(0.0, 0.0, 5.0))
        .with_color(Color::new(200, 60, 60));
    let scene = scene_with(vec![cube], vec![Light::new(Vec3::new(0.0, 0.0, 1.0), 0.5)]);

    let fb = render_frame(&scene, &Camera::default(), 100, 100);
    let c = fb.get_pixel(50, 50).expect("in bounds");
    assert!(c.r < 200);
    assert!(c.r > c.g);
    assert!((c.g as i32 - c.b as i32).abs() <= 1);
}

#[test]
fn intersecting_quads_resolve_per_pixel() {
    // The quads cross at x = 0, so no draw order alone gets both halves right
    let a = slanted_quad(3.0, 5.0, Color::RED);
    let b = slanted_quad(5.0, 3.0, Color::BLUE);
    let camera = Camera::default();

    for meshes in [vec![a.clone(), b.clone()], vec![b, a]] {
        let fb = render_frame(&scene_with(meshes, vec![]), &camera, 200, 200);
        // Screen left is world +x, where the blue quad is nearer
        assert_eq!(fb.get_pixel(90, 100), Some(Color::BLUE));
        assert_eq!(fb.get_pixel(110, 100), Some(Color::RED));
    }
}

#[test]
fn empty_scene_is_background_only() {
    let mut renderer = Renderer::new(32, 24);
    let scene = scene_with(vec![Mesh::default()], vec![]);
    let fb = renderer.draw_frame(&scene, &Camera::default());
    assert!(footprint(fb).is_none());
    assert_eq!(renderer.stats().rasterized, 0);
    assert_eq!(renderer.stats().meshes, 1);
}

#[test]
fn broken_triangles_do_not_stop_the_frame() {
    let mut mesh = slanted_quad(4.0, 4.0, Color::GREEN);
    let p = Vec3::new(0.0, 0.0, 4.0);
    mesh.triangles.push(Triangle::new([p, p, p], [TexCoord::default(); 3]));
    mesh.triangles.push(Triangle::new(
        [Vec3::new(f32::NAN, 0.0, 4.0), Vec3::new(1.0, 0.0, 4.0), Vec3::new(0.0, 1.0, 4.0)],
        [TexCoord::default(); 3],
    ));

    let mut renderer = Renderer::new(64, 64);
    let fb = renderer.draw_frame(&scene_with(vec![mesh], vec![Light::default()]), &Camera::default());
    assert_eq!(fb.get_pixel(32, 32).map(|c| c.g > 0), Some(true));
    assert_eq!(renderer.stats().degenerate, 2);
    assert_eq!(renderer.stats().rasterized, 2);
}

#[test]
fn oversized_geometry_is_clipped_to_the_screen() {
    // Larger than the view in every direction
    let wall = slanted_quad(2.0, 2.0, Color::GREEN).with_scale(Vec3::new(10.0, 10.0, 1.0));
    for mode in [RenderMode::Textured, RenderMode::Flat, RenderMode::Wireframe] {
        let mut renderer = Renderer::new(40, 30);
        renderer.settings_mut().mode = mode;
        let fb = renderer.draw_frame(&scene_with(vec![wall.clone()], vec![]), &Camera::default());
        if mode != RenderMode::Wireframe {
            assert_eq!(fb.get_pixel(1, 1), Some(Color::GREEN));
            assert_eq!(fb.get_pixel(37, 27), Some(Color::GREEN));
        }
        assert!(renderer.stats().rasterized >= 2);
    }
}

#[test]
fn near_plane_with_two_vertices_behind_gives_one_triangle() {
    let camera = Camera::default();
    let tri = Triangle::new(
        [Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 1.0, -3.0)],
        [TexCoord::new(0.0, 0.0), TexCoord::new(1.0, 0.0), TexCoord::new(0.0, 1.0)],
    );

    let Clipped::One(out) = clip_against_plane(&camera.near_plane(), &tri) else {
        panic!("expected exactly one triangle");
    };
    assert_eq!(out.p[0], tri.p[0]);
    for p in &out.p[1..] {
        assert!((p.z - camera.near).abs() < 1e-5, "{:?}", p);
    }
}

#[test]
fn near_plane_with_one_vertex_behind_gives_two_triangles() {
    let camera = Camera::default();
    let tri = Triangle::new(
        [Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 0.0, 3.0), Vec3::new(0.0, 1.0, -1.0)],
        [TexCoord::new(0.0, 0.0), TexCoord::new(1.0, 0.0), TexCoord::new(0.0, 1.0)],
    );

    let out = clip_against_plane(&camera.near_plane(), &tri);
    assert_eq!(out.len(), 2);
    for piece in out {
        for p in &piece.p {
            let kept = tri.p.contains(p);
            assert!(kept || (p.z - camera.near).abs() < 1e-5, "{:?}", p);
            assert!(p.z >= camera.near - 1e-5);
        }
    }
}

#[test]
fn view_then_inverse_returns_the_point() {
    let points = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-40.0, 0.5, 12.0), Vec3::ZERO];
    for (yaw, pitch, pos) in [
        (0.0, 0.0, Vec3::ZERO),
        (1.3, -0.4, Vec3::new(5.0, -2.0, 1.0)),
        (-2.8, 0.9, Vec3::new(-7.5, 3.0, 20.0)),
    ] {
        let mut camera = Camera::new(pos);
        camera.rotate(pitch, yaw);
        let view = camera.view_matrix();
        let inverse = view.quick_inverse();
        for p in points {
            let back = inverse * (view * p);
            assert!((back - p).magnitude() < 1e-4, "{:?} -> {:?}", p, back);
        }
    }
}

#[test]
fn camera_targeting_straight_up_still_renders() {
    let cube = shapes::cube(Vec3::ONE)
        .with_position(Vec3::new(0.0, 5.0, 0.0))
        .with_color(Color::RED);
    let scene = scene_with(vec![cube], vec![]);
    let start = CameraConfig { target: Some(Vec3::new(0.0, 10.0, 0.0)), ..Default::default() };
    let mut camera = start.to_camera();

    let mut renderer = Renderer::new(64, 64);
    renderer.draw_frame(&scene, &camera);
    assert_eq!(renderer.stats().degenerate, 0);
    assert!(renderer.stats().rasterized > 0);

    // Pitching back down off the limit works
    let before = camera.forward.y;
    camera.rotate(-0.1, 0.3);
    assert!(camera.forward.y < before);
    renderer.draw_frame(&scene, &camera);
    assert_eq!(renderer.stats().degenerate, 0);
}
