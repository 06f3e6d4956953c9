//! Scanline Engine: CPU software 3D renderer
//!
//! Usage: `scanline-engine [scene.ron] [--config engine.ron]`
//!
//! Controls:
//! - WASD move, Q/E down/up
//! - Arrow keys turn, right mouse drag to look
//! - Tab cycles render mode, F toggles the wireframe overlay
//! - Escape quits

use std::path::PathBuf;
use std::sync::OnceLock;

use macroquad::prelude::*;
use tracing::{error, info, warn};

use scanline_engine::app::{demo_scene, FrameLoop};
use scanline_engine::camera::CameraInput;
use scanline_engine::config::EngineConfig;
use scanline_engine::pipeline::RenderMode;
use scanline_engine::scene::load_scene;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

struct Args {
    scene: Option<PathBuf>,
    config: PathBuf,
}

struct Startup {
    args: Args,
    config: EngineConfig,
}

static STARTUP: OnceLock<Startup> = OnceLock::new();

fn parse_args() -> Args {
    let mut args = Args { scene: None, config: PathBuf::from("engine.ron") };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" | "-c" => match it.next() {
                Some(path) => args.config = PathBuf::from(path),
                None => warn!("--config needs a path"),
            },
            "--help" | "-h" => {
                println!("Usage: scanline-engine [scene.ron] [--config engine.ron]");
                std::process::exit(0);
            }
            other => args.scene = Some(PathBuf::from(other)),
        }
    }
    args
}

/// Logging, arguments and config, resolved once before the window opens
fn startup() -> &'static Startup {
    STARTUP.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
            )
            .init();

        let args = parse_args();
        let config = EngineConfig::load_or_default(&args.config);
        Startup { args, config }
    })
}

fn window_conf() -> Conf {
    let config = &startup().config;
    let scale = config.window_scale.max(1) as i32;
    Conf {
        window_title: format!("Scanline Engine v{}", VERSION),
        window_width: config.width as i32 * scale,
        window_height: config.height as i32 * scale,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn key_axis(positive: KeyCode, negative: KeyCode) -> f32 {
    let mut axis = 0.0;
    if is_key_down(positive) {
        axis += 1.0;
    }
    if is_key_down(negative) {
        axis -= 1.0;
    }
    axis
}

/// Sleep off the rest of the frame budget measured from `frame_start`
#[cfg(not(target_arch = "wasm32"))]
fn cap_frame_rate(config: &EngineConfig, frame_start: f64) {
    if let Some(rest) = config.remaining_frame_time(get_time() - frame_start) {
        std::thread::sleep(rest);
    }
}

/// The browser paces frames itself
#[cfg(target_arch = "wasm32")]
fn cap_frame_rate(_config: &EngineConfig, _frame_start: f64) {}

fn next_mode(mode: RenderMode) -> RenderMode {
    match mode {
        RenderMode::Textured => RenderMode::Flat,
        RenderMode::Flat => RenderMode::Wireframe,
        RenderMode::Wireframe => RenderMode::Textured,
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let Startup { args, config } = startup();
    info!(version = VERSION, width = config.width, height = config.height, "=== Scanline Engine ===");

    let (scene, camera, spin) = match &args.scene {
        Some(path) => match load_scene(path) {
            Ok((scene, camera)) => (scene, camera.unwrap_or_else(|| config.camera.clone()), false),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load scene");
                return;
            }
        },
        None => {
            let (scene, camera) = demo_scene();
            info!(meshes = scene.meshes.len(), "No scene given, showing demo");
            (scene, camera, true)
        }
    };

    let mut app = FrameLoop::new(scene, camera.to_camera(), config);
    if spin {
        app = app.with_update(|scene, dt| {
            for mesh in scene.meshes.iter_mut().step_by(5) {
                mesh.rotation.y += dt * 0.6;
            }
        });
    }

    let mut last_mouse = mouse_position();

    while app.is_running() {
        let frame_start = get_time();

        if is_key_pressed(KeyCode::Escape) {
            app.quit();
        }
        if is_key_pressed(KeyCode::Tab) {
            let settings = app.renderer.settings_mut();
            settings.mode = next_mode(settings.mode);
            info!(mode = ?settings.mode, "Render mode");
        }
        if is_key_pressed(KeyCode::F) {
            let settings = app.renderer.settings_mut();
            settings.wireframe_overlay = !settings.wireframe_overlay;
        }

        let mouse = mouse_position();
        let mouse_delta = if is_mouse_button_down(MouseButton::Right) {
            (mouse.0 - last_mouse.0, mouse.1 - last_mouse.1)
        } else {
            (0.0, 0.0)
        };
        last_mouse = mouse;

        let input = CameraInput {
            forward: is_key_down(KeyCode::W),
            back: is_key_down(KeyCode::S),
            left: is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::E),
            down: is_key_down(KeyCode::Q),
            pitch: key_axis(KeyCode::Up, KeyCode::Down),
            yaw: key_axis(KeyCode::Right, KeyCode::Left),
            mouse_delta,
        };

        let fb = app.step(&input, get_frame_time());

        // Scale the framebuffer to fit the window, keeping its aspect
        let screen_w = screen_width();
        let screen_h = screen_height();
        let scale = (screen_w / fb.width as f32).min(screen_h / fb.height as f32);
        let draw_w = fb.width as f32 * scale;
        let draw_h = fb.height as f32 * scale;

        clear_background(BLACK);
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        texture.set_filter(FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            (screen_w - draw_w) * 0.5,
            (screen_h - draw_h) * 0.5,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        let stats = app.stats();
        draw_text(
            &format!(
                "{} fps | {:?} | tris {} -> {} | culled {}",
                get_fps(),
                app.renderer.settings().mode,
                stats.triangles_in,
                stats.rasterized,
                stats.culled
            ),
            8.0,
            20.0,
            20.0,
            Color::from_rgba(230, 230, 230, 255),
        );

        cap_frame_rate(config, frame_start);

        next_frame().await;
    }

    info!(frames = app.frames(), "Exiting");
}
