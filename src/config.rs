//! Engine configuration
//!
//! Loaded from a RON file. Every field has a default, so a config file only
//! needs the values it changes.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::camera::{Camera, CameraController};
use crate::pipeline::RenderSettings;
use crate::rasterizer::{Vec3, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
        }
    }
}

/// Starting camera placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Point to face at startup; looks down +Z when absent
    pub target: Option<Vec3>,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let cam = Camera::default();
        Self {
            position: cam.position,
            target: None,
            fov: cam.fov,
            near: cam.near,
            far: cam.far,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        let mut camera = Camera {
            position: self.position,
            fov: self.fov,
            near: self.near,
            far: self.far,
            ..Default::default()
        };
        if let Some(target) = self.target {
            camera.look_at(target);
        }
        camera
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Framebuffer size in pixels
    pub width: usize,
    pub height: usize,
    /// Window pixels per framebuffer pixel
    pub window_scale: u32,
    /// Frame rate cap; 0 runs uncapped
    pub target_fps: u32,
    pub render: RenderSettings,
    pub camera: CameraConfig,
    pub controls: CameraController,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            window_scale: 3,
            target_fps: 60,
            render: RenderSettings::default(),
            camera: CameraConfig::default(),
            controls: CameraController::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Parse a config from a RON string
    pub fn load_from_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Load a config, falling back to defaults when the file is missing or broken
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Bad config file, using defaults");
                Self::default()
            }
        }
    }

    /// Save a config to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());

        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Frame interval for the configured cap
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.target_fps > 0).then(|| Duration::from_secs_f64(1.0 / self.target_fps as f64))
    }

    /// Time left in the frame budget after `elapsed` seconds of work
    pub fn remaining_frame_time(&self, elapsed: f64) -> Option<Duration> {
        let rest = self.frame_interval()?.as_secs_f64() - elapsed;
        (rest > 0.0).then(|| Duration::from_secs_f64(rest))
    }
}
