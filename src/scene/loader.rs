//! Scene file I/O
//!
//! Scenes are stored as RON. Mesh and texture paths inside a scene file
//! are relative to the file's directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CameraConfig;
use crate::rasterizer::{Color, Texture, Vec3};
use super::{obj, shapes, Light, Mesh, Scene};

/// Error type for scene and mesh loading
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    Image(image::ImageError),
    Obj { line: usize, message: String },
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl From<image::ImageError> for SceneError {
    fn from(e: image::ImageError) -> Self {
        SceneError::Image(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneError::Image(e) => write!(f, "Image error: {}", e),
            SceneError::Obj { line, message } => write!(f, "OBJ error on line {}: {}", line, message),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io(e) => Some(e),
            SceneError::Parse(e) => Some(e),
            SceneError::Serialize(e) => Some(e),
            SceneError::Image(e) => Some(e),
            SceneError::Obj { .. } => None,
        }
    }
}

/// Geometry source for a mesh entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cube { size: Vec3 },
    Sphere { radius: f32, resolution: usize },
    Cone { radius: f32, height: f32, resolution: usize },
    Cylinder { radius: f32, height: f32, resolution: usize },
    Obj(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    File(PathBuf),
    Checkerboard { size: usize, a: Color, b: Color },
    Solid(Color),
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

fn default_background() -> Color {
    Color::BLACK
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDesc {
    #[serde(default)]
    pub name: String,
    pub shape: Shape,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub texture: Option<TextureSource>,
}

impl MeshDesc {
    pub fn new(shape: Shape) -> Self {
        Self {
            name: String::new(),
            shape,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: None,
            texture: None,
        }
    }
}

/// On-disk scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Starting camera; the engine config's camera is used when absent
    #[serde(default)]
    pub camera: Option<CameraConfig>,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
}

impl Default for SceneFile {
    fn default() -> Self {
        Self {
            camera: None,
            background: default_background(),
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }
}

impl SceneFile {
    /// Build the renderable scene. Relative paths resolve against `base_dir`;
    /// each texture file is loaded once and shared between meshes.
    pub fn build(&self, base_dir: &Path) -> Result<Scene, SceneError> {
        let mut textures: HashMap<PathBuf, Arc<Texture>> = HashMap::new();
        let mut scene = Scene {
            meshes: Vec::with_capacity(self.meshes.len()),
            lights: self.lights.clone(),
            background: self.background,
        };

        for desc in &self.meshes {
            let mut mesh = match &desc.shape {
                Shape::Cube { size } => shapes::cube(*size),
                Shape::Sphere { radius, resolution } => shapes::sphere(*radius, *resolution),
                Shape::Cone { radius, height, resolution } => shapes::cone(*radius, *height, *resolution),
                Shape::Cylinder { radius, height, resolution } => {
                    shapes::cylinder(*radius, *height, *resolution)
                }
                Shape::Obj(path) => obj::load_obj(base_dir.join(path))?,
            };

            if !desc.name.is_empty() {
                mesh.name = desc.name.clone();
            }
            mesh.position = desc.position;
            mesh.rotation = desc.rotation;
            mesh.scale = desc.scale;
            if let Some(color) = desc.color {
                mesh.set_color(color);
            }

            mesh.texture = match &desc.texture {
                None => None,
                Some(TextureSource::File(path)) => {
                    let full = base_dir.join(path);
                    let texture = match textures.get(&full) {
                        Some(t) => Arc::clone(t),
                        None => {
                            let t = Arc::new(Texture::from_file(&full)?);
                            textures.insert(full, Arc::clone(&t));
                            t
                        }
                    };
                    Some(texture)
                }
                Some(TextureSource::Checkerboard { size, a, b }) => {
                    Some(Arc::new(Texture::checkerboard(*size, *size, *a, *b)))
                }
                Some(TextureSource::Solid(color)) => Some(Arc::new(Texture::solid(1, 1, *color))),
            };

            debug!(name = %mesh.name, triangles = mesh.triangles.len(), "Built mesh");
            scene.meshes.push(mesh);
        }

        Ok(scene)
    }
}

/// Load a scene file from a RON file
pub fn load_scene_file<P: AsRef<Path>>(path: P) -> Result<SceneFile, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_file_from_str(&contents)
}

/// Load a scene file from a RON string (for embedded scenes or testing)
pub fn load_scene_file_from_str(s: &str) -> Result<SceneFile, SceneError> {
    Ok(ron::from_str(s)?)
}

/// Save a scene file to a RON file
pub fn save_scene_file<P: AsRef<Path>>(file: &SceneFile, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(file, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load and build a scene, returning it with the file's starting camera
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(Scene, Option<CameraConfig>), SceneError> {
    let path = path.as_ref();
    let file = load_scene_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let scene = file.build(base_dir)?;

    info!(
        path = %path.display(),
        meshes = scene.meshes.len(),
        triangles = scene.triangle_count(),
        lights = scene.lights.len(),
        "Loaded scene"
    );
    Ok((scene, file.camera))
}
