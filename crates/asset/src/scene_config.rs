//! `key=value` scene description.
//!
//! ```text
//! # comment
//! object.moon.file = models/moon.obj
//! object.moon.position = 0 0 -5
//! object.flamingo.animation = orbit
//! object.flamingo.orbit.target = mars
//! camera.fov = 45
//! light.color = 1 1 1
//! ```
//!
//! Relative file paths are resolved against the directory of the config file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AssetError, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationKind {
    #[default]
    None,
    Orbit,
}

pub const DEFAULT_ORBIT_RADIUS: f32 = 4.0;
pub const DEFAULT_ORBIT_SPEED: f32 = 0.3;

/// Orbit parameters; only used when the object's animation is `orbit`.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    /// Name of the object to circle; a fixed point when `None`.
    pub target: Option<String>,
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            target: None,
            radius: DEFAULT_ORBIT_RADIUS,
            speed: DEFAULT_ORBIT_SPEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectConfig {
    pub name: String,
    pub obj_file: Option<PathBuf>,
    pub mtl_file: Option<PathBuf>,
    pub texture: Option<PathBuf>,
    /// Two-pass objects (body + alpha-cut overlay) use these instead of `texture`.
    pub texture_body: Option<PathBuf>,
    pub texture_eye: Option<PathBuf>,
    pub position: [f32; 3],
    /// Degrees, applied X then Y then Z.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub animation: AnimationKind,
    pub orbit: OrbitConfig,
}

impl ObjectConfig {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            obj_file: None,
            mtl_file: None,
            texture: None,
            texture_body: None,
            texture_eye: None,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            animation: AnimationKind::None,
            orbit: OrbitConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [3.0, 3.0, 3.0],
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneConfig {
    /// In declaration order.
    pub objects: Vec<ObjectConfig>,
    pub camera: CameraConfig,
    pub light: LightConfig,
}

impl SceneConfig {
    pub fn object(&self, name: &str) -> Option<&ObjectConfig> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn object_entry(&mut self, name: &str) -> &mut ObjectConfig {
        let idx = match self.objects.iter().position(|o| o.name == name) {
            Some(i) => i,
            None => {
                self.objects.push(ObjectConfig::new(name));
                self.objects.len() - 1
            }
        };
        &mut self.objects[idx]
    }
}

pub fn load_scene_config(path: impl AsRef<Path>) -> Result<SceneConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| AssetError::from_open(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let config = parse_scene_config(&text, base)?;
    log::info!("Scene config {:?}: {} objects", path, config.objects.len());
    Ok(config)
}

/// Parse config text; relative paths are joined onto `base_dir`.
pub fn parse_scene_config(text: &str, base_dir: impl AsRef<Path>) -> Result<SceneConfig> {
    let base_dir = base_dir.as_ref();
    let mut config = SceneConfig::default();

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if let Some(rest) = key.strip_prefix("object.") {
            let Some((name, prop)) = rest.split_once('.') else {
                log::warn!("line {}: object key '{}' has no property", line_no, key);
                continue;
            };
            let path = || base_dir.join(value);
            let obj = config.object_entry(name);
            match prop {
                "file" => obj.obj_file = Some(path()),
                "mtl" => obj.mtl_file = Some(path()),
                "texture" => obj.texture = Some(path()),
                "texture.body" => obj.texture_body = Some(path()),
                "texture.eye" => obj.texture_eye = Some(path()),
                "position" => obj.position = parse_vec3(value, line_no)?,
                "rotation" => obj.rotation = parse_vec3(value, line_no)?,
                "scale" => obj.scale = parse_vec3(value, line_no)?,
                "animation" => {
                    obj.animation = match value {
                        "orbit" => AnimationKind::Orbit,
                        "" | "none" => AnimationKind::None,
                        other => {
                            log::warn!("line {}: unknown animation '{}'", line_no, other);
                            AnimationKind::None
                        }
                    }
                }
                "orbit.target" => obj.orbit.target = Some(value.to_owned()),
                "orbit.radius" => obj.orbit.radius = parse_scalar(value, line_no)?,
                "orbit.speed" => obj.orbit.speed = parse_scalar(value, line_no)?,
                other => log::warn!("line {}: unknown object property '{}'", line_no, other),
            }
        } else if let Some(prop) = key.strip_prefix("camera.") {
            let cam = &mut config.camera;
            match prop {
                "position" => cam.position = parse_vec3(value, line_no)?,
                "yaw" => cam.yaw = parse_scalar(value, line_no)?,
                "pitch" => cam.pitch = parse_scalar(value, line_no)?,
                "fov" => cam.fov = parse_scalar(value, line_no)?,
                "near" => cam.near = parse_scalar(value, line_no)?,
                "far" => cam.far = parse_scalar(value, line_no)?,
                other => log::warn!("line {}: unknown camera property '{}'", line_no, other),
            }
        } else if let Some(prop) = key.strip_prefix("light.") {
            match prop {
                "position" => config.light.position = parse_vec3(value, line_no)?,
                "color" => config.light.color = parse_vec3(value, line_no)?,
                other => log::warn!("line {}: unknown light property '{}'", line_no, other),
            }
        } else {
            log::warn!("line {}: unknown key '{}'", line_no, key);
        }
    }

    Ok(config)
}

fn parse_scalar(value: &str, line_no: usize) -> Result<f32> {
    value
        .parse::<f32>()
        .map_err(|_| AssetError::malformed(line_no, format!("invalid number '{value}'")))
}

fn parse_vec3(value: &str, line_no: usize) -> Result<[f32; 3]> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(AssetError::malformed(
            line_no,
            format!("expected 3 numbers, found '{value}'"),
        ));
    }
    Ok([
        parse_scalar(parts[0], line_no)?,
        parse_scalar(parts[1], line_no)?,
        parse_scalar(parts[2], line_no)?,
    ])
}
