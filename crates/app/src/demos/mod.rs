//! Interactive demos and the helpers they share.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset::{Material, MeshData, MeshVertex, Model, ObjOptions, TextureData, VertexLayout, pack};
use corelib::Vec3;
use corelib::camera::{FlyCamera, OrbitCamera};
use corelib::ecs::{MeshHandle, Renderable, TextureHandle};
use corelib::input::Command;
use corelib::lighting::PhongMaterial;
use renderer::{GpuState, ShaderKind};

pub mod cube;
pub mod orbit;
pub mod phong;
pub mod scene;
pub mod trajectory;
pub mod viewer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoKind {
    Cube,
    Viewer,
    Phong,
    Orbit,
    Scene,
    Trajectory,
}

impl DemoKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "cube" | "cubes" => DemoKind::Cube,
            "viewer" | "model" => DemoKind::Viewer,
            "phong" | "lights" => DemoKind::Phong,
            "orbit" => DemoKind::Orbit,
            "scene" => DemoKind::Scene,
            "trajectory" | "paths" => DemoKind::Trajectory,
            _ => return None,
        })
    }
}

const FACE_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Unit cube centred on the origin (half-extent 0.5), one colour per face,
/// 36 vertices with flat normals and 0..1 texture coordinates.
pub fn cube_mesh() -> MeshData {
    // (normal, u axis, v axis) per face; corners are n/2 ± u/2 ± v/2.
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    ];
    let quad = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut vertices = Vec::with_capacity(36);
    for ((n, u, v), color) in faces.into_iter().zip(FACE_COLORS) {
        for [s, t] in quad {
            let p = (n + u * (2.0 * s - 1.0) + v * (2.0 * t - 1.0)) * 0.5;
            vertices.push(MeshVertex::new(p.to_array(), n.to_array(), [s, t]).with_color(Some(color)));
        }
    }
    MeshData::new(vertices)
}

/// OBJ material coefficients as shader parameters.
pub fn phong_material(m: &Material) -> PhongMaterial {
    PhongMaterial {
        ka: Vec3::from_array(m.ka),
        kd: Vec3::from_array(m.kd),
        ks: Vec3::from_array(m.ks),
        shininess: m.shininess,
    }
}

/// Mesh, optional diffuse texture and material, uploaded and ready to spawn.
#[derive(Clone, Copy, Debug)]
pub struct GpuModel {
    pub mesh: MeshHandle,
    pub texture: Option<TextureHandle>,
    pub material: PhongMaterial,
}

impl GpuModel {
    pub fn renderable(&self, overlay: Option<TextureHandle>) -> Renderable {
        Renderable::new(self.mesh)
            .with_texture(self.texture)
            .with_overlay(overlay)
            .with_material(self.material)
    }
}

/// Where a model demo reads its mesh from, plus an optional overlay texture
/// drawn over the body with alpha cutoff (eyes, decals).
#[derive(Clone, Debug, Default)]
pub struct ModelSource {
    pub obj: Option<PathBuf>,
    pub mtl: Option<PathBuf>,
    pub overlay: Option<PathBuf>,
    pub options: ObjOptions,
}

impl ModelSource {
    pub fn load(&self) -> Result<Model> {
        load_model_or_cube(self.obj.as_deref(), self.mtl.as_deref(), &self.options)
    }

    /// Load, upload and wrap the model in a renderable carrying its overlay.
    pub fn upload(&self, gpu: &mut GpuState) -> Result<Renderable> {
        let model = self.load()?;
        let gpu_model = upload_model(gpu, &model, None)?;
        let overlay = self
            .overlay
            .as_deref()
            .map(|path| upload_texture(gpu, path))
            .transpose()?;
        Ok(gpu_model.renderable(overlay))
    }
}

/// Load an OBJ (and its MTL) from disk, or fall back to the built-in cube when
/// no path is given.
pub fn load_model_or_cube(obj: Option<&Path>, mtl: Option<&Path>, options: &ObjOptions) -> Result<Model> {
    match obj {
        Some(path) => asset::load_model(path, mtl, options)
            .with_context(|| format!("loading model {}", path.display())),
        None => {
            log::warn!("No model file given; using the built-in cube");
            Ok(Model {
                mesh: cube_mesh(),
                material: Material::default(),
            })
        }
    }
}

/// Pack for the lit shader and upload mesh + texture. `texture` overrides the
/// material's `map_Kd`.
pub fn upload_model(gpu: &mut GpuState, model: &Model, texture: Option<&Path>) -> Result<GpuModel> {
    let packed = pack(&model.mesh, &ShaderKind::Phong.layout());
    let mesh = gpu.upload_mesh(&packed);

    let texture = match texture.or(model.texture_path()) {
        Some(path) => Some(upload_texture(gpu, path)?),
        None => None,
    };

    Ok(GpuModel {
        mesh,
        texture,
        material: phong_material(&model.material),
    })
}

pub fn upload_texture(gpu: &mut GpuState, path: &Path) -> Result<TextureHandle> {
    let data = TextureData::load(path).with_context(|| format!("loading texture {}", path.display()))?;
    if !data.is_valid() {
        anyhow::bail!("texture {} has no pixels", path.display());
    }
    Ok(gpu.upload_texture(&data))
}

/// Pack a mesh with per-vertex colours for the unlit shader.
pub fn upload_colored(gpu: &mut GpuState, mesh: &MeshData) -> MeshHandle {
    let layout = ShaderKind::Unlit.layout();
    debug_assert_eq!(layout, VertexLayout::POSITION_COLOR);
    gpu.upload_mesh(&pack(mesh, &layout))
}

/// Apply a camera command to a first-person camera. Returns false for
/// commands that are not camera motion.
pub fn steer_fly_camera(camera: &mut FlyCamera, command: Command) -> bool {
    match command {
        Command::CameraRotate { yaw, pitch } => camera.rotate(yaw, pitch),
        Command::CameraMove { forward, right, up } => {
            camera.move_forward(forward);
            camera.move_right(right);
            camera.move_up(up);
        }
        _ => return false,
    }
    true
}

/// Apply a camera command to an orbit camera. Returns false for commands that
/// are not camera motion.
pub fn steer_orbit_camera(camera: &mut OrbitCamera, command: Command) -> bool {
    match command {
        Command::CameraRotate { yaw, pitch } => camera.rotate(yaw, pitch),
        Command::CameraZoom(delta) => camera.zoom(delta),
        Command::CameraRoll(delta) => camera.roll_by(delta),
        _ => return false,
    }
    true
}
