//! OBJ + MTL loaded together.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::mesh::MeshData;
use crate::mtl::{Material, load_mtl_from_path};
use crate::obj::{ObjOptions, load_obj_from_path};

#[derive(Clone, Debug)]
pub struct Model {
    pub mesh: MeshData,
    pub material: Material,
}

impl Model {
    pub fn texture_path(&self) -> Option<&Path> {
        self.material.diffuse_texture.as_deref()
    }
}

/// Load a mesh and its material.
///
/// The material comes from `mtl_path` when given, otherwise from the OBJ's
/// own `mtllib` (resolved next to the OBJ), otherwise defaults. Any failure,
/// including an MTL that cannot be opened, fails the whole load.
pub fn load_model(
    obj_path: impl AsRef<Path>,
    mtl_path: Option<&Path>,
    options: &ObjOptions,
) -> Result<Model> {
    let obj_path = obj_path.as_ref();
    let mesh = load_obj_from_path(obj_path, options)?;

    let mtl_path: Option<PathBuf> = match (mtl_path, mesh.material_lib.as_deref()) {
        (Some(explicit), _) => Some(explicit.to_path_buf()),
        (None, Some(lib)) => Some(
            obj_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(lib),
        ),
        (None, None) => None,
    };

    let material = match mtl_path {
        Some(path) => load_mtl_from_path(&path)?,
        None => {
            log::warn!("{:?} has no material; using defaults", obj_path);
            Material::default()
        }
    };

    Ok(Model { mesh, material })
}
