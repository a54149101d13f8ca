//! Asset loading/parsers (meshes, materials, textures, scene files).
//! OBJ geometry is expanded into a flat triangle list and packed into an
//! interleaved `f32` stream for upload; nothing here touches the GPU.

pub mod error;
pub mod mesh;
pub mod model;
pub mod mtl;
pub mod obj;
pub mod pack;
pub mod scene_config;
pub mod texture;
pub mod trajectory;

pub use error::{AssetError, IndexKind, Result};
pub use mesh::{MeshData, MeshVertex};
pub use model::{Model, load_model};
pub use mtl::Material;
pub use obj::{FaceCorner, MissingNormals, ObjOptions};
pub use pack::{AttributeSlot, ColorSource, PackedBuffer, VertexLayout, pack};
pub use texture::TextureData;
