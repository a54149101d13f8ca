//! CPU-side mesh representation used by loaders.

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Per-vertex colour from `v x y z r g b`, when the file carries one.
    pub color: Option<[f32; 3]>,
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Option<[f32; 3]>) -> Self {
        self.color = color;
        self
    }
}

/// Non-indexed triangle list: every three consecutive vertices form one
/// triangle, in the corner order the source file gave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    /// First `mtllib` reference found in the OBJ, verbatim.
    pub material_lib: Option<String>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        Self {
            vertices,
            material_lib: None,
        }
    }

    /// Corners after triangulation.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[MeshVertex]> {
        self.vertices.chunks_exact(3)
    }

    /// Returns `true` if there is at least one whole triangle.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && self.vertices.len() % 3 == 0
    }
}
