//! Interleave resolved mesh vertices into one flat `f32` stream.
//!
//! Field order is fixed: position, [colour], [normal], [texcoord]. Which of
//! the optional fields are present is described by a [`VertexLayout`] that
//! must match the vertex inputs of the shader the buffer is drawn with.

use crate::mesh::MeshData;

/// Where the colour field of each packed vertex comes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorSource {
    /// Same colour for every vertex.
    Fixed([f32; 3]),
    /// The OBJ's `v x y z r g b` colour, or `fallback` where absent.
    PerVertex { fallback: [f32; 3] },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexLayout {
    pub color: Option<ColorSource>,
    pub normal: bool,
    pub texcoord: bool,
}

/// One vertex attribute inside a packed record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSlot {
    pub location: u32,
    /// Offset in floats from the start of the record.
    pub offset: usize,
    pub components: usize,
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

impl VertexLayout {
    pub const POSITION: Self = Self {
        color: None,
        normal: false,
        texcoord: false,
    };

    /// 6 floats: `x y z r g b`.
    pub const POSITION_COLOR: Self = Self {
        color: Some(ColorSource::PerVertex { fallback: WHITE }),
        normal: false,
        texcoord: false,
    };

    /// 8 floats: `x y z nx ny nz u v`.
    pub const POSITION_NORMAL_UV: Self = Self {
        color: None,
        normal: true,
        texcoord: true,
    };

    /// 9 floats: `x y z r g b nx ny nz`.
    pub const POSITION_COLOR_NORMAL: Self = Self {
        color: Some(ColorSource::PerVertex { fallback: WHITE }),
        normal: true,
        texcoord: false,
    };

    /// 11 floats: `x y z r g b nx ny nz u v`.
    pub const FULL: Self = Self {
        color: Some(ColorSource::PerVertex { fallback: WHITE }),
        normal: true,
        texcoord: true,
    };

    pub fn with_color(mut self, color: ColorSource) -> Self {
        self.color = Some(color);
        self
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        3 + if self.color.is_some() { 3 } else { 0 }
            + if self.normal { 3 } else { 0 }
            + if self.texcoord { 2 } else { 0 }
    }

    #[inline]
    pub fn stride_bytes(&self) -> usize {
        self.stride() * std::mem::size_of::<f32>()
    }

    /// Attribute slots in record order; locations are assigned densely from 0.
    pub fn attributes(&self) -> Vec<AttributeSlot> {
        let mut slots = Vec::with_capacity(4);
        let mut offset = 0;
        let mut push = |components: usize| {
            let location = slots.len() as u32;
            slots.push(AttributeSlot {
                location,
                offset,
                components,
            });
            offset += components;
        };
        push(3);
        if self.color.is_some() {
            push(3);
        }
        if self.normal {
            push(3);
        }
        if self.texcoord {
            push(2);
        }
        slots
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::FULL
    }
}

/// Packed vertex stream ready for upload to a GPU array buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct PackedBuffer {
    pub data: Vec<f32>,
    pub vertex_count: u32,
    pub layout: VertexLayout,
}

impl PackedBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Record for vertex `i`, or `None` past the end.
    pub fn vertex(&self, i: usize) -> Option<&[f32]> {
        let stride = self.layout.stride();
        self.data.get(i * stride..(i + 1) * stride)
    }
}

/// Pack every vertex of `mesh` according to `layout`.
pub fn pack(mesh: &MeshData, layout: &VertexLayout) -> PackedBuffer {
    let mut data = Vec::with_capacity(mesh.vertex_count() * layout.stride());

    for v in &mesh.vertices {
        data.extend_from_slice(&v.position);
        match layout.color {
            Some(ColorSource::Fixed(rgb)) => data.extend_from_slice(&rgb),
            Some(ColorSource::PerVertex { fallback }) => {
                data.extend_from_slice(&v.color.unwrap_or(fallback))
            }
            None => {}
        }
        if layout.normal {
            data.extend_from_slice(&v.normal);
        }
        if layout.texcoord {
            data.extend_from_slice(&v.uv);
        }
    }

    PackedBuffer {
        data,
        vertex_count: mesh.vertex_count() as u32,
        layout: *layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{ObjOptions, load_obj_from_str};

    fn triangle() -> MeshData {
        let src = "v 0 0 0 1 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 1\nvn 0 1 0\nf 1/1/1 2/1/1 3//1\n";
        load_obj_from_str(src, &ObjOptions::default()).unwrap()
    }

    #[test]
    fn strides_of_presets() {
        assert_eq!(VertexLayout::POSITION.stride(), 3);
        assert_eq!(VertexLayout::POSITION_COLOR.stride(), 6);
        assert_eq!(VertexLayout::POSITION_NORMAL_UV.stride(), 8);
        assert_eq!(VertexLayout::POSITION_COLOR_NORMAL.stride(), 9);
        assert_eq!(VertexLayout::FULL.stride(), 11);
        assert_eq!(VertexLayout::FULL.stride_bytes(), 44);
    }

    #[test]
    fn full_layout_field_order() {
        let packed = pack(&triangle(), &VertexLayout::FULL);
        assert_eq!(packed.vertex_count, 3);
        assert_eq!(packed.data.len(), 33);
        assert_eq!(
            packed.vertex(0).unwrap(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 1.0]
        );
        // No colour on the second vertex: white fallback. No texcoord on the third: zero.
        assert_eq!(&packed.vertex(1).unwrap()[3..6], &[1.0, 1.0, 1.0]);
        assert_eq!(&packed.vertex(2).unwrap()[9..11], &[0.0, 0.0]);
        assert!(packed.vertex(3).is_none());
    }

    #[test]
    fn fixed_color_overrides_vertex_color() {
        let layout = VertexLayout::POSITION_COLOR_NORMAL
            .with_color(ColorSource::Fixed([0.2, 0.4, 0.6]));
        let packed = pack(&triangle(), &layout);
        for i in 0..3 {
            assert_eq!(&packed.vertex(i).unwrap()[3..6], &[0.2, 0.4, 0.6]);
        }
    }

    #[test]
    fn attribute_slots_follow_layout() {
        let slots = VertexLayout::POSITION_NORMAL_UV.attributes();
        assert_eq!(
            slots,
            vec![
                AttributeSlot { location: 0, offset: 0, components: 3 },
                AttributeSlot { location: 1, offset: 3, components: 3 },
                AttributeSlot { location: 2, offset: 6, components: 2 },
            ]
        );
        assert_eq!(VertexLayout::FULL.attributes().len(), 4);
    }

    #[test]
    fn bytes_view_matches_data() {
        let packed = pack(&triangle(), &VertexLayout::POSITION_COLOR);
        assert_eq!(packed.as_bytes().len(), packed.data.len() * 4);
    }
}
