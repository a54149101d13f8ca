//! Render pipelines for model and background drawing.

use asset::{AttributeSlot, VertexLayout};
use corelib::ecs::Shading;
use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, CompareFunction, DepthBiasState,
    DepthStencilState, Device, FragmentState, PipelineLayoutDescriptor, RenderPipeline,
    RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, TextureFormat,
    VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, VertexStepMode,
};

pub(crate) const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Which shader a mesh is drawn with. Each kind expects one vertex layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Textured, lit by up to three point lights.
    Phong,
    /// Per-vertex colour only.
    Unlit,
}

impl ShaderKind {
    /// Vertex layout meshes drawn with this shader must be packed in.
    pub fn layout(self) -> VertexLayout {
        match self {
            ShaderKind::Phong => VertexLayout::POSITION_NORMAL_UV,
            ShaderKind::Unlit => VertexLayout::POSITION_COLOR,
        }
    }

    fn source(self) -> &'static str {
        match self {
            ShaderKind::Phong => concat!(
                include_str!("shaders/common.wgsl"),
                include_str!("shaders/phong.wgsl")
            ),
            ShaderKind::Unlit => concat!(
                include_str!("shaders/common.wgsl"),
                include_str!("shaders/unlit.wgsl")
            ),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ShaderKind::Phong => "Phong",
            ShaderKind::Unlit => "Unlit",
        }
    }
}

impl From<Shading> for ShaderKind {
    fn from(s: Shading) -> Self {
        match s {
            Shading::Phong => ShaderKind::Phong,
            Shading::Unlit => ShaderKind::Unlit,
        }
    }
}

fn vertex_format(slot: &AttributeSlot) -> VertexFormat {
    match slot.components {
        2 => VertexFormat::Float32x2,
        3 => VertexFormat::Float32x3,
        _ => VertexFormat::Float32x4,
    }
}

/// wgpu attributes for a packed layout; offsets converted from floats to bytes.
pub(crate) fn vertex_attributes(layout: &VertexLayout) -> Vec<VertexAttribute> {
    layout
        .attributes()
        .iter()
        .map(|slot| VertexAttribute {
            format: vertex_format(slot),
            offset: (slot.offset * std::mem::size_of::<f32>()) as u64,
            shader_location: slot.location,
        })
        .collect()
}

pub(crate) fn create_model_pipeline(
    device: &Device,
    kind: ShaderKind,
    surface_format: TextureFormat,
    bind_group_layouts: &[&BindGroupLayout],
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: ShaderSource::Wgsl(kind.source().into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(kind.label()),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let vertex_layout = kind.layout();
    let attributes = vertex_attributes(&vertex_layout);
    let buffers = [VertexBufferLayout {
        array_stride: vertex_layout.stride_bytes() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &attributes,
    }];

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(kind.label()),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // OBJ files do not agree on winding.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Full-screen textured triangle drawn behind everything else.
pub(crate) fn create_background_pipeline(
    device: &Device,
    surface_format: TextureFormat,
    texture_bgl: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Background"),
        source: ShaderSource::Wgsl(include_str!("shaders/background.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Background"),
        bind_group_layouts: &[texture_bgl],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Background"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
