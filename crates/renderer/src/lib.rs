//! Renderer: wgpu init + depth + lit/unlit model pipelines + background.
//! wgpu = 26.x, winit = 0.30.x

use std::sync::Arc;

use anyhow::{Context, Result};
use corelib::camera::Camera;
use corelib::ecs::{MeshHandle, OVERLAY_ALPHA_CUTOFF, TextureHandle, World};
use corelib::lighting::Lights;
use wgpu::{
    BindGroup, BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType,
    Buffer, BufferBindingType, BufferSize, BufferUsages, CommandEncoderDescriptor, Device,
    DeviceDescriptor, Extent3d, Features, Instance, InstanceDescriptor, Limits, LoadOp,
    Operations, PowerPreference, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, ShaderStages, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureDimension, TextureUsages, TextureView,
    TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, window::Window};

mod pipeline;
mod resources;
mod uniforms;

pub use pipeline::ShaderKind;
pub use resources::{GpuMesh, GpuTexture};

use pipeline::DEPTH_FORMAT;
use uniforms::{DrawUniform, FrameUniform, align_to};

/// Per-draw uniform slots allocated up front; the buffer doubles when exceeded.
const INITIAL_DRAW_SLOTS: u64 = 64;

/// Everything the renderer needs from the demo for one frame.
pub struct FrameView<'a> {
    pub camera: Camera,
    pub lights: &'a Lights,
    pub world: &'a World,
}

struct DrawCall {
    kind: ShaderKind,
    mesh: MeshHandle,
    texture: Option<TextureHandle>,
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipelines
    phong: RenderPipeline,
    unlit: RenderPipeline,
    background_pipeline: RenderPipeline,
    texture_bgl: BindGroupLayout,

    // Frame uniforms (group 0)
    frame_buf: Buffer,
    frame_bg: BindGroup,

    // Draw uniforms (group 1, dynamic offset)
    draw_bgl: BindGroupLayout,
    draw_buf: Buffer,
    draw_bg: BindGroup,
    draw_stride: u64,
    draw_slots: u64,
    draw_staging: Vec<u8>,

    // Assets
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    white: GpuTexture,
    background: Option<TextureHandle>,
    clear_color: wgpu::Color,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>.
    pub async fn new(window: Arc<Window>, backends: wgpu::Backends) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::info!("Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("Course Demos Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Bind group layouts ====
        let frame_size = std::mem::size_of::<FrameUniform>() as u64;
        let frame_bgl = uniform_bgl(&device, "Frame BGL", frame_size, false);
        let draw_size = std::mem::size_of::<DrawUniform>() as u64;
        let draw_bgl = uniform_bgl(&device, "Draw BGL", draw_size, true);
        let texture_bgl = resources::texture_bind_group_layout(&device);

        let frame_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame UBO"),
            size: frame_size,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BG"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buf.as_entire_binding(),
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let draw_stride = align_to(draw_size, alignment);
        let (draw_buf, draw_bg) = create_draw_slots(&device, &draw_bgl, draw_stride, INITIAL_DRAW_SLOTS);

        // ==== Pipelines ====
        let layouts = [&frame_bgl, &draw_bgl, &texture_bgl];
        let phong = pipeline::create_model_pipeline(&device, ShaderKind::Phong, surface_format, &layouts);
        let unlit = pipeline::create_model_pipeline(&device, ShaderKind::Unlit, surface_format, &layouts);
        let background_pipeline =
            pipeline::create_background_pipeline(&device, surface_format, &texture_bgl);

        let white = GpuTexture::new(&device, &queue, &texture_bgl, &asset::TextureData::white());

        log::info!("Surface {}x{} format {:?}", width, height, surface_format);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            phong,
            unlit,
            background_pipeline,
            texture_bgl,
            frame_buf,
            frame_bg,
            draw_bgl,
            draw_buf,
            draw_bg,
            draw_stride,
            draw_slots: INITIAL_DRAW_SLOTS,
            draw_staging: Vec::new(),
            meshes: Vec::new(),
            textures: Vec::new(),
            white,
            background: None,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.08,
                a: 1.0,
            },
            depth_view,
            width,
            height,
        })
    }

    pub fn upload_mesh(&mut self, packed: &asset::PackedBuffer) -> MeshHandle {
        self.meshes.push(GpuMesh::new(&self.device, packed));
        log::debug!(
            "Uploaded mesh #{} ({} vertices, stride {})",
            self.meshes.len() - 1,
            packed.vertex_count,
            packed.layout.stride()
        );
        self.meshes.len() - 1
    }

    pub fn upload_texture(&mut self, data: &asset::TextureData) -> TextureHandle {
        self.textures
            .push(GpuTexture::new(&self.device, &self.queue, &self.texture_bgl, data));
        self.textures.len() - 1
    }

    /// Texture stretched over the whole viewport behind the scene.
    pub fn set_background(&mut self, texture: Option<TextureHandle>) {
        self.background = texture;
    }

    pub fn set_clear_color(&mut self, rgb: [f64; 3]) {
        self.clear_color = wgpu::Color {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
            a: 1.0,
        };
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: background, then every renderable in the world.
    pub fn render(&mut self, view: &FrameView<'_>) -> Result<(), SurfaceError> {
        let camera = view.camera.with_aspect(self.aspect());
        let frame_uniform = FrameUniform::new(camera.proj_view(), camera.eye, view.lights);
        self.queue
            .write_buffer(&self.frame_buf, 0, bytemuck::bytes_of(&frame_uniform));

        let draws = self.collect_draws(view.world);
        if !self.draw_staging.is_empty() {
            self.queue.write_buffer(&self.draw_buf, 0, &self.draw_staging);
        }

        // --- frame & pass
        let frame = self.surface.get_current_texture()?;
        let target = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target,
                    depth_slice: None, // required since wgpu 26
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(bg) = self.background.and_then(|h| self.textures.get(h)) {
                rpass.set_pipeline(&self.background_pipeline);
                rpass.set_bind_group(0, &bg.bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }

            rpass.set_bind_group(0, &self.frame_bg, &[]);
            for (slot, draw) in draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(draw.mesh) else {
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|h| self.textures.get(h))
                    .unwrap_or(&self.white);
                let pipeline = match draw.kind {
                    ShaderKind::Phong => &self.phong,
                    ShaderKind::Unlit => &self.unlit,
                };
                let offset = (slot as u64 * self.draw_stride) as u32;

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &self.draw_bg, &[offset]);
                rpass.set_bind_group(2, &texture.bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.buffer.slice(..));
                rpass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Build the draw list and fill the per-draw uniform staging bytes.
    fn collect_draws(&mut self, world: &World) -> Vec<DrawCall> {
        let mut draws = Vec::new();
        self.draw_staging.clear();

        for (t, r) in world.iter_renderables() {
            let kind = ShaderKind::from(r.shading);
            let Some(mesh) = self.meshes.get(r.mesh) else {
                log::warn!("Renderable refers to unknown mesh #{}", r.mesh);
                continue;
            };
            if mesh.layout != kind.layout() {
                log::warn!("Mesh #{} is not packed for the {:?} shader", r.mesh, kind);
                continue;
            }

            let model = t.matrix();
            let normal = t.normal_matrix();
            let passes = [(r.texture, 0.0), (r.overlay, OVERLAY_ALPHA_CUTOFF)];
            for (i, (texture, cutoff)) in passes.into_iter().enumerate() {
                if i == 1 && texture.is_none() {
                    break;
                }
                let uniform = DrawUniform::new(model, normal, &r.material, cutoff);
                self.draw_staging.extend_from_slice(bytemuck::bytes_of(&uniform));
                self.draw_staging
                    .resize((draws.len() + 1) * self.draw_stride as usize, 0);
                draws.push(DrawCall {
                    kind,
                    mesh: r.mesh,
                    texture,
                });
            }
        }

        self.ensure_draw_slots(draws.len() as u64);
        draws
    }

    fn ensure_draw_slots(&mut self, needed: u64) {
        if needed <= self.draw_slots {
            return;
        }
        let slots = needed.next_power_of_two();
        let (buf, bg) = create_draw_slots(&self.device, &self.draw_bgl, self.draw_stride, slots);
        self.draw_buf = buf;
        self.draw_bg = bg;
        self.draw_slots = slots;
        log::debug!("Grew draw uniform buffer to {} slots", slots);
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

fn uniform_bgl(device: &Device, label: &str, size: u64, dynamic: bool) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: BufferSize::new(size),
            },
            count: None,
        }],
    })
}

fn create_draw_slots(
    device: &Device,
    layout: &BindGroupLayout,
    stride: u64,
    slots: u64,
) -> (Buffer, BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw UBO"),
        size: stride * slots,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw BG"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}
