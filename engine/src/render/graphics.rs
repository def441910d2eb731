use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::config::RendererConfig;
use crate::platform::NativeWindow;

use super::camera::aspect_ratio;
use super::{Camera, ClearColor, Mesh, RenderSurface, Renderer, RendererBackend, RendererError, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const INITIAL_DRAW_CAPACITY: usize = 64;

/// wgpu-backed renderer.
///
/// Owns the whole GPU context for one window: surface, device, the mesh
/// pipeline and the built-in triangle/cube buffers. Draws are queued during a
/// frame and recorded into a single pass in `end_frame`.
pub struct WgpuRenderer {
    config: RendererConfig,
    camera: Camera,
    size: (u32, u32),
    gfx: Option<Graphics>,
    frame: FrameState,
}

impl WgpuRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            config: config.clone(),
            camera: Camera::default(),
            size: (0, 0),
            gfx: None,
            frame: FrameState::Idle,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.gfx.is_some()
    }

    fn view_projection(&self) -> Mat4 {
        self.camera
            .view_projection(aspect_ratio(self.size.0, self.size.1))
    }

    fn push_draw(&mut self, mesh: MeshSlot, mvp: Mat4) {
        match &mut self.frame {
            FrameState::Recording(frame) => frame.draws.push(DrawItem { mesh, mvp }),
            FrameState::Skipped => {}
            FrameState::Idle => log::debug!("wgpu: draw outside of a frame dropped"),
        }
    }
}

impl Renderer for WgpuRenderer {
    fn initialize(
        &mut self,
        surface: RenderSurface,
        width: u32,
        height: u32,
    ) -> Result<(), RendererError> {
        if self.gfx.is_some() {
            return Err(RendererError::AlreadyInitialized);
        }
        let RenderSurface::Window(window) = surface else {
            return Err(RendererError::MissingWindow);
        };

        match NativeWindow::from_window(&*window) {
            Ok(native) if native.has_display() => {
                log::debug!("binding to native {} window", native.platform())
            }
            Ok(native) => log::warn!(
                "native {} window has no display connection",
                native.platform()
            ),
            Err(err) => log::warn!("native window handle unavailable: {err}"),
        }

        let gfx = pollster::block_on(Graphics::new(window, width, height, &self.config))?;
        log::info!(
            "wgpu renderer initialized ({:?}, {width}x{height})",
            gfx.backend
        );

        self.size = (width, height);
        self.gfx = Some(gfx);
        self.frame = FrameState::Idle;
        Ok(())
    }

    fn shutdown(&mut self) {
        // Surface textures must go before the surface itself.
        self.frame = FrameState::Idle;
        if self.gfx.take().is_some() {
            log::info!("wgpu renderer shutdown");
        }
    }

    fn begin_frame(&mut self) -> Result<(), RendererError> {
        let gfx = self.gfx.as_mut().ok_or(RendererError::NotInitialized)?;
        if !matches!(self.frame, FrameState::Idle) {
            return Err(RendererError::FrameInProgress);
        }

        self.frame = match gfx.acquire()? {
            Some(frame) => FrameState::Recording(frame),
            None => FrameState::Skipped,
        };
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RendererError> {
        let gfx = self.gfx.as_mut().ok_or(RendererError::NotInitialized)?;
        match std::mem::replace(&mut self.frame, FrameState::Idle) {
            FrameState::Idle => Err(RendererError::NoActiveFrame),
            FrameState::Skipped => Ok(()),
            FrameState::Recording(frame) => {
                gfx.submit(frame, self.config.clear_color);
                Ok(())
            }
        }
    }

    fn draw_mesh(&mut self, mesh: &Mesh, model: Mat4) {
        let Some(gfx) = self.gfx.as_ref() else {
            log::debug!("wgpu: draw_mesh before initialize dropped");
            return;
        };
        if !matches!(self.frame, FrameState::Recording(_)) {
            log::debug!("wgpu: draw outside of a frame dropped");
            return;
        }
        let uploaded = GpuMesh::upload(&gfx.device, mesh, "nyanchu transient mesh");
        let mvp = self.view_projection() * model;
        self.push_draw(MeshSlot::Owned(uploaded), mvp);
    }

    fn draw_triangle(&mut self) {
        self.push_draw(MeshSlot::Triangle, Mat4::IDENTITY);
    }

    fn draw_cube(&mut self, model: Mat4) {
        let mvp = self.view_projection() * model;
        self.push_draw(MeshSlot::Cube, mvp);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        if let Some(gfx) = self.gfx.as_mut() {
            gfx.resize(width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    fn backend(&self) -> RendererBackend {
        RendererBackend::Wgpu
    }
}

enum FrameState {
    Idle,
    Recording(ActiveFrame),
    /// Surface was unavailable this frame; draws are discarded.
    Skipped,
}

struct ActiveFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    draws: Vec<DrawItem>,
}

struct DrawItem {
    mesh: MeshSlot,
    mvp: Mat4,
}

enum MeshSlot {
    Triangle,
    Cube,
    Owned(GpuMesh),
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    mvp: [[f32; 4]; 4],
}

const DRAW_UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

/// One uniform slot per draw, addressed through dynamic offsets.
struct DrawUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl DrawUniforms {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nyanchu draw uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nyanchu draw bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        required: usize,
    ) {
        if required <= self.capacity {
            return;
        }
        let capacity = required.next_power_of_two().max(INITIAL_DRAW_CAPACITY);
        *self = Self::new(device, layout, self.stride, capacity);
    }

    fn offset(&self, slot: usize) -> u32 {
        (slot as u64 * self.stride) as u32
    }
}

/// Response to a failed swapchain acquire.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering resumes next frame.
    Reconfigured,
    SkipFrame,
    Fatal,
}

struct Graphics {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    backend: wgpu::Backend,

    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniforms: DrawUniforms,

    triangle: GpuMesh,
    cube: GpuMesh,
}

impl Graphics {
    async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        settings: &RendererConfig,
    ) -> Result<Self, RendererError> {
        // Let wgpu pick the best backend for the platform.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference.into(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("nyanchu device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats).ok_or(RendererError::NoSurfaceFormat)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(settings.vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);
        let bind_group_layout = create_bind_group_layout(&device);
        let pipeline = create_pipeline(&device, &bind_group_layout, format);

        let stride = align_to(
            DRAW_UNIFORM_SIZE,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let uniforms = DrawUniforms::new(&device, &bind_group_layout, stride, INITIAL_DRAW_CAPACITY);

        let triangle = GpuMesh::upload(&device, &Mesh::triangle(), "nyanchu triangle");
        let cube = GpuMesh::upload(&device, &Mesh::cube(), "nyanchu cube");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            backend: adapter.get_info().backend,
            depth_view,
            pipeline,
            bind_group_layout,
            uniforms,
            triangle,
            cube,
        })
    }

    /// wgpu cannot configure a 0x0 surface; reconfiguration waits for a real size.
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    fn is_presentable(&self) -> bool {
        let size = self.window.inner_size();
        size.width > 0 && size.height > 0
    }

    /// Acquires the next swapchain image. `Ok(None)` means skip this frame.
    fn acquire(&mut self) -> Result<Option<ActiveFrame>, RendererError> {
        if !self.is_presentable() {
            return Ok(None);
        }

        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(Some(ActiveFrame {
                    surface_texture,
                    view,
                    draws: Vec::new(),
                }))
            }
            Err(err) => match self.handle_surface_error(&err) {
                SurfaceErrorAction::Fatal => Err(RendererError::Surface(err)),
                action => {
                    log::debug!("skipping frame after surface error ({err}): {action:?}");
                    Ok(None)
                }
            },
        }
    }

    fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.surface.configure(&self.device, &self.config);
                SurfaceErrorAction::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
                SurfaceErrorAction::SkipFrame
            }
        }
    }

    fn submit(&mut self, frame: ActiveFrame, clear: ClearColor) {
        let ActiveFrame {
            surface_texture,
            view,
            draws,
        } = frame;

        self.uniforms
            .ensure_capacity(&self.device, &self.bind_group_layout, draws.len());

        if !draws.is_empty() {
            let stride = self.uniforms.stride as usize;
            let mut staging = vec![0u8; stride * draws.len()];
            for (slot, draw) in staging.chunks_exact_mut(stride).zip(&draws) {
                let uniform = DrawUniform {
                    mvp: draw.mvp.to_cols_array_2d(),
                };
                slot[..DRAW_UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniform));
            }
            self.queue.write_buffer(&self.uniforms.buffer, 0, &staging);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("nyanchu frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nyanchu main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            for (slot, draw) in draws.iter().enumerate() {
                let mesh = match &draw.mesh {
                    MeshSlot::Triangle => &self.triangle,
                    MeshSlot::Cube => &self.cube,
                    MeshSlot::Owned(mesh) => mesh,
                };
                rpass.set_bind_group(0, &self.uniforms.bind_group, &[self.uniforms.offset(slot)]);
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        surface_texture.present();
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("nyanchu depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("nyanchu draw bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
            },
            count: None,
        }],
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("nyanchu mesh shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("nyanchu mesh pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("nyanchu mesh pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Prefers an sRGB format, else the surface's first.
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn align_to(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}
