mod letterbox;
mod text;
mod vertex;

pub use letterbox::Letterbox;
pub use text::TextLayer;
pub use vertex::{CanvasVertex, Mesh};

use letterbox::TransformUniform;

use std::sync::Arc;

use anyhow::Result;
use cellwars::render::TextCommand;
use cellwars::{Canvas, DrawCommand, Shape};
use glam::Vec2;
use winit::window::Window;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// MSAA sample count (4x anti-aliasing)
const MSAA_SAMPLE_COUNT: u32 = 4;

const INITIAL_VERTEX_CAPACITY: u64 = 4096;
const INITIAL_INDEX_CAPACITY: u64 = 8192;

/// A line of window-space text drawn over the world, such as the HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenText {
    pub text: String,
    pub position: Vec2,
    pub size: f32,
    pub color: [u8; 4],
}

/// Canvas that tessellates shapes into a mesh and defers text to the glyph pass.
#[derive(Debug)]
pub struct GpuCanvas {
    world: Vec2,
    mesh: Mesh,
    texts: Vec<TextCommand>,
}

impl GpuCanvas {
    pub fn new(world: Vec2) -> Self {
        Self {
            world,
            mesh: Mesh::default(),
            texts: Vec::new(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.mesh.clear();
        self.texts.clear();
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn texts(&self) -> &[TextCommand] {
        &self.texts
    }
}

impl Canvas for GpuCanvas {
    fn size(&self) -> Vec2 {
        self.world
    }

    fn draw(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Clear(color) => {
                self.begin_frame();
                self.mesh
                    .fill(&Shape::rect(0.0, 0.0, self.world.x, self.world.y), color);
            }
            DrawCommand::Fill { shape, color } => self.mesh.fill(&shape, color),
            DrawCommand::Stroke {
                shape,
                color,
                width,
            } => self.mesh.stroke(&shape, color, width),
            DrawCommand::Text(text) => self.texts.push(text),
        }
    }
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    msaa_view: wgpu::TextureView,
    canvas: GpuCanvas,
    text: TextLayer,
    letterbox: Letterbox,
    world: Vec2,
    pub size: winit::dpi::PhysicalSize<u32>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, world: Vec2) -> Result<Self> {
        let size = window.inner_size();
        let instance = Self::create_instance();
        let surface = instance.create_surface(window)?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;
        let config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &config);

        let transform_buffer = Self::create_transform_buffer(&device);
        let transform_bind_group_layout = Self::create_transform_bind_group_layout(&device);
        let transform_bind_group = Self::create_transform_bind_group(
            &device,
            &transform_bind_group_layout,
            &transform_buffer,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/canvas.wgsl").into()),
        });
        let pipeline =
            Self::create_canvas_pipeline(&device, &shader, &transform_bind_group_layout, &config);

        let vertex_buffer = Self::create_buffer(
            &device,
            "Canvas Vertex Buffer",
            INITIAL_VERTEX_CAPACITY * std::mem::size_of::<CanvasVertex>() as u64,
            wgpu::BufferUsages::VERTEX,
        );
        let index_buffer = Self::create_buffer(
            &device,
            "Canvas Index Buffer",
            INITIAL_INDEX_CAPACITY * std::mem::size_of::<u32>() as u64,
            wgpu::BufferUsages::INDEX,
        );

        let msaa_view = Self::create_msaa_view(&device, &config);
        let text = TextLayer::new(&device, &queue, config.format, size.width, size.height);
        let letterbox = Letterbox::fit(Vec2::new(size.width as f32, size.height as f32), world);
        queue.write_buffer(&transform_buffer, 0, bytemuck::bytes_of(&letterbox.uniform()));

        log::info!(
            "Renderer ready: {}x{} {:?}",
            size.width,
            size.height,
            config.format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            transform_buffer,
            transform_bind_group,
            vertex_buffer,
            index_buffer,
            num_indices: 0,
            msaa_view,
            canvas: GpuCanvas::new(world),
            text,
            letterbox,
            world,
            size,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.msaa_view = Self::create_msaa_view(&self.device, &self.config);
        self.text
            .resize(&self.queue, new_size.width, new_size.height);

        self.letterbox = Letterbox::fit(
            Vec2::new(new_size.width as f32, new_size.height as f32),
            self.world,
        );
        self.queue.write_buffer(
            &self.transform_buffer,
            0,
            bytemuck::bytes_of(&self.letterbox.uniform()),
        );
    }

    pub fn letterbox(&self) -> &Letterbox {
        &self.letterbox
    }

    /// Empties the canvas and hands it out for this frame's drawing.
    pub fn begin_frame(&mut self) -> &mut GpuCanvas {
        self.canvas.begin_frame();
        &mut self.canvas
    }

    pub fn render(&mut self, overlay: &[ScreenText]) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&Default::default());
        let mut encoder = self.device.create_command_encoder(&Default::default());

        self.upload_mesh();

        self.text.begin_frame();
        for command in self.canvas.texts() {
            self.text.queue_world(command, &self.letterbox);
        }
        for line in overlay {
            self.text
                .queue_screen(&line.text, line.position, line.size, line.color);
        }
        if let Err(e) = self.text.prepare(&self.device, &self.queue) {
            log::warn!("Failed to prepare text: {}", e);
        }

        self.record_canvas_pass(&mut encoder, &view);
        self.record_text_pass(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.text.trim();
        Ok(())
    }

    fn upload_mesh(&mut self) {
        let mesh = self.canvas.mesh();
        self.num_indices = mesh.indices.len() as u32;
        if mesh.is_empty() {
            return;
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&mesh.indices);

        if self.vertex_buffer.size() < vertex_bytes.len() as u64 {
            self.vertex_buffer = Self::create_buffer(
                &self.device,
                "Canvas Vertex Buffer",
                (vertex_bytes.len() as u64).next_power_of_two(),
                wgpu::BufferUsages::VERTEX,
            );
        }
        if self.index_buffer.size() < index_bytes.len() as u64 {
            self.index_buffer = Self::create_buffer(
                &self.device,
                "Canvas Index Buffer",
                (index_bytes.len() as u64).next_power_of_two(),
                wgpu::BufferUsages::INDEX,
            );
        }

        self.queue.write_buffer(&self.vertex_buffer, 0, vertex_bytes);
        self.queue.write_buffer(&self.index_buffer, 0, index_bytes);
    }

    fn record_canvas_pass(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Canvas Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.msaa_view,
                resolve_target: Some(target),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if self.num_indices == 0 {
            return;
        }
        let Some([x, y, w, h]) = self.world_scissor() else {
            return;
        };

        pass.set_scissor_rect(x, y, w, h);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.transform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }

    fn record_text_pass(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Text Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Err(e) = self.text.render(&mut pass) {
            log::warn!("Failed to render text: {}", e);
        }
    }

    /// Pixel rectangle covered by the world, clipped to the surface.
    fn world_scissor(&self) -> Option<[u32; 4]> {
        scissor_rect(&self.letterbox, self.world, self.config.width, self.config.height)
    }

    fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter> {
        Ok(instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await?)
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        Ok(adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?)
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_transform_buffer(device: &wgpu::Device) -> wgpu::Buffer {
        Self::create_buffer(
            device,
            "Transform Buffer",
            std::mem::size_of::<TransformUniform>() as u64,
            wgpu::BufferUsages::UNIFORM,
        )
    }

    fn create_buffer(
        device: &wgpu::Device,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_transform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn create_transform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    fn create_canvas_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        transform_layout: &wgpu::BindGroupLayout,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas Pipeline Layout"),
            bind_group_layouts: &[transform_layout],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[CanvasVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: MSAA_SAMPLE_COUNT,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        })
    }

    fn create_msaa_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: MSAA_SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

fn scissor_rect(letterbox: &Letterbox, world: Vec2, width: u32, height: u32) -> Option<[u32; 4]> {
    let min = letterbox.to_screen(Vec2::ZERO).max(Vec2::ZERO);
    let max = letterbox
        .to_screen(world)
        .min(Vec2::new(width as f32, height as f32));
    if !(max.x > min.x && max.y > min.y) {
        return None;
    }

    let x = min.x.floor() as u32;
    let y = min.y.floor() as u32;
    let w = (max.x.ceil() as u32).min(width).saturating_sub(x);
    let h = (max.y.ceil() as u32).min(height).saturating_sub(y);
    (w > 0 && h > 0).then_some([x, y, w, h])
}
