use crate::camera::OrbitCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use wavefield_assets::AlphaMask;
use wavefield_common::{SceneConfig, Viewport};
use wavefield_kernel::ParticleBuffer;
use wgpu::util::DeviceExt;

/// Bytes per packed `[f32; 3]` particle attribute.
const TRIPLE_STRIDE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    params: [f32; 4],
}

impl Uniforms {
    fn new(camera: &OrbitCamera, style: &PointStyle, target_size: (u32, u32), pixel_ratio: f32) -> Self {
        let (size, attenuation) = if style.size_attenuation {
            (world_point_size(style.size, camera.fov), 1.0)
        } else {
            (style.size * pixel_ratio, 0.0)
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_right: camera.right().extend(0.0).to_array(),
            camera_up: camera.up().extend(0.0).to_array(),
            params: [size, attenuation, target_size.0 as f32, target_size.1 as f32],
        }
    }
}

/// World-space sprite size that covers the same share of the viewport height
/// as a perspective-scaled point of `size` at the same depth.
///
/// An attenuated point is `size * (height / 2) / depth` pixels tall, while a
/// world quad of side `s` is `s * (height / 2) / (depth * tan(fov / 2))`.
fn world_point_size(size: f32, fov: f32) -> f32 {
    size * (fov * 0.5).tan()
}

/// Appearance of the particle sprites. Adjustable at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub size: f32,
    /// Scale sprites with distance; otherwise `size` is in pixels.
    pub size_attenuation: bool,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self::from(&SceneConfig::default())
    }
}

impl From<&SceneConfig> for PointStyle {
    fn from(config: &SceneConfig) -> Self {
        Self {
            size: config.point_size,
            size_attenuation: config.size_attenuation,
        }
    }
}

/// Which particle data must be written before the next draw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct UploadPlan {
    grow: bool,
    colors: bool,
    positions: bool,
}

/// Tracks what the GPU copies of the particle data currently hold.
///
/// Colors are keyed on the buffer identity, positions on identity plus
/// generation, so switching to another field re-uploads both.
#[derive(Debug, Default)]
struct UploadState {
    capacity: usize,
    colors_of: Option<u64>,
    positions_of: Option<(u64, u64)>,
}

impl UploadState {
    fn plan(&mut self, particles: &ParticleBuffer) -> UploadPlan {
        let count = particles.count();
        let grow = count > self.capacity;
        if grow {
            self.capacity = count;
            self.colors_of = None;
            self.positions_of = None;
        }
        if count == 0 {
            return UploadPlan {
                grow,
                ..UploadPlan::default()
            };
        }

        let id = particles.id();
        let positions_key = (id, particles.position_generation());
        let plan = UploadPlan {
            grow,
            colors: self.colors_of != Some(id),
            positions: self.positions_of != Some(positions_key),
        };
        self.colors_of = Some(id);
        self.positions_of = Some(positions_key);
        plan
    }
}

/// wgpu renderer for a particle field.
///
/// Draws one alpha-masked, additively blended quad per particle. Depth is
/// tested but never written, so overlapping sprites accumulate instead of
/// occluding one another.
pub struct PointsRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    mask_bind_group: wgpu::BindGroup,
    position_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    uploads: UploadState,
    drawn_count: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    target_size: (u32, u32),
    pixel_ratio: f32,
    pub style: PointStyle,
}

impl PointsRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: &Viewport,
        mask: &AlphaMask,
        style: PointStyle,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let mask_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mask_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mask_bind_group = Self::create_mask_bind_group(device, queue, &mask_layout, mask);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &mask_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::POINTS_SHADER.into()),
        });

        let additive_blend = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_points"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: TRIPLE_STRIDE,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: TRIPLE_STRIDE,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_points"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(additive_blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let position_buffer = Self::create_particle_buffer(device, "position_buffer", 0);
        let color_buffer = Self::create_particle_buffer(device, "color_buffer", 0);

        let target_size = viewport.render_size();
        let depth_texture = Self::create_depth_texture(device, target_size.0, target_size.1);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            mask_bind_group,
            position_buffer,
            color_buffer,
            uploads: UploadState::default(),
            drawn_count: 0,
            depth_texture,
            surface_format,
            target_size,
            pixel_ratio: viewport.pixel_ratio as f32,
            style,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, viewport: &Viewport) {
        self.target_size = viewport.render_size();
        self.pixel_ratio = viewport.pixel_ratio as f32;
        self.depth_texture = Self::create_depth_texture(device, self.target_size.0, self.target_size.1);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Number of particles drawn by the last frame.
    pub fn drawn_count(&self) -> u32 {
        self.drawn_count
    }

    /// Render one frame of the particle field.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        particles: &ParticleBuffer,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(
                camera,
                &self.style,
                self.target_size,
                self.pixel_ratio,
            )),
        );

        self.sync_particles(device, queue, particles);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("points_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if self.drawn_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, &self.mask_bind_group, &[]);
                pass.set_vertex_buffer(0, self.position_buffer.slice(..));
                pass.set_vertex_buffer(1, self.color_buffer.slice(..));
                pass.draw(0..4, 0..self.drawn_count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Upload whatever changed since the last frame.
    fn sync_particles(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, particles: &ParticleBuffer) {
        let count = particles.count();
        let plan = self.uploads.plan(particles);
        if plan.grow {
            tracing::debug!("growing particle buffers to {count}");
            self.position_buffer = Self::create_particle_buffer(device, "position_buffer", count);
            self.color_buffer = Self::create_particle_buffer(device, "color_buffer", count);
        }
        self.drawn_count = count as u32;

        if plan.colors {
            queue.write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(particles.colors()));
        }
        if plan.positions {
            queue.write_buffer(&self.position_buffer, 0, bytemuck::cast_slice(particles.positions()));
        }
    }

    fn create_particle_buffer(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity.max(1) as u64) * TRIPLE_STRIDE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_mask_bind_group(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        mask: &AlphaMask,
    ) -> wgpu::BindGroup {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("alpha_mask"),
                size: wgpu::Extent3d {
                    width: mask.width(),
                    height: mask.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            mask.rgba(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("alpha_mask_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mask_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
