//! wgpu mesh pipeline backing the 3D drawing surface.

use std::rc::Rc;

use anyhow::Result;
use glam::{UVec2, Vec3};
use scenekit_core::{Camera, Plane, Scene};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::surface::DrawSurface;

/// Clipping planes the fragment shader evaluates.
pub const MAX_CLIPPING_PLANES: usize = 8;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniform data sent to GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// View-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// Camera position in world space
    pub camera_pos: [f32; 4],
}

impl CameraUniform {
    /// Create camera uniform from camera.
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
        }
    }
}

/// Clipping planes as `(normal, constant)` vectors plus the active count.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ClippingUniform {
    /// Active planes; entries past `count` are ignored.
    pub planes: [[f32; 4]; MAX_CLIPPING_PLANES],
    /// Number of active planes.
    pub count: u32,
    /// Padding for alignment
    pub _padding: [u32; 3],
}

impl ClippingUniform {
    /// Pack up to [`MAX_CLIPPING_PLANES`] planes. Extra planes are dropped.
    pub fn from_planes(planes: &[Plane]) -> Self {
        let mut uniform = Self::zeroed_planes();
        for (slot, plane) in uniform.planes.iter_mut().zip(planes) {
            *slot = plane.normal.extend(plane.constant).to_array();
        }
        uniform.count = planes.len().min(MAX_CLIPPING_PLANES) as u32;
        uniform
    }

    fn zeroed_planes() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

/// Vertex fed to the mesh pipeline. Meshes are expanded to world-space
/// triangles with flat normals.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Face normal
    pub normal: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
}

/// Expand the visible meshes of `scene` into world-space triangles.
pub fn scene_vertices(scene: &Scene) -> Vec<MeshVertex> {
    let mut vertices = Vec::new();
    for mesh in scene.visible_meshes() {
        for face in 0..mesh.triangle_count() {
            let Some([a, b, c]) = mesh.world_triangle(face) else {
                continue;
            };
            let normal = (b - a).cross(c - a).normalize_or_zero();
            vertices.extend([a, b, c].map(|p: Vec3| MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                color: mesh.color,
            }));
        }
    }
    vertices
}

struct Targets {
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    msaa: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl Targets {
    fn new(context: &GpuContext, width: u32, height: u32) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let depth_texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count: context.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa = (context.sample_count > 1).then(|| {
            let texture = context.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("MSAA Color Texture"),
                size,
                mip_level_count: 1,
                sample_count: context.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: context.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        });

        Self {
            depth_texture,
            depth_view,
            msaa,
        }
    }

    fn destroy(&self) {
        self.depth_texture.destroy();
        if let Some((texture, _)) = &self.msaa {
            texture.destroy();
        }
    }
}

/// 3D drawing surface rendering scene meshes with wgpu.
pub struct GpuSurface {
    context: Rc<GpuContext>,
    render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    clipping_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    targets: Targets,
    alpha: bool,
    size: UVec2,
    pixel_ratio: f32,
    local_clipping: bool,
    disposed: bool,
}

impl GpuSurface {
    /// Build the mesh pipeline. `alpha` keeps the background alpha when
    /// clearing instead of forcing an opaque clear.
    pub fn new(context: Rc<GpuContext>, alpha: bool) -> Result<Self> {
        let device = &context.device;

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::from_camera(&Camera::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let clipping_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Clipping Buffer"),
            contents: bytemuck::cast_slice(&[ClippingUniform::from_planes(&[])]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: clipping_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        // position
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        // normal
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        // color
                        wgpu::VertexAttribute {
                            offset: 24,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x4,
                        },
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: context.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
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
            multisample: wgpu::MultisampleState {
                count: context.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let (width, height) = context.physical_size();
        let targets = Targets::new(&context, width, height);

        Ok(Self {
            context,
            render_pipeline,
            camera_buffer,
            clipping_buffer,
            bind_group,
            targets,
            alpha,
            size: UVec2::new(width, height),
            pixel_ratio: 1.0,
            local_clipping: true,
            disposed: false,
        })
    }

    /// Shared GPU context.
    pub fn context(&self) -> &Rc<GpuContext> {
        &self.context
    }

    /// Current pixel ratio.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| (v as f32 * self.pixel_ratio).round() as u32;
        (scale(self.size.x), scale(self.size.y))
    }

    fn apply_size(&mut self) {
        if self.disposed {
            return;
        }
        let (width, height) = self.physical_size();
        if width == 0 || height == 0 {
            return;
        }
        self.context.configure(width, height);
        self.targets.destroy();
        self.targets = Targets::new(&self.context, width, height);
        debug!(width, height, "3D surface reconfigured");
    }

    fn clear_color(&self, scene: &Scene) -> wgpu::Color {
        let [r, g, b, a] = scene.background.map(f64::from);
        wgpu::Color {
            r,
            g,
            b,
            a: if self.alpha { a } else { 1.0 },
        }
    }
}

impl DrawSurface for GpuSurface {
    fn render(&mut self, scene: &Scene, camera: &Camera, clipping_planes: &[Plane]) -> Result<()> {
        if self.disposed {
            return Ok(());
        }

        let planes: &[Plane] = if self.local_clipping {
            clipping_planes
        } else {
            &[]
        };
        if planes.len() > MAX_CLIPPING_PLANES {
            warn!(
                planes = planes.len(),
                max = MAX_CLIPPING_PLANES,
                "Too many clipping planes, extra planes ignored"
            );
        }

        let queue = &self.context.queue;
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from_camera(camera)]),
        );
        queue.write_buffer(
            &self.clipping_buffer,
            0,
            bytemuck::cast_slice(&[ClippingUniform::from_planes(planes)]),
        );

        let vertices = scene_vertices(scene);
        let vertex_buffer = (!vertices.is_empty()).then(|| {
            self.context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Scene Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let frame_view = self.context.begin_frame()?;
        let (view, resolve_target) = match &self.targets.msaa {
            Some((_, msaa_view)) => (msaa_view, Some(&frame_view)),
            None => (&frame_view, None),
        };

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Scene Encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(scene)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(vertex_buffer) = &vertex_buffer {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.draw(0..vertices.len() as u32, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = UVec2::new(width, height);
        self.apply_size();
    }

    fn size(&self) -> UVec2 {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
        self.apply_size();
    }

    fn set_local_clipping(&mut self, enabled: bool) {
        self.local_clipping = enabled;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        drop(self.context.take_frame());
        self.targets.destroy();
        self.camera_buffer.destroy();
        self.clipping_buffer.destroy();
        tracing::info!("3D surface disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_core::Mesh;

    #[test]
    fn clipping_uniform_caps_plane_count() {
        let planes: Vec<Plane> = (0..10).map(|i| Plane::new(Vec3::X, i as f32)).collect();
        let uniform = ClippingUniform::from_planes(&planes);
        assert_eq!(uniform.count, MAX_CLIPPING_PLANES as u32);
        assert_eq!(uniform.planes[1], [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<ClippingUniform>(), 144);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 40);
    }

    #[test]
    fn scene_vertices_skip_hidden_meshes() {
        let mut scene = Scene::new("vertices");
        scene.add_mesh(Mesh::quad("shown", 1.0, 1.0).with_color([1.0, 0.0, 0.0, 1.0]));
        let mut hidden = Mesh::cuboid("hidden", Vec3::ONE);
        hidden.visible = false;
        scene.add_mesh(hidden);

        let vertices = scene_vertices(&scene);
        assert_eq!(vertices.len(), 6);
        assert!(vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
        assert!(vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }
}
