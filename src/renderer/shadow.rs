//! Depth-only shadow map pass.
//!
//! Casting directional and spot lights each claim one layer of a shared
//! `Depth32Float` array texture, up to the caster limit from the renderer
//! settings. Point lights never claim a layer; they would need a cube map
//! per light. The per-light view-projection matrices live in one uniform
//! buffer addressed with dynamic offsets, one depth pass per layer.

use glam::{Mat4, Vec3};

use crate::renderer::pipeline::shadow_vertex_layouts;
use crate::renderer::resources::model_layout_entry;
use crate::renderer::settings::RendererSettings;
use crate::renderer::uniforms::GpuLight;
use crate::scene::{LightKind, Scene};

use super::RenderCommand;

pub struct ShadowPass {
    map_size: u32,
    layer_count: u32,
    caster_limit: u32,

    array_view: wgpu::TextureView,
    layer_views: Vec<wgpu::TextureView>,
    sampler: wgpu::Sampler,

    vp_buffer: wgpu::Buffer,
    vp_stride: u32,
    vp_bind_group: wgpu::BindGroup,

    pipeline: wgpu::RenderPipeline,

    active_layers: u32,
}

impl ShadowPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, settings: &RendererSettings) -> Self {
        let map_size = settings.shadow_map_size.max(1);
        let caster_limit = settings.max_shadow_casters;
        // Even with shadows disabled the global bind group needs a valid
        // depth array to point at, so always allocate at least one layer.
        let layer_count = caster_limit.max(1);

        let (array_view, layer_views) = create_map(device, map_size, layer_count);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let vp_stride = align_to(std::mem::size_of::<Mat4>() as u32, min_alignment);

        let vp_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow VP Buffer"),
            size: u64::from(vp_stride) * u64::from(layer_count),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow VP Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let vp_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow VP Bind Group"),
            layout: &vp_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &vp_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                }),
            }],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shadow.wgsl").into()),
        });

        // Same model bind group as the forward pass (group 1 here).
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Model Layout"),
            entries: &[model_layout_entry()],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&vp_layout), Some(&model_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &shadow_vertex_layouts(),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            map_size,
            layer_count,
            caster_limit,
            array_view,
            layer_views,
            sampler,
            vp_buffer,
            vp_stride,
            vp_bind_group,
            pipeline,
            active_layers: 0,
        }
    }

    #[must_use]
    pub fn map_view(&self) -> &wgpu::TextureView {
        &self.array_view
    }

    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[must_use]
    pub fn active_layers(&self) -> u32 {
        self.active_layers
    }

    /// Assigns shadow map layers for this frame and uploads the light
    /// view-projection matrices.
    ///
    /// `gpu_lights[i]` must correspond to the i-th light yielded by
    /// `scene.iter_active_lights()`. Every entry is reset to "no shadow"
    /// first; lights that claim a layer get their layer index, matrix, and
    /// bias values written back, which is what the lighting shader reads.
    ///
    /// Returns true when the depth array was recreated (a light asked for a
    /// larger map size); the caller must then rebind the shadow map.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        gpu_lights: &mut [GpuLight],
    ) -> bool {
        for light in gpu_lights.iter_mut() {
            light.shadow_layer_index = -1;
            light.shadow_matrix = Mat4::IDENTITY;
        }
        self.active_layers = 0;

        if self.caster_limit == 0 {
            return false;
        }

        let mut casters: Vec<(usize, Mat4, f32, f32)> = Vec::new();
        let mut required_size = self.map_size;

        for (index, (light, world)) in scene.iter_active_lights().enumerate() {
            if index >= gpu_lights.len() || casters.len() as u32 >= self.caster_limit {
                break;
            }
            if !light.cast_shadows || matches!(light.kind, LightKind::Point { .. }) {
                continue;
            }

            let position = Vec3::from(world.translation);
            let direction = world.transform_vector3(Vec3::NEG_Z);
            let vp = build_light_vp(&light.kind, position, direction);

            let config = light.shadow.clone().unwrap_or_default();
            required_size = required_size.max(config.map_size);

            casters.push((index, vp, config.bias, config.normal_bias));
        }

        let recreated = self.ensure_map_size(device, required_size);

        if casters.is_empty() {
            return recreated;
        }

        let mut matrices = vec![0u8; casters.len() * self.vp_stride as usize];
        for (layer, (index, vp, bias, normal_bias)) in casters.iter().enumerate() {
            let offset = layer * self.vp_stride as usize;
            matrices[offset..offset + 64].copy_from_slice(bytemuck::bytes_of(vp));

            let gpu_light = &mut gpu_lights[*index];
            gpu_light.shadow_layer_index = layer as i32;
            gpu_light.shadow_matrix = *vp;
            gpu_light.shadow_bias = *bias;
            gpu_light.shadow_normal_bias = *normal_bias;
        }

        queue.write_buffer(&self.vp_buffer, 0, &matrices);
        self.active_layers = casters.len() as u32;
        recreated
    }

    /// Encodes one depth pass per claimed layer. `lists` are the forward
    /// draw lists; only shadow-casting commands are drawn, position stream
    /// only.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        lists: &[&[RenderCommand]],
        model_bind_group: &wgpu::BindGroup,
    ) {
        for layer in 0..self.active_layers {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.layer_views[layer as usize],
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.vp_bind_group, &[layer * self.vp_stride]);

            for cmd in lists.iter().flat_map(|list| list.iter()) {
                if !cmd.casts_shadow {
                    continue;
                }
                let Some((position_buffer, _)) = cmd.vertex_buffers.first() else {
                    continue;
                };

                pass.set_bind_group(1, model_bind_group, &[cmd.model_offset]);
                pass.set_vertex_buffer(0, position_buffer.slice(..));

                if let Some((index_buffer, format, count, _)) = &cmd.index_buffer {
                    pass.set_index_buffer(index_buffer.slice(..), *format);
                    pass.draw_indexed(0..*count, 0, 0..cmd.instance_count);
                } else {
                    pass.draw(cmd.draw_range.clone(), 0..cmd.instance_count);
                }
            }
        }
    }

    /// Grow-only resize of the depth array.
    fn ensure_map_size(&mut self, device: &wgpu::Device, required_size: u32) -> bool {
        if required_size <= self.map_size {
            return false;
        }

        log::debug!(
            "Recreating shadow map array: {} -> {} px",
            self.map_size,
            required_size
        );
        let (array_view, layer_views) = create_map(device, required_size, self.layer_count);
        self.array_view = array_view;
        self.layer_views = layer_views;
        self.map_size = required_size;
        true
    }
}

fn create_map(
    device: &wgpu::Device,
    size: u32,
    layers: u32,
) -> (wgpu::TextureView, Vec<wgpu::TextureView>) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shadow Map Array"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: layers,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("Shadow Map Array View"),
        dimension: Some(wgpu::TextureViewDimension::D2Array),
        ..Default::default()
    });

    // One render target view per layer; the views keep the texture alive.
    let layer_views = (0..layers)
        .map(|layer| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("Shadow Map Layer View"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: layer,
                array_layer_count: Some(1),
                ..Default::default()
            })
        })
        .collect();

    (array_view, layer_views)
}

/// View-projection matrix seen from a light.
///
/// Directional lights get a fixed orthographic volume looking through the
/// origin; spot lights a perspective frustum matching their outer cone.
/// Point lights produce an identity matrix, they never render shadows.
#[must_use]
pub fn build_light_vp(kind: &LightKind, position: Vec3, direction: Vec3) -> Mat4 {
    let safe_dir = if direction.length_squared() > 1e-6 {
        direction.normalize()
    } else {
        -Vec3::Z
    };
    let up = if safe_dir.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    };

    match kind {
        LightKind::Directional => {
            let center = Vec3::ZERO;
            let eye = center - safe_dir * 50.0;
            let view = Mat4::look_at_rh(eye, center, up);
            let proj = Mat4::orthographic_rh(-30.0, 30.0, -30.0, 30.0, 0.1, 150.0);
            proj * view
        }
        LightKind::Spot { range, outer_cone, .. } => {
            let view = Mat4::look_at_rh(position, position + safe_dir, up);
            let fov = (outer_cone * 2.0).clamp(0.1, std::f32::consts::PI - 0.01);
            let proj = Mat4::perspective_rh(fov, 1.0, 0.1, range.max(1.0));
            proj * view
        }
        LightKind::Point { .. } => Mat4::IDENTITY,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}
