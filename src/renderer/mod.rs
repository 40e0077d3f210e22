//! Forward renderer.
//!
//! The frame flow mirrors a classic forward pipeline:
//!
//! 1. update world matrices and pull camera/light data from the scene
//! 2. assign shadow map layers and upload light matrices
//! 3. cull against the camera frustum and build sorted draw commands
//! 4. upload per-object uniforms in one packed write
//! 5. encode the shadow depth passes, then the main color pass
//!
//! Draw commands own clones of every wgpu handle they touch (handles are
//! internally refcounted), so encoding never borrows from the resource
//! caches.

pub mod context;
pub mod pipeline;
pub mod resources;
pub mod settings;
pub mod shadow;
pub mod tracked;
pub mod uniforms;

pub use settings::RendererSettings;

use std::ops::Range;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use slotmap::Key;
use winit::window::Window;

use crate::assets::AssetServer;
use crate::errors::Result;
use crate::scene::camera::Frustum;
use crate::scene::{LightKind, Scene};

use self::context::WgpuContext;
use self::pipeline::{PipelineCache, PipelineFlags, PipelineKey, ShaderKind};
use self::resources::GpuResources;
use self::shadow::ShadowPass;
use self::tracked::TrackedRenderPass;
use self::uniforms::{
    GlobalUniforms, GpuLight, ModelUniforms, LIGHT_DIRECTIONAL, LIGHT_POINT, LIGHT_SPOT, MAX_LIGHTS,
};

/// Draw ordering key: pipeline id, then material, then camera distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RenderKey(u64);

impl RenderKey {
    fn new(pipeline_id: u16, material_id: u32, distance_sq: f32) -> Self {
        let p_bits = u64::from(pipeline_id & 0x3FFF) << 50;
        let m_bits = u64::from(material_id & 0xF_FFFF) << 30;
        // Positive floats order like their bit patterns; dropping two
        // mantissa bits squeezes the range into 30 bits.
        let d_u32 = if distance_sq.is_sign_negative() {
            0
        } else {
            distance_sq.to_bits() >> 2
        };
        let d_bits = u64::from(d_u32) & 0x3FFF_FFFF;
        Self(p_bits | m_bits | d_bits)
    }
}

/// One draw, fully resolved against the GPU caches.
pub(crate) struct RenderCommand {
    pipeline_id: u16,
    pipeline: wgpu::RenderPipeline,

    material_bind_group_id: u64,
    material_bind_group: wgpu::BindGroup,

    /// Buffers in the slot order of the command's shader kind; slot 0 is
    /// always the position stream, which is all the shadow pass binds.
    pub(crate) vertex_buffers: Vec<(wgpu::Buffer, u64)>,
    pub(crate) index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat, u32, u64)>,
    pub(crate) draw_range: Range<u32>,
    pub(crate) instance_count: u32,

    world_matrix: Mat4,
    pub(crate) model_offset: u32,
    pub(crate) casts_shadow: bool,
    receives_shadows: bool,

    sort_key: RenderKey,
}

pub struct Renderer {
    ctx: WgpuContext,
    settings: RendererSettings,

    resources: GpuResources,
    pipelines: PipelineCache,
    shadow: ShadowPass,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        settings: RendererSettings,
    ) -> Result<Self> {
        let ctx = WgpuContext::new(window, width, height, &settings).await?;

        // The shadow pass comes first: the global bind group points at its
        // depth array.
        let shadow = ShadowPass::new(&ctx.device, &settings);
        let resources =
            GpuResources::new(&ctx.device, &ctx.queue, shadow.map_view(), shadow.sampler());
        let pipelines = PipelineCache::new(&ctx.device);

        Ok(Self {
            ctx,
            settings,
            resources,
            pipelines,
            shadow,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
    }

    /// Current surface size in physical pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.ctx.size()
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        let (width, height) = self.ctx.size();
        width as f32 / height.max(1) as f32
    }

    /// Renders one frame.
    ///
    /// `time` is the scene clock in seconds; it drives shader animation
    /// such as falling point sprites.
    pub fn render(&mut self, scene: &mut Scene, assets: &AssetServer, time: f32) -> Result<()> {
        let (width, height) = self.ctx.size();
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.resources.next_frame();
        scene.update_matrix_world();

        // Camera state is cached on the component by the transform update.
        let Some((view_matrix, view_projection, camera_position, frustum)) = scene
            .active_camera
            .and_then(|handle| scene.nodes.get(handle))
            .and_then(|node| node.camera)
            .and_then(|key| scene.cameras.get(key))
            .map(|camera| {
                (
                    camera.view_matrix(),
                    camera.view_projection_matrix(),
                    camera.world_position(),
                    *camera.frustum(),
                )
            })
        else {
            log::warn!("Scene has no active camera; skipping frame");
            return Ok(());
        };

        let frame = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(frame)
            | wgpu::CurrentSurfaceTexture::Suboptimal(frame) => frame,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                self.ctx.resize(width, height);
                return Ok(());
            }
            status => {
                log::warn!("Dropping frame: {status:?}");
                return Ok(());
            }
        };
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // === Lights and shadow layers ===

        let mut gpu_lights = [GpuLight::default(); MAX_LIGHTS];
        let mut num_lights = 0u32;
        for (light, world) in scene.iter_active_lights().take(MAX_LIGHTS) {
            let gpu = &mut gpu_lights[num_lights as usize];
            gpu.color = light.color;
            gpu.intensity = light.intensity;
            gpu.position = Vec3::from(world.translation);
            gpu.direction = world.transform_vector3(Vec3::NEG_Z);

            match light.kind {
                LightKind::Directional => {
                    gpu.light_type = LIGHT_DIRECTIONAL;
                }
                LightKind::Point { range } => {
                    gpu.light_type = LIGHT_POINT;
                    gpu.range = range;
                }
                LightKind::Spot {
                    range,
                    inner_cone,
                    outer_cone,
                } => {
                    gpu.light_type = LIGHT_SPOT;
                    gpu.range = range;
                    let outer_cos = outer_cone.cos();
                    gpu.outer_cone_cos = outer_cos;
                    // Keep the falloff edges apart even when inner == outer.
                    gpu.inner_cone_cos = inner_cone.cos().max(outer_cos + 1e-4);
                }
            }
            num_lights += 1;
        }

        let map_rebuilt =
            self.shadow
                .prepare(&self.ctx.device, &self.ctx.queue, scene, &mut gpu_lights);
        if map_rebuilt {
            self.resources
                .rebind_shadow_map(self.shadow.map_view(), self.shadow.sampler());
        }

        // === Global uniforms ===

        let environment = &scene.environment;
        let (fog_color, fog_near, fog_far) = match environment.fog {
            Some(fog) => (fog.color, fog.near, fog.far),
            // far <= near reads as "no fog" in the shaders
            None => (Vec3::ZERO, 0.0, 0.0),
        };

        self.resources.write_globals(&GlobalUniforms {
            view_projection,
            view_matrix,
            camera_position,
            time,
            ambient_light: environment.ambient_color,
            num_lights,
            fog_color,
            fog_near,
            fog_far,
            _padding: [0.0; 3],
        });
        self.resources.write_lights(&gpu_lights);

        // === Draw commands ===

        let (mut opaque, mut transparent) =
            self.build_commands(scene, assets, camera_position, &frustum);
        self.upload_model_uniforms(&mut opaque, &mut transparent);

        // === Encode ===

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let (_, model_bind_group) = self.resources.model_bind_group();
        self.shadow
            .run(&mut encoder, &[&opaque, &transparent], model_bind_group);

        let clear_color = match scene.background {
            Some(c) => wgpu::Color {
                r: f64::from(c.x),
                g: f64::from(c.y),
                b: f64::from(c.z),
                a: f64::from(c.w),
            },
            None => self.settings.clear_color,
        };

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.ctx.depth_view(),
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

            let mut tracked = TrackedRenderPass::new(pass);

            let (global_id, global_bind_group) = self.resources.global_bind_group();
            tracked.set_bind_group(0, global_id, global_bind_group, &[]);

            let (model_id, model_bind_group) = self.resources.model_bind_group();

            // Opaque front-to-back, then transparent back-to-front.
            for cmd in opaque.iter().chain(transparent.iter()) {
                tracked.set_pipeline(cmd.pipeline_id, &cmd.pipeline);
                tracked.set_bind_group(
                    1,
                    cmd.material_bind_group_id,
                    &cmd.material_bind_group,
                    &[],
                );
                tracked.set_bind_group(2, model_id, model_bind_group, &[cmd.model_offset]);

                for (slot, (buffer, id)) in cmd.vertex_buffers.iter().enumerate() {
                    tracked.set_vertex_buffer(slot as u32, *id, buffer.slice(..));
                }

                if let Some((index_buffer, format, count, id)) = &cmd.index_buffer {
                    tracked.set_index_buffer(*id, index_buffer.slice(..), *format);
                    tracked.draw_indexed(0..*count, 0, 0..cmd.instance_count);
                } else {
                    tracked.draw(cmd.draw_range.clone(), 0..cmd.instance_count);
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        if self.resources.frame_index() % 60 == 0 {
            self.resources.prune(600);
        }

        Ok(())
    }

    /// Culls, uploads GPU resources, and builds the sorted draw lists.
    fn build_commands(
        &mut self,
        scene: &Scene,
        assets: &AssetServer,
        camera_position: Vec3,
        frustum: &Frustum,
    ) -> (Vec<RenderCommand>, Vec<RenderCommand>) {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();

        for (_handle, node, mesh) in scene.iter_visible_meshes() {
            let Some(geometry) = assets.geometries.get(mesh.geometry) else {
                continue;
            };
            let Some(material) = assets.materials.get(mesh.material) else {
                continue;
            };

            let world = node.transform.world_matrix();

            // Frustum cull. Geometry without a position stream (point
            // sprites) has no bounds and is never culled.
            if geometry.bounding_sphere.borrow().is_none() {
                geometry.compute_bounding_volume();
            }
            let sphere = *geometry.bounding_sphere.borrow();
            if let Some(sphere) = sphere {
                let center = world.transform_point3(sphere.center);
                let scale = node.transform.scale.abs().max_element();
                if !frustum.intersects_sphere(center, sphere.radius * scale) {
                    continue;
                }
            }

            if self
                .resources
                .prepare_geometry(assets, mesh.geometry)
                .is_none()
            {
                continue;
            }
            if self
                .resources
                .prepare_material(assets, mesh.material)
                .is_none()
            {
                continue;
            }

            let shader = ShaderKind::from_material(&material);
            let flags = PipelineFlags::from_material(&material);
            let (pipeline_id, pipeline) = self.pipelines.get_or_create(
                &self.ctx.device,
                PipelineKey { shader, flags },
                self.resources.global_layout(),
                self.resources.material_layout(shader),
                self.resources.model_layout(),
                self.ctx.color_format(),
                self.ctx.depth_format,
            );

            let Some(gpu_geometry) = self.resources.get_geometry(mesh.geometry) else {
                continue;
            };
            let Some(gpu_material) = self.resources.get_material(mesh.material) else {
                continue;
            };

            let attribute_names = shader.vertex_attribute_names();
            let mut vertex_buffers = Vec::with_capacity(attribute_names.len());
            for name in attribute_names {
                let Some((buffer, id)) = gpu_geometry.vertex_buffer(name) else {
                    break;
                };
                vertex_buffers.push((buffer.clone(), *id));
            }
            if vertex_buffers.len() != attribute_names.len() {
                log::debug!("Skipping mesh: geometry lacks an attribute for {shader:?}");
                continue;
            }

            let distance_sq = camera_position.distance_squared(Vec3::from(world.translation));
            let material_id = mesh.material.data().as_ffi() as u32;

            let cmd = RenderCommand {
                pipeline_id,
                pipeline,
                material_bind_group_id: gpu_material.bind_group_id,
                material_bind_group: gpu_material.bind_group.clone(),
                vertex_buffers,
                index_buffer: gpu_geometry
                    .index_buffer
                    .as_ref()
                    .map(|(buffer, format, count, id)| (buffer.clone(), *format, *count, *id)),
                draw_range: gpu_geometry.draw_range.clone(),
                instance_count: gpu_geometry.instance_count,
                world_matrix: Mat4::from(*world),
                model_offset: 0,
                casts_shadow: mesh.cast_shadows && shader != ShaderKind::Points,
                receives_shadows: mesh.receive_shadows,
                sort_key: RenderKey::new(pipeline_id, material_id, distance_sq),
            };

            if material.transparent {
                transparent.push(cmd);
            } else {
                opaque.push(cmd);
            }
        }

        opaque.sort_unstable_by(|a, b| a.sort_key.cmp(&b.sort_key));
        transparent.sort_unstable_by(|a, b| b.sort_key.cmp(&a.sort_key));

        (opaque, transparent)
    }

    /// Packs per-object uniforms and assigns each command its dynamic
    /// offset into the shared model buffer.
    fn upload_model_uniforms(
        &mut self,
        opaque: &mut [RenderCommand],
        transparent: &mut [RenderCommand],
    ) {
        let total = opaque.len() + transparent.len();
        if total == 0 {
            return;
        }

        let stride = std::mem::size_of::<ModelUniforms>() as u32;
        let mut models = Vec::with_capacity(total);

        for (index, cmd) in opaque
            .iter_mut()
            .chain(transparent.iter_mut())
            .enumerate()
        {
            cmd.model_offset = index as u32 * stride;
            models.push(ModelUniforms {
                world_matrix: cmd.world_matrix,
                normal_matrix: cmd.world_matrix.inverse().transpose(),
                receives_shadows: u32::from(cmd.receives_shadows),
                _padding: [0; 31],
            });
        }

        self.resources.write_models(&models);
    }
}
