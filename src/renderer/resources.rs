//! GPU-side caches for geometries, images, textures, and materials.
//!
//! CPU assets live in the [`AssetServer`]; this module mirrors them into
//! wgpu objects on demand. Each cached entry carries a `last_used_frame`
//! stamp so [`GpuResources::prune`] can drop entries for assets that
//! stopped appearing in the scene.
//!
//! Texture slots left empty by a material bind 1x1 placeholder textures
//! (white for color-like maps, a flat +Z texel for normal maps), so every
//! material kind uses one fixed bind group layout and the shader set stays
//! static.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Mat3;
use rustc_hash::FxHashMap;
use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use crate::assets::{AssetServer, GeometryHandle, MaterialHandle, TextureHandle};
use crate::renderer::pipeline::ShaderKind;
use crate::renderer::uniforms::{
    mat3_to_gpu, BasicUniforms, GlobalUniforms, GpuLight, ModelUniforms, PointsUniforms,
    StandardUniforms, MAX_LIGHTS,
};
use crate::resources::geometry::Geometry;
use crate::resources::image::Image;
use crate::resources::material::{Material, MaterialData};
use crate::resources::texture::TextureSampler;

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Ids consumed by the render pass state tracker. Every rebuilt resource
/// gets a fresh id, so a stale binding can never alias a new one.
fn next_resource_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// GPU resource wrappers
// ============================================================================

/// Uploaded vertex/index buffers for one geometry asset.
///
/// Buffers are keyed by attribute name; the draw code binds them in the
/// slot order its shader kind expects.
pub struct GpuGeometry {
    pub buffers: FxHashMap<String, (wgpu::Buffer, u64)>,
    pub index_buffer: Option<(wgpu::Buffer, wgpu::IndexFormat, u32, u64)>,

    pub draw_range: Range<u32>,
    pub instance_count: u32,

    last_used_frame: u64,
}

impl GpuGeometry {
    #[must_use]
    pub fn vertex_buffer(&self, name: &str) -> Option<&(wgpu::Buffer, u64)> {
        self.buffers.get(name)
    }
}

/// Bind group (uniforms plus texture views) for one material asset.
/// The bind group keeps its uniform buffer alive; no separate field needed.
pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    pub bind_group_id: u64,

    deps_hash: u64,
    last_used_frame: u64,
}

/// View and sampler over an uploaded image, for one texture asset.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub id: u64,

    image_generation_id: u64,
    version: u64,
    last_used_frame: u64,
}

/// The wgpu texture behind one [`Image`], shared by every texture asset
/// that wraps that image.
struct GpuImage {
    texture: wgpu::Texture,
    version: u64,
    generation_id: u64,
    last_used_frame: u64,
}

impl GpuImage {
    /// The data read lock is held across the dimension reads and the
    /// upload, so an async `Image::replace` cannot slip in between.
    fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &Image) -> Self {
        let pixels = image.data.read();
        let (width, height) = (image.width().max(1), image.height().max(1));

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&image.label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: image.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if let Some(data) = pixels.as_ref() {
            Self::upload(queue, &texture, data);
        }

        Self {
            texture,
            version: image.version(),
            generation_id: image.generation_id(),
            last_used_frame: 0,
        }
    }

    fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &Image) {
        // A new generation means the dimensions changed; recreate.
        if self.generation_id != image.generation_id() {
            let last_used_frame = self.last_used_frame;
            *self = Self::new(device, queue, image);
            self.last_used_frame = last_used_frame;
            return;
        }

        if self.version < image.version() {
            let pixels = image.data.read();
            if let Some(data) = pixels.as_ref() {
                Self::upload(queue, &self.texture, data);
            }
            self.version = image.version();
        }
    }

    fn upload(queue: &wgpu::Queue, texture: &wgpu::Texture, data: &[u8]) {
        let (width, height) = (texture.width(), texture.height());
        let block_size = texture.format().block_copy_size(None).unwrap_or(4);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * block_size),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

// ============================================================================
// Resource manager
// ============================================================================

pub struct GpuResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    frame_index: u64,

    gpu_geometries: SecondaryMap<GeometryHandle, GpuGeometry>,
    gpu_materials: SecondaryMap<MaterialHandle, GpuMaterial>,
    gpu_textures: SecondaryMap<TextureHandle, GpuTexture>,
    // Images are keyed by their u64 id.
    gpu_images: FxHashMap<u64, GpuImage>,

    samplers: FxHashMap<TextureSampler, wgpu::Sampler>,
    default_sampler: wgpu::Sampler,
    placeholder_white: wgpu::TextureView,
    placeholder_normal: wgpu::TextureView,

    // Bind group layouts (group 0 / 1 / 2); fixed for the crate's shader set.
    global_layout: wgpu::BindGroupLayout,
    basic_material_layout: wgpu::BindGroupLayout,
    standard_material_layout: wgpu::BindGroupLayout,
    points_material_layout: wgpu::BindGroupLayout,
    model_layout: wgpu::BindGroupLayout,

    globals_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    global_bind_group_id: u64,

    // One dynamic-offset buffer for every model drawn this frame.
    model_buffer: wgpu::Buffer,
    model_capacity: usize,
    model_bind_group: wgpu::BindGroup,
    model_bind_group_id: u64,
}

impl GpuResources {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) -> Self {
        let default_sampler = create_sampler(device, &TextureSampler::default());
        let mut samplers = FxHashMap::default();
        samplers.insert(TextureSampler::default(), default_sampler.clone());

        let placeholder_white = placeholder_view(device, queue, "placeholder_white", [255; 4]);
        let placeholder_normal =
            placeholder_view(device, queue, "placeholder_normal", [128, 128, 255, 255]);

        // === Bind group layouts ===

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Global Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let basic_material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Basic Material Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    texture_entry(1),
                    sampler_entry(2),
                ],
            });

        let standard_material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Standard Material Layout"),
                entries: &[
                    uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    // color map, normal map, ao map, roughness map
                    texture_entry(1),
                    sampler_entry(2),
                    texture_entry(3),
                    sampler_entry(4),
                    texture_entry(5),
                    sampler_entry(6),
                    texture_entry(7),
                    sampler_entry(8),
                ],
            });

        let points_material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Points Material Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Layout"),
            entries: &[model_layout_entry()],
        });

        // === Global buffers and bind group ===

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniforms"),
            contents: bytemuck::bytes_of(&GlobalUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniforms"),
            contents: bytemuck::cast_slice(&[GpuLight::default(); MAX_LIGHTS]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let global_bind_group = create_global_bind_group(
            device,
            &global_layout,
            &globals_buffer,
            &lights_buffer,
            shadow_view,
            shadow_sampler,
        );

        let model_capacity = 64;
        let model_buffer = create_model_buffer(device, model_capacity);
        let model_bind_group = create_model_bind_group(device, &model_layout, &model_buffer);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            frame_index: 0,

            gpu_geometries: SecondaryMap::new(),
            gpu_materials: SecondaryMap::new(),
            gpu_textures: SecondaryMap::new(),
            gpu_images: FxHashMap::default(),

            samplers,
            default_sampler,
            placeholder_white,
            placeholder_normal,

            global_layout,
            basic_material_layout,
            standard_material_layout,
            points_material_layout,
            model_layout,

            globals_buffer,
            lights_buffer,
            global_bind_group,
            global_bind_group_id: next_resource_id(),

            model_buffer,
            model_capacity,
            model_bind_group,
            model_bind_group_id: next_resource_id(),
        }
    }

    pub fn next_frame(&mut self) {
        self.frame_index += 1;
    }

    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // === Layout and bind group accessors ===

    #[must_use]
    pub fn global_layout(&self) -> &wgpu::BindGroupLayout {
        &self.global_layout
    }

    #[must_use]
    pub fn model_layout(&self) -> &wgpu::BindGroupLayout {
        &self.model_layout
    }

    #[must_use]
    pub fn material_layout(&self, kind: ShaderKind) -> &wgpu::BindGroupLayout {
        match kind {
            ShaderKind::Basic => &self.basic_material_layout,
            ShaderKind::Standard => &self.standard_material_layout,
            ShaderKind::Points => &self.points_material_layout,
        }
    }

    #[must_use]
    pub fn global_bind_group(&self) -> (u64, &wgpu::BindGroup) {
        (self.global_bind_group_id, &self.global_bind_group)
    }

    #[must_use]
    pub fn model_bind_group(&self) -> (u64, &wgpu::BindGroup) {
        (self.model_bind_group_id, &self.model_bind_group)
    }

    /// Rebinds the shadow map. Called when the shadow pass recreates its
    /// depth array at a new size or layer count.
    pub fn rebind_shadow_map(
        &mut self,
        shadow_view: &wgpu::TextureView,
        shadow_sampler: &wgpu::Sampler,
    ) {
        self.global_bind_group = create_global_bind_group(
            &self.device,
            &self.global_layout,
            &self.globals_buffer,
            &self.lights_buffer,
            shadow_view,
            shadow_sampler,
        );
        self.global_bind_group_id = next_resource_id();
    }

    // === Per-frame uploads ===

    pub fn write_globals(&self, globals: &GlobalUniforms) {
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(globals));
    }

    pub fn write_lights(&self, lights: &[GpuLight; MAX_LIGHTS]) {
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(lights));
    }

    /// Uploads the packed per-model uniforms for this frame. Growing the
    /// buffer also rebuilds the model bind group under a fresh id.
    pub fn write_models(&mut self, models: &[ModelUniforms]) {
        if models.is_empty() {
            return;
        }

        if models.len() > self.model_capacity {
            let mut capacity = self.model_capacity.max(1);
            while capacity < models.len() {
                capacity *= 2;
            }
            self.model_buffer = create_model_buffer(&self.device, capacity);
            self.model_bind_group =
                create_model_bind_group(&self.device, &self.model_layout, &self.model_buffer);
            self.model_bind_group_id = next_resource_id();
            self.model_capacity = capacity;
        }

        self.queue
            .write_buffer(&self.model_buffer, 0, bytemuck::cast_slice(models));
    }

    // === Geometry ===

    pub fn prepare_geometry(
        &mut self,
        assets: &AssetServer,
        handle: GeometryHandle,
    ) -> Option<&GpuGeometry> {
        // Geometry assets are immutable once stored, so a cached entry
        // never goes stale; it only needs recreating after a prune.
        if !self.gpu_geometries.contains_key(handle) {
            let geometry = assets.geometries.get(handle)?;
            let gpu_geometry = self.create_gpu_geometry(&geometry);
            self.gpu_geometries.insert(handle, gpu_geometry);
        }

        let gpu_geometry = self.gpu_geometries.get_mut(handle)?;
        gpu_geometry.last_used_frame = self.frame_index;
        self.gpu_geometries.get(handle)
    }

    #[must_use]
    pub fn get_geometry(&self, handle: GeometryHandle) -> Option<&GpuGeometry> {
        self.gpu_geometries.get(handle)
    }

    fn create_gpu_geometry(&self, geometry: &Geometry) -> GpuGeometry {
        let mut buffers = FxHashMap::default();
        let mut instance_count: Option<u32> = None;

        for (name, attr) in geometry.attributes() {
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(name.as_str()),
                contents: &attr.data,
                usage: wgpu::BufferUsages::VERTEX,
            });
            if attr.step_mode == wgpu::VertexStepMode::Instance {
                // Never draw past the smallest instanced stream.
                instance_count = Some(instance_count.map_or(attr.count, |n| n.min(attr.count)));
            }
            buffers.insert(name.clone(), (buffer, next_resource_id()));
        }

        let index_buffer = geometry.index_attribute().map(|indices| {
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("indices"),
                contents: &indices.data,
                usage: wgpu::BufferUsages::INDEX,
            });
            let format = match indices.format {
                wgpu::VertexFormat::Uint32 => wgpu::IndexFormat::Uint32,
                _ => wgpu::IndexFormat::Uint16,
            };
            (buffer, format, indices.count, next_resource_id())
        });

        // An unbounded draw range means "whole geometry": clamp it to the
        // vertex count.
        let mut draw_range = geometry.draw_range.clone();
        if draw_range == (0..u32::MAX) {
            if let Some(attr) = geometry.get_attribute("position") {
                draw_range = 0..attr.count;
            } else if let Some(attr) = geometry
                .attributes()
                .values()
                .find(|a| a.step_mode == wgpu::VertexStepMode::Vertex)
            {
                draw_range = 0..attr.count;
            } else {
                draw_range = 0..0;
            }
        }

        GpuGeometry {
            buffers,
            index_buffer,
            draw_range,
            instance_count: instance_count.unwrap_or(1),
            last_used_frame: self.frame_index,
        }
    }

    // === Textures ===

    pub fn prepare_texture(
        &mut self,
        assets: &AssetServer,
        handle: TextureHandle,
    ) -> Option<&GpuTexture> {
        let texture = assets.textures.get(handle)?;
        let image_id = texture.image.id();

        // The backing image first: create, re-upload, or recreate.
        match self.gpu_images.get_mut(&image_id) {
            Some(gpu_image) => {
                gpu_image.update(&self.device, &self.queue, &texture.image);
                gpu_image.last_used_frame = self.frame_index;
            }
            None => {
                let mut gpu_image = GpuImage::new(&self.device, &self.queue, &texture.image);
                gpu_image.last_used_frame = self.frame_index;
                self.gpu_images.insert(image_id, gpu_image);
            }
        }
        let image_generation = self.gpu_images[&image_id].generation_id;

        let up_to_date = self.gpu_textures.get(handle).is_some_and(|t| {
            t.version == texture.version() && t.image_generation_id == image_generation
        });

        if !up_to_date {
            let sampler = self.get_or_create_sampler(&texture.sampler);
            let view = self.gpu_images[&image_id]
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            self.gpu_textures.insert(
                handle,
                GpuTexture {
                    view,
                    sampler,
                    id: next_resource_id(),
                    image_generation_id: image_generation,
                    version: texture.version(),
                    last_used_frame: self.frame_index,
                },
            );
        }

        let gpu_texture = self.gpu_textures.get_mut(handle)?;
        gpu_texture.last_used_frame = self.frame_index;
        self.gpu_textures.get(handle)
    }

    fn get_or_create_sampler(&mut self, desc: &TextureSampler) -> wgpu::Sampler {
        if let Some(sampler) = self.samplers.get(desc) {
            return sampler.clone();
        }
        let sampler = create_sampler(&self.device, desc);
        self.samplers.insert(*desc, sampler.clone());
        sampler
    }

    // === Materials ===

    pub fn prepare_material(
        &mut self,
        assets: &AssetServer,
        handle: MaterialHandle,
    ) -> Option<&GpuMaterial> {
        let material = assets.materials.get(handle)?;

        // Prepare referenced textures and fold their resource ids into the
        // dependency hash. A texture rebuilt this frame (async pixels
        // arriving, sampler or transform edits) gets a fresh id, which
        // forces the bind group rebuild below.
        let mut hasher = DefaultHasher::new();
        material.version().hash(&mut hasher);
        for slot in texture_slots(&material.data) {
            let id = slot
                .and_then(|h| self.prepare_texture(assets, h))
                .map_or(0, |t| t.id);
            id.hash(&mut hasher);
        }
        let deps_hash = hasher.finish();

        if let Some(gpu_material) = self.gpu_materials.get_mut(handle) {
            if gpu_material.deps_hash == deps_hash {
                gpu_material.last_used_frame = self.frame_index;
                return self.gpu_materials.get(handle);
            }
        }

        self.build_gpu_material(assets, handle, &material, deps_hash);
        self.gpu_materials.get(handle)
    }

    #[must_use]
    pub fn get_material(&self, handle: MaterialHandle) -> Option<&GpuMaterial> {
        self.gpu_materials.get(handle)
    }

    fn build_gpu_material(
        &mut self,
        assets: &AssetServer,
        handle: MaterialHandle,
        material: &Material,
        deps_hash: u64,
    ) {
        let bind_group = match &material.data {
            MaterialData::Basic(m) => {
                let uniforms = BasicUniforms {
                    color: m.color,
                    opacity: m.opacity,
                    _padding: [0.0; 3],
                    map_transform: mat3_to_gpu(map_matrix(assets, m.map)),
                };
                let buffer = self.create_uniform_buffer("Basic Material", &uniforms);
                let (map_view, map_sampler) = self.slot_binding(m.map, &self.placeholder_white);

                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Basic Material"),
                    layout: &self.basic_material_layout,
                    entries: &[
                        buffer_entry(0, &buffer),
                        view_entry(1, map_view),
                        sampler_binding_entry(2, map_sampler),
                    ],
                })
            }

            MaterialData::Standard(m) => {
                let uniforms = StandardUniforms {
                    color: m.color,
                    emissive: m.emissive,
                    roughness: m.roughness,
                    metalness: m.metalness,
                    opacity: m.opacity,
                    _padding: [0.0; 2],
                    map_transform: mat3_to_gpu(map_matrix(assets, m.map)),
                };
                let buffer = self.create_uniform_buffer("Standard Material", &uniforms);
                let (map_view, map_sampler) = self.slot_binding(m.map, &self.placeholder_white);
                let (normal_view, normal_sampler) =
                    self.slot_binding(m.normal_map, &self.placeholder_normal);
                let (ao_view, ao_sampler) = self.slot_binding(m.ao_map, &self.placeholder_white);
                let (rough_view, rough_sampler) =
                    self.slot_binding(m.roughness_map, &self.placeholder_white);

                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Standard Material"),
                    layout: &self.standard_material_layout,
                    entries: &[
                        buffer_entry(0, &buffer),
                        view_entry(1, map_view),
                        sampler_binding_entry(2, map_sampler),
                        view_entry(3, normal_view),
                        sampler_binding_entry(4, normal_sampler),
                        view_entry(5, ao_view),
                        sampler_binding_entry(6, ao_sampler),
                        view_entry(7, rough_view),
                        sampler_binding_entry(8, rough_sampler),
                    ],
                })
            }

            MaterialData::Points(m) => {
                let uniforms = PointsUniforms {
                    color: m.color,
                    size: m.size,
                    fall_speed: m.fall_speed,
                    area_height: m.area_height,
                    _padding: 0.0,
                };
                let buffer = self.create_uniform_buffer("Points Material", &uniforms);

                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Points Material"),
                    layout: &self.points_material_layout,
                    entries: &[buffer_entry(0, &buffer)],
                })
            }
        };

        self.gpu_materials.insert(
            handle,
            GpuMaterial {
                bind_group,
                bind_group_id: next_resource_id(),
                deps_hash,
                last_used_frame: self.frame_index,
            },
        );
    }

    fn create_uniform_buffer<T: bytemuck::Pod>(&self, label: &str, uniforms: &T) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Resolves a texture slot to its view and sampler, or to the given
    /// placeholder when the slot is empty or the texture is missing.
    fn slot_binding<'a>(
        &'a self,
        slot: Option<TextureHandle>,
        fallback: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, &'a wgpu::Sampler) {
        match slot.and_then(|h| self.gpu_textures.get(h)) {
            Some(t) => (&t.view, &t.sampler),
            None => (fallback, &self.default_sampler),
        }
    }

    // === Garbage collection ===

    /// Drops cached entries not touched for `ttl_frames` frames.
    pub fn prune(&mut self, ttl_frames: u64) {
        if self.frame_index < ttl_frames {
            return;
        }
        let cutoff = self.frame_index - ttl_frames;

        self.gpu_geometries.retain(|_, g| g.last_used_frame >= cutoff);
        self.gpu_materials.retain(|_, m| m.last_used_frame >= cutoff);
        self.gpu_textures.retain(|_, t| t.last_used_frame >= cutoff);
        self.gpu_images.retain(|_, i| i.last_used_frame >= cutoff);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// The single entry of the model bind group layout (group 2). The shadow
/// pass builds a structurally identical layout from this, so the model bind
/// group binds in both passes.
pub(crate) fn model_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(mem::size_of::<ModelUniforms>() as u64),
        },
        count: None,
    }
}

fn texture_slots(data: &MaterialData) -> [Option<TextureHandle>; 4] {
    match data {
        MaterialData::Basic(m) => [m.map, None, None, None],
        MaterialData::Standard(m) => [m.map, m.normal_map, m.ao_map, m.roughness_map],
        MaterialData::Points(_) => [None; 4],
    }
}

/// UV transform of the color map, or identity without one.
fn map_matrix(assets: &AssetServer, map: Option<TextureHandle>) -> Mat3 {
    map.and_then(|h| assets.textures.get(h))
        .map_or(Mat3::IDENTITY, |t| t.transform.get_matrix())
}

fn create_sampler(device: &wgpu::Device, desc: &TextureSampler) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Material Sampler"),
        address_mode_u: desc.address_mode_u,
        address_mode_v: desc.address_mode_v,
        mag_filter: desc.mag_filter,
        min_filter: desc.min_filter,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        anisotropy_clamp: desc.anisotropy_clamp,
        ..Default::default()
    })
}

fn placeholder_view(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    pixel: [u8; 4],
) -> wgpu::TextureView {
    let image = Image::new(
        label,
        1,
        1,
        wgpu::TextureFormat::Rgba8Unorm,
        Some(pixel.to_vec()),
    );
    // The view keeps the wgpu texture alive after the GpuImage drops.
    GpuImage::new(device, queue, &image)
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_global_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    globals_buffer: &wgpu::Buffer,
    lights_buffer: &wgpu::Buffer,
    shadow_view: &wgpu::TextureView,
    shadow_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Global Bind Group"),
        layout,
        entries: &[
            buffer_entry(0, globals_buffer),
            buffer_entry(1, lights_buffer),
            view_entry(2, shadow_view),
            sampler_binding_entry(3, shadow_sampler),
        ],
    })
}

fn create_model_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Model Uniforms"),
        size: (capacity * mem::size_of::<ModelUniforms>()) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_model_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Model Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(mem::size_of::<ModelUniforms>() as u64),
            }),
        }],
    })
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn buffer_entry(binding: u32, buffer: &wgpu::Buffer) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

fn view_entry(binding: u32, view: &wgpu::TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

fn sampler_binding_entry(binding: u32, sampler: &wgpu::Sampler) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Sampler(sampler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn texture_slot_mapping() {
        let basic = Material::new_basic(Vec4::ONE);
        assert_eq!(texture_slots(&basic.data), [None; 4]);

        let points = Material::new_points(Vec4::ONE, 0.1);
        assert_eq!(texture_slots(&points.data), [None; 4]);
    }

    #[test]
    fn map_matrix_identity_without_texture() {
        let assets = AssetServer::new();
        assert_eq!(map_matrix(&assets, None), Mat3::IDENTITY);
    }

    #[test]
    fn map_matrix_reads_texture_transform() {
        let assets = AssetServer::new();

        let mut texture = crate::resources::texture::Texture::new_2d(
            "t",
            1,
            1,
            None,
            wgpu::TextureFormat::Rgba8Unorm,
        );
        texture.transform.repeat = Vec2::splat(2.0);
        let handle = assets.textures.add(texture);

        let m = map_matrix(&assets, Some(handle));
        assert_eq!(m.x_axis.x, 2.0);
        assert_eq!(m.y_axis.y, 2.0);

        // A handle from a different server dangles; fall back to identity.
        let other = AssetServer::new();
        assert_eq!(map_matrix(&other, Some(handle)), Mat3::IDENTITY);
    }
}
