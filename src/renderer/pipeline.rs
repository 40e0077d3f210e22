//! Render pipeline construction and caching.
//!
//! Each material kind maps to one static WGSL shader; the only pipeline
//! permutations are render states (blending, depth write, culling), encoded
//! in [`PipelineFlags`]. Missing texture slots are bound to 1x1 placeholder
//! textures instead of spawning shader variants, which keeps the pipeline
//! count at "material kinds x state combinations actually used".

use rustc_hash::FxHashMap;

use crate::resources::material::{Material, MaterialData};

bitflags::bitflags! {
    /// Render state bits that force a separate pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineFlags: u32 {
        /// Alpha blending on, written in the back-to-front list.
        const TRANSPARENT = 1 << 0;
        /// Depth test without depth write.
        const NO_DEPTH_WRITE = 1 << 1;
        /// Draw both faces.
        const CULL_NONE = 1 << 2;
        /// Cull front faces instead of back faces.
        const CULL_FRONT = 1 << 3;
    }
}

impl PipelineFlags {
    #[must_use]
    pub fn from_material(material: &Material) -> Self {
        let mut flags = Self::empty();
        if material.transparent {
            flags |= Self::TRANSPARENT;
        }
        if !material.depth_write {
            flags |= Self::NO_DEPTH_WRITE;
        }
        match material.cull_mode {
            None => flags |= Self::CULL_NONE,
            Some(wgpu::Face::Front) => flags |= Self::CULL_FRONT,
            Some(wgpu::Face::Back) => {}
        }
        flags
    }

    fn cull_mode(self) -> Option<wgpu::Face> {
        if self.contains(Self::CULL_NONE) {
            None
        } else if self.contains(Self::CULL_FRONT) {
            Some(wgpu::Face::Front)
        } else {
            Some(wgpu::Face::Back)
        }
    }
}

/// Which of the built-in shaders a pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Basic,
    Standard,
    Points,
}

impl ShaderKind {
    #[must_use]
    pub fn from_material(material: &Material) -> Self {
        match &material.data {
            MaterialData::Basic(_) => Self::Basic,
            MaterialData::Standard(_) => Self::Standard,
            MaterialData::Points(_) => Self::Points,
        }
    }

    /// Geometry attribute names in shader location order.
    #[must_use]
    pub fn vertex_attribute_names(self) -> &'static [&'static str] {
        match self {
            Self::Basic | Self::Standard => &["position", "normal", "uv"],
            Self::Points => &["corner", "instance_position"],
        }
    }
}

/// Everything that distinguishes one render pipeline from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader: ShaderKind,
    pub flags: PipelineFlags,
}

// ============================================================================
// Static vertex layouts
// ============================================================================

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 0,
}];

const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 1,
}];

const UV_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 2,
}];

const CORNER_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

const INSTANCE_POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: 0,
    shader_location: 1,
}];

/// position + normal + uv, one planar buffer per attribute.
fn mesh_vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        wgpu::VertexBufferLayout {
            array_stride: 12,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: 12,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &NORMAL_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: 8,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &UV_ATTRIBUTES,
        },
    ]
}

/// Quad corner (per vertex) + sprite center (per instance).
fn points_vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: 8,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &CORNER_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: 12,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_POSITION_ATTRIBUTES,
        },
    ]
}

/// Depth-only passes read positions and nothing else.
pub(crate) fn shadow_vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 1] {
    [wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRIBUTES,
    }]
}

// ============================================================================
// Pipeline cache
// ============================================================================

pub struct PipelineCache {
    pipelines: FxHashMap<PipelineKey, (u16, wgpu::RenderPipeline)>,

    basic_module: wgpu::ShaderModule,
    standard_module: wgpu::ShaderModule,
    points_module: wgpu::ShaderModule,

    next_id: u16,
}

impl PipelineCache {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let basic_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_basic"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh_basic.wgsl").into()),
        });
        let standard_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_standard"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh_standard.wgsl").into()),
        });
        let points_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        Self {
            pipelines: FxHashMap::default(),
            basic_module,
            standard_module,
            points_module,
            next_id: 0,
        }
    }

    /// Looks up or builds the pipeline for `key`.
    ///
    /// Returns the pipeline's stable id (for sort keys and redundant-state
    /// elimination) along with a clone of the pipeline handle.
    #[allow(clippy::too_many_arguments)]
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        key: PipelineKey,
        global_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> (u16, wgpu::RenderPipeline) {
        if let Some((id, pipeline)) = self.pipelines.get(&key) {
            return (*id, pipeline.clone());
        }

        let module = match key.shader {
            ShaderKind::Basic => &self.basic_module,
            ShaderKind::Standard => &self.standard_module,
            ShaderKind::Points => &self.points_module,
        };

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(global_layout), Some(material_layout), Some(model_layout)],
            immediate_size: 0,
        });

        let blend = if key.flags.contains(PipelineFlags::TRANSPARENT) {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            None
        };

        let mesh_buffers;
        let points_buffers;
        let vertex_buffers: &[wgpu::VertexBufferLayout<'_>] = match key.shader {
            ShaderKind::Basic | ShaderKind::Standard => {
                mesh_buffers = mesh_vertex_layouts();
                &mesh_buffers
            }
            ShaderKind::Points => {
                points_buffers = points_vertex_layouts();
                &points_buffers
            }
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: key.flags.cull_mode(),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: Some(!key.flags.contains(PipelineFlags::NO_DEPTH_WRITE)),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let id = self.next_id;
        self.next_id += 1;
        self.pipelines.insert(key, (id, pipeline.clone()));
        (id, pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn flags_from_material_states() {
        let opaque = Material::new_standard(Vec4::ONE);
        assert_eq!(PipelineFlags::from_material(&opaque), PipelineFlags::empty());

        let mut glass = Material::new_standard(Vec4::new(1.0, 1.0, 1.0, 0.4));
        glass.transparent = true;
        glass.depth_write = false;
        let flags = PipelineFlags::from_material(&glass);
        assert!(flags.contains(PipelineFlags::TRANSPARENT));
        assert!(flags.contains(PipelineFlags::NO_DEPTH_WRITE));
        assert!(!flags.contains(PipelineFlags::CULL_NONE));

        // Point sprites come pre-configured for blended, two-sided drawing.
        let points = Material::new_points(Vec4::ONE, 0.1);
        let flags = PipelineFlags::from_material(&points);
        assert!(flags.contains(PipelineFlags::TRANSPARENT | PipelineFlags::CULL_NONE));
        assert_eq!(flags.cull_mode(), None);
    }

    #[test]
    fn shader_kind_attribute_order() {
        assert_eq!(
            ShaderKind::Standard.vertex_attribute_names(),
            &["position", "normal", "uv"]
        );
        assert_eq!(
            ShaderKind::Points.vertex_attribute_names(),
            &["corner", "instance_position"]
        );
    }
}
