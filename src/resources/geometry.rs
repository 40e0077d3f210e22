use core::ops::Range;
use glam::Vec3;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;
use wgpu::{PrimitiveTopology, VertexFormat, VertexStepMode};

use crate::resources::primitives;

/// A single vertex (or index) stream: CPU-side bytes plus layout metadata.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// CPU-side data shared via Arc.
    pub data: Arc<Vec<u8>>,

    /// Data version for change detection.
    pub version: u64,

    pub format: VertexFormat,
    pub offset: u64,
    pub count: u32,
    pub stride: u64,
    pub step_mode: VertexStepMode,
}

static NEXT_ATTR_VERSION: AtomicU64 = AtomicU64::new(1);

impl Attribute {
    /// Creates a planar (non-interleaved) per-vertex attribute.
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        let raw_data = bytemuck::cast_slice(data).to_vec();

        Self {
            data: Arc::new(raw_data),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format,
            offset: 0,
            count: data.len() as u32,
            stride: std::mem::size_of::<T>() as u64,
            step_mode: VertexStepMode::Vertex,
        }
    }

    /// Creates a per-instance attribute.
    pub fn new_instanced<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        let mut attr = Self::new_planar(data, format);
        attr.step_mode = VertexStepMode::Instance;
        attr
    }

    #[must_use]
    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format != VertexFormat::Float32x3 {
            return None;
        }
        let stride = self.stride as usize;
        let offset = self.offset as usize + (i as usize) * stride;

        let slice = self.data.as_slice();
        if offset + 12 <= slice.len() {
            let bytes: &[u8; 12] = slice[offset..offset + 12].try_into().ok()?;
            let vals: &[f32; 3] = bytemuck::cast_ref(bytes);
            return Some(Vec3::from_array(*vals));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug)]
pub struct Geometry {
    pub uuid: Uuid,

    attributes: FxHashMap<String, Attribute>,
    index_attribute: Option<Attribute>,

    pub topology: PrimitiveTopology,
    pub draw_range: Range<u32>,

    pub bounding_box: RefCell<Option<BoundingBox>>,
    pub bounding_sphere: RefCell<Option<BoundingSphere>>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            attributes: FxHashMap::default(),
            index_attribute: None,
            topology: PrimitiveTopology::TriangleList,
            draw_range: 0..u32::MAX,
            bounding_box: RefCell::new(None),
            bounding_sphere: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    #[must_use]
    pub fn index_attribute(&self) -> Option<&Attribute> {
        self.index_attribute.as_ref()
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        self.attributes.insert(name.to_string(), attr);
    }

    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn set_indices(&mut self, indices: &[u16]) {
        let raw_data = bytemuck::cast_slice(indices).to_vec();

        self.index_attribute = Some(Attribute {
            data: Arc::new(raw_data),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format: VertexFormat::Uint16,
            offset: 0,
            count: indices.len() as u32,
            stride: 2,
            step_mode: VertexStepMode::Vertex,
        });
    }

    pub fn set_indices_u32(&mut self, indices: &[u32]) {
        let raw_data = bytemuck::cast_slice(indices).to_vec();

        self.index_attribute = Some(Attribute {
            data: Arc::new(raw_data),
            version: NEXT_ATTR_VERSION.fetch_add(1, Ordering::Relaxed),
            format: VertexFormat::Uint32,
            offset: 0,
            count: indices.len() as u32,
            stride: 4,
            step_mode: VertexStepMode::Vertex,
        });
    }

    /// Computes (and caches) the AABB and a bounding sphere around its center.
    pub fn compute_bounding_volume(&self) {
        let Some(pos_attr) = self.attributes.get("position") else {
            return;
        };

        if pos_attr.format != VertexFormat::Float32x3 {
            return;
        }

        let count = pos_attr.count;

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut valid_points = 0;

        // Pass 1: AABB extents.
        for i in 0..count {
            if let Some(p) = pos_attr.read_vec3(i) {
                min = min.min(p);
                max = max.max(p);
                valid_points += 1;
            } else {
                break;
            }
        }

        if valid_points == 0 {
            return;
        }

        *self.bounding_box.borrow_mut() = Some(BoundingBox { min, max });

        // Pass 2: radius about the AABB center. Tighter than centering on the
        // vertex centroid for lopsided meshes.
        let center = (min + max) * 0.5;
        let mut max_dist_sq: f32 = 0.0;

        for i in 0..count {
            if let Some(p) = pos_attr.read_vec3(i) {
                max_dist_sq = max_dist_sq.max(p.distance_squared(center));
            } else {
                break;
            }
        }

        *self.bounding_sphere.borrow_mut() = Some(BoundingSphere {
            center,
            radius: max_dist_sq.sqrt(),
        });
    }

    #[must_use]
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        primitives::create_box(width, height, depth)
    }

    #[must_use]
    pub fn new_sphere(radius: f32) -> Self {
        primitives::create_sphere(primitives::SphereOptions {
            radius,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn new_plane(width: f32, height: f32) -> Self {
        primitives::create_plane(primitives::PlaneOptions {
            width,
            height,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn new_cone(radius: f32, height: f32) -> Self {
        primitives::create_cone(primitives::ConeOptions {
            radius,
            height,
            ..Default::default()
        })
    }
}
