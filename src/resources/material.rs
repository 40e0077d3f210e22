use glam::{Vec3, Vec4};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::assets::TextureHandle;

// ============================================================================
// Specific Materials
// ============================================================================

// MeshBasicMaterial
// ----------------------------------------------------------------------------

/// Unlit: flat color, optionally textured. Ignores every light.
#[derive(Debug, Clone)]
pub struct MeshBasicMaterial {
    pub color: Vec4,
    pub opacity: f32,

    pub map: Option<TextureHandle>,
}

impl MeshBasicMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            opacity: 1.0,
            map: None,
        }
    }
}

impl Default for MeshBasicMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

// MeshStandardMaterial
// ----------------------------------------------------------------------------

/// Lit surface with rough metallic shading.
#[derive(Debug, Clone)]
pub struct MeshStandardMaterial {
    pub color: Vec4,
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: Vec3,
    pub opacity: f32,

    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub ao_map: Option<TextureHandle>,
    pub roughness_map: Option<TextureHandle>,
}

impl MeshStandardMaterial {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            roughness: 1.0,
            metalness: 0.0,
            emissive: Vec3::ZERO,
            opacity: 1.0,
            map: None,
            normal_map: None,
            ao_map: None,
            roughness_map: None,
        }
    }
}

impl Default for MeshStandardMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE)
    }
}

// PointsMaterial
// ----------------------------------------------------------------------------

/// Camera-facing sprites for point-cloud geometry. When `fall_speed` is
/// nonzero the points sink over time and wrap within `area_height`,
/// which gives rain or snow without touching vertex data.
#[derive(Debug, Clone)]
pub struct PointsMaterial {
    pub color: Vec4,
    /// Sprite edge length in world units.
    pub size: f32,
    /// Downward drift in world units per second.
    pub fall_speed: f32,
    /// Vertical extent of the wrap volume.
    pub area_height: f32,
}

impl PointsMaterial {
    #[must_use]
    pub fn new(color: Vec4, size: f32) -> Self {
        Self {
            color,
            size,
            fall_speed: 0.0,
            area_height: 1.0,
        }
    }
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self::new(Vec4::ONE, 0.1)
    }
}

// ============================================================================
// Material Data Enum
// ============================================================================

#[derive(Debug)]
pub enum MaterialData {
    Basic(MeshBasicMaterial),
    Standard(MeshStandardMaterial),
    Points(PointsMaterial),
}

impl MaterialData {
    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "mesh_basic",
            Self::Standard(_) => "mesh_standard",
            Self::Points(_) => "points",
        }
    }
}

// ============================================================================
// Material Wrapper
// ============================================================================

#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    pub version: AtomicU64,
    pub name: Option<String>,

    pub data: MaterialData,

    // Render states
    pub transparent: bool,
    pub depth_write: bool,
    pub cull_mode: Option<wgpu::Face>,
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            version: AtomicU64::new(0),
            name: None,
            data,
            transparent: false,
            depth_write: true,
            cull_mode: Some(wgpu::Face::Back),
        }
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn new_basic(color: Vec4) -> Self {
        Self::from(MeshBasicMaterial::new(color))
    }

    #[must_use]
    pub fn new_standard(color: Vec4) -> Self {
        Self::from(MeshStandardMaterial::new(color))
    }

    #[must_use]
    pub fn new_points(color: Vec4, size: f32) -> Self {
        Self::from(PointsMaterial::new(color, size))
    }

    #[must_use]
    pub fn as_basic(&self) -> Option<&MeshBasicMaterial> {
        match &self.data {
            MaterialData::Basic(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_basic_mut(&mut self) -> Option<&mut MeshBasicMaterial> {
        match &mut self.data {
            MaterialData::Basic(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_standard(&self) -> Option<&MeshStandardMaterial> {
        match &self.data {
            MaterialData::Standard(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut MeshStandardMaterial> {
        match &mut self.data {
            MaterialData::Standard(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_points(&self) -> Option<&PointsMaterial> {
        match &self.data {
            MaterialData::Points(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut PointsMaterial> {
        match &mut self.data {
            MaterialData::Points(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn shader_name(&self) -> &'static str {
        self.data.shader_name()
    }

    /// Bumps the version so the renderer re-uploads the material uniforms.
    /// Call after mutating fields through the `as_*_mut` accessors.
    pub fn mark_dirty(&self) {
        self.version.fetch_add(1, Ordering::Relaxed);
    }
}

impl From<MeshBasicMaterial> for Material {
    fn from(data: MeshBasicMaterial) -> Self {
        Material::new(MaterialData::Basic(data))
    }
}

impl From<MeshStandardMaterial> for Material {
    fn from(data: MeshStandardMaterial) -> Self {
        Material::new(MaterialData::Standard(data))
    }
}

impl From<PointsMaterial> for Material {
    fn from(data: PointsMaterial) -> Self {
        let mut material = Material::new(MaterialData::Points(data));
        // Sprites overlap heavily; draw them blended without depth writes.
        material.transparent = true;
        material.depth_write = false;
        material.cull_mode = None;
        material
    }
}
