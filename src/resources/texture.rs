use crate::resources::image::Image;
use glam::{Mat3, Vec2};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;
use wgpu::TextureFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    /// Anisotropic filtering level (1 = off).
    pub anisotropy_clamp: u16,
}

impl Default for TextureSampler {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: 1,
        }
    }
}

/// UV transform: offset, repeat, rotation around a center point.
#[derive(Debug, Clone, Copy)]
pub struct TextureTransform {
    pub offset: Vec2,
    pub repeat: Vec2,
    pub rotation: f32,
    pub center: Vec2,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            repeat: Vec2::ONE,
            rotation: 0.0,
            center: Vec2::new(0.5, 0.5),
        }
    }
}

impl TextureTransform {
    /// The 3x3 UV transform matrix.
    #[must_use]
    pub fn get_matrix(&self) -> Mat3 {
        let c = self.rotation.cos();
        let s = self.rotation.sin();
        let ox = self.offset.x;
        let oy = self.offset.y;
        let rx = self.repeat.x;
        let ry = self.repeat.y;
        let cx = self.center.x;
        let cy = self.center.y;

        Mat3::from_cols_array(&[
            c * rx,
            s * rx,
            0.0,
            -s * ry,
            c * ry,
            0.0,
            (c * -cx + s * -cy + cx) * rx + ox,
            (-s * -cx + c * -cy + cy) * ry + oy,
            1.0,
        ])
    }
}

// ============================================================================
// Texture asset
// ============================================================================

#[derive(Debug)]
pub struct Texture {
    pub uuid: Uuid,
    pub name: String,

    pub image: Image,

    pub sampler: TextureSampler,
    pub transform: TextureTransform,

    pub version: AtomicU64,
}

impl Texture {
    /// Wraps an existing image.
    pub fn new(name: &str, image: Image) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            image,
            sampler: TextureSampler::default(),
            transform: TextureTransform::default(),
            version: AtomicU64::new(0),
        }
    }

    /// Creates a 2D texture (and its backing image).
    pub fn new_2d(
        name: &str,
        width: u32,
        height: u32,
        data: Option<Vec<u8>>,
        format: TextureFormat,
    ) -> Self {
        let image = Image::new(name, width, height, format, data);
        Self::new(name, image)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Relaxed)
    }

    /// Marks the texture as changed (sampler or transform edits).
    pub fn needs_update(&self) {
        self.version.fetch_add(1, Ordering::Relaxed);
    }

    /// A 1x1 solid-color texture.
    #[must_use]
    pub fn create_solid_color(name: &str, color: [u8; 4]) -> Texture {
        Self::new_2d(
            name,
            1,
            1,
            Some(color.to_vec()),
            TextureFormat::Rgba8UnormSrgb,
        )
    }

    /// A checkerboard test texture.
    #[must_use]
    pub fn create_checkerboard(name: &str, width: u32, height: u32, check_size: u32) -> Self {
        let mut data = Vec::with_capacity((width * height * 4) as usize);

        let color_a = [255, 255, 255, 255];
        let color_b = [0, 0, 0, 255];

        for y in 0..height {
            for x in 0..width {
                let cx = x / check_size;
                let cy = y / check_size;
                let is_a = (cx + cy) % 2 == 0;

                if is_a {
                    data.extend_from_slice(&color_a);
                } else {
                    data.extend_from_slice(&color_b);
                }
            }
        }

        Self::new_2d(name, width, height, Some(data), TextureFormat::Rgba8Unorm)
    }
}
