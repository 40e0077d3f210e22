//! Asset handles and storage.
//!
//! Assets live in shared slotmap pools behind an [`AssetServer`]; scenes
//! and meshes refer to them through copyable typed handles.

pub mod server;
pub mod storage;

pub use server::{AssetServer, GeometryHandle, MaterialHandle, TextureHandle};
pub use storage::AssetStorage;

/// Color space an image file's pixel values are encoded in. Color maps are
/// sRGB; data maps (normals, roughness, AO) are linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

impl ColorSpace {
    #[must_use]
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}
