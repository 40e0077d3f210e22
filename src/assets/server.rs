use slotmap::new_key_type;
use std::path::Path;
use std::sync::Arc;

use crate::assets::ColorSpace;
use crate::assets::storage::AssetStorage;
use crate::errors::{GloamError, Result};
use crate::resources::geometry::Geometry;
use crate::resources::image::Image;
use crate::resources::material::Material;
use crate::resources::texture::Texture;

// Strongly-typed handles
new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

/// Shared asset pools. Cloning is cheap; every clone sees the same
/// storages.
#[derive(Clone)]
pub struct AssetServer {
    pub geometries: Arc<AssetStorage<GeometryHandle, Geometry>>,
    pub materials: Arc<AssetStorage<MaterialHandle, Material>>,
    pub textures: Arc<AssetStorage<TextureHandle, Texture>>,
}

impl Default for AssetServer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            geometries: Arc::new(AssetStorage::new()),
            materials: Arc::new(AssetStorage::new()),
            textures: Arc::new(AssetStorage::new()),
        }
    }

    /// Loads and decodes a 2D texture from disk, blocking until done.
    pub fn load_texture(
        &self,
        path: impl AsRef<Path>,
        color_space: ColorSpace,
    ) -> Result<TextureHandle> {
        let path = path.as_ref();
        let label = path.display().to_string();

        let (width, height, pixels) = read_and_decode(path, &label)?;
        let image = Image::new(
            &label,
            width,
            height,
            color_space.texture_format(),
            Some(pixels),
        );

        Ok(self.textures.add(Texture::new(&label, image)))
    }

    /// Starts loading a 2D texture on a background thread and returns its
    /// handle immediately. Meshes can reference the handle right away: it
    /// resolves to a 1x1 white placeholder until the loader thread swaps
    /// the decoded pixels in, at which point the renderer picks up the
    /// change through the image version counters. Load failures are logged
    /// and leave the placeholder in place.
    pub fn load_texture_async(
        &self,
        path: impl AsRef<Path>,
        color_space: ColorSpace,
    ) -> TextureHandle {
        let path = path.as_ref().to_path_buf();
        let label = path.display().to_string();

        let image = Image::new(
            &label,
            1,
            1,
            color_space.texture_format(),
            Some(vec![255, 255, 255, 255]),
        );
        let handle = self.textures.add(Texture::new(&label, image.clone()));

        std::thread::spawn(move || match read_and_decode(&path, &label) {
            Ok((width, height, pixels)) => {
                image.replace(width, height, pixels);
                log::debug!("Loaded texture {label} ({width}x{height})");
            }
            Err(err) => {
                log::error!("Failed to load texture {label}: {err}");
            }
        });

        handle
    }
}

/// Reads a file and decodes it to tightly packed RGBA8.
fn read_and_decode(path: &Path, label: &str) -> Result<(u32, u32, Vec<u8>)> {
    let bytes = std::fs::read(path)
        .map_err(|e| GloamError::AssetNotFound(format!("{}: {e}", path.display())))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| GloamError::ImageDecodeError(format!("{label}: {e}")))?;

    let width = img.width();
    let height = img.height();
    let rgba = img.to_rgba8();

    Ok((width, height, rgba.into_vec()))
}
