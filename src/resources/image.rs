use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

// Global image ID generator (u64 for cheap map lookups on the render side)
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct ImageInner {
    pub id: u64,
    pub label: String,

    pub width: AtomicU32,
    pub height: AtomicU32,
    pub format: wgpu::TextureFormat,

    // Pixel data. Interior-mutable so a loader thread can deliver pixels
    // after the image is already referenced by textures.
    pub data: RwLock<Option<Vec<u8>>>,

    // Version control
    pub version: AtomicU64, // Data version (bumped when pixel data changes)
    pub generation_id: AtomicU64, // Structural version (bumped when the size changes)
}

/// Shared CPU-side image.
///
/// Cloning is cheap (Arc). The renderer watches `version` and
/// `generation_id` to decide between re-uploading pixels and recreating the
/// GPU texture.
#[derive(Debug, Clone)]
pub struct Image(Arc<ImageInner>);

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}
impl Eq for Image {}
impl std::hash::Hash for Image {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl Image {
    pub fn new(
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        data: Option<Vec<u8>>,
    ) -> Self {
        Self(Arc::new(ImageInner {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),

            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            format,

            data: RwLock::new(data),
            version: AtomicU64::new(1),
            generation_id: AtomicU64::new(1),
        }))
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.version.load(Ordering::Relaxed)
    }
    #[must_use]
    pub fn generation_id(&self) -> u64 {
        self.0.generation_id.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width.load(Ordering::Relaxed)
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height.load(Ordering::Relaxed)
    }
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.0.format
    }

    /// Replaces the pixel data and bumps the data version.
    pub fn update_data(&self, data: Vec<u8>) {
        let mut lock = self.0.data.write();
        *lock = Some(data);
        self.0.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Swaps in new dimensions and pixel data in one step, bumping the
    /// structural version so the GPU texture gets recreated. The dimensions
    /// change while the data write lock is held; readers that take the data
    /// lock first never observe a half-applied swap.
    pub fn replace(&self, width: u32, height: u32, data: Vec<u8>) {
        let mut lock = self.0.data.write();
        self.0.width.store(width, Ordering::Relaxed);
        self.0.height.store(height, Ordering::Relaxed);
        *lock = Some(data);
        self.0.generation_id.fetch_add(1, Ordering::Relaxed);
        self.0.version.fetch_add(1, Ordering::Relaxed);
    }
}

// Deref for convenient read-only access to inner data
impl std::ops::Deref for Image {
    type Target = ImageInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
