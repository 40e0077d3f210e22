//! Asset storage tests
//!
//! Tests for:
//! - AssetStorage add/get through shared references
//! - Null and stale handle behavior
//! - AssetServer pools and cheap cloning
//! - Texture loading error paths
//! - Color space to texture format mapping

use glam::Vec4;
use slotmap::{Key, new_key_type};

use gloam::assets::{AssetServer, AssetStorage, ColorSpace};
use gloam::resources::{Geometry, Material};

new_key_type! { struct TestHandle; }

// ============================================================================
// AssetStorage
// ============================================================================

#[test]
fn storage_add_and_get() {
    let storage = AssetStorage::<TestHandle, String>::new();
    let handle = storage.add("hello".to_string());

    let value = storage.get(handle).expect("stored value");
    assert_eq!(&**value, "hello");
}

#[test]
fn storage_null_handle_is_none() {
    let storage = AssetStorage::<TestHandle, String>::new();
    assert!(storage.get(TestHandle::null()).is_none());
}

#[test]
fn storage_handles_are_independent() {
    let storage = AssetStorage::<TestHandle, u32>::new();
    let a = storage.add(1u32);
    let b = storage.add(2u32);

    assert_ne!(a, b);
    assert_eq!(*storage.get(a).unwrap(), 1);
    assert_eq!(*storage.get(b).unwrap(), 2);
}

#[test]
fn storage_get_returns_shared_pointer() {
    let storage = AssetStorage::<TestHandle, String>::new();
    let handle = storage.add("shared".to_string());

    let first = storage.get(handle).unwrap();
    let second = storage.get(handle).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn storage_read_lock_batches_access() {
    let storage = AssetStorage::<TestHandle, u32>::new();
    let a = storage.add(10u32);
    let b = storage.add(20u32);

    let guard = storage.read_lock();
    assert_eq!(guard.len(), 2);
    assert_eq!(**guard.get(a).unwrap(), 10);
    assert_eq!(**guard.get(b).unwrap(), 20);
}

// ============================================================================
// AssetServer
// ============================================================================

#[test]
fn server_pools_round_trip() {
    let assets = AssetServer::new();

    let geo_handle = assets.geometries.add(Geometry::new_box(1.0, 2.0, 3.0));
    let mat_handle = assets.materials.add(Material::new_basic(Vec4::ONE));

    assert!(assets.geometries.get(geo_handle).is_some());
    assert!(assets.materials.get(mat_handle).is_some());
}

#[test]
fn server_clones_share_storage() {
    let assets = AssetServer::new();
    let clone = assets.clone();

    // Insert through the clone, resolve through the original.
    let handle = clone.materials.add(Material::new_standard(Vec4::ONE));
    assert!(assets.materials.get(handle).is_some());
}

// ============================================================================
// Texture loading
// ============================================================================

#[test]
fn load_texture_missing_file_errors() {
    let assets = AssetServer::new();
    let result = assets.load_texture("no/such/texture.png", ColorSpace::Srgb);
    assert!(result.is_err());
}

#[test]
fn load_texture_async_returns_placeholder_immediately() {
    let assets = AssetServer::new();

    // Even for a missing file the handle resolves right away; the decode
    // failure only shows up in the log.
    let handle = assets.load_texture_async("no/such/texture.png", ColorSpace::Srgb);

    let texture = assets.textures.get(handle).expect("placeholder texture");
    assert_eq!(texture.image.width(), 1);
    assert_eq!(texture.image.height(), 1);
}

// ============================================================================
// Color space
// ============================================================================

#[test]
fn color_space_picks_texture_format() {
    assert_eq!(
        ColorSpace::Srgb.texture_format(),
        wgpu::TextureFormat::Rgba8UnormSrgb
    );
    assert_eq!(
        ColorSpace::Linear.texture_format(),
        wgpu::TextureFormat::Rgba8Unorm
    );
}
