//! Resource component tests
//!
//! Tests for:
//! - Material constructors, accessors and render-state defaults
//! - Material version bumping
//! - TextureTransform UV matrix
//! - Procedural textures (checkerboard, solid color)
//! - Mesh shadow flags

use glam::{Vec2, Vec3, Vec4};
use wgpu::TextureFormat;

use gloam::assets::AssetServer;
use gloam::resources::{
    Geometry, Material, Mesh, MeshStandardMaterial, PointsMaterial, Texture, TextureTransform,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Material constructors and accessors
// ============================================================================

#[test]
fn basic_material_shape() {
    let mat = Material::new_basic(Vec4::new(1.0, 0.5, 0.25, 1.0));

    assert_eq!(mat.shader_name(), "mesh_basic");
    assert!(mat.as_basic().is_some());
    assert!(mat.as_standard().is_none());
    assert!(mat.as_points().is_none());

    let basic = mat.as_basic().unwrap();
    assert_eq!(basic.color, Vec4::new(1.0, 0.5, 0.25, 1.0));
    assert!(basic.map.is_none());
}

#[test]
fn standard_material_shape() {
    let mat = Material::new_standard(Vec4::ONE);

    assert_eq!(mat.shader_name(), "mesh_standard");
    let standard = mat.as_standard().unwrap();
    assert!(approx(standard.roughness, 1.0));
    assert!(approx(standard.metalness, 0.0));
    assert_eq!(standard.emissive, Vec3::ZERO);
}

#[test]
fn points_material_shape() {
    let mat = Material::new_points(Vec4::ONE, 0.05);

    assert_eq!(mat.shader_name(), "points");
    let points = mat.as_points().unwrap();
    assert!(approx(points.size, 0.05));
    assert!(approx(points.fall_speed, 0.0), "static cloud by default");
}

#[test]
fn opaque_render_state_defaults() {
    let mat = Material::new_standard(Vec4::ONE);

    assert!(!mat.transparent);
    assert!(mat.depth_write);
    assert_eq!(mat.cull_mode, Some(wgpu::Face::Back));
}

#[test]
fn points_material_disables_depth_write() {
    // Sprite clouds come pre-configured for blending.
    let mat = Material::new_points(Vec4::ONE, 0.1);

    assert!(mat.transparent);
    assert!(!mat.depth_write);
    assert_eq!(mat.cull_mode, None);
}

#[test]
fn material_version_bumps_on_mark_dirty() {
    let mut mat = Material::new_standard(Vec4::ONE);
    assert_eq!(mat.version(), 0);

    if let Some(standard) = mat.as_standard_mut() {
        standard.roughness = 0.3;
    }
    mat.mark_dirty();
    assert_eq!(mat.version(), 1);

    mat.mark_dirty();
    assert_eq!(mat.version(), 2);
}

#[test]
fn material_from_component_data() {
    let mut standard = MeshStandardMaterial::new(Vec4::new(0.8, 0.2, 0.2, 1.0));
    standard.roughness = 0.4;
    standard.metalness = 0.9;

    let mat: Material = standard.into();
    assert_eq!(mat.shader_name(), "mesh_standard");
    assert!(approx(mat.as_standard().unwrap().metalness, 0.9));
}

#[test]
fn rain_material_configuration() {
    let mut points = PointsMaterial::new(Vec4::new(0.7, 0.75, 0.85, 0.6), 0.05);
    points.fall_speed = 5.0;
    points.area_height = 10.0;

    let mat: Material = points.into();
    let p = mat.as_points().unwrap();
    assert!(approx(p.fall_speed, 5.0));
    assert!(approx(p.area_height, 10.0));
    assert!(mat.transparent);
}

// ============================================================================
// TextureTransform
// ============================================================================

#[test]
fn texture_transform_identity() {
    let transform = TextureTransform::default();
    let m = transform.get_matrix();

    let uv = m * Vec3::new(0.25, 0.75, 1.0);
    assert!(approx(uv.x, 0.25));
    assert!(approx(uv.y, 0.75));
}

#[test]
fn texture_transform_repeat_and_offset() {
    let transform = TextureTransform {
        offset: Vec2::new(0.1, 0.2),
        repeat: Vec2::new(2.0, 3.0),
        rotation: 0.0,
        center: Vec2::new(0.5, 0.5),
    };
    let m = transform.get_matrix();

    // No rotation: uv' = uv * repeat + offset.
    let uv = m * Vec3::new(0.5, 0.5, 1.0);
    assert!(approx(uv.x, 0.5 * 2.0 + 0.1), "u: {}", uv.x);
    assert!(approx(uv.y, 0.5 * 3.0 + 0.2), "v: {}", uv.y);
}

#[test]
fn texture_transform_rotation_pivots_on_center() {
    let transform = TextureTransform {
        offset: Vec2::ZERO,
        repeat: Vec2::ONE,
        rotation: std::f32::consts::PI,
        center: Vec2::new(0.5, 0.5),
    };
    let m = transform.get_matrix();

    // A half turn about the center maps a corner to the opposite corner.
    let uv = m * Vec3::new(0.0, 0.0, 1.0);
    assert!(approx(uv.x, 1.0), "u: {}", uv.x);
    assert!(approx(uv.y, 1.0), "v: {}", uv.y);
}

// ============================================================================
// Procedural textures
// ============================================================================

#[test]
fn checkerboard_pixel_pattern() {
    let tex = Texture::create_checkerboard("checks", 4, 4, 1);

    assert_eq!(tex.image.width(), 4);
    assert_eq!(tex.image.height(), 4);
    assert_eq!(tex.image.format(), TextureFormat::Rgba8Unorm);

    let guard = tex.image.data.read();
    let data = guard.as_ref().expect("pixel data");
    assert_eq!(data.len(), 4 * 4 * 4);

    // (0,0) white, (1,0) black, alternating.
    assert_eq!(&data[0..4], &[255, 255, 255, 255]);
    assert_eq!(&data[4..8], &[0, 0, 0, 255]);
    // Row below starts black.
    assert_eq!(&data[16..20], &[0, 0, 0, 255]);
}

#[test]
fn solid_color_texture_is_one_pixel_srgb() {
    let tex = Texture::create_solid_color("flat", [10, 20, 30, 255]);

    assert_eq!(tex.image.width(), 1);
    assert_eq!(tex.image.height(), 1);
    assert_eq!(tex.image.format(), TextureFormat::Rgba8UnormSrgb);

    let guard = tex.image.data.read();
    assert_eq!(guard.as_ref().expect("pixel data").as_slice(), &[10, 20, 30, 255]);
}

#[test]
fn texture_version_bumps_on_needs_update() {
    let tex = Texture::create_solid_color("flat", [255, 255, 255, 255]);
    assert_eq!(tex.version(), 0);

    tex.needs_update();
    assert_eq!(tex.version(), 1);
}

// ============================================================================
// Mesh
// ============================================================================

#[test]
fn mesh_casts_and_receives_by_default() {
    let assets = AssetServer::new();
    let geometry = assets.geometries.add(Geometry::new_box(1.0, 1.0, 1.0));
    let material = assets.materials.add(Material::new_standard(Vec4::ONE));

    let mesh = Mesh::new(geometry, material);
    assert!(mesh.cast_shadows);
    assert!(mesh.receive_shadows);

    let ground = Mesh::new(geometry, material).with_shadows(false, true);
    assert!(!ground.cast_shadows);
    assert!(ground.receive_shadows);
}
