//! Shadow math tests
//!
//! Tests for:
//! - Light view-projection construction (directional, spot, point)
//! - Degenerate direction handling
//! - Shadow configuration defaults

use glam::{Mat4, Vec3, Vec4};

use gloam::renderer::RendererSettings;
use gloam::renderer::shadow::build_light_vp;
use gloam::scene::{Light, LightKind};
use gloam::scene::light::ShadowConfig;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Projects a world point and returns NDC coordinates.
fn project(vp: Mat4, point: Vec3) -> Vec3 {
    let clip = vp * Vec4::new(point.x, point.y, point.z, 1.0);
    Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w)
}

// ============================================================================
// Directional lights
// ============================================================================

#[test]
fn directional_vp_centers_the_origin() {
    let vp = build_light_vp(&LightKind::Directional, Vec3::ZERO, Vec3::new(-1.0, -1.0, -0.5));

    let ndc = project(vp, Vec3::ZERO);
    assert!(approx(ndc.x, 0.0), "x: {}", ndc.x);
    assert!(approx(ndc.y, 0.0), "y: {}", ndc.y);
    assert!(
        ndc.z > 0.0 && ndc.z < 1.0,
        "origin must sit inside the depth range, got {}",
        ndc.z
    );
}

#[test]
fn directional_vp_covers_the_scene_extent() {
    // Straight-down sun over a wide ground plane.
    let vp = build_light_vp(&LightKind::Directional, Vec3::ZERO, Vec3::NEG_Y);

    for x in [-20.0, 0.0, 20.0] {
        let ndc = project(vp, Vec3::new(x, 0.0, 0.0));
        assert!(
            ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z),
            "point at x={x} fell outside the ortho volume: {ndc}"
        );
    }
}

#[test]
fn directional_vp_orders_depth_along_the_ray() {
    let dir = Vec3::new(0.0, -1.0, -1.0);
    let vp = build_light_vp(&LightKind::Directional, Vec3::ZERO, dir);

    let near_light = project(vp, -dir.normalize() * 10.0);
    let far_light = project(vp, dir.normalize() * 10.0);
    assert!(
        near_light.z < far_light.z,
        "depth must grow along the light ray: {} vs {}",
        near_light.z,
        far_light.z
    );
}

#[test]
fn directional_vp_normalizes_the_direction() {
    let a = build_light_vp(&LightKind::Directional, Vec3::ZERO, Vec3::new(0.0, -3.0, -3.0));
    let b = build_light_vp(
        &LightKind::Directional,
        Vec3::ZERO,
        Vec3::new(0.0, -3.0, -3.0).normalize(),
    );

    let pa = project(a, Vec3::new(1.0, 2.0, 3.0));
    let pb = project(b, Vec3::new(1.0, 2.0, 3.0));
    assert!(approx(pa.x, pb.x) && approx(pa.y, pb.y) && approx(pa.z, pb.z));
}

#[test]
fn zero_direction_still_produces_finite_matrix() {
    let vp = build_light_vp(&LightKind::Directional, Vec3::ZERO, Vec3::ZERO);
    assert!(vp.is_finite(), "fallback direction must keep the matrix usable");

    let ndc = project(vp, Vec3::ZERO);
    assert!(ndc.x.is_finite() && ndc.y.is_finite() && ndc.z.is_finite());
}

#[test]
fn straight_down_direction_uses_fallback_up() {
    // look_at with up parallel to the view direction degenerates; the
    // builder swaps in +X as up before that can happen.
    let vp = build_light_vp(&LightKind::Directional, Vec3::ZERO, Vec3::NEG_Y);
    assert!(vp.is_finite());

    let ndc = project(vp, Vec3::new(5.0, 0.0, 5.0));
    assert!(ndc.x.is_finite() && ndc.y.is_finite());
}

// ============================================================================
// Spot lights
// ============================================================================

fn lamp_kind() -> LightKind {
    LightKind::Spot {
        range: 20.0,
        inner_cone: 0.3,
        outer_cone: 0.5,
    }
}

#[test]
fn spot_vp_centers_the_cone_axis() {
    let position = Vec3::new(0.0, 5.0, 0.0);
    let direction = Vec3::new(0.0, -1.0, 1.0).normalize();
    let vp = build_light_vp(&lamp_kind(), position, direction);

    let on_axis = project(vp, position + direction * 10.0);
    assert!(approx(on_axis.x, 0.0), "x: {}", on_axis.x);
    assert!(approx(on_axis.y, 0.0), "y: {}", on_axis.y);
}

#[test]
fn spot_vp_frustum_matches_outer_cone() {
    let position = Vec3::ZERO;
    let direction = Vec3::NEG_Z;
    let vp = build_light_vp(&lamp_kind(), position, direction);

    // The half fov equals the outer cone angle, so a point on the cone
    // boundary projects to the NDC edge.
    let outer = 0.5_f32;
    let depth = 10.0;
    let edge = Vec3::new(depth * outer.tan(), 0.0, -depth);

    let ndc = project(vp, edge);
    assert!(
        approx(ndc.x.abs(), 1.0),
        "cone edge should land on |x|=1, got {}",
        ndc.x
    );
}

#[test]
fn spot_vp_range_bounds_the_depth() {
    let position = Vec3::ZERO;
    let vp = build_light_vp(&lamp_kind(), position, Vec3::NEG_Z);

    let at_range = project(vp, Vec3::new(0.0, 0.0, -20.0));
    assert!(approx(at_range.z, 1.0), "range maps to depth 1, got {}", at_range.z);

    let half_way = project(vp, Vec3::new(0.0, 0.0, -10.0));
    assert!(half_way.z < at_range.z);
}

#[test]
fn spot_vp_depends_on_position() {
    let a = build_light_vp(&lamp_kind(), Vec3::ZERO, Vec3::NEG_Z);
    let b = build_light_vp(&lamp_kind(), Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

    let pa = project(a, Vec3::new(0.0, 0.0, -10.0));
    let pb = project(b, Vec3::new(0.0, 0.0, -10.0));
    assert!(
        !approx(pa.z, pb.z),
        "moving the lamp must move the depth mapping"
    );
}

// ============================================================================
// Point lights
// ============================================================================

#[test]
fn point_lights_never_build_a_shadow_matrix() {
    let vp = build_light_vp(&LightKind::Point { range: 10.0 }, Vec3::ONE, Vec3::NEG_Z);
    assert_eq!(vp, Mat4::IDENTITY);
}

// ============================================================================
// Configuration defaults
// ============================================================================

#[test]
fn shadow_config_defaults() {
    let config = ShadowConfig::default();
    assert!(approx(config.bias, 0.005));
    assert!(approx(config.normal_bias, 0.02));
    assert_eq!(config.map_size, 1024);
}

#[test]
fn lights_do_not_cast_until_asked() {
    let plain = Light::new_directional(Vec3::ONE, 1.0);
    assert!(!plain.cast_shadows);

    let caster = Light::new_directional(Vec3::ONE, 1.0).with_shadows();
    assert!(caster.cast_shadows);
    assert!(caster.shadow.is_some(), "config present for when casting starts");
}

#[test]
fn renderer_settings_shadow_defaults() {
    let settings = RendererSettings::default();
    assert_eq!(settings.max_shadow_casters, 4);
    assert_eq!(settings.shadow_map_size, 1024);
    assert!(approx(settings.max_pixel_ratio, 2.0));
}
