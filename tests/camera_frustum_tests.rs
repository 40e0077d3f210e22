//! Camera and frustum tests
//!
//! Tests for:
//! - Perspective projection parameters and the [0, 1] depth range
//! - Aspect updates on viewport resize
//! - View-projection assembly from a node's world matrix
//! - Frustum plane extraction and sphere intersection

use glam::{Affine3A, Vec3, Vec4};

use gloam::scene::Camera;
use gloam::scene::camera::Frustum;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Projection parameters
// ============================================================================

#[test]
fn constructor_converts_fov_to_radians() {
    let cam = Camera::new_perspective(60.0, 1.5, 0.1, 100.0);
    assert!(approx(cam.fov, 60.0_f32.to_radians()));
    assert!(approx(cam.aspect, 1.5));
}

#[test]
fn projection_focal_lengths_match_fov_and_aspect() {
    let fov = 45.0_f32;
    let aspect = 800.0 / 600.0;
    let cam = Camera::new_perspective(fov, aspect, 0.1, 100.0);

    let proj = cam.projection_matrix();
    let tan_half = (fov.to_radians() / 2.0).tan();

    assert!(
        approx(proj.y_axis.y, 1.0 / tan_half),
        "vertical focal length: {}",
        proj.y_axis.y
    );
    assert!(
        approx(proj.x_axis.x, 1.0 / (tan_half * aspect)),
        "horizontal focal length: {}",
        proj.x_axis.x
    );
}

#[test]
fn depth_range_is_zero_to_one() {
    let near = 0.1;
    let far = 100.0;
    let cam = Camera::new_perspective(60.0, 1.0, near, far);
    let proj = cam.projection_matrix();

    let at_near = proj * Vec4::new(0.0, 0.0, -near, 1.0);
    assert!(
        approx(at_near.z / at_near.w, 0.0),
        "near plane maps to NDC z=0, got {}",
        at_near.z / at_near.w
    );

    let at_far = proj * Vec4::new(0.0, 0.0, -far, 1.0);
    assert!(
        approx(at_far.z / at_far.w, 1.0),
        "far plane maps to NDC z=1, got {}",
        at_far.z / at_far.w
    );
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn set_aspect_tracks_viewport_resize() {
    // 800x600 window, later resized to 1600x900.
    let mut cam = Camera::new_perspective(60.0, 800.0 / 600.0, 0.1, 100.0);
    let tan_half = (60.0_f32.to_radians() / 2.0).tan();

    cam.set_aspect(1600.0 / 900.0);

    assert!(approx(cam.aspect, 1600.0 / 900.0));
    assert!(
        approx(cam.projection_matrix().x_axis.x, 1.0 / (tan_half * 1600.0 / 900.0)),
        "projection must follow the new aspect"
    );
    // Vertical field of view is unaffected by the resize.
    assert!(approx(cam.projection_matrix().y_axis.y, 1.0 / tan_half));
}

#[test]
fn set_aspect_is_idempotent() {
    let mut cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);

    cam.set_aspect(2.0);
    let first = cam.projection_matrix();

    // Repeated notifications with the same size must change nothing.
    cam.set_aspect(2.0);
    cam.set_aspect(2.0);
    assert_eq!(cam.projection_matrix(), first);
}

// ============================================================================
// View-projection
// ============================================================================

#[test]
fn view_projection_centers_the_look_target() {
    let mut cam = Camera::new_perspective(60.0, 1.0, 0.1, 100.0);

    // Camera parked at +5 on Z, rest orientation looks down -Z.
    let world = Affine3A::from_translation(Vec3::new(0.0, 0.0, 5.0));
    cam.update_view_projection(&world);

    assert_eq!(cam.world_position(), Vec3::new(0.0, 0.0, 5.0));

    let clip = cam.view_projection_matrix() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    assert!(
        approx(ndc_x, 0.0) && approx(ndc_y, 0.0),
        "origin should project to screen center, got ({ndc_x}, {ndc_y})"
    );
}

// ============================================================================
// Frustum
// ============================================================================

fn unit_frustum() -> Frustum {
    // 90 degree cone, square aspect: the frustum walls sit at 45 degrees,
    // so at depth d the visible half-extent is exactly d.
    let cam = Camera::new_perspective(90.0, 1.0, 0.1, 100.0);
    *cam.frustum()
}

#[test]
fn frustum_accepts_sphere_in_front() {
    let frustum = unit_frustum();
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0));
}

#[test]
fn frustum_rejects_sphere_behind_camera() {
    let frustum = unit_frustum();
    assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, 10.0), 1.0));
}

#[test]
fn frustum_rejects_sphere_beyond_far_plane() {
    let frustum = unit_frustum();
    assert!(!frustum.intersects_sphere(Vec3::new(0.0, 0.0, -200.0), 1.0));
}

#[test]
fn frustum_accepts_sphere_straddling_far_plane() {
    let frustum = unit_frustum();
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -102.0), 5.0));
}

#[test]
fn frustum_accepts_sphere_straddling_near_plane() {
    let frustum = unit_frustum();
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, -0.05), 0.2));
}

#[test]
fn frustum_rejects_sphere_far_off_side() {
    let frustum = unit_frustum();
    // At depth 10 the wall is at x=10; a unit sphere at x=50 is well out.
    assert!(!frustum.intersects_sphere(Vec3::new(50.0, 0.0, -10.0), 1.0));
}

#[test]
fn frustum_accepts_giant_enclosing_sphere() {
    let frustum = unit_frustum();
    // Center far outside, but the radius swallows the whole frustum.
    assert!(frustum.intersects_sphere(Vec3::new(0.0, 0.0, 500.0), 1000.0));
}
