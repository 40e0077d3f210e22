//! Transform and hierarchy tests
//!
//! Tests for:
//! - Transform TRS dirty checking
//! - Euler angle round-trips
//! - look_at orientation (and the degenerate straight-up case)
//! - World matrix propagation through the scene graph
//! - Subtree updates and camera view refresh

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use gloam::scene::{Camera, Node, Scene, Transform};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn world_position(scene: &Scene, handle: gloam::scene::NodeHandle) -> Vec3 {
    scene
        .get_node(handle)
        .expect("node exists")
        .transform
        .world_matrix()
        .translation
        .into()
}

// ============================================================================
// Transform unit tests
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
}

#[test]
fn transform_dirty_check_sequence() {
    let mut t = Transform::new();

    // First call always rebuilds (force_update starts set).
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    // Each TRS field triggers exactly one rebuild.
    t.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.rotation = Quat::from_rotation_y(FRAC_PI_4);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.scale = Vec3::splat(2.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());
}

#[test]
fn transform_mark_dirty_forces_rebuild() {
    let mut t = Transform::new();
    t.update_local_matrix();
    assert!(!t.update_local_matrix());

    t.mark_dirty();
    assert!(t.update_local_matrix(), "mark_dirty forces the next rebuild");
}

#[test]
fn transform_local_matrix_carries_translation() {
    let mut t = Transform::new();
    t.position = Vec3::new(5.0, -2.0, 1.0);
    t.update_local_matrix();

    let translation: Vec3 = t.local_matrix().translation.into();
    assert!(vec3_approx(translation, Vec3::new(5.0, -2.0, 1.0)));
}

#[test]
fn transform_euler_round_trip() {
    let mut t = Transform::new();
    t.set_rotation_euler(0.3, -0.7, 1.1);

    let angles = t.rotation_euler();
    assert!(approx_eq(angles.x, 0.3), "x: {}", angles.x);
    assert!(approx_eq(angles.y, -0.7), "y: {}", angles.y);
    assert!(approx_eq(angles.z, 1.1), "z: {}", angles.z);
}

// ============================================================================
// look_at
// ============================================================================

#[test]
fn look_at_down_negative_z_is_identity() {
    let mut t = Transform::new();
    t.position = Vec3::new(0.0, 0.0, 5.0);
    t.look_at(Vec3::ZERO, Vec3::Y);

    // Facing -Z is the rest orientation.
    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, Vec3::NEG_Z));
}

#[test]
fn look_at_faces_target() {
    let mut t = Transform::new();
    t.position = Vec3::new(0.0, 0.0, 0.0);
    t.look_at(Vec3::new(10.0, 0.0, 0.0), Vec3::Y);

    let forward = t.rotation * Vec3::NEG_Z;
    assert!(vec3_approx(forward, Vec3::X), "forward: {forward}");

    let up = t.rotation * Vec3::Y;
    assert!(vec3_approx(up, Vec3::Y), "up stays vertical: {up}");
}

#[test]
fn look_at_straight_down_is_a_no_op() {
    let mut t = Transform::new();
    t.position = Vec3::new(0.0, 5.0, 0.0);
    t.rotation = Quat::from_rotation_y(FRAC_PI_2);
    let before = t.rotation;

    // Forward parallel to up: ambiguous, rotation must stay untouched.
    t.look_at(Vec3::ZERO, Vec3::Y);
    assert_eq!(t.rotation, before);
}

// ============================================================================
// Hierarchy propagation
// ============================================================================

#[test]
fn world_matrix_adds_parent_translation() {
    let mut scene = Scene::new();

    let mut parent = Node::new();
    parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
    let parent_handle = scene.add_node(parent);

    let mut child = Node::new();
    child.transform.position = Vec3::new(0.0, 2.0, 0.0);
    let child_handle = scene.add_to_parent(child, parent_handle);

    scene.update_matrix_world();

    assert!(vec3_approx(
        world_position(&scene, child_handle),
        Vec3::new(1.0, 2.0, 0.0)
    ));
}

#[test]
fn world_matrix_applies_parent_rotation_and_scale() {
    let mut scene = Scene::new();

    let mut parent = Node::new();
    parent.transform.rotation = Quat::from_rotation_y(FRAC_PI_2);
    parent.transform.scale = Vec3::splat(2.0);
    let parent_handle = scene.add_node(parent);

    let mut child = Node::new();
    child.transform.position = Vec3::new(1.0, 0.0, 0.0);
    let child_handle = scene.add_to_parent(child, parent_handle);

    scene.update_matrix_world();

    // +X scaled by 2, then rotated 90 degrees about Y: lands on -Z.
    assert!(
        vec3_approx(
            world_position(&scene, child_handle),
            Vec3::new(0.0, 0.0, -2.0)
        ),
        "got {}",
        world_position(&scene, child_handle)
    );
}

#[test]
fn parent_move_propagates_to_grandchildren() {
    let mut scene = Scene::new();

    let root = scene.add_node(Node::new());
    let mid = scene.add_to_parent(Node::new(), root);
    let mut leaf_node = Node::new();
    leaf_node.transform.position = Vec3::new(0.0, 0.0, 3.0);
    let leaf = scene.add_to_parent(leaf_node, mid);

    scene.update_matrix_world();
    assert!(vec3_approx(
        world_position(&scene, leaf),
        Vec3::new(0.0, 0.0, 3.0)
    ));

    scene
        .get_node_mut(root)
        .unwrap()
        .transform
        .position = Vec3::new(7.0, 0.0, 0.0);
    scene.update_matrix_world();

    assert!(vec3_approx(
        world_position(&scene, leaf),
        Vec3::new(7.0, 0.0, 3.0)
    ));
}

#[test]
fn update_subtree_skips_siblings() {
    let mut scene = Scene::new();

    let mut a_node = Node::new();
    a_node.transform.position = Vec3::new(1.0, 0.0, 0.0);
    let a = scene.add_node(a_node);

    let mut b_node = Node::new();
    b_node.transform.position = Vec3::new(2.0, 0.0, 0.0);
    let b = scene.add_node(b_node);

    // Only refresh subtree a. Sibling b keeps its identity world matrix.
    scene.update_subtree(a);

    assert!(vec3_approx(
        world_position(&scene, a),
        Vec3::new(1.0, 0.0, 0.0)
    ));
    assert!(
        vec3_approx(world_position(&scene, b), Vec3::ZERO),
        "sibling must remain stale until the full pass"
    );
}

#[test]
fn attach_reparents_with_fresh_world_matrix() {
    let mut scene = Scene::new();

    let mut parent_node = Node::new();
    parent_node.transform.position = Vec3::new(0.0, 10.0, 0.0);
    let parent = scene.add_node(parent_node);

    let mut drifter_node = Node::new();
    drifter_node.transform.position = Vec3::new(1.0, 0.0, 0.0);
    let drifter = scene.add_node(drifter_node);

    scene.update_matrix_world();
    assert!(vec3_approx(
        world_position(&scene, drifter),
        Vec3::new(1.0, 0.0, 0.0)
    ));

    scene.attach(drifter, parent);
    scene.update_matrix_world();

    assert!(vec3_approx(
        world_position(&scene, drifter),
        Vec3::new(1.0, 10.0, 0.0)
    ));
}

// ============================================================================
// Camera refresh through the hierarchy pass
// ============================================================================

#[test]
fn hierarchy_pass_refreshes_camera_view() {
    let mut scene = Scene::new();

    let cam_handle = scene.add_camera(Camera::new_perspective(60.0, 1.0, 0.1, 100.0));
    scene.active_camera = Some(cam_handle);

    if let Some(node) = scene.get_node_mut(cam_handle) {
        node.transform.position = Vec3::new(0.0, 0.0, 5.0);
    }
    scene.update_matrix_world();

    let (_, camera) = scene.query_main_camera_bundle().expect("camera bundle");

    // View matrix is the inverse of the world matrix: camera at +5 on Z
    // maps that point to the view-space origin.
    let origin_in_view = camera.view_matrix().transform_point3(Vec3::new(0.0, 0.0, 5.0));
    assert!(
        vec3_approx(origin_in_view, Vec3::ZERO),
        "got {origin_in_view}"
    );
}
