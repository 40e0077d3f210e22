//! Geometry and primitive tests
//!
//! Tests for:
//! - Primitive generators (box, plane, sphere, cone, point cloud)
//! - Attribute layout: formats, strides, step modes
//! - Index buffer format selection
//! - Bounding volume computation

use glam::Vec3;
use wgpu::{VertexFormat, VertexStepMode};

use gloam::resources::Geometry;
use gloam::resources::geometry::Attribute;
use gloam::resources::primitives::{
    ConeOptions, PlaneOptions, SphereOptions, create_cone, create_plane, create_points,
    create_sphere,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

// ============================================================================
// Box
// ============================================================================

#[test]
fn box_has_four_vertices_per_face() {
    let geo = Geometry::new_box(1.0, 1.0, 1.0);

    let positions = geo.get_attribute("position").expect("position attribute");
    assert_eq!(positions.count, 24);
    assert_eq!(positions.format, VertexFormat::Float32x3);

    let indices = geo.index_attribute().expect("index buffer");
    assert_eq!(indices.count, 36, "6 faces x 2 triangles x 3 indices");
}

#[test]
fn box_normals_are_unit_axis_vectors() {
    let geo = Geometry::new_box(2.0, 4.0, 6.0);
    let normals = geo.get_attribute("normal").expect("normal attribute");

    for i in 0..normals.count {
        let n = normals.read_vec3(i).expect("readable normal");
        assert!(approx(n.length(), 1.0), "normal {i} not unit: {n}");
        // Axis-aligned: exactly one nonzero component.
        let nonzero = [n.x, n.y, n.z].iter().filter(|c| c.abs() > 0.5).count();
        assert_eq!(nonzero, 1, "normal {i} not axis aligned: {n}");
    }
}

#[test]
fn box_bounds_match_half_extents() {
    let geo = Geometry::new_box(2.0, 4.0, 6.0);

    let bbox = geo.bounding_box.borrow().expect("bounding box");
    assert!(vec3_approx(bbox.min, Vec3::new(-1.0, -2.0, -3.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(1.0, 2.0, 3.0)));
    assert!(vec3_approx(bbox.center(), Vec3::ZERO));
    assert!(vec3_approx(bbox.size(), Vec3::new(2.0, 4.0, 6.0)));

    let sphere = geo.bounding_sphere.borrow().expect("bounding sphere");
    // Radius reaches the corner: half the diagonal.
    let half_diagonal = Vec3::new(1.0, 2.0, 3.0).length();
    assert!(approx(sphere.radius, half_diagonal));
}

// ============================================================================
// Plane
// ============================================================================

#[test]
fn plane_vertex_count_follows_segments() {
    let geo = create_plane(PlaneOptions {
        width: 10.0,
        height: 10.0,
        width_segments: 4,
        height_segments: 3,
    });

    let positions = geo.get_attribute("position").expect("position attribute");
    assert_eq!(positions.count, 5 * 4, "(w_seg+1) * (h_seg+1)");

    let indices = geo.index_attribute().expect("index buffer");
    assert_eq!(indices.count, 4 * 3 * 6, "two triangles per cell");
}

#[test]
fn plane_faces_positive_z() {
    let geo = create_plane(PlaneOptions::default());
    let normals = geo.get_attribute("normal").expect("normal attribute");

    for i in 0..normals.count {
        let n = normals.read_vec3(i).expect("readable normal");
        assert!(vec3_approx(n, Vec3::Z), "normal {i}: {n}");
    }
}

#[test]
fn plane_positions_span_the_extent() {
    let geo = create_plane(PlaneOptions {
        width: 6.0,
        height: 2.0,
        ..Default::default()
    });

    let bbox = geo.bounding_box.borrow().expect("bounding box");
    assert!(vec3_approx(bbox.min, Vec3::new(-3.0, -1.0, 0.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(3.0, 1.0, 0.0)));
}

// ============================================================================
// Sphere
// ============================================================================

#[test]
fn sphere_vertex_grid_and_radius() {
    let geo = create_sphere(SphereOptions {
        radius: 2.0,
        width_segments: 8,
        height_segments: 6,
    });

    let positions = geo.get_attribute("position").expect("position attribute");
    assert_eq!(positions.count, 9 * 7, "(w_seg+1) * (h_seg+1)");

    for i in 0..positions.count {
        let p = positions.read_vec3(i).expect("readable position");
        assert!(
            approx(p.length(), 2.0),
            "vertex {i} off the sphere surface: |{p}| = {}",
            p.length()
        );
    }

    // Large spheres need u32 indices; the generator always emits them.
    let indices = geo.index_attribute().expect("index buffer");
    assert_eq!(indices.format, VertexFormat::Uint32);
    assert_eq!(indices.stride, 4);
}

// ============================================================================
// Cone
// ============================================================================

#[test]
fn cone_spans_base_to_apex() {
    let geo = create_cone(ConeOptions {
        radius: 3.0,
        height: 2.0,
        radial_segments: 4,
    });

    let bbox = geo.bounding_box.borrow().expect("bounding box");
    assert!(approx(bbox.min.y, -1.0), "base at -height/2: {}", bbox.min.y);
    assert!(approx(bbox.max.y, 1.0), "apex at +height/2: {}", bbox.max.y);
    assert!(approx(bbox.max.x, 3.0), "base ring radius: {}", bbox.max.x);
}

#[test]
fn cone_normals_are_unit_length() {
    let geo = create_cone(ConeOptions::default());
    let normals = geo.get_attribute("normal").expect("normal attribute");

    for i in 0..normals.count {
        let n = normals.read_vec3(i).expect("readable normal");
        assert!(approx(n.length(), 1.0), "normal {i}: |{n}| = {}", n.length());
    }
}

// ============================================================================
// Point cloud
// ============================================================================

#[test]
fn points_use_instanced_positions() {
    let drops = vec![
        Vec3::new(0.0, 5.0, 0.0),
        Vec3::new(1.0, 3.0, -2.0),
        Vec3::new(-4.0, 8.0, 1.0),
    ];
    let geo = create_points(&drops);

    let corner = geo.get_attribute("corner").expect("corner attribute");
    assert_eq!(corner.format, VertexFormat::Float32x2);
    assert_eq!(corner.count, 4, "one shared quad");
    assert_eq!(corner.step_mode, VertexStepMode::Vertex);

    let instances = geo
        .get_attribute("instance_position")
        .expect("instance attribute");
    assert_eq!(instances.format, VertexFormat::Float32x3);
    assert_eq!(instances.count, 3, "one instance per point");
    assert_eq!(instances.step_mode, VertexStepMode::Instance);

    let indices = geo.index_attribute().expect("index buffer");
    assert_eq!(indices.count, 6, "two triangles for the quad");
}

#[test]
fn points_have_no_bounding_volume() {
    let geo = create_points(&[Vec3::ZERO]);

    // No "position" attribute: the cloud opts out of frustum culling.
    assert!(geo.get_attribute("position").is_none());
    assert!(geo.bounding_box.borrow().is_none());
    assert!(geo.bounding_sphere.borrow().is_none());
}

// ============================================================================
// Raw attribute and index management
// ============================================================================

#[test]
fn set_indices_u16_layout() {
    let mut geo = Geometry::new();
    geo.set_indices(&[0u16, 1, 2, 2, 1, 3]);

    let indices = geo.index_attribute().expect("index buffer");
    assert_eq!(indices.count, 6);
    assert_eq!(indices.format, VertexFormat::Uint16);
    assert_eq!(indices.stride, 2);
    assert_eq!(indices.data.len(), 12, "6 indices x 2 bytes");
}

#[test]
fn attribute_read_vec3_round_trip() {
    let data = [[1.0f32, 2.0, 3.0], [-4.0, 5.5, 0.25]];
    let attr = Attribute::new_planar(&data, VertexFormat::Float32x3);

    assert_eq!(attr.count, 2);
    assert_eq!(attr.stride, 12);
    assert!(vec3_approx(attr.read_vec3(0).unwrap(), Vec3::new(1.0, 2.0, 3.0)));
    assert!(vec3_approx(attr.read_vec3(1).unwrap(), Vec3::new(-4.0, 5.5, 0.25)));
    assert!(attr.read_vec3(2).is_none(), "out of range reads return None");
}

#[test]
fn compute_bounding_volume_needs_positions() {
    let geo = Geometry::new();
    geo.compute_bounding_volume();

    assert!(geo.bounding_box.borrow().is_none());
    assert!(geo.bounding_sphere.borrow().is_none());
}
