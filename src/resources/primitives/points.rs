use crate::resources::geometry::{Attribute, Geometry};
use glam::Vec3;
use wgpu::VertexFormat;

/// A point cloud drawn as instanced camera-facing quads: one shared unit
/// quad, one instance per point. The quad is expanded in view space by the
/// points shader.
#[must_use]
pub fn create_points(instance_positions: &[Vec3]) -> Geometry {
    let corners: [[f32; 2]; 4] = [[-0.5, -0.5], [0.5, -0.5], [0.5, 0.5], [-0.5, 0.5]];
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];

    let mut geo = Geometry::new();
    geo.set_attribute(
        "corner",
        Attribute::new_planar(&corners, VertexFormat::Float32x2),
    );
    geo.set_attribute(
        "instance_position",
        Attribute::new_instanced(instance_positions, VertexFormat::Float32x3),
    );
    geo.set_indices(&indices);

    // No "position" attribute, so no bounding volume; point clouds are
    // never frustum culled.
    geo
}
