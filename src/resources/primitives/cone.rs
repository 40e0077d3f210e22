use crate::resources::geometry::{Attribute, Geometry};
use std::f32::consts::PI;
use wgpu::VertexFormat;

pub struct ConeOptions {
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u32,
}

impl Default for ConeOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 1.0,
            radial_segments: 16,
        }
    }
}

/// A cone centered at the origin, apex up. Low `radial_segments` double as
/// pyramids (4 segments gives a square pyramid).
#[must_use]
pub fn create_cone(options: ConeOptions) -> Geometry {
    let radius = options.radius;
    let height = options.height;
    let segments = options.radial_segments.max(3);

    let half_height = height / 2.0;
    // Slant length, for the lateral surface normals.
    let slant = (radius * radius + height * height).sqrt();
    let normal_y = radius / slant;
    let normal_xz = height / slant;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    let angle_at = |i: f32| i / segments as f32 * 2.0 * PI;

    // Lateral base ring. Same longitude convention as the sphere.
    for i in 0..=segments {
        let u_ratio = i as f32 / segments as f32;
        let phi = angle_at(i as f32);

        positions.push([-radius * phi.cos(), -half_height, radius * phi.sin()]);
        normals.push([-normal_xz * phi.cos(), normal_y, normal_xz * phi.sin()]);
        uvs.push([u_ratio, 1.0]);
    }

    // One apex vertex per segment so each gets the mid-angle normal.
    let apex_start = positions.len() as u16;
    for i in 0..segments {
        let phi = angle_at(i as f32 + 0.5);

        positions.push([0.0, half_height, 0.0]);
        normals.push([-normal_xz * phi.cos(), normal_y, normal_xz * phi.sin()]);
        uvs.push([(i as f32 + 0.5) / segments as f32, 0.0]);
    }

    for i in 0..segments as u16 {
        indices.push(i);
        indices.push(i + 1);
        indices.push(apex_start + i);
    }

    // Base cap: duplicated ring with down normals and a center fan.
    let cap_start = positions.len() as u16;
    for i in 0..=segments {
        let phi = angle_at(i as f32);
        let px = -radius * phi.cos();
        let pz = radius * phi.sin();

        positions.push([px, -half_height, pz]);
        normals.push([0.0, -1.0, 0.0]);
        uvs.push([px / (2.0 * radius) + 0.5, pz / (2.0 * radius) + 0.5]);
    }

    let center = positions.len() as u16;
    positions.push([0.0, -half_height, 0.0]);
    normals.push([0.0, -1.0, 0.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..segments as u16 {
        indices.push(center);
        indices.push(cap_start + i + 1);
        indices.push(cap_start + i);
    }

    let mut geo = Geometry::new();
    geo.set_attribute(
        "position",
        Attribute::new_planar(&positions, VertexFormat::Float32x3),
    );
    geo.set_attribute(
        "normal",
        Attribute::new_planar(&normals, VertexFormat::Float32x3),
    );
    geo.set_attribute("uv", Attribute::new_planar(&uvs, VertexFormat::Float32x2));
    geo.set_indices(&indices);
    geo.compute_bounding_volume();

    geo
}
