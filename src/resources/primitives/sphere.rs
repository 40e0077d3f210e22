use crate::resources::geometry::{Attribute, Geometry};
use std::f32::consts::PI;
use wgpu::VertexFormat;

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// A UV sphere centered at the origin, poles on the Y axis.
#[must_use]
pub fn create_sphere(options: SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        // Latitude runs 0..PI, south pole first.
        let theta = v_ratio * PI;

        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = u_ratio * 2.0 * PI;

            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            positions.push([px, py, pz]);
            normals.push([px / radius, py / radius, pz / radius]);
            uvs.push([u_ratio, 1.0 - v_ratio]);
        }
    }

    // Two triangles per grid cell. The degenerate ones touching the poles
    // are kept; the GPU discards them.
    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            indices.push(v0);
            indices.push(v1);
            indices.push(v2);

            indices.push(v1);
            indices.push(v3);
            indices.push(v2);
        }
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
    // u32 indices: a 256x256 sphere already overflows u16.
    geo.set_indices_u32(&indices);
    geo.compute_bounding_volume();

    geo
}
