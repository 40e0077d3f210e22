use crate::resources::geometry::{Attribute, Geometry};
use glam::Vec3;
use wgpu::VertexFormat;

// Per face: (tangent u, tangent v, outward normal). `u cross v == normal`,
// so the 0-1-2 / 0-2-3 index pattern winds CCW seen from outside.
const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
];

// Corner order per face: (sign u, sign v, uv).
const CORNERS: [(f32, f32, [f32; 2]); 4] = [
    (-1.0, -1.0, [0.0, 1.0]),
    (1.0, -1.0, [1.0, 1.0]),
    (1.0, 1.0, [1.0, 0.0]),
    (-1.0, 1.0, [0.0, 0.0]),
];

/// An axis-aligned box centered at the origin, 4 vertices per face.
#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) * 0.5;

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);

    for (u, v, dir) in FACES {
        let u = Vec3::from_array(u);
        let v = Vec3::from_array(v);
        let dir = Vec3::from_array(dir);

        for (su, sv, uv) in CORNERS {
            let corner = (dir + u * su + v * sv) * half;
            positions.push(corner.to_array());
            normals.push(dir.to_array());
            uvs.push(uv);
        }
    }

    let indices: Vec<u16> = (0..6u16)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

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
