//! GPU uniform block definitions.
//!
//! Every struct here has a WGSL mirror in `shaders/`; the field order,
//! padding, and total size must match the WGSL std140-style layout exactly.
//! The `layout` tests at the bottom pin the sizes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};

/// Capacity of the light array in the global bind group.
pub const MAX_LIGHTS: usize = 8;

// Light type tags, shared with the WGSL side.
pub const LIGHT_DIRECTIONAL: u32 = 0;
pub const LIGHT_POINT: u32 = 1;
pub const LIGHT_SPOT: u32 = 2;

/// Per-frame globals (group 0, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: Mat4, // 64
    pub view_matrix: Mat4,     // 64

    // 16 bytes chunk
    pub camera_position: Vec3,
    pub time: f32,

    // 16 bytes chunk
    pub ambient_light: Vec3,
    pub num_lights: u32,

    // 16 bytes chunk
    pub fog_color: Vec3,
    pub fog_near: f32,

    // 16 bytes chunk (fog disabled when far <= near)
    pub fog_far: f32,
    pub _padding: [f32; 3],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            time: 0.0,
            ambient_light: Vec3::ZERO,
            num_lights: 0,
            fog_color: Vec3::ZERO,
            fog_near: 0.0,
            fog_far: 0.0,
            _padding: [0.0; 3],
        }
    }
}

/// One light in the global light array (group 0, binding 1).
///
/// `shadow_layer_index` is -1 for lights without a shadow map layer;
/// `shadow_matrix` is only meaningful when the index is >= 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuLight {
    // 16 bytes chunk 0
    pub color: Vec3,
    pub intensity: f32,

    // 16 bytes chunk 1
    pub position: Vec3,
    pub range: f32,

    // 16 bytes chunk 2
    pub direction: Vec3,
    pub light_type: u32,

    // 16 bytes chunk 3
    pub inner_cone_cos: f32,
    pub outer_cone_cos: f32,
    pub shadow_layer_index: i32,
    pub shadow_bias: f32,

    // 16 bytes chunk 4
    pub shadow_normal_bias: f32,
    pub _padding: [f32; 3],

    pub shadow_matrix: Mat4, // 64
}

impl Default for GpuLight {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            intensity: 0.0,
            position: Vec3::ZERO,
            range: 0.0,
            direction: Vec3::NEG_Z,
            light_type: LIGHT_DIRECTIONAL,
            inner_cone_cos: 0.0,
            outer_cone_cos: 0.0,
            shadow_layer_index: -1,
            shadow_bias: 0.0,
            shadow_normal_bias: 0.0,
            _padding: [0.0; 3],
            shadow_matrix: Mat4::IDENTITY,
        }
    }
}

/// Per-object dynamic uniforms (group 2, binding 0).
///
/// Sized to the 256 byte dynamic offset stride the WebGPU default limits
/// guarantee, so a packed `Vec<ModelUniforms>` uploads in one write and
/// `index * size_of` is a valid dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniforms {
    pub world_matrix: Mat4, // 64
    /// Inverse-transpose of the world matrix; only the upper 3x3 is used.
    pub normal_matrix: Mat4, // 64

    /// Nonzero when the mesh samples the shadow map.
    pub receives_shadows: u32,
    pub _padding: [u32; 31], // pad to 256
}

impl Default for ModelUniforms {
    fn default() -> Self {
        Self {
            world_matrix: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            receives_shadows: 1,
            _padding: [0; 31],
        }
    }
}

/// Unlit material uniforms (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BasicUniforms {
    pub color: Vec4, // 16

    pub opacity: f32,
    pub _padding: [f32; 3], // 4 + 12 = 16

    pub map_transform: [[f32; 4]; 3], // mat3x3<f32>, 48
}

impl Default for BasicUniforms {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            opacity: 1.0,
            _padding: [0.0; 3],
            map_transform: mat3_to_gpu(Mat3::IDENTITY),
        }
    }
}

/// Lit material uniforms (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct StandardUniforms {
    pub color: Vec4, // 16

    // 16 bytes chunk
    pub emissive: Vec3,
    pub roughness: f32,

    // 16 bytes chunk
    pub metalness: f32,
    pub opacity: f32,
    pub _padding: [f32; 2],

    pub map_transform: [[f32; 4]; 3], // mat3x3<f32>, 48
}

impl Default for StandardUniforms {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            _padding: [0.0; 2],
            map_transform: mat3_to_gpu(Mat3::IDENTITY),
        }
    }
}

/// Point sprite material uniforms (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointsUniforms {
    pub color: Vec4, // 16

    // 16 bytes chunk
    pub size: f32,
    pub fall_speed: f32,
    pub area_height: f32,
    pub _padding: f32,
}

impl Default for PointsUniforms {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            size: 0.1,
            fall_speed: 0.0,
            area_height: 1.0,
            _padding: 0.0,
        }
    }
}

/// Converts a `Mat3` to the column layout of a WGSL `mat3x3<f32>`,
/// which stores each column padded to 16 bytes.
#[must_use]
pub fn mat3_to_gpu(m: Mat3) -> [[f32; 4]; 3] {
    [
        [m.x_axis.x, m.x_axis.y, m.x_axis.z, 0.0],
        [m.y_axis.x, m.y_axis.y, m.y_axis.z, 0.0],
        [m.z_axis.x, m.z_axis.y, m.z_axis.z, 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn layout_matches_wgsl() {
        // Sizes the WGSL structs are written against.
        assert_eq!(mem::size_of::<GlobalUniforms>(), 192);
        assert_eq!(mem::size_of::<GpuLight>(), 144);
        assert_eq!(mem::size_of::<ModelUniforms>(), 256);
        assert_eq!(mem::size_of::<BasicUniforms>(), 80);
        assert_eq!(mem::size_of::<StandardUniforms>(), 96);
        assert_eq!(mem::size_of::<PointsUniforms>(), 32);
    }

    #[test]
    fn mat3_gpu_columns() {
        let m = Mat3::from_cols(
            glam::Vec3::new(1.0, 2.0, 3.0),
            glam::Vec3::new(4.0, 5.0, 6.0),
            glam::Vec3::new(7.0, 8.0, 9.0),
        );
        let gpu = mat3_to_gpu(m);
        assert_eq!(gpu[0], [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(gpu[1], [4.0, 5.0, 6.0, 0.0]);
        assert_eq!(gpu[2], [7.0, 8.0, 9.0, 0.0]);
    }
}
