use glam::Vec3;
use rand::RngExt;

/// A single scatter draw: ground position plus small tilts around Y and Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation_y: f32,
    pub rotation_z: f32,
}

/// One-shot uniform scatter for repeated props (grave stones, rail
/// sleepers, debris). Positions land in a rectangle on the ground plane;
/// rotations get a small uniform jitter so the copies do not line up.
///
/// All draws happen up front at scene-build time. There is no collision
/// avoidance; overlapping instances are accepted.
#[derive(Debug, Clone, Copy)]
pub struct ScatterField {
    pub count: usize,
    /// Extent on X, centered on the origin.
    pub range_x: f32,
    /// Extent on Z, starting at `offset_z`.
    pub range_z: f32,
    pub offset_z: f32,
    /// Rotation jitter extent in radians, centered on zero.
    pub rot_range: f32,
}

impl ScatterField {
    /// The layout the bundled scenes use: 20 props strewn over an
    /// 18 x 6 strip in front of the camera's start point.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 20,
            range_x: 18.0,
            range_z: 6.0,
            offset_z: -9.6,
            rot_range: 0.4,
        }
    }

    /// Draws every placement from `rng`. Inject a seeded generator for
    /// reproducible layouts; an entropy-seeded one for variety per run.
    pub fn sample(&self, rng: &mut impl RngExt) -> Vec<Placement> {
        (0..self.count)
            .map(|_| {
                let z = rng.random_range(0.0..1.0f32) * self.range_z + self.offset_z;
                let x = (rng.random_range(0.0..1.0f32) - 0.5) * self.range_x;
                let rotation_y = (rng.random_range(0.0..1.0f32) - 0.5) * self.rot_range;
                let rotation_z = (rng.random_range(0.0..1.0f32) - 0.5) * self.rot_range;

                Placement {
                    position: Vec3::new(x, 0.0, z),
                    rotation_y,
                    rotation_z,
                }
            })
            .collect()
    }
}

impl Default for ScatterField {
    fn default() -> Self {
        Self::new()
    }
}
