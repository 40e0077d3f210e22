//! Environment - plain data.
//!
//! Scene-wide lighting atmosphere: ambient term and optional fog.

use glam::Vec3;

/// Linear fog. Fragments blend toward `color` between `near` and `far`
/// (view-space distance).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    #[must_use]
    pub fn new(color: Vec3, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct Environment {
    /// Ambient light color (pre-multiplied by intensity).
    pub ambient_color: Vec3,
    pub fog: Option<Fog>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ambient_color: Vec3::ZERO,
            fog: None,
        }
    }

    pub fn set_ambient_color(&mut self, color: Vec3) {
        self.ambient_color = color;
    }

    pub fn set_fog(&mut self, fog: Option<Fog>) {
        self.fog = fog;
    }
}
