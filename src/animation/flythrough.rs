use crate::scene::Transform;
use glam::Vec3;

/// One-shot scripted camera ride: a linear path followed for a fixed
/// duration, then frozen forever.
///
/// While active, each call recomputes the position as a pure function of
/// elapsed time, so the path is frame-rate independent. The freeze check
/// runs after the write: the first frame past the deadline still applies
/// its update, and nothing re-arms the ride afterwards. Orbit-style
/// controllers can keep steering the camera once the ride is over (or even
/// during it, if they re-derive their state from the written position).
#[derive(Debug, Clone)]
pub struct Flythrough {
    /// Sideways speed; the path moves toward -X.
    pub k_x: f32,
    /// Climb speed.
    pub k_y: f32,
    /// Starting distance on the Z axis.
    pub z_start: f32,
    /// Approach speed along -Z.
    pub k_z: f32,
    /// Seconds until the ride freezes.
    pub duration: f32,

    active: bool,
}

impl Flythrough {
    /// Standard approach path. `k_y` picks how steep the climb is; the
    /// bundled scenes use 1.3 or 0.7.
    #[must_use]
    pub fn new(k_y: f32) -> Self {
        Self {
            k_x: 1.3,
            k_y,
            z_start: 40.0,
            k_z: 6.0,
            duration: 5.0,
            active: true,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the ride for elapsed time `t` (seconds since start),
    /// writing the camera node's position while active. Returns whether a
    /// write happened; after the freeze the transform is never touched
    /// again.
    pub fn update(&mut self, transform: &mut Transform, t: f32) -> bool {
        if !self.active {
            return false;
        }

        transform.position = Vec3::new(
            -self.k_x * t,
            self.k_y * t,
            self.z_start - self.k_z * t,
        );

        // Strict comparison, checked after the write: the crossing frame
        // still gets its update.
        if t > self.duration {
            self.active = false;
        }

        true
    }
}

impl Default for Flythrough {
    fn default() -> Self {
        Self::new(1.3)
    }
}
