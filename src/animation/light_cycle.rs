use crate::scene::Light;

/// Periodic on/off driver for a light's intensity.
///
/// The desired state is re-derived from elapsed time every frame
/// (`t mod period`, on during the first half), but the intensity itself is
/// written only when the state flips. Intensity writes are treated as
/// observable side effects, so skipping the redundant ones is part of the
/// contract, not just an optimization.
#[derive(Debug, Clone)]
pub struct LightCycle {
    /// Full on+off cycle length in seconds.
    pub period: f32,
    pub on_intensity: f32,
    pub off_intensity: f32,

    lit: bool,
}

impl LightCycle {
    /// 3 second cycle: 1.5 s on, 1.5 s off. Assumes the light starts in
    /// the on state, which is where the phase computation begins.
    #[must_use]
    pub fn new() -> Self {
        Self {
            period: 3.0,
            on_intensity: 10.0,
            off_intensity: 0.0,
            lit: true,
        }
    }

    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Syncs the light with the cycle at elapsed time `t`. Writes the
    /// intensity only on an on/off transition; returns whether a write
    /// happened.
    pub fn update(&mut self, light: &mut Light, t: f32) -> bool {
        let phase = t % self.period;
        // Strict: the half-period boundary itself counts as off.
        let want_lit = phase < self.period / 2.0;

        if want_lit == self.lit {
            return false;
        }

        self.lit = want_lit;
        light.intensity = if want_lit {
            self.on_intensity
        } else {
            self.off_intensity
        };

        true
    }
}

impl Default for LightCycle {
    fn default() -> Self {
        Self::new()
    }
}
