use std::time::{Duration, Instant};

/// Frame clock for the event loop.
///
/// One `tick` per frame; everything inside that frame reads the same
/// delta. A single tick never reports more than `MAX_DELTA`, so a stall
/// (window drag, breakpoint) comes out as one capped step instead of a
/// giant one.
pub struct Timer {
    previous: Instant,
    delta: Duration,
    frames: u64,
}

/// Upper bound on the delta a single tick may report.
const MAX_DELTA: Duration = Duration::from_millis(250);

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
            delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Advances the clock to now.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.previous).min(MAX_DELTA);
        self.previous = now;
        self.frames += 1;
    }

    /// Delta of the latest tick, in seconds.
    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
