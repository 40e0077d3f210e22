/// Frame rate meter fed with per-frame deltas.
///
/// Accumulates frames until `report_interval` seconds have passed, then
/// yields the average rate over that window. Feeding deltas (instead of
/// reading the clock here) keeps the counter in step with whatever time
/// source drives the frame loop.
pub struct FpsCounter {
    report_interval: f32,
    window_time: f32,
    window_frames: u32,
    fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    /// One report per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(1.0)
    }

    #[must_use]
    pub fn with_interval(seconds: f32) -> Self {
        Self {
            report_interval: seconds.max(0.01),
            window_time: 0.0,
            window_frames: 0,
            fps: 0.0,
        }
    }

    /// Most recent report, 0.0 until the first window completes.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Counts one frame of `dt` seconds. Returns the new average when a
    /// report window just closed, `None` inside a window.
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        self.window_frames += 1;
        self.window_time += dt;

        if self.window_time < self.report_interval {
            return None;
        }

        self.fps = self.window_frames as f32 / self.window_time;
        self.window_time = 0.0;
        self.window_frames = 0;

        Some(self.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut counter = FpsCounter::new();

        // 0.25 is exact in binary: the fourth frame lands on 1.0 sharp.
        for _ in 0..3 {
            assert_eq!(counter.update(0.25), None);
        }
        let fps = counter.update(0.25).expect("window closed");
        assert!((fps - 4.0).abs() < 1e-5, "got {fps}");

        // Counter resets; the next window starts empty.
        assert_eq!(counter.update(0.25), None);
    }

    #[test]
    fn average_spans_the_whole_window() {
        let mut counter = FpsCounter::with_interval(0.5);

        // Mixed frame times: 0.1 + 0.4 closes the 0.5s window at 2 frames.
        assert_eq!(counter.update(0.1), None);
        let fps = counter.update(0.4).expect("window closed");
        assert!((fps - 4.0).abs() < 1e-5, "2 frames over 0.5s, got {fps}");
        assert!((counter.fps() - 4.0).abs() < 1e-5);
    }
}
