use web_time::{Duration, Instant};

/// Frame counter with smoothed FPS and optional frame limiting.
pub struct FrameTiming {
    /// Minimum frame duration (zero = unlimited)
    min_frame_duration: Duration,
    /// Last frame timestamp
    last_frame: Instant,
    /// Frames completed so far
    frames: u64,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            min_frame_duration,
            last_frame: Instant::now(),
            frames: 0,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Whether enough time has passed since the last frame to render. The
    /// first frame is always due.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.frames == 0
            || self.min_frame_duration.is_zero()
            || self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Call after rendering to update timing.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frames += 1;

        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
    }

    /// Current FPS (smoothed).
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Number of completed frames.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_renders() {
        let timing = FrameTiming::new(0);
        assert!(timing.should_render());
    }

    #[test]
    fn limited_waits_for_frame_budget() {
        let mut timing = FrameTiming::new(1);
        assert!(timing.should_render());
        timing.end_frame();
        assert!(!timing.should_render());
        assert_eq!(timing.frames(), 1);
    }
}
