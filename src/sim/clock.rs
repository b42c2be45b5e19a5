//! Frame clock
//!
//! Turns host timestamps (e.g. `requestAnimationFrame` milliseconds) into
//! the `(elapsed, delta)` pair every component ticks with.

/// Clock reading for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the clock's first frame
    pub elapsed: f32,
    /// Seconds since the previous frame (unclamped; integrators clamp)
    pub delta: f32,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: f64,
    current: FrameTime,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start_ms: None,
            last_ms: 0.0,
            current: FrameTime::default(),
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }

    pub fn now(&self) -> FrameTime {
        self.current
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Advance to host timestamp `now_ms`.
    ///
    /// Timestamps that go backwards or are not finite produce a zero delta
    /// and leave elapsed time unchanged.
    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        if !now_ms.is_finite() {
            self.current.delta = 0.0;
            return self.current;
        }
        let Some(start) = self.start_ms else {
            self.start_ms = Some(now_ms);
            self.last_ms = now_ms;
            self.current = FrameTime::default();
            return self.current;
        };

        let delta_ms = (now_ms - self.last_ms).max(0.0);
        self.last_ms = self.last_ms.max(now_ms);
        self.current = FrameTime {
            elapsed: ((self.last_ms - start) / 1000.0) as f32,
            delta: (delta_ms / 1000.0) as f32,
        };
        self.track_fps(now_ms);
        self.current
    }

    /// Advance by a fixed step in seconds (headless runs and tests)
    pub fn step(&mut self, dt: f32) -> FrameTime {
        let now_ms = match self.start_ms {
            Some(_) => self.last_ms + f64::from(dt.max(0.0)) * 1000.0,
            None => 0.0,
        };
        self.advance(now_ms)
    }

    fn track_fps(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;

        // Oldest sample is the one about to be overwritten
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time - oldest_time;
            if elapsed > 0.0 {
                self.fps = (60000.0 / elapsed).round() as u32;
            }
        }
    }
}
