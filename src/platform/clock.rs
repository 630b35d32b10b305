//! Frame admission
//!
//! The platform calls back once per display refresh. `FrameClock` decides
//! which of those callbacks become simulation frames.

/// Throttles frame admission to an optional target rate
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Minimum milliseconds between admitted frames (`None` = every callback)
    min_interval_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(target_fps: Option<u32>) -> Self {
        let mut clock = Self {
            min_interval_ms: None,
            last_ms: None,
        };
        clock.set_target_fps(target_fps);
        clock
    }

    pub fn set_target_fps(&mut self, target_fps: Option<u32>) {
        self.min_interval_ms = target_fps.filter(|fps| *fps > 0).map(|fps| 1000.0 / fps as f64);
    }

    pub fn min_interval_ms(&self) -> Option<f64> {
        self.min_interval_ms
    }

    /// Returns the elapsed milliseconds since the last admitted frame, or
    /// `None` if this callback should be skipped. The first call is always
    /// admitted with an elapsed time of zero.
    pub fn admit(&mut self, now_ms: f64) -> Option<f64> {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return Some(0.0);
        };
        let delta = (now_ms - last).max(0.0);
        match self.min_interval_ms {
            Some(min) if delta < min => None,
            Some(min) => {
                // Keep the remainder so the average rate stays on target
                self.last_ms = Some(now_ms - delta % min);
                Some(delta)
            }
            None => {
                self.last_ms = Some(now_ms);
                Some(delta)
            }
        }
    }
}

/// Rolling frames-per-second estimate over the last 60 admitted frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FpsCounter {
    pub fn record(&mut self, now_ms: f64) {
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample is the one about to be overwritten
        let oldest = self.frame_times[self.frame_index];
        if oldest > 0.0 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}
