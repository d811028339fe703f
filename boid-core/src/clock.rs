//! Frame timing: wall-clock (or fixed) elapsed time, scaled and gated.

/// Source of elapsed seconds since the previous frame
pub trait Clock {
    fn delta_seconds(&mut self) -> f32;
}

/// Wall clock based on [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct SystemClock {
    last: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn delta_seconds(&mut self) -> f32 {
        let now = std::time::Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        delta
    }
}

/// Constant step, for headless runs and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub step: f32,
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    pub fn from_fps(fps: f32) -> Self {
        Self::new(1.0 / fps)
    }
}

impl Clock for FixedClock {
    fn delta_seconds(&mut self) -> f32 {
        self.step
    }
}

/// Delta time for one frame: elapsed wall time times the time scale, or zero
/// while the simulation is paused.
pub fn scaled_delta(elapsed: f32, time_scale: f32, active: bool) -> f32 {
    if active {
        elapsed * time_scale
    } else {
        0.0
    }
}
