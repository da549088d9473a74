//! Per-sample gain ramp for click-free playback.
//!
//! Linear interpolation from the current gain to a target over a ramp
//! length of one audio callback's worth of samples. The ramp length is
//! recomputed on every `prepare` so changing the callback block size
//! keeps the ramp duration in step.

#[derive(Debug, Clone)]
pub struct GainRamp {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    ramp_samples: u32,
}

impl GainRamp {
    pub fn new(initial: f32, ramp_samples: u32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            ramp_samples: ramp_samples.max(1),
        }
    }

    /// Reset the ramp length. Cancels any ramp in progress by snapping to
    /// the target.
    pub fn prepare(&mut self, ramp_samples: u32) {
        self.ramp_samples = ramp_samples.max(1);
        self.current = self.target;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < f32::EPSILON {
            return;
        }

        self.target = target;
        self.samples_remaining = self.ramp_samples;
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    /// Call once per frame in the audio callback.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            // Snap to target when done to avoid floating point drift
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }

        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.samples_remaining > 0
    }
}

impl Default for GainRamp {
    fn default() -> Self {
        Self::new(1.0, 512)
    }
}
