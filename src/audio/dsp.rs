// DSP utilities for the real-time callback
// Keeps the output path clean: denormal flushing, soft clipping, and
// parameter smoothing.

/// Flush denormals to zero
/// Denormal floats (very close to 0) can stall some CPUs; tiny values are
/// forced to zero. Threshold 1e-15, well below audible noise at 32-bit.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Soft clipping via tanh
/// Keeps the output inside [-1, 1] without a hard knee; near-linear around
/// zero, asymptotic saturation on loud input.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// One-pole low-pass smoother for parameter changes
/// y[n] = y[n-1] + a * (x[n] - y[n-1]); used on master volume so a slider
/// jump cannot click.
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    /// `time_constant_ms` is the time to cover ~63% of a step change
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = time_constant_ms * 0.001 * sample_rate;
        let coefficient = 1.0 / time_constant_samples;

        Self {
            current: initial_value,
            // Clamp keeps the filter stable for very short constants
            coefficient: coefficient.min(1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }

    /// Jump straight to `value` without smoothing
    #[inline]
    pub fn reset(&mut self, value: f32) {
        self.current = value;
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }
}
