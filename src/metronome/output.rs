// Tone output seam between the scheduler and the audio backend
// The scheduler only ever needs a monotonic clock and a way to place a tone
// at a future time, so the backend sits behind this trait: OutputHandle wraps
// the real cpal stream, VirtualOutput is a manually advanced stand-in for
// deterministic tests.

use crate::metronome::error::MetronomeError;
use std::sync::Mutex;

/// Audio clock and tone emission service
pub trait ToneOutput {
    /// Monotonic current time in fractional seconds
    /// Drives all scheduling decisions; immune to control-thread stalls.
    fn now(&self) -> f64;

    /// Place a short enveloped tone of `frequency_hz` at absolute time `at`
    /// Committed tones cannot be recalled.
    fn schedule_tone(&self, at: f64, frequency_hz: f32);

    /// Ensure the underlying device is running
    /// Fails with AudioUnavailable when the device cannot be used; callers
    /// abort their start path on error.
    fn resume(&self) -> Result<(), MetronomeError>;
}

/// A tone recorded by VirtualOutput
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedTone {
    pub at: f64,
    pub frequency_hz: f32,
}

/// Manually advanceable output for tests
/// The clock only moves when `advance` is called, making scheduling runs
/// fully deterministic.
pub struct VirtualOutput {
    clock: Mutex<f64>,
    tones: Mutex<Vec<RecordedTone>>,
    available: bool,
}

impl VirtualOutput {
    pub fn new() -> Self {
        Self {
            clock: Mutex::new(0.0),
            tones: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// An output whose device can never be resumed
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        if let Ok(mut clock) = self.clock.lock() {
            *clock += seconds;
        }
    }

    /// Every tone scheduled so far, in scheduling order
    pub fn tones(&self) -> Vec<RecordedTone> {
        self.tones.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn tone_count(&self) -> usize {
        self.tones.lock().map(|t| t.len()).unwrap_or(0)
    }
}

impl Default for VirtualOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneOutput for VirtualOutput {
    fn now(&self) -> f64 {
        self.clock.lock().map(|clock| *clock).unwrap_or(0.0)
    }

    fn schedule_tone(&self, at: f64, frequency_hz: f32) {
        if let Ok(mut tones) = self.tones.lock() {
            tones.push(RecordedTone { at, frequency_hz });
        }
    }

    fn resume(&self) -> Result<(), MetronomeError> {
        if self.available {
            Ok(())
        } else {
            Err(MetronomeError::AudioUnavailable(
                "virtual device is offline".to_string(),
            ))
        }
    }
}
