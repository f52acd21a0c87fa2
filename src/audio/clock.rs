// Sample clock - the timing ground truth
// A frame counter advanced by the audio callback; every scheduling decision
// reads time from here, never from the OS clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared audio-clock state
#[derive(Clone)]
pub struct SampleClock {
    /// Frames rendered so far (incremented by the audio callback)
    position: Arc<AtomicU64>,
    /// Sample rate, for conversions to and from seconds
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Current position in frames (read from the scheduler thread)
    pub fn current_sample(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    /// Current position in fractional seconds
    pub fn seconds(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate
    }

    /// Advance the position (called from the audio callback)
    pub fn advance(&self, frames: usize) {
        self.position.fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Convert an absolute time in seconds to an absolute frame position
    pub fn seconds_to_sample(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * self.sample_rate).round() as u64
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = SampleClock::new(48000.0);
        assert_eq!(clock.current_sample(), 0);
        assert_eq!(clock.seconds(), 0.0);
        assert_eq!(clock.sample_rate(), 48000.0);
    }

    #[test]
    fn test_advance_accumulates() {
        let clock = SampleClock::new(48000.0);
        clock.advance(480);
        assert_eq!(clock.current_sample(), 480);
        clock.advance(480);
        assert_eq!(clock.current_sample(), 960);

        // 960 frames at 48kHz = 20ms
        assert!((clock.seconds() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_to_sample() {
        let clock = SampleClock::new(48000.0);

        // 1 second = 48000 frames
        assert_eq!(clock.seconds_to_sample(1.0), 48000);

        // 50ms = 2400 frames
        assert_eq!(clock.seconds_to_sample(0.05), 2400);

        // Past times clamp to the start of the stream
        assert_eq!(clock.seconds_to_sample(-0.5), 0);
    }

    #[test]
    fn test_clones_share_position() {
        let clock = SampleClock::new(44100.0);
        let reader = clock.clone();

        clock.advance(441);
        assert_eq!(reader.current_sample(), 441);
        assert!((reader.seconds() - 0.01).abs() < 1e-12);
    }
}
