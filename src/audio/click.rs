// Click synthesis - sine burst voices rendered at absolute frame positions
// Voices are plain value types sized for the audio callback: fixed pool, no
// allocation, no locks of their own.

use std::f32::consts::PI;

/// Click length in seconds
pub const CLICK_DURATION_SECONDS: f64 = 0.05;

/// Envelope level reached at the end of the click (relative to full scale)
pub const CLICK_FLOOR: f32 = 1e-3;

/// Peak click level before master volume
const CLICK_AMPLITUDE: f32 = 0.8;

/// Upper bound on simultaneously sounding clicks
/// Clicks last 50ms and the shortest supported interval is 50ms, so at most
/// two overlap; the pool leaves generous headroom.
pub const MAX_CLICK_VOICES: usize = 8;

/// Click event crossing from the scheduler thread to the audio callback
#[derive(Debug, Clone, Copy)]
pub struct ScheduledClick {
    /// Absolute frame at which the click starts
    pub start_sample: u64,
    /// Tone pitch (downbeat vs regular beat)
    pub frequency_hz: f32,
}

/// One sounding click
/// Instant attack, exponential decay to CLICK_FLOOR over the click length.
#[derive(Debug, Clone, Copy)]
pub struct ClickVoice {
    start_sample: u64,
    phase: f32,
    phase_increment: f32,
    envelope: f32,
    envelope_decay: f32,
    remaining: u32,
}

impl ClickVoice {
    pub fn new(click: ScheduledClick, sample_rate: f32) -> Self {
        let length = ((CLICK_DURATION_SECONDS * sample_rate as f64) as u32).max(1);

        // Per-sample multiplier that lands on CLICK_FLOOR at the last sample
        let envelope_decay = CLICK_FLOOR.powf(1.0 / length as f32);

        Self {
            start_sample: click.start_sample,
            phase: 0.0,
            phase_increment: 2.0 * PI * click.frequency_hz / sample_rate,
            envelope: 1.0,
            envelope_decay,
            remaining: length,
        }
    }

    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    /// True once every sample of the click has been rendered
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Contribution of this voice at absolute frame `position`
    /// Silent before the start frame; positions are fed in strictly
    /// increasing order by the callback.
    pub fn render(&mut self, position: u64) -> f32 {
        if self.is_finished() || position < self.start_sample {
            return 0.0;
        }

        let sample = self.phase.sin() * self.envelope * CLICK_AMPLITUDE;

        self.phase += self.phase_increment;
        if self.phase > 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        self.envelope *= self.envelope_decay;
        self.remaining -= 1;

        sample
    }
}

/// Fixed pool of click voices mixed by the audio callback
pub struct ClickMixer {
    sample_rate: f32,
    voices: [Option<ClickVoice>; MAX_CLICK_VOICES],
}

impl ClickMixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: [None; MAX_CLICK_VOICES],
        }
    }

    /// Admit a scheduled click (called from the audio callback)
    /// When every slot is busy the click with the earliest start is replaced.
    pub fn schedule(&mut self, click: ScheduledClick) {
        let voice = ClickVoice::new(click, self.sample_rate);

        for slot in self.voices.iter_mut() {
            if slot.is_none() {
                *slot = Some(voice);
                return;
            }
        }

        let oldest = self
            .voices
            .iter_mut()
            .min_by_key(|slot| slot.map_or(u64::MAX, |v| v.start_sample()));
        if let Some(slot) = oldest {
            *slot = Some(voice);
        }
    }

    /// Mix every active voice at absolute frame `position`
    pub fn next_sample(&mut self, position: u64) -> f32 {
        let mut mixed = 0.0;

        for slot in self.voices.iter_mut() {
            if let Some(voice) = slot {
                if voice.is_finished() {
                    *slot = None;
                } else {
                    mixed += voice.render(position);
                }
            }
        }

        mixed
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|slot| slot.is_some()).count()
    }

    /// Drop every voice (silence immediately)
    pub fn reset(&mut self) {
        for slot in self.voices.iter_mut() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_click_length_matches_duration() {
        let click = ScheduledClick {
            start_sample: 0,
            frequency_hz: 1000.0,
        };
        let mut voice = ClickVoice::new(click, SAMPLE_RATE);

        // 50ms at 48kHz = 2400 samples
        for position in 0..2400 {
            assert!(!voice.is_finished());
            let sample = voice.render(position);
            assert!(sample.is_finite());
            assert!(sample.abs() <= 1.0);
        }
        assert!(voice.is_finished());
        assert_eq!(voice.render(2400), 0.0);
    }

    #[test]
    fn test_click_envelope_decays() {
        let click = ScheduledClick {
            start_sample: 0,
            frequency_hz: 1000.0,
        };
        let mut voice = ClickVoice::new(click, SAMPLE_RATE);

        let mut early_peak = 0.0f32;
        let mut late_peak = 0.0f32;
        for position in 0..2400u64 {
            let sample = voice.render(position).abs();
            if position < 200 {
                early_peak = early_peak.max(sample);
            } else if position >= 2200 {
                late_peak = late_peak.max(sample);
            }
        }

        // The tail sits near the 1e-3 envelope floor, far below the attack
        assert!(early_peak > 0.3);
        assert!(late_peak < 0.01);
        assert!(late_peak > 0.0);
    }

    #[test]
    fn test_voice_waits_for_start_frame() {
        let click = ScheduledClick {
            start_sample: 1000,
            frequency_hz: 800.0,
        };
        let mut voice = ClickVoice::new(click, SAMPLE_RATE);

        // Positions before the start produce silence and burn no envelope
        for position in 0..1000 {
            assert_eq!(voice.render(position), 0.0);
        }
        assert!(!voice.is_finished());

        let mut non_zero = 0;
        for position in 1000..3400 {
            if voice.render(position).abs() > 1e-6 {
                non_zero += 1;
            }
        }
        assert!(non_zero > 2000);
        assert!(voice.is_finished());
    }

    #[test]
    fn test_mixer_mixes_overlapping_clicks() {
        let mut mixer = ClickMixer::new(SAMPLE_RATE);

        mixer.schedule(ScheduledClick {
            start_sample: 0,
            frequency_hz: 1000.0,
        });
        mixer.schedule(ScheduledClick {
            start_sample: 1200,
            frequency_hz: 800.0,
        });
        assert_eq!(mixer.active_voices(), 2);

        let mut non_zero = 0;
        for position in 0..3700 {
            let sample = mixer.next_sample(position);
            assert!(sample.is_finite());
            if sample.abs() > 1e-6 {
                non_zero += 1;
            }
        }
        assert!(non_zero > 3000);

        // Both clicks have played out; one more call reaps the finished slots
        mixer.next_sample(3700);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_mixer_replaces_oldest_when_full() {
        let mut mixer = ClickMixer::new(SAMPLE_RATE);

        for k in 0..MAX_CLICK_VOICES as u64 {
            mixer.schedule(ScheduledClick {
                start_sample: k,
                frequency_hz: 800.0,
            });
        }
        assert_eq!(mixer.active_voices(), MAX_CLICK_VOICES);

        // Pool is full: the next click evicts the earliest one
        mixer.schedule(ScheduledClick {
            start_sample: 10_000,
            frequency_hz: 1000.0,
        });
        assert_eq!(mixer.active_voices(), MAX_CLICK_VOICES);

        // Run past the old clicks; only the late one should remain active
        for position in 0..2500 {
            mixer.next_sample(position);
        }
        mixer.next_sample(2500);
        assert_eq!(mixer.active_voices(), 1);
    }

    #[test]
    fn test_mixer_reset_silences() {
        let mut mixer = ClickMixer::new(SAMPLE_RATE);
        mixer.schedule(ScheduledClick {
            start_sample: 0,
            frequency_hz: 1000.0,
        });

        mixer.reset();
        assert_eq!(mixer.active_voices(), 0);
        assert_eq!(mixer.next_sample(0), 0.0);
    }
}
