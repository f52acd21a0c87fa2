// Look-ahead click scheduler
// Polled every LOOKAHEAD_INTERVAL; each tick commits every click falling
// inside the SCHEDULE_AHEAD_SECONDS horizon, then returns immediately.
// Timing precision comes from the audio clock, not from the poll cadence.

use crate::metronome::config::MetronomeConfig;
use crate::metronome::indicator::{BeatIndicator, VisualSync};
use crate::metronome::output::ToneOutput;
use std::time::Duration;

/// How far ahead of the audio clock clicks are committed
pub const SCHEDULE_AHEAD_SECONDS: f64 = 0.1;

/// Poll interval of the scheduling loop
pub const LOOKAHEAD_INTERVAL: Duration = Duration::from_millis(25);

/// Lead-in applied to the first click of a run, so it is never in the past
pub const START_DELAY_SECONDS: f64 = 0.05;

/// Downbeat click pitch
pub const ACCENT_FREQUENCY_HZ: f32 = 1000.0;

/// Pitch of every other beat
pub const BEAT_FREQUENCY_HZ: f32 = 800.0;

/// Click tone type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTone {
    /// First beat of the measure (downbeat)
    Accent,
    /// All other beats
    Regular,
}

impl ClickTone {
    pub fn for_beat(beat: u32) -> Self {
        if beat == 0 {
            ClickTone::Accent
        } else {
            ClickTone::Regular
        }
    }

    pub fn frequency_hz(self) -> f32 {
        match self {
            ClickTone::Accent => ACCENT_FREQUENCY_HZ,
            ClickTone::Regular => BEAT_FREQUENCY_HZ,
        }
    }
}

/// Scheduling cursor for one playback run
/// Created on start, dropped on stop; never survives a stop/start cycle.
/// Only the scheduler itself mutates the cursor fields.
pub struct LookaheadScheduler {
    next_click_time: f64,
    current_beat: u32,
    visual: VisualSync,
}

impl LookaheadScheduler {
    /// Begin a fresh run: beat 0, first click START_DELAY_SECONDS after `now`
    pub fn begin(now: f64) -> Self {
        Self {
            next_click_time: now + START_DELAY_SECONDS,
            current_beat: 0,
            visual: VisualSync::new(),
        }
    }

    /// Commit every click inside the look-ahead horizon, then release any
    /// display updates whose audible time has arrived
    pub fn tick(
        &mut self,
        output: &impl ToneOutput,
        config: &MetronomeConfig,
        indicator: &BeatIndicator,
    ) {
        let horizon = output.now() + SCHEDULE_AHEAD_SECONDS;

        while self.next_click_time < horizon {
            // One config snapshot per click; tempo and meter changes made by
            // the control thread apply from the next click onward, without a
            // restart
            let tempo = config.snapshot();

            if self.current_beat >= tempo.beats_per_measure {
                // Meter shrank since the last click; wrap to the downbeat
                self.current_beat = 0;
            }
            let beat = self.current_beat;

            output.schedule_tone(self.next_click_time, ClickTone::for_beat(beat).frequency_hz());
            self.visual.push(self.next_click_time, beat);

            // The cursor advances by accumulation and is never re-derived
            // from the current clock reading, so the grid cannot drift
            self.next_click_time += tempo.seconds_per_click();
            self.current_beat = (beat + 1) % tempo.beats_per_measure;
        }

        self.visual.drain(output.now(), indicator);
    }

    /// Tear down after the final tick: pending highlights are dropped and
    /// the indicator resets to none
    pub fn finish(&mut self, indicator: &BeatIndicator) {
        self.visual.clear();
        indicator.clear();
    }

    /// Absolute time of the next uncommitted click
    pub fn next_click_time(&self) -> f64 {
        self.next_click_time
    }

    /// Beat index the next click will carry
    pub fn current_beat(&self) -> u32 {
        self.current_beat
    }
}
