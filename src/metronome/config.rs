// Live metronome configuration
// Shared between the control thread (writer) and the scheduler thread (reader)

use crate::metronome::error::MetronomeError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// BPM range accepted by the tempo control
pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 300;

/// Beats-per-measure range accepted by the meter control
pub const MIN_BEATS_PER_MEASURE: u32 = 1;
pub const MAX_BEATS_PER_MEASURE: u32 = 12;

/// Note value receiving one click (time signature denominator)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValue {
    Half = 2,
    Quarter = 4,
    Eighth = 8,
    Sixteenth = 16,
}

impl NoteValue {
    /// Parse a raw denominator, rejecting anything outside {2, 4, 8, 16}
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            2 => Some(NoteValue::Half),
            4 => Some(NoteValue::Quarter),
            8 => Some(NoteValue::Eighth),
            16 => Some(NoteValue::Sixteenth),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Click duration relative to a quarter note
    /// Example: Quarter = 1.0, Eighth = 0.5 (clicks twice as fast)
    pub fn beat_duration_multiplier(self) -> f64 {
        4.0 / self.as_u32() as f64
    }

    /// Next denominator in the supported cycle (16 wraps to 2)
    pub fn next(self) -> Self {
        match self {
            NoteValue::Half => NoteValue::Quarter,
            NoteValue::Quarter => NoteValue::Eighth,
            NoteValue::Eighth => NoteValue::Sixteenth,
            NoteValue::Sixteenth => NoteValue::Half,
        }
    }

    /// Previous denominator in the supported cycle (2 wraps to 16)
    pub fn previous(self) -> Self {
        match self {
            NoteValue::Half => NoteValue::Sixteenth,
            NoteValue::Quarter => NoteValue::Half,
            NoteValue::Eighth => NoteValue::Quarter,
            NoteValue::Sixteenth => NoteValue::Eighth,
        }
    }
}

impl Default for NoteValue {
    fn default() -> Self {
        NoteValue::Quarter
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Shared metronome configuration
/// Thread-safe via atomics; all three fields are independently mutable at any
/// time, including during playback. Setters clamp to the valid range so the
/// scheduler never observes out-of-range values.
#[derive(Debug)]
pub struct MetronomeConfig {
    bpm: AtomicU32,
    beats_per_measure: AtomicU32,
    // Raw denominator, only ever written through NoteValue
    note_value: AtomicU32,
}

impl MetronomeConfig {
    pub const DEFAULT_BPM: u32 = 100;
    pub const DEFAULT_BEATS_PER_MEASURE: u32 = 4;

    /// Create shared configuration with default values (100 BPM, 4/4)
    pub fn new() -> Arc<Self> {
        Self::with_values(
            Self::DEFAULT_BPM,
            Self::DEFAULT_BEATS_PER_MEASURE,
            NoteValue::Quarter,
        )
    }

    /// Create shared configuration with given values (clamped to valid ranges)
    pub fn with_values(bpm: u32, beats_per_measure: u32, note_value: NoteValue) -> Arc<Self> {
        Arc::new(Self {
            bpm: AtomicU32::new(bpm.clamp(MIN_BPM, MAX_BPM)),
            beats_per_measure: AtomicU32::new(
                beats_per_measure.clamp(MIN_BEATS_PER_MEASURE, MAX_BEATS_PER_MEASURE),
            ),
            note_value: AtomicU32::new(note_value.as_u32()),
        })
    }

    pub fn bpm(&self) -> u32 {
        self.bpm.load(Ordering::Relaxed)
    }

    /// Set BPM, clamped to [30, 300]
    pub fn set_bpm(&self, bpm: u32) {
        self.bpm.store(bpm.clamp(MIN_BPM, MAX_BPM), Ordering::Relaxed);
    }

    /// Raise BPM by `amount`, saturating at the maximum
    pub fn increase_bpm(&self, amount: u32) {
        let current = self.bpm();
        self.set_bpm(current.saturating_add(amount));
    }

    /// Lower BPM by `amount`, saturating at the minimum
    pub fn decrease_bpm(&self, amount: u32) {
        let current = self.bpm();
        self.set_bpm(current.saturating_sub(amount).max(MIN_BPM));
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure.load(Ordering::Relaxed)
    }

    /// Set beats per measure, clamped to [1, 12]
    pub fn set_beats_per_measure(&self, beats: u32) {
        self.beats_per_measure.store(
            beats.clamp(MIN_BEATS_PER_MEASURE, MAX_BEATS_PER_MEASURE),
            Ordering::Relaxed,
        );
    }

    pub fn note_value(&self) -> NoteValue {
        NoteValue::from_raw(self.note_value.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_note_value(&self, value: NoteValue) {
        self.note_value.store(value.as_u32(), Ordering::Relaxed);
    }

    /// Set note value from a raw denominator (CLI arguments, settings files)
    /// Refused with InvalidConfig for anything outside {2, 4, 8, 16}
    pub fn set_note_value_raw(&self, raw: u32) -> Result<(), MetronomeError> {
        let value = NoteValue::from_raw(raw).ok_or_else(|| {
            MetronomeError::InvalidConfig(format!(
                "note value must be one of 2, 4, 8, 16 (got {})",
                raw
            ))
        })?;
        self.set_note_value(value);
        Ok(())
    }

    /// One internally consistent read of all three fields
    /// The scheduler takes one snapshot per emitted click
    pub fn snapshot(&self) -> TempoSnapshot {
        TempoSnapshot {
            bpm: self.bpm(),
            beats_per_measure: self.beats_per_measure(),
            note_value: self.note_value(),
        }
    }
}

/// Point-in-time copy of the configuration, valid for one scheduled click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoSnapshot {
    pub bpm: u32,
    pub beats_per_measure: u32,
    pub note_value: NoteValue,
}

impl TempoSnapshot {
    /// Interval between clicks in seconds
    /// Example: 120 BPM with eighth-note clicks = (60/120) * (4/8) = 0.25s
    pub fn seconds_per_click(&self) -> f64 {
        (60.0 / self.bpm as f64) * self.note_value.beat_duration_multiplier()
    }
}

impl fmt::Display for TempoSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} BPM, {}/{}",
            self.bpm, self.beats_per_measure, self.note_value
        )
    }
}
