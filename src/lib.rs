// Blues Metronome - Library exports for tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod metronome;
pub mod prefs;

// Re-export commonly used types for convenience
pub use audio::click::{ClickMixer, ClickVoice, ScheduledClick};
pub use audio::clock::SampleClock;
pub use audio::engine::{AudioOutput, DeviceStatus, OutputHandle};
pub use audio::parameters::VolumeParam;
pub use messaging::channels::{create_click_channel, create_notification_channel};
pub use metronome::{
    BeatIndicator, ClickTone, LookaheadScheduler, Metronome, MetronomeConfig, MetronomeError,
    NoteValue, TempoSnapshot, ToneOutput, VirtualOutput,
};
pub use prefs::{Settings, SettingsError};
