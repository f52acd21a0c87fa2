// Module metronome - look-ahead click scheduling

pub mod config;
pub mod error;
pub mod indicator;
pub mod output;
pub mod scheduler;
pub mod transport;

pub use config::{MetronomeConfig, NoteValue, TempoSnapshot};
pub use error::MetronomeError;
pub use indicator::BeatIndicator;
pub use output::{RecordedTone, ToneOutput, VirtualOutput};
pub use scheduler::{ClickTone, LookaheadScheduler};
pub use transport::Metronome;
