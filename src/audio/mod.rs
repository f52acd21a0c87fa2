// Module audio - cpal backend and real-time callback

pub mod click;
pub mod clock;
pub mod dsp;
pub mod engine;
pub mod parameters;

pub use click::{ClickMixer, ClickVoice, ScheduledClick};
pub use clock::SampleClock;
pub use engine::{AtomicDeviceStatus, AudioOutput, DeviceStatus, OutputHandle};
pub use parameters::VolumeParam;
