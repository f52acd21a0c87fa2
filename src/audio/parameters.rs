// Lock-free parameter sharing between the control thread and the callback

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Master volume shared with the audio callback
/// Stored as f32 bits in an atomic u32; writes clamp to [0, 1] so the
/// callback never sees an out-of-range gain.
#[derive(Clone)]
pub struct VolumeParam {
    inner: Arc<AtomicU32>,
}

impl VolumeParam {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.clamp(0.0, 1.0).to_bits())),
        }
    }

    /// Set the volume (control thread)
    pub fn set(&self, value: f32) {
        self.inner
            .store(value.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Read the volume (audio callback)
    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for VolumeParam {
    fn default() -> Self {
        Self::new(0.5)
    }
}
