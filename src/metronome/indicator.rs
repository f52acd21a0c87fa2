// Active-beat signal for the UI
// Display-only: intentionally delayed to land when the click becomes audible,
// never consulted for audio timing

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

const NO_BEAT: i32 = -1;

/// Atomic wrapper sharing the currently sounding beat with the UI
/// Holds -1 while stopped or before the first click is audible
#[derive(Clone)]
pub struct BeatIndicator {
    inner: Arc<AtomicI32>,
}

impl BeatIndicator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicI32::new(NO_BEAT)),
        }
    }

    /// Beat index currently highlighted, None when no beat is active
    pub fn active_beat(&self) -> Option<u32> {
        let raw = self.inner.load(Ordering::Relaxed);
        if raw < 0 { None } else { Some(raw as u32) }
    }

    pub fn set(&self, beat: u32) {
        self.inner.store(beat as i32, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.inner.store(NO_BEAT, Ordering::Relaxed);
    }
}

impl Default for BeatIndicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending display updates, one per scheduled click
/// Owned by the scheduler; entries are released to the indicator once the
/// audio clock passes their audible time, and dropped wholesale on stop so
/// no highlight fires after a reset.
pub(crate) struct VisualSync {
    pending: VecDeque<(f64, u32)>,
}

impl VisualSync {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Queue a highlight for the click sounding at `audible_at`
    pub(crate) fn push(&mut self, audible_at: f64, beat: u32) {
        self.pending.push_back((audible_at, beat));
    }

    /// Release every entry whose audible time has arrived
    /// Entries are queued in increasing time order, so the last one released
    /// is the beat currently sounding.
    pub(crate) fn drain(&mut self, now: f64, indicator: &BeatIndicator) {
        while let Some(&(audible_at, beat)) = self.pending.front() {
            if audible_at > now {
                break;
            }
            indicator.set(beat);
            self.pending.pop_front();
        }
    }

    /// Drop all pending highlights (stop path)
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
