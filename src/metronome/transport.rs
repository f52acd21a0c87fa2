// Metronome playback control
// Owns the scheduling worker thread; start/stop transitions are driven by an
// atomic playback flag shared with the worker.

use crate::metronome::config::MetronomeConfig;
use crate::metronome::error::MetronomeError;
use crate::metronome::indicator::BeatIndicator;
use crate::metronome::output::ToneOutput;
use crate::metronome::scheduler::{LOOKAHEAD_INTERVAL, LookaheadScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Metronome playback controller
/// Generic over the tone output so tests can run against a virtual device.
pub struct Metronome<S: ToneOutput + Send + Sync + 'static> {
    config: Arc<MetronomeConfig>,
    output: Arc<S>,
    indicator: BeatIndicator,
    playing: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: ToneOutput + Send + Sync + 'static> Metronome<S> {
    pub fn new(config: Arc<MetronomeConfig>, output: Arc<S>) -> Self {
        Self {
            config,
            output,
            indicator: BeatIndicator::new(),
            playing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Shared configuration handle (for control-side mutation)
    pub fn config(&self) -> Arc<MetronomeConfig> {
        Arc::clone(&self.config)
    }

    /// Active-beat signal handle (for display)
    pub fn indicator(&self) -> BeatIndicator {
        self.indicator.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Begin playback
    /// A second start while running is a no-op; two tick chains can never
    /// coexist because the flag is claimed with compare_exchange. Fails with
    /// AudioUnavailable when the device cannot be resumed, leaving the
    /// metronome stopped.
    pub fn start(&mut self) -> Result<(), MetronomeError> {
        if self
            .playing
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return Ok(());
        }

        if let Err(e) = self.output.resume() {
            self.playing.store(false, Ordering::Relaxed);
            return Err(e);
        }

        // Reap the worker of a previous run, if any
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }

        let playing = Arc::clone(&self.playing);
        let config = Arc::clone(&self.config);
        let output = Arc::clone(&self.output);
        let indicator = self.indicator.clone();

        self.worker = Some(thread::spawn(move || {
            // Fresh cursor every run: beat 0, first click just after now
            let mut scheduler = LookaheadScheduler::begin(output.now());

            while playing.load(Ordering::Relaxed) {
                scheduler.tick(output.as_ref(), &config, &indicator);
                thread::sleep(LOOKAHEAD_INTERVAL);
            }

            // Clicks already committed to the device may still sound; only
            // the chain itself and the display state are torn down here
            scheduler.finish(&indicator);
        }));

        Ok(())
    }

    /// Halt playback
    /// Blocks until the worker has exited, so no tick runs after this
    /// returns. Calling stop while already stopped is a no-op.
    pub fn stop(&mut self) {
        if !self.playing.swap(false, Ordering::Relaxed) {
            return;
        }

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    /// Start when stopped, stop when running
    pub fn toggle(&mut self) -> Result<(), MetronomeError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }
}

impl<S: ToneOutput + Send + Sync + 'static> Drop for Metronome<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
