// Audio output - real-time cpal callback
//
// The device's preferred sample format (F32, I16 or U16) is detected via
// sample_format() and the matching stream type is built. Rendering is f32
// internally; conversion to the device format happens while writing the
// output buffer, without allocation.
//
// The callback owns the click voice pool: scheduled clicks arrive over a
// lock-free ring, get admitted into the pool, and are mixed at their
// absolute frame positions. The sample clock advances once per buffer and
// is the only time source the scheduler ever sees.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use crate::audio::click::{ClickMixer, ScheduledClick};
use crate::audio::clock::SampleClock;
use crate::audio::dsp::{OnePoleSmoother, flush_denormals_to_zero, soft_clip};
use crate::audio::parameters::VolumeParam;
use crate::messaging::channels::{ClickConsumer, ClickProducer, NotificationProducer};
use crate::messaging::notification::{Notification, NotificationCategory};
use crate::metronome::error::MetronomeError;
use crate::metronome::output::ToneOutput;

/// Output device state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Error = 3,
}

impl From<u8> for DeviceStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceStatus::Disconnected,
            1 => DeviceStatus::Connecting,
            2 => DeviceStatus::Connected,
            3 => DeviceStatus::Error,
            _ => DeviceStatus::Disconnected,
        }
    }
}

/// Atomic wrapper sharing the device status between threads
#[derive(Clone)]
pub struct AtomicDeviceStatus {
    inner: Arc<AtomicU8>,
}

impl AtomicDeviceStatus {
    pub fn new(status: DeviceStatus) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(status as u8)),
        }
    }

    pub fn get(&self) -> DeviceStatus {
        DeviceStatus::from(self.inner.load(Ordering::Relaxed))
    }

    pub fn set(&self, status: DeviceStatus) {
        self.inner.store(status as u8, Ordering::Relaxed);
    }
}

impl Default for AtomicDeviceStatus {
    fn default() -> Self {
        Self::new(DeviceStatus::Disconnected)
    }
}

/// Write one mono sample across every channel of an interleaved frame
#[inline]
fn write_mono_to_interleaved_frame<T>(sample: f32, frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    for channel_sample in frame.iter_mut() {
        *channel_sample = Sample::from_sample::<f32>(sample);
    }
}

pub struct AudioOutput {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
    clock: SampleClock,
    pub volume: VolumeParam,
    pub status: AtomicDeviceStatus,
}

impl AudioOutput {
    pub fn new(
        click_rx: ClickConsumer,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, MetronomeError> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or_else(|| {
            MetronomeError::AudioUnavailable("no audio output device found".to_string())
        })?;

        println!(
            "Audio device: {}",
            device.name().unwrap_or("Unknown".to_string())
        );

        let supported_config = device.default_output_config().map_err(|e| {
            MetronomeError::AudioUnavailable(format!("device configuration failed: {}", e))
        })?;

        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        // Frame counter shared with the scheduler side
        let clock = SampleClock::new(sample_rate);

        let volume = VolumeParam::default();

        // 10ms volume smoothing so a slider jump cannot click
        let volume_smoother = Arc::new(Mutex::new(OnePoleSmoother::new(
            volume.get(),
            10.0,
            sample_rate,
        )));

        // Voice pool, pre-allocated and shared with the callback
        let mixer = Arc::new(Mutex::new(ClickMixer::new(sample_rate)));

        let status = AtomicDeviceStatus::new(DeviceStatus::Connecting);

        let click_rx = Arc::new(Mutex::new(click_rx));

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                click_rx,
                mixer,
                clock.clone(),
                volume.clone(),
                volume_smoother,
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                click_rx,
                mixer,
                clock.clone(),
                volume.clone(),
                volume_smoother,
                status.clone(),
                notification_tx.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                click_rx,
                mixer,
                clock.clone(),
                volume.clone(),
                volume_smoother,
                status.clone(),
                notification_tx.clone(),
            ),
            _ => {
                return Err(MetronomeError::AudioUnavailable(format!(
                    "unsupported sample format: {:?} (supported: F32, I16, U16)",
                    sample_format
                )));
            }
        }?;

        stream.play().map_err(|e| {
            MetronomeError::AudioUnavailable(format!("stream start failed: {}", e))
        })?;

        status.set(DeviceStatus::Connected);

        println!(
            "Audio output started: {} Hz, {} channels",
            sample_rate, channels
        );

        if let Ok(mut tx) = notification_tx.try_lock() {
            let notif = Notification::info(
                NotificationCategory::Audio,
                format!("Audio connected: {} Hz", sample_rate),
            );
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
            clock,
            volume,
            status,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The shared audio clock (advanced by the callback)
    pub fn clock(&self) -> SampleClock {
        self.clock.clone()
    }

    /// Create the scheduler-facing handle
    /// `click_tx` must be the producer half of the channel whose consumer
    /// this output was built with.
    pub fn handle(&self, click_tx: ClickProducer) -> OutputHandle {
        OutputHandle {
            clock: self.clock.clone(),
            click_tx: Arc::new(Mutex::new(click_tx)),
            status: self.status.clone(),
        }
    }

    /// Build an audio stream with automatic format conversion
    #[allow(clippy::too_many_arguments)]
    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        click_rx: Arc<Mutex<ClickConsumer>>,
        mixer: Arc<Mutex<ClickMixer>>,
        clock: SampleClock,
        volume: VolumeParam,
        volume_smoother: Arc<Mutex<OnePoleSmoother>>,
        status: AtomicDeviceStatus,
        notification_tx: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, MetronomeError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // ========== SACRED ZONE ==========
                    // No allocations, No I/O, No blocking locks

                    // Admit newly scheduled clicks into the voice pool
                    if let Ok(mut rx) = click_rx.try_lock() {
                        if let Ok(mut mixer) = mixer.try_lock() {
                            while let Some(click) = ringbuf::traits::Consumer::try_pop(&mut *rx) {
                                mixer.schedule(click);
                            }
                        }
                    }

                    let frames = data.len() / channels;

                    if let Ok(mut mixer) = mixer.try_lock() {
                        if let Ok(mut smoother) = volume_smoother.try_lock() {
                            let mut position = clock.current_sample();
                            for frame in data.chunks_mut(channels) {
                                // Read target volume once per sample for smoothing
                                let target_volume = volume.get();
                                let gain = smoother.process(target_volume);

                                let mut sample = mixer.next_sample(position);
                                sample = flush_denormals_to_zero(sample);
                                sample *= gain;
                                sample = soft_clip(sample);

                                write_mono_to_interleaved_frame(sample, frame);
                                position += 1;
                            }
                        } else {
                            // Fallback without smoothing (better than silence)
                            let gain = volume.get();
                            let mut position = clock.current_sample();
                            for frame in data.chunks_mut(channels) {
                                let mut sample = mixer.next_sample(position);
                                sample = flush_denormals_to_zero(sample);
                                sample *= gain;
                                sample = soft_clip(sample);

                                write_mono_to_interleaved_frame(sample, frame);
                                position += 1;
                            }
                        }
                    } else {
                        // Fallback: silence if the pool is contended
                        for sample in data.iter_mut() {
                            *sample = Sample::from_sample::<f32>(0.0);
                        }
                    }

                    // The device consumed the buffer either way
                    clock.advance(frames);
                    // ========== SACRED ZONE END ==========
                },
                move |err| {
                    // ========== ERROR CALLBACK ==========
                    // This runs outside the audio callback, so I/O is allowed
                    eprintln!("Audio stream error: {}", err);

                    status.set(DeviceStatus::Error);

                    // Notify the control thread (non-blocking)
                    if let Ok(mut tx) = notification_tx.try_lock() {
                        let notif = Notification::error(
                            NotificationCategory::Audio,
                            format!("Audio stream error: {}", err),
                        );
                        let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                    }
                },
                None,
            )
            .map_err(|e| {
                MetronomeError::AudioUnavailable(format!("stream creation failed: {}", e))
            })?;

        Ok(stream)
    }
}

/// Clonable scheduler-facing view of the running output
/// Converts second-based scheduling requests into absolute frame positions
/// and pushes them over the click ring.
#[derive(Clone)]
pub struct OutputHandle {
    clock: SampleClock,
    click_tx: Arc<Mutex<ClickProducer>>,
    status: AtomicDeviceStatus,
}

impl OutputHandle {
    pub fn status(&self) -> DeviceStatus {
        self.status.get()
    }
}

impl ToneOutput for OutputHandle {
    fn now(&self) -> f64 {
        self.clock.seconds()
    }

    fn schedule_tone(&self, at: f64, frequency_hz: f32) {
        let click = ScheduledClick {
            start_sample: self.clock.seconds_to_sample(at),
            frequency_hz,
        };

        // A full ring drops the click; the next poll re-schedules nothing in
        // its place, which is inaudible against an 8-voice pool and a 0.1s
        // horizon
        if let Ok(mut tx) = self.click_tx.try_lock() {
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, click);
        }
    }

    fn resume(&self) -> Result<(), MetronomeError> {
        match self.status.get() {
            DeviceStatus::Connected => Ok(()),
            status => Err(MetronomeError::AudioUnavailable(format!(
                "audio device is not ready ({:?})",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_click_channel;

    fn test_handle(status: DeviceStatus) -> (OutputHandle, crate::messaging::channels::ClickConsumer) {
        let (tx, rx) = create_click_channel(16);
        let handle = OutputHandle {
            clock: SampleClock::new(48000.0),
            click_tx: Arc::new(Mutex::new(tx)),
            status: AtomicDeviceStatus::new(status),
        };
        (handle, rx)
    }

    #[test]
    fn test_device_status_round_trip() {
        assert_eq!(DeviceStatus::from(0), DeviceStatus::Disconnected);
        assert_eq!(DeviceStatus::from(2), DeviceStatus::Connected);
        assert_eq!(DeviceStatus::from(3), DeviceStatus::Error);
        // Unknown values degrade to Disconnected
        assert_eq!(DeviceStatus::from(42), DeviceStatus::Disconnected);
    }

    #[test]
    fn test_handle_converts_seconds_to_frames() {
        let (handle, mut rx) = test_handle(DeviceStatus::Connected);

        handle.schedule_tone(0.05, 1000.0);

        let click = ringbuf::traits::Consumer::try_pop(&mut rx).unwrap();
        // 50ms at 48kHz = frame 2400
        assert_eq!(click.start_sample, 2400);
        assert_eq!(click.frequency_hz, 1000.0);
    }

    #[test]
    fn test_handle_now_follows_clock() {
        let (handle, _rx) = test_handle(DeviceStatus::Connected);

        assert_eq!(handle.now(), 0.0);
        handle.clock.advance(24000);
        assert!((handle.now() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_resume_requires_connected_device() {
        let (handle, _rx) = test_handle(DeviceStatus::Connected);
        assert!(handle.resume().is_ok());

        let (handle, _rx) = test_handle(DeviceStatus::Error);
        assert!(matches!(
            handle.resume(),
            Err(MetronomeError::AudioUnavailable(_))
        ));
    }
}
