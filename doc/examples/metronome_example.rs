// Example: driving the look-ahead scheduler by hand
// This shows what the worker thread and the audio callback each do, using
// the virtual output so no audio device is needed

use blues_metronome::audio::click::{ClickMixer, ScheduledClick};
use blues_metronome::audio::clock::SampleClock;
use blues_metronome::metronome::scheduler::LOOKAHEAD_INTERVAL;
use blues_metronome::{
    BeatIndicator, LookaheadScheduler, MetronomeConfig, NoteValue, VirtualOutput,
};

fn main() {
    // Setup
    let config = MetronomeConfig::with_values(120, 4, NoteValue::Quarter);
    let output = VirtualOutput::new();
    let indicator = BeatIndicator::new();

    println!("Simulating 2 seconds at {}", config.snapshot());
    println!("Expected: a click every 0.5s from t=0.05, accent on every 4th\n");

    // Worker thread side: poll every 25ms, committing every click that
    // falls within the next 100ms
    let mut scheduler = LookaheadScheduler::begin(output.now());
    while output.now() < 2.0 {
        scheduler.tick(&output, &config, &indicator);
        output.advance(LOOKAHEAD_INTERVAL.as_secs_f64());
    }

    for (k, tone) in output.tones().iter().enumerate() {
        println!("click {:2} @ {:.3}s  {} Hz", k, tone.at, tone.frequency_hz);
    }

    // Audio callback side: the same clicks become enveloped sine voices,
    // mixed at absolute frame positions
    let sample_rate = 48000.0;
    let clock = SampleClock::new(sample_rate);
    let mut mixer = ClickMixer::new(sample_rate);

    for tone in output.tones().iter().take(2) {
        mixer.schedule(ScheduledClick {
            start_sample: clock.seconds_to_sample(tone.at),
            frequency_hz: tone.frequency_hz,
        });
    }

    let mut peak = 0.0f32;
    for position in 0..48000u64 {
        peak = peak.max(mixer.next_sample(position).abs());
    }
    println!(
        "\nFirst second rendered at {} Hz, peak level {:.2}",
        sample_rate, peak
    );

    println!("\nIn the real binary:");
    println!("- Metronome::start spawns the polling worker shown above");
    println!("- OutputHandle carries clicks to the cpal callback over a ring");
    println!("- Tempo and meter changes apply from the next click onward");
}
