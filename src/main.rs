use blues_metronome::messaging::channels::NotificationConsumer;
use blues_metronome::messaging::notification::NotificationLevel;
use blues_metronome::{
    AudioOutput, Metronome, MetronomeError, Settings, create_click_channel,
    create_notification_channel,
};
use std::sync::{Arc, Mutex};

// Ringbuffer capacity constants
// Sized for the fastest supported click rate:
// - 300 BPM with sixteenth-note clicks = 20 clicks/second
// - Each 25ms poll commits at most 3 clicks (one 0.1s horizon)
// - 64 capacity holds >3s of clicks if the callback stalls
const CLICK_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

fn print_usage() {
    println!("Usage: blues_metronome [BPM] [BEATS_PER_MEASURE] [NOTE_VALUE]");
    println!("  BPM                30-300");
    println!("  BEATS_PER_MEASURE  1-12");
    println!("  NOTE_VALUE         2, 4, 8 or 16");
}

fn print_commands() {
    println!("Commands:");
    println!("  <Enter>  start/stop");
    println!("  + [n]    raise tempo by n BPM (default 5)");
    println!("  - [n]    lower tempo by n BPM (default 5)");
    println!("  b <n>    beats per measure (1-12)");
    println!("  n <v>    note value: 2, 4, 8 or 16");
    println!("  v <x>    volume 0.0-1.0");
    println!("  i        show current state");
    println!("  q        quit");
}

fn drain_notifications(rx: &mut NotificationConsumer) {
    while let Some(notif) = ringbuf::traits::Consumer::try_pop(rx) {
        match notif.level {
            NotificationLevel::Error => eprintln!("[{:?}] {}", notif.category, notif.message),
            _ => println!("[{:?}] {}", notif.category, notif.message),
        }
    }
}

fn main() {
    println!("=== Blues Metronome ===");
    println!("Version 0.3.0\n");

    // Settings from the previous session, if any
    let settings_path = match Settings::default_path() {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Settings disabled: {}", e);
            None
        }
    };

    let settings = settings_path
        .as_ref()
        .map(Settings::load_or_default)
        .unwrap_or_default();

    let config = settings.into_config();

    // Positional arguments override the stored settings
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    if let Some(arg) = args.first() {
        match arg.parse::<u32>() {
            Ok(bpm) => config.set_bpm(bpm),
            Err(_) => {
                eprintln!("ERROR: invalid BPM '{}'", arg);
                print_usage();
                return;
            }
        }
    }

    if let Some(arg) = args.get(1) {
        match arg.parse::<u32>() {
            Ok(beats) => config.set_beats_per_measure(beats),
            Err(_) => {
                eprintln!("ERROR: invalid beats per measure '{}'", arg);
                print_usage();
                return;
            }
        }
    }

    if let Some(arg) = args.get(2) {
        let result = arg
            .parse::<u32>()
            .map_err(|_| {
                MetronomeError::InvalidConfig(format!("note value '{}' is not a number", arg))
            })
            .and_then(|raw| config.set_note_value_raw(raw));

        if let Err(e) = result {
            eprintln!("ERROR: {}", e);
            print_usage();
            return;
        }
    }

    // Create the communication channels
    let (click_tx, click_rx) = create_click_channel(CLICK_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    println!("Audio output initialisation...");
    let audio_output = match AudioOutput::new(click_rx, notification_tx) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return;
        }
    };

    let handle = audio_output.handle(click_tx);
    let mut metronome = Metronome::new(config.clone(), Arc::new(handle));

    println!("\n=== Ready: {} ===\n", config.snapshot());
    print_commands();

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF or broken stdin
            Ok(_) => {}
        }

        let mut parts = line.split_whitespace();
        let mut config_changed = false;

        match parts.next() {
            None => {
                // Bare Enter toggles playback
                match metronome.toggle() {
                    Ok(()) => {
                        if metronome.is_playing() {
                            println!("Playing at {}", config.snapshot());
                        } else {
                            println!("Stopped");
                        }
                    }
                    Err(e) => eprintln!("ERROR: {}", e),
                }
            }
            Some("+") => {
                let amount = parts.next().and_then(|a| a.parse().ok()).unwrap_or(5);
                config.increase_bpm(amount);
                config_changed = true;
                println!("{}", config.snapshot());
            }
            Some("-") => {
                let amount = parts.next().and_then(|a| a.parse().ok()).unwrap_or(5);
                config.decrease_bpm(amount);
                config_changed = true;
                println!("{}", config.snapshot());
            }
            Some("b") => match parts.next().and_then(|a| a.parse().ok()) {
                Some(beats) => {
                    config.set_beats_per_measure(beats);
                    config_changed = true;
                    println!("{}", config.snapshot());
                }
                None => eprintln!("Usage: b <1-12>"),
            },
            Some("n") => match parts.next().and_then(|a| a.parse::<u32>().ok()) {
                Some(raw) => match config.set_note_value_raw(raw) {
                    Ok(()) => {
                        config_changed = true;
                        println!("{}", config.snapshot());
                    }
                    Err(e) => eprintln!("ERROR: {}", e),
                },
                None => eprintln!("Usage: n <2|4|8|16>"),
            },
            Some("v") => match parts.next().and_then(|a| a.parse::<f32>().ok()) {
                Some(value) => {
                    audio_output.volume.set(value);
                    println!("Volume {:.2}", audio_output.volume.get());
                }
                None => eprintln!("Usage: v <0.0-1.0>"),
            },
            Some("i") => {
                let state = if metronome.is_playing() {
                    "playing"
                } else {
                    "stopped"
                };
                println!(
                    "{} | {} | volume {:.2} | device {:?}",
                    config.snapshot(),
                    state,
                    audio_output.volume.get(),
                    audio_output.status.get(),
                );
                if let Some(beat) = metronome.indicator().active_beat() {
                    println!(
                        "Active beat: {} of {}",
                        beat + 1,
                        config.beats_per_measure()
                    );
                }
            }
            Some("q") => break,
            Some(other) => {
                eprintln!("Unknown command '{}'", other);
                print_commands();
            }
        }

        // Persist every accepted tempo change
        if config_changed {
            if let Some(path) = &settings_path {
                if let Err(e) = Settings::from_config(&config).save(path) {
                    eprintln!("Failed to save settings: {}", e);
                }
            }
        }

        drain_notifications(&mut notification_rx);
    }

    metronome.stop();

    if let Some(path) = settings_path {
        match Settings::from_config(&config).save(&path) {
            Ok(()) => println!("Settings saved to {}", path.display()),
            Err(e) => eprintln!("Failed to save settings: {}", e),
        }
    }

    println!("Bye!");
}
