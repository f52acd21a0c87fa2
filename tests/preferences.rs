// Settings persistence across a simulated session boundary

use blues_metronome::{MetronomeConfig, NoteValue, Settings};
use tempfile::tempdir;

#[test]
fn test_settings_survive_a_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    // Session one: user dials in a shuffle at 168 BPM in 12/8
    let config = MetronomeConfig::with_values(168, 12, NoteValue::Eighth);
    Settings::from_config(&config).save(&path).unwrap();

    // Session two: the same values come back through the clamping boundary
    let restored = Settings::load_or_default(&path).into_config();
    assert_eq!(restored.bpm(), 168);
    assert_eq!(restored.beats_per_measure(), 12);
    assert_eq!(restored.note_value(), NoteValue::Eighth);
}

#[test]
fn test_hand_edited_file_is_sanitized_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    // A file edited outside the app, with values the UI would never produce
    std::fs::write(
        &path,
        r#"{ "bpm": 1200, "beats_per_measure": 40, "note_value": 3 }"#,
    )
    .unwrap();

    let config = Settings::load_or_default(&path).into_config();
    assert_eq!(config.bpm(), 300);
    assert_eq!(config.beats_per_measure(), 12);
    assert_eq!(config.note_value(), NoteValue::Quarter);
}

#[test]
fn test_garbage_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not json at all").unwrap();

    let settings = Settings::load_or_default(&path);
    assert_eq!(settings, Settings::default());

    let config = settings.into_config();
    assert_eq!(config.bpm(), 100);
    assert_eq!(config.beats_per_measure(), 4);
    assert_eq!(config.note_value(), NoteValue::Quarter);
}

#[test]
fn test_default_path_points_into_config_dir() {
    // Skipped on platforms without a config directory
    if let Ok(path) = Settings::default_path() {
        assert!(path.ends_with("blues-metronome/settings.json"));
    }
}
