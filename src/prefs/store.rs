// Settings persistence (JSON in the user's config directory)

use crate::metronome::config::{MetronomeConfig, NoteValue};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("No configuration directory on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tempo settings persisted between sessions
///
/// `note_value` is stored as the raw denominator so the file stays
/// hand-editable. Values pass back through the clamping constructors on
/// load; unknown denominators fall back to a quarter note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub bpm: u32,
    pub beats_per_measure: u32,
    pub note_value: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: MetronomeConfig::DEFAULT_BPM,
            beats_per_measure: MetronomeConfig::DEFAULT_BEATS_PER_MEASURE,
            note_value: NoteValue::Quarter.as_u32(),
        }
    }
}

impl Settings {
    /// Capture the current configuration for saving
    pub fn from_config(config: &MetronomeConfig) -> Self {
        let snapshot = config.snapshot();
        Self {
            bpm: snapshot.bpm,
            beats_per_measure: snapshot.beats_per_measure,
            note_value: snapshot.note_value.as_u32(),
        }
    }

    /// Build a live configuration from these settings
    pub fn into_config(self) -> Arc<MetronomeConfig> {
        MetronomeConfig::with_values(
            self.bpm,
            self.beats_per_measure,
            NoteValue::from_raw(self.note_value).unwrap_or_default(),
        )
    }

    /// Default settings path: <config_dir>/blues-metronome/settings.json
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join("blues-metronome").join("settings.json"))
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            return Self::default();
        }

        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    /// Save settings as pretty JSON, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_save_load_cycle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings {
            bpm: 180,
            beats_per_measure: 3,
            note_value: 8,
        };

        settings.save(&path).unwrap();
        assert!(path.exists());

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.json");

        Settings::default().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.json");

        let settings = Settings::load_or_default(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let settings = Settings::load_or_default(&path);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_into_config_clamps_hand_edited_values() {
        let settings = Settings {
            bpm: 9999,
            beats_per_measure: 0,
            note_value: 7,
        };

        let config = settings.into_config();
        assert_eq!(config.bpm(), 300);
        assert_eq!(config.beats_per_measure(), 1);
        assert_eq!(config.note_value(), NoteValue::Quarter);
    }

    #[test]
    fn test_from_config_round_trip() {
        let config = MetronomeConfig::with_values(140, 6, NoteValue::Eighth);

        let settings = Settings::from_config(&config);
        assert_eq!(settings.bpm, 140);
        assert_eq!(settings.beats_per_measure, 6);
        assert_eq!(settings.note_value, 8);

        let restored = settings.into_config();
        assert_eq!(restored.snapshot(), config.snapshot());
    }
}
