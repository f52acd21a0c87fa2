// Error types for the metronome engine

/// Metronome error types
#[derive(Debug, thiserror::Error)]
pub enum MetronomeError {
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
