use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToneError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// A name coming from the host (select box value, key binding, config)
/// that does not map onto one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown note name '{0}'")]
    UnknownNote(String),
    #[error("unknown waveform '{0}'")]
    UnknownWaveform(String),
    #[error("unknown trigger mode '{0}'")]
    UnknownTriggerMode(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    /// The environment refused to give us an output (no device, denied
    /// autoplay, closed context).
    #[error("audio output unavailable: {0}")]
    Unavailable(String),
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f64),
    #[error("render of {0} seconds exceeds the WAV size limit")]
    InvalidDuration(f64),
}
