//! The seam between the Tone Engine and whatever actually makes sound.
//!
//! A backend owns the audio primitives (oscillator, gain stage, analyser
//! tap, output sink). The engine only ever talks to it through session
//! ids, so a released session can be named but never touched.

use serde::Serialize;

use crate::dsp::analyser::Analyser;
use crate::dsp::oscillator::Waveform;
use crate::error::AudioError;

/// Opaque handle for one oscillator + gain pairing inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub u64);

/// Everything needed to build a voice: oscillator shape and pitch, and
/// the linear gain the gain stage starts at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSpec {
    pub waveform: Waveform,
    pub frequency: f64,
    pub gain: f64,
}

/// Scheduling interface to the audio primitive.
///
/// Every call is a request that takes effect at the backend's next
/// rendering quantum. Calls naming a session that is no longer live
/// must be ignored.
pub trait AudioBackend {
    /// Build oscillator → gain → (tap) → sink and start it.
    fn start_voice(&mut self, spec: VoiceSpec) -> Result<SessionId, AudioError>;

    /// Halt and release the voice.
    fn stop_voice(&mut self, id: SessionId);

    fn set_frequency(&mut self, id: SessionId, frequency: f64);

    fn set_gain(&mut self, id: SessionId, gain: f64);

    /// The visualization tap, if this backend has one.
    fn analyser(&self) -> Option<&Analyser> {
        None
    }
}
