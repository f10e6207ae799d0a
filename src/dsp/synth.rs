//! Synth — the built-in audio backend.
//!
//! Voices are rendered in pure Rust so the same code runs inside an
//! AudioWorklet (via WASM) and offline. Scheduling calls are queued and
//! applied, in order, at the start of the next `render` call; one call is
//! one rendering quantum.

use tracing::{debug, warn};

use crate::backend::{AudioBackend, SessionId, VoiceSpec};
use crate::error::AudioError;

use super::analyser::Analyser;
use super::voice::Voice;

/// Frames per quantum in Web Audio. Hosts that pull with their own block
/// size still get per-call semantics.
pub const RENDER_QUANTUM: usize = 128;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Start { id: SessionId, spec: VoiceSpec },
    Stop(SessionId),
    SetFrequency(SessionId, f64),
    SetGain(SessionId, f64),
}

#[derive(Debug, Clone)]
pub struct Synth {
    sample_rate: f64,
    voices: Vec<(SessionId, Voice)>,
    pending: Vec<Command>,
    next_id: u64,
    analyser: Option<Analyser>,
    frames_rendered: u64,
}

impl Synth {
    pub fn new(sample_rate: f64, analyser: Option<Analyser>) -> Result<Self, AudioError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        Ok(Synth {
            sample_rate,
            voices: Vec::new(),
            pending: Vec::new(),
            next_id: 0,
            analyser,
            frames_rendered: 0,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Voices currently producing sound (after the last applied quantum).
    pub fn live_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice(&self, id: SessionId) -> Option<&Voice> {
        self.voices.iter().find(|(v, _)| *v == id).map(|(_, voice)| voice)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Apply queued commands, then fill `out` with mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        self.apply_pending();

        for frame in out.iter_mut() {
            let mut sum = 0.0;
            for (_, voice) in self.voices.iter_mut() {
                sum += voice.next_sample();
            }
            *frame = sum as f32;
            if let Some(analyser) = self.analyser.as_mut() {
                analyser.push(*frame);
            }
        }

        self.frames_rendered += out.len() as u64;
    }

    /// Render `frames` samples into a fresh buffer, one quantum at a time.
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        for chunk in out.chunks_mut(RENDER_QUANTUM) {
            self.render(chunk);
        }
        out
    }

    fn apply_pending(&mut self) {
        for command in std::mem::take(&mut self.pending) {
            match command {
                Command::Start { id, spec } => {
                    let voice = Voice::new(spec.waveform, spec.frequency, spec.gain, self.sample_rate);
                    self.voices.push((id, voice));
                }
                Command::Stop(id) => {
                    let before = self.voices.len();
                    self.voices.retain(|(v, _)| *v != id);
                    if self.voices.len() == before {
                        warn!(session = id.0, "stop for a session that is not live");
                    }
                }
                Command::SetFrequency(id, frequency) => match self.voice_mut(id) {
                    Some(voice) => voice.set_frequency(frequency),
                    None => warn!(session = id.0, "dropped frequency change for released session"),
                },
                Command::SetGain(id, gain) => match self.voice_mut(id) {
                    Some(voice) => voice.set_gain(gain),
                    None => warn!(session = id.0, "dropped gain change for released session"),
                },
            }
        }
    }

    fn voice_mut(&mut self, id: SessionId) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|(v, _)| *v == id)
            .map(|(_, voice)| voice)
    }
}

impl AudioBackend for Synth {
    fn start_voice(&mut self, spec: VoiceSpec) -> Result<SessionId, AudioError> {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        debug!(session = id.0, waveform = %spec.waveform, frequency = spec.frequency, "queue start");
        self.pending.push(Command::Start { id, spec });
        Ok(id)
    }

    fn stop_voice(&mut self, id: SessionId) {
        self.pending.push(Command::Stop(id));
    }

    fn set_frequency(&mut self, id: SessionId, frequency: f64) {
        self.pending.push(Command::SetFrequency(id, frequency));
    }

    fn set_gain(&mut self, id: SessionId, gain: f64) {
        self.pending.push(Command::SetGain(id, gain));
    }

    fn analyser(&self) -> Option<&Analyser> {
        self.analyser.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;

    fn spec(frequency: f64) -> VoiceSpec {
        VoiceSpec {
            waveform: Waveform::Sine,
            frequency,
            gain: 0.5,
        }
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    #[test]
    fn rejects_bad_sample_rate() {
        assert!(Synth::new(0.0, None).is_err());
        assert!(Synth::new(f64::NAN, None).is_err());
        assert!(Synth::new(44100.0, None).is_ok());
    }

    #[test]
    fn silent_without_voices() {
        let mut synth = Synth::new(44100.0, None).unwrap();
        let out = synth.render_frames(512);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn start_takes_effect_on_next_quantum() {
        let mut synth = Synth::new(44100.0, None).unwrap();
        let id = synth.start_voice(spec(440.0)).unwrap();
        assert_eq!(synth.live_voices(), 0, "nothing applied before render");

        let out = synth.render_frames(RENDER_QUANTUM * 4);
        assert_eq!(synth.live_voices(), 1);
        assert!(synth.voice(id).is_some());
        assert!(peak(&out) > 0.4, "voice should be audible");
    }

    #[test]
    fn commands_apply_in_order() {
        let mut synth = Synth::new(44100.0, None).unwrap();
        let id = synth.start_voice(spec(440.0)).unwrap();
        synth.set_frequency(id, 880.0);
        synth.set_gain(id, 0.25);
        synth.render_frames(RENDER_QUANTUM);

        let voice = synth.voice(id).expect("voice is live");
        assert_eq!(voice.oscillator.frequency(), 880.0);
        assert_eq!(voice.gain(), 0.25);
    }

    #[test]
    fn stale_commands_are_dropped() {
        let mut synth = Synth::new(44100.0, None).unwrap();
        let id = synth.start_voice(spec(440.0)).unwrap();
        synth.render_frames(RENDER_QUANTUM);
        synth.stop_voice(id);
        synth.set_frequency(id, 1000.0);
        synth.set_gain(id, 1.0);
        synth.render_frames(RENDER_QUANTUM);

        assert_eq!(synth.live_voices(), 0);
        let out = synth.render_frames(RENDER_QUANTUM);
        assert!(out.iter().all(|&s| s == 0.0), "released voice must stay silent");
    }

    #[test]
    fn ids_are_never_reused() {
        let mut synth = Synth::new(44100.0, None).unwrap();
        let a = synth.start_voice(spec(440.0)).unwrap();
        synth.stop_voice(a);
        let b = synth.start_voice(spec(440.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn analyser_sees_output() {
        let mut synth = Synth::new(44100.0, Some(Analyser::new(256))).unwrap();
        synth.start_voice(spec(440.0)).unwrap();
        let out = synth.render_frames(1024);

        let mut tapped = [0.0f32; 256];
        let analyser = synth.analyser().expect("tap configured");
        assert_eq!(analyser.time_domain_data(&mut tapped), 256);
        assert_eq!(&tapped[..], &out[1024 - 256..]);
        assert_eq!(synth.frames_rendered(), 1024);
    }
}
