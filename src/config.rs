//! Tone generator configuration.
//!
//! One core serves both front-ends: the oscilloscope build
//! ([`ToneConfig::default`]) and the plain build ([`ToneConfig::minimal`]).

use serde::{Deserialize, Serialize};

use crate::backend::AudioBackend;
use crate::dsp::analyser::Analyser;
use crate::dsp::oscillator::Waveform;
use crate::dsp::synth::Synth;
use crate::engine::{ToneEngine, Volume};
use crate::error::{AudioError, ToneError};
use crate::input::{InputCoordinator, TriggerMode};
use crate::pitch::{Note, Octave, Pitch};
use crate::surface::DisplaySurface;
use crate::visual::VisualizationFeed;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub sample_rate: f64,
    /// Volume change per wheel notch, in percent.
    pub volume_step: u8,
    pub visualization: bool,
    pub fft_size: usize,
    pub mode: TriggerMode,
    pub note: Note,
    pub octave: Octave,
    pub waveform: Waveform,
    pub volume: Volume,
}

impl Default for ToneConfig {
    fn default() -> Self {
        ToneConfig {
            sample_rate: 44100.0,
            volume_step: 5,
            visualization: true,
            fft_size: 2048,
            mode: TriggerMode::Toggle,
            note: Note::A,
            octave: Octave::new(4),
            waveform: Waveform::Sine,
            volume: Volume::default(),
        }
    }
}

impl ToneConfig {
    /// No oscilloscope, fine-grained volume steps.
    pub fn minimal() -> Self {
        ToneConfig {
            volume_step: 1,
            visualization: false,
            ..ToneConfig::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ToneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn volume_step(&self) -> i32 {
        self.volume_step.clamp(1, 100) as i32
    }

    pub fn pitch(&self) -> Pitch {
        Pitch::new(self.note, self.octave)
    }

    pub fn build_synth(&self) -> Result<Synth, AudioError> {
        let analyser = self.visualization.then(|| Analyser::new(self.fft_size));
        Synth::new(self.sample_rate, analyser)
    }

    /// Wire synth, engine, feed and coordinator together around `display`.
    pub fn build<D: DisplaySurface>(&self, display: D) -> Result<InputCoordinator<Synth, D>, AudioError> {
        let synth = self.build_synth()?;
        let feed = synth.analyser().map(VisualizationFeed::for_analyser);
        let pitch = self.pitch();
        let engine = ToneEngine::new(synth, pitch.frequency(), self.waveform, self.volume);
        Ok(InputCoordinator::new(
            engine,
            display,
            pitch,
            self.mode,
            self.volume_step(),
            feed,
        ))
    }
}
