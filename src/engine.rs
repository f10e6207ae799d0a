//! Tone lifecycle — owns the single live oscillator session.
//!
//! States are `Idle` and `Playing`. A session exists exactly while
//! `Playing`, and there is never more than one: every path that builds a
//! new session tears the old one down first.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{AudioBackend, SessionId, VoiceSpec};
use crate::dsp::analyser::Analyser;
use crate::dsp::oscillator::Waveform;
use crate::error::AudioError;

/// Volume as an integer percentage, always within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Volume(u8);

impl Volume {
    pub const MIN: Volume = Volume(0);
    pub const MAX: Volume = Volume(100);

    pub fn new(percent: i32) -> Self {
        Volume(percent.clamp(0, 100) as u8)
    }

    pub fn percent(self) -> i32 {
        self.0 as i32
    }

    /// Linear synthesis gain in `[0.0, 1.0]`.
    pub fn gain(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn offset(self, delta: i32) -> Self {
        Volume::new(self.percent().saturating_add(delta))
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume(50)
    }
}

impl From<i32> for Volume {
    fn from(percent: i32) -> Self {
        Volume::new(percent)
    }
}

impl From<Volume> for i32 {
    fn from(volume: Volume) -> Self {
        volume.percent()
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Idle,
    Playing,
}

/// What an engine operation did to the signal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle → Playing.
    Started,
    /// Playing → Playing through teardown and rebuild; audible gap.
    Restarted,
    /// Playing → Idle.
    Stopped,
    /// Live parameter change scheduled on the current session.
    Adjusted,
    /// Idle-state bookkeeping only, or nothing at all.
    Unchanged,
}

/// The live oscillator + gain pairing. Only the engine ever holds one.
#[derive(Debug)]
struct ToneSession {
    id: SessionId,
}

pub struct ToneEngine<B: AudioBackend> {
    backend: B,
    session: Option<ToneSession>,
    waveform: Waveform,
    volume: Volume,
    frequency: f64,
}

impl<B: AudioBackend> ToneEngine<B> {
    pub fn new(backend: B, frequency: f64, waveform: Waveform, volume: Volume) -> Self {
        ToneEngine {
            backend,
            session: None,
            waveform,
            volume,
            frequency,
        }
    }

    pub fn state(&self) -> PlayState {
        if self.session.is_some() {
            PlayState::Playing
        } else {
            PlayState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn analyser(&self) -> Option<&Analyser> {
        self.backend.analyser()
    }

    /// Build a fresh session with the given parameters, tearing down any
    /// existing one first. Always restarts the chain, even if playing.
    ///
    /// On failure the engine is left `Idle` with the new parameters recorded.
    pub fn start(
        &mut self,
        frequency: f64,
        waveform: Waveform,
        volume: Volume,
    ) -> Result<Transition, AudioError> {
        let was_playing = self.teardown();

        if valid_frequency(frequency) {
            self.frequency = frequency;
        } else {
            debug!(frequency, "ignoring invalid start frequency, keeping {}", self.frequency);
        }
        self.waveform = waveform;
        self.volume = volume;

        let spec = VoiceSpec {
            waveform: self.waveform,
            frequency: self.frequency,
            gain: self.volume.gain(),
        };
        let id = self.backend.start_voice(spec).map_err(|e| {
            warn!(error = %e, "could not start tone");
            e
        })?;
        self.session = Some(ToneSession { id });

        info!(
            session = id.0,
            frequency = self.frequency,
            waveform = %self.waveform,
            volume = self.volume.percent(),
            "tone started"
        );
        Ok(if was_playing {
            Transition::Restarted
        } else {
            Transition::Started
        })
    }

    /// Start with the engine's current parameters.
    pub fn play(&mut self) -> Result<Transition, AudioError> {
        self.start(self.frequency, self.waveform, self.volume)
    }

    /// Release the current session; no-op when idle.
    pub fn stop(&mut self) -> Transition {
        if self.teardown() {
            info!("tone stopped");
            Transition::Stopped
        } else {
            Transition::Unchanged
        }
    }

    /// Record a new frequency and, if playing, schedule it on the live
    /// oscillator. Non-positive or non-finite input is ignored outright.
    pub fn retune(&mut self, frequency: f64) -> Transition {
        if !valid_frequency(frequency) {
            debug!(frequency, "ignoring invalid frequency");
            return Transition::Unchanged;
        }
        self.frequency = frequency;

        match &self.session {
            Some(session) => {
                self.backend.set_frequency(session.id, frequency);
                debug!(session = session.id.0, frequency, "retuned");
                Transition::Adjusted
            }
            None => Transition::Unchanged,
        }
    }

    /// Set volume from a raw percentage, clamped into `[0, 100]`.
    pub fn set_volume(&mut self, percent: i32) -> Transition {
        self.apply_volume(Volume::new(percent))
    }

    pub fn apply_volume(&mut self, volume: Volume) -> Transition {
        self.volume = volume;

        match &self.session {
            Some(session) => {
                self.backend.set_gain(session.id, volume.gain());
                debug!(session = session.id.0, volume = volume.percent(), "gain changed");
                Transition::Adjusted
            }
            None => Transition::Unchanged,
        }
    }

    /// A live oscillator cannot change shape, so a playing engine
    /// rebuilds its session with the new waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<Transition, AudioError> {
        self.waveform = waveform;
        if self.is_playing() {
            self.play()
        } else {
            Ok(Transition::Unchanged)
        }
    }

    /// Drop the session reference before asking the backend to release
    /// it, so nothing can be scheduled on it afterwards.
    fn teardown(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                self.backend.stop_voice(session.id);
                true
            }
            None => false,
        }
    }
}

fn valid_frequency(frequency: f64) -> bool {
    frequency.is_finite() && frequency > 0.0
}
