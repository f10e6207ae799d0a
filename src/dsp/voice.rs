//! One oscillator feeding one gain stage.

use super::oscillator::{Oscillator, Waveform};

#[derive(Debug, Clone)]
pub struct Voice {
    pub oscillator: Oscillator,
    /// Linear gain in [0, 1].
    gain: f64,
}

impl Voice {
    pub fn new(waveform: Waveform, frequency: f64, gain: f64, sample_rate: f64) -> Self {
        Voice {
            oscillator: Oscillator::new(waveform, frequency, sample_rate),
            gain: gain.clamp(0.0, 1.0),
        }
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.oscillator.set_frequency(frequency);
    }

    pub fn next_sample(&mut self) -> f64 {
        self.oscillator.next_sample() * self.gain
    }
}
