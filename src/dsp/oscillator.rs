//! Anti-aliased oscillators using PolyBLEP.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Supported waveform shapes, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    /// The next waveform in cycling order, wrapping after triangle.
    pub fn next(self) -> Waveform {
        let idx = Waveform::ALL.iter().position(|&w| w == self).unwrap_or(0);
        Waveform::ALL[(idx + 1) % Waveform::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            other => Err(ParseError::UnknownWaveform(other.to_string())),
        }
    }
}

/// A band-limited oscillator with anti-aliasing (PolyBLEP).
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f64,
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Change pitch without touching phase, so a retune does not click.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Phase increment per sample.
    fn phase_inc(&self) -> f64 {
        self.frequency / self.sample_rate
    }

    /// Generate the next sample.
    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc();
        let sample = match self.waveform {
            Waveform::Sine => self.sine(),
            Waveform::Sawtooth => self.sawtooth(inc),
            Waveform::Square => self.square(inc),
            Waveform::Triangle => self.triangle(),
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        sample
    }

    fn sine(&self) -> f64 {
        (2.0 * PI * self.phase).sin()
    }

    /// Naive sawtooth: rises from -1 to +1, then drops.
    /// PolyBLEP corrects the discontinuity at the wrap.
    fn sawtooth(&self, inc: f64) -> f64 {
        let naive = 2.0 * self.phase - 1.0;
        naive - poly_blep(self.phase, inc)
    }

    fn square(&self, inc: f64) -> f64 {
        let mut value = if self.phase < 0.5 { 1.0 } else { -1.0 };
        value += poly_blep(self.phase, inc);
        value -= poly_blep((self.phase + 0.5) % 1.0, inc);
        value
    }

    /// Piecewise linear: -1→+1 over [0, 0.5), +1→-1 over [0.5, 1).
    /// No discontinuity in value, so no BLEP correction.
    fn triangle(&self) -> f64 {
        if self.phase < 0.5 {
            4.0 * self.phase - 1.0
        } else {
            3.0 - 4.0 * self.phase
        }
    }
}

/// PolyBLEP (Polynomial Band-Limited Step) anti-aliasing correction.
///
/// `t` is the phase [0, 1), `dt` is the phase increment per sample.
/// Returns a correction value to subtract from the naive waveform
/// at discontinuities.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(waveform: Waveform, frequency: f64, limit: f64) {
        let mut osc = Oscillator::new(waveform, frequency, 44100.0);
        for _ in 0..44100 {
            let s = osc.next_sample();
            assert!(s.abs() <= limit, "{waveform} out of range: {s}");
        }
    }

    #[test]
    fn sine_zero_at_start() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        let sample = osc.next_sample();
        assert!(sample.abs() < 1e-10, "Sine should start near 0, got {sample}");
    }

    #[test]
    fn waveform_ranges() {
        run(Waveform::Sine, 440.0, 1.0);
        run(Waveform::Triangle, 440.0, 1.0);
        run(Waveform::Sawtooth, 440.0, 1.5);
        run(Waveform::Square, 440.0, 1.5);
    }

    #[test]
    fn survives_frequency_above_sample_rate() {
        // frequency_of(B, 9) is ~15.8 kHz; entered frequencies can be anything
        run(Waveform::Sine, 100_000.0, 1.0);
    }

    #[test]
    fn set_frequency_keeps_phase() {
        let mut a = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        for _ in 0..10 {
            a.next_sample();
        }
        let before = a.phase;
        a.set_frequency(880.0);
        assert_eq!(a.phase, before, "retune must not reset phase");
        assert_eq!(a.frequency(), 880.0);
    }

    #[test]
    fn cycling_four_times_returns_to_start() {
        for start in Waveform::ALL {
            let mut w = start;
            for _ in 0..4 {
                w = w.next();
            }
            assert_eq!(w, start);
        }
        assert_eq!(Waveform::Sine.next(), Waveform::Square);
        assert_eq!(Waveform::Triangle.next(), Waveform::Sine);
    }

    #[test]
    fn parse_names() {
        for w in Waveform::ALL {
            assert_eq!(w.name().parse::<Waveform>(), Ok(w));
        }
        assert_eq!("saw".parse::<Waveform>(), Ok(Waveform::Sawtooth));
        assert!("noise".parse::<Waveform>().is_err());
    }
}
