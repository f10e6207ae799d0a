pub mod backend;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod pitch;
pub mod surface;
pub mod visual;
pub mod web;

use crate::dsp::oscillator::Waveform;
use crate::engine::Volume;
use crate::pitch::{Note, Octave};
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the tonegen_core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: frequency in Hz of a note name (`"A"`, `"E♭"`, `"F#"`)
/// in an octave. The octave is clamped to 1..=9.
#[wasm_bindgen]
pub fn note_frequency(note: &str, octave: i32) -> Result<f64, JsValue> {
    let note: Note = note.parse().map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(pitch::frequency_of(note, Octave::new(octave)))
}

/// WASM-exposed: the nearest `{ note, octave }` to a frequency, or `null`
/// when the frequency is not a positive number.
#[wasm_bindgen]
pub fn nearest_pitch(frequency: f64) -> Result<JsValue, JsValue> {
    match pitch::pitch_of(frequency) {
        Some(p) => serde_wasm_bindgen::to_value(&p).map_err(|e| JsValue::from_str(&format!("{e}"))),
        None => Ok(JsValue::NULL),
    }
}

/// WASM-exposed: render a steady tone to a mono WAV byte array.
#[wasm_bindgen]
pub fn render_tone_wav(
    frequency: f64,
    waveform: &str,
    volume: i32,
    seconds: f64,
    sample_rate: u32,
) -> Result<Vec<u8>, JsValue> {
    let waveform: Waveform = waveform
        .parse()
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    dsp::renderer::render_tone_wav(frequency, waveform, Volume::new(volume), seconds, sample_rate)
        .map_err(|e| JsValue::from_str(&format!("{e}")))
}
