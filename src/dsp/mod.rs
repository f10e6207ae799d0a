//! DSP — the built-in audio primitive.
//!
//! Oscillator, gain stage and analyser tap are pure Rust, rendered in
//! fixed quanta. The same code feeds an AudioWorklet (via WASM) and the
//! offline WAV renderer.

pub mod analyser;
pub mod oscillator;
pub mod renderer;
pub mod synth;
pub mod voice;
