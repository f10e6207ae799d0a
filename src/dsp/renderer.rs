//! WAV renderer — renders a steady tone offline to a WAV byte buffer.

use crate::engine::{ToneEngine, Volume};
use crate::error::AudioError;

use super::oscillator::Waveform;
use super::synth::Synth;

/// Most mono frames a 16-bit WAV can hold: the RIFF size field
/// (36 + data bytes) must fit in a `u32`.
pub const MAX_RENDER_FRAMES: usize = ((u32::MAX - 36) / 2) as usize;

/// Render `seconds` of a tone through the same engine and synth used live.
pub fn render_tone(
    frequency: f64,
    waveform: Waveform,
    volume: Volume,
    seconds: f64,
    sample_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    let synth = Synth::new(sample_rate as f64, None)?;
    let frames = frame_count(seconds, sample_rate)?;
    let mut engine = ToneEngine::new(synth, frequency, waveform, volume);
    engine.start(frequency, waveform, volume)?;

    let samples = engine.backend_mut().render_frames(frames);
    engine.stop();
    Ok(samples)
}

/// Non-positive or NaN durations render nothing.
fn frame_count(seconds: f64, sample_rate: u32) -> Result<usize, AudioError> {
    if seconds.is_nan() || seconds <= 0.0 {
        return Ok(0);
    }
    let frames = (seconds * sample_rate as f64).round();
    if frames > MAX_RENDER_FRAMES as f64 {
        return Err(AudioError::InvalidDuration(seconds));
    }
    Ok(frames as usize)
}

/// Render a tone to a mono 16-bit PCM WAV file as bytes.
pub fn render_tone_wav(
    frequency: f64,
    waveform: Waveform,
    volume: Volume,
    seconds: f64,
    sample_rate: u32,
) -> Result<Vec<u8>, AudioError> {
    let samples = render_tone(frequency, waveform, volume, seconds, sample_rate)?;
    let pcm: Vec<i16> = samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect();
    Ok(encode_wav(&pcm, sample_rate, 1))
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    // callers stay within MAX_RENDER_FRAMES
    let data_size = u32::try_from(samples.len() * 2).unwrap_or(u32::MAX - 36);
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
