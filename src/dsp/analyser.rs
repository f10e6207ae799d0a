//! Rolling time-domain window over the rendered output.
//!
//! Sits between the gain stage and the output sink. Only the most recent
//! `fft_size` samples are kept; reads copy the newest samples oldest-first.

pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

#[derive(Debug, Clone)]
pub struct Analyser {
    window: Vec<f32>,
    /// Index the next sample is written to; also the oldest sample.
    cursor: usize,
}

impl Analyser {
    /// `fft_size` is rounded up to a power of two within
    /// `[MIN_FFT_SIZE, MAX_FFT_SIZE]`.
    pub fn new(fft_size: usize) -> Self {
        let size = fft_size
            .clamp(MIN_FFT_SIZE, MAX_FFT_SIZE)
            .next_power_of_two();
        Analyser {
            window: vec![0.0; size],
            cursor: 0,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Number of samples a frame of visualization data covers.
    pub fn frequency_bin_count(&self) -> usize {
        self.window.len() / 2
    }

    pub fn push(&mut self, sample: f32) {
        self.window[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % self.window.len();
    }

    /// Copy the newest `out.len()` samples (at most `fft_size`) oldest-first.
    /// Returns how many were written; the rest of `out` is left untouched.
    pub fn time_domain_data(&self, out: &mut [f32]) -> usize {
        let size = self.window.len();
        let n = out.len().min(size);
        let start = (self.cursor + size - n) % size;
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            *slot = self.window[(start + i) % size];
        }
        n
    }

    /// Same as [`time_domain_data`](Self::time_domain_data) in the unsigned
    /// byte domain: 0.0 maps to 128, ±1.0 to 255/0, anything beyond saturates.
    pub fn byte_time_domain_data(&self, out: &mut [u8]) -> usize {
        let size = self.window.len();
        let n = out.len().min(size);
        let start = (self.cursor + size - n) % size;
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            *slot = to_byte(self.window[(start + i) % size]);
        }
        n
    }
}

fn to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}
