//! One waveform frame per display refresh.
//!
//! Each call re-reads the analyser tap; nothing is buffered across frames.
//! Without a tap (visualization disabled or backend has none) the frame
//! is a flat line.

use crate::dsp::analyser::Analyser;

/// Byte value of a zero-amplitude sample.
pub const CENTER: u8 = 128;

#[derive(Debug, Clone)]
pub struct VisualizationFeed {
    buffer: Vec<u8>,
}

/// A borrowed view of the most recent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformFrame<'a> {
    /// Unsigned byte samples, 128 = silence.
    pub samples: &'a [u8],
    /// Whether a tone is sounding; surfaces dim the trace when false.
    pub active: bool,
}

impl VisualizationFeed {
    pub fn new(frame_len: usize) -> Self {
        VisualizationFeed {
            buffer: vec![CENTER; frame_len],
        }
    }

    /// Sized like the analyser's frequency-bin count.
    pub fn for_analyser(analyser: &Analyser) -> Self {
        VisualizationFeed::new(analyser.frequency_bin_count())
    }

    pub fn frame_len(&self) -> usize {
        self.buffer.len()
    }

    /// Sample the tap into this feed's buffer.
    pub fn sample(&mut self, tap: Option<&Analyser>, active: bool) -> WaveformFrame<'_> {
        self.buffer.fill(CENTER);
        if let Some(analyser) = tap {
            let len = self.buffer.len();
            let n = analyser.byte_time_domain_data(&mut self.buffer);
            // fewer samples than requested: keep them at the end, newest last
            if n < len {
                self.buffer.copy_within(0..n, len - n);
                self.buffer[..len - n].fill(CENTER);
            }
        }
        WaveformFrame {
            samples: &self.buffer,
            active,
        }
    }
}

impl WaveformFrame<'_> {
    /// Sample `i` back in the [-1, 1] amplitude domain.
    pub fn amplitude(&self, i: usize) -> Option<f32> {
        self.samples
            .get(i)
            .map(|&b| (b as f32 - CENTER as f32) / CENTER as f32)
    }

    /// Polyline for a `width` × `height` canvas: x advances evenly across
    /// the width, y is `(b / 128) * height / 2`, closing on the centre line.
    pub fn points(&self, width: f32, height: f32) -> Vec<(f32, f32)> {
        let mut points = Vec::with_capacity(self.samples.len() + 1);
        if self.samples.is_empty() {
            return points;
        }
        let slice = width / self.samples.len() as f32;
        for (i, &b) in self.samples.iter().enumerate() {
            let v = b as f32 / CENTER as f32;
            points.push((i as f32 * slice, v * height / 2.0));
        }
        points.push((width, height / 2.0));
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_without_tap() {
        let mut feed = VisualizationFeed::new(16);
        let frame = feed.sample(None, false);
        assert_eq!(frame.samples.len(), 16);
        assert!(frame.samples.iter().all(|&b| b == CENTER));
        assert!(!frame.active);
    }

    #[test]
    fn resamples_every_frame() {
        let mut analyser = Analyser::new(32);
        let mut feed = VisualizationFeed::for_analyser(&analyser);
        assert_eq!(feed.frame_len(), 16);

        for _ in 0..32 {
            analyser.push(0.5);
        }
        let first = feed.sample(Some(&analyser), true).samples.to_vec();
        assert!(first.iter().all(|&b| b == 192));

        for _ in 0..32 {
            analyser.push(0.0);
        }
        let second = feed.sample(Some(&analyser), true);
        assert!(second.samples.iter().all(|&b| b == CENTER), "no carry-over between frames");
    }

    #[test]
    fn short_tap_right_aligned() {
        let mut analyser = Analyser::new(32);
        for _ in 0..32 {
            analyser.push(-1.0);
        }
        let mut feed = VisualizationFeed::new(40);
        let frame = feed.sample(Some(&analyser), true);
        assert!(frame.samples[..8].iter().all(|&b| b == CENTER));
        assert!(frame.samples[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn canvas_points() {
        let samples = [128u8, 255, 0, 128];
        let frame = WaveformFrame {
            samples: &samples,
            active: true,
        };
        let pts = frame.points(400.0, 100.0);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (0.0, 50.0));
        assert_eq!(pts[2], (200.0, 0.0));
        assert_eq!(pts[4], (400.0, 50.0));
        assert_eq!(frame.amplitude(0), Some(0.0));
        assert_eq!(frame.amplitude(2), Some(-1.0));
        assert_eq!(frame.amplitude(9), None);
    }
}
