//! Where the core pushes what should be on screen.
//!
//! The surface only renders; it never calls back into the core.

use serde::Serialize;

use crate::dsp::oscillator::Waveform;
use crate::engine::Volume;
use crate::input::TriggerMode;
use crate::pitch::{Note, Octave};
use crate::visual::WaveformFrame;

pub trait DisplaySurface {
    fn show_controls(&mut self, view: &ControlView);
    fn show_status(&mut self, status: &PlayStatus);
    fn draw_waveform(&mut self, frame: &WaveformFrame<'_>);
}

/// Current control values as the surface should present them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlView {
    pub note: Note,
    pub octave: Octave,
    pub frequency: f64,
    /// Two decimals, e.g. `"440.00"`.
    pub frequency_label: String,
    pub waveform: Waveform,
    pub volume: Volume,
    /// e.g. `"50%"`.
    pub volume_label: String,
    pub mode: TriggerMode,
}

impl ControlView {
    pub fn new(
        note: Note,
        octave: Octave,
        frequency: f64,
        waveform: Waveform,
        volume: Volume,
        mode: TriggerMode,
    ) -> Self {
        ControlView {
            note,
            octave,
            frequency,
            frequency_label: format!("{frequency:.2}"),
            waveform,
            volume,
            volume_label: volume.to_string(),
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PlayStatus {
    Playing,
    #[default]
    Stopped,
    /// Audio could not be started; shown instead of crashing.
    Unavailable { reason: String },
}

impl PlayStatus {
    pub fn label(&self) -> &str {
        match self {
            PlayStatus::Playing => "Playing",
            PlayStatus::Stopped => "Stopped",
            PlayStatus::Unavailable { .. } => "Unavailable",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlayStatus::Playing)
    }
}

/// A surface that simply keeps the latest state, for hosts that poll
/// (the wasm bindings) and for tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    pub controls: Option<ControlView>,
    pub status: PlayStatus,
    pub waveform: Vec<u8>,
    pub waveform_active: bool,
    pub frames_drawn: u64,
}

impl DisplaySurface for ViewState {
    fn show_controls(&mut self, view: &ControlView) {
        self.controls = Some(view.clone());
    }

    fn show_status(&mut self, status: &PlayStatus) {
        self.status = status.clone();
    }

    fn draw_waveform(&mut self, frame: &WaveformFrame<'_>) {
        self.waveform.clear();
        self.waveform.extend_from_slice(frame.samples);
        self.waveform_active = frame.active;
        self.frames_drawn += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let view = ControlView::new(
            Note::A,
            Octave::new(4),
            440.0,
            Waveform::Sine,
            Volume::new(50),
            TriggerMode::Toggle,
        );
        assert_eq!(view.frequency_label, "440.00");
        assert_eq!(view.volume_label, "50%");
        assert_eq!(PlayStatus::Stopped.label(), "Stopped");
    }

    #[test]
    fn view_state_serializes_for_js() {
        let mut state = ViewState::default();
        state.show_status(&PlayStatus::Unavailable {
            reason: "denied".into(),
        });
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"]["state"], "unavailable");
        assert_eq!(json["status"]["reason"], "denied");
        assert_eq!(json["waveform_active"], false);
    }
}
