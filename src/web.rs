//! Browser bindings.
//!
//! `ToneGenerator` wraps the whole core for a page: DOM event handlers
//! forward into the input methods, an AudioWorklet pulls samples through
//! [`ToneGenerator::process`], and a `requestAnimationFrame` loop calls
//! [`ToneGenerator::draw_frame`] then reads [`ToneGenerator::view`].
//!
//! Methods returning `bool` report whether the event was consumed; the
//! page should call `preventDefault()` when they return `true`.

use wasm_bindgen::prelude::*;

use crate::config::ToneConfig;
use crate::dsp::synth::Synth;
use crate::error::AudioError;
use crate::input::{EventTarget, InputCoordinator, InputEvent, Key};
use crate::pitch::Direction;
use crate::surface::ViewState;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

fn direction(up: bool) -> Direction {
    if up { Direction::Up } else { Direction::Down }
}

fn target(editable: bool) -> EventTarget {
    if editable {
        EventTarget::Editable
    } else {
        EventTarget::Document
    }
}

#[wasm_bindgen]
pub struct ToneGenerator {
    coordinator: InputCoordinator<Synth, ViewState>,
}

impl ToneGenerator {
    pub fn with_config(config: &ToneConfig) -> Result<ToneGenerator, AudioError> {
        Ok(ToneGenerator {
            coordinator: config.build(ViewState::default())?,
        })
    }

    pub fn state(&self) -> &ViewState {
        self.coordinator.display()
    }

    fn handle(&mut self, event: InputEvent) -> bool {
        self.coordinator.handle(event)
    }
}

#[wasm_bindgen]
impl ToneGenerator {
    /// `config` is a partial `ToneConfig` object; `undefined` or `null`
    /// gives the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ToneGenerator, JsValue> {
        let config: ToneConfig = if config.is_undefined() || config.is_null() {
            ToneConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        ToneGenerator::with_config(&config).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn sample_rate(&self) -> f64 {
        self.coordinator.engine().backend().sample_rate()
    }

    pub fn click(&mut self) -> bool {
        self.handle(InputEvent::Click)
    }

    pub fn pointer_down(&mut self) -> bool {
        self.handle(InputEvent::PointerDown)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.handle(InputEvent::PointerUp)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.handle(InputEvent::PointerLeave)
    }

    pub fn touch_start(&mut self) -> bool {
        self.handle(InputEvent::TouchStart)
    }

    pub fn touch_end(&mut self) -> bool {
        self.handle(InputEvent::TouchEnd)
    }

    /// `code` is `KeyboardEvent.code`; `editable` is true when the event
    /// target is an input or select element.
    pub fn key_down(&mut self, code: &str, repeat: bool, editable: bool) -> bool {
        self.handle(InputEvent::KeyDown {
            key: Key::from_code(code),
            repeat,
            target: target(editable),
        })
    }

    pub fn key_up(&mut self, code: &str, editable: bool) -> bool {
        self.handle(InputEvent::KeyUp {
            key: Key::from_code(code),
            target: target(editable),
        })
    }

    pub fn wheel(&mut self, delta_y: f64) -> bool {
        self.handle(InputEvent::Wheel { delta_y })
    }

    pub fn select_note(&mut self, note: &str) -> Result<(), JsValue> {
        let note = note.parse().map_err(js_error)?;
        self.handle(InputEvent::NoteSelected(note));
        Ok(())
    }

    pub fn select_octave(&mut self, octave: i32) {
        self.handle(InputEvent::OctaveSelected(octave));
    }

    pub fn step_note(&mut self, up: bool) {
        self.handle(InputEvent::NoteStep(direction(up)));
    }

    pub fn step_octave(&mut self, up: bool) {
        self.handle(InputEvent::OctaveStep(direction(up)));
    }

    /// Raw text of the frequency field. Unparseable text is ignored.
    pub fn enter_frequency(&mut self, text: &str) {
        self.handle(InputEvent::FrequencyEntered(text.to_string()));
    }

    pub fn set_volume(&mut self, percent: i32) {
        self.handle(InputEvent::VolumeEntered(percent));
    }

    pub fn select_waveform(&mut self, waveform: &str) -> Result<(), JsValue> {
        let waveform = waveform.parse().map_err(js_error)?;
        self.handle(InputEvent::WaveformSelected(waveform));
        Ok(())
    }

    pub fn cycle_waveform(&mut self) {
        self.handle(InputEvent::WaveformCycled);
    }

    pub fn select_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = mode.parse().map_err(js_error)?;
        self.handle(InputEvent::ModeSelected(mode));
        Ok(())
    }

    /// Fill one AudioWorklet output block.
    pub fn process(&mut self, out: &mut [f32]) {
        self.coordinator.engine_mut().backend_mut().render(out);
    }

    /// One animation-frame tick. Returns `false` when visualization is off.
    pub fn draw_frame(&mut self) -> bool {
        self.coordinator.draw_frame()
    }

    /// Latest controls, status and waveform as a plain JS object.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state()).map_err(js_error)
    }

    pub fn is_playing(&self) -> bool {
        self.coordinator.is_playing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;
    use crate::pitch::Note;
    use crate::surface::PlayStatus;

    fn generator() -> ToneGenerator {
        ToneGenerator::with_config(&ToneConfig::default()).unwrap()
    }

    #[test]
    fn page_session() {
        let mut g = generator();
        assert_eq!(g.sample_rate(), 44100.0);
        assert!(!g.is_playing());

        assert!(g.key_down("Space", false, false));
        assert!(g.is_playing());

        let mut block = [0.0f32; 128];
        g.process(&mut block);
        assert!(block.iter().any(|&s| s != 0.0), "tone should reach the worklet");

        assert!(g.draw_frame());
        assert_eq!(g.state().waveform.len(), 1024);

        g.select_note("C").unwrap();
        g.select_waveform("square").unwrap();
        let controls = g.state().controls.clone().unwrap();
        assert_eq!(controls.note, Note::C);
        assert_eq!(controls.waveform, Waveform::Square);
        assert_eq!(controls.frequency_label, "261.63");

        g.click();
        assert_eq!(g.state().status, PlayStatus::Stopped);
    }

    #[test]
    fn shortcuts_ignored_in_editable_targets() {
        let mut g = generator();
        assert!(!g.key_down("Space", false, true));
        assert!(!g.is_playing());
        assert!(!g.key_down("KeyQ", false, false));
    }

    #[test]
    fn hold_mode_from_the_page() {
        let mut g = generator();
        g.select_mode("hold").unwrap();
        g.pointer_down();
        assert!(g.is_playing());
        g.pointer_leave();
        assert!(!g.is_playing());

        g.touch_start();
        assert!(g.is_playing());
        g.touch_end();
        assert!(!g.is_playing());
    }

    #[test]
    fn volume_and_frequency_fields() {
        let mut g = generator();
        g.wheel(-120.0);
        assert_eq!(g.state().controls.as_ref().unwrap().volume_label, "55%");
        g.set_volume(140);
        assert_eq!(g.state().controls.as_ref().unwrap().volume_label, "100%");

        g.enter_frequency("not a number");
        assert_eq!(g.state().controls.as_ref().unwrap().frequency, 440.0);
        g.enter_frequency("445");
        let controls = g.state().controls.clone().unwrap();
        assert_eq!(controls.frequency, 445.0);
        assert_eq!(controls.note, Note::A);
    }
}
