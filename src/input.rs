//! Input handling — turns raw UI events into tone engine calls.
//!
//! Trigger events (click, pointer, touch, the trigger key) are read through
//! the current [`TriggerMode`]. Pitch, volume and waveform controls act the
//! same in either mode. After every event the display is refreshed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::backend::AudioBackend;
use crate::dsp::oscillator::Waveform;
use crate::engine::ToneEngine;
use crate::error::{AudioError, ParseError};
use crate::pitch::{Direction, Note, Octave, Pitch, pitch_of};
use crate::surface::{ControlView, DisplaySurface, PlayStatus};
use crate::visual::VisualizationFeed;

/// How press/release style events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Each trigger flips between playing and stopped.
    #[default]
    Toggle,
    /// Sound only while pressed.
    Hold,
}

impl TriggerMode {
    pub fn name(self) -> &'static str {
        match self {
            TriggerMode::Toggle => "toggle",
            TriggerMode::Hold => "hold",
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TriggerMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "toggle" => Ok(TriggerMode::Toggle),
            "hold" => Ok(TriggerMode::Hold),
            other => Err(ParseError::UnknownTriggerMode(other.to_string())),
        }
    }
}

/// Physical keys the coordinator cares about, by `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyW,
    Digit(u8),
    Other,
}

impl Key {
    pub fn from_code(code: &str) -> Key {
        match code {
            "Space" => Key::Space,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "KeyW" => Key::KeyW,
            _ => match code.strip_prefix("Digit").map(str::as_bytes) {
                Some(&[d @ b'0'..=b'9']) => Key::Digit(d - b'0'),
                _ => Key::Other,
            },
        }
    }
}

/// Where a key event was aimed. Keys typed into editable controls are
/// never treated as shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTarget {
    #[default]
    Document,
    Editable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Click,
    PointerDown,
    PointerUp,
    PointerLeave,
    TouchStart,
    TouchEnd,
    KeyDown {
        key: Key,
        repeat: bool,
        target: EventTarget,
    },
    KeyUp {
        key: Key,
        target: EventTarget,
    },
    /// Wheel over the volume control; positive `delta_y` scrolls down.
    Wheel {
        delta_y: f64,
    },
    NoteSelected(Note),
    OctaveSelected(i32),
    NoteStep(Direction),
    OctaveStep(Direction),
    /// Raw text from the frequency field.
    FrequencyEntered(String),
    VolumeEntered(i32),
    WaveformSelected(Waveform),
    WaveformCycled,
    ModeSelected(TriggerMode),
}

pub const TRIGGER_KEY: Key = Key::Space;

pub struct InputCoordinator<B: AudioBackend, D: DisplaySurface> {
    engine: ToneEngine<B>,
    display: D,
    pitch: Pitch,
    mode: TriggerMode,
    volume_step: i32,
    feed: Option<VisualizationFeed>,
    fault: Option<String>,
}

impl<B: AudioBackend, D: DisplaySurface> InputCoordinator<B, D> {
    /// The engine's frequency is reset to `pitch`, and the display gets
    /// its first full refresh.
    pub fn new(
        mut engine: ToneEngine<B>,
        display: D,
        pitch: Pitch,
        mode: TriggerMode,
        volume_step: i32,
        feed: Option<VisualizationFeed>,
    ) -> Self {
        engine.retune(pitch.frequency());
        let mut coordinator = InputCoordinator {
            engine,
            display,
            pitch,
            mode,
            volume_step: volume_step.max(1),
            feed,
            fault: None,
        };
        coordinator.refresh();
        coordinator
    }

    pub fn engine(&self) -> &ToneEngine<B> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ToneEngine<B> {
        &mut self.engine
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn volume_step(&self) -> i32 {
        self.volume_step
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Dispatch one event. Returns `true` when the event was consumed and
    /// the host should suppress its default action.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        let consumed = self.dispatch(event);
        self.refresh();
        consumed
    }

    fn dispatch(&mut self, event: InputEvent) -> bool {
        use InputEvent::*;

        match event {
            Click => {
                if self.mode == TriggerMode::Toggle {
                    self.toggle();
                }
                false
            }
            PointerDown => {
                if self.mode == TriggerMode::Hold {
                    self.press();
                }
                false
            }
            PointerUp | PointerLeave => {
                if self.mode == TriggerMode::Hold {
                    self.release();
                }
                false
            }
            TouchStart => {
                match self.mode {
                    TriggerMode::Hold => self.press(),
                    TriggerMode::Toggle => self.toggle(),
                }
                true
            }
            TouchEnd => {
                if self.mode == TriggerMode::Hold {
                    self.release();
                }
                true
            }
            KeyDown { target: EventTarget::Editable, .. } => false,
            KeyDown { key, repeat, .. } => self.key_down(key, repeat),
            KeyUp { key, .. } => {
                if key == TRIGGER_KEY && self.mode == TriggerMode::Hold {
                    self.release();
                }
                false
            }
            Wheel { delta_y } => {
                if delta_y > 0.0 {
                    self.step_volume(-self.volume_step);
                } else if delta_y < 0.0 {
                    self.step_volume(self.volume_step);
                }
                true
            }
            NoteSelected(note) => {
                self.set_pitch(Pitch::new(note, self.pitch.octave));
                false
            }
            OctaveSelected(octave) => {
                self.set_pitch(Pitch::new(self.pitch.note, Octave::new(octave)));
                false
            }
            NoteStep(direction) => {
                self.set_pitch(self.pitch.step(direction));
                false
            }
            OctaveStep(direction) => {
                self.step_octave(direction);
                false
            }
            FrequencyEntered(text) => {
                self.enter_frequency(&text);
                false
            }
            VolumeEntered(percent) => {
                self.engine.set_volume(percent);
                false
            }
            WaveformSelected(waveform) => {
                self.change_waveform(waveform);
                false
            }
            WaveformCycled => {
                self.change_waveform(self.engine.waveform().next());
                false
            }
            ModeSelected(mode) => {
                debug!(%mode, "trigger mode");
                self.mode = mode;
                false
            }
        }
    }

    fn key_down(&mut self, key: Key, repeat: bool) -> bool {
        match key {
            TRIGGER_KEY => match self.mode {
                TriggerMode::Hold => self.press(),
                TriggerMode::Toggle if !repeat => self.toggle(),
                TriggerMode::Toggle => {}
            },
            Key::ArrowLeft => self.set_pitch(self.pitch.step(Direction::Down)),
            Key::ArrowRight => self.set_pitch(self.pitch.step(Direction::Up)),
            Key::ArrowUp => self.step_octave(Direction::Up),
            Key::ArrowDown => self.step_octave(Direction::Down),
            Key::KeyW => self.change_waveform(self.engine.waveform().next()),
            Key::Digit(d @ 1..=9) => {
                self.set_pitch(Pitch::new(self.pitch.note, Octave::new(d as i32)))
            }
            _ => return false,
        }
        true
    }

    fn toggle(&mut self) {
        if self.engine.is_playing() {
            self.engine.stop();
        } else {
            self.start();
        }
    }

    fn press(&mut self) {
        if !self.engine.is_playing() {
            self.start();
        }
    }

    fn release(&mut self) {
        if self.engine.is_playing() {
            self.engine.stop();
        }
    }

    fn start(&mut self) {
        let result = self.engine.play();
        self.record(result);
    }

    fn change_waveform(&mut self, waveform: Waveform) {
        let result = self.engine.set_waveform(waveform);
        self.record(result);
    }

    fn record<T>(&mut self, result: Result<T, AudioError>) {
        match result {
            Ok(_) => self.fault = None,
            Err(e) => {
                error!(error = %e, "audio unavailable");
                self.fault = Some(e.to_string());
            }
        }
    }

    fn set_pitch(&mut self, pitch: Pitch) {
        self.pitch = pitch;
        self.engine.retune(pitch.frequency());
    }

    fn step_octave(&mut self, direction: Direction) {
        let octave = self.pitch.octave.offset(direction.delta());
        self.set_pitch(Pitch::new(self.pitch.note, octave));
    }

    /// The typed frequency is played as-is; note and octave snap to the
    /// nearest pitch. Anything that is not a positive number is ignored.
    fn enter_frequency(&mut self, text: &str) {
        let parsed = text.trim().parse::<f64>().ok();
        match parsed.and_then(|f| pitch_of(f).map(|p| (f, p))) {
            Some((frequency, pitch)) => {
                self.pitch = pitch;
                self.engine.retune(frequency);
            }
            None => debug!(text, "ignoring frequency entry"),
        }
    }

    fn step_volume(&mut self, delta: i32) {
        let volume = self.engine.volume().offset(delta);
        self.engine.apply_volume(volume);
    }

    pub fn view(&self) -> ControlView {
        ControlView::new(
            self.pitch.note,
            self.pitch.octave,
            self.engine.frequency(),
            self.engine.waveform(),
            self.engine.volume(),
            self.mode,
        )
    }

    pub fn status(&self) -> PlayStatus {
        if self.engine.is_playing() {
            PlayStatus::Playing
        } else if let Some(reason) = &self.fault {
            PlayStatus::Unavailable {
                reason: reason.clone(),
            }
        } else {
            PlayStatus::Stopped
        }
    }

    /// Push controls and status to the display.
    pub fn refresh(&mut self) {
        let view = self.view();
        let status = self.status();
        self.display.show_controls(&view);
        self.display.show_status(&status);
    }

    /// One display-refresh tick of the Visualization Feed. Returns `false`
    /// when visualization is disabled.
    pub fn draw_frame(&mut self) -> bool {
        let Some(feed) = self.feed.as_mut() else {
            return false;
        };
        let frame = feed.sample(self.engine.analyser(), self.engine.is_playing());
        self.display.draw_waveform(&frame);
        true
    }
}
