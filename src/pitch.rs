//! Note/octave ↔ frequency conversion in 12-tone equal temperament.
//!
//! Everything here is pure. Tuning is anchored at A4 = 440 Hz; the inverse
//! mapping snaps to the nearest semitone and clamps the octave into the
//! playable range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const A4_FREQUENCY: f64 = 440.0;
pub const A4_OCTAVE: i32 = 4;
pub const MIN_OCTAVE: i32 = 1;
pub const MAX_OCTAVE: i32 = 9;
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// The twelve pitch classes, spelled the way the note selector shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Note {
    C,
    #[serde(rename = "D♭")]
    DFlat,
    D,
    #[serde(rename = "E♭")]
    EFlat,
    E,
    F,
    #[serde(rename = "F♯")]
    FSharp,
    G,
    #[serde(rename = "A♭")]
    AFlat,
    A,
    #[serde(rename = "B♭")]
    BFlat,
    B,
}

impl Note {
    /// All notes in ascending semitone order, starting at C.
    pub const ALL: [Note; 12] = [
        Note::C,
        Note::DFlat,
        Note::D,
        Note::EFlat,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::G,
        Note::AFlat,
        Note::A,
        Note::BFlat,
        Note::B,
    ];

    /// Semitone offset above C, in `0..12`.
    pub fn semitone(self) -> i32 {
        self as i32
    }

    /// Note for an arbitrary semitone count; wraps in both directions.
    pub fn from_semitone(semitone: i32) -> Note {
        Note::ALL[semitone.rem_euclid(SEMITONES_PER_OCTAVE) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::DFlat => "D♭",
            Note::D => "D",
            Note::EFlat => "E♭",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F♯",
            Note::G => "G",
            Note::AFlat => "A♭",
            Note::A => "A",
            Note::BFlat => "B♭",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the display spellings (`"D♭"`, `"F♯"`) as well as ASCII
/// accidentals (`"Db"`, `"C#"`), resolved to the enharmonic pitch class.
impl FromStr for Note {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseError::UnknownNote(s.to_string());
        let mut chars = s.trim().chars();

        let natural = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(unknown()),
        };

        let accidental = match chars.next() {
            None => 0,
            Some('♭') | Some('b') => -1,
            Some('♯') | Some('#') => 1,
            Some(_) => return Err(unknown()),
        };

        if chars.next().is_some() {
            return Err(unknown());
        }

        Ok(Note::from_semitone(natural + accidental))
    }
}

/// Octave number, always within `[MIN_OCTAVE, MAX_OCTAVE]`.
///
/// Out-of-range values are clamped on construction, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Octave(u8);

impl Octave {
    pub const MIN: Octave = Octave(MIN_OCTAVE as u8);
    pub const MAX: Octave = Octave(MAX_OCTAVE as u8);

    pub fn new(value: i32) -> Self {
        Octave(value.clamp(MIN_OCTAVE, MAX_OCTAVE) as u8)
    }

    pub fn get(self) -> i32 {
        self.0 as i32
    }

    /// Shift by `delta` octaves, saturating at the range limits.
    pub fn offset(self, delta: i32) -> Self {
        Octave::new(self.get().saturating_add(delta))
    }
}

impl Default for Octave {
    fn default() -> Self {
        Octave(A4_OCTAVE as u8)
    }
}

impl From<i32> for Octave {
    fn from(value: i32) -> Self {
        Octave::new(value)
    }
}

impl From<Octave> for i32 {
    fn from(octave: Octave) -> Self {
        octave.get()
    }
}

impl fmt::Display for Octave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step direction for note and octave controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn delta(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// A (note, octave) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub note: Note,
    pub octave: Octave,
}

impl Pitch {
    pub fn new(note: Note, octave: Octave) -> Self {
        Pitch { note, octave }
    }

    pub fn frequency(self) -> f64 {
        frequency_of(self.note, self.octave)
    }

    /// Nearest pitch to `frequency`, or `None` for non-positive / non-finite input.
    pub fn from_frequency(frequency: f64) -> Option<Self> {
        pitch_of(frequency)
    }

    /// Step one semitone, carrying into the octave across B→C / C→B.
    /// The octave saturates, so stepping up from B9 lands on C9.
    pub fn step(self, direction: Direction) -> Self {
        let (note, octave_delta) = step_note(self.note, direction);
        Pitch {
            note,
            octave: self.octave.offset(octave_delta),
        }
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Pitch::new(Note::A, Octave::default())
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note, self.octave)
    }
}

/// Equal-tempered frequency of `note` in `octave`.
///
/// `440 * 2^(((octave - 4) * 12 + (note - A)) / 12)`. The result is not
/// clamped to any audible range.
pub fn frequency_of(note: Note, octave: Octave) -> f64 {
    let offset = (octave.get() - A4_OCTAVE) * SEMITONES_PER_OCTAVE
        + (note.semitone() - Note::A.semitone());
    A4_FREQUENCY * 2.0_f64.powf(offset as f64 / SEMITONES_PER_OCTAVE as f64)
}

/// Nearest tempered pitch to `frequency`.
///
/// Returns `None` when the input is zero, negative, NaN or infinite so the
/// caller can treat it as a no-op instead of carrying a bogus pitch.
pub fn pitch_of(frequency: f64) -> Option<Pitch> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let semitones_from_a4 = SEMITONES_PER_OCTAVE as f64 * (frequency / A4_FREQUENCY).log2();
    // ties round up, e.g. -0.5 -> 0
    let total = (semitones_from_a4 + 0.5).floor() as i64;

    let a = Note::A.semitone() as i64;
    let per_octave = SEMITONES_PER_OCTAVE as i64;
    let note = Note::from_semitone((total + a).rem_euclid(per_octave) as i32);
    let octave = A4_OCTAVE as i64 + (total + a).div_euclid(per_octave);
    let octave = octave.clamp(MIN_OCTAVE as i64, MAX_OCTAVE as i64) as i32;

    Some(Pitch::new(note, Octave::new(octave)))
}

/// Step `note` one semitone. Returns the new note and the octave carry
/// (`+1` when stepping up past B, `-1` when stepping down past C, else 0).
pub fn step_note(note: Note, direction: Direction) -> (Note, i32) {
    let raw = note.semitone() + direction.delta();
    (Note::from_semitone(raw), raw.div_euclid(SEMITONES_PER_OCTAVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn a4_is_440() {
        assert_eq!(frequency_of(Note::A, Octave::new(4)), 440.0);
    }

    #[test]
    fn octave_doubling() {
        assert_eq!(frequency_of(Note::A, Octave::new(5)), 880.0);
        assert_eq!(frequency_of(Note::A, Octave::new(3)), 220.0);
    }

    #[test]
    fn middle_c() {
        let c4 = frequency_of(Note::C, Octave::new(4));
        assert!((c4 - 261.6256).abs() < 1e-3, "C4 should be ~261.63 Hz, got {c4}");
    }

    #[test]
    fn frequency_is_strictly_increasing() {
        let mut last = 0.0;
        for octave in MIN_OCTAVE..=MAX_OCTAVE {
            for note in Note::ALL {
                let f = frequency_of(note, Octave::new(octave));
                assert!(f > last, "{note}{octave} ({f}) should exceed {last}");
                last = f;
            }
        }
    }

    #[test]
    fn round_trip_away_from_clamp_boundaries() {
        for octave in 2..=8 {
            for note in Note::ALL {
                let pitch = Pitch::new(note, Octave::new(octave));
                assert_eq!(
                    pitch_of(pitch.frequency()),
                    Some(pitch),
                    "round trip failed for {pitch}"
                );
            }
        }
    }

    #[test]
    fn pitch_of_snaps_to_nearest_semitone() {
        // 445 Hz is ~19.6 cents sharp of A4
        assert_eq!(pitch_of(445.0), Some(Pitch::new(Note::A, Octave::new(4))));
        // 453 Hz is ~50.4 cents sharp, so B♭4 wins
        assert_eq!(pitch_of(453.0), Some(Pitch::new(Note::BFlat, Octave::new(4))));
    }

    #[test]
    fn pitch_of_crosses_octave_at_c() {
        let b3 = frequency_of(Note::B, Octave::new(3));
        let c4 = frequency_of(Note::C, Octave::new(4));
        assert_eq!(pitch_of(b3), Some(Pitch::new(Note::B, Octave::new(3))));
        assert_eq!(pitch_of(c4), Some(Pitch::new(Note::C, Octave::new(4))));
    }

    #[test]
    fn pitch_of_clamps_octave() {
        let low = pitch_of(20.0).expect("20 Hz is valid");
        assert_eq!(low.octave.get(), 1);
        let high = pitch_of(20_000.0).expect("20 kHz is valid");
        assert_eq!(high.octave.get(), 9);

        for f in [1e-6, 0.5, 8.0, 55.0, 1e5, 1e12, f64::MAX] {
            let p = pitch_of(f).expect("positive finite input");
            assert!(
                (MIN_OCTAVE..=MAX_OCTAVE).contains(&p.octave.get()),
                "octave out of range for {f}: {}",
                p.octave
            );
        }
    }

    #[test]
    fn pitch_of_rejects_invalid_input() {
        for f in [0.0, -440.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(pitch_of(f), None, "{f} should be rejected");
        }
    }

    #[test]
    fn step_wraps_with_octave_carry() {
        assert_eq!(step_note(Note::B, Direction::Up), (Note::C, 1));
        assert_eq!(step_note(Note::C, Direction::Down), (Note::B, -1));
        assert_eq!(step_note(Note::E, Direction::Up), (Note::F, 0));
        assert_eq!(step_note(Note::DFlat, Direction::Down), (Note::C, 0));
    }

    #[test]
    fn pitch_step_clamps_at_range_limits() {
        let top = Pitch::new(Note::B, Octave::MAX).step(Direction::Up);
        assert_eq!(top, Pitch::new(Note::C, Octave::MAX));

        let bottom = Pitch::new(Note::C, Octave::MIN).step(Direction::Down);
        assert_eq!(bottom, Pitch::new(Note::B, Octave::MIN));

        let mid = Pitch::new(Note::B, Octave::new(4)).step(Direction::Up);
        assert_eq!(mid, Pitch::new(Note::C, Octave::new(5)));
    }

    #[test]
    fn octave_clamps() {
        assert_eq!(Octave::new(0).get(), 1);
        assert_eq!(Octave::new(12).get(), 9);
        assert_eq!(Octave::new(9).offset(1).get(), 9);
        assert_eq!(Octave::new(1).offset(-1).get(), 1);
        assert_eq!(Octave::new(5).offset(i32::MIN).get(), 1);
    }

    #[test]
    fn parse_note_spellings() {
        assert_eq!("D♭".parse::<Note>(), Ok(Note::DFlat));
        assert_eq!("Db".parse::<Note>(), Ok(Note::DFlat));
        assert_eq!("C#".parse::<Note>(), Ok(Note::DFlat));
        assert_eq!("F♯".parse::<Note>(), Ok(Note::FSharp));
        assert_eq!(" a ".parse::<Note>(), Ok(Note::A));
        assert!("H".parse::<Note>().is_err());
        assert!("Abb".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
    }

    #[test]
    fn names_round_trip() {
        for note in Note::ALL {
            assert_eq!(note.name().parse::<Note>(), Ok(note));
        }
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Pitch::new(Note::BFlat, Octave::new(3))).unwrap();
        assert_eq!(json, r#"{"note":"B♭","octave":3}"#);

        let back: Pitch = serde_json::from_str(r#"{"note":"F♯","octave":42}"#).unwrap();
        assert_eq!(back, Pitch::new(Note::FSharp, Octave::MAX));
    }

    #[test]
    fn frequency_matches_table_within_tolerance() {
        assert!(close(
            frequency_of(Note::E, Octave::new(2)),
            82.406_889_228_217_48
        ));
    }
}
