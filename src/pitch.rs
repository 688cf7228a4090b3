/// Lowest frequency on the melody surface (bottom edge).
pub const MIN_FREQ: f32 = 400.0;
/// Highest frequency on the melody surface (top edge).
pub const MAX_FREQ: f32 = 4000.0;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A horizontal reference line on the melody surface.
#[derive(Debug, Clone, PartialEq)]
pub struct GridNote {
    pub note: String,
    pub y: f32,
}

/// Maps a vertical position to a frequency. Top of the surface is high
/// pitch, bottom is low. `y` is deliberately not clamped; values outside
/// `0..=surface_height` extrapolate. `surface_height` must be positive.
pub fn position_to_frequency(y: f32, surface_height: f32) -> f32 {
    let normalized = 1.0 - y / surface_height;
    MIN_FREQ + normalized * (MAX_FREQ - MIN_FREQ)
}

/// Nearest equal-tempered note name for a frequency. `frequency` must be
/// positive.
pub fn frequency_to_note_name(frequency: f32) -> String {
    let midi = (69.0 + 12.0 * (frequency / 440.0).log2()).round() as i32;
    let octave = midi.div_euclid(12) - 1;
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    format!("{}{}", name, octave)
}

pub fn position_to_note(y: f32, surface_height: f32) -> String {
    frequency_to_note_name(position_to_frequency(y, surface_height))
}

/// Parses a name like "C#5" back to its equal-tempered frequency.
pub fn note_name_to_frequency(name: &str) -> Option<f32> {
    let digits = name.find(|c: char| c == '-' || c.is_ascii_digit())?;
    let (pitch_class, octave) = name.split_at(digits);
    let semitone = NOTE_NAMES.iter().position(|&n| n == pitch_class)?;
    let octave: i32 = octave.parse().ok()?;

    let midi = (octave + 1) * 12 + semitone as i32;
    Some(440.0 * 2.0_f32.powf((midi - 69) as f32 / 12.0))
}

/// `divisions + 1` evenly spaced reference lines from the top of the
/// surface to the bottom, inclusive.
pub fn grid_notes(surface_height: f32, divisions: u32) -> Vec<GridNote> {
    (0..=divisions)
        .map(|i| {
            let y = i as f32 * surface_height / divisions as f32;
            GridNote {
                note: position_to_note(y, surface_height),
                y,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_exactly_440() {
        assert_eq!(frequency_to_note_name(440.0), "A4");
    }

    #[test]
    fn reference_pitches() {
        assert_eq!(frequency_to_note_name(261.6256), "C4");
        assert_eq!(frequency_to_note_name(880.0), "A5");
        assert_eq!(frequency_to_note_name(277.18), "C#4");
    }

    #[test]
    fn surface_edges_hit_frequency_range() {
        for h in [600.0, 1.0, 1080.0] {
            assert!((position_to_frequency(0.0, h) - MAX_FREQ).abs() < 1e-3);
            assert!((position_to_frequency(h, h) - MIN_FREQ).abs() < 1e-3);
            assert_eq!(position_to_note(0.0, h), frequency_to_note_name(MAX_FREQ));
            assert_eq!(position_to_note(h, h), frequency_to_note_name(MIN_FREQ));
        }
    }

    #[test]
    fn pitch_never_rises_as_y_grows() {
        let height = 600.0;
        let mut last = f32::MAX;
        for step in 0..=600 {
            let note = position_to_note(step as f32, height);
            let freq = note_name_to_frequency(&note).unwrap();
            assert!(
                freq <= last,
                "pitch rose from {last} to {freq} at y={step}"
            );
            last = freq;
        }
    }

    #[test]
    fn out_of_range_y_extrapolates() {
        assert!(position_to_frequency(-100.0, 600.0) > MAX_FREQ);
        assert!(position_to_frequency(700.0, 600.0) < MIN_FREQ);
    }

    #[test]
    fn note_name_round_trip() {
        for name in ["A4", "C#5", "G3", "B7", "C-1"] {
            let freq = note_name_to_frequency(name).unwrap();
            assert_eq!(frequency_to_note_name(freq), name);
        }
        assert!((note_name_to_frequency("A4").unwrap() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn malformed_note_names_are_rejected() {
        assert_eq!(note_name_to_frequency(""), None);
        assert_eq!(note_name_to_frequency("H4"), None);
        assert_eq!(note_name_to_frequency("C#"), None);
        assert_eq!(note_name_to_frequency("4"), None);
    }

    #[test]
    fn grid_is_pure_and_inclusive() {
        let a = grid_notes(600.0, 12);
        let b = grid_notes(600.0, 12);
        assert_eq!(a, b);
        assert_eq!(a.len(), 13);
        assert_eq!(a[0].y, 0.0);
        assert_eq!(a[12].y, 600.0);
    }
}
