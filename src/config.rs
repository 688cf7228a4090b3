use serde::{Deserialize, Serialize};

/// Logical size of the melody surface. Pointer coordinates arriving from
/// the canvas are always expressed against this fixed surface.
pub const SURFACE_WIDTH: f32 = 1200.0;
pub const SURFACE_HEIGHT: f32 = 600.0;

/// Number of horizontal reference bands drawn on the melody surface.
pub const GRID_DIVISIONS: u32 = 12;

/// Left gutter reserved for note labels, in surface coordinates.
pub const LABEL_GUTTER: f32 = 50.0;

pub const WHITE_KEYS: [&str; 14] = [
    "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5",
];

/// Black keys with the white-key boundary index they sit on.
pub const BLACK_KEYS: [(&str, u32); 10] = [
    ("C#4", 1),
    ("D#4", 2),
    ("F#4", 4),
    ("G#4", 5),
    ("A#4", 6),
    ("C#5", 8),
    ("D#5", 9),
    ("F#5", 11),
    ("G#5", 12),
    ("A#5", 13),
];

/// How long a triggered chime rings before its envelope is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteDuration {
    Eighth,
    Quarter,
    Half,
    Whole,
}

impl NoteDuration {
    pub const ALL: [NoteDuration; 4] = [
        NoteDuration::Eighth,
        NoteDuration::Quarter,
        NoteDuration::Half,
        NoteDuration::Whole,
    ];

    pub fn token(self) -> &'static str {
        match self {
            NoteDuration::Eighth => "8n",
            NoteDuration::Quarter => "4n",
            NoteDuration::Half => "2n",
            NoteDuration::Whole => "1n",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteDuration::Eighth => "Shortest",
            NoteDuration::Quarter => "Normal",
            NoteDuration::Half => "Long",
            NoteDuration::Whole => "Longest",
        }
    }

    /// Note lengths at the 120 BPM reference tempo.
    pub fn seconds(self) -> f32 {
        match self {
            NoteDuration::Eighth => 0.25,
            NoteDuration::Quarter => 0.5,
            NoteDuration::Half => 1.0,
            NoteDuration::Whole => 2.0,
        }
    }
}

impl Default for NoteDuration {
    fn default() -> Self {
        NoteDuration::Half
    }
}
