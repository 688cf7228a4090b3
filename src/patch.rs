use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::NoteDuration;
use crate::synth::AdsrConfig;

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShimmerConfig {
    /// Seconds for the tail to fade out
    pub decay: f32,
    /// 0.0 -> 1.0
    pub wet: f32,
}

/// Synthesis parameters for the wind chime voice. Hot-swappable at
/// runtime; the audio callback picks up a new patch on its next buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChimePatch {
    /// Modulator frequency as a multiple of the carrier
    pub harmonicity: f32,
    pub modulation_index: f32,
    pub amp_envelope: AdsrConfig,
    pub mod_envelope: AdsrConfig,
    pub shimmer: ShimmerConfig,
    pub gain: f32,
    pub default_duration: NoteDuration,
}

impl Default for ChimePatch {
    fn default() -> Self {
        Self {
            harmonicity: 2.5,
            modulation_index: 12.0,
            amp_envelope: AdsrConfig {
                attack: 0.01,
                decay: 2.0,
                sustain: 0.1,
                release: 3.0,
            },
            mod_envelope: AdsrConfig {
                attack: 0.01,
                decay: 0.5,
                sustain: 0.2,
                release: 2.0,
            },
            shimmer: ShimmerConfig {
                decay: 4.0,
                wet: 0.6,
            },
            gain: 0.5,
            default_duration: NoteDuration::default(),
        }
    }
}

impl ChimePatch {
    pub fn save(&self, path: &Path) -> Result<(), PatchError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let ron_string = fs::read_to_string(path)?;
        let patch: ChimePatch = ron::from_str(&ron_string)?;

        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_round_trip_preserves_patch() {
        let patch = ChimePatch::default();
        let text = ron::ser::to_string_pretty(&patch, ron::ser::PrettyConfig::default()).unwrap();
        let back: ChimePatch = ron::from_str(&text).unwrap();
        assert_eq!(patch, back);
    }

    #[test]
    fn default_patch_matches_the_chime_preset() {
        let patch = ChimePatch::default();
        assert_eq!(patch.harmonicity, 2.5);
        assert_eq!(patch.amp_envelope.release, 3.0);
        assert_eq!(patch.shimmer.wet, 0.6);
    }
}
