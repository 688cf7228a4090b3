mod shimmer;
mod voice;

pub use shimmer::Shimmer;
pub use voice::{AdsrConfig, ChimeVoice, envelope_level};

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::patch::ChimePatch;

/// One chime to sound, as delivered to the audio callback.
#[derive(Debug, Clone, Copy)]
pub struct Strike {
    pub frequency: f32,
    /// Seconds before the envelope releases.
    pub duration_secs: f32,
}

const MAX_VOICES: usize = 32;

/// Polyphonic pool of ringing chimes plus the shared shimmer tail. Owned
/// by the audio callback; patch changes arrive through the `ArcSwap`.
pub struct ChimeBank {
    sample_rate: f32,
    patch: Arc<ArcSwap<ChimePatch>>,
    voices: Vec<ChimeVoice>,
    shimmer: Shimmer,
    shimmer_settings: (f32, f32),
}

impl ChimeBank {
    pub fn new(sample_rate: f32, patch: Arc<ArcSwap<ChimePatch>>) -> Self {
        let snapshot = patch.load_full();
        let shimmer = Shimmer::new(sample_rate, &snapshot.shimmer);
        let shimmer_settings = (snapshot.shimmer.decay, snapshot.shimmer.wet);

        Self {
            sample_rate,
            patch,
            voices: Vec::with_capacity(MAX_VOICES),
            shimmer,
            shimmer_settings,
        }
    }

    pub fn strike(&mut self, strike: Strike) {
        let patch = self.patch.load();

        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }

        self.voices
            .push(ChimeVoice::new(strike.frequency, strike.duration_secs, &patch));
    }

    pub fn render(&mut self, output: &mut [f32], num_channels: usize) {
        let patch = self.patch.load();
        if (patch.shimmer.decay, patch.shimmer.wet) != self.shimmer_settings {
            self.shimmer.retune(&patch.shimmer);
            self.shimmer_settings = (patch.shimmer.decay, patch.shimmer.wet);
        }

        for frame in output.chunks_mut(num_channels) {
            let mut sample = 0.0;
            for voice in &mut self.voices {
                sample += voice.next_sample(self.sample_rate);
            }
            let wet = self.shimmer.process(sample);

            for channel in frame.iter_mut() {
                *channel = wet;
            }
        }

        self.voices.retain(|voice| !voice.finished());
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}
