use serde::{Deserialize, Serialize};

use crate::patch::ChimePatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsrConfig {
    /// Seconds
    pub attack: f32,
    /// Seconds
    pub decay: f32,
    /// 0.0 -> 1.0
    pub sustain: f32,
    /// Seconds
    pub release: f32,
}

/// Envelope level at `age` seconds for a gate held open until
/// `release_at`.
pub fn envelope_level(adsr: &AdsrConfig, age: f32, release_at: f32) -> f32 {
    // `t < attack` can only hold when attack > 0, and likewise for decay,
    // so the divisions below are safe.
    let held = |t: f32| {
        if t < adsr.attack {
            t / adsr.attack
        } else if t < adsr.attack + adsr.decay {
            1.0 - (1.0 - adsr.sustain) * ((t - adsr.attack) / adsr.decay)
        } else {
            adsr.sustain
        }
    };

    if age < release_at {
        held(age)
    } else if adsr.release == 0.0 {
        0.0
    } else {
        let level = held(release_at);
        (level * (1.0 - (age - release_at) / adsr.release)).max(0.0)
    }
}

fn triangle(phase: f32) -> f32 {
    2.0 * (2.0 * phase - 1.0).abs() - 1.0
}

/// One ringing chime: a sine carrier phase-modulated by a triangle wave,
/// with independent amplitude and modulation envelopes. The gate closes
/// on its own once `duration` has elapsed.
pub struct ChimeVoice {
    carrier_freq: f32,
    harmonicity: f32,
    modulation_index: f32,
    amp_envelope: AdsrConfig,
    mod_envelope: AdsrConfig,
    duration: f32,
    gain: f32,
    carrier_phase: f32,
    mod_phase: f32,
    age: f32,
}

impl ChimeVoice {
    pub fn new(frequency: f32, duration: f32, patch: &ChimePatch) -> Self {
        Self {
            carrier_freq: frequency,
            harmonicity: patch.harmonicity,
            modulation_index: patch.modulation_index,
            amp_envelope: patch.amp_envelope.clone(),
            mod_envelope: patch.mod_envelope.clone(),
            duration,
            gain: patch.gain,
            carrier_phase: 0.0,
            mod_phase: 0.0,
            age: 0.0,
        }
    }

    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let amp = envelope_level(&self.amp_envelope, self.age, self.duration);
        let mod_depth = envelope_level(&self.mod_envelope, self.age, self.duration);

        let modulation = self.modulation_index * mod_depth * triangle(self.mod_phase);
        let sample =
            (self.carrier_phase * 2.0 * std::f32::consts::PI + modulation).sin();

        let dt = 1.0 / sample_rate;
        self.carrier_phase += self.carrier_freq * dt;
        if self.carrier_phase >= 1.0 {
            self.carrier_phase -= 1.0;
        }
        self.mod_phase += self.carrier_freq * self.harmonicity * dt;
        if self.mod_phase >= 1.0 {
            self.mod_phase -= 1.0;
        }
        self.age += dt;

        sample * amp * self.gain
    }

    pub fn finished(&self) -> bool {
        self.age >= self.duration + self.amp_envelope.release
    }
}
