use crate::patch::ShimmerConfig;

const DELAY_SECS: f32 = 0.23;
const DAMPING: f32 = 0.4;

/// Feedback delay line that lets chimes ring out into a soft tail.
pub struct Shimmer {
    buf: Vec<f32>,
    write_pos: usize,
    lowpass_state: f32,
    feedback: f32,
    wet: f32,
}

impl Shimmer {
    pub fn new(sample_rate: f32, config: &ShimmerConfig) -> Self {
        let len = ((DELAY_SECS * sample_rate) as usize).max(1);
        let mut shimmer = Self {
            buf: vec![0.0; len],
            write_pos: 0,
            lowpass_state: 0.0,
            feedback: 0.0,
            wet: 0.0,
        };
        shimmer.retune(config);
        shimmer
    }

    /// Feedback gain so the tail falls 60 dB over `config.decay` seconds.
    pub fn retune(&mut self, config: &ShimmerConfig) {
        self.feedback = if config.decay <= 0.0 {
            0.0
        } else {
            0.001_f32.powf(DELAY_SECS / config.decay)
        };
        self.wet = config.wet.clamp(0.0, 1.0);
    }

    pub fn process(&mut self, dry: f32) -> f32 {
        let delayed = self.buf[self.write_pos];
        self.lowpass_state += (delayed - self.lowpass_state) * (1.0 - DAMPING);

        self.buf[self.write_pos] = dry + self.lowpass_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buf.len();

        dry + delayed * self.wet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_quieter() {
        let config = ShimmerConfig {
            decay: 4.0,
            wet: 0.6,
        };
        let sample_rate = 1000.0;
        let mut shimmer = Shimmer::new(sample_rate, &config);

        let first = shimmer.process(1.0);
        assert_eq!(first, 1.0, "dry signal passes through immediately");

        let delay_samples = (DELAY_SECS * sample_rate) as usize;
        let mut echo = 0.0f32;
        for _ in 0..delay_samples + 2 {
            echo = echo.max(shimmer.process(0.0).abs());
        }
        assert!(echo > 0.0, "the impulse should echo");
        assert!(echo < 1.0, "the echo must be quieter than the impulse");
    }

    #[test]
    fn zero_decay_produces_a_single_echo() {
        let config = ShimmerConfig {
            decay: 0.0,
            wet: 1.0,
        };
        let sample_rate = 100.0;
        let mut shimmer = Shimmer::new(sample_rate, &config);

        shimmer.process(1.0);
        let delay_samples = (DELAY_SECS * sample_rate) as usize;
        for _ in 0..delay_samples {
            shimmer.process(0.0);
        }
        // One full trip later the line is silent: nothing was fed back.
        let mut tail = 0.0f32;
        for _ in 0..delay_samples + 2 {
            tail = tail.max(shimmer.process(0.0).abs());
        }
        assert!(tail < 1e-3);
    }
}
