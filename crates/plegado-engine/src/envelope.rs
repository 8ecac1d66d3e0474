//! Block-level envelope source for drive modulation.
//!
//! Wraps the core [`EnvelopeFollower`] into the shape the waveshaper
//! consumes: one control value per native-rate sample, derived from the
//! stereo sum `|L| + |R|`, smoothed at 20 Hz and scaled by a smoothed
//! mod-amount.

use plegado_core::{DetectionMode, EnvelopeFollower, SmoothedParam, StereoBuffer};

/// Produces the mono envelope control buffer for each block.
pub struct EnvelopeSource {
    follower: EnvelopeFollower,
    /// Modulation amount in [0, 1], smoothed (30 ms).
    amount: SmoothedParam,
    /// Scratch buffer, sized at prepare time.
    buffer: Vec<f32>,
}

impl EnvelopeSource {
    /// Create with the given default mod amount.
    pub fn new(default_amount: f32) -> Self {
        let mut follower = EnvelopeFollower::new(44100.0);
        follower.set_mode(DetectionMode::Lowpass);
        follower.set_cutoff_hz(20.0);
        Self {
            follower,
            amount: SmoothedParam::new(default_amount.clamp(0.0, 1.0)),
            buffer: Vec::new(),
        }
    }

    /// Size the scratch buffer and reset tracking state.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        self.follower.set_sample_rate(sample_rate);
        self.follower.reset();
        self.amount.reset(sample_rate, 30.0);
        self.buffer.resize(max_block, 0.0);
    }

    /// Set the modulation amount, clamped to [0, 1].
    pub fn set_mod_amount(&mut self, amount: f32) {
        self.amount.set_target(amount.clamp(0.0, 1.0));
    }

    /// Clear the envelope state.
    pub fn reset(&mut self) {
        self.follower.reset();
        self.amount.snap_to_target();
    }

    /// Fill and return the envelope buffer for a block.
    ///
    /// Always produces exactly `num_samples` values, whatever the program
    /// material.
    pub fn process_block(&mut self, input: &StereoBuffer, num_samples: usize) -> &[f32] {
        let n = num_samples.min(self.buffer.len());
        for i in 0..n {
            let magnitude = input.left[i].abs() + input.right[i].abs();
            let envelope = self.follower.track(magnitude);
            self.buffer[i] = envelope * self.amount.advance();
        }
        &self.buffer[..n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_value_per_sample() {
        let mut source = EnvelopeSource::new(1.0);
        source.prepare(48000.0, 512);

        let input = StereoBuffer::new(256);
        let env = source.process_block(&input, 256);
        assert_eq!(env.len(), 256);
    }

    #[test]
    fn silence_gives_zero_envelope() {
        let mut source = EnvelopeSource::new(1.0);
        source.prepare(48000.0, 256);

        let input = StereoBuffer::new(256);
        let env = source.process_block(&input, 256);
        assert!(env.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn loud_input_raises_envelope() {
        let mut source = EnvelopeSource::new(1.0);
        source.prepare(48000.0, 256);

        let mut input = StereoBuffer::new(256);
        input.left.fill(0.5);
        input.right.fill(0.5);

        let mut last = 0.0;
        for _ in 0..200 {
            let env = source.process_block(&input, 256);
            last = env[255];
        }
        // |L|+|R| = 1.0, settled 20 Hz lowpass tracks it fully
        assert!(last > 0.9, "envelope should approach the stereo sum, got {last}");
    }

    #[test]
    fn zero_amount_mutes_modulation() {
        let mut source = EnvelopeSource::new(0.0);
        source.prepare(48000.0, 128);

        let mut input = StereoBuffer::new(128);
        input.left.fill(1.0);
        input.right.fill(1.0);

        for _ in 0..50 {
            let env = source.process_block(&input, 128);
            assert!(env.iter().all(|&e| e == 0.0));
        }
    }
}
