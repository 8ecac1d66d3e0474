//! DC blocking filter.
//!
//! Wavefolding is not symmetric around zero once a stereo-width bias is
//! added, so the shaper output can carry a DC offset. This first-order
//! highpass (Julius O. Smith's DC blocker) removes it:
//!
//! ```text
//! H(z) = (1 - z^-1) / (1 - R*z^-1)
//! ```
//!
//! R sits just below 1.0; the -3 dB cutoff is `(1 - R) / (2π) · fs`.

use core::f32::consts::PI;

/// First-order highpass tuned just above DC.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    /// Pole position; controls the cutoff frequency.
    coeff: f32,
    /// Previous input sample.
    x_prev: f32,
    /// Previous output sample.
    y_prev: f32,
}

impl DcBlocker {
    /// Cutoff frequency target in Hz.
    const CUTOFF_HZ: f32 = 7.5;

    /// Create a DC blocker for the given sample rate (~7.5 Hz cutoff).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            coeff: Self::calculate_coeff(sample_rate),
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    /// Process a single sample: `y[n] = x[n] - x[n-1] + R*y[n-1]`.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = input - self.x_prev + self.coeff * self.y_prev;
        self.x_prev = input;
        self.y_prev = output;
        output
    }

    /// Clear the filter state.
    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }

    /// Recalculate R for a new sample rate, keeping the ~7.5 Hz cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.coeff = Self::calculate_coeff(sample_rate);
    }

    fn calculate_coeff(sample_rate: f32) -> f32 {
        let r = 1.0 - (2.0 * PI * Self::CUTOFF_HZ / sample_rate);
        r.clamp(0.9, 0.9999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_dc() {
        let mut blocker = DcBlocker::new(48000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = blocker.process(1.0);
        }
        assert!(out.abs() < 0.01, "DC should decay away, got {out}");
    }

    #[test]
    fn passes_midband_audio() {
        let mut blocker = DcBlocker::new(48000.0);
        let sr = 48000.0;
        let freq = 1000.0;

        for i in 0..48000 {
            let t = i as f32 / sr;
            blocker.process(libm::sinf(2.0 * PI * freq * t));
        }

        let mut max_out = 0.0f32;
        for i in 48000..48048 {
            let t = i as f32 / sr;
            let out = blocker.process(libm::sinf(2.0 * PI * freq * t));
            max_out = max_out.max(out.abs());
        }
        assert!(max_out > 0.95, "1 kHz should pass near unity, got {max_out}");
    }

    #[test]
    fn reset_clears_state() {
        let mut blocker = DcBlocker::new(48000.0);
        for _ in 0..100 {
            blocker.process(1.0);
        }
        blocker.reset();
        assert_eq!(blocker.x_prev, 0.0);
        assert_eq!(blocker.y_prev, 0.0);
    }
}
