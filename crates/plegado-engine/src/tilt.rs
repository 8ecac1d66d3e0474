//! Tilt EQ: paired low-shelf/high-shelf filters around a pivot frequency.
//!
//! A tilt of +t dB raises the low shelf by `t` and lowers the high shelf
//! by `t`, rotating the spectrum around the pivot (where gain stays near
//! unity). The pipeline runs two instances from one parameter: a
//! pre-emphasis tilt before the waveshaper and an inverted instance after
//! it, so the "colour" control changes which frequencies fold hardest
//! without tilting the final mix.
//!
//! Coefficients recompute only when the smoothed tilt has moved more than
//! a small threshold since the last update. Minimum-phase IIR, so latency
//! is a fixed small estimate used for compensation accounting, not a
//! measured delay.

use plegado_core::{
    Biquad, SmoothedParam, StereoBuffer, high_shelf_coefficients, low_shelf_coefficients,
};

/// Tilt change that forces a coefficient recompute, in dB.
const TILT_EPSILON: f32 = 0.001;

/// Shelf Q shared by both filters.
const SHELF_Q: f32 = 0.707;

/// Fixed latency estimate for downstream compensation accounting.
const LATENCY_ESTIMATE: usize = 10;

/// Stereo tilt filter.
pub struct TiltFilter {
    low_shelf: [Biquad; 2],
    high_shelf: [Biquad; 2],

    /// Tilt in dB, smoothed. Positive = more lows, fewer highs.
    tilt: SmoothedParam,
    /// Tilt value the current coefficients were designed for.
    last_tilt: f32,
    /// Pivot frequency in Hz.
    pivot_hz: f32,
    /// Inverted instances apply `-tilt` (post-de-emphasis).
    inverted: bool,
    /// Force a recompute on the next processed sample.
    needs_update: bool,

    sample_rate: f32,
}

impl TiltFilter {
    /// Create a tilt filter. `inverted` flips the applied sign, for the
    /// de-emphasis instance after the waveshaper.
    pub fn new(default_tilt_db: f32, inverted: bool) -> Self {
        Self {
            low_shelf: [Biquad::new(), Biquad::new()],
            high_shelf: [Biquad::new(), Biquad::new()],
            tilt: SmoothedParam::new(default_tilt_db.clamp(-12.0, 12.0)),
            last_tilt: 0.0,
            pivot_hz: 500.0,
            inverted,
            needs_update: true,
            sample_rate: 44100.0,
        }
    }

    /// Configure for the stream: fast tilt smoothing (5 ms), cleared
    /// filter state, coefficients pending.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.tilt.reset(sample_rate, 5.0);
        self.reset();
        self.needs_update = true;
    }

    /// Clear filter memory without touching parameters.
    pub fn reset(&mut self) {
        for ch in 0..2 {
            self.low_shelf[ch].clear();
            self.high_shelf[ch].clear();
        }
    }

    /// Set the tilt in dB, clamped to [-12, +12].
    pub fn set_tilt_db(&mut self, tilt_db: f32) {
        self.tilt.set_target(tilt_db.clamp(-12.0, 12.0));
    }

    /// Set the pivot frequency, clamped to [100, 10000] Hz.
    pub fn set_pivot_hz(&mut self, freq_hz: f32) {
        self.pivot_hz = freq_hz.clamp(100.0, 10000.0);
        self.needs_update = true;
    }

    /// Fixed minimum-phase latency estimate.
    pub fn latency_samples(&self) -> usize {
        LATENCY_ESTIMATE
    }

    /// Process a stereo block in place.
    pub fn process_block(&mut self, buffer: &mut StereoBuffer, num_samples: usize) {
        for i in 0..num_samples {
            let current_tilt = self.tilt.advance();

            if self.needs_update || (current_tilt - self.last_tilt).abs() > TILT_EPSILON {
                self.update_coefficients(current_tilt);
                self.last_tilt = current_tilt;
                self.needs_update = false;
            }

            // Loudness compensation: a tilted spectrum reads louder than
            // it measures, proportional to the tilt magnitude.
            let comp = 1.0 - current_tilt.abs() * 0.01;

            let l = self.high_shelf[0].process(self.low_shelf[0].process(buffer.left[i]));
            let r = self.high_shelf[1].process(self.low_shelf[1].process(buffer.right[i]));
            buffer.left[i] = l * comp;
            buffer.right[i] = r * comp;
        }
    }

    fn update_coefficients(&mut self, tilt_db: f32) {
        let applied = if self.inverted { -tilt_db } else { tilt_db };

        let (lb0, lb1, lb2, la0, la1, la2) =
            low_shelf_coefficients(self.pivot_hz, SHELF_Q, applied, self.sample_rate);
        let (hb0, hb1, hb2, ha0, ha1, ha2) =
            high_shelf_coefficients(self.pivot_hz, SHELF_Q, -applied, self.sample_rate);

        for ch in 0..2 {
            self.low_shelf[ch].set_coefficients(lb0, lb1, lb2, la0, la1, la2);
            self.high_shelf[ch].set_coefficients(hb0, hb1, hb2, ha0, ha1, ha2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    /// RMS of one channel after processing a sine through the filter.
    fn response_at(filter: &mut TiltFilter, freq: f32) -> f32 {
        let n = 48000;
        let mut sq = 0.0f64;
        let block = 256;
        let mut count = 0u32;
        for b in 0..(n / block) {
            let mut buf = StereoBuffer::new(block);
            for i in 0..block {
                let x =
                    (core::f32::consts::TAU * freq * (b * block + i) as f32 / SR).sin();
                buf.left[i] = x;
                buf.right[i] = x;
            }
            filter.process_block(&mut buf, block);
            if b > 60 {
                for &y in &buf.left {
                    sq += f64::from(y * y);
                    count += 1;
                }
            }
        }
        ((sq / f64::from(count)).sqrt() * core::f64::consts::SQRT_2) as f32
    }

    #[test]
    fn zero_tilt_is_nearly_transparent() {
        let mut filter = TiltFilter::new(0.0, false);
        filter.prepare(SR);
        let gain = response_at(&mut filter, 1000.0);
        assert!((gain - 1.0).abs() < 0.02, "0 dB tilt should pass, gain {gain}");
    }

    #[test]
    fn positive_tilt_boosts_lows_cuts_highs() {
        let mut low = TiltFilter::new(6.0, false);
        low.prepare(SR);
        let low_gain = response_at(&mut low, 60.0);

        let mut high = TiltFilter::new(6.0, false);
        high.prepare(SR);
        let high_gain = response_at(&mut high, 8000.0);

        assert!(low_gain > 1.5, "lows should be boosted, gain {low_gain}");
        assert!(high_gain < 0.7, "highs should be cut, gain {high_gain}");
    }

    #[test]
    fn inverted_instance_flips_the_tilt() {
        let mut filter = TiltFilter::new(6.0, true);
        filter.prepare(SR);
        let low_gain = response_at(&mut filter, 60.0);
        let mut filter = TiltFilter::new(6.0, true);
        filter.prepare(SR);
        let high_gain = response_at(&mut filter, 8000.0);

        assert!(low_gain < 0.7, "inverted tilt should cut lows, gain {low_gain}");
        assert!(high_gain > 1.5, "inverted tilt should boost highs, gain {high_gain}");
    }

    #[test]
    fn pivot_gain_stays_near_unity() {
        let mut filter = TiltFilter::new(12.0, false);
        filter.prepare(SR);
        let gain = response_at(&mut filter, 500.0);
        // Shelf skirts overlap at the pivot; compensation keeps it close.
        assert!(
            (0.75..=1.25).contains(&gain),
            "pivot should be roughly unity, gain {gain}"
        );
    }

    #[test]
    fn latency_is_fixed_estimate() {
        assert_eq!(TiltFilter::new(0.0, false).latency_samples(), 10);
    }

    #[test]
    fn tilt_setter_clamps() {
        let mut filter = TiltFilter::new(0.0, false);
        filter.set_tilt_db(40.0);
        assert_eq!(filter.tilt.target(), 12.0);
        filter.set_tilt_db(-40.0);
        assert_eq!(filter.tilt.target(), -12.0);
    }
}
