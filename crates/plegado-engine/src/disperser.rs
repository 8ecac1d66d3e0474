//! Phase-dispersion cascade: 16 all-pass stages per channel in series.
//!
//! Each stage passes all frequencies at unity gain but delays them by a
//! frequency-dependent amount; sixteen of them stacked up smear transients
//! into the "laser" sweep familiar from dispersive resonators. The cascade
//! imposes no amplitude coloration and no fixed latency — only group
//! delay.
//!
//! Stage tuning:
//!
//! - Frequencies are spread geometrically around the center frequency,
//!   `3/pinch` octaves wide: high pinch concentrates the stages into a
//!   sharp resonant character, low pinch spreads them across the spectrum.
//! - Q derives from `amount` through a curve that is nearly flat close to
//!   zero (6th power below 30% of range, cubic above), so automation
//!   sweeping through the bottom of the range cannot step audibly.
//! - Each stage scales the base Q by 0.8–1.2× so the cascade does not pile
//!   sixteen identical resonances onto one frequency.
//!
//! Coefficients for all 32 stage filters are recomputed at a 64-sample
//! control rate, and only when the smoothed controls have moved past fixed
//! thresholds since the last recompute. Below `amount < 0.005` (current
//! and target) the whole cascade is bypassed; the control smoothers still
//! [`skip`](SmoothedParam::skip) so they stay time-aligned.

use libm::powf;
use plegado_core::{InterpolatedAllpass, SmoothedParam, StereoBuffer};

/// Number of all-pass stages per channel.
pub const MAX_STAGES: usize = 16;

/// Samples between control-rate coefficient recomputations.
const CONTROL_INTERVAL: usize = 64;

/// Amount below which (current and target) the cascade is bypassed.
const BYPASS_THRESHOLD: f32 = 0.005;

/// Knee of the amount→Q curve, as a fraction of full range.
const CURVE_KNEE: f32 = 0.3;

// Recompute thresholds: smoothed values must move at least this far
// before the 32 filter designs are redone.
const AMOUNT_EPSILON: f32 = 0.001;
const FREQ_EPSILON: f32 = 5.0;
const PINCH_EPSILON: f32 = 0.01;

/// Stereo all-pass dispersion cascade.
pub struct Disperser {
    /// 2 channels × 16 stages, all retuned together.
    stages: [[InterpolatedAllpass; MAX_STAGES]; 2],

    amount: SmoothedParam,
    frequency: SmoothedParam,
    pinch: SmoothedParam,

    /// Control values at the last coefficient recompute.
    last_amount: f32,
    last_frequency: f32,
    last_pinch: f32,

    sample_rate: f32,
}

/// Amount→Q mapping: `(a/0.3)^6 · 0.3³` below the knee, `a³` above.
///
/// The two segments meet at the knee (both give 0.027), and the 6th-power
/// floor keeps dQ/da tiny near zero where the bypass threshold lives.
fn amount_curve(amount: f32) -> f32 {
    if amount < CURVE_KNEE {
        let t = amount / CURVE_KNEE;
        let t3 = t * t * t;
        t3 * t3 * (CURVE_KNEE * CURVE_KNEE * CURVE_KNEE)
    } else {
        amount * amount * amount
    }
}

impl Disperser {
    /// Create a disperser with the given defaults.
    pub fn new(default_amount: f32, default_frequency: f32, default_pinch: f32) -> Self {
        Self {
            stages: [
                core::array::from_fn(|_| InterpolatedAllpass::new()),
                core::array::from_fn(|_| InterpolatedAllpass::new()),
            ],
            amount: SmoothedParam::new(default_amount.clamp(0.0, 1.0)),
            frequency: SmoothedParam::new(default_frequency.clamp(20.0, 20000.0)),
            pinch: SmoothedParam::new(default_pinch.clamp(0.1, 10.0)),
            last_amount: f32::NAN,
            last_frequency: f32::NAN,
            last_pinch: f32::NAN,
            sample_rate: 44100.0,
        }
    }

    /// Size all stage filters for the stream and seed their coefficients
    /// from the current control values.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.amount.reset(sample_rate, 30.0);
        self.frequency.reset(sample_rate, 30.0);
        self.pinch.reset(sample_rate, 30.0);

        for channel in &mut self.stages {
            for stage in channel {
                stage.prepare(sample_rate);
            }
        }
        self.recompute_coefficients();
    }

    /// Clear all filter memory, keeping control values. Stage coefficients
    /// re-seed from the current controls (ramping in over the
    /// interpolation window).
    pub fn reset(&mut self) {
        for channel in &mut self.stages {
            for stage in channel {
                stage.reset();
            }
        }
        self.recompute_coefficients();
    }

    /// Set the effect intensity, clamped to [0, 1].
    pub fn set_amount(&mut self, amount: f32) {
        self.amount.set_target(amount.clamp(0.0, 1.0));
    }

    /// Set the dispersion center frequency, clamped to [20, 20000] Hz.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency.set_target(frequency.clamp(20.0, 20000.0));
    }

    /// Set the stage concentration, clamped to [0.1, 10].
    pub fn set_pinch(&mut self, pinch: f32) {
        self.pinch.set_target(pinch.clamp(0.1, 10.0));
    }

    /// IIR feedback topology: group delay only, no fixed latency.
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// Process a stereo block in place.
    pub fn process_block(&mut self, buffer: &mut StereoBuffer, num_samples: usize) {
        // Bypass when the amount is effectively zero and staying there.
        // The smoothers still advance so a later re-engage is in sync.
        if self.amount.get() < BYPASS_THRESHOLD && self.amount.target() < BYPASS_THRESHOLD {
            self.amount.skip(num_samples);
            self.frequency.skip(num_samples);
            self.pinch.skip(num_samples);
            return;
        }

        let mut offset = 0;
        while offset < num_samples {
            let chunk = (num_samples - offset).min(CONTROL_INTERVAL);

            // Control-rate: advance the smoothers by the whole chunk, then
            // retune if anything moved past its threshold.
            self.amount.skip(chunk);
            self.frequency.skip(chunk);
            self.pinch.skip(chunk);
            self.maybe_recompute();

            for (ch, data) in [
                &mut buffer.left[offset..offset + chunk],
                &mut buffer.right[offset..offset + chunk],
            ]
            .into_iter()
            .enumerate()
            {
                for stage in &mut self.stages[ch] {
                    stage.process_block(data);
                }
            }

            offset += chunk;
        }
    }

    fn maybe_recompute(&mut self) {
        let amount = self.amount.get();
        let frequency = self.frequency.get();
        let pinch = self.pinch.get();

        let moved = (amount - self.last_amount).abs() > AMOUNT_EPSILON
            || (frequency - self.last_frequency).abs() > FREQ_EPSILON
            || (pinch - self.last_pinch).abs() > PINCH_EPSILON;
        // NaN sentinels from construction always count as moved.
        if moved || self.last_amount.is_nan() {
            self.recompute_coefficients();
        }
    }

    /// Redesign all 32 stage filters from the current control values.
    fn recompute_coefficients(&mut self) {
        let amount = self.amount.get();
        let frequency = self.frequency.get();
        let pinch = self.pinch.get();

        let nyquist = self.sample_rate * 0.49;
        let safe_freq = frequency.clamp(20.0, nyquist);

        let min_q = 0.001;
        let max_q = 0.5 + pinch * 0.5;
        let base_q = min_q + amount_curve(amount) * (max_q - min_q);

        let octave_spread = 3.0 / pinch;
        for i in 0..MAX_STAGES {
            let ratio = i as f32 / (MAX_STAGES - 1) as f32;

            let multiplier = powf(2.0, (ratio - 0.5) * octave_spread);
            let stage_freq = (safe_freq * multiplier).clamp(20.0, nyquist);

            // Spread the Q 0.8–1.2x across the cascade to break up
            // identical-frequency resonance buildup.
            let stage_q = base_q * (0.8 + ratio * 0.4);

            self.stages[0][i].update_coefficients(stage_freq, stage_q);
            self.stages[1][i].update_coefficients(stage_freq, stage_q);
        }

        self.last_amount = amount;
        self.last_frequency = frequency;
        self.last_pinch = pinch;
    }
}

impl Default for Disperser {
    fn default() -> Self {
        Self::new(0.0, 1000.0, 1.0)
    }
}
