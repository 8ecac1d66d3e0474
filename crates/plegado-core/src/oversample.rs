//! Block-based oversampling for anti-aliased nonlinear processing.
//!
//! Wavefolding generates harmonics far above Nyquist that alias back into
//! the audible band. The [`Oversampler`] raises the rate before the
//! nonlinearity and filters on the way back down:
//!
//! 1. **Upsample**: linear interpolation to `factor ×` the native rate
//! 2. **Process**: the caller shapes the oversampled work buffer
//! 3. **Downsample**: 16-tap windowed-sinc FIR + decimation
//!
//! The factor is chosen at prepare time so the oversampled rate approaches
//! 192 kHz ([`factor_for_rate`]), capped at 16×. A factor of 1 is an exact
//! passthrough with zero latency — the graph pre-builds one instance of
//! each and switches between them by index, never constructing on the
//! audio thread.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Maximum supported oversampling factor.
pub const MAX_FACTOR: usize = 16;

/// Oversampled rate the factor selection aims for, in Hz.
pub const TARGET_RATE: f32 = 192_000.0;

/// FIR filter order for anti-aliasing (taps = ORDER + 1).
const FILTER_ORDER: usize = 15;

/// Number of filter taps.
const FILTER_TAPS: usize = FILTER_ORDER + 1;

/// Picks the oversampling factor for a native sample rate: the largest
/// power of two whose product with `sample_rate` stays at or below
/// [`TARGET_RATE`], clamped to `[1, 16]`.
///
/// 44.1/48 kHz → 4×, 88.2/96 kHz → 2×, 176.4/192 kHz → 1×.
pub fn factor_for_rate(sample_rate: f32) -> usize {
    let ratio = (TARGET_RATE / sample_rate.max(1.0)) as usize;
    let mut factor = 1;
    while factor * 2 <= ratio && factor * 2 <= MAX_FACTOR {
        factor *= 2;
    }
    factor
}

/// Stereo block oversampler with a runtime-selected factor.
///
/// All storage is sized in [`new`](Self::new); the up/work/down path never
/// allocates. Filter state is independent per channel.
pub struct Oversampler {
    factor: usize,
    /// Previous input sample per channel, for linear interpolation.
    prev_sample: [f32; 2],
    /// Downsampling FIR delay line per channel.
    fir_state: [[f32; FILTER_TAPS]; 2],
    /// Oversampled work buffers (left, right).
    work_l: Vec<f32>,
    work_r: Vec<f32>,
}

impl Oversampler {
    /// Create an oversampler for the given factor and maximum block size.
    ///
    /// # Panics
    ///
    /// Panics if `factor` is not 1, 2, 4, 8 or 16. Factor validation is a
    /// prepare-time concern; the audio path never reaches it.
    pub fn new(factor: usize, max_block: usize) -> Self {
        assert!(
            matches!(factor, 1 | 2 | 4 | 8 | 16),
            "oversample factor must be 1, 2, 4, 8 or 16"
        );
        Self {
            factor,
            prev_sample: [0.0; 2],
            fir_state: [[0.0; FILTER_TAPS]; 2],
            work_l: vec![0.0; max_block * factor],
            work_r: vec![0.0; max_block * factor],
        }
    }

    /// The oversampling factor.
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Latency introduced by the anti-aliasing filter, referred to the
    /// native rate. Zero for the 1× passthrough.
    pub fn latency_samples(&self) -> usize {
        if self.factor == 1 {
            0
        } else {
            // Symmetric FIR group delay is ORDER/2 oversampled samples.
            libm::roundf(FILTER_ORDER as f32 * 0.5 / self.factor as f32) as usize
        }
    }

    /// Clear interpolation and filter state.
    pub fn reset(&mut self) {
        self.prev_sample = [0.0; 2];
        self.fir_state = [[0.0; FILTER_TAPS]; 2];
    }

    /// Upsample a stereo block into the internal work buffers.
    ///
    /// With factor 1 this is a plain copy.
    pub fn upsample(&mut self, left: &[f32], right: &[f32]) {
        let n = left.len();
        debug_assert_eq!(n, right.len());
        debug_assert!(n * self.factor <= self.work_l.len());

        if self.factor == 1 {
            self.work_l[..n].copy_from_slice(left);
            self.work_r[..n].copy_from_slice(right);
            return;
        }

        let step = 1.0 / self.factor as f32;
        for (ch, (input, work)) in [(left, &mut self.work_l), (right, &mut self.work_r)]
            .into_iter()
            .enumerate()
        {
            let mut prev = self.prev_sample[ch];
            for (i, &x) in input.iter().enumerate() {
                for k in 0..self.factor {
                    let t = (k as f32 + 1.0) * step;
                    work[i * self.factor + k] = prev + t * (x - prev);
                }
                prev = x;
            }
            self.prev_sample[ch] = prev;
        }
    }

    /// Mutable access to both oversampled work buffers for a block of
    /// `num_samples` native samples (each slice holds
    /// `num_samples × factor` samples).
    pub fn work_buffers(&mut self, num_samples: usize) -> (&mut [f32], &mut [f32]) {
        let len = num_samples * self.factor;
        (&mut self.work_l[..len], &mut self.work_r[..len])
    }

    /// Filter and decimate the work buffers back into a stereo block.
    ///
    /// With factor 1 this is a plain copy.
    pub fn downsample(&mut self, left: &mut [f32], right: &mut [f32]) {
        let n = left.len();
        debug_assert_eq!(n, right.len());

        if self.factor == 1 {
            left.copy_from_slice(&self.work_l[..n]);
            right.copy_from_slice(&self.work_r[..n]);
            return;
        }

        let coeffs = coefficients(self.factor);
        for (ch, (output, work)) in [(left, &self.work_l), (right, &self.work_r)]
            .into_iter()
            .enumerate()
        {
            let state = &mut self.fir_state[ch];
            for (i, out) in output.iter_mut().enumerate() {
                // Every oversampled sample enters the delay line; the
                // convolution sum is only evaluated at decimation points.
                for k in 0..self.factor {
                    for j in (1..FILTER_TAPS).rev() {
                        state[j] = state[j - 1];
                    }
                    state[0] = work[i * self.factor + k];
                }
                let mut acc = 0.0;
                for (j, &c) in coeffs.iter().enumerate() {
                    acc += state[j] * c;
                }
                *out = acc;
            }
        }
    }
}

/// Anti-aliasing FIR coefficients for a given factor.
///
/// # Panics
///
/// Panics on factors without a table (1 is handled as passthrough before
/// any lookup).
fn coefficients(factor: usize) -> &'static [f32; FILTER_TAPS] {
    match factor {
        2 => &COEFFS_2X,
        4 => &COEFFS_4X,
        8 => &COEFFS_8X,
        16 => &COEFFS_16X,
        _ => unreachable!("no FIR table for factor {factor}"),
    }
}

// ---------------------------------------------------------------------------
// Filter coefficients
//
// Windowed-sinc lowpass FIR sets (Kaiser window, beta ~5.6), symmetric
// about the 7.5-sample center, normalized to unity DC gain. Each set's
// cutoff sits at the native-rate Nyquist of its factor:
//   2×: 0.2 · fs_os    4×: 0.1 · fs_os    8×: 0.05 · fs_os    16×: 0.025 · fs_os
//
// Reference: Oppenheim & Schafer, "Discrete-Time Signal Processing",
// Ch. 7 (window-method FIR design).
// ---------------------------------------------------------------------------

/// 2× set. The zero taps at the edges and quarter points are the
/// half-band structure falling out of the 0.2 cutoff + symmetric design.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_2X: [f32; FILTER_TAPS] = [
     0.0000000000,  0.0041250832,  0.0069747288, -0.0152900465,
    -0.0483646054,  0.0000000000,  0.1823082203,  0.3702466195,
     0.3702466195,  0.1823082203,  0.0000000000, -0.0483646054,
    -0.0152900465,  0.0069747288,  0.0041250832,  0.0000000000,
];

/// 4× set.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_4X: [f32; FILTER_TAPS] = [
    -0.0009343853, -0.0036082391, -0.0037705291,  0.0082657786,
     0.0423048591,  0.0981214130,  0.1594662771,  0.2001548258,
     0.2001548258,  0.1594662771,  0.0981214130,  0.0423048591,
     0.0082657786, -0.0037705291, -0.0036082391, -0.0009343853,
];

/// 8× set.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_8X: [f32; FILTER_TAPS] = [
     0.0009441646,  0.0056787828,  0.0172217216,  0.0377535714,
     0.0665809828,  0.0991483532,  0.1278776613,  0.1447947623,
     0.1447947623,  0.1278776613,  0.0991483532,  0.0665809828,
     0.0377535714,  0.0172217216,  0.0056787828,  0.0009441646,
];

/// 16× set. The narrow passband trades a little native-band rolloff for
/// stronger alias suppression at the highest ratio.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_16X: [f32; FILTER_TAPS] = [
     0.0022361722,  0.0098507055,  0.0240341809,  0.0449997088,
     0.0707752795,  0.0972674068,  0.1191956339,  0.1316409123,
     0.1316409123,  0.1191956339,  0.0972674068,  0.0707752795,
     0.0449997088,  0.0240341809,  0.0098507055,  0.0022361722,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_selection_targets_192k() {
        assert_eq!(factor_for_rate(44100.0), 4);
        assert_eq!(factor_for_rate(48000.0), 4);
        assert_eq!(factor_for_rate(96000.0), 2);
        assert_eq!(factor_for_rate(192000.0), 1);
        assert_eq!(factor_for_rate(22050.0), 8);
        // Very low rates hit the cap
        assert_eq!(factor_for_rate(8000.0), 16);
    }

    #[test]
    fn coefficient_tables_are_normalized() {
        for factor in [2usize, 4, 8, 16] {
            let sum: f32 = coefficients(factor).iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-4,
                "{factor}x taps must sum to 1 for unity DC gain, got {sum}"
            );
        }
    }

    #[test]
    fn bypass_factor_is_exact_passthrough() {
        let mut os = Oversampler::new(1, 64);
        let input: Vec<f32> = (0..64).map(|i| (i as f32 * 0.3).sin()).collect();
        let mut left = input.clone();
        let mut right = input.clone();

        os.upsample(&left, &right);
        os.downsample(&mut left, &mut right);

        assert_eq!(left, input);
        assert_eq!(right, input);
        assert_eq!(os.latency_samples(), 0);
    }

    #[test]
    fn dc_survives_round_trip() {
        let mut os = Oversampler::new(4, 32);
        let ones = [1.0f32; 32];
        let mut left = [0.0f32; 32];
        let mut right = [0.0f32; 32];

        // A few blocks to let the FIR settle
        for _ in 0..4 {
            os.upsample(&ones, &ones);
            {
                let (wl, wr) = os.work_buffers(32);
                let _ = (wl, wr); // passthrough processing
            }
            left.copy_from_slice(&ones);
            right.copy_from_slice(&ones);
            os.downsample(&mut left, &mut right);
        }

        assert!(
            (left[31] - 1.0).abs() < 0.02,
            "DC through 4x round trip should be ~1, got {}",
            left[31]
        );
    }

    #[test]
    fn work_buffer_length_matches_factor() {
        let mut os = Oversampler::new(8, 16);
        let zeros = [0.0f32; 16];
        os.upsample(&zeros, &zeros);
        let (wl, wr) = os.work_buffers(16);
        assert_eq!(wl.len(), 128);
        assert_eq!(wr.len(), 128);
    }

    #[test]
    fn channels_keep_independent_state() {
        let mut os = Oversampler::new(2, 8);
        let left_in = [1.0f32; 8];
        let right_in = [0.0f32; 8];
        let mut left = [0.0f32; 8];
        let mut right = [0.0f32; 8];

        for _ in 0..8 {
            os.upsample(&left_in, &right_in);
            left.copy_from_slice(&left_in);
            right.copy_from_slice(&right_in);
            os.downsample(&mut left, &mut right);
        }

        assert!(left[7] > 0.9, "left should carry DC, got {}", left[7]);
        assert!(right[7].abs() < 1e-6, "right must stay silent, got {}", right[7]);
    }

    #[test]
    fn latency_scales_with_factor() {
        assert_eq!(Oversampler::new(1, 16).latency_samples(), 0);
        assert_eq!(Oversampler::new(2, 16).latency_samples(), 4);
        assert_eq!(Oversampler::new(4, 16).latency_samples(), 2);
        assert_eq!(Oversampler::new(8, 16).latency_samples(), 1);
    }
}
