//! Oversampled morphable wavefolder.
//!
//! The nonlinear heart of the pipeline. Per block:
//!
//! 1. Select the active oversampler — a 1× passthrough or the high-ratio
//!    instance. Both are built at prepare time; the toggle is an index
//!    switch, never a construction, so it is safe from the audio thread.
//! 2. Upsample, then for every oversampled sample: apply smoothed drive,
//!    add the stereo-width bias (−w/2 left, +w/2 right), scale by
//!    `envelope + 1` (modulation deepens the fold but never mutes), and
//!    run the morphable transfer function.
//! 3. Downsample, DC-block each channel, and apply the fixed 0.5× gain
//!    compensation for the transfer functions' hot output.
//!
//! The morph control cross-fades adjacent shapes along
//! Chebyshev(0) → SineFold(1) → Triangle(2) → Foldback(3). While its
//! smoother is mid-ramp the morph advances every oversampled sample;
//! once settled it is sampled once per block, which keeps a static shape
//! bit-exact instead of accumulating per-sample smoother noise.

use plegado_core::{
    DcBlocker, Oversampler, SmoothedParam, StereoBuffer, chebyshev3, factor_for_rate, foldback,
    lerp, sine_fold, triangle_fold,
};

/// Fixed output gain compensation.
const GAIN_COMP: f32 = 0.5;

/// Blend adjacent transfer functions for a morph position in [0, 3].
#[inline]
fn apply_waveshape(x: f32, morph: f32) -> f32 {
    if morph < 1.0 {
        lerp(chebyshev3(x), sine_fold(x), morph)
    } else if morph < 2.0 {
        lerp(sine_fold(x), triangle_fold(x), morph - 1.0)
    } else {
        lerp(triangle_fold(x), foldback(x), morph - 2.0)
    }
}

/// Stereo waveshaper with envelope modulation and switchable oversampling.
pub struct WaveshaperCore {
    /// Drive in [0, 10], smoothed (30 ms).
    drive: SmoothedParam,
    /// Stereo width in [0, 0.25], smoothed (30 ms).
    width: SmoothedParam,
    /// Shape morph in [0, 3], smoothed slowly (250 ms) — shape changes
    /// are gestures, not modulation.
    morph: SmoothedParam,

    dc_blocker: [DcBlocker; 2],

    /// 1× passthrough instance.
    os_bypass: Oversampler,
    /// High-ratio instance (rate-dependent factor toward 192 kHz).
    os_high: Oversampler,
    /// Which instance `process_block` uses.
    oversampling: bool,
}

impl WaveshaperCore {
    /// Create with the given defaults. Buffers are sized by
    /// [`prepare`](Self::prepare).
    pub fn new(default_drive: f32, default_width: f32, default_oversampling: bool) -> Self {
        Self {
            drive: SmoothedParam::new(default_drive.clamp(0.0, 10.0)),
            width: SmoothedParam::new(default_width.clamp(0.0, 0.25)),
            morph: SmoothedParam::new(0.0),
            dc_blocker: [DcBlocker::new(44100.0), DcBlocker::new(44100.0)],
            os_bypass: Oversampler::new(1, 0),
            os_high: Oversampler::new(1, 0),
            oversampling: default_oversampling,
        }
    }

    /// Build both oversampler instances for the stream and reset state.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        self.drive.reset(sample_rate, 30.0);
        self.width.reset(sample_rate, 30.0);
        self.morph.reset(sample_rate, 250.0);

        for blocker in &mut self.dc_blocker {
            blocker.set_sample_rate(sample_rate);
            blocker.reset();
        }

        self.os_bypass = Oversampler::new(1, max_block);
        self.os_high = Oversampler::new(factor_for_rate(sample_rate), max_block);
    }

    /// Clear filter and converter state without touching parameters.
    pub fn reset(&mut self) {
        for blocker in &mut self.dc_blocker {
            blocker.reset();
        }
        self.os_bypass.reset();
        self.os_high.reset();
        self.drive.snap_to_target();
        self.width.snap_to_target();
        self.morph.snap_to_target();
    }

    /// Set the drive, clamped to [0, 10].
    pub fn set_drive(&mut self, drive: f32) {
        self.drive.set_target(drive.clamp(0.0, 10.0));
    }

    /// Set the stereo width, clamped to [0, 0.25].
    pub fn set_stereo_width(&mut self, width: f32) {
        self.width.set_target(width.clamp(0.0, 0.25));
    }

    /// Set the shape morph position, clamped to [0, 3].
    pub fn set_morph(&mut self, morph: f32) {
        self.morph.set_target(morph.clamp(0.0, 3.0));
    }

    /// Switch between the pre-built oversampler instances.
    pub fn set_oversampling(&mut self, enabled: bool) {
        self.oversampling = enabled;
    }

    /// Whether the high-ratio instance is active.
    pub fn oversampling(&self) -> bool {
        self.oversampling
    }

    /// Latency of the active oversampler instance.
    pub fn latency_samples(&self) -> usize {
        if self.oversampling {
            self.os_high.latency_samples()
        } else {
            self.os_bypass.latency_samples()
        }
    }

    /// Process a stereo block in place. `envelope` holds one control value
    /// per native-rate sample (from [`EnvelopeSource`]).
    ///
    /// [`EnvelopeSource`]: crate::envelope::EnvelopeSource
    pub fn process_block(
        &mut self,
        buffer: &mut StereoBuffer,
        num_samples: usize,
        envelope: &[f32],
    ) {
        let os = if self.oversampling {
            &mut self.os_high
        } else {
            &mut self.os_bypass
        };
        let factor = os.factor();

        os.upsample(&buffer.left[..num_samples], &buffer.right[..num_samples]);

        let morph_ramping = !self.morph.is_settled();
        let mut current_morph = if morph_ramping { 0.0 } else { self.morph.get() };

        let (work_l, work_r) = os.work_buffers(num_samples);
        for i in 0..num_samples * factor {
            if morph_ramping {
                current_morph = self.morph.advance();
            }

            // Index the native-rate envelope from the oversampled loop.
            let native_index = (i / factor).min(envelope.len().saturating_sub(1));
            let env = envelope.get(native_index).copied().unwrap_or(0.0) + 1.0;

            let width = self.width.advance();
            let drive = self.drive.advance();
            let bias_l = width * -0.5;
            let bias_r = width * 0.5;

            work_l[i] = apply_waveshape((work_l[i] * drive + bias_l) * env, current_morph);
            work_r[i] = apply_waveshape((work_r[i] * drive + bias_r) * env, current_morph);
        }

        os.downsample(&mut buffer.left[..num_samples], &mut buffer.right[..num_samples]);

        for i in 0..num_samples {
            buffer.left[i] = self.dc_blocker[0].process(buffer.left[i]) * GAIN_COMP;
            buffer.right[i] = self.dc_blocker[1].process(buffer.right[i]) * GAIN_COMP;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn prepared(oversampling: bool) -> WaveshaperCore {
        let mut shaper = WaveshaperCore::new(1.0, 0.0, oversampling);
        shaper.prepare(SR, 512);
        shaper
    }

    #[test]
    fn sine_fold_shape_matches_reference() {
        // drive=1, width=0, zero envelope, morph=1 (pure sine fold), no
        // oversampling: output must be sin(2π·x) · 0.5 after the (here
        // negligible) DC blocker.
        let mut shaper = prepared(false);
        shaper.set_morph(1.0);
        shaper.reset(); // snap the morph ramp

        let n = 256;
        let env = vec![0.0f32; n];
        let mut buf = StereoBuffer::new(n);
        for i in 0..n {
            buf.left[i] = (core::f32::consts::TAU * 997.0 * i as f32 / SR).sin() * 0.3;
            buf.right[i] = buf.left[i];
        }
        let input = buf.clone();
        shaper.process_block(&mut buf, n, &env);

        // Compare mid-block to dodge DC-blocker transient build-in.
        for i in 64..n {
            let expected = sine_fold(input.left[i]) * GAIN_COMP;
            assert!(
                (buf.left[i] - expected).abs() < 0.03,
                "sample {i}: got {}, expected {expected}",
                buf.left[i]
            );
        }
    }

    #[test]
    fn zero_width_keeps_channels_identical() {
        let mut shaper = prepared(false);
        shaper.set_morph(1.0);
        shaper.reset();

        let n = 128;
        let env = vec![0.0f32; n];
        let mut buf = StereoBuffer::new(n);
        for i in 0..n {
            buf.left[i] = (i as f32 * 0.05).sin() * 0.4;
            buf.right[i] = buf.left[i];
        }
        shaper.process_block(&mut buf, n, &env);
        for i in 0..n {
            assert_eq!(buf.left[i], buf.right[i]);
        }
    }

    #[test]
    fn width_bias_splits_channels() {
        let mut shaper = prepared(false);
        shaper.set_morph(1.0);
        shaper.set_stereo_width(0.25);
        shaper.reset();

        let n = 256;
        let env = vec![0.0f32; n];
        let mut buf = StereoBuffer::new(n);
        for i in 0..n {
            buf.left[i] = (i as f32 * 0.07).sin() * 0.4;
            buf.right[i] = buf.left[i];
        }
        shaper.process_block(&mut buf, n, &env);

        let diff: f32 = (0..n).map(|i| (buf.left[i] - buf.right[i]).abs()).sum();
        assert!(diff > 0.1, "bias should decorrelate the channels, diff {diff}");
    }

    #[test]
    fn envelope_deepens_the_fold() {
        // With envelope e, the shaper sees (x·drive)·(e+1): same input,
        // bigger excursion, different fold output.
        let mut quiet = prepared(false);
        quiet.set_morph(1.0);
        quiet.reset();
        let mut modulated = prepared(false);
        modulated.set_morph(1.0);
        modulated.reset();

        let n = 128;
        let mut a = StereoBuffer::new(n);
        let mut b = StereoBuffer::new(n);
        for i in 0..n {
            a.left[i] = 0.3;
            a.right[i] = 0.3;
            b.left[i] = 0.3;
            b.right[i] = 0.3;
        }
        quiet.process_block(&mut a, n, &vec![0.0; n]);
        modulated.process_block(&mut b, n, &vec![0.8; n]);

        assert!(
            (a.left[64] - b.left[64]).abs() > 1e-3,
            "envelope must change the shaping"
        );
    }

    #[test]
    fn oversampling_toggle_changes_latency_only_at_high_ratio() {
        let shaper = prepared(true);
        assert!(shaper.latency_samples() > 0);

        let mut shaper = prepared(true);
        shaper.set_oversampling(false);
        assert_eq!(shaper.latency_samples(), 0);
    }

    #[test]
    fn oversampled_path_produces_finite_bounded_output() {
        let mut shaper = prepared(true);
        shaper.set_drive(10.0);
        shaper.set_morph(3.0);
        shaper.reset();

        let n = 512;
        let env = vec![1.0f32; n];
        for block in 0..20 {
            let mut buf = StereoBuffer::new(n);
            for i in 0..n {
                buf.left[i] =
                    (core::f32::consts::TAU * 2500.0 * (block * n + i) as f32 / SR).sin();
                buf.right[i] = buf.left[i];
            }
            shaper.process_block(&mut buf, n, &env);
            for &s in buf.left.iter().chain(buf.right.iter()) {
                assert!(s.is_finite());
                assert!(s.abs() < 2.0, "output should stay bounded, got {s}");
            }
        }
    }

    #[test]
    fn morph_extremes_select_pure_shapes() {
        assert_eq!(apply_waveshape(0.3, 0.0), chebyshev3(0.3));
        assert_eq!(apply_waveshape(0.3, 1.0), sine_fold(0.3));
        assert_eq!(apply_waveshape(0.3, 2.0), triangle_fold(0.3));
        assert!((apply_waveshape(0.3, 3.0) - foldback(0.3)).abs() < 1e-6);
    }

    #[test]
    fn silence_in_silence_out() {
        let mut shaper = prepared(true);
        let n = 256;
        let env = vec![0.0f32; n];
        for _ in 0..10 {
            let mut buf = StereoBuffer::new(n);
            shaper.process_block(&mut buf, n, &env);
            for &s in buf.left.iter().chain(buf.right.iter()) {
                assert!(s.abs() < 1e-4, "silence must not grow DC, got {s}");
            }
        }
    }
}
