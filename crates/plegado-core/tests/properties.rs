//! Property-based tests for the core primitives.
//!
//! Uses proptest to verify invariants across the whole valid parameter
//! space rather than hand-picked points: all-pass unity magnitude,
//! smoother monotonicity, and bounded waveshape output.

use proptest::prelude::*;

use plegado_core::{InterpolatedAllpass, SmoothedParam, chebyshev3, foldback, triangle_fold};

const SAMPLE_RATE: f32 = 48000.0;

/// Measure the steady-state RMS gain of a stage at one frequency.
fn steady_state_gain(stage: &mut InterpolatedAllpass, freq: f32) -> f64 {
    let mut in_sq = 0.0f64;
    let mut out_sq = 0.0f64;
    for i in 0..48000u32 {
        let x = (core::f32::consts::TAU * freq * i as f32 / SAMPLE_RATE).sin();
        let y = stage.process(x);
        if i > 9600 {
            in_sq += f64::from(x * x);
            out_sq += f64::from(y * y);
        }
    }
    (out_sq / in_sq).sqrt()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// |H(e^{jω})| ≈ 1 for any in-range center frequency, Q and probe
    /// frequency.
    #[test]
    fn allpass_magnitude_is_unity(
        center in 50.0f32..10000.0,
        q in 0.05f32..5.5,
        probe in 100.0f32..8000.0,
    ) {
        let mut stage = InterpolatedAllpass::new();
        stage.prepare(SAMPLE_RATE);
        stage.update_coefficients(center, q);
        // Let the interpolation window finish before measuring
        for _ in 0..128 {
            stage.process(0.0);
        }

        let gain = steady_state_gain(&mut stage, probe);
        prop_assert!(
            (gain - 1.0).abs() < 0.02,
            "gain {} at probe {} Hz (center {} Hz, Q {})",
            gain, probe, center, q
        );
    }

    /// The smoother moves monotonically from start to target and lands
    /// exactly on the target.
    #[test]
    fn smoother_monotonic_and_exact(
        start in -2.0f32..2.0,
        target in -2.0f32..2.0,
        ramp_ms in 1.0f32..50.0,
    ) {
        let mut param = SmoothedParam::with_config(start, SAMPLE_RATE, ramp_ms);
        param.set_target(target);

        let lo = start.min(target);
        let hi = start.max(target);
        let ramp_samples = (ramp_ms / 1000.0 * SAMPLE_RATE) as usize;

        let mut prev = start;
        for _ in 0..ramp_samples {
            let v = param.advance();
            prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4, "value {} escaped [{}, {}]", v, lo, hi);
            if target >= start {
                prop_assert!(v >= prev - 1e-6);
            } else {
                prop_assert!(v <= prev + 1e-6);
            }
            prev = v;
        }
        prop_assert_eq!(param.get(), target);
    }

    /// skip(n) is indistinguishable from n advance() calls.
    #[test]
    fn skip_equals_repeated_advance(
        target in -1.0f32..1.0,
        n in 1usize..4096,
    ) {
        let mut stepped = SmoothedParam::with_config(0.0, SAMPLE_RATE, 25.0);
        let mut skipped = stepped.clone();
        stepped.set_target(target);
        skipped.set_target(target);

        for _ in 0..n {
            stepped.advance();
        }
        skipped.skip(n);

        prop_assert!((stepped.get() - skipped.get()).abs() < 1e-4);
    }

    /// Every waveshape stays bounded for arbitrary (even absurd) input.
    #[test]
    fn waveshapes_bounded(x in -100.0f32..100.0) {
        prop_assert!(foldback(x).abs() <= 1.0 + 1e-4);
        prop_assert!(triangle_fold(x).abs() <= 1.0 + 1e-4);
        prop_assert!(chebyshev3(x).abs() <= 1.0 + 1e-4);
    }
}
