//! Math utilities and waveshaping transfer functions.
//!
//! All functions are allocation-free and `no_std` compatible.
//!
//! # Transfer Functions
//!
//! The four nonlinearities used by the waveshaper, in morph order:
//!
//! | Function | Character | Harmonics |
//! |----------|-----------|-----------|
//! | [`chebyshev3`] | Focused, hollow | Mostly 3rd |
//! | [`sine_fold`] | Smooth, musical | Dense odd/even |
//! | [`triangle_fold`] | Geometric, buzzy | Dense odd |
//! | [`foldback`] | Hard, synthy | Even + odd |

use libm::{expf, fabsf, floorf, logf, sinf, tanhf};

/// Convert decibels to linear gain (0 dB → 1.0, -6 dB → ~0.5).
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Input is floored at 1e-10.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Linear interpolation between `a` (t=0) and `b` (t=1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush values in the subnormal danger zone to exact zero.
///
/// Subnormal floats (below ~1.2e-38) trigger slow microcode paths on most
/// CPUs, up to 100x slower than normal arithmetic. Filter feedback loops
/// decay toward zero indefinitely and will park in that range unless
/// flushed. The 1e-20 threshold leaves a wide margin above the subnormal
/// boundary while remaining far below audibility.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if fabsf(x) < 1e-20 { 0.0 } else { x }
}

/// Sine wavefolder: `sin(2π·x)`.
///
/// Maps the full input range onto repeating sine lobes. Inputs in
/// [-0.25, 0.25] shape gently; larger excursions fold through additional
/// lobes, adding harmonics progressively with drive.
#[inline]
pub fn sine_fold(x: f32) -> f32 {
    sinf(core::f32::consts::TAU * x)
}

/// Triangle wavefolder with period 1: `4·|x − floor(x + 0.5)| − 1`.
///
/// The periodic triangle maps any input into [-1, 1] with straight
/// segments, giving a harder edge than [`sine_fold`].
#[inline]
pub fn triangle_fold(x: f32) -> f32 {
    4.0 * fabsf(x - floorf(x + 0.5)) - 1.0
}

/// Folding threshold for [`foldback`].
pub const FOLDBACK_THRESHOLD: f32 = 0.25;

/// Serge-style foldback: reflect around ±[`FOLDBACK_THRESHOLD`] until the
/// value is inside the range, then rescale to full amplitude.
///
/// Inputs inside the threshold pass unchanged (before the `1/threshold`
/// gain). An input of `1.5 × threshold` reflects to `0.5 × threshold`.
#[inline]
pub fn foldback(x: f32) -> f32 {
    const GAIN_COMP: f32 = 1.0 / FOLDBACK_THRESHOLD;
    let mut x = x;
    while x > FOLDBACK_THRESHOLD || x < -FOLDBACK_THRESHOLD {
        if x > FOLDBACK_THRESHOLD {
            x = FOLDBACK_THRESHOLD - (x - FOLDBACK_THRESHOLD);
        }
        if x < -FOLDBACK_THRESHOLD {
            x = -FOLDBACK_THRESHOLD + (-FOLDBACK_THRESHOLD - x);
        }
    }
    x * GAIN_COMP
}

/// Third-order Chebyshev polynomial with soft-clipped input:
/// `T3(tanh(x)) = 4·tanh(x)³ − 3·tanh(x)`.
///
/// The tanh pre-clip keeps the polynomial's argument in [-1, 1], where T3
/// is bounded; without it the cubic term explodes for hot inputs.
#[inline]
pub fn chebyshev3(x: f32) -> f32 {
    let t = tanhf(x);
    4.0 * t * t * t - 3.0 * t
}
