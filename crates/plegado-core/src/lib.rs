//! Plegado Core - DSP primitives for the plegado waveshaping pipeline.
//!
//! This crate provides the building blocks the engine crate assembles into
//! the full effect: parameter smoothing, filters, envelope detection,
//! oversampling and waveshape math. Everything here is designed for
//! real-time use: zero allocation in the processing path, no locks, no
//! blocking.
//!
//! # Primitives
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Linear ramps with bulk [`skip`](SmoothedParam::skip)
//!   for bypass bookkeeping
//! - [`ParamDescriptor`] - Registry metadata (range, default, curve,
//!   smoothing time)
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR with RBJ cookbook coefficients
//!   ([`allpass_coefficients`], [`low_shelf_coefficients`],
//!   [`high_shelf_coefficients`])
//! - [`InterpolatedAllpass`] - All-pass stage with click-free coefficient
//!   transitions, the dispersion cascade's unit cell
//! - [`DcBlocker`] - First-order highpass just above DC
//!
//! ## Detection & Rate Conversion
//!
//! - [`EnvelopeFollower`] - Rectify + smooth amplitude tracking
//! - [`Oversampler`] - Block up/down conversion around a nonlinearity
//!
//! ## Utilities
//!
//! - [`StereoBuffer`] - Block interchange type
//! - Waveshape transfer functions: [`sine_fold`], [`triangle_fold`],
//!   [`foldback`], [`chebyshev3`]
//! - [`flush_denormal`], [`db_to_linear`], [`linear_to_db`], [`lerp`]
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (disable the default `std` feature);
//! math comes from `libm`.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod buffer;
pub mod dc_blocker;
pub mod envelope;
pub mod math;
pub mod oversample;
pub mod param;
pub mod param_info;

// Re-export main types at crate root
pub use allpass::{INTERP_SAMPLES, InterpolatedAllpass};
pub use biquad::{
    Biquad, allpass_coefficients, high_shelf_coefficients, low_shelf_coefficients,
};
pub use buffer::StereoBuffer;
pub use dc_blocker::DcBlocker;
pub use envelope::{DetectionMode, EnvelopeFollower};
pub use math::{
    FOLDBACK_THRESHOLD, chebyshev3, db_to_linear, flush_denormal, foldback, lerp, linear_to_db,
    sine_fold, triangle_fold,
};
pub use oversample::{MAX_FACTOR, Oversampler, TARGET_RATE, factor_for_rate};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamScale, ParamUnit};
