//! Plegado Engine - the waveshaping/dispersion pipeline.
//!
//! Assembles the primitives from `plegado-core` into the full stereo
//! effect:
//!
//! - [`TiltFilter`] - pre/post spectral tilt around a pivot
//! - [`EnvelopeSource`] - program-dependent drive modulation signal
//! - [`WaveshaperCore`] - oversampled morphable wavefolder
//! - [`DryWetMixer`] - latency-compensated dry/wet blend
//! - [`Disperser`] - 16-stage all-pass phase dispersion
//! - [`PlegadoProcessor`] - the [`Processor`] graph wiring them together
//!
//! Parameters are enumerated in [`ParamKey`] with metadata in
//! [`DESCRIPTORS`]; the host delivers `(string_id, value)` notifications
//! to [`Processor::parameter_changed`].

pub mod disperser;
pub mod dry_wet;
pub mod envelope;
pub mod params;
pub mod processor;
pub mod tilt;
pub mod waveshaper;

// Re-export main types at crate root
pub use disperser::{Disperser, MAX_STAGES};
pub use dry_wet::DryWetMixer;
pub use envelope::EnvelopeSource;
pub use params::{DESCRIPTORS, PARAM_COUNT, ParamKey};
pub use processor::{PlegadoProcessor, PrepareError, Processor};
pub use tilt::TiltFilter;
pub use waveshaper::WaveshaperCore;
