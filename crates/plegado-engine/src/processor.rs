//! The processing graph: one concrete [`Processor`] wiring the components
//! into the block pipeline.
//!
//! Block flow:
//!
//! ```text
//! host buffer ── copy dry ─▶ tilt pre ─▶ envelope ─▶ waveshaper
//!                   │                                    │
//!                   ▼                                    ▼
//!              delay ring ◀──────────────────────── tilt post
//!                   │                                    │
//!                   └────────────▶ dry/wet merge ◀───────┘
//!                                        │
//!                                        ▼
//!                                    disperser ─▶ host buffer
//! ```
//!
//! Control changes arrive as `(string_id, value)` notifications from the
//! parameter store; they land in smoothed targets and never touch the
//! audio path directly. `process` performs no allocation, takes no locks
//! and emits no logs; tracing happens only on the prepare/release/latency
//! control paths.

use plegado_core::StereoBuffer;

use crate::disperser::Disperser;
use crate::dry_wet::DryWetMixer;
use crate::envelope::EnvelopeSource;
use crate::params::{PARAM_COUNT, ParamKey};
use crate::tilt::TiltFilter;
use crate::waveshaper::WaveshaperCore;

/// Largest compensation delay the dry path must absorb, in samples.
const MAX_COMPENSATION_DELAY: usize = 4096;

/// Errors surfaced by [`Processor::prepare`]. The only fatal category in
/// the system: everything after prepare clamps instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    /// Sample rate was zero, negative or non-finite.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    /// Maximum block size was zero.
    #[error("maximum block size must be non-zero")]
    InvalidBlockSize,

    /// Channel count outside 1..=2.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(usize),
}

/// Host-facing capability set, implemented by the one concrete pipeline.
pub trait Processor {
    /// Size all per-stream state. Must be called before `process`, with
    /// the audio thread inactive; this is the only allocating call.
    fn prepare(
        &mut self,
        sample_rate: f64,
        max_block: usize,
        num_channels: usize,
    ) -> Result<(), PrepareError>;

    /// Process one block in place. Real-time safe.
    fn process(&mut self, buffer: &mut StereoBuffer);

    /// Clear internal filter/delay memory without reallocating.
    fn reset(&mut self);

    /// Tear down stream-sized buffers. `prepare` must run again before
    /// the next `process`.
    fn release(&mut self);

    /// Current reported latency in samples.
    fn latency_samples(&self) -> usize;

    /// Deliver a parameter-changed notification. Unknown ids are ignored;
    /// known values are clamped to their registered range.
    fn parameter_changed(&mut self, id: &str, value: f32);

    /// Snapshot of all parameter values as `(string_id, value)` pairs.
    fn state(&self) -> Vec<(&'static str, f32)>;

    /// Restore a snapshot produced by [`state`](Self::state).
    fn set_state(&mut self, entries: &[(&str, f32)]);
}

/// The concrete plegado pipeline.
pub struct PlegadoProcessor {
    tilt_pre: TiltFilter,
    envelope: EnvelopeSource,
    waveshaper: WaveshaperCore,
    tilt_post: TiltFilter,
    dry_wet: DryWetMixer,
    disperser: Disperser,

    /// Last applied value per parameter, for state snapshots.
    values: [f32; PARAM_COUNT],

    max_block: usize,
    prepared: bool,
    latency: usize,
    latency_changed: bool,
}

impl PlegadoProcessor {
    /// Create a processor with every parameter at its registered default.
    pub fn new() -> Self {
        let d = |key: ParamKey| key.descriptor().default;
        let mut processor = Self {
            tilt_pre: TiltFilter::new(d(ParamKey::Tilt), false),
            envelope: EnvelopeSource::new(d(ParamKey::EnvAmount)),
            waveshaper: WaveshaperCore::new(
                d(ParamKey::Drive),
                d(ParamKey::StereoWidth),
                d(ParamKey::Oversampling) > 0.5,
            ),
            tilt_post: TiltFilter::new(d(ParamKey::Tilt), true),
            dry_wet: DryWetMixer::new(d(ParamKey::DryLevel), d(ParamKey::WetLevel)),
            disperser: Disperser::new(
                d(ParamKey::DisperserAmount),
                d(ParamKey::DisperserFrequency),
                d(ParamKey::DisperserPinch),
            ),
            values: [0.0; PARAM_COUNT],
            max_block: 0,
            prepared: false,
            latency: 0,
            latency_changed: false,
        };
        for key in ParamKey::ALL {
            processor.values[key.index()] = key.descriptor().default;
        }
        processor
    }

    /// Returns the pending latency value if it changed since the last
    /// call. The host wrapper forwards this as its latency-changed
    /// notification.
    pub fn take_latency_change(&mut self) -> Option<usize> {
        if self.latency_changed {
            self.latency_changed = false;
            Some(self.latency)
        } else {
            None
        }
    }

    fn apply(&mut self, key: ParamKey, value: f32) {
        let clamped = key.descriptor().clamp(value);
        self.values[key.index()] = clamped;

        match key {
            ParamKey::DryLevel => self.dry_wet.set_dry_level(clamped),
            ParamKey::WetLevel => self.dry_wet.set_wet_level(clamped),
            ParamKey::Drive => self.waveshaper.set_drive(clamped),
            ParamKey::StereoWidth => self.waveshaper.set_stereo_width(clamped),
            ParamKey::EnvAmount => self.envelope.set_mod_amount(clamped),
            ParamKey::ShapeMorph => self.waveshaper.set_morph(clamped),
            ParamKey::Oversampling => {
                self.waveshaper.set_oversampling(clamped > 0.5);
                self.update_latency();
            }
            ParamKey::Tilt => {
                self.tilt_pre.set_tilt_db(clamped);
                self.tilt_post.set_tilt_db(clamped);
            }
            ParamKey::DisperserAmount => self.disperser.set_amount(clamped),
            ParamKey::DisperserFrequency => self.disperser.set_frequency(clamped),
            ParamKey::DisperserPinch => self.disperser.set_pinch(clamped),
        }
    }

    /// Recompute aggregate latency, retarget the dry-path delay, and flag
    /// the change for the host.
    fn update_latency(&mut self) {
        let total = self.waveshaper.latency_samples()
            + self.tilt_pre.latency_samples()
            + self.tilt_post.latency_samples()
            + self.disperser.latency_samples();

        if total != self.latency {
            self.latency = total;
            self.dry_wet.set_delay_samples(total);
            self.latency_changed = true;
            tracing::debug!(latency_samples = total, "pipeline latency changed");
        }
    }
}

impl Default for PlegadoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for PlegadoProcessor {
    fn prepare(
        &mut self,
        sample_rate: f64,
        max_block: usize,
        num_channels: usize,
    ) -> Result<(), PrepareError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if max_block == 0 {
            return Err(PrepareError::InvalidBlockSize);
        }
        if num_channels == 0 || num_channels > 2 {
            return Err(PrepareError::UnsupportedChannelCount(num_channels));
        }

        let sr = sample_rate as f32;
        self.max_block = max_block;

        self.tilt_pre.prepare(sr);
        self.tilt_post.prepare(sr);
        self.envelope.prepare(sr, max_block);
        self.waveshaper.prepare(sr, max_block);
        self.disperser.prepare(sr);
        self.dry_wet.prepare(sr, max_block, MAX_COMPENSATION_DELAY);

        // Re-assert stored parameter values on the freshly built
        // components (targets survive, ramps start settled).
        for key in ParamKey::ALL {
            self.apply(key, self.values[key.index()]);
        }

        // Seed the delay without flagging a host notification: prepare
        // reports latency synchronously through its return path.
        self.latency = self.waveshaper.latency_samples()
            + self.tilt_pre.latency_samples()
            + self.tilt_post.latency_samples()
            + self.disperser.latency_samples();
        self.dry_wet.set_delay_samples(self.latency);
        self.latency_changed = false;
        self.prepared = true;

        tracing::debug!(
            sample_rate,
            max_block,
            num_channels,
            latency_samples = self.latency,
            "pipeline prepared"
        );
        Ok(())
    }

    fn process(&mut self, buffer: &mut StereoBuffer) {
        if !self.prepared {
            return;
        }
        let num_samples = buffer.len().min(self.max_block);
        if num_samples == 0 {
            return;
        }

        self.dry_wet.copy_dry(buffer, num_samples);
        self.tilt_pre.process_block(buffer, num_samples);
        let env = self.envelope.process_block(buffer, num_samples);
        self.waveshaper.process_block(buffer, num_samples, env);
        self.tilt_post.process_block(buffer, num_samples);
        self.dry_wet.merge(buffer, num_samples);
        self.disperser.process_block(buffer, num_samples);
    }

    fn reset(&mut self) {
        self.tilt_pre.reset();
        self.tilt_post.reset();
        self.envelope.reset();
        self.waveshaper.reset();
        self.disperser.reset();
        self.dry_wet.reset();
    }

    fn release(&mut self) {
        self.dry_wet.release();
        self.prepared = false;
        tracing::debug!("pipeline released");
    }

    fn latency_samples(&self) -> usize {
        self.latency
    }

    fn parameter_changed(&mut self, id: &str, value: f32) {
        if let Some(key) = ParamKey::from_id(id) {
            self.apply(key, value);
        }
    }

    fn state(&self) -> Vec<(&'static str, f32)> {
        ParamKey::ALL
            .into_iter()
            .map(|key| (key.string_id(), self.values[key.index()]))
            .collect()
    }

    fn set_state(&mut self, entries: &[(&str, f32)]) {
        for &(id, value) in entries {
            self.parameter_changed(id, value);
        }
    }
}
