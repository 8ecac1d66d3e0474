//! Dry/wet mixer with latency-compensated dry path.
//!
//! The wet path (oversampler, tilt filters) is late by the pipeline's
//! reported latency. Mixing an on-time dry signal against it would comb-
//! filter, so the dry snapshot runs through a circular delay buffer of
//! the same length before the blend.
//!
//! Ring discipline per block (only when `delay_samples > 0`): write the
//! fresh dry block at the write position, read back `delay_samples`
//! earlier into the dry snapshot, advance the write position. Wraparound
//! is handled by bounds-checked split copies — two contiguous `memcpy`s,
//! never per-index modulo.
//!
//! Gain staging: while either level is mid-ramp, one gain pair is
//! computed per sample index and applied identically to every channel
//! (per-channel-first ordering would ramp the channels at different
//! block offsets — audible as zipper). Once both levels are settled the
//! mix collapses to a vectorized per-channel multiply-add.

use plegado_core::{SmoothedParam, StereoBuffer};

/// Copy `src` into `ring` starting at `start`, wrapping once if needed.
fn write_ring(ring: &mut [f32], start: usize, src: &[f32]) {
    let first = (ring.len() - start).min(src.len());
    ring[start..start + first].copy_from_slice(&src[..first]);
    let rest = src.len() - first;
    if rest > 0 {
        ring[..rest].copy_from_slice(&src[first..]);
    }
}

/// Copy `dst.len()` samples out of `ring` starting at `start`, wrapping
/// once if needed.
fn read_ring(ring: &[f32], start: usize, dst: &mut [f32]) {
    let first = (ring.len() - start).min(dst.len());
    dst[..first].copy_from_slice(&ring[start..start + first]);
    let rest = dst.len() - first;
    if rest > 0 {
        dst[first..].copy_from_slice(&ring[..rest]);
    }
}

/// Latency-compensating dry/wet mixer.
pub struct DryWetMixer {
    /// Dry gain in [0, 1], smoothed (10 ms).
    dry_level: SmoothedParam,
    /// Wet gain in [0, 1], smoothed (10 ms).
    wet_level: SmoothedParam,

    /// Snapshot of the unprocessed block.
    dry: StereoBuffer,
    /// Circular delay storage; capacity is a power of two ≥
    /// `max_delay + max_block`, fixed at prepare time.
    delay: StereoBuffer,
    write_pos: usize,
    delay_samples: usize,
}

impl DryWetMixer {
    /// Create with the given default levels. Buffers are sized by
    /// [`prepare`](Self::prepare).
    pub fn new(default_dry: f32, default_wet: f32) -> Self {
        Self {
            dry_level: SmoothedParam::new(default_dry.clamp(0.0, 1.0)),
            wet_level: SmoothedParam::new(default_wet.clamp(0.0, 1.0)),
            dry: StereoBuffer::new(0),
            delay: StereoBuffer::new(0),
            write_pos: 0,
            delay_samples: 0,
        }
    }

    /// Allocate the dry snapshot and the delay ring, clear both.
    ///
    /// `max_delay` is the largest compensation delay the mixer must be
    /// able to apply; the ring also carries a full block of margin.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize, max_delay: usize) {
        let capacity = (max_delay + max_block).max(1).next_power_of_two();
        self.dry.resize(max_block);
        self.dry.clear();
        self.delay.resize(capacity);
        self.delay.clear();
        self.write_pos = 0;
        self.delay_samples = self.delay_samples.min(capacity - 1);
        self.dry_level.reset(sample_rate, 10.0);
        self.wet_level.reset(sample_rate, 10.0);
    }

    /// Drop the block and ring storage (stream is shutting down).
    pub fn release(&mut self) {
        self.dry.resize(0);
        self.delay.resize(0);
        self.write_pos = 0;
    }

    /// Clear the ring and snapshot without resizing.
    pub fn reset(&mut self) {
        self.dry.clear();
        self.delay.clear();
        self.write_pos = 0;
        self.dry_level.snap_to_target();
        self.wet_level.snap_to_target();
    }

    /// Set the dry gain target, clamped to [0, 1].
    pub fn set_dry_level(&mut self, level: f32) {
        self.dry_level.set_target(level.clamp(0.0, 1.0));
    }

    /// Set the wet gain target, clamped to [0, 1].
    pub fn set_wet_level(&mut self, level: f32) {
        self.wet_level.set_target(level.clamp(0.0, 1.0));
    }

    /// Set the dry-path compensation delay, clamped to the ring capacity.
    ///
    /// A change clears the ring: stale samples from the previous delay
    /// would otherwise bleed into the next blocks.
    pub fn set_delay_samples(&mut self, samples: usize) {
        let capacity = self.delay.len();
        let clamped = if capacity == 0 {
            0
        } else {
            samples.min(capacity - 1)
        };
        if clamped != self.delay_samples {
            self.delay_samples = clamped;
            self.delay.clear();
            self.write_pos = 0;
        }
    }

    /// Current compensation delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Snapshot the unprocessed input before the wet chain mutates it.
    pub fn copy_dry(&mut self, input: &StereoBuffer, num_samples: usize) {
        let n = num_samples.min(self.dry.len());
        self.dry.copy_from(input, n);
    }

    /// Blend the delayed dry snapshot into the processed buffer.
    pub fn merge(&mut self, wet: &mut StereoBuffer, num_samples: usize) {
        let n = num_samples.min(self.dry.len()).min(wet.len());
        if n == 0 {
            return;
        }

        if self.delay_samples > 0 {
            let capacity = self.delay.len();
            let read_start = (self.write_pos + capacity - self.delay_samples) % capacity;

            write_ring(&mut self.delay.left, self.write_pos, &self.dry.left[..n]);
            write_ring(&mut self.delay.right, self.write_pos, &self.dry.right[..n]);

            read_ring(&self.delay.left, read_start, &mut self.dry.left[..n]);
            read_ring(&self.delay.right, read_start, &mut self.dry.right[..n]);

            self.write_pos = (self.write_pos + n) % capacity;
        }

        if !self.dry_level.is_settled() || !self.wet_level.is_settled() {
            // Sample-first: one gain pair per index, same for all channels.
            for i in 0..n {
                let dry_gain = self.dry_level.advance();
                let wet_gain = self.wet_level.advance();
                wet.left[i] = self.dry.left[i] * dry_gain + wet.left[i] * wet_gain;
                wet.right[i] = self.dry.right[i] * dry_gain + wet.right[i] * wet_gain;
            }
        } else {
            let dry_gain = self.dry_level.get();
            let wet_gain = self.wet_level.get();
            for (out, dry) in wet.left[..n].iter_mut().zip(&self.dry.left[..n]) {
                *out = dry * dry_gain + *out * wet_gain;
            }
            for (out, dry) in wet.right[..n].iter_mut().zip(&self.dry.right[..n]) {
                *out = dry * dry_gain + *out * wet_gain;
            }
        }
    }
}
