//! Envelope follower: derive a slowly-varying control signal from program
//! material.
//!
//! Full-wave rectification followed by one of two smoothing laws:
//!
//! - [`DetectionMode::Lowpass`] — a single one-pole lowpass at a fixed
//!   cutoff (default 20 Hz). Symmetric rise/fall; this is what the drive
//!   modulation path uses.
//! - [`DetectionMode::AttackRelease`] — separate attack and release time
//!   constants, selecting the attack branch while the rectified input is
//!   above the envelope. The usual choice for dynamics-style response.

use libm::{expf, fabsf};

/// Smoothing law applied after rectification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    /// One-pole lowpass at a fixed cutoff. Symmetric response.
    #[default]
    Lowpass,
    /// Separate attack/release coefficients chosen per sample by whether
    /// the input is rising above or falling below the envelope.
    AttackRelease,
}

/// Tracks the amplitude of a signal as a positive control value.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Current envelope level (always >= 0).
    envelope: f32,
    mode: DetectionMode,
    /// One-pole coefficient for `Lowpass` mode.
    lp_coeff: f32,
    /// Coefficients for `AttackRelease` mode.
    attack_coeff: f32,
    release_coeff: f32,

    sample_rate: f32,
    cutoff_hz: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Create a follower in lowpass mode with a 20 Hz cutoff.
    pub fn new(sample_rate: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            mode: DetectionMode::Lowpass,
            lp_coeff: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            cutoff_hz: 20.0,
            attack_ms: 10.0,
            release_ms: 100.0,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Select the smoothing law.
    pub fn set_mode(&mut self, mode: DetectionMode) {
        self.mode = mode;
    }

    /// Set the lowpass-mode cutoff in Hz (clamped to 1–500).
    pub fn set_cutoff_hz(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff.clamp(1.0, 500.0);
        self.recalculate_coefficients();
    }

    /// Set the attack time in milliseconds (floored at 0.1).
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.recalculate_coefficients();
    }

    /// Set the release time in milliseconds (floored at 1.0).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.recalculate_coefficients();
    }

    /// Update the sample rate and recalculate coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Feed an already-rectified magnitude (e.g. `|L| + |R|` for a stereo
    /// frame) and return the updated envelope.
    #[inline]
    pub fn track(&mut self, magnitude: f32) -> f32 {
        match self.mode {
            DetectionMode::Lowpass => {
                self.envelope += self.lp_coeff * (magnitude - self.envelope);
            }
            DetectionMode::AttackRelease => {
                let coeff = if magnitude > self.envelope {
                    self.attack_coeff
                } else {
                    self.release_coeff
                };
                self.envelope = coeff * self.envelope + (1.0 - coeff) * magnitude;
            }
        }
        self.envelope
    }

    /// Rectify a mono sample and track it.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.track(fabsf(input))
    }

    /// Current envelope level without consuming input.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        // One-pole lowpass: coeff = 1 - exp(-2π fc / fs)
        self.lp_coeff = 1.0 - expf(-core::f32::consts::TAU * self.cutoff_hz / self.sample_rate);
        // Attack/release: coeff = exp(-1 / (time_s * fs))
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
