//! Enumerated parameter registry.
//!
//! Every host-visible control is listed once in [`ParamKey`], with its
//! metadata in a static descriptor table. The processor dispatches
//! parameter-changed notifications through [`ParamKey::from_id`]; there
//! is no runtime discovery or reflection.
//!
//! Ranges and defaults mirror the host automation layout: drive and
//! disperser frequency use a `Power(0.3)` skew so the lower portion of
//! the knob travel has the useful resolution.

use plegado_core::{ParamDescriptor, ParamScale, ParamUnit};

/// Identifies one of the pipeline's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Dry signal gain.
    DryLevel,
    /// Wet signal gain.
    WetLevel,
    /// Waveshaper input drive.
    Drive,
    /// Stereo width (per-channel fold bias).
    StereoWidth,
    /// Envelope modulation depth.
    EnvAmount,
    /// Waveshape select/morph position.
    ShapeMorph,
    /// Oversampling toggle.
    Oversampling,
    /// Tilt ("colour") in dB.
    Tilt,
    /// Disperser intensity.
    DisperserAmount,
    /// Disperser center frequency.
    DisperserFrequency,
    /// Disperser stage concentration.
    DisperserPinch,
}

/// Number of registered parameters.
pub const PARAM_COUNT: usize = 11;

impl ParamKey {
    /// All keys, in descriptor-table order.
    pub const ALL: [ParamKey; PARAM_COUNT] = [
        ParamKey::DryLevel,
        ParamKey::WetLevel,
        ParamKey::Drive,
        ParamKey::StereoWidth,
        ParamKey::EnvAmount,
        ParamKey::ShapeMorph,
        ParamKey::Oversampling,
        ParamKey::Tilt,
        ParamKey::DisperserAmount,
        ParamKey::DisperserFrequency,
        ParamKey::DisperserPinch,
    ];

    /// Index into the descriptor table.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ParamKey::DryLevel => 0,
            ParamKey::WetLevel => 1,
            ParamKey::Drive => 2,
            ParamKey::StereoWidth => 3,
            ParamKey::EnvAmount => 4,
            ParamKey::ShapeMorph => 5,
            ParamKey::Oversampling => 6,
            ParamKey::Tilt => 7,
            ParamKey::DisperserAmount => 8,
            ParamKey::DisperserFrequency => 9,
            ParamKey::DisperserPinch => 10,
        }
    }

    /// Metadata for this parameter.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Stable string id used in notifications and state snapshots.
    pub fn string_id(self) -> &'static str {
        self.descriptor().string_id
    }

    /// Resolve a notification id. Unknown ids return `None` and are
    /// ignored by the processor.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.string_id() == id)
    }
}

/// Descriptor table, indexed by [`ParamKey::index`].
pub static DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor {
        name: "Dry Level",
        string_id: "dry_level",
        unit: ParamUnit::None,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 10.0,
    },
    ParamDescriptor {
        name: "Wet Level",
        string_id: "wet_level",
        unit: ParamUnit::None,
        min: 0.0,
        max: 0.7,
        default: 0.5,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 10.0,
    },
    ParamDescriptor {
        name: "Drive",
        string_id: "drive",
        unit: ParamUnit::None,
        min: 0.0,
        max: 10.0,
        default: 5.0,
        step: 0.001,
        scale: ParamScale::Power(0.3),
        smoothing_ms: 30.0,
    },
    ParamDescriptor {
        name: "Stereo Width",
        string_id: "stereo_width",
        unit: ParamUnit::None,
        min: 0.0,
        max: 0.25,
        default: 0.0,
        step: 0.001,
        scale: ParamScale::Linear,
        smoothing_ms: 30.0,
    },
    ParamDescriptor {
        name: "Env Amount",
        string_id: "env_amount",
        unit: ParamUnit::None,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 30.0,
    },
    ParamDescriptor {
        name: "Shape Morph",
        string_id: "shape_morph",
        unit: ParamUnit::None,
        min: 0.0,
        max: 3.0,
        default: 0.0,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 250.0,
    },
    ParamDescriptor {
        name: "Oversampling",
        string_id: "oversampling",
        unit: ParamUnit::None,
        min: 0.0,
        max: 1.0,
        default: 1.0,
        step: 1.0,
        scale: ParamScale::Linear,
        smoothing_ms: 0.0,
    },
    ParamDescriptor {
        name: "Colour",
        string_id: "tilt",
        unit: ParamUnit::Decibels,
        min: -12.0,
        max: 12.0,
        default: 0.0,
        step: 0.1,
        scale: ParamScale::Linear,
        smoothing_ms: 5.0,
    },
    ParamDescriptor {
        name: "Disperser Amount",
        string_id: "disperser_amount",
        unit: ParamUnit::None,
        min: 0.0,
        max: 1.0,
        default: 0.0,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 30.0,
    },
    ParamDescriptor {
        name: "Disperser Frequency",
        string_id: "disperser_freq",
        unit: ParamUnit::Hertz,
        min: 20.0,
        max: 20000.0,
        default: 1000.0,
        step: 1.0,
        scale: ParamScale::Power(0.3),
        smoothing_ms: 30.0,
    },
    ParamDescriptor {
        name: "Disperser Pinch",
        string_id: "disperser_pinch",
        unit: ParamUnit::None,
        min: 0.1,
        max: 10.0,
        default: 1.0,
        step: 0.01,
        scale: ParamScale::Linear,
        smoothing_ms: 30.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_resolve_round_trip() {
        for key in ParamKey::ALL {
            assert_eq!(ParamKey::from_id(key.string_id()), Some(key));
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert_eq!(ParamKey::from_id("no_such_param"), None);
        assert_eq!(ParamKey::from_id(""), None);
    }

    #[test]
    fn defaults_sit_inside_ranges() {
        for key in ParamKey::ALL {
            let desc = key.descriptor();
            assert!(
                desc.default >= desc.min && desc.default <= desc.max,
                "{} default out of range",
                desc.string_id
            );
        }
    }

    #[test]
    fn string_ids_are_unique() {
        for (i, a) in ParamKey::ALL.iter().enumerate() {
            for b in &ParamKey::ALL[i + 1..] {
                assert_ne!(a.string_id(), b.string_id());
            }
        }
    }
}
