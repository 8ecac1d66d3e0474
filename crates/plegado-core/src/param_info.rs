//! Parameter metadata for the enumerated registry.
//!
//! Every host-visible control is described once, at startup, by a
//! [`ParamDescriptor`]: display name, stable string id, range, default,
//! normalization curve and smoothing time. The processing graph consumes
//! the table by reference; there is no runtime reflection over a
//! serialized tree to discover parameters.

/// Scaling curve mapping a parameter's plain value to normalized
/// \[0.0, 1.0\] space.
///
/// - **Linear**: `(value - min) / (max - min)`
/// - **Logarithmic**: `ln(value/min) / ln(max/min)` — requires `min > 0`
/// - **Power(exp)**: `((value - min) / (max - min)).powf(1/exp)` — the
///   skew-factor curve; exp < 1 gives more resolution at the low end.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Linear mapping (default).
    #[default]
    Linear,
    /// Logarithmic mapping, for frequency-like ranges.
    Logarithmic,
    /// Power-curve mapping with the given exponent.
    Power(f32),
}

/// Unit type for display formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Percentage.
    Percent,
    /// Dimensionless.
    None,
}

/// Describes a single parameter: display metadata, valid range, default,
/// and the smoothing time its setter uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display.
    pub name: &'static str,
    /// Stable string id used by parameter-changed notifications.
    pub string_id: &'static str,
    /// Unit for formatting.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Default value.
    pub default: f32,
    /// Recommended encoder step.
    pub step: f32,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Ramp time applied by the receiving smoother, in milliseconds.
    /// Zero means the value is applied without a ramp (toggles).
    pub smoothing_ms: f32,
}

impl ParamDescriptor {
    /// Clamps a value to this parameter's valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Converts a plain value to the normalized 0–1 range, respecting
    /// [`ParamScale`].
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
            ParamScale::Power(exp) => {
                let linear = ((value - self.min) / range).max(0.0);
                libm::powf(linear, 1.0 / exp)
            }
        }
    }

    /// Converts a normalized 0–1 value back to the plain range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::powf(self.max / self.min, normalized)
            }
            ParamScale::Power(exp) => {
                let curved = libm::powf(normalized, exp);
                self.min + curved * (self.max - self.min)
            }
        }
    }
}
