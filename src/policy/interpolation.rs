//! Continuous linear interpolation strategy.

use crate::config::{GovernorConfig, ThermalWindow};
use crate::error::{Error, Result};
use crate::hardware::PowerPreference;
use crate::policy::{FrequencyPolicy, FrequencyTarget};
use crate::profile::{FrequencyBound, HardwareProfile};

/// Interpolates frequency ceilings linearly across the safe window.
///
/// Below the window the full bound is released, above it the device is
/// pinned to its minimum, and in between the ceiling falls by a fixed step
/// per degree. Each device has its own window and is scaled against its own
/// bound; the temperature input is shared.
pub struct LinearPolicy {
    cpu_window: ThermalWindow,
    gpu_window: ThermalWindow,
}

impl LinearPolicy {
    /// Captures the per-device windows, rejecting degenerate ones so the
    /// per-degree step below can never divide by zero.
    pub fn new(config: &GovernorConfig) -> Result<Self> {
        for (device, window) in [("cpu", config.cpu_window), ("gpu", config.gpu_window)] {
            if window.max_safe <= window.min_safe {
                return Err(Error::config(format!(
                    "{device}_window does not span any temperature range"
                )));
            }
        }
        Ok(Self { cpu_window: config.cpu_window, gpu_window: config.gpu_window })
    }

    /// `bound.max - floor(span_f / span_t) * degrees_over`, clamped to the
    /// exact bound values at the window edges.
    fn scale(window: ThermalWindow, temperature: i32, bound: FrequencyBound) -> i64 {
        if temperature <= window.min_safe {
            return bound.max;
        }
        if temperature >= window.max_safe {
            return bound.min;
        }
        let step = bound.span() / i64::from(window.span());
        bound.max - step * i64::from(temperature - window.min_safe)
    }

    fn preference(&self, temperature: i32) -> PowerPreference {
        if temperature <= self.cpu_window.min_safe {
            PowerPreference::Performance
        } else if temperature >= self.cpu_window.max_safe {
            PowerPreference::Power
        } else {
            PowerPreference::Balanced
        }
    }
}

impl FrequencyPolicy for LinearPolicy {
    fn evaluate(&self, temperature: i32, profile: &HardwareProfile) -> FrequencyTarget {
        FrequencyTarget {
            cpu_khz: Self::scale(self.cpu_window, temperature, profile.cpu),
            gpu_mhz: Self::scale(self.gpu_window, temperature, profile.gpu),
            preference: self.preference(temperature),
            mode: None,
            poll_interval: None,
        }
    }
}
