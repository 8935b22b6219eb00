//! Frequency policy
//!
//! Pure decision logic: a temperature reading plus the discovered
//! [`HardwareProfile`](crate::profile::HardwareProfile) map to a
//! [`FrequencyTarget`]. Two interchangeable strategies implement
//! [`FrequencyPolicy`]:
//!
//! * [`LinearPolicy`] — continuous linear interpolation between the safe
//!   window edges, computed independently per device.
//! * [`HysteresisPolicy`] — a fixed, priority-ordered table of discrete
//!   thermal modes with inclusive temperature bands.
//!
//! Strategies hold no mutable state and perform no I/O; everything they
//! need is captured at construction, which is also where invalid
//! configuration is rejected.

mod interpolation;
mod modes;

pub use interpolation::LinearPolicy;
pub use modes::{HysteresisPolicy, ModeTable, ThermalMode};

use std::time::Duration;

use crate::config::{GovernorConfig, Strategy};
use crate::error::Result;
use crate::hardware::PowerPreference;
use crate::profile::HardwareProfile;

/// Target operating point produced by a policy for one temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTarget {
    /// CPU frequency ceiling in kHz.
    pub cpu_khz: i64,
    /// GPU frequency ceiling in MHz.
    pub gpu_mhz: i64,
    /// CPU energy-performance hint.
    pub preference: PowerPreference,
    /// Resolved mode name; populated by the discrete strategy only.
    pub mode: Option<String>,
    /// Mode-specific poll interval; populated by the discrete strategy only.
    pub poll_interval: Option<Duration>,
}

/// Maps a temperature reading to a target operating point.
pub trait FrequencyPolicy: Send + Sync {
    fn evaluate(&self, temperature: i32, profile: &HardwareProfile) -> FrequencyTarget;
}

/// Builds the policy selected by `config.strategy`.
///
/// Fails with a configuration error when the selected strategy rejects its
/// inputs (degenerate window, non-partitioning mode table).
pub fn build(config: &GovernorConfig, profile: &HardwareProfile) -> Result<Box<dyn FrequencyPolicy>> {
    match config.strategy {
        Strategy::Linear => Ok(Box::new(LinearPolicy::new(config)?)),
        Strategy::Hysteresis => Ok(Box::new(HysteresisPolicy::new(config, profile)?)),
    }
}
