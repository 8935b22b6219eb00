//! Hardware control-surface abstraction
//!
//! This module defines the two narrow interfaces the governor uses to talk to
//! the machine: [`HardwareReader`] for sampling sensor and frequency-bound
//! nodes, and [`HardwareWriter`] for applying frequency ceilings and
//! power-preference hints. The decision engine only ever sees these traits,
//! so it can be exercised against mocks without touching real device files.
//!
//! The production implementations in [`sysfs`] read and write the Linux
//! sysfs nodes directly (thermal zones, cpufreq policies, DRM cards).
//!
//! # Examples
//!
//! ```no_run
//! use thermgov::hardware::{HardwareReader, ReadTarget, SysfsReader};
//!
//! #[tokio::main]
//! async fn main() -> thermgov::Result<()> {
//!     let reader = SysfsReader::new();
//!     let zones = reader.read_values(ReadTarget::Temperature).await?;
//!     println!("{} thermal zones reporting", zones.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(test)]
use mockall::automock;

pub mod sysfs;

pub use sysfs::{SysfsReader, SysfsWriter};

/// Logical read targets exposed by the hardware surface.
///
/// A single target may map to several underlying nodes (every thermal zone,
/// every cpufreq policy); [`HardwareReader::read_values`] returns one value
/// per node so the caller can aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTarget {
    /// Temperature in millidegrees Celsius, one value per thermal zone.
    Temperature,
    /// Hardware minimum CPU frequency in kHz, one value per core.
    CpuFreqMin,
    /// Hardware maximum CPU frequency in kHz, one value per core.
    CpuFreqMax,
    /// Hardware minimum (RP1) GPU frequency in MHz, one value per card.
    GpuFreqMin,
    /// Hardware maximum (RP0) GPU frequency in MHz, one value per card.
    GpuFreqMax,
    /// Number of CPU cores with a frequency-scaling policy, as a single value.
    CpuCores,
}

/// Device classes a frequency ceiling can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Cpu,
    Gpu,
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceClass::Cpu => write!(f, "CPU"),
            DeviceClass::Gpu => write!(f, "GPU"),
        }
    }
}

/// CPU energy-performance preference hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerPreference {
    Power,
    Balanced,
    Performance,
}

impl PowerPreference {
    /// The string accepted by the `energy_performance_preference` node.
    pub fn as_sysfs(&self) -> &'static str {
        match self {
            PowerPreference::Power => "power",
            PowerPreference::Balanced => "balance_performance",
            PowerPreference::Performance => "performance",
        }
    }
}

impl std::fmt::Display for PowerPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sysfs())
    }
}

/// Read access to sensor and frequency-bound nodes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HardwareReader: Send + Sync {
    /// Reads every node backing `target` and returns one value per node.
    ///
    /// Nodes that exist but hold unparsable data are skipped; the call only
    /// fails when no node produced a usable value.
    async fn read_values(&self, target: ReadTarget) -> Result<Vec<i64>>;
}

/// Write access to frequency ceilings and power-preference hints.
///
/// Writes fan out across every instance of the device class (all CPU cores,
/// all GPU cards). Partial failure across instances is surfaced in the
/// returned error, never silently swallowed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HardwareWriter: Send + Sync {
    /// Applies a frequency ceiling to every instance of `device`.
    async fn write_frequency(&self, device: DeviceClass, value: i64) -> Result<()>;

    /// Applies an energy-performance preference to every CPU core.
    async fn write_preference(&self, preference: PowerPreference) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_preference_sysfs_strings() {
        assert_eq!(PowerPreference::Power.as_sysfs(), "power");
        assert_eq!(PowerPreference::Balanced.as_sysfs(), "balance_performance");
        assert_eq!(PowerPreference::Performance.as_sysfs(), "performance");
    }

    #[tokio::test]
    async fn mock_reader_returns_configured_values() {
        let mut mock = MockHardwareReader::new();
        mock.expect_read_values()
            .withf(|target| *target == ReadTarget::Temperature)
            .returning(|_| Ok(vec![45_000, 47_000]));

        let values = mock.read_values(ReadTarget::Temperature).await.unwrap();
        assert_eq!(values, vec![45_000, 47_000]);
    }
}
