//! Hardware profile discovery
//!
//! Frequency bounds and the core count are read once at process start and
//! are immutable for the process lifetime. Discovery never aborts startup:
//! a bound that cannot be determined (or comes back inverted) degrades to a
//! documented hardware-independent default and is logged once.

use tracing::warn;

use crate::error::{Error, Result};
use crate::hardware::{HardwareReader, ReadTarget};

/// Built-in CPU bound used when discovery fails, in kHz. Conservative on
/// purpose: the ceiling stays well below modern boost clocks.
pub const DEFAULT_CPU_BOUND: FrequencyBound = FrequencyBound { min: 400_000, max: 2_000_000 };

/// Built-in GPU bound used when discovery fails, in MHz.
pub const DEFAULT_GPU_BOUND: FrequencyBound = FrequencyBound { min: 300, max: 1_100 };

/// Core count assumed when discovery fails.
pub const DEFAULT_CORE_COUNT: usize = 1;

/// Minimum and maximum clock frequency a device can be limited to.
///
/// Units follow the underlying control surface: kHz for the CPU, MHz for
/// the GPU. `min <= max` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyBound {
    pub min: i64,
    pub max: i64,
}

impl FrequencyBound {
    pub fn span(&self) -> i64 {
        self.max - self.min
    }

    /// Midpoint of the bound, rounded down.
    pub fn midpoint(&self) -> i64 {
        self.min + self.span() / 2
    }
}

/// Static frequency bounds and core count, discovered once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareProfile {
    /// CPU frequency bound in kHz.
    pub cpu: FrequencyBound,
    /// GPU frequency bound in MHz.
    pub gpu: FrequencyBound,
    /// Number of CPU cores with a frequency-scaling policy.
    pub cores: usize,
}

impl HardwareProfile {
    /// Discovers bounds and core count through `reader`, substituting the
    /// built-in defaults for anything that cannot be determined.
    pub async fn discover(reader: &dyn HardwareReader) -> Self {
        let cpu = match Self::discover_bound(reader, ReadTarget::CpuFreqMin, ReadTarget::CpuFreqMax)
            .await
        {
            Ok(bound) => bound,
            Err(e) => {
                warn!(error = %e, "CPU frequency bounds unavailable, using built-in defaults");
                DEFAULT_CPU_BOUND
            }
        };
        let gpu = match Self::discover_bound(reader, ReadTarget::GpuFreqMin, ReadTarget::GpuFreqMax)
            .await
        {
            Ok(bound) => bound,
            Err(e) => {
                warn!(error = %e, "GPU frequency bounds unavailable, using built-in defaults");
                DEFAULT_GPU_BOUND
            }
        };
        let cores = match Self::discover_core_count(reader).await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "core count unavailable, assuming {DEFAULT_CORE_COUNT}");
                DEFAULT_CORE_COUNT
            }
        };
        Self { cpu, gpu, cores }
    }

    async fn discover_bound(
        reader: &dyn HardwareReader,
        min_target: ReadTarget,
        max_target: ReadTarget,
    ) -> Result<FrequencyBound> {
        let min = Self::first_value(reader, min_target).await?;
        let max = Self::first_value(reader, max_target).await?;
        if min > max {
            return Err(Error::discovery(format!(
                "inverted bound: min {min} above max {max}"
            )));
        }
        Ok(FrequencyBound { min, max })
    }

    async fn discover_core_count(reader: &dyn HardwareReader) -> Result<usize> {
        let count = Self::first_value(reader, ReadTarget::CpuCores).await?;
        if count < 1 {
            return Err(Error::discovery("no CPU cores reported"));
        }
        Ok(count as usize)
    }

    async fn first_value(reader: &dyn HardwareReader, target: ReadTarget) -> Result<i64> {
        reader
            .read_values(target)
            .await?
            .first()
            .copied()
            .ok_or_else(|| Error::discovery(format!("{target:?} produced no values")))
    }
}
