//! Temperature sampling
//!
//! Aggregates every reporting thermal zone into one representative reading.
//! A failed or empty read never propagates to the control loop: the sampler
//! answers with the configured safe default instead, so a flaky sensor can
//! slow reactions but can never stall the governor.

use std::sync::Arc;

use tracing::warn;

use crate::hardware::{HardwareReader, ReadTarget};

/// Millidegrees per degree Celsius, the unit thermal zones report in.
const MILLIDEGREES_PER_DEGREE: i64 = 1_000;

/// Reads and aggregates system temperature sensors.
pub struct TemperatureSampler {
    reader: Arc<dyn HardwareReader>,
    default_safe_temperature: i32,
}

impl TemperatureSampler {
    pub fn new(reader: Arc<dyn HardwareReader>, default_safe_temperature: i32) -> Self {
        Self { reader, default_safe_temperature }
    }

    /// Returns the mean sensor temperature in whole degrees Celsius,
    /// rounded toward zero.
    ///
    /// Each raw value is converted from millidegrees before averaging. When
    /// the read fails or no sensor reports a usable value, the configured
    /// safe default is returned and the condition is logged.
    pub async fn sample(&self) -> i32 {
        match self.reader.read_values(ReadTarget::Temperature).await {
            Ok(values) if !values.is_empty() => {
                let sum: i64 = values.iter().map(|v| v / MILLIDEGREES_PER_DEGREE).sum();
                (sum / values.len() as i64) as i32
            }
            Ok(_) => {
                warn!(
                    fallback = self.default_safe_temperature,
                    "no temperature sensor reported a value, using safe default"
                );
                self.default_safe_temperature
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = self.default_safe_temperature,
                    "temperature read failed, using safe default"
                );
                self.default_safe_temperature
            }
        }
    }
}
