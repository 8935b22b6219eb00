//! Governor configuration
//!
//! All tunables are collected in [`GovernorConfig`], loaded once at startup
//! and handed to the core as an immutable value; nothing re-reads
//! configuration mid-run. [`GovernorConfig::validate`] is the fatal gate:
//! any shape that would make tick arithmetic undefined (degenerate
//! interpolation window, zero debounce threshold) refuses to start instead
//! of misbehaving later.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hardware::PowerPreference;

/// Temperature assumed when no sensor produces a usable value, in degrees
/// Celsius. Mid-range by design choice: a sustained sensor failure should
/// park the system in the middle of the envelope, not at either frequency
/// extreme.
pub const DEFAULT_SAFE_TEMPERATURE: i32 = 60;

/// Lower edge of the default safe window in degrees Celsius.
pub const DEFAULT_MIN_SAFE_TEMPERATURE: i32 = 40;

/// Upper edge of the default safe window in degrees Celsius.
pub const DEFAULT_MAX_SAFE_TEMPERATURE: i32 = 80;

/// Minimum temperature delta treated as a material change, in degrees Celsius.
pub const DEFAULT_TEMPERATURE_CHANGE_THRESHOLD: i32 = 2;

/// Minimum CPU frequency delta worth actuating, in kHz.
pub const DEFAULT_CPU_FREQUENCY_CHANGE_THRESHOLD: i64 = 50_000;

/// Minimum GPU frequency delta worth actuating, in MHz.
pub const DEFAULT_GPU_FREQUENCY_CHANGE_THRESHOLD: i64 = 50;

/// Poll interval the loop starts from and resets to, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Ceiling for the adaptive poll interval, in seconds.
pub const DEFAULT_MAX_POLL_INTERVAL_SECS: u64 = 60;

/// Frequency policy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Continuous linear interpolation between the window edges.
    #[default]
    Linear,
    /// Discrete hysteresis-banded mode table.
    Hysteresis,
}

/// Inclusive temperature window a device is considered safe in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalWindow {
    pub min_safe: i32,
    pub max_safe: i32,
}

impl Default for ThermalWindow {
    fn default() -> Self {
        Self {
            min_safe: DEFAULT_MIN_SAFE_TEMPERATURE,
            max_safe: DEFAULT_MAX_SAFE_TEMPERATURE,
        }
    }
}

impl ThermalWindow {
    /// Window width in degrees. Validation guarantees this is positive.
    pub fn span(&self) -> i32 {
        self.max_safe - self.min_safe
    }
}

/// One configured hysteresis band. Converted into the runtime mode table at
/// startup; range validation happens there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    pub name: String,
    pub min_temp: i32,
    pub max_temp: i32,
    pub preference: PowerPreference,
    pub cpu_khz: i64,
    pub gpu_mhz: i64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

/// Immutable governor configuration.
///
/// Every field has a default mirroring the constants above, so a config file
/// only needs to name the values it changes:
///
/// ```json
/// { "strategy": "hysteresis", "max_poll_interval_secs": 30 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    pub strategy: Strategy,
    /// Temperature delta below which a tick is treated as sensor jitter.
    pub temperature_change_threshold: i32,
    /// CPU actuation debounce, in kHz.
    pub cpu_frequency_change_threshold: i64,
    /// GPU actuation debounce, in MHz.
    pub gpu_frequency_change_threshold: i64,
    pub cpu_window: ThermalWindow,
    pub gpu_window: ThermalWindow,
    /// Fallback reading when every sensor fails, in degrees Celsius.
    pub default_safe_temperature: i32,
    pub default_poll_interval_secs: u64,
    pub max_poll_interval_secs: u64,
    /// Explicit mode table for the hysteresis strategy. When absent, a table
    /// is derived from the discovered hardware bounds.
    pub modes: Option<Vec<ModeConfig>>,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            temperature_change_threshold: DEFAULT_TEMPERATURE_CHANGE_THRESHOLD,
            cpu_frequency_change_threshold: DEFAULT_CPU_FREQUENCY_CHANGE_THRESHOLD,
            gpu_frequency_change_threshold: DEFAULT_GPU_FREQUENCY_CHANGE_THRESHOLD,
            cpu_window: ThermalWindow::default(),
            gpu_window: ThermalWindow::default(),
            default_safe_temperature: DEFAULT_SAFE_TEMPERATURE,
            default_poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_poll_interval_secs: DEFAULT_MAX_POLL_INTERVAL_SECS,
            modes: None,
        }
    }
}

impl GovernorConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Rejects any configuration that would make tick arithmetic undefined.
    ///
    /// Mode-table range validation is separate: it runs when the table is
    /// built, before the loop starts.
    pub fn validate(&self) -> Result<()> {
        if self.temperature_change_threshold < 1 {
            return Err(Error::config(
                "temperature_change_threshold must be at least 1 degree",
            ));
        }
        if self.cpu_frequency_change_threshold < 1 {
            return Err(Error::config(
                "cpu_frequency_change_threshold must be at least 1 kHz",
            ));
        }
        if self.gpu_frequency_change_threshold < 1 {
            return Err(Error::config(
                "gpu_frequency_change_threshold must be at least 1 MHz",
            ));
        }
        for (device, window) in [("cpu", self.cpu_window), ("gpu", self.gpu_window)] {
            if window.max_safe <= window.min_safe {
                return Err(Error::config(format!(
                    "{device}_window is degenerate: min_safe {} >= max_safe {}",
                    window.min_safe, window.max_safe
                )));
            }
        }
        if self.default_poll_interval_secs < 1 {
            return Err(Error::config("default_poll_interval_secs must be at least 1"));
        }
        if self.max_poll_interval_secs < self.default_poll_interval_secs {
            return Err(Error::config(format!(
                "max_poll_interval_secs {} is below default_poll_interval_secs {}",
                self.max_poll_interval_secs, self.default_poll_interval_secs
            )));
        }
        Ok(())
    }

    pub fn default_poll_interval(&self) -> Duration {
        Duration::from_secs(self.default_poll_interval_secs)
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_secs(self.max_poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        GovernorConfig::default().validate().unwrap();
    }

    #[test]
    fn degenerate_window_is_rejected() {
        let mut config = GovernorConfig::default();
        config.cpu_window = ThermalWindow { min_safe: 50, max_safe: 50 };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut config = GovernorConfig::default();
        config.gpu_window = ThermalWindow { min_safe: 80, max_safe: 40 };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_debounce_threshold_is_rejected() {
        let mut config = GovernorConfig::default();
        config.cpu_frequency_change_threshold = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = GovernorConfig::default();
        config.temperature_change_threshold = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn max_interval_below_default_is_rejected() {
        let mut config = GovernorConfig::default();
        config.max_poll_interval_secs = 2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: GovernorConfig =
            serde_json::from_str(r#"{ "strategy": "hysteresis", "max_poll_interval_secs": 30 }"#)
                .unwrap();
        assert_eq!(config.strategy, Strategy::Hysteresis);
        assert_eq!(config.max_poll_interval_secs, 30);
        assert_eq!(config.temperature_change_threshold, DEFAULT_TEMPERATURE_CHANGE_THRESHOLD);
        assert_eq!(config.cpu_window, ThermalWindow::default());
    }

    #[test]
    fn mode_entries_deserialize_with_default_interval() {
        let config: GovernorConfig = serde_json::from_str(
            r#"{
                "strategy": "hysteresis",
                "modes": [
                    { "name": "performance", "min_temp": 0, "max_temp": 59,
                      "preference": "performance", "cpu_khz": 3600000, "gpu_mhz": 1100 }
                ]
            }"#,
        )
        .unwrap();
        let modes = config.modes.unwrap();
        assert_eq!(modes[0].poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(modes[0].preference, PowerPreference::Performance);
    }
}
