//! Discrete hysteresis-band strategy.

use std::time::Duration;

use tracing::warn;

use crate::config::{GovernorConfig, ModeConfig};
use crate::error::{Error, Result};
use crate::hardware::PowerPreference;
use crate::policy::{FrequencyPolicy, FrequencyTarget};
use crate::profile::HardwareProfile;

/// Derived-table band edges: anything at or below 59 °C runs unconstrained,
/// 60–70 °C holds the middle tick, 71 °C and up is pinned down.
const BALANCED_MIN_TEMP: i32 = 60;
const POWERSAVE_MIN_TEMP: i32 = 71;

/// One discrete operating profile, valid over an inclusive temperature band.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalMode {
    pub name: String,
    pub min_temp: i32,
    pub max_temp: i32,
    pub preference: PowerPreference,
    pub cpu_khz: i64,
    pub gpu_mhz: i64,
    pub poll_interval: Duration,
}

impl ThermalMode {
    pub fn contains(&self, temperature: i32) -> bool {
        (self.min_temp..=self.max_temp).contains(&temperature)
    }
}

impl From<&ModeConfig> for ThermalMode {
    fn from(config: &ModeConfig) -> Self {
        Self {
            name: config.name.clone(),
            min_temp: config.min_temp,
            max_temp: config.max_temp,
            preference: config.preference,
            cpu_khz: config.cpu_khz,
            gpu_mhz: config.gpu_mhz,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }
}

/// Fixed, priority-ordered list of thermal modes.
///
/// Construction enforces the partition invariant: bands are listed coolest
/// to hottest and tile their span with no gaps and no overlaps, so exactly
/// one mode matches any in-span temperature and selection is deterministic.
#[derive(Debug, Clone)]
pub struct ModeTable {
    modes: Vec<ThermalMode>,
}

impl ModeTable {
    /// Builds and validates a table from configured bands.
    pub fn from_configs(configs: &[ModeConfig]) -> Result<Self> {
        if configs.is_empty() {
            return Err(Error::config("mode table is empty"));
        }
        let modes: Vec<ThermalMode> = configs.iter().map(ThermalMode::from).collect();
        for mode in &modes {
            if mode.min_temp > mode.max_temp {
                return Err(Error::config(format!(
                    "mode '{}' has min_temp {} above max_temp {}",
                    mode.name, mode.min_temp, mode.max_temp
                )));
            }
        }
        for pair in modes.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.max_temp.checked_add(1) != Some(next.min_temp) {
                return Err(Error::config(format!(
                    "modes '{}' and '{}' do not partition the temperature range: \
                     [{}, {}] is followed by [{}, {}]",
                    prev.name, next.name, prev.min_temp, prev.max_temp, next.min_temp,
                    next.max_temp
                )));
            }
        }
        Ok(Self { modes })
    }

    /// Builds the default three-band table from discovered bounds, with
    /// frequencies at the top, middle, and bottom ticks of each bound. The
    /// bands tile the whole representable temperature domain.
    pub fn derived(profile: &HardwareProfile, config: &GovernorConfig) -> Self {
        let default_interval = config.default_poll_interval();
        Self {
            modes: vec![
                ThermalMode {
                    name: "performance".into(),
                    min_temp: i32::MIN,
                    max_temp: BALANCED_MIN_TEMP - 1,
                    preference: PowerPreference::Performance,
                    cpu_khz: profile.cpu.max,
                    gpu_mhz: profile.gpu.max,
                    poll_interval: default_interval,
                },
                ThermalMode {
                    name: "balanced".into(),
                    min_temp: BALANCED_MIN_TEMP,
                    max_temp: POWERSAVE_MIN_TEMP - 1,
                    preference: PowerPreference::Balanced,
                    cpu_khz: profile.cpu.midpoint(),
                    gpu_mhz: profile.gpu.midpoint(),
                    poll_interval: default_interval,
                },
                ThermalMode {
                    name: "powersave".into(),
                    min_temp: POWERSAVE_MIN_TEMP,
                    max_temp: i32::MAX,
                    preference: PowerPreference::Power,
                    cpu_khz: profile.cpu.min,
                    gpu_mhz: profile.gpu.min,
                    poll_interval: default_interval * 2,
                },
            ],
        }
    }

    /// Selects the first mode whose band contains `temperature`.
    ///
    /// An unmatched temperature means the configured table does not cover
    /// the whole domain; the hottest mode is used as a fail-safe and the
    /// condition is logged as a configuration defect.
    pub fn select(&self, temperature: i32) -> &ThermalMode {
        if let Some(mode) = self.modes.iter().find(|m| m.contains(temperature)) {
            return mode;
        }
        let fallback = self.fail_safe();
        warn!(
            temperature,
            fallback = %fallback.name,
            "no thermal mode covers this temperature, falling back to the fail-safe mode"
        );
        fallback
    }

    pub fn modes(&self) -> &[ThermalMode] {
        &self.modes
    }

    fn fail_safe(&self) -> &ThermalMode {
        // Modes are ordered coolest to hottest and the table is never empty.
        &self.modes[self.modes.len() - 1]
    }
}

/// Discrete strategy: scans the fixed mode table in priority order.
pub struct HysteresisPolicy {
    table: ModeTable,
}

impl HysteresisPolicy {
    /// Uses the configured mode table when one is present, otherwise the
    /// table derived from the discovered bounds.
    pub fn new(config: &GovernorConfig, profile: &HardwareProfile) -> Result<Self> {
        let table = match &config.modes {
            Some(configs) => ModeTable::from_configs(configs)?,
            None => ModeTable::derived(profile, config),
        };
        Ok(Self { table })
    }

    pub fn with_table(table: ModeTable) -> Self {
        Self { table }
    }
}

impl FrequencyPolicy for HysteresisPolicy {
    fn evaluate(&self, temperature: i32, _profile: &HardwareProfile) -> FrequencyTarget {
        let mode = self.table.select(temperature);
        FrequencyTarget {
            cpu_khz: mode.cpu_khz,
            gpu_mhz: mode.gpu_mhz,
            preference: mode.preference,
            mode: Some(mode.name.clone()),
            poll_interval: Some(mode.poll_interval),
        }
    }
}
