//! Thermgov - an adaptive thermal frequency governor for Linux
//!
//! This crate keeps a machine inside its safe thermal envelope by polling
//! system temperature and adjusting CPU/GPU frequency ceilings (plus the
//! CPU energy-performance preference) through sysfs control surfaces. When
//! thermal headroom exists the full hardware bounds are released; as
//! temperature climbs the ceilings are walked down.
//!
//! # Features
//!
//! - **Two policies**: continuous linear interpolation across a safe
//!   temperature window, or a discrete table of hysteresis-banded thermal
//!   modes — both selectable from configuration.
//! - **Debounced actuation**: writes only happen when a change clears a
//!   per-device threshold, so sensor jitter never flaps the ceilings.
//! - **Adaptive polling**: the loop backs off while temperature is stable
//!   and snaps back to a fast cadence on real thermal swings.
//! - **Graceful degradation**: failed discovery falls back to documented
//!   defaults, failed samples fall back to a safe mid-range temperature,
//!   and failed writes are logged without stalling the loop.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use thermgov::prelude::*;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> thermgov::Result<()> {
//!     let config = GovernorConfig::default();
//!     config.validate()?;
//!
//!     let reader = Arc::new(SysfsReader::new());
//!     let writer = Arc::new(SysfsWriter::new());
//!
//!     let profile = HardwareProfile::discover(reader.as_ref()).await;
//!     let policy = thermgov::policy::build(&config, &profile)?;
//!     let sampler = TemperatureSampler::new(reader, config.default_safe_temperature);
//!     let actuator = Actuator::new(writer, &config);
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let mut governor = Governor::new(config, profile, sampler, policy, actuator);
//!     governor.run(shutdown_rx).await;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Anything that fails inside a running tick degrades to a safe default and
//! is logged; only configuration errors detected at startup are fatal. See
//! [`Error`] for the full taxonomy.
//!
//! # Concurrency
//!
//! The governor is a single logical worker: one tick runs to completion
//! before the timer is rearmed, so the controller state is never touched
//! concurrently. [`HardwareProfile`](profile::HardwareProfile) is immutable
//! after discovery and can be shared freely.

pub mod actuator;
pub mod config;
pub mod error;
pub mod governor;
pub mod hardware;
pub mod policy;
pub mod profile;
pub mod sampler;

pub use error::{Error, Result};

/// Re-export of the types needed to assemble a governor.
pub mod prelude {
    pub use crate::actuator::Actuator;
    pub use crate::config::{GovernorConfig, Strategy, ThermalWindow};
    pub use crate::error::{Error, Result};
    pub use crate::governor::Governor;
    pub use crate::hardware::{
        DeviceClass, HardwareReader, HardwareWriter, PowerPreference, ReadTarget, SysfsReader,
        SysfsWriter,
    };
    pub use crate::policy::{FrequencyPolicy, FrequencyTarget, HysteresisPolicy, LinearPolicy};
    pub use crate::profile::{FrequencyBound, HardwareProfile};
    pub use crate::sampler::TemperatureSampler;
}
