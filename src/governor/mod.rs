//! The control loop
//!
//! [`Governor`] owns every piece of mutable state and drives one
//! sample → decide → actuate cycle per timer firing. Ticks run to
//! completion before the timer is rearmed — the debounce and hysteresis
//! bookkeeping depends on seeing the true last-applied values, so two ticks
//! must never interleave. Holding the state behind `&mut self` makes that
//! overlap unrepresentable.
//!
//! The poll interval adapts: a material temperature change resets it to the
//! default (or the resolved mode's own interval), while stable readings grow
//! it one second per tick up to a cap, at which point it snaps back to the
//! default so readings can never go arbitrarily stale.


use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use crate::actuator::{Actuator, AppliedTargets};
use crate::config::GovernorConfig;
use crate::policy::FrequencyPolicy;
use crate::profile::HardwareProfile;
use crate::sampler::TemperatureSampler;

/// Process-lifetime mutable record, owned exclusively by the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Temperature recorded by the last tick that crossed the change
    /// threshold, in degrees Celsius. Starts at the zero sentinel so the
    /// first real reading always qualifies as a change.
    pub previous_temperature: i32,
    pub applied: AppliedTargets,
    pub poll_interval: Duration,
}

/// Thermal-responsive frequency governor.
pub struct Governor {
    config: GovernorConfig,
    profile: HardwareProfile,
    sampler: TemperatureSampler,
    policy: Box<dyn FrequencyPolicy>,
    actuator: Actuator,
    state: ControllerState,
}

impl Governor {
    pub fn new(
        config: GovernorConfig,
        profile: HardwareProfile,
        sampler: TemperatureSampler,
        policy: Box<dyn FrequencyPolicy>,
        actuator: Actuator,
    ) -> Self {
        let state = ControllerState {
            previous_temperature: 0,
            applied: AppliedTargets::default(),
            poll_interval: config.default_poll_interval(),
        };
        Self { config, profile, sampler, policy, actuator, state }
    }

    /// Runs the loop until `shutdown` signals.
    ///
    /// The signal is only observed while parked on the timer, so an
    /// in-flight tick always finishes before the loop returns.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            cores = self.profile.cores,
            cpu_max_khz = self.profile.cpu.max,
            gpu_max_mhz = self.profile.gpu.max,
            interval = ?self.state.poll_interval,
            "governor started"
        );
        loop {
            tokio::select! {
                _ = time::sleep(self.state.poll_interval) => self.tick().await,
                _ = shutdown.changed() => {
                    info!("shutdown signal received, stopping governor");
                    break;
                }
            }
        }
    }

    /// Processes one control cycle: sample, decide, actuate, retime.
    pub async fn tick(&mut self) {
        let temperature = self.sampler.sample().await;
        let delta = (temperature - self.state.previous_temperature).abs();

        if delta >= self.config.temperature_change_threshold {
            let target = self.policy.evaluate(temperature, &self.profile);
            debug!(
                temperature,
                delta,
                cpu_khz = target.cpu_khz,
                gpu_mhz = target.gpu_mhz,
                mode = target.mode.as_deref().unwrap_or("-"),
                "temperature change crossed threshold"
            );
            let reset = target
                .poll_interval
                .unwrap_or_else(|| self.config.default_poll_interval())
                .min(self.config.max_poll_interval());
            let (applied, applied_any) =
                self.actuator.apply(&target, &self.state.applied).await;
            if applied_any {
                info!(temperature, "frequency targets updated");
            }
            self.state.applied = applied;
            self.state.previous_temperature = temperature;
            self.state.poll_interval = reset;
        } else {
            let grown = self.state.poll_interval + Duration::from_secs(1);
            self.state.poll_interval = if grown >= self.config.max_poll_interval() {
                self.config.default_poll_interval()
            } else {
                grown
            };
            debug!(
                temperature,
                interval = ?self.state.poll_interval,
                "temperature stable, backing off"
            );
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }
}
