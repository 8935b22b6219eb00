//! Debounced actuation
//!
//! Applying a target is expensive: every CPU core and GPU card node gets
//! written, and sensor noise would otherwise flap the ceilings every few
//! ticks. The actuator therefore compares each proposed value against the
//! last *applied* one and only writes when the change clears the per-device
//! debounce threshold (or, for the discrete strategy, when the resolved mode
//! changed).
//!
//! A failed write still records the attempted value, so the same failing
//! parameters are not retried on every subsequent tick.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::GovernorConfig;
use crate::hardware::{DeviceClass, HardwareWriter, PowerPreference};
use crate::policy::FrequencyTarget;

/// Last targets handed to the hardware, successfully or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedTargets {
    pub cpu_khz: i64,
    pub gpu_mhz: i64,
    pub preference: Option<PowerPreference>,
    pub mode: Option<String>,
}

/// Applies policy targets through the hardware write interface.
pub struct Actuator {
    writer: Arc<dyn HardwareWriter>,
    cpu_threshold: i64,
    gpu_threshold: i64,
}

impl Actuator {
    pub fn new(writer: Arc<dyn HardwareWriter>, config: &GovernorConfig) -> Self {
        Self {
            writer,
            cpu_threshold: config.cpu_frequency_change_threshold,
            gpu_threshold: config.gpu_frequency_change_threshold,
        }
    }

    /// Applies `proposed` against `previous`, returning the new bookkeeping
    /// record and whether any write was attempted.
    pub async fn apply(
        &self,
        proposed: &FrequencyTarget,
        previous: &AppliedTargets,
    ) -> (AppliedTargets, bool) {
        let mode_changed = proposed.mode != previous.mode;
        let mut next = previous.clone();
        let mut applied_any = false;

        if mode_changed || (proposed.cpu_khz - previous.cpu_khz).abs() >= self.cpu_threshold {
            info!(khz = proposed.cpu_khz, "capping CPU frequency");
            if let Err(e) = self.writer.write_frequency(DeviceClass::Cpu, proposed.cpu_khz).await {
                error!(error = %e, khz = proposed.cpu_khz, "CPU frequency write failed");
            }
            next.cpu_khz = proposed.cpu_khz;
            applied_any = true;
        }

        if mode_changed || (proposed.gpu_mhz - previous.gpu_mhz).abs() >= self.gpu_threshold {
            info!(mhz = proposed.gpu_mhz, "capping GPU frequency");
            if let Err(e) = self.writer.write_frequency(DeviceClass::Gpu, proposed.gpu_mhz).await {
                error!(error = %e, mhz = proposed.gpu_mhz, "GPU frequency write failed");
            }
            next.gpu_mhz = proposed.gpu_mhz;
            applied_any = true;
        }

        if mode_changed || previous.preference != Some(proposed.preference) {
            info!(preference = %proposed.preference, "setting CPU power preference");
            if let Err(e) = self.writer.write_preference(proposed.preference).await {
                error!(error = %e, preference = %proposed.preference, "preference write failed");
            }
            next.preference = Some(proposed.preference);
            applied_any = true;
        }

        if mode_changed {
            next.mode = proposed.mode.clone();
        }

        (next, applied_any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hardware::MockHardwareWriter;
    use mockall::predicate::eq;

    fn target(cpu_khz: i64, gpu_mhz: i64) -> FrequencyTarget {
        FrequencyTarget {
            cpu_khz,
            gpu_mhz,
            preference: PowerPreference::Balanced,
            mode: None,
            poll_interval: None,
        }
    }

    fn applied(cpu_khz: i64, gpu_mhz: i64) -> AppliedTargets {
        AppliedTargets {
            cpu_khz,
            gpu_mhz,
            preference: Some(PowerPreference::Balanced),
            mode: None,
        }
    }

    fn actuator(writer: MockHardwareWriter) -> Actuator {
        Actuator::new(Arc::new(writer), &GovernorConfig::default())
    }

    #[tokio::test]
    async fn writes_fire_only_past_the_debounce_threshold() {
        let mut writer = MockHardwareWriter::new();
        // 50_000 kHz CPU delta meets the threshold; 20 MHz GPU delta does not.
        writer
            .expect_write_frequency()
            .with(eq(DeviceClass::Cpu), eq(2_250_000))
            .times(1)
            .returning(|_, _| Ok(()));

        let (next, any) = actuator(writer)
            .apply(&target(2_250_000, 720), &applied(2_200_000, 700))
            .await;
        assert!(any);
        assert_eq!(next.cpu_khz, 2_250_000);
        // The skipped GPU write leaves the previous value in the bookkeeping.
        assert_eq!(next.gpu_mhz, 700);
    }

    #[tokio::test]
    async fn identical_proposal_issues_no_writes() {
        // No expectations registered: any write would panic the mock.
        let writer = MockHardwareWriter::new();

        let (next, any) = actuator(writer)
            .apply(&target(2_200_000, 700), &applied(2_200_000, 700))
            .await;
        assert!(!any);
        assert_eq!(next, applied(2_200_000, 700));
    }

    #[tokio::test]
    async fn sub_threshold_deltas_are_suppressed() {
        let writer = MockHardwareWriter::new();

        let (_, any) = actuator(writer)
            .apply(&target(2_249_999, 749), &applied(2_200_000, 700))
            .await;
        assert!(!any);
    }

    #[tokio::test]
    async fn initial_state_applies_everything() {
        let mut writer = MockHardwareWriter::new();
        writer.expect_write_frequency().times(2).returning(|_, _| Ok(()));
        writer
            .expect_write_preference()
            .with(eq(PowerPreference::Balanced))
            .times(1)
            .returning(|_| Ok(()));

        let (next, any) =
            actuator(writer).apply(&target(2_200_000, 700), &AppliedTargets::default()).await;
        assert!(any);
        assert_eq!(next.preference, Some(PowerPreference::Balanced));
    }

    #[tokio::test]
    async fn mode_change_overrides_the_frequency_debounce() {
        let mut writer = MockHardwareWriter::new();
        writer.expect_write_frequency().times(2).returning(|_, _| Ok(()));
        writer.expect_write_preference().times(1).returning(|_| Ok(()));

        let mut proposed = target(2_200_000, 700);
        proposed.mode = Some("balanced".into());
        let mut previous = applied(2_200_000, 700);
        previous.mode = Some("performance".into());

        let (next, any) = actuator(writer).apply(&proposed, &previous).await;
        assert!(any);
        assert_eq!(next.mode.as_deref(), Some("balanced"));
    }

    #[tokio::test]
    async fn unchanged_mode_stays_debounced() {
        let writer = MockHardwareWriter::new();

        let mut proposed = target(2_200_000, 700);
        proposed.mode = Some("balanced".into());
        let mut previous = applied(2_200_000, 700);
        previous.mode = Some("balanced".into());

        let (_, any) = actuator(writer).apply(&proposed, &previous).await;
        assert!(!any);
    }

    #[tokio::test]
    async fn failed_write_still_records_the_attempted_value() {
        let mut writer = MockHardwareWriter::new();
        writer
            .expect_write_frequency()
            .with(eq(DeviceClass::Cpu), eq(2_300_000))
            .times(1)
            .returning(|_, _| Err(Error::actuation("permission denied")));

        let (next, any) = actuator(writer)
            .apply(&target(2_300_000, 700), &applied(2_200_000, 700))
            .await;
        assert!(any);
        assert_eq!(next.cpu_khz, 2_300_000);

        // The identical follow-up proposal is debounced, not retried.
        let writer = MockHardwareWriter::new();
        let (_, any) = actuator(writer).apply(&target(2_300_000, 700), &next).await;
        assert!(!any);
    }

    #[tokio::test]
    async fn preference_change_fires_independently() {
        let mut writer = MockHardwareWriter::new();
        writer
            .expect_write_preference()
            .with(eq(PowerPreference::Power))
            .times(1)
            .returning(|_| Ok(()));

        let mut proposed = target(2_200_000, 700);
        proposed.preference = PowerPreference::Power;

        let (next, any) = actuator(writer).apply(&proposed, &applied(2_200_000, 700)).await;
        assert!(any);
        assert_eq!(next.preference, Some(PowerPreference::Power));
    }
}
