//! Sysfs-backed implementations of the hardware read/write interfaces.
//!
//! Node discovery is repeated on every call rather than cached: cpufreq
//! policies and DRM cards can appear or vanish with hotplug, and the
//! directory scans are cheap next to the writes themselves.
//!
//! The sysfs root is parameterizable so tests can point both halves at a
//! scratch directory tree instead of `/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hardware::{DeviceClass, HardwareReader, HardwareWriter, PowerPreference, ReadTarget};

const THERMAL_DIR: &str = "sys/class/thermal";
const CPU_DIR: &str = "sys/devices/system/cpu";
const DRM_DIR: &str = "sys/class/drm";

const CPU_FREQ_MIN_NODE: &str = "cpufreq/cpuinfo_min_freq";
const CPU_FREQ_MAX_NODE: &str = "cpufreq/cpuinfo_max_freq";
const CPU_SCALING_MAX_NODE: &str = "cpufreq/scaling_max_freq";
const CPU_PREFERENCE_NODE: &str = "cpufreq/energy_performance_preference";
const GPU_FREQ_MIN_NODE: &str = "gt_RP1_freq_mhz";
const GPU_FREQ_MAX_NODE: &str = "gt_RP0_freq_mhz";
const GPU_SCALING_MAX_NODE: &str = "gt_max_freq_mhz";

/// Lists `dir` entries named `<prefix><digits>`, sorted for determinism.
async fn numbered_entries(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(rest) = name.strip_prefix(prefix) {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                out.push(entry.path());
            }
        }
    }
    out.sort();
    Ok(out)
}

/// CPU core directories that carry a cpufreq policy.
async fn cpufreq_cores(root: &Path) -> Result<Vec<PathBuf>> {
    let mut cores = Vec::new();
    for core in numbered_entries(&root.join(CPU_DIR), "cpu").await? {
        if fs::try_exists(core.join("cpufreq")).await.unwrap_or(false) {
            cores.push(core);
        }
    }
    Ok(cores)
}

/// Appends `node` to each base directory, keeping only paths that exist.
async fn existing_nodes(bases: &[PathBuf], node: &str) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for base in bases {
        let path = base.join(node);
        if fs::try_exists(&path).await.unwrap_or(false) {
            out.push(path);
        }
    }
    out
}

/// Reads sensor and frequency-bound values from sysfs nodes.
#[derive(Debug, Clone)]
pub struct SysfsReader {
    root: PathBuf,
}

impl SysfsReader {
    pub fn new() -> Self {
        Self { root: PathBuf::from("/") }
    }

    /// Uses `root` in place of `/`. Intended for tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read_numeric(&self, paths: Vec<PathBuf>) -> Result<Vec<i64>> {
        let total = paths.len();
        let mut values = Vec::with_capacity(total);
        for path in paths {
            match fs::read_to_string(&path).await {
                Ok(raw) => match raw.trim().parse::<f64>() {
                    Ok(value) => values.push(value as i64),
                    Err(_) => debug!(path = %path.display(), "skipping unparsable node"),
                },
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable node"),
            }
        }
        if values.is_empty() {
            return Err(Error::invalid_data(format!(
                "no usable values among {total} node(s)"
            )));
        }
        Ok(values)
    }
}

impl Default for SysfsReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwareReader for SysfsReader {
    async fn read_values(&self, target: ReadTarget) -> Result<Vec<i64>> {
        match target {
            ReadTarget::Temperature => {
                let zones =
                    numbered_entries(&self.root.join(THERMAL_DIR), "thermal_zone").await?;
                let nodes = existing_nodes(&zones, "temp").await;
                self.read_numeric(nodes).await
            }
            ReadTarget::CpuFreqMin => {
                let cores = cpufreq_cores(&self.root).await?;
                let nodes = existing_nodes(&cores, CPU_FREQ_MIN_NODE).await;
                self.read_numeric(nodes).await
            }
            ReadTarget::CpuFreqMax => {
                let cores = cpufreq_cores(&self.root).await?;
                let nodes = existing_nodes(&cores, CPU_FREQ_MAX_NODE).await;
                self.read_numeric(nodes).await
            }
            ReadTarget::GpuFreqMin => {
                let cards = numbered_entries(&self.root.join(DRM_DIR), "card").await?;
                let nodes = existing_nodes(&cards, GPU_FREQ_MIN_NODE).await;
                self.read_numeric(nodes).await
            }
            ReadTarget::GpuFreqMax => {
                let cards = numbered_entries(&self.root.join(DRM_DIR), "card").await?;
                let nodes = existing_nodes(&cards, GPU_FREQ_MAX_NODE).await;
                self.read_numeric(nodes).await
            }
            ReadTarget::CpuCores => {
                let cores = cpufreq_cores(&self.root).await?;
                Ok(vec![cores.len() as i64])
            }
        }
    }
}

/// Writes frequency ceilings and preference hints to sysfs nodes.
#[derive(Debug, Clone)]
pub struct SysfsWriter {
    root: PathBuf,
}

impl SysfsWriter {
    pub fn new() -> Self {
        Self { root: PathBuf::from("/") }
    }

    /// Uses `root` in place of `/`. Intended for tests.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn fan_out(&self, paths: Vec<PathBuf>, payload: &str, what: &str) -> Result<()> {
        if paths.is_empty() {
            return Err(Error::actuation(format!("no writable {what} nodes found")));
        }
        let total = paths.len();
        let mut failed = Vec::new();
        for path in paths {
            if let Err(e) = fs::write(&path, payload).await {
                debug!(path = %path.display(), error = %e, "node write failed");
                failed.push(path.display().to_string());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::actuation(format!(
                "{what} write failed for {}/{} node(s): {}",
                failed.len(),
                total,
                failed.join(", ")
            )))
        }
    }
}

impl Default for SysfsWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwareWriter for SysfsWriter {
    async fn write_frequency(&self, device: DeviceClass, value: i64) -> Result<()> {
        let nodes = match device {
            DeviceClass::Cpu => {
                let cores = cpufreq_cores(&self.root).await?;
                existing_nodes(&cores, CPU_SCALING_MAX_NODE).await
            }
            DeviceClass::Gpu => {
                let cards = numbered_entries(&self.root.join(DRM_DIR), "card").await?;
                existing_nodes(&cards, GPU_SCALING_MAX_NODE).await
            }
        };
        self.fan_out(nodes, &value.to_string(), "frequency").await
    }

    async fn write_preference(&self, preference: PowerPreference) -> Result<()> {
        let cores = cpufreq_cores(&self.root).await?;
        let nodes = existing_nodes(&cores, CPU_PREFERENCE_NODE).await;
        self.fan_out(nodes, preference.as_sysfs(), "preference").await
    }
}
