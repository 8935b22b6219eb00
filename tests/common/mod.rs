//! Shared fakes for integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use thermgov::error::{Error, Result};
use thermgov::hardware::{
    DeviceClass, HardwareReader, HardwareWriter, PowerPreference, ReadTarget,
};

/// Reader with fixed bounds and a scripted sequence of temperature
/// readings; the last reading repeats once the script is exhausted.
pub struct ScriptedReader {
    temps: Mutex<VecDeque<Vec<i64>>>,
    last: Mutex<Vec<i64>>,
}

impl ScriptedReader {
    pub fn new(temps: &[&[i64]]) -> Self {
        Self {
            temps: Mutex::new(temps.iter().map(|t| t.to_vec()).collect()),
            last: Mutex::new(vec![60_000]),
        }
    }
}

#[async_trait]
impl HardwareReader for ScriptedReader {
    async fn read_values(&self, target: ReadTarget) -> Result<Vec<i64>> {
        match target {
            ReadTarget::Temperature => {
                let mut queue = self.temps.lock().unwrap();
                if let Some(values) = queue.pop_front() {
                    *self.last.lock().unwrap() = values.clone();
                    Ok(values)
                } else {
                    Ok(self.last.lock().unwrap().clone())
                }
            }
            ReadTarget::CpuFreqMin => Ok(vec![800_000]),
            ReadTarget::CpuFreqMax => Ok(vec![3_600_000]),
            ReadTarget::GpuFreqMin => Ok(vec![300]),
            ReadTarget::GpuFreqMax => Ok(vec![1_100]),
            ReadTarget::CpuCores => Ok(vec![4]),
        }
    }
}

/// A single write observed by [`RecordingWriter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Frequency(DeviceClass, i64),
    Preference(PowerPreference),
}

/// Writer that records every write; optionally fails them all.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    pub writes: Arc<Mutex<Vec<Write>>>,
    pub fail: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { writes: Arc::default(), fail: true }
    }

    pub fn recorded(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl HardwareWriter for RecordingWriter {
    async fn write_frequency(&self, device: DeviceClass, value: i64) -> Result<()> {
        self.writes.lock().unwrap().push(Write::Frequency(device, value));
        if self.fail {
            return Err(Error::Actuation("node is read-only".into()));
        }
        Ok(())
    }

    async fn write_preference(&self, preference: PowerPreference) -> Result<()> {
        self.writes.lock().unwrap().push(Write::Preference(preference));
        if self.fail {
            return Err(Error::Actuation("node is read-only".into()));
        }
        Ok(())
    }
}
