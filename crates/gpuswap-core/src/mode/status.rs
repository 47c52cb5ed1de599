//! Human-readable summary of the current compute configuration.

use crate::{
    compute::backend::ComputeBackend,
    core::types::{Mode, ModeSource, Resolution},
    detect::{Detection, GpuDevice},
};
use std::fmt;

/// Snapshot of mode, detection results and active libraries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusReport {
    /// Effective mode
    pub mode: Mode,
    /// Rule that produced the mode
    pub source: ModeSource,
    /// A compatible device was found
    pub hardware: bool,
    /// The GPU runtime loaded
    pub software: bool,
    /// Devices reported by the hardware probe
    pub devices: Vec<GpuDevice>,
    /// Active array library
    pub array_library: String,
    /// Active tabular library
    pub table_library: String,
}

impl StatusReport {
    pub(crate) fn new(
        resolution: Resolution,
        detection: &Detection,
        backend: &dyn ComputeBackend,
    ) -> Self {
        Self {
            mode: resolution.mode,
            source: resolution.source,
            hardware: detection.hardware_available(),
            software: detection.software_available(),
            devices: detection.devices().to_vec(),
            array_library: backend.array_library().to_string(),
            table_library: backend.table_library().to_string(),
        }
    }

    /// Whether GPU mode would work, independent of the active mode.
    pub fn gpu_available(&self) -> bool {
        self.hardware && self.software
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mode:      {} ({})", self.mode, self.source)?;
        writeln!(f, "arrays:    {}", self.array_library)?;
        writeln!(f, "tables:    {}", self.table_library)?;
        writeln!(f, "hardware:  {}", yes_no(self.hardware))?;
        write!(f, "software:  {}", yes_no(self.software))?;
        for device in &self.devices {
            write!(
                f,
                "\n  [{}] {} (sm {}.{}, {} MiB)",
                device.index,
                device.name,
                device.compute_capability.0,
                device.compute_capability.1,
                device.total_memory_mib
            )?;
        }
        Ok(())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
