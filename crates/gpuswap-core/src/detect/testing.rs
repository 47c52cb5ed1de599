//! Fixed-outcome detector for tests.

use super::{GpuDetector, GpuDevice, HardwareReport, SoftwareReport};
use crate::core::error::{DetectionError, DetectionResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Detector whose hardware and software outcomes are fixed up front.
///
/// Counts how often each probe runs so tests can check that overrides skip
/// detection entirely.
#[derive(Debug, Default)]
pub struct StaticDetector {
    hardware: bool,
    software: bool,
    hardware_calls: AtomicUsize,
    software_calls: AtomicUsize,
}

impl StaticDetector {
    /// Creates a detector reporting the given availability.
    pub fn new(hardware: bool, software: bool) -> Self {
        Self {
            hardware,
            software,
            ..Self::default()
        }
    }

    /// A machine with a compatible GPU and runtime.
    pub fn available() -> Self {
        Self::new(true, true)
    }

    /// A machine with neither.
    pub fn unavailable() -> Self {
        Self::new(false, false)
    }

    /// Total number of probe invocations.
    pub fn probe_count(&self) -> usize {
        self.hardware_calls.load(Ordering::SeqCst) + self.software_calls.load(Ordering::SeqCst)
    }
}

impl GpuDetector for StaticDetector {
    fn probe_hardware(&self) -> DetectionResult<HardwareReport> {
        self.hardware_calls.fetch_add(1, Ordering::SeqCst);
        if self.hardware {
            Ok(HardwareReport {
                devices: vec![GpuDevice {
                    index: 0,
                    name: "Static Test GPU".to_string(),
                    compute_capability: (8, 0),
                    total_memory_mib: 16384,
                }],
                min_compute_capability: (3, 5),
            })
        } else {
            Err(DetectionError::UtilityNotFound {
                program: "nvidia-smi".to_string(),
            })
        }
    }

    fn probe_software(&self) -> DetectionResult<SoftwareReport> {
        self.software_calls.fetch_add(1, Ordering::SeqCst);
        if self.software {
            Ok(SoftwareReport {
                libraries: vec![super::software::GPU_RUNTIME.to_string()],
                device_count: 1,
            })
        } else {
            Err(DetectionError::library_unavailable(
                super::software::GPU_RUNTIME,
                "library not found",
            ))
        }
    }
}
