//! GPU hardware and software detection.
//!
//! Probes return `Result`s so that a probe that ran and found nothing can be
//! told apart from a probe that failed. The boolean checks
//! ([`GpuDetector::detect_hardware`], [`GpuDetector::is_software_available`],
//! [`GpuDetector::is_gpu_available`]) fold every error into `false`.

pub mod hardware;
pub mod software;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use hardware::{GpuDevice, HardwareReport};
pub use software::SoftwareReport;

#[cfg(any(test, feature = "test-utils"))]
pub use testing::StaticDetector;

use crate::{config::settings::ProbeConfig, core::error::DetectionResult};
use std::fmt::Debug;
use tracing::debug;

/// Answers "can GPU mode actually work here?".
pub trait GpuDetector: Debug + Send + Sync {
    /// Enumerates GPU devices.
    fn probe_hardware(&self) -> DetectionResult<HardwareReport>;

    /// Loads the GPU runtime used by the GPU array and table backends.
    fn probe_software(&self) -> DetectionResult<SoftwareReport>;

    /// True iff the hardware probe succeeds and finds a compatible device.
    fn detect_hardware(&self) -> bool {
        match self.probe_hardware() {
            Ok(report) => {
                let found = report.has_compatible_device();
                debug!(
                    devices = report.devices.len(),
                    compatible = found,
                    "hardware probe finished"
                );
                found
            }
            Err(e) => {
                debug!(error = %e, "hardware probe failed, treating GPU as unavailable");
                false
            }
        }
    }

    /// True iff the GPU runtime loads without error.
    fn is_software_available(&self) -> bool {
        match self.probe_software() {
            Ok(report) => {
                debug!(libraries = ?report.libraries, "GPU runtime loaded");
                true
            }
            Err(e) => {
                debug!(error = %e, "GPU runtime unavailable");
                false
            }
        }
    }

    /// True iff both hardware and software checks pass.
    fn is_gpu_available(&self) -> bool {
        self.detect_hardware() && self.is_software_available()
    }
}

impl<D: GpuDetector + ?Sized> GpuDetector for Box<D> {
    fn probe_hardware(&self) -> DetectionResult<HardwareReport> {
        (**self).probe_hardware()
    }

    fn probe_software(&self) -> DetectionResult<SoftwareReport> {
        (**self).probe_software()
    }
}

impl<D: GpuDetector + ?Sized> GpuDetector for std::sync::Arc<D> {
    fn probe_hardware(&self) -> DetectionResult<HardwareReport> {
        (**self).probe_hardware()
    }

    fn probe_software(&self) -> DetectionResult<SoftwareReport> {
        (**self).probe_software()
    }
}

/// Detector that probes the running system.
#[derive(Debug, Clone, Default)]
pub struct SystemDetector {
    config: ProbeConfig,
}

impl SystemDetector {
    /// Creates a detector with the given probe configuration.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// The probe configuration.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}

impl GpuDetector for SystemDetector {
    fn probe_hardware(&self) -> DetectionResult<HardwareReport> {
        hardware::probe_hardware(&self.config)
    }

    fn probe_software(&self) -> DetectionResult<SoftwareReport> {
        if !self.config.is_supported_os() {
            return Err(crate::core::error::DetectionError::UnsupportedPlatform {
                os: self.config.target_os.clone(),
            });
        }
        software::probe_runtime()
    }
}

/// Raw outcome of running both probes once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Hardware probe result
    pub hardware: DetectionResult<HardwareReport>,
    /// Software probe result
    pub software: DetectionResult<SoftwareReport>,
}

impl Detection {
    /// Runs both probes.
    pub fn run<D: GpuDetector + ?Sized>(detector: &D) -> Self {
        Self {
            hardware: detector.probe_hardware(),
            software: detector.probe_software(),
        }
    }

    /// Whether a compatible device was found.
    pub fn hardware_available(&self) -> bool {
        self.hardware
            .as_ref()
            .is_ok_and(HardwareReport::has_compatible_device)
    }

    /// Whether the GPU runtime loaded.
    pub fn software_available(&self) -> bool {
        self.software.is_ok()
    }

    /// Whether GPU mode would work.
    pub fn gpu_available(&self) -> bool {
        self.hardware_available() && self.software_available()
    }

    /// Devices reported by the hardware probe, empty on failure.
    pub fn devices(&self) -> &[GpuDevice] {
        self.hardware
            .as_ref()
            .map(|r| r.devices.as_slice())
            .unwrap_or(&[])
    }
}

/// Probes the running system for a compatible GPU.
pub fn detect_hardware() -> bool {
    SystemDetector::default().detect_hardware()
}

/// Checks whether the GPU runtime can be loaded on the running system.
pub fn is_software_available() -> bool {
    SystemDetector::default().is_software_available()
}

/// Checks whether GPU mode can work on the running system.
pub fn is_gpu_available() -> bool {
    SystemDetector::default().is_gpu_available()
}
