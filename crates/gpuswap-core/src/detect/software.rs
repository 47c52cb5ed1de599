//! Software probe.
//!
//! The GPU array and table backends share one runtime, the CUDA driver
//! loaded through `cudarc`. The driver is opened dynamically on first use
//! and the loader panics when the shared library is missing, so the probe
//! runs it under `catch_unwind`.

use crate::core::error::{DetectionError, DetectionResult};

/// Name of the runtime library the GPU backends depend on.
pub const GPU_RUNTIME: &str = "cuda driver";

/// Outcome of a successful software probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareReport {
    /// Libraries that loaded
    pub libraries: Vec<String>,
    /// Devices visible to the runtime
    pub device_count: usize,
}

/// Attempts to load the GPU runtime.
#[cfg(feature = "cuda")]
pub fn probe_runtime() -> DetectionResult<SoftwareReport> {
    use cudarc::driver::CudaDevice;
    use std::panic;

    let count = panic::catch_unwind(CudaDevice::count)
        .map_err(|payload| {
            DetectionError::library_unavailable(GPU_RUNTIME, panic_message(&payload))
        })?
        .map_err(|e| DetectionError::library_unavailable(GPU_RUNTIME, e.to_string()))?;

    Ok(SoftwareReport {
        libraries: vec![GPU_RUNTIME.to_string()],
        device_count: usize::try_from(count).unwrap_or(0),
    })
}

/// Attempts to load the GPU runtime.
#[cfg(not(feature = "cuda"))]
pub fn probe_runtime() -> DetectionResult<SoftwareReport> {
    Err(DetectionError::not_compiled("cuda"))
}

/// Extracts a readable message from a panic payload.
#[allow(dead_code)]
pub(crate) fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "loader panicked".to_string()
    }
}
