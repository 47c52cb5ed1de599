//! Process-wide CPU/GPU mode switch.
//!
//! Code written against this crate runs unchanged on machines with and
//! without a usable GPU. The first call that needs the mode resolves it from
//! the environment and from hardware/software detection; every later call
//! reads the cached value until [`set_gpu_mode`], [`refresh`] or [`reset`]
//! changes it.
//!
//! | Variable            | Effect                                        |
//! |---------------------|-----------------------------------------------|
//! | `GPUSWAP_FORCE_CPU` | truthy: CPU mode, wins over everything        |
//! | `GPUSWAP_USE_GPU`   | boolean: GPU on/off, trusted without checking |
//!
//! Truthy values are `1`, `true`, `yes` and `on`, case-insensitively.
//!
//! # Example
//! ```
//! use gpuswap::prelude::*;
//!
//! let data = gpuswap::create_array(vec![1.0, 2.0, 3.0, 4.0], &ArrayOptions::with_shape(2, 2))?;
//! let host = gpuswap::to_cpu(data)?;
//! assert_eq!(host.shape(), (2, 2));
//! println!("arrays backed by {}", gpuswap::array_library());
//! # Ok::<(), gpuswap::BackendError>(())
//! ```
//!
//! Binaries that do not install their own `tracing` subscriber can call
//! [`init_logging`] to see which mode was picked and why.

use once_cell::sync::Lazy;
use tracing::debug;

pub use gpuswap_core::{
    compute::{Array, ArrayInput, ArrayOptions, Layout, Table, TableInput, TableOptions},
    config::{FORCE_CPU_VAR, USE_GPU_VAR},
    detect::GpuDevice,
    logging::{init_default_logging, init_logging, LogLevel, LoggingConfig},
    BackendError, ComputeContext, ComputeContextBuilder, DetectionError, Mode, ModeSource,
    Resolution, Result, StatusReport,
};

pub use gpuswap_core;
pub use nalgebra;

static CONTEXT: Lazy<ComputeContext> = Lazy::new(ComputeContext::new);

/// The process-wide context behind the free functions.
pub fn context() -> &'static ComputeContext {
    &CONTEXT
}

/// Whether GPU mode is active, resolving it on first call.
pub fn gpu_mode() -> bool {
    CONTEXT.gpu_mode()
}

/// The active mode, resolving it on first call.
pub fn mode() -> Mode {
    CONTEXT.mode()
}

/// The active mode and the rule that produced it.
pub fn resolution() -> Resolution {
    CONTEXT.resolution()
}

/// Switches the mode for the whole process. Availability is not checked.
pub fn set_gpu_mode(enabled: bool) {
    CONTEXT.set_gpu_mode(enabled);
}

/// Re-reads the environment and re-runs detection.
pub fn refresh() -> Resolution {
    CONTEXT.refresh()
}

/// Forgets the cached mode so the next read resolves it again.
pub fn reset() {
    debug!("clearing process-wide compute mode");
    CONTEXT.reset();
}

/// Name of the array library of the active pair.
pub fn array_library() -> &'static str {
    CONTEXT.array_library()
}

/// Name of the tabular library of the active pair.
pub fn table_library() -> &'static str {
    CONTEXT.table_library()
}

/// Constructs an array with the active array library.
pub fn create_array<I: Into<ArrayInput>>(data: I, options: &ArrayOptions) -> Result<Array> {
    CONTEXT.create_array(data, options)
}

/// Constructs a table with the active tabular library.
pub fn create_table<I: Into<TableInput>>(data: I, options: &TableOptions) -> Result<Table> {
    CONTEXT.create_table(data, options)
}

/// Copies an array or table to host memory. Host objects pass through.
pub fn to_cpu<T: gpuswap_core::compute::HostTransfer>(obj: T) -> Result<T> {
    CONTEXT.to_cpu(obj)
}

/// Waits for pending GPU work in GPU mode; no-op in CPU mode.
pub fn synchronize() -> Result<()> {
    CONTEXT.synchronize()
}

/// Current mode plus a fresh detection run.
pub fn status() -> StatusReport {
    CONTEXT.status()
}

/// Whether a compatible GPU is present.
pub fn detect_hardware() -> bool {
    gpuswap_core::detect::detect_hardware()
}

/// Whether the GPU runtime loads.
pub fn is_software_available() -> bool {
    gpuswap_core::detect::is_software_available()
}

/// Whether GPU mode would work on this machine.
pub fn is_gpu_available() -> bool {
    gpuswap_core::detect::is_gpu_available()
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Array, ArrayInput, ArrayOptions, BackendError, Layout, Mode, ModeSource, Table,
        TableInput, TableOptions,
    };
    pub use gpuswap_core::compute::HostTransfer;
}
