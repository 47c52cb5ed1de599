//! GPU detection, mode resolution and CPU/GPU backend dispatch.
//!
//! This crate decides whether computations should run on a GPU or on the
//! CPU, and hands out the array and tabular libraries that match the
//! decision. Callers write their code once against [`ComputeContext`] and
//! get host-resident `nalgebra` matrices or CUDA device buffers depending on
//! the machine and on the environment.
//!
//! # Mode resolution
//!
//! The mode is resolved lazily on first read, first match wins:
//!
//! 1. `GPUSWAP_FORCE_CPU` truthy → CPU
//! 2. `GPUSWAP_USE_GPU` set to a boolean → that value, trusted as-is
//! 3. auto-detection → GPU iff a compatible device and the runtime are found
//! 4. the configured default (CPU)
//!
//! # Modules
//!
//! - [`core`]: error and mode types
//! - [`config`]: environment overrides and resolver settings
//! - [`detect`]: hardware and software probes
//! - [`mode`]: resolver, compute context and status report
//! - [`compute`]: arrays, tables and the CPU/GPU backends
//! - [`logging`]: `tracing` subscriber setup
//!
//! # Example
//! ```
//! use gpuswap_core::prelude::*;
//!
//! let ctx = ComputeContext::builder()
//!     .env_vars([(FORCE_CPU_VAR, "1")])
//!     .build();
//!
//! assert_eq!(ctx.mode(), Mode::Cpu);
//! assert_eq!(ctx.array_library(), "nalgebra");
//!
//! let a = ctx.create_array(vec![1.0, 2.0, 3.0], &ArrayOptions::default()).unwrap();
//! let a = ctx.to_cpu(a).unwrap();
//! assert_eq!(a.shape(), (3, 1));
//! ```

pub mod compute;
pub mod config;
pub mod core;
pub mod detect;
pub mod logging;
pub mod mode;

// Re-export commonly used items at the crate root
pub use crate::core::error::{BackendError, DetectionError, DetectionResult, Result};
pub use crate::core::types::{Mode, ModeSource, Resolution};
pub use compute::{Array, ArrayInput, ArrayOptions, Table, TableInput, TableOptions};
pub use mode::{ComputeContext, ComputeContextBuilder, StatusReport};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use gpuswap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compute::{
        Array, ArrayInput, ArrayOptions, ComputeBackend, CpuBackend, Dispatcher, GpuBackend,
        HostTransfer, Layout, Table, TableInput, TableOptions,
    };
    pub use crate::config::{
        EnvOverrides, ProbeConfig, ResolverConfig, ResolverConfigBuilder, FORCE_CPU_VAR,
        USE_GPU_VAR,
    };
    pub use crate::core::{
        BackendError, DetectionError, DetectionResult, Elem, HostMatrix, HostVector, Mode,
        ModeSource, Resolution, Result,
    };
    pub use crate::detect::{Detection, GpuDetector, GpuDevice, SystemDetector};
    pub use crate::logging::{init_logging, LogLevel, LoggingConfig};
    pub use crate::mode::{ComputeContext, ComputeContextBuilder, ModeResolver, StatusReport};
}
