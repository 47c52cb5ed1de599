//! Configuration: environment overrides and resolver settings.

pub mod env;
pub mod settings;

// Re-export key items
pub use env::{parse_bool, process_env, EnvLookup, EnvOverrides, FORCE_CPU_VAR, USE_GPU_VAR};
pub use settings::{ProbeConfig, ResolverConfig, ResolverConfigBuilder, SUPPORTED_OS};
