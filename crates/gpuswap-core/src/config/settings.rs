//! Probe and resolver configuration.

use crate::core::types::Mode;
use std::time::Duration;

/// Operating system family on which GPU mode is supported.
pub const SUPPORTED_OS: &str = "linux";

/// Default device enumeration utility.
pub const DEFAULT_PROBE_PROGRAM: &str = "nvidia-smi";

/// Configuration of the hardware probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Utility used to enumerate devices
    pub program: String,
    /// Arguments passed to the utility
    pub args: Vec<String>,
    /// Upper bound on the utility's run time
    pub timeout: Duration,
    /// Minimum compute capability a device needs to count as compatible
    pub min_compute_capability: (u32, u32),
    /// Operating system the probe believes it runs on
    pub target_os: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROBE_PROGRAM.to_string(),
            args: vec![
                "--query-gpu=index,name,compute_cap,memory.total".to_string(),
                "--format=csv,noheader,nounits".to_string(),
            ],
            timeout: Duration::from_secs(5),
            min_compute_capability: (3, 5),
            target_os: std::env::consts::OS.to_string(),
        }
    }
}

impl ProbeConfig {
    /// Whether the configured OS is the supported family.
    pub fn is_supported_os(&self) -> bool {
        self.target_os == SUPPORTED_OS
    }
}

/// Configuration of mode resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Run detection when no environment override is present
    pub auto_detect: bool,
    /// Mode used when auto-detection is disabled
    pub default_mode: Mode,
    /// Hardware probe settings
    pub probe: ProbeConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            default_mode: Mode::Cpu,
            probe: ProbeConfig::default(),
        }
    }
}

/// Builder for creating a custom resolver configuration.
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Enable or disable auto-detection.
    pub fn auto_detect(mut self, enabled: bool) -> Self {
        self.config.auto_detect = enabled;
        self
    }

    /// Set the mode used when auto-detection is disabled.
    pub fn default_mode(mut self, mode: Mode) -> Self {
        self.config.default_mode = mode;
        self
    }

    /// Set the device enumeration command.
    pub fn probe_command<S, I>(mut self, program: S, args: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.config.probe.program = program.into();
        self.config.probe.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe.timeout = timeout;
        self
    }

    /// Set the minimum compute capability.
    pub fn min_compute_capability(mut self, major: u32, minor: u32) -> Self {
        self.config.probe.min_compute_capability = (major, minor);
        self
    }

    /// Override the operating system seen by the probe.
    pub fn target_os<S: Into<String>>(mut self, os: S) -> Self {
        self.config.probe.target_os = os.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ResolverConfig {
        self.config
    }
}

impl Default for ResolverConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
