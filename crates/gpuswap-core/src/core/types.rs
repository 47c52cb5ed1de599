//! Mode and resolution types.

use std::fmt;

/// Element type stored in arrays and table columns.
pub type Elem = f64;

/// Host-resident dense matrix.
pub type HostMatrix = nalgebra::DMatrix<Elem>;

/// Host-resident column vector.
pub type HostVector = nalgebra::DVector<Elem>;

/// Which backend pair is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Mode {
    /// Host memory, CPU libraries
    #[default]
    Cpu,
    /// Device memory, GPU libraries
    Gpu,
}

impl Mode {
    /// Returns the mode for a boolean GPU flag.
    pub fn from_gpu_flag(gpu: bool) -> Self {
        if gpu {
            Self::Gpu
        } else {
            Self::Cpu
        }
    }

    /// Whether this is GPU mode.
    pub fn is_gpu(self) -> bool {
        matches!(self, Self::Gpu)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Gpu => write!(f, "GPU"),
        }
    }
}

impl From<bool> for Mode {
    fn from(gpu: bool) -> Self {
        Self::from_gpu_flag(gpu)
    }
}

/// The precedence rule that produced a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModeSource {
    /// The force-CPU environment flag was truthy
    ForceCpu,
    /// The explicit enable/disable environment flag was set
    Explicit,
    /// Hardware and software detection
    AutoDetect,
    /// Auto-detection disabled, configured default used
    Default,
    /// Set through the setter
    Manual,
}

impl fmt::Display for ModeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ForceCpu => "force-cpu flag",
            Self::Explicit => "explicit flag",
            Self::AutoDetect => "auto-detection",
            Self::Default => "default",
            Self::Manual => "manual override",
        };
        f.write_str(label)
    }
}

/// A resolved mode together with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// Effective mode
    pub mode: Mode,
    /// Rule that produced it
    pub source: ModeSource,
}

impl Resolution {
    /// Creates a resolution.
    pub fn new(mode: Mode, source: ModeSource) -> Self {
        Self { mode, source }
    }
}
