//! Error types for detection and backend operations.
//!
//! Detection errors never escape the boolean availability checks; they are
//! kept as values so that callers inspecting a [`Detection`](crate::detect::Detection)
//! can tell a probe that ran and found nothing from a probe that failed.
//! Backend errors are returned to the caller unchanged.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while probing for GPU hardware or software support.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// GPU support is restricted to one operating system family.
    #[error("GPU support is not available on {os}")]
    UnsupportedPlatform {
        /// Operating system the probe ran on
        os: String,
    },

    /// The device enumeration utility is not installed.
    #[error("Device utility not found: {program}")]
    UtilityNotFound {
        /// Program that was looked up
        program: String,
    },

    /// The device enumeration utility could not be started.
    #[error("Failed to run {program}: {reason}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// The device enumeration utility exited with a failure status.
    #[error("{program} exited with status {code:?}")]
    NonZeroExit {
        /// Program that failed
        program: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
    },

    /// The device enumeration utility did not finish in time.
    #[error("{program} did not finish within {timeout:?}")]
    Timeout {
        /// Program that hung
        program: String,
        /// Configured limit
        timeout: Duration,
    },

    /// The utility output could not be interpreted.
    #[error("Malformed device listing: {line}")]
    MalformedOutput {
        /// Offending line
        line: String,
    },

    /// A GPU runtime library failed to load.
    #[error("GPU library {library} is unavailable: {reason}")]
    LibraryUnavailable {
        /// Library that failed to load
        library: String,
        /// Loader error message
        reason: String,
    },

    /// The crate was built without GPU support.
    #[error("GPU support not compiled in (enable the `{feature}` feature)")]
    NotCompiled {
        /// Cargo feature that enables the missing support
        feature: String,
    },
}

impl DetectionError {
    /// Create an UnsupportedPlatform error for the running OS.
    pub fn unsupported_platform() -> Self {
        Self::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Create a LibraryUnavailable error.
    pub fn library_unavailable<S1, S2>(library: S1, reason: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::LibraryUnavailable {
            library: library.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotCompiled error for a cargo feature.
    pub fn not_compiled<S: Into<String>>(feature: S) -> Self {
        Self::NotCompiled {
            feature: feature.into(),
        }
    }

    /// Create a MalformedOutput error.
    pub fn malformed<S: Into<String>>(line: S) -> Self {
        Self::MalformedOutput { line: line.into() }
    }
}

/// Errors raised by array and table construction or device operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Input data cannot be turned into the requested object.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem
        reason: String,
    },

    /// Requested shape does not match the number of elements.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected element count or shape
        expected: String,
        /// Actual element count or shape
        actual: String,
    },

    /// Table columns do not all have the same length.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Offending column
        column: String,
        /// Row count of the first column
        expected: usize,
        /// Row count of the offending column
        actual: usize,
    },

    /// The same column name appears twice.
    #[error("Duplicate column name: {column}")]
    DuplicateColumn {
        /// Repeated column name
        column: String,
    },

    /// A requested column does not exist.
    #[error("Unknown column: {column}")]
    UnknownColumn {
        /// Missing column name
        column: String,
    },

    /// No GPU device could be initialised.
    #[error("GPU device unavailable: {reason}")]
    DeviceUnavailable {
        /// Driver error message
        reason: String,
    },

    /// A host/device copy failed.
    #[error("Memory transfer failed: {reason}")]
    Transfer {
        /// Driver error message
        reason: String,
    },

    /// Device synchronization failed.
    #[error("Device synchronization failed: {reason}")]
    Synchronize {
        /// Driver error message
        reason: String,
    },

    /// The GPU backend was selected but GPU support is not compiled in.
    #[error("GPU backend is not compiled in (enable the `{feature}` feature)")]
    NotCompiled {
        /// Cargo feature that enables the missing support
        feature: String,
    },
}

impl BackendError {
    /// Create an InvalidInput error with a custom reason.
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a DeviceUnavailable error.
    pub fn device_unavailable<S: Into<String>>(reason: S) -> Self {
        Self::DeviceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a Transfer error.
    pub fn transfer<S: Into<String>>(reason: S) -> Self {
        Self::Transfer {
            reason: reason.into(),
        }
    }

    /// Create a NotCompiled error for the GPU feature.
    pub fn gpu_not_compiled() -> Self {
        Self::NotCompiled {
            feature: "cuda".to_string(),
        }
    }
}

/// Result type alias for detection probes.
pub type DetectionResult<T> = std::result::Result<T, DetectionError>;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
