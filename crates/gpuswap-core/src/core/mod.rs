//! Core error and mode types.

pub mod error;
pub mod types;

pub use error::{BackendError, DetectionError, DetectionResult, Result};
pub use types::{Elem, HostMatrix, HostVector, Mode, ModeSource, Resolution};
