//! Mode resolution and the compute context built on it.

pub mod context;
pub mod resolver;
pub mod status;

pub use context::{ComputeContext, ComputeContextBuilder};
pub use resolver::ModeResolver;
pub use status::StatusReport;
