//! Array/table types and the CPU and GPU backends behind them.

pub mod array;
pub mod backend;
pub mod cpu;
pub mod dispatch;
pub mod gpu;
pub mod table;

pub use array::{Array, ArrayInput, ArrayOptions, Layout};
pub use backend::{ComputeBackend, HostTransfer};
pub use cpu::CpuBackend;
pub use dispatch::Dispatcher;
pub use gpu::{DeviceArray, GpuBackend};
pub use table::{Table, TableInput, TableOptions};
