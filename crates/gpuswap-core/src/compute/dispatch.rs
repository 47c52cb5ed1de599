//! Selection of the backend pair for a mode.

use super::{backend::ComputeBackend, cpu::CpuBackend, gpu::GpuBackend};
use crate::core::types::Mode;
use std::sync::Arc;

/// Holds one backend per mode and hands out the one matching a mode.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cpu: Arc<dyn ComputeBackend>,
    gpu: Arc<dyn ComputeBackend>,
}

impl Dispatcher {
    /// Creates a dispatcher from explicit backends.
    pub fn new(cpu: Arc<dyn ComputeBackend>, gpu: Arc<dyn ComputeBackend>) -> Self {
        Self { cpu, gpu }
    }

    /// The backend for `mode`.
    pub fn select(&self, mode: Mode) -> Arc<dyn ComputeBackend> {
        match mode {
            Mode::Cpu => Arc::clone(&self.cpu),
            Mode::Gpu => Arc::clone(&self.gpu),
        }
    }

    /// The CPU backend.
    pub fn cpu(&self) -> &Arc<dyn ComputeBackend> {
        &self.cpu
    }

    /// The GPU backend.
    pub fn gpu(&self) -> &Arc<dyn ComputeBackend> {
        &self.gpu
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(CpuBackend::new()), Arc::new(GpuBackend::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_pairs_libraries() {
        let dispatcher = Dispatcher::default();

        let cpu = dispatcher.select(Mode::Cpu);
        assert_eq!(cpu.mode(), Mode::Cpu);
        assert_eq!(cpu.array_library(), "nalgebra");
        assert_eq!(cpu.table_library(), "gpuswap::Table<host>");

        let gpu = dispatcher.select(Mode::Gpu);
        assert_eq!(gpu.mode(), Mode::Gpu);
        assert_eq!(gpu.array_library(), "cudarc");
        assert_eq!(gpu.table_library(), "gpuswap::Table<device>");
    }
}
