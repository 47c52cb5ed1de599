//! Backend abstraction for array and table construction.
//!
//! A backend bundles an array library and a tabular library that share one
//! memory space. The dispatcher holds exactly one backend per mode, so the
//! array and table libraries in use always belong to the same pair.

use super::{
    array::{Array, ArrayInput, ArrayOptions},
    table::{Table, TableInput, TableOptions},
};
use crate::core::{error::Result, types::Mode};
use std::fmt::Debug;

/// Trait for computation backends.
pub trait ComputeBackend: Debug + Send + Sync {
    /// Backend name for identification.
    fn name(&self) -> &str;

    /// Mode this backend serves.
    fn mode(&self) -> Mode;

    /// Name of the array library behind this backend.
    fn array_library(&self) -> &'static str;

    /// Name of the tabular library behind this backend.
    fn table_library(&self) -> &'static str;

    /// Check if this backend can run on the current system.
    fn is_available(&self) -> bool;

    /// Constructs an array; options are interpreted by the backend.
    fn create_array(&self, data: ArrayInput, options: &ArrayOptions) -> Result<Array>;

    /// Constructs a table; options are interpreted by the backend.
    fn create_table(&self, data: TableInput, options: &TableOptions) -> Result<Table>;

    /// Copies an array to host memory. Host arrays are returned unchanged.
    fn host_copy_array(&self, array: Array) -> Result<Array> {
        match array {
            Array::Host(_) => Ok(array),
            Array::Device(d) => d.to_host().map(Array::Host),
        }
    }

    /// Copies a table to host memory. Host tables are returned unchanged.
    fn host_copy_table(&self, table: Table) -> Result<Table> {
        table.into_host()
    }

    /// Blocks until pending device work completes; no-op by default.
    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}

/// Objects that can be moved to host memory.
pub trait HostTransfer: Sized {
    /// Whether the object lives in device memory.
    fn is_on_device(&self) -> bool;

    /// Copies the object into host memory using `backend`.
    fn transfer_to_host(self, backend: &dyn ComputeBackend) -> Result<Self>;
}

impl HostTransfer for Array {
    fn is_on_device(&self) -> bool {
        self.is_device()
    }

    fn transfer_to_host(self, backend: &dyn ComputeBackend) -> Result<Self> {
        backend.host_copy_array(self)
    }
}

impl HostTransfer for Table {
    fn is_on_device(&self) -> bool {
        self.is_device()
    }

    fn transfer_to_host(self, backend: &dyn ComputeBackend) -> Result<Self> {
        backend.host_copy_table(self)
    }
}
