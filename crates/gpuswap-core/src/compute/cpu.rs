//! CPU backend: `nalgebra` matrices and host-resident tables.

use super::{
    array::{host_matrix_from, Array, ArrayInput, ArrayOptions},
    backend::ComputeBackend,
    table::{host_column_array, prepare_columns, PreparedColumn, Table, TableInput, TableOptions},
};
use crate::core::{error::Result, types::Mode};

/// CPU backend implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl CpuBackend {
    /// Creates a new CPU backend.
    pub fn new() -> Self {
        Self
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn mode(&self) -> Mode {
        Mode::Cpu
    }

    fn array_library(&self) -> &'static str {
        "nalgebra"
    }

    fn table_library(&self) -> &'static str {
        "gpuswap::Table<host>"
    }

    fn is_available(&self) -> bool {
        true // CPU is always available
    }

    fn create_array(&self, data: ArrayInput, options: &ArrayOptions) -> Result<Array> {
        host_matrix_from(data, options).map(Array::Host)
    }

    fn create_table(&self, data: TableInput, options: &TableOptions) -> Result<Table> {
        let columns = prepare_columns(data, options)?
            .into_iter()
            .map(|(name, column)| {
                let array = match column {
                    PreparedColumn::Host(v) => host_column_array(v),
                    PreparedColumn::Existing(a) => Array::Host(a.into_host()?),
                };
                Ok((name, array))
            })
            .collect::<Result<Vec<_>>>()?;

        Table::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{error::BackendError, types::HostMatrix};

    #[test]
    fn test_cpu_create_array() {
        let backend = CpuBackend::new();
        let array = backend
            .create_array(vec![1.0, 2.0, 3.0, 4.0].into(), &ArrayOptions::with_shape(2, 2))
            .unwrap();

        assert_eq!(array.residency(), Mode::Cpu);
        assert_eq!(
            array.as_host().unwrap(),
            &HostMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn test_cpu_create_table_with_selection() {
        let backend = CpuBackend::new();
        let table = backend
            .create_table(
                vec![("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0]), ("c", vec![5.0, 6.0])].into(),
                &TableOptions::select(["c", "a"]),
            )
            .unwrap();

        assert_eq!(table.column_names(), vec!["c", "a"]);
        assert_eq!(table.host_column("c"), Some(&[5.0, 6.0][..]));
        assert!(table.column("b").is_none());
    }

    #[test]
    fn test_cpu_table_from_existing_table() {
        let backend = CpuBackend::new();
        let first = backend
            .create_table(vec![("x", vec![1.0, 2.0, 3.0])].into(), &TableOptions::default())
            .unwrap();
        let second = backend
            .create_table(first.into(), &TableOptions::default())
            .unwrap();
        assert_eq!(second.nrows(), 3);
        assert_eq!(second.host_column("x"), Some(&[1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_cpu_errors_propagate() {
        let backend = CpuBackend::new();
        let err = backend
            .create_table(
                vec![("a", vec![1.0])].into(),
                &TableOptions::select(["missing"]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::UnknownColumn {
                column: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_cpu_synchronize_is_noop() {
        assert!(CpuBackend::new().synchronize().is_ok());
        assert!(CpuBackend::new().is_available());
    }
}
