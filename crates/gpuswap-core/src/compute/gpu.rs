//! GPU backend: CUDA device buffers through `cudarc`.
//!
//! Without the `cuda` feature the backend still exists so that GPU mode can
//! be selected, but every constructor fails with
//! [`BackendError::NotCompiled`]. The device is opened lazily on first use;
//! a missing driver surfaces as [`BackendError::DeviceUnavailable`] at that
//! point rather than at mode resolution.

use super::{
    array::{Array, ArrayInput, ArrayOptions},
    backend::ComputeBackend,
    table::{Table, TableInput, TableOptions},
};
use crate::core::{
    error::{BackendError, Result},
    types::{HostMatrix, Mode},
};
use std::fmt;

#[cfg(feature = "cuda")]
use {
    super::{
        array::host_matrix_from,
        table::{prepare_columns, PreparedColumn},
    },
    crate::{core::types::Elem, detect::software::panic_message},
    cudarc::driver::{CudaDevice, CudaSlice},
    once_cell::sync::OnceCell,
    std::sync::Arc,
    tracing::info,
};

/// A dense array in device memory, stored column-major.
#[cfg(feature = "cuda")]
#[derive(Clone)]
pub struct DeviceArray {
    data: CudaSlice<Elem>,
    rows: usize,
    cols: usize,
    device: Arc<CudaDevice>,
}

#[cfg(feature = "cuda")]
impl DeviceArray {
    /// Copies a host matrix to the device.
    pub fn from_host(device: &Arc<CudaDevice>, host: &HostMatrix) -> Result<Self> {
        let data = device
            .htod_sync_copy(host.as_slice())
            .map_err(|e| BackendError::transfer(format!("H2D copy failed: {}", e)))?;

        Ok(Self {
            data,
            rows: host.nrows(),
            cols: host.ncols(),
            device: device.clone(),
        })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Copies the data back to a host matrix.
    pub fn to_host(&self) -> Result<HostMatrix> {
        let values = self
            .device
            .dtoh_sync_copy(&self.data)
            .map_err(|e| BackendError::transfer(format!("D2H copy failed: {}", e)))?;
        Ok(HostMatrix::from_vec(self.rows, self.cols, values))
    }

    /// Ordinal of the owning device.
    pub fn ordinal(&self) -> usize {
        self.device.ordinal()
    }

    pub(crate) fn reshaped(self, rows: usize, cols: usize) -> Self {
        Self { rows, cols, ..self }
    }
}

#[cfg(feature = "cuda")]
impl fmt::Debug for DeviceArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceArray")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("device", &self.device.ordinal())
            .finish()
    }
}

/// A dense array in device memory.
///
/// Cannot be constructed without the `cuda` feature.
#[cfg(not(feature = "cuda"))]
#[derive(Debug, Clone)]
pub struct DeviceArray {
    rows: usize,
    cols: usize,
    never: std::convert::Infallible,
}

#[cfg(not(feature = "cuda"))]
impl DeviceArray {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Copies the data back to a host matrix.
    pub fn to_host(&self) -> Result<HostMatrix> {
        match self.never {}
    }

    pub(crate) fn reshaped(self, _rows: usize, _cols: usize) -> Self {
        match self.never {}
    }
}

/// GPU backend implementation.
pub struct GpuBackend {
    ordinal: usize,
    #[cfg(feature = "cuda")]
    device: OnceCell<Arc<CudaDevice>>,
}

impl GpuBackend {
    /// Creates a backend for the device with the given ordinal.
    ///
    /// The device is not touched until the first operation.
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            #[cfg(feature = "cuda")]
            device: OnceCell::new(),
        }
    }

    /// Ordinal of the device this backend uses.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    #[cfg(feature = "cuda")]
    fn device(&self) -> Result<Arc<CudaDevice>> {
        self.device
            .get_or_try_init(|| {
                let ordinal = self.ordinal;
                match std::panic::catch_unwind(move || CudaDevice::new(ordinal)) {
                    Ok(Ok(device)) => {
                        info!(ordinal, "CUDA device initialised");
                        Ok(device)
                    }
                    Ok(Err(e)) => Err(BackendError::device_unavailable(e.to_string())),
                    Err(payload) => Err(BackendError::device_unavailable(panic_message(&payload))),
                }
            })
            .cloned()
    }

    #[cfg(feature = "cuda")]
    fn upload(&self, device: &Arc<CudaDevice>, array: Array) -> Result<Array> {
        match array {
            Array::Device(_) => Ok(array),
            Array::Host(m) => DeviceArray::from_host(device, &m).map(Array::Device),
        }
    }
}

impl Default for GpuBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for GpuBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("GpuBackend");
        s.field("ordinal", &self.ordinal);
        #[cfg(feature = "cuda")]
        s.field("initialised", &self.device.get().is_some());
        s.finish()
    }
}

#[cfg(feature = "cuda")]
impl ComputeBackend for GpuBackend {
    fn name(&self) -> &str {
        "gpu"
    }

    fn mode(&self) -> Mode {
        Mode::Gpu
    }

    fn array_library(&self) -> &'static str {
        "cudarc"
    }

    fn table_library(&self) -> &'static str {
        "gpuswap::Table<device>"
    }

    fn is_available(&self) -> bool {
        self.device().is_ok()
    }

    fn create_array(&self, data: ArrayInput, options: &ArrayOptions) -> Result<Array> {
        let device = self.device()?;
        match data {
            ArrayInput::Array(array @ Array::Device(_)) => match options.shape {
                Some((r, c)) => array.reshape(r, c),
                None => Ok(array),
            },
            other => {
                let host = host_matrix_from(other, options)?;
                DeviceArray::from_host(&device, &host).map(Array::Device)
            }
        }
    }

    fn create_table(&self, data: TableInput, options: &TableOptions) -> Result<Table> {
        let device = self.device()?;
        let columns = prepare_columns(data, options)?
            .into_iter()
            .map(|(name, column)| {
                let array = match column {
                    PreparedColumn::Host(v) => {
                        let host = HostMatrix::from_column_slice(v.len(), 1, v.as_slice());
                        Array::Device(DeviceArray::from_host(&device, &host)?)
                    }
                    PreparedColumn::Existing(a) => self.upload(&device, a)?,
                };
                Ok((name, array))
            })
            .collect::<Result<Vec<_>>>()?;

        Table::from_columns(columns)
    }

    fn synchronize(&self) -> Result<()> {
        match self.device.get() {
            Some(device) => device
                .synchronize()
                .map_err(|e| BackendError::Synchronize {
                    reason: e.to_string(),
                }),
            None => Ok(()),
        }
    }
}

#[cfg(not(feature = "cuda"))]
impl ComputeBackend for GpuBackend {
    fn name(&self) -> &str {
        "gpu"
    }

    fn mode(&self) -> Mode {
        Mode::Gpu
    }

    fn array_library(&self) -> &'static str {
        "cudarc"
    }

    fn table_library(&self) -> &'static str {
        "gpuswap::Table<device>"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn create_array(&self, _data: ArrayInput, _options: &ArrayOptions) -> Result<Array> {
        Err(BackendError::gpu_not_compiled())
    }

    fn create_table(&self, _data: TableInput, _options: &TableOptions) -> Result<Table> {
        Err(BackendError::gpu_not_compiled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_gpu_backend_without_support() {
        let backend = GpuBackend::default();
        assert_eq!(backend.mode(), Mode::Gpu);
        assert!(!backend.is_available());
        assert_eq!(
            backend
                .create_array(vec![1.0].into(), &ArrayOptions::default())
                .unwrap_err(),
            BackendError::gpu_not_compiled()
        );
        assert_eq!(
            backend
                .create_table(vec![("a", vec![1.0])].into(), &TableOptions::default())
                .unwrap_err(),
            BackendError::gpu_not_compiled()
        );
        assert!(backend.synchronize().is_ok());
    }

    #[test]
    fn test_gpu_backend_debug() {
        let backend = GpuBackend::new(1);
        assert_eq!(backend.ordinal(), 1);
        assert!(format!("{:?}", backend).contains("GpuBackend"));
    }

    #[test]
    fn test_host_objects_pass_through_host_copy() {
        let backend = GpuBackend::default();
        let array = Array::Host(HostMatrix::from_vec(1, 2, vec![1.0, 2.0]));
        let copied = backend.host_copy_array(array).unwrap();
        assert_eq!(copied.as_host().unwrap().as_slice(), &[1.0, 2.0]);
    }

    #[cfg(feature = "cuda")]
    #[test]
    #[ignore = "requires a CUDA device"]
    fn test_device_round_trip() {
        let backend = GpuBackend::default();
        let array = backend
            .create_array(vec![1.0, 2.0, 3.0, 4.0].into(), &ArrayOptions::with_shape(2, 2))
            .unwrap();
        assert!(array.is_device());
        backend.synchronize().unwrap();

        let host = backend.host_copy_array(array).unwrap();
        assert_eq!(
            host.as_host().unwrap(),
            &HostMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0])
        );
    }
}
