//! Dense arrays that live either in host or device memory.

use super::gpu::DeviceArray;
use crate::core::{
    error::{BackendError, Result},
    types::{Elem, HostMatrix, Mode},
};

/// Memory order of flat input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Consecutive values fill a row first
    #[default]
    RowMajor,
    /// Consecutive values fill a column first
    ColumnMajor,
}

/// Construction options, forwarded unchanged to the active backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayOptions {
    /// Target `(rows, cols)`; flat input defaults to a column vector
    pub shape: Option<(usize, usize)>,
    /// Order of flat input values
    pub layout: Layout,
}

impl ArrayOptions {
    /// Options requesting a shape.
    pub fn with_shape(rows: usize, cols: usize) -> Self {
        Self {
            shape: Some((rows, cols)),
            ..Self::default()
        }
    }

    /// Set the input layout.
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

/// Data accepted by array constructors.
#[derive(Debug, Clone)]
pub enum ArrayInput {
    /// Flat values, arranged by [`ArrayOptions::layout`]
    Flat(Vec<Elem>),
    /// Nested rows; all rows must have the same length
    Rows(Vec<Vec<Elem>>),
    /// An existing host matrix
    Matrix(HostMatrix),
    /// An existing array, host or device
    Array(Array),
}

impl From<Vec<Elem>> for ArrayInput {
    fn from(values: Vec<Elem>) -> Self {
        Self::Flat(values)
    }
}

impl From<&[Elem]> for ArrayInput {
    fn from(values: &[Elem]) -> Self {
        Self::Flat(values.to_vec())
    }
}

impl From<Vec<Vec<Elem>>> for ArrayInput {
    fn from(rows: Vec<Vec<Elem>>) -> Self {
        Self::Rows(rows)
    }
}

impl From<HostMatrix> for ArrayInput {
    fn from(matrix: HostMatrix) -> Self {
        Self::Matrix(matrix)
    }
}

impl From<Array> for ArrayInput {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

/// A dense two-dimensional array.
#[derive(Debug, Clone)]
pub enum Array {
    /// Host-resident data
    Host(HostMatrix),
    /// Device-resident data
    Device(DeviceArray),
}

impl Array {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Host(m) => m.shape(),
            Self::Device(d) => d.shape(),
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        let (r, c) = self.shape();
        r * c
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Where the data lives.
    pub fn residency(&self) -> Mode {
        match self {
            Self::Host(_) => Mode::Cpu,
            Self::Device(_) => Mode::Gpu,
        }
    }

    /// Whether the data lives in device memory.
    pub fn is_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }

    /// Borrows the host matrix, if host-resident.
    pub fn as_host(&self) -> Option<&HostMatrix> {
        match self {
            Self::Host(m) => Some(m),
            Self::Device(_) => None,
        }
    }

    /// Converts into a host matrix, copying from the device if needed.
    pub fn into_host(self) -> Result<HostMatrix> {
        match self {
            Self::Host(m) => Ok(m),
            Self::Device(d) => d.to_host(),
        }
    }

    /// Reinterprets the column-major storage with a new shape.
    pub fn reshape(self, rows: usize, cols: usize) -> Result<Self> {
        if self.shape() == (rows, cols) {
            return Ok(self);
        }
        check_len(rows, cols, self.len())?;
        match self {
            Self::Host(m) => Ok(Self::Host(m.reshape_generic(
                nalgebra::Dyn(rows),
                nalgebra::Dyn(cols),
            ))),
            Self::Device(d) => Ok(Self::Device(d.reshaped(rows, cols))),
        }
    }
}

fn check_len(rows: usize, cols: usize, len: usize) -> Result<()> {
    match rows.checked_mul(cols) {
        Some(expected) if expected == len => Ok(()),
        Some(expected) => Err(BackendError::shape_mismatch(
            format!("{} elements for shape ({}, {})", expected, rows, cols),
            format!("{} elements", len),
        )),
        None => Err(BackendError::shape_mismatch(
            format!("shape ({}, {}) with an addressable element count", rows, cols),
            format!("{} elements", len),
        )),
    }
}

/// Builds a host matrix from raw (non-array) input.
pub(crate) fn host_matrix_from(input: ArrayInput, options: &ArrayOptions) -> Result<HostMatrix> {
    match input {
        ArrayInput::Flat(values) => {
            let (rows, cols) = options.shape.unwrap_or((values.len(), 1));
            check_len(rows, cols, values.len())?;
            Ok(match options.layout {
                Layout::RowMajor => HostMatrix::from_row_slice(rows, cols, &values),
                Layout::ColumnMajor => HostMatrix::from_vec(rows, cols, values),
            })
        }
        ArrayInput::Rows(rows) => {
            let nrows = rows.len();
            let ncols = rows.first().map_or(0, Vec::len);
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
                return Err(BackendError::invalid_input(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    ncols
                )));
            }
            let flat: Vec<Elem> = rows.into_iter().flatten().collect();
            let (r, c) = options.shape.unwrap_or((nrows, ncols));
            check_len(r, c, flat.len())?;
            Ok(HostMatrix::from_row_slice(r, c, &flat))
        }
        ArrayInput::Matrix(m) => match options.shape {
            Some((r, c)) => Array::Host(m).reshape(r, c)?.into_host(),
            None => Ok(m),
        },
        ArrayInput::Array(a) => {
            let a = match options.shape {
                Some((r, c)) => a.reshape(r, c)?,
                None => a,
            };
            a.into_host()
        }
    }
}
