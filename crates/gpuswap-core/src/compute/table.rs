//! Columnar tables of named `f64` columns.
//!
//! Each column is an [`Array`] of shape `(nrows, 1)`. A table built by one
//! backend keeps all of its columns in the same memory space.

use super::array::Array;
use crate::core::{
    error::{BackendError, Result},
    types::{Elem, HostMatrix, HostVector, Mode},
};
use rayon::prelude::*;
use std::collections::HashSet;

/// Record inputs with at least this many cells are transposed in parallel.
const PARALLEL_TRANSPOSE_THRESHOLD: usize = 1 << 16;

/// Construction options, forwarded unchanged to the active backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Columns to keep, in output order; all columns when `None`
    pub columns: Option<Vec<String>>,
}

impl TableOptions {
    /// Options selecting a subset of columns.
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }
}

/// Data accepted by table constructors.
#[derive(Debug, Clone)]
pub enum TableInput {
    /// Named columns
    Columns(Vec<(String, Vec<Elem>)>),
    /// Row records with a header
    Records {
        /// Column names
        columns: Vec<String>,
        /// One entry per row, one value per column
        rows: Vec<Vec<Elem>>,
    },
    /// An existing table, host or device
    Table(Table),
}

impl From<Vec<(String, Vec<Elem>)>> for TableInput {
    fn from(columns: Vec<(String, Vec<Elem>)>) -> Self {
        Self::Columns(columns)
    }
}

impl From<Vec<(&str, Vec<Elem>)>> for TableInput {
    fn from(columns: Vec<(&str, Vec<Elem>)>) -> Self {
        Self::Columns(
            columns
                .into_iter()
                .map(|(name, values)| (name.to_string(), values))
                .collect(),
        )
    }
}

impl From<Table> for TableInput {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl TableInput {
    /// Builds records input from a header and rows.
    pub fn records<I, S>(columns: I, rows: Vec<Vec<Elem>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Records {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }
}

/// A table of equally long named columns.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<(String, Array)>,
    nrows: usize,
}

impl Table {
    /// Assembles a table from validated columns.
    pub(crate) fn from_columns(columns: Vec<(String, Array)>) -> Result<Self> {
        let nrows = validate_columns(&columns, |a| a.len())?;
        Ok(Self { columns, nrows })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Array> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Iterates over `(name, column)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Array)> {
        self.columns.iter().map(|(n, a)| (n.as_str(), a))
    }

    /// Where the data lives. An empty table counts as host-resident.
    pub fn residency(&self) -> Mode {
        if self.is_device() {
            Mode::Gpu
        } else {
            Mode::Cpu
        }
    }

    /// Whether any column lives in device memory.
    pub fn is_device(&self) -> bool {
        self.columns.iter().any(|(_, a)| a.is_device())
    }

    /// Copies every device column to host memory.
    pub fn into_host(self) -> Result<Self> {
        if !self.is_device() {
            return Ok(self);
        }
        let columns = self
            .columns
            .into_iter()
            .map(|(name, a)| Ok((name, Array::Host(a.into_host()?))))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns,
            nrows: self.nrows,
        })
    }

    /// Host column values, if the column exists and is host-resident.
    pub fn host_column(&self, name: &str) -> Option<&[Elem]> {
        self.column(name)
            .and_then(Array::as_host)
            .map(|m| m.as_slice())
    }

    pub(crate) fn into_columns(self) -> Vec<(String, Array)> {
        self.columns
    }
}

/// Checks names are unique and lengths agree; returns the row count.
fn validate_columns<C>(columns: &[(String, C)], len: impl Fn(&C) -> usize) -> Result<usize> {
    let mut seen = HashSet::with_capacity(columns.len());
    let mut nrows = None;

    for (name, column) in columns {
        if !seen.insert(name.as_str()) {
            return Err(BackendError::DuplicateColumn {
                column: name.clone(),
            });
        }
        let n = len(column);
        match nrows {
            None => nrows = Some(n),
            Some(expected) if expected != n => {
                return Err(BackendError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: n,
                });
            }
            Some(_) => {}
        }
    }

    Ok(nrows.unwrap_or(0))
}

/// Keeps the requested columns in the requested order.
pub(crate) fn select_columns<C>(
    mut columns: Vec<(String, C)>,
    selection: Option<&[String]>,
) -> Result<Vec<(String, C)>> {
    let Some(selection) = selection else {
        return Ok(columns);
    };

    let mut seen = HashSet::with_capacity(selection.len());
    let mut out = Vec::with_capacity(selection.len());
    for wanted in selection {
        if !seen.insert(wanted.as_str()) {
            return Err(BackendError::DuplicateColumn {
                column: wanted.clone(),
            });
        }
        let pos = columns
            .iter()
            .position(|(n, _)| n == wanted)
            .ok_or_else(|| BackendError::UnknownColumn {
                column: wanted.clone(),
            })?;
        out.push(columns.swap_remove(pos));
    }
    Ok(out)
}

/// Source columns of a table input, before placement by a backend.
pub(crate) enum PreparedColumn {
    Host(HostVector),
    Existing(Array),
}

impl PreparedColumn {
    fn len(&self) -> usize {
        match self {
            Self::Host(v) => v.len(),
            Self::Existing(a) => a.len(),
        }
    }
}

/// Validates and selects table input columns.
pub(crate) fn prepare_columns(
    input: TableInput,
    options: &TableOptions,
) -> Result<Vec<(String, PreparedColumn)>> {
    let columns: Vec<(String, PreparedColumn)> = match input {
        TableInput::Columns(columns) => columns
            .into_iter()
            .map(|(name, values)| (name, PreparedColumn::Host(HostVector::from_vec(values))))
            .collect(),
        TableInput::Records { columns, rows } => {
            let ncols = columns.len();
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
                return Err(BackendError::invalid_input(format!(
                    "record {} has {} values, expected {}",
                    i,
                    row.len(),
                    ncols
                )));
            }
            let values = transpose_records(&rows, ncols);
            columns
                .into_iter()
                .zip(values)
                .map(|(name, v)| (name, PreparedColumn::Host(HostVector::from_vec(v))))
                .collect()
        }
        TableInput::Table(table) => table
            .into_columns()
            .into_iter()
            .map(|(name, a)| (name, PreparedColumn::Existing(a)))
            .collect(),
    };

    validate_columns(&columns, PreparedColumn::len)?;
    select_columns(columns, options.columns.as_deref())
}

fn transpose_records(rows: &[Vec<Elem>], ncols: usize) -> Vec<Vec<Elem>> {
    let gather = |c: usize| rows.iter().map(|r| r[c]).collect::<Vec<_>>();
    if rows.len() * ncols < PARALLEL_TRANSPOSE_THRESHOLD {
        (0..ncols).map(gather).collect()
    } else {
        (0..ncols).into_par_iter().map(gather).collect()
    }
}

/// Host column as an `(n, 1)` array.
pub(crate) fn host_column_array(values: HostVector) -> Array {
    Array::Host(HostMatrix::from_column_slice(values.len(), 1, values.as_slice()))
}
