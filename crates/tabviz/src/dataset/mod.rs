//! The in-memory dataset at the center of the core.
//!
//! A [`Dataset`] wraps a polars [`DataFrame`] together with a fixed column
//! schema. Each column's [`ColumnKind`] is decided once, when the dataset is
//! constructed, and every later component reads it from the schema instead
//! of re-sniffing values.
//!
//! Datasets are immutable: filtering and previewing produce new values.

mod loader;
mod preview;
mod sample;

pub use loader::{DatasetLoader, FileFormat};
pub use preview::{PreviewMode, preview};
pub use sample::{SAMPLE_ROWS, SAMPLE_SEED, generate_sample_dataset};

use crate::error::{DashboardError, Result};
use crate::utils::{ColumnKind, column_kind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Schema entry for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
    /// Polars data type as string ("Int64", "String", ...).
    pub dtype: String,
}

/// An immutable tabular dataset with a typed column schema.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    columns: Vec<ColumnMeta>,
}

static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    /// Wrap a frame, deriving the column schema from its dtypes.
    pub fn new(frame: DataFrame) -> Self {
        let columns = frame
            .get_columns()
            .iter()
            .map(|col| ColumnMeta {
                name: col.name().to_string(),
                kind: column_kind(col.dtype()),
                dtype: format!("{:?}", col.dtype()),
            })
            .collect();

        Self { frame, columns }
    }

    /// Build a dataset with the same schema over a row subset of this one.
    pub(crate) fn derive(&self, frame: DataFrame) -> Self {
        debug_assert_eq!(frame.width(), self.columns.len());
        Self {
            frame,
            columns: self.columns.clone(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the dataset, returning the underlying frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up the schema entry of a column.
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The column kind, if the column exists.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|c| c.kind)
    }

    /// Numeric (integer or float) columns, in display order.
    pub fn numeric_columns(&self) -> Vec<&ColumnMeta> {
        self.columns.iter().filter(|c| c.kind.is_numeric()).collect()
    }

    /// Categorical (text) columns, in display order.
    pub fn categorical_columns(&self) -> Vec<&ColumnMeta> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_categorical())
            .collect()
    }

    /// Borrow a column's values as a series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        if !self.has_column(name) {
            return Err(DashboardError::ColumnNotFound(name.to_string()));
        }
        Ok(self.frame.column(name)?.as_materialized_series())
    }
}

/// Datasets are equal when they hold the same columns, types and values.
impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.frame.equals_missing(&other.frame)
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
