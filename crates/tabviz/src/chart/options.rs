use serde::{Deserialize, Serialize};

use super::{ChartKind, ChartSpec};
use crate::dataset::Dataset;

/// Column choices for the chart configuration controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartOptions {
    pub kinds: Vec<ChartKind>,
    /// Every column.
    pub x_columns: Vec<String>,
    /// Numeric columns; empty when the dataset has none.
    pub y_columns: Vec<String>,
    /// Every column; choosing none is also allowed.
    pub color_columns: Vec<String>,
    /// Numeric columns; offered for scatter plots only.
    pub size_columns: Vec<String>,
}

impl ChartOptions {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let all: Vec<String> = dataset
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let numeric: Vec<String> = dataset
            .numeric_columns()
            .into_iter()
            .map(|c| c.name.clone())
            .collect();

        Self {
            kinds: ChartKind::ALL.to_vec(),
            x_columns: all.clone(),
            y_columns: numeric.clone(),
            color_columns: all,
            size_columns: numeric,
        }
    }

    /// Size columns offered for `kind`.
    pub fn size_columns_for(&self, kind: ChartKind) -> &[String] {
        if kind.supports_size() {
            &self.size_columns
        } else {
            &[]
        }
    }

    /// The initial selection: first x column against first y column.
    pub fn default_spec(&self, kind: ChartKind) -> Option<ChartSpec> {
        let x = self.x_columns.first()?;
        let y = self.y_columns.first()?;
        Some(ChartSpec::new(kind, x, y))
    }
}
