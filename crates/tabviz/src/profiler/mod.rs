//! Descriptive statistics for a dataset.
//!
//! Columns are partitioned by their schema kind: integer and float columns
//! get `describe()`-style statistics, text columns get cardinality and mode.
//! Other kinds (timestamps, booleans) are left out of both tables.

mod statistics;

use polars::prelude::*;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::StatisticalSummary;

use statistics::{describe_categorical, describe_numeric};

/// Computes [`StatisticalSummary`] values.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize every numeric and categorical column.
    ///
    /// An empty partition yields an empty table, never an error.
    pub fn summarize(dataset: &Dataset) -> Result<StatisticalSummary> {
        let numeric = dataset
            .numeric_columns()
            .iter()
            .map(|meta| describe_numeric(dataset.series(&meta.name)?))
            .collect::<Result<Vec<_>>>()?;

        let categorical = dataset
            .categorical_columns()
            .iter()
            .map(|meta| describe_categorical(dataset.series(&meta.name)?))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Statistical summary: {} numeric, {} categorical columns",
            numeric.len(),
            categorical.len()
        );

        Ok(StatisticalSummary {
            numeric,
            categorical,
        })
    }

    /// Observed (min, max) of a numeric column, ignoring nulls.
    pub fn numeric_range(series: &Series) -> Result<Option<(f64, f64)>> {
        let stats = describe_numeric(series)?;
        Ok(stats.min.zip(stats.max))
    }
}
