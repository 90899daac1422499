//! Filter controls offered for a dataset.
//!
//! Computing the options is separate from rendering widgets: the shell asks
//! for [`FilterOptions`], draws its controls, and turns the user's choices
//! into a [`FilterSpec`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FilterSpec, MAX_CATEGORICAL_OPTIONS};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::utils::numeric_values;

/// Slider bounds for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
    /// One hundredth of the observed spread.
    pub step: f64,
}

/// Selectable values of a low-cardinality text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalChoices {
    pub column: String,
    /// Distinct non-null values in first-seen order.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub numeric: Vec<NumericRange>,
    pub categorical: Vec<CategoricalChoices>,
}

impl FilterOptions {
    /// Compute the filter controls for `dataset`.
    ///
    /// Numeric columns without spread (all null, or min equal to max) are
    /// left out, as are text columns with more than
    /// [`MAX_CATEGORICAL_OPTIONS`] distinct values.
    pub fn for_dataset(dataset: &Dataset) -> Result<Self> {
        let mut numeric = Vec::new();
        for meta in dataset.numeric_columns() {
            let values = numeric_values(dataset.series(&meta.name)?)?;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if values.is_empty() || min == max {
                continue;
            }
            numeric.push(NumericRange {
                column: meta.name.clone(),
                min,
                max,
                step: (max - min) / 100.0,
            });
        }

        let mut categorical = Vec::new();
        for meta in dataset.categorical_columns() {
            if let Some(values) = distinct_values(dataset, &meta.name)? {
                categorical.push(CategoricalChoices {
                    column: meta.name.clone(),
                    values,
                });
            }
        }

        debug!(
            "Filter options: {} numeric, {} categorical",
            numeric.len(),
            categorical.len()
        );

        Ok(Self {
            numeric,
            categorical,
        })
    }

    pub fn numeric_range(&self, column: &str) -> Option<&NumericRange> {
        self.numeric.iter().find(|r| r.column == column)
    }

    pub fn categorical_choices(&self, column: &str) -> Option<&CategoricalChoices> {
        self.categorical.iter().find(|c| c.column == column)
    }

    /// The spec matching the controls' initial state: full ranges and every
    /// value selected. Applying it keeps all non-null rows.
    pub fn default_spec(&self) -> FilterSpec {
        let spec = self
            .numeric
            .iter()
            .fold(FilterSpec::new(), |spec, r| spec.range(&r.column, r.min, r.max));
        self.categorical
            .iter()
            .fold(spec, |spec, c| spec.one_of(&c.column, c.values.iter().cloned()))
    }
}

/// Distinct values in first-seen order, or `None` past the cardinality cap.
fn distinct_values(dataset: &Dataset, column: &str) -> Result<Option<Vec<String>>> {
    let text = dataset
        .series(column)?
        .cast(&polars::prelude::DataType::String)?;

    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for value in text.str()?.into_iter().flatten() {
        if seen.insert(value) {
            if values.len() == MAX_CATEGORICAL_OPTIONS {
                return Ok(None);
            }
            values.push(value.to_string());
        }
    }
    Ok(Some(values))
}
