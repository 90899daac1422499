//! Row filtering for the visualization view.
//!
//! A [`FilterSpec`] maps column names to predicates. Applying it keeps the
//! rows that satisfy every applicable predicate and returns a new dataset;
//! the source is never modified.
//!
//! Predicates that cannot apply (unknown column, wrong column kind) are
//! skipped with a warning instead of failing the whole filter. Which columns
//! are offered for filtering at all is decided once, against the unfiltered
//! dataset, by [`FilterOptions`]; applying a spec never re-decides it, so a
//! filtered dataset filters to itself.

mod options;

pub use options::{CategoricalChoices, FilterOptions, NumericRange};

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::{ColumnMeta, Dataset};
use crate::error::Result;
use crate::utils::{ColumnKind, numeric_values};

/// Categorical columns with more distinct values than this are not offered
/// as filters.
pub const MAX_CATEGORICAL_OPTIONS: usize = 20;

/// A condition on a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Keep rows with `min <= value <= max`. Nulls are dropped.
    Range { min: f64, max: f64 },
    /// Keep rows whose value is in the set. An empty set keeps every row.
    OneOf { values: BTreeSet<String> },
}

impl Predicate {
    pub fn range(min: f64, max: f64) -> Self {
        Predicate::Range { min, max }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Column predicates combined with AND.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    predicates: BTreeMap<String, Predicate>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inclusive numeric range on `column`, replacing any previous predicate.
    pub fn range(mut self, column: impl Into<String>, min: f64, max: f64) -> Self {
        self.predicates
            .insert(column.into(), Predicate::range(min, max));
        self
    }

    /// Add a membership predicate on `column`, replacing any previous predicate.
    pub fn one_of<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates
            .insert(column.into(), Predicate::one_of(values));
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, predicate: Predicate) {
        self.predicates.insert(column.into(), predicate);
    }

    pub fn get(&self, column: &str) -> Option<&Predicate> {
        self.predicates.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates.iter().map(|(c, p)| (c.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Result of applying a [`FilterSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredDataset {
    dataset: Dataset,
    source_rows: usize,
}

impl FilteredDataset {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// No row satisfied the predicates.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Rows left after filtering.
    pub fn height(&self) -> usize {
        self.dataset.height()
    }

    /// Rows removed by the predicates.
    pub fn excluded_rows(&self) -> usize {
        self.source_rows - self.dataset.height()
    }
}

impl AsRef<Dataset> for FilteredDataset {
    fn as_ref(&self) -> &Dataset {
        &self.dataset
    }
}

/// Apply every predicate of `spec` to `dataset`.
pub fn apply_filters(dataset: &Dataset, spec: &FilterSpec) -> Result<FilteredDataset> {
    let height = dataset.height();
    let mut keep = vec![true; height];

    for (column, predicate) in spec.iter() {
        let Some(meta) = dataset.column(column) else {
            warn!("Ignoring filter on unknown column '{}'", column);
            continue;
        };

        match predicate {
            Predicate::Range { min, max } => {
                apply_range(dataset, meta, *min, *max, &mut keep)?;
            }
            Predicate::OneOf { values } => {
                apply_membership(dataset, meta, values, &mut keep)?;
            }
        }
    }

    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    let frame = dataset.frame().filter(&mask)?;

    debug!(
        "Applied {} filter(s): {} of {} rows kept",
        spec.len(),
        frame.height(),
        height
    );

    Ok(FilteredDataset {
        dataset: dataset.derive(frame),
        source_rows: height,
    })
}

fn apply_range(
    dataset: &Dataset,
    meta: &ColumnMeta,
    min: f64,
    max: f64,
    keep: &mut [bool],
) -> Result<()> {
    if !meta.kind.is_numeric() {
        warn!(
            "Ignoring range filter on non-numeric column '{}' ({})",
            meta.name, meta.kind
        );
        return Ok(());
    }

    let series = dataset.series(&meta.name)?;
    if is_constant(series)? {
        debug!("Range filter on constant column '{}' has no effect", meta.name);
        return Ok(());
    }

    let floats = series.cast(&DataType::Float64)?;
    for (slot, value) in keep.iter_mut().zip(floats.f64()?.into_iter()) {
        *slot &= value.is_some_and(|v| v >= min && v <= max);
    }
    Ok(())
}

fn apply_membership(
    dataset: &Dataset,
    meta: &ColumnMeta,
    values: &BTreeSet<String>,
    keep: &mut [bool],
) -> Result<()> {
    if meta.kind != ColumnKind::Text {
        warn!(
            "Ignoring membership filter on non-text column '{}' ({})",
            meta.name, meta.kind
        );
        return Ok(());
    }

    // an empty selection means no filter
    if values.is_empty() {
        return Ok(());
    }

    let text = dataset.series(&meta.name)?.cast(&DataType::String)?;
    for (slot, value) in keep.iter_mut().zip(text.str()?.into_iter()) {
        *slot &= value.is_some_and(|v| values.contains(v));
    }
    Ok(())
}

/// True when the column has no spread to filter on.
fn is_constant(series: &Series) -> Result<bool> {
    let values = numeric_values(series)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(values.is_empty() || min == max)
}
