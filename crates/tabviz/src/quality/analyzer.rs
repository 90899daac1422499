use polars::prelude::*;
use tracing::debug;

use crate::dataset::{ColumnMeta, Dataset};
use crate::error::Result;
use crate::types::{ColumnQuality, DatasetOverview, MissingValueEntry, QualityReport};
use crate::utils::{ColumnKind, parse_plain_number, round_to};

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Compute the quality report of a dataset.
    ///
    /// Pure scan over every cell: O(rows x columns).
    pub fn analyze(dataset: &Dataset) -> Result<QualityReport> {
        let frame = dataset.frame();
        let height = frame.height();

        let columns = dataset
            .columns()
            .iter()
            .map(|meta| Self::column_quality(dataset, meta, height))
            .collect::<Result<Vec<_>>>()?;

        let missing_values: Vec<MissingValueEntry> = columns
            .iter()
            .filter(|c| c.null_count > 0)
            .map(|c| MissingValueEntry {
                column: c.name.clone(),
                missing_count: c.null_count,
                missing_percentage: c.missing_percentage,
            })
            .collect();

        let overview = DatasetOverview {
            total_rows: height,
            total_columns: dataset.width(),
            memory_usage_kb: frame.estimated_size() as f64 / 1024.0,
            missing_values: columns.iter().map(|c| c.null_count).sum(),
        };

        let duplicate_rows = count_duplicate_rows(frame)?;
        let duplicate_percentage = if height > 0 {
            round_to(duplicate_rows as f64 / height as f64 * 100.0, 2)
        } else {
            0.0
        };

        let mut numeric_text_columns = Vec::new();
        for meta in dataset.columns() {
            if meta.kind == ColumnKind::Text && Self::is_numeric_text(dataset.series(&meta.name)?)? {
                numeric_text_columns.push(meta.name.clone());
            }
        }

        debug!(
            "Quality report: {} missing values, {} duplicate rows, {} numeric text columns",
            overview.missing_values,
            duplicate_rows,
            numeric_text_columns.len()
        );

        Ok(QualityReport {
            overview,
            columns,
            missing_values,
            duplicate_rows,
            duplicate_percentage,
            numeric_text_columns,
        })
    }

    fn column_quality(dataset: &Dataset, meta: &ColumnMeta, height: usize) -> Result<ColumnQuality> {
        let series = dataset.series(&meta.name)?;
        let null_count = series.null_count();
        let unique_count = series.drop_nulls().n_unique()?;
        let missing_percentage = if height > 0 {
            round_to(null_count as f64 / height as f64 * 100.0, 2)
        } else {
            0.0
        };

        Ok(ColumnQuality {
            name: meta.name.clone(),
            kind: meta.kind,
            dtype: meta.dtype.clone(),
            non_null_count: height - null_count,
            null_count,
            unique_count,
            missing_percentage,
        })
    }

    /// A text column is numeric-like when every non-null value coerces.
    ///
    /// One failing value excludes the whole column; a column with no
    /// non-null values is not flagged.
    fn is_numeric_text(series: &Series) -> Result<bool> {
        let text = series.cast(&DataType::String)?;
        let mut seen_any = false;
        for value in text.str()?.into_iter().flatten() {
            if parse_plain_number(value).is_none() {
                return Ok(false);
            }
            seen_any = true;
        }
        Ok(seen_any)
    }
}

/// Count rows identical to an earlier row across every column.
pub fn count_duplicate_rows(frame: &DataFrame) -> Result<usize> {
    if frame.width() == 0 || frame.height() == 0 {
        return Ok(0);
    }
    let unique = frame.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?;
    Ok(frame.height() - unique.height())
}
