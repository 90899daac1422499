use serde::{Deserialize, Serialize};

use crate::utils::ColumnKind;

// ============================================================================
// Quality Report Types
// ============================================================================

/// Headline numbers for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Estimated in-memory footprint in kilobytes.
    pub memory_usage_kb: f64,
    /// Sum of null counts over every column.
    pub missing_values: usize,
}

/// Per-column completeness and cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub name: String,
    pub kind: ColumnKind,
    pub dtype: String,
    pub non_null_count: usize,
    pub null_count: usize,
    /// Distinct non-null values.
    pub unique_count: usize,
    /// Share of rows that are null, 0-100, two decimals.
    pub missing_percentage: f64,
}

/// One row of the missing-value breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueEntry {
    pub column: String,
    pub missing_count: usize,
    pub missing_percentage: f64,
}

/// Read-only diagnostics about a dataset's completeness and consistency.
///
/// Computed on demand from a dataset and discarded after display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overview: DatasetOverview,
    pub columns: Vec<ColumnQuality>,
    /// Only columns with at least one null, in column order.
    pub missing_values: Vec<MissingValueEntry>,
    /// Rows identical to an earlier row across all columns.
    pub duplicate_rows: usize,
    pub duplicate_percentage: f64,
    /// Text columns whose every non-null value parses as a number.
    pub numeric_text_columns: Vec<String>,
}

impl QualityReport {
    pub fn has_missing_values(&self) -> bool {
        self.overview.missing_values > 0
    }

    pub fn has_duplicates(&self) -> bool {
        self.duplicate_rows > 0
    }

    /// Look up the quality entry of a column.
    pub fn column(&self, name: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Human-readable data type findings.
    pub fn type_issues(&self) -> Vec<String> {
        self.numeric_text_columns
            .iter()
            .map(|col| format!("Column '{}' contains numeric data but is stored as text", col))
            .collect()
    }
}

// ============================================================================
// Statistical Summary Types
// ============================================================================

/// Descriptive statistics of one numeric column.
///
/// Statistics other than `count` are `None` when the column has no
/// non-null values; `std` is also `None` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Cardinality and mode of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumnStats {
    pub column: String,
    pub unique_values: usize,
    /// Ties go to the value encountered first.
    pub most_frequent: Option<String>,
    pub frequency: usize,
}

/// Descriptive statistics for the numeric and categorical partitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub numeric: Vec<NumericColumnStats>,
    pub categorical: Vec<CategoricalColumnStats>,
}

impl StatisticalSummary {
    pub fn numeric_column(&self, name: &str) -> Option<&NumericColumnStats> {
        self.numeric.iter().find(|s| s.column == name)
    }

    pub fn categorical_column(&self, name: &str) -> Option<&CategoricalColumnStats> {
        self.categorical.iter().find(|s| s.column == name)
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }
}
