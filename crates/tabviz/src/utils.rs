//! Shared utilities for the inspection and charting core.
//!
//! This module contains helpers used across multiple modules: column kind
//! detection, string parsing, value conversion and small numeric helpers.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

// =============================================================================
// Column Kinds
// =============================================================================

/// Semantic type of a column, fixed when a dataset is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Signed or unsigned integers
    Integer,
    /// Floating point numbers
    Float,
    /// String or categorical text
    Text,
    /// Date or datetime values
    Timestamp,
    /// Boolean values
    Boolean,
    /// Anything else (lists, structs, durations, ...)
    Other,
}

impl ColumnKind {
    /// Integer and float columns.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Text columns are the categorical partition.
    pub fn is_categorical(self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_integer_dtype(dtype) {
        ColumnKind::Integer
    } else if is_float_dtype(dtype) {
        ColumnKind::Float
    } else if is_datetime_dtype(dtype) {
        ColumnKind::Timestamp
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        ColumnKind::Text
    } else {
        ColumnKind::Other
    }
}

// =============================================================================
// String Utilities
// =============================================================================

/// Parse a text value the way a strict numeric coercion would.
///
/// Surrounding whitespace is ignored; thousands separators, currency symbols
/// and percent signs are not accepted.
pub fn parse_plain_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Turn a column name into an axis title: `customer_count` -> `Customer Count`.
///
/// Underscores become spaces. A letter is upper-cased when it follows a
/// non-letter (start, space, digit, punctuation) and lower-cased otherwise,
/// so `col2name` becomes `Col2Name`.
pub fn axis_title(column: &str) -> String {
    let mut title = String::with_capacity(column.len());
    let mut after_letter = false;
    for c in column.chars() {
        if c == '_' {
            title.push(' ');
            after_letter = false;
        } else if c.is_alphabetic() {
            if after_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            title.push(c);
            after_letter = false;
        }
    }
    title
}

// =============================================================================
// Value Conversion
// =============================================================================

/// Convert a polars cell to a JSON value.
///
/// Numbers stay numbers (NaN/Infinity become null), text stays text and
/// temporal values are rendered with their display form.
pub fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(i) => Value::Number(i.into()),
        AnyValue::Int16(i) => Value::Number(i.into()),
        AnyValue::Int32(i) => Value::Number(i.into()),
        AnyValue::Int64(i) => Value::Number(i.into()),
        AnyValue::UInt8(u) => Value::Number(u.into()),
        AnyValue::UInt16(u) => Value::Number(u.into()),
        AnyValue::UInt32(u) => Value::Number(u.into()),
        AnyValue::UInt64(u) => Value::Number(u.into()),
        AnyValue::Float32(f) => Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        other => Value::String(any_value_label(&other)),
    }
}

/// Display form of a cell without the quotes polars puts around strings.
pub fn any_value_label(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => format!("{}", other),
    }
}

/// Collect the non-null values of a numeric series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().flatten().collect())
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Tests
// =============================================================================
