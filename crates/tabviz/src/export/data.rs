use polars::prelude::*;
use serde_json::{Map, Value, json};

use super::ExportFormat;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::profiler::DataProfiler;
use crate::quality::DataQualityAnalyzer;
use crate::utils::any_value_to_json;

/// CSV with a header row and no index column.
pub fn to_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut frame = dataset.frame().clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)
        .map_err(|e| DashboardError::export(ExportFormat::Csv, e))?;
    Ok(buffer)
}

/// An array of one object per row, pretty-printed with two-space indents.
pub fn to_json_records(dataset: &Dataset) -> Result<String> {
    records(dataset)
        .and_then(|rows| Ok(serde_json::to_string_pretty(&rows)?))
        .map_err(|e| DashboardError::export(ExportFormat::Json, e))
}

fn records(dataset: &Dataset) -> Result<Vec<Value>> {
    let columns: Vec<&Series> = dataset
        .column_names()
        .into_iter()
        .map(|name| dataset.series(name))
        .collect::<Result<_>>()?;

    (0..dataset.height())
        .map(|row| {
            let mut record = Map::with_capacity(columns.len());
            for series in &columns {
                record.insert(series.name().to_string(), any_value_to_json(series.get(row)?));
            }
            Ok(Value::Object(record))
        })
        .collect()
}

/// Overview, dtypes, missing counts and numeric statistics as one document.
pub fn summary_json(dataset: &Dataset) -> Result<String> {
    summary_value(dataset)
        .and_then(|value| Ok(serde_json::to_string_pretty(&value)?))
        .map_err(|e| DashboardError::export(ExportFormat::SummaryJson, e))
}

fn summary_value(dataset: &Dataset) -> Result<Value> {
    let report = DataQualityAnalyzer::analyze(dataset)?;
    let summary = DataProfiler::summarize(dataset)?;

    let columns: Map<String, Value> = dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), Value::String(c.dtype.clone())))
        .collect();

    let missing: Map<String, Value> = report
        .columns
        .iter()
        .map(|c| (c.name.clone(), json!(c.null_count)))
        .collect();

    let numeric: Map<String, Value> = summary
        .numeric
        .iter()
        .map(|stats| {
            serde_json::to_value(stats).map(|mut value| {
                if let Value::Object(fields) = &mut value {
                    fields.remove("column");
                }
                (stats.column.clone(), value)
            })
        })
        .collect::<std::result::Result<_, _>>()?;

    Ok(json!({
        "overview": report.overview,
        "columns": columns,
        "missing_values": missing,
        "numeric_summary": numeric,
    }))
}
