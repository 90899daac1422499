//! Serialization of datasets and charts into downloadable payloads.
//!
//! Datasets export to CSV, JSON records, or a summary JSON document;
//! charts export to PNG, SVG or a standalone HTML page. Every failure is
//! reported as [`DashboardError::Export`] naming the format.

mod data;
mod html;
mod render;

pub use data::{summary_json, to_csv, to_json_records};
pub use html::{PLOTLY_CDN, chart_to_html, plotly_figure};
pub use render::{PNG_HEIGHT, PNG_WIDTH, SVG_WIDTH, chart_to_png, chart_to_svg};

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chart::{Chart, ChartKind};
use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};

/// Output formats for datasets and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Json,
    SummaryJson,
    Png,
    Svg,
    Html,
}

impl ExportFormat {
    pub const DATASET: [Self; 3] = [Self::Csv, Self::Json, Self::SummaryJson];
    pub const CHART: [Self; 3] = [Self::Png, Self::Svg, Self::Html];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::SummaryJson => "json",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json | Self::SummaryJson => "application/json",
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Html => "text/html",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::SummaryJson => "summary JSON",
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Html => "HTML",
        }
    }

    pub fn is_chart_format(self) -> bool {
        Self::CHART.contains(&self)
    }

    /// Download name for a dataset export.
    pub fn dataset_file_name(self) -> String {
        match self {
            Self::SummaryJson => "data_summary.json".to_string(),
            other => format!("analyzed_data.{}", other.extension()),
        }
    }

    /// Download name for a chart export, e.g. `chart_bar_chart.png`.
    pub fn chart_file_name(self, kind: ChartKind) -> String {
        format!("chart_{}.{}", kind.slug(), self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    fn new(format: ExportFormat, file_name: String, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name,
            mime_type: format.mime_type(),
            bytes,
        }
    }

    /// Write the payload into `dir` under its file name.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes).map_err(|e| DashboardError::export(self.format, e))?;
        Ok(path)
    }
}

/// Produces export payloads with the configured accent colour.
#[derive(Debug, Clone)]
pub struct Exporter {
    accent: (u8, u8, u8),
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(&DashboardConfig::default())
    }
}

impl Exporter {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            accent: config.accent_rgb(),
        }
    }

    /// Serialize a dataset as CSV, JSON records or summary JSON.
    pub fn export_dataset(&self, dataset: &Dataset, format: ExportFormat) -> Result<ExportPayload> {
        let bytes = match format {
            ExportFormat::Csv => to_csv(dataset)?,
            ExportFormat::Json => to_json_records(dataset)?.into_bytes(),
            ExportFormat::SummaryJson => summary_json(dataset)?.into_bytes(),
            other => {
                return Err(DashboardError::export(other, "not a dataset export format"));
            }
        };

        info!("Exported dataset as {} ({} bytes)", format, bytes.len());
        Ok(ExportPayload::new(format, format.dataset_file_name(), bytes))
    }

    /// Render a chart as PNG, SVG or HTML.
    pub fn export_chart(&self, chart: &Chart, format: ExportFormat) -> Result<ExportPayload> {
        let bytes = match format {
            ExportFormat::Png => chart_to_png(chart, self.accent)?,
            ExportFormat::Svg => chart_to_svg(chart, self.accent)?.into_bytes(),
            ExportFormat::Html => chart_to_html(chart)?.into_bytes(),
            other => {
                return Err(DashboardError::export(other, "not a chart export format"));
            }
        };

        info!("Exported {} as {} ({} bytes)", chart.kind, format, bytes.len());
        Ok(ExportPayload::new(
            format,
            format.chart_file_name(chart.kind),
            bytes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartBuilder, ChartSpec};
    use crate::dataset::generate_sample_dataset;

    #[test]
    fn test_file_names() {
        assert_eq!(ExportFormat::Csv.dataset_file_name(), "analyzed_data.csv");
        assert_eq!(ExportFormat::Json.dataset_file_name(), "analyzed_data.json");
        assert_eq!(
            ExportFormat::SummaryJson.dataset_file_name(),
            "data_summary.json"
        );
        assert_eq!(
            ExportFormat::Png.chart_file_name(ChartKind::Bar),
            "chart_bar_chart.png"
        );
        assert_eq!(
            ExportFormat::Svg.chart_file_name(ChartKind::Scatter),
            "chart_scatter_plot.svg"
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
        assert_eq!(ExportFormat::Html.mime_type(), "text/html");
        assert!(ExportFormat::Svg.is_chart_format());
        assert!(!ExportFormat::SummaryJson.is_chart_format());
    }

    #[test]
    fn test_wrong_format_kind_is_rejected() {
        let exporter = Exporter::default();
        let dataset = generate_sample_dataset().unwrap();
        let err = exporter
            .export_dataset(&dataset, ExportFormat::Png)
            .unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_ERROR");

        let chart =
            ChartBuilder::build(&dataset, &ChartSpec::new(ChartKind::Bar, "region", "sales"))
                .unwrap();
        assert!(exporter.export_chart(&chart, ExportFormat::Csv).is_err());
    }

    #[test]
    fn test_export_payloads() {
        let exporter = Exporter::default();
        let dataset = generate_sample_dataset().unwrap();

        let csv = exporter.export_dataset(&dataset, ExportFormat::Csv).unwrap();
        assert_eq!(csv.file_name, "analyzed_data.csv");
        assert_eq!(csv.mime_type, "text/csv");
        assert!(csv.bytes.starts_with(b"date,sales,profit"));

        let chart = ChartBuilder::build(
            &dataset,
            &ChartSpec::new(ChartKind::Scatter, "sales", "profit"),
        )
        .unwrap();
        let html = exporter.export_chart(&chart, ExportFormat::Html).unwrap();
        assert_eq!(html.file_name, "chart_scatter_plot.html");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let payload = Exporter::default()
            .export_dataset(&generate_sample_dataset().unwrap(), ExportFormat::Json)
            .unwrap();
        let path = payload.write_to_dir(dir.path()).unwrap();
        assert!(path.ends_with("analyzed_data.json"));
        assert_eq!(std::fs::read(path).unwrap(), payload.bytes);
    }
}
