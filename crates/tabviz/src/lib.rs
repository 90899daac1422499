//! Tabular Data Inspection and Charting Core
//!
//! The computational core behind an interactive data dashboard, built on
//! Polars. A front end (web shell, notebook, CLI) hands it uploaded bytes or
//! asks for the demo dataset, and gets back plain values it can render.
//!
//! # Overview
//!
//! - **Loading**: CSV and JSON uploads, with size and format limits
//! - **Sample Data**: a deterministic 100-row sales dataset
//! - **Quality Report**: missing values, duplicates, numeric data stored as text
//! - **Statistics**: `describe()`-style numeric stats, categorical modes
//! - **Filtering**: numeric ranges and categorical selections, AND-combined
//! - **Charts**: bar, line and scatter charts as fully materialized values
//! - **Export**: CSV, JSON, summary JSON, PNG, SVG and standalone HTML
//!
//! Every operation is a pure function over an immutable [`Dataset`]; the only
//! state is the [`SessionContext`] the front end owns.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabviz::{
//!     ChartBuilder, ChartKind, ChartSpec, DashboardConfig, DatasetLoader, ExportFormat,
//!     Exporter, FilterSpec, apply_filters,
//! };
//!
//! let config = DashboardConfig::default();
//! let dataset = DatasetLoader::new(&config).load("sales.csv", &bytes)?;
//!
//! let filtered = apply_filters(&dataset, &FilterSpec::new().range("sales", 500.0, 1500.0))?;
//! let chart = ChartBuilder::build(
//!     filtered.dataset(),
//!     &ChartSpec::new(ChartKind::Bar, "region", "sales").color("category"),
//! )?;
//!
//! let png = Exporter::new(&config).export_chart(&chart, ExportFormat::Png)?;
//! std::fs::write(&png.file_name, &png.bytes)?;
//! ```
//!
//! # Inspection
//!
//! ```rust,ignore
//! use tabviz::{DataProfiler, DataQualityAnalyzer, generate_sample_dataset};
//!
//! let dataset = generate_sample_dataset()?;
//! let report = DataQualityAnalyzer::analyze(&dataset)?;
//! for issue in report.type_issues() {
//!     println!("{}", issue);
//! }
//!
//! let summary = DataProfiler::summarize(&dataset)?;
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! ```

pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod profiler;
pub mod quality;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use chart::{
    AxisValue, Chart, ChartBuilder, ChartInfo, ChartKind, ChartOptions, ChartSpec, Trace,
    TraceStyle,
};
pub use config::{
    ConfigValidationError, DashboardConfig, DashboardConfigBuilder, Layout, SidebarState,
};
pub use dataset::{
    ColumnMeta, Dataset, DatasetLoader, FileFormat, PreviewMode, SAMPLE_ROWS, SAMPLE_SEED,
    generate_sample_dataset, preview,
};
pub use error::{DashboardError, Result as DashboardResult, ResultExt};
pub use export::{ExportFormat, ExportPayload, Exporter};
pub use filter::{FilterOptions, FilterSpec, FilteredDataset, Predicate, apply_filters};
pub use profiler::DataProfiler;
pub use quality::DataQualityAnalyzer;
pub use session::{DatasetSource, SessionContext};
pub use types::{
    CategoricalColumnStats, ColumnQuality, DatasetOverview, MissingValueEntry,
    NumericColumnStats, QualityReport, StatisticalSummary,
};
pub use utils::ColumnKind;
