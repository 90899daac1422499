//! Integration tests for the inspection and charting core.
//!
//! These tests drive the public API end to end: load, inspect, filter,
//! chart and export.

use std::collections::HashSet;
use std::path::PathBuf;

use polars::prelude::*;
use pretty_assertions::assert_eq;
use tabviz::{
    ChartBuilder, ChartKind, ChartSpec, ColumnKind, DashboardConfig, DashboardError,
    DataProfiler, DataQualityAnalyzer, Dataset, DatasetLoader, ExportFormat, Exporter,
    FilterOptions, FilterSpec, SessionContext, apply_filters, generate_sample_dataset,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Dataset {
    DatasetLoader::default()
        .load_path(fixtures_path().join(filename))
        .expect("Failed to load fixture")
}

fn string_values(dataset: &Dataset, column: &str) -> Vec<String> {
    dataset
        .series(column)
        .unwrap()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_csv_fixture() {
    let dataset = load_fixture("sales.csv");

    assert_eq!(dataset.height(), 8);
    assert_eq!(
        dataset.column_names(),
        vec!["order_date", "region", "category", "units", "revenue"]
    );
    assert_eq!(dataset.kind_of("order_date"), Some(ColumnKind::Timestamp));
    assert_eq!(dataset.kind_of("units"), Some(ColumnKind::Integer));
    assert_eq!(dataset.kind_of("revenue"), Some(ColumnKind::Float));
}

#[test]
fn test_load_json_fixture() {
    let dataset = load_fixture("stations.json");

    assert_eq!(dataset.height(), 4);
    assert!(dataset.has_column("zip"));
    assert_eq!(dataset.kind_of("zip"), Some(ColumnKind::Text));
    assert_eq!(dataset.kind_of("temp"), Some(ColumnKind::Float));
}

#[test]
fn test_header_only_csv_has_zero_rows() {
    let dataset = DatasetLoader::default()
        .load("empty.csv", b"order_date,region,units\n")
        .unwrap();
    assert!(dataset.is_empty());
    assert_eq!(dataset.column_names(), vec!["order_date", "region", "units"]);
}

#[test]
fn test_unsupported_and_oversized_uploads() {
    let config = DashboardConfig::builder()
        .max_upload_size_mb(1)
        .build()
        .unwrap();
    let loader = DatasetLoader::new(&config);

    assert!(matches!(
        loader.load("report.xlsx", b"PK"),
        Err(DashboardError::UnsupportedFormat(_))
    ));

    let mut big = b"value\n".to_vec();
    big.extend(b"1\n".repeat(600 * 1024));
    let err = loader.load("big.csv", &big).unwrap_err();
    assert_eq!(err.error_code(), "UPLOAD_TOO_LARGE");
}

// ============================================================================
// Sample Dataset
// ============================================================================

#[test]
fn test_sample_dataset_is_deterministic() {
    let first = generate_sample_dataset().unwrap();
    let second = generate_sample_dataset().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sample_dataset_invariants() {
    let dataset = generate_sample_dataset().unwrap();
    assert_eq!(dataset.height(), 100);

    let sales = dataset.series("sales").unwrap().i64().unwrap().clone();
    assert!(sales.into_iter().flatten().all(|s| s > 0));

    let satisfaction = dataset.series("satisfaction").unwrap().f64().unwrap().clone();
    assert!(
        satisfaction
            .into_iter()
            .flatten()
            .all(|s| (1.0..=5.0).contains(&s))
    );

    let categories: HashSet<String> = string_values(&dataset, "category").into_iter().collect();
    assert!(categories.is_subset(&["A", "B", "C"].iter().map(|s| s.to_string()).collect()));

    let regions: HashSet<String> = string_values(&dataset, "region").into_iter().collect();
    assert!(
        regions.is_subset(
            &["North", "South", "East", "West"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        )
    );

    let report = DataQualityAnalyzer::analyze(&dataset).unwrap();
    assert_eq!(report.overview.missing_values, 0);
    assert_eq!(report.duplicate_rows, 0);
}

// ============================================================================
// Quality Report & Statistics
// ============================================================================

#[test]
fn test_quality_report_on_fixture() {
    let report = DataQualityAnalyzer::analyze(&load_fixture("sales.csv")).unwrap();

    assert_eq!(report.overview.total_rows, 8);
    assert_eq!(report.overview.missing_values, 1);
    assert_eq!(report.missing_values.len(), 1);
    assert_eq!(report.missing_values[0].column, "revenue");
    assert_eq!(report.missing_values[0].missing_percentage, 12.5);
    assert_eq!(report.duplicate_rows, 1);
    assert!(report.numeric_text_columns.is_empty());
}

#[test]
fn test_numeric_text_detected_in_json() {
    let report = DataQualityAnalyzer::analyze(&load_fixture("stations.json")).unwrap();
    assert_eq!(report.numeric_text_columns, vec!["zip".to_string()]);
    assert_eq!(report.column("temp").unwrap().null_count, 1);
}

#[test]
fn test_missing_value_percentages() {
    let dataset = Dataset::new(df!["v" => [Some(1i64), None, Some(3), None]].unwrap());
    let report = DataQualityAnalyzer::analyze(&dataset).unwrap();
    let column = report.column("v").unwrap();

    assert_eq!(column.null_count, 2);
    assert_eq!(column.non_null_count, 2);
    assert_eq!(column.missing_percentage, 50.0);
}

#[test]
fn test_duplicate_row_example() {
    let dataset = Dataset::new(
        df![
            "id" => [1i64, 2, 2, 3],
            "name" => ["A", "B", "B", "C"],
        ]
        .unwrap(),
    );
    let report = DataQualityAnalyzer::analyze(&dataset).unwrap();
    assert_eq!(report.duplicate_rows, 1);
}

#[test]
fn test_statistics_on_fixture() {
    let summary = DataProfiler::summarize(&load_fixture("sales.csv")).unwrap();

    let units = summary.numeric_column("units").unwrap();
    assert_eq!(units.count, 8);
    assert_eq!(units.min, Some(3.0));
    assert_eq!(units.max, Some(15.0));

    let revenue = summary.numeric_column("revenue").unwrap();
    assert_eq!(revenue.count, 7);

    let region = summary.categorical_column("region").unwrap();
    assert_eq!(region.unique_values, 4);
    assert_eq!(region.most_frequent.as_deref(), Some("North"));
    assert_eq!(region.frequency, 3);
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_range_excluding_two_rows() {
    let dataset = Dataset::new(df!["n" => [1i64, 2, 3, 4, 5]].unwrap());
    let spec = FilterSpec::new().range("n", 2.0, 4.0);

    let once = apply_filters(&dataset, &spec).unwrap();
    assert_eq!(once.height(), 3);

    let twice = apply_filters(once.dataset(), &spec).unwrap();
    assert_eq!(once.dataset(), twice.dataset());
    assert_eq!(dataset.height(), 5);
}

#[test]
fn test_filter_options_drive_filters() {
    let dataset = load_fixture("sales.csv");
    let options = FilterOptions::for_dataset(&dataset).unwrap();

    let units = options.numeric_range("units").unwrap();
    assert_eq!((units.min, units.max), (3.0, 15.0));
    assert_eq!(units.step, 0.12);
    assert_eq!(
        options.categorical_choices("region").unwrap().values,
        vec!["North", "South", "East", "West"]
    );

    let spec = FilterSpec::new()
        .range("units", 5.0, units.max)
        .one_of("region", ["North", "East"]);
    let filtered = apply_filters(&dataset, &spec).unwrap();
    assert_eq!(string_values(filtered.dataset(), "region"), vec!["North", "East", "East"]);
}

#[test]
fn test_filter_to_zero_rows_blocks_charting() {
    let dataset = load_fixture("sales.csv");
    let filtered = apply_filters(&dataset, &FilterSpec::new().range("units", 100.0, 200.0)).unwrap();
    assert!(filtered.is_empty());

    let spec = ChartSpec::new(ChartKind::Bar, "region", "units");
    let err = ChartBuilder::build(filtered.dataset(), &spec).unwrap_err();
    assert!(matches!(err, DashboardError::ChartConstruction { .. }));
}

// ============================================================================
// Charts
// ============================================================================

#[test]
fn test_bar_chart_example() {
    let dataset = Dataset::new(
        df![
            "x" => [1i64, 2, 3, 4, 5],
            "y" => [10i64, 20, 15, 25, 30],
        ]
        .unwrap(),
    );
    let chart = ChartBuilder::build(&dataset, &ChartSpec::new(ChartKind::Bar, "x", "y")).unwrap();

    assert_eq!(chart.x_values().count(), 5);
    assert_eq!(chart.y_values().count(), 5);
    assert_eq!(chart.info().data_points, 5);
}

#[test]
fn test_absent_column_names_the_value() {
    let dataset = load_fixture("sales.csv");
    let spec = ChartSpec::new(ChartKind::Line, "order_date", "profit");

    let err = ChartBuilder::build(&dataset, &spec).unwrap_err();
    match &err {
        DashboardError::InvalidColumn { column, kind } => {
            assert_eq!(column, "profit");
            assert_eq!(*kind, ChartKind::Line);
        }
        other => panic!("expected InvalidColumn, got {:?}", other),
    }
    assert!(err.to_string().contains("profit"));
}

#[test]
fn test_colored_line_chart_over_dates() {
    let dataset = load_fixture("sales.csv");
    let spec = ChartSpec::new(ChartKind::Line, "order_date", "revenue").color("region");
    let chart = ChartBuilder::build(&dataset, &spec).unwrap();

    assert_eq!(chart.traces.len(), 4);
    assert!(chart.show_legend);
    assert_eq!(chart.x_title, "Order Date");
    // the row without revenue is skipped
    assert_eq!(chart.data_points(), 7);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_csv_export_reload_roundtrip() {
    let exporter = Exporter::default();
    let loader = DatasetLoader::default();

    for dataset in [generate_sample_dataset().unwrap(), load_fixture("sales.csv")] {
        let payload = exporter.export_dataset(&dataset, ExportFormat::Csv).unwrap();
        let reloaded = loader.load(&payload.file_name, &payload.bytes).unwrap();

        assert_eq!(reloaded.height(), dataset.height());
        assert_eq!(reloaded.column_names(), dataset.column_names());
    }
}

#[test]
fn test_json_export_reload() {
    let dataset = load_fixture("stations.json");
    let payload = Exporter::default()
        .export_dataset(&dataset, ExportFormat::Json)
        .unwrap();
    let reloaded = DatasetLoader::default()
        .load(&payload.file_name, &payload.bytes)
        .unwrap();

    assert_eq!(reloaded.height(), 4);
    assert_eq!(reloaded.column_names(), dataset.column_names());
}

#[test]
fn test_summary_export() {
    let payload = Exporter::default()
        .export_dataset(&load_fixture("sales.csv"), ExportFormat::SummaryJson)
        .unwrap();
    assert_eq!(payload.file_name, "data_summary.json");

    let summary: serde_json::Value = serde_json::from_slice(&payload.bytes).unwrap();
    assert_eq!(summary["overview"]["total_rows"], 8);
    assert_eq!(summary["missing_values"]["revenue"], 1);
    assert_eq!(summary["numeric_summary"]["units"]["max"], 15.0);
}

#[test]
fn test_end_to_end_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::builder()
        .theme_primary_color("#336699")
        .build()
        .unwrap();
    let exporter = Exporter::new(&config);
    let mut session = SessionContext::new(config);

    let bytes = std::fs::read(fixtures_path().join("sales.csv")).unwrap();
    session.upload("sales.csv", &bytes).unwrap();
    let (dataset, _) = session.active_dataset().unwrap();

    let filtered = apply_filters(dataset, &FilterSpec::new().one_of("category", ["A", "C"])).unwrap();
    assert_eq!(filtered.height(), 5);

    let chart = ChartBuilder::build(
        filtered.dataset(),
        &ChartSpec::new(ChartKind::Scatter, "units", "revenue").size("units"),
    )
    .unwrap();

    for format in ExportFormat::CHART {
        let payload = exporter.export_chart(&chart, format).unwrap();
        assert_eq!(payload.file_name, format!("chart_scatter_plot.{}", format.extension()));
        assert!(!payload.bytes.is_empty());
        assert!(payload.write_to_dir(dir.path()).unwrap().exists());
    }

    let svg = std::fs::read_to_string(dir.path().join("chart_scatter_plot.svg")).unwrap();
    assert!(svg.to_lowercase().contains("#336699"));
}
