use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AxisValue, Chart, ChartKind, Trace, TraceStyle};
use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::utils::{ColumnKind, axis_title};

pub const DEFAULT_CHART_HEIGHT: u32 = 500;
pub const MIN_CHART_HEIGHT: u32 = 300;
pub const MAX_CHART_HEIGHT: u32 = 800;

/// What to plot: the user's chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    /// Marker size column; only scatter plots use it.
    pub size: Option<String>,
    /// Defaults to `"<kind>: <y> by <x>"`.
    pub title: Option<String>,
    pub height: u32,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind,
            x: x.into(),
            y: y.into(),
            color: None,
            size: None,
            title: None,
            height: DEFAULT_CHART_HEIGHT,
        }
    }

    pub fn color(mut self, column: impl Into<String>) -> Self {
        self.color = Some(column.into());
        self
    }

    pub fn size(mut self, column: impl Into<String>) -> Self {
        self.size = Some(column.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// The explicit title, or the default one.
    pub fn resolved_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{}: {} by {}", self.kind, self.y, self.x),
        }
    }
}

/// Turns a [`ChartSpec`] and a dataset into a [`Chart`].
pub struct ChartBuilder;

impl ChartBuilder {
    /// Build the chart described by `spec` from the rows of `dataset`.
    ///
    /// A missing column fails with [`DashboardError::InvalidColumn`]; every
    /// other failure is reported as [`DashboardError::ChartConstruction`].
    /// No partial chart is ever returned.
    pub fn build(dataset: &Dataset, spec: &ChartSpec) -> Result<Chart> {
        let kind = spec.kind;

        Self::require_column(dataset, &spec.x, kind)?;
        Self::require_column(dataset, &spec.y, kind)?;
        if let Some(color) = &spec.color {
            Self::require_column(dataset, color, kind)?;
        }

        let size = match &spec.size {
            Some(column) if kind.supports_size() => {
                Self::require_column(dataset, column, kind)?;
                Some(column.as_str())
            }
            Some(column) => {
                warn!("Ignoring size column '{}' for {}", column, kind);
                None
            }
            None => None,
        };

        let chart = Self::materialize(dataset, spec, size).map_err(|e| match e {
            DashboardError::ChartConstruction { .. } => e,
            other => DashboardError::chart(kind, other),
        })?;

        debug!(
            "{} built: {} trace(s), {} points",
            kind,
            chart.traces.len(),
            chart.data_points()
        );
        Ok(chart)
    }

    fn require_column(dataset: &Dataset, column: &str, kind: ChartKind) -> Result<()> {
        if dataset.has_column(column) {
            Ok(())
        } else {
            Err(DashboardError::InvalidColumn {
                column: column.to_string(),
                kind,
            })
        }
    }

    fn materialize(dataset: &Dataset, spec: &ChartSpec, size: Option<&str>) -> Result<Chart> {
        let kind = spec.kind;

        if !(MIN_CHART_HEIGHT..=MAX_CHART_HEIGHT).contains(&spec.height) {
            return Err(DashboardError::chart(
                kind,
                format!(
                    "height {} is outside {}..={} pixels",
                    spec.height, MIN_CHART_HEIGHT, MAX_CHART_HEIGHT
                ),
            ));
        }
        if dataset.is_empty() {
            return Err(DashboardError::chart(kind, "no rows to plot"));
        }
        if !dataset.kind_of(&spec.y).is_some_and(ColumnKind::is_numeric) {
            return Err(DashboardError::chart(
                kind,
                format!("y column '{}' must be numeric", spec.y),
            ));
        }

        let xs = axis_values(dataset, &spec.x)?;
        let ys = float_values(dataset.series(&spec.y)?)?;
        let colors = spec
            .color
            .as_deref()
            .map(|column| group_labels(dataset.series(column)?))
            .transpose()?;
        let sizes = size
            .map(|column| marker_sizes(dataset, column, kind))
            .transpose()?;

        let mut traces: Vec<Trace> = Vec::new();
        let mut trace_index: HashMap<String, usize> = HashMap::new();

        for (row, (x, y)) in xs.into_iter().zip(ys).enumerate() {
            let (Some(x), Some(y)) = (x, y) else {
                continue;
            };
            let marker = match &sizes {
                Some(sizes) => match sizes[row] {
                    Some(s) => Some(s),
                    None => continue,
                },
                None => None,
            };

            let slot = match &colors {
                Some(labels) => {
                    let label = labels[row].clone();
                    *trace_index.entry(label.clone()).or_insert_with(|| {
                        traces.push(empty_trace(Some(label), sizes.is_some()));
                        traces.len() - 1
                    })
                }
                None => {
                    if traces.is_empty() {
                        traces.push(empty_trace(None, sizes.is_some()));
                    }
                    0
                }
            };

            let trace = &mut traces[slot];
            trace.x.push(x);
            trace.y.push(y);
            if let (Some(s), Some(marker_sizes)) = (marker, trace.marker_sizes.as_mut()) {
                marker_sizes.push(s);
            }
        }

        if traces.iter().all(Trace::is_empty) {
            return Err(DashboardError::chart(
                kind,
                "every row has a missing x or y value",
            ));
        }

        if kind == ChartKind::Line {
            traces.iter_mut().for_each(sort_by_x);
        }

        Ok(Chart {
            kind,
            title: spec.resolved_title(),
            height: spec.height,
            x_column: spec.x.clone(),
            y_column: spec.y.clone(),
            color_column: spec.color.clone(),
            size_column: size.map(str::to_string),
            x_title: axis_title(&spec.x),
            y_title: axis_title(&spec.y),
            show_legend: spec.color.is_some(),
            traces,
            style: TraceStyle::for_kind(kind),
        })
    }
}

fn empty_trace(name: Option<String>, sized: bool) -> Trace {
    Trace {
        name,
        x: Vec::new(),
        y: Vec::new(),
        marker_sizes: sized.then(Vec::new),
    }
}

fn sort_by_x(trace: &mut Trace) {
    let mut order: Vec<usize> = (0..trace.len()).collect();
    order.sort_by(|&a, &b| trace.x[a].total_cmp(&trace.x[b]));
    trace.x = order.iter().map(|&i| trace.x[i].clone()).collect();
    trace.y = order.iter().map(|&i| trace.y[i]).collect();
}

/// X coordinates typed by the column's schema kind.
fn axis_values(dataset: &Dataset, column: &str) -> Result<Vec<Option<AxisValue>>> {
    let series = dataset.series(column)?;
    let values = match dataset.kind_of(column) {
        Some(kind) if kind.is_numeric() => float_values(series)?
            .into_iter()
            .map(|v| v.map(AxisValue::Number))
            .collect(),
        Some(ColumnKind::Timestamp) => series
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map(AxisValue::Timestamp))
            .collect(),
        _ => series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map(|s| AxisValue::Text(s.to_string())))
            .collect(),
    };
    Ok(values)
}

fn float_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|f| !f.is_nan()))
        .collect())
}

/// Color group of every row; nulls form their own `"null"` group.
fn group_labels(series: &Series) -> Result<Vec<String>> {
    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("null").to_string())
        .collect())
}

fn marker_sizes(dataset: &Dataset, column: &str, kind: ChartKind) -> Result<Vec<Option<f64>>> {
    if !dataset.kind_of(column).is_some_and(ColumnKind::is_numeric) {
        return Err(DashboardError::chart(
            kind,
            format!("size column '{}' must be numeric", column),
        ));
    }
    let sizes = float_values(dataset.series(column)?)?;
    if sizes.iter().flatten().any(|s| *s < 0.0) {
        return Err(DashboardError::chart(
            kind,
            format!("size column '{}' contains negative values", column),
        ));
    }
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate_sample_dataset;
    use pretty_assertions::assert_eq;

    fn xy() -> Dataset {
        Dataset::new(
            df![
                "x" => [1i64, 2, 3, 4, 5],
                "y" => [10i64, 20, 15, 25, 30],
            ]
            .unwrap(),
        )
    }

    fn sales() -> Dataset {
        Dataset::new(
            df![
                "month" => ["Mar", "Jan", "Feb", "Jan", "Mar"],
                "order_total" => [Some(30.0f64), Some(10.0), Some(20.0), None, Some(5.0)],
                "store" => ["east", "west", "east", "east", "west"],
                "weight" => [1.0f64, 2.0, 3.0, 4.0, 5.0],
                "day" => [3i64, 1, 2, 1, 3],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_bar_chart_has_every_point() {
        let chart = ChartBuilder::build(&xy(), &ChartSpec::new(ChartKind::Bar, "x", "y")).unwrap();

        assert_eq!(chart.traces.len(), 1);
        assert_eq!(chart.x_values().count(), 5);
        assert_eq!(
            chart.y_values().collect::<Vec<_>>(),
            vec![10.0, 20.0, 15.0, 25.0, 30.0]
        );
        assert_eq!(chart.title, "Bar Chart: y by x");
        assert_eq!(chart.height, DEFAULT_CHART_HEIGHT);
        assert!(!chart.show_legend);
        assert_eq!(chart.style, TraceStyle::Bar);
    }

    #[test]
    fn test_missing_columns_name_the_column() {
        for spec in [
            ChartSpec::new(ChartKind::Bar, "nope", "y"),
            ChartSpec::new(ChartKind::Bar, "x", "nope"),
            ChartSpec::new(ChartKind::Bar, "x", "y").color("nope"),
            ChartSpec::new(ChartKind::Scatter, "x", "y").size("nope"),
        ] {
            match ChartBuilder::build(&xy(), &spec) {
                Err(DashboardError::InvalidColumn { column, kind }) => {
                    assert_eq!(column, "nope");
                    assert_eq!(kind, spec.kind);
                }
                other => panic!("expected InvalidColumn, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_y_must_be_numeric() {
        let err = ChartBuilder::build(&sales(), &ChartSpec::new(ChartKind::Line, "day", "store"))
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ChartConstruction {
                kind: ChartKind::Line,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Failed to create Line Chart"));
    }

    #[test]
    fn test_color_groups_in_first_seen_order() {
        let spec = ChartSpec::new(ChartKind::Bar, "month", "order_total").color("store");
        let chart = ChartBuilder::build(&sales(), &spec).unwrap();

        let names: Vec<_> = chart.traces.iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec![Some("east".to_string()), Some("west".to_string())]);
        assert!(chart.show_legend);

        // the row with a null y is skipped
        assert_eq!(chart.data_points(), 4);
        assert_eq!(chart.trace("east").unwrap().y, vec![30.0, 20.0]);
    }

    #[test]
    fn test_axis_titles() {
        let chart = ChartBuilder::build(
            &sales(),
            &ChartSpec::new(ChartKind::Scatter, "weight", "order_total"),
        )
        .unwrap();
        assert_eq!(chart.x_title, "Weight");
        assert_eq!(chart.y_title, "Order Total");
        assert_eq!(chart.title, "Scatter Plot: order_total by weight");
    }

    #[test]
    fn test_line_points_sorted_by_x() {
        let spec = ChartSpec::new(ChartKind::Line, "day", "weight");
        let chart = ChartBuilder::build(&sales(), &spec).unwrap();
        let trace = &chart.traces[0];

        assert_eq!(
            trace.x,
            vec![
                AxisValue::Number(1.0),
                AxisValue::Number(1.0),
                AxisValue::Number(2.0),
                AxisValue::Number(3.0),
                AxisValue::Number(3.0),
            ]
        );
        assert_eq!(trace.y, vec![2.0, 4.0, 3.0, 1.0, 5.0]);
        assert_eq!(
            chart.style,
            TraceStyle::Line {
                line_width: 2,
                marker_size: 6
            }
        );
    }

    #[test]
    fn test_scatter_marker_sizes() {
        let spec = ChartSpec::new(ChartKind::Scatter, "day", "weight").size("order_total");
        let chart = ChartBuilder::build(&sales(), &spec).unwrap();
        let trace = &chart.traces[0];

        // the null size row is dropped
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.marker_sizes.as_ref().unwrap(), &vec![30.0, 10.0, 20.0, 5.0]);
        assert_eq!(chart.size_column.as_deref(), Some("order_total"));
        assert!(matches!(chart.style, TraceStyle::Scatter { opacity, .. } if opacity == 0.7));
    }

    #[test]
    fn test_negative_sizes_are_rejected() {
        let dataset = Dataset::new(
            df![
                "x" => [1i64, 2],
                "y" => [1i64, 2],
                "s" => [1i64, -1],
            ]
            .unwrap(),
        );
        let spec = ChartSpec::new(ChartKind::Scatter, "x", "y").size("s");
        assert!(matches!(
            ChartBuilder::build(&dataset, &spec),
            Err(DashboardError::ChartConstruction { .. })
        ));
    }

    #[test]
    fn test_size_ignored_for_bar_chart() {
        let spec = ChartSpec::new(ChartKind::Bar, "x", "y").size("x");
        let chart = ChartBuilder::build(&xy(), &spec).unwrap();
        assert_eq!(chart.size_column, None);
        assert_eq!(chart.traces[0].marker_sizes, None);
    }

    #[test]
    fn test_zero_rows_is_an_error() {
        let empty = Dataset::new(df!["x" => Vec::<i64>::new(), "y" => Vec::<i64>::new()].unwrap());
        let err = ChartBuilder::build(&empty, &ChartSpec::new(ChartKind::Bar, "x", "y")).unwrap_err();
        assert_eq!(err.error_code(), "CHART_CONSTRUCTION_ERROR");
    }

    #[test]
    fn test_height_bounds() {
        let spec = ChartSpec::new(ChartKind::Bar, "x", "y").height(900);
        assert!(ChartBuilder::build(&xy(), &spec).is_err());

        let spec = ChartSpec::new(ChartKind::Bar, "x", "y").height(300).title("Custom");
        let chart = ChartBuilder::build(&xy(), &spec).unwrap();
        assert_eq!(chart.height, 300);
        assert_eq!(chart.title, "Custom");
    }

    #[test]
    fn test_timestamp_x_axis() {
        let dataset = generate_sample_dataset().unwrap();
        let spec = ChartSpec::new(ChartKind::Line, "date", "sales").color("category");
        let chart = ChartBuilder::build(&dataset, &spec).unwrap();

        assert_eq!(chart.data_points(), 100);
        assert!(chart.traces.len() <= 3);
        assert!(
            chart
                .x_values()
                .all(|x| matches!(x, AxisValue::Timestamp(_)))
        );
    }
}
