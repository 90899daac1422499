//! Chart model.
//!
//! A [`Chart`] is a fully materialized value: every trace carries its own
//! x and y values, so renderers and exporters never look back at the
//! dataset it was built from.

mod builder;
mod options;

pub use builder::{ChartBuilder, ChartSpec, DEFAULT_CHART_HEIGHT, MAX_CHART_HEIGHT, MIN_CHART_HEIGHT};
pub use options::ChartOptions;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Chart kinds offered by the visualization view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
}

impl ChartKind {
    pub const ALL: [Self; 3] = [Self::Bar, Self::Line, Self::Scatter];

    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bar => "Bar Chart",
            Self::Line => "Line Chart",
            Self::Scatter => "Scatter Plot",
        }
    }

    /// Lowercase label with underscores, used in export file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Bar => "bar_chart",
            Self::Line => "line_chart",
            Self::Scatter => "scatter_plot",
        }
    }

    /// Only scatter plots map a column to marker size.
    pub fn supports_size(self) -> bool {
        self == Self::Scatter
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "bar" | "bar_chart" => Ok(Self::Bar),
            "line" | "line_chart" => Ok(Self::Line),
            "scatter" | "scatter_plot" => Ok(Self::Scatter),
            _ => Err(format!(
                "unknown chart type '{}' (expected bar, line or scatter)",
                s
            )),
        }
    }
}

/// One x coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Text(String),
}

impl AxisValue {
    /// Total order used to sort line traces; numbers sort before
    /// timestamps, timestamps before text.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Position on a continuous axis, when the value has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Timestamp(ms) => Some(*ms as f64),
            Self::Text(_) => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Timestamp(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Timestamp(ms) => match DateTime::from_timestamp_millis(*ms) {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", ms),
            },
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One series of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Color group value; `None` for the single trace of an uncolored chart.
    pub name: Option<String>,
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
    /// Raw size-column values, scatter only.
    pub marker_sizes: Option<Vec<f64>>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Kind-specific drawing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TraceStyle {
    /// Bars sharing an x value stack.
    Bar,
    /// Lines with markers at every point.
    Line { line_width: u32, marker_size: u32 },
    Scatter {
        opacity: f64,
        /// Marker size when no size column is set.
        marker_size: u32,
        /// Largest marker when sizes come from a column.
        size_max: u32,
        border_color: String,
        border_width: u32,
    },
}

impl TraceStyle {
    pub fn for_kind(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar => TraceStyle::Bar,
            ChartKind::Line => TraceStyle::Line {
                line_width: 2,
                marker_size: 6,
            },
            ChartKind::Scatter => TraceStyle::Scatter {
                opacity: 0.7,
                marker_size: 6,
                size_max: 20,
                border_color: "white".to_string(),
                border_width: 1,
            },
        }
    }
}

/// A renderable chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    /// Pixel height requested for on-screen display.
    pub height: u32,
    pub x_column: String,
    pub y_column: String,
    pub color_column: Option<String>,
    pub size_column: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub show_legend: bool,
    pub traces: Vec<Trace>,
    pub style: TraceStyle,
}

static_assertions::assert_impl_all!(Chart: Send, Sync, Clone);

/// Summary shown next to a rendered chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartInfo {
    pub chart_type: String,
    pub data_points: usize,
    pub x_column: String,
    pub y_column: String,
    pub color_column: Option<String>,
    pub size_column: Option<String>,
}

impl Chart {
    /// Points across every trace.
    pub fn data_points(&self) -> usize {
        self.traces.iter().map(Trace::len).sum()
    }

    /// All x values, trace by trace.
    pub fn x_values(&self) -> impl Iterator<Item = &AxisValue> {
        self.traces.iter().flat_map(|t| t.x.iter())
    }

    /// All y values, trace by trace.
    pub fn y_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.traces.iter().flat_map(|t| t.y.iter().copied())
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name.as_deref() == Some(name))
    }

    pub fn info(&self) -> ChartInfo {
        ChartInfo {
            chart_type: self.kind.label().to_string(),
            data_points: self.data_points(),
            x_column: self.x_column.clone(),
            y_column: self.y_column.clone(),
            color_column: self.color_column.clone(),
            size_column: self.size_column.clone(),
        }
    }
}
