//! Static chart rendering with plotters.
//!
//! The same drawing routine targets the bitmap backend (PNG) and the SVG
//! backend. Text is drawn with DejaVu Sans, embedded in the binary and
//! registered with plotters as `sans-serif` on first use.

use std::collections::HashMap;
use std::error::Error;
use std::io::Cursor;

use chrono::DateTime;
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;

use super::ExportFormat;
use crate::chart::{AxisValue, Chart, ChartKind, TraceStyle};
use crate::error::{DashboardError, Result};

pub const PNG_WIDTH: u32 = 1200;
pub const PNG_HEIGHT: u32 = 800;
pub const SVG_WIDTH: u32 = 1200;

// plotly's default qualitative palette
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x63, 0x6E, 0xFA),
    RGBColor(0xEF, 0x55, 0x3B),
    RGBColor(0x00, 0xCC, 0x96),
    RGBColor(0xAB, 0x63, 0xFA),
    RGBColor(0xFF, 0xA1, 0x5A),
    RGBColor(0x19, 0xD3, 0xF3),
    RGBColor(0xFF, 0x66, 0x92),
    RGBColor(0xB6, 0xE8, 0x80),
    RGBColor(0xFF, 0x97, 0xFF),
    RGBColor(0xFE, 0xCB, 0x52),
];

const BAR_WIDTH: f64 = 0.8;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Whether the embedded font was registered. Other styles fall back to it.
static FONT_REGISTERED: Lazy<bool> =
    Lazy::new(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok());

type DrawResult = std::result::Result<(), Box<dyn Error>>;

/// Render a chart to a 1200x800 PNG.
///
/// `accent` colors the trace of single-trace charts.
pub fn chart_to_png(chart: &Chart, accent: (u8, u8, u8)) -> Result<Vec<u8>> {
    let fail = |e: &dyn std::fmt::Display| DashboardError::export(ExportFormat::Png, e);

    let mut pixels = vec![0u8; (PNG_WIDTH * PNG_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (PNG_WIDTH, PNG_HEIGHT))
            .into_drawing_area();
        draw_chart(&root, chart, accent).map_err(|e| fail(&e))?;
        root.present().map_err(|e| fail(&e))?;
    }

    let image = image::RgbImage::from_raw(PNG_WIDTH, PNG_HEIGHT, pixels)
        .ok_or_else(|| fail(&"pixel buffer does not match image size"))?;
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| fail(&e))?;
    Ok(bytes)
}

/// Render a chart to an SVG document, 1200 pixels wide and as tall as the chart.
pub fn chart_to_svg(chart: &Chart, accent: (u8, u8, u8)) -> Result<String> {
    let fail = |e: &dyn std::fmt::Display| DashboardError::export(ExportFormat::Svg, e);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (SVG_WIDTH, chart.height)).into_drawing_area();
        draw_chart(&root, chart, accent).map_err(|e| fail(&e))?;
        root.present().map_err(|e| fail(&e))?;
    }
    Ok(svg)
}

/// How x values map onto the horizontal axis.
enum XLayout {
    Continuous { min: f64, max: f64, temporal: bool },
    /// One slot per distinct value.
    Slots(Vec<String>),
}

impl XLayout {
    fn for_chart(chart: &Chart) -> Self {
        let continuous: Option<Vec<f64>> = chart.x_values().map(AxisValue::as_f64).collect();
        match continuous {
            Some(values) if chart.kind != ChartKind::Bar => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let temporal = chart
                    .x_values()
                    .any(|x| matches!(x, AxisValue::Timestamp(_)));
                XLayout::Continuous { min, max, temporal }
            }
            _ => {
                let mut distinct: Vec<&AxisValue> = Vec::new();
                for x in chart.x_values() {
                    if !distinct.contains(&x) {
                        distinct.push(x);
                    }
                }
                if distinct.iter().all(|x| x.as_f64().is_some()) {
                    distinct.sort_by(|a, b| a.total_cmp(b));
                }
                XLayout::Slots(distinct.into_iter().map(ToString::to_string).collect())
            }
        }
    }

    fn position(&self, x: &AxisValue) -> f64 {
        match self {
            XLayout::Continuous { .. } => x.as_f64().unwrap_or(0.0),
            XLayout::Slots(labels) => {
                let label = x.to_string();
                labels.iter().position(|l| *l == label).unwrap_or(0) as f64
            }
        }
    }

    fn range(&self) -> std::ops::Range<f64> {
        match self {
            XLayout::Continuous { min, max, .. } => padded(*min, *max),
            XLayout::Slots(labels) => -0.5..(labels.len() as f64 - 0.5),
        }
    }

    fn label(&self, v: f64) -> String {
        match self {
            XLayout::Continuous { temporal: true, .. } => {
                DateTime::from_timestamp_millis(v as i64)
                    .map(|dt| dt.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            }
            XLayout::Continuous { .. } => format_number(v),
            XLayout::Slots(labels) => {
                let idx = v.round();
                if idx >= 0.0 && (v - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }
        }
    }

    fn label_count(&self) -> usize {
        match self {
            XLayout::Continuous { .. } => 10,
            XLayout::Slots(labels) => labels.len().clamp(1, 30),
        }
    }
}

fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

fn trace_color(chart: &Chart, index: usize, accent: (u8, u8, u8)) -> RGBColor {
    if chart.traces.len() == 1 {
        RGBColor(accent.0, accent.1, accent.2)
    } else {
        PALETTE[index % PALETTE.len()]
    }
}

/// Bar rectangles as (slot position, bottom, top), stacking per slot.
fn stacked_bars(layout: &XLayout, chart: &Chart) -> Vec<Vec<(f64, f64, f64)>> {
    let mut tops: HashMap<usize, (f64, f64)> = HashMap::new();
    chart
        .traces
        .iter()
        .map(|trace| {
            trace
                .x
                .iter()
                .zip(&trace.y)
                .map(|(x, &y)| {
                    let pos = layout.position(x);
                    let (up, down) = tops.entry(pos as usize).or_insert((0.0, 0.0));
                    let base = if y >= 0.0 { *up } else { *down };
                    if y >= 0.0 {
                        *up += y;
                    } else {
                        *down += y;
                    }
                    (pos, base, base + y)
                })
                .collect()
        })
        .collect()
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, chart: &Chart, accent: (u8, u8, u8)) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if chart.data_points() == 0 {
        return Err("chart has no data points".into());
    }
    if !*FONT_REGISTERED {
        return Err("embedded chart font could not be loaded".into());
    }

    root.fill(&WHITE)?;

    let layout = XLayout::for_chart(chart);
    let bars = (chart.kind == ChartKind::Bar).then(|| stacked_bars(&layout, chart));

    let (y_min, y_max) = match &bars {
        Some(bars) => bars
            .iter()
            .flatten()
            .fold((0.0f64, 0.0f64), |(lo, hi), &(_, base, top)| {
                (lo.min(base).min(top), hi.max(base).max(top))
            }),
        None => chart
            .y_values()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            }),
    };

    let mut plot = ChartBuilder::on(root)
        .margin(30)
        .caption(chart.title.as_str(), (FONT_FAMILY, 24))
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(layout.range(), padded(y_min, y_max))?;

    let x_formatter = |v: &f64| layout.label(*v);
    let y_formatter = |v: &f64| format_number(*v);
    plot.configure_mesh()
        .x_labels(layout.label_count())
        .x_desc(chart.x_title.as_str())
        .y_desc(chart.y_title.as_str())
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    for (index, trace) in chart.traces.iter().enumerate() {
        let color = trace_color(chart, index, accent);
        let name = trace.name.clone().unwrap_or_default();

        let annotation = match &chart.style {
            TraceStyle::Bar => {
                let rects = bars.as_ref().map(|b| b[index].clone()).unwrap_or_default();
                plot.draw_series(rects.into_iter().map(|(pos, base, top)| {
                    Rectangle::new(
                        [(pos - BAR_WIDTH / 2.0, base), (pos + BAR_WIDTH / 2.0, top)],
                        color.filled(),
                    )
                }))?
            }
            TraceStyle::Line {
                line_width,
                marker_size,
            } => {
                let points: Vec<(f64, f64)> = trace
                    .x
                    .iter()
                    .zip(&trace.y)
                    .map(|(x, &y)| (layout.position(x), y))
                    .collect();
                let radius = (*marker_size as i32 / 2).max(1);
                plot.draw_series(PointSeries::of_element(
                    points.iter().copied(),
                    radius,
                    color,
                    &|c, s, st| EmptyElement::at(c) + Circle::new((0, 0), s, st.filled()),
                ))?;
                plot.draw_series(LineSeries::new(
                    points,
                    color.stroke_width(*line_width),
                ))?
            }
            TraceStyle::Scatter {
                opacity,
                marker_size,
                size_max,
                border_width,
                ..
            } => {
                let largest = trace
                    .marker_sizes
                    .as_ref()
                    .map(|sizes| sizes.iter().copied().fold(0.0f64, f64::max))
                    .unwrap_or(0.0);
                let points: Vec<((f64, f64), i32)> = trace
                    .x
                    .iter()
                    .zip(&trace.y)
                    .enumerate()
                    .map(|(i, (x, &y))| {
                        // marker area proportional to the size value
                        let diameter = match &trace.marker_sizes {
                            Some(sizes) if largest > 0.0 => {
                                (sizes[i] / largest).sqrt() * *size_max as f64
                            }
                            _ => *marker_size as f64,
                        };
                        ((layout.position(x), y), ((diameter / 2.0).round() as i32).max(1))
                    })
                    .collect();
                let fill = color.mix(*opacity).filled();
                let border = WHITE.stroke_width(*border_width);
                plot.draw_series(points.into_iter().map(|(c, r)| {
                    EmptyElement::at(c) + Circle::new((0, 0), r, fill) + Circle::new((0, 0), r, border)
                }))?
            }
        };

        if chart.show_legend {
            annotation
                .label(name)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
    }

    if chart.show_legend {
        plot.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}
