//! Standalone interactive HTML export.
//!
//! The chart is written as a Plotly figure (`data` + `layout`) and embedded
//! in a page that loads Plotly from its CDN.

use serde_json::{Value, json};

use super::ExportFormat;
use crate::chart::{AxisValue, Chart, Trace, TraceStyle};
use crate::error::{DashboardError, Result};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const GRID_COLOR: &str = "#EBF0F8";

/// Render the chart as a self-contained HTML page.
pub fn chart_to_html(chart: &Chart) -> Result<String> {
    let figure = plotly_figure(chart);
    let figure_json = serde_json::to_string(&figure)
        .map_err(|e| DashboardError::export(ExportFormat::Html, e))?
        // keep the payload from closing the script element
        .replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:{height}px;"></div>
<script type="text/javascript">
  const figure = {figure};
  Plotly.newPlot('chart', figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#,
        title = escape_html(&chart.title),
        cdn = PLOTLY_CDN,
        height = chart.height,
        figure = figure_json,
    ))
}

/// The Plotly figure for a chart.
pub fn plotly_figure(chart: &Chart) -> Value {
    let data: Vec<Value> = chart
        .traces
        .iter()
        .map(|trace| plotly_trace(chart, trace))
        .collect();

    let mut layout = json!({
        "title": { "text": chart.title },
        "height": chart.height,
        "showlegend": chart.show_legend,
        "plot_bgcolor": "white",
        "paper_bgcolor": "white",
        "xaxis": { "title": { "text": chart.x_title }, "gridcolor": GRID_COLOR },
        "yaxis": { "title": { "text": chart.y_title }, "gridcolor": GRID_COLOR },
    });
    if let Some(color) = &chart.color_column {
        layout["legend"] = json!({ "title": { "text": color } });
    }
    if chart.style == TraceStyle::Bar {
        layout["barmode"] = json!("relative");
    }

    json!({ "data": data, "layout": layout })
}

fn plotly_trace(chart: &Chart, trace: &Trace) -> Value {
    let x: Vec<Value> = trace.x.iter().map(axis_json).collect();
    let mut value = json!({
        "name": trace.name.clone().unwrap_or_default(),
        "x": x,
        "y": trace.y,
        "showlegend": chart.show_legend,
    });

    let style = match &chart.style {
        TraceStyle::Bar => json!({ "type": "bar" }),
        TraceStyle::Line {
            line_width,
            marker_size,
        } => json!({
            "type": "scatter",
            "mode": "lines+markers",
            "line": { "width": line_width },
            "marker": { "size": marker_size },
        }),
        TraceStyle::Scatter {
            opacity,
            marker_size,
            size_max,
            border_color,
            border_width,
        } => {
            let mut marker = json!({
                "opacity": opacity,
                "size": marker_size,
                "line": { "width": border_width, "color": border_color },
            });
            if let Some(sizes) = &trace.marker_sizes {
                let largest = sizes.iter().copied().fold(0.0f64, f64::max);
                marker["size"] = json!(sizes);
                marker["sizemode"] = json!("area");
                if largest > 0.0 {
                    marker["sizeref"] = json!(2.0 * largest / f64::from(size_max * size_max));
                }
            }
            json!({ "type": "scatter", "mode": "markers", "marker": marker })
        }
    };

    if let (Value::Object(fields), Value::Object(extra)) = (&mut value, style) {
        fields.extend(extra);
    }
    value
}

/// Timestamps become date strings Plotly recognizes.
fn axis_json(x: &AxisValue) -> Value {
    match x {
        AxisValue::Number(v) => json!(v),
        AxisValue::Timestamp(_) | AxisValue::Text(_) => Value::String(x.to_string()),
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
