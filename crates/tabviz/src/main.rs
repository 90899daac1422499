//! CLI front end for the inspection and charting core.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tabviz::{
    ChartBuilder, ChartKind, ChartSpec, DashboardConfig, DataProfiler, DataQualityAnalyzer,
    Dataset, DatasetSource, ExportFormat, Exporter, FilterSpec, PreviewMode, SessionContext,
    apply_filters, preview,
};
use tracing::{debug, info};

/// CLI-compatible preview mode enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPreviewMode {
    /// First rows
    Head,
    /// Last rows
    Tail,
    /// Random rows (seeded)
    Sample,
    /// All rows up to the preview limit
    All,
}

impl From<CliPreviewMode> for PreviewMode {
    fn from(cli: CliPreviewMode) -> Self {
        match cli {
            CliPreviewMode::Head => PreviewMode::Head,
            CliPreviewMode::Tail => PreviewMode::Tail,
            CliPreviewMode::Sample => PreviewMode::Sample,
            CliPreviewMode::All => PreviewMode::All,
        }
    }
}

/// CLI-compatible chart type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartKind {
    Bar,
    Line,
    Scatter,
}

impl From<CliChartKind> for ChartKind {
    fn from(cli: CliChartKind) -> Self {
        match cli {
            CliChartKind::Bar => ChartKind::Bar,
            CliChartKind::Line => ChartKind::Line,
            CliChartKind::Scatter => ChartKind::Scatter,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartFormat {
    Png,
    Svg,
    Html,
}

impl From<CliChartFormat> for ExportFormat {
    fn from(cli: CliChartFormat) -> Self {
        match cli {
            CliChartFormat::Png => ExportFormat::Png,
            CliChartFormat::Svg => ExportFormat::Svg,
            CliChartFormat::Html => ExportFormat::Html,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDataFormat {
    Csv,
    Json,
    /// Overview, dtypes, missing counts and numeric statistics
    SummaryJson,
}

impl From<CliDataFormat> for ExportFormat {
    fn from(cli: CliDataFormat) -> Self {
        match cli {
            CliDataFormat::Csv => ExportFormat::Csv,
            CliDataFormat::Json => ExportFormat::Json,
            CliDataFormat::SummaryJson => ExportFormat::SummaryJson,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Inspect, filter, chart and export tabular data",
    long_about = "Inspect, filter, chart and export tabular data.\n\n\
                  EXAMPLES:\n  \
                  # Quality report and statistics for an upload\n  \
                  tabviz inspect -i sales.csv\n\n  \
                  # Same, for the built-in sample dataset\n  \
                  tabviz inspect --sample\n\n  \
                  # Bar chart of filtered rows\n  \
                  tabviz chart --sample --kind bar -x region -y sales \\\n    \
                  --range sales=800:1200 --select category=A,B -f png\n\n  \
                  # Export filtered rows as JSON records\n  \
                  tabviz export -i sales.csv -f json --select region=North"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON file with dashboard settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Largest accepted input file, in megabytes
    #[arg(long, global = true)]
    max_upload_mb: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the quality report, statistics and a row preview
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Which rows to preview
        #[arg(long, value_enum, default_value = "head")]
        preview: CliPreviewMode,

        /// Number of preview rows
        #[arg(long, default_value = "10")]
        rows: usize,

        /// Print the report and statistics as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Write the sample dataset as CSV
    Sample {
        /// Output file
        #[arg(short, long, default_value = "sample_data.csv")]
        output: PathBuf,
    },

    /// Build a chart and export it
    Chart {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Chart type
        #[arg(long, value_enum, default_value = "bar")]
        kind: CliChartKind,

        /// X-axis column
        #[arg(short, long)]
        x: String,

        /// Y-axis column (numeric)
        #[arg(short, long)]
        y: String,

        /// Column to color-code the chart
        #[arg(long)]
        color: Option<String>,

        /// Column to size points by (scatter only)
        #[arg(long)]
        size: Option<String>,

        /// Chart title; defaults to "<type>: <y> by <x>"
        #[arg(long)]
        title: Option<String>,

        /// Chart height in pixels (300-800)
        #[arg(long, default_value = "500")]
        height: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "png")]
        format: CliChartFormat,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Export the (filtered) dataset
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: CliDataFormat,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// CSV or JSON file to load
    #[arg(short, long, required_unless_present = "sample", conflicts_with = "sample")]
    input: Option<PathBuf>,

    /// Use the built-in sample dataset
    #[arg(long)]
    sample: bool,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Keep rows with MIN <= COLUMN <= MAX, as COLUMN=MIN:MAX (repeatable)
    #[arg(long = "range", value_name = "COLUMN=MIN:MAX")]
    ranges: Vec<String>,

    /// Keep rows whose COLUMN is one of the values, as COLUMN=A,B,C (repeatable)
    #[arg(long = "select", value_name = "COLUMN=VALUES")]
    selections: Vec<String>,
}

impl FilterArgs {
    fn to_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::new();
        for range in &self.ranges {
            let (column, bounds) = split_assignment(range)?;
            let (min, max) = bounds
                .split_once(':')
                .ok_or_else(|| anyhow!("Range '{}' must look like COLUMN=MIN:MAX", range))?;
            let min: f64 = min.trim().parse().with_context(|| format!("Invalid minimum in '{}'", range))?;
            let max: f64 = max.trim().parse().with_context(|| format!("Invalid maximum in '{}'", range))?;
            spec = spec.range(column, min, max);
        }
        for selection in &self.selections {
            let (column, values) = split_assignment(selection)?;
            let values = values
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            spec = spec.one_of(column, values);
        }
        Ok(spec)
    }
}

fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(column, rest)| (column.trim(), rest))
        .filter(|(column, _)| !column.is_empty())
        .ok_or_else(|| anyhow!("Expected COLUMN=..., got '{}'", arg))
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<DashboardConfig>(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };

    if let Some(limit) = cli.max_upload_mb {
        config.max_upload_size_mb = limit;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet);

    let config = load_config(&cli)?;
    debug!("Configuration: {:?}", config);
    let mut session = SessionContext::new(config);

    match &cli.command {
        Command::Inspect {
            source,
            preview: mode,
            rows,
            json,
        } => {
            let dataset = load_source(&mut session, source)?;
            let max_rows = session.config().preview_max_rows;
            run_inspect(&dataset, (*mode).into(), *rows, max_rows, *json)
        }
        Command::Sample { output } => {
            let exporter = Exporter::new(session.config());
            let payload = exporter.export_dataset(session.sample_dataset()?, ExportFormat::Csv)?;
            std::fs::write(output, &payload.bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Sample dataset written to {}", output.display());
            Ok(())
        }
        Command::Chart {
            source,
            filters,
            kind,
            x,
            y,
            color,
            size,
            title,
            height,
            format,
            output,
        } => {
            let dataset = load_source(&mut session, source)?;
            let filtered = apply_filters(&dataset, &filters.to_spec()?)?;
            info!(
                "{} of {} rows after filtering",
                filtered.height(),
                dataset.height()
            );

            let mut spec = ChartSpec::new((*kind).into(), x, y).height(*height);
            if let Some(color) = color {
                spec = spec.color(color);
            }
            if let Some(size) = size {
                spec = spec.size(size);
            }
            if let Some(title) = title {
                spec = spec.title(title);
            }

            let chart = ChartBuilder::build(filtered.dataset(), &spec)?;
            let payload = Exporter::new(session.config()).export_chart(&chart, (*format).into())?;
            let path = write_payload(output, &payload)?;

            let info = chart.info();
            println!("Chart Type:  {}", info.chart_type);
            println!("Data Points: {}", info.data_points);
            println!("X-axis:      {}", info.x_column);
            println!("Y-axis:      {}", info.y_column);
            if let Some(color) = &info.color_column {
                println!("Color:       {}", color);
            }
            if let Some(size) = &info.size_column {
                println!("Size:        {}", size);
            }
            println!("Written to   {}", path.display());
            Ok(())
        }
        Command::Export {
            source,
            filters,
            format,
            output,
        } => {
            let dataset = load_source(&mut session, source)?;
            let filtered = apply_filters(&dataset, &filters.to_spec()?)?;
            let payload =
                Exporter::new(session.config()).export_dataset(filtered.dataset(), (*format).into())?;
            let path = write_payload(output, &payload)?;
            println!(
                "Exported {} rows to {}",
                filtered.height(),
                path.display()
            );
            Ok(())
        }
    }
}

fn load_source(session: &mut SessionContext, source: &SourceArgs) -> Result<Dataset> {
    if let Some(path) = &source.input {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Input file not found: {}", path.display()))?;
        let filename = file_name(path);
        session.upload(&filename, &bytes)?;
    }

    let (dataset, origin) = session.active_dataset()?;
    match origin {
        DatasetSource::Upload { filename } => info!("Using uploaded dataset '{}'", filename),
        DatasetSource::Sample => info!("Using sample dataset"),
    }
    Ok(dataset.clone())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_payload(dir: &Path, payload: &tabviz::ExportPayload) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        info!("Created output directory: {}", dir.display());
    }
    Ok(payload.write_to_dir(dir)?)
}

/// Print the inspection report.
///
/// Uses `println!` for the report itself; logging goes to stderr.
fn run_inspect(
    dataset: &Dataset,
    mode: PreviewMode,
    rows: usize,
    max_rows: usize,
    json: bool,
) -> Result<()> {
    let report = DataQualityAnalyzer::analyze(dataset)?;
    let summary = DataProfiler::summarize(dataset)?;

    if json {
        let document = serde_json::json!({ "quality": report, "statistics": summary });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DATASET OVERVIEW");
    println!("{}\n", "=".repeat(80));
    println!("  Rows:           {}", report.overview.total_rows);
    println!("  Columns:        {}", report.overview.total_columns);
    println!("  Memory:         {:.1} KB", report.overview.memory_usage_kb);
    println!("  Missing values: {}", report.overview.missing_values);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<10} {:<10}",
        "Column", "Type", "Non-Null", "Null", "Unique", "Missing %"
    );
    println!("{}", "-".repeat(76));
    for col in &report.columns {
        println!(
            "{:<20} {:<12} {:<10} {:<10} {:<10} {:<10.2}",
            truncate_str(&col.name, 19),
            col.dtype,
            col.non_null_count,
            col.null_count,
            col.unique_count,
            col.missing_percentage
        );
    }
    println!();

    println!("DATA QUALITY");
    println!("{}", "-".repeat(40));
    if report.missing_values.is_empty() {
        println!("  No missing values found");
    } else {
        for entry in &report.missing_values {
            println!(
                "  - {}: {} missing ({:.2}%)",
                entry.column, entry.missing_count, entry.missing_percentage
            );
        }
    }
    if report.has_duplicates() {
        println!(
            "  Found {} duplicate rows ({:.2}%)",
            report.duplicate_rows, report.duplicate_percentage
        );
    } else {
        println!("  No duplicate rows found");
    }
    let issues = report.type_issues();
    if issues.is_empty() {
        println!("  No obvious data type issues detected");
    } else {
        for issue in issues {
            println!("  - {}", issue);
        }
    }
    println!();

    if !summary.numeric.is_empty() {
        println!("NUMERIC COLUMNS");
        println!("{}", "-".repeat(40));
        println!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "Median", "Max"
        );
        for stats in &summary.numeric {
            println!(
                "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
                truncate_str(&stats.column, 19),
                stats.count,
                fmt_stat(stats.mean),
                fmt_stat(stats.std),
                fmt_stat(stats.min),
                fmt_stat(stats.median),
                fmt_stat(stats.max)
            );
        }
        println!();
    }

    if !summary.categorical.is_empty() {
        println!("CATEGORICAL COLUMNS");
        println!("{}", "-".repeat(40));
        println!(
            "{:<20} {:>8} {:<20} {:>10}",
            "Column", "Unique", "Most Frequent", "Frequency"
        );
        for stats in &summary.categorical {
            println!(
                "{:<20} {:>8} {:<20} {:>10}",
                truncate_str(&stats.column, 19),
                stats.unique_values,
                truncate_str(stats.most_frequent.as_deref().unwrap_or("-"), 19),
                stats.frequency
            );
        }
        println!();
    }

    let rows_shown = preview(dataset, mode, rows, max_rows)?;
    println!("PREVIEW ({:?}, {} rows)", mode, rows_shown.height());
    println!("{}", "-".repeat(40));
    println!("{}", rows_shown.frame());

    Ok(())
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to a maximum length, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
