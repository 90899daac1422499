//! Decoding uploaded bytes into a [`Dataset`].

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Dataset;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

/// Upload formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub const ALL: [Self; 2] = [Self::Csv, Self::Json];

    /// Resolve a format from a file name's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?;
        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads uploaded files, honouring the configured formats and size limit.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    allowed_formats: Vec<FileFormat>,
    max_upload_bytes: u64,
    max_upload_size_mb: u64,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(&DashboardConfig::default())
    }
}

impl DatasetLoader {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            allowed_formats: config.allowed_file_formats.clone(),
            max_upload_bytes: config.max_upload_size_mb.saturating_mul(1024 * 1024),
            max_upload_size_mb: config.max_upload_size_mb,
        }
    }

    /// Decode `bytes` according to the extension of `filename`.
    ///
    /// The result is all-or-nothing: on any failure no dataset is returned.
    pub fn load(&self, filename: &str, bytes: &[u8]) -> Result<Dataset> {
        let format = FileFormat::from_filename(filename)
            .filter(|format| self.allowed_formats.contains(format))
            .ok_or_else(|| DashboardError::UnsupportedFormat(filename.to_string()))?;

        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(DashboardError::UploadTooLarge {
                size_mb: bytes.len() as f64 / (1024.0 * 1024.0),
                limit_mb: self.max_upload_size_mb,
            });
        }

        debug!("Decoding {} bytes of {} from {}", bytes.len(), format, filename);
        let frame = match format {
            FileFormat::Csv => read_csv(bytes),
            FileFormat::Json => read_json(bytes),
        }
        .map_err(|e| DashboardError::ParseError {
            format: format.to_string(),
            message: e.to_string(),
        })?;

        let dataset = Dataset::new(frame);
        info!(
            "{} file loaded: {} ({} rows x {} columns)",
            format,
            filename,
            dataset.height(),
            dataset.width()
        );
        Ok(dataset)
    }

    /// Read a file from disk and decode it.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();

        if FileFormat::from_filename(&filename).is_none() {
            return Err(DashboardError::UnsupportedFormat(filename));
        }

        let bytes = std::fs::read(path)?;
        self.load(&filename, &bytes)
    }
}

/// Comma-delimited with a header row; the whole file is scanned for types.
fn read_csv(bytes: &[u8]) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_try_parse_dates(true),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
}

/// An array of flat objects, one per row; every record is scanned for types.
fn read_json(bytes: &[u8]) -> PolarsResult<DataFrame> {
    JsonReader::new(Cursor::new(bytes.to_vec()))
        .infer_schema_len(None)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ColumnKind;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(FileFormat::from_filename("data.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_filename("DATA.JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_filename("report.xlsx"), None);
        assert_eq!(FileFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_load_csv() {
        let csv = b"id,name,score\n1,a,1.5\n2,b,2.5\n3,c,3.5\n";
        let dataset = DatasetLoader::default().load("data.csv", csv).unwrap();

        assert_eq!(dataset.height(), 3);
        assert_eq!(dataset.column_names(), vec!["id", "name", "score"]);
        assert_eq!(dataset.kind_of("id"), Some(ColumnKind::Integer));
        assert_eq!(dataset.kind_of("name"), Some(ColumnKind::Text));
        assert_eq!(dataset.kind_of("score"), Some(ColumnKind::Float));
    }

    #[test]
    fn test_load_csv_header_only() {
        let dataset = DatasetLoader::default()
            .load("empty.csv", b"a,b,c\n")
            .unwrap();
        assert_eq!(dataset.height(), 0);
        assert_eq!(dataset.column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_json_records() {
        let json = br#"[{"x": 1, "label": "a"}, {"x": 2, "label": "b"}]"#;
        let dataset = DatasetLoader::default().load("rows.json", json).unwrap();

        assert_eq!(dataset.height(), 2);
        assert!(dataset.has_column("x"));
        assert!(dataset.has_column("label"));
        assert_eq!(dataset.kind_of("x"), Some(ColumnKind::Integer));
    }

    #[test]
    fn test_json_types_inferred_from_every_record() {
        let mut records: Vec<String> = (0..150)
            .map(|i| format!(r#"{{"a": null, "b": {}}}"#, i))
            .collect();
        records.push(r#"{"a": 5, "b": 1}"#.to_string());
        let json = format!("[{}]", records.join(","));

        let dataset = DatasetLoader::default()
            .load("late.json", json.as_bytes())
            .unwrap();
        assert_eq!(dataset.height(), 151);
        assert_eq!(dataset.kind_of("a"), Some(ColumnKind::Integer));
        assert_eq!(dataset.series("a").unwrap().null_count(), 150);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = DatasetLoader::default().load("data.xlsx", b"whatever");
        assert!(matches!(result, Err(DashboardError::UnsupportedFormat(name)) if name == "data.xlsx"));
    }

    #[test]
    fn test_format_outside_allowed_list() {
        let config = DashboardConfig::builder()
            .allowed_file_formats(vec![FileFormat::Csv])
            .build()
            .unwrap();
        let result = DatasetLoader::new(&config).load("rows.json", b"[]");
        assert!(matches!(result, Err(DashboardError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_malformed_csv_is_parse_error() {
        let csv = b"a,b\n1,2\n3,4,5,6\n";
        let result = DatasetLoader::default().load("bad.csv", csv);
        assert!(matches!(result, Err(DashboardError::ParseError { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = DatasetLoader::default().load("bad.json", br#"[{"a": 1}, {"a": "#);
        match result {
            Err(DashboardError::ParseError { format, message }) => {
                assert_eq!(format, "JSON");
                assert!(!message.is_empty());
            }
            other => panic!("expected ParseError, got {:?}", other.map(|d| d.height())),
        }
    }

    #[test]
    fn test_upload_size_limit() {
        let config = DashboardConfig::builder()
            .max_upload_size_mb(1)
            .build()
            .unwrap();
        let big = vec![b'1'; 1024 * 1024 + 1];
        let result = DatasetLoader::new(&config).load("big.csv", &big);
        assert!(matches!(
            result,
            Err(DashboardError::UploadTooLarge { limit_mb: 1, .. })
        ));
    }

    #[test]
    fn test_largest_upload_limit_does_not_overflow() {
        let config = DashboardConfig::builder()
            .max_upload_size_mb(u64::MAX)
            .build()
            .unwrap();
        let dataset = DatasetLoader::new(&config).load("small.csv", b"a\n1\n").unwrap();
        assert_eq!(dataset.height(), 1);
    }
}
