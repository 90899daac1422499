//! Error types for the inspection and charting core.
//!
//! Every failure the core can produce is a variant of [`DashboardError`].
//! All of them are recoverable at the call boundary: the shell displays the
//! message and keeps its previous view state.
//!
//! Errors are serializable so a front end can receive them as
//! `{ "code": ..., "message": ... }`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::chart::ChartKind;
use crate::export::ExportFormat;

/// The main error type for the dashboard core.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The uploaded file has an extension the loader does not accept.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The decoder rejected the uploaded bytes.
    #[error("Failed to parse {format} file: {message}")]
    ParseError { format: String, message: String },

    /// The upload exceeds the configured size limit.
    #[error("File is {size_mb:.1} MB, which exceeds the {limit_mb} MB upload limit")]
    UploadTooLarge { size_mb: f64, limit_mb: u64 },

    /// A chart references a column that is not in the dataset.
    #[error("Column '{column}' not found for {kind}")]
    InvalidColumn { column: String, kind: ChartKind },

    /// Chart construction failed for any other reason.
    #[error("Failed to create {kind}: {cause}")]
    ChartConstruction { kind: ChartKind, cause: String },

    /// Serializing a dataset or chart failed.
    #[error("Failed to export {format}: {reason}")]
    Export { format: ExportFormat, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<DashboardError>,
    },
}

impl DashboardError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        DashboardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Wrap any failure raised while building a chart.
    pub fn chart(kind: ChartKind, cause: impl std::fmt::Display) -> Self {
        DashboardError::ChartConstruction {
            kind,
            cause: cause.to_string(),
        }
    }

    /// Wrap any failure raised while exporting.
    pub fn export(format: ExportFormat, reason: impl std::fmt::Display) -> Self {
        DashboardError::Export {
            format,
            reason: reason.to_string(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ParseError { .. } => "PARSE_ERROR",
            Self::UploadTooLarge { .. } => "UPLOAD_TOO_LARGE",
            Self::InvalidColumn { .. } => "INVALID_COLUMN",
            Self::ChartConstruction { .. } => "CHART_CONSTRUCTION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error came from bad user input rather than an internal fault.
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_)
            | Self::ParseError { .. }
            | Self::UploadTooLarge { .. }
            | Self::InvalidColumn { .. }
            | Self::ChartConstruction { .. }
            | Self::ColumnNotFound(_)
            | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_user_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DashboardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| DashboardError::Polars(e).with_context(context))
    }
}
