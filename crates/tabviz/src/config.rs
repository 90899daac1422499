//! Configuration surface consumed by the core.
//!
//! The shell owns a [`DashboardConfig`] and hands it to the core as plain
//! values; the core never mutates it. Use the builder for validated
//! construction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::FileFormat;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex colour pattern"));

/// Page layout requested by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Centered,
    #[default]
    Wide,
}

/// Initial state of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SidebarState {
    Auto,
    #[default]
    Expanded,
    Collapsed,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Main heading shown by the shell.
    pub title: String,
    pub page_title: String,
    pub page_icon: String,
    pub layout: Layout,
    pub initial_sidebar_state: SidebarState,

    /// Log level used when the shell initialises logging.
    /// Default: "info"
    pub log_level: String,

    /// Largest accepted upload.
    /// Default: 200
    pub max_upload_size_mb: u64,

    /// Closed list of upload formats.
    /// Default: [csv, json]
    pub allowed_file_formats: Vec<FileFormat>,

    /// Maximum rows shown by a data preview.
    /// Default: 1000
    pub preview_max_rows: usize,

    /// Accent colour; also used for single-series chart exports.
    /// Default: "#FF6B6B"
    pub theme_primary_color: String,
    pub theme_background_color: String,
    pub theme_secondary_background_color: String,
    pub theme_text_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Tabular Data Dashboard".to_string(),
            page_title: "Data Dashboard".to_string(),
            page_icon: "📊".to_string(),
            layout: Layout::default(),
            initial_sidebar_state: SidebarState::default(),
            log_level: "info".to_string(),
            max_upload_size_mb: 200,
            allowed_file_formats: FileFormat::ALL.to_vec(),
            preview_max_rows: 1000,
            theme_primary_color: "#FF6B6B".to_string(),
            theme_background_color: "#FFFFFF".to_string(),
            theme_secondary_background_color: "#F0F2F6".to_string(),
            theme_text_color: "#262730".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_upload_size_mb == 0 {
            return Err(ConfigValidationError::InvalidUploadSize(
                self.max_upload_size_mb,
            ));
        }

        if self.allowed_file_formats.is_empty() {
            return Err(ConfigValidationError::NoAllowedFormats);
        }

        if self.preview_max_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(
                self.preview_max_rows,
            ));
        }

        for (field, value) in [
            ("theme_primary_color", &self.theme_primary_color),
            ("theme_background_color", &self.theme_background_color),
            (
                "theme_secondary_background_color",
                &self.theme_secondary_background_color,
            ),
            ("theme_text_color", &self.theme_text_color),
        ] {
            if !HEX_COLOR.is_match(value) {
                return Err(ConfigValidationError::InvalidColor {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }

    /// The accent colour as RGB components.
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.theme_primary_color).unwrap_or((0xFF, 0x6B, 0x6B))
    }
}

/// Parse `#RRGGBB` into components.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    if !HEX_COLOR.is_match(value) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&value[range], 16).ok();
    Some((channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid max upload size: {0} MB (must be at least 1)")]
    InvalidUploadSize(u64),

    #[error("At least one upload format must be allowed")]
    NoAllowedFormats,

    #[error("Invalid preview row limit: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Invalid colour for '{field}': {value} (expected #RRGGBB)")]
    InvalidColor { field: String, value: String },
}

impl From<ConfigValidationError> for crate::error::DashboardError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::DashboardError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`DashboardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    title: Option<String>,
    page_title: Option<String>,
    page_icon: Option<String>,
    layout: Option<Layout>,
    initial_sidebar_state: Option<SidebarState>,
    log_level: Option<String>,
    max_upload_size_mb: Option<u64>,
    allowed_file_formats: Option<Vec<FileFormat>>,
    preview_max_rows: Option<usize>,
    theme_primary_color: Option<String>,
}

impl DashboardConfigBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }

    pub fn page_icon(mut self, icon: impl Into<String>) -> Self {
        self.page_icon = Some(icon.into());
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn initial_sidebar_state(mut self, state: SidebarState) -> Self {
        self.initial_sidebar_state = Some(state);
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Set the largest accepted upload, in megabytes.
    pub fn max_upload_size_mb(mut self, size: u64) -> Self {
        self.max_upload_size_mb = Some(size);
        self
    }

    /// Restrict the accepted upload formats.
    pub fn allowed_file_formats(mut self, formats: Vec<FileFormat>) -> Self {
        self.allowed_file_formats = Some(formats);
        self
    }

    /// Set the row cap for data previews.
    pub fn preview_max_rows(mut self, rows: usize) -> Self {
        self.preview_max_rows = Some(rows);
        self
    }

    /// Set the accent colour (`#RRGGBB`).
    pub fn theme_primary_color(mut self, color: impl Into<String>) -> Self {
        self.theme_primary_color = Some(color.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `DashboardConfig` or an error if validation fails.
    pub fn build(self) -> Result<DashboardConfig, ConfigValidationError> {
        let defaults = DashboardConfig::default();
        let config = DashboardConfig {
            title: self.title.unwrap_or(defaults.title),
            page_title: self.page_title.unwrap_or(defaults.page_title),
            page_icon: self.page_icon.unwrap_or(defaults.page_icon),
            layout: self.layout.unwrap_or_default(),
            initial_sidebar_state: self.initial_sidebar_state.unwrap_or_default(),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            max_upload_size_mb: self
                .max_upload_size_mb
                .unwrap_or(defaults.max_upload_size_mb),
            allowed_file_formats: self
                .allowed_file_formats
                .unwrap_or(defaults.allowed_file_formats),
            preview_max_rows: self.preview_max_rows.unwrap_or(defaults.preview_max_rows),
            theme_primary_color: self
                .theme_primary_color
                .unwrap_or(defaults.theme_primary_color),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
