//! Export functionality
//!
//! Provides renderers for the supported formats:
//! - PDF report
//! - PNG / SVG architecture diagram
//! - JSON and YAML structured data
//! - Markdown documentation
//! - Terraform scaffold
//!
//! [`ExportFacade`] dispatches on [`ExportFormat`] and hands the rendered
//! payload to a [`Delivery`] sink.

pub mod delivery;
pub mod diagram;
pub mod facade;
pub mod json;
pub mod markdown;
pub mod pdf;
pub mod terraform;
pub mod yaml;

use crate::models::{ExportFormat, ExportOptions, Solution};
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No solutions selected for export")]
    NoSolutions,
    #[error("Architecture diagram not found")]
    DiagramNotFound,
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(ExportFormat),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Render error: {0}")]
    RenderError(String),
    #[error("Image error: {0}")]
    ImageError(String),
    #[error("Delivery error: {0}")]
    DeliveryError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::IoError(err.to_string())
    }
}

/// Point in time an export call runs at
///
/// Filenames and embedded timestamps of one call all derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub exported_at: DateTime<Utc>,
}

impl RenderContext {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(exported_at: DateTime<Utc>) -> Self {
        Self { exported_at }
    }

    pub fn epoch_millis(&self) -> i64 {
        self.exported_at.timestamp_millis()
    }

    /// `YYYY-MM-DD` in UTC
    pub fn iso_date(&self) -> String {
        self.exported_at.format("%Y-%m-%d").to_string()
    }

    /// RFC 3339 with millisecond precision and `Z` suffix
    pub fn iso_timestamp(&self) -> String {
        self.exported_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `{prefix}-{epochMillis}.{extension}`
    pub fn timestamped_filename(&self, prefix: &str, extension: &str) -> String {
        format!("{}-{}.{}", prefix, self.epoch_millis(), extension)
    }
}

/// Payload of a rendered export
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    Text(String),
    Binary(Vec<u8>),
}

impl ExportData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ExportData::Text(text) => text.as_bytes(),
            ExportData::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExportData::Text(text) => Some(text),
            ExportData::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Text stays as-is, binary formats are base64 encoded
impl Serialize for ExportData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExportData::Text(text) => serializer.serialize_str(text),
            ExportData::Binary(bytes) => serializer
                .serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
        }
    }
}

/// A named payload ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub data: ExportData,
}

impl RenderedExport {
    pub fn text(filename: String, format: ExportFormat, text: String) -> Self {
        Self {
            filename,
            mime_type: format.mime_type(),
            data: ExportData::Text(text),
        }
    }

    pub fn binary(filename: String, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename,
            mime_type: format.mime_type(),
            data: ExportData::Binary(bytes),
        }
    }
}

/// Result of an export call
#[derive(Debug, Clone, Serialize)]
#[must_use = "export results report success or failure and should be checked"]
pub struct ExportResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExportData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    pub fn succeeded(export: RenderedExport) -> Self {
        Self {
            success: true,
            filename: Some(export.filename),
            data: Some(export.data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A renderer that turns a batch of solutions into one payload
pub trait SolutionRenderer {
    fn render(
        &self,
        solutions: &[Solution],
        options: &ExportOptions,
        ctx: &RenderContext,
    ) -> Result<RenderedExport, ExportError>;
}

/// Format a monetary amount the way the UI prints numbers (`42`, `42.5`)
pub(crate) fn format_amount(amount: f64) -> String {
    if amount.is_finite() && amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

// Re-export for convenience
pub use delivery::{Delivery, DirectoryDelivery, MemoryDelivery};
#[cfg(feature = "png-export")]
pub use diagram::rasterize_png;
pub use diagram::{ArchitectureCanvas, BoundingBox, DiagramElement, ImageExporter, ImageFormat};
pub use facade::ExportFacade;
pub use json::{ExportDocument, JsonExporter};
pub use markdown::MarkdownExporter;
pub use pdf::{PdfExporter, PdfLayout};
pub use terraform::{TerraformExporter, resource_type_for};
pub use yaml::YamlExporter;
