//! Per-call export options
//!
//! The section-inclusion flags are only honored by the PDF renderer; every
//! other format always emits the full solution content.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Png,
    Svg,
    Json,
    Yaml,
    Markdown,
    Terraform,
    /// Declared for hosts but not implemented; always rejected by the facade
    #[serde(rename = "cloudformation")]
    CloudFormation,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 8] = [
        ExportFormat::Pdf,
        ExportFormat::Png,
        ExportFormat::Svg,
        ExportFormat::Json,
        ExportFormat::Yaml,
        ExportFormat::Markdown,
        ExportFormat::Terraform,
        ExportFormat::CloudFormation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Terraform => "terraform",
            ExportFormat::CloudFormation => "cloudformation",
        }
    }

    /// Content type of the delivered payload
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "text/yaml",
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Terraform => "text/plain",
            ExportFormat::CloudFormation => "application/json",
        }
    }

    /// Whether the format captures the rendered architecture diagram
    pub fn is_image(&self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Svg)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown export format: {}", s))
    }
}

/// Image fidelity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

impl Quality {
    /// Rasterization scale factor
    pub fn scale(&self) -> f32 {
        match self {
            Quality::Low => 1.0,
            Quality::Medium => 1.5,
            Quality::High => 2.0,
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            _ => Err(format!(
                "Unknown quality: {}. Use 'low', 'medium' or 'high'.",
                s
            )),
        }
    }
}

/// Page size options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    /// A4 paper size (210 x 297 mm)
    #[default]
    #[serde(rename = "A4", alias = "a4")]
    A4,
    /// US Letter size (8.5 x 11 inches)
    #[serde(rename = "letter", alias = "Letter")]
    Letter,
    /// US Legal size (8.5 x 14 inches)
    #[serde(rename = "legal", alias = "Legal")]
    Legal,
}

impl PageSize {
    /// Get page dimensions in millimeters (width, height), portrait
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(format!(
                "Unknown page size: {}. Use 'A4', 'letter' or 'legal'.",
                s
            )),
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Orient portrait page dimensions
    pub fn apply(&self, (width, height): (f64, f64)) -> (f64, f64) {
        match self {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            _ => Err(format!(
                "Unknown orientation: {}. Use 'portrait' or 'landscape'.",
                s
            )),
        }
    }
}

/// Options for a single export call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    #[serde(default = "default_true")]
    pub include_architecture: bool,
    #[serde(default = "default_true")]
    pub include_details: bool,
    #[serde(default = "default_true")]
    pub include_recommendations: bool,
    #[serde(default = "default_true")]
    pub include_cost_analysis: bool,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
}

fn default_true() -> bool {
    true
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(ExportFormat::default())
    }
}

impl ExportOptions {
    /// Options with every section included, high quality, A4 portrait
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            include_architecture: true,
            include_details: true,
            include_recommendations: true,
            include_cost_analysis: true,
            quality: Quality::default(),
            page_size: PageSize::default(),
            orientation: Orientation::default(),
        }
    }

    /// Oriented page dimensions in millimeters (width, height)
    pub fn page_dimensions_mm(&self) -> (f64, f64) {
        self.orientation.apply(self.page_size.dimensions_mm())
    }
}
