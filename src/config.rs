//! Export configuration file support
//!
//! Handles parsing of `.vibesolver.toml` configuration files and
//! environment variable overrides. Every section is optional; a missing
//! file yields the same defaults the export dialog starts with.

use crate::export::{DirectoryDelivery, TerraformExporter};
use crate::models::{ExportFormat, ExportOptions, Orientation, PageSize, Quality};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".vibesolver.toml";

/// Environment variable for the output directory
pub const ENV_OUTPUT_DIR: &str = "VIBESOLVER_OUTPUT_DIR";

/// Environment variable allowing existing files to be replaced
pub const ENV_OVERWRITE: &str = "VIBESOLVER_OVERWRITE";

/// Environment variable for the default `aws_region` of Terraform output
pub const ENV_AWS_REGION: &str = "VIBESOLVER_AWS_REGION";

/// Environment variable for the default `environment` of Terraform output
pub const ENV_ENVIRONMENT: &str = "VIBESOLVER_ENVIRONMENT";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializationError(String),
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Directory exports are written to
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Replace files that already exist
    #[serde(default)]
    pub overwrite: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            overwrite: false,
        }
    }
}

/// PDF configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfSection {
    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub orientation: Orientation,
}

/// Image configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSection {
    #[serde(default)]
    pub quality: Quality,
}

/// Section inclusion defaults (PDF only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default = "default_true")]
    pub include_architecture: bool,

    #[serde(default = "default_true")]
    pub include_details: bool,

    #[serde(default = "default_true")]
    pub include_recommendations: bool,

    #[serde(default = "default_true")]
    pub include_cost_analysis: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            include_architecture: true,
            include_details: true,
            include_recommendations: true,
            include_cost_analysis: true,
        }
    }
}

/// Terraform variable defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformSection {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Default for TerraformSection {
    fn default() -> Self {
        Self {
            region: default_region(),
            environment: default_environment(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.vibesolver.toml` configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub pdf: PdfSection,

    #[serde(default)]
    pub image: ImageSection,

    #[serde(default)]
    pub content: ContentSection,

    #[serde(default)]
    pub terraform: TerraformSection,
}

impl ExportConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.vibesolver.toml` in the directory. Falls back to
    /// defaults if not found. Environment overrides are applied last.
    pub fn load(directory: &Path) -> Result<Self, ConfigError> {
        let config_path = directory.join(CONFIG_FILENAME);
        let mut config = if config_path.exists() {
            Self::load_file(&config_path)?
        } else {
            debug!("No {} in {}, using defaults", CONFIG_FILENAME, directory.display());
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file, without env overrides
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationError(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output.directory = PathBuf::from(dir);
        }

        if let Some(value) = lookup(ENV_OVERWRITE) {
            match parse_bool(&value) {
                Some(overwrite) => self.output.overwrite = overwrite,
                None => warn!("Ignoring {}={}: expected true or false", ENV_OVERWRITE, value),
            }
        }

        if let Some(region) = lookup(ENV_AWS_REGION) {
            self.terraform.region = region;
        }

        if let Some(environment) = lookup(ENV_ENVIRONMENT) {
            self.terraform.environment = environment;
        }
    }

    /// Options for one export call in `format`
    pub fn export_options(&self, format: ExportFormat) -> ExportOptions {
        ExportOptions {
            format,
            include_architecture: self.content.include_architecture,
            include_details: self.content.include_details,
            include_recommendations: self.content.include_recommendations,
            include_cost_analysis: self.content.include_cost_analysis,
            quality: self.image.quality,
            page_size: self.pdf.page_size,
            orientation: self.pdf.orientation,
        }
    }

    /// Delivery writing into the configured output directory
    pub fn delivery(&self) -> DirectoryDelivery {
        DirectoryDelivery::new(&self.output.directory).with_overwrite(self.output.overwrite)
    }

    /// Terraform exporter with the configured variable defaults
    pub fn terraform_exporter(&self) -> TerraformExporter {
        TerraformExporter::new(&self.terraform.region, &self.terraform.environment)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# VibeSolver export configuration

[output]
# Directory exports are written to
directory = "."
# Replace files that already exist
overwrite = false

[pdf]
# "A4", "letter" or "legal"
page_size = "A4"
# "portrait" or "landscape"
orientation = "portrait"

[image]
# "low", "medium" or "high"
quality = "high"

[content]
include_architecture = true
include_details = true
include_recommendations = true
include_cost_analysis = true

[terraform]
region = "us-east-1"
environment = "dev"
"#
}
