//! CLI-specific error types

use crate::config::ConfigError;
use crate::export::ExportError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Solution not found: {0}")]
    SolutionNotFound(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),
}
