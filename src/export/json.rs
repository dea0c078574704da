//! JSON exporter
//!
//! Produces the canonical export document:
//!
//! ```json
//! {
//!   "metadata": { "exportedAt": "...", "version": "1.0", "count": 1, "generator": "VibeSolver" },
//!   "solutions": [ { "id": "...", "awsServices": [ ... ], "architecture": { ... }, ... } ]
//! }
//! ```
//!
//! The JSON-encoded fields of each solution are emitted as nested values,
//! never as strings. A previously exported document can be read back with
//! [`JsonExporter::read_document`] and turned into solutions again.

use super::{ExportError, RenderContext, RenderedExport, SolutionRenderer};
use crate::models::{EncodedField, ExportFormat, ExportOptions, Solution, SolutionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXPORT_VERSION: &str = "1.0";
pub const GENERATOR: &str = "VibeSolver";

/// Export document metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: String,
    pub version: String,
    pub count: usize,
    pub generator: String,
}

/// A solution with its encoded fields decoded into nested values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedSolution {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_array")]
    pub aws_services: Value,
    #[serde(default)]
    pub architecture: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default = "empty_array")]
    pub recommendations: Value,
    #[serde(default = "empty_array")]
    pub tags: Value,
    #[serde(default)]
    pub status: SolutionStatus,
    #[serde(default)]
    pub cost_estimate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

impl ExportedSolution {
    /// Decode a stored solution; malformed fields become `[]` / `null`
    pub fn from_solution(solution: &Solution) -> Self {
        let list = |field: EncodedField| solution.decoded_value(field).unwrap_or_else(empty_array);
        Self {
            id: solution.id.clone(),
            title: solution.title.clone(),
            description: solution.description.clone(),
            aws_services: list(EncodedField::AwsServices),
            architecture: solution
                .decoded_value(EncodedField::Architecture)
                .unwrap_or(Value::Null),
            requirements: solution.requirements.clone(),
            recommendations: list(EncodedField::Recommendations),
            tags: list(EncodedField::Tags),
            status: solution.status,
            cost_estimate: solution.cost_estimate,
            created_at: solution.created_at,
            updated_at: solution.updated_at,
        }
    }

    /// Re-encode nested fields into the stored record shape
    pub fn into_solution(self) -> Result<Solution, ExportError> {
        Ok(Solution {
            id: self.id,
            title: self.title,
            description: self.description,
            aws_services: encode(&self.aws_services)?,
            architecture: encode(&self.architecture)?,
            requirements: self.requirements,
            recommendations: encode(&self.recommendations)?,
            tags: encode(&self.tags)?,
            status: self.status,
            cost_estimate: self.cost_estimate,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode(value: &Value) -> Result<Option<String>, ExportError> {
    match value {
        Value::Null => Ok(None),
        other => Ok(Some(serde_json::to_string(other)?)),
    }
}

/// The complete JSON export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub solutions: Vec<ExportedSolution>,
}

impl ExportDocument {
    pub fn new(solutions: &[Solution], ctx: &RenderContext) -> Self {
        Self {
            metadata: ExportMetadata {
                exported_at: ctx.iso_timestamp(),
                version: EXPORT_VERSION.to_string(),
                count: solutions.len(),
                generator: GENERATOR.to_string(),
            },
            solutions: solutions.iter().map(ExportedSolution::from_solution).collect(),
        }
    }

    /// Convert the exported solutions back into stored records
    pub fn into_solutions(self) -> Result<Vec<Solution>, ExportError> {
        self.solutions
            .into_iter()
            .map(ExportedSolution::into_solution)
            .collect()
    }
}

/// JSON exporter
#[derive(Debug, Default, Clone)]
pub struct JsonExporter;

impl JsonExporter {
    pub fn new() -> Self {
        Self
    }

    /// Build the export document and serialize it with two-space indentation
    pub fn render_document(
        &self,
        solutions: &[Solution],
        ctx: &RenderContext,
    ) -> Result<String, ExportError> {
        let document = ExportDocument::new(solutions, ctx);
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Parse a previously exported document
    pub fn read_document(json: &str) -> Result<ExportDocument, ExportError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl SolutionRenderer for JsonExporter {
    fn render(
        &self,
        solutions: &[Solution],
        _options: &ExportOptions,
        ctx: &RenderContext,
    ) -> Result<RenderedExport, ExportError> {
        if solutions.is_empty() {
            return Err(ExportError::NoSolutions);
        }
        Ok(RenderedExport::text(
            ctx.timestamped_filename("vibesolver-export", "json"),
            ExportFormat::Json,
            self.render_document(solutions, ctx)?,
        ))
    }
}
