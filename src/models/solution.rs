//! Solution record and its JSON-encoded sub-structures
//!
//! The persistence layer stores `awsServices`, `architecture`,
//! `recommendations` and `tags` as JSON text. Decoding is best-effort: a
//! field that fails to parse, or parses to the wrong shape, is treated as
//! absent so that one bad record never aborts an export batch.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Lifecycle status of a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

impl SolutionStatus {
    /// Lowercase tag as stored and emitted in structured formats
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionStatus::Draft => "draft",
            SolutionStatus::Active => "active",
            SolutionStatus::Archived => "archived",
        }
    }

    /// Capitalized label for human-readable documents
    pub fn label(&self) -> &'static str {
        match self {
            SolutionStatus::Draft => "Draft",
            SolutionStatus::Active => "Active",
            SolutionStatus::Archived => "Archived",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An AWS service recommended by a solution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsService {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub configuration: String,
}

impl AwsService {
    pub fn new(name: &str, purpose: &str, configuration: &str) -> Self {
        Self {
            name: name.to_string(),
            purpose: purpose.to_string(),
            configuration: configuration.to_string(),
        }
    }
}

/// Canvas position of a diagram component (pixels, top-left origin)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node in the architecture diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureComponent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub position: Position,
}

/// A directed edge between two components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConnection {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: String,
}

/// Component/connection graph behind a solution's diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    #[serde(default)]
    pub components: Vec<ArchitectureComponent>,
    #[serde(default)]
    pub connections: Vec<ArchitectureConnection>,
}

impl Architecture {
    /// Look up a component by id
    pub fn component(&self, id: &str) -> Option<&ArchitectureComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Display name for a component id, falling back to the raw id
    pub fn component_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.component(id).map(|c| c.name.as_str()).unwrap_or(id)
    }
}

/// JSON-encoded fields of a solution record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedField {
    AwsServices,
    Architecture,
    Recommendations,
    Tags,
}

impl EncodedField {
    /// Key of the field in the stored record
    pub fn key(&self) -> &'static str {
        match self {
            EncodedField::AwsServices => "awsServices",
            EncodedField::Architecture => "architecture",
            EncodedField::Recommendations => "recommendations",
            EncodedField::Tags => "tags",
        }
    }
}

/// A single AI-generated (or user-edited) AWS architecture recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// JSON array of `{name, purpose, configuration}`
    #[serde(default)]
    pub aws_services: Option<String>,
    /// JSON `{components, connections}`
    #[serde(default)]
    pub architecture: Option<String>,
    /// Free-text requirements the solution was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    /// JSON array of strings
    #[serde(default)]
    pub recommendations: Option<String>,
    /// JSON array of strings
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub status: SolutionStatus,
    /// Monthly cost estimate, if known
    #[serde(default)]
    pub cost_estimate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Solution {
    /// Create a solution with no services, architecture, recommendations or tags
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            aws_services: None,
            architecture: None,
            requirements: None,
            recommendations: None,
            tags: None,
            status: SolutionStatus::Draft,
            cost_estimate: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_services(mut self, services: &[AwsService]) -> Self {
        self.aws_services = serde_json::to_string(services).ok();
        self
    }

    pub fn with_architecture(mut self, architecture: &Architecture) -> Self {
        self.architecture = serde_json::to_string(architecture).ok();
        self
    }

    pub fn with_recommendations(mut self, recommendations: &[&str]) -> Self {
        self.recommendations = serde_json::to_string(recommendations).ok();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = serde_json::to_string(tags).ok();
        self
    }

    pub fn with_cost_estimate(mut self, cost: f64) -> Self {
        self.cost_estimate = Some(cost);
        self
    }

    pub fn with_status(mut self, status: SolutionStatus) -> Self {
        self.status = status;
        self
    }

    /// Raw JSON text of an encoded field
    pub fn raw_field(&self, field: EncodedField) -> Option<&str> {
        match field {
            EncodedField::AwsServices => self.aws_services.as_deref(),
            EncodedField::Architecture => self.architecture.as_deref(),
            EncodedField::Recommendations => self.recommendations.as_deref(),
            EncodedField::Tags => self.tags.as_deref(),
        }
    }

    /// Decoded AWS services; empty when absent or malformed
    pub fn services(&self) -> Vec<AwsService> {
        self.decode(EncodedField::AwsServices).unwrap_or_default()
    }

    /// Decoded architecture graph, if present and well-formed
    pub fn architecture_graph(&self) -> Option<Architecture> {
        self.decode(EncodedField::Architecture)
    }

    /// Decoded recommendations; empty when absent or malformed
    pub fn recommendation_list(&self) -> Vec<String> {
        self.decode(EncodedField::Recommendations)
            .unwrap_or_default()
    }

    /// Decoded tags; empty when absent or malformed
    pub fn tag_list(&self) -> Vec<String> {
        self.decode(EncodedField::Tags).unwrap_or_default()
    }

    /// Decode an encoded field as a generic JSON value, keeping every key
    /// the stored text carries, but only if it matches the documented shape.
    pub fn decoded_value(&self, field: EncodedField) -> Option<Value> {
        let value = self.parse_value(field)?;
        let shape_ok = match field {
            EncodedField::AwsServices => {
                serde_json::from_value::<Vec<AwsService>>(value.clone()).is_ok()
            }
            EncodedField::Architecture => {
                serde_json::from_value::<Architecture>(value.clone()).is_ok()
            }
            EncodedField::Recommendations | EncodedField::Tags => {
                serde_json::from_value::<Vec<String>>(value.clone()).is_ok()
            }
        };
        if shape_ok {
            Some(value)
        } else {
            warn!(
                "Solution {} field '{}' does not match the expected shape, treating as empty",
                self.id,
                field.key()
            );
            None
        }
    }

    fn decode<T: DeserializeOwned>(&self, field: EncodedField) -> Option<T> {
        let value = self.parse_value(field)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(
                    "Solution {} field '{}' does not match the expected shape, treating as empty: {}",
                    self.id,
                    field.key(),
                    e
                );
                None
            }
        }
    }

    fn parse_value(&self, field: EncodedField) -> Option<Value> {
        let raw = self.raw_field(field)?.trim();
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => None,
            Ok(value) if !has_record_layout(field, &value) => {
                warn!(
                    "Solution {} field '{}' does not match the expected shape, treating as empty",
                    self.id,
                    field.key()
                );
                None
            }
            Ok(value) => Some(value),
            Err(e) => {
                warn!(
                    "Solution {} field '{}' is not valid JSON, treating as empty: {}",
                    self.id,
                    field.key(),
                    e
                );
                None
            }
        }
    }
}

/// Records must be JSON objects, not positional arrays like
/// `["S3", "Storage", "Std"]`
fn has_record_layout(field: EncodedField, value: &Value) -> bool {
    fn objects(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.iter().all(Value::is_object),
            Some(_) => false,
        }
    }

    match field {
        EncodedField::AwsServices => objects(Some(value)),
        EncodedField::Architecture => {
            let Some(map) = value.as_object() else {
                return false;
            };
            let positions_ok = map
                .get("components")
                .and_then(Value::as_array)
                .is_none_or(|components| {
                    components.iter().all(|c| {
                        matches!(c.get("position"), None | Some(Value::Null | Value::Object(_)))
                    })
                });
            objects(map.get("components")) && objects(map.get("connections")) && positions_ok
        }
        EncodedField::Recommendations | EncodedField::Tags => true,
    }
}
