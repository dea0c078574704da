//! YAML exporter
//!
//! Writes one YAML document per solution, each opened with `---`. The
//! documents are built by hand to keep a fixed, flat key order; every
//! string scalar is double quoted.

use super::{ExportError, RenderContext, RenderedExport, SolutionRenderer, format_amount};
use crate::models::{ExportFormat, ExportOptions, Solution};
use chrono::SecondsFormat;

/// Quote a string as a YAML double-quoted scalar
fn quote(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// YAML exporter
#[derive(Debug, Default, Clone)]
pub struct YamlExporter;

impl YamlExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render all solutions as a multi-document YAML stream
    pub fn render_documents(&self, solutions: &[Solution]) -> String {
        solutions
            .iter()
            .map(|solution| self.render_solution(solution))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_solution(&self, solution: &Solution) -> String {
        let mut yaml = String::from("---\n");

        yaml.push_str(&format!("name: {}\n", quote(&solution.title)));
        yaml.push_str(&format!("description: {}\n", quote(&solution.description)));
        yaml.push_str(&format!("status: {}\n", solution.status.as_str()));
        // Unknown cost is written as 0
        yaml.push_str(&format!(
            "cost_estimate: {}\n",
            format_amount(solution.cost_estimate.unwrap_or(0.0))
        ));

        let tags: Vec<String> = solution.tag_list().iter().map(|t| quote(t)).collect();
        yaml.push_str(&format!("tags: [{}]\n", tags.join(", ")));

        let services = solution.services();
        if services.is_empty() {
            yaml.push_str("aws_services: []\n");
        } else {
            yaml.push_str("aws_services:\n");
            for service in &services {
                yaml.push_str(&format!("  - name: {}\n", quote(&service.name)));
                yaml.push_str(&format!("    purpose: {}\n", quote(&service.purpose)));
                yaml.push_str(&format!(
                    "    configuration: {}\n",
                    quote(&service.configuration)
                ));
            }
        }

        let recommendations = solution.recommendation_list();
        if recommendations.is_empty() {
            yaml.push_str("recommendations: []\n");
        } else {
            yaml.push_str("recommendations:\n");
            for rec in &recommendations {
                yaml.push_str(&format!("  - {}\n", quote(rec)));
            }
        }

        yaml.push_str(&format!(
            "created_at: {}\n",
            quote(&solution.created_at.to_rfc3339_opts(SecondsFormat::Millis, true))
        ));
        yaml.push_str(&format!(
            "updated_at: {}\n",
            quote(&solution.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true))
        ));

        yaml
    }
}

impl SolutionRenderer for YamlExporter {
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
            ctx.timestamped_filename("vibesolver-export", "yaml"),
            ExportFormat::Yaml,
            self.render_documents(solutions),
        ))
    }
}
