//! Markdown documentation exporter
//!
//! Flattens each solution into a readable report: title, description, an
//! overview list, one section per AWS service and a numbered list of
//! recommendations. Solutions are separated by a horizontal rule.

use super::{ExportError, RenderContext, RenderedExport, SolutionRenderer, format_amount};
use crate::models::{ExportFormat, ExportOptions, Solution};

/// Markdown documentation exporter
#[derive(Debug, Default, Clone)]
pub struct MarkdownExporter;

impl MarkdownExporter {
    pub fn new() -> Self {
        Self
    }

    /// Render all solutions into one Markdown document
    pub fn render_document(&self, solutions: &[Solution]) -> String {
        solutions
            .iter()
            .map(|solution| self.render_solution(solution))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_solution(&self, solution: &Solution) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", solution.title));
        md.push_str(&format!("{}\n\n", solution.description));

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Status**: {}\n", solution.status.label()));
        let cost = solution
            .cost_estimate
            .map(format_amount)
            .unwrap_or_else(|| "TBD".to_string());
        md.push_str(&format!("- **Cost Estimate**: ${}/month\n", cost));
        md.push_str(&format!(
            "- **Created**: {}\n",
            solution.created_at.format("%Y-%m-%d")
        ));
        md.push_str(&format!(
            "- **Last Updated**: {}\n",
            solution.updated_at.format("%Y-%m-%d")
        ));
        let tags = solution.tag_list();
        let tags = if tags.is_empty() {
            "None".to_string()
        } else {
            tags.join(", ")
        };
        md.push_str(&format!("- **Tags**: {}\n\n", tags));

        md.push_str("## AWS Services\n\n");
        let services: Vec<String> = solution
            .services()
            .iter()
            .map(|service| {
                format!(
                    "### {}\n\n**Purpose**: {}\n\n**Configuration**: {}\n",
                    service.name, service.purpose, service.configuration
                )
            })
            .collect();
        md.push_str(&services.join("\n"));
        md.push('\n');

        md.push_str("## Recommendations\n\n");
        let recommendations: Vec<String> = solution
            .recommendation_list()
            .iter()
            .enumerate()
            .map(|(i, rec)| format!("{}. {}", i + 1, rec))
            .collect();
        md.push_str(&recommendations.join("\n"));
        md.push_str("\n\n---\n");

        md
    }
}

impl SolutionRenderer for MarkdownExporter {
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
            ctx.timestamped_filename("vibesolver-documentation", "md"),
            ExportFormat::Markdown,
            self.render_document(solutions),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AwsService, SolutionStatus};
    use chrono::{TimeZone, Utc};

    fn demo() -> Solution {
        let mut solution = Solution::new("s1", "Demo", "A demo solution")
            .with_services(&[
                AwsService::new("Amazon S3", "Storage", "Standard"),
                AwsService::new("AWS Lambda", "Compute", "Node 20"),
            ])
            .with_recommendations(&["Enable logging", "Use versioning"])
            .with_tags(&["web", "static"])
            .with_cost_estimate(42.0)
            .with_status(SolutionStatus::Active);
        solution.created_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        solution.updated_at = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        solution
    }

    #[test]
    fn test_render_solution() {
        let md = MarkdownExporter::new().render_document(&[demo()]);
        assert!(md.starts_with("# Demo\n\nA demo solution\n\n## Overview\n\n"));
        assert!(md.contains("- **Status**: Active\n"));
        assert!(md.contains("- **Cost Estimate**: $42/month\n"));
        assert!(md.contains("- **Created**: 2024-01-15\n"));
        assert!(md.contains("- **Last Updated**: 2024-02-01\n"));
        assert!(md.contains("- **Tags**: web, static\n"));
        assert!(md.contains(
            "### Amazon S3\n\n**Purpose**: Storage\n\n**Configuration**: Standard\n\n### AWS Lambda"
        ));
        assert!(md.contains("## Recommendations\n\n1. Enable logging\n2. Use versioning\n\n---\n"));
    }

    #[test]
    fn test_missing_fields() {
        let solution = Solution::new("s2", "Bare", "Nothing here");
        let md = MarkdownExporter::new().render_document(&[solution]);
        assert!(md.contains("- **Cost Estimate**: $TBD/month\n"));
        assert!(md.contains("- **Tags**: None\n"));
        assert!(md.contains("- **Status**: Draft\n"));
        assert!(!md.contains("###"));
    }

    #[test]
    fn test_solutions_are_separated_by_rule() {
        let md = MarkdownExporter::new().render_document(&[demo(), demo()]);
        assert_eq!(md.matches("\n---\n").count(), 2);
        assert!(md.contains("---\n\n# Demo"));
    }
}
