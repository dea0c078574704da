//! Terraform scaffold exporter
//!
//! Emits one self-contained template per solution: the pinned AWS provider,
//! `aws_region` / `environment` input variables, a resource stub per AWS
//! service and a `solution_info` output. The stubs are documentation
//! scaffolding; a service's free-text configuration only ever appears as
//! a comment.

use super::{ExportError, RenderContext, RenderedExport, SolutionRenderer, format_amount};
use crate::models::{AwsService, ExportFormat, ExportOptions, Solution};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Resource type used for services missing from the lookup table
pub const FALLBACK_RESOURCE_TYPE: &str = "aws_resource";

static RESOURCE_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ec2", "aws_instance"),
        ("rds", "aws_db_instance"),
        ("s3", "aws_s3_bucket"),
        ("lambda", "aws_lambda_function"),
        ("api_gateway", "aws_api_gateway_rest_api"),
        ("cloudfront", "aws_cloudfront_distribution"),
        ("elb", "aws_lb"),
        ("vpc", "aws_vpc"),
        ("iam", "aws_iam_role"),
    ])
});

/// Lowercase, trim and collapse whitespace runs to `_`
fn normalize_service_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Map a service name to its Terraform resource type
///
/// Case and whitespace insensitive; a leading `Amazon` / `AWS` is ignored
/// so `"Amazon S3"` and `"s3"` resolve alike. Unknown names map to
/// [`FALLBACK_RESOURCE_TYPE`].
pub fn resource_type_for(name: &str) -> &'static str {
    let normalized = normalize_service_name(name);
    let key = normalized
        .strip_prefix("amazon_")
        .or_else(|| normalized.strip_prefix("aws_"))
        .unwrap_or(&normalized);

    RESOURCE_TYPES
        .get(key)
        .or_else(|| RESOURCE_TYPES.get(normalized.as_str()))
        .copied()
        .unwrap_or_else(|| {
            debug!("No resource mapping for service '{}', using {}", name, FALLBACK_RESOURCE_TYPE);
            FALLBACK_RESOURCE_TYPE
        })
}

/// Resource label derived from a service name, e.g. `amazon_s3`
pub fn resource_label(name: &str) -> String {
    let mut label: String = normalize_service_name(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if label.is_empty() {
        label.push_str("service");
    }
    if label.starts_with(|c: char| c.is_ascii_digit()) {
        label.insert(0, '_');
    }
    label
}

/// Suffix `_2`, `_3`, ... onto labels already taken within one template
fn unique_label(used: &mut HashSet<String>, label: String) -> String {
    if used.insert(label.clone()) {
        return label;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", label, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Escape text for a double-quoted HCL string
fn escape_hcl(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                result.push(c);
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Prefix every line of `text` with `{indent}# `
fn comment_lines(indent: &str, text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return format!("{}#", indent);
    }
    lines
        .iter()
        .map(|line| format!("{}# {}", indent, line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Terraform scaffold exporter
#[derive(Debug, Clone)]
pub struct TerraformExporter {
    region: String,
    environment: String,
}

impl Default for TerraformExporter {
    fn default() -> Self {
        Self::new("us-east-1", "dev")
    }
}

impl TerraformExporter {
    /// Create an exporter with the given variable defaults
    pub fn new(region: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            environment: environment.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Render the templates of all solutions, separated by a blank line
    pub fn render_templates(&self, solutions: &[Solution]) -> String {
        solutions
            .iter()
            .map(|solution| self.render_solution(solution))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn render_solution(&self, solution: &Solution) -> String {
        let mut out = String::new();

        out.push_str(&comment_lines("", &solution.title));
        out.push('\n');
        out.push_str(&comment_lines("", &solution.description));
        out.push_str("\n\n");

        out.push_str("terraform {\n");
        out.push_str("  required_providers {\n");
        out.push_str("    aws = {\n");
        out.push_str("      source  = \"hashicorp/aws\"\n");
        out.push_str("      version = \"~> 5.0\"\n");
        out.push_str("    }\n");
        out.push_str("  }\n");
        out.push_str("}\n\n");

        out.push_str("provider \"aws\" {\n");
        out.push_str("  region = var.aws_region\n");
        out.push_str("}\n\n");

        out.push_str("variable \"aws_region\" {\n");
        out.push_str("  description = \"AWS region\"\n");
        out.push_str("  type        = string\n");
        out.push_str(&format!("  default     = \"{}\"\n", escape_hcl(&self.region)));
        out.push_str("}\n\n");

        out.push_str("variable \"environment\" {\n");
        out.push_str("  description = \"Environment name\"\n");
        out.push_str("  type        = string\n");
        out.push_str(&format!(
            "  default     = \"{}\"\n",
            escape_hcl(&self.environment)
        ));
        out.push_str("}\n\n");

        out.push_str(&comment_lines("", &format!("Resources for {}", solution.title)));
        out.push('\n');
        let mut used = HashSet::new();
        let resources: Vec<String> = solution
            .services()
            .iter()
            .map(|service| {
                let label = unique_label(&mut used, resource_label(&service.name));
                self.render_resource(service, &label)
            })
            .collect();
        out.push_str(&resources.join("\n\n"));
        out.push_str("\n\n");

        out.push_str("# Outputs\n");
        out.push_str("output \"solution_info\" {\n");
        out.push_str("  value = {\n");
        out.push_str(&format!("    name = \"{}\"\n", escape_hcl(&solution.title)));
        out.push_str(&format!(
            "    description = \"{}\"\n",
            escape_hcl(&solution.description)
        ));
        out.push_str(&format!(
            "    cost_estimate = {}\n",
            format_amount(solution.cost_estimate.unwrap_or(0.0))
        ));
        out.push_str("  }\n");
        out.push_str("}\n");

        out
    }

    fn render_resource(&self, service: &AwsService, label: &str) -> String {
        let resource_type = resource_type_for(&service.name);

        let mut out = String::new();
        out.push_str(&comment_lines("", &service.name));
        out.push('\n');
        out.push_str(&format!("resource \"{}\" \"{}\" {{\n", resource_type, label));
        out.push_str(&comment_lines("  ", &service.purpose));
        out.push('\n');
        out.push_str(&comment_lines(
            "  ",
            &format!("Configuration: {}", service.configuration),
        ));
        out.push_str("\n\n");
        out.push_str("  tags = {\n");
        out.push_str(&format!(
            "    Name        = \"${{var.environment}}-{}\"\n",
            label
        ));
        out.push_str("    Environment = var.environment\n");
        out.push_str("    ManagedBy   = \"VibeSolver\"\n");
        out.push_str("  }\n");
        out.push('}');
        out
    }
}

impl SolutionRenderer for TerraformExporter {
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
            ctx.timestamped_filename("vibesolver-terraform", "tf"),
            ExportFormat::Terraform,
            self.render_templates(solutions),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_resource_types() {
        assert_eq!(resource_type_for("EC2"), "aws_instance");
        assert_eq!(resource_type_for("rds"), "aws_db_instance");
        assert_eq!(resource_type_for(" S3 "), "aws_s3_bucket");
        assert_eq!(resource_type_for("Lambda"), "aws_lambda_function");
        assert_eq!(resource_type_for("API  Gateway"), "aws_api_gateway_rest_api");
        assert_eq!(resource_type_for("CloudFront"), "aws_cloudfront_distribution");
        assert_eq!(resource_type_for("ELB"), "aws_lb");
        assert_eq!(resource_type_for("VPC"), "aws_vpc");
        assert_eq!(resource_type_for("IAM"), "aws_iam_role");
    }

    #[test]
    fn test_vendor_prefix_is_ignored() {
        assert_eq!(resource_type_for("Amazon S3"), "aws_s3_bucket");
        assert_eq!(resource_type_for("AWS Lambda"), "aws_lambda_function");
        assert_eq!(resource_type_for("Amazon API Gateway"), "aws_api_gateway_rest_api");
    }

    #[test]
    fn test_unknown_service_falls_back() {
        assert_eq!(resource_type_for("DynamoDB"), FALLBACK_RESOURCE_TYPE);
        assert_eq!(resource_type_for(""), FALLBACK_RESOURCE_TYPE);
        assert_eq!(resource_type_for("Amazon"), FALLBACK_RESOURCE_TYPE);
    }

    #[test]
    fn test_resource_label() {
        assert_eq!(resource_label("Amazon S3"), "amazon_s3");
        assert_eq!(resource_label("Route 53 (DNS)"), "route_53__dns_");
        assert_eq!(resource_label("3scale"), "_3scale");
        assert_eq!(resource_label("   "), "service");
    }

    #[test]
    fn test_escape_hcl() {
        assert_eq!(escape_hcl(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_hcl("${x}"), "$${x}");
        assert_eq!(escape_hcl("cost $5"), "cost $5");
        assert_eq!(escape_hcl("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_resource_block() {
        let exporter = TerraformExporter::default();
        let block = exporter.render_resource(
            &AwsService::new("Amazon S3", "Storage", "Standard"),
            "amazon_s3",
        );
        assert!(block.starts_with("# Amazon S3\nresource \"aws_s3_bucket\" \"amazon_s3\" {"));
        assert!(block.contains("  # Storage\n"));
        assert!(block.contains("  # Configuration: Standard\n"));
        assert!(block.contains("    Name        = \"${var.environment}-amazon_s3\"\n"));
        assert!(block.contains("    ManagedBy   = \"VibeSolver\"\n"));
    }

    #[test]
    fn test_multiline_configuration_stays_commented() {
        let exporter = TerraformExporter::default();
        let block = exporter.render_resource(
            &AwsService::new("EC2", "Compute", "t3.micro\ninstance_type = \"evil\""),
            "ec2",
        );
        assert!(block.contains("  # Configuration: t3.micro\n  # instance_type = \"evil\"\n"));
    }

    #[test]
    fn test_colliding_labels_get_suffixes() {
        let exporter = TerraformExporter::default();
        let solution = Solution::new("s1", "Demo", "desc").with_services(&[
            AwsService::new("EC2", "Web", "t3.micro"),
            AwsService::new("ec2", "Worker", "t3.large"),
            AwsService::new(" EC2 ", "Batch", "c5.xlarge"),
        ]);
        let tf = exporter.render_templates(&[solution]);
        assert_eq!(tf.matches("resource \"aws_instance\" \"ec2\" {").count(), 1);
        assert!(tf.contains("resource \"aws_instance\" \"ec2_2\" {"));
        assert!(tf.contains("resource \"aws_instance\" \"ec2_3\" {"));
        assert!(tf.contains("    Name        = \"${var.environment}-ec2_2\"\n"));
    }

    #[test]
    fn test_variable_defaults_are_configurable() {
        let exporter = TerraformExporter::new("eu-west-1", "prod");
        let solution = Solution::new("s1", "Demo", "desc");
        let tf = exporter.render_templates(&[solution]);
        assert!(tf.contains("  default     = \"eu-west-1\"\n"));
        assert!(tf.contains("  default     = \"prod\"\n"));
        assert!(tf.contains("    cost_estimate = 0\n"));
    }
}
