//! Export pipeline tests

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use vibesolver_export::export::{ArchitectureCanvas, MemoryDelivery, RenderContext};
use vibesolver_export::models::{
    Architecture, ArchitectureComponent, ArchitectureConnection, AwsService, ExportFormat,
    ExportOptions, Position, Solution, SolutionStatus,
};
use vibesolver_export::{DirectoryDelivery, ExportFacade, JsonExporter, resource_type_for};

fn fixed_ctx() -> RenderContext {
    RenderContext::at(Utc.with_ymd_and_hms(2024, 5, 20, 14, 0, 0).unwrap())
}

fn demo_solution() -> Solution {
    Solution::new("demo-1", "Demo", "Static website on object storage")
        .with_services(&[AwsService::new("Amazon S3", "Storage", "Standard")])
        .with_recommendations(&["Enable logging"])
        .with_cost_estimate(42.0)
}

fn architecture() -> Architecture {
    Architecture {
        components: vec![
            ArchitectureComponent {
                id: "cdn".to_string(),
                name: "CloudFront".to_string(),
                component_type: "gateway".to_string(),
                position: Position { x: 20.0, y: 40.0 },
            },
            ArchitectureComponent {
                id: "bucket".to_string(),
                name: "S3 Bucket".to_string(),
                component_type: "storage".to_string(),
                position: Position { x: 300.0, y: 40.0 },
            },
        ],
        connections: vec![ArchitectureConnection {
            from: "cdn".to_string(),
            to: "bucket".to_string(),
            label: "origin".to_string(),
        }],
    }
}

fn broken_solution() -> Solution {
    let mut solution = Solution::new("broken", "Broken", "Malformed nested fields");
    solution.aws_services = Some("{definitely not json".to_string());
    solution.architecture = Some("\"a string\"".to_string());
    solution.recommendations = Some("[1, 2, 3]".to_string());
    solution.tags = Some("null".to_string());
    solution
}

fn export_text(format: ExportFormat, solutions: &[Solution]) -> String {
    let facade = ExportFacade::new(MemoryDelivery::new());
    let result = facade.export_at(solutions, &ExportOptions::new(format), None, &fixed_ctx());
    assert!(result.success, "{} export failed: {:?}", format, result.error);
    result.data.unwrap().as_text().unwrap().to_string()
}

#[test]
fn test_markdown_scenario() {
    let md = export_text(ExportFormat::Markdown, &[demo_solution()]);
    assert!(md.contains("# Demo"));
    assert!(md.contains("### Amazon S3"));
    assert!(md.contains("**Purpose**: Storage"));
    assert!(md.contains("$42/month"));
    assert!(md.contains("1. Enable logging"));
}

#[test]
fn test_terraform_scenario() {
    let tf = export_text(ExportFormat::Terraform, &[demo_solution()]);
    assert!(tf.contains("resource \"aws_s3_bucket\" \"amazon_s3\""));
    assert!(tf.contains("ManagedBy   = \"VibeSolver\""));
    assert!(tf.contains("version = \"~> 5.0\""));
    assert!(tf.contains("variable \"aws_region\""));
    assert!(tf.contains("variable \"environment\""));
    assert!(tf.contains("output \"solution_info\""));
    assert!(tf.contains("cost_estimate = 42"));
}

#[test]
fn test_yaml_null_cost_is_zero() {
    let solution = Solution::new("s1", "No cost", "desc");
    let yaml = export_text(ExportFormat::Yaml, &[solution]);
    assert!(yaml.contains("cost_estimate: 0\n"));
    assert!(!yaml.contains("cost_estimate: null"));
}

#[test]
fn test_malformed_fields_never_abort() {
    let solutions = vec![broken_solution(), demo_solution()];
    for format in [
        ExportFormat::Pdf,
        ExportFormat::Json,
        ExportFormat::Yaml,
        ExportFormat::Markdown,
        ExportFormat::Terraform,
    ] {
        let facade = ExportFacade::new(MemoryDelivery::new());
        let result = facade.export(&solutions, &ExportOptions::new(format), None);
        assert!(result.success, "{} export failed: {:?}", format, result.error);
    }

    let md = export_text(ExportFormat::Markdown, &[broken_solution()]);
    assert!(!md.contains("###"));
    let tf = export_text(ExportFormat::Terraform, &[broken_solution()]);
    assert!(!tf.contains("resource \""));
}

#[test]
fn test_json_export_drops_positional_records() {
    let mut solution = Solution::new("pos", "Positional", "Arrays instead of objects");
    solution.architecture = Some("[]".to_string());
    solution.aws_services = Some(r#"[["S3","Storage","Std"]]"#.to_string());

    let json = export_text(ExportFormat::Json, &[solution]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let exported = &value["solutions"][0];
    assert!(exported["architecture"].is_null());
    assert_eq!(exported["awsServices"], serde_json::json!([]));
}

#[test]
fn test_unsupported_format_has_no_side_effect() {
    let dir = tempfile::tempdir().unwrap();
    let facade = ExportFacade::new(DirectoryDelivery::new(dir.path()));
    let result = facade.export(
        &[demo_solution()],
        &ExportOptions::new(ExportFormat::CloudFormation),
        None,
    );
    assert!(!result.success);
    assert!(result.filename.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_image_export_requires_diagram() {
    let facade = ExportFacade::new(MemoryDelivery::new());
    let result = facade.export(&[demo_solution()], &ExportOptions::new(ExportFormat::Png), None);
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Architecture diagram not found"));
}

#[test]
fn test_svg_export_of_solution_diagram() {
    let solution = demo_solution().with_architecture(&architecture());
    let canvas = ArchitectureCanvas::from_solution(&solution).unwrap();

    let facade = ExportFacade::new(MemoryDelivery::new());
    let ctx = fixed_ctx();
    let result = facade.export_at(
        &[solution],
        &ExportOptions::new(ExportFormat::Svg),
        Some(&canvas),
        &ctx,
    );
    assert!(result.success);
    assert_eq!(
        result.filename.as_deref(),
        Some(format!("vibesolver-architecture-{}.svg", ctx.epoch_millis()).as_str())
    );
    let svg = result.data.unwrap();
    let svg = svg.as_text().unwrap();
    assert!(svg.contains("<foreignObject width=\"100%\" height=\"100%\">"));
    assert!(svg.contains("data-architecture-canvas=\"demo-1\""));
    assert!(svg.contains("S3 Bucket"));
}

#[cfg(feature = "png-export")]
#[test]
fn test_png_export_is_delivered_to_directory() {
    let solution = demo_solution().with_architecture(&architecture());
    let canvas = ArchitectureCanvas::from_solution(&solution).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let facade = ExportFacade::new(DirectoryDelivery::new(dir.path()));
    let mut options = ExportOptions::new(ExportFormat::Png);
    options.quality = vibesolver_export::Quality::Low;
    let result = facade.export(&[], &options, Some(&canvas));
    assert!(result.success, "{:?}", result.error);

    let path = dir.path().join(result.filename.unwrap());
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (640, 384));
}

#[test]
fn test_filenames() {
    let ctx = fixed_ctx();
    let millis = ctx.epoch_millis();
    let facade = ExportFacade::new(MemoryDelivery::new());
    let cases = [
        (ExportFormat::Pdf, "vibesolver-solutions-2024-05-20.pdf".to_string()),
        (ExportFormat::Json, format!("vibesolver-export-{}.json", millis)),
        (ExportFormat::Yaml, format!("vibesolver-export-{}.yaml", millis)),
        (ExportFormat::Markdown, format!("vibesolver-documentation-{}.md", millis)),
        (ExportFormat::Terraform, format!("vibesolver-terraform-{}.tf", millis)),
    ];
    for (format, expected) in cases {
        let result = facade.export_at(&[demo_solution()], &ExportOptions::new(format), None, &ctx);
        assert_eq!(result.filename.as_deref(), Some(expected.as_str()));
    }

    let mime_types: Vec<&str> = facade.delivery().delivered().iter().map(|e| e.mime_type).collect();
    assert_eq!(
        mime_types,
        vec!["application/pdf", "application/json", "text/yaml", "text/markdown", "text/plain"]
    );
}

#[test]
fn test_json_roundtrip_is_lossless() {
    let solutions = vec![
        demo_solution()
            .with_architecture(&architecture())
            .with_tags(&["web", "static"])
            .with_status(SolutionStatus::Active),
        broken_solution(),
    ];
    let first = export_text(ExportFormat::Json, &solutions);
    let document = JsonExporter::read_document(&first).unwrap();
    assert_eq!(document.metadata.count, 2);
    assert_eq!(document.metadata.generator, "VibeSolver");

    // Nested fields decode back to exactly what was stored
    let services: Vec<AwsService> =
        serde_json::from_value(document.solutions[0].aws_services.clone()).unwrap();
    assert_eq!(services, solutions[0].services());
    let arch: Architecture =
        serde_json::from_value(document.solutions[0].architecture.clone()).unwrap();
    assert_eq!(arch, architecture());

    let reimported = document.clone().into_solutions().unwrap();
    let second = export_text(ExportFormat::Json, &reimported);
    let redocument = JsonExporter::read_document(&second).unwrap();
    assert_eq!(redocument.solutions, document.solutions);
}

#[test]
fn test_renderers_do_not_mutate_input() {
    let solutions = vec![demo_solution().with_architecture(&architecture()), broken_solution()];
    let before = solutions.clone();
    for format in [
        ExportFormat::Pdf,
        ExportFormat::Json,
        ExportFormat::Yaml,
        ExportFormat::Markdown,
        ExportFormat::Terraform,
    ] {
        let facade = ExportFacade::new(MemoryDelivery::new());
        let _ = facade.export(&solutions, &ExportOptions::new(format), None);
    }
    assert_eq!(solutions, before);
}

#[test]
fn test_yaml_documents_parse() {
    let yaml = export_text(
        ExportFormat::Yaml,
        &[demo_solution().with_tags(&["a: b"]), broken_solution()],
    );
    let docs: Vec<serde_yaml::Value> = serde_yaml::Deserializer::from_str(&yaml)
        .map(|doc| serde_yaml::Value::deserialize(doc).unwrap())
        .collect();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["tags"][0].as_str(), Some("a: b"));
    assert_eq!(docs[0]["aws_services"][0]["name"].as_str(), Some("Amazon S3"));
    assert!(docs[1]["aws_services"].as_sequence().unwrap().is_empty());
}

#[test]
fn test_resource_mapping_is_total() {
    for (name, expected) in [
        ("ec2", "aws_instance"),
        ("RDS", "aws_db_instance"),
        ("  s3", "aws_s3_bucket"),
        ("LAMBDA", "aws_lambda_function"),
        ("Api Gateway", "aws_api_gateway_rest_api"),
        ("cloudfront", "aws_cloudfront_distribution"),
        ("Elb", "aws_lb"),
        ("vpc", "aws_vpc"),
        ("iam", "aws_iam_role"),
    ] {
        assert_eq!(resource_type_for(name), expected, "{}", name);
    }
    for name in ["DynamoDB", "Amazon SQS", "", "🚀"] {
        assert_eq!(resource_type_for(name), "aws_resource");
    }
}

#[test]
fn test_pdf_export_bytes() {
    let facade = ExportFacade::new(MemoryDelivery::new());
    let result = facade.export(
        &[demo_solution(), broken_solution()],
        &ExportOptions::new(ExportFormat::Pdf),
        None,
    );
    assert!(result.success);
    let data = result.data.unwrap();
    assert!(data.as_text().is_none());
    let bytes = data.as_bytes();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(String::from_utf8_lossy(bytes).contains("/Count 2"));
}
