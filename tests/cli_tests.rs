//! CLI command tests

#![cfg(feature = "cli")]

use chrono::{TimeZone, Utc};
use vibesolver_export::cli::commands::export::{
    ExportArgs, handle_export, load_solutions, parse_solutions, select_solutions,
};
use vibesolver_export::cli::error::CliError;
use vibesolver_export::models::{Architecture, ArchitectureComponent, AwsService, Position};
use vibesolver_export::{ExportFormat, JsonExporter, RenderContext, Solution};

fn solutions() -> Vec<Solution> {
    let architecture = Architecture {
        components: vec![ArchitectureComponent {
            id: "fn".to_string(),
            name: "Handler".to_string(),
            component_type: "function".to_string(),
            position: Position { x: 10.0, y: 10.0 },
        }],
        connections: vec![],
    };
    let stamped = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    vec![
        Solution::new("a", "Alpha", "First")
            .with_services(&[AwsService::new("EC2", "Compute", "t3.micro")]),
        Solution::new("b", "Beta", "Second").with_architecture(&architecture),
    ]
    .into_iter()
    .map(|mut solution| {
        solution.created_at = stamped;
        solution.updated_at = stamped;
        solution
    })
    .collect()
}

fn write_input(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("solutions.json");
    std::fs::write(&path, serde_json::to_string(&solutions()).unwrap()).unwrap();
    path
}

fn args(format: ExportFormat, dir: &std::path::Path) -> ExportArgs {
    ExportArgs {
        format,
        input: write_input(dir),
        output_dir: Some(dir.join("out")),
        config: Some(dir.join("config.toml")),
        ..Default::default()
    }
}

#[test]
fn test_parse_json_array() {
    let fixture = solutions();
    let json = serde_json::to_string(&fixture).unwrap();
    let parsed = parse_solutions(&json).unwrap();
    assert_eq!(parsed, fixture);
    assert_eq!(parsed, solutions());
}

#[test]
fn test_parse_export_document() {
    let document = JsonExporter::new()
        .render_document(&solutions(), &RenderContext::now())
        .unwrap();
    let parsed = parse_solutions(&document).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].services()[0].name, "EC2");
}

#[test]
fn test_parse_yaml_list() {
    let yaml = r#"
- id: y1
  title: From YAML
  description: Stored as YAML
  awsServices: '[{"name":"S3","purpose":"Storage","configuration":"Standard"}]'
  costEstimate: 10
  createdAt: "2024-01-15T10:00:00Z"
  updatedAt: "2024-01-15T10:00:00Z"
"#;
    let parsed = parse_solutions(yaml).unwrap();
    assert_eq!(parsed[0].id, "y1");
    assert_eq!(parsed[0].services()[0].name, "S3");
}

#[test]
fn test_parse_rejects_other_json() {
    assert!(parse_solutions("{\"foo\": 1}").is_err());
    assert!(parse_solutions("42").is_err());
}

#[test]
fn test_select_solutions_keeps_order() {
    let all = solutions();
    let selected = select_solutions(&all, &["b".to_string(), "a".to_string()]).unwrap();
    assert_eq!(selected[0].id, "b");
    assert_eq!(selected[1].id, "a");

    let err = select_solutions(&all, &["zzz".to_string()]).unwrap_err();
    assert!(matches!(err, CliError::SolutionNotFound(id) if id == "zzz"));
}

#[test]
fn test_load_missing_file() {
    let err = load_solutions(std::path::Path::new("/nonexistent/solutions.json")).unwrap_err();
    assert!(matches!(err, CliError::FileNotFound(_)));
}

#[test]
fn test_handle_export_markdown() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "").unwrap();
    let args = args(ExportFormat::Markdown, dir.path());

    let path = handle_export(&args).unwrap();
    assert!(path.starts_with(dir.path().join("out")));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("# Alpha"));
    assert!(content.contains("# Beta"));
}

#[test]
fn test_handle_export_svg_uses_first_solution_with_diagram() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "").unwrap();

    let mut svg_args = args(ExportFormat::Svg, dir.path());
    let err = handle_export(&svg_args).unwrap_err();
    assert_eq!(err.to_string(), "Export failed: Architecture diagram not found");

    svg_args.diagram = Some("b".to_string());
    let path = handle_export(&svg_args).unwrap();
    assert!(std::fs::read_to_string(path).unwrap().contains("Handler"));
}

#[test]
fn test_handle_export_cloudformation_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "").unwrap();
    let err = handle_export(&args(ExportFormat::CloudFormation, dir.path())).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Export failed: Unsupported export format: cloudformation"
    );
    assert!(!dir.path().join("out").exists());
}
