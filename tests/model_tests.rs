//! Solution model tests

use vibesolver_export::models::{
    EncodedField, ExportFormat, ExportOptions, Orientation, PageSize, Quality, Solution,
    SolutionStatus,
};

const STORED_RECORD: &str = r#"{
    "id": "sol-42",
    "title": "Serverless API",
    "description": "REST API backed by Lambda",
    "requirements": "Handle 1k requests per second",
    "awsServices": "[{\"name\":\"AWS Lambda\",\"purpose\":\"Compute\",\"configuration\":\"512MB\"},{\"name\":\"API Gateway\",\"purpose\":\"Routing\"}]",
    "architecture": "{\"components\":[{\"id\":\"fn\",\"name\":\"Handler\",\"type\":\"function\",\"position\":{\"x\":10,\"y\":20}}],\"connections\":[]}",
    "recommendations": "[\"Use provisioned concurrency\"]",
    "tags": "[\"api\",\"serverless\"]",
    "status": "active",
    "costEstimate": 120.5,
    "createdAt": "2024-01-15T10:00:00.000Z",
    "updatedAt": "2024-02-01T08:30:00.000Z"
}"#;

#[test]
fn test_stored_record_decodes() {
    let solution: Solution = serde_json::from_str(STORED_RECORD).unwrap();
    assert_eq!(solution.status, SolutionStatus::Active);
    assert_eq!(solution.cost_estimate, Some(120.5));
    assert_eq!(solution.requirements.as_deref(), Some("Handle 1k requests per second"));

    let services = solution.services();
    assert_eq!(services.len(), 2);
    assert_eq!(services[1].name, "API Gateway");
    assert_eq!(services[1].configuration, "");

    let architecture = solution.architecture_graph().unwrap();
    assert_eq!(architecture.components[0].component_type, "function");
    assert_eq!(architecture.components[0].position.y, 20.0);

    assert_eq!(solution.recommendation_list(), vec!["Use provisioned concurrency"]);
    assert_eq!(solution.tag_list(), vec!["api", "serverless"]);
}

#[test]
fn test_record_serializes_back_to_stored_shape() {
    let solution: Solution = serde_json::from_str(STORED_RECORD).unwrap();
    let value = serde_json::to_value(&solution).unwrap();
    assert!(value["awsServices"].is_string());
    assert_eq!(value["costEstimate"], 120.5);
    assert_eq!(value["status"], "active");

    let back: Solution = serde_json::from_value(value).unwrap();
    assert_eq!(back, solution);
}

#[test]
fn test_null_fields_are_absent() {
    let json = r#"{
        "id": "x",
        "title": "T",
        "description": "D",
        "awsServices": null,
        "architecture": null,
        "recommendations": null,
        "tags": null,
        "costEstimate": null,
        "createdAt": "2024-01-15T10:00:00Z",
        "updatedAt": "2024-01-15T10:00:00Z"
    }"#;
    let solution: Solution = serde_json::from_str(json).unwrap();
    assert!(solution.services().is_empty());
    assert!(solution.architecture_graph().is_none());
    assert!(solution.decoded_value(EncodedField::Tags).is_none());
    assert_eq!(solution.status, SolutionStatus::Draft);
}

#[test]
fn test_decoded_value_keeps_extra_keys() {
    let mut solution = Solution::new("x", "T", "D");
    solution.architecture = Some(
        r#"{"components":[],"connections":[],"layout":"grid"}"#.to_string(),
    );
    let value = solution.decoded_value(EncodedField::Architecture).unwrap();
    assert_eq!(value["layout"], "grid");
}

#[test]
fn test_options_defaults() {
    let options = ExportOptions::default();
    assert_eq!(options.format, ExportFormat::Pdf);
    assert!(options.include_architecture);
    assert!(options.include_details);
    assert!(options.include_recommendations);
    assert!(options.include_cost_analysis);
    assert_eq!(options.quality, Quality::High);
    assert_eq!(options.page_size, PageSize::A4);
    assert_eq!(options.orientation, Orientation::Portrait);
}

#[test]
fn test_options_from_partial_json() {
    let options: ExportOptions = serde_json::from_str(r#"{"format": "yaml"}"#).unwrap();
    assert_eq!(options, ExportOptions::new(ExportFormat::Yaml));
}

#[test]
fn test_format_tags() {
    for format in ExportFormat::ALL {
        let parsed: ExportFormat = format.as_str().parse().unwrap();
        assert_eq!(parsed, format);
        let json = serde_json::to_string(&format).unwrap();
        assert_eq!(json, format!("\"{}\"", format.as_str()));
    }
    assert!(ExportFormat::Png.is_image());
    assert!(!ExportFormat::Json.is_image());
}
