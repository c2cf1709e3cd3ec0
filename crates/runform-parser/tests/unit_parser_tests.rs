//! Unit tests for the YAML codec
//!
//! Covers pipeline documents, input-set templates and saved input sets as
//! they come back from the pipeline API.

use runform_core::{Node, RuntimeInput};
use runform_parser::*;

// =============================================================================
// Pipeline documents
// =============================================================================

#[test]
fn test_parse_pipeline_with_parallel_stages() {
    let yaml = r#"
pipeline:
  identifier: release
  stages:
    - stage:
        identifier: build
        type: CI
    - parallel:
        - stage:
            identifier: qa
            type: Deployment
            spec:
              environment:
                environmentRef: <+input>.allowedValues(qa1,qa2)
        - stage:
            identifier: perf
            type: Deployment
"#;

    let result = PipelineParser::parse(yaml);
    assert!(result.is_ok(), "Failed to parse pipeline: {:?}", result.err());

    let pipeline = result.unwrap();
    let paths = pipeline.runtime_input_paths();
    assert_eq!(paths.len(), 1);
    assert_eq!(
        paths[0].to_string(),
        "pipeline.stages[1].parallel[0].stage.spec.environment.environmentRef"
    );
    assert_eq!(
        pipeline.get_path(&paths[0]).and_then(Node::as_runtime_input),
        Some(&RuntimeInput::bare().with_allowed_values(["qa1", "qa2"]))
    );
}

#[test]
fn test_parse_pipeline_missing_stage_identifier() {
    let yaml = r#"
pipeline:
  identifier: release
  stages:
    - stage:
        type: CI
"#;

    let err = PipelineParser::parse(yaml).unwrap_err();
    assert!(err.to_string().contains("Missing identifier"));
}

#[test]
fn test_parse_template_response_yaml() {
    let yaml = r#"pipeline:
  identifier: "release"
  stages:
  - stage:
      identifier: "qa"
      type: "Deployment"
      spec:
        infrastructure:
          infrastructureDefinition:
            spec:
              namespace: "<+input>"
"#;

    let template = PipelineParser::parse_template(yaml).unwrap();
    assert_eq!(template.count_runtime_inputs(), 1);
}

#[test]
fn test_stringify_round_trip_keeps_markers() {
    let yaml = r#"
pipeline:
  identifier: release
  variables:
    - name: tag
      type: String
      value: <+input>.default(latest).executionInput()
"#;

    let tree = PipelineParser::parse(yaml).unwrap();
    let text = YamlParser::stringify(&tree).unwrap();
    let reparsed = PipelineParser::parse(&text).unwrap();
    assert_eq!(tree, reparsed);
}

// =============================================================================
// Input sets
// =============================================================================

#[test]
fn test_saved_input_set_is_wrapped() {
    let yaml = r#"
inputSet:
  identifier: prod
  pipeline:
    identifier: release
    stages:
      - stage:
          identifier: qa
          spec:
            environment:
              environmentRef: qa2
"#;

    let input_set = InputSetParser::parse(yaml).unwrap();
    let env = input_set
        .pipeline
        .get("pipeline")
        .and_then(|p| p.get("stages"))
        .and_then(Node::as_array)
        .and_then(|stages| stages.first())
        .and_then(|s| s.get("stage"))
        .and_then(|s| s.get("spec"))
        .and_then(|s| s.get("environment"))
        .and_then(|e| e.get_str("environmentRef"));
    assert_eq!(env, Some("qa2"));
}

#[test]
fn test_malformed_input_set_yaml() {
    let result = InputSetParser::parse("inputSet: [broken");
    assert!(matches!(result, Err(ParseError::YamlError(_))));
}
