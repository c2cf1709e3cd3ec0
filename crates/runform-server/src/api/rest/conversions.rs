//! Conversions between REST payloads and resolver types

use super::types::{RunInputsPayload, RunInputsResponse};
use crate::error::ServerError;
use runform_core::{ProjectScope, StageSelection};
use runform_parser::YamlParser;
use runform_sdk::{InputSetState, RunInputRequest};

/// Stage selection of a payload; no identifiers means every stage
pub(super) fn selection_of(payload: &RunInputsPayload) -> StageSelection {
    if payload.all_stages_selected || payload.stage_identifiers.is_empty() {
        StageSelection::all()
    } else {
        StageSelection::only(payload.stage_identifiers.iter().cloned())
    }
}

/// Build the resolver request; `default_scope` applies when the body has none
pub(super) fn to_run_input_request(
    pipeline_identifier: &str,
    payload: RunInputsPayload,
    default_scope: ProjectScope,
) -> Result<RunInputRequest, ServerError> {
    if pipeline_identifier.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "pipeline identifier must not be empty".to_string(),
        ));
    }

    let selection = selection_of(&payload);
    let scope = payload.scope.unwrap_or(default_scope);

    let mut request = RunInputRequest::new(scope, pipeline_identifier)
        .with_selection(selection)
        .with_input_sets(payload.input_set_references)
        .with_git_details(payload.branch, payload.repo_identifier);

    if let Some(yaml) = payload.pipeline_yaml.filter(|y| !y.trim().is_empty()) {
        let pipeline = YamlParser::parse_document(&yaml)
            .map_err(|e| ServerError::InvalidRequest(format!("pipelineYaml: {}", e)))?;
        request = request.with_pipeline(pipeline);
    }
    if let Some(yaml) = payload.rerun_yaml {
        request = request.with_rerun_yaml(yaml);
    }

    Ok(request)
}

/// Render a resolved state
pub(super) fn to_response(
    pipeline_identifier: &str,
    state: InputSetState,
) -> Result<RunInputsResponse, ServerError> {
    let pipeline_yaml = YamlParser::stringify(&state.input_set)
        .map_err(|e| ServerError::InternalError(format!("Failed to render pipeline: {}", e)))?;
    let is_complete = state.is_complete();

    Ok(RunInputsResponse {
        pipeline_identifier: pipeline_identifier.to_string(),
        pipeline_yaml,
        pipeline: state.input_set.to_json(),
        has_runtime_inputs: state.has_runtime_inputs,
        has_input_sets: state.has_input_sets,
        is_input_set_applied: state.is_input_set_applied,
        modules: state.modules,
        missing_inputs: state
            .missing_inputs
            .iter()
            .map(ToString::to_string)
            .collect(),
        is_complete,
        error: state.error,
    })
}
