//! REST API type definitions

use crate::config::ServerConfig;
use runform_core::ProjectScope;
use runform_sdk::{InputSetResolver, StateError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<RwLock<InputSetResolver>>,
    pub config: Arc<ServerConfig>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of `POST /v1/pipelines/:pipeline_identifier/run-inputs`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInputsPayload {
    /// Account / org / project; the server's file-system scope when omitted
    #[serde(default)]
    pub scope: Option<ProjectScope>,

    /// Stages to run; ignored when `allStagesSelected` is set
    #[serde(default)]
    pub stage_identifiers: Vec<String>,

    #[serde(default)]
    pub all_stages_selected: bool,

    /// Saved input sets to apply, in order
    #[serde(default)]
    pub input_set_references: Vec<String>,

    /// Runtime inputs of the execution being rerun
    #[serde(default)]
    pub rerun_yaml: Option<String>,

    /// Pipeline definition, returned as is when it has no runtime inputs
    #[serde(default)]
    pub pipeline_yaml: Option<String>,

    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub repo_identifier: Option<String>,
}

/// Resolved run form
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInputsResponse {
    pub pipeline_identifier: String,

    /// Resolved `{ pipeline: ... }` document as YAML
    pub pipeline_yaml: String,

    /// Same document as JSON, markers rendered as text
    pub pipeline: serde_json::Value,

    pub has_runtime_inputs: bool,
    pub has_input_sets: bool,
    pub is_input_set_applied: bool,
    pub modules: Vec<String>,

    /// Dotted paths of runtime inputs still to fill
    pub missing_inputs: Vec<String>,
    pub is_complete: bool,

    /// Template failure while rerun inputs were still returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StateError>,
}

/// Repository reload response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
}
