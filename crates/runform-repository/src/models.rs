//! Request and response types of the pipeline API

use runform_core::{ProjectScope, StageSelection};
use serde::{Deserialize, Serialize};

/// Input-set template lookup for a pipeline and a stage selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TemplateRequest {
    pub scope: ProjectScope,
    pub pipeline_identifier: String,
    /// Selected stages; empty means every stage
    pub stage_identifiers: Vec<String>,
    pub branch: Option<String>,
    pub repo_identifier: Option<String>,
}

impl TemplateRequest {
    pub fn new(scope: ProjectScope, pipeline_identifier: impl Into<String>) -> Self {
        Self {
            scope,
            pipeline_identifier: pipeline_identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, selection: &StageSelection) -> Self {
        self.stage_identifiers = selection.stage_identifiers();
        self
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_repo_identifier(mut self, repo_identifier: Option<String>) -> Self {
        self.repo_identifier = repo_identifier;
        self
    }

    /// Selection the request was built from
    pub fn selection(&self) -> StageSelection {
        if self.stage_identifiers.is_empty() {
            StageSelection::all()
        } else {
            StageSelection::only(self.stage_identifiers.iter().cloned())
        }
    }

    /// Query parameters shared by every pipeline API call
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.scope.query_params();
        params.push(("pipelineIdentifier", self.pipeline_identifier.clone()));
        if let Some(branch) = &self.branch {
            params.push(("branch", branch.clone()));
        }
        if let Some(repo) = &self.repo_identifier {
            params.push(("repoIdentifier", repo.clone()));
        }
        params
    }
}

/// Input-set template for a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    /// `None` when the selected stages hold no runtime input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_set_template_yaml: Option<String>,

    /// Whether saved input sets exist for the pipeline
    #[serde(default)]
    pub has_input_sets: bool,

    /// Product modules the pipeline touches
    #[serde(default)]
    pub modules: Vec<String>,
}

impl TemplateResponse {
    /// No template, or a blank one, means no runtime inputs
    pub fn has_runtime_inputs(&self) -> bool {
        self.input_set_template_yaml
            .as_deref()
            .is_some_and(|yaml| !yaml.trim().is_empty())
    }
}

/// Request for the merge of several saved input sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MergeInputSetRequest {
    pub template: TemplateRequest,
    /// Input set identifiers, in selection order
    pub input_set_references: Vec<String>,
}

impl MergeInputSetRequest {
    pub fn new(template: TemplateRequest, input_set_references: Vec<String>) -> Self {
        Self {
            template,
            input_set_references,
        }
    }
}

/// Saved input sets merged into one pipeline document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedInputSetResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_yaml: Option<String>,

    /// Set by the API when one of the input sets no longer matches the pipeline
    #[serde(default)]
    pub is_error_response: bool,
}

/// Envelope wrapping every pipeline API response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/inputSets/template`
#[cfg(feature = "api")]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TemplateBody<'a> {
    pub stage_identifiers: &'a [String],
}

/// Body of `POST /api/inputSets/merge`
#[cfg(feature = "api")]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MergeBody<'a> {
    pub input_set_references: &'a [String],
    pub stage_identifiers: &'a [String],
}
