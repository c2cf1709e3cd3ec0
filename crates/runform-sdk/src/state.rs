//! Request and state types of the resolver

use runform_core::{FieldPath, Node, ProjectScope, StageSelection};
use runform_repository::{MergeInputSetRequest, TemplateRequest};
use serde::Serialize;

use crate::error::StateError;

/// Everything needed to build the run form of one pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunInputRequest {
    pub scope: ProjectScope,
    pub pipeline_identifier: String,

    /// Stages to run
    pub selection: StageSelection,

    /// Saved input sets picked by the user, in order
    pub input_set_refs: Vec<String>,

    /// Runtime inputs of a previous execution being rerun
    pub rerun_yaml: Option<String>,

    /// Pipeline definition, used as is when there is nothing to fill in
    pub pipeline: Option<Node>,

    pub branch: Option<String>,
    pub repo_identifier: Option<String>,
}

impl RunInputRequest {
    pub fn new(scope: ProjectScope, pipeline_identifier: impl Into<String>) -> Self {
        Self {
            scope,
            pipeline_identifier: pipeline_identifier.into(),
            selection: StageSelection::all(),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, selection: StageSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_input_sets<I, S>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_set_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rerun_yaml(mut self, yaml: impl Into<String>) -> Self {
        self.rerun_yaml = Some(yaml.into());
        self
    }

    pub fn with_pipeline(mut self, pipeline: Node) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn with_git_details(mut self, branch: Option<String>, repo_identifier: Option<String>) -> Self {
        self.branch = branch;
        self.repo_identifier = repo_identifier;
        self
    }

    /// Rerun payload, when one is present and not blank
    pub fn rerun(&self) -> Option<&str> {
        self.rerun_yaml
            .as_deref()
            .filter(|yaml| !yaml.trim().is_empty())
    }

    /// Saved input sets are fetched only when some are picked and this is
    /// not a rerun
    pub fn should_fetch_input_sets(&self) -> bool {
        self.rerun().is_none() && !self.input_set_refs.is_empty()
    }

    pub fn template_request(&self) -> TemplateRequest {
        TemplateRequest::new(self.scope.clone(), self.pipeline_identifier.clone())
            .with_selection(&self.selection)
            .with_branch(self.branch.clone())
            .with_repo_identifier(self.repo_identifier.clone())
    }

    pub fn merge_request(&self) -> MergeInputSetRequest {
        MergeInputSetRequest::new(self.template_request(), self.input_set_refs.clone())
    }
}

/// Outcome of a resolution, as shown by the run form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSetState {
    /// Resolved pipeline, shaped `{ pipeline: ... }`
    pub input_set: Node,

    /// Input-set template as fetched, markers intact
    pub parsed_template: Node,

    pub has_runtime_inputs: bool,
    pub has_input_sets: bool,
    pub is_input_set_applied: bool,
    pub modules: Vec<String>,

    /// Template runtime inputs still open in `input_set`
    pub missing_inputs: Vec<FieldPath>,

    /// Last failure; the other fields keep the last good resolution
    pub error: Option<StateError>,

    /// Generation this state was produced for
    pub generation: u64,
}

impl InputSetState {
    /// Ready to submit: nothing failed and nothing is left open
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.missing_inputs.is_empty()
    }
}

/// Handle of one resolution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket {
    pub generation: u64,
}

/// Whether a finished resolution was applied
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Result applied; carries the new current state
    Current(InputSetState),
    /// A newer attempt started meanwhile; result discarded
    Stale { generation: u64, current: u64 },
}

impl Applied {
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale { .. })
    }

    pub fn state(&self) -> Option<&InputSetState> {
        match self {
            Applied::Current(state) => Some(state),
            Applied::Stale { .. } => None,
        }
    }
}
