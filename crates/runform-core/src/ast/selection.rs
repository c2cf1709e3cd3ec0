//! Stage selection for a run

use serde::{Deserialize, Serialize};

/// Stages the user chose to execute
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSelection {
    /// Every stage runs; `stage_identifiers` is ignored
    #[serde(default)]
    pub all_stages_selected: bool,

    /// Selected stage identifiers, in selection order
    #[serde(default)]
    pub stage_identifiers: Vec<String>,
}

impl StageSelection {
    /// Run every stage
    pub fn all() -> Self {
        Self {
            all_stages_selected: true,
            stage_identifiers: Vec::new(),
        }
    }

    /// Run only the listed stages
    pub fn only<I, S>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_stages_selected: false,
            stage_identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    /// True when no filtering applies
    pub fn selects_all(&self) -> bool {
        self.all_stages_selected || self.stage_identifiers.is_empty()
    }

    /// Whether a stage with this identifier is part of the run.
    /// Unknown identifiers in the selection are simply never matched.
    pub fn includes(&self, identifier: &str) -> bool {
        self.selects_all() || self.stage_identifiers.iter().any(|id| id == identifier)
    }

    /// Identifiers sent to the template API; empty means "all stages"
    pub fn stage_identifiers(&self) -> Vec<String> {
        if self.selects_all() {
            Vec::new()
        } else {
            self.stage_identifiers.clone()
        }
    }
}
