//! Account / organization / project scope

use serde::{Deserialize, Serialize};

/// Scope every pipeline and input set lives in
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScope {
    #[serde(rename = "accountIdentifier")]
    pub account_id: String,
    pub org_identifier: String,
    pub project_identifier: String,
}

impl ProjectScope {
    pub fn new(
        account_id: impl Into<String>,
        org_identifier: impl Into<String>,
        project_identifier: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            org_identifier: org_identifier.into(),
            project_identifier: project_identifier.into(),
        }
    }

    /// Query parameters understood by the pipeline API
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("accountIdentifier", self.account_id.clone()),
            ("orgIdentifier", self.org_identifier.clone()),
            ("projectIdentifier", self.project_identifier.clone()),
        ]
    }
}
