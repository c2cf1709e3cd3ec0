//! In-process pipeline backend
//!
//! Holds pipelines and saved input sets per project scope and answers the
//! [`PipelineApi`] calls locally: templates come from the local projector and
//! input sets are merged in reference order, overlays expanded in place.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use runform_core::ast::stage_elements;
use runform_core::{Node, ProjectScope};
use runform_merge::{merge_all, project_template};
use runform_parser::{InputSetEntry, InputSetParser, PipelineParser, YamlParser};

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    MergeInputSetRequest, MergedInputSetResponse, TemplateRequest, TemplateResponse,
};
use crate::traits::PipelineApi;

type PipelineKey = (ProjectScope, String);

#[derive(Debug, Clone, Default)]
struct StoredPipeline {
    pipeline: Node,
    input_sets: HashMap<String, InputSetEntry>,
}

/// Pipelines and saved input sets kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    pipelines: Arc<RwLock<HashMap<PipelineKey, StoredPipeline>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pipeline tree; returns its identifier
    pub async fn insert_pipeline(
        &self,
        scope: &ProjectScope,
        pipeline: Node,
    ) -> RepositoryResult<String> {
        let identifier = PipelineParser::identifier(&pipeline).ok_or_else(|| {
            RepositoryError::Parser("pipeline has no identifier".to_string())
        })?;

        let mut pipelines = self.pipelines.write().await;
        let entry = pipelines
            .entry((scope.clone(), identifier.clone()))
            .or_default();
        entry.pipeline = pipeline;

        tracing::debug!(pipeline = %identifier, "registered pipeline");
        Ok(identifier)
    }

    /// Parse and register a pipeline document
    pub async fn insert_pipeline_yaml(
        &self,
        scope: &ProjectScope,
        yaml: &str,
    ) -> RepositoryResult<String> {
        let pipeline = PipelineParser::parse(yaml)?;
        self.insert_pipeline(scope, pipeline).await
    }

    /// Register a saved input set (or overlay) for a pipeline
    pub async fn insert_input_set(
        &self,
        scope: &ProjectScope,
        pipeline_identifier: &str,
        entry: InputSetEntry,
    ) -> RepositoryResult<String> {
        let identifier = match &entry {
            InputSetEntry::InputSet(doc) => doc.identifier.clone().ok_or_else(|| {
                RepositoryError::Parser("saved input set has no identifier".to_string())
            })?,
            InputSetEntry::Overlay(overlay) => overlay.identifier.clone(),
        };

        let mut pipelines = self.pipelines.write().await;
        let stored = pipelines
            .get_mut(&(scope.clone(), pipeline_identifier.to_string()))
            .ok_or_else(|| RepositoryError::PipelineNotFound {
                identifier: pipeline_identifier.to_string(),
            })?;
        stored.input_sets.insert(identifier.clone(), entry);

        tracing::debug!(
            pipeline = %pipeline_identifier,
            input_set = %identifier,
            "registered input set"
        );
        Ok(identifier)
    }

    /// Parse and register a saved input set or overlay document
    pub async fn insert_input_set_yaml(
        &self,
        scope: &ProjectScope,
        pipeline_identifier: &str,
        yaml: &str,
    ) -> RepositoryResult<String> {
        let entry = InputSetParser::parse_entry(yaml)?;
        self.insert_input_set(scope, pipeline_identifier, entry).await
    }

    /// Identifiers of the pipelines registered for `scope`, sorted
    pub async fn pipeline_identifiers(&self, scope: &ProjectScope) -> Vec<String> {
        let pipelines = self.pipelines.read().await;
        let mut ids: Vec<String> = pipelines
            .keys()
            .filter(|(s, _)| s == scope)
            .map(|(_, id)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Identifiers of the input sets saved for a pipeline, sorted
    pub async fn input_set_identifiers(
        &self,
        scope: &ProjectScope,
        pipeline_identifier: &str,
    ) -> Vec<String> {
        let pipelines = self.pipelines.read().await;
        let mut ids: Vec<String> = pipelines
            .get(&(scope.clone(), pipeline_identifier.to_string()))
            .map(|stored| stored.input_sets.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    async fn stored(&self, request: &TemplateRequest) -> RepositoryResult<StoredPipeline> {
        let pipelines = self.pipelines.read().await;
        pipelines
            .get(&(request.scope.clone(), request.pipeline_identifier.clone()))
            .cloned()
            .ok_or_else(|| RepositoryError::PipelineNotFound {
                identifier: request.pipeline_identifier.clone(),
            })
    }
}

/// Expand references into input-set trees, overlays replaced by their members
fn expand_references<'a>(
    stored: &'a StoredPipeline,
    pipeline_identifier: &str,
    references: &[String],
    visiting: &mut HashSet<String>,
    out: &mut Vec<&'a Node>,
) -> RepositoryResult<()> {
    for reference in references {
        let entry = stored.input_sets.get(reference).ok_or_else(|| {
            RepositoryError::InputSetNotFound {
                pipeline: pipeline_identifier.to_string(),
                identifier: reference.clone(),
            }
        })?;

        match entry {
            InputSetEntry::InputSet(doc) => out.push(&doc.pipeline),
            InputSetEntry::Overlay(overlay) => {
                if !visiting.insert(overlay.identifier.clone()) {
                    return Err(RepositoryError::OverlayCycle {
                        identifier: overlay.identifier.clone(),
                    });
                }
                expand_references(
                    stored,
                    pipeline_identifier,
                    &overlay.input_set_references,
                    visiting,
                    out,
                )?;
                visiting.remove(&overlay.identifier);
            }
        }
    }
    Ok(())
}

/// Product modules touched by the pipeline's stages
fn modules_of(pipeline: &Node) -> Vec<String> {
    let mut modules: Vec<String> = stage_elements(pipeline)
        .iter()
        .map(|(_, stage)| {
            let module = match stage.stage_type() {
                Some("CI") => "ci",
                Some("Deployment") => "cd",
                Some("FeatureFlag") => "cf",
                Some("SecurityTests") => "sto",
                _ => "pms",
            };
            module.to_string()
        })
        .collect();
    modules.sort();
    modules.dedup();
    modules
}

#[async_trait]
impl PipelineApi for InMemoryRepository {
    async fn get_template_from_pipeline(
        &self,
        request: &TemplateRequest,
    ) -> RepositoryResult<TemplateResponse> {
        let stored = self.stored(request).await?;

        let template = project_template(&stored.pipeline, &request.selection());
        let input_set_template_yaml = template
            .as_ref()
            .map(YamlParser::stringify)
            .transpose()?;

        Ok(TemplateResponse {
            input_set_template_yaml,
            has_input_sets: !stored.input_sets.is_empty(),
            modules: modules_of(&stored.pipeline),
        })
    }

    async fn get_merged_input_sets(
        &self,
        request: &MergeInputSetRequest,
    ) -> RepositoryResult<MergedInputSetResponse> {
        let stored = self.stored(&request.template).await?;

        let mut input_sets = Vec::new();
        expand_references(
            &stored,
            &request.template.pipeline_identifier,
            &request.input_set_references,
            &mut HashSet::new(),
            &mut input_sets,
        )?;

        let Some(template) = project_template(&stored.pipeline, &request.template.selection())
        else {
            return Ok(MergedInputSetResponse::default());
        };

        let merged = merge_all(&template, input_sets);
        tracing::debug!(
            pipeline = %request.template.pipeline_identifier,
            references = ?request.input_set_references,
            "merged saved input sets"
        );

        Ok(MergedInputSetResponse {
            pipeline_yaml: Some(YamlParser::stringify(&merged)?),
            is_error_response: false,
        })
    }
}
