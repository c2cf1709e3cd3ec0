//! InputSetResolver - builds the run form of a pipeline
//!
//! Resolution of one request:
//!
//! 1. a rerun payload is parsed and used as is, whatever the template call
//!    returns; the template only fills the flags
//! 2. the input-set template is fetched for the stage selection; without one
//!    the pipeline has no runtime inputs and the supplied definition is used
//! 3. the template is parsed and its bare markers cleared
//! 4. picked input sets are fetched already merged, then overlaid
//!
//! Attempts are numbered. [`InputSetResolver::begin`] hands out a ticket and
//! [`InputSetResolver::complete`] applies a result only while its ticket is
//! still the latest, so a slow response for an old selection never replaces
//! the state of a newer one. A failed attempt records its error and keeps the
//! last good resolution.

use std::sync::Arc;
use tokio::sync::Mutex;

use runform_core::ast::pipeline_root;
use runform_core::Node;
use runform_merge::{clear_runtime_input_with, merge, missing_runtime_inputs, ClearPolicy};
use runform_parser::PipelineParser;
use runform_repository::{
    MergedInputSetResponse, PipelineApi, RepositoryResult, TemplateResponse,
};

use crate::cache::{CacheStats, ParseCache};
use crate::config::ResolverConfig;
use crate::error::{Result, SdkError, StateError};
use crate::state::{Applied, InputSetState, RunInputRequest, Ticket};

#[derive(Debug, Default)]
struct Session {
    generation: u64,
    state: InputSetState,
    last_request: Option<RunInputRequest>,
}

/// Resolves run-form state against a [`PipelineApi`]
pub struct InputSetResolver {
    api: Arc<dyn PipelineApi>,
    config: ResolverConfig,
    clear_policy: ClearPolicy,
    cache: ParseCache,
    session: Mutex<Session>,
}

impl InputSetResolver {
    /// Create a resolver with the default configuration
    pub fn new(api: Arc<dyn PipelineApi>) -> Self {
        Self::with_config(api, ResolverConfig::default())
    }

    /// Create a resolver with an explicit configuration
    pub fn with_config(api: Arc<dyn PipelineApi>, config: ResolverConfig) -> Self {
        Self {
            api,
            clear_policy: config.clear_policy(),
            cache: ParseCache::new(config.parse_cache_capacity),
            config,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Current state
    pub async fn state(&self) -> InputSetState {
        self.session.lock().await.state.clone()
    }

    /// Start an attempt; every earlier ticket becomes stale
    pub async fn begin(&self, request: &RunInputRequest) -> Ticket {
        let mut session = self.session.lock().await;
        session.generation += 1;
        session.last_request = Some(request.clone());
        tracing::debug!(
            generation = session.generation,
            pipeline = %request.pipeline_identifier,
            "resolution started"
        );
        Ticket {
            generation: session.generation,
        }
    }

    /// Apply the result of an attempt if its ticket is still current
    pub async fn complete(&self, ticket: Ticket, result: Result<InputSetState>) -> Applied {
        let mut session = self.session.lock().await;
        if ticket.generation != session.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = session.generation,
                "discarding stale resolution"
            );
            return Applied::Stale {
                generation: ticket.generation,
                current: session.generation,
            };
        }

        match result {
            Ok(mut state) => {
                state.generation = ticket.generation;
                session.state = state;
            }
            Err(err) => {
                tracing::warn!(generation = ticket.generation, error = %err, "resolution failed");
                session.state.error = Some(StateError::from(&err));
                session.state.generation = ticket.generation;
            }
        }
        Applied::Current(session.state.clone())
    }

    /// Begin, resolve and complete in one call
    pub async fn run(&self, request: &RunInputRequest) -> Applied {
        let ticket = self.begin(request).await;
        let result = self.resolve(request).await;
        self.complete(ticket, result).await
    }

    /// Resolve the last request again
    pub async fn refetch(&self) -> Option<Applied> {
        let request = self.session.lock().await.last_request.clone()?;
        Some(self.run(&request).await)
    }

    /// Resolve a request without touching the session
    pub async fn resolve(&self, request: &RunInputRequest) -> Result<InputSetState> {
        let rerun = match request.rerun() {
            Some(yaml) => Some(self.cache.parse(yaml)?),
            None => None,
        };

        let template_request = request.template_request();
        let merge_request = request.merge_request();
        let (template, merged) = tokio::join!(
            self.api.get_template_from_pipeline(&template_request),
            self.fetch_merged(request, &merge_request),
        );
        if let Some(rerun) = rerun {
            return Ok(self.rerun_state(request, &rerun, template));
        }

        let template = template?;
        let mut state = InputSetState {
            has_runtime_inputs: template.has_runtime_inputs(),
            has_input_sets: template.has_input_sets,
            modules: template.modules.clone(),
            ..Default::default()
        };

        let parsed_template = match template.input_set_template_yaml.as_deref() {
            Some(yaml) if state.has_runtime_inputs => Some(self.cache.parse(yaml)?),
            _ => None,
        };
        state.parsed_template = parsed_template
            .as_deref()
            .cloned()
            .unwrap_or_else(Node::object);

        let Some(parsed_template) = parsed_template else {
            state.input_set = request.pipeline.clone().unwrap_or_else(Node::object);
            return Ok(state);
        };

        let cleared = PipelineParser::wrap(clear_runtime_input_with(
            pipeline_root(&parsed_template),
            &self.clear_policy,
        ));

        state.input_set = match merged?.and_then(|m| m.pipeline_yaml) {
            Some(yaml) => {
                let input_sets = self.cache.parse(&yaml)?;
                state.is_input_set_applied = true;
                merge(&cleared, &input_sets)
            }
            None => cleared,
        };

        if self.config.compute_missing_inputs {
            state.missing_inputs = missing_runtime_inputs(&parsed_template, &state.input_set);
        }

        tracing::debug!(
            pipeline = %request.pipeline_identifier,
            applied = state.is_input_set_applied,
            missing = state.missing_inputs.len(),
            "resolved run inputs"
        );
        Ok(state)
    }

    /// Rerun inputs are used verbatim; the template only fills the flags and
    /// a template failure is recorded without touching `input_set`
    fn rerun_state(
        &self,
        request: &RunInputRequest,
        rerun: &Node,
        template: RepositoryResult<TemplateResponse>,
    ) -> InputSetState {
        tracing::debug!(pipeline = %request.pipeline_identifier, "using rerun inputs");
        let mut state = InputSetState {
            input_set: rerun.clone(),
            ..Default::default()
        };

        let template = template.map_err(SdkError::from).and_then(|template| {
            let parsed = match template.input_set_template_yaml.as_deref() {
                Some(yaml) if template.has_runtime_inputs() => Some(self.cache.parse(yaml)?),
                _ => None,
            };
            Ok((template, parsed))
        });

        match template {
            Ok((template, parsed)) => {
                state.has_runtime_inputs = template.has_runtime_inputs();
                state.has_input_sets = template.has_input_sets;
                state.modules = template.modules;
                state.parsed_template = parsed.as_deref().cloned().unwrap_or_else(Node::object);
            }
            Err(err) => {
                tracing::warn!(error = %err, "template unavailable for rerun");
                state.error = Some(StateError::from(&err));
            }
        }
        state
    }

    async fn fetch_merged(
        &self,
        request: &RunInputRequest,
        merge_request: &runform_repository::MergeInputSetRequest,
    ) -> RepositoryResult<Option<MergedInputSetResponse>> {
        if !request.should_fetch_input_sets() {
            return Ok(None);
        }
        self.api.get_merged_input_sets(merge_request).await.map(Some)
    }
}
