//! Integration tests for InputSetResolver

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use runform_core::{Node, ProjectScope, StageSelection};
use runform_parser::YamlParser;
use runform_repository::{
    InMemoryRepository, MergeInputSetRequest, MergedInputSetResponse, PipelineApi,
    RepositoryError, RepositoryResult, TemplateRequest, TemplateResponse,
};
use runform_sdk::{
    Applied, ErrorKind, InputSetResolver, ResolverConfig, RunInputRequest,
};

const PIPELINE: &str = r#"
pipeline:
  identifier: deploy_app
  name: Deploy App
  stages:
    - stage:
        identifier: build
        type: CI
        spec:
          branch: <+input>
    - stage:
        identifier: deploy
        type: Deployment
        spec:
          environment: <+input>
          replicas: 2
"#;

const STATIC_PIPELINE: &str = r#"
pipeline:
  identifier: nightly
  stages:
    - stage:
        identifier: build
        type: CI
        spec:
          branch: main
"#;

const QA_VALUES: &str = r#"
inputSet:
  identifier: qa_values
  pipeline:
    identifier: deploy_app
    stages:
      - stage:
          identifier: build
          spec:
            branch: develop
      - stage:
          identifier: deploy
          spec:
            environment: qa
"#;

const HOTFIX: &str = r#"
inputSet:
  identifier: hotfix
  pipeline:
    identifier: deploy_app
    stages:
      - stage:
          identifier: build
          spec:
            branch: hotfix/1.2
"#;

fn scope() -> ProjectScope {
    ProjectScope::new("acc", "org", "proj")
}

async fn create_repo() -> Arc<InMemoryRepository> {
    let repo = InMemoryRepository::new();
    repo.insert_pipeline_yaml(&scope(), PIPELINE).await.unwrap();
    repo.insert_pipeline_yaml(&scope(), STATIC_PIPELINE)
        .await
        .unwrap();
    for yaml in [QA_VALUES, HOTFIX] {
        repo.insert_input_set_yaml(&scope(), "deploy_app", yaml)
            .await
            .unwrap();
    }
    Arc::new(repo)
}

fn paths(state: &runform_sdk::InputSetState) -> Vec<String> {
    state.missing_inputs.iter().map(ToString::to_string).collect()
}

fn current(applied: Applied) -> runform_sdk::InputSetState {
    match applied {
        Applied::Current(state) => state,
        Applied::Stale { .. } => panic!("expected the result to be applied"),
    }
}

/// Serves a fixed template and a switchable merged-input-set payload
#[derive(Default)]
struct ScriptedApi {
    template_yaml: Option<String>,
    merged_yaml: Mutex<Option<String>>,
    fail_template: AtomicBool,
    template_calls: AtomicUsize,
}

impl ScriptedApi {
    fn new(template_yaml: &str) -> Self {
        Self {
            template_yaml: Some(template_yaml.to_string()),
            ..Default::default()
        }
    }

    fn set_merged(&self, yaml: Option<&str>) {
        *self.merged_yaml.lock().unwrap() = yaml.map(str::to_string);
    }
}

#[async_trait]
impl PipelineApi for ScriptedApi {
    async fn get_template_from_pipeline(
        &self,
        _request: &TemplateRequest,
    ) -> RepositoryResult<TemplateResponse> {
        self.template_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_template.load(Ordering::SeqCst) {
            return Err(RepositoryError::Http("connection reset".to_string()));
        }
        Ok(TemplateResponse {
            input_set_template_yaml: self.template_yaml.clone(),
            has_input_sets: true,
            modules: vec!["ci".to_string()],
        })
    }

    async fn get_merged_input_sets(
        &self,
        _request: &MergeInputSetRequest,
    ) -> RepositoryResult<MergedInputSetResponse> {
        Ok(MergedInputSetResponse {
            pipeline_yaml: self.merged_yaml.lock().unwrap().clone(),
            is_error_response: false,
        })
    }
}

const TEMPLATE: &str = r#"
pipeline:
  identifier: p
  stages:
    - stage:
        identifier: build
        type: CI
        spec:
          branch: <+input>
          tags: <+input>
"#;

#[tokio::test]
async fn test_cleared_template_without_input_sets() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "deploy_app");

    let state = current(resolver.run(&request).await);

    assert!(state.has_runtime_inputs);
    assert!(state.has_input_sets);
    assert!(!state.is_input_set_applied);
    assert_eq!(state.modules, vec!["cd", "ci"]);
    assert_eq!(state.parsed_template.count_runtime_inputs(), 2);
    assert_eq!(state.input_set.count_runtime_inputs(), 0);
    assert_eq!(
        paths(&state),
        vec![
            "pipeline.stages[0].stage.spec.branch",
            "pipeline.stages[1].stage.spec.environment",
        ]
    );
    assert!(!state.is_complete());
}

#[tokio::test]
async fn test_input_sets_fill_the_form() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "deploy_app").with_input_sets(["qa_values"]);

    let state = current(resolver.run(&request).await);

    assert!(state.is_input_set_applied);
    assert!(state.is_complete());
    let root = state.input_set.get("pipeline").unwrap();
    let stages = root.get("stages").and_then(Node::as_array).unwrap();
    let branch = stages[0]
        .get("stage")
        .and_then(|s| s.get("spec"))
        .and_then(|s| s.get_str("branch"));
    assert_eq!(branch, Some("develop"));
}

#[tokio::test]
async fn test_later_input_set_wins_and_gaps_stay_missing() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "deploy_app").with_input_sets(["hotfix"]);

    let state = current(resolver.run(&request).await);

    assert!(state.is_input_set_applied);
    assert_eq!(paths(&state), vec!["pipeline.stages[1].stage.spec.environment"]);

    let request = request.with_input_sets(["hotfix", "qa_values"]);
    let state = current(resolver.run(&request).await);
    let branch = state
        .input_set
        .get("pipeline")
        .and_then(|p| p.get("stages"))
        .and_then(Node::as_array)
        .and_then(|stages| stages[0].get("stage"))
        .and_then(|s| s.get("spec"))
        .and_then(|s| s.get_str("branch"));
    assert_eq!(branch, Some("develop"));
}

#[tokio::test]
async fn test_stage_selection_limits_the_form() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "deploy_app")
        .with_selection(StageSelection::only(["deploy"]));

    let state = current(resolver.run(&request).await);

    assert_eq!(paths(&state), vec!["pipeline.stages[0].stage.spec.environment"]);
}

#[tokio::test]
async fn test_pipeline_without_runtime_inputs_is_used_as_is() {
    let resolver = InputSetResolver::new(create_repo().await);
    let pipeline = YamlParser::parse_document(STATIC_PIPELINE).unwrap();
    let request = RunInputRequest::new(scope(), "nightly").with_pipeline(pipeline.clone());

    let state = current(resolver.run(&request).await);

    assert!(!state.has_runtime_inputs);
    assert_eq!(state.input_set, pipeline);
    assert_eq!(state.parsed_template, Node::object());
    assert!(state.missing_inputs.is_empty());
}

#[tokio::test]
async fn test_rerun_inputs_are_used_verbatim() {
    let resolver = InputSetResolver::new(create_repo().await);
    let rerun = "pipeline:\n  identifier: deploy_app\n  note: from last run\n";
    let request = RunInputRequest::new(scope(), "deploy_app")
        .with_input_sets(["qa_values"])
        .with_rerun_yaml(rerun);

    let state = current(resolver.run(&request).await);

    assert_eq!(state.input_set, YamlParser::parse_document(rerun).unwrap());
    assert!(!state.is_input_set_applied);
    assert!(state.has_runtime_inputs);
    assert!(state.missing_inputs.is_empty());
}

#[tokio::test]
async fn test_rerun_survives_template_fetch_failure() {
    let api = Arc::new(ScriptedApi::new(TEMPLATE));
    api.fail_template.store(true, Ordering::SeqCst);
    let resolver = InputSetResolver::new(api);
    let rerun = "pipeline:\n  identifier: p\n  x: v\n";
    let request = RunInputRequest::new(ProjectScope::default(), "p").with_rerun_yaml(rerun);

    let state = current(resolver.run(&request).await);

    assert_eq!(state.input_set, YamlParser::parse_document(rerun).unwrap());
    assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::Fetch));
    assert!(!state.has_runtime_inputs);
    assert!(state.modules.is_empty());
    assert_eq!(state.generation, 1);
}

#[tokio::test]
async fn test_rerun_for_unknown_pipeline_keeps_rerun_inputs() {
    let resolver = InputSetResolver::new(create_repo().await);
    let rerun = "pipeline:\n  identifier: gone\n  x: v\n";
    let request = RunInputRequest::new(scope(), "gone").with_rerun_yaml(rerun);

    let state = current(resolver.run(&request).await);

    assert_eq!(state.input_set, YamlParser::parse_document(rerun).unwrap());
    assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::Fetch));
}

#[tokio::test]
async fn test_rerun_with_unparsable_template() {
    let api = Arc::new(ScriptedApi::new("pipeline: [unclosed"));
    let resolver = InputSetResolver::new(api);
    let rerun = "pipeline:\n  identifier: p\n  x: v\n";
    let request = RunInputRequest::new(ProjectScope::default(), "p").with_rerun_yaml(rerun);

    let state = current(resolver.run(&request).await);

    assert_eq!(state.input_set, YamlParser::parse_document(rerun).unwrap());
    assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::Parse));
    assert_eq!(state.parsed_template, Node::object());
}

const SELECTORS_PIPELINE: &str = r#"
pipeline:
  identifier: rollout
  stages:
    - stage:
        identifier: deploy
        type: Deployment
        spec:
          delegateSelectors: <+input>
          tags: <+input>
          env: <+input>
"#;

const SELECTORS_VALUES: &str = r#"
inputSet:
  identifier: core_qa
  pipeline:
    identifier: rollout
    stages:
      - stage:
          identifier: deploy
          spec:
            delegateSelectors: [a, b]
            tags:
              team: core
            env: qa
"#;

#[tokio::test]
async fn test_input_set_fills_list_and_map_inputs() {
    let repo = InMemoryRepository::new();
    repo.insert_pipeline_yaml(&scope(), SELECTORS_PIPELINE).await.unwrap();
    repo.insert_input_set_yaml(&scope(), "rollout", SELECTORS_VALUES)
        .await
        .unwrap();
    let resolver = InputSetResolver::new(Arc::new(repo));
    let spec_of = |state: &runform_sdk::InputSetState| {
        state
            .input_set
            .get("pipeline")
            .and_then(|p| p.get("stages"))
            .and_then(Node::as_array)
            .and_then(|stages| stages[0].get("stage"))
            .and_then(|s| s.get("spec"))
            .cloned()
            .unwrap()
    };

    let empty = current(resolver.run(&RunInputRequest::new(scope(), "rollout")).await);
    assert_eq!(spec_of(&empty).get("delegateSelectors"), Some(&Node::Array(Vec::new())));
    assert_eq!(
        paths(&empty),
        vec![
            "pipeline.stages[0].stage.spec.delegateSelectors",
            "pipeline.stages[0].stage.spec.tags",
            "pipeline.stages[0].stage.spec.env",
        ]
    );

    let request = RunInputRequest::new(scope(), "rollout").with_input_sets(["core_qa"]);
    let state = current(resolver.run(&request).await);

    let spec = spec_of(&state);
    let selectors: Vec<&str> = spec
        .get("delegateSelectors")
        .and_then(Node::as_array)
        .unwrap()
        .iter()
        .filter_map(Node::as_str)
        .collect();
    assert_eq!(selectors, vec!["a", "b"]);
    assert_eq!(
        spec.get("tags").and_then(|t| t.get_str("team")),
        Some("core")
    );
    assert_eq!(spec.get_str("env"), Some("qa"));
    assert!(state.is_input_set_applied);
    assert!(state.missing_inputs.is_empty());
}

#[tokio::test]
async fn test_unparsable_input_set_keeps_last_good_state() {
    let api = Arc::new(ScriptedApi::new(TEMPLATE));
    api.set_merged(Some("pipeline:\n  identifier: p\n"));
    let resolver = InputSetResolver::new(api.clone());
    let request = RunInputRequest::new(ProjectScope::default(), "p").with_input_sets(["a"]);

    let good = current(resolver.run(&request).await);
    assert!(good.error.is_none());

    api.set_merged(Some("pipeline: [unclosed"));
    let failed = current(resolver.run(&request).await);

    let error = failed.error.clone().unwrap();
    assert_eq!(error.kind, ErrorKind::Parse);
    assert_eq!(failed.input_set, good.input_set);
    assert_eq!(failed.generation, 2);
    assert!(!failed.is_complete());
}

#[tokio::test]
async fn test_fetch_error_is_reported() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "missing_pipeline");

    let state = current(resolver.run(&request).await);

    assert_eq!(state.error.map(|e| e.kind), Some(ErrorKind::Fetch));
    assert_eq!(state.input_set, Node::Null);
}

#[tokio::test]
async fn test_recovery_clears_error() {
    let api = Arc::new(ScriptedApi::new(TEMPLATE));
    let resolver = InputSetResolver::new(api.clone());
    let request = RunInputRequest::new(ProjectScope::default(), "p");

    api.fail_template.store(true, Ordering::SeqCst);
    let failed = current(resolver.run(&request).await);
    assert_eq!(failed.error.map(|e| e.kind), Some(ErrorKind::Fetch));

    api.fail_template.store(false, Ordering::SeqCst);
    let recovered = current(resolver.refetch().await.unwrap());
    assert!(recovered.error.is_none());
    assert_eq!(recovered.modules, vec!["ci"]);
    assert_eq!(api.template_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_policy_shapes_empty_values() {
    let api = Arc::new(ScriptedApi::new(TEMPLATE));
    let resolver = InputSetResolver::new(api);
    let request = RunInputRequest::new(ProjectScope::default(), "p");

    let state = current(resolver.run(&request).await);
    let spec = state
        .input_set
        .get("pipeline")
        .and_then(|p| p.get("stages"))
        .and_then(Node::as_array)
        .and_then(|stages| stages[0].get("stage"))
        .and_then(|s| s.get("spec"))
        .cloned()
        .unwrap();

    assert_eq!(spec.get("branch"), Some(&Node::String(String::new())));
    assert_eq!(spec.get("tags"), Some(&Node::object()));
}

#[tokio::test]
async fn test_refetch_reuses_parsed_documents() {
    let resolver = InputSetResolver::new(create_repo().await);
    let request = RunInputRequest::new(scope(), "deploy_app").with_input_sets(["qa_values"]);

    resolver.run(&request).await;
    let misses = resolver.cache_stats().misses;
    resolver.refetch().await.unwrap();

    let stats = resolver.cache_stats();
    assert_eq!(stats.misses, misses);
    assert_eq!(stats.hits, 2);
}

#[tokio::test]
async fn test_missing_inputs_can_be_disabled() {
    let config = ResolverConfig::new().compute_missing_inputs(false);
    let resolver = InputSetResolver::with_config(create_repo().await, config);

    let state = current(
        resolver
            .run(&RunInputRequest::new(scope(), "deploy_app"))
            .await,
    );
    assert!(state.missing_inputs.is_empty());
}

#[tokio::test]
async fn test_slow_result_for_old_selection_is_discarded() {
    let resolver = InputSetResolver::new(create_repo().await);
    let old = RunInputRequest::new(scope(), "deploy_app");
    let new = old.clone().with_selection(StageSelection::only(["deploy"]));

    let old_ticket = resolver.begin(&old).await;
    let new_ticket = resolver.begin(&new).await;

    let fresh = resolver.resolve(&new).await;
    let applied = resolver.complete(new_ticket, fresh).await;
    assert!(!applied.is_stale());

    let late = resolver.resolve(&old).await;
    let discarded = resolver.complete(old_ticket, late).await;
    assert!(discarded.is_stale());

    let state = resolver.state().await;
    assert_eq!(state.generation, 2);
    assert_eq!(paths(&state), vec!["pipeline.stages[0].stage.spec.environment"]);
}
