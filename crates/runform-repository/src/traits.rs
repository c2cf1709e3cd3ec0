//! Core trait for pipeline backends
//!
//! [`PipelineApi`] is the seam between the resolver and wherever pipelines
//! live. Two operations are needed to build a run form:
//!
//! - the input-set template for a stage selection
//! - the merge of the saved input sets the user picked
//!
//! ```no_run
//! use runform_core::{ProjectScope, StageSelection};
//! use runform_repository::{InMemoryRepository, PipelineApi, TemplateRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let repo = InMemoryRepository::new();
//! let request = TemplateRequest::new(ProjectScope::new("acc", "org", "proj"), "deploy")
//!     .with_selection(&StageSelection::only(["qa"]));
//! let template = repo.get_template_from_pipeline(&request).await?;
//! println!("runtime inputs: {}", template.has_runtime_inputs());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::RepositoryResult;
use crate::models::{
    MergeInputSetRequest, MergedInputSetResponse, TemplateRequest, TemplateResponse,
};

/// Backend serving input-set templates and merged input sets
///
/// Failures are returned as values and never retried here.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Input-set template for the pipeline, scoped to the requested stages.
    ///
    /// A response without template YAML means the selected stages hold no
    /// runtime input.
    async fn get_template_from_pipeline(
        &self,
        request: &TemplateRequest,
    ) -> RepositoryResult<TemplateResponse>;

    /// Saved input sets merged in reference order into one pipeline document
    async fn get_merged_input_sets(
        &self,
        request: &MergeInputSetRequest,
    ) -> RepositoryResult<MergedInputSetResponse>;
}
