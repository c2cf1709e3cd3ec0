//! runform SDK
//!
//! High-level API for building the run form of a pipeline: fetch the
//! input-set template for the selected stages, clear its placeholders and
//! overlay the saved input sets the user picked.
//!
//! ```no_run
//! use std::sync::Arc;
//! use runform_core::{ProjectScope, StageSelection};
//! use runform_repository::InMemoryRepository;
//! use runform_sdk::{InputSetResolver, RunInputRequest};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let resolver = InputSetResolver::new(Arc::new(InMemoryRepository::new()));
//! let request = RunInputRequest::new(ProjectScope::new("acc", "org", "proj"), "deploy_app")
//!     .with_selection(StageSelection::only(["deploy"]))
//!     .with_input_sets(["qa_values"]);
//!
//! if let Some(state) = resolver.run(&request).await.state() {
//!     println!("missing inputs: {:?}", state.missing_inputs);
//! }
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod preferences;
pub mod resolver;
pub mod state;

// Re-export main types
pub use cache::{CacheStats, ParseCache};
pub use config::ResolverConfig;
pub use error::{ErrorKind, Result, SdkError, StateError};
pub use preferences::{
    JsonFileBackend, MemoryBackend, PreferenceBackend, PreferenceContext, PreferenceScope,
    PreferenceStore,
};
pub use resolver::InputSetResolver;
pub use state::{Applied, InputSetState, RunInputRequest, Ticket};

// Re-export commonly used types from dependencies
pub use runform_core::{FieldPath, Node, ProjectScope, StageSelection};
pub use runform_repository::PipelineApi;
