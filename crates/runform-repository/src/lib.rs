//! Pipeline backends for runform
//!
//! This crate provides the [`PipelineApi`] seam the resolver talks to, and
//! its implementations.
//!
//! # Features
//!
//! - **API Repository** (`api` feature): remote pipeline service over HTTP
//! - **In-Memory Repository**: pipelines and saved input sets held locally,
//!   templates derived with the local projector
//! - **File System Loader**: fills an in-memory repository from a directory
//!
//! # Quick Start
//!
//! ```no_run
//! use runform_core::{ProjectScope, StageSelection};
//! use runform_repository::{FileSystemRepository, PipelineApi, TemplateRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scope = ProjectScope::new("acc", "org", "proj");
//!     let repo = FileSystemRepository::new("repository", scope.clone())?.load().await?;
//!
//!     let request = TemplateRequest::new(scope, "deploy_app")
//!         .with_selection(&StageSelection::all());
//!     let template = repo.get_template_from_pipeline(&request).await?;
//!     println!("{:?}", template.input_set_template_yaml);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file_system;
pub mod memory;
pub mod models;
pub mod traits;

#[cfg(feature = "api")]
pub mod api;

// Re-exports - Error
pub use error::{RepositoryError, RepositoryResult};

// Re-exports - Backends
pub use file_system::FileSystemRepository;
pub use memory::InMemoryRepository;
pub use models::*;
pub use traits::*;

#[cfg(feature = "api")]
pub use api::ApiRepository;
