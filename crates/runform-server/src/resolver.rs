//! Resolver initialization
//!
//! Turns the configured backend into a [`PipelineApi`] and wraps it in an
//! [`InputSetResolver`]. A file-system backend is read completely here; a
//! reload builds a fresh resolver the same way.

use crate::config::{BackendType, ServerConfig};
use anyhow::Result;
use runform_repository::{ApiRepository, FileSystemRepository, PipelineApi};
use runform_sdk::InputSetResolver;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the backend named by the configuration
pub async fn init_backend(backend: &BackendType) -> Result<Arc<dyn PipelineApi>> {
    match backend {
        BackendType::FileSystem { path, .. } => {
            info!("Loading pipelines from file system repository: {:?}", path);
            let scope = backend.scope().unwrap_or_default();
            let loader = FileSystemRepository::new(path, scope).map_err(|e| {
                anyhow::anyhow!("Failed to create file system repository: {}", e)
            })?;
            let repo = loader.load().await?;
            Ok(Arc::new(repo))
        }
        BackendType::Api {
            base_url,
            api_key,
            timeout_secs,
        } => {
            info!("Using pipeline API at {}", base_url);
            let repo = ApiRepository::with_timeout(
                base_url.clone(),
                api_key.clone(),
                Duration::from_secs(*timeout_secs),
            )?;
            Ok(Arc::new(repo))
        }
    }
}

/// Initialize the resolver
pub async fn init_resolver(config: &ServerConfig) -> Result<InputSetResolver> {
    let api = init_backend(&config.backend).await?;
    Ok(InputSetResolver::with_config(api, config.resolver.clone()))
}
