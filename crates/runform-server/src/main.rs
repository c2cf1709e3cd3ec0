//! runform HTTP Server
//!
//! Provides REST API for resolving the run form of a pipeline.

use anyhow::Result;
use runform_server::{api, config::ServerConfig, resolver};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing()?;

    // Load configuration
    let config = ServerConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    // Initialize resolver
    let resolver = resolver::init_resolver(&config).await?;
    info!("Input set resolver initialized");

    let addr = config.address();
    let app = api::create_router(resolver, config);

    info!("Starting server on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!(
        "  Run inputs: POST http://{}/v1/pipelines/<pipeline>/run-inputs",
        addr
    );
    info!("  Reload repository: POST http://{}/v1/repo/reload", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "runform_server=info,runform_sdk=info,runform_repository=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
