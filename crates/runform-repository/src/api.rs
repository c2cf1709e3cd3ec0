//! HTTP pipeline API client
//!
//! Fetches input-set templates and merged input sets from a remote pipeline
//! service.
//!
//! # Usage
//!
//! ```no_run
//! use runform_core::ProjectScope;
//! use runform_repository::{ApiRepository, PipelineApi, TemplateRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repo = ApiRepository::new("https://pipelines.example.com", Some("api-key"))?;
//!
//!     let request = TemplateRequest::new(ProjectScope::new("acc", "org", "proj"), "deploy");
//!     let template = repo.get_template_from_pipeline(&request).await?;
//!     println!("{:?}", template.input_set_template_yaml);
//!
//!     Ok(())
//! }
//! ```
//!
//! # API Specification
//!
//! ## POST /api/inputSets/template
//!
//! Query: `accountIdentifier`, `orgIdentifier`, `projectIdentifier`,
//! `pipelineIdentifier`, plus `branch` and `repoIdentifier` for pipelines
//! stored in git. Body:
//!
//! ```json
//! { "stageIdentifiers": ["qa"] }
//! ```
//!
//! ## POST /api/inputSets/merge
//!
//! Same query parameters. Body:
//!
//! ```json
//! { "inputSetReferences": ["base", "hotfix"], "stageIdentifiers": [] }
//! ```
//!
//! Both answer with an envelope:
//!
//! ```json
//! { "status": "SUCCESS", "data": { ... }, "correlationId": "..." }
//! ```
//!
//! # Authentication
//!
//! If an API key is provided, it's sent as `x-api-key`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    MergeBody, MergeInputSetRequest, MergedInputSetResponse, ResponseEnvelope, TemplateBody,
    TemplateRequest, TemplateResponse,
};
use crate::traits::PipelineApi;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "x-api-key";
const SUCCESS: &str = "SUCCESS";

/// HTTP pipeline API client
#[derive(Debug, Clone)]
pub struct ApiRepository {
    /// HTTP client for making requests
    client: Client,

    /// Base URL of the API (e.g., "https://pipelines.example.com")
    base_url: String,

    /// Optional API key
    api_key: Option<String>,
}

impl ApiRepository {
    /// Create a client with the default timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<impl Into<String>>,
    ) -> RepositoryResult<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: Option<impl Into<String>>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepositoryError::Http(format!("Failed to create HTTP client: {}", e)))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(Into::into),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path` and unwrap the response envelope
    async fn post<B, T>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        body: &B,
    ) -> RepositoryResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).query(query).json(body);

        if let Some(ref key) = self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Http(format!("Failed to call {}: {}", url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Http(format!("Failed to read response body: {}", e)))?;

        // Error envelopes come with non-2xx codes too; prefer their message
        let envelope: Option<ResponseEnvelope<T>> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            return Err(match envelope {
                Some(envelope) => envelope_error(envelope),
                None => RepositoryError::Http(format!(
                    "API returned error status {} for {}",
                    status, url
                )),
            });
        }

        let envelope = envelope.ok_or_else(|| {
            RepositoryError::InvalidResponse(format!("unexpected body from {}", url))
        })?;

        if envelope.status != SUCCESS {
            return Err(envelope_error(envelope));
        }

        tracing::debug!(
            url = %url,
            correlation_id = envelope.correlation_id.as_deref().unwrap_or(""),
            "pipeline API call succeeded"
        );
        Ok(envelope.data)
    }
}

fn envelope_error<T>(envelope: ResponseEnvelope<T>) -> RepositoryError {
    RepositoryError::ApiStatus {
        status: envelope.status,
        message: envelope.message.unwrap_or_default(),
        correlation_id: envelope.correlation_id,
    }
}

#[async_trait]
impl PipelineApi for ApiRepository {
    async fn get_template_from_pipeline(
        &self,
        request: &TemplateRequest,
    ) -> RepositoryResult<TemplateResponse> {
        let body = TemplateBody {
            stage_identifiers: &request.stage_identifiers,
        };
        let data: Option<TemplateResponse> = self
            .post("/api/inputSets/template", &request.query_params(), &body)
            .await?;
        Ok(data.unwrap_or_default())
    }

    async fn get_merged_input_sets(
        &self,
        request: &MergeInputSetRequest,
    ) -> RepositoryResult<MergedInputSetResponse> {
        let body = MergeBody {
            input_set_references: &request.input_set_references,
            stage_identifiers: &request.template.stage_identifiers,
        };
        let data: Option<MergedInputSetResponse> = self
            .post(
                "/api/inputSets/merge",
                &request.template.query_params(),
                &body,
            )
            .await?;

        let merged = data.unwrap_or_default();
        if merged.is_error_response {
            return Err(RepositoryError::ApiStatus {
                status: "ERROR".to_string(),
                message: "selected input sets do not match the pipeline".to_string(),
                correlation_id: None,
            });
        }
        Ok(merged)
    }
}
