//! Server configuration

use runform_core::ProjectScope;
use runform_sdk::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where pipelines and input sets come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendType {
    /// Directory with `pipelines/` and `input_sets/<pipeline>/`, loaded at startup
    FileSystem {
        /// Base path for repository (default: "repository")
        #[serde(default = "default_repository_path")]
        path: PathBuf,
        /// Scope the loaded pipelines are registered under
        #[serde(default)]
        account_id: String,
        #[serde(default)]
        org_identifier: String,
        #[serde(default)]
        project_identifier: String,
    },
    /// Remote pipeline API
    Api {
        /// Base URL for the API
        base_url: String,
        /// Optional API key for authentication
        #[serde(default)]
        api_key: Option<String>,
        /// Request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_repository_path() -> PathBuf {
    PathBuf::from("repository")
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendType {
    fn default() -> Self {
        BackendType::FileSystem {
            path: default_repository_path(),
            account_id: String::new(),
            org_identifier: String::new(),
            project_identifier: String::new(),
        }
    }
}

impl BackendType {
    /// Scope of a file-system backend; `None` for the remote API
    pub fn scope(&self) -> Option<ProjectScope> {
        match self {
            BackendType::FileSystem {
                account_id,
                org_identifier,
                project_identifier,
                ..
            } => Some(ProjectScope::new(
                account_id.as_str(),
                org_identifier.as_str(),
                project_identifier.as_str(),
            )),
            BackendType::Api { .. } => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Pipeline backend
    pub backend: BackendType,

    /// Resolver tuning (parse cache, extra clear fields)
    pub resolver: ResolverConfig,

    /// Log level
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend: BackendType::default(),
            resolver: ResolverConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("RUNFORM").separator("__"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(_) => {
                tracing::info!("No config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Address to bind
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
