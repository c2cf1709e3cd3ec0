//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while talking to a pipeline backend
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Pipeline not registered in the backend
    #[error("Pipeline not found: {identifier}")]
    PipelineNotFound { identifier: String },

    /// Saved input set not registered for the pipeline
    #[error("Input set not found: {identifier} (pipeline {pipeline})")]
    InputSetNotFound { pipeline: String, identifier: String },

    /// Overlay input sets referencing each other
    #[error("Overlay input set cycle through: {identifier}")]
    OverlayCycle { identifier: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Parser error from runform-parser
    #[error("Parser error: {0}")]
    Parser(String),

    /// Invalid directory or file path
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Transport failure or non-success HTTP status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-`SUCCESS` envelope
    #[error("API returned status {status}: {message}")]
    ApiStatus {
        status: String,
        message: String,
        correlation_id: Option<String>,
    },

    /// Response body did not match the expected envelope
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("Repository error: {0}")]
    Other(String),
}

impl From<runform_parser::ParseError> for RepositoryError {
    fn from(err: runform_parser::ParseError) -> Self {
        RepositoryError::Parser(err.to_string())
    }
}

impl From<runform_merge::MergeError> for RepositoryError {
    fn from(err: runform_merge::MergeError) -> Self {
        RepositoryError::Parser(err.to_string())
    }
}
