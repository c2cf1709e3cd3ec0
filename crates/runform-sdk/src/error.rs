//! SDK error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// YAML could not be parsed
    #[error("Parser error: {0}")]
    ParseError(#[from] runform_parser::ParseError),

    /// Pipeline backend failure
    #[error("Fetch error: {0}")]
    FetchError(#[from] runform_repository::RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error in the preference store
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Preference scope whose key parts are not all known yet
    #[error("Access to \"{scope}\" scope is not available in the current context.")]
    ScopeUnavailable { scope: String },

    /// Generic SDK error
    #[error("SDK error: {0}")]
    GenericError(String),
}

impl From<runform_merge::MergeError> for SdkError {
    fn from(err: runform_merge::MergeError) -> Self {
        match err {
            runform_merge::MergeError::Parse(parse) => SdkError::ParseError(parse),
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

/// Category of a failed resolution, as exposed in the resolver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or backend failure
    Fetch,
    /// Unparsable template, input set or rerun YAML
    Parse,
    /// Anything else
    Other,
}

/// Cloneable snapshot of an [`SdkError`] kept in the resolver state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&SdkError> for StateError {
    fn from(err: &SdkError) -> Self {
        let kind = match err {
            SdkError::FetchError(_) => ErrorKind::Fetch,
            SdkError::ParseError(_) => ErrorKind::Parse,
            _ => ErrorKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}
