//! Error types for runform Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Missing identifier at {path}")]
    MissingIdentifier { path: String },

    #[error("Duplicate stage identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid runtime input: {0}")]
    InvalidRuntimeInput(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
