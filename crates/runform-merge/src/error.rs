//! Merge error types

use runform_parser::ParseError;
use thiserror::Error;

/// Merge error
///
/// Shape mismatches between a template and an input set are never errors;
/// the only failure of a merge is an input that cannot be parsed.
#[derive(Error, Debug)]
pub enum MergeError {
    /// Input set or template text could not be parsed
    #[error("Failed to parse input: {0}")]
    Parse(#[from] ParseError),
}

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;
