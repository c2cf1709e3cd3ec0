//! runform Core - Core types shared across the runform workspace
//!
//! This crate provides the fundamental types used by the Run Pipeline flow:
//! - `Node`, the ordered field tree pipelines, templates and input sets are parsed into
//! - `RuntimeInput`, the typed form of the `<+input>` marker
//! - Typed views over pipeline elements (stages, steps, step groups)
//! - Stage selection and project scope
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{ElementKind, ProjectScope, StageSelection, StageView};
pub use error::CoreError;
pub use types::{FieldPath, Node, PathSegment, RuntimeInput};
