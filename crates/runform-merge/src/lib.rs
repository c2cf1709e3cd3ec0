//! runform Merge - input-set template merging
//!
//! This crate holds the pure tree transforms of the Run Pipeline flow:
//! - `template`: stage filtering and projection of a pipeline onto its runtime inputs
//! - `clear`: normalisation of bare runtime-input markers
//! - `merger`: structural overlay of input sets onto a template
//! - `completeness`: runtime inputs still unresolved after a merge
//!
//! Every function here is synchronous and side-effect free.

pub mod clear;
pub mod completeness;
pub mod error;
pub mod merger;
pub mod template;

// Re-export main types
pub use clear::{clear_runtime_input, clear_runtime_input_with, ClearPolicy};
pub use completeness::missing_runtime_inputs;
pub use error::{MergeError, Result};
pub use merger::{merge, merge_all, merge_input_set_yaml, merge_template_with_input_sets};
pub use template::{filter_stages, project_template};
