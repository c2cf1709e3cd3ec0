//! Typed views over pipeline trees
//!
//! Pipelines stay generic `Node` trees so the merge algorithm can walk any
//! shape. This module adds typed access where the shape is known:
//! - Element kinds (stage, step, step group, parallel block, variable)
//! - Stage views and identifier validation
//! - Stage selection
//! - Project scope

pub mod pipeline;
pub mod scope;
pub mod selection;

pub use pipeline::{
    pipeline_root, pipeline_root_mut, stage_elements, validate_stage_identifiers, ElementKind,
    StageView,
};
pub use scope::ProjectScope;
pub use selection::StageSelection;
