//! runform Parser - YAML codec for runform
//!
//! This crate converts between YAML text and the `Node` tree used by the
//! merge engine. Runtime-input markers are recognised here, once, and travel
//! through the rest of the workspace as typed values.

pub mod error;
pub mod input_set_parser;
pub mod pipeline_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use error::{ParseError, Result};
pub use input_set_parser::{InputSetDocument, InputSetEntry, InputSetParser, OverlayInputSet};
pub use pipeline_parser::PipelineParser;
pub use yaml_parser::YamlParser;
