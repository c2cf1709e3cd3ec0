//! Pipeline parser
//!
//! Parses pipeline and input-set-template YAML into `Node` trees of the
//! shape `{ pipeline: {...} }`.

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use runform_core::ast::{pipeline_root, validate_stage_identifiers};
use runform_core::Node;

/// Pipeline parser
pub struct PipelineParser;

impl PipelineParser {
    /// Parse a pipeline definition.
    ///
    /// The document must have a top-level `pipeline` mapping and every stage
    /// must carry a unique identifier.
    pub fn parse(yaml_str: &str) -> Result<Node> {
        let document = Self::parse_wrapped(yaml_str)?;
        let identifiers = validate_stage_identifiers(&document)?;
        log::debug!(
            "parsed pipeline {:?} with stages {:?}",
            Self::identifier(&document),
            identifiers
        );
        Ok(document)
    }

    /// Parse an input-set template.
    ///
    /// Templates are projections, so identifier validation is skipped: a
    /// template only has to be a `pipeline` document.
    pub fn parse_template(yaml_str: &str) -> Result<Node> {
        Self::parse_wrapped(yaml_str)
    }

    /// Parse a document and make sure it has a `pipeline` mapping
    pub fn parse_wrapped(yaml_str: &str) -> Result<Node> {
        let document = YamlParser::parse_document(yaml_str)?;
        match document.get("pipeline") {
            Some(Node::Object(_)) => Ok(document),
            Some(other) => Err(ParseError::InvalidValue {
                field: "pipeline".to_string(),
                message: format!("expected a mapping, got {}", other.type_name()),
            }),
            None => Err(ParseError::MissingField {
                field: "pipeline".to_string(),
            }),
        }
    }

    /// Wrap a bare pipeline object as `{ pipeline: ... }`
    pub fn wrap(pipeline: Node) -> Node {
        Node::from_pairs([("pipeline", pipeline)])
    }

    /// Pipeline identifier, if present
    pub fn identifier(document: &Node) -> Option<String> {
        YamlParser::get_optional_string(pipeline_root(document), "identifier")
    }
}
