//! Input set parser
//!
//! Saved input sets come in two flavours:
//!
//! ```yaml
//! inputSet:
//!   identifier: qa_values
//!   name: QA values
//!   pipeline:
//!     identifier: deploy_app
//!     stages:
//!       - stage:
//!           identifier: deploy
//!           spec:
//!             environment: qa
//! ---
//! overlayInputSet:
//!   identifier: qa_hotfix
//!   inputSetReferences:
//!     - qa_values
//!     - hotfix_branch
//! ```
//!
//! Ad hoc payloads (merged input sets, rerun YAML) are plain `pipeline:`
//! documents and are accepted as anonymous input sets.

use crate::error::{ParseError, Result};
use crate::pipeline_parser::PipelineParser;
use crate::yaml_parser::YamlParser;
use runform_core::Node;

/// A saved or ad hoc input set
#[derive(Debug, Clone, PartialEq)]
pub struct InputSetDocument {
    /// Identifier (absent for ad hoc payloads)
    pub identifier: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Pipeline identifier the input set was written for
    pub pipeline_identifier: Option<String>,

    /// Supplied values, shaped `{ pipeline: {...} }`
    pub pipeline: Node,
}

/// An ordered list of references to other input sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayInputSet {
    pub identifier: String,
    pub name: Option<String>,
    pub input_set_references: Vec<String>,
}

/// Either kind of saved input set
#[derive(Debug, Clone, PartialEq)]
pub enum InputSetEntry {
    InputSet(InputSetDocument),
    Overlay(OverlayInputSet),
}

/// Input set parser
pub struct InputSetParser;

impl InputSetParser {
    /// Parse an `inputSet:` document or a plain `pipeline:` document
    pub fn parse(yaml_str: &str) -> Result<InputSetDocument> {
        let document = YamlParser::parse_document(yaml_str)?;
        Self::parse_from_node(document)
    }

    /// Parse an input set from an already parsed tree
    pub fn parse_from_node(document: Node) -> Result<InputSetDocument> {
        if let Some(input_set) = document.get("inputSet") {
            let pipeline = input_set
                .get("pipeline")
                .cloned()
                .ok_or_else(|| ParseError::MissingField {
                    field: "inputSet.pipeline".to_string(),
                })?;

            let pipeline = PipelineParser::wrap(pipeline);
            return Ok(InputSetDocument {
                identifier: Some(YamlParser::get_string(input_set, "identifier")?),
                name: YamlParser::get_optional_string(input_set, "name"),
                pipeline_identifier: PipelineParser::identifier(&pipeline),
                pipeline,
            });
        }

        if document.get("pipeline").is_some() {
            return Ok(InputSetDocument {
                identifier: None,
                name: None,
                pipeline_identifier: PipelineParser::identifier(&document),
                pipeline: document,
            });
        }

        Err(ParseError::MissingField {
            field: "inputSet".to_string(),
        })
    }

    /// Parse an `overlayInputSet:` document
    pub fn parse_overlay(yaml_str: &str) -> Result<OverlayInputSet> {
        let document = YamlParser::parse_document(yaml_str)?;
        Self::overlay_from_node(&document)
    }

    /// Parse either kind of saved input set
    pub fn parse_entry(yaml_str: &str) -> Result<InputSetEntry> {
        let document = YamlParser::parse_document(yaml_str)?;
        if document.get("overlayInputSet").is_some() {
            Ok(InputSetEntry::Overlay(Self::overlay_from_node(&document)?))
        } else {
            Ok(InputSetEntry::InputSet(Self::parse_from_node(document)?))
        }
    }

    fn overlay_from_node(document: &Node) -> Result<OverlayInputSet> {
        let overlay = document
            .get("overlayInputSet")
            .ok_or_else(|| ParseError::MissingField {
                field: "overlayInputSet".to_string(),
            })?;

        Ok(OverlayInputSet {
            identifier: YamlParser::get_string(overlay, "identifier")?,
            name: YamlParser::get_optional_string(overlay, "name"),
            input_set_references: YamlParser::get_string_list(overlay, "inputSetReferences"),
        })
    }
}
