//! YAML Parser
//!
//! Provides the conversion between YAML text and `Node` trees.

use crate::error::{ParseError, Result};
use indexmap::IndexMap;
use runform_core::Node;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a node tree.
    ///
    /// Strings holding a well-formed `<+input>` marker become
    /// `Node::RuntimeInput`; every other string stays a string.
    pub fn parse(yaml_str: &str) -> Result<Node> {
        let yaml: YamlValue = serde_yaml::from_str(yaml_str)?;
        Self::from_yaml(yaml)
    }

    /// Parse YAML that must hold a mapping at the top level
    pub fn parse_document(yaml_str: &str) -> Result<Node> {
        let node = Self::parse(yaml_str)?;
        match node {
            Node::Object(_) => Ok(node),
            Node::Null => Ok(Node::object()),
            other => Err(ParseError::InvalidValue {
                field: "<document>".to_string(),
                message: format!("expected a mapping, got {}", other.type_name()),
            }),
        }
    }

    /// Parse YAML string containing multiple documents separated by `---`
    pub fn parse_multi_document(yaml_str: &str) -> Result<Vec<Node>> {
        let mut documents = Vec::new();

        for document in serde_yaml::Deserializer::from_str(yaml_str) {
            let value = YamlValue::deserialize(document)?;
            documents.push(Self::from_yaml(value)?);
        }

        if documents.is_empty() {
            documents.push(Self::parse(yaml_str)?);
        }

        Ok(documents)
    }

    /// Convert a YAML value into a node tree
    pub fn from_yaml(value: YamlValue) -> Result<Node> {
        Ok(match value {
            YamlValue::Null => Node::Null,
            YamlValue::Bool(b) => Node::Bool(b),
            YamlValue::Number(n) => Self::number(&n),
            YamlValue::String(s) => Node::text(s),
            YamlValue::Sequence(items) => Node::Array(
                items
                    .into_iter()
                    .map(Self::from_yaml)
                    .collect::<Result<Vec<_>>>()?,
            ),
            YamlValue::Mapping(mapping) => {
                let mut map = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    map.insert(Self::key_to_string(&key)?, Self::from_yaml(value)?);
                }
                Node::Object(map)
            }
            YamlValue::Tagged(tagged) => Self::from_yaml(tagged.value)?,
        })
    }

    /// Convert a node tree back into a YAML value, rendering markers as text
    pub fn to_yaml(node: &Node) -> YamlValue {
        match node {
            Node::Null => YamlValue::Null,
            Node::Bool(b) => YamlValue::Bool(*b),
            Node::Number(n) => {
                if let Some(i) = n.as_i64() {
                    YamlValue::Number(i.into())
                } else if let Some(u) = n.as_u64() {
                    YamlValue::Number(u.into())
                } else {
                    YamlValue::Number(n.as_f64().unwrap_or_default().into())
                }
            }
            Node::String(s) => YamlValue::String(s.clone()),
            Node::Array(items) => YamlValue::Sequence(items.iter().map(Self::to_yaml).collect()),
            Node::Object(map) => YamlValue::Mapping(
                map.iter()
                    .map(|(k, v)| (YamlValue::String(k.clone()), Self::to_yaml(v)))
                    .collect(),
            ),
            Node::RuntimeInput(marker) => YamlValue::String(marker.to_string()),
        }
    }

    /// Serialize a node tree as YAML text
    pub fn stringify(node: &Node) -> Result<String> {
        Ok(serde_yaml::to_string(&Self::to_yaml(node))?)
    }

    /// Get a required string field from a node
    pub fn get_string(obj: &Node, field: &str) -> Result<String> {
        obj.get_str(field)
            .map(|s| s.to_string())
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Get an optional string field from a node
    pub fn get_optional_string(obj: &Node, field: &str) -> Option<String> {
        obj.get_str(field).map(|s| s.to_string())
    }

    /// Get an optional list of strings from a node
    pub fn get_string_list(obj: &Node, field: &str) -> Vec<String> {
        obj.get(field)
            .and_then(Node::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Node::as_str)
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn number(n: &serde_yaml::Number) -> Node {
        if let Some(i) = n.as_i64() {
            Node::Number(i.into())
        } else if let Some(u) = n.as_u64() {
            Node::Number(u.into())
        } else {
            // .nan and .inf have no JSON representation
            n.as_f64()
                .and_then(serde_json::Number::from_f64)
                .map(Node::Number)
                .unwrap_or_else(|| Node::String(n.to_string()))
        }
    }

    fn key_to_string(key: &YamlValue) -> Result<String> {
        match key {
            YamlValue::String(s) => Ok(s.clone()),
            YamlValue::Number(n) => Ok(n.to_string()),
            YamlValue::Bool(b) => Ok(b.to_string()),
            other => Err(ParseError::UnsupportedKey(format!("{:?}", other))),
        }
    }
}
