//! Field tree for pipelines, templates and input sets
//!
//! `Node` is close to a JSON value with two differences: object keys keep
//! their insertion order, and runtime-input markers are a variant of their own
//! instead of magic strings.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::path::{FieldPath, PathSegment};
use super::runtime_input::RuntimeInput;

/// A node of a pipeline / template / input-set tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (integer or float, as written)
    Number(serde_json::Number),
    /// String value
    String(String),
    /// Ordered list
    Array(Vec<Node>),
    /// Ordered key-value map
    Object(IndexMap<String, Node>),
    /// Value to be supplied at execution time
    RuntimeInput(RuntimeInput),
}

impl Node {
    /// Empty object
    pub fn object() -> Self {
        Node::Object(IndexMap::new())
    }

    /// Empty array
    pub fn array() -> Self {
        Node::Array(Vec::new())
    }

    /// Build an object from key/value pairs, keeping their order
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A bare `<+input>` marker
    pub fn runtime_input() -> Self {
        Node::RuntimeInput(RuntimeInput::bare())
    }

    /// String node; marker text becomes a runtime input
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if RuntimeInput::is_marker_text(&value) {
            if let Some(marker) = RuntimeInput::parse(&value) {
                return Node::RuntimeInput(marker);
            }
        }
        Node::String(value)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// Arrays and objects
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    pub fn is_runtime_input(&self) -> bool {
        matches!(self, Node::RuntimeInput(_))
    }

    /// Null or the empty string: a field that holds no value yet
    pub fn is_unset(&self) -> bool {
        match self {
            Node::Null => true,
            Node::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_runtime_input(&self) -> Option<&RuntimeInput> {
        match self {
            Node::RuntimeInput(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Object field lookup
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.as_object_mut().and_then(|map| map.get_mut(key))
    }

    /// String field lookup
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    /// Follow a path from this node
    pub fn get_path(&self, path: &FieldPath) -> Option<&Node> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                PathSegment::Key(key) => node.get(key),
                PathSegment::Index(index) => node.as_array().and_then(|items| items.get(*index)),
            })
    }

    /// Short type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::RuntimeInput(_) => "runtime input",
        }
    }

    /// Paths of every runtime-input marker, in document order
    pub fn runtime_input_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        collect_runtime_inputs(self, &FieldPath::root(), &mut paths);
        paths
    }

    /// Number of runtime-input markers in the tree
    pub fn count_runtime_inputs(&self) -> usize {
        match self {
            Node::RuntimeInput(_) => 1,
            Node::Array(items) => items.iter().map(Node::count_runtime_inputs).sum(),
            Node::Object(map) => map.values().map(Node::count_runtime_inputs).sum(),
            _ => 0,
        }
    }

    /// Convert from a JSON value, parsing marker strings
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Bool(b),
            serde_json::Value::Number(n) => Node::Number(n),
            serde_json::Value::String(s) => Node::text(s),
            serde_json::Value::Array(items) => {
                Node::Array(items.into_iter().map(Node::from_json).collect())
            }
            serde_json::Value::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Node::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a JSON value, rendering markers as text
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Null => serde_json::Value::Null,
            Node::Bool(b) => serde_json::Value::Bool(*b),
            Node::Number(n) => serde_json::Value::Number(n.clone()),
            Node::String(s) => serde_json::Value::String(s.clone()),
            Node::Array(items) => {
                serde_json::Value::Array(items.iter().map(Node::to_json).collect())
            }
            Node::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Node::RuntimeInput(marker) => serde_json::Value::String(marker.to_string()),
        }
    }
}

fn collect_runtime_inputs(node: &Node, path: &FieldPath, out: &mut Vec<FieldPath>) {
    match node {
        Node::RuntimeInput(_) => out.push(path.clone()),
        Node::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_runtime_inputs(item, &path.index(i), out);
            }
        }
        Node::Object(map) => {
            for (key, value) in map {
                collect_runtime_inputs(value, &path.key(key.as_str()), out);
            }
        }
        _ => {}
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::text(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::text(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(value.into())
    }
}

impl From<RuntimeInput> for Node {
    fn from(value: RuntimeInput) -> Self {
        Node::RuntimeInput(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Array(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Node::RuntimeInput(marker) => serializer.collect_str(marker),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Node::from_json)
    }
}
