//! Clear-runtime-input pass
//!
//! Before a freshly fetched template is merged, every bare `<+input>` marker
//! is reset to an empty value so the run form starts from blank fields rather
//! than placeholder text. Markers that carry a default, allowed values, a
//! regex or the execution-input flag are kept as they are: the form needs that
//! information to render and validate the field.

use std::collections::HashSet;

use runform_core::Node;

/// Decides the empty value of a cleared field from its key
#[derive(Debug, Clone)]
pub struct ClearPolicy {
    list_fields: HashSet<String>,
    map_fields: HashSet<String>,
}

const LIST_FIELDS: &[&str] = &[
    "delegateSelectors",
    "paths",
    "files",
    "valuesPaths",
    "manifests",
    "artifacts",
    "sidecars",
    "variables",
    "steps",
    "stages",
    "services",
    "environments",
];

const MAP_FIELDS: &[&str] = &["tags", "labels", "envVariables", "headers", "spec"];

impl Default for ClearPolicy {
    fn default() -> Self {
        Self {
            list_fields: LIST_FIELDS.iter().map(|s| s.to_string()).collect(),
            map_fields: MAP_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClearPolicy {
    /// Policy that clears everything to the empty string
    pub fn scalars_only() -> Self {
        Self {
            list_fields: HashSet::new(),
            map_fields: HashSet::new(),
        }
    }

    /// Treat `key` as list-valued
    pub fn with_list_field(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.map_fields.remove(&key);
        self.list_fields.insert(key);
        self
    }

    /// Treat `key` as map-valued
    pub fn with_map_field(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.list_fields.remove(&key);
        self.map_fields.insert(key);
        self
    }

    /// Empty value for a field stored under `key` (`None` for array elements)
    pub fn empty_value(&self, key: Option<&str>) -> Node {
        match key {
            Some(k) if self.list_fields.contains(k) => Node::array(),
            Some(k) if self.map_fields.contains(k) => Node::object(),
            _ => Node::String(String::new()),
        }
    }
}

/// Clear bare markers using the default policy
pub fn clear_runtime_input(tree: &Node) -> Node {
    clear_runtime_input_with(tree, &ClearPolicy::default())
}

/// Clear bare markers using `policy`.
///
/// Pure and idempotent: the output has the same shape as the input and
/// contains no bare markers, so a second pass changes nothing.
pub fn clear_runtime_input_with(tree: &Node, policy: &ClearPolicy) -> Node {
    clear_node(tree, None, policy)
}

fn clear_node(node: &Node, key: Option<&str>, policy: &ClearPolicy) -> Node {
    match node {
        Node::RuntimeInput(marker) if marker.is_bare() => policy.empty_value(key),
        Node::Object(map) => Node::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), clear_node(v, Some(k.as_str()), policy)))
                .collect(),
        ),
        Node::Array(items) => {
            Node::Array(items.iter().map(|v| clear_node(v, None, policy)).collect())
        }
        other => other.clone(),
    }
}
