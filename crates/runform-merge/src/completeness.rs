//! Completeness check for resolved pipelines

use runform_core::{FieldPath, Node};

/// Template runtime-input paths that `resolved` still leaves open.
///
/// A path is open when the resolved tree has nothing there, holds `null`,
/// the empty string or an empty list or map, or still holds a marker without
/// a default value.
pub fn missing_runtime_inputs(template: &Node, resolved: &Node) -> Vec<FieldPath> {
    template
        .runtime_input_paths()
        .into_iter()
        .filter(|path| is_open(resolved.get_path(path)))
        .collect()
}

fn is_open(value: Option<&Node>) -> bool {
    match value {
        None => true,
        Some(Node::RuntimeInput(marker)) => marker.default.is_none(),
        Some(Node::Array(items)) => items.is_empty(),
        Some(Node::Object(map)) => map.is_empty(),
        Some(node) => node.is_unset(),
    }
}
