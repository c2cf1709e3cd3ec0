//! Input-set merger
//!
//! `merge(template, input_set)` overlays the values of an input set onto an
//! input-set template. The template decides the shape of the result:
//!
//! - keys only in the template are kept (still to be supplied)
//! - keys only in the input set are dropped
//! - a concrete input value replaces the template leaf at the same position
//! - a marker or `null` in the input set never overwrites the template
//! - array elements are joined by identity (`stage/<id>`, `step/<id>`,
//!   `variable/<name>`, ...); input elements with no counterpart are dropped
//! - an empty template list or map (a cleared list/map runtime input) takes
//!   the input composite of the same kind as a whole
//!
//! Several input sets are applied with [`merge_all`], a left fold: the last
//! selected input set wins wherever two of them supply the same field.

use std::collections::HashMap;

use runform_core::{ElementKind, Node};
use runform_parser::InputSetParser;

use crate::error::Result;

/// Overlay `input_set` onto `template`
pub fn merge(template: &Node, input_set: &Node) -> Node {
    match (template, input_set) {
        (_, Node::Null) | (_, Node::RuntimeInput(_)) => template.clone(),
        (Node::Object(template_map), Node::Object(_)) if template_map.is_empty() => {
            input_set.clone()
        }
        (Node::Array(template_items), Node::Array(_)) if template_items.is_empty() => {
            input_set.clone()
        }
        (Node::Object(template_map), Node::Object(input_map)) => Node::Object(
            template_map
                .iter()
                .map(|(key, value)| {
                    let merged = match input_map.get(key) {
                        Some(input_value) => merge(value, input_value),
                        None => value.clone(),
                    };
                    (key.clone(), merged)
                })
                .collect(),
        ),
        (Node::Array(template_items), Node::Array(input_items)) => {
            Node::Array(merge_arrays(template_items, input_items))
        }
        // Shape mismatch: the template keeps its composite
        (template, _) if template.is_composite() => template.clone(),
        (_, concrete) => concrete.clone(),
    }
}

/// Apply input sets in selection order: `merge(merge(t, a), b)`
pub fn merge_all<'a, I>(template: &Node, input_sets: I) -> Node
where
    I: IntoIterator<Item = &'a Node>,
{
    input_sets
        .into_iter()
        .fold(template.clone(), |acc, input_set| merge(&acc, input_set))
}

/// Parse an input-set document (`inputSet:` or plain `pipeline:`) and merge it
/// into a `{ pipeline: ... }` template. Unparsable text is returned as an
/// error; the template itself is left untouched.
pub fn merge_input_set_yaml(template: &Node, yaml: &str) -> Result<Node> {
    let input_set = InputSetParser::parse(yaml)?;
    log::debug!(
        "merging input set {:?} into template",
        input_set.identifier
    );
    Ok(merge(template, &input_set.pipeline))
}

/// Merge a sequence of input-set documents into a template, in order
pub fn merge_template_with_input_sets<S: AsRef<str>>(template: &Node, yamls: &[S]) -> Result<Node> {
    let parsed = yamls
        .iter()
        .map(|yaml| InputSetParser::parse(yaml.as_ref()).map(|doc| doc.pipeline))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(merge_all(template, parsed.iter()))
}

fn merge_arrays(template: &[Node], input: &[Node]) -> Vec<Node> {
    let mut keyed: HashMap<String, &Node> = HashMap::new();
    let mut anonymous: Vec<&Node> = Vec::new();

    for element in input {
        match ElementKind::identity(element) {
            Some(id) => {
                keyed.entry(id).or_insert(element);
            }
            None => anonymous.push(element),
        }
    }

    let mut used = vec![false; anonymous.len()];

    template
        .iter()
        .map(|element| match ElementKind::identity(element) {
            Some(id) => match keyed.get(&id) {
                Some(input_element) => merge(element, input_element),
                None => element.clone(),
            },
            None => match match_anonymous(element, &anonymous, &mut used) {
                Some(input_element) => merge(element, input_element),
                None => element.clone(),
            },
        })
        .collect()
}

/// Pair an identity-less template element with an input element.
///
/// `parallel` blocks pair with the first unused input block sharing a child
/// identity; otherwise elements pair with the next unused input element of
/// the same kind, in order.
fn match_anonymous<'a>(
    element: &Node,
    candidates: &[&'a Node],
    used: &mut [bool],
) -> Option<&'a Node> {
    let kind = ElementKind::of(element);

    if kind == ElementKind::Parallel {
        let ids = child_identities(element);
        let shared = candidates.iter().enumerate().find(|(i, candidate)| {
            !used[*i]
                && ElementKind::of(candidate) == ElementKind::Parallel
                && child_identities(candidate).iter().any(|id| ids.contains(id))
        });
        if let Some((i, candidate)) = shared {
            used[i] = true;
            return Some(candidate);
        }
    }

    let next = candidates
        .iter()
        .enumerate()
        .find(|(i, candidate)| !used[*i] && ElementKind::of(candidate) == kind);
    next.map(|(i, candidate)| {
        used[i] = true;
        *candidate
    })
}

fn child_identities(parallel: &Node) -> Vec<String> {
    parallel
        .get("parallel")
        .and_then(Node::as_array)
        .map(|children| children.iter().filter_map(ElementKind::identity).collect())
        .unwrap_or_default()
}
