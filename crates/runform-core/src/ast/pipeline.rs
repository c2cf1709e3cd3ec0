//! Pipeline element views
//!
//! Pipeline YAML nests its building blocks in single-key wrappers:
//!
//! ```yaml
//! pipeline:
//!   identifier: deploy_app
//!   stages:
//!     - stage:
//!         identifier: build
//!         type: CI
//!         spec: {}
//!     - parallel:
//!         - stage:
//!             identifier: qa
//!         - stage:
//!             identifier: perf
//! ```
//!
//! Steps follow the same pattern under `spec.execution.steps` with `step`,
//! `stepGroup` and `parallel` wrappers.

use std::collections::HashSet;

use crate::error::{CoreError, Result};
use crate::types::{FieldPath, Node};

/// Kind of an array element, decided by its wrapper key or its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `{stage: {...}}`
    Stage,
    /// `{step: {...}}`
    Step,
    /// `{stepGroup: {...}}`
    StepGroup,
    /// `{parallel: [...]}`
    Parallel,
    /// `{identifier: ..., ...}` without a wrapper
    Identified,
    /// `{name: ..., type: ..., value: ...}` pipeline/stage variable
    Variable,
    /// Anything else (scalars, anonymous objects)
    FieldGroup,
}

impl ElementKind {
    /// Classify an array element
    pub fn of(element: &Node) -> Self {
        let Some(map) = element.as_object() else {
            return ElementKind::FieldGroup;
        };

        if let (1, Some((key, value))) = (map.len(), map.first()) {
            match (key.as_str(), value) {
                ("stage", Node::Object(_)) => return ElementKind::Stage,
                ("step", Node::Object(_)) => return ElementKind::Step,
                ("stepGroup", Node::Object(_)) => return ElementKind::StepGroup,
                ("parallel", Node::Array(_)) => return ElementKind::Parallel,
                _ => {}
            }
        }

        if matches!(map.get("identifier"), Some(Node::String(_))) {
            return ElementKind::Identified;
        }
        if matches!(map.get("name"), Some(Node::String(_)))
            && (map.contains_key("type") || map.contains_key("value"))
        {
            return ElementKind::Variable;
        }
        ElementKind::FieldGroup
    }

    /// Wrapper key for wrapped kinds
    pub fn wrapper_key(self) -> Option<&'static str> {
        match self {
            ElementKind::Stage => Some("stage"),
            ElementKind::Step => Some("step"),
            ElementKind::StepGroup => Some("stepGroup"),
            ElementKind::Parallel => Some("parallel"),
            _ => None,
        }
    }

    /// Inner object of a wrapped element (`stage`, `step`, `stepGroup`)
    pub fn inner(self, element: &Node) -> Option<&Node> {
        match self {
            ElementKind::Stage | ElementKind::Step | ElementKind::StepGroup => {
                element.get(self.wrapper_key()?)
            }
            ElementKind::Identified | ElementKind::Variable => Some(element),
            _ => None,
        }
    }

    /// Join key used to match the element across trees, e.g. `stage/build`.
    /// Elements without a stable identity return `None`.
    pub fn identity(element: &Node) -> Option<String> {
        let kind = ElementKind::of(element);
        match kind {
            ElementKind::Stage | ElementKind::Step | ElementKind::StepGroup => {
                let id = kind.inner(element)?.get_str("identifier")?;
                Some(format!("{}/{}", kind.wrapper_key()?, id))
            }
            ElementKind::Identified => {
                Some(format!("identifier/{}", element.get_str("identifier")?))
            }
            ElementKind::Variable => Some(format!("variable/{}", element.get_str("name")?)),
            ElementKind::Parallel | ElementKind::FieldGroup => None,
        }
    }
}

/// Borrowed view over a `{stage: {...}}` element
#[derive(Debug, Clone, Copy)]
pub struct StageView<'a> {
    node: &'a Node,
}

impl<'a> StageView<'a> {
    /// View a stage element (wrapped `{stage: ...}` or the inner object)
    pub fn new(element: &'a Node) -> Option<Self> {
        match ElementKind::of(element) {
            ElementKind::Stage => element.get("stage").map(|node| Self { node }),
            ElementKind::Identified => Some(Self { node: element }),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&'a str> {
        self.node.get_str("identifier")
    }

    pub fn name(&self) -> Option<&'a str> {
        self.node.get_str("name")
    }

    pub fn stage_type(&self) -> Option<&'a str> {
        self.node.get_str("type")
    }

    pub fn spec(&self) -> Option<&'a Node> {
        self.node.get("spec")
    }

    /// Underlying stage object
    pub fn node(&self) -> &'a Node {
        self.node
    }
}

/// The pipeline object: `tree.pipeline` when present, else the tree itself
pub fn pipeline_root(tree: &Node) -> &Node {
    match tree.get("pipeline") {
        Some(inner) if inner.as_object().is_some() => inner,
        _ => tree,
    }
}

/// Mutable variant of [`pipeline_root`]
pub fn pipeline_root_mut(tree: &mut Node) -> &mut Node {
    if matches!(tree.get("pipeline"), Some(Node::Object(_))) {
        match tree {
            Node::Object(map) => &mut map["pipeline"],
            other => other,
        }
    } else {
        tree
    }
}

/// All stage elements of a pipeline, flattening `parallel` blocks, with
/// their paths relative to the tree passed in
pub fn stage_elements(tree: &Node) -> Vec<(FieldPath, StageView<'_>)> {
    let mut base = FieldPath::root();
    if matches!(tree.get("pipeline"), Some(Node::Object(_))) {
        base = base.key("pipeline");
    }

    let mut out = Vec::new();
    if let Some(stages) = pipeline_root(tree).get("stages").and_then(Node::as_array) {
        collect_stages(stages, &base.key("stages"), &mut out);
    }
    out
}

fn collect_stages<'a>(
    elements: &'a [Node],
    path: &FieldPath,
    out: &mut Vec<(FieldPath, StageView<'a>)>,
) {
    for (i, element) in elements.iter().enumerate() {
        let element_path = path.index(i);
        match ElementKind::of(element) {
            ElementKind::Parallel => {
                if let Some(children) = element.get("parallel").and_then(Node::as_array) {
                    collect_stages(children, &element_path.key("parallel"), out);
                }
            }
            _ => {
                if let Some(view) = StageView::new(element) {
                    out.push((element_path, view));
                } else if element.as_object().is_some() {
                    // Stage-shaped element without a usable wrapper; reported by validation
                    out.push((element_path, StageView { node: element }));
                }
            }
        }
    }
}

/// Check that every stage carries an identifier and that identifiers are unique.
/// Returns the identifiers in document order.
pub fn validate_stage_identifiers(tree: &Node) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for (path, stage) in stage_elements(tree) {
        let id = stage.identifier().ok_or_else(|| CoreError::MissingIdentifier {
            path: path.to_string(),
        })?;
        if !seen.insert(id) {
            return Err(CoreError::DuplicateIdentifier(id.to_string()));
        }
        identifiers.push(id.to_string());
    }

    log::debug!("validated {} stage identifiers", identifiers.len());
    Ok(identifiers)
}
