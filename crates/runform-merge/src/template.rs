//! Input-set template derivation
//!
//! An input-set template is the pipeline reduced to the fields a user still
//! has to fill in. Deriving it locally takes two passes:
//!
//! 1. [`filter_stages`] keeps only the selected stages
//! 2. projection keeps only subtrees holding runtime-input markers, plus the
//!    anchor fields (`identifier`, `type`, or `name` for variables) of every
//!    object that survives, so identity matching still works on the result

use runform_core::ast::pipeline_root_mut;
use runform_core::{ElementKind, Node, StageSelection, StageView};
use runform_parser::PipelineParser;

const ANCHOR_KEYS: &[&str] = &["identifier", "type"];

/// Remove unselected stages, including inside `parallel` groups.
/// Groups left without stages are dropped.
pub fn filter_stages(tree: &Node, selection: &StageSelection) -> Node {
    let mut filtered = tree.clone();
    if selection.selects_all() {
        return filtered;
    }

    let root = pipeline_root_mut(&mut filtered);
    if let Some(stages) = root.get_mut("stages").and_then(Node::as_array_mut) {
        let before = stages.len();
        retain_selected(stages, selection);
        log::debug!(
            "stage filter kept {} of {} top-level elements",
            stages.len(),
            before
        );
    }
    filtered
}

fn retain_selected(elements: &mut Vec<Node>, selection: &StageSelection) {
    elements.retain_mut(|element| match ElementKind::of(element) {
        ElementKind::Parallel => {
            match element.get_mut("parallel").and_then(Node::as_array_mut) {
                Some(children) => {
                    retain_selected(children, selection);
                    !children.is_empty()
                }
                None => false,
            }
        }
        ElementKind::Stage | ElementKind::Identified => StageView::new(element)
            .and_then(|stage| stage.identifier())
            .is_some_and(|id| selection.includes(id)),
        _ => false,
    });
}

/// Derive the input-set template of `pipeline` for `selection`.
///
/// Returns `None` when the selected stages hold no runtime input, which is
/// how "this pipeline has no runtime inputs" is signalled downstream.
pub fn project_template(pipeline: &Node, selection: &StageSelection) -> Option<Node> {
    let wrapped = match pipeline.get("pipeline") {
        Some(Node::Object(_)) => pipeline.clone(),
        _ => PipelineParser::wrap(pipeline.clone()),
    };
    let filtered = filter_stages(&wrapped, selection);
    let template = project(&filtered);

    match &template {
        Some(t) => log::debug!("projected template with {} runtime inputs", t.count_runtime_inputs()),
        None => log::debug!("pipeline has no runtime inputs for this selection"),
    }
    template
}

fn project(node: &Node) -> Option<Node> {
    match node {
        Node::RuntimeInput(_) => Some(node.clone()),
        Node::Object(map) => {
            let projected: Vec<(&String, Node)> = map
                .iter()
                .filter_map(|(key, value)| project(value).map(|v| (key, v)))
                .collect();
            if projected.is_empty() {
                return None;
            }

            let has_identifier = map.contains_key("identifier");
            let is_anchor = |key: &str| {
                ANCHOR_KEYS.contains(&key) || (key == "name" && !has_identifier)
            };

            // Original key order, anchors included
            let mut out = Node::object();
            if let Some(out_map) = out.as_object_mut() {
                for (key, value) in map {
                    if let Some((_, v)) = projected.iter().find(|(k, _)| *k == key) {
                        out_map.insert(key.clone(), v.clone());
                    } else if is_anchor(key) && !value.is_composite() {
                        out_map.insert(key.clone(), value.clone());
                    }
                }
            }
            Some(out)
        }
        Node::Array(items) => {
            // Scalar lists are kept whole so element positions stay aligned
            if items.iter().any(Node::is_runtime_input) {
                return Some(node.clone());
            }
            let projected: Vec<Node> = items.iter().filter_map(project).collect();
            (!projected.is_empty()).then_some(Node::Array(projected))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runform_parser::YamlParser;

    const PIPELINE: &str = r#"
pipeline:
  identifier: deploy_app
  name: Deploy App
  variables:
    - name: region
      type: String
      value: <+input>
    - name: fixed
      type: String
      value: eu
  stages:
    - stage:
        identifier: build
        name: Build
        type: CI
        spec:
          branch: <+input>
          image: rust:1.80
    - parallel:
        - stage:
            identifier: qa
            type: Deployment
            spec:
              environment: <+input>.allowedValues(qa,staging)
        - stage:
            identifier: perf
            type: Deployment
            spec:
              environment: perf
    - stage:
        identifier: release
        type: Deployment
        spec:
          environment: prod
"#;

    fn pipeline() -> Node {
        YamlParser::parse_document(PIPELINE).unwrap()
    }

    fn stage_ids(tree: &Node) -> Vec<String> {
        runform_core::ast::stage_elements(tree)
            .iter()
            .filter_map(|(_, s)| s.identifier().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_filter_keeps_selected_stages() {
        let filtered = filter_stages(&pipeline(), &StageSelection::only(["qa", "release"]));
        assert_eq!(stage_ids(&filtered), vec!["qa", "release"]);
    }

    #[test]
    fn test_filter_drops_empty_parallel_groups() {
        let filtered = filter_stages(&pipeline(), &StageSelection::only(["build"]));
        let stages = filtered
            .get("pipeline")
            .and_then(|p| p.get("stages"))
            .and_then(Node::as_array)
            .unwrap();
        assert_eq!(stages.len(), 1);
    }

    #[test]
    fn test_filter_all_is_identity() {
        assert_eq!(filter_stages(&pipeline(), &StageSelection::all()), pipeline());
    }

    #[test]
    fn test_unknown_identifiers_select_nothing() {
        let filtered = filter_stages(&pipeline(), &StageSelection::only(["nope"]));
        assert!(stage_ids(&filtered).is_empty());
    }

    #[test]
    fn test_projection_keeps_markers_and_anchors() {
        let template = project_template(&pipeline(), &StageSelection::all()).unwrap();
        let expected = YamlParser::parse_document(
            r#"
pipeline:
  identifier: deploy_app
  variables:
    - name: region
      type: String
      value: <+input>
  stages:
    - stage:
        identifier: build
        type: CI
        spec:
          branch: <+input>
    - parallel:
        - stage:
            identifier: qa
            type: Deployment
            spec:
              environment: <+input>.allowedValues(qa,staging)
"#,
        )
        .unwrap();
        assert_eq!(template, expected);
    }

    #[test]
    fn test_projection_respects_selection() {
        let template = project_template(&pipeline(), &StageSelection::only(["qa"])).unwrap();
        assert_eq!(stage_ids(&template), vec!["qa"]);
        assert_eq!(template.count_runtime_inputs(), 2);
    }

    #[test]
    fn test_no_runtime_inputs_yields_none() {
        assert!(project_template(&pipeline(), &StageSelection::only(["release"]))
            .and_then(|t| t.get("pipeline").and_then(|p| p.get("stages")).cloned())
            .is_none());

        let plain = YamlParser::parse_document("pipeline:\n  identifier: p\n  stages: []\n").unwrap();
        assert!(project_template(&plain, &StageSelection::all()).is_none());
    }

    #[test]
    fn test_scalar_list_kept_whole() {
        let tree = Node::from_pairs([(
            "pipeline",
            Node::from_pairs([(
                "paths",
                Node::Array(vec![Node::from("a"), Node::runtime_input()]),
            )]),
        )]);
        let template = project_template(&tree, &StageSelection::all()).unwrap();
        assert_eq!(template, tree);
    }

    #[test]
    fn test_unwrapped_pipeline_is_wrapped() {
        let bare = Node::from_pairs([
            ("identifier", Node::from("p")),
            ("timeout", Node::runtime_input()),
        ]);
        let template = project_template(&bare, &StageSelection::all()).unwrap();
        assert_eq!(template, PipelineParser::wrap(bare));
    }
}
