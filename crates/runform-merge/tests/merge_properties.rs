//! Property and scenario tests for clearing, merging and stage filtering

use proptest::prelude::*;
use runform_core::{Node, RuntimeInput, StageSelection};
use runform_merge::*;
use runform_parser::YamlParser;

// =============================================================================
// Strategies
// =============================================================================

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Bool),
        "[a-z]{0,4}".prop_map(Node::String),
        Just(Node::runtime_input()),
        "[a-z]{1,3}".prop_map(|d| Node::RuntimeInput(RuntimeInput::bare().with_default(d))),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Node::Array),
            prop::collection::vec(
                (
                    prop_oneof![
                        Just("tags"),
                        Just("paths"),
                        Just("spec"),
                        Just("name"),
                        Just("value"),
                        Just("identifier"),
                    ],
                    inner
                ),
                0..4
            )
            .prop_map(Node::from_pairs),
        ]
    })
}

fn has_bare_marker(node: &Node) -> bool {
    match node {
        Node::RuntimeInput(marker) => marker.is_bare(),
        Node::Array(items) => items.iter().any(has_bare_marker),
        Node::Object(map) => map.values().any(has_bare_marker),
        _ => false,
    }
}

/// `merged` keeps the template's keys and array lengths down to template
/// leaves; an empty template list or map may be filled by the input
fn shape_within(merged: &Node, template: &Node) -> bool {
    match template {
        Node::Object(t) if t.is_empty() => merged.as_object().is_some(),
        Node::Array(t) if t.is_empty() => merged.as_array().is_some(),
        Node::Object(t) => match merged {
            Node::Object(m) => {
                t.keys().eq(m.keys()) && t.iter().all(|(k, tv)| shape_within(&m[k], tv))
            }
            _ => false,
        },
        Node::Array(t) => match merged {
            Node::Array(m) => {
                m.len() == t.len() && m.iter().zip(t).all(|(mv, tv)| shape_within(mv, tv))
            }
            _ => false,
        },
        _ => true,
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_clear_is_idempotent(t in tree()) {
        let once = clear_runtime_input(&t);
        prop_assert_eq!(clear_runtime_input(&once), once.clone());
        prop_assert!(!has_bare_marker(&once));
    }

    #[test]
    fn prop_merge_stays_within_template_shape(t in tree(), input in tree()) {
        let merged = merge(&t, &input);
        prop_assert!(shape_within(&merged, &t));
    }

    #[test]
    fn prop_input_replaces_template_leaf(input in tree()) {
        let template = Node::from_pairs([("value", Node::runtime_input())]);
        let merged = merge(&template, &Node::from_pairs([("value", input.clone())]));
        let expected = if input.is_null() || input.is_runtime_input() {
            Node::runtime_input()
        } else {
            input
        };
        prop_assert_eq!(merged.get("value"), Some(&expected));
    }

    #[test]
    fn prop_cleared_template_takes_input_composites(input in tree()) {
        let template = clear_runtime_input(&Node::from_pairs([
            ("tags", Node::runtime_input()),
            ("paths", Node::runtime_input()),
        ]));
        let merged = merge(
            &template,
            &Node::from_pairs([("tags", input.clone()), ("paths", input.clone())]),
        );
        if input.as_object().is_some() {
            prop_assert_eq!(merged.get("tags"), Some(&input));
            prop_assert_eq!(merged.get("paths"), Some(&Node::array()));
        }
        if input.as_array().is_some() {
            prop_assert_eq!(merged.get("paths"), Some(&input));
            prop_assert_eq!(merged.get("tags"), Some(&Node::object()));
        }
    }

    #[test]
    fn prop_null_or_empty_input_keeps_template(t in tree()) {
        prop_assert_eq!(merge(&t, &Node::Null), t.clone());
        prop_assert_eq!(merge(&t, &Node::runtime_input()), t.clone());
        if t.is_composite() {
            prop_assert_eq!(merge(&t, &Node::object()), t.clone());
        }
    }

    #[test]
    fn prop_last_input_set_wins(
        a in prop::collection::btree_map("[a-e]", "[a-z]{1,3}", 0..5),
        b in prop::collection::btree_map("[a-e]", "[a-z]{1,3}", 0..5),
    ) {
        let keys = ["a", "b", "c", "d", "e"];
        let template = Node::from_pairs(keys.iter().map(|k| (*k, Node::runtime_input())));
        let set_a = Node::from_pairs(a.iter().map(|(k, v)| (k.clone(), Node::String(v.clone()))));
        let set_b = Node::from_pairs(b.iter().map(|(k, v)| (k.clone(), Node::String(v.clone()))));

        let merged = merge_all(&template, [&set_a, &set_b]);
        for key in keys {
            let expected = b
                .get(key)
                .or_else(|| a.get(key))
                .map(|v| Node::String(v.clone()))
                .unwrap_or_else(Node::runtime_input);
            prop_assert_eq!(merged.get(key), Some(&expected));
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_stage_filter_then_merge() {
    let pipeline = YamlParser::parse_document(
        r#"
pipeline:
  identifier: p
  stages:
    - stage:
        identifier: S1
        spec:
          x: <+input>
    - stage:
        identifier: S2
        spec:
          x: <+input>
    - stage:
        identifier: S3
        spec:
          y: fixed
"#,
    )
    .unwrap();

    let template = project_template(&pipeline, &StageSelection::only(["S2"])).unwrap();
    let resolved = merge_input_set_yaml(
        &clear_runtime_input(&template),
        r#"
pipeline:
  stages:
    - stage:
        identifier: S2
        spec:
          x: v
"#,
    )
    .unwrap();

    let stages = resolved
        .get("pipeline")
        .and_then(|p| p.get("stages"))
        .and_then(Node::as_array)
        .unwrap();
    assert_eq!(stages.len(), 1);
    let s2 = stages[0].get("stage").unwrap();
    assert_eq!(s2.get_str("identifier"), Some("S2"));
    assert_eq!(s2.get("spec").and_then(|s| s.get_str("x")), Some("v"));
    assert!(missing_runtime_inputs(&template, &resolved).is_empty());
}

#[test]
fn test_unparsable_input_set_is_an_error_value() {
    let template = YamlParser::parse_document("pipeline:\n  x: <+input>\n").unwrap();
    let result = merge_input_set_yaml(&template, "pipeline:\n  x: [unclosed\n");
    assert!(matches!(result, Err(MergeError::Parse(_))));
}

#[test]
fn test_cleared_template_merge_reports_missing_fields() {
    let template = YamlParser::parse_document(
        r#"
pipeline:
  identifier: p
  properties:
    ci:
      codebase:
        build: <+input>
  variables:
    - name: region
      type: String
      value: <+input>
    - name: tier
      type: String
      value: <+input>.default(silver)
"#,
    )
    .unwrap();

    let resolved = merge_input_set_yaml(
        &clear_runtime_input(&template),
        "inputSet:\n  identifier: partial\n  pipeline:\n    variables:\n      - name: region\n        type: String\n        value: eu-west-1\n",
    )
    .unwrap();

    let missing: Vec<String> = missing_runtime_inputs(&template, &resolved)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(missing, vec!["pipeline.properties.ci.codebase.build"]);
}
