//! Validator behavior over complete flow documents.

use flowrun::{parse_flow, validate_flow, ErrorCode};

fn validate(json: &str) -> flowrun::ValidationReport {
    let schema = parse_flow(json).unwrap();
    validate_flow(&schema, None)
}

#[test]
fn nested_loops_enrich_transitively() {
    let report = validate(
        r#"{
        "name": "matrix",
        "version": "1.0.0",
        "variables": [{"id": "rows", "type": "array"}, {"id": "flat", "default": []}],
        "input": ["rows"],
        "output": ["flat"],
        "nodes": [{
            "id": "outer", "type": "FOR_EACH", "name": "outer",
            "config": {"each_key": "row"},
            "input": {"items": "{{rows}}"},
            "each_nodes": [{
                "id": "inner", "type": "FOR_EACH", "name": "inner",
                "config": {"each_key": "cell"},
                "input": {"items": "{{row}}"},
                "each_nodes": [{
                    "id": "collect", "type": "UPDATE_VARIABLE", "name": "collect",
                    "config": {"variable_id": "flat", "type": "append", "stringify_output": false},
                    "value": "{{row_index}}:{{cell_index}}:{{cell}}"
                }]
            }]
        }]
    }"#,
    );
    assert!(report.is_valid, "{:?}", report.errors);
    assert_eq!(report.execution_order, vec!["outer"]);
}

#[test]
fn condition_children_are_addressable_downstream() {
    let report = validate(
        r#"{
        "name": "branching",
        "version": "1.0.0",
        "variables": [{"id": "flag"}, {"id": "label"}, {"id": "echo"}],
        "nodes": [
            {
                "id": "decide", "type": "CONDITION", "name": "decide",
                "input": {"switch_value": "{{flag}}"},
                "branches": {
                    "yes": {
                        "condition": "equals", "value": true,
                        "nodes": [{
                            "id": "mark", "type": "UPDATE_VARIABLE", "name": "mark",
                            "config": {"variable_id": "label", "type": "update"},
                            "value": "yes"
                        }]
                    },
                    "default": {"nodes": []}
                }
            },
            {
                "id": "after", "type": "UPDATE_VARIABLE", "name": "after",
                "config": {"variable_id": "echo", "type": "update"},
                "value": "{{mark.output.new_value}}"
            }
        ]
    }"#,
    );
    assert!(report.is_valid, "{:?}", report.errors);
    // the edge lands on the branch child's top-level ancestor
    assert_eq!(report.execution_order, vec!["decide", "after"]);
}

#[test]
fn self_reference_is_a_cycle() {
    let report = validate(
        r#"{
        "name": "selfish",
        "version": "1.0.0",
        "variables": [{"id": "x"}],
        "nodes": [{
            "id": "a", "type": "UPDATE_VARIABLE", "name": "a",
            "config": {"variable_id": "x", "type": "update"},
            "value": "{{a.output.new_value}}"
        }]
    }"#,
    );
    assert!(report.has_error(ErrorCode::CircularDependency));
}

#[test]
fn unknown_operator_in_branch() {
    let report = validate(
        r#"{
        "name": "ops",
        "version": "1.0.0",
        "variables": [{"id": "v"}],
        "nodes": [{
            "id": "c", "type": "CONDITION", "name": "c",
            "input": {"switch_value": "{{v}}"},
            "branches": {
                "weird": {"condition": "sounds_like", "value": 1, "nodes": []}
            }
        }]
    }"#,
    );
    assert!(report.has_error(ErrorCode::InvalidValue));
}

#[test]
fn update_operation_tag_is_validated() {
    let report = validate(
        r#"{
        "name": "ops",
        "version": "1.0.0",
        "variables": [{"id": "v"}],
        "nodes": [{
            "id": "u", "type": "UPDATE_VARIABLE", "name": "u",
            "config": {"variable_id": "v", "type": "shuffle"},
            "value": "x"
        }]
    }"#,
    );
    assert!(report.has_error(ErrorCode::InvalidValue));
}

#[test]
fn duplicate_ids_across_nesting() {
    let report = validate(
        r#"{
        "name": "dups",
        "version": "1.0.0",
        "variables": [{"id": "items"}, {"id": "acc"}],
        "nodes": [
            {
                "id": "step", "type": "UPDATE_VARIABLE", "name": "step",
                "config": {"variable_id": "acc", "type": "update"},
                "value": "x"
            },
            {
                "id": "loop", "type": "FOR_EACH", "name": "loop",
                "config": {"each_key": "it"},
                "input": {"items": "{{items}}"},
                "each_nodes": [{
                    "id": "step", "type": "UPDATE_VARIABLE", "name": "inner step",
                    "config": {"variable_id": "acc", "type": "update"},
                    "value": "{{it}}"
                }]
            }
        ]
    }"#,
    );
    assert!(report.has_error(ErrorCode::DuplicateNodeId));
}

#[test]
fn validation_of_text_is_idempotent() {
    let text = r#"{
        "name": "idem",
        "version": "2.1.0-rc.1",
        "variables": [{"id": "x"}],
        "nodes": [
            {
                "id": "a", "type": "UPDATE_VARIABLE", "name": "a",
                "config": {"variable_id": "x", "type": "update"},
                "value": "{{ghost.output}}"
            },
            {"id": "b", "type": "MYSTERY", "name": "b"}
        ]
    }"#;
    let first = validate(text);
    let second = validate(text);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
    assert!(first.has_error(ErrorCode::InvalidNodeType));
    assert!(first.has_error(ErrorCode::InvalidVariableReference));
}

#[test]
fn prerelease_versions_are_accepted() {
    let report = validate(
        r#"{"name": "v", "version": "0.3.0-alpha.2", "variables": [], "nodes": []}"#,
    );
    assert!(report.is_valid, "{:?}", report.errors);

    let report = validate(r#"{"name": "v", "version": "3", "variables": [], "nodes": []}"#);
    assert!(report.has_error(ErrorCode::InvalidValue));
}
