//! End-to-end compilation scenarios against the standard component library.

use std::sync::Once;

use serde_json::{Value, json};

use ppgc::{CompileError, ComponentRegistry, Config, GraphSnapshot, compile_graph,
    standard_components};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register_all(standard_components()).unwrap();
    registry
}

fn cfg(value: Value) -> Config {
    value.as_object().cloned().unwrap_or_default()
}

fn csv_source(graph: &mut GraphSnapshot, node_id: &str, path: &str) {
    graph.add_node(node_id, "csv_file_input", cfg(json!({ "file_path": path })));
}

/// One source feeding one single-input transform.
fn linear_pipeline() -> GraphSnapshot {
    let mut graph = GraphSnapshot::new();
    csv_source(&mut graph, "source", "sales.csv");
    graph.add_node(
        "transform",
        "filter_rows",
        cfg(json!({ "column": "amount", "operator": ">", "value": "100" })),
    );
    graph.add_edge("source", "transform", 0);
    graph
}

/// Two sources feeding a join configured with the given type and policy.
fn join_pipeline(how: &str, policy: &str) -> GraphSnapshot {
    let mut graph = GraphSnapshot::new();
    csv_source(&mut graph, "a", "left.csv");
    csv_source(&mut graph, "b", "right.csv");
    graph.add_node(
        "j",
        "join",
        cfg(json!({
            "left_keys": ["id"],
            "right_keys": ["id"],
            "how": how,
            "select_action_if_cartesian_product": policy,
        })),
    );
    graph.add_edge("a", "j", 0);
    graph.add_edge("b", "j", 1);
    graph
}

#[test]
fn linear_two_step_pipeline() {
    init_tracing();
    let registry = registry();
    let script = compile_graph(&linear_pipeline(), &registry).unwrap();

    let import = script.find("import pandas as pd").unwrap();
    let source = script
        .find("var_source = pd.read_csv('sales.csv', sep=',')")
        .unwrap();
    let transform = script
        .find("var_transform = var_source[var_source['amount'] > 100]")
        .unwrap();
    assert!(import < source && source < transform);
}

#[test]
fn compilation_is_deterministic() {
    let registry = registry();
    let graph = join_pipeline("inner", "2");
    let first = compile_graph(&graph, &registry).unwrap();
    let second = compile_graph(&graph, &registry).unwrap();
    assert_eq!(first, second);
}

#[test]
fn statements_respect_every_edge() {
    let registry = registry();
    let mut graph = join_pipeline("inner", "0");
    graph.add_node(
        "out",
        "csv_file_output",
        cfg(json!({ "file_path": "joined.csv" })),
    );
    graph.add_edge("j", "out", 0);
    let script = compile_graph(&graph, &registry).unwrap();

    let a = script.find("var_a = ").unwrap();
    let b = script.find("var_b = ").unwrap();
    let join = script.find("var_j = main_join(").unwrap();
    let sink = script.find("var_j.to_csv('joined.csv', index=False)").unwrap();
    assert!(a < join && b < join && join < sink);
}

#[test]
fn double_input_join_binds_slot_order() {
    let registry = registry();
    let script = compile_graph(&join_pipeline("inner", "0"), &registry).unwrap();
    assert!(script.contains(
        "var_j = main_join(var_a, var_b, key_left=['id'], key_right=['id'], \
         join_type='inner', action_if_cartesian_product=0)"
    ));
}

#[test]
fn join_with_cartesian_guard_raises() {
    init_tracing();
    let registry = registry();
    let script = compile_graph(&join_pipeline("left", "2"), &registry).unwrap();

    // The duplicate-key check ships once, and the call threads the abort
    // policy through to it.
    assert_eq!(script.matches("def check_cartesian_product").count(), 1);
    assert!(script.contains("raise ValueError(\"Cartesian product detected and not allowed.\")"));
    assert!(script.contains("action_if_cartesian_product=2)"));
}

#[test]
fn cross_join_ignores_guard_policy() {
    let registry = registry();
    let script = compile_graph(&join_pipeline("cross", "3"), &registry).unwrap();
    assert!(script.contains("join_type='cross'"));
    assert!(script.contains("action_if_cartesian_product=0)"));
    assert!(!script.contains("import warnings"));
}

#[test]
fn warn_policy_pulls_in_warnings_module() {
    let registry = registry();
    let script = compile_graph(&join_pipeline("outer", "3"), &registry).unwrap();
    assert!(script.contains("import warnings"));
}

#[test]
fn hidden_field_value_is_not_validated() {
    let registry = registry();
    // "banana" is not a legal guard policy, but a cross join hides the
    // field, so compilation succeeds anyway.
    let graph = join_pipeline("cross", "banana");
    compile_graph(&graph, &registry).unwrap();

    // The same stored value fails as soon as the field becomes visible.
    let err = compile_graph(&join_pipeline("inner", "banana"), &registry).unwrap_err();
    match err {
        CompileError::InvalidFieldValue { node, field, .. } => {
            assert_eq!(node, "j");
            assert_eq!(field, "select_action_if_cartesian_product");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn join_with_one_bound_input_is_rejected() {
    let registry = registry();
    let mut graph = GraphSnapshot::new();
    csv_source(&mut graph, "a", "left.csv");
    graph.add_node("j", "join", cfg(json!({ "how": "inner" })));
    graph.add_edge("a", "j", 0);
    let err = compile_graph(&graph, &registry).unwrap_err();
    assert!(matches!(err, CompileError::MissingInput { node, slot } if node == "j" && slot == 1));
}

#[test]
fn cyclic_graph_produces_no_output() {
    let registry = registry();
    let mut graph = GraphSnapshot::new();
    graph.add_node(
        "f1",
        "filter_rows",
        cfg(json!({ "column": "x", "operator": "==", "value": "1" })),
    );
    graph.add_node(
        "f2",
        "filter_rows",
        cfg(json!({ "column": "y", "operator": "==", "value": "2" })),
    );
    graph.add_edge("f1", "f2", 0);
    graph.add_edge("f2", "f1", 0);
    let err = compile_graph(&graph, &registry).unwrap_err();
    assert!(matches!(err, CompileError::Cycle { .. }));
}

#[test]
fn concat_threads_all_inputs() {
    let registry = registry();
    let mut graph = GraphSnapshot::new();
    csv_source(&mut graph, "jan", "jan.csv");
    csv_source(&mut graph, "feb", "feb.csv");
    csv_source(&mut graph, "mar", "mar.csv");
    graph.add_node("all", "concat", Config::new());
    graph.add_edge("jan", "all", 0);
    graph.add_edge("feb", "all", 1);
    graph.add_edge("mar", "all", 2);
    let script = compile_graph(&graph, &registry).unwrap();
    assert!(script.contains("var_all = pd.concat([var_jan, var_feb, var_mar], ignore_index=True)"));
}

#[test]
fn imports_appear_once_across_nodes() {
    let registry = registry();
    let mut graph = join_pipeline("inner", "0");
    graph.add_node(
        "out",
        "csv_file_output",
        cfg(json!({ "file_path": "joined.csv" })),
    );
    graph.add_edge("j", "out", 0);
    let script = compile_graph(&graph, &registry).unwrap();
    // Four pandas-importing nodes, one import line.
    assert_eq!(script.matches("import pandas as pd").count(), 1);
}

#[test]
fn snapshot_json_compiles_like_built_graph() {
    let registry = registry();
    let json = r#"{
        "nodes": [
            {"nodeId": "source", "descriptorId": "csv_file_input",
             "config": {"file_path": "sales.csv"}},
            {"nodeId": "transform", "descriptorId": "filter_rows",
             "config": {"column": "amount", "operator": ">", "value": "100"}}
        ],
        "edges": [
            {"source": "source", "target": "transform", "targetInputIndex": 0}
        ]
    }"#;
    let graph = GraphSnapshot::from_json(json).unwrap();
    let from_json = compile_graph(&graph, &registry).unwrap();
    let built = compile_graph(&linear_pipeline(), &registry).unwrap();
    assert_eq!(from_json, built);
}

#[test]
fn invalid_config_aborts_before_emission() {
    let registry = registry();
    let mut graph = linear_pipeline();
    graph.nodes[1].config.insert("operator".to_string(), json!("matches"));
    let err = compile_graph(&graph, &registry).unwrap_err();
    match err {
        CompileError::InvalidFieldValue { node, field, .. } => {
            assert_eq!(node, "transform");
            assert_eq!(field, "operator");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
