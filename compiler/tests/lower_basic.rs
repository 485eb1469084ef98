//! Integration tests for the lowering pass: step tree → n8n document.

#[allow(dead_code)]
mod helpers;

use serde_json::json;

use flowc::lower::{self, LowerOptions};
use flowc::parse::{self, Step, TriggerKind};
use flowc::target::TargetGraph;
use helpers::*;

fn lower_ok(workflow: &flowc::parse::Workflow) -> TargetGraph {
    lower::lower(workflow, &LowerOptions::default()).expect("Should lower successfully")
}

/// `source -> target` per connection, in key order.
fn chain_text(graph: &TargetGraph) -> String {
    graph
        .connections
        .iter()
        .map(|(source, outputs)| format!("{} -> {}", source, outputs.first_target().unwrap_or("?")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn lower_daily_report_example() {
    let json = include_str!("fixtures/daily_report.json");
    let graph = lower::lower_json(json, &LowerOptions::default()).unwrap();

    assert_eq!(graph.name, "Daily Report");
    assert_eq!(graph.node_names(), vec!["Trigger", "Send Report"]);
    assert_eq!(graph.nodes[0].node_type, "n8n-nodes-base.scheduleTrigger");
    assert_eq!(graph.nodes[0].parameters["interval"], "daily");
    assert_eq!(graph.nodes[1].node_type, "n8n-nodes-base.emailSend");
    assert_eq!(graph.nodes[1].parameters["to"], "a@b.com");

    assert_eq!(
        serde_json::to_value(&graph.connections).unwrap(),
        json!({
            "Trigger": { "main": [[{ "node": "Send Report", "type": "main", "index": 0 }]] }
        })
    );
}

#[test]
fn document_has_exact_import_shape() {
    let json = include_str!("fixtures/daily_report.json");
    let graph = lower::lower_json(json, &LowerOptions::default()).unwrap();
    let value = serde_json::to_value(&graph).unwrap();

    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "nodes", "connections", "settings", "staticData", "tags"]);
    assert_eq!(value["settings"], json!({}));
    assert_eq!(value["staticData"], json!(null));
    assert_eq!(value["tags"], json!([]));

    let node_keys: Vec<&str> = value["nodes"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(node_keys, vec!["id", "name", "type", "typeVersion", "position", "parameters"]);
    assert_eq!(value["nodes"][0]["typeVersion"], 1);
    assert_eq!(value["nodes"][0]["position"], json!([250, 250]));
    assert_eq!(value["nodes"][1]["position"], json!([250, 400]));
}

#[test]
fn node_count_matches_trigger_plus_all_steps() {
    let json = include_str!("fixtures/support_handler.json");
    let workflow = parse::parse(json).unwrap();
    let graph = lower_ok(&workflow);

    assert_eq!(workflow.step_count(), 6);
    assert_eq!(graph.nodes.len(), 1 + 6);

    let without_trigger = flowc::parse::Workflow {
        trigger: None,
        ..workflow
    };
    assert_eq!(lower_ok(&without_trigger).nodes.len(), 6);
}

#[test]
fn nested_children_follow_parent_before_next_sibling() {
    let wf = workflow(
        "Order",
        Some(TriggerKind::Manual),
        vec![
            sub_workflow("A", vec![step("filter", "B"), step("email", "C")]),
            step("delay", "D"),
        ],
    );
    let graph = lower_ok(&wf);
    assert_eq!(graph.node_names(), vec!["Trigger", "A", "B", "C", "D"]);

    let ys: Vec<i64> = graph.nodes.iter().map(|n| n.position.y()).collect();
    assert_eq!(ys, vec![250, 400, 550, 700, 850]);
    assert!(graph.nodes.iter().all(|n| n.position.x() == 250));
}

#[test]
fn chain_continues_from_last_child_into_next_sibling() {
    let json = include_str!("fixtures/support_handler.json");
    let graph = lower::lower_json(json, &LowerOptions::default()).unwrap();

    insta::assert_snapshot!(chain_text(&graph), @r"
    Trigger -> Categorize Issue
    Categorize Issue -> Check issue type
    Check issue type -> Resolve Issue
    Resolve Issue -> Lookup order
    Lookup order -> Send resolution
    Send resolution -> Log resolution
    ");
}

#[test]
fn connections_form_a_simple_path() {
    let json = include_str!("fixtures/support_handler.json");
    let graph = lower::lower_json(json, &LowerOptions::default()).unwrap();
    let names = graph.node_names();

    assert_eq!(graph.connections.len(), names.len() - 1);
    for pair in names.windows(2) {
        let outputs = graph.connections.get(pair[0]).expect("every non-last node has an edge");
        assert_eq!(outputs.main.len(), 1);
        assert_eq!(outputs.main[0].len(), 1);
        assert_eq!(outputs.main[0][0].node, pair[1]);
        assert_eq!(outputs.main[0][0].channel, "main");
        assert_eq!(outputs.main[0][0].index, 0);
    }
    assert!(!graph.connections.contains_key(names[names.len() - 1]));
}

#[test]
fn lowering_is_deterministic_modulo_ids() {
    let json = include_str!("fixtures/support_handler.json");
    let workflow = parse::parse(json).unwrap();
    let a = lower_ok(&workflow);
    let b = lower_ok(&workflow);

    let shape = |g: &TargetGraph| {
        g.nodes
            .iter()
            .map(|n| (n.name.clone(), n.node_type.clone(), n.position, n.parameters.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&a), shape(&b));
    assert_eq!(a.connections, b.connections);
    assert_ne!(a.nodes[0].id, b.nodes[0].id);
}

#[test]
fn ids_are_fresh_v4_uuids() {
    let json = include_str!("fixtures/support_handler.json");
    let graph = lower::lower_json(json, &LowerOptions::default()).unwrap();

    let pattern = regex::Regex::new(
        r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
    )
    .unwrap();
    let mut seen = std::collections::HashSet::new();
    for node in &graph.nodes {
        let id = node.id.to_string();
        assert!(pattern.is_match(&id), "bad id {}", id);
        assert_eq!(node.id.get_version_num(), 4);
        assert!(seen.insert(id.clone()), "duplicate id {}", id);
        assert!(!id.starts_with("step"), "input id reused: {}", id);
    }
}

#[test]
fn step_and_trigger_type_tables() {
    let wf = workflow(
        "Types",
        Some(TriggerKind::Webhook),
        vec![
            step("slack_message", "slack"),
            step("email", "email"),
            step("http_request", "http"),
            step("filter", "filter"),
            step("delay", "delay"),
            sub_workflow("sub", vec![]),
            step("action", "action"),
            step("launch_rocket", "unknown"),
        ],
    );
    let graph = lower_ok(&wf);
    let types: Vec<&str> = graph.nodes.iter().map(|n| n.node_type.as_str()).collect();
    assert_eq!(
        types,
        vec![
            "n8n-nodes-base.webhook",
            "n8n-nodes-base.slack",
            "n8n-nodes-base.emailSend",
            "n8n-nodes-base.httpRequest",
            "n8n-nodes-base.filter",
            "n8n-nodes-base.wait",
            "n8n-nodes-base.executeWorkflow",
            "n8n-nodes-base.noOp",
            "n8n-nodes-base.noOp",
        ]
    );
}

#[test]
fn missing_optional_fields_degrade_to_defaults() {
    let graph = lower::lower_json(
        r#"{"steps":[{"type":"email"},{"type":"delay","name":null,"config":null}]}"#,
        &LowerOptions::default(),
    )
    .unwrap();

    assert_eq!(graph.name, "Generated Workflow");
    assert_eq!(graph.node_names(), vec!["Step 1", "Step 2"]);
    assert_eq!(graph.nodes[0].position.y(), 250);
    assert!(graph.nodes[1].parameters.is_empty());
}

#[test]
fn unnamed_children_are_numbered_within_their_own_level() {
    let wf = workflow(
        "Numbering",
        None,
        vec![
            unnamed("email"),
            Step {
                steps: vec![unnamed("filter"), unnamed("delay")],
                ..unnamed("sub_workflow")
            },
        ],
    );
    let graph = lower::lower(&wf, &LowerOptions::overwrite_duplicates()).unwrap();
    assert_eq!(graph.node_names(), vec!["Step 1", "Step 2", "Step 1", "Step 2"]);
}

#[test]
fn duplicate_names_are_rejected_by_default() {
    let wf = workflow(
        "Dup",
        Some(TriggerKind::Manual),
        vec![step("email", "Notify"), step("delay", "Wait"), step("slack_message", "Notify")],
    );
    let errors = lower::lower(&wf, &LowerOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "L001");
    assert_eq!(errors[0].step_path.as_deref(), Some("3"));
}

#[test]
fn duplicate_names_keep_last_edge_when_overwriting() {
    let wf = workflow(
        "Dup",
        Some(TriggerKind::Manual),
        vec![
            step("email", "Notify"),
            step("delay", "Wait"),
            step("slack_message", "Notify"),
            step("email", "Done"),
        ],
    );
    let graph = lower::lower(&wf, &LowerOptions::overwrite_duplicates()).unwrap();

    assert_eq!(graph.nodes.len(), 5);
    // Notify → Wait was overwritten by Notify → Done.
    assert_eq!(graph.connections.len(), 3);
    insta::assert_snapshot!(chain_text(&graph), @r"
    Trigger -> Notify
    Notify -> Done
    Wait -> Notify
    ");
}

#[test]
fn step_named_trigger_collides_with_trigger_node() {
    let wf = workflow("T", Some(TriggerKind::Schedule), vec![step("email", "Trigger")]);
    let errors = lower::lower(&wf, &LowerOptions::default()).unwrap_err();
    assert_eq!(errors[0].code, "L001");
    assert!(errors[0].message.contains("the trigger"), "{}", errors[0].message);
}

#[test]
fn null_and_non_objects_raise_invalid_workflow() {
    for value in [json!(null), json!([1, 2]), json!("workflow"), json!(7)] {
        let errors = lower::lower_value(&value, &LowerOptions::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_invalid_workflow(), "{:?}", errors);
    }
}

#[test]
fn empty_workflow_lowers_to_empty_graph() {
    let graph = lower::lower_value(&json!({}), &LowerOptions::default()).unwrap();
    assert!(graph.nodes.is_empty());
    assert!(graph.connections.is_empty());
}

#[test]
fn every_object_input_lowers() {
    let cases = [
        (json!({ "name": null, "steps": [{ "type": "email", "name": "Mail" }] }), vec!["Mail"]),
        (json!({ "trigger": { "config": {} } }), vec!["Trigger"]),
        (json!({ "steps": [{ "name": "no type" }] }), vec!["no type"]),
        (json!({ "steps": [{ "type": "email", "name": 5 }] }), vec!["5"]),
    ];

    for (input, names) in cases {
        let graph = lower::lower_value(&input, &LowerOptions::default())
            .unwrap_or_else(|e| panic!("{input} failed: {e:?}"));
        assert_eq!(graph.node_names(), names, "{input}");
    }

    let graph = lower::lower_value(
        &json!({ "trigger": { "config": {} }, "steps": [{ "name": "no type" }] }),
        &LowerOptions::default(),
    )
    .unwrap();
    assert_eq!(graph.name, "Generated Workflow");
    assert_eq!(graph.nodes[0].node_type, "n8n-nodes-base.manualTrigger");
    assert_eq!(graph.nodes[1].node_type, "n8n-nodes-base.noOp");
}

#[test]
fn exported_document_reads_back() {
    let graph = lower::lower_json(include_str!("fixtures/support_handler.json"), &LowerOptions::default()).unwrap();
    let exported = graph.to_pretty_json().unwrap();

    let imported: TargetGraph = serde_json::from_str(&exported).unwrap();
    assert_eq!(imported, graph);
    assert_eq!(
        imported.connections.keys().collect::<Vec<_>>(),
        graph.connections.keys().collect::<Vec<_>>()
    );

    let trigger = imported.node("Trigger").expect("trigger node");
    assert_eq!(trigger.node_type, "n8n-nodes-base.webhook");
    assert!(imported.node("Nope").is_none());
}
