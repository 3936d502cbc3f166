//! End-to-end tests for running workflows through `WorkflowEngine`.
//!
//! Covers data flow between nodes, condition branching, the fail-open
//! policy, progress events and history recording.

mod test_utils;

use core::time::Duration;
use std::sync::Arc;

use flowline_core::{Clock, MockClock};
use flowline_engine::prelude::*;
use serde_json::{Value, json};
use test_utils::*;

fn engine_with(registry: ExecutorRegistry) -> (WorkflowEngine, EventLog) {
    let hooks = Arc::new(HooksAPI::new());
    let events = record_events(&hooks);
    let engine = WorkflowEngine::builder()
        .with_registry(registry)
        .with_hooks(hooks)
        .build();
    (engine, events)
}

fn statuses(run: &ExecutionRun) -> Vec<(&str, NodeStatus)> {
    run.node_results
        .iter()
        .map(|(id, result)| (id.as_str(), result.status))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Data Flow
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn condition_routes_rows_to_tagged_branches() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_counter(&mut registry);
    let (engine, _) = engine_with(registry);

    let workflow = definition(
        vec![
            node("A", "trigger"),
            node("B", "condition").with_config(json!({
                "conditionField": "status",
                "conditionOperator": "equals",
                "conditionValue": "active",
                "processingMode": "perRow",
            })),
            node("C", "count"),
            node("D", "count"),
        ],
        vec![
            conn("A", "B"),
            tagged("B", "C", "true"),
            tagged("B", "D", "false"),
        ],
    );
    let rows = json!([{ "status": "active" }, { "status": "idle" }, { "status": "active" }]);

    let run = engine.start("e2e", &workflow, rows).await.unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.error.is_none());
    assert_eq!(
        statuses(&run),
        vec![
            ("A", NodeStatus::Completed),
            ("B", NodeStatus::Completed),
            ("C", NodeStatus::Completed),
            ("D", NodeStatus::Completed),
        ]
    );
    assert_eq!(run.node("C").unwrap().data(), Some(&json!({ "count": 2 })));
    assert_eq!(run.node("D").unwrap().data(), Some(&json!({ "count": 1 })));
    assert_eq!(
        run.node("B").unwrap().summary.as_deref(),
        Some("Filtered: 2 true, 1 false")
    );
}

#[tokio::test]
async fn batch_condition_routes_whole_input() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_echo(&mut registry);
    let (engine, _) = engine_with(registry);

    let workflow = definition(
        vec![
            node("src", "trigger"),
            node("check", "condition").with_config(json!({
                "rules": [{ "field": "x", "operator": "greaterThan", "value": 1 }],
            })),
            node("yes", "echo"),
            node("no", "echo"),
        ],
        vec![
            conn("src", "check"),
            tagged("check", "yes", "true"),
            tagged("check", "no", "false"),
        ],
    );
    let rows = json!([{ "x": 1 }, { "x": 2 }, { "x": 3 }]);

    let run = engine.start("batch", &workflow, rows.clone()).await.unwrap();

    assert_eq!(run.node("no").unwrap().data(), Some(&rows));
    assert_eq!(run.node("yes").unwrap().data(), Some(&json!([])));
}

#[tokio::test]
async fn ports_keep_each_upstream_separate() {
    let (engine, _) = engine_with(ExecutorRegistry::with_builtins());

    let workflow = definition(
        vec![
            node("left", "manualInput").with_config(json!({ "inputVarName": "id", "inputVarValue": 1 })),
            node("right", "manualInput").with_config(json!({ "inputVarName": "id", "inputVarValue": 2 })),
            node("join", "join"),
        ],
        vec![
            conn("left", "join").with_to_port("A"),
            conn("right", "join").with_to_port("B"),
        ],
    );

    let run = engine.start("ports", &workflow, Value::Null).await.unwrap();
    let join = run.node("join").unwrap();

    assert_eq!(join.data(), Some(&json!([{ "id": 1 }, { "id": 2 }])));
    assert_eq!(join.input.get("A"), Some(&json!({ "id": 1 })));
    assert_eq!(join.input.get("B"), Some(&json!({ "id": 2 })));
}

#[tokio::test]
async fn default_port_collects_every_upstream() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_echo(&mut registry);
    let (engine, _) = engine_with(registry);

    let workflow = definition(
        vec![
            node("a", "manualInput").with_config(json!({ "variableName": "a", "variableValue": 1 })),
            node("b", "manualInput").with_config(json!({ "variableName": "b", "variableValue": 2 })),
            node("merge", "echo"),
        ],
        vec![conn("a", "merge"), conn("b", "merge")],
    );

    let run = engine.start("merge", &workflow, Value::Null).await.unwrap();
    let merge = run.node("merge").unwrap();

    assert_eq!(merge.input.all("input").len(), 2);
    assert_eq!(merge.data(), Some(&json!([{ "a": 1 }, { "b": 2 }])));
}

// ─────────────────────────────────────────────────────────────────────────────
// Fail-Open Policy
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_branch_does_not_sink_independent_branches() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_failing(&mut registry);
    register_echo(&mut registry);
    let (engine, events) = engine_with(registry);

    let workflow = definition(
        vec![node("first", "echo"), node("middle", "fail"), node("last", "echo")],
        Vec::new(),
    );

    let run = engine.start("fail-open", &workflow, json!({ "v": 1 })).await.unwrap();

    let first = run.node("first").unwrap();
    let middle = run.node("middle").unwrap();
    let last = run.node("last").unwrap();
    assert!(first.is_completed());
    assert!(last.is_completed());
    assert_eq!(first.data(), Some(&json!({ "v": 1 })));
    assert_eq!(last.data(), Some(&json!({ "v": 1 })));

    assert_eq!(middle.status, NodeStatus::Error);
    assert_eq!(middle.error.as_deref(), Some("boom"));
    assert_eq!(middle.summary.as_deref(), Some("boom"));
    assert!(middle.output.is_none());

    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(
        run.error,
        Some(RunError::NodesFailed {
            nodes: vec![NodeId::from("middle")]
        })
    );
    assert_eq!(events.count("OnNodeError"), 1);
    assert_eq!(engine.status(), EngineStatus::Failed);
    assert_eq!(engine.error().as_deref(), Some("1 node(s) failed: middle"));
}

#[tokio::test]
async fn tolerate_policy_completes_despite_errors() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_failing(&mut registry);
    let engine = WorkflowEngine::builder()
        .with_registry(registry)
        .with_config(EngineConfig::new().with_failure_policy(FailurePolicy::Tolerate))
        .build();

    let workflow = definition(vec![node("a", "trigger"), node("b", "fail")], Vec::new());
    let run = engine.start("tolerant", &workflow, Value::Null).await.unwrap();

    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.error.is_none());
    assert_eq!(run.failed_nodes(), vec![&NodeId::from("b")]);
}

#[tokio::test]
async fn unknown_node_type_fails_only_that_node() {
    let mut registry = ExecutorRegistry::with_builtins();
    register_echo(&mut registry);
    let (engine, _) = engine_with(registry);

    let workflow = definition(
        vec![
            node("start", "trigger"),
            node("fetch", "httpRequest"),
            node("after", "echo"),
        ],
        vec![conn("start", "fetch"), conn("fetch", "after")],
    );

    let run = engine.start("unknown", &workflow, json!({ "q": 1 })).await.unwrap();

    let fetch = run.node("fetch").unwrap();
    assert_eq!(fetch.status, NodeStatus::Error);
    assert_eq!(fetch.error.as_deref(), Some("unknown node type: httpRequest"));
    assert_eq!(fetch.input.primary(), Some(json!({ "q": 1 })));

    // The failed node produced nothing, so its downstream neighbour ran
    // with empty input.
    let after = run.node("after").unwrap();
    assert!(after.is_completed());
    assert!(after.input.is_empty());
    assert_eq!(after.data(), Some(&Value::Null));
}

// ─────────────────────────────────────────────────────────────────────────────
// Graph Errors
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_graph_is_rejected_before_execution() {
    let log = CallLog::default();
    let mut registry = ExecutorRegistry::new();
    register_recorder(&mut registry, &log);
    let (engine, events) = engine_with(registry);

    let workflow = definition(
        vec![node("root", "record"), node("x", "record"), node("y", "record")],
        vec![conn("root", "x"), conn("x", "y"), conn("y", "x")],
    );

    let err = engine.start("cyclic", &workflow, Value::Null).await.unwrap_err();

    assert!(matches!(
        err,
        EngineError::Graph(GraphError::CycleDetected { .. })
    ));
    assert!(log.calls().is_empty());
    assert!(events.events().is_empty());
    assert!(engine.history().list("cyclic").is_empty());
    assert_eq!(engine.status(), EngineStatus::Failed);
    assert!(engine.error().unwrap().starts_with("cycle detected"));
}

#[tokio::test]
async fn dangling_connection_is_rejected() {
    let (engine, _) = engine_with(ExecutorRegistry::with_builtins());
    let workflow = definition(vec![node("a", "trigger")], vec![conn("a", "ghost")]);

    let err = engine.start("dangling", &workflow, Value::Null).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Graph(GraphError::DanglingConnection { .. })
    ));

    // A rejected graph does not block the next run.
    let fixed = definition(vec![node("a", "trigger")], Vec::new());
    let run = engine.start("dangling", &fixed, Value::Null).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn unreachable_island_is_reported_not_executed() {
    let log = CallLog::default();
    let mut registry = ExecutorRegistry::new();
    register_recorder(&mut registry, &log);
    let (engine, events) = engine_with(registry);

    let workflow = definition(
        vec![node("root", "record"), node("p", "record"), node("q", "record")],
        vec![conn("p", "q"), conn("q", "p")],
    );

    let run = engine.start("island", &workflow, Value::Null).await.unwrap();

    assert_eq!(log.calls(), vec!["root"]);
    assert_eq!(run.unreachable.len(), 2);
    assert_eq!(events.count("OnScheduleWarning"), 1);
    assert_eq!(run.status, RunStatus::Completed);
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress Events
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn progress_is_reported_per_node() {
    let log = CallLog::default();
    let mut registry = ExecutorRegistry::new();
    register_recorder(&mut registry, &log);
    let (engine, events) = engine_with(registry);

    let run = engine.start("progress", &chain("record", 4), Value::Null).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);

    let names = events.point_names();
    assert_eq!(names.first(), Some(&"OnRunStart"));
    assert_eq!(names.last(), Some(&"OnRunComplete"));

    let completed: Vec<(String, f64)> = events
        .events()
        .iter()
        .filter_map(|event| match event {
            RunEvent::NodeComplete {
                node_id, progress, ..
            } => Some((node_id.to_string(), *progress)),
            _ => None,
        })
        .collect();
    assert_eq!(
        completed,
        vec![
            ("n1".to_owned(), 25.0),
            ("n2".to_owned(), 50.0),
            ("n3".to_owned(), 75.0),
            ("n4".to_owned(), 100.0),
        ]
    );

    let starts: Vec<f64> = events
        .events()
        .iter()
        .filter(|event| event.point_name() == "OnNodeStart")
        .filter_map(RunEvent::progress)
        .collect();
    assert_eq!(starts, vec![0.0, 25.0, 50.0, 75.0]);

    match events.events().last() {
        Some(RunEvent::RunComplete {
            status,
            node_results,
            ..
        }) => {
            assert_eq!(*status, RunStatus::Completed);
            assert_eq!(node_results.len(), 4);
        }
        other => panic!("expected RunComplete, got {other:?}"),
    }
}

#[tokio::test]
async fn durations_follow_the_clock() {
    let mock = Arc::new(MockClock::default());
    let clock = Clock::with_provider(mock.clone());

    let mut registry = ExecutorRegistry::new();
    let ticking = Arc::clone(&mock);
    registry.register_fn("slow", move |_node, _input, _ctx| {
        ticking.advance(Duration::from_millis(40));
        Ok(NodeOutput::empty_object())
    });

    let engine = WorkflowEngine::builder()
        .with_registry(registry)
        .with_clock(clock)
        .build();
    let run = engine.start("timed", &chain("slow", 2), Value::Null).await.unwrap();

    assert_eq!(run.node("n1").unwrap().duration_ms, 40);
    assert_eq!(run.node("n2").unwrap().duration_ms, 40);
    assert_eq!(run.duration_ms, 80);
    assert_eq!(
        run.finished_at.duration_since(run.started_at).unwrap(),
        Duration::from_millis(80)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn runs_are_appended_newest_first() {
    let (engine, _) = engine_with(ExecutorRegistry::with_builtins());
    let workflow = chain("trigger", 1);

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(engine.start("wf", &workflow, Value::Null).await.unwrap().id);
    }
    ids.reverse();

    let listed: Vec<String> = engine
        .history()
        .list("wf")
        .into_iter()
        .map(|run| run.id)
        .collect();
    assert_eq!(listed, ids);

    engine.history().clear("wf");
    assert!(engine.history().list("wf").is_empty());
}

#[tokio::test]
async fn engines_share_a_history_store() {
    let history = Arc::new(HistoryStore::new(2));
    let first = WorkflowEngine::builder().with_history(Arc::clone(&history)).build();
    let second = WorkflowEngine::builder().with_history(Arc::clone(&history)).build();
    let workflow = chain("trigger", 1);

    first.start("alpha", &workflow, Value::Null).await.unwrap();
    second.start("beta", &workflow, Value::Null).await.unwrap();
    for _ in 0..3 {
        first.start("alpha", &workflow, Value::Null).await.unwrap();
    }

    assert_eq!(history.len("alpha"), 2);
    assert_eq!(history.len("beta"), 1);
    assert_eq!(history.workflow_ids(), vec!["alpha", "beta"]);
}

#[tokio::test]
async fn history_snapshot_survives_json() {
    let (engine, _) = engine_with(ExecutorRegistry::with_builtins());
    let run = engine
        .start("persisted", &chain("trigger", 2), json!({ "k": "v" }))
        .await
        .unwrap();

    let json = engine.history().snapshot().to_json().unwrap();
    let restored = HistoryStore::restore(HistorySnapshot::from_json(&json).unwrap());

    assert_eq!(restored.latest("persisted"), Some(run));
}
