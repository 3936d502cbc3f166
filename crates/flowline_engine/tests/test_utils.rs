//! Shared test utilities for `flowline_engine` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities — not all items used in every test binary"
)]

use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use flowline_engine::prelude::*;
use serde_json::{Value, json};
use tokio::sync::{Semaphore, mpsc};

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITION BUILDERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn node(id: &str, kind: &str) -> Node {
    Node::new(id, kind)
}

pub fn conn(from: &str, to: &str) -> Connection {
    Connection::new(format!("{from}-{to}"), from, to)
}

pub fn tagged(from: &str, to: &str, tag: &str) -> Connection {
    conn(from, to).with_output_type(tag)
}

pub fn definition(nodes: Vec<Node>, connections: Vec<Connection>) -> WorkflowDefinition {
    WorkflowDefinition::new(nodes, connections)
}

/// A linear chain `n1 -> n2 -> ... -> n{len}` of nodes of one kind.
pub fn chain(kind: &str, len: usize) -> WorkflowDefinition {
    let nodes = (1..=len).map(|i| node(&format!("n{i}"), kind)).collect();
    let connections = (1..len)
        .map(|i| conn(&format!("n{i}"), &format!("n{}", i + 1)))
        .collect();
    definition(nodes, connections)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXECUTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered log of executed node IDs.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, id: &str) {
        self.0.lock().unwrap().push(id.to_owned());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// `record`: logs the call and outputs `{ "node": id }`.
pub fn register_recorder(registry: &mut ExecutorRegistry, log: &CallLog) {
    let log = log.clone();
    registry.register_fn("record", move |node, _input, _ctx| {
        log.push(node.id.as_str());
        Ok(NodeOutput::new(json!({ "node": node.id.as_str() })))
    });
}

/// `count`: outputs the number of rows on the default port.
pub fn register_counter(registry: &mut ExecutorRegistry) {
    registry.register_fn("count", |_node, input, _ctx| {
        let rows = input.rows(input.default_port());
        Ok(NodeOutput::new(json!({ "count": rows.len() })).with_summary(format!("{} rows", rows.len())))
    });
}

/// `fail`: always fails with `boom`.
pub fn register_failing(registry: &mut ExecutorRegistry) {
    registry.register_fn("fail", |_node, _input, _ctx| Err(ExecutorError::failed("boom")));
}

/// `echo`: outputs the merged default-port input, or `null`.
pub fn register_echo(registry: &mut ExecutorRegistry) {
    registry.register_fn("echo", |_node, input, _ctx| {
        Ok(NodeOutput::new(input.primary().unwrap_or(Value::Null)))
    });
}

/// Handle on the `gate` executor.
///
/// Every `gate` node announces itself on `entered` and then blocks until a
/// permit is released.
pub struct Gate {
    entered: mpsc::UnboundedReceiver<String>,
    permits: Arc<Semaphore>,
    saw_cancellation: Arc<AtomicBool>,
}

impl Gate {
    /// Waits for the next gate node to start executing.
    pub async fn entered(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.entered.recv())
            .await
            .expect("gate node did not start in time")
            .expect("gate executor dropped")
    }

    /// Returns the next entered node if one is already waiting.
    pub fn try_entered(&mut self) -> Option<String> {
        self.entered.try_recv().ok()
    }

    /// Lets `count` gate nodes finish.
    pub fn release(&self, count: usize) {
        self.permits.add_permits(count);
    }

    /// Returns true if a gate node observed a cancelled context.
    pub fn saw_cancellation(&self) -> bool {
        self.saw_cancellation.load(Ordering::SeqCst)
    }
}

/// `gate`: logs the call, waits for [`Gate::release`], outputs `{ "node": id }`.
pub fn register_gate(registry: &mut ExecutorRegistry, log: &CallLog) -> Gate {
    let (tx, rx) = mpsc::unbounded_channel();
    let permits = Arc::new(Semaphore::new(0));
    let saw_cancellation = Arc::new(AtomicBool::new(false));

    let log = log.clone();
    let gate_permits = Arc::clone(&permits);
    let gate_cancelled = Arc::clone(&saw_cancellation);
    registry.register_async("gate", move |node, _input, ctx| {
        let log = log.clone();
        let tx = tx.clone();
        let permits = Arc::clone(&gate_permits);
        let cancelled = Arc::clone(&gate_cancelled);
        async move {
            log.push(node.id.as_str());
            let _ = tx.send(node.id.to_string());
            match permits.acquire().await {
                Ok(permit) => permit.forget(),
                Err(err) => return Err(ExecutorError::failed(err.to_string())),
            }
            if ctx.is_cancelled() {
                cancelled.store(true, Ordering::SeqCst);
            }
            Ok(NodeOutput::new(json!({ "node": node.id.as_str() })))
        }
    });

    Gate {
        entered: rx,
        permits,
        saw_cancellation,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Every event emitted on a hook registry, in order.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<RunEvent>>>);

impl EventLog {
    pub fn events(&self) -> Vec<RunEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn point_names(&self) -> Vec<&'static str> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(RunEvent::point_name)
            .collect()
    }

    pub fn count(&self, point: &str) -> usize {
        self.point_names().iter().filter(|name| **name == point).count()
    }
}

/// Registers an observer on every hook point.
pub fn record_events(hooks: &HooksAPI) -> EventLog {
    let log = EventLog::default();
    let sink = Arc::clone(&log.0);
    hooks
        .register_observer::<(
            OnRunStart,
            OnScheduleWarning,
            OnRunPaused,
            OnRunResumed,
            OnRunComplete,
            OnNodeStart,
            OnNodeComplete,
            OnNodeError,
        ), _>("recorder", move |event: &RunEvent| {
            sink.lock().unwrap().push(event.clone());
        })
        .expect("recorder registers once");
    log
}

// ═══════════════════════════════════════════════════════════════════════════════
// POLLING
// ═══════════════════════════════════════════════════════════════════════════════

/// Polls `condition` until it holds, panicking after five seconds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
