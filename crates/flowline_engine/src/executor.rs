//! Workflow execution engine.
//!
//! A [`WorkflowEngine`] runs one workflow at a time: it rebuilds the graph
//! from the host's definition, computes the schedule and executes nodes
//! strictly in that order. Node failures never abort a run; downstream
//! nodes simply receive nothing from a failed node.
//!
//! Control calls (`pause`, `resume`, `cancel`, `reset`) take `&self` and are
//! observed at node boundaries only, so the engine is typically shared
//! through an `Arc` between the task driving [`start`](WorkflowEngine::start)
//! and whoever controls it.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flowline_engine::{ExecutorRegistry, WorkflowEngine};
//!
//! let engine = Arc::new(WorkflowEngine::builder()
//!     .with_registry(ExecutorRegistry::with_builtins())
//!     .build());
//!
//! let runner = Arc::clone(&engine);
//! let handle = tokio::spawn(async move {
//!     runner.start("wf-1", &definition, json!([{ "status": "active" }])).await
//! });
//!
//! engine.pause();
//! engine.resume();
//! let run = handle.await??;
//! println!("{} in {}ms", run.status, run.duration_ms);
//! ```

use core::mem;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use flowline_core::{Clock, duration_ms};
use flowline_graph::{Graph, GraphError, Node, NodeId, NodeStatus, Schedule, WorkflowDefinition};
use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::Instrument;

use crate::config::{EngineConfig, FailurePolicy};
use crate::control::{Checkpoint, ControlSignal, RunControl};
use crate::data::{InputData, NodeOutput};
use crate::error::{EngineError, NodeError, RunError};
use crate::history::HistoryStore;
use crate::hooks::{HooksAPI, RunEvent};
use crate::registry::{ExecutionContext, ExecutorRegistry};
use crate::run::{EngineStatus, ExecutionRun, NodeResult, RunStatus};

// ─────────────────────────────────────────────────────────────────────────────
// EngineBuilder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for [`WorkflowEngine`].
///
/// Every collaborator is optional: the registry defaults to the built-in
/// executors, hooks to an empty registry, history to a fresh store sized by
/// the configuration, and the clock to the system clock.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    registry: Option<Arc<ExecutorRegistry>>,
    hooks: Option<Arc<HooksAPI>>,
    history: Option<Arc<HistoryStore>>,
    clock: Option<Clock>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the executor registry.
    #[must_use]
    pub fn with_registry(self, registry: ExecutorRegistry) -> Self {
        self.with_shared_registry(Arc::new(registry))
    }

    /// Sets a registry shared with other engines.
    #[must_use]
    pub fn with_shared_registry(mut self, registry: Arc<ExecutorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the hook registry.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<HooksAPI>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Sets the history store, typically shared by all engines of a host.
    #[must_use]
    pub fn with_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Sets the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> WorkflowEngine {
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(HistoryStore::new(self.config.history_capacity)));

        WorkflowEngine {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(ExecutorRegistry::with_builtins())),
            hooks: self.hooks.unwrap_or_default(),
            history,
            clock: self.clock.unwrap_or_default(),
            config: self.config,
            state: Mutex::new(EngineState::default()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Engine state
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ActiveRun {
    run_id: String,
    control: RunControl,
}

/// Mutable projection of the current (or last) run.
///
/// Every run bumps `epoch`; writes from a run whose epoch is stale (it was
/// reset, or a newer run started) are dropped.
#[derive(Debug, Default)]
struct EngineState {
    status: EngineStatus,
    started_at: Option<SystemTime>,
    progress: f64,
    error: Option<String>,
    epoch: u64,
    node_states: IndexMap<NodeId, NodeStatus>,
    active: Option<ActiveRun>,
}

/// Everything a run needs once it has been admitted.
struct PreparedRun {
    run_id: String,
    workflow_id: String,
    graph: Graph,
    schedule: Schedule,
    control: RunControl,
    epoch: u64,
    started_at: SystemTime,
    trigger: Value,
}

/// Files a run whose future was dropped before it finished.
///
/// A caller racing [`WorkflowEngine::start`] against a timer drops the run
/// mid-node. The guard then records it as cancelled with the results gathered
/// so far and releases the engine for the next run.
struct RunGuard<'a> {
    engine: &'a WorkflowEngine,
    run_id: String,
    workflow_id: String,
    epoch: u64,
    started_at: SystemTime,
    started: Instant,
    control: RunControl,
    unreachable: Vec<NodeId>,
    results: IndexMap<NodeId, NodeResult>,
    armed: bool,
}

impl RunGuard<'_> {
    /// Builds the terminal record and disarms the guard.
    fn seal(&mut self, status: RunStatus, error: Option<RunError>) -> ExecutionRun {
        self.armed = false;
        let clock = &self.engine.clock;
        ExecutionRun {
            id: mem::take(&mut self.run_id),
            workflow_id: mem::take(&mut self.workflow_id),
            started_at: self.started_at,
            finished_at: clock.wall(),
            status,
            node_results: mem::take(&mut self.results),
            duration_ms: duration_ms(clock.elapsed_since(self.started)),
            error,
            unreachable: mem::take(&mut self.unreachable),
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.control.cancel();
        let run = self.seal(RunStatus::Cancelled, Some(RunError::Aborted));
        tracing::warn!(
            run_id = %run.id,
            executed = run.node_results.len(),
            "run dropped before finishing"
        );
        self.engine.record(self.epoch, &run);
    }
}

fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WorkflowEngine
// ─────────────────────────────────────────────────────────────────────────────

/// Sequential workflow executor with cooperative run control.
#[derive(Debug)]
pub struct WorkflowEngine {
    registry: Arc<ExecutorRegistry>,
    hooks: Arc<HooksAPI>,
    history: Arc<HistoryStore>,
    clock: Clock,
    config: EngineConfig,
    state: Mutex<EngineState>,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEngine {
    /// Creates an engine with the built-in executors and default settings.
    #[must_use]
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Executes a workflow and returns its terminal record.
    ///
    /// The graph is rebuilt from `definition`, so later edits to the host's
    /// definition only affect later runs. `trigger` is handed to every root
    /// node on the default port unless it is `null`.
    ///
    /// Node failures, cancellation and reset all produce an `Ok` record that
    /// is also appended to history. Dropping the returned future (for
    /// example when it loses a `tokio::time::timeout`) files the run as
    /// `cancelled` with the nodes that had finished and frees the engine.
    ///
    /// # Errors
    ///
    /// - [`EngineError::AlreadyRunning`] if a run is in flight
    /// - [`EngineError::Graph`] if the graph fails validation; nothing is
    ///   executed and no history is written
    pub async fn start(
        &self,
        workflow_id: impl Into<String>,
        definition: &WorkflowDefinition,
        trigger: Value,
    ) -> Result<ExecutionRun, EngineError> {
        let workflow_id = workflow_id.into();

        if self.state.lock().active.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let graph = Graph::from_definition(definition);
        let schedule = match Schedule::compute(&graph) {
            Ok(schedule) => schedule,
            Err(err) => {
                self.reject_graph(&workflow_id, &err);
                return Err(err.into());
            }
        };

        let run = self.admit(workflow_id, graph, schedule, trigger)?;
        let span = tracing::info_span!(
            "workflow_run",
            run_id = %run.run_id,
            workflow_id = %run.workflow_id,
        );
        Ok(self.drive(run).instrument(span).await)
    }

    /// Requests a pause at the next node boundary.
    ///
    /// Returns true if a running run was paused. The node currently
    /// executing, if any, runs to completion.
    pub fn pause(&self) -> bool {
        let run_id = {
            let mut state = self.state.lock();
            let Some(active) = &state.active else {
                return false;
            };
            if !active.control.pause() {
                return false;
            }
            let run_id = active.run_id.clone();
            state.status = EngineStatus::Paused;
            run_id
        };

        tracing::info!(run_id = %run_id, "run paused");
        self.hooks.emit(&RunEvent::RunPaused { run_id });
        true
    }

    /// Resumes a paused run. Returns true if the run was paused.
    pub fn resume(&self) -> bool {
        let run_id = {
            let mut state = self.state.lock();
            let Some(active) = &state.active else {
                return false;
            };
            if !active.control.resume() {
                return false;
            }
            let run_id = active.run_id.clone();
            state.status = EngineStatus::Running;
            run_id
        };

        tracing::info!(run_id = %run_id, "run resumed");
        self.hooks.emit(&RunEvent::RunResumed { run_id });
        true
    }

    /// Cancels the in-flight run at the next node boundary, releasing it if
    /// paused. Returns true if a run was newly cancelled.
    ///
    /// The run still finishes with a `cancelled` record holding the nodes
    /// that had already executed.
    pub fn cancel(&self) -> bool {
        let state = self.state.lock();
        let Some(active) = &state.active else {
            return false;
        };
        let cancelled = active.control.cancel();
        if cancelled {
            tracing::info!(run_id = %active.run_id, "run cancellation requested");
        }
        cancelled
    }

    /// Cancels any in-flight run and returns the engine to `Pending`.
    ///
    /// Start time, progress and error are cleared and every node returns to
    /// `idle`. The cancelled run still lands in history, but it no longer
    /// updates this engine's state.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if let Some(active) = state.active.take() {
            active.control.cancel();
            tracing::info!(run_id = %active.run_id, "run reset");
        }
        state.epoch += 1;
        state.status = EngineStatus::Pending;
        state.started_at = None;
        state.progress = 0.0;
        state.error = None;
        for status in state.node_states.values_mut() {
            *status = NodeStatus::Idle;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the status of the current or last run.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.state.lock().status
    }

    /// Returns the percentage of scheduled nodes that reached a terminal
    /// state.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.state.lock().progress
    }

    /// Returns why the last run failed, was cancelled or was rejected.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Returns when the current or last run started.
    #[must_use]
    pub fn started_at(&self) -> Option<SystemTime> {
        self.state.lock().started_at
    }

    /// Returns the ID of the in-flight run.
    #[must_use]
    pub fn active_run_id(&self) -> Option<String> {
        self.state
            .lock()
            .active
            .as_ref()
            .map(|active| active.run_id.clone())
    }

    /// Returns the control signal of the in-flight run.
    #[must_use]
    pub fn control_signal(&self) -> Option<ControlSignal> {
        self.state
            .lock()
            .active
            .as_ref()
            .map(|active| active.control.current())
    }

    /// Returns a node's status in the current or last run.
    #[must_use]
    pub fn node_status(&self, id: &str) -> Option<NodeStatus> {
        self.state.lock().node_states.get(&NodeId::from(id)).copied()
    }

    /// Returns every scheduled node's status, in schedule order.
    #[must_use]
    pub fn node_states(&self) -> IndexMap<NodeId, NodeStatus> {
        self.state.lock().node_states.clone()
    }

    /// Returns the executor registry.
    #[must_use]
    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Returns the hook registry.
    #[must_use]
    pub fn hooks(&self) -> &Arc<HooksAPI> {
        &self.hooks
    }

    /// Returns the history store.
    #[must_use]
    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Run internals
    // ─────────────────────────────────────────────────────────────────────

    fn reject_graph(&self, workflow_id: &str, err: &GraphError) {
        tracing::warn!(workflow_id, error = %err, "workflow graph rejected");

        let mut state = self.state.lock();
        if state.active.is_some() {
            return;
        }
        state.epoch += 1;
        state.status = EngineStatus::Failed;
        state.started_at = None;
        state.progress = 0.0;
        state.error = Some(err.to_string());
        state.node_states.clear();
    }

    fn admit(
        &self,
        workflow_id: String,
        graph: Graph,
        schedule: Schedule,
        trigger: Value,
    ) -> Result<PreparedRun, EngineError> {
        let mut state = self.state.lock();
        if state.active.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let run_id = nanoid::nanoid!();
        let control = RunControl::new();
        let started_at = self.clock.wall();

        state.epoch += 1;
        state.status = EngineStatus::Running;
        state.started_at = Some(started_at);
        state.progress = 0.0;
        state.error = None;
        state.node_states = schedule
            .iter()
            .map(|id| (id.clone(), NodeStatus::Idle))
            .collect();
        state.active = Some(ActiveRun {
            run_id: run_id.clone(),
            control: control.clone(),
        });

        Ok(PreparedRun {
            run_id,
            workflow_id,
            graph,
            schedule,
            control,
            epoch: state.epoch,
            started_at,
            trigger,
        })
    }

    async fn drive(&self, run: PreparedRun) -> ExecutionRun {
        let PreparedRun {
            run_id,
            workflow_id,
            graph,
            schedule,
            control,
            epoch,
            started_at,
            trigger,
        } = run;

        let total = schedule.len();
        let mut guard = RunGuard {
            engine: self,
            run_id: run_id.clone(),
            workflow_id: workflow_id.clone(),
            epoch,
            started_at,
            started: self.clock.now(),
            control: control.clone(),
            unreachable: schedule.unreachable().to_vec(),
            results: IndexMap::new(),
            armed: true,
        };

        tracing::info!(nodes = total, "run started");
        self.hooks.emit(&RunEvent::RunStart {
            run_id: run_id.clone(),
            workflow_id: workflow_id.clone(),
            node_count: total,
        });
        for warning in schedule.warnings() {
            tracing::warn!(%warning, "schedule warning");
            self.hooks.emit(&RunEvent::ScheduleWarning {
                run_id: run_id.clone(),
                warning: warning.clone(),
            });
        }

        let mut outputs: HashMap<NodeId, NodeOutput> = HashMap::new();

        for (index, id) in schedule.iter().enumerate() {
            if control.checkpoint().await == Checkpoint::Abort {
                tracing::debug!(next = %id, "run stopped at node boundary");
                break;
            }
            let Some(node) = graph.node(id) else {
                continue;
            };

            let done = guard.results.len();
            let input = self.collect_input(&graph, node, &outputs, &trigger);
            self.update_node(epoch, id, NodeStatus::Running, None);
            tracing::debug!(node = %id, kind = %node.kind, "node started");
            self.hooks.emit(&RunEvent::NodeStart {
                node_id: id.clone(),
                status: NodeStatus::Running,
                progress: percent(done, total),
            });

            let ctx = ExecutionContext::new(run_id.as_str(), workflow_id.as_str())
                .with_cancellation(control.token())
                .with_node_index(index);
            let node_started = self.clock.now();
            let outcome = self.execute_node(node, &input, &ctx).await;
            let elapsed = self.clock.elapsed_since(node_started);
            let progress = percent(done + 1, total);

            let result = match outcome {
                Ok(output) => {
                    self.update_node(epoch, id, NodeStatus::Completed, Some(progress));
                    tracing::debug!(node = %id, elapsed_ms = duration_ms(elapsed), "node completed");
                    self.hooks.emit(&RunEvent::NodeComplete {
                        node_id: id.clone(),
                        status: NodeStatus::Completed,
                        progress,
                        duration: elapsed,
                    });
                    outputs.insert(id.clone(), output.clone());
                    NodeResult {
                        status: NodeStatus::Completed,
                        summary: output.summary.clone(),
                        output: Some(output),
                        error: None,
                        input,
                        duration_ms: duration_ms(elapsed),
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    self.update_node(epoch, id, NodeStatus::Error, Some(progress));
                    tracing::warn!(node = %id, error = %message, "node failed");
                    self.hooks.emit(&RunEvent::NodeError {
                        node_id: id.clone(),
                        status: NodeStatus::Error,
                        progress,
                        error: message.clone(),
                    });
                    NodeResult {
                        status: NodeStatus::Error,
                        output: None,
                        summary: Some(message.clone()),
                        error: Some(message),
                        input,
                        duration_ms: duration_ms(elapsed),
                    }
                }
            };
            guard.results.insert(id.clone(), result);
        }

        let (status, error) = self.conclude(&control, &guard.results);
        let run = guard.seal(status, error);
        tracing::info!(status = %run.status, duration_ms = run.duration_ms, "run finished");
        self.record(epoch, &run);
        run
    }

    /// Appends a terminal run to history, releases the engine and emits
    /// `RunComplete`.
    fn record(&self, epoch: u64, run: &ExecutionRun) {
        self.history.append(run.clone());
        self.finish(epoch, run);
        self.hooks.emit(&RunEvent::RunComplete {
            run_id: run.id.clone(),
            status: run.status,
            duration_ms: run.duration_ms,
            node_results: run.node_results.clone(),
        });
    }

    /// Gathers a node's input from the outputs of its upstream nodes.
    fn collect_input(
        &self,
        graph: &Graph,
        node: &Node,
        outputs: &HashMap<NodeId, NodeOutput>,
        trigger: &Value,
    ) -> InputData {
        let default_port = &self.config.default_port;
        let mut input = InputData::with_default_port(default_port.clone());

        if graph.is_root(&node.id) && !trigger.is_null() {
            input.push(default_port.clone(), trigger.clone());
        }

        for conn in graph.incoming(&node.id) {
            let Some(output) = outputs.get(&conn.from) else {
                continue;
            };
            let value = match conn.output_type.as_deref().filter(|tag| !tag.is_empty()) {
                Some(tag) => output.value_for(tag),
                None => Some(&output.data),
            };
            if let Some(value) = value {
                let port = conn.to_port.as_ref().unwrap_or(default_port);
                input.push(port.clone(), value.clone());
            }
        }
        input
    }

    async fn execute_node(
        &self,
        node: &Node,
        input: &InputData,
        ctx: &ExecutionContext,
    ) -> Result<NodeOutput, NodeError> {
        let executor = self
            .registry
            .get(&node.kind)
            .ok_or_else(|| NodeError::UnknownNodeType(node.kind.clone()))?;
        Ok(executor.execute(node, input, ctx).await?)
    }

    fn conclude(
        &self,
        control: &RunControl,
        results: &IndexMap<NodeId, NodeResult>,
    ) -> (RunStatus, Option<RunError>) {
        if control.current() == ControlSignal::Cancelled {
            return (RunStatus::Cancelled, Some(RunError::Aborted));
        }

        let failed: Vec<NodeId> = results
            .iter()
            .filter(|(_, result)| result.status == NodeStatus::Error)
            .map(|(id, _)| id.clone())
            .collect();

        match self.config.failure_policy {
            FailurePolicy::FailOnNodeError if !failed.is_empty() => {
                (RunStatus::Failed, Some(RunError::NodesFailed { nodes: failed }))
            }
            FailurePolicy::FailOnNodeError | FailurePolicy::Tolerate => (RunStatus::Completed, None),
        }
    }

    fn update_node(&self, epoch: u64, id: &NodeId, status: NodeStatus, progress: Option<f64>) {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            return;
        }
        if let Some(slot) = state.node_states.get_mut(id) {
            *slot = status;
        }
        if let Some(progress) = progress {
            state.progress = progress;
        }
    }

    fn finish(&self, epoch: u64, run: &ExecutionRun) {
        let mut state = self.state.lock();
        if state.epoch != epoch {
            return;
        }
        state.status = run.status.into();
        state.error = run.error.as_ref().map(ToString::to_string);
        state.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowline_graph::Connection;
    use serde_json::json;

    fn chain() -> WorkflowDefinition {
        WorkflowDefinition::new(
            vec![Node::new("a", "trigger"), Node::new("b", "output")],
            vec![Connection::new("ab", "a", "b")],
        )
    }

    #[test]
    fn percent_handles_empty_schedule() {
        assert!((percent(0, 0) - 100.0).abs() < f64::EPSILON);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn trigger_input_flows_downstream() {
        let engine = WorkflowEngine::new();
        let run = engine.start("wf", &chain(), json!({ "hello": "world" })).await.unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.node("b").unwrap().data(), Some(&json!({ "hello": "world" })));
        assert_eq!(engine.status(), EngineStatus::Completed);
        assert!((engine.progress() - 100.0).abs() < f64::EPSILON);
        assert!(engine.active_run_id().is_none());
    }

    #[tokio::test]
    async fn control_without_run_is_a_no_op() {
        let engine = WorkflowEngine::new();
        assert!(!engine.pause());
        assert!(!engine.resume());
        assert!(!engine.cancel());
        engine.reset();
        assert_eq!(engine.status(), EngineStatus::Pending);
        assert!(engine.control_signal().is_none());
    }

    #[tokio::test]
    async fn reset_clears_run_projection() {
        let engine = WorkflowEngine::new();
        engine.start("wf", &chain(), Value::Null).await.unwrap();
        assert!(engine.started_at().is_some());

        engine.reset();
        assert_eq!(engine.status(), EngineStatus::Pending);
        assert!(engine.started_at().is_none());
        assert!(engine.error().is_none());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.node_status("a"), Some(NodeStatus::Idle));
        assert_eq!(engine.history().len("wf"), 1);
    }

    #[tokio::test]
    async fn custom_default_port() {
        let mut registry = ExecutorRegistry::with_builtins();
        registry.register_fn("ports", |_node, input, _ctx| {
            let ports: Vec<&str> = input.ports().collect();
            Ok(NodeOutput::new(json!(ports)))
        });
        let engine = WorkflowEngine::builder()
            .with_registry(registry)
            .with_config(EngineConfig::new().with_default_port("in"))
            .build();
        let definition = WorkflowDefinition::new(
            vec![Node::new("a", "trigger"), Node::new("b", "ports")],
            vec![Connection::new("ab", "a", "b")],
        );

        let run = engine.start("wf", &definition, json!(1)).await.unwrap();
        assert_eq!(run.node("b").unwrap().data(), Some(&json!(["in"])));
    }
}
