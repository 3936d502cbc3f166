//! Node executor contract and registry.
//!
//! The engine never knows what a node kind does. Each kind (`node.type`) is
//! handled by a [`NodeExecutor`] registered in the [`ExecutorRegistry`]
//! before a run starts. A node whose kind has no executor fails with
//! `UnknownNodeType`; the rest of the run is unaffected.
//!
//! # Usage
//!
//! ```ignore
//! use flowline_engine::{ExecutorRegistry, NodeOutput};
//! use serde_json::json;
//!
//! let mut registry = ExecutorRegistry::with_builtins();
//!
//! // Synchronous executor from a closure
//! registry.register_fn("count", |_node, input, _ctx| {
//!     let rows = input.rows(input.default_port());
//!     Ok(NodeOutput::new(json!({ "count": rows.len() })))
//! });
//!
//! // Asynchronous executor over owned arguments
//! registry.register_async("fetch", |node, _input, _ctx| async move {
//!     let url = node.config_str("url").unwrap_or_default().to_owned();
//!     Ok(NodeOutput::new(json!({ "url": url })))
//! });
//! ```

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use flowline_graph::Node;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio_util::sync::CancellationToken;

use crate::data::{InputData, NodeOutput};
use crate::error::ExecutorError;

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionContext
// ─────────────────────────────────────────────────────────────────────────────

/// Run metadata handed to every executor call.
///
/// The cancellation token fires when the run is cancelled or reset. The
/// engine never interrupts an executor; long-running executors may watch
/// the token and return early.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    run_id: Arc<str>,
    workflow_id: Arc<str>,
    node_index: usize,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    /// Creates a context for a run with a fresh cancellation token.
    #[must_use]
    pub fn new(run_id: impl Into<Arc<str>>, workflow_id: impl Into<Arc<str>>) -> Self {
        Self {
            run_id: run_id.into(),
            workflow_id: workflow_id.into(),
            node_index: 0,
            cancellation: CancellationToken::new(),
        }
    }

    /// Sets the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Sets the node's position in the schedule.
    #[must_use]
    pub fn with_node_index(mut self, index: usize) -> Self {
        self.node_index = index;
        self
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Returns the workflow ID.
    #[must_use]
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Returns the node's zero-based position in the schedule.
    #[must_use]
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// Returns the run's cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Behavior of one node kind.
///
/// From the engine's point of view an executor is a function of the node
/// (its `config`) and the collected input. Any I/O it performs must finish
/// or fail within the call.
pub trait NodeExecutor: Send + Sync + 'static {
    /// Runs the node once.
    fn execute<'a>(
        &'a self,
        node: &'a Node,
        input: &'a InputData,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<NodeOutput, ExecutorError>>;
}

/// Executor backed by a synchronous closure.
pub struct FnExecutor<F> {
    f: F,
}

impl<F> FnExecutor<F>
where
    F: Fn(&Node, &InputData, &ExecutionContext) -> Result<NodeOutput, ExecutorError>
        + Send
        + Sync
        + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> NodeExecutor for FnExecutor<F>
where
    F: Fn(&Node, &InputData, &ExecutionContext) -> Result<NodeOutput, ExecutorError>
        + Send
        + Sync
        + 'static,
{
    fn execute<'a>(
        &'a self,
        node: &'a Node,
        input: &'a InputData,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<NodeOutput, ExecutorError>> {
        let result = (self.f)(node, input, ctx);
        Box::pin(async move { result })
    }
}

/// Executor backed by an async closure over owned arguments.
pub struct AsyncFnExecutor<F> {
    f: F,
}

impl<F, Fut> AsyncFnExecutor<F>
where
    F: Fn(Node, InputData, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<NodeOutput, ExecutorError>> + Send + 'static,
{
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> NodeExecutor for AsyncFnExecutor<F>
where
    F: Fn(Node, InputData, ExecutionContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<NodeOutput, ExecutorError>> + Send + 'static,
{
    fn execute<'a>(
        &'a self,
        node: &'a Node,
        input: &'a InputData,
        ctx: &'a ExecutionContext,
    ) -> BoxFuture<'a, Result<NodeOutput, ExecutorError>> {
        Box::pin((self.f)(node.clone(), input.clone(), ctx.clone()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExecutorRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of executors keyed by node kind.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: IndexMap<String, Arc<dyn NodeExecutor>>,
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl ExecutorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executors: IndexMap::new(),
        }
    }

    /// Creates a registry holding the built-in data executors.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_all(&mut registry);
        registry
    }

    /// Registers an executor for a node kind.
    ///
    /// Returns the executor previously registered for that kind, so hosts
    /// can override built-ins.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        executor: impl NodeExecutor,
    ) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.insert(kind.into(), Arc::new(executor))
    }

    /// Registers a synchronous closure for a node kind.
    pub fn register_fn<F>(&mut self, kind: impl Into<String>, f: F) -> Option<Arc<dyn NodeExecutor>>
    where
        F: Fn(&Node, &InputData, &ExecutionContext) -> Result<NodeOutput, ExecutorError>
            + Send
            + Sync
            + 'static,
    {
        self.register(kind, FnExecutor::new(f))
    }

    /// Registers an async closure for a node kind.
    pub fn register_async<F, Fut>(
        &mut self,
        kind: impl Into<String>,
        f: F,
    ) -> Option<Arc<dyn NodeExecutor>>
    where
        F: Fn(Node, InputData, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<NodeOutput, ExecutorError>> + Send + 'static,
    {
        self.register(kind, AsyncFnExecutor::new(f))
    }

    /// Removes the executor of a node kind.
    pub fn unregister(&mut self, kind: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.shift_remove(kind)
    }

    /// Returns the executor for a node kind.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.get(kind).cloned()
    }

    /// Returns whether an executor is registered for a node kind.
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.executors.contains_key(kind)
    }

    /// Returns the registered node kinds, in registration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        self.executors.keys().map(String::as_str).collect()
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
