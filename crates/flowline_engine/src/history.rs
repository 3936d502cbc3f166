//! Execution history.
//!
//! [`ExecutionHistory`] is one workflow's bounded, append-only ring buffer of
//! terminal runs. Appending past capacity evicts the oldest run. Runs are
//! never edited or removed individually.
//!
//! [`HistoryStore`] keys one history per workflow ID and is what the engine
//! appends to. Both can be exported as a [`HistorySnapshot`] for an external
//! persistence layer and restored from one.

use std::collections::VecDeque;
use std::collections::vec_deque;

use hashbrown::HashMap;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::run::ExecutionRun;

/// Errors from snapshot (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The snapshot could not be encoded or decoded.
    #[error("history snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionHistory
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded run history of one workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionHistory {
    capacity: usize,
    /// Oldest at the front.
    runs: VecDeque<ExecutionRun>,
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Newest-first view over a history.
///
/// The iterator is lazy and `Clone`, so a listing can be walked again from
/// the start without copying the runs.
pub type HistoryIter<'a> = core::iter::Rev<vec_deque::Iter<'a, ExecutionRun>>;

impl ExecutionHistory {
    /// Creates an empty history keeping at most `capacity` runs.
    ///
    /// At most [`DEFAULT_HISTORY_CAPACITY`] slots are reserved up front;
    /// storage grows with the runs appended.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            runs: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    /// Returns the maximum number of runs kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a run, evicting the oldest once capacity is exceeded.
    ///
    /// Returns the evicted run, if any. With capacity zero the appended run
    /// itself is returned.
    pub fn append(&mut self, run: ExecutionRun) -> Option<ExecutionRun> {
        self.runs.push_back(run);
        if self.runs.len() > self.capacity {
            self.runs.pop_front()
        } else {
            None
        }
    }

    /// Lists runs newest first.
    pub fn list(&self) -> HistoryIter<'_> {
        self.runs.iter().rev()
    }

    /// Returns the most recent run.
    #[must_use]
    pub fn latest(&self) -> Option<&ExecutionRun> {
        self.runs.back()
    }

    /// Returns the number of runs kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns true if no run is kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Removes every run.
    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Builds a history from runs in oldest-first order, keeping the newest
    /// `capacity` of them.
    #[must_use]
    pub fn from_runs(capacity: usize, runs: Vec<ExecutionRun>) -> Self {
        let mut history = Self::new(capacity);
        for run in runs {
            history.append(run);
        }
        history
    }

    /// Returns the runs in oldest-first order.
    #[must_use]
    pub fn to_runs(&self) -> Vec<ExecutionRun> {
        self.runs.iter().cloned().collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HistorySnapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable form of a [`HistoryStore`].
///
/// Runs are listed oldest first so that restoring preserves eviction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// Per-workflow capacity.
    pub capacity: usize,
    /// Workflow ID -> runs, oldest first.
    pub workflows: IndexMap<String, Vec<ExecutionRun>>,
}

impl HistorySnapshot {
    /// Encodes the snapshot as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Serialization`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HistoryStore
// ─────────────────────────────────────────────────────────────────────────────

/// Run histories keyed by workflow ID.
///
/// Each workflow's history is independent; runs of different workflows never
/// evict each other.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    histories: RwLock<HashMap<String, ExecutionHistory>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStore {
    /// Creates an empty store with the given per-workflow capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the per-workflow capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a terminal run to its workflow's history.
    ///
    /// Returns the evicted run, if any.
    pub fn append(&self, run: ExecutionRun) -> Option<ExecutionRun> {
        let mut histories = self.histories.write();
        histories
            .entry(run.workflow_id.clone())
            .or_insert_with(|| ExecutionHistory::new(self.capacity))
            .append(run)
    }

    /// Lists a workflow's runs, newest first.
    #[must_use]
    pub fn list(&self, workflow_id: &str) -> Vec<ExecutionRun> {
        self.view(workflow_id, |history| history.list().cloned().collect())
            .unwrap_or_default()
    }

    /// Runs `f` against a workflow's history without copying it.
    ///
    /// Returns `None` if the workflow has no history. The store is read-locked
    /// while `f` runs.
    pub fn view<R>(&self, workflow_id: &str, f: impl FnOnce(&ExecutionHistory) -> R) -> Option<R> {
        let histories = self.histories.read();
        histories.get(workflow_id).map(f)
    }

    /// Returns the most recent run of a workflow.
    #[must_use]
    pub fn latest(&self, workflow_id: &str) -> Option<ExecutionRun> {
        self.view(workflow_id, |history| history.latest().cloned())
            .flatten()
    }

    /// Returns the number of runs kept for a workflow.
    #[must_use]
    pub fn len(&self, workflow_id: &str) -> usize {
        self.view(workflow_id, ExecutionHistory::len).unwrap_or(0)
    }

    /// Returns the workflow IDs that have history, sorted.
    #[must_use]
    pub fn workflow_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.histories.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Clears one workflow's history.
    pub fn clear(&self, workflow_id: &str) {
        self.histories.write().remove(workflow_id);
    }

    /// Clears every workflow's history.
    pub fn clear_all(&self) {
        self.histories.write().clear();
    }

    /// Exports every history, workflows sorted by ID.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        let histories = self.histories.read();
        let mut ids: Vec<&String> = histories.keys().collect();
        ids.sort();

        let workflows = ids
            .into_iter()
            .map(|id| (id.clone(), histories[id].to_runs()))
            .collect();

        HistorySnapshot {
            capacity: self.capacity,
            workflows,
        }
    }

    /// Builds a store from a snapshot.
    ///
    /// Histories longer than the snapshot's capacity keep their newest runs.
    #[must_use]
    pub fn restore(snapshot: HistorySnapshot) -> Self {
        let capacity = snapshot.capacity;
        let histories = snapshot
            .workflows
            .into_iter()
            .map(|(id, runs)| (id, ExecutionHistory::from_runs(capacity, runs)))
            .collect();

        Self {
            capacity,
            histories: RwLock::new(histories),
        }
    }
}
