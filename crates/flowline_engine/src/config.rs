//! Engine configuration.

use flowline_graph::connection::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

/// Default number of runs kept per workflow.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// How node errors affect the terminal run status.
///
/// Either way every scheduled node still runs; the policy only decides how
/// the finished run is labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Any node error makes the run `failed`.
    #[default]
    FailOnNodeError,
    /// The run is `completed` regardless of node errors.
    Tolerate,
}

/// Engine settings.
///
/// Deserializes from camelCase keys; missing keys take their defaults.
///
/// ```ignore
/// let config: EngineConfig = serde_json::from_str(r#"{ "historyCapacity": 10 }"#)?;
/// assert_eq!(config.failure_policy, FailurePolicy::FailOnNodeError);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Runs kept per workflow before the oldest is evicted.
    pub history_capacity: usize,
    /// Terminal status policy for node errors.
    pub failure_policy: FailurePolicy,
    /// Port that untagged connections and the trigger input feed.
    pub default_port: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            failure_policy: FailurePolicy::default(),
            default_port: DEFAULT_PORT.to_owned(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the history capacity.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the default port name.
    #[must_use]
    pub fn with_default_port(mut self, port: impl Into<String>) -> Self {
        self.default_port = port.into();
        self
    }
}
