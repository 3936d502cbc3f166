//! Graph model.
//!
//! The [`Graph`] is an immutable snapshot of one workflow's nodes and
//! connections, built once per run. It precomputes an adjacency index so the
//! scheduler and the engine can look up incoming and outgoing connections of
//! a node without scanning the whole connection list.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId};
use crate::scheduler::{self, Schedule};

/// The host's graph input: plain node and connection lists.
///
/// This is the shape the workflow store hands over; [`Graph::from_definition`]
/// turns a snapshot of it into an indexed, read-only model for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// All nodes, in their original (stable) order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// All connections, in their original order.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl WorkflowDefinition {
    /// Creates a definition from node and connection lists.
    #[must_use]
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self { nodes, connections }
    }
}

/// Errors raised by structural validation, before any node executes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A directed cycle is reachable from a root node.
    #[error("cycle detected: {}", display_path(.path))]
    CycleDetected {
        /// The nodes forming the cycle, first node repeated at the end.
        path: Vec<NodeId>,
    },
    /// A connection references a node that is not part of the graph.
    #[error("connection {connection} references missing node: {node}")]
    DanglingConnection {
        /// The offending connection.
        connection: ConnectionId,
        /// The missing endpoint.
        node: NodeId,
    },
    /// The node set is non-empty but every node has an incoming connection.
    #[error("graph has no root nodes")]
    NoRootNodes,
    /// Two nodes share the same ID.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),
}

fn display_path(path: &[NodeId]) -> String {
    path.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Indexed, read-only workflow graph for one run.
///
/// # Example
///
/// ```
/// use flowline_graph::{Connection, Graph, Node};
///
/// let graph = Graph::new(
///     vec![Node::new("a", "trigger"), Node::new("b", "output")],
///     vec![Connection::new("c1", "a", "b")],
/// );
///
/// assert!(graph.validate().is_ok());
/// assert_eq!(graph.root_nodes().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    /// Node ID -> position in `nodes` (first occurrence wins).
    index: HashMap<NodeId, usize>,
    /// Node ID -> positions in `connections` leaving the node.
    outgoing: HashMap<NodeId, Vec<usize>>,
    /// Node ID -> positions in `connections` entering the node.
    incoming: HashMap<NodeId, Vec<usize>>,
}

impl Graph {
    /// Builds a graph and its adjacency index.
    ///
    /// Construction never fails; call [`validate`](Self::validate) to check
    /// structural invariants.
    #[must_use]
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            index.entry(node.id.clone()).or_insert(position);
        }

        let mut outgoing: HashMap<NodeId, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for (position, conn) in connections.iter().enumerate() {
            outgoing.entry(conn.from.clone()).or_default().push(position);
            incoming.entry(conn.to.clone()).or_default().push(position);
        }

        Self {
            nodes,
            connections,
            index,
            outgoing,
            incoming,
        }
    }

    /// Builds a graph from a snapshot of the host's definition.
    #[must_use]
    pub fn from_definition(definition: &WorkflowDefinition) -> Self {
        Self::new(definition.nodes.clone(), definition.connections.clone())
    }

    /// Returns all nodes in their original order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all connections in their original order.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Gets a node by ID.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    /// Returns true if a node with this ID exists.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn position(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Returns every node without an incoming connection, in node order.
    ///
    /// These are the candidate entry points of a run.
    #[must_use]
    pub fn root_nodes(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| !self.incoming.contains_key(&node.id))
            .collect()
    }

    /// Returns true if the node has no incoming connection.
    #[must_use]
    pub fn is_root(&self, id: &NodeId) -> bool {
        self.contains(id) && !self.incoming.contains_key(id)
    }

    /// Returns the connections leaving a node, in connection order.
    pub fn outgoing(&self, id: &NodeId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections_at(self.outgoing.get(id))
    }

    /// Returns the connections entering a node, in connection order.
    pub fn incoming(&self, id: &NodeId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections_at(self.incoming.get(id))
    }

    fn connections_at<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        positions
            .into_iter()
            .flatten()
            .map(|&position| &self.connections[position])
    }

    /// Validates the graph structure.
    ///
    /// Checks, in order:
    /// - node IDs are unique
    /// - every connection references existing nodes
    /// - a non-empty graph has at least one root node
    /// - no directed cycle is reachable from a root node
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphError`] found.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check_structure()?;
        scheduler::reverse_postorder(self).map(|_| ())
    }

    /// Validates the graph and computes its execution order.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] if validation fails; no partial order is
    /// produced.
    pub fn schedule(&self) -> Result<Schedule, GraphError> {
        Schedule::compute(self)
    }

    /// Structural checks that do not require a traversal.
    pub(crate) fn check_structure(&self) -> Result<(), GraphError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        for conn in &self.connections {
            for endpoint in [&conn.from, &conn.to] {
                if !self.contains(endpoint) {
                    return Err(GraphError::DanglingConnection {
                        connection: conn.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
        }

        if !self.nodes.is_empty() && self.root_nodes().is_empty() {
            return Err(GraphError::NoRootNodes);
        }

        Ok(())
    }
}

impl From<WorkflowDefinition> for Graph {
    fn from(definition: WorkflowDefinition) -> Self {
        Self::new(definition.nodes, definition.connections)
    }
}
