//! Topological scheduling.
//!
//! A [`Schedule`] is the deterministic linear execution order of a validated
//! graph: for every connection `a -> b`, `a` comes before `b`.
//!
//! The order is the reverse postorder of a depth-first traversal started from
//! each root node. Roots are taken in their node-list position and the
//! successors of a node in connection order, so an unchanged graph always
//! yields the same order, and independent branches keep the order in which
//! the host listed them.
//!
//! Nodes that no root can reach (islands whose members only feed each other)
//! can never be triggered. They are left out of the order and reported as a
//! [`ScheduleWarning`] rather than an error.

use core::fmt;

use crate::graph::{Graph, GraphError};
use crate::node::NodeId;

/// Non-fatal findings produced while scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// Nodes that no root reaches; they are excluded from the order.
    Unreachable {
        /// The excluded nodes, in node-list order.
        nodes: Vec<NodeId>,
    },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::Unreachable { nodes } => {
                let ids: Vec<&str> = nodes.iter().map(NodeId::as_str).collect();
                write!(
                    f,
                    "{} node(s) unreachable from any root and skipped: {}",
                    nodes.len(),
                    ids.join(", ")
                )
            }
        }
    }
}

/// Deterministic execution order for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    order: Vec<NodeId>,
    warnings: Vec<ScheduleWarning>,
}

impl Schedule {
    /// Validates `graph` and computes its execution order.
    ///
    /// # Errors
    ///
    /// Returns the first structural [`GraphError`]. A reachable cycle aborts
    /// scheduling entirely with [`GraphError::CycleDetected`].
    pub fn compute(graph: &Graph) -> Result<Self, GraphError> {
        graph.check_structure()?;
        let traversal = reverse_postorder(graph)?;

        let nodes = graph.nodes();
        let order = traversal
            .order
            .iter()
            .map(|&position| nodes[position].id.clone())
            .collect();

        let unreachable: Vec<NodeId> = nodes
            .iter()
            .zip(&traversal.visited)
            .filter(|(_, visited)| !**visited)
            .map(|(node, _)| node.id.clone())
            .collect();

        let mut warnings = Vec::new();
        if !unreachable.is_empty() {
            warnings.push(ScheduleWarning::Unreachable { nodes: unreachable });
        }

        Ok(Self { order, warnings })
    }

    /// Returns the node IDs in execution order.
    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Iterates the node IDs in execution order.
    pub fn iter(&self) -> core::slice::Iter<'_, NodeId> {
        self.order.iter()
    }

    /// Returns the number of scheduled nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the position of a node in the order, if scheduled.
    #[must_use]
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.order.iter().position(|scheduled| scheduled == id)
    }

    /// Returns the non-fatal findings of scheduling.
    #[must_use]
    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    /// Returns the nodes excluded because no root reaches them.
    #[must_use]
    pub fn unreachable(&self) -> &[NodeId] {
        self.warnings
            .iter()
            .map(|warning| match warning {
                ScheduleWarning::Unreachable { nodes } => nodes.as_slice(),
            })
            .next()
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a NodeId;
    type IntoIter = core::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// One DFS stack frame: a node and the successors still to visit.
struct Frame {
    node: usize,
    /// Successor positions in connection order; popped from the back.
    pending: Vec<usize>,
}

impl Frame {
    fn new(graph: &Graph, node: usize) -> Self {
        let id = &graph.nodes()[node].id;
        let pending = graph
            .outgoing(id)
            .filter_map(|conn| graph.position(&conn.to))
            .collect();
        Self { node, pending }
    }
}

pub(crate) struct Traversal {
    /// Node positions in execution order.
    pub(crate) order: Vec<usize>,
    /// Whether each node (by position) was reached from a root.
    pub(crate) visited: Vec<bool>,
}

/// Iterative three-colour DFS from every root.
///
/// Roots and successors are visited back to front, so that reversing the
/// postorder lists them front to back.
pub(crate) fn reverse_postorder(graph: &Graph) -> Result<Traversal, GraphError> {
    let nodes = graph.nodes();
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut postorder = Vec::with_capacity(nodes.len());

    let roots: Vec<usize> = graph
        .root_nodes()
        .iter()
        .filter_map(|node| graph.position(&node.id))
        .collect();

    for &root in roots.iter().rev() {
        if marks[root] != Mark::Unvisited {
            continue;
        }

        marks[root] = Mark::OnStack;
        let mut stack = vec![Frame::new(graph, root)];

        while let Some(frame) = stack.last_mut() {
            match frame.pending.pop() {
                Some(next) => match marks[next] {
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        stack.push(Frame::new(graph, next));
                    }
                    Mark::OnStack => {
                        let start = stack
                            .iter()
                            .position(|frame| frame.node == next)
                            .unwrap_or_default();
                        let mut path: Vec<NodeId> = stack[start..]
                            .iter()
                            .map(|frame| nodes[frame.node].id.clone())
                            .collect();
                        path.push(nodes[next].id.clone());
                        return Err(GraphError::CycleDetected { path });
                    }
                    Mark::Done => {}
                },
                None => {
                    let node = frame.node;
                    stack.pop();
                    marks[node] = Mark::Done;
                    postorder.push(node);
                }
            }
        }
    }

    postorder.reverse();
    Ok(Traversal {
        order: postorder,
        visited: marks.iter().map(|mark| *mark == Mark::Done).collect(),
    })
}
