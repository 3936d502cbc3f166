//! Property tests for the topological scheduler.
//!
//! Random acyclic graphs are generated by ranking nodes and only drawing
//! edges from a lower rank to a higher one. The node list is then shuffled
//! so that listing order and topological order disagree.
//!
//! - Every connection of an accepted graph is respected by the order.
//! - Closing a cycle below a root is always rejected.
//! - Scheduling the same graph twice yields the same order.

use flowline_graph::prelude::*;
use proptest::prelude::*;

fn node_id(rank: usize) -> String {
    format!("n{rank}")
}

/// Builds a graph where rank order is a valid topological order.
fn build_dag(edges: &[(usize, usize)], listing: &[usize]) -> Graph {
    let nodes = listing
        .iter()
        .map(|&rank| Node::new(node_id(rank), "step"))
        .collect();

    let connections = edges
        .iter()
        .filter(|(a, b)| a != b)
        .enumerate()
        .map(|(i, &(a, b))| {
            let (from, to) = (a.min(b), a.max(b));
            Connection::new(format!("c{i}"), node_id(from), node_id(to))
        })
        .collect();

    Graph::new(nodes, connections)
}

fn arb_dag() -> impl Strategy<Value = Graph> {
    (2..14usize)
        .prop_flat_map(|n| {
            let edges = prop::collection::vec((0..n, 0..n), 0..n * 2);
            let listing = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
            (edges, listing)
        })
        .prop_map(|(edges, listing)| build_dag(&edges, &listing))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_order_respects_every_connection(graph in arb_dag()) {
        prop_assert!(graph.validate().is_ok());
        let schedule = graph.schedule().unwrap();

        // Every node has a path from some root, so nothing is left out.
        prop_assert_eq!(schedule.len(), graph.node_count());
        prop_assert!(schedule.warnings().is_empty());

        for conn in graph.connections() {
            let from = schedule.position(&conn.from).unwrap();
            let to = schedule.position(&conn.to).unwrap();
            prop_assert!(from < to, "{} must precede {}", conn.from, conn.to);
        }
    }

    #[test]
    fn prop_reachable_cycle_is_rejected(graph in arb_dag(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!graph.connections().is_empty());
        let closing = &graph.connections()[pick.index(graph.connections().len())];

        let mut nodes = graph.nodes().to_vec();
        nodes.push(Node::new("entry", "trigger"));

        let mut connections = graph.connections().to_vec();
        connections.push(Connection::new("back", closing.to.clone(), closing.from.clone()));
        connections.push(Connection::new("enter", "entry", closing.from.clone()));

        let cyclic = Graph::new(nodes, connections);
        let rejected = matches!(cyclic.validate(), Err(GraphError::CycleDetected { .. }));
        prop_assert!(rejected);
        prop_assert!(cyclic.schedule().is_err());
    }

    #[test]
    fn prop_scheduling_is_deterministic(graph in arb_dag()) {
        let first = graph.schedule().unwrap();
        let second = graph.schedule().unwrap();
        prop_assert_eq!(&first, &second);

        let rebuilt = Graph::new(graph.nodes().to_vec(), graph.connections().to_vec());
        let rebuilt_schedule = rebuilt.schedule().unwrap();
        prop_assert_eq!(first.order(), rebuilt_schedule.order());
    }
}
